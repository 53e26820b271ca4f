//! Static identity provider.
//!
//! Staff accounts are loaded once (from a JSON array of actors) and never
//! change while the process runs. Session handling lives outside the core.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use shared_types::{Actor, UserId};
use tracing::info;

use crate::domain::{LogisticsError, LogisticsResult};
use crate::ports::outbound::IdentityProvider;

/// Fixed user directory keyed by user id.
#[derive(Debug, Clone, Default)]
pub struct StaticIdentityProvider {
    users: HashMap<UserId, Actor>,
}

impl StaticIdentityProvider {
    #[must_use]
    pub fn new(actors: impl IntoIterator<Item = Actor>) -> Self {
        Self {
            users: actors.into_iter().map(|a| (a.id.clone(), a)).collect(),
        }
    }

    /// Add or replace one user.
    #[must_use]
    pub fn with_user(mut self, actor: Actor) -> Self {
        self.users.insert(actor.id.clone(), actor);
        self
    }

    /// Parse a JSON array of actors.
    pub fn from_json(json: &str) -> LogisticsResult<Self> {
        let actors: Vec<Actor> = serde_json::from_str(json)
            .map_err(|e| LogisticsError::validation(format!("invalid users file: {e}")))?;
        Ok(Self::new(actors))
    }

    pub fn load(path: &Path) -> LogisticsResult<Self> {
        let json = fs::read_to_string(path)
            .map_err(|e| LogisticsError::Store(format!("cannot read {}: {e}", path.display())))?;
        let provider = Self::from_json(&json)?;
        info!(path = %path.display(), users = provider.len(), "Identity directory loaded");
        Ok(provider)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.users.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

impl IdentityProvider for StaticIdentityProvider {
    fn resolve(&self, user: &UserId) -> Option<Actor> {
        self.users.get(user).cloned()
    }
}
