//! # Shipment Transition Permissions
//!
//! Static table mapping each STT status edge to the roles allowed to take
//! it. Built once at startup and shared read-only.
//!
//! | Role | Edges |
//! |------|-------|
//! | admin, manager, kepala_cabang | all |
//! | staff_admin | PENDING→MUAT, RETURN→PENDING |
//! | kepala_gudang | PENDING→MUAT, MUAT→TRANSIT |
//! | checker | MUAT→TRANSIT, TRANSIT→LANSIR, LANSIR→TERKIRIM |
//! | supir | TRANSIT→LANSIR, LANSIR→TERKIRIM |
//! | anything else | none |

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use shared_types::{Role, ShipmentStatus};

use ShipmentStatus::{Lansir, Muat, Pending, Return, Terkirim, Transit};

/// A directed edge between two STT statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub from: ShipmentStatus,
    pub to: ShipmentStatus,
}

impl Edge {
    #[must_use]
    pub const fn new(from: ShipmentStatus, to: ShipmentStatus) -> Self {
        Self { from, to }
    }
}

/// Forward edges reachable through a direct `advance` call.
pub const FORWARD_EDGES: [Edge; 6] = [
    Edge::new(Pending, Muat),
    Edge::new(Muat, Transit),
    Edge::new(Transit, Lansir),
    Edge::new(Lansir, Terkirim),
    Edge::new(Transit, Return),
    Edge::new(Lansir, Return),
];

/// The single backward edge, taken only when a return batch is closed.
pub const RETURN_EDGE: Edge = Edge::new(Return, Pending);

/// True if `advance` may move an STT along this edge at all.
#[must_use]
pub fn is_forward_edge(from: ShipmentStatus, to: ShipmentStatus) -> bool {
    FORWARD_EDGES.contains(&Edge::new(from, to))
}

/// Non-supervisor role names, as they key the table.
const STAFF_ADMIN: &str = "staff_admin";
const KEPALA_GUDANG: &str = "kepala_gudang";
const CHECKER: &str = "checker";
const SUPIR: &str = "supir";

/// `(from, to) → roles` lookup.
#[derive(Debug, Clone)]
pub struct PermissionTable {
    edges: HashMap<Edge, HashSet<String>>,
}

impl PermissionTable {
    /// The standard rule set.
    #[must_use]
    pub fn standard() -> Self {
        let grants: [(Edge, &[&str]); 7] = [
            (Edge::new(Pending, Muat), &[STAFF_ADMIN, KEPALA_GUDANG]),
            (Edge::new(Muat, Transit), &[KEPALA_GUDANG, CHECKER]),
            (Edge::new(Transit, Lansir), &[CHECKER, SUPIR]),
            (Edge::new(Lansir, Terkirim), &[CHECKER, SUPIR]),
            (Edge::new(Transit, Return), &[]),
            (Edge::new(Lansir, Return), &[]),
            (RETURN_EDGE, &[STAFF_ADMIN]),
        ];

        let edges = grants
            .into_iter()
            .map(|(edge, roles)| (edge, roles.iter().map(|r| r.to_string()).collect()))
            .collect();

        Self { edges }
    }

    /// Exact lookup. Supervisors hold every edge present in the table.
    #[must_use]
    pub fn allows(&self, role: &Role, from: ShipmentStatus, to: ShipmentStatus) -> bool {
        let Some(roles) = self.edges.get(&Edge::new(from, to)) else {
            return false;
        };
        role.is_supervisor() || roles.contains(role.as_str())
    }

    /// Statuses this role may move an STT to from `from`, in canonical order.
    #[must_use]
    pub fn targets(&self, role: &Role, from: ShipmentStatus) -> Vec<ShipmentStatus> {
        ShipmentStatus::ALL
            .iter()
            .copied()
            .filter(|to| self.allows(role, from, *to))
            .collect()
    }

    /// Every edge granted to the role.
    #[must_use]
    pub fn edges_for(&self, role: &Role) -> Vec<Edge> {
        let mut edges: Vec<Edge> = self
            .edges
            .keys()
            .copied()
            .filter(|e| self.allows(role, e.from, e.to))
            .collect();
        edges.sort_by_key(|e| (rank(e.from), rank(e.to)));
        edges
    }
}

impl Default for PermissionTable {
    fn default() -> Self {
        Self::standard()
    }
}

fn rank(status: ShipmentStatus) -> usize {
    ShipmentStatus::ALL
        .iter()
        .position(|s| *s == status)
        .unwrap_or(usize::MAX)
}
