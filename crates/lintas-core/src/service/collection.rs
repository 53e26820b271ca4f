//! Collection and payment ledger: bills delivered STTs to one customer and
//! tracks installments against the total.

use shared_bus::LogisticsEvent;
use shared_types::{
    Actor, CollectionId, CollectionStatus, CustomerRole, Rupiah, ShipmentStatus,
};
use tracing::info;

use super::{load_collection, load_shipments, require_branch, require_present, LintasService};
use crate::domain::manifest::validate_batch;
use crate::domain::{
    Collection, CollectionQuery, CollectionView, DocumentRef, DocumentRequest, LogisticsError,
    LogisticsResult, NewCollection, NewPayment, Payment, Shipment,
};
use crate::ports::inbound::CollectionApi;
use crate::ports::outbound::LogisticsStore;

fn check_billable(shipment: &Shipment, request: &NewCollection) -> LogisticsResult<()> {
    if let Some(existing) = &shipment.billed_in {
        return Err(LogisticsError::already_claimed(
            "shipment",
            &shipment.id,
            format!("collection {existing}"),
        ));
    }
    if shipment.status != ShipmentStatus::Terkirim {
        return Err(LogisticsError::validation(format!(
            "shipment {} is {} and cannot be billed before TERKIRIM",
            shipment.id, shipment.status
        )));
    }
    let as_sender = request.customer_role == CustomerRole::Pengirim;
    if !shipment.belongs_to(&request.customer, as_sender) {
        return Err(LogisticsError::validation(format!(
            "shipment {} does not list {} as {}",
            shipment.id, request.customer, request.customer_role
        )));
    }
    Ok(())
}

impl<S: LogisticsStore> CollectionApi for LintasService<S> {
    fn create_collection(
        &self,
        actor: &Actor,
        request: NewCollection,
    ) -> LogisticsResult<CollectionView> {
        validate_batch(&request.shipments)?;
        require_present(request.customer.as_str(), "customer")?;
        require_branch(&request.branch, "collection branch")?;

        let collection = self.commit(|repo, now, events| {
            let members = load_shipments(&*repo, &request.shipments)?;
            for shipment in &members {
                check_billable(shipment, &request)?;
            }

            let id = CollectionId::generate();
            let total_billed = members
                .iter()
                .try_fold(0, |acc: Rupiah, s| acc.checked_add(s.harga))
                .ok_or_else(|| LogisticsError::validation("billed total is out of range"))?;
            for mut shipment in members {
                shipment.billed_in = Some(id.clone());
                shipment.updated_at = now;
                repo.put_shipment(shipment);
            }

            let collection = Collection {
                id,
                customer: request.customer,
                customer_role: request.customer_role,
                branch: request.branch,
                shipments: request.shipments,
                total_billed,
                payments: Vec::new(),
                status: CollectionStatus::BelumLunas,
                created_by: actor.id.clone(),
                created_at: now,
                updated_at: now,
            };
            repo.put_collection(collection.clone());
            events.push(LogisticsEvent::CollectionCreated {
                collection_id: collection.id.clone(),
                total_billed,
            });
            Ok(collection)
        })?;

        info!(
            id = %collection.id,
            customer = %collection.customer,
            total = collection.total_billed,
            actor = %actor.id,
            "Collection created"
        );
        Ok(collection.into())
    }

    fn add_payment(
        &self,
        actor: &Actor,
        id: &CollectionId,
        payment: NewPayment,
    ) -> LogisticsResult<Payment> {
        let recorded = self.commit(|repo, now, events| {
            let mut collection = load_collection(&*repo, id)?;
            let recorded = collection.record_payment(payment, &actor.id, now)?;
            repo.put_collection(collection);
            events.push(LogisticsEvent::PaymentRecorded {
                collection_id: id.clone(),
                termin: recorded.termin,
                amount: recorded.amount,
            });
            Ok(recorded)
        })?;

        info!(%id, termin = recorded.termin, amount = recorded.amount, actor = %actor.id, "Payment recorded");
        Ok(recorded)
    }

    fn set_collection_status(
        &self,
        actor: &Actor,
        id: &CollectionId,
        status: CollectionStatus,
    ) -> LogisticsResult<CollectionView> {
        let collection = self.commit(|repo, now, events| {
            let mut collection = load_collection(&*repo, id)?;
            collection.status = status;
            collection.updated_at = now;
            repo.put_collection(collection.clone());
            events.push(LogisticsEvent::CollectionStatusSet {
                collection_id: id.clone(),
                status,
            });
            Ok(collection)
        })?;

        info!(%id, %status, actor = %actor.id, "Collection status set");
        Ok(collection.into())
    }

    fn delete_collection(&self, actor: &Actor, id: &CollectionId) -> LogisticsResult<()> {
        self.commit(|repo, now, _events| {
            let collection = load_collection(&*repo, id)?;
            if !collection.payments.is_empty() {
                return Err(LogisticsError::immutable(
                    "collection",
                    id,
                    format!("paid in {} installment(s)", collection.payments.len()),
                ));
            }
            for mut shipment in load_shipments(&*repo, &collection.shipments)? {
                if shipment.billed_in.as_ref() == Some(id) {
                    shipment.billed_in = None;
                    shipment.updated_at = now;
                    repo.put_shipment(shipment);
                }
            }
            repo.remove_collection(id);
            Ok(())
        })?;
        info!(%id, actor = %actor.id, "Collection deleted");
        Ok(())
    }

    fn collection(&self, id: &CollectionId) -> LogisticsResult<CollectionView> {
        self.store
            .read(|repo| load_collection(repo, id))
            .map(CollectionView::from)
    }

    fn list_collections(&self, query: &CollectionQuery) -> Vec<CollectionView> {
        let mut collections: Vec<Collection> = self.store.read(|repo| {
            repo.collections()
                .into_iter()
                .filter(|c| query.matches(c))
                .collect()
        });
        collections.sort_by_key(|c| c.created_at);
        collections.into_iter().map(CollectionView::from).collect()
    }

    fn generate_invoice(&self, actor: &Actor, id: &CollectionId) -> LogisticsResult<DocumentRef> {
        let (collection, shipments) = self.store.read(|repo| {
            let collection = load_collection(repo, id)?;
            let shipments = load_shipments(repo, &collection.shipments)?;
            Ok::<_, LogisticsError>((collection, shipments))
        })?;
        let document = self.render(DocumentRequest::Invoice {
            collection: collection.into(),
            shipments,
        })?;
        info!(%id, reference = %document.reference, actor = %actor.id, "Invoice generated");
        Ok(document)
    }
}
