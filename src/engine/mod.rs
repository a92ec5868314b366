mod availability;
mod conflict;
mod error;
mod ledger;
mod lifecycle;
mod occupancy;
mod queries;
mod store;

pub use availability::{classify_units, UnitAvailability, Unavailability};
pub use error::{EngineError, Entity};
pub use ledger::PaymentDraft;
pub use lifecycle::BookingDraft;
pub use occupancy::OccupancyStats;
pub use store::{
    BookingStore, CustomerDirectory, MemoryStore, MemoryTransaction, PaymentStore,
    StoreTransaction, TransactionCoordinator, UnitStore,
};

use std::sync::Arc;

use ulid::Ulid;

use crate::model::Booking;

/// Booking engine: availability, lifecycle, payment ledger and
/// occupancy reporting over pluggable stores.
///
/// Operations are request-scoped and stateless between calls; every one
/// re-reads what it needs from the stores and delegates consistency to
/// the backing store's transactional guarantees. Only the payment
/// ledger takes an explicit multi-write transaction.
pub struct Engine {
    units: Arc<dyn UnitStore>,
    customers: Arc<dyn CustomerDirectory>,
    bookings: Arc<dyn BookingStore>,
    payments: Arc<dyn PaymentStore>,
    tx: Arc<dyn TransactionCoordinator>,
}

impl Engine {
    pub fn new(
        units: Arc<dyn UnitStore>,
        customers: Arc<dyn CustomerDirectory>,
        bookings: Arc<dyn BookingStore>,
        payments: Arc<dyn PaymentStore>,
        tx: Arc<dyn TransactionCoordinator>,
    ) -> Self {
        Self {
            units,
            customers,
            bookings,
            payments,
            tx,
        }
    }

    /// Engine over a fresh [`MemoryStore`]. The returned store handle is
    /// the seeding surface for the externally-owned units and customers.
    pub fn in_memory() -> (Self, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let engine = Self::new(
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
        );
        (engine, store)
    }

    pub(super) async fn fetch_booking(&self, id: Ulid) -> Result<Booking, EngineError> {
        self.bookings
            .get(&id)
            .await?
            .ok_or(EngineError::NotFound(Entity::Booking, id))
    }
}
