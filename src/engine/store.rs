use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use dashmap::DashMap;
use rust_decimal::Decimal;
use tokio::sync::{Mutex, OwnedMutexGuard};
use ulid::Ulid;

use crate::model::*;

use super::EngineError;

// ── Store traits ─────────────────────────────────────────

#[async_trait]
pub trait UnitStore: Send + Sync {
    async fn get(&self, id: &Ulid) -> Result<Option<Unit>, EngineError>;
    async fn exists(&self, id: &Ulid) -> Result<bool, EngineError>;
    async fn list_active(&self) -> Result<Vec<Unit>, EngineError>;
    async fn list_all(&self) -> Result<Vec<Unit>, EngineError>;
}

#[async_trait]
pub trait CustomerDirectory: Send + Sync {
    async fn exists(&self, id: &Ulid) -> Result<bool, EngineError>;
}

#[async_trait]
pub trait BookingStore: Send + Sync {
    async fn get(&self, id: &Ulid) -> Result<Option<Booking>, EngineError>;
    async fn insert(&self, booking: Booking) -> Result<(), EngineError>;
    async fn update(&self, booking: Booking) -> Result<(), EngineError>;
    /// One-query overlap test against non-cancelled bookings on the unit.
    /// `exclude` skips a booking id (a booking never conflicts with itself
    /// during modification).
    async fn has_overlap(
        &self,
        unit_id: Ulid,
        stay: &DateRange,
        exclude: Option<Ulid>,
    ) -> Result<bool, EngineError>;
    /// Bookings of any state whose stay overlaps the window.
    async fn list_overlapping(&self, window: &DateRange) -> Result<Vec<Booking>, EngineError>;
    async fn list_by_unit(&self, unit_id: Ulid) -> Result<Vec<Booking>, EngineError>;
    async fn list_by_customer(&self, customer_id: Ulid) -> Result<Vec<Booking>, EngineError>;
    async fn list_all(&self) -> Result<Vec<Booking>, EngineError>;
}

#[async_trait]
pub trait PaymentStore: Send + Sync {
    async fn insert(&self, payment: Payment) -> Result<(), EngineError>;
    /// Sum of `Confirmed` payments for the booking. `PendingVerification`
    /// rows never count.
    async fn total_confirmed(&self, booking_id: &Ulid) -> Result<Decimal, EngineError>;
    async fn list_by_booking(&self, booking_id: &Ulid) -> Result<Vec<Payment>, EngineError>;
    /// Payments with `paid_at` in `[from, to)`, any status.
    async fn list_between(&self, from: NaiveDate, to: NaiveDate)
        -> Result<Vec<Payment>, EngineError>;
}

/// A multi-write transaction over the booking and payment tables.
/// Dropping the handle without committing rolls back.
#[async_trait]
pub trait StoreTransaction: Send {
    async fn commit(self: Box<Self>) -> Result<(), EngineError>;
    async fn rollback(self: Box<Self>);
}

#[async_trait]
pub trait TransactionCoordinator: Send + Sync {
    async fn begin(&self) -> Result<Box<dyn StoreTransaction>, EngineError>;
}

// ── In-memory implementation ─────────────────────────────

/// In-memory backing store: one `DashMap` per table, the same surface a
/// database-backed implementation would offer. Also doubles as the
/// seeding point for the externally-owned unit and customer tables.
pub struct MemoryStore {
    units: DashMap<Ulid, Unit>,
    customers: DashMap<Ulid, String>,
    bookings: Arc<DashMap<Ulid, Booking>>,
    payments: Arc<DashMap<Ulid, Payment>>,
    /// Serializes ledger transactions; snapshot restore assumes it is the
    /// sole writer while held.
    ledger_gate: Arc<Mutex<()>>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            units: DashMap::new(),
            customers: DashMap::new(),
            bookings: Arc::new(DashMap::new()),
            payments: Arc::new(DashMap::new()),
            ledger_gate: Arc::new(Mutex::new(())),
        }
    }

    pub fn insert_unit(&self, unit: Unit) {
        self.units.insert(unit.id, unit);
    }

    pub fn insert_customer(&self, id: Ulid, name: impl Into<String>) {
        self.customers.insert(id, name.into());
    }
}

#[async_trait]
impl UnitStore for MemoryStore {
    async fn get(&self, id: &Ulid) -> Result<Option<Unit>, EngineError> {
        Ok(self.units.get(id).map(|e| e.value().clone()))
    }

    async fn exists(&self, id: &Ulid) -> Result<bool, EngineError> {
        Ok(self.units.contains_key(id))
    }

    async fn list_active(&self) -> Result<Vec<Unit>, EngineError> {
        let mut units: Vec<Unit> = self
            .units
            .iter()
            .filter(|e| e.value().is_active())
            .map(|e| e.value().clone())
            .collect();
        units.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(units)
    }

    async fn list_all(&self) -> Result<Vec<Unit>, EngineError> {
        let mut units: Vec<Unit> = self.units.iter().map(|e| e.value().clone()).collect();
        units.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(units)
    }
}

#[async_trait]
impl CustomerDirectory for MemoryStore {
    async fn exists(&self, id: &Ulid) -> Result<bool, EngineError> {
        Ok(self.customers.contains_key(id))
    }
}

#[async_trait]
impl BookingStore for MemoryStore {
    async fn get(&self, id: &Ulid) -> Result<Option<Booking>, EngineError> {
        Ok(self.bookings.get(id).map(|e| e.value().clone()))
    }

    async fn insert(&self, booking: Booking) -> Result<(), EngineError> {
        self.bookings.insert(booking.id, booking);
        Ok(())
    }

    async fn update(&self, booking: Booking) -> Result<(), EngineError> {
        self.bookings.insert(booking.id, booking);
        Ok(())
    }

    async fn has_overlap(
        &self,
        unit_id: Ulid,
        stay: &DateRange,
        exclude: Option<Ulid>,
    ) -> Result<bool, EngineError> {
        Ok(self.bookings.iter().any(|e| {
            let b = e.value();
            b.unit_id == unit_id
                && b.state.occupies()
                && exclude != Some(b.id)
                && b.stay.overlaps(stay)
        }))
    }

    async fn list_overlapping(&self, window: &DateRange) -> Result<Vec<Booking>, EngineError> {
        Ok(self
            .bookings
            .iter()
            .filter(|e| e.value().stay.overlaps(window))
            .map(|e| e.value().clone())
            .collect())
    }

    async fn list_by_unit(&self, unit_id: Ulid) -> Result<Vec<Booking>, EngineError> {
        Ok(self
            .bookings
            .iter()
            .filter(|e| e.value().unit_id == unit_id)
            .map(|e| e.value().clone())
            .collect())
    }

    async fn list_by_customer(&self, customer_id: Ulid) -> Result<Vec<Booking>, EngineError> {
        Ok(self
            .bookings
            .iter()
            .filter(|e| e.value().customer_id == customer_id)
            .map(|e| e.value().clone())
            .collect())
    }

    async fn list_all(&self) -> Result<Vec<Booking>, EngineError> {
        Ok(self.bookings.iter().map(|e| e.value().clone()).collect())
    }
}

#[async_trait]
impl PaymentStore for MemoryStore {
    async fn insert(&self, payment: Payment) -> Result<(), EngineError> {
        self.payments.insert(payment.id, payment);
        Ok(())
    }

    async fn total_confirmed(&self, booking_id: &Ulid) -> Result<Decimal, EngineError> {
        Ok(self
            .payments
            .iter()
            .filter(|e| {
                let p = e.value();
                p.booking_id == *booking_id && p.status == PaymentStatus::Confirmed
            })
            .map(|e| e.value().amount)
            .sum())
    }

    async fn list_by_booking(&self, booking_id: &Ulid) -> Result<Vec<Payment>, EngineError> {
        Ok(self
            .payments
            .iter()
            .filter(|e| e.value().booking_id == *booking_id)
            .map(|e| e.value().clone())
            .collect())
    }

    async fn list_between(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Payment>, EngineError> {
        Ok(self
            .payments
            .iter()
            .filter(|e| {
                let day = e.value().paid_at.date_naive();
                from <= day && day < to
            })
            .map(|e| e.value().clone())
            .collect())
    }
}

/// Snapshot-based transaction: commit discards the snapshot, rollback
/// (explicit or via `Drop`) writes it back. Whole-table snapshots are
/// fine here; the tables live in memory and the gate serializes writers.
pub struct MemoryTransaction {
    bookings: Arc<DashMap<Ulid, Booking>>,
    payments: Arc<DashMap<Ulid, Payment>>,
    booking_snapshot: Vec<(Ulid, Booking)>,
    payment_snapshot: Vec<(Ulid, Payment)>,
    finished: bool,
    _gate: OwnedMutexGuard<()>,
}

impl MemoryTransaction {
    fn restore(&mut self) {
        self.bookings.clear();
        for (id, b) in self.booking_snapshot.drain(..) {
            self.bookings.insert(id, b);
        }
        self.payments.clear();
        for (id, p) in self.payment_snapshot.drain(..) {
            self.payments.insert(id, p);
        }
    }
}

#[async_trait]
impl StoreTransaction for MemoryTransaction {
    async fn commit(mut self: Box<Self>) -> Result<(), EngineError> {
        self.finished = true;
        Ok(())
    }

    async fn rollback(mut self: Box<Self>) {
        self.finished = true;
        self.restore();
    }
}

impl Drop for MemoryTransaction {
    fn drop(&mut self) {
        // Abandoned handle: treat as rollback.
        if !self.finished {
            self.restore();
        }
    }
}

#[async_trait]
impl TransactionCoordinator for MemoryStore {
    async fn begin(&self) -> Result<Box<dyn StoreTransaction>, EngineError> {
        let gate = self.ledger_gate.clone().lock_owned().await;
        Ok(Box::new(MemoryTransaction {
            bookings: self.bookings.clone(),
            payments: self.payments.clone(),
            booking_snapshot: self
                .bookings
                .iter()
                .map(|e| (*e.key(), e.value().clone()))
                .collect(),
            payment_snapshot: self
                .payments
                .iter()
                .map(|e| (*e.key(), e.value().clone()))
                .collect(),
            finished: false,
            _gate: gate,
        }))
    }
}
