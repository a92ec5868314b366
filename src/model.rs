use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Half-open stay interval `[start, end)` in whole days.
///
/// The night of `end` is not part of the stay, so a booking ending on a
/// date and another starting on that same date do not collide (same-day
/// turnover).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        debug_assert!(start < end, "DateRange start must be before end");
        Self { start, end }
    }

    /// Number of nights covered, i.e. whole days between start and end.
    pub fn nights(&self) -> i64 {
        (self.end - self.start).num_days()
    }

    pub fn overlaps(&self, other: &DateRange) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Nights shared with `other`, clipped to zero when disjoint.
    pub fn overlapping_nights(&self, other: &DateRange) -> i64 {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        (end - start).num_days().max(0)
    }

    pub fn contains_day(&self, day: NaiveDate) -> bool {
        self.start <= day && day < self.end
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnitStatus {
    Active,
    Inactive,
    Maintenance,
}

/// A rentable unit. Owned by the external unit-management collaborator;
/// the engine only ever reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    pub id: Ulid,
    pub name: String,
    pub capacity_max: u32,
    pub price_per_night: Decimal,
    pub status: UnitStatus,
    pub notes: Option<String>,
}

impl Unit {
    pub fn is_active(&self) -> bool {
        self.status == UnitStatus::Active
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BookingState {
    Pending,
    Confirmed,
    Finalized,
    Cancelled,
}

impl BookingState {
    /// Terminal states accept no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, BookingState::Finalized | BookingState::Cancelled)
    }

    /// Whether a booking in this state blocks its unit's dates.
    pub fn occupies(&self) -> bool {
        !matches!(self, BookingState::Cancelled)
    }
}

impl std::fmt::Display for BookingState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            BookingState::Pending => "pending",
            BookingState::Confirmed => "confirmed",
            BookingState::Finalized => "finalized",
            BookingState::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

/// Where the booking came in from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BookingOrigin {
    Direct,
    Website,
    Phone,
    Partner,
}

/// A reservation of one unit for one date range by one customer.
///
/// `price_per_night` is a snapshot taken from the unit at create/modify
/// time, never read live afterwards. `balance_due` is cached and only
/// ever rewritten from the full payment ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub id: Ulid,
    pub unit_id: Ulid,
    pub customer_id: Ulid,
    pub stay: DateRange,
    pub guest_count: u32,
    pub state: BookingState,
    pub price_per_night: Decimal,
    pub total_amount: Decimal,
    pub deposit_amount: Decimal,
    pub balance_due: Decimal,
    pub origin: BookingOrigin,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Booking {
    pub fn nights(&self) -> i64 {
        self.stay.nights()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentType {
    Deposit,
    Partial,
    Full,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMethod {
    Cash,
    Transfer,
    Card,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentStatus {
    Confirmed,
    PendingVerification,
}

/// One row of the append-only ledger. Once written it is never mutated
/// or deleted; only `Confirmed` rows count toward a booking's balance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: Ulid,
    pub booking_id: Ulid,
    pub paid_at: DateTime<Utc>,
    pub amount: Decimal,
    pub kind: PaymentType,
    pub method: PaymentMethod,
    pub status: PaymentStatus,
    pub notes: Option<String>,
}
