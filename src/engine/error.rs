use rust_decimal::Decimal;
use ulid::Ulid;

use crate::model::BookingState;

/// Which entity a lookup failed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Unit,
    Customer,
    Booking,
}

impl std::fmt::Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Entity::Unit => "unit",
            Entity::Customer => "customer",
            Entity::Booking => "booking",
        };
        f.write_str(s)
    }
}

#[derive(Debug)]
pub enum EngineError {
    NotFound(Entity, Ulid),
    InvalidDateRange(&'static str),
    Validation(&'static str),
    OverlapConflict { unit_id: Ulid },
    UnitUnavailable(Ulid),
    CapacityExceeded { requested: u32, max: u32 },
    InvalidTransition { from: BookingState, action: &'static str },
    InsufficientPayment { balance: Decimal },
    BookingCancelled(Ulid),
    TransactionFailure(String),
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::NotFound(entity, id) => write!(f, "{entity} not found: {id}"),
            EngineError::InvalidDateRange(msg) => write!(f, "invalid date range: {msg}"),
            EngineError::Validation(msg) => write!(f, "validation failed: {msg}"),
            EngineError::OverlapConflict { unit_id } => {
                write!(f, "dates overlap an existing booking on unit {unit_id}")
            }
            EngineError::UnitUnavailable(id) => write!(f, "unit {id} is not active"),
            EngineError::CapacityExceeded { requested, max } => {
                write!(f, "guest count {requested} exceeds unit capacity {max}")
            }
            EngineError::InvalidTransition { from, action } => {
                write!(f, "cannot {action} a {from} booking")
            }
            EngineError::InsufficientPayment { balance } => {
                write!(f, "balance due {balance} must be settled before finalizing")
            }
            EngineError::BookingCancelled(id) => write!(f, "booking {id} is cancelled"),
            EngineError::TransactionFailure(e) => write!(f, "ledger transaction failed: {e}"),
        }
    }
}

impl std::error::Error for EngineError {}
