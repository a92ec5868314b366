use chrono::{NaiveDate, Utc};

use crate::model::{DateRange, Unit};

use super::EngineError;

pub(crate) fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// The half-open range must cover at least one night.
pub(crate) fn validate_stay(stay: &DateRange) -> Result<(), EngineError> {
    if stay.start >= stay.end {
        return Err(EngineError::InvalidDateRange("start must be before end"));
    }
    Ok(())
}

/// New bookings must additionally not start in the past.
pub(crate) fn validate_future_stay(stay: &DateRange) -> Result<(), EngineError> {
    validate_stay(stay)?;
    if stay.start < today() {
        return Err(EngineError::InvalidDateRange("start must not be in the past"));
    }
    Ok(())
}

pub(crate) fn check_unit_active(unit: &Unit) -> Result<(), EngineError> {
    if !unit.is_active() {
        return Err(EngineError::UnitUnavailable(unit.id));
    }
    Ok(())
}

pub(crate) fn check_capacity(unit: &Unit, guest_count: u32) -> Result<(), EngineError> {
    if guest_count > unit.capacity_max {
        return Err(EngineError::CapacityExceeded {
            requested: guest_count,
            max: unit.capacity_max,
        });
    }
    Ok(())
}
