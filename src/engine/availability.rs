use std::collections::HashSet;

use rust_decimal::Decimal;
use serde::Serialize;
use ulid::Ulid;

use crate::model::{DateRange, Unit};
use crate::observability;

use super::conflict::validate_stay;
use super::{Engine, EngineError};

/// Why a unit cannot take the queried stay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Unavailability {
    Occupied,
    CapacityExceeded { max: u32 },
}

impl std::fmt::Display for Unavailability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Unavailability::Occupied => f.write_str("occupied"),
            Unavailability::CapacityExceeded { max } => {
                write!(f, "capacity exceeded: max {max}")
            }
        }
    }
}

/// One candidate unit's verdict for a queried stay, with the price math
/// a caller needs to quote it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnitAvailability {
    pub unit_id: Ulid,
    pub name: String,
    pub capacity_max: u32,
    pub price_per_night: Decimal,
    pub available: bool,
    pub reason: Option<Unavailability>,
    pub nights: i64,
    pub estimated_total: Decimal,
}

/// Classify candidate units against the set of occupied unit ids.
///
/// Pure assembly step: the occupied set comes from one pass over the
/// bookings touching the window, so no per-unit store round trip happens.
pub fn classify_units(
    units: &[Unit],
    occupied: &HashSet<Ulid>,
    stay: &DateRange,
    guest_count: Option<u32>,
) -> Vec<UnitAvailability> {
    let nights = stay.nights();
    units
        .iter()
        .map(|unit| {
            let reason = if occupied.contains(&unit.id) {
                Some(Unavailability::Occupied)
            } else if guest_count.is_some_and(|g| g > unit.capacity_max) {
                Some(Unavailability::CapacityExceeded {
                    max: unit.capacity_max,
                })
            } else {
                None
            };
            UnitAvailability {
                unit_id: unit.id,
                name: unit.name.clone(),
                capacity_max: unit.capacity_max,
                price_per_night: unit.price_per_night,
                available: reason.is_none(),
                reason,
                nights,
                estimated_total: Decimal::from(nights) * unit.price_per_night,
            }
        })
        .collect()
}

impl Engine {
    /// Which active units are free for the stay, and why the rest are not.
    ///
    /// Cancelled bookings never occupy; a booking ending the day another
    /// starts does not block either (half-open ranges).
    pub async fn find_available(
        &self,
        stay: DateRange,
        guest_count: Option<u32>,
    ) -> Result<Vec<UnitAvailability>, EngineError> {
        validate_stay(&stay)?;

        let units = self.units.list_active().await?;
        let occupied: HashSet<Ulid> = self
            .bookings
            .list_overlapping(&stay)
            .await?
            .into_iter()
            .filter(|b| b.state.occupies())
            .map(|b| b.unit_id)
            .collect();

        metrics::counter!(observability::AVAILABILITY_QUERIES_TOTAL).increment(1);
        Ok(classify_units(&units, &occupied, &stay, guest_count))
    }
}
