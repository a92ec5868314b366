use rust_decimal::Decimal;
use serde::Serialize;
use ulid::Ulid;

use crate::model::*;

use super::conflict::validate_stay;
use super::{Engine, EngineError};

/// Aggregated occupancy and income figures for a period `[start, end)`.
/// Reporting only; derives everything from booking and payment data and
/// adds no invariants of its own.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OccupancyStats {
    pub period: DateRange,
    /// Occupied / possible nights × 100, rounded to 2 decimals; zero
    /// when there are no units or the period is empty.
    pub occupancy_rate: Decimal,
    pub occupied_nights: i64,
    pub possible_nights: i64,
    pub total_bookings: usize,
    pub pending: usize,
    pub confirmed: usize,
    pub finalized: usize,
    pub cancelled: usize,
    /// Confirmed payments received during the period.
    pub total_income: Decimal,
    pub average_income_per_finalized: Decimal,
}

impl Engine {
    pub async fn occupancy_stats(&self, period: DateRange) -> Result<OccupancyStats, EngineError> {
        validate_stay(&period)?;

        let bookings = self.bookings.list_overlapping(&period).await?;
        let unit_count = self.units.list_all().await?.len() as i64;
        let possible_nights = unit_count * period.nights();

        let mut occupied_nights = 0i64;
        let (mut pending, mut confirmed, mut finalized, mut cancelled) = (0, 0, 0, 0);
        for b in &bookings {
            match b.state {
                BookingState::Pending => pending += 1,
                BookingState::Confirmed => confirmed += 1,
                BookingState::Finalized => finalized += 1,
                BookingState::Cancelled => cancelled += 1,
            }
            // Only stays a guest will actually take count as occupied.
            if matches!(b.state, BookingState::Confirmed | BookingState::Finalized) {
                occupied_nights += b.stay.overlapping_nights(&period);
            }
        }

        let occupancy_rate = if possible_nights > 0 {
            (Decimal::from(occupied_nights) / Decimal::from(possible_nights)
                * Decimal::from(100))
            .round_dp(2)
        } else {
            Decimal::ZERO
        };

        let total_income: Decimal = self
            .payments
            .list_between(period.start, period.end)
            .await?
            .iter()
            .filter(|p| p.status == PaymentStatus::Confirmed)
            .map(|p| p.amount)
            .sum();
        let average_income_per_finalized = if finalized > 0 {
            (total_income / Decimal::from(finalized as u32)).round_dp(2)
        } else {
            Decimal::ZERO
        };

        Ok(OccupancyStats {
            period,
            occupancy_rate,
            occupied_nights,
            possible_nights,
            total_bookings: bookings.len(),
            pending,
            confirmed,
            finalized,
            cancelled,
            total_income,
            average_income_per_finalized,
        })
    }

    /// Non-cancelled bookings on the unit intersecting the period,
    /// ordered by start date — the raw material for a calendar view.
    /// Customer display data is joined at the read boundary by the
    /// caller, not here.
    pub async fn occupancy_calendar(
        &self,
        unit_id: Ulid,
        period: DateRange,
    ) -> Result<Vec<Booking>, EngineError> {
        validate_stay(&period)?;
        let mut bookings: Vec<Booking> = self
            .bookings
            .list_overlapping(&period)
            .await?
            .into_iter()
            .filter(|b| b.unit_id == unit_id && b.state.occupies())
            .collect();
        bookings.sort_by_key(|b| b.stay.start);
        Ok(bookings)
    }
}
