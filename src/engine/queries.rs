use chrono::NaiveDate;
use rust_decimal::Decimal;
use ulid::Ulid;

use crate::model::*;

use super::{Engine, EngineError};

/// Read-side listings for the operational screens: per-unit and
/// per-customer history, today's arrivals/departures, outstanding
/// balances, and the cash report. Ordering is guaranteed here so every
/// store backend behaves the same.
impl Engine {
    pub async fn get_booking(&self, booking_id: Ulid) -> Result<Booking, EngineError> {
        self.fetch_booking(booking_id).await
    }

    /// Booking history of one unit, newest stay first.
    pub async fn bookings_for_unit(&self, unit_id: Ulid) -> Result<Vec<Booking>, EngineError> {
        let mut bookings = self.bookings.list_by_unit(unit_id).await?;
        bookings.sort_by(|a, b| b.stay.start.cmp(&a.stay.start));
        Ok(bookings)
    }

    /// Booking history of one customer, newest stay first.
    pub async fn bookings_for_customer(
        &self,
        customer_id: Ulid,
    ) -> Result<Vec<Booking>, EngineError> {
        let mut bookings = self.bookings.list_by_customer(customer_id).await?;
        bookings.sort_by(|a, b| b.stay.start.cmp(&a.stay.start));
        Ok(bookings)
    }

    /// Pending and confirmed bookings, soonest stay first.
    pub async fn active_bookings(&self) -> Result<Vec<Booking>, EngineError> {
        let mut bookings: Vec<Booking> = self
            .bookings
            .list_all()
            .await?
            .into_iter()
            .filter(|b| {
                matches!(b.state, BookingState::Pending | BookingState::Confirmed)
            })
            .collect();
        bookings.sort_by_key(|b| b.stay.start);
        Ok(bookings)
    }

    /// Arrivals: pending or confirmed bookings starting on `date`.
    pub async fn check_ins_on(&self, date: NaiveDate) -> Result<Vec<Booking>, EngineError> {
        let mut bookings: Vec<Booking> = self
            .bookings
            .list_all()
            .await?
            .into_iter()
            .filter(|b| {
                b.stay.start == date
                    && matches!(b.state, BookingState::Pending | BookingState::Confirmed)
            })
            .collect();
        bookings.sort_by_key(|b| b.unit_id);
        Ok(bookings)
    }

    /// Departures: confirmed bookings ending on `date`.
    pub async fn check_outs_on(&self, date: NaiveDate) -> Result<Vec<Booking>, EngineError> {
        let mut bookings: Vec<Booking> = self
            .bookings
            .list_all()
            .await?
            .into_iter()
            .filter(|b| b.stay.end == date && b.state == BookingState::Confirmed)
            .collect();
        bookings.sort_by_key(|b| b.unit_id);
        Ok(bookings)
    }

    /// Non-cancelled bookings still owing money, soonest stay first.
    pub async fn bookings_with_balance(&self) -> Result<Vec<Booking>, EngineError> {
        let mut bookings: Vec<Booking> = self
            .bookings
            .list_all()
            .await?
            .into_iter()
            .filter(|b| b.state.occupies() && b.balance_due > Decimal::ZERO)
            .collect();
        bookings.sort_by_key(|b| b.stay.start);
        Ok(bookings)
    }

    /// Full payment history of one booking, newest first.
    pub async fn payments_for_booking(
        &self,
        booking_id: Ulid,
    ) -> Result<Vec<Payment>, EngineError> {
        let mut payments = self.payments.list_by_booking(&booking_id).await?;
        payments.sort_by(|a, b| b.paid_at.cmp(&a.paid_at));
        Ok(payments)
    }

    /// Cash report: payments received in `[from, to)`, oldest first.
    pub async fn payments_between(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Payment>, EngineError> {
        let mut payments = self.payments.list_between(from, to).await?;
        payments.sort_by_key(|p| p.paid_at);
        Ok(payments)
    }
}
