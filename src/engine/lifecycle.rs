use chrono::Utc;
use rust_decimal::Decimal;
use tracing::{info, warn};
use ulid::Ulid;

use crate::model::*;
use crate::observability;

use super::conflict::{check_capacity, check_unit_active, validate_future_stay, validate_stay};
use super::error::Entity;
use super::{Engine, EngineError};

/// The caller-editable booking fields. Used for both create and modify;
/// format validation (lengths, shapes) happens upstream of the engine.
#[derive(Debug, Clone)]
pub struct BookingDraft {
    pub unit_id: Ulid,
    pub customer_id: Ulid,
    pub stay: DateRange,
    pub guest_count: u32,
    pub origin: BookingOrigin,
    pub notes: Option<String>,
}

fn trimmed(notes: Option<String>) -> Option<String> {
    notes.map(|n| n.trim().to_owned()).filter(|n| !n.is_empty())
}

impl Engine {
    /// Create a booking in `Pending` state, snapshotting the unit's
    /// current nightly price.
    pub async fn create_booking(&self, draft: BookingDraft) -> Result<Booking, EngineError> {
        validate_future_stay(&draft.stay)?;

        let unit = self
            .units
            .get(&draft.unit_id)
            .await?
            .ok_or(EngineError::NotFound(Entity::Unit, draft.unit_id))?;
        check_unit_active(&unit)?;
        if !self.customers.exists(&draft.customer_id).await? {
            return Err(EngineError::NotFound(Entity::Customer, draft.customer_id));
        }
        check_capacity(&unit, draft.guest_count)?;

        // The overlap check and the insert are not one atomic unit: two
        // concurrent creates for the same unit and dates can both pass the
        // check. Acceptable at single-operator concurrency; a store-level
        // exclusion constraint on (unit, stay) would close it.
        if self
            .bookings
            .has_overlap(draft.unit_id, &draft.stay, None)
            .await?
        {
            warn!(unit = %draft.unit_id, "booking rejected: dates overlap an existing booking");
            metrics::counter!(observability::REJECTIONS_TOTAL, "rule" => "overlap").increment(1);
            return Err(EngineError::OverlapConflict {
                unit_id: draft.unit_id,
            });
        }

        let nights = draft.stay.nights();
        let total = Decimal::from(nights) * unit.price_per_night;
        let booking = Booking {
            id: Ulid::new(),
            unit_id: draft.unit_id,
            customer_id: draft.customer_id,
            stay: draft.stay,
            guest_count: draft.guest_count,
            state: BookingState::Pending,
            price_per_night: unit.price_per_night,
            total_amount: total,
            deposit_amount: Decimal::ZERO,
            balance_due: total,
            origin: draft.origin,
            notes: trimmed(draft.notes),
            created_at: Utc::now(),
        };
        self.bookings.insert(booking.clone()).await?;

        metrics::counter!(observability::BOOKINGS_CREATED_TOTAL).increment(1);
        info!(booking = %booking.id, unit = %booking.unit_id, nights, "booking created");
        Ok(booking)
    }

    /// Rewrite a booking's editable fields, re-running every creation
    /// check (excluding the booking itself from the overlap scan).
    ///
    /// The price snapshot and total are recomputed from the unit's
    /// CURRENT price, and the balance is re-derived from the ledger —
    /// never adjusted incrementally. State, deposit and created_at are
    /// preserved.
    pub async fn modify_booking(
        &self,
        booking_id: Ulid,
        draft: BookingDraft,
    ) -> Result<Booking, EngineError> {
        validate_stay(&draft.stay)?;

        let mut booking = self.fetch_booking(booking_id).await?;
        if booking.state.is_terminal() {
            return Err(EngineError::InvalidTransition {
                from: booking.state,
                action: "modify",
            });
        }

        let unit = self
            .units
            .get(&draft.unit_id)
            .await?
            .ok_or(EngineError::NotFound(Entity::Unit, draft.unit_id))?;
        check_unit_active(&unit)?;
        if !self.customers.exists(&draft.customer_id).await? {
            return Err(EngineError::NotFound(Entity::Customer, draft.customer_id));
        }
        check_capacity(&unit, draft.guest_count)?;

        if self
            .bookings
            .has_overlap(draft.unit_id, &draft.stay, Some(booking_id))
            .await?
        {
            warn!(booking = %booking_id, unit = %draft.unit_id, "modification rejected: dates overlap");
            metrics::counter!(observability::REJECTIONS_TOTAL, "rule" => "overlap").increment(1);
            return Err(EngineError::OverlapConflict {
                unit_id: draft.unit_id,
            });
        }

        booking.unit_id = draft.unit_id;
        booking.customer_id = draft.customer_id;
        booking.stay = draft.stay;
        booking.guest_count = draft.guest_count;
        booking.origin = draft.origin;
        booking.notes = trimmed(draft.notes);

        booking.price_per_night = unit.price_per_night;
        booking.total_amount = Decimal::from(draft.stay.nights()) * unit.price_per_night;
        let paid = self.payments.total_confirmed(&booking_id).await?;
        booking.balance_due = booking.total_amount - paid;

        self.bookings.update(booking.clone()).await?;
        info!(booking = %booking_id, "booking modified");
        Ok(booking)
    }

    /// Pending → Confirmed. Re-confirming is rejected, not silently
    /// accepted.
    pub async fn confirm_booking(&self, booking_id: Ulid) -> Result<Booking, EngineError> {
        let mut booking = self.fetch_booking(booking_id).await?;
        match booking.state {
            BookingState::Cancelled => return Err(EngineError::BookingCancelled(booking_id)),
            BookingState::Confirmed | BookingState::Finalized => {
                return Err(EngineError::InvalidTransition {
                    from: booking.state,
                    action: "confirm",
                });
            }
            BookingState::Pending => {}
        }

        booking.state = BookingState::Confirmed;
        self.bookings.update(booking.clone()).await?;
        info!(booking = %booking_id, "booking confirmed");
        Ok(booking)
    }

    /// Pending|Confirmed → Cancelled. A reason is appended to the notes
    /// as a `CANCELLED:` suffix, keeping whatever was there before.
    pub async fn cancel_booking(
        &self,
        booking_id: Ulid,
        reason: Option<&str>,
    ) -> Result<Booking, EngineError> {
        let mut booking = self.fetch_booking(booking_id).await?;
        if booking.state.is_terminal() {
            return Err(EngineError::InvalidTransition {
                from: booking.state,
                action: "cancel",
            });
        }

        booking.state = BookingState::Cancelled;
        if let Some(reason) = reason.map(str::trim).filter(|r| !r.is_empty()) {
            booking.notes = Some(match booking.notes.take().filter(|n| !n.trim().is_empty()) {
                Some(prior) => format!("{prior}\n\nCANCELLED: {reason}"),
                None => format!("CANCELLED: {reason}"),
            });
        }
        self.bookings.update(booking.clone()).await?;

        metrics::counter!(observability::BOOKINGS_CANCELLED_TOTAL).increment(1);
        info!(booking = %booking_id, "booking cancelled");
        Ok(booking)
    }

    /// Confirmed → Finalized, only once the ledger covers the full
    /// amount.
    pub async fn finalize_booking(&self, booking_id: Ulid) -> Result<Booking, EngineError> {
        let mut booking = self.fetch_booking(booking_id).await?;
        match booking.state {
            BookingState::Cancelled => return Err(EngineError::BookingCancelled(booking_id)),
            BookingState::Pending | BookingState::Finalized => {
                return Err(EngineError::InvalidTransition {
                    from: booking.state,
                    action: "finalize",
                });
            }
            BookingState::Confirmed => {}
        }
        if booking.balance_due > Decimal::ZERO {
            warn!(booking = %booking_id, balance = %booking.balance_due, "finalize rejected: balance outstanding");
            metrics::counter!(observability::REJECTIONS_TOTAL, "rule" => "insufficient_payment")
                .increment(1);
            return Err(EngineError::InsufficientPayment {
                balance: booking.balance_due,
            });
        }

        booking.state = BookingState::Finalized;
        self.bookings.update(booking.clone()).await?;

        metrics::counter!(observability::BOOKINGS_FINALIZED_TOTAL).increment(1);
        info!(booking = %booking_id, "booking finalized");
        Ok(booking)
    }
}
