use chrono::Utc;
use rust_decimal::Decimal;
use tracing::info;
use ulid::Ulid;

use crate::model::*;
use crate::observability;

use super::{Engine, EngineError};

/// Input for registering a payment. `paid_at` and `status` are set by
/// the ledger, never by the caller.
#[derive(Debug, Clone)]
pub struct PaymentDraft {
    pub booking_id: Ulid,
    pub amount: Decimal,
    pub kind: PaymentType,
    pub method: PaymentMethod,
    pub notes: Option<String>,
}

impl Engine {
    /// Append a payment and bring the booking's cached balance back in
    /// line with the ledger, as one atomic unit.
    ///
    /// The balance is recomputed from the FULL ledger sum rather than
    /// decremented, so it stays a pure function of ledger state even if
    /// a prior write drifted it. Both writes commit together or neither
    /// does; the transaction guard rolls back on every exit path.
    pub async fn register_payment(&self, draft: PaymentDraft) -> Result<Payment, EngineError> {
        if draft.amount <= Decimal::ZERO {
            return Err(EngineError::Validation("payment amount must be positive"));
        }
        let mut booking = self.fetch_booking(draft.booking_id).await?;
        if booking.state == BookingState::Cancelled {
            return Err(EngineError::BookingCancelled(draft.booking_id));
        }

        let payment = Payment {
            id: Ulid::new(),
            booking_id: draft.booking_id,
            paid_at: Utc::now(),
            amount: draft.amount,
            kind: draft.kind,
            method: draft.method,
            status: PaymentStatus::Confirmed,
            notes: draft.notes.map(|n| n.trim().to_owned()).filter(|n| !n.is_empty()),
        };

        let tx = self.tx.begin().await?;
        match self.apply_payment(&mut booking, &payment).await {
            Ok(()) => tx.commit().await?,
            Err(e) => {
                tx.rollback().await;
                return Err(e);
            }
        }

        metrics::counter!(observability::PAYMENTS_REGISTERED_TOTAL).increment(1);
        info!(
            booking = %payment.booking_id,
            payment = %payment.id,
            amount = %payment.amount,
            balance = %booking.balance_due,
            "payment registered"
        );
        Ok(payment)
    }

    async fn apply_payment(
        &self,
        booking: &mut Booking,
        payment: &Payment,
    ) -> Result<(), EngineError> {
        self.payments.insert(payment.clone()).await?;
        let paid = self.payments.total_confirmed(&booking.id).await?;
        booking.balance_due = booking.total_amount - paid;
        self.bookings.update(booking.clone()).await?;
        Ok(())
    }

    /// Sum of confirmed payments for the booking. Rows awaiting
    /// verification never count.
    pub async fn total_paid(&self, booking_id: Ulid) -> Result<Decimal, EngineError> {
        self.payments.total_confirmed(&booking_id).await
    }
}
