//! Booking lifecycle and ledger core for a fixed fleet of short-term
//! rental units.
//!
//! Three concerns live here: overlap-free date-range allocation per unit
//! (half-open `[start, end)` stays, so same-day turnover is allowed), a
//! booking state machine (pending → confirmed → finalized, with
//! cancellation off the first two), and an append-only payment ledger
//! whose sum always agrees with each booking's cached balance. Storage
//! sits behind async traits; [`MemoryStore`] is the bundled
//! implementation, and unit/customer management belongs to external
//! collaborators the engine only reads from.
//!
//! ```
//! use chrono::{Days, Utc};
//! use rust_decimal_macros::dec;
//! use ulid::Ulid;
//!
//! use estadia::{BookingDraft, BookingOrigin, DateRange, Engine, Unit, UnitStatus};
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let (engine, store) = Engine::in_memory();
//!
//! let unit = Unit {
//!     id: Ulid::new(),
//!     name: "Loft 2B".into(),
//!     capacity_max: 3,
//!     price_per_night: dec!(50000),
//!     status: UnitStatus::Active,
//!     notes: None,
//! };
//! let unit_id = unit.id;
//! store.insert_unit(unit);
//! let customer_id = Ulid::new();
//! store.insert_customer(customer_id, "Ana Suárez");
//!
//! let today = Utc::now().date_naive();
//! let booking = engine
//!     .create_booking(BookingDraft {
//!         unit_id,
//!         customer_id,
//!         stay: DateRange::new(today + Days::new(7), today + Days::new(10)),
//!         guest_count: 2,
//!         origin: BookingOrigin::Direct,
//!         notes: None,
//!     })
//!     .await
//!     .unwrap();
//! assert_eq!(booking.total_amount, dec!(150000));
//! assert_eq!(booking.balance_due, dec!(150000));
//! # });
//! ```

pub mod engine;
pub mod model;
pub mod observability;

pub use engine::{
    classify_units, BookingDraft, BookingStore, CustomerDirectory, Engine, EngineError, Entity,
    MemoryStore, MemoryTransaction, OccupancyStats, PaymentDraft, PaymentStore, StoreTransaction,
    TransactionCoordinator, Unavailability, UnitAvailability, UnitStore,
};
pub use model::{
    Booking, BookingOrigin, BookingState, DateRange, Payment, PaymentMethod, PaymentStatus,
    PaymentType, Unit, UnitStatus,
};
