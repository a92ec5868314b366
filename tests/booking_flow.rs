//! End-to-end walk through one unit's season: quote, book, pay a
//! deposit, confirm, settle, finalize, and free the dates again by
//! cancelling a later booking.

use chrono::{Days, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use ulid::Ulid;

use estadia::{
    BookingDraft, BookingOrigin, BookingState, DateRange, Engine, PaymentDraft, PaymentMethod,
    PaymentType, Unavailability, Unit, UnitStatus,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

#[tokio::test]
async fn full_booking_lifecycle() {
    init_tracing();

    let (engine, store) = Engine::in_memory();
    let unit = Unit {
        id: Ulid::new(),
        name: "Cabaña Sur".into(),
        capacity_max: 4,
        price_per_night: dec!(80000),
        status: UnitStatus::Active,
        notes: None,
    };
    let unit_id = unit.id;
    store.insert_unit(unit);
    let customer_id = Ulid::new();
    store.insert_customer(customer_id, "Marta Giménez");

    let today = Utc::now().date_naive();
    let stay = DateRange::new(today + Days::new(14), today + Days::new(18));

    // the unit quotes as free for the stay
    let quotes = engine.find_available(stay, Some(3)).await.unwrap();
    let quote = quotes.iter().find(|q| q.unit_id == unit_id).unwrap();
    assert!(quote.available);
    assert_eq!(quote.nights, 4);
    assert_eq!(quote.estimated_total, dec!(320000));

    // book it
    let booking = engine
        .create_booking(BookingDraft {
            unit_id,
            customer_id,
            stay,
            guest_count: 3,
            origin: BookingOrigin::Website,
            notes: Some("arriving after 20:00".into()),
        })
        .await
        .unwrap();
    assert_eq!(booking.state, BookingState::Pending);
    assert_eq!(booking.total_amount, dec!(320000));
    assert_eq!(booking.balance_due, dec!(320000));

    // the same dates now quote as occupied
    let quotes = engine.find_available(stay, None).await.unwrap();
    let quote = quotes.iter().find(|q| q.unit_id == unit_id).unwrap();
    assert!(!quote.available);
    assert_eq!(quote.reason, Some(Unavailability::Occupied));

    // deposit, then confirm
    engine
        .register_payment(PaymentDraft {
            booking_id: booking.id,
            amount: dec!(120000),
            kind: PaymentType::Deposit,
            method: PaymentMethod::Transfer,
            notes: None,
        })
        .await
        .unwrap();
    let confirmed = engine.confirm_booking(booking.id).await.unwrap();
    assert_eq!(confirmed.state, BookingState::Confirmed);
    assert_eq!(confirmed.balance_due, dec!(200000));

    // checkout day: finalize fails while money is still owed
    let denied = engine.finalize_booking(booking.id).await;
    assert!(denied.is_err());

    // settle the rest in cash, then finalize
    engine
        .register_payment(PaymentDraft {
            booking_id: booking.id,
            amount: dec!(200000),
            kind: PaymentType::Full,
            method: PaymentMethod::Cash,
            notes: Some("settled at checkout".into()),
        })
        .await
        .unwrap();
    let finalized = engine.finalize_booking(booking.id).await.unwrap();
    assert_eq!(finalized.state, BookingState::Finalized);
    assert_eq!(finalized.balance_due, Decimal::ZERO);

    // ledger holds both rows; newest first
    let ledger = engine.payments_for_booking(booking.id).await.unwrap();
    assert_eq!(ledger.len(), 2);
    assert_eq!(engine.total_paid(booking.id).await.unwrap(), dec!(320000));

    // a later booking frees its dates when cancelled
    let next_stay = DateRange::new(today + Days::new(20), today + Days::new(23));
    let next = engine
        .create_booking(BookingDraft {
            unit_id,
            customer_id,
            stay: next_stay,
            guest_count: 2,
            origin: BookingOrigin::Phone,
            notes: None,
        })
        .await
        .unwrap();
    let quotes = engine.find_available(next_stay, None).await.unwrap();
    assert!(!quotes.iter().find(|q| q.unit_id == unit_id).unwrap().available);

    engine
        .cancel_booking(next.id, Some("plans changed"))
        .await
        .unwrap();
    let quotes = engine.find_available(next_stay, None).await.unwrap();
    assert!(quotes.iter().find(|q| q.unit_id == unit_id).unwrap().available);

    // season report: the finalized stay is the only occupancy
    let season = DateRange::new(today, today + Days::new(30));
    let stats = engine.occupancy_stats(season).await.unwrap();
    assert_eq!(stats.possible_nights, 30);
    assert_eq!(stats.occupied_nights, 4);
    assert_eq!(stats.finalized, 1);
    assert_eq!(stats.cancelled, 1);
    assert_eq!(stats.total_income, dec!(320000));
    assert_eq!(stats.average_income_per_finalized, dec!(320000));
}
