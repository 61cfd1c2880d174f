mod common;

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use common::*;
use voyara_core::repository::{BookingRepository, EventStore, InventoryStore};
use voyara_core::supplier::{HotelFilters, InventoryAdapter};
use voyara_core::SupplierError;
use voyara_domain::{
    Booking, BookingStatus, DisruptionEvent, EventKind, Flight, FlightQuote, Hotel, HotelQuote,
    Severity, Transfer, TransferQuote,
};
use voyara_engine::{
    AlternativeRules, ComposeRules, DisruptionWatchdog, Engine, WatchdogConfig,
};
use voyara_store::{MemoryEventFeed, MemoryStore};

struct Harness {
    store: Arc<MemoryStore>,
    feed: Arc<MemoryEventFeed>,
    engine: Engine,
    watchdog: DisruptionWatchdog,
}

fn harness() -> Harness {
    let store = seeded_world();
    let feed = Arc::new(MemoryEventFeed::new());

    let supplier: Arc<dyn InventoryAdapter> = store.clone();
    let bookings: Arc<dyn BookingRepository> = store.clone();
    let inventory: Arc<dyn InventoryStore> = store.clone();
    let events: Arc<dyn EventStore> = store.clone();

    let engine = Engine::new(
        supplier,
        bookings.clone(),
        inventory.clone(),
        events.clone(),
        ComposeRules::default(),
        AlternativeRules::default(),
    );
    let watchdog = DisruptionWatchdog::new(
        feed.clone(),
        bookings,
        events,
        inventory,
        engine.alternative_generator(),
        WatchdogConfig::default(),
    );

    Harness {
        store,
        feed,
        engine,
        watchdog,
    }
}

fn hotel_event(id: i64, hotel_id: i64) -> DisruptionEvent {
    DisruptionEvent {
        id,
        kind: EventKind::Hotel { hotel_id },
        severity: Severity::High,
        date_from: date(2027, 6, 2),
        date_to: date(2027, 6, 5),
        message: "Hotel closed after pipe burst".into(),
    }
}

#[tokio::test]
async fn hotel_disruption_marks_booking_and_generates_replacements() {
    let h = harness();
    common::booking_500(&h.store);
    h.feed.push(hotel_event(1, 10));

    let (cursor, outcome) = h.watchdog.tick(0).await.unwrap();

    assert_eq!(cursor, 1);
    assert_eq!(outcome.events_seen, 1);
    assert_eq!(outcome.bookings_disrupted, 1);
    assert!(outcome.alternatives_created > 0);

    let original = h.store.get(500).await.unwrap().unwrap();
    assert_eq!(original.status, BookingStatus::Disrupted);
    let stamp = original.disruption.unwrap();
    assert_eq!(stamp.kind, "HOTEL");
    assert_eq!(stamp.severity, Severity::High);

    let children = h.engine.list_alternatives(500).await.unwrap();
    assert!(!children.is_empty());
    for child in &children {
        assert_eq!(child.parent_booking_id, Some(500));
        assert_eq!(child.status, BookingStatus::Prepared);
        assert!(child.total_price <= 9150.0);
        assert!(child.rating >= 5.0);
        assert_ne!(child.visited_city_id, original.visited_city_id);
    }

    // The durable cursor survived the tick.
    assert_eq!(h.store.load_cursor().await.unwrap(), 1);
    assert_eq!(h.engine.count_disrupted().await.unwrap(), 1);
}

#[tokio::test]
async fn feed_outage_skips_the_tick_without_advancing_the_cursor() {
    let h = harness();
    common::booking_500(&h.store);
    h.feed.push(hotel_event(1, 10));
    h.feed.set_outage(true);

    let (cursor, outcome) = h.watchdog.tick(0).await.unwrap();
    assert_eq!(cursor, 0);
    assert_eq!(outcome.events_seen, 0);
    assert_eq!(
        h.store.get(500).await.unwrap().unwrap().status,
        BookingStatus::Booked
    );

    // Next tick sees the event that the failed poll missed.
    h.feed.set_outage(false);
    let (cursor, outcome) = h.watchdog.tick(cursor).await.unwrap();
    assert_eq!(cursor, 1);
    assert_eq!(outcome.bookings_disrupted, 1);
}

#[tokio::test]
async fn cursor_advances_past_irrelevant_events() {
    let h = harness();
    // No booked bookings at all; the event matches nothing.
    h.feed.push(hotel_event(9, 999));

    let (cursor, outcome) = h.watchdog.tick(0).await.unwrap();
    assert_eq!(cursor, 9);
    assert_eq!(outcome.bookings_disrupted, 0);
    assert_eq!(h.store.load_cursor().await.unwrap(), 9);
}

#[tokio::test]
async fn repeat_events_do_not_regenerate_replacements() {
    let h = harness();
    common::booking_500(&h.store);
    h.feed.push(hotel_event(1, 10));
    let (cursor, _) = h.watchdog.tick(0).await.unwrap();
    let children_before = h.engine.list_alternatives(500).await.unwrap().len();

    // A later event for the same hotel: the booking is no longer `booked`,
    // so it does not match, and a direct regeneration request is a no-op.
    h.feed.push(hotel_event(2, 10));
    let (cursor, outcome) = h.watchdog.tick(cursor).await.unwrap();
    assert_eq!(cursor, 2);
    assert_eq!(outcome.bookings_disrupted, 0);

    assert_eq!(h.engine.generate_alternatives(500).await.unwrap(), 0);
    assert_eq!(
        h.engine.list_alternatives(500).await.unwrap().len(),
        children_before
    );
}

#[tokio::test]
async fn flight_disruption_produces_no_replacements_by_design() {
    let h = harness();
    common::booking_500(&h.store);
    h.feed.push(DisruptionEvent {
        id: 1,
        kind: EventKind::Flight { flight_id: 10 },
        severity: Severity::Critical,
        date_from: date(2027, 6, 1),
        date_to: date(2027, 6, 1),
        message: "Flight cancelled".into(),
    });

    let (_, outcome) = h.watchdog.tick(0).await.unwrap();
    assert_eq!(outcome.bookings_disrupted, 1);
    assert_eq!(outcome.alternatives_created, 0);

    let original = h.store.get(500).await.unwrap().unwrap();
    assert_eq!(original.status, BookingStatus::Disrupted);
    assert_eq!(original.disruption.unwrap().kind, "FLIGHT");
    assert!(h.engine.list_alternatives(500).await.unwrap().is_empty());
}

#[tokio::test]
async fn weather_events_are_mirrored_and_block_searches() {
    let h = harness();
    common::booking_500(&h.store);
    h.feed.push(DisruptionEvent {
        id: 1,
        kind: EventKind::Weather {
            city: "Nowy Jork".into(),
        },
        severity: Severity::Critical,
        date_from: date(2027, 6, 2),
        date_to: date(2027, 6, 4),
        message: "Hurricane warning".into(),
    });

    let (_, outcome) = h.watchdog.tick(0).await.unwrap();
    assert_eq!(outcome.bookings_disrupted, 1);

    let blocking = h
        .engine
        .blocking_event("Nowy Jork", date(2027, 6, 1), date(2027, 6, 7))
        .await
        .unwrap()
        .expect("mirrored event should block");
    assert_eq!(blocking.severity, Severity::Critical);
    assert_eq!(blocking.kind, "WEATHER");

    // A different city stays clear.
    assert!(h
        .engine
        .blocking_event("Rzym", date(2027, 6, 1), date(2027, 6, 7))
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn weather_in_another_city_leaves_bookings_alone() {
    let h = harness();
    common::booking_500(&h.store);
    h.feed.push(DisruptionEvent {
        id: 1,
        kind: EventKind::Weather {
            city: "Rzym".into(),
        },
        severity: Severity::Critical,
        date_from: date(2027, 6, 1),
        date_to: date(2027, 6, 7),
        message: "Heatwave".into(),
    });

    let (cursor, outcome) = h.watchdog.tick(0).await.unwrap();
    assert_eq!(cursor, 1);
    assert_eq!(outcome.bookings_disrupted, 0);
    assert_eq!(
        h.store.get(500).await.unwrap().unwrap().status,
        BookingStatus::Booked
    );
}

#[tokio::test]
async fn accepting_a_replacement_swaps_the_bookings() {
    let h = harness();
    common::booking_500(&h.store);
    h.feed.push(hotel_event(1, 10));
    h.watchdog.tick(0).await.unwrap();

    let children = h.engine.list_alternatives(500).await.unwrap();
    let cheapest = children.first().expect("replacements were generated");

    let accepted = h.engine.accept_alternative(500, cheapest.id).await.unwrap();
    assert_eq!(accepted.status, BookingStatus::Booked);
    assert_eq!(accepted.parent_booking_id, Some(500));
    assert_eq!(
        h.store.get(500).await.unwrap().unwrap().status,
        BookingStatus::Cancelled
    );

    // Once the original is cancelled there is nothing left to list.
    assert!(h.engine.list_alternatives(500).await.unwrap().is_empty());
}

#[tokio::test]
async fn risk_acceptance_and_cancellation_after_disruption() {
    let h = harness();
    common::booking_500(&h.store);
    h.feed.push(hotel_event(1, 10));
    h.watchdog.tick(0).await.unwrap();

    h.engine.accept_risk(500).await.unwrap();
    assert_eq!(
        h.store.get(500).await.unwrap().unwrap().status,
        BookingStatus::RiskAccepted
    );

    h.engine.cancel_booking(500).await.unwrap();
    assert_eq!(
        h.store.get(500).await.unwrap().unwrap().status,
        BookingStatus::Cancelled
    );
}

/// Delegating adapter that simulates a provider outage for a single
/// candidate city's quotes.
struct CityOutageAdapter {
    inner: Arc<MemoryStore>,
    failing_city: String,
}

impl CityOutageAdapter {
    fn check(&self, city: &str) -> Result<(), SupplierError> {
        if city.eq_ignore_ascii_case(&self.failing_city) {
            Err(SupplierError::Unavailable("city endpoint down".into()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl InventoryAdapter for CityOutageAdapter {
    async fn list_outbound_flights(
        &self,
        origin_city: &str,
        date: NaiveDate,
        destination_city: Option<&str>,
    ) -> Result<Vec<Flight>, SupplierError> {
        self.inner
            .list_outbound_flights(origin_city, date, destination_city)
            .await
    }

    async fn list_return_flights(
        &self,
        destination_city: &str,
        date: NaiveDate,
    ) -> Result<Vec<Flight>, SupplierError> {
        self.inner.list_return_flights(destination_city, date).await
    }

    async fn list_hotels(
        &self,
        cities: &[String],
        filters: &HotelFilters,
    ) -> Result<Vec<Hotel>, SupplierError> {
        self.inner.list_hotels(cities, filters).await
    }

    async fn list_available_hotel_ids(
        &self,
        date_from: NaiveDate,
        date_to: NaiveDate,
        guests: u32,
    ) -> Result<HashSet<i64>, SupplierError> {
        self.inner
            .list_available_hotel_ids(date_from, date_to, guests)
            .await
    }

    async fn list_transfers(&self, cities: &[String]) -> Result<Vec<Transfer>, SupplierError> {
        self.inner.list_transfers(cities).await
    }

    async fn quote_hotels(
        &self,
        city: &str,
        date_from: NaiveDate,
        date_to: NaiveDate,
        guests: u32,
    ) -> Result<Vec<HotelQuote>, SupplierError> {
        self.check(city)?;
        self.inner.quote_hotels(city, date_from, date_to, guests).await
    }

    async fn quote_flights(
        &self,
        origin_city: &str,
        destination_city: &str,
        date: NaiveDate,
    ) -> Result<Vec<FlightQuote>, SupplierError> {
        self.check(destination_city)?;
        self.inner
            .quote_flights(origin_city, destination_city, date)
            .await
    }

    async fn quote_transfers(&self, city: &str) -> Result<Vec<TransferQuote>, SupplierError> {
        self.check(city)?;
        self.inner.quote_transfers(city).await
    }
}

#[tokio::test]
async fn one_failing_candidate_city_does_not_abort_generation() {
    let store = seeded_world();
    let feed = Arc::new(MemoryEventFeed::new());
    common::booking_500(&store);

    // Rzym inventory exists this time, so it can stand in for Paryż.
    let from = date(DATE_FROM.0, DATE_FROM.1, DATE_FROM.2);
    let to = date(DATE_TO.0, DATE_TO.1, DATE_TO.2);
    store.seed_hotel(common::hotel(30, "Hotel Rzym Colosseo", 4, 500.0, 7.0));
    store.seed_availability(common::availability(30, 4));
    store.seed_flight(common::flight(30, "AZ 301", 1, 4, from, 1200.0));
    store.seed_flight(common::flight(31, "AZ 302", 4, 1, to, 1200.0));
    store.seed_transfer(common::transfer(30, "Taxi Roma", 4, 40.0, 8.0));

    let supplier: Arc<dyn InventoryAdapter> = Arc::new(CityOutageAdapter {
        inner: store.clone(),
        failing_city: "Paryż".into(),
    });
    let bookings: Arc<dyn BookingRepository> = store.clone();
    let inventory: Arc<dyn InventoryStore> = store.clone();
    let events: Arc<dyn EventStore> = store.clone();
    let engine = Engine::new(
        supplier,
        bookings.clone(),
        inventory.clone(),
        events.clone(),
        ComposeRules::default(),
        AlternativeRules::default(),
    );
    let watchdog = DisruptionWatchdog::new(
        feed.clone(),
        bookings,
        events,
        inventory,
        engine.alternative_generator(),
        WatchdogConfig::default(),
    );

    feed.push(hotel_event(1, 10));
    let (_, outcome) = watchdog.tick(0).await.unwrap();
    assert_eq!(outcome.bookings_disrupted, 1);
    assert!(outcome.alternatives_created > 0);

    // Every replacement came from Rzym; the failing Paryż was skipped, not
    // fatal.
    let children = engine.list_alternatives(500).await.unwrap();
    assert!(!children.is_empty());
    assert!(children.iter().all(|c: &Booking| c.visited_city_id == 4));
}
