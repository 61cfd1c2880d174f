mod common;

use std::sync::Arc;

use common::*;
use voyara_core::repository::{BookingRepository, EventStore, InventoryStore};
use voyara_core::supplier::{HotelFilters, InventoryAdapter};
use voyara_core::EngineError;
use voyara_domain::BookingStatus;
use voyara_engine::{AlternativeRules, ComposeRules, Engine, SearchRequest};
use voyara_store::MemoryStore;

fn engine(store: &Arc<MemoryStore>) -> Engine {
    let supplier: Arc<dyn InventoryAdapter> = store.clone();
    let bookings: Arc<dyn BookingRepository> = store.clone();
    let inventory: Arc<dyn InventoryStore> = store.clone();
    let events: Arc<dyn EventStore> = store.clone();
    Engine::new(
        supplier,
        bookings,
        inventory,
        events,
        ComposeRules::default(),
        AlternativeRules::default(),
    )
}

fn request(destination: Option<&str>, budget: f64) -> SearchRequest {
    SearchRequest {
        start_city: "Warszawa".into(),
        destination_city: destination.map(str::to_string),
        date_from: date(DATE_FROM.0, DATE_FROM.1, DATE_FROM.2),
        date_to: date(DATE_TO.0, DATE_TO.1, DATE_TO.2),
        guests: 2,
        budget,
        filters: HotelFilters::default(),
    }
}

#[tokio::test]
async fn composes_priced_candidates_sorted_ascending() {
    let store = seeded_world();
    let engine = engine(&store);

    let packages = engine
        .compose_packages(&request(Some("Nowy Jork"), 20000.0))
        .await
        .unwrap();

    // 1 outbound x 1 return x 1 hotel x 2 transfers squared.
    assert_eq!(packages.len(), 4);
    assert!(packages.windows(2).all(|w| w[0].total_price <= w[1].total_price));
    assert_eq!(packages[0].total_price, 9000.0);
    for p in &packages {
        assert_eq!(p.status, BookingStatus::Prepared);
        assert_eq!(p.visited_city_id, 2);
        assert_eq!(p.guests, 2);
        assert_eq!(p.rating, 5.0);
    }
}

#[tokio::test]
async fn repeated_composition_does_not_grow_the_store() {
    let store = seeded_world();
    let engine = engine(&store);
    let req = request(Some("Nowy Jork"), 20000.0);

    let first = engine.compose_packages(&req).await.unwrap();
    let stored_after_first = store
        .count_by_status(BookingStatus::Prepared)
        .await
        .unwrap();

    let second = engine.compose_packages(&req).await.unwrap();
    let stored_after_second = store
        .count_by_status(BookingStatus::Prepared)
        .await
        .unwrap();

    assert_eq!(first.len(), second.len());
    assert_eq!(stored_after_first, stored_after_second);
}

#[tokio::test]
async fn budget_is_a_strict_ceiling_with_equality_included() {
    let store = seeded_world();
    let engine = engine(&store);

    // Combination totals on this route are 9000, 9150, 9150 and 9300.
    let at_cheapest = engine
        .compose_packages(&request(Some("Nowy Jork"), 9000.0))
        .await
        .unwrap();
    assert_eq!(at_cheapest.len(), 1);
    assert_eq!(at_cheapest[0].total_price, 9000.0);

    let below_cheapest = engine
        .compose_packages(&request(Some("Nowy Jork"), 8999.99))
        .await
        .unwrap();
    assert!(below_cheapest.is_empty());
}

#[tokio::test]
async fn unknown_cities_yield_empty_results() {
    let store = seeded_world();
    let engine = engine(&store);

    let unknown_start = SearchRequest {
        start_city: "Atlantyda".into(),
        ..request(Some("Nowy Jork"), 20000.0)
    };
    assert!(engine.compose_packages(&unknown_start).await.unwrap().is_empty());

    let unknown_destination = engine
        .compose_packages(&request(Some("Atlantyda"), 20000.0))
        .await
        .unwrap();
    assert!(unknown_destination.is_empty());
}

#[tokio::test]
async fn missing_inventory_short_circuits_to_no_candidates() {
    let store = seeded_world();
    let engine = engine(&store);

    // Rzym is a known city with no flights, hotels or transfers.
    let packages = engine
        .compose_packages(&request(Some("Rzym"), 20000.0))
        .await
        .unwrap();
    assert!(packages.is_empty());
    assert_eq!(
        store.count_by_status(BookingStatus::Prepared).await.unwrap(),
        0
    );
}

#[tokio::test]
async fn provider_outage_is_not_an_empty_result() {
    let store = seeded_world();
    let engine = engine(&store);
    store.set_supplier_outage(true);

    let result = engine
        .compose_packages(&request(Some("Nowy Jork"), 20000.0))
        .await;
    assert!(matches!(result, Err(EngineError::ServiceUnavailable(_))));
}

#[tokio::test]
async fn open_destination_search_diversifies_across_cities() {
    let store = seeded_world();
    let engine = engine(&store);

    let packages = engine
        .compose_packages(&request(None, 20000.0))
        .await
        .unwrap();

    // Paryż (4 combinations) and Nowy Jork (4) both qualify, but each city
    // is capped at 2 candidates; the cheaper Paryż packages lead.
    assert_eq!(packages.len(), 4);
    assert_eq!(packages[0].visited_city_id, 3);
    assert_eq!(packages[1].visited_city_id, 3);
    assert_eq!(packages[2].visited_city_id, 2);
    assert_eq!(packages[3].visited_city_id, 2);
    assert!(packages.windows(2).all(|w| w[0].total_price <= w[1].total_price));
}

#[tokio::test]
async fn amenity_filters_narrow_hotels() {
    let store = seeded_world();
    let engine = engine(&store);

    let mut req = request(Some("Nowy Jork"), 20000.0);
    req.filters = HotelFilters {
        require_pool: Some(true),
        ..Default::default()
    };

    // The only Nowy Jork hotel has no pool.
    assert!(engine.compose_packages(&req).await.unwrap().is_empty());
}
