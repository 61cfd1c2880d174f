//! Shared fixture: a small seeded world with two routes out of Warszawa.
#![allow(dead_code)]

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use voyara_domain::{
    Booking, BookingStatus, Flight, FlightStatus, Hotel, HotelAvailability, Transfer, TransferKind,
};
use voyara_store::MemoryStore;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub const DATE_FROM: (i32, u32, u32) = (2027, 6, 1);
pub const DATE_TO: (i32, u32, u32) = (2027, 6, 7);

pub fn hotel(id: i64, name: &str, city_id: i64, nightly_price: f64, rating: f64) -> Hotel {
    Hotel {
        id,
        name: name.to_string(),
        city_id,
        standard: 4,
        nightly_price,
        capacity: 4,
        rating,
        has_wifi: true,
        has_pool: false,
        has_parking: true,
        has_restaurant: true,
    }
}

pub fn flight(
    id: i64,
    number: &str,
    origin: i64,
    destination: i64,
    on: NaiveDate,
    price: f64,
) -> Flight {
    Flight {
        id,
        flight_number: number.to_string(),
        origin_city_id: origin,
        destination_city_id: destination,
        date: on,
        price,
        status: FlightStatus::Scheduled,
    }
}

pub fn transfer(id: i64, name: &str, city_id: i64, price: f64, rating: f64) -> Transfer {
    Transfer {
        id,
        name: name.to_string(),
        kind: TransferKind::Taxi,
        city_id,
        price,
        rating,
        available: true,
    }
}

pub fn availability(hotel_id: i64, guests: u32) -> HotelAvailability {
    HotelAvailability {
        hotel_id,
        date_from: date(2027, 1, 1),
        date_to: date(2027, 12, 31),
        max_guests: guests,
        is_available: true,
    }
}

pub fn booking_500(store: &MemoryStore) -> Booking {
    store.seed_booking(Booking {
        id: 500,
        status: BookingStatus::Booked,
        hotel_id: 10,
        start_transfer_id: 10,
        end_transfer_id: 11,
        outbound_flight_id: 10,
        return_flight_id: 11,
        start_city_id: 1,
        visited_city_id: 2,
        date_from: date(DATE_FROM.0, DATE_FROM.1, DATE_FROM.2),
        date_to: date(DATE_TO.0, DATE_TO.1, DATE_TO.2),
        guests: 2,
        total_price: 9150.0,
        rating: 5.0,
        discount: None,
        disruption: None,
        parent_booking_id: None,
        created_at: Utc::now(),
    })
}

/// Cities: Warszawa (1), Nowy Jork (2), Paryż (3), Rzym (4). Inventory for
/// the Warszawa -> Nowy Jork route plus a cheaper Paryż fallback for
/// replacement generation.
pub fn seeded_world() -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    let from = date(DATE_FROM.0, DATE_FROM.1, DATE_FROM.2);
    let to = date(DATE_TO.0, DATE_TO.1, DATE_TO.2);

    store.seed_city("Warszawa");
    store.seed_city("Nowy Jork");
    store.seed_city("Paryż");
    store.seed_city("Rzym");

    // Nowy Jork: the disrupted route.
    store.seed_hotel(hotel(10, "Plaza Hotel", 2, 800.0, 5.0));
    store.seed_availability(availability(10, 4));
    store.seed_flight(flight(10, "LOT 001", 1, 2, from, 2000.0));
    store.seed_flight(flight(11, "LOT 002", 2, 1, to, 2000.0));
    store.seed_transfer(transfer(10, "Taxi VIP", 2, 100.0, 5.0));
    store.seed_transfer(transfer(11, "Uber NYC", 2, 250.0, 5.0));

    // Paryż: replacement inventory well under the 9150 ceiling.
    store.seed_hotel(hotel(20, "Hotel Paryż Grand", 3, 600.0, 8.0));
    store.seed_availability(availability(20, 4));
    store.seed_flight(flight(20, "AF 101", 1, 3, from, 1500.0));
    store.seed_flight(flight(21, "AF 102", 3, 1, to, 1500.0));
    store.seed_transfer(transfer(20, "Taxi Paryż Express", 3, 50.0, 9.0));
    store.seed_transfer(transfer(21, "Bus Paryż Public", 3, 15.0, 7.5));

    store
}
