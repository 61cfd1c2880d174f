//! In-memory implementations of the store and supplier seams.
//!
//! Backs the test suites and local runs without a database. Behaviour
//! mirrors the Postgres implementations: id assignment, natural-key
//! upserts, and the non-cancelled 5-tuple uniqueness guard.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::NaiveDate;

use voyara_catalog::filters::hotel_matches;
use voyara_core::repository::{BookingRepository, EventStore, InventoryStore};
use voyara_core::supplier::{EventFeed, HotelFilters, InventoryAdapter};
use voyara_core::{StoreError, SupplierError};
use voyara_domain::{
    Booking, BookingStatus, City, DisruptionEvent, DisruptionStamp, EventRecord, Flight,
    FlightQuote, FlightStatus, Hotel, HotelAvailability, HotelQuote, PackageKey, Transfer,
    TransferQuote,
};
use voyara_shared::ids::{BookingId, CityId, EventId, FlightId, HotelId, TransferId};

#[derive(Default)]
struct Inner {
    cities: Vec<City>,
    hotels: HashMap<HotelId, Hotel>,
    flights: HashMap<FlightId, Flight>,
    transfers: HashMap<TransferId, Transfer>,
    availability: Vec<HotelAvailability>,
    bookings: HashMap<BookingId, Booking>,
    event_records: Vec<EventRecord>,
    cursor: EventId,
}

impl Inner {
    fn next_id<T>(map: &HashMap<i64, T>) -> i64 {
        map.keys().max().copied().unwrap_or(0) + 1
    }

    fn city_id(&self, name: &str) -> Option<CityId> {
        self.cities
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
            .map(|c| c.id)
    }
}

/// One shared in-memory world implementing every repository trait plus the
/// inventory adapter over its own mirror.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
    supplier_outage: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every inventory-adapter call fail with a transient
    /// provider-unavailable error until cleared.
    pub fn set_supplier_outage(&self, outage: bool) {
        self.supplier_outage.store(outage, Ordering::SeqCst);
    }

    fn check_outage(&self) -> Result<(), SupplierError> {
        if self.supplier_outage.load(Ordering::SeqCst) {
            Err(SupplierError::Unavailable("simulated outage".into()))
        } else {
            Ok(())
        }
    }

    pub fn seed_city(&self, name: &str) -> City {
        let mut inner = self.inner.lock().unwrap();
        let id = inner.cities.iter().map(|c| c.id).max().unwrap_or(0) + 1;
        let city = City {
            id,
            name: name.to_string(),
            description: None,
        };
        inner.cities.push(city.clone());
        city
    }

    /// Insert a hotel; an id of 0 is replaced with the next free id.
    pub fn seed_hotel(&self, mut hotel: Hotel) -> Hotel {
        let mut inner = self.inner.lock().unwrap();
        if hotel.id == 0 {
            hotel.id = Inner::next_id(&inner.hotels);
        }
        inner.hotels.insert(hotel.id, hotel.clone());
        hotel
    }

    pub fn seed_flight(&self, mut flight: Flight) -> Flight {
        let mut inner = self.inner.lock().unwrap();
        if flight.id == 0 {
            flight.id = Inner::next_id(&inner.flights);
        }
        inner.flights.insert(flight.id, flight.clone());
        flight
    }

    pub fn seed_transfer(&self, mut transfer: Transfer) -> Transfer {
        let mut inner = self.inner.lock().unwrap();
        if transfer.id == 0 {
            transfer.id = Inner::next_id(&inner.transfers);
        }
        inner.transfers.insert(transfer.id, transfer.clone());
        transfer
    }

    pub fn seed_availability(&self, availability: HotelAvailability) {
        self.inner.lock().unwrap().availability.push(availability);
    }

    /// Insert a booking honouring its id, for fixtures that pin ids.
    pub fn seed_booking(&self, mut booking: Booking) -> Booking {
        let mut inner = self.inner.lock().unwrap();
        if booking.id == 0 {
            booking.id = Inner::next_id(&inner.bookings);
        }
        inner.bookings.insert(booking.id, booking.clone());
        booking
    }
}

#[async_trait]
impl BookingRepository for MemoryStore {
    async fn create(&self, mut booking: Booking) -> Result<Booking, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        booking.id = Inner::next_id(&inner.bookings);
        inner.bookings.insert(booking.id, booking.clone());
        Ok(booking)
    }

    async fn create_batch(&self, bookings: Vec<Booking>) -> Result<Vec<Booking>, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let mut created = Vec::with_capacity(bookings.len());
        for mut booking in bookings {
            booking.id = Inner::next_id(&inner.bookings);
            inner.bookings.insert(booking.id, booking.clone());
            created.push(booking);
        }
        Ok(created)
    }

    async fn get(&self, id: BookingId) -> Result<Option<Booking>, StoreError> {
        Ok(self.inner.lock().unwrap().bookings.get(&id).cloned())
    }

    async fn list_by_status(&self, status: BookingStatus) -> Result<Vec<Booking>, StoreError> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .bookings
            .values()
            .filter(|b| b.status == status)
            .cloned()
            .collect())
    }

    async fn list_children(
        &self,
        parent_id: BookingId,
        status: BookingStatus,
    ) -> Result<Vec<Booking>, StoreError> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .bookings
            .values()
            .filter(|b| b.parent_booking_id == Some(parent_id) && b.status == status)
            .cloned()
            .collect())
    }

    async fn find_by_combination(
        &self,
        key: &PackageKey,
    ) -> Result<Option<Booking>, StoreError> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .bookings
            .values()
            .find(|b| b.status != BookingStatus::Cancelled && b.key() == *key)
            .cloned())
    }

    async fn update_status(&self, id: BookingId, status: BookingStatus) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let booking = inner
            .bookings
            .get_mut(&id)
            .ok_or_else(|| StoreError::unknown("booking", id))?;
        booking.status = status;
        Ok(())
    }

    async fn mark_disrupted(
        &self,
        id: BookingId,
        stamp: DisruptionStamp,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let booking = inner
            .bookings
            .get_mut(&id)
            .ok_or_else(|| StoreError::unknown("booking", id))?;
        booking.status = BookingStatus::Disrupted;
        booking.disruption = Some(stamp);
        Ok(())
    }

    async fn count_by_status(&self, status: BookingStatus) -> Result<u64, StoreError> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .bookings
            .values()
            .filter(|b| b.status == status)
            .count() as u64)
    }
}

#[async_trait]
impl EventStore for MemoryStore {
    async fn record(&self, event: EventRecord) -> Result<(), StoreError> {
        self.inner.lock().unwrap().event_records.push(event);
        Ok(())
    }

    async fn blocking_event(
        &self,
        city: &str,
        date_from: NaiveDate,
        date_to: NaiveDate,
    ) -> Result<Option<EventRecord>, StoreError> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .event_records
            .iter()
            .filter(|e| {
                e.severity.is_blocking()
                    && e.city.eq_ignore_ascii_case(city)
                    && e.date_from <= date_to
                    && e.date_to >= date_from
            })
            .max_by_key(|e| e.severity)
            .cloned())
    }

    async fn load_cursor(&self) -> Result<EventId, StoreError> {
        Ok(self.inner.lock().unwrap().cursor)
    }

    async fn save_cursor(&self, cursor: EventId) -> Result<(), StoreError> {
        self.inner.lock().unwrap().cursor = cursor;
        Ok(())
    }
}

#[async_trait]
impl InventoryStore for MemoryStore {
    async fn city(&self, id: CityId) -> Result<Option<City>, StoreError> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .cities
            .iter()
            .find(|c| c.id == id)
            .cloned())
    }

    async fn city_by_name(&self, name: &str) -> Result<Option<City>, StoreError> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .cities
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
            .cloned())
    }

    async fn list_cities(&self) -> Result<Vec<City>, StoreError> {
        Ok(self.inner.lock().unwrap().cities.clone())
    }

    async fn candidate_cities(
        &self,
        exclude: CityId,
        limit: usize,
    ) -> Result<Vec<City>, StoreError> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .cities
            .iter()
            .filter(|c| c.id != exclude)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn upsert_hotel(&self, quote: &HotelQuote, city_id: CityId) -> Result<Hotel, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(existing) = inner.hotels.values_mut().find(|h| h.name == quote.name) {
            existing.nightly_price = quote.nightly_price;
            existing.rating = quote.rating;
            return Ok(existing.clone());
        }
        let hotel = Hotel {
            id: Inner::next_id(&inner.hotels),
            name: quote.name.clone(),
            city_id,
            standard: quote.standard,
            nightly_price: quote.nightly_price,
            capacity: quote.capacity,
            rating: quote.rating,
            has_wifi: quote.has_wifi,
            has_pool: quote.has_pool,
            has_parking: quote.has_parking,
            has_restaurant: quote.has_restaurant,
        };
        inner.hotels.insert(hotel.id, hotel.clone());
        Ok(hotel)
    }

    async fn upsert_flight(
        &self,
        quote: &FlightQuote,
        origin_city_id: CityId,
        destination_city_id: CityId,
    ) -> Result<Flight, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(existing) = inner
            .flights
            .values_mut()
            .find(|f| f.flight_number == quote.flight_number)
        {
            existing.price = quote.price;
            return Ok(existing.clone());
        }
        let flight = Flight {
            id: Inner::next_id(&inner.flights),
            flight_number: quote.flight_number.clone(),
            origin_city_id,
            destination_city_id,
            date: quote.date,
            price: quote.price,
            status: quote.status,
        };
        inner.flights.insert(flight.id, flight.clone());
        Ok(flight)
    }

    async fn upsert_transfer(
        &self,
        quote: &TransferQuote,
        city_id: CityId,
    ) -> Result<Transfer, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(existing) = inner.transfers.values_mut().find(|t| t.name == quote.name) {
            existing.price = quote.price;
            existing.rating = quote.rating;
            return Ok(existing.clone());
        }
        let transfer = Transfer {
            id: Inner::next_id(&inner.transfers),
            name: quote.name.clone(),
            kind: quote.kind,
            city_id,
            price: quote.price,
            rating: quote.rating,
            available: quote.available,
        };
        inner.transfers.insert(transfer.id, transfer.clone());
        Ok(transfer)
    }
}

#[async_trait]
impl InventoryAdapter for MemoryStore {
    async fn list_outbound_flights(
        &self,
        origin_city: &str,
        date: NaiveDate,
        destination_city: Option<&str>,
    ) -> Result<Vec<Flight>, SupplierError> {
        self.check_outage()?;
        let inner = self.inner.lock().unwrap();
        let Some(origin_id) = inner.city_id(origin_city) else {
            return Ok(Vec::new());
        };
        let destination_id = match destination_city {
            Some(name) => match inner.city_id(name) {
                Some(id) => Some(id),
                None => return Ok(Vec::new()),
            },
            None => None,
        };
        Ok(inner
            .flights
            .values()
            .filter(|f| f.origin_city_id == origin_id && f.date == date)
            .filter(|f| destination_id.map_or(true, |id| f.destination_city_id == id))
            .cloned()
            .collect())
    }

    async fn list_return_flights(
        &self,
        destination_city: &str,
        date: NaiveDate,
    ) -> Result<Vec<Flight>, SupplierError> {
        self.check_outage()?;
        let inner = self.inner.lock().unwrap();
        let Some(city_id) = inner.city_id(destination_city) else {
            return Ok(Vec::new());
        };
        Ok(inner
            .flights
            .values()
            .filter(|f| f.origin_city_id == city_id && f.date == date)
            .cloned()
            .collect())
    }

    async fn list_hotels(
        &self,
        cities: &[String],
        filters: &HotelFilters,
    ) -> Result<Vec<Hotel>, SupplierError> {
        self.check_outage()?;
        let inner = self.inner.lock().unwrap();
        let city_ids: HashSet<CityId> = cities.iter().filter_map(|n| inner.city_id(n)).collect();
        Ok(inner
            .hotels
            .values()
            .filter(|h| city_ids.contains(&h.city_id) && hotel_matches(h, filters))
            .cloned()
            .collect())
    }

    async fn list_available_hotel_ids(
        &self,
        date_from: NaiveDate,
        date_to: NaiveDate,
        guests: u32,
    ) -> Result<HashSet<HotelId>, SupplierError> {
        self.check_outage()?;
        Ok(self
            .inner
            .lock()
            .unwrap()
            .availability
            .iter()
            .filter(|a| a.covers(date_from, date_to, guests))
            .map(|a| a.hotel_id)
            .collect())
    }

    async fn list_transfers(&self, cities: &[String]) -> Result<Vec<Transfer>, SupplierError> {
        self.check_outage()?;
        let inner = self.inner.lock().unwrap();
        let city_ids: HashSet<CityId> = cities.iter().filter_map(|n| inner.city_id(n)).collect();
        Ok(inner
            .transfers
            .values()
            .filter(|t| city_ids.contains(&t.city_id))
            .cloned()
            .collect())
    }

    async fn quote_hotels(
        &self,
        city: &str,
        date_from: NaiveDate,
        date_to: NaiveDate,
        guests: u32,
    ) -> Result<Vec<HotelQuote>, SupplierError> {
        self.check_outage()?;
        let inner = self.inner.lock().unwrap();
        let Some(city_id) = inner.city_id(city) else {
            return Ok(Vec::new());
        };
        let available: HashSet<HotelId> = inner
            .availability
            .iter()
            .filter(|a| a.covers(date_from, date_to, guests))
            .map(|a| a.hotel_id)
            .collect();
        Ok(inner
            .hotels
            .values()
            .filter(|h| h.city_id == city_id && available.contains(&h.id))
            .map(|h| HotelQuote {
                name: h.name.clone(),
                city: city.to_string(),
                standard: h.standard,
                nightly_price: h.nightly_price,
                capacity: h.capacity,
                rating: h.rating,
                has_wifi: h.has_wifi,
                has_pool: h.has_pool,
                has_parking: h.has_parking,
                has_restaurant: h.has_restaurant,
            })
            .collect())
    }

    async fn quote_flights(
        &self,
        origin_city: &str,
        destination_city: &str,
        date: NaiveDate,
    ) -> Result<Vec<FlightQuote>, SupplierError> {
        self.check_outage()?;
        let inner = self.inner.lock().unwrap();
        let (Some(origin_id), Some(destination_id)) =
            (inner.city_id(origin_city), inner.city_id(destination_city))
        else {
            return Ok(Vec::new());
        };
        Ok(inner
            .flights
            .values()
            .filter(|f| {
                f.origin_city_id == origin_id
                    && f.destination_city_id == destination_id
                    && f.date == date
                    && f.status == FlightStatus::Scheduled
            })
            .map(|f| FlightQuote {
                flight_number: f.flight_number.clone(),
                origin: origin_city.to_string(),
                destination: destination_city.to_string(),
                date: f.date,
                price: f.price,
                status: f.status,
            })
            .collect())
    }

    async fn quote_transfers(&self, city: &str) -> Result<Vec<TransferQuote>, SupplierError> {
        self.check_outage()?;
        let inner = self.inner.lock().unwrap();
        let Some(city_id) = inner.city_id(city) else {
            return Ok(Vec::new());
        };
        Ok(inner
            .transfers
            .values()
            .filter(|t| t.city_id == city_id && t.available)
            .map(|t| TransferQuote {
                name: t.name.clone(),
                kind: t.kind,
                city: city.to_string(),
                price: t.price,
                rating: t.rating,
                available: t.available,
            })
            .collect())
    }
}

/// A scriptable event feed for tests and local runs.
#[derive(Default)]
pub struct MemoryEventFeed {
    events: Mutex<Vec<DisruptionEvent>>,
    outage: AtomicBool,
}

impl MemoryEventFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, event: DisruptionEvent) {
        self.events.lock().unwrap().push(event);
    }

    pub fn set_outage(&self, outage: bool) {
        self.outage.store(outage, Ordering::SeqCst);
    }
}

#[async_trait]
impl EventFeed for MemoryEventFeed {
    async fn poll_events(&self, since: EventId) -> Result<Vec<DisruptionEvent>, SupplierError> {
        if self.outage.load(Ordering::SeqCst) {
            return Err(SupplierError::Unavailable("simulated outage".into()));
        }
        let mut events: Vec<DisruptionEvent> = self
            .events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.id > since)
            .cloned()
            .collect();
        events.sort_by_key(|e| e.id);
        Ok(events)
    }
}
