use async_trait::async_trait;
use chrono::NaiveDate;
use voyara_domain::{
    Booking, BookingStatus, City, DisruptionStamp, EventRecord, Flight, FlightQuote, Hotel,
    HotelQuote, PackageKey, Transfer, TransferQuote,
};
use voyara_shared::ids::{BookingId, CityId, EventId};

use crate::error::StoreError;

/// Durable store of composed, confirmed and replacement itineraries.
#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Persist a new booking. The store assigns the id; the stored copy is
    /// returned.
    async fn create(&self, booking: Booking) -> Result<Booking, StoreError>;

    /// Persist a batch atomically. Used by the alternative generator, which
    /// commits once per successful batch.
    async fn create_batch(&self, bookings: Vec<Booking>) -> Result<Vec<Booking>, StoreError>;

    async fn get(&self, id: BookingId) -> Result<Option<Booking>, StoreError>;

    async fn list_by_status(&self, status: BookingStatus) -> Result<Vec<Booking>, StoreError>;

    /// Replacements linked to a disrupted original, in the given status.
    async fn list_children(
        &self,
        parent_id: BookingId,
        status: BookingStatus,
    ) -> Result<Vec<Booking>, StoreError>;

    /// The composer's idempotency guard: the non-cancelled booking carrying
    /// this exact 5-tuple, if one exists.
    async fn find_by_combination(&self, key: &PackageKey)
        -> Result<Option<Booking>, StoreError>;

    async fn update_status(&self, id: BookingId, status: BookingStatus) -> Result<(), StoreError>;

    /// Mark a booking disrupted and stamp the event metadata in one write.
    async fn mark_disrupted(
        &self,
        id: BookingId,
        stamp: DisruptionStamp,
    ) -> Result<(), StoreError>;

    async fn count_by_status(&self, status: BookingStatus) -> Result<u64, StoreError>;
}

/// Durable mirror of city-scoped disruption events plus the feed cursor.
#[async_trait]
pub trait EventStore: Send + Sync {
    async fn record(&self, event: EventRecord) -> Result<(), StoreError>;

    /// Most severe HIGH/CRITICAL event for a city overlapping the window.
    async fn blocking_event(
        &self,
        city: &str,
        date_from: NaiveDate,
        date_to: NaiveDate,
    ) -> Result<Option<EventRecord>, StoreError>;

    /// Last event id a watchdog instance has fully processed. Zero when the
    /// feed has never been read.
    async fn load_cursor(&self) -> Result<EventId, StoreError>;

    async fn save_cursor(&self, cursor: EventId) -> Result<(), StoreError>;
}

/// Local mirror of provider inventory plus the city directory.
///
/// The upserts are get-or-create by natural key (flight number, hotel name,
/// transfer name): an existing record keeps its id and has price and rating
/// refreshed from the quote.
#[async_trait]
pub trait InventoryStore: Send + Sync {
    async fn city(&self, id: CityId) -> Result<Option<City>, StoreError>;

    async fn city_by_name(&self, name: &str) -> Result<Option<City>, StoreError>;

    async fn list_cities(&self) -> Result<Vec<City>, StoreError>;

    /// Up to `limit` candidate destinations other than `exclude`.
    async fn candidate_cities(
        &self,
        exclude: CityId,
        limit: usize,
    ) -> Result<Vec<City>, StoreError>;

    async fn upsert_hotel(&self, quote: &HotelQuote, city_id: CityId) -> Result<Hotel, StoreError>;

    async fn upsert_flight(
        &self,
        quote: &FlightQuote,
        origin_city_id: CityId,
        destination_city_id: CityId,
    ) -> Result<Flight, StoreError>;

    async fn upsert_transfer(
        &self,
        quote: &TransferQuote,
        city_id: CityId,
    ) -> Result<Transfer, StoreError>;
}
