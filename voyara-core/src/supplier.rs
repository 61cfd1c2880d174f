use std::collections::HashSet;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use voyara_domain::{DisruptionEvent, Flight, FlightQuote, Hotel, HotelQuote, Transfer, TransferQuote};
use voyara_shared::ids::{EventId, HotelId};

use crate::error::SupplierError;

/// Optional hotel-narrowing criteria forwarded to the inventory source.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HotelFilters {
    /// Star standard floor, 1..=5.
    pub min_standard: Option<u8>,
    pub require_wifi: Option<bool>,
    pub require_pool: Option<bool>,
    pub require_parking: Option<bool>,
}

/// The external inventory source.
///
/// The `list_*` family serves the composer from inventory that is already
/// mirrored locally and therefore carries local ids. The `quote_*` family
/// serves the alternative generator, whose destinations may not be mirrored
/// yet; quotes are natural-key identified and materialised on first use.
///
/// Every call may fail with `SupplierError::Unavailable`; that is a distinct
/// outcome from an empty listing.
#[async_trait]
pub trait InventoryAdapter: Send + Sync {
    async fn list_outbound_flights(
        &self,
        origin_city: &str,
        date: NaiveDate,
        destination_city: Option<&str>,
    ) -> Result<Vec<Flight>, SupplierError>;

    async fn list_return_flights(
        &self,
        destination_city: &str,
        date: NaiveDate,
    ) -> Result<Vec<Flight>, SupplierError>;

    async fn list_hotels(
        &self,
        cities: &[String],
        filters: &HotelFilters,
    ) -> Result<Vec<Hotel>, SupplierError>;

    async fn list_available_hotel_ids(
        &self,
        date_from: NaiveDate,
        date_to: NaiveDate,
        guests: u32,
    ) -> Result<HashSet<HotelId>, SupplierError>;

    async fn list_transfers(&self, cities: &[String]) -> Result<Vec<Transfer>, SupplierError>;

    async fn quote_hotels(
        &self,
        city: &str,
        date_from: NaiveDate,
        date_to: NaiveDate,
        guests: u32,
    ) -> Result<Vec<HotelQuote>, SupplierError>;

    async fn quote_flights(
        &self,
        origin_city: &str,
        destination_city: &str,
        date: NaiveDate,
    ) -> Result<Vec<FlightQuote>, SupplierError>;

    async fn quote_transfers(&self, city: &str) -> Result<Vec<TransferQuote>, SupplierError>;
}

/// The append-only disruption event feed.
#[async_trait]
pub trait EventFeed: Send + Sync {
    /// Events with id greater than `since`, ascending by id. An empty batch
    /// is a normal quiet-period answer.
    async fn poll_events(&self, since: EventId) -> Result<Vec<DisruptionEvent>, SupplierError>;
}
