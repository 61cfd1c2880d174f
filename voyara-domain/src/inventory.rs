use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use voyara_shared::ids::{CityId, FlightId, HotelId, TransferId};

/// Immutable reference data for a destination.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct City {
    pub id: CityId,
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FlightStatus {
    Scheduled,
    Delayed,
    Cancelled,
}

impl FlightStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlightStatus::Scheduled => "SCHEDULED",
            FlightStatus::Delayed => "DELAYED",
            FlightStatus::Cancelled => "CANCELLED",
        }
    }
}

impl std::str::FromStr for FlightStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SCHEDULED" => Ok(FlightStatus::Scheduled),
            "DELAYED" => Ok(FlightStatus::Delayed),
            "CANCELLED" => Ok(FlightStatus::Cancelled),
            other => Err(format!("unknown flight status: {other}")),
        }
    }
}

/// A directed flight leg. Multiple flights may share a route and date under
/// different flight numbers and prices.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Flight {
    pub id: FlightId,
    /// Natural key from the carrier, e.g. "FL-WARNOW-412".
    pub flight_number: String,
    pub origin_city_id: CityId,
    pub destination_city_id: CityId,
    pub date: NaiveDate,
    pub price: f64,
    pub status: FlightStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hotel {
    pub id: HotelId,
    /// Natural key within the mirror.
    pub name: String,
    pub city_id: CityId,
    /// Star standard, 1..=5.
    pub standard: u8,
    pub nightly_price: f64,
    pub capacity: u32,
    /// Guest rating on the 0..=10 scale used across the inventory.
    pub rating: f64,
    pub has_wifi: bool,
    pub has_pool: bool,
    pub has_parking: bool,
    pub has_restaurant: bool,
}

/// An availability window for a hotel, keyed by date range and guest
/// capacity. A hotel with no open window never enters a package.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HotelAvailability {
    pub hotel_id: HotelId,
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
    pub max_guests: u32,
    pub is_available: bool,
}

impl HotelAvailability {
    /// True when the window fully covers `from..=to` for `guests`.
    pub fn covers(&self, from: NaiveDate, to: NaiveDate, guests: u32) -> bool {
        self.is_available && self.max_guests >= guests && self.date_from <= from && self.date_to >= to
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransferKind {
    Bus,
    Taxi,
    Train,
}

impl TransferKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransferKind::Bus => "BUS",
            TransferKind::Taxi => "TAXI",
            TransferKind::Train => "TRAIN",
        }
    }
}

impl std::str::FromStr for TransferKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "BUS" => Ok(TransferKind::Bus),
            "TAXI" => Ok(TransferKind::Taxi),
            "TRAIN" => Ok(TransferKind::Train),
            other => Err(format!("unknown transfer kind: {other}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transfer {
    pub id: TransferId,
    /// Natural key, e.g. "Taxi Rome Express".
    pub name: String,
    pub kind: TransferKind,
    pub city_id: CityId,
    pub price: f64,
    pub rating: f64,
    pub available: bool,
}

/// A flight as quoted by the inventory adapter. Quotes are natural-key
/// identified; the mirror assigns or reuses local ids on materialisation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlightQuote {
    pub flight_number: String,
    pub origin: String,
    pub destination: String,
    pub date: NaiveDate,
    pub price: f64,
    #[serde(default = "default_flight_status")]
    pub status: FlightStatus,
}

fn default_flight_status() -> FlightStatus {
    FlightStatus::Scheduled
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HotelQuote {
    pub name: String,
    pub city: String,
    #[serde(default = "default_standard")]
    pub standard: u8,
    pub nightly_price: f64,
    pub capacity: u32,
    pub rating: f64,
    #[serde(default)]
    pub has_wifi: bool,
    #[serde(default)]
    pub has_pool: bool,
    #[serde(default)]
    pub has_parking: bool,
    #[serde(default)]
    pub has_restaurant: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferQuote {
    pub name: String,
    pub kind: TransferKind,
    pub city: String,
    pub price: f64,
    pub rating: f64,
    #[serde(default = "default_true")]
    pub available: bool,
}

fn default_true() -> bool {
    true
}

fn default_standard() -> u8 {
    3
}
