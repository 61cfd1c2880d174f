use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use voyara_shared::ids::{BookingId, CityId, FlightId, HotelId, TransferId};

use crate::event::Severity;

/// Lifecycle status of a package.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Prepared,
    Pending,
    Booked,
    Disrupted,
    Cancelled,
    RiskAccepted,
    Completed,
}

impl std::str::FromStr for BookingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "prepared" => Ok(BookingStatus::Prepared),
            "pending" => Ok(BookingStatus::Pending),
            "booked" => Ok(BookingStatus::Booked),
            "disrupted" => Ok(BookingStatus::Disrupted),
            "cancelled" => Ok(BookingStatus::Cancelled),
            "risk_accepted" => Ok(BookingStatus::RiskAccepted),
            "completed" => Ok(BookingStatus::Completed),
            other => Err(format!("unknown booking status: {other}")),
        }
    }
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Prepared => "prepared",
            BookingStatus::Pending => "pending",
            BookingStatus::Booked => "booked",
            BookingStatus::Disrupted => "disrupted",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::RiskAccepted => "risk_accepted",
            BookingStatus::Completed => "completed",
        }
    }
}

/// The inventory 5-tuple that makes a package unique among non-cancelled
/// bookings. The composer never inserts a second booking with the same key.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct PackageKey {
    pub outbound_flight_id: FlightId,
    pub return_flight_id: FlightId,
    pub hotel_id: HotelId,
    pub start_transfer_id: TransferId,
    pub end_transfer_id: TransferId,
}

/// Disruption metadata stamped onto a booking by the watchdog. Re-stamped
/// latest-wins if further events hit the same booking.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DisruptionStamp {
    pub kind: String,
    pub severity: Severity,
    pub message: String,
}

/// The itinerary aggregate: outbound and return flight, hotel, and a
/// transfer pair, priced for a date range and guest count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: BookingId,
    pub status: BookingStatus,
    pub hotel_id: HotelId,
    pub start_transfer_id: TransferId,
    pub end_transfer_id: TransferId,
    pub outbound_flight_id: FlightId,
    pub return_flight_id: FlightId,
    pub start_city_id: CityId,
    pub visited_city_id: CityId,
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
    pub guests: u32,
    pub total_price: f64,
    pub rating: f64,
    /// Promotional discount in percent, if any was applied to this package.
    pub discount: Option<f64>,
    pub disruption: Option<DisruptionStamp>,
    /// Set only on replacements produced by the alternative generator,
    /// pointing at the disrupted original.
    pub parent_booking_id: Option<BookingId>,
    pub created_at: DateTime<Utc>,
}

impl Booking {
    pub fn key(&self) -> PackageKey {
        PackageKey {
            outbound_flight_id: self.outbound_flight_id,
            return_flight_id: self.return_flight_id,
            hotel_id: self.hotel_id,
            start_transfer_id: self.start_transfer_id,
            end_transfer_id: self.end_transfer_id,
        }
    }

    /// True iff the stay overlaps the window `from..=to`.
    pub fn overlaps(&self, from: NaiveDate, to: NaiveDate) -> bool {
        self.date_from <= to && self.date_to >= from
    }
}
