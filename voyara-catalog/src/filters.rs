//! Pure narrowing predicates over inventory records.
//!
//! These run both inside the in-memory inventory source and as a re-check on
//! whatever an external source returns, so a lax provider cannot smuggle an
//! unwanted hotel into a package.

use voyara_core::supplier::HotelFilters;
use voyara_domain::{Flight, FlightStatus, Hotel, Transfer};

/// A hotel passes when it meets the standard floor and every amenity the
/// caller insisted on. Unset criteria never exclude anything.
pub fn hotel_matches(hotel: &Hotel, filters: &HotelFilters) -> bool {
    if let Some(min) = filters.min_standard {
        if hotel.standard < min {
            return false;
        }
    }
    if filters.require_wifi == Some(true) && !hotel.has_wifi {
        return false;
    }
    if filters.require_pool == Some(true) && !hotel.has_pool {
        return false;
    }
    if filters.require_parking == Some(true) && !hotel.has_parking {
        return false;
    }
    true
}

/// Only scheduled flights enter a package.
pub fn flight_is_bookable(flight: &Flight) -> bool {
    flight.status == FlightStatus::Scheduled
}

pub fn transfer_is_usable(transfer: &Transfer) -> bool {
    transfer.available
}
