//! Identifier aliases shared across the workspace.
//!
//! Every record in this system is addressed by the store's integer id; the
//! event feed in particular is contractually a strictly increasing `i64`
//! cursor. Aliases keep signatures readable without a newtype tax at every
//! query boundary.

pub type CityId = i64;
pub type FlightId = i64;
pub type HotelId = i64;
pub type TransferId = i64;
pub type BookingId = i64;
pub type EventId = i64;
