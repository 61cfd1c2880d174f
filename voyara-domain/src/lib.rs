pub mod booking;
pub mod event;
pub mod inventory;
pub mod lifecycle;

pub use booking::{Booking, BookingStatus, DisruptionStamp, PackageKey};
pub use event::{DisruptionEvent, EventKind, EventRecord, Severity};
pub use inventory::{
    City, Flight, FlightQuote, FlightStatus, Hotel, HotelAvailability, HotelQuote, Transfer,
    TransferKind, TransferQuote,
};
pub use lifecycle::{next_status, BookingAction};
