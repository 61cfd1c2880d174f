pub mod filters;
pub mod pricing;

pub use filters::{flight_is_bookable, hotel_matches, transfer_is_usable};
pub use pricing::{nights_between, package_price, package_rating};
