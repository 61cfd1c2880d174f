pub mod app_config;
pub mod booking_repo;
pub mod database;
pub mod event_repo;
pub mod http;
pub mod inventory_repo;
pub mod memory;

pub use app_config::Config;
pub use booking_repo::PgBookingRepository;
pub use database::DbClient;
pub use event_repo::PgEventStore;
pub use http::{HttpEventFeed, HttpQuoteClient};
pub use inventory_repo::{PgInventoryAdapter, PgInventoryStore};
pub use memory::{MemoryEventFeed, MemoryStore};
