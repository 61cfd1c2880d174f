pub mod error;
pub mod repository;
pub mod supplier;

pub use error::{EngineError, EngineResult, StoreError, SupplierError};
