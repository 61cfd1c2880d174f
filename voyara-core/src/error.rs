use thiserror::Error;

/// Failure of an external inventory or event source.
///
/// `Unavailable` is the transient case: a timeout, a connection failure or a
/// 5xx from the provider. Callers must never collapse it into an empty
/// result; an empty result is a legitimate answer, an unavailable provider
/// is not.
#[derive(Debug, Error)]
pub enum SupplierError {
    #[error("provider unavailable: {0}")]
    Unavailable(String),

    #[error("provider returned a malformed payload: {0}")]
    Malformed(String),
}

/// Failure in the persisted store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("unknown {entity} reference: {reference}")]
    UnknownReference { entity: &'static str, reference: String },

    #[error("storage failure: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn unknown(entity: &'static str, reference: impl ToString) -> Self {
        StoreError::UnknownReference {
            entity,
            reference: reference.to_string(),
        }
    }
}

/// The engine-level taxonomy surfaced to the booking/presentation layer.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A provider call failed inside a user-initiated operation; the caller
    /// should show a retry-appropriate message, not "no offers found".
    #[error("service unavailable: {0}")]
    ServiceUnavailable(#[from] SupplierError),

    #[error("booking {0} not found")]
    BookingNotFound(i64),

    #[error("booking {alt} is not an alternative of booking {original}")]
    NotAlternative { original: i64, alt: i64 },

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type EngineResult<T> = Result<T, EngineError>;
