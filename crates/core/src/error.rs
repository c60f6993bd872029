use thiserror::Error;

/// Error kinds surfaced by the core (see the error-handling policy this
/// mirrors: validation errors never reach the supervisor, script errors
/// are intentionally converted to status rather than propagated).
#[derive(Error, Debug)]
pub enum SentryError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("store error: {0}")]
    Store(String),

    #[error("mail transport error: {0}")]
    Transport(String),

    #[error("unknown watch id: {0}")]
    Registry(i64),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, SentryError>;
