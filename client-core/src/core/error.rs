//! # Common Error Types
//!
//! Consolidated error handling for the client core.
//!
//! Errors are categorized by where they surface:
//!
//! - **Network**: no response was received from the backend at all
//! - **Api**: the backend answered with `success = false` (carries the
//!   server's human-readable message), or the response failed to decode
//! - **AuthExpired**: the backend rejected our credentials; the session has
//!   already been cleared by the time the caller sees this
//! - **Subscription**: a realtime telemetry feed failed; never touches the
//!   cache or the session
//! - **Validation**: a request was rejected locally before any I/O
//! - **Storage**: reading or writing the persisted session failed
//! - **Cancelled**: the request owner went away before completion

use thiserror::Error;

/// Error type covering every failure the client core reports.
///
/// Variants carry `String` payloads and the type is `Clone`, because one
/// outcome may fan out to several coalesced cache waiters and telemetry
/// subscriber callbacks.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CoreError {
    /// No response received (connection refused, timeout, DNS failure).
    #[error("network error: {0}")]
    Network(String),

    /// The backend responded with a failure envelope, or the response body
    /// could not be decoded into the expected shape.
    #[error("API error: {0}")]
    Api(String),

    /// Authentication was rejected. The session store has been cleared,
    /// the resource cache flushed, and telemetry torn down; the caller
    /// should route to re-authentication.
    #[error("authentication expired")]
    AuthExpired,

    /// A realtime telemetry feed failed. Delivered to the subscriber's
    /// error callback only.
    #[error("subscription error: {0}")]
    Subscription(String),

    /// The request was rejected before any I/O happened.
    #[error("validation error: {0}")]
    Validation(String),

    /// Persisted session storage could not be read or written.
    #[error("storage error: {0}")]
    Storage(String),

    /// The owner of an in-flight request dropped it before completion.
    #[error("request cancelled")]
    Cancelled,
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, CoreError>;

impl CoreError {
    /// True when the caller should prompt for re-authentication.
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, CoreError::AuthExpired)
    }
}
