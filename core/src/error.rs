//! Error types for the control-panel API client.
//!
//! # Design
//! Only failures where the exchange did not complete become `Err` in the
//! named operations. A server that answers with a non-2xx status is a
//! regular outcome there (`false` / `None`). `HttpStatus` exists for callers
//! that want the status code through `ResponseEnvelope::check`.

use thiserror::Error;

/// Errors returned by `ResourceApiClient` and the envelope helpers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response: connection refused, DNS,
    /// timeout, or the response body could not be read.
    #[error("transport failure: {0}")]
    Transport(String),

    /// The server answered with a status outside 200..300.
    #[error("HTTP Error: {status}")]
    HttpStatus { status: u16 },

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// Client configuration is missing or malformed.
    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, ApiError>;
