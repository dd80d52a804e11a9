//! Error types for the minion client.
//!
//! # Design
//! Every failure a call can hit is a `ClientError` variant, and the variant
//! carries its cause as a string so the value can be cloned into a
//! `ResponsePayload` and compared in tests. Variants map one-to-one onto the
//! ways a call can go wrong: before I/O (URL, serialization, unsignable body), on
//! the wire (transport, timeout), or after a response arrived (content type,
//! decode, application error).

use thiserror::Error;

/// Errors surfaced by `MinionClient` and its building blocks.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// The base URL could not be parsed or cannot carry a path.
    #[error("invalid base URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The request payload could not be serialized to JSON.
    #[error("failed to serialize request body: {0}")]
    Serialization(String),

    /// The request has no serialized body to sign.
    #[error("request body must be serialized to a string before signing")]
    UnsignableBody,

    /// Connection, DNS or I/O failure before a complete response arrived.
    #[error("transport error: {0}")]
    Transport(String),

    /// The call exceeded its deadline.
    #[error("request timed out")]
    Timeout,

    /// The server answered with something other than UTF-8 JSON.
    #[error("invalid server Content-Type {found:?}, needs to be 'application/json; charset=utf-8'")]
    ContentType { found: String },

    /// The body claimed to be JSON but is not a JSON object.
    #[error("failed to decode response body: {0}")]
    Decode(String),

    /// The decoded body carried an `"error"` field.
    #[error("{0}")]
    Application(String),
}
