//! Signed HTTP client for minions talking to the control server.
//!
//! # Overview
//! A minion proves possession of a shared secret by signing each request:
//! the values of five protocol headers and the raw JSON body are joined into
//! a canonical string whose HMAC-SHA256 travels in `X-PARA-AUTH-REQUEST`.
//! Responses are folded into a single `ResponsePayload` carrying a status
//! code, an optional error and the decoded JSON object.
//!
//! # Design
//! - `MinionClient` is immutable after construction; each call builds and
//!   signs a fresh `HttpRequest`, so one client can serve many threads.
//! - Building (`build_*`) is pure and takes an explicit timestamp; sending
//!   goes through the `Transport` trait, blocking `ureq` by default.
//! - Failures are never panics: malformed base URLs fail at construction,
//!   everything else is reported inside the `ResponsePayload`.

pub mod classify;
pub mod client;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod headers;
pub mod http;
pub mod signer;
pub mod transport;
pub mod types;

pub use classify::{classify, STATUS_BAD_REQUEST, STATUS_INTERNAL_SERVER_ERROR};
pub use client::{MinionClient, BOOTSTRAP_PATH};
pub use config::ClientConfig;
pub use endpoint::{Endpoint, Target};
pub use error::ClientError;
pub use headers::CANONICAL_HEADERS;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use signer::{canonical_string, SecretKey, Signer};
pub use transport::{Transport, TransportFailure, UreqTransport};
pub use types::{BootstrapRequest, BootstrapResponse, ResponsePayload};
