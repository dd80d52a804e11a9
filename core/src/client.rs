//! Signed request building and dispatch for a minion.
//!
//! # Design
//! `MinionClient` holds a validated `Endpoint`, a `Signer` and a `Transport`,
//! none of which change after construction. Every call builds a fresh
//! `HttpRequest` (`build_*`), signs it, hands it to the transport and
//! classifies the outcome. The `build_*` methods take an explicit timestamp
//! and do no I/O, so the exact bytes a call would send can be checked in
//! isolation.

use std::ffi::OsString;
use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use tracing::{debug, warn};

use crate::classify::{classify, STATUS_BAD_REQUEST};
use crate::config::ClientConfig;
use crate::endpoint::Endpoint;
use crate::error::ClientError;
use crate::headers::{
    CONTENT_TYPE_JSON, HEADER_CONTENT_TYPE, HEADER_HOST, HEADER_METHOD, HEADER_PATH,
    HEADER_QUERY_STRING, HEADER_TIMESTAMP,
};
use crate::http::{HttpMethod, HttpRequest};
use crate::signer::{SecretKey, Signer};
use crate::transport::{Transport, UreqTransport};
use crate::types::{BootstrapRequest, BootstrapResponse, ResponsePayload};

pub const BOOTSTRAP_PATH: &str = "/bootstrap";

/// Sent as the hostname when the local one cannot be determined.
pub const UNKNOWN_HOSTNAME: &str = "Unknown";

/// Client for one server endpoint and one secret key.
#[derive(Debug)]
pub struct MinionClient<T = UreqTransport> {
    endpoint: Endpoint,
    signer: Signer,
    transport: T,
}

impl MinionClient<UreqTransport> {
    /// `base_url` is the full URL, e.g. `https://www.example.com/`.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::InvalidUrl` if `base_url` is not an absolute
    /// `http`/`https` URL.
    pub fn new(base_url: &str, key: impl Into<SecretKey>) -> Result<Self, ClientError> {
        Self::with_config(base_url, key, &ClientConfig::default())
    }

    pub fn with_config(
        base_url: &str,
        key: impl Into<SecretKey>,
        config: &ClientConfig,
    ) -> Result<Self, ClientError> {
        let endpoint = Endpoint::parse(base_url)?;
        Ok(Self::with_transport(endpoint, key, UreqTransport::new(config)))
    }
}

impl<T: Transport> MinionClient<T> {
    pub fn with_transport(endpoint: Endpoint, key: impl Into<SecretKey>, transport: T) -> Self {
        Self {
            endpoint,
            signer: Signer::new(key),
            transport,
        }
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Serialize `payload` and build the signed POST to `endpoint`.
    pub fn build_post<P: Serialize + ?Sized>(
        &self,
        payload: &P,
        endpoint: &str,
        timestamp: DateTime<Utc>,
    ) -> Result<HttpRequest, ClientError> {
        let body =
            serde_json::to_string(payload).map_err(|e| ClientError::Serialization(e.to_string()))?;
        self.build_post_raw(body, endpoint, timestamp)
    }

    /// Build the signed POST for an already serialized JSON body, which is
    /// sent and signed byte for byte.
    pub fn build_post_raw(
        &self,
        body: impl Into<String>,
        endpoint: &str,
        timestamp: DateTime<Utc>,
    ) -> Result<HttpRequest, ClientError> {
        let target = self.endpoint.resolve(endpoint);
        let method = HttpMethod::Post;
        let mut request = HttpRequest {
            method,
            url: target.url,
            headers: vec![
                (HEADER_CONTENT_TYPE.to_string(), CONTENT_TYPE_JSON.to_string()),
                (HEADER_TIMESTAMP.to_string(), format_timestamp(timestamp)),
                (HEADER_HOST.to_string(), target.host),
                (HEADER_PATH.to_string(), target.path),
                (HEADER_METHOD.to_string(), method.as_str().to_string()),
                (HEADER_QUERY_STRING.to_string(), String::new()),
            ],
            body: Some(body.into()),
            timeout: None,
        };
        self.signer.sign_request(&mut request)?;
        Ok(request)
    }

    pub fn build_bootstrap(
        &self,
        hostname: &str,
        timestamp: DateTime<Utc>,
    ) -> Result<HttpRequest, ClientError> {
        let payload = BootstrapRequest {
            hostname: hostname.to_string(),
        };
        self.build_post(&payload, BOOTSTRAP_PATH, timestamp)
    }

    /// Post `payload` to `endpoint`, joined onto the base path.
    pub fn post<P: Serialize + ?Sized>(&self, payload: &P, endpoint: &str) -> ResponsePayload {
        self.dispatch(self.build_post(payload, endpoint, Utc::now()))
    }

    /// Post an already serialized JSON body.
    pub fn post_raw(&self, body: impl Into<String>, endpoint: &str) -> ResponsePayload {
        self.dispatch(self.build_post_raw(body, endpoint, Utc::now()))
    }

    /// Like `post`, but the whole round-trip must finish within `deadline`.
    pub fn post_with_deadline<P: Serialize + ?Sized>(
        &self,
        payload: &P,
        endpoint: &str,
        deadline: Duration,
    ) -> ResponsePayload {
        let request = self
            .build_post(payload, endpoint, Utc::now())
            .map(|request| HttpRequest {
                timeout: Some(deadline),
                ..request
            });
        self.dispatch(request)
    }

    /// Register this minion with the server.
    pub fn bootstrap(&self) -> BootstrapResponse {
        let request = self.build_bootstrap(&local_hostname(), Utc::now());
        BootstrapResponse::from(self.dispatch(request))
    }

    fn dispatch(&self, request: Result<HttpRequest, ClientError>) -> ResponsePayload {
        let request = match request {
            Ok(request) => request,
            Err(error) => {
                warn!(%error, "request not sent");
                return ResponsePayload::failed(STATUS_BAD_REQUEST, error);
            }
        };
        debug!(
            method = request.method.as_str(),
            url = %request.url,
            "sending signed request"
        );
        classify(self.transport.send(&request))
    }
}

/// RFC 3339 in UTC with whole seconds, e.g. `2024-01-01T00:00:00Z`.
pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub fn local_hostname() -> String {
    hostname_or_unknown(gethostname::gethostname())
}

/// Empty or non-UTF-8 hostnames become `UNKNOWN_HOSTNAME`.
fn hostname_or_unknown(raw: OsString) -> String {
    raw.into_string()
        .ok()
        .filter(|hostname| !hostname.is_empty())
        .unwrap_or_else(|| UNKNOWN_HOSTNAME.to_string())
}
