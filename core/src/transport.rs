//! Executing signed requests over the network.
//!
//! # Design
//! The client never talks to the network directly. It hands a finished
//! `HttpRequest` to a `Transport` and classifies whatever comes back.
//! `UreqTransport` is the blocking default; tests plug in their own.
//! 4xx/5xx responses are data, not transport failures.

use std::fmt;
use std::io::Read;

use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::http::{HttpRequest, HttpResponse};

/// A call that did not produce a complete response.
///
/// `response` is set when headers arrived but the body could not be read in
/// full; it then holds whatever was received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportFailure {
    pub error: ClientError,
    pub response: Option<HttpResponse>,
}

impl TransportFailure {
    pub fn new(error: ClientError) -> Self {
        Self {
            error,
            response: None,
        }
    }
}

/// Sends one request and waits for the response.
pub trait Transport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportFailure>;
}

/// Blocking transport backed by a `ureq` agent.
pub struct UreqTransport {
    agent: ureq::Agent,
    max_body_bytes: u64,
    user_agent: String,
}

impl UreqTransport {
    pub fn new(config: &ClientConfig) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(config.timeout())
            .build()
            .new_agent();
        Self {
            agent,
            max_body_bytes: config.max_body_bytes,
            user_agent: config.user_agent.clone(),
        }
    }
}

impl fmt::Debug for UreqTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UreqTransport")
            .field("max_body_bytes", &self.max_body_bytes)
            .field("user_agent", &self.user_agent)
            .finish_non_exhaustive()
    }
}

impl Transport for UreqTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportFailure> {
        let mut builder = self
            .agent
            .post(request.url.as_str())
            .header("User-Agent", self.user_agent.as_str());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(timeout) = request.timeout {
            builder = builder.config().timeout_global(Some(timeout)).build();
        }

        let body = request.body.as_deref().unwrap_or_default();
        let mut response = builder.send(body.as_bytes()).map_err(|e| {
            warn!(url = %request.url, error = %e, "request failed before a response arrived");
            TransportFailure::new(map_ureq_error(e))
        })?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();

        let mut bytes = Vec::new();
        let read = response
            .body_mut()
            .as_reader()
            .take(self.max_body_bytes.saturating_add(1))
            .read_to_end(&mut bytes);
        let oversized = bytes.len() as u64 > self.max_body_bytes;
        if oversized {
            bytes.truncate(self.max_body_bytes as usize);
        }

        let response = HttpResponse {
            status,
            headers,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        };
        debug!(status, bytes = bytes.len(), "response received");

        let error = match read {
            Err(e) => ClientError::Transport(format!("failed to read response body: {e}")),
            Ok(_) if oversized => ClientError::Transport(format!(
                "response body exceeds {} bytes",
                self.max_body_bytes
            )),
            Ok(_) => return Ok(response),
        };
        warn!(status, error = %error, "response body incomplete");
        Err(TransportFailure {
            error,
            response: Some(response),
        })
    }
}

fn map_ureq_error(error: ureq::Error) -> ClientError {
    match error {
        ureq::Error::Timeout(_) => ClientError::Timeout,
        other => ClientError::Transport(other.to_string()),
    }
}
