//! Payloads exchanged with the server.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ClientError;

/// Uniform result of a call, whatever happened on the way.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponsePayload {
    pub status_code: u16,
    pub error: Option<ClientError>,
    /// Decoded JSON object body, when one was received.
    pub data: Option<Map<String, Value>>,
}

impl ResponsePayload {
    pub fn failed(status_code: u16, error: ClientError) -> Self {
        Self {
            status_code,
            error: Some(error),
            data: None,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Body of the `/bootstrap` call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BootstrapRequest {
    pub hostname: String,
}

/// Result of `MinionClient::bootstrap`.
///
/// The credential fields are left empty: the server-side contract for
/// where they live in the response body is not defined yet.
#[derive(Debug, Clone, PartialEq)]
pub struct BootstrapResponse {
    pub response: ResponsePayload,
    pub minion_key: Vec<u8>,
    pub queue_username: String,
    pub queue_password: String,
}

impl BootstrapResponse {
    pub fn status_code(&self) -> u16 {
        self.response.status_code
    }

    pub fn error(&self) -> Option<&ClientError> {
        self.response.error.as_ref()
    }
}

impl From<ResponsePayload> for BootstrapResponse {
    fn from(response: ResponsePayload) -> Self {
        Self {
            response,
            minion_key: Vec::new(),
            queue_username: String::new(),
            queue_password: String::new(),
        }
    }
}
