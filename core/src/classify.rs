//! Turning transport outcomes into a `ResponsePayload`.
//!
//! # Design
//! Status codes follow a fixed convention so callers can branch on one
//! number: 400 when no usable response arrived, 500 when the server broke
//! the JSON contract, and the server's own status otherwise. An `"error"`
//! field in a well-formed body never overrides the server's status.

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::ClientError;
use crate::headers::HEADER_CONTENT_TYPE;
use crate::http::HttpResponse;
use crate::transport::TransportFailure;
use crate::types::ResponsePayload;

pub const STATUS_BAD_REQUEST: u16 = 400;
pub const STATUS_INTERNAL_SERVER_ERROR: u16 = 500;

pub fn classify(outcome: Result<HttpResponse, TransportFailure>) -> ResponsePayload {
    match outcome {
        Ok(response) => classify_response(response),
        Err(failure) => classify_failure(failure),
    }
}

/// A failed round-trip keeps the server's status only if it sent a body.
pub fn classify_failure(failure: TransportFailure) -> ResponsePayload {
    let status = match &failure.response {
        Some(response) if !response.body.is_empty() => response.status,
        _ => STATUS_BAD_REQUEST,
    };
    debug!(status, error = %failure.error, "transport failure classified");
    ResponsePayload::failed(status, failure.error)
}

pub fn classify_response(response: HttpResponse) -> ResponsePayload {
    if let Err(error) = check_content_type(&response) {
        warn!(status = response.status, %error, "rejecting response");
        return ResponsePayload::failed(STATUS_INTERNAL_SERVER_ERROR, error);
    }

    let data: Map<String, Value> = match serde_json::from_str(&response.body) {
        Ok(data) => data,
        Err(e) => {
            warn!(status = response.status, error = %e, "response body is not a JSON object");
            return ResponsePayload::failed(
                STATUS_INTERNAL_SERVER_ERROR,
                ClientError::Decode(e.to_string()),
            );
        }
    };

    let error = data
        .get("error")
        .map(|value| ClientError::Application(error_text(value)));
    debug!(status = response.status, application_error = error.is_some(), "response classified");
    ResponsePayload {
        status_code: response.status,
        error,
        data: Some(data),
    }
}

/// The response must be JSON in UTF-8. Parameter order, case, spacing and
/// quoting of the charset are not significant.
pub fn check_content_type(response: &HttpResponse) -> Result<(), ClientError> {
    let found = response.header(HEADER_CONTENT_TYPE).unwrap_or_default();
    if is_json_utf8(found) {
        Ok(())
    } else {
        Err(ClientError::ContentType {
            found: found.to_string(),
        })
    }
}

fn is_json_utf8(content_type: &str) -> bool {
    let mut parts = content_type.split(';');
    let media_type = parts.next().unwrap_or_default().trim();
    if !media_type.eq_ignore_ascii_case("application/json") {
        return false;
    }
    parts.filter_map(|param| param.split_once('=')).any(|(name, value)| {
        name.trim().eq_ignore_ascii_case("charset")
            && value.trim().trim_matches('"').eq_ignore_ascii_case("utf-8")
    })
}

fn error_text(value: &Value) -> String {
    match value {
        Value::String(message) => message.clone(),
        other => other.to_string(),
    }
}
