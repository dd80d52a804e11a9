//! A server that checks minion signatures the way the control server does.
//!
//! Every POST outside the diagnostic routes is verified: the canonical
//! string is rebuilt from the received headers and raw body and its HMAC is
//! compared with `X-PARA-AUTH-REQUEST`. `/plain` and `/malformed` break the
//! JSON contract on purpose.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use pararest::headers::{CONTENT_TYPE_JSON, HEADER_AUTH_REQUEST, HEADER_METHOD};
use pararest::{canonical_string, SecretKey, Signer};
use tokio::net::TcpListener;
use tracing::{debug, warn};

pub const BAD_SIGNATURE: &str = "bad signature";

#[derive(Clone)]
struct AppState {
    signer: Arc<Signer>,
}

pub fn app(secret: impl Into<SecretKey>) -> Router {
    let state = AppState {
        signer: Arc::new(Signer::new(secret)),
    };
    Router::new()
        .route("/plain", any(plain_text))
        .route("/malformed", any(malformed_json))
        .fallback(verify_request)
        .with_state(state)
}

pub async fn run(listener: TcpListener, secret: impl Into<SecretKey>) -> Result<(), std::io::Error> {
    axum::serve(listener, app(secret)).await
}

async fn verify_request(
    State(state): State<AppState>,
    method: Method,
    headers: HeaderMap,
    body: String,
) -> Response {
    if method != Method::POST {
        return error_response(
            StatusCode::BAD_REQUEST,
            &format!("Expected method POST, received {method}"),
        );
    }

    let claimed = header_str(&headers, HEADER_METHOD).to_uppercase();
    if claimed != "POST" {
        return error_response(
            StatusCode::BAD_REQUEST,
            &format!("Expected custom header method POST, received {claimed}"),
        );
    }

    let canonical = canonical_string(
        |name| headers.get(name).and_then(|value| value.to_str().ok()),
        &body,
    );
    if !state
        .signer
        .verify(&canonical, header_str(&headers, HEADER_AUTH_REQUEST))
    {
        warn!("minion signature validation failed");
        return error_response(StatusCode::UNAUTHORIZED, BAD_SIGNATURE);
    }

    debug!(bytes = body.len(), "signature accepted");
    json_response(StatusCode::OK, "{}".to_string())
}

async fn plain_text() -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain")],
        r#"{"note":"right body, wrong content type"}"#,
    )
        .into_response()
}

async fn malformed_json() -> Response {
    json_response(StatusCode::OK, r#"{"truncated":"#.to_string())
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> &'a str {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
}

fn json_response(status: StatusCode, body: String) -> Response {
    (status, [(header::CONTENT_TYPE, CONTENT_TYPE_JSON)], body).into_response()
}

fn error_response(status: StatusCode, message: &str) -> Response {
    let body = serde_json::json!({
        "error": message,
        "status_code": status.as_u16(),
    });
    json_response(status, body.to_string())
}
