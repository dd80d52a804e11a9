//! End-to-end calls against the signature-verifying mock server.
//!
//! # Design
//! Starts the mock server on a random port in a background tokio runtime,
//! then drives the real blocking client (ureq transport) against it. The
//! server recomputes every signature independently, so a 200 here proves the
//! bytes on the wire match the bytes that were signed.

use std::net::SocketAddr;
use std::time::Duration;

use pararest::{
    ClientConfig, ClientError, MinionClient, STATUS_BAD_REQUEST, STATUS_INTERNAL_SERVER_ERROR,
};

const TEST_PAYLOAD: &str = r#"{"username":"testuser", "password":"testpass"}"#;

/// Spawn the mock server with `secret` and return its address.
fn start_server(secret: &str) -> SocketAddr {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    let secret = secret.to_string();
    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener, secret.as_str()).await
        })
        .unwrap();
    });

    addr
}

fn random_secret() -> String {
    uuid::Uuid::new_v4().to_string()
}

fn quick_config() -> ClientConfig {
    ClientConfig::default().with_timeout(Duration::from_secs(5))
}

#[test]
fn signed_post_is_accepted() {
    let secret = random_secret();
    let addr = start_server(&secret);
    let client = MinionClient::with_config(&format!("http://{addr}"), secret.as_str(), &quick_config()).unwrap();

    let resp = client.post_raw(TEST_PAYLOAD, "/test");
    assert_eq!(resp.status_code, 200, "{:?}", resp.error);
    assert!(resp.error.is_none());
    assert!(resp.data.unwrap().is_empty());
}

#[test]
fn serialized_payload_is_accepted_under_base_path() {
    let secret = random_secret();
    let addr = start_server(&secret);
    let client =
        MinionClient::with_config(&format!("http://{addr}/api/v1/"), secret.as_str(), &quick_config())
            .unwrap();

    let resp = client.post(&serde_json::json!({"hostname": "node1", "tags": ["a", "b"]}), "status");
    assert_eq!(resp.status_code, 200, "{:?}", resp.error);
}

#[test]
fn bootstrap_against_empty_object_has_empty_credentials() {
    let secret = random_secret();
    let addr = start_server(&secret);
    let client = MinionClient::with_config(&format!("http://{addr}"), secret.as_str(), &quick_config()).unwrap();

    let resp = client.bootstrap();
    assert_eq!(resp.status_code(), 200);
    assert!(resp.error().is_none());
    assert!(resp.minion_key.is_empty());
    assert!(resp.queue_username.is_empty());
    assert!(resp.queue_password.is_empty());
}

#[test]
fn wrong_key_yields_application_error_with_server_status() {
    let addr = start_server(&random_secret());
    let client =
        MinionClient::with_config(&format!("http://{addr}"), "not the server key", &quick_config()).unwrap();

    let resp = client.post_raw(TEST_PAYLOAD, "/test");
    assert_eq!(resp.status_code, 401);
    assert_eq!(
        resp.error,
        Some(ClientError::Application("bad signature".to_string()))
    );
    assert_eq!(resp.data.unwrap()["status_code"], 401);
}

#[test]
fn plain_text_response_is_a_content_type_error() {
    let secret = random_secret();
    let addr = start_server(&secret);
    let client = MinionClient::with_config(&format!("http://{addr}"), secret.as_str(), &quick_config()).unwrap();

    let resp = client.post_raw(TEST_PAYLOAD, "/plain");
    assert_eq!(resp.status_code, STATUS_INTERNAL_SERVER_ERROR);
    assert!(matches!(resp.error, Some(ClientError::ContentType { .. })));
}

#[test]
fn malformed_json_response_is_a_decode_error() {
    let secret = random_secret();
    let addr = start_server(&secret);
    let client = MinionClient::with_config(&format!("http://{addr}"), secret.as_str(), &quick_config()).unwrap();

    let resp = client.post_raw(TEST_PAYLOAD, "/malformed");
    assert_eq!(resp.status_code, STATUS_INTERNAL_SERVER_ERROR);
    assert!(matches!(resp.error, Some(ClientError::Decode(_))));
}

#[test]
fn nonexistent_host_is_a_transport_error() {
    let client = MinionClient::with_config(
        "https://www.fakemadeupexample2415.invalid/",
        random_secret().as_str(),
        &quick_config(),
    )
    .unwrap();

    let resp = client.post_raw(TEST_PAYLOAD, "/test");
    assert_eq!(resp.status_code, STATUS_BAD_REQUEST);
    assert!(matches!(
        resp.error,
        Some(ClientError::Transport(_)) | Some(ClientError::Timeout)
    ));
    assert!(resp.data.is_none());
}

#[test]
fn refused_connection_is_a_transport_error() {
    let addr = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };
    let client = MinionClient::with_config(&format!("http://{addr}"), "k", &quick_config()).unwrap();

    let resp = client.post_raw(TEST_PAYLOAD, "/test");
    assert_eq!(resp.status_code, STATUS_BAD_REQUEST);
    assert!(matches!(resp.error, Some(ClientError::Transport(_))));
}

#[test]
fn silent_server_hits_the_call_deadline() {
    // Accepts connections at the kernel level but never answers.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let client = MinionClient::new(&format!("http://{addr}"), "k").unwrap();

    let resp = client.post_with_deadline(&serde_json::json!({}), "/test", Duration::from_millis(300));
    assert_eq!(resp.status_code, STATUS_BAD_REQUEST);
    assert_eq!(resp.error, Some(ClientError::Timeout));
    drop(listener);
}

#[test]
fn one_client_serves_concurrent_calls() {
    let secret = random_secret();
    let addr = start_server(&secret);
    let client = MinionClient::with_config(&format!("http://{addr}"), secret.as_str(), &quick_config()).unwrap();

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let client = &client;
                scope.spawn(move || client.post(&serde_json::json!({ "n": i }), &format!("/worker/{i}")))
            })
            .collect();
        for handle in handles {
            let resp = handle.join().unwrap();
            assert_eq!(resp.status_code, 200, "{:?}", resp.error);
        }
    });
}
