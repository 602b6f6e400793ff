#![allow(clippy::unwrap_used)]
// Integration tests for `BackendClient` using wiremock.

use secrecy::SecretString;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use nethawk_api::models::{FtpProtocol, NewMailConnection};
use nethawk_api::{BackendClient, Error};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, BackendClient) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&server.uri()).unwrap();
    let client = BackendClient::with_client(reqwest::Client::new(), base_url);
    (server, client)
}

fn new_profile() -> NewMailConnection {
    NewMailConnection {
        name: "Work".into(),
        imap_host: "imap.example.com".into(),
        imap_port: 993,
        smtp_host: "smtp.example.com".into(),
        smtp_port: 587,
        username: "ops@example.com".into(),
        password: SecretString::from("s3cret"),
    }
}

// ── FTP profiles ────────────────────────────────────────────────────

#[tokio::test]
async fn test_list_ftp_profiles() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/ftp/connections"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": "1",
            "name": "Production Server",
            "host": "ftp.example.com",
            "port": 21,
            "username": "admin",
            "protocol": "FTPS"
        }])))
        .mount(&server)
        .await;

    let profiles = client.list_ftp_profiles().await.unwrap();

    assert_eq!(profiles.len(), 1);
    assert_eq!(profiles[0].id, "1");
    assert_eq!(profiles[0].port, 21);
    assert_eq!(profiles[0].protocol, FtpProtocol::Ftps);
}

// ── Mail profiles ───────────────────────────────────────────────────

#[tokio::test]
async fn test_list_mail_profiles() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/mail/connections"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": "9f1c",
            "name": "Work",
            "imap_host": "imap.example.com",
            "imap_port": 993,
            "smtp_host": "smtp.example.com",
            "smtp_port": "587",
            "username": "ops@example.com"
        }])))
        .mount(&server)
        .await;

    let profiles = client.list_mail_profiles().await.unwrap();

    assert_eq!(profiles.len(), 1);
    assert_eq!(profiles[0].smtp_port, 587);
}

#[tokio::test]
async fn test_add_mail_profile_sends_password() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/mail/add_connection"))
        .and(body_partial_json(json!({ "name": "Work", "password": "s3cret" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "message": "Connection added",
            "connection": {
                "id": "new-id",
                "name": "Work",
                "imap_host": "imap.example.com",
                "imap_port": 993,
                "smtp_host": "smtp.example.com",
                "smtp_port": 587,
                "username": "ops@example.com"
            }
        })))
        .mount(&server)
        .await;

    let created = client.add_mail_profile(&new_profile()).await.unwrap();
    assert_eq!(created.id, "new-id");
}

#[tokio::test]
async fn test_add_mail_profile_validation_error_surfaces_backend_message() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/mail/add_connection"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "success": false,
            "message": "Missing required fields"
        })))
        .mount(&server)
        .await;

    let result = client.add_mail_profile(&new_profile()).await;

    match result {
        Err(Error::Api { status, message }) => {
            assert_eq!(status, 400);
            assert_eq!(message, "Missing required fields");
        }
        other => panic!("expected Api error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_delete_mail_profile() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/api/mail/delete_connection/9f1c"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "message": "Connection deleted"
        })))
        .mount(&server)
        .await;

    let message = client.delete_mail_profile("9f1c").await.unwrap();
    assert_eq!(message, "Connection deleted");
}

#[tokio::test]
async fn test_delete_missing_profile_is_not_found() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/api/mail/delete_connection/nope"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "success": false,
            "message": "Connection not found"
        })))
        .mount(&server)
        .await;

    let err = client.delete_mail_profile("nope").await.unwrap_err();
    assert!(err.is_not_found(), "expected not found, got: {err:?}");
    assert!(err.to_string().contains("Connection not found"));
}

// ── Overview ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_overview_endpoints() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/overview/stats"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "cpu": 12.5, "memory": 48.0, "disk": 71.2, "network": 3.4
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/overview/activity"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1, "type": "scan", "message": "Port scan on 192.168.1.1", "time": "2 min ago", "status": "success"}
        ])))
        .mount(&server)
        .await;

    let stats = client.overview_stats().await.unwrap();
    assert!((stats.disk - 71.2).abs() < f64::EPSILON);

    let activity = client.overview_activity().await.unwrap();
    assert_eq!(activity[0].kind, "scan");
}

// ── Error handling ──────────────────────────────────────────────────

#[tokio::test]
async fn test_generic_message_when_body_is_not_json() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/overview/devices"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
        .mount(&server)
        .await;

    let err = client.overview_devices().await.unwrap_err();
    match err {
        Error::Api { status, ref message } => {
            assert_eq!(status, 502);
            assert_eq!(message, "request failed with status 502");
            assert!(err.is_transient());
        }
        other => panic!("expected Api error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_malformed_success_body() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/overview/traffic"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = client.overview_traffic().await.unwrap_err();
    assert!(matches!(err, Error::Deserialization { ref body, .. } if body == "not json"));
}
