#![allow(clippy::unwrap_used)]
// Integration tests for `FortiOsClient` using wiremock.

use secrecy::SecretString;
use serde_json::json;
use url::Url;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use fortitrack_api::{Error, FortiOsClient, TlsMode, TransportConfig};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, FortiOsClient) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&server.uri()).unwrap();
    let token = SecretString::from("s3cr3t-token".to_string());
    let transport = TransportConfig {
        tls: TlsMode::System,
        ..TransportConfig::default()
    };
    let client = FortiOsClient::new(base_url, &token, "root", &transport).unwrap();
    (server, client)
}

// ── Device query ────────────────────────────────────────────────────

#[tokio::test]
async fn test_query_devices_sends_token_and_vdom() {
    let (server, client) = setup().await;

    let body = json!({
        "http_method": "GET",
        "results": [
            {
                "master_mac": "aa:bb:cc:dd:ee:01",
                "hostname": "laptop",
                "ipv4_address": "192.168.1.20",
                "is_online": true,
                "last_seen": 1_718_000_000
            },
            {
                "master_mac": "aa:bb:cc:dd:ee:02",
                "is_online": false
            }
        ],
        "vdom": "root",
        "path": "user",
        "name": "device",
        "action": "query",
        "status": "success",
        "serial": "FGT60FTK20000000",
        "version": "v7.2.5",
        "build": 1517
    });

    Mock::given(method("GET"))
        .and(path("/api/v2/monitor/user/device/query"))
        .and(query_param("vdom", "root"))
        .and(header("authorization", "Bearer s3cr3t-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .expect(1)
        .mount(&server)
        .await;

    let devices = client.query_devices().await.unwrap();

    assert_eq!(devices.len(), 2);
    assert_eq!(devices[0]["hostname"], "laptop");
    assert_eq!(devices[1]["is_online"], false);
}

#[tokio::test]
async fn test_query_devices_unauthorized() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v2/monitor/user/device/query"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let result = client.query_devices().await;

    assert!(
        matches!(result, Err(Error::Authentication { .. })),
        "expected Authentication error, got: {result:?}"
    );
}

#[tokio::test]
async fn test_query_devices_forbidden() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v2/monitor/user/device/query"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let err = client.query_devices().await.unwrap_err();
    assert!(matches!(err, Error::Forbidden { .. }));
    assert!(err.is_auth());
}

#[tokio::test]
async fn test_server_error_is_transient() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v2/monitor/user/device/query"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&server)
        .await;

    let err = client.query_devices().await.unwrap_err();
    match &err {
        Error::Api { status, message } => {
            assert_eq!(*status, 502);
            assert_eq!(message, "bad gateway");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
    assert!(err.is_transient());
}

#[tokio::test]
async fn test_malformed_body_is_deserialization_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v2/monitor/user/device/query"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
        .mount(&server)
        .await;

    let result = client.query_devices().await;
    assert!(matches!(result, Err(Error::Deserialization { .. })));
}

#[tokio::test]
async fn test_error_status_in_envelope() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v2/monitor/user/device/query"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [],
            "status": "error",
            "http_status": 424
        })))
        .mount(&server)
        .await;

    let result = client.query_devices().await;
    assert!(matches!(result, Err(Error::Api { status: 424, .. })));
}

// ── System status ───────────────────────────────────────────────────

#[tokio::test]
async fn test_system_status() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v2/monitor/system/status"))
        .and(query_param("vdom", "root"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "http_method": "GET",
            "results": {
                "model_name": "FortiGate",
                "model": "FGT60F",
                "hostname": "FGT-HOME"
            },
            "vdom": "root",
            "status": "success",
            "serial": "FGT60FTK20000000",
            "version": "v7.2.5",
            "build": 1517
        })))
        .mount(&server)
        .await;

    let status = client.system_status().await.unwrap();

    assert_eq!(status.serial, "FGT60FTK20000000");
    assert_eq!(status.version, "v7.2.5");
    assert_eq!(status.build, Some(1517));
    assert_eq!(status.hostname.as_deref(), Some("FGT-HOME"));
    assert_eq!(status.model.as_deref(), Some("FGT60F"));
    assert!(status.check_supported().is_ok());
}

#[tokio::test]
async fn test_system_status_missing_version() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v2/monitor/system/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": {},
            "status": "success",
            "serial": "FGT60FTK20000000"
        })))
        .mount(&server)
        .await;

    let result = client.system_status().await;
    assert!(matches!(result, Err(Error::Deserialization { .. })));
}
