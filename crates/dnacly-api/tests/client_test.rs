#![allow(clippy::unwrap_used)]
// Integration tests for `DnacClient` using wiremock.

use std::sync::{Arc, Mutex};

use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use url::Url;
use wiremock::matchers::{basic_auth, body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use dnacly_api::models::{DistributionTarget, TargetInfo};
use dnacly_api::{Credentials, DnacClient, Error};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, DnacClient) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&server.uri()).unwrap();
    let client = DnacClient::with_client(reqwest::Client::new(), base_url);
    (server, client)
}

fn secret(s: &str) -> SecretString {
    SecretString::from(s.to_owned())
}

async fn mount_token(server: &MockServer, token: &str) {
    Mock::given(method("POST"))
        .and(path("/dna/system/api/v1/auth/token"))
        .and(basic_auth("admin", "cisco123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "Token": token })))
        .mount(server)
        .await;
}

// ── Authentication tests ────────────────────────────────────────────

#[tokio::test]
async fn test_request_token_success() {
    let (server, client) = setup().await;
    mount_token(&server, "tok-1").await;

    let token = client.request_token("admin", &secret("cisco123")).await.unwrap();

    assert_eq!(token.expose_secret(), "tok-1");
    assert_eq!(client.token().unwrap().expose_secret(), "tok-1");
}

#[tokio::test]
async fn test_request_token_rejected() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/dna/system/api/v1/auth/token"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let result = client.request_token("admin", &secret("wrong")).await;

    assert!(
        matches!(result, Err(Error::Authentication { .. })),
        "expected Authentication error, got: {result:?}"
    );
    assert!(client.token().is_none());
}

#[tokio::test]
async fn test_request_token_error_body() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/dna/system/api/v1/auth/token"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "error": "account locked" })),
        )
        .mount(&server)
        .await;

    match client.request_token("admin", &secret("cisco123")).await {
        Err(Error::Authentication { message }) => assert_eq!(message, "account locked"),
        other => panic!("expected Authentication error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_call_without_token_fails_fast() {
    let (_server, client) = setup().await;

    let result = client.list_sites().await;

    assert!(matches!(result, Err(Error::NoToken)));
}

// ── Reactive re-authentication ──────────────────────────────────────

#[tokio::test]
async fn test_expired_token_reauthenticates_and_retries_once() {
    let (server, client) = setup().await;
    let client = client.with_credentials(Credentials::new("admin", secret("cisco123")));
    client.set_token(secret("stale"));
    mount_token(&server, "fresh").await;

    Mock::given(method("GET"))
        .and(path("/dna/intent/api/v1/site"))
        .and(header("x-auth-token", "stale"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/dna/intent/api/v1/site"))
        .and(header("x-auth-token", "fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": [{ "id": "s1", "siteNameHierarchy": "Global/HQ" }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let sites = client.list_sites().await.unwrap();

    assert_eq!(sites.len(), 1);
    assert_eq!(sites[0].site_name_hierarchy, "Global/HQ");
    assert_eq!(client.token().unwrap().expose_secret(), "fresh");
}

#[tokio::test]
async fn test_second_unauthorized_surfaces_token_expired() {
    let (server, client) = setup().await;
    let client = client.with_credentials(Credentials::new("admin", secret("cisco123")));
    client.set_token(secret("stale"));
    mount_token(&server, "fresh").await;

    Mock::given(method("GET"))
        .and(path("/dna/intent/api/v1/site"))
        .respond_with(ResponseTemplate::new(401))
        .expect(2)
        .mount(&server)
        .await;

    let result = client.list_sites().await;

    assert!(matches!(result, Err(Error::TokenExpired)), "got: {result:?}");
}

#[tokio::test]
async fn test_unauthorized_without_credentials() {
    let (server, client) = setup().await;
    client.set_token(secret("stale"));

    Mock::given(method("GET"))
        .and(path("/dna/intent/api/v1/site"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let result = client.list_sites().await;

    assert!(matches!(result, Err(Error::TokenExpired)));
}

#[tokio::test]
async fn test_credential_source_answers_401_without_stored_credentials() {
    let (server, client) = setup().await;
    client.set_token(secret("cached"));
    client.set_credential_source(Box::new(|| {
        Some(Credentials::new("admin", secret("cisco123")))
    }));
    mount_token(&server, "fresh").await;

    Mock::given(method("GET"))
        .and(path("/dna/intent/api/v1/site"))
        .and(header("x-auth-token", "cached"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/dna/intent/api/v1/site"))
        .and(header("x-auth-token", "fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "response": [] })))
        .expect(1)
        .mount(&server)
        .await;

    client.list_sites().await.unwrap();

    assert_eq!(client.credentials().unwrap().username, "admin");
}

#[tokio::test]
async fn test_declining_credential_source_fails_authentication() {
    let (server, client) = setup().await;
    client.set_token(secret("cached"));
    client.set_credential_source(Box::new(|| None::<Credentials>));

    Mock::given(method("GET"))
        .and(path("/dna/intent/api/v1/site"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let result = client.list_sites().await;

    assert!(matches!(result, Err(Error::Authentication { .. })), "got: {result:?}");
}

#[tokio::test]
async fn test_token_listener_sees_reissued_token() {
    let (server, client) = setup().await;
    let client = client.with_credentials(Credentials::new("admin", secret("cisco123")));
    client.set_token(secret("stale"));
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    client.set_token_listener(Box::new(move |token: &SecretString| {
        sink.lock().unwrap().push(token.expose_secret().to_owned());
    }));
    mount_token(&server, "fresh").await;

    Mock::given(method("GET"))
        .and(path("/dna/intent/api/v1/site"))
        .and(header("x-auth-token", "stale"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/dna/intent/api/v1/site"))
        .and(header("x-auth-token", "fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "response": [] })))
        .mount(&server)
        .await;

    client.list_sites().await.unwrap();

    assert_eq!(*seen.lock().unwrap(), vec!["fresh".to_owned()]);
}

#[tokio::test]
async fn test_token_probe() {
    let (server, client) = setup().await;
    client.set_token(secret("cached"));

    Mock::given(method("GET"))
        .and(path("/dna/intent/api/v1/diagnostics/system/health"))
        .and(header("x-auth-token", "cached"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    assert!(!client.token_is_valid().await.unwrap());
}

// ── Inventory ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_network_devices_paginate_until_empty() {
    let (server, client) = setup().await;
    client.set_token(secret("tok"));

    Mock::given(method("GET"))
        .and(path("/dna/intent/api/v1/network-device"))
        .and(query_param("offset", "1"))
        .and(query_param("limit", "500"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": [
                { "id": "d1", "hostname": "sw1", "type": "Cisco Catalyst 9300 Switch" },
                { "id": "d2", "hostname": "sw2", "type": "Cisco Catalyst 9300 Switch" }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/dna/intent/api/v1/network-device"))
        .and(query_param("offset", "501"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "response": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let devices = client.list_network_devices().await.unwrap();

    assert_eq!(devices.len(), 2);
    assert_eq!(devices[1].hostname.as_deref(), Some("sw2"));
    assert_eq!(
        devices[0].device_type.as_deref(),
        Some("Cisco Catalyst 9300 Switch")
    );
}

#[tokio::test]
async fn test_network_devices_reauthenticate_mid_pagination() {
    let (server, client) = setup().await;
    let client = client.with_credentials(Credentials::new("admin", secret("cisco123")));
    client.set_token(secret("old"));
    mount_token(&server, "new").await;

    Mock::given(method("GET"))
        .and(path("/dna/intent/api/v1/network-device"))
        .and(query_param("offset", "1"))
        .and(header("x-auth-token", "old"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": [{ "id": "d1", "hostname": "sw1" }]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/dna/intent/api/v1/network-device"))
        .and(query_param("offset", "501"))
        .and(header("x-auth-token", "old"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/dna/intent/api/v1/network-device"))
        .and(query_param("offset", "501"))
        .and(header("x-auth-token", "new"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": [{ "id": "d2", "hostname": "sw2" }]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/dna/intent/api/v1/network-device"))
        .and(query_param("offset", "1001"))
        .and(header("x-auth-token", "new"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "response": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let devices = client.list_network_devices().await.unwrap();

    let ids: Vec<&str> = devices.iter().map(|d| d.id.as_str()).collect();
    assert_eq!(ids, vec!["d1", "d2"]);
}

#[tokio::test]
async fn test_api_error_detail_is_surfaced() {
    let (server, client) = setup().await;
    client.set_token(secret("tok"));

    Mock::given(method("GET"))
        .and(path("/dna/intent/api/v1/network-device/nope"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "response": { "errorCode": "NCND01", "message": "Not found", "detail": "No device with id nope" }
        })))
        .mount(&server)
        .await;

    match client.get_network_device("nope").await {
        Err(err @ Error::Api { .. }) => {
            assert!(err.is_not_found());
            assert!(err.to_string().contains("No device with id nope"));
        }
        other => panic!("expected Api error, got: {other:?}"),
    }
}

// ── PnP ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_list_claimable_pnp_devices() {
    let (server, client) = setup().await;
    client.set_token(secret("tok"));

    Mock::given(method("GET"))
        .and(path("/api/v1/onboarding/pnp-device"))
        .and(query_param("state", "Unclaimed,Planned"))
        .and(query_param("limit", "1000"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "p1", "deviceInfo": { "serialNumber": "FOC123", "state": "Unclaimed" } }
        ])))
        .mount(&server)
        .await;

    let devices = client.list_claimable_pnp_devices().await.unwrap();

    assert_eq!(devices.len(), 1);
    assert_eq!(devices[0].device_info.serial_number.as_deref(), Some("FOC123"));
}

// ── SWIM ────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_distribute_image_returns_task_id() {
    let (server, client) = setup().await;
    client.set_token(secret("tok"));

    Mock::given(method("POST"))
        .and(path("/dna/intent/api/v1/image/distribution"))
        .and(body_json(json!([
            { "deviceUuid": "d1", "imageUuid": "img" },
            { "deviceUuid": "d2", "imageUuid": "img" }
        ])))
        .respond_with(ResponseTemplate::new(202).set_body_json(json!({
            "response": { "taskId": "task-1", "url": "/api/v1/task/task-1" }
        })))
        .mount(&server)
        .await;

    let batch = vec![
        DistributionTarget {
            device_uuid: "d1".into(),
            image_uuid: "img".into(),
        },
        DistributionTarget {
            device_uuid: "d2".into(),
            image_uuid: "img".into(),
        },
    ];
    let handle = client.distribute_image(&batch).await.unwrap();

    assert_eq!(handle.task_id, "task-1");
}

#[tokio::test]
async fn test_image_task_detail() {
    let (server, client) = setup().await;
    client.set_token(secret("tok"));

    Mock::given(method("GET"))
        .and(path("/api/v1/image/task"))
        .and(query_param("taskUuid", "task-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": [
                { "hostName": "sw1", "taskStatus": "success", "deviceId": "d1" },
                { "hostName": "sw2", "taskStatus": "failure", "deviceId": "d2" }
            ]
        })))
        .mount(&server)
        .await;

    let entries = client.image_task_detail("task-1").await.unwrap();

    assert!(entries[0].succeeded());
    assert!(!entries[1].succeeded());
    assert_eq!(entries[1].device_id.as_deref(), Some("d2"));
}

// ── Templates ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_deploy_template_extracts_id() {
    let (server, client) = setup().await;
    client.set_token(secret("tok"));

    Mock::given(method("POST"))
        .and(path("/dna/intent/api/v1/template-programmer/template/deploy"))
        .and(body_json(json!({
            "forcePushTemplate": true,
            "targetInfo": [{ "id": "d1", "type": "MANAGED_DEVICE_UUID" }],
            "templateId": "t1"
        })))
        .respond_with(ResponseTemplate::new(202).set_body_json(json!({
            "deploymentId": "Deployment of  Template: t1 ApplicableTargets: [d1] Template Deployemnt Id: dep-42"
        })))
        .mount(&server)
        .await;

    let id = client
        .deploy_template("t1", &[TargetInfo::managed_device("d1", None)])
        .await
        .unwrap();

    assert_eq!(id, "dep-42");
}
