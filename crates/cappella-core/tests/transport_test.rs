//! HTTP transport integration tests
//!
//! Runs `HttpTransport` against a wiremock server standing in for the
//! profile service.

use cappella_core::transport::{IMAGE_CONTENT_TYPE, IMAGE_FILENAME};
use cappella_core::{ClientConfig, Gender, HttpTransport, ProfileTransport, ProfileUpdate, TransportError};
use serde_json::json;
use wiremock::matchers::{header_regex, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const RESOURCE: &str = "baby-profile-test/e71b3147-01f5-42bb";
const FETCH_PATH: &str = "/api/user/baby-profile-test/e71b3147-01f5-42bb/";
const UPDATE_PATH: &str = "/api/user/baby-profile-test/e71b3147-01f5-42bb/abc/";

fn profile_json(name: &str) -> serde_json::Value {
    json!({
        "id": "abc",
        "name": name,
        "dob": "2023-5-1",
        "gender": "female",
        "profile_picture": "https://x/y.jpg"
    })
}

fn transport_for(server: &MockServer) -> HttpTransport {
    let config = ClientConfig {
        base_url: server.uri(),
        resource_path: RESOURCE.to_string(),
        ..ClientConfig::default()
    };
    HttpTransport::new(&config).expect("Failed to build transport")
}

/// Body of the only request the server received, lowercased for header checks
async fn single_request_body(server: &MockServer) -> String {
    let requests = server
        .received_requests()
        .await
        .expect("Request recording disabled");
    assert_eq!(requests.len(), 1);
    String::from_utf8_lossy(&requests[0].body).to_lowercase()
}

#[tokio::test]
async fn test_fetch_decodes_profile() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(FETCH_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(profile_json("Mia")))
        .expect(1)
        .mount(&server)
        .await;

    let profile = transport_for(&server)
        .fetch_profile()
        .await
        .expect("Fetch failed");

    assert_eq!(profile.id, "abc");
    assert_eq!(profile.name, "Mia");
    assert_eq!(profile.date_of_birth, "2023-5-1");
    assert_eq!(profile.gender, Some(Gender::Female));
    assert_eq!(profile.profile_picture_url, "https://x/y.jpg");
}

#[tokio::test]
async fn test_fetch_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(FETCH_PATH))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = transport_for(&server).fetch_profile().await.unwrap_err();
    assert!(matches!(err, TransportError::Http { status: 500 }));
}

#[tokio::test]
async fn test_fetch_empty_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(FETCH_PATH))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let err = transport_for(&server).fetch_profile().await.unwrap_err();
    assert!(matches!(err, TransportError::EmptyBody));
}

#[tokio::test]
async fn test_fetch_null_body_counts_as_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(FETCH_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("null"))
        .mount(&server)
        .await;

    let err = transport_for(&server).fetch_profile().await.unwrap_err();
    assert!(matches!(err, TransportError::EmptyBody));
}

#[tokio::test]
async fn test_fetch_malformed_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(FETCH_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("{\"id\": \"abc\""))
        .mount(&server)
        .await;

    let err = transport_for(&server).fetch_profile().await.unwrap_err();
    assert!(matches!(err, TransportError::Decode(_)));
}

#[tokio::test]
async fn test_fetch_network_failure() {
    let config = ClientConfig {
        // Port 1 is reserved and refuses connections
        base_url: "http://127.0.0.1:1/".to_string(),
        ..ClientConfig::default()
    };
    let transport = HttpTransport::new(&config).unwrap();

    let err = transport.fetch_profile().await.unwrap_err();
    assert!(matches!(err, TransportError::Network(_)), "got {err:?}");
}

#[tokio::test]
async fn test_update_without_image_sends_text_parts_only() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path(UPDATE_PATH))
        .and(header_regex("content-type", "^multipart/form-data"))
        .respond_with(ResponseTemplate::new(200).set_body_json(profile_json("Mia")))
        .expect(1)
        .mount(&server)
        .await;

    let update = ProfileUpdate::new("Mia", "2023-5-1", Gender::Female);
    transport_for(&server)
        .update_profile("abc", &update)
        .await
        .expect("Update failed");

    let body = single_request_body(&server).await;
    assert!(body.contains("name=\"name\""));
    assert!(body.contains("name=\"dob\""));
    assert!(body.contains("name=\"gender\""));
    assert!(body.contains("2023-5-1"));
    assert!(body.contains("content-type: text/plain"));
    assert!(!body.contains("name=\"profile_picture\""));
    assert!(!body.contains(IMAGE_FILENAME));
}

#[tokio::test]
async fn test_update_with_image_sends_one_picture_part() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path(UPDATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(profile_json("Mia")))
        .expect(1)
        .mount(&server)
        .await;

    let update =
        ProfileUpdate::new("Mia", "2023-5-1", Gender::Female).with_image(b"JPEGDATA".to_vec());
    transport_for(&server)
        .update_profile("abc", &update)
        .await
        .expect("Update failed");

    let body = single_request_body(&server).await;
    assert_eq!(body.matches("name=\"profile_picture\"").count(), 1);
    assert_eq!(
        body.matches(&format!("filename=\"{IMAGE_FILENAME}\"")).count(),
        1
    );
    assert_eq!(
        body.matches(&format!("content-type: {IMAGE_CONTENT_TYPE}")).count(),
        1
    );
    assert!(body.contains("jpegdata"));
}

#[tokio::test]
async fn test_update_returns_server_profile() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path(UPDATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(profile_json("Mia Rose")))
        .mount(&server)
        .await;

    let update = ProfileUpdate::new("Mia", "2023-5-1", Gender::Female);
    let profile = transport_for(&server)
        .update_profile("abc", &update)
        .await
        .expect("Update failed");

    assert_eq!(profile.name, "Mia Rose");
}

#[tokio::test]
async fn test_update_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let update = ProfileUpdate::new("Mia", "2023-5-1", Gender::Female);
    let err = transport_for(&server)
        .update_profile("missing", &update)
        .await
        .unwrap_err();
    assert!(matches!(err, TransportError::Http { status: 404 }));
}

#[tokio::test]
async fn test_fetch_decodes_freshly_created_profile() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(FETCH_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "abc",
            "name": "",
            "dob": "",
            "gender": "",
            "profile_picture": null
        })))
        .mount(&server)
        .await;

    let profile = transport_for(&server)
        .fetch_profile()
        .await
        .expect("Fetch failed");

    assert_eq!(profile.id, "abc");
    assert_eq!(profile.name, "");
    assert_eq!(profile.date_of_birth, "");
    assert_eq!(profile.gender, None);
    assert_eq!(profile.profile_picture_url, "");
}

#[tokio::test]
async fn test_update_empty_body() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path(UPDATE_PATH))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let update = ProfileUpdate::new("Mia", "2023-5-1", Gender::Female);
    let err = transport_for(&server)
        .update_profile("abc", &update)
        .await
        .unwrap_err();
    assert!(matches!(err, TransportError::EmptyBody), "got {err:?}");
}

#[tokio::test]
async fn test_update_malformed_body() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path(UPDATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let update = ProfileUpdate::new("Mia", "2023-5-1", Gender::Female);
    let err = transport_for(&server)
        .update_profile("abc", &update)
        .await
        .unwrap_err();
    assert!(matches!(err, TransportError::Decode(_)), "got {err:?}");
}
