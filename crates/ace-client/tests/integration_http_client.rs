//! Integration tests for the HTTP API client

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::indexing_slicing,
    clippy::missing_panics_doc
)]

mod common;

use ace_client::{ContactSearchApi, Endpoint, HttpApiClient};
use ace_core::{DateRange, Error, config::ApiConfig};
use common::*;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::time::Duration;
use tokio_test::{assert_err, assert_ok};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_json, header, method, path, query_param},
};

#[tokio::test]
async fn test_sends_session_cookie_and_api_key() {
    init_test_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(Endpoint::SavedFilters.path()))
        .and(header("cookie", "JSESSIONID=abc123"))
        .and(header("x-api-key", "secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(SavedFilterFixtures::response()))
        .expect(1)
        .mount(&server)
        .await;

    let client = HttpApiClient::from_config(&ApiConfig {
        base_url: server.uri(),
        session_cookie: Some("JSESSIONID=abc123".to_string()),
        api_key: Some("secret".to_string()),
        ..ApiConfig::default()
    })
    .unwrap();

    let filters = assert_ok!(client.saved_filters().await);
    assert_eq!(filters.len(), 3);
}

#[tokio::test]
async fn test_filter_key_is_url_encoded() {
    init_test_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(Endpoint::Filter.path()))
        .and(query_param("key", "team a&b"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "filters": {"range": "date_range_yesterday", "phoneNumber": "5551234"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = HttpApiClient::new(server.uri()).unwrap();
    let criteria = client.filter("team a&b").await.unwrap();
    assert_eq!(criteria.date_range, Some(DateRange::Yesterday));
    assert_eq!(criteria.phone_number.as_deref(), Some("5551234"));
}

#[tokio::test]
async fn test_unauthorized_maps_to_unauthorized_error() {
    init_test_logging();
    let server = MockServer::start().await;
    mount_status(&server, "GET", Endpoint::Org.path(), 401).await;

    let client = HttpApiClient::new(server.uri()).unwrap();
    let err = assert_err!(client.org().await);
    assert!(err.is_unauthorized());
}

#[tokio::test]
async fn test_server_error_maps_to_upstream_error() {
    init_test_logging();
    let server = MockServer::start().await;
    mount_status(&server, "GET", Endpoint::Org.path(), 503).await;

    let client = HttpApiClient::new(server.uri()).unwrap();
    match client.org().await.unwrap_err() {
        Error::Upstream {
            endpoint, status, ..
        } => {
            assert_eq!(endpoint, "/api/ace/get_org");
            assert_eq!(status, Some(503));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_malformed_body_is_upstream_error() {
    init_test_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(Endpoint::Org.path()))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
        .mount(&server)
        .await;

    let client = HttpApiClient::new(server.uri()).unwrap();
    let err = client.org().await.unwrap_err();
    assert!(matches!(err, Error::Upstream { status: Some(200), .. }));
}

#[tokio::test]
async fn test_slow_upstream_times_out() {
    init_test_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(Endpoint::SavedFilters.path()))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(SavedFilterFixtures::response())
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let client = HttpApiClient::from_config(&ApiConfig {
        base_url: server.uri(),
        request_timeout: 1,
        ..ApiConfig::default()
    })
    .unwrap();

    let err = client.saved_filters().await.unwrap_err();
    assert!(matches!(err, Error::Timeout { seconds: 1, .. }));
}

#[tokio::test]
async fn test_empty_recent_search_forms_are_none() {
    init_test_logging();
    for body in [None, Some(json!(null)), Some(json!({}))] {
        let server = MockServer::start().await;
        let response = match body {
            Some(body) => ResponseTemplate::new(200).set_body_json(body),
            None => ResponseTemplate::new(200),
        };
        Mock::given(method("GET"))
            .and(path(Endpoint::RecentSearch.path()))
            .respond_with(response)
            .mount(&server)
            .await;

        let client = HttpApiClient::new(server.uri()).unwrap();
        assert_eq!(client.recent_search().await.unwrap(), None);
    }
}

#[tokio::test]
async fn test_contact_and_count_queries_post_params() {
    init_test_logging();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(Endpoint::Contacts.path()))
        .and(body_json(json!({"count_max": 49, "count_min": 0, "params": "contactId=42"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(ContactFixtures::page()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(Endpoint::Contacts.path()))
        .and(body_json(json!({
            "count_max": 49,
            "count_min": 0,
            "params": "contactId=42&searchStats=true"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"count": "12"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = HttpApiClient::new(server.uri()).unwrap();
    let contacts = client.contacts("contactId=42").await.unwrap();
    assert_eq!(contacts.len(), 1);
    assert_eq!(contacts[0].id.as_str(), "1001");
    assert_eq!(
        client.contact_count("contactId=42&searchStats=true").await.unwrap(),
        12
    );
}

#[tokio::test]
async fn test_count_response_without_count_is_error() {
    init_test_logging();
    let server = MockServer::start().await;
    mount_json(&server, "POST", Endpoint::Contacts.path(), json!({"contacts": []}), 1).await;

    let client = HttpApiClient::new(server.uri()).unwrap();
    let err = client.contact_count("range=date_range_today&searchStats=true").await;
    assert!(matches!(err, Err(Error::Upstream { .. })));
}
