//! Test helper functions

use ace_client::{FilterSession, HttpApiClient, SessionEvent};
use ace_core::Config;
use serde_json::Value;
use std::sync::{Arc, Once};
use tokio::sync::broadcast;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

static INIT_LOGGER: Once = Once::new();

/// Initialize test logging
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("debug")
            .with_test_writer()
            .try_init();
    });
}

/// Configuration pointing at `server`
pub fn test_config(server: &MockServer) -> Config {
    let mut config = Config::default();
    config.api.base_url = server.uri();
    config.display.utc_offset_minutes = Some(0);
    config
}

/// Session talking HTTP to `server`
pub fn http_session(server: &MockServer) -> FilterSession {
    let config = test_config(server);
    let client = HttpApiClient::from_config(&config.api).expect("client builds");
    FilterSession::new(Arc::new(client), &config)
}

/// Answer `verb path` with `body`, exactly `times` times
pub async fn mount_json(server: &MockServer, verb: &str, route: &str, body: Value, times: u64) {
    Mock::given(method(verb))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(times)
        .mount(server)
        .await;
}

/// Answer `verb path` with an empty 200 response
pub async fn mount_empty(server: &MockServer, verb: &str, route: &str) {
    Mock::given(method(verb))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200))
        .mount(server)
        .await;
}

/// Answer `verb path` with `status`
pub async fn mount_status(server: &MockServer, verb: &str, route: &str, status: u16) {
    Mock::given(method(verb))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

/// Every event received so far
pub fn drain_events(events: &mut broadcast::Receiver<SessionEvent>) -> Vec<SessionEvent> {
    let mut received = Vec::new();
    while let Ok(event) = events.try_recv() {
        received.push(event);
    }
    received
}

/// Whether any event is an alert
pub fn has_alert(events: &[SessionEvent]) -> bool {
    events.iter().any(|e| matches!(e, SessionEvent::Alert(_)))
}

/// Spinner transitions, in order
pub fn spinner_states(events: &[SessionEvent]) -> Vec<bool> {
    events
        .iter()
        .filter_map(|e| match e {
            SessionEvent::SpinnerChanged(on) => Some(*on),
            _ => None,
        })
        .collect()
}
