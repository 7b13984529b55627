//! Shared helpers for mock-server tests

use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use stratoqa::config::Config;
use stratoqa::poll::WaitOpts;

pub const TEST_TOKEN: &str = "test-token";

/// Mount the keystone token endpoint; every client call authenticates
/// against it first.
pub async fn mount_token_endpoint(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/keystone/v3/auth/tokens"))
        .respond_with(
            ResponseTemplate::new(201)
                .insert_header("X-Subject-Token", TEST_TOKEN)
                .set_body_json(json!({
                    "token": { "methods": ["password"] }
                })),
        )
        .mount(server)
        .await;
}

/// Config pointing every service at the mock server
pub fn mock_config(server: &MockServer) -> Config {
    Config::for_tests(&server.uri(), &server.uri())
}

/// Millisecond polling budget so scenario waits don't slow the suite
pub fn fast_wait() -> WaitOpts {
    WaitOpts {
        interval: Duration::from_millis(5),
        max_attempts: 20,
        missing_matches: false,
    }
}
