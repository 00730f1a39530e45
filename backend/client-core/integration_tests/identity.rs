use crate::helpers::{TEST_ACCESS_TOKEN, test_credential};

use hibiscus_core::error::identity::IdentityError;
use hibiscus_core::identity::{HttpIdentityProvider, IdentityProvider};

use common::{HttpStatusCode, RedactedToken};

use std::time::Duration;

use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CHALLENGE: &str = "challenge-1";

fn provider(core_url: &str) -> HttpIdentityProvider {
    HttpIdentityProvider::new(
        core_url,
        Duration::from_secs(2),
        Duration::from_secs(5),
        Some(test_credential()),
    )
    .expect("Failed to build identity provider")
}

fn join_server_mock() -> wiremock::MockBuilder {
    Mock::given(method("POST"))
        .and(path("/api/v1/joinServer"))
        .and(header("authorization", TEST_ACCESS_TOKEN))
        .and(header("x-server-key", CHALLENGE))
}

/// **VALUE**: A 200 from the identity core accepts the challenge.
///
/// **WHY THIS MATTERS**: This is the only path by which a signed-in user enters a secured server.
///
/// **BUG THIS CATCHES**: Would catch if:
/// - The token or challenge key travel in the wrong headers
/// - The join URL drops the base path
#[tokio::test]
async fn given_core_accepts_when_verifying_then_ok() {
    // GIVEN
    let mock_server = MockServer::start().await;
    join_server_mock()
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;
    let provider = provider(&mock_server.uri());

    // WHEN
    let result = provider
        .verify_server_challenge(RedactedToken::new(TEST_ACCESS_TOKEN), CHALLENGE.to_string())
        .await;

    // THEN
    assert!(result.is_ok(), "Verification should succeed: {:?}", result.err());
}

/// **VALUE**: A client error is final and reported with its status.
///
/// **WHY THIS MATTERS**: Retrying a rejected token only delays the rejection shown to the user.
///
/// **BUG THIS CATCHES**: Would catch if 4xx responses are retried.
#[tokio::test]
async fn given_core_rejects_when_verifying_then_rejected_without_retry() {
    // GIVEN
    let mock_server = MockServer::start().await;
    join_server_mock()
        .respond_with(ResponseTemplate::new(401).set_body_string("bad token"))
        .expect(1)
        .mount(&mock_server)
        .await;
    let provider = provider(&mock_server.uri());

    // WHEN
    let result = provider
        .verify_server_challenge(RedactedToken::new(TEST_ACCESS_TOKEN), CHALLENGE.to_string())
        .await;

    // THEN
    match result {
        Err(IdentityError::Rejected {
            status_code,
            message,
            ..
        }) => {
            assert_eq!(status_code, HttpStatusCode(401));
            assert_eq!(message, "bad token");
        }
        other => panic!("Expected rejection, got {:?}", other),
    }
}

/// **VALUE**: A transient outage of the identity core is retried.
///
/// **WHY THIS MATTERS**: Identity core restarts would otherwise kick every joining user.
///
/// **BUG THIS CATCHES**: Would catch if 503 responses are treated as final.
#[tokio::test]
async fn given_core_unavailable_once_when_verifying_then_retried_and_ok() {
    // GIVEN: One 503, then success
    let mock_server = MockServer::start().await;
    join_server_mock()
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .with_priority(1)
        .expect(1)
        .mount(&mock_server)
        .await;
    join_server_mock()
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;
    let provider = provider(&mock_server.uri());

    // WHEN
    let result = provider
        .verify_server_challenge(RedactedToken::new(TEST_ACCESS_TOKEN), CHALLENGE.to_string())
        .await;

    // THEN
    assert!(result.is_ok(), "Retry should succeed: {:?}", result.err());
}

/// **VALUE**: The join endpoint is resolved under the core URL's path.
///
/// **WHY THIS MATTERS**: Cores are often deployed behind a path prefix.
///
/// **BUG THIS CATCHES**: Would catch if `Url::join` replaces the last path segment.
#[test]
fn given_core_url_with_prefix_when_built_then_join_url_keeps_prefix() {
    let provider = provider("https://core.example.com/identity");

    assert_eq!(
        provider.join_url().as_str(),
        "https://core.example.com/identity/api/v1/joinServer"
    );
}

/// **VALUE**: A malformed core URL fails at construction, not at first login.
///
/// **WHY THIS MATTERS**: Configuration mistakes should surface at startup.
///
/// **BUG THIS CATCHES**: Would catch if the URL is only parsed lazily.
#[test]
fn given_invalid_core_url_when_built_then_error() {
    let result = HttpIdentityProvider::new(
        "not a url",
        Duration::from_secs(1),
        Duration::from_secs(1),
        None,
    );

    assert!(result.is_err());
}
