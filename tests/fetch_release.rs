//! Release API contract tests
//!
//! Verify the request the checker sends to the release endpoint and how each
//! kind of bad response is classified.

use fab_updater::cache::{CacheStore, FileCache};
use fab_updater::config::UpdateCheckerConfig;
use fab_updater::filesystem::LocalFilesystem;
use fab_updater::host::{HostInfo, UpdateState};
use fab_updater::release::{GitHubReleaseSource, ReleaseSource};
use fab_updater::{FetchError, ReleaseUpdateChecker};
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const RELEASE_PATH: &str = "/repos/amitjha329/floating-action-button/releases/latest";

fn source_for(server: &MockServer) -> GitHubReleaseSource {
    GitHubReleaseSource::new(
        format!("{}{}", server.uri(), RELEASE_PATH),
        "6.4.2",
        "https://example.com",
    )
    .unwrap()
}

fn release_json() -> serde_json::Value {
    json!({
        "tag_name": "v1.2.0",
        "html_url": "https://github.com/amitjha329/floating-action-button/releases/tag/v1.2.0",
        "zipball_url": "https://api.github.com/repos/amitjha329/floating-action-button/zipball/v1.2.0",
        "published_at": "2024-03-05T10:00:00Z",
        "name": "v1.2.0",
        "body": "## Fixes\n- bug A\n- bug B",
        "assets": []
    })
}

#[tokio::test]
async fn test_request_sends_accept_and_user_agent() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(RELEASE_PATH))
        .and(header("accept", "application/vnd.github.v3+json"))
        .and(header("user-agent", "WordPress/6.4.2; https://example.com"))
        .respond_with(ResponseTemplate::new(200).set_body_json(release_json()))
        .expect(1)
        .mount(&server)
        .await;

    let release = source_for(&server).fetch_latest().await.unwrap();
    assert_eq!(release.version(), Some("1.2.0"));
    assert_eq!(release.published_at.as_deref(), Some("2024-03-05T10:00:00Z"));
}

#[tokio::test]
async fn test_non_200_status_is_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(RELEASE_PATH))
        .respond_with(
            ResponseTemplate::new(403).set_body_json(json!({"message": "rate limited"})),
        )
        .mount(&server)
        .await;

    let err = source_for(&server).fetch_latest().await.unwrap_err();
    assert!(matches!(err, FetchError::Status(403)), "got {:?}", err);
}

#[tokio::test]
async fn test_empty_body_is_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(RELEASE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(""))
        .mount(&server)
        .await;

    let err = source_for(&server).fetch_latest().await.unwrap_err();
    assert!(matches!(err, FetchError::EmptyBody), "got {:?}", err);
}

#[tokio::test]
async fn test_invalid_json_is_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(RELEASE_PATH))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("{\"tag_name\": \"v1.2.0\""),
        )
        .mount(&server)
        .await;

    let err = source_for(&server).fetch_latest().await.unwrap_err();
    assert!(matches!(err, FetchError::InvalidJson(_)), "got {:?}", err);
}

#[tokio::test]
async fn test_unreachable_host_is_an_error() {
    let source = GitHubReleaseSource::new(
        format!("http://127.0.0.1:1{}", RELEASE_PATH),
        "6.4.2",
        "https://example.com",
    )
    .unwrap();

    let err = source.fetch_latest().await.unwrap_err();
    assert!(matches!(err, FetchError::Transport(_)), "got {:?}", err);
}

fn checker_for(
    server: &MockServer,
    cache_dir: &std::path::Path,
    plugins_dir: &std::path::Path,
) -> ReleaseUpdateChecker {
    let mut config = UpdateCheckerConfig::create(
        plugins_dir.join("floating-action-button/floating-action-button.php"),
        "amitjha329",
        "floating-action-button",
    )
    .with_api_base(&server.uri(), "amitjha329", "floating-action-button");
    config.current_version = "1.1.0".to_string();

    let host = HostInfo {
        version: "6.4.2".into(),
        url: "https://example.com".into(),
        plugins_dir: plugins_dir.to_path_buf(),
    };
    let source = source_for(server);
    ReleaseUpdateChecker::new(
        config,
        host,
        Arc::new(source),
        Arc::new(FileCache::new(cache_dir)),
        Arc::new(LocalFilesystem),
    )
}

fn primed_state() -> UpdateState {
    let mut state = UpdateState::default();
    state.checked.insert(
        "floating-action-button/floating-action-button.php".into(),
        "1.1.0".into(),
    );
    state
}

#[tokio::test]
async fn test_outage_is_cached_for_the_window() {
    let server = MockServer::start().await;
    let cache_dir = tempfile::tempdir().unwrap();
    let plugins_dir = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path(RELEASE_PATH))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let checker = checker_for(&server, cache_dir.path(), plugins_dir.path());
    for _ in 0..3 {
        let state = checker.check_for_update(primed_state()).await;
        assert!(state.response.is_empty());
    }

    let cached = FileCache::new(cache_dir.path())
        .get(&checker.config().cache_key)
        .unwrap();
    assert!(cached.is_failure());
}

#[tokio::test]
async fn test_update_offered_from_persisted_cache() {
    let server = MockServer::start().await;
    let cache_dir = tempfile::tempdir().unwrap();
    let plugins_dir = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path(RELEASE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(release_json()))
        .expect(1)
        .mount(&server)
        .await;

    let first = checker_for(&server, cache_dir.path(), plugins_dir.path());
    let state = first.check_for_update(primed_state()).await;
    assert_eq!(
        state.response["floating-action-button/floating-action-button.php"].new_version,
        "1.2.0"
    );

    // A fresh checker over the same cache directory must not hit the API again
    let second = checker_for(&server, cache_dir.path(), plugins_dir.path());
    let state = second.check_for_update(primed_state()).await;
    assert_eq!(state.response.len(), 1);
}
