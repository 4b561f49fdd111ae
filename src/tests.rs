//! # Tests Module
//!
//! Tests for the threadcast service outside the thread and Twitter modules
//! (which carry their own test files).
//!
//! ## Test Categories
//!
//! ### Unit Tests
//! - Configuration loading (`BotConfig::from_vars`, `get_server_port`)
//! - Text sanitizing
//! - Poll cycles against an in-memory platform
//!
//! ### Integration Tests
//! - HTTP endpoint testing for all routes

use axum::{
    body::Body,
    http::{Request, StatusCode},
    response::Json,
    routing::get,
    Router,
};
use http_body_util::BodyExt;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, RwLock};
use tower::ServiceExt;

use crate::config::{get_server_port, mask_secret, parse_hashtags, BotConfig};
use crate::error::ThreadError;
use crate::handlers::{handle_health, handle_root, handle_status};
use crate::poller::{build_message, CycleReport, PollSettings, PollStatus, Poller, SharedStatus};
use crate::sanitizer::{first_line, sanitize};
use crate::test_support::{searched, test_vars, FakePlatform};
use crate::thread::{AttachmentResolver, ComposeOptions};

/// Creates a test application instance with all routes configured.
fn create_test_app(status: SharedStatus) -> Router {
    Router::new()
        .route("/", get(handle_root))
        .route("/health", get(handle_health))
        .route("/status", get(handle_status))
        .with_state(status)
}

fn new_status() -> SharedStatus {
    Arc::new(RwLock::new(PollStatus::default()))
}

async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .uri(uri)
        .method("GET")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&body).unwrap())
}

fn config_from(extra: &[(&str, &str)]) -> Result<BotConfig, Box<dyn std::error::Error + Send + Sync>> {
    let vars = test_vars(extra);
    BotConfig::from_vars(|name| vars.get(name).cloned())
}

/// A unique output file under the system temp directory.
fn temp_output(name: &str) -> String {
    let path = std::env::temp_dir().join(format!(
        "threadcast-{}-{}.txt",
        name,
        std::process::id()
    ));
    let _ = std::fs::remove_file(&path);
    path.to_string_lossy().into_owned()
}

fn poll_settings(output_file: &str) -> PollSettings {
    PollSettings {
        search_keyword: "rust".to_string(),
        hashtags: vec!["#rust".to_string()],
        compose: ComposeOptions::default(),
        post_delay: None,
        poll_interval: Duration::from_secs(10),
        output_file: output_file.to_string(),
    }
}

fn poller(api: FakePlatform, settings: PollSettings, status: SharedStatus) -> Poller {
    Poller::new(
        Arc::new(api),
        AttachmentResolver::new(Duration::from_secs(5)).unwrap(),
        settings,
        status,
    )
}

// Handlers

#[tokio::test]
async fn test_handle_root() {
    let response = handle_root().await;
    assert_eq!(response, "threadcast is polling and threading.");
}

#[tokio::test]
async fn test_handle_health() {
    let Json(json_response) = handle_health().await;
    assert_eq!(json_response["status"], "healthy");
    assert_eq!(json_response["service"], "threadcast");
}

#[tokio::test]
async fn test_root_endpoint() {
    let app = create_test_app(new_status());

    let request = Request::builder()
        .uri("/")
        .method("GET")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body_str = String::from_utf8(body.to_vec()).unwrap();
    assert_eq!(body_str, "threadcast is polling and threading.");
}

#[tokio::test]
async fn test_health_endpoint() {
    let (status, json_response) = get_json(create_test_app(new_status()), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_response["status"], "healthy");
    assert_eq!(json_response["service"], "threadcast");
}

#[tokio::test]
async fn test_status_endpoint_before_first_cycle() {
    let (status, json_response) = get_json(create_test_app(new_status()), "/status").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_response["cycles"], 0);
    assert!(json_response["last_report"].is_null());
    assert!(json_response["last_error"].is_null());
}

#[tokio::test]
async fn test_status_endpoint_reports_last_cycle() {
    let shared = new_status();
    {
        let mut status = shared.write().await;
        status.cycles = 2;
        status.last_report = Some(CycleReport {
            found: 3,
            queued: 3,
            published: 3,
        });
    }

    let (status, json_response) = get_json(create_test_app(shared), "/status").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_response["cycles"], 2);
    assert_eq!(json_response["last_report"]["published"], 3);
}

// Configuration

#[test]
fn test_config_defaults() {
    let config = config_from(&[]).unwrap();
    assert_eq!(config.search_keyword, "rust");
    assert_eq!(config.credentials.consumer_key, "test-consumer-key-123");
    assert_eq!(config.credentials.access_token_secret, "test-access-secret-000");
    assert!(config.hashtags.is_empty());
    assert_eq!(config.mention_user, None);
    assert!(config.append_position_marker);
    assert_eq!(config.max_chars, 280);
    assert_eq!(config.post_delay, Some(Duration::from_secs(2)));
    assert_eq!(config.poll_interval, Duration::from_secs(10));
    assert_eq!(config.http_timeout, Duration::from_secs(30));
    assert_eq!(config.output_file, "new_tweets.txt");
    assert_eq!(config.api_base_url, "https://api.twitter.com");
    assert_eq!(config.upload_base_url, "https://upload.twitter.com");
}

#[test]
fn test_config_overrides() {
    let config = config_from(&[
        ("HASH_TAGS", "#rust|#bots"),
        ("MENTION_USER", "@alice"),
        ("APPEND_POSITION_MARKER", "false"),
        ("MAX_CHARS", "500"),
        ("POST_DELAY_SECS", "0"),
        ("POLL_INTERVAL_SECS", "60"),
        ("API_BASE_URL", "http://localhost:9999/"),
    ])
    .unwrap();

    assert_eq!(config.hashtags, vec!["#rust", "#bots"]);
    assert_eq!(config.hashtag_suffix(), "#rust #bots");
    assert_eq!(config.mention_user.as_deref(), Some("alice"));
    assert_eq!(config.post_delay, None);
    assert_eq!(config.poll_interval, Duration::from_secs(60));
    assert_eq!(config.api_base_url, "http://localhost:9999");
    assert_eq!(
        config.compose_options(),
        ComposeOptions {
            mention_user: Some("alice".to_string()),
            append_position_marker: false,
            max_chars: 500,
        }
    );
}

#[test]
fn test_config_requires_credentials_and_keyword() {
    for name in [
        "CONSUMER_KEY",
        "CONSUMER_SECRET",
        "ACCESS_TOKEN_KEY",
        "ACCESS_TOKEN_SECRET",
        "SEARCH_KEYWORD",
    ] {
        let mut vars = test_vars(&[]);
        vars.remove(name);
        let result = BotConfig::from_vars(|key| vars.get(key).cloned());
        let err = result.unwrap_err().to_string();
        assert!(err.contains(name), "{} missing gave: {}", name, err);
    }

    assert!(config_from(&[("CONSUMER_KEY", "   ")]).is_err());
}

#[test]
fn test_config_rejects_bad_values() {
    assert!(config_from(&[("MAX_CHARS", "lots")]).is_err());
    assert!(config_from(&[("MAX_CHARS", "0")]).is_err());
    assert!(config_from(&[("POST_DELAY_SECS", "-1")]).is_err());
    assert!(config_from(&[("APPEND_POSITION_MARKER", "maybe")]).is_err());
}

#[test]
fn test_parse_hashtags() {
    assert_eq!(parse_hashtags("#a| #b ||#c"), vec!["#a", "#b", "#c"]);
    assert!(parse_hashtags("").is_empty());
}

#[test]
fn test_mask_secret() {
    assert_eq!(mask_secret("short"), "...");
    assert_eq!(mask_secret("0123456789ab"), "01234567...");
    assert_eq!(
        mask_secret("0123456789abcdefghij"),
        "01234567...cdefghij"
    );
}

/// Unit test for the get_server_port function.
#[test]
fn test_get_server_port() {
    // Test default port
    std::env::remove_var("PORT");
    let port = get_server_port();
    assert_eq!(port, 3000);

    // Test custom port
    std::env::set_var("PORT", "8080");
    let port = get_server_port();
    assert_eq!(port, 8080);

    // Clean up
    std::env::remove_var("PORT");
}

// Sanitizer

#[test]
fn test_first_line() {
    assert_eq!(first_line("one\ntwo\nthree"), "one");
    assert_eq!(first_line("single"), "single");
    assert_eq!(first_line(""), "");
}

#[test]
fn test_sanitize_strips_ascii_alphanumerics_literally() {
    let none: [&str; 0] = [];
    assert_eq!(sanitize("Hello @bob café 🎉 https://t.co/x", &none), "  é 🎉 .");
    assert_eq!(sanitize("Price: $5 [sale]! 50% off", &none), " $ ]! % ");
    assert_eq!(sanitize("@]] test", &none), " ");
    assert_eq!(sanitize("日本語 text 2024\nignored", &none), "日本語  ");
}

#[test]
fn test_sanitize_removes_hashtags_first() {
    assert_eq!(sanitize("café ☕ #rust", &["#rust"]), "é ☕ ");
    assert_eq!(sanitize("ñ #ñandú ñ", &["#ñandú"]), "ñ  ñ");
}

#[test]
fn test_build_message() {
    assert_eq!(build_message("é ☕ ", "#rust #bots"), " é ☕ #rust #bots");
    assert_eq!(build_message("", ""), "  ");
}

// Poller

#[tokio::test]
async fn test_poll_once_publishes_sanitized_thread() {
    let output = temp_output("poll-once");
    let api = FakePlatform::new().with_search_results(vec![
        searched("1", "café ☕ #rust\nmore text"),
        searched("2", "日本語 text 2024"),
    ]);
    let status = new_status();
    let poller = poller(api, poll_settings(&output), status);

    let report = poller.poll_once().await.unwrap();
    assert_eq!(
        report,
        CycleReport {
            found: 2,
            queued: 2,
            published: 2,
        }
    );

    let written = std::fs::read_to_string(&output).unwrap();
    assert_eq!(written, "é ☕ \n日本語  \n");
    let _ = std::fs::remove_file(&output);
}

#[tokio::test]
async fn test_poll_once_sends_hashtag_suffixed_reply_chain() {
    let output = temp_output("poll-chain");
    let api = Arc::new(FakePlatform::new().with_search_results(vec![
        searched("1", "café ☕ #rust"),
        searched("2", "日本語 text 2024"),
    ]));
    let poller = Poller::new(
        api.clone(),
        AttachmentResolver::new(Duration::from_secs(5)).unwrap(),
        poll_settings(&output),
        new_status(),
    );

    poller.poll_once().await.unwrap();

    let requests = api.sent_requests();
    assert_eq!(requests[0].text, " é ☕ #rust 1/");
    assert_eq!(requests[1].text, " 日本語 #rust 2x");
    assert_eq!(requests[1].reply_to(), Some("1000"));
    let _ = std::fs::remove_file(&output);
}

#[tokio::test]
async fn test_poll_once_with_single_match_is_a_validation_error() {
    let output = temp_output("poll-single");
    let api = FakePlatform::new().with_search_results(vec![searched("1", "only one")]);
    let poller = poller(api, poll_settings(&output), new_status());

    let err = poller.poll_once().await.unwrap_err();
    assert!(matches!(err, ThreadError::Validation(_)));

    // The scraped line is still logged to the output file
    assert_eq!(std::fs::read_to_string(&output).unwrap(), " \n");
    let _ = std::fs::remove_file(&output);
}

#[tokio::test]
async fn test_check_mention_user() {
    let output = temp_output("mention");
    let mut settings = poll_settings(&output);
    settings.compose.mention_user = Some("alice".to_string());

    let known = poller(FakePlatform::new().with_user("alice"), settings.clone(), new_status());
    assert!(known.check_mention_user().await.is_ok());

    let unknown = poller(FakePlatform::new(), settings, new_status());
    assert!(matches!(
        unknown.check_mention_user().await,
        Err(ThreadError::Validation(_))
    ));
}

#[tokio::test]
async fn test_run_refuses_to_start_with_unknown_mention_user() {
    let output = temp_output("run-unknown");
    let mut settings = poll_settings(&output);
    settings.compose.mention_user = Some("ghost".to_string());
    let status = new_status();
    let poller = poller(FakePlatform::new(), settings, status.clone());

    let (_tx, rx) = watch::channel(false);
    assert!(poller.run(rx).await.is_err());
    assert_eq!(status.read().await.cycles, 0);
}

#[tokio::test(start_paused = true)]
async fn test_run_polls_on_interval_until_shutdown() {
    let output = temp_output("run-loop");
    let api = FakePlatform::new().with_search_results(vec![
        searched("1", "first ✓"),
        searched("2", "second ✓"),
    ]);
    let status = new_status();
    let poller = Arc::new(poller(api, poll_settings(&output), status.clone()));

    let (tx, rx) = watch::channel(false);
    let running = Arc::clone(&poller);
    let handle = tokio::spawn(async move { running.run(rx).await });

    // Cycles run at 0s, 10s and 20s
    tokio::time::sleep(Duration::from_secs(25)).await;
    tx.send(true).unwrap();
    handle.await.unwrap().unwrap();

    let status = status.read().await;
    assert_eq!(status.cycles, 3);
    assert!(status.last_cycle_at.is_some());
    assert_eq!(status.last_error, None);
    assert_eq!(status.last_report.as_ref().map(|r| r.published), Some(2));

    let written = std::fs::read_to_string(&output).unwrap();
    assert_eq!(written.lines().count(), 6);
    let _ = std::fs::remove_file(&output);
}

#[tokio::test]
async fn test_run_records_failed_cycles_and_continues() {
    let output = temp_output("run-fail");
    let status = new_status();
    let poller = poller(FakePlatform::new(), poll_settings(&output), status.clone());

    let (tx, rx) = watch::channel(false);
    let stop = async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        tx.send(true).unwrap();
    };
    let (result, _) = tokio::join!(poller.run(rx), stop);
    assert!(result.is_ok());

    let status = status.read().await;
    assert_eq!(status.cycles, 1);
    assert!(status
        .last_error
        .as_deref()
        .unwrap_or_default()
        .contains("two or more messages"));
    let _ = std::fs::remove_file(&output);
}
