//! FILENAME: tests/test_refresh.rs
//! Integration tests for dataset fetches, supersession and fetch failures.

mod common;

use std::io::Write;

use app_lib::commands;
use app_lib::{AppConfig, AppError, SetFilterParams};
use common::{InsightFixture, TestHarness};
use engine::Dimension;
use serde_json::json;
use tempfile::NamedTempFile;

fn file_harness(contents: &str) -> (TestHarness, NamedTempFile) {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{}", contents).unwrap();
    let config = AppConfig {
        data_source: file.path().display().to_string(),
        ..AppConfig::default()
    };
    (TestHarness::with_config(config), file)
}

fn wrapped_fixture() -> String {
    json!({ "data": InsightFixture::values() }).to_string()
}

#[tokio::test]
async fn test_refresh_from_wrapped_payload() {
    let (harness, _file) = file_harness(&wrapped_fixture());
    let status = commands::refresh_dataset(&harness.state).await;

    assert!(!status.loading);
    assert_eq!(status.record_count, 5);
    assert_eq!(status.filtered_count, 5);
    assert!(status.dataset_id.is_some());
    assert!(status.loaded_at.is_some());
    assert!(status.last_error.is_none());
}

#[tokio::test]
async fn test_refresh_from_bare_array() {
    let bare = serde_json::Value::Array(InsightFixture::values()).to_string();
    let (harness, _file) = file_harness(&bare);
    assert_eq!(commands::refresh_dataset(&harness.state).await.record_count, 5);
}

#[tokio::test]
async fn test_unexpected_payload_is_empty_dataset() {
    let (harness, _file) = file_harness(r#"{"items": []}"#);
    let status = commands::refresh_dataset(&harness.state).await;
    assert_eq!(status.record_count, 0);
    assert!(status.last_error.is_none());
}

#[tokio::test]
async fn test_failed_fetch_replaces_dataset_with_empty() {
    let config = AppConfig {
        data_source: "/no/such/dir/insights.json".to_string(),
        ..AppConfig::default()
    };
    let harness = TestHarness::with_config(config);
    harness.load(InsightFixture::records());

    let status = commands::refresh_dataset(&harness.state).await;
    assert_eq!(status.record_count, 0);
    assert!(!status.loading);
    assert!(status.last_error.is_some());

    let dashboard = harness.dashboard();
    assert_eq!(dashboard.kpis.record_count, 0);
    assert!(dashboard.table.page_data.is_empty());
}

#[tokio::test]
async fn test_malformed_payload_is_a_failed_fetch() {
    let (harness, _file) = file_harness("{\"data\": [");
    let status = commands::refresh_dataset(&harness.state).await;
    assert_eq!(status.record_count, 0);
    assert!(status.last_error.is_some());
}

#[tokio::test]
async fn test_every_refresh_gets_a_new_dataset_id() {
    let (harness, _file) = file_harness(&wrapped_fixture());
    let first = commands::refresh_dataset(&harness.state).await.dataset_id;
    let second = commands::refresh_dataset(&harness.state).await.dataset_id;
    assert_ne!(first, second);
}

#[tokio::test]
async fn test_predicates_survive_refresh() {
    let (harness, _file) = file_harness(&wrapped_fixture());
    commands::refresh_dataset(&harness.state).await;
    commands::set_filter(
        &harness.state,
        SetFilterParams {
            dimension: Dimension::Sector,
            value: "Energy".to_string(),
        },
    );

    let status = commands::refresh_dataset(&harness.state).await;
    assert_eq!(status.record_count, 5);
    assert_eq!(status.filtered_count, 2);
}

// ============================================================================
// SUPERSESSION
// ============================================================================

#[test]
fn test_older_response_cannot_overwrite_newer() {
    let harness = TestHarness::new();
    let older = commands::begin_refresh(&harness.state);
    let newer = commands::begin_refresh(&harness.state);

    assert!(commands::finish_refresh(&harness.state, newer, Ok(InsightFixture::records())));
    assert!(!commands::finish_refresh(&harness.state, older, Ok(InsightFixture::generated(40))));

    assert_eq!(commands::get_status(&harness.state).record_count, 5);
}

#[test]
fn test_stale_failure_is_ignored() {
    let harness = TestHarness::new();
    let older = commands::begin_refresh(&harness.state);
    let newer = commands::begin_refresh(&harness.state);
    assert!(commands::finish_refresh(&harness.state, newer, Ok(InsightFixture::records())));

    let error = AppError::Config("simulated".to_string());
    assert!(!commands::finish_refresh(&harness.state, older, Err(error)));

    let status = commands::get_status(&harness.state);
    assert_eq!(status.record_count, 5);
    assert!(status.last_error.is_none());
}

#[test]
fn test_previous_dataset_visible_while_loading() {
    let harness = TestHarness::with_sample_data();
    let ticket = commands::begin_refresh(&harness.state);

    let status = commands::get_status(&harness.state);
    assert!(status.loading);
    assert_eq!(status.record_count, 5);

    commands::finish_refresh(&harness.state, ticket, Ok(InsightFixture::generated(3)));
    let status = commands::get_status(&harness.state);
    assert!(!status.loading);
    assert_eq!(status.record_count, 3);
}
