//! Integration tests for the export pipeline with FakePlatform.

use std::fs;
use std::sync::Arc;
use std::time::Duration;

use scanbridge_client::fakes::{self, FakePlatform};
use scanbridge_client::{AnalysisStatus, ClientError, Throttle};
use scanbridge_export::{run_export, ExportConfig, ExportError, ExportOutcome};

const BASE_URL: &str = "https://scan.example.com";

/// Throttle loose enough to never delay a test
fn permissive_throttle() -> Arc<Throttle> {
    Arc::new(Throttle::new(10_000, Duration::from_millis(1), 64))
}

fn config_in(dir: &tempfile::TempDir, release_id: u64) -> ExportConfig {
    ExportConfig::new(release_id, BASE_URL, dir.path().join("report.sarif"))
}

/// Test: completed release with a handful of findings produces a full document
#[tokio::test]
async fn test_export_writes_complete_document() {
    let dir = tempfile::tempdir().expect("tempdir");
    let platform = Arc::new(
        FakePlatform::new(fakes::completed_release(1, 1, 1, 0)).with_vulnerabilities(3),
    );
    let config = config_in(&dir, 42);

    let outcome = run_export(platform.clone(), permissive_throttle(), &config)
        .await
        .expect("export failed");

    assert_eq!(
        outcome,
        ExportOutcome::Written {
            path: config.output.clone(),
            results: 3,
            skipped: 0,
        }
    );

    let written = fs::read_to_string(&config.output).expect("artifact missing");
    let doc: serde_json::Value = serde_json::from_str(&written).expect("invalid JSON");

    assert_eq!(doc["version"], "2.1.0");
    let run = &doc["runs"][0];
    assert_eq!(run["tool"]["driver"]["name"], "scanbridge");
    assert!(run["tool"]["driver"]["version"].is_string());
    assert_eq!(run["tool"]["driver"]["rules"].as_array().unwrap().len(), 3);

    let results = run["results"].as_array().unwrap();
    assert_eq!(results.len(), 3);
    for result in results {
        assert_eq!(result["level"], "warning");
        assert!(
            result["partialFingerprints"]["instanceId"].is_string(),
            "every result carries its instance id fingerprint"
        );
    }

    let invocation = &run["invocations"][0];
    assert_eq!(invocation["executionSuccessful"], true);
    assert!(invocation["startTimeUtc"].is_string());
    assert!(invocation["endTimeUtc"].is_string());
}

/// Test: release still analysing is skipped without touching the list endpoint
#[tokio::test]
async fn test_pending_release_skipped_without_output() {
    let dir = tempfile::tempdir().expect("tempdir");
    let platform =
        Arc::new(FakePlatform::new(fakes::pending_release()).with_vulnerabilities(2));
    let config = config_in(&dir, 42);

    let outcome = run_export(platform.clone(), permissive_throttle(), &config)
        .await
        .expect("skip should not be an error");

    assert_eq!(
        outcome,
        ExportOutcome::SkippedRelease {
            status: AnalysisStatus::Pending,
            suspended: false,
        }
    );
    assert!(!config.output.exists(), "no artifact for a skipped release");
    assert!(
        platform.page_requests().await.is_empty(),
        "skipped release must not be paginated"
    );
}

/// Test: suspended release is skipped even when analysis completed
#[tokio::test]
async fn test_suspended_release_skipped() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut release = fakes::completed_release(1, 0, 0, 0);
    release.suspended = true;
    let platform = Arc::new(FakePlatform::new(release).with_vulnerabilities(1));
    let config = config_in(&dir, 42);

    let outcome = run_export(platform, permissive_throttle(), &config)
        .await
        .expect("skip should not be an error");

    assert_eq!(
        outcome,
        ExportOutcome::SkippedRelease {
            status: AnalysisStatus::Completed,
            suspended: true,
        }
    );
    assert!(!config.output.exists());
}

/// Test: unknown release surfaces as a client error
#[tokio::test]
async fn test_missing_release_is_fatal() {
    let dir = tempfile::tempdir().expect("tempdir");
    let platform = Arc::new(FakePlatform::without_release());
    let config = config_in(&dir, 999);

    let error = run_export(platform, permissive_throttle(), &config)
        .await
        .expect_err("missing release should fail the run");

    assert!(
        matches!(error, ExportError::Client(ClientError::NotFound(_))),
        "unexpected error: {:?}",
        error
    );
    assert!(!config.output.exists());
}

/// Test: one failing detail fetch drops that item and keeps the rest
#[tokio::test]
async fn test_failing_detail_skips_item_only() {
    let dir = tempfile::tempdir().expect("tempdir");
    let platform = Arc::new(
        FakePlatform::new(fakes::completed_release(0, 50, 0, 0))
            .with_vulnerabilities(50)
            .with_failing_detail(17),
    );
    let config = config_in(&dir, 42);

    let outcome = run_export(platform.clone(), permissive_throttle(), &config)
        .await
        .expect("export failed");

    assert_eq!(
        outcome,
        ExportOutcome::Written {
            path: config.output.clone(),
            results: 49,
            skipped: 1,
        }
    );

    let detail_requests = platform.detail_requests().await;
    assert!(
        detail_requests.contains(&17),
        "the failing item should still have been attempted"
    );

    let written = fs::read_to_string(&config.output).expect("artifact missing");
    let doc: serde_json::Value = serde_json::from_str(&written).expect("invalid JSON");
    let results = doc["runs"][0]["results"].as_array().unwrap();
    assert_eq!(results.len(), 49);
    assert!(
        results.iter().all(|r| r["ruleId"] != "17"),
        "the failed item must not appear in the document"
    );
}

/// Test: severity filter reaching the list endpoint reflects the budget
#[tokio::test]
async fn test_filter_omitted_when_everything_fits() {
    let dir = tempfile::tempdir().expect("tempdir");
    let platform = Arc::new(
        FakePlatform::new(fakes::completed_release(10, 20, 30, 40)).with_vulnerabilities(5),
    );
    let config = config_in(&dir, 42);

    run_export(platform.clone(), permissive_throttle(), &config)
        .await
        .expect("export failed");

    let requests = platform.page_requests().await;
    assert!(!requests.is_empty());
    assert_eq!(requests[0].filters, "scantype:Static");
    assert_eq!(requests[0].limit, 50);
}

/// Test: over-budget release narrows the request to the severity prefix
#[tokio::test]
async fn test_filter_narrowed_when_over_budget() {
    let dir = tempfile::tempdir().expect("tempdir");
    let platform = Arc::new(
        FakePlatform::new(fakes::completed_release(10, 20, 30, 5000)).with_vulnerabilities(3),
    );
    let config = config_in(&dir, 42);

    run_export(platform.clone(), permissive_throttle(), &config)
        .await
        .expect("export failed");

    let requests = platform.page_requests().await;
    assert_eq!(
        requests[0].filters,
        "scantype:Static+severity:Critical|High|Medium"
    );
}

/// Test: pages are fetched sequentially until the count is exhausted
#[tokio::test]
async fn test_pagination_covers_every_item_once() {
    let dir = tempfile::tempdir().expect("tempdir");
    let platform = Arc::new(
        FakePlatform::new(fakes::completed_release(0, 120, 0, 0)).with_vulnerabilities(120),
    );
    let config = config_in(&dir, 42);

    let outcome = run_export(platform.clone(), permissive_throttle(), &config)
        .await
        .expect("export failed");

    assert_eq!(
        outcome,
        ExportOutcome::Written {
            path: config.output.clone(),
            results: 120,
            skipped: 0,
        }
    );

    let requests = platform.page_requests().await;
    let offsets: Vec<u64> = requests.iter().map(|r| r.offset).collect();
    assert_eq!(offsets, vec![0, 50, 100], "three pages for 120 items");

    let mut detail_requests = platform.detail_requests().await;
    detail_requests.sort_unstable();
    let expected: Vec<u64> = (1..=120).collect();
    assert_eq!(
        detail_requests, expected,
        "every item fetched exactly once, regardless of completion order"
    );

    let written = fs::read_to_string(&config.output).expect("artifact missing");
    let doc: serde_json::Value = serde_json::from_str(&written).expect("invalid JSON");
    let mut rule_ids: Vec<String> = doc["runs"][0]["results"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["ruleId"].as_str().unwrap().to_string())
        .collect();
    rule_ids.sort_unstable();
    rule_ids.dedup();
    assert_eq!(rule_ids.len(), 120, "no duplicates, no losses");
}

/// Test: detail fetches are paced by the sliding-window throttle
#[tokio::test(start_paused = true)]
async fn test_detail_fetches_are_rate_limited() {
    let dir = tempfile::tempdir().expect("tempdir");
    let platform = Arc::new(
        FakePlatform::new(fakes::completed_release(0, 7, 0, 0)).with_vulnerabilities(7),
    );
    let config = config_in(&dir, 42);
    let throttle = Arc::new(Throttle::for_detail_fetches());

    let started = tokio::time::Instant::now();
    let outcome = run_export(platform, throttle, &config)
        .await
        .expect("export failed");
    let elapsed = started.elapsed();

    assert_eq!(
        outcome,
        ExportOutcome::Written {
            path: config.output.clone(),
            results: 7,
            skipped: 0,
        }
    );
    assert!(
        elapsed >= Duration::from_secs(4),
        "7 detail fetches at 3 per 2s need two window rollovers, got {:?}",
        elapsed
    );
}

/// Test: unwritable output path fails the run after enrichment
#[tokio::test]
async fn test_unwritable_output_is_fatal() {
    let dir = tempfile::tempdir().expect("tempdir");
    let blocker = dir.path().join("blocker");
    fs::write(&blocker, b"not a directory").expect("seed blocker file");

    let platform = Arc::new(
        FakePlatform::new(fakes::completed_release(0, 1, 0, 0)).with_vulnerabilities(1),
    );
    let config = ExportConfig::new(42, BASE_URL, blocker.join("report.sarif"));

    let error = run_export(platform, permissive_throttle(), &config)
        .await
        .expect_err("write through a file should fail");

    assert!(
        matches!(error, ExportError::Write { .. }),
        "unexpected error: {:?}",
        error
    );
}
