//! Export run orchestration
//!
//! Drives one release end to end: inspect the release, pick a severity
//! filter under the result cap, walk the vulnerability pages, enrich each
//! item concurrently under the detail-fetch throttle, then write the
//! document once at the end. Pages are fetched sequentially; only the
//! per-item detail fetches fan out.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

use scanbridge_client::{
    AnalysisStatus, Throttle, VulnerabilityApi, VulnerabilityPager,
};

use crate::budget::{select_filter, DEFAULT_RESULT_CAP};
use crate::document::{write_sarif, SarifBuilder};
use crate::enrich::build_fragments;
use crate::error::ExportResult;

/// Settings for one export run
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Release whose vulnerabilities are exported
    pub release_id: u64,
    /// Portal base URL, used for deep links in rule help text
    pub base_url: String,
    /// Where the SARIF document is written
    pub output: PathBuf,
    /// Hard cap on results in the document
    pub result_cap: u64,
}

impl ExportConfig {
    pub fn new(release_id: u64, base_url: &str, output: PathBuf) -> Self {
        ExportConfig {
            release_id,
            base_url: base_url.to_string(),
            output,
            result_cap: DEFAULT_RESULT_CAP,
        }
    }
}

/// How an export run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    /// The document was written
    Written {
        path: PathBuf,
        /// Results in the document
        results: u64,
        /// Items dropped because their detail fetch failed
        skipped: u64,
    },
    /// The release is not ready for export. Nothing was written and the
    /// run still counts as successful.
    SkippedRelease {
        status: AnalysisStatus,
        suspended: bool,
    },
}

/// Run one export end to end
pub async fn run_export(
    api: Arc<dyn VulnerabilityApi>,
    throttle: Arc<Throttle>,
    config: &ExportConfig,
) -> ExportResult<ExportOutcome> {
    let export_id = Uuid::new_v4();

    info!(
        event = "export.started",
        export_id = %export_id,
        release_id = config.release_id,
        output = %config.output.display(),
    );

    let release = api.release(config.release_id).await?;
    if !release.is_exportable() {
        info!(
            event = "export.release_skipped",
            export_id = %export_id,
            release_id = config.release_id,
            status = ?release.analysis_status,
            suspended = release.suspended,
        );
        return Ok(ExportOutcome::SkippedRelease {
            status: release.analysis_status,
            suspended: release.suspended,
        });
    }

    let counts = release.severity_counts();
    let filter = select_filter(&counts, config.result_cap);
    info!(
        event = "export.filter_selected",
        export_id = %export_id,
        release_id = config.release_id,
        total_findings = counts.total(),
        cap = config.result_cap,
        filter = ?filter,
    );

    let builder = Arc::new(Mutex::new(SarifBuilder::new()));
    let skipped = Arc::new(AtomicU64::new(0));

    let mut pager = VulnerabilityPager::new(api.as_ref(), config.release_id, &filter);
    while let Some(items) = pager.next_page().await? {
        let mut tasks = Vec::new();

        for item in items {
            let api = Arc::clone(&api);
            let throttle = Arc::clone(&throttle);
            let builder = Arc::clone(&builder);
            let skipped = Arc::clone(&skipped);
            let base_url = config.base_url.clone();
            let release_id = config.release_id;

            let task = tokio::spawn(async move {
                let _permit = throttle.acquire().await;

                match api.vulnerability_detail(release_id, item.id).await {
                    Ok(detail) => {
                        let fragments = build_fragments(&base_url, &item, &detail);
                        builder.lock().await.append(fragments);
                    }
                    Err(error) => {
                        skipped.fetch_add(1, Ordering::Relaxed);
                        warn!(
                            event = "export.item_skipped",
                            release_id = release_id,
                            vuln_id = item.id,
                            error = %error,
                        );
                    }
                }
            });
            tasks.push(task);
        }

        for task in tasks {
            let _ = task.await;
        }
    }

    let document = {
        let mut guard = builder.lock().await;
        std::mem::take(&mut *guard)
    };
    let results = document.result_count() as u64;
    let skipped = skipped.load(Ordering::Relaxed);

    let log = document.into_log(true);
    write_sarif(&config.output, &log)?;

    info!(
        event = "export.finished",
        export_id = %export_id,
        release_id = config.release_id,
        results = results,
        skipped_items = skipped,
        output = %config.output.display(),
    );

    Ok(ExportOutcome::Written {
        path: config.output.clone(),
        results,
        skipped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults_to_standard_cap() {
        let config = ExportConfig::new(7, "https://scan.example.com", PathBuf::from("out.sarif"));
        assert_eq!(config.result_cap, DEFAULT_RESULT_CAP);
        assert_eq!(config.release_id, 7);
    }
}
