//! SARIF document assembly and persistence
//!
//! Enrichment tasks finish in arbitrary order, so the builder is a plain
//! append-only accumulator: the finished document holds the same set of
//! rules and results no matter the completion order. Nothing is
//! deduplicated here. Rule ids are platform vulnerability ids, unique per
//! release, and upstream anomalies pass through verbatim rather than being
//! papered over.

use std::fs;
use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};

use crate::enrich::FindingFragments;
use crate::error::{ExportError, ExportResult};
use crate::sarif::{
    SarifInvocation, SarifLog, SarifReportingDescriptor, SarifResult, SarifRun, SarifTool,
    SarifToolComponent,
};

/// Driver name recorded in every exported document
pub const DRIVER_NAME: &str = "scanbridge";

const INFORMATION_URI: &str = "https://github.com/scanbridge/scanbridge";

/// Append-only accumulator for one run's rules and results
#[derive(Debug)]
pub struct SarifBuilder {
    rules: Vec<SarifReportingDescriptor>,
    results: Vec<SarifResult>,
    started_at: DateTime<Utc>,
}

impl SarifBuilder {
    pub fn new() -> Self {
        SarifBuilder {
            rules: Vec::new(),
            results: Vec::new(),
            started_at: Utc::now(),
        }
    }

    /// Append one enriched finding's fragments
    pub fn append(&mut self, fragments: FindingFragments) {
        self.rules.push(fragments.rule);
        self.results.push(fragments.result);
    }

    /// Number of results accumulated so far
    pub fn result_count(&self) -> usize {
        self.results.len()
    }

    /// Finish the document: one run, one driver, one invocation record
    pub fn into_log(self, execution_successful: bool) -> SarifLog {
        let driver = SarifToolComponent {
            name: DRIVER_NAME.to_string(),
            version: Some(env!("CARGO_PKG_VERSION").to_string()),
            information_uri: Some(INFORMATION_URI.to_string()),
            rules: self.rules,
        };

        let invocation = SarifInvocation {
            execution_successful,
            start_time_utc: Some(self.started_at.to_rfc3339_opts(SecondsFormat::Secs, true)),
            end_time_utc: Some(Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)),
        };

        SarifLog::new(SarifRun {
            tool: SarifTool { driver },
            results: self.results,
            invocations: Some(vec![invocation]),
        })
    }
}

impl Default for SarifBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Write the document as pretty-printed JSON, creating parent directories
/// as needed
pub fn write_sarif(path: &Path, log: &SarifLog) -> ExportResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|source| ExportError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }

    let content = serde_json::to_string_pretty(log)?;
    fs::write(path, content).map_err(|source| ExportError::Write {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrich::build_fragments;
    use scanbridge_client::fakes;

    fn fragments(id: u64) -> FindingFragments {
        build_fragments(
            "https://scan.example.com",
            &fakes::vulnerability(id),
            &fakes::detail(id),
        )
    }

    #[test]
    fn test_builder_keeps_rules_and_results_paired() {
        let mut builder = SarifBuilder::new();
        builder.append(fragments(1));
        builder.append(fragments(2));
        assert_eq!(builder.result_count(), 2);

        let log = builder.into_log(true);
        let run = &log.runs[0];
        assert_eq!(run.results.len(), 2);
        assert_eq!(run.tool.driver.rules.len(), 2);
    }

    #[test]
    fn test_append_order_does_not_change_content() {
        let forward = {
            let mut builder = SarifBuilder::new();
            for id in 1..=20 {
                builder.append(fragments(id));
            }
            builder.into_log(true)
        };
        let backward = {
            let mut builder = SarifBuilder::new();
            for id in (1..=20).rev() {
                builder.append(fragments(id));
            }
            builder.into_log(true)
        };

        let ids = |log: &SarifLog| {
            let mut ids: Vec<String> = log.runs[0]
                .results
                .iter()
                .map(|r| r.rule_id.clone())
                .collect();
            ids.sort();
            ids
        };
        assert_eq!(ids(&forward), ids(&backward));

        let rule_ids = |log: &SarifLog| {
            let mut ids: Vec<String> = log.runs[0]
                .tool
                .driver
                .rules
                .iter()
                .map(|r| r.id.clone())
                .collect();
            ids.sort();
            ids
        };
        assert_eq!(rule_ids(&forward), rule_ids(&backward));
    }

    #[test]
    fn test_into_log_records_driver_and_invocation() {
        let log = SarifBuilder::new().into_log(true);
        let run = &log.runs[0];

        assert_eq!(run.tool.driver.name, "scanbridge");
        assert_eq!(
            run.tool.driver.version.as_deref(),
            Some(env!("CARGO_PKG_VERSION"))
        );

        let invocations = run.invocations.as_ref().unwrap();
        assert_eq!(invocations.len(), 1);
        assert!(invocations[0].execution_successful);
        assert!(invocations[0].start_time_utc.is_some());
        assert!(invocations[0].end_time_utc.is_some());
    }

    #[test]
    fn test_write_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/reports/out.sarif");

        let log = SarifBuilder::new().into_log(true);
        write_sarif(&path, &log).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert!(
            written.starts_with("{\n"),
            "document should be pretty-printed"
        );

        let parsed: serde_json::Value = serde_json::from_str(&written).unwrap();
        assert_eq!(parsed["version"], "2.1.0");
    }
}
