//! Response schemas for the platform API
//!
//! Every endpoint the exporter touches gets an explicit serde model, checked
//! at the boundary. Enum values the platform may add later fall back to an
//! `Unknown` variant instead of failing deserialization.

use serde::{Deserialize, Serialize};

// ============================================================================
// 1. RELEASE METADATA
// ============================================================================

/// Analysis state reported for a release
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnalysisStatus {
    /// Static scan finished and results are published
    Completed,
    /// Scan queued but not yet started
    Queued,
    /// Scan in progress, results not yet published
    Pending,
    /// Scan canceled before completion
    Canceled,
    /// Any status string this crate does not recognize
    #[serde(other)]
    Unknown,
}

/// Release metadata returned by `GET /api/v3/releases/{id}`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseSummary {
    /// Current state of the release's static analysis
    pub analysis_status: AnalysisStatus,

    /// Releases can be suspended by platform administrators
    pub suspended: bool,

    /// Open critical-severity finding count
    pub critical: u64,

    /// Open high-severity finding count
    pub high: u64,

    /// Open medium-severity finding count
    pub medium: u64,

    /// Open low-severity finding count
    pub low: u64,
}

impl ReleaseSummary {
    /// True when vulnerability data may be exported for this release
    pub fn is_exportable(&self) -> bool {
        self.analysis_status == AnalysisStatus::Completed && !self.suspended
    }

    /// Per-severity open finding counts
    pub fn severity_counts(&self) -> SeverityCounts {
        SeverityCounts {
            critical: self.critical,
            high: self.high,
            medium: self.medium,
            low: self.low,
        }
    }
}

// ============================================================================
// 2. SEVERITY MODEL
// ============================================================================

/// Finding severity, ordered so `Critical` ranks highest
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// All severities from highest to lowest
    pub const DESCENDING: [Severity; 4] = [
        Severity::Critical,
        Severity::High,
        Severity::Medium,
        Severity::Low,
    ];

    /// Value used in the platform's filter grammar
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Open finding counts per severity for one release
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityCounts {
    pub critical: u64,
    pub high: u64,
    pub medium: u64,
    pub low: u64,
}

impl SeverityCounts {
    /// Count for a single severity
    pub fn get(&self, severity: Severity) -> u64 {
        match severity {
            Severity::Critical => self.critical,
            Severity::High => self.high,
            Severity::Medium => self.medium,
            Severity::Low => self.low,
        }
    }

    /// Total across all severities
    pub fn total(&self) -> u64 {
        self.critical + self.high + self.medium + self.low
    }
}

/// Severity subset selected for an export
///
/// Only descending prefixes of {Critical, High, Medium, Low} are
/// representable: `Floor(s)` includes every severity at or above `s`, so a
/// filter can never skip a higher severity while keeping a lower one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeverityFilter {
    /// No severity restriction
    All,
    /// Include severities greater than or equal to the floor
    Floor(Severity),
}

impl SeverityFilter {
    /// Severities admitted by this filter, highest first
    pub fn severities(&self) -> &'static [Severity] {
        const DESCENDING: &[Severity] = &Severity::DESCENDING;
        let included = match self {
            SeverityFilter::All | SeverityFilter::Floor(Severity::Low) => 4,
            SeverityFilter::Floor(Severity::Medium) => 3,
            SeverityFilter::Floor(Severity::High) => 2,
            SeverityFilter::Floor(Severity::Critical) => 1,
        };
        &DESCENDING[..included]
    }

    /// True when the filter admits the given severity
    pub fn includes(&self, severity: Severity) -> bool {
        match self {
            SeverityFilter::All => true,
            SeverityFilter::Floor(floor) => severity >= *floor,
        }
    }

    /// Severity term for the platform's filter grammar, `None` when the
    /// filter admits everything
    pub fn query_term(&self) -> Option<String> {
        match self {
            SeverityFilter::All => None,
            SeverityFilter::Floor(_) => {
                let values: Vec<&str> = self.severities().iter().map(|s| s.as_str()).collect();
                Some(format!("severity:{}", values.join("|")))
            }
        }
    }
}

// ============================================================================
// 3. VULNERABILITY LIST AND DETAIL
// ============================================================================

/// One row of the vulnerability list endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VulnerabilitySummary {
    /// Numeric vulnerability id, also used as the exported rule id
    pub id: u64,

    /// Stable instance identifier that survives rescans
    pub instance_id: String,

    /// Human-readable weakness category
    pub category: String,

    /// Severity label as reported by the platform (display only)
    pub severity: String,

    /// Path of the file the finding points at
    pub primary_location: String,

    /// 1-based line number within the primary location; the platform
    /// reports 0 for findings without a line
    #[serde(default)]
    pub line_number: u64,
}

/// One page of the vulnerability list
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VulnerabilityPage {
    /// Items on this page, at most the requested limit
    pub items: Vec<VulnerabilitySummary>,

    /// Total number of matching items across all pages
    pub total_count: u64,
}

/// Per-vulnerability detail record
///
/// Both fields arrive as HTML fragments and are converted to plain text by
/// the export pipeline. The platform omits them for some categories, hence
/// the defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VulnerabilityDetail {
    /// Short HTML summary of the finding
    #[serde(default)]
    pub summary: String,

    /// Longer HTML explanation of the weakness class
    #[serde(default)]
    pub explanation: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_release_summary_from_api_json() {
        let json = r#"{
            "analysisStatus": "Completed",
            "suspended": false,
            "critical": 2,
            "high": 7,
            "medium": 11,
            "low": 40
        }"#;
        let release: ReleaseSummary = serde_json::from_str(json).unwrap();
        assert!(release.is_exportable());
        assert_eq!(release.severity_counts().total(), 60);
    }

    #[test]
    fn test_unknown_status_tolerated() {
        let json = r#"{
            "analysisStatus": "Reprocessing",
            "suspended": false,
            "critical": 0,
            "high": 0,
            "medium": 0,
            "low": 0
        }"#;
        let release: ReleaseSummary = serde_json::from_str(json).unwrap();
        assert_eq!(release.analysis_status, AnalysisStatus::Unknown);
        assert!(!release.is_exportable(), "Unknown status must not export");
    }

    #[test]
    fn test_suspended_release_not_exportable() {
        let json = r#"{
            "analysisStatus": "Completed",
            "suspended": true,
            "critical": 0,
            "high": 0,
            "medium": 0,
            "low": 1
        }"#;
        let release: ReleaseSummary = serde_json::from_str(json).unwrap();
        assert!(!release.is_exportable());
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Critical > Severity::High);
        assert!(Severity::High > Severity::Medium);
        assert!(Severity::Medium > Severity::Low);
    }

    #[test]
    fn test_filter_includes_prefix_only() {
        let filter = SeverityFilter::Floor(Severity::Medium);
        assert!(filter.includes(Severity::Critical));
        assert!(filter.includes(Severity::High));
        assert!(filter.includes(Severity::Medium));
        assert!(!filter.includes(Severity::Low));
    }

    #[test]
    fn test_filter_query_terms() {
        assert_eq!(SeverityFilter::All.query_term(), None);
        assert_eq!(
            SeverityFilter::Floor(Severity::Critical).query_term(),
            Some("severity:Critical".to_string())
        );
        assert_eq!(
            SeverityFilter::Floor(Severity::Medium).query_term(),
            Some("severity:Critical|High|Medium".to_string())
        );
    }

    #[test]
    fn test_vulnerability_page_from_api_json() {
        let json = r#"{
            "items": [{
                "id": 4711,
                "instanceId": "8A1CC4C2-7C60-45D6-9B9C-3C5F4B1A2D11",
                "category": "SQL Injection",
                "severity": "Critical",
                "primaryLocation": "src/db/query.rs",
                "lineNumber": 42
            }],
            "totalCount": 137
        }"#;
        let page: VulnerabilityPage = serde_json::from_str(json).unwrap();
        assert_eq!(page.total_count, 137);
        assert_eq!(page.items[0].id, 4711);
        assert_eq!(page.items[0].primary_location, "src/db/query.rs");
    }

    #[test]
    fn test_detail_defaults_when_fields_missing() {
        let detail: VulnerabilityDetail = serde_json::from_str("{}").unwrap();
        assert!(detail.summary.is_empty());
        assert!(detail.explanation.is_empty());
    }
}
