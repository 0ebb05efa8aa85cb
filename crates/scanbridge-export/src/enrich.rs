//! Per-vulnerability enrichment into SARIF fragments
//!
//! Combines a paginated vulnerability summary with its fetched detail
//! record and produces the two pieces the document needs: a reporting
//! descriptor keyed by the platform's vulnerability id, and a result
//! pointing at the finding's single known location.

use std::collections::HashMap;

use scanbridge_client::{VulnerabilityDetail, VulnerabilitySummary};

use crate::html::html_to_text;
use crate::sarif::{
    SarifArtifactLocation, SarifLevel, SarifLocation, SarifMessage, SarifPhysicalLocation,
    SarifRegion, SarifReportingDescriptor, SarifResult,
};

/// Column span reported for every finding
///
/// The platform reports a line, never columns, so every region spans a
/// nominal full line for annotation renderers that want one.
const REGION_START_COLUMN: u64 = 1;
const REGION_END_COLUMN: u64 = 80;

/// Fingerprint key carrying the platform's stable instance id
const FINGERPRINT_INSTANCE_ID: &str = "instanceId";

/// Rule descriptor and result produced from one vulnerability
#[derive(Debug, Clone)]
pub struct FindingFragments {
    pub rule: SarifReportingDescriptor,
    pub result: SarifResult,
}

/// Build the SARIF fragments for one enriched vulnerability
///
/// The rule id is the platform's numeric vulnerability id, so each finding
/// carries its own descriptor and consumers can deep-link straight back to
/// the portal entry under `base_url`. Results are always `warning` level:
/// severity ranking stays the platform's business, and CI annotations
/// should not fail builds on the exporter's say-so.
pub fn build_fragments(
    base_url: &str,
    summary: &VulnerabilitySummary,
    detail: &VulnerabilityDetail,
) -> FindingFragments {
    let deep_link = format!(
        "{}/redirect/issues/{}",
        base_url.trim_end_matches('/'),
        summary.id
    );

    let rule = SarifReportingDescriptor {
        id: summary.id.to_string(),
        short_description: Some(SarifMessage::text(summary.category.as_str())),
        full_description: Some(SarifMessage::text(html_to_text(&detail.explanation))),
        help: Some(SarifMessage::with_markdown(
            format!("For more information visit {}", deep_link),
            format!(
                "[View this vulnerability on the scanning platform]({})",
                deep_link
            ),
        )),
    };

    let result = SarifResult {
        rule_id: summary.id.to_string(),
        level: SarifLevel::Warning,
        message: SarifMessage::text(html_to_text(&detail.summary)),
        locations: vec![SarifLocation {
            physical_location: Some(SarifPhysicalLocation {
                artifact_location: SarifArtifactLocation {
                    uri: summary.primary_location.clone(),
                },
                region: Some(SarifRegion {
                    start_line: Some(summary.line_number),
                    start_column: Some(REGION_START_COLUMN),
                    end_line: None,
                    end_column: Some(REGION_END_COLUMN),
                }),
            }),
        }],
        partial_fingerprints: HashMap::from([(
            FINGERPRINT_INSTANCE_ID.to_string(),
            summary.instance_id.clone(),
        )]),
    };

    FindingFragments { rule, result }
}
