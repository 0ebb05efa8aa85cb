//! Severity budgeting for the result cap
//!
//! Annotation UIs truncate or reject oversized reports, so one exported
//! document never carries more than a fixed number of results. The budgeter
//! decides, from the release's per-severity counts alone, which severities
//! to request before pagination starts. The choice is a greedy prefix over
//! severities in descending order rather than any best-fit packing: the
//! selection must be explainable from the counts at a glance, and dropping
//! a high severity to fit more low ones is never acceptable.

use scanbridge_client::{Severity, SeverityCounts, SeverityFilter};

/// Hard cap on results in one exported document
pub const DEFAULT_RESULT_CAP: u64 = 1000;

/// Choose the severity filter for an export
///
/// When every finding fits under `cap`, all severities are included and no
/// severity filter is sent at all. Otherwise the prefix starting at
/// `Critical` is extended downward one severity at a time while the running
/// total stays within `cap`. Critical findings are always requested, even
/// when they alone exceed the cap. An empty export is never the answer.
pub fn select_filter(counts: &SeverityCounts, cap: u64) -> SeverityFilter {
    if counts.total() <= cap {
        return SeverityFilter::All;
    }

    let mut floor = Severity::Critical;
    let mut selected = counts.get(Severity::Critical);

    for severity in [Severity::High, Severity::Medium, Severity::Low] {
        let extended = selected + counts.get(severity);
        if extended > cap {
            break;
        }
        selected = extended;
        floor = severity;
    }

    SeverityFilter::Floor(floor)
}
