//! Scanbridge-Export: SARIF Export Pipeline
//!
//! Turns one scanning-platform release into a SARIF 2.1.0 document ready
//! for CI annotation upload: inspect the release, pick a severity filter
//! under the result cap, walk the vulnerability pages, enrich each item
//! under the detail-fetch rate limit, and write the document once at the
//! end.
//!
//! ## Key Components
//!
//! - `select_filter`: greedy severity budgeter for the result cap
//! - `build_fragments`: per-item rule and result synthesis
//! - `SarifBuilder` / `write_sarif`: append-only assembly and persistence
//! - `run_export`: end-to-end pipeline driver
//! - `init_tracing`: logging bootstrap shared by binaries

mod budget;
mod document;
mod enrich;
mod error;
mod html;
mod run;
pub mod sarif;
mod telemetry;

pub use budget::{select_filter, DEFAULT_RESULT_CAP};
pub use document::{write_sarif, SarifBuilder, DRIVER_NAME};
pub use enrich::{build_fragments, FindingFragments};
pub use error::{ExportError, ExportResult};
pub use html::html_to_text;
pub use run::{run_export, ExportConfig, ExportOutcome};
pub use telemetry::init_tracing;
