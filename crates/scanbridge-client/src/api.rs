//! Platform API seam consumed by the export pipeline

use async_trait::async_trait;

use crate::error::ClientResult;
use crate::schema::{ReleaseSummary, VulnerabilityDetail, VulnerabilityPage};

/// Read operations the export pipeline performs against the platform
///
/// Implemented by [`ApiClient`](crate::ApiClient) over the real API and by
/// [`fakes::FakePlatform`](crate::fakes::FakePlatform) for tests.
#[async_trait]
pub trait VulnerabilityApi: Send + Sync {
    /// Fetch release metadata (analysis status, suspension, severity counts)
    async fn release(&self, release_id: u64) -> ClientResult<ReleaseSummary>;

    /// Fetch one page of the release's vulnerability list
    async fn vulnerability_page(
        &self,
        release_id: u64,
        filters: &str,
        offset: u64,
        limit: u64,
    ) -> ClientResult<VulnerabilityPage>;

    /// Fetch the detail record for a single vulnerability
    async fn vulnerability_detail(
        &self,
        release_id: u64,
        vuln_id: u64,
    ) -> ClientResult<VulnerabilityDetail>;
}
