//! Iterative pagination over the vulnerability list endpoint

use tracing::debug;

use crate::api::VulnerabilityApi;
use crate::error::ClientResult;
use crate::schema::{SeverityFilter, VulnerabilitySummary};

/// Fixed page size for vulnerability listings
pub const PAGE_SIZE: u64 = 50;

/// Scan-type term applied to every listing request
const STATIC_SCAN_TERM: &str = "scantype:Static";

/// Render the `filters` query value for a listing under the given filter
///
/// Terms are joined with `+`, values within a term with `|`, following the
/// platform's filter grammar.
pub fn vulnerability_filters(filter: &SeverityFilter) -> String {
    match filter.query_term() {
        Some(term) => format!("{}+{}", STATIC_SCAN_TERM, term),
        None => STATIC_SCAN_TERM.to_string(),
    }
}

/// Cursor over the pages of one release's vulnerability list
///
/// The first page is always fetched because the total is unknown until the
/// server reports it. Afterwards the cursor advances by [`PAGE_SIZE`] and
/// keeps fetching while the reported total exceeds the next offset, so a
/// list of T items costs exactly ceil(T / 50) requests. Pages are fetched
/// one at a time and the cursor cannot be restarted.
pub struct VulnerabilityPager<'a> {
    api: &'a dyn VulnerabilityApi,
    release_id: u64,
    filters: String,
    offset: u64,
    total: Option<u64>,
}

impl<'a> VulnerabilityPager<'a> {
    /// Create a cursor positioned at offset zero
    pub fn new(api: &'a dyn VulnerabilityApi, release_id: u64, filter: &SeverityFilter) -> Self {
        VulnerabilityPager {
            api,
            release_id,
            filters: vulnerability_filters(filter),
            offset: 0,
            total: None,
        }
    }

    /// Fetch the next page of summaries, `None` once the list is exhausted
    pub async fn next_page(&mut self) -> ClientResult<Option<Vec<VulnerabilitySummary>>> {
        if let Some(total) = self.total {
            if self.offset >= total {
                return Ok(None);
            }
        }

        let page = self
            .api
            .vulnerability_page(self.release_id, &self.filters, self.offset, PAGE_SIZE)
            .await?;

        debug!(
            release_id = self.release_id,
            offset = self.offset,
            total = page.total_count,
            items = page.items.len(),
            "fetched vulnerability page"
        );

        self.total = Some(page.total_count);
        self.offset += PAGE_SIZE;
        Ok(Some(page.items))
    }

    /// Server-reported total, available after the first page
    pub fn total_count(&self) -> Option<u64> {
        self.total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fakes::{completed_release, FakePlatform};
    use crate::schema::Severity;

    async fn drain(pager: &mut VulnerabilityPager<'_>) -> Vec<u64> {
        let mut ids = Vec::new();
        while let Some(items) = pager.next_page().await.unwrap() {
            ids.extend(items.iter().map(|item| item.id));
        }
        ids
    }

    #[test]
    fn test_filters_without_severity_term() {
        assert_eq!(
            vulnerability_filters(&SeverityFilter::All),
            "scantype:Static"
        );
    }

    #[test]
    fn test_filters_with_severity_term() {
        assert_eq!(
            vulnerability_filters(&SeverityFilter::Floor(Severity::High)),
            "scantype:Static+severity:Critical|High"
        );
    }

    #[tokio::test]
    async fn test_empty_list_costs_one_request() {
        let platform = FakePlatform::new(completed_release(0, 0, 0, 0));
        let mut pager = VulnerabilityPager::new(&platform, 7, &SeverityFilter::All);

        let ids = drain(&mut pager).await;
        assert!(ids.is_empty());
        assert_eq!(platform.page_requests().await.len(), 1);
        assert_eq!(pager.total_count(), Some(0));
    }

    #[tokio::test]
    async fn test_exact_page_boundary_costs_one_request() {
        let platform =
            FakePlatform::new(completed_release(0, 50, 0, 0)).with_vulnerabilities(50);
        let mut pager = VulnerabilityPager::new(&platform, 7, &SeverityFilter::All);

        let ids = drain(&mut pager).await;
        assert_eq!(ids.len(), 50);
        assert_eq!(platform.page_requests().await.len(), 1);
    }

    #[tokio::test]
    async fn test_page_count_is_total_over_page_size_rounded_up() {
        let platform =
            FakePlatform::new(completed_release(0, 0, 251, 0)).with_vulnerabilities(251);
        let mut pager = VulnerabilityPager::new(&platform, 7, &SeverityFilter::All);

        let ids = drain(&mut pager).await;
        assert_eq!(ids.len(), 251);
        assert_eq!(platform.page_requests().await.len(), 6);

        let requests = platform.page_requests().await;
        let offsets: Vec<u64> = requests.iter().map(|r| r.offset).collect();
        assert_eq!(offsets, vec![0, 50, 100, 150, 200, 250]);
    }

    #[tokio::test]
    async fn test_each_item_yielded_exactly_once() {
        let platform =
            FakePlatform::new(completed_release(0, 120, 0, 0)).with_vulnerabilities(120);
        let mut pager = VulnerabilityPager::new(&platform, 7, &SeverityFilter::All);

        let mut ids = drain(&mut pager).await;
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 120, "no item may be dropped or repeated");
    }

    #[tokio::test]
    async fn test_filter_string_reaches_the_api() {
        let platform = FakePlatform::new(completed_release(1, 0, 0, 0)).with_vulnerabilities(1);
        let mut pager =
            VulnerabilityPager::new(&platform, 7, &SeverityFilter::Floor(Severity::Critical));

        drain(&mut pager).await;
        let requests = platform.page_requests().await;
        assert_eq!(requests[0].filters, "scantype:Static+severity:Critical");
        assert_eq!(requests[0].limit, PAGE_SIZE);
    }
}
