//! In-memory platform API for tests
//!
//! `FakePlatform` mirrors the real client closely enough to drive the full
//! export pipeline without network access: pages are sliced from a scripted
//! item list, and individual detail fetches can be made to fail. Every call
//! is recorded so tests can assert on request counts and parameters.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::api::VulnerabilityApi;
use crate::error::{ClientError, ClientResult};
use crate::schema::{
    AnalysisStatus, ReleaseSummary, VulnerabilityDetail, VulnerabilityPage, VulnerabilitySummary,
};

/// Release summary in the exportable state with the given counts
pub fn completed_release(critical: u64, high: u64, medium: u64, low: u64) -> ReleaseSummary {
    ReleaseSummary {
        analysis_status: AnalysisStatus::Completed,
        suspended: false,
        critical,
        high,
        medium,
        low,
    }
}

/// Release summary whose scan has not finished
pub fn pending_release() -> ReleaseSummary {
    ReleaseSummary {
        analysis_status: AnalysisStatus::Pending,
        suspended: false,
        critical: 0,
        high: 0,
        medium: 0,
        low: 0,
    }
}

/// Vulnerability summary with deterministic fields derived from `id`
pub fn vulnerability(id: u64) -> VulnerabilitySummary {
    VulnerabilitySummary {
        id,
        instance_id: format!("instance-{:08}", id),
        category: "SQL Injection".to_string(),
        severity: "High".to_string(),
        primary_location: format!("src/handlers/handler_{}.rs", id),
        line_number: 10 + id,
    }
}

/// Detail record with HTML fields derived from `id`
pub fn detail(id: u64) -> VulnerabilityDetail {
    VulnerabilityDetail {
        summary: format!("<p>Tainted data reaches query builder in handler {}.</p>", id),
        explanation: "<p>User input flows into a SQL statement without \
                      sanitization.</p>"
            .to_string(),
    }
}

/// One recorded call to the list endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub filters: String,
    pub offset: u64,
    pub limit: u64,
}

/// Scripted in-memory implementation of [`VulnerabilityApi`]
pub struct FakePlatform {
    release: Option<ReleaseSummary>,
    items: Vec<VulnerabilitySummary>,
    details: HashMap<u64, VulnerabilityDetail>,
    failing_details: HashSet<u64>,
    page_requests: Mutex<Vec<PageRequest>>,
    detail_requests: Mutex<Vec<u64>>,
}

impl FakePlatform {
    /// Platform serving the given release and no vulnerabilities
    pub fn new(release: ReleaseSummary) -> Self {
        FakePlatform {
            release: Some(release),
            items: Vec::new(),
            details: HashMap::new(),
            failing_details: HashSet::new(),
            page_requests: Mutex::new(Vec::new()),
            detail_requests: Mutex::new(Vec::new()),
        }
    }

    /// Platform that answers 404 for every release
    pub fn without_release() -> Self {
        FakePlatform {
            release: None,
            items: Vec::new(),
            details: HashMap::new(),
            failing_details: HashSet::new(),
            page_requests: Mutex::new(Vec::new()),
            detail_requests: Mutex::new(Vec::new()),
        }
    }

    /// Seed `count` vulnerabilities (ids 1..=count) with matching details
    pub fn with_vulnerabilities(mut self, count: u64) -> Self {
        for id in 1..=count {
            self.details.insert(id, detail(id));
            self.items.push(vulnerability(id));
        }
        self
    }

    /// Add a single scripted item and its detail record
    pub fn with_item(mut self, item: VulnerabilitySummary, item_detail: VulnerabilityDetail) -> Self {
        self.details.insert(item.id, item_detail);
        self.items.push(item);
        self
    }

    /// Make the detail fetch for `vuln_id` answer HTTP 500
    pub fn with_failing_detail(mut self, vuln_id: u64) -> Self {
        self.failing_details.insert(vuln_id);
        self
    }

    /// Calls made to the list endpoint, in order
    pub async fn page_requests(&self) -> Vec<PageRequest> {
        self.page_requests.lock().await.clone()
    }

    /// Detail fetches attempted, in order of arrival
    pub async fn detail_requests(&self) -> Vec<u64> {
        self.detail_requests.lock().await.clone()
    }
}

#[async_trait]
impl VulnerabilityApi for FakePlatform {
    async fn release(&self, release_id: u64) -> ClientResult<ReleaseSummary> {
        self.release
            .clone()
            .ok_or_else(|| ClientError::NotFound(format!("/api/v3/releases/{}", release_id)))
    }

    async fn vulnerability_page(
        &self,
        _release_id: u64,
        filters: &str,
        offset: u64,
        limit: u64,
    ) -> ClientResult<VulnerabilityPage> {
        self.page_requests.lock().await.push(PageRequest {
            filters: filters.to_string(),
            offset,
            limit,
        });

        let start = (offset as usize).min(self.items.len());
        let end = (start + limit as usize).min(self.items.len());
        Ok(VulnerabilityPage {
            items: self.items[start..end].to_vec(),
            total_count: self.items.len() as u64,
        })
    }

    async fn vulnerability_detail(
        &self,
        release_id: u64,
        vuln_id: u64,
    ) -> ClientResult<VulnerabilityDetail> {
        self.detail_requests.lock().await.push(vuln_id);

        if self.failing_details.contains(&vuln_id) {
            return Err(ClientError::Api {
                status: 500,
                endpoint: format!(
                    "/api/v3/releases/{}/vulnerabilities/{}/details",
                    release_id, vuln_id
                ),
            });
        }

        self.details.get(&vuln_id).cloned().ok_or_else(|| {
            ClientError::NotFound(format!(
                "/api/v3/releases/{}/vulnerabilities/{}/details",
                release_id, vuln_id
            ))
        })
    }
}
