//! Bearer-authenticated HTTP transport for the platform API

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::api::VulnerabilityApi;
use crate::auth::{authenticate, AccessToken};
use crate::config::Credentials;
use crate::error::{ClientError, ClientResult};
use crate::schema::{ReleaseSummary, VulnerabilityDetail, VulnerabilityPage};

/// Authenticated client for the platform's REST API
///
/// Holds the derived API endpoint and the bearer token for the lifetime of
/// one export run. Tokens are never refreshed; a 401 or 403 answer mid-run
/// surfaces as [`ClientError::Authorization`] and fails the run.
pub struct ApiClient {
    http: reqwest::Client,
    api_url: String,
    token: AccessToken,
}

impl ApiClient {
    /// Authenticate and build a ready-to-use client
    ///
    /// Credential validation happens before any network call; incomplete
    /// credentials surface as [`ClientError::Configuration`].
    pub async fn connect(api_url: &str, credentials: &Credentials) -> ClientResult<Self> {
        let grant = credentials.grant()?;

        let http = reqwest::Client::builder()
            .user_agent("scanbridge/1.2.0")
            .build()
            .expect("Failed to create HTTP client");

        let token = authenticate(&http, api_url, &grant).await?;

        Ok(ApiClient {
            http,
            api_url: api_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    /// GET a JSON resource relative to the API endpoint
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> ClientResult<T> {
        let url = format!("{}{}", self.api_url, path);
        debug!(url = %url, "platform GET");

        let response = self
            .http
            .get(&url)
            .bearer_auth(self.token.secret())
            .query(query)
            .send()
            .await?;

        let status = response.status();
        match status.as_u16() {
            401 | 403 => Err(ClientError::Authorization {
                status: status.as_u16(),
                endpoint: path.to_string(),
            }),
            404 => Err(ClientError::NotFound(path.to_string())),
            _ if !status.is_success() => Err(ClientError::Api {
                status: status.as_u16(),
                endpoint: path.to_string(),
            }),
            _ => response
                .json::<T>()
                .await
                .map_err(|err| ClientError::UnexpectedResponse {
                    endpoint: path.to_string(),
                    detail: err.to_string(),
                }),
        }
    }
}

#[async_trait]
impl VulnerabilityApi for ApiClient {
    async fn release(&self, release_id: u64) -> ClientResult<ReleaseSummary> {
        self.get_json(&format!("/api/v3/releases/{}", release_id), &[])
            .await
    }

    async fn vulnerability_page(
        &self,
        release_id: u64,
        filters: &str,
        offset: u64,
        limit: u64,
    ) -> ClientResult<VulnerabilityPage> {
        self.get_json(
            &format!("/api/v3/releases/{}/vulnerabilities", release_id),
            &[
                ("filters", filters.to_string()),
                ("excludeFilters", "true".to_string()),
                ("offset", offset.to_string()),
                ("limit", limit.to_string()),
            ],
        )
        .await
    }

    async fn vulnerability_detail(
        &self,
        release_id: u64,
        vuln_id: u64,
    ) -> ClientResult<VulnerabilityDetail> {
        self.get_json(
            &format!(
                "/api/v3/releases/{}/vulnerabilities/{}/details",
                release_id, vuln_id
            ),
            &[],
        )
        .await
    }
}
