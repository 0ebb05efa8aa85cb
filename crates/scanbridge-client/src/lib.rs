//! Scanbridge-Client: Scanning Platform API Access
//!
//! This crate talks to the scanning platform's REST API on behalf of the
//! export pipeline. It covers token authentication, typed response schemas,
//! vulnerability list pagination, and the rate limiter that paces per-item
//! detail fetches.
//!
//! ## Key Components
//!
//! - `Credentials` / `ApiClient::connect`: OAuth-style token grant
//! - `ApiClient`: bearer-authenticated JSON transport
//! - `VulnerabilityApi`: the trait seam the export pipeline consumes
//! - `VulnerabilityPager`: iterative cursor over the list endpoint
//! - `Throttle`: sliding-window rate limiter for detail fetches

pub mod api;
mod auth;
mod client;
mod config;
mod error;
pub mod fakes;
mod pages;
mod schema;
mod throttle;

pub use api::VulnerabilityApi;
pub use client::ApiClient;
pub use config::{derive_api_url, Credentials, TokenGrant};
pub use error::{ClientError, ClientResult};
pub use pages::{vulnerability_filters, VulnerabilityPager, PAGE_SIZE};
pub use schema::{
    AnalysisStatus, ReleaseSummary, Severity, SeverityCounts, SeverityFilter,
    VulnerabilityDetail, VulnerabilityPage, VulnerabilitySummary,
};
pub use throttle::{Throttle, ThrottlePermit};
