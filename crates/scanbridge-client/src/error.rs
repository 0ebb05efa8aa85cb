//! Error types for scanbridge-client

use thiserror::Error;

/// Result type for platform client operations
pub type ClientResult<T> = std::result::Result<T, ClientError>;

/// Errors raised while talking to the scanning platform
#[derive(Error, Debug)]
pub enum ClientError {
    /// Credentials are missing or incomplete
    #[error("Incomplete configuration: {0}")]
    Configuration(String),

    /// The token endpoint rejected the grant
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// The platform rejected the bearer token after authentication
    #[error("Authorization rejected (HTTP {status}) for {endpoint}")]
    Authorization { status: u16, endpoint: String },

    /// The requested resource does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// The platform answered with an unexpected status code
    #[error("Unexpected status {status} from {endpoint}")]
    Api { status: u16, endpoint: String },

    /// A response body did not match the expected schema
    #[error("Malformed response from {endpoint}: {detail}")]
    UnexpectedResponse { endpoint: String, detail: String },

    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::Http(err.to_string())
    }
}
