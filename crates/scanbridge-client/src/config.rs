//! Credential handling and API endpoint derivation

use crate::error::{ClientError, ClientResult};

/// Credential material accepted by the exporter
///
/// Two shapes are supported: client-credentials (client id + secret) and
/// the platform's password grant (tenant, user, password). Client
/// credentials take priority when both shapes are complete. Empty strings
/// count as absent, matching how CI systems pass unset secrets.
#[derive(Clone, Default)]
pub struct Credentials {
    /// Tenant name for the password grant
    pub tenant: Option<String>,
    /// User name for the password grant
    pub user: Option<String>,
    /// Password for the password grant
    pub password: Option<String>,
    /// Client id for the client-credentials grant
    pub client_id: Option<String>,
    /// Client secret for the client-credentials grant
    pub client_secret: Option<String>,
}

/// Resolved grant for the platform's token endpoint
#[derive(Clone, PartialEq, Eq)]
pub enum TokenGrant {
    /// `client_credentials` grant
    ClientCredentials {
        client_id: String,
        client_secret: String,
    },
    /// `password` grant; `username` carries the platform's `tenant\user` form
    Password { username: String, password: String },
}

impl Credentials {
    /// Credentials for the client-credentials grant
    pub fn client_credentials(client_id: &str, client_secret: &str) -> Self {
        Credentials {
            client_id: Some(client_id.to_string()),
            client_secret: Some(client_secret.to_string()),
            ..Credentials::default()
        }
    }

    /// Credentials for the password grant
    pub fn password(tenant: &str, user: &str, password: &str) -> Self {
        Credentials {
            tenant: Some(tenant.to_string()),
            user: Some(user.to_string()),
            password: Some(password.to_string()),
            ..Credentials::default()
        }
    }

    /// Resolve which grant to use
    ///
    /// Runs before any network call so incomplete credentials fail fast as
    /// [`ClientError::Configuration`].
    pub fn grant(&self) -> ClientResult<TokenGrant> {
        if let (Some(id), Some(secret)) = (filled(&self.client_id), filled(&self.client_secret)) {
            return Ok(TokenGrant::ClientCredentials {
                client_id: id.to_string(),
                client_secret: secret.to_string(),
            });
        }

        if let (Some(tenant), Some(user), Some(password)) = (
            filled(&self.tenant),
            filled(&self.user),
            filled(&self.password),
        ) {
            return Ok(TokenGrant::Password {
                username: format!("{}\\{}", tenant, user),
                password: password.to_string(),
            });
        }

        Err(ClientError::Configuration(
            "provide client-id and client-secret, or tenant, user and password".to_string(),
        ))
    }
}

/// Treat empty strings as absent
fn filled(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("tenant", &self.tenant)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret.as_ref().map(|_| "***"))
            .finish()
    }
}

impl std::fmt::Debug for TokenGrant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenGrant::ClientCredentials { client_id, .. } => f
                .debug_struct("ClientCredentials")
                .field("client_id", client_id)
                .finish_non_exhaustive(),
            TokenGrant::Password { username, .. } => f
                .debug_struct("Password")
                .field("username", username)
                .finish_non_exhaustive(),
        }
    }
}

/// Derive the API endpoint from the configured portal URL
///
/// The platform serves its REST API from the portal host prefixed with
/// `api.` (`https://scan.example.com` becomes
/// `https://api.scan.example.com`). Hosts already carrying the prefix pass
/// through unchanged. Scheme, port and path are preserved; a trailing slash
/// is dropped so endpoint paths can be appended directly.
pub fn derive_api_url(base_url: &str) -> ClientResult<String> {
    let trimmed = base_url.trim_end_matches('/');
    let (scheme, remainder) = trimmed.split_once("://").ok_or_else(|| {
        ClientError::Configuration(format!("base URL has no scheme: {}", base_url))
    })?;

    let (authority, path) = match remainder.find('/') {
        Some(idx) => remainder.split_at(idx),
        None => (remainder, ""),
    };
    let host = authority.split(':').next().unwrap_or(authority);

    if host.is_empty() {
        return Err(ClientError::Configuration(format!(
            "base URL has no host: {}",
            base_url
        )));
    }

    if host == "api" || host.starts_with("api.") {
        Ok(trimmed.to_string())
    } else {
        Ok(format!("{}://api.{}{}", scheme, authority, path))
    }
}
