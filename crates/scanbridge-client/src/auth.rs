//! Token acquisition against the platform's OAuth endpoint

use serde::Deserialize;
use tracing::debug;

use crate::config::TokenGrant;
use crate::error::{ClientError, ClientResult};

/// OAuth scope requested with every grant
const TOKEN_SCOPE: &str = "api-tenant";

/// Bearer token returned by the token endpoint
#[derive(Clone)]
pub struct AccessToken(String);

impl AccessToken {
    /// Raw token value for the Authorization header
    pub fn secret(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AccessToken(***)")
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Exchange a grant for a bearer token
///
/// POSTs the form-encoded grant to `<api-url>/oauth/token`. Any non-success
/// answer is an authentication failure; there is no retry and no refresh for
/// the lifetime of a run.
pub async fn authenticate(
    http: &reqwest::Client,
    api_url: &str,
    grant: &TokenGrant,
) -> ClientResult<AccessToken> {
    let endpoint = format!("{}/oauth/token", api_url.trim_end_matches('/'));

    let mut form = vec![("scope", TOKEN_SCOPE.to_string())];
    match grant {
        TokenGrant::ClientCredentials {
            client_id,
            client_secret,
        } => {
            form.push(("grant_type", "client_credentials".to_string()));
            form.push(("client_id", client_id.clone()));
            form.push(("client_secret", client_secret.clone()));
        }
        TokenGrant::Password { username, password } => {
            form.push(("grant_type", "password".to_string()));
            form.push(("username", username.clone()));
            form.push(("password", password.clone()));
        }
    }

    debug!(endpoint = %endpoint, "requesting access token");
    let response = http.post(&endpoint).form(&form).send().await?;

    let status = response.status();
    if !status.is_success() {
        return Err(ClientError::Authentication(format!(
            "token endpoint answered HTTP {}",
            status.as_u16()
        )));
    }

    let token: TokenResponse =
        response
            .json()
            .await
            .map_err(|err| ClientError::UnexpectedResponse {
                endpoint,
                detail: err.to_string(),
            })?;

    Ok(AccessToken(token.access_token))
}
