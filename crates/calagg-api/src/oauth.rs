//! OAuth 2.0 authorization-code and refresh-token grants.
//!
//! This is the protocol half of authentication: building the authorization
//! URL and POSTing form-encoded grants to the token endpoint. It holds no
//! token state; [`crate::CredentialManager`] owns that.
//!
//! Token endpoint failures go through the same status mapping as API calls,
//! so a rejected refresh token surfaces as a regular [`crate::ApiError`].

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use tracing::info;

use crate::config::ClientConfig;
use crate::dispatch::dispatch;
use crate::error::ApiResult;
use crate::transport::{HttpMethod, HttpRequest, Transport};

/// A successful token endpoint response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
}

impl TokenResponse {
    /// Absolute expiry computed from `expires_in`, relative to `now`.
    ///
    /// `None` when the server sent no lifetime, a negative one, or one too
    /// large to represent.
    pub fn expires_at(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let secs = self.expires_in.filter(|secs| *secs >= 0)?;
        Duration::try_seconds(secs).and_then(|lifetime| now.checked_add_signed(lifetime))
    }
}

/// Client for the authorization server.
#[derive(Debug, Clone)]
pub struct OAuthClient {
    client_id: String,
    client_secret: String,
    authorize_endpoint: String,
    token_endpoint: String,
    revoke_endpoint: String,
}

impl OAuthClient {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        config: &ClientConfig,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            authorize_endpoint: config.authorize_endpoint(),
            token_endpoint: config.token_endpoint(),
            revoke_endpoint: config.revoke_endpoint(),
        }
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn client_secret(&self) -> &str {
        &self.client_secret
    }

    /// Builds the URL the user visits to grant access.
    ///
    /// Pure: the same inputs always produce the same URL.
    pub fn authorization_url<S: AsRef<str>>(&self, redirect_uri: &str, scopes: &[S]) -> String {
        let scope = scopes
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<&str>>()
            .join(" ");

        format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}",
            self.authorize_endpoint,
            urlencoding::encode(&self.client_id),
            urlencoding::encode(redirect_uri),
            urlencoding::encode(&scope),
        )
    }

    /// Exchanges an authorization code for tokens.
    pub async fn exchange_code<T: Transport + ?Sized>(
        &self,
        transport: &T,
        code: &str,
        redirect_uri: &str,
    ) -> ApiResult<TokenResponse> {
        let response = self
            .post_grant(
                transport,
                &[
                    ("client_id", self.client_id.as_str()),
                    ("client_secret", self.client_secret.as_str()),
                    ("grant_type", "authorization_code"),
                    ("code", code),
                    ("redirect_uri", redirect_uri),
                ],
            )
            .await?;
        info!("obtained tokens from authorization code");
        Ok(response)
    }

    /// Exchanges a refresh token for a new access token.
    pub async fn refresh_token<T: Transport + ?Sized>(
        &self,
        transport: &T,
        refresh_token: &str,
    ) -> ApiResult<TokenResponse> {
        let response = self
            .post_grant(
                transport,
                &[
                    ("client_id", self.client_id.as_str()),
                    ("client_secret", self.client_secret.as_str()),
                    ("grant_type", "refresh_token"),
                    ("refresh_token", refresh_token),
                ],
            )
            .await?;
        info!("refreshed access token");
        Ok(response)
    }

    /// Revokes a token at the authorization server.
    pub async fn revoke<T: Transport + ?Sized>(&self, transport: &T, token: &str) -> ApiResult<()> {
        let request = HttpRequest::new(HttpMethod::Post, &self.revoke_endpoint)
            .header("Accept", "application/json")
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("token", token),
            ]);
        dispatch(|| transport.send(request)).await?;
        info!("revoked authorization");
        Ok(())
    }

    async fn post_grant<T: Transport + ?Sized>(
        &self,
        transport: &T,
        params: &[(&str, &str)],
    ) -> ApiResult<TokenResponse> {
        let request = HttpRequest::new(HttpMethod::Post, &self.token_endpoint)
            .header("Accept", "application/json")
            .form(params);
        let response = dispatch(|| transport.send(request)).await?;
        response.json()
    }
}
