//! OAuth credential state.
//!
//! [`CredentialManager`] is the single source of truth for "is there a usable
//! access token right now". It holds the client identity and the current
//! token pair, and is the only thing that mutates them: code exchange,
//! refresh and revocation replace the pair in one write under the lock, so a
//! concurrent reader sees either the old pair or the new one.
//!
//! Expiry is never predicted from a clock. It is observed when the API
//! rejects a token with 401, and it is up to the caller to [`refresh`] and
//! retry.
//!
//! [`refresh`]: CredentialManager::refresh

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::error::{ApiError, ApiErrorKind, ApiResult};
use crate::oauth::{OAuthClient, TokenResponse};
use crate::transport::Transport;

/// Client identity plus the current token pair.
///
/// The two tokens are independent: an access token may exist without a
/// refresh token, and a refresh token may outlive its access token.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

impl Credentials {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            access_token: None,
            refresh_token: None,
        }
    }

    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    pub fn with_refresh_token(mut self, token: impl Into<String>) -> Self {
        self.refresh_token = Some(token.into());
        self
    }
}

/// Tokens issued by a code exchange or refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenInfo {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_in: Option<i64>,
    pub expires_at: Option<DateTime<Utc>>,
    pub token_type: Option<String>,
    pub scope: Option<String>,
}

impl TokenInfo {
    fn from_response(response: TokenResponse, refresh_token: Option<String>) -> Self {
        let expires_at = response.expires_at(Utc::now());
        Self {
            access_token: response.access_token,
            refresh_token,
            expires_in: response.expires_in,
            expires_at,
            token_type: response.token_type,
            scope: response.scope,
        }
    }
}

/// Where the credentials stand in the OAuth lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialState {
    /// No access token.
    Unauthenticated,
    /// An access token is held and has not been rejected.
    Authenticated,
    /// The access token was rejected; a refresh token is available.
    Expired,
    /// Refresh is impossible; only a new authorization code helps.
    Revoked,
}

impl CredentialState {
    /// Returns true if API calls will be attempted in this state.
    pub fn has_access_token(&self) -> bool {
        !matches!(self, Self::Unauthenticated)
    }
}

#[derive(Debug)]
struct TokenState {
    access_token: Option<String>,
    refresh_token: Option<String>,
    state: CredentialState,
}

/// Owner of the OAuth credential state.
#[derive(Debug)]
pub struct CredentialManager {
    oauth: OAuthClient,
    default_scopes: Vec<String>,
    tokens: RwLock<TokenState>,
}

impl CredentialManager {
    pub fn new(credentials: Credentials, config: &ClientConfig) -> Self {
        let state = if credentials.access_token.is_some() {
            CredentialState::Authenticated
        } else {
            CredentialState::Unauthenticated
        };

        Self {
            oauth: OAuthClient::new(credentials.client_id, credentials.client_secret, config),
            default_scopes: config.default_scopes.clone(),
            tokens: RwLock::new(TokenState {
                access_token: credentials.access_token,
                refresh_token: credentials.refresh_token,
                state,
            }),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, TokenState> {
        self.tokens.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, TokenState> {
        self.tokens.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the current access token.
    ///
    /// Every API operation calls this before doing any I/O.
    pub fn access_token(&self) -> ApiResult<String> {
        self.read()
            .access_token
            .clone()
            .ok_or_else(|| ApiError::credentials_missing("no access token is available"))
    }

    /// Returns the current refresh token, if any.
    pub fn refresh_token(&self) -> Option<String> {
        self.read().refresh_token.clone()
    }

    pub fn state(&self) -> CredentialState {
        self.read().state
    }

    /// Returns a snapshot of the identity and token pair.
    pub fn credentials(&self) -> Credentials {
        let tokens = self.read();
        Credentials {
            client_id: self.oauth.client_id().to_string(),
            client_secret: self.oauth.client_secret().to_string(),
            access_token: tokens.access_token.clone(),
            refresh_token: tokens.refresh_token.clone(),
        }
    }

    /// Builds the authorization URL for `redirect_uri`.
    ///
    /// `None` requests the configured default scopes.
    pub fn user_auth_link(&self, redirect_uri: &str, scope: Option<&[&str]>) -> String {
        match scope {
            Some(scope) => self.oauth.authorization_url(redirect_uri, scope),
            None => self
                .oauth
                .authorization_url(redirect_uri, self.default_scopes.as_slice()),
        }
    }

    /// Exchanges an authorization code and stores the issued tokens.
    pub async fn get_token_from_code<T: Transport + ?Sized>(
        &self,
        transport: &T,
        code: &str,
        redirect_uri: &str,
    ) -> ApiResult<TokenInfo> {
        let response = self.oauth.exchange_code(transport, code, redirect_uri).await?;
        let refresh_token = response.refresh_token.clone();
        let info = TokenInfo::from_response(response, refresh_token);
        self.store(&info);
        Ok(info)
    }

    /// Exchanges the stored refresh token for a new access token.
    ///
    /// If the server does not rotate the refresh token, the current one is
    /// kept. A rejection of the grant itself (400, 401 or 403 from the token
    /// endpoint) moves the state to [`CredentialState::Revoked`]; rate limits,
    /// server errors and network failures leave the state as it was.
    pub async fn refresh<T: Transport + ?Sized>(&self, transport: &T) -> ApiResult<TokenInfo> {
        let current = self
            .refresh_token()
            .ok_or_else(|| ApiError::credentials_missing("no refresh token is available"))?;

        let response = match self.oauth.refresh_token(transport, &current).await {
            Ok(response) => response,
            Err(err) => {
                if grant_rejected(&err) {
                    warn!(status = ?err.status(), "refresh token rejected");
                    self.write().state = CredentialState::Revoked;
                }
                return Err(err);
            }
        };

        let refresh_token = response.refresh_token.clone().or(Some(current));
        let info = TokenInfo::from_response(response, refresh_token);
        self.store(&info);
        Ok(info)
    }

    /// Revokes the held token and forgets both tokens.
    ///
    /// The refresh token is revoked when present, since that invalidates the
    /// whole grant; otherwise the access token is.
    pub async fn revoke<T: Transport + ?Sized>(&self, transport: &T) -> ApiResult<()> {
        let token = {
            let tokens = self.read();
            tokens
                .refresh_token
                .clone()
                .or_else(|| tokens.access_token.clone())
        }
        .ok_or_else(|| ApiError::credentials_missing("no token to revoke"))?;

        self.oauth.revoke(transport, &token).await?;

        let mut tokens = self.write();
        tokens.access_token = None;
        tokens.refresh_token = None;
        tokens.state = CredentialState::Unauthenticated;
        Ok(())
    }

    /// Records the outcome of a failed API call.
    ///
    /// A 401 marks the access token stale: `Expired` if a refresh token can
    /// replace it, `Revoked` otherwise.
    pub fn observe_failure(&self, err: &ApiError) {
        if err.kind() != ApiErrorKind::AuthenticationFailure {
            return;
        }
        let mut tokens = self.write();
        tokens.state = if tokens.refresh_token.is_some() {
            CredentialState::Expired
        } else {
            CredentialState::Revoked
        };
        debug!(state = ?tokens.state, "access token rejected");
    }

    fn store(&self, info: &TokenInfo) {
        let mut tokens = self.write();
        tokens.access_token = Some(info.access_token.clone());
        tokens.refresh_token = info.refresh_token.clone();
        tokens.state = CredentialState::Authenticated;
    }
}

/// Token endpoint statuses that mean the refresh token will never work.
fn grant_rejected(err: &ApiError) -> bool {
    matches!(err.status(), Some(400 | 401 | 403))
}
