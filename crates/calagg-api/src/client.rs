//! The API client.
//!
//! Every network operation follows the same three steps: take the access
//! token from the [`CredentialManager`] (failing locally if there is none),
//! send exactly one request through [`dispatch`], and for reads decode the
//! body into a [`serde_json::Value`].

use serde::Serialize;
use serde_json::{Value, json};
use tracing::debug;

use crate::config::ClientConfig;
use crate::credentials::{CredentialManager, CredentialState, Credentials, TokenInfo};
use crate::dispatch::dispatch;
use crate::error::{ApiError, ApiResult};
use crate::event::{Event, ReadEventsParams};
use crate::transport::{HttpMethod, HttpRequest, HttpResponse, ReqwestTransport, Transport};

/// Client for the calendar aggregation API.
pub struct Client<T = ReqwestTransport> {
    config: ClientConfig,
    credentials: CredentialManager,
    transport: T,
}

impl Client<ReqwestTransport> {
    /// Creates a client against the default endpoints.
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        access_token: Option<String>,
        refresh_token: Option<String>,
    ) -> ApiResult<Self> {
        let credentials = Credentials {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            access_token,
            refresh_token,
        };
        Self::with_config(ClientConfig::new(), credentials)
    }

    /// Creates a client with custom endpoints or transport settings.
    pub fn with_config(config: ClientConfig, credentials: Credentials) -> ApiResult<Self> {
        config.validate()?;
        let transport = ReqwestTransport::new(config.timeout, &config.user_agent)?;
        Ok(Self::with_transport(config, credentials, transport))
    }
}

impl<T: Transport> Client<T> {
    /// Creates a client over an arbitrary transport.
    pub fn with_transport(config: ClientConfig, credentials: Credentials, transport: T) -> Self {
        let credentials = CredentialManager::new(credentials, &config);
        Self {
            config,
            credentials,
            transport,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn credential_manager(&self) -> &CredentialManager {
        &self.credentials
    }

    /// Snapshot of the identity and current tokens.
    pub fn credentials(&self) -> Credentials {
        self.credentials.credentials()
    }

    pub fn credential_state(&self) -> CredentialState {
        self.credentials.state()
    }

    pub fn access_token(&self) -> ApiResult<String> {
        self.credentials.access_token()
    }

    // -- authorization ------------------------------------------------------

    /// Builds the authorization URL. No request is made.
    pub fn user_auth_link(&self, redirect_uri: &str, scope: Option<&[&str]>) -> String {
        self.credentials.user_auth_link(redirect_uri, scope)
    }

    /// Exchanges an authorization code; later calls use the issued token.
    pub async fn get_token_from_code(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> ApiResult<TokenInfo> {
        self.credentials
            .get_token_from_code(&self.transport, code, redirect_uri)
            .await
    }

    /// Refreshes the access token; later calls use the new one.
    pub async fn refresh_access_token(&self) -> ApiResult<TokenInfo> {
        self.credentials.refresh(&self.transport).await
    }

    /// Revokes the grant and forgets both tokens.
    pub async fn revoke_authorization(&self) -> ApiResult<()> {
        self.credentials.revoke(&self.transport).await
    }

    // -- calendars and account ---------------------------------------------

    pub async fn list_calendars(&self) -> ApiResult<Value> {
        self.get_json("/v1/calendars").await
    }

    pub async fn account(&self) -> ApiResult<Value> {
        self.get_json("/v1/account").await
    }

    // -- events -------------------------------------------------------------

    /// Reads events across calendars. The result is the first page.
    pub async fn read_events(&self, params: &ReadEventsParams) -> ApiResult<Value> {
        let path = format!("/v1/events?{}", params.to_query_string());
        self.get_json(&path).await
    }

    /// Fetches a page by the absolute URL the service returned for it.
    pub async fn get_events_page(&self, page_url: &str) -> ApiResult<Value> {
        let path = self.config.strip_api_base(page_url)?;
        self.get_json(path).await
    }

    pub async fn create_or_update_event(&self, calendar_id: &str, event: &Event) -> ApiResult<()> {
        let path = calendar_events_path(calendar_id);
        self.send(HttpMethod::Post, &path, Some(event)).await?;
        Ok(())
    }

    /// Deletes an event. The id travels in a JSON body on the DELETE.
    pub async fn delete_event(&self, calendar_id: &str, event_id: &str) -> ApiResult<()> {
        let path = calendar_events_path(calendar_id);
        let body = json!({ "event_id": event_id });
        self.send(HttpMethod::Delete, &path, Some(&body)).await?;
        Ok(())
    }

    // -- channels -----------------------------------------------------------

    /// Registers a webhook that is notified when calendars change.
    pub async fn create_channel(&self, callback_url: &str) -> ApiResult<Value> {
        let body = json!({ "callback_url": callback_url });
        let response = self
            .send(HttpMethod::Post, "/v1/channels", Some(&body))
            .await?;
        response.json()
    }

    pub async fn list_channels(&self) -> ApiResult<Value> {
        self.get_json("/v1/channels").await
    }

    pub async fn close_channel(&self, channel_id: &str) -> ApiResult<()> {
        let path = format!("/v1/channels/{}", urlencoding::encode(channel_id));
        self.send::<Value>(HttpMethod::Delete, &path, None).await?;
        Ok(())
    }

    // -- plumbing -----------------------------------------------------------

    async fn get_json(&self, path: &str) -> ApiResult<Value> {
        let response = self.send::<Value>(HttpMethod::Get, path, None).await?;
        response.json()
    }

    async fn send<B: Serialize + ?Sized>(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<&B>,
    ) -> ApiResult<HttpResponse> {
        let token = self.credentials.access_token()?;

        let mut request = HttpRequest::new(method, self.config.api_endpoint(path))
            .bearer_auth(&token)
            .header("Accept", "application/json");
        if let Some(body) = body {
            request = request.json(body).map_err(|e| {
                ApiError::invalid_input(format!("failed to encode request body: {e}"))
                    .with_source(e)
            })?;
        }

        debug!(method = %method, path = %path, "sending API request");

        let result = dispatch(|| self.transport.send(request)).await;
        if let Err(ref err) = result {
            debug!(method = %method, path = %path, error = %err.kind(), "API request failed");
            self.credentials.observe_failure(err);
        }
        result
    }
}

fn calendar_events_path(calendar_id: &str) -> String {
    format!("/v1/calendars/{}/events", urlencoding::encode(calendar_id))
}
