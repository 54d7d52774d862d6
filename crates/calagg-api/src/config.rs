//! Client configuration.

use std::time::Duration;

use url::Url;

use crate::error::{ApiError, ApiResult};

/// Base URL of the data API.
pub const DEFAULT_API_URL: &str = "https://api.calagg.io";

/// Base URL of the authorization server.
pub const DEFAULT_APP_URL: &str = "https://app.calagg.io";

/// Scopes requested by [`crate::CredentialManager::user_auth_link`] when the
/// caller passes none.
pub const DEFAULT_SCOPES: &[&str] = &[
    "read_account",
    "list_calendars",
    "read_events",
    "create_event",
    "delete_event",
];

/// Endpoints and transport settings for a [`crate::Client`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    api_url: String,
    app_url: String,

    /// Request timeout applied by the default transport.
    pub timeout: Duration,

    /// User agent sent by the default transport.
    pub user_agent: String,

    /// Scopes requested when the caller does not name any.
    pub default_scopes: Vec<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientConfig {
    /// Default timeout in seconds.
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    pub fn new() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            app_url: DEFAULT_APP_URL.to_string(),
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
            user_agent: format!("calagg/{}", env!("CARGO_PKG_VERSION")),
            default_scopes: DEFAULT_SCOPES.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Sets the data API base URL. A trailing slash is dropped.
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = trim_base(url.into());
        self
    }

    /// Sets the authorization server base URL. A trailing slash is dropped.
    pub fn with_app_url(mut self, url: impl Into<String>) -> Self {
        self.app_url = trim_base(url.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_default_scopes(mut self, scopes: Vec<String>) -> Self {
        self.default_scopes = scopes;
        self
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    pub fn app_url(&self) -> &str {
        &self.app_url
    }

    /// Absolute URL for an API path such as `/v1/calendars`.
    pub fn api_endpoint(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }

    pub fn authorize_endpoint(&self) -> String {
        format!("{}/oauth/authorize", self.app_url)
    }

    pub fn token_endpoint(&self) -> String {
        format!("{}/oauth/token", self.app_url)
    }

    pub fn revoke_endpoint(&self) -> String {
        format!("{}/oauth/token/revoke", self.app_url)
    }

    /// Turns an absolute URL under the API base into a path + query.
    ///
    /// Only URLs on the configured base are accepted; anything else would
    /// receive the bearer token.
    pub fn strip_api_base<'a>(&self, url: &'a str) -> ApiResult<&'a str> {
        url.strip_prefix(self.api_url.as_str())
            .filter(|rest| rest.starts_with('/'))
            .ok_or_else(|| {
                ApiError::invalid_input(format!(
                    "page URL {url} is not under the API base {}",
                    self.api_url
                ))
            })
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ApiResult<()> {
        for (name, value) in [("api_url", &self.api_url), ("app_url", &self.app_url)] {
            let parsed = Url::parse(value).map_err(|e| {
                ApiError::configuration(format!("invalid {name} {value:?}: {e}")).with_source(e)
            })?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(ApiError::configuration(format!(
                    "{name} must be an http(s) URL, got {value:?}"
                )));
            }
        }

        if self.default_scopes.is_empty() {
            return Err(ApiError::configuration(
                "at least one default scope is required",
            ));
        }

        Ok(())
    }
}

fn trim_base(mut url: String) -> String {
    while url.ends_with('/') {
        url.pop();
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiErrorKind;

    #[test]
    fn defaults() {
        let config = ClientConfig::new();
        assert_eq!(config.api_url(), DEFAULT_API_URL);
        assert_eq!(config.app_url(), DEFAULT_APP_URL);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.user_agent.starts_with("calagg/"));
        assert_eq!(config.default_scopes.len(), DEFAULT_SCOPES.len());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn endpoints() {
        let config = ClientConfig::new()
            .with_api_url("http://localhost:9000/")
            .with_app_url("http://localhost:9001");
        assert_eq!(
            config.api_endpoint("/v1/channels"),
            "http://localhost:9000/v1/channels"
        );
        assert_eq!(config.token_endpoint(), "http://localhost:9001/oauth/token");
        assert_eq!(
            config.authorize_endpoint(),
            "http://localhost:9001/oauth/authorize"
        );
        assert_eq!(
            config.revoke_endpoint(),
            "http://localhost:9001/oauth/token/revoke"
        );
    }

    #[test]
    fn strip_api_base_keeps_path_and_query() {
        let config = ClientConfig::new();
        let page = format!("{DEFAULT_API_URL}/v1/events?cursor=abc");
        assert_eq!(config.strip_api_base(&page).unwrap(), "/v1/events?cursor=abc");
    }

    #[test]
    fn strip_api_base_rejects_foreign_urls() {
        let config = ClientConfig::new();
        for url in [
            "https://elsewhere.test/v1/events?cursor=abc",
            "https://api.calagg.io.elsewhere.test/v1/events",
            "/v1/events",
        ] {
            let err = config.strip_api_base(url).unwrap_err();
            assert_eq!(err.kind(), ApiErrorKind::InvalidInput, "{url}");
        }
    }

    #[test]
    fn validation_rejects_bad_urls_and_scopes() {
        let bad_url = ClientConfig::new().with_api_url("not a url");
        assert_eq!(
            bad_url.validate().unwrap_err().kind(),
            ApiErrorKind::Configuration
        );

        let bad_scheme = ClientConfig::new().with_app_url("ftp://app.test");
        assert!(bad_scheme.validate().is_err());

        let no_scopes = ClientConfig::new().with_default_scopes(vec![]);
        assert!(no_scopes.validate().is_err());
    }
}
