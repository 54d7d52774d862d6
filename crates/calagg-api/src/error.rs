//! Error types for API operations.
//!
//! Every failure surfaced by this crate is an [`ApiError`]. HTTP failures are
//! classified by status code into an [`ApiErrorKind`] and keep the full
//! upstream response for diagnostics; local failures (no token, transport
//! down, undecodable body) carry only a message and an optional source.

use std::fmt;

use thiserror::Error;

use crate::transport::{HttpResponse, TransportError};

/// The category of an API error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiErrorKind {
    /// No access token is held; raised before any request is sent.
    CredentialsMissing,
    /// 401 - the access token was rejected.
    AuthenticationFailure,
    /// 403 - the token lacks permission for this operation.
    AuthorizationFailure,
    /// 404 - the resource does not exist.
    NotFound,
    /// 422 - the request was understood but rejected.
    InvalidRequest,
    /// 429 - rate limit exceeded.
    TooManyRequests,
    /// Any other non-2xx status.
    Unknown,
    /// The request never produced a status (connect, timeout, TLS).
    Network,
    /// A 2xx response whose body was not the expected JSON.
    InvalidResponse,
    /// The caller supplied input that cannot be sent (foreign page URL,
    /// unencodable body).
    InvalidInput,
    /// Client construction failed (bad base URL, HTTP client build error).
    Configuration,
}

impl ApiErrorKind {
    /// Classifies a non-success HTTP status.
    pub fn from_status(status: u16) -> Self {
        match status {
            401 => Self::AuthenticationFailure,
            403 => Self::AuthorizationFailure,
            404 => Self::NotFound,
            422 => Self::InvalidRequest,
            429 => Self::TooManyRequests,
            _ => Self::Unknown,
        }
    }

    /// Returns true for kinds produced from an upstream HTTP status.
    pub fn is_http(&self) -> bool {
        matches!(
            self,
            Self::AuthenticationFailure
                | Self::AuthorizationFailure
                | Self::NotFound
                | Self::InvalidRequest
                | Self::TooManyRequests
                | Self::Unknown
        )
    }

    /// Returns a stable snake_case name for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CredentialsMissing => "credentials_missing",
            Self::AuthenticationFailure => "authentication_failure",
            Self::AuthorizationFailure => "authorization_failure",
            Self::NotFound => "not_found",
            Self::InvalidRequest => "invalid_request",
            Self::TooManyRequests => "too_many_requests",
            Self::Unknown => "unknown",
            Self::Network => "network",
            Self::InvalidResponse => "invalid_response",
            Self::InvalidInput => "invalid_input",
            Self::Configuration => "configuration",
        }
    }
}

impl fmt::Display for ApiErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An error returned by an API operation.
#[derive(Debug, Error)]
pub struct ApiError {
    kind: ApiErrorKind,
    message: String,
    /// The upstream response, for errors built from an HTTP status.
    response: Option<Box<HttpResponse>>,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl ApiError {
    /// Creates an error with the given kind and message.
    pub fn new(kind: ApiErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            response: None,
            source: None,
        }
    }

    /// Builds the mapped error for a non-success response.
    ///
    /// The message is the upstream status line; the whole response is kept.
    pub fn from_response(response: HttpResponse) -> Self {
        Self {
            kind: ApiErrorKind::from_status(response.status),
            message: response.status_line.clone(),
            response: Some(Box::new(response)),
            source: None,
        }
    }

    /// Creates a credentials-missing error.
    pub fn credentials_missing(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::CredentialsMissing, message)
    }

    /// Creates a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Network, message)
    }

    /// Creates an invalid response error.
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::InvalidResponse, message)
    }

    /// Creates an invalid input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::InvalidInput, message)
    }

    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Configuration, message)
    }

    /// Sets the source error.
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    /// Returns the error kind.
    pub fn kind(&self) -> ApiErrorKind {
        self.kind
    }

    /// Returns the error message (the status line for HTTP errors).
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the upstream response for HTTP errors.
    pub fn response(&self) -> Option<&HttpResponse> {
        self.response.as_deref()
    }

    /// Returns the upstream HTTP status for HTTP errors.
    pub fn status(&self) -> Option<u16> {
        self.response.as_ref().map(|r| r.status)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)?;
        if let Some(ref response) = self.response {
            let body = response.text();
            if !body.is_empty() {
                write!(f, " ({})", body.trim())?;
            }
        }
        Ok(())
    }
}

impl From<TransportError> for ApiError {
    fn from(err: TransportError) -> Self {
        Self::network(err.to_string()).with_source(err)
    }
}

/// A specialized Result type for API operations.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_table() {
        assert_eq!(
            ApiErrorKind::from_status(401),
            ApiErrorKind::AuthenticationFailure
        );
        assert_eq!(
            ApiErrorKind::from_status(403),
            ApiErrorKind::AuthorizationFailure
        );
        assert_eq!(ApiErrorKind::from_status(404), ApiErrorKind::NotFound);
        assert_eq!(ApiErrorKind::from_status(422), ApiErrorKind::InvalidRequest);
        assert_eq!(ApiErrorKind::from_status(429), ApiErrorKind::TooManyRequests);
    }

    #[test]
    fn unlisted_statuses_are_unknown() {
        for status in [300, 400, 402, 409, 418, 500, 502, 503] {
            assert_eq!(ApiErrorKind::from_status(status), ApiErrorKind::Unknown);
        }
    }

    #[test]
    fn http_kinds() {
        assert!(ApiErrorKind::NotFound.is_http());
        assert!(ApiErrorKind::Unknown.is_http());
        assert!(!ApiErrorKind::CredentialsMissing.is_http());
        assert!(!ApiErrorKind::Network.is_http());
    }

    #[test]
    fn from_response_keeps_payload() {
        let response = HttpResponse::new(422, r#"{"errors":{"summary":["required"]}}"#)
            .with_header("Content-Type", "application/json");
        let err = ApiError::from_response(response);

        assert_eq!(err.kind(), ApiErrorKind::InvalidRequest);
        assert_eq!(err.message(), "422 Unprocessable Entity");
        assert_eq!(err.status(), Some(422));

        let kept = err.response().unwrap();
        assert_eq!(kept.header("content-type"), Some("application/json"));
        assert!(kept.text().contains("required"));
    }

    #[test]
    fn display_includes_kind_and_body() {
        let err = ApiError::from_response(HttpResponse::new(404, "no such calendar"));
        let display = err.to_string();
        assert!(display.starts_with("not_found: 404 Not Found"));
        assert!(display.contains("no such calendar"));
    }

    #[test]
    fn local_errors_have_no_response() {
        let err = ApiError::credentials_missing("no access token");
        assert_eq!(err.kind(), ApiErrorKind::CredentialsMissing);
        assert!(err.response().is_none());
        assert!(err.status().is_none());
    }

    #[test]
    fn transport_error_becomes_network() {
        use std::error::Error;
        let err: ApiError = TransportError::new("connection refused").into();
        assert_eq!(err.kind(), ApiErrorKind::Network);
        assert!(err.source().is_some());
    }
}
