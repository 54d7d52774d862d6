//! Client for the calendar aggregation API.
//!
//! The crate has two pieces with real behavior and a thin layer of endpoint
//! calls on top:
//!
//! - [`CredentialManager`] - OAuth 2.0 credential state: authorization URL,
//!   code exchange, refresh, revocation
//! - [`dispatch()`] - runs one request and maps non-2xx statuses to
//!   [`ApiErrorKind`]s, keeping the upstream response
//! - [`Client`] - one method per endpoint, each a single guarded request
//!
//! ```text
//!  Client::list_calendars()
//!        │
//!        ├── CredentialManager::access_token()   (CredentialsMissing, no I/O)
//!        │
//!        ├── dispatch(|| transport.send(req))    (status → ApiErrorKind)
//!        │
//!        └── HttpResponse::json()                (serde_json::Value)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use calagg_api::{Client, ReadEventsParams};
//!
//! let client = Client::new("client-id", "client-secret", Some(token), Some(refresh))?;
//! let page = client.read_events(&ReadEventsParams::new()).await?;
//! if let Some(next) = calagg_api::next_page_url(&page) {
//!     let page2 = client.get_events_page(next).await?;
//! }
//! ```

pub mod client;
pub mod config;
pub mod credentials;
pub mod dispatch;
pub mod error;
pub mod event;
pub mod oauth;
pub mod transport;

#[cfg(test)]
mod mock;

pub use calagg_core::EventTime;
pub use client::Client;
pub use config::{ClientConfig, DEFAULT_API_URL, DEFAULT_APP_URL, DEFAULT_SCOPES};
pub use credentials::{CredentialManager, CredentialState, Credentials, TokenInfo};
pub use dispatch::{check_status, dispatch};
pub use error::{ApiError, ApiErrorKind, ApiResult};
pub use event::{DEFAULT_TZID, Event, Location, ReadEventsParams, next_page_url};
pub use oauth::{OAuthClient, TokenResponse};
pub use transport::{
    BoxFuture, HttpMethod, HttpRequest, HttpResponse, ReqwestTransport, Transport, TransportError,
};

/// Alias kept for callers that refer to the error type by its short name.
pub type Error = ApiError;
