//! Guarded execution of a single request.
//!
//! [`dispatch`] runs one unit of work and turns its outcome into an
//! [`ApiResult`]: transport failures become `Network` errors, non-2xx
//! responses become the kind given by [`ApiErrorKind::from_status`], and 2xx
//! responses pass through untouched.
//!
//! [`ApiErrorKind::from_status`]: crate::error::ApiErrorKind::from_status

use std::future::Future;

use crate::error::{ApiError, ApiResult};
use crate::transport::{HttpResponse, TransportError};

/// Runs `work` once and maps its outcome.
pub async fn dispatch<F, Fut>(work: F) -> ApiResult<HttpResponse>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<HttpResponse, TransportError>>,
{
    let response = work().await?;
    check_status(response)
}

/// Passes 2xx responses through and maps everything else.
pub fn check_status(response: HttpResponse) -> ApiResult<HttpResponse> {
    if response.is_success() {
        Ok(response)
    } else {
        Err(ApiError::from_response(response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiErrorKind;

    async fn run(status: u16) -> ApiResult<HttpResponse> {
        dispatch(|| async move {
            Ok(HttpResponse::new(status, format!("body for {status}"))
                .with_header("X-Request-Id", "req-1"))
        })
        .await
    }

    #[tokio::test]
    async fn mapped_statuses() {
        let cases = [
            (401, ApiErrorKind::AuthenticationFailure),
            (403, ApiErrorKind::AuthorizationFailure),
            (404, ApiErrorKind::NotFound),
            (422, ApiErrorKind::InvalidRequest),
            (429, ApiErrorKind::TooManyRequests),
        ];
        for (status, kind) in cases {
            let err = run(status).await.unwrap_err();
            assert_eq!(err.kind(), kind, "status {status}");
            let response = err.response().expect("response kept");
            assert_eq!(response.status, status);
            assert_eq!(response.text(), format!("body for {status}"));
            assert_eq!(response.header("x-request-id"), Some("req-1"));
        }
    }

    #[tokio::test]
    async fn other_statuses_are_unknown_with_payload() {
        for status in [400, 405, 409, 500, 503] {
            let err = run(status).await.unwrap_err();
            assert_eq!(err.kind(), ApiErrorKind::Unknown, "status {status}");
            assert_eq!(err.status(), Some(status));
            assert!(err.response().unwrap().text().contains("body for"));
        }
    }

    #[tokio::test]
    async fn success_passes_through_unchanged() {
        let response = run(200).await.unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(response.text(), "body for 200");
        assert_eq!(response.header("X-Request-Id"), Some("req-1"));

        assert!(run(202).await.is_ok());
        assert!(run(204).await.is_ok());
    }

    #[tokio::test]
    async fn transport_failure_is_network() {
        let err = dispatch(|| async { Err(TransportError::new("connection refused")) })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ApiErrorKind::Network);
        assert!(err.response().is_none());
    }

    #[tokio::test]
    async fn work_runs_exactly_once() {
        let mut calls = 0;
        let _ = dispatch(|| {
            calls += 1;
            async { Ok(HttpResponse::new(500, "")) }
        })
        .await;
        assert_eq!(calls, 1);
    }
}
