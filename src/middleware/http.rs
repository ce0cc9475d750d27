//! HTTP-level middleware (cross-cutting concerns).
//!
//! Applied once to the outermost Router, so public and bearer-protected
//! routes share the same request id, access log, body limit and timeout.
//! Limits come from `Config` (`HTTP_BODY_LIMIT_BYTES`, `HTTP_TIMEOUT_SECONDS`).

use axum::Router;
use axum::error_handling::HandleErrorLayer;
use axum::http::header::HeaderName;
use axum::response::{IntoResponse, Response};
use tower::timeout::TimeoutLayer;
use tower::{BoxError, ServiceBuilder};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::error::AppError;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Apply request-id, access log, body limit and timeout layers.
pub fn apply(router: Router, config: &Config) -> Router {
    let request_id_header = HeaderName::from_static(REQUEST_ID_HEADER);

    let layers = ServiceBuilder::new()
        // TimeoutLayer の BoxError を AppError の JSON response に変換し、service を Infallible にする
        .layer(HandleErrorLayer::new(|err: BoxError| async move {
            middleware_error(err)
        }))
        .layer(SetRequestIdLayer::new(
            request_id_header.clone(),
            MakeRequestUuid,
        ))
        .layer(PropagateRequestIdLayer::new(request_id_header))
        .layer(RequestBodyLimitLayer::new(config.http_body_limit_bytes))
        .layer(TimeoutLayer::new(config.http_timeout))
        .layer(TraceLayer::new_for_http());

    router.layer(layers)
}

fn middleware_error(err: BoxError) -> Response {
    if err.is::<tower::timeout::error::Elapsed>() {
        tracing::warn!("request timed out");
        AppError::Timeout.into_response()
    } else {
        tracing::error!(error = %err, "unhandled middleware error");
        AppError::Internal.into_response()
    }
}
