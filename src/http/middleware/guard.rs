//! Axum adapter for the request [`Pipeline`].
//!
//! Pulls the facts the stages need out of the request, turns a rejection into an
//! [`ApiError`] response, and attaches [`AuthContext`] for handlers on success.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::body::Body;
use axum::extract::{ConnectInfo, State};
use axum::http::{header, HeaderMap, Request};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::http::error::ApiError;
use crate::http::pipeline::{consulted_limiter, Pipeline, Rejection, RequestFacts};
use crate::observability::metrics;
use crate::security::identifier::client_address;
use crate::security::Credential;

fn header_str<'a>(headers: &'a HeaderMap, name: header::HeaderName) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

pub async fn request_guard(
    State(pipeline): State<Arc<Pipeline>>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let start = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let peer = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());
    let client = client_address(peer, req.headers(), pipeline.trust_forwarded_for());

    let outcome = {
        let headers = req.headers();
        let facts = RequestFacts {
            path: &path,
            host: header_str(headers, header::HOST),
            client,
            user_agent: header_str(headers, header::USER_AGENT),
            authorization: Credential::from_header(headers.get(header::AUTHORIZATION)),
        };
        pipeline.evaluate(&facts)
    };
    if consulted_limiter(&outcome) {
        metrics::record_ledger_size(pipeline.limiter().tracked_identifiers());
    }

    let response = match outcome {
        Ok(admission) => {
            if let Some(ctx) = admission.auth {
                req.extensions_mut().insert(ctx);
            }
            let response = next.run(req).await;
            tracing::info!(
                method = %method,
                path = %path,
                status = response.status().as_u16(),
                elapsed_ms = start.elapsed().as_millis() as u64,
                "Request served"
            );
            response
        }
        Err(rejection) => {
            log_rejection(&rejection, &path, client);
            ApiError::from(rejection).into_response()
        }
    };

    let elapsed = start.elapsed();
    if pipeline.is_slow(elapsed) {
        tracing::warn!(
            method = %method,
            path = %path,
            elapsed_ms = elapsed.as_millis() as u64,
            "Slow request"
        );
        metrics::record_slow_request();
    }
    metrics::record_request(method.as_str(), response.status().as_u16(), start);

    response
}

fn log_rejection(rejection: &Rejection, path: &str, client: Option<std::net::IpAddr>) {
    match rejection {
        Rejection::UntrustedHost { host } => {
            tracing::warn!(path, host = ?host, "Rejected request with untrusted host");
            metrics::record_untrusted_host();
        }
        Rejection::RateLimited { identifier, .. } => {
            tracing::warn!(path, identifier = %identifier, "Rate limit exceeded");
            metrics::record_rate_limited();
        }
        Rejection::Unauthorized(failure) => {
            tracing::warn!(
                path,
                client = ?client,
                reason = failure.reason(),
                "Authorization failed"
            );
            metrics::record_auth_failure(failure.reason());
        }
    }
}
