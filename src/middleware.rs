//! axum middleware that runs the request gate in front of every route.

use axum::{
    extract::{ConnectInfo, Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::warn;

use crate::config::UNKNOWN_CLIENT;
use crate::metrics::{REJECTED_TOTAL, REQUEST_TOTAL, TRACKED_CLIENTS};
use crate::state::AppState;

const FORWARDED_FOR: &str = "x-forwarded-for";

/// Best-effort client identifier for a request.
///
/// Order: first `X-Forwarded-For` entry (only when trusted), peer address,
/// then the shared `unknown` sentinel.
pub fn client_id(
    headers: &HeaderMap,
    peer: Option<&ConnectInfo<SocketAddr>>,
    trust_forwarded_for: bool,
) -> String {
    if trust_forwarded_for {
        let forwarded = headers
            .get(FORWARDED_FOR)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(',').map(str::trim).find(|s| !s.is_empty()));
        if let Some(ip) = forwarded {
            return ip.to_string();
        }
    }

    match peer {
        Some(ConnectInfo(addr)) => addr.ip().to_string(),
        None => UNKNOWN_CLIENT.to_string(),
    }
}

pub async fn rate_limit_middleware(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    REQUEST_TOTAL.inc();

    let limiter = &state.rate_limiter;
    let client = client_id(
        request.headers(),
        request.extensions().get::<ConnectInfo<SocketAddr>>(),
        limiter.config().trust_forwarded_for,
    );

    let verdict = limiter.check(request.uri().path(), &client);
    TRACKED_CLIENTS.set(limiter.client_count() as f64);

    if let Err(err) = verdict.into_result() {
        REJECTED_TOTAL.inc();
        warn!(client = %client, path = %request.uri().path(), "Request rejected");
        return err.into_response();
    }

    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn peer(addr: &str) -> ConnectInfo<SocketAddr> {
        ConnectInfo(addr.parse().unwrap())
    }

    #[test]
    fn test_client_id_from_peer() {
        let headers = HeaderMap::new();
        let peer = peer("1.2.3.4:5555");
        assert_eq!(client_id(&headers, Some(&peer), false), "1.2.3.4");
    }

    #[test]
    fn test_client_id_unknown_without_peer() {
        let headers = HeaderMap::new();
        assert_eq!(client_id(&headers, None, false), "unknown");
        assert_eq!(client_id(&headers, None, true), "unknown");
    }

    #[test]
    fn test_forwarded_for_ignored_unless_trusted() {
        let mut headers = HeaderMap::new();
        headers.insert(FORWARDED_FOR, HeaderValue::from_static("9.9.9.9"));
        let peer = peer("1.2.3.4:5555");

        assert_eq!(client_id(&headers, Some(&peer), false), "1.2.3.4");
        assert_eq!(client_id(&headers, Some(&peer), true), "9.9.9.9");
    }

    #[test]
    fn test_forwarded_for_takes_first_entry() {
        let mut headers = HeaderMap::new();
        headers.insert(
            FORWARDED_FOR,
            HeaderValue::from_static(" , 203.0.113.7 , 10.0.0.1"),
        );
        assert_eq!(client_id(&headers, None, true), "203.0.113.7");
    }

    #[test]
    fn test_empty_forwarded_for_falls_back() {
        let mut headers = HeaderMap::new();
        headers.insert(FORWARDED_FOR, HeaderValue::from_static(""));
        let peer = peer("[::1]:8080");
        assert_eq!(client_id(&headers, Some(&peer), true), "::1");
    }
}
