//! Rate-limit middleware for the cache routes.

use axum::{
    extract::{Request, State},
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::handlers::AppState;
use crate::error::CacheError;
use crate::rate_limit::RateLimitDecision;

pub const LIMIT_HEADER: &str = "x-ratelimit-limit";
pub const REMAINING_HEADER: &str = "x-ratelimit-remaining";
pub const RESET_HEADER: &str = "x-ratelimit-reset";

/// Identifies the caller by the first `x-forwarded-for` hop.
pub fn client_identifier(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or("anonymous")
        .to_string()
}

fn annotate(response: &mut Response, decision: RateLimitDecision) {
    let headers = response.headers_mut();
    headers.insert(LIMIT_HEADER, HeaderValue::from(decision.limit));
    headers.insert(REMAINING_HEADER, HeaderValue::from(decision.remaining));
    headers.insert(RESET_HEADER, HeaderValue::from(decision.reset_in));
}

/// Counts the request against the caller's budget; 429 once it is spent.
pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let identifier = client_identifier(request.headers());
    let decision = state.limiter.check_policy(&identifier, state.policy).await;

    let mut response = if decision.allowed {
        next.run(request).await
    } else {
        CacheError::RateLimited(identifier).into_response()
    };

    annotate(&mut response, decision);
    response
}
