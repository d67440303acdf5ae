//! # Rate Limiting
//!
//! One request budget shared by every client of the server, sized from
//! `ServiceConfig::rate_limit` (requests per second, `0` disables it).
//! Requests over budget get a 429 with the usual JSON error body.

use axum::{
    Json,
    extract::{Request, State},
    http::{StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use governor::{
    Quota, RateLimiter,
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
};
use std::num::NonZeroU32;
use std::sync::Arc;

use super::types::ErrorResponse;

/// Requests per second, refilled continuously.
pub struct RequestBudget {
    limiter: RateLimiter<NotKeyed, InMemoryState, DefaultClock>,
    per_second: NonZeroU32,
}

impl RequestBudget {
    /// Budget of `per_second` requests, or `None` when limiting is off.
    #[must_use]
    pub fn per_second(per_second: u32) -> Option<Arc<Self>> {
        let per_second = NonZeroU32::new(per_second)?;
        Some(Arc::new(Self {
            limiter: RateLimiter::direct(Quota::per_second(per_second)),
            per_second,
        }))
    }

    #[must_use]
    pub fn limit(&self) -> u32 {
        self.per_second.get()
    }

    /// Take one request from the budget.
    pub fn try_acquire(&self) -> bool {
        self.limiter.check().is_ok()
    }
}

/// Lets a request through while the budget lasts.
pub async fn enforce_budget(
    State(budget): State<Arc<RequestBudget>>,
    request: Request,
    next: Next,
) -> Response {
    if budget.try_acquire() {
        return next.run(request).await;
    }

    tracing::warn!(
        path = %request.uri().path(),
        limit = budget.limit(),
        "request budget exhausted"
    );
    (
        StatusCode::TOO_MANY_REQUESTS,
        [(header::RETRY_AFTER, "1")],
        Json(ErrorResponse {
            error: format!(
                "Rate limit of {} requests per second exceeded",
                budget.limit()
            ),
        }),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_disables_limiting() {
        assert!(RequestBudget::per_second(0).is_none());
    }

    #[test]
    fn budget_is_spent_per_request() {
        let budget = RequestBudget::per_second(2).expect("budget");
        assert_eq!(budget.limit(), 2);
        assert!(budget.try_acquire());
        assert!(budget.try_acquire());
        assert!(!budget.try_acquire());
    }
}
