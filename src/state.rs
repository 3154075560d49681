use crate::rate_limit::RateLimiter;
// app's shared state

pub struct AppState {
    pub rate_limiter: RateLimiter,
}

impl AppState {
    pub fn new(rate_limiter: RateLimiter) -> Self {
        Self { rate_limiter }
    }
}
