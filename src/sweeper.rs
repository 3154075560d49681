use std::sync::Arc;
use tokio::time::{Duration, MissedTickBehavior, interval};
use tracing::{debug, info};

use crate::metrics::TRACKED_CLIENTS;
use crate::state::AppState;

// Eviction sweep - drops client windows that have already expired
pub async fn run(state: Arc<AppState>, sweep_interval: Duration) {
    let mut interval = interval(sweep_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    info!(interval = ?sweep_interval, "Window sweeper started");

    loop {
        interval.tick().await;

        let removed = state.rate_limiter.sweep();
        let remaining = state.rate_limiter.client_count();
        TRACKED_CLIENTS.set(remaining as f64);

        if removed > 0 {
            debug!(removed, remaining, "Evicted expired client windows");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GateConfig;
    use crate::rate_limit::RateLimiter;

    #[tokio::test]
    async fn test_sweeper_evicts_expired_windows() {
        let state = Arc::new(AppState::new(RateLimiter::new(GateConfig {
            window: Duration::from_millis(20),
            ..GateConfig::default()
        })));
        state.rate_limiter.check("/api/items", "1.2.3.4");
        assert_eq!(state.rate_limiter.client_count(), 1);

        let task = tokio::spawn(run(Arc::clone(&state), Duration::from_millis(10)));
        tokio::time::sleep(Duration::from_millis(200)).await;
        task.abort();

        assert_eq!(state.rate_limiter.client_count(), 0);
    }
}
