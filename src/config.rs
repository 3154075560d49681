//! Command line arguments and the validated gate configuration.

use clap::Parser;
use std::time::Duration;

use crate::error::{GateError, Result};

/// Default length of one rate limit window.
pub const WINDOW_DURATION: Duration = Duration::from_millis(120_000);
/// Default number of admitted requests per client per window.
pub const MAX_REQUESTS: u32 = 10;
/// Default path prefix subject to rate limiting.
pub const PROTECTED_PREFIX: &str = "/api";
/// Identifier shared by every client whose address cannot be determined.
pub const UNKNOWN_CLIENT: &str = "unknown";

// CLI argument structure
#[derive(Parser, Debug, Clone)]
#[command(name = "api-rate-gate")]
#[command(about = "Fixed-window rate limiting gate for API routes")]
pub struct Args {
    // Port to run the server on
    #[arg(short, long, default_value_t = 3000)]
    pub port: u16,

    // Path prefix subject to rate limiting
    #[arg(long, default_value = PROTECTED_PREFIX)]
    pub prefix: String,

    // Rate limit max requests per window
    #[arg(long, default_value_t = MAX_REQUESTS)]
    pub rate_limit: u32,

    // Rate limit window in milliseconds
    #[arg(long, default_value_t = 120_000)]
    pub rate_window_ms: u64,

    // Seconds between sweeps of expired windows, 0 disables the sweep
    #[arg(long, default_value_t = 60)]
    pub sweep_interval: u64,

    // Key clients by the first X-Forwarded-For entry when present
    #[arg(long)]
    pub trust_forwarded_for: bool,
}

impl Args {
    /// Validate the gate related arguments.
    pub fn gate_config(&self) -> Result<GateConfig> {
        if !self.prefix.starts_with('/') {
            return Err(GateError::Config(format!(
                "prefix must start with '/', got {:?}",
                self.prefix
            )));
        }
        if self.rate_limit == 0 {
            return Err(GateError::Config("rate limit must be at least 1".to_string()));
        }
        if self.rate_window_ms == 0 {
            return Err(GateError::Config("rate window must be at least 1ms".to_string()));
        }

        Ok(GateConfig {
            prefix: self.prefix.clone(),
            max_requests: self.rate_limit,
            window: Duration::from_millis(self.rate_window_ms),
            trust_forwarded_for: self.trust_forwarded_for,
        })
    }

    pub fn sweep_interval(&self) -> Option<Duration> {
        (self.sweep_interval > 0).then(|| Duration::from_secs(self.sweep_interval))
    }
}

/// Settings the request gate runs with.
#[derive(Debug, Clone)]
pub struct GateConfig {
    /// Paths starting with this prefix are rate limited
    pub prefix: String,
    /// Requests admitted per client per window
    pub max_requests: u32,
    /// Length of one window
    pub window: Duration,
    /// Use X-Forwarded-For as the client identifier
    pub trust_forwarded_for: bool,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            prefix: PROTECTED_PREFIX.to_string(),
            max_requests: MAX_REQUESTS,
            window: WINDOW_DURATION,
            trust_forwarded_for: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_constants() {
        let args = Args::parse_from(["api-rate-gate"]);
        let config = args.gate_config().unwrap();

        assert_eq!(args.port, 3000);
        assert_eq!(config.prefix, "/api");
        assert_eq!(config.max_requests, 10);
        assert_eq!(config.window, Duration::from_millis(120_000));
        assert!(!config.trust_forwarded_for);
        assert_eq!(args.sweep_interval(), Some(Duration::from_secs(60)));
    }

    #[test]
    fn test_overrides() {
        let args = Args::parse_from([
            "api-rate-gate",
            "--prefix",
            "/v1",
            "--rate-limit",
            "3",
            "--rate-window-ms",
            "500",
            "--sweep-interval",
            "0",
            "--trust-forwarded-for",
        ]);
        let config = args.gate_config().unwrap();

        assert_eq!(config.prefix, "/v1");
        assert_eq!(config.max_requests, 3);
        assert_eq!(config.window, Duration::from_millis(500));
        assert!(config.trust_forwarded_for);
        assert_eq!(args.sweep_interval(), None);
    }

    #[test]
    fn test_invalid_values_rejected() {
        for argv in [
            ["api-rate-gate", "--prefix", "api"],
            ["api-rate-gate", "--rate-limit", "0"],
            ["api-rate-gate", "--rate-window-ms", "0"],
        ] {
            let args = Args::parse_from(argv);
            assert!(matches!(args.gate_config(), Err(GateError::Config(_))));
        }
    }

    #[test]
    fn test_default_gate_config() {
        let config = GateConfig::default();
        assert_eq!(config.prefix, PROTECTED_PREFIX);
        assert_eq!(config.max_requests, MAX_REQUESTS);
        assert_eq!(config.window, WINDOW_DURATION);
    }
}
