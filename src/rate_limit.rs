use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::time::Instant;
use tracing::debug;

use crate::config::GateConfig;
use crate::error::GateError;

// Rate limit entry - tracks requests per client in the current window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientWindow {
    pub count: u32,
    pub window_start: Instant,
}

impl ClientWindow {
    fn open(now: Instant) -> Self {
        Self {
            count: 1,
            window_start: now,
        }
    }
}

/// Outcome of a gate check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Allow,
    Deny,
}

impl Verdict {
    pub fn is_allowed(self) -> bool {
        self == Verdict::Allow
    }

    /// Turn a denial into the error the HTTP layer renders.
    pub fn into_result(self) -> Result<(), GateError> {
        match self {
            Verdict::Allow => Ok(()),
            Verdict::Deny => Err(GateError::RateLimitExceeded),
        }
    }
}

/// Fixed-window request gate keyed by client identifier.
///
/// Each client's check-and-increment runs under the DashMap shard guard for
/// its key, so concurrent requests from one client cannot overrun the limit.
pub struct RateLimiter {
    config: GateConfig,
    windows: DashMap<String, ClientWindow>,
}

impl RateLimiter {
    pub fn new(config: GateConfig) -> Self {
        Self {
            config,
            windows: DashMap::new(),
        }
    }

    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    pub fn is_protected(&self, path: &str) -> bool {
        path.starts_with(&self.config.prefix)
    }

    pub fn check(&self, path: &str, client_id: &str) -> Verdict {
        self.check_at(path, client_id, Instant::now())
    }

    /// Run the gate for one request observed at `now`.
    ///
    /// Unprotected paths are admitted without touching the table. A denied
    /// request is not counted.
    pub fn check_at(&self, path: &str, client_id: &str, now: Instant) -> Verdict {
        if !self.is_protected(path) {
            return Verdict::Allow;
        }

        let mut entry = match self.windows.entry(client_id.to_string()) {
            // first request from this client? open a window
            Entry::Vacant(vacant) => {
                vacant.insert(ClientWindow::open(now));
                debug!(client = %client_id, path = %path, "Opened rate limit window");
                return Verdict::Allow;
            }
            Entry::Occupied(occupied) => occupied.into_ref(),
        };

        // window expired..? Reset it
        if now.saturating_duration_since(entry.window_start) >= self.config.window {
            *entry = ClientWindow::open(now);
            debug!(client = %client_id, "Rate limit window reset");
            return Verdict::Allow;
        }

        // under limit.? Allow
        if entry.count < self.config.max_requests {
            entry.count += 1;
            return Verdict::Allow;
        }

        debug!(
            client = %client_id,
            path = %path,
            count = entry.count,
            "Rate limit exceeded"
        );
        Verdict::Deny
    }

    /// Snapshot of a client's current record.
    pub fn window(&self, client_id: &str) -> Option<ClientWindow> {
        self.windows.get(client_id).map(|w| *w)
    }

    pub fn client_count(&self) -> usize {
        self.windows.len()
    }

    pub fn sweep(&self) -> usize {
        self.sweep_at(Instant::now())
    }

    /// Drop records whose window has already expired at `now`.
    ///
    /// An expired record would be overwritten on its next access, so removing
    /// it never changes a verdict. Returns the number of records removed.
    pub fn sweep_at(&self, now: Instant) -> usize {
        let window = self.config.window;
        let before = self.windows.len();
        self.windows
            .retain(|_, w| now.saturating_duration_since(w.window_start) < window);
        before.saturating_sub(self.windows.len())
    }

    pub fn clear(&self) {
        self.windows.clear();
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(GateConfig::default())
    }
}
