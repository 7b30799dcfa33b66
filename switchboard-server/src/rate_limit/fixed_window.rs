use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::debug;

#[derive(Debug, Clone, Copy)]
struct Window {
    count: u32,
    expires_at: Instant,
}

impl Window {
    fn start(now: Instant, length: Duration) -> Self {
        Self {
            count: 1,
            expires_at: now + length,
        }
    }
}

/// Fixed-window counter keyed by an arbitrary string (the origin address for sockets).
///
/// Bursts of up to `2 * limit` across a window boundary are possible; windows are not sliding.
#[derive(Debug, Default)]
pub struct RateLimiter {
    windows: DashMap<String, Window>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` when the call is within budget. A denied call does not count.
    pub fn allow(&self, key: &str, limit: u32, window: Duration) -> bool {
        let now = Instant::now();

        // The entry guard holds the shard lock, so the whole check-and-update is atomic.
        match self.windows.entry(key.to_owned()) {
            Entry::Vacant(vacant) => {
                vacant.insert(Window::start(now, window));
                true
            }
            Entry::Occupied(mut occupied) => {
                let current = occupied.get_mut();
                if now >= current.expires_at {
                    *current = Window::start(now, window);
                    true
                } else if current.count >= limit {
                    false
                } else {
                    current.count += 1;
                    true
                }
            }
        }
    }

    /// Drops every expired window and returns how many were removed.
    pub fn sweep(&self) -> usize {
        let now = Instant::now();
        let before = self.windows.len();
        self.windows.retain(|_, w| w.expires_at > now);
        before.saturating_sub(self.windows.len())
    }

    pub fn tracked_keys(&self) -> usize {
        self.windows.len()
    }

    /// Runs `sweep` on a fixed period for the lifetime of the process.
    pub fn spawn_sweeper(self: Arc<Self>, every: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let removed = self.sweep();
                if removed > 0 {
                    debug!(removed, remaining = self.tracked_keys(), "Swept expired rate-limit windows");
                }
            }
        })
    }

    #[cfg(test)]
    fn count_for(&self, key: &str) -> Option<u32> {
        self.windows.get(key).map(|w| w.count)
    }
}
