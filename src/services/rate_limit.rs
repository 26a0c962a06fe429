use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

/// Source of the current time for the rate limiter
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now = *now + by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Outcome of a rate-limit check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    Allowed { remaining: u32 },
    Limited { retry_after_secs: i64 },
}

#[derive(Debug, Clone, Copy)]
struct Window {
    started_at: DateTime<Utc>,
    count: u32,
}

/// Fixed-window request counter keyed by client
///
/// Expired windows are only removed by [`RateLimitStore::sweep`] or
/// [`RateLimitStore::sweep_if_due`], which the owner calls explicitly; the
/// store never runs a background task.
pub struct RateLimitStore<C: Clock = SystemClock> {
    clock: C,
    max_requests: u32,
    window: Duration,
    entries: Mutex<HashMap<String, Window>>,
    last_sweep: Mutex<Option<DateTime<Utc>>>,
}

impl RateLimitStore<SystemClock> {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self::with_clock(SystemClock, max_requests, window)
    }
}

impl<C: Clock> RateLimitStore<C> {
    pub fn with_clock(clock: C, max_requests: u32, window: Duration) -> Self {
        Self {
            clock,
            max_requests,
            window,
            entries: Mutex::new(HashMap::new()),
            last_sweep: Mutex::new(None),
        }
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, Window>> {
        // counters stay usable even if a holder panicked
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Count a request for `key` and decide whether it may proceed
    pub fn check(&self, key: &str) -> RateDecision {
        let now = self.clock.now();
        let mut entries = self.entries();

        let window = entries.entry(key.to_string()).or_insert(Window {
            started_at: now,
            count: 0,
        });

        if now - window.started_at >= self.window {
            *window = Window {
                started_at: now,
                count: 0,
            };
        }

        if window.count >= self.max_requests {
            let retry_after = (window.started_at + self.window - now).num_seconds().max(1);
            return RateDecision::Limited {
                retry_after_secs: retry_after,
            };
        }

        window.count += 1;
        RateDecision::Allowed {
            remaining: self.max_requests - window.count,
        }
    }

    /// Drop every window that has expired; returns how many were removed
    pub fn sweep(&self) -> usize {
        let now = self.clock.now();
        *self.last_sweep.lock().unwrap_or_else(|e| e.into_inner()) = Some(now);
        let mut entries = self.entries();
        let before = entries.len();

        entries.retain(|_, w| now - w.started_at < self.window);

        let removed = before - entries.len();
        if removed > 0 {
            tracing::debug!("Swept {} expired rate-limit windows", removed);
        }
        removed
    }

    /// Sweep once the store tracks at least `threshold` clients, at most once
    /// per window
    ///
    /// No window can expire sooner than one window length after the previous
    /// sweep, so a store full of active clients is not rescanned per call.
    pub fn sweep_if_due(&self, threshold: usize) -> usize {
        if self.len() < threshold {
            return 0;
        }

        let now = self.clock.now();
        let last = *self.last_sweep.lock().unwrap_or_else(|e| e.into_inner());
        if last.is_some_and(|at| now - at < self.window) {
            return 0;
        }

        self.sweep()
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }
}
