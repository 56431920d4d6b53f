use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Sliding-window request limiter keyed by caller identity
///
/// Each key holds the timestamps of its admitted requests inside the
/// trailing window. Entries are pruned on every access, so the window
/// slides continuously instead of resetting on bucket boundaries.
///
/// The key map is bounded: keys idle past `idle_ttl` are dropped during
/// opportunistic sweeps piggybacked on admission checks, no background
/// thread involved.
pub struct RateLimiter {
    inner: Mutex<LimiterState>,
    idle_ttl: Duration,
    sweep_interval: Duration,
}

struct LimiterState {
    windows: HashMap<String, VecDeque<Instant>>,
    last_sweep: Instant,
}

impl RateLimiter {
    pub fn new(idle_ttl: Duration, sweep_interval: Duration) -> Self {
        Self {
            inner: Mutex::new(LimiterState {
                windows: HashMap::new(),
                last_sweep: Instant::now(),
            }),
            idle_ttl,
            sweep_interval,
        }
    }

    /// Admission check: prune the key's window, admit and record the request
    /// when fewer than `max_requests` admitted timestamps remain, deny
    /// otherwise. Denials are not recorded.
    pub fn allow(&self, key: &str, max_requests: usize, window: Duration) -> bool {
        self.allow_at(key, max_requests, window, Instant::now())
    }

    /// Admission check against an explicit clock reading. `allow` delegates
    /// here; tests drive the window without sleeping.
    pub fn allow_at(&self, key: &str, max_requests: usize, window: Duration, now: Instant) -> bool {
        let mut state = self.inner.lock().expect("rate limiter lock poisoned");

        if now.duration_since(state.last_sweep) >= self.sweep_interval {
            let idle_ttl = self.idle_ttl;
            state
                .windows
                .retain(|_, timestamps| match timestamps.back() {
                    Some(last) => now.duration_since(*last) < idle_ttl,
                    None => false,
                });
            state.last_sweep = now;
        }

        let timestamps = state.windows.entry(key.to_string()).or_default();

        while let Some(oldest) = timestamps.front() {
            if now.duration_since(*oldest) >= window {
                timestamps.pop_front();
            } else {
                break;
            }
        }

        if timestamps.len() < max_requests {
            timestamps.push_back(now);
            true
        } else {
            false
        }
    }

    /// Number of keys currently tracked.
    pub fn key_count(&self) -> usize {
        self.inner
            .lock()
            .expect("rate limiter lock poisoned")
            .windows
            .len()
    }
}
