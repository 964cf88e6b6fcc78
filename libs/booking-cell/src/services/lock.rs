// libs/booking-cell/src/services/lock.rs
use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use rand::Rng;
use tokio::time::{sleep, Instant};
use tracing::{debug, warn};

use shared_config::AppConfig;

use crate::models::BookingError;

#[derive(Debug, Clone, Copy)]
pub struct LockPolicy {
    pub wait_ms: u64,
    pub jitter_min_ms: u64,
    pub jitter_max_ms: u64,
}

impl From<&AppConfig> for LockPolicy {
    fn from(config: &AppConfig) -> Self {
        Self {
            wait_ms: config.lock_wait_ms,
            jitter_min_ms: config.lock_jitter_min_ms,
            jitter_max_ms: config.lock_jitter_max_ms,
        }
    }
}

/// Named mutual-exclusion tokens. Acquisition is attempt-and-retry with
/// randomized backoff and a bounded wait budget; a caller that exhausts the
/// budget gets `Busy` instead of waiting forever.
#[derive(Debug)]
pub struct LockTable {
    held: Mutex<HashSet<String>>,
    policy: LockPolicy,
}

impl LockTable {
    pub fn new(policy: LockPolicy) -> Self {
        Self {
            held: Mutex::new(HashSet::new()),
            policy,
        }
    }

    /// Acquire `token`, returning a guard that releases it on drop — on every
    /// exit path, including panics and early returns.
    pub async fn acquire(&self, token: &str) -> Result<LockGuard<'_>, BookingError> {
        let deadline = Instant::now() + Duration::from_millis(self.policy.wait_ms);

        loop {
            if self.held_set().insert(token.to_string()) {
                debug!(token, "lock acquired");
                return Ok(LockGuard {
                    table: self,
                    token: token.to_string(),
                });
            }

            if Instant::now() >= deadline {
                warn!(token, "lock wait budget exhausted");
                return Err(BookingError::Busy);
            }

            let jitter = rand::thread_rng()
                .gen_range(self.policy.jitter_min_ms..=self.policy.jitter_max_ms);
            sleep(Duration::from_millis(jitter)).await;
        }
    }

    fn held_set(&self) -> MutexGuard<'_, HashSet<String>> {
        self.held.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[derive(Debug)]
pub struct LockGuard<'a> {
    table: &'a LockTable,
    token: String,
}

impl Drop for LockGuard<'_> {
    fn drop(&mut self) {
        self.table.held_set().remove(&self.token);
        debug!(token = %self.token, "lock released");
    }
}
