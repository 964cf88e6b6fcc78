use std::env;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub horizon_days: u32,
    pub admin_token: String,
    pub lock_wait_ms: u64,
    pub lock_jitter_min_ms: u64,
    pub lock_jitter_max_ms: u64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let mut lock_jitter_min_ms = env::var("LOCK_JITTER_MIN_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(5);
        let mut lock_jitter_max_ms = env::var("LOCK_JITTER_MAX_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(50);
        // An inverted range would panic at the backoff sampling site.
        if lock_jitter_min_ms > lock_jitter_max_ms {
            warn!(
                lock_jitter_min_ms,
                lock_jitter_max_ms, "inverted lock jitter bounds, using defaults"
            );
            lock_jitter_min_ms = 5;
            lock_jitter_max_ms = 50;
        }

        let config = Self {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            horizon_days: env::var("HORIZON_DAYS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
            admin_token: env::var("ADMIN_TOKEN").unwrap_or_else(|_| {
                warn!("ADMIN_TOKEN not set, using empty value");
                String::new()
            }),
            lock_wait_ms: env::var("LOCK_WAIT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(2000),
            lock_jitter_min_ms,
            lock_jitter_max_ms,
        };

        if !config.is_configured() {
            warn!("Application not fully configured - admin routes will reject every request");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.admin_token.is_empty()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            horizon_days: 30,
            admin_token: String::new(),
            lock_wait_ms: 2000,
            lock_jitter_min_ms: 5,
            lock_jitter_max_ms: 50,
        }
    }
}
