use shared_config::AppConfig;

pub struct TestConfig {
    pub admin_token: String,
    pub horizon_days: u32,
    pub lock_wait_ms: u64,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            admin_token: "test-admin-token".to_string(),
            horizon_days: 30,
            lock_wait_ms: 500,
        }
    }
}

impl TestConfig {
    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            port: 0,
            horizon_days: self.horizon_days,
            admin_token: self.admin_token.clone(),
            lock_wait_ms: self.lock_wait_ms,
            lock_jitter_min_ms: 1,
            lock_jitter_max_ms: 5,
        }
    }
}
