// src/config.rs

use dotenvy::dotenv;
use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub api_base_url: String,
    pub submit_path: String,
    pub preferences_path: String,
    pub reenable_delay_ms: u64,
    pub request_timeout_secs: u64,
    pub rust_log: String,
    pub log_dir: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "http://127.0.0.1:5000".to_string(),
            submit_path: "/api/generate-schedule".to_string(),
            preferences_path: "/api/get-user-preferences".to_string(),
            reenable_delay_ms: 2000,
            request_timeout_secs: 60,
            rust_log: "info".to_string(),
            log_dir: "logs".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let defaults = Self::default();

        let api_base_url = env::var("API_BASE_URL").unwrap_or(defaults.api_base_url);

        let submit_path = env::var("SUBMIT_PATH").unwrap_or(defaults.submit_path);

        let preferences_path = env::var("PREFERENCES_PATH").unwrap_or(defaults.preferences_path);

        let reenable_delay_ms = env::var("REENABLE_DELAY_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.reenable_delay_ms);

        let request_timeout_secs = env::var("REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.request_timeout_secs);

        let rust_log = env::var("RUST_LOG").unwrap_or(defaults.rust_log);

        let log_dir = env::var("LOG_DIR").unwrap_or(defaults.log_dir);

        Self {
            api_base_url,
            submit_path,
            preferences_path,
            reenable_delay_ms,
            request_timeout_secs,
            rust_log,
            log_dir,
        }
    }

    pub fn reenable_delay(&self) -> Duration {
        Duration::from_millis(self.reenable_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
