use std::env;
use std::time::Duration;

use crate::services::ledger_service::DEFAULT_LEDGER_KEY;

#[derive(Clone, Debug)]
pub struct Config {
    pub catalog_url: String,
    pub port: u16,
    pub store_dir: String,
    pub ledger_key: String,
    pub reminder_interval: Duration,
    pub remote_timeout: Duration,
    pub cors_allowed_origins: Vec<String>,
    pub static_dir: Option<String>,
    pub profile: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any variable source, `from_env` passes the process environment
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let profile = lookup("PROFILE").unwrap_or_else(|| "default".to_string());

        let store_dir = lookup("STORE_DIR").unwrap_or_else(|| {
            if profile == "default" {
                ".bibliodesk".to_string()
            } else {
                format!(".bibliodesk_{}", profile)
            }
        });

        let secs = |key: &str, default: u64| {
            lookup(key)
                .and_then(|v| v.parse::<u64>().ok())
                .filter(|v| *v > 0)
                .map(Duration::from_secs)
                .unwrap_or(Duration::from_secs(default))
        };

        Self {
            catalog_url: lookup("CATALOG_URL")
                .unwrap_or_else(|| "http://localhost:3000".to_string()),
            port: lookup("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(8000),
            store_dir,
            ledger_key: lookup("LEDGER_KEY").unwrap_or_else(|| DEFAULT_LEDGER_KEY.to_string()),
            reminder_interval: secs("REMINDER_INTERVAL_SECS", 60),
            remote_timeout: secs("REMOTE_TIMEOUT_SECS", 5),
            cors_allowed_origins: lookup("CORS_ALLOWED_ORIGINS")
                .map(|s| {
                    s.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_else(Vec::new),
            static_dir: lookup("STATIC_DIR").filter(|s| !s.is_empty()),
            profile,
        }
    }
}
