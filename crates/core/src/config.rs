use std::env;

use serde::{Deserialize, Serialize};

use crate::error::RosterError;

/// Default base URL of the query service.
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:5001";

/// Default number of result rows forwarded to the chart path.
pub const DEFAULT_CHART_ROW_LIMIT: usize = 10;

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a profiled env var: tries {PROFILE}_{KEY} first, falls back to {KEY}.
fn profiled_env_opt(profile: &str, key: &str) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = env_opt(&prefixed) {
            return Some(v);
        }
    }
    env_opt(key)
}

fn profiled_env_or(profile: &str, key: &str, default: &str) -> String {
    profiled_env_opt(profile, key).unwrap_or_else(|| default.to_string())
}

fn profiled_env_usize(profile: &str, key: &str, default: usize) -> usize {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Active profile name (empty = default).
    pub profile: String,
    pub api: ApiConfig,
    pub presenter: PresenterConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `ROSTER_PROFILE`. When set (e.g. `PROD`), every
    /// key is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Self {
        let profile = env_or("ROSTER_PROFILE", "").to_uppercase();
        Self::for_profile(&profile)
    }

    /// Build config for a specific named profile (empty string = default).
    pub fn for_profile(profile: &str) -> Self {
        let p = profile.to_uppercase();
        let p = p.as_str();
        Self {
            profile: p.to_string(),
            api: ApiConfig::from_env_profiled(p),
            presenter: PresenterConfig::from_env_profiled(p),
        }
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Reject settings the shell cannot work with.
    pub fn validate(&self) -> Result<(), RosterError> {
        if !(self.api.base_url.starts_with("http://") || self.api.base_url.starts_with("https://")) {
            return Err(RosterError::Config(format!(
                "ROSTER_API_URL must be an http(s) URL, got '{}'",
                self.api.base_url
            )));
        }
        if self.presenter.chart_row_limit == 0 {
            return Err(RosterError::Config(
                "ROSTER_CHART_ROW_LIMIT must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Print a summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!(
            "  api:        url={}, timeout={}",
            self.api.base_url,
            self.api
                .timeout_seconds
                .map(|s| format!("{s}s"))
                .unwrap_or_else(|| "none".to_string())
        );
        tracing::info!("  presenter:  chart_row_limit={}", self.presenter.chart_row_limit);
    }
}

// ── Query service ─────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    /// Client-side request timeout. Unset means requests may wait forever.
    pub timeout_seconds: Option<u64>,
}

impl ApiConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            base_url: profiled_env_or(p, "ROSTER_API_URL", DEFAULT_API_URL),
            timeout_seconds: profiled_env_opt(p, "ROSTER_API_TIMEOUT_SECONDS")
                .and_then(|v| v.parse().ok())
                .filter(|s| *s > 0),
        }
    }
}

// ── Result presentation ───────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresenterConfig {
    pub chart_row_limit: usize,
}

impl PresenterConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            chart_row_limit: profiled_env_usize(p, "ROSTER_CHART_ROW_LIMIT", DEFAULT_CHART_ROW_LIMIT),
        }
    }
}

impl Default for PresenterConfig {
    fn default() -> Self {
        Self { chart_row_limit: DEFAULT_CHART_ROW_LIMIT }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Env-based tests must run serially to avoid interfering with each other.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn clear_env() {
        let keys = [
            "ROSTER_PROFILE",
            "ROSTER_API_URL",
            "ROSTER_API_TIMEOUT_SECONDS",
            "ROSTER_CHART_ROW_LIMIT",
            "TEST_ROSTER_API_URL",
            "TEST_ROSTER_CHART_ROW_LIMIT",
        ];
        for k in keys {
            env::remove_var(k);
        }
    }

    #[test]
    fn defaults_when_no_env_vars() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_env();

        let cfg = Config::for_profile("");
        assert_eq!(cfg.profile_label(), "default");
        assert_eq!(cfg.api.base_url, DEFAULT_API_URL);
        assert_eq!(cfg.api.timeout_seconds, None);
        assert_eq!(cfg.presenter.chart_row_limit, 10);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn profiled_env_takes_precedence() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_env();

        env::set_var("ROSTER_API_URL", "http://base:1");
        env::set_var("TEST_ROSTER_API_URL", "http://test:2");
        env::set_var("ROSTER_CHART_ROW_LIMIT", "25");

        let cfg = Config::for_profile("test");
        assert_eq!(cfg.profile, "TEST");
        assert_eq!(cfg.api.base_url, "http://test:2");
        // Falls back to the unprefixed key.
        assert_eq!(cfg.presenter.chart_row_limit, 25);

        clear_env();
    }

    #[test]
    fn invalid_numbers_fall_back() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_env();

        env::set_var("ROSTER_API_TIMEOUT_SECONDS", "soon");
        env::set_var("ROSTER_CHART_ROW_LIMIT", "-4");

        let cfg = Config::for_profile("");
        assert_eq!(cfg.api.timeout_seconds, None);
        assert_eq!(cfg.presenter.chart_row_limit, DEFAULT_CHART_ROW_LIMIT);

        clear_env();
    }

    #[test]
    fn zero_timeout_means_none() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_env();

        env::set_var("ROSTER_API_TIMEOUT_SECONDS", "0");
        assert_eq!(Config::for_profile("").api.timeout_seconds, None);

        env::set_var("ROSTER_API_TIMEOUT_SECONDS", "15");
        assert_eq!(Config::for_profile("").api.timeout_seconds, Some(15));

        clear_env();
    }

    #[test]
    fn validate_rejects_bad_settings() {
        let mut cfg = Config {
            profile: String::new(),
            api: ApiConfig { base_url: "ftp://nope".into(), timeout_seconds: None },
            presenter: PresenterConfig::default(),
        };
        assert!(matches!(cfg.validate(), Err(RosterError::Config(_))));

        cfg.api.base_url = "https://roster.example".into();
        assert!(cfg.validate().is_ok());

        cfg.presenter.chart_row_limit = 0;
        assert!(cfg.validate().is_err());
    }
}
