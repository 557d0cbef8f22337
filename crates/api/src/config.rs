use std::time::Duration;

use avatarcast_vendor::{HeyGenConfig, LiveAvatarConfig};

use crate::sessions::SessionSettings;

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development. Vendor API keys
/// default to empty strings; calls then fail at the vendor, not at startup.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `60`).
    pub request_timeout_secs: u64,
    /// Timeout applied to each outbound vendor call (default: `30`).
    pub vendor_timeout_secs: u64,
    /// Maximum accepted upload body in bytes (default: 100 MiB).
    pub upload_max_bytes: usize,
    /// Character ids exposed by `/api/heygen/avatars`; empty means all.
    pub character_allowlist: Vec<String>,
    pub heygen: HeyGenConfig,
    pub liveavatar: LiveAvatarConfig,
    pub sessions: SessionSettings,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                       | Default                                |
    /// |-------------------------------|----------------------------------------|
    /// | `HOST`                        | `0.0.0.0`                              |
    /// | `PORT`                        | `3000`                                 |
    /// | `CORS_ORIGINS`                | `http://localhost:3000`                |
    /// | `REQUEST_TIMEOUT_SECS`        | `60`                                   |
    /// | `VENDOR_TIMEOUT_SECS`         | `30`                                   |
    /// | `UPLOAD_MAX_BYTES`            | `104857600`                            |
    /// | `CHARACTER_ALLOWLIST`         | (empty)                                |
    /// | `HEYGEN_BASE_URL`             | `https://api.heygen.com`               |
    /// | `HEYGEN_UPLOAD_URL`           | `https://upload.heygen.com`            |
    /// | `HEYGEN_API_KEY`              | (empty)                                |
    /// | `LIVEAVATAR_API_URL`          | `https://api.liveavatar.com`           |
    /// | `LIVEAVATAR_API_KEY`          | (empty)                                |
    /// | `LIVEAVATAR_DEFAULT_VOICE_ID` | `c2527536-6d1f-4412-a643-53a3497dada9` |
    /// | `LIVEAVATAR_LANGUAGE`         | `ja`                                   |
    /// | `SESSION_STOP_SETTLE_MS`      | `2000`                                 |
    /// | `SESSION_REPLACE_SETTLE_MS`   | `1000`                                 |
    ///
    /// Panics on malformed numeric values.
    pub fn from_env() -> Self {
        let host = env_or("HOST", "0.0.0.0");
        let port: u16 = env_parse("PORT", "3000");
        let cors_origins = env_list("CORS_ORIGINS", "http://localhost:3000");
        let request_timeout_secs: u64 = env_parse("REQUEST_TIMEOUT_SECS", "60");
        let vendor_timeout_secs: u64 = env_parse("VENDOR_TIMEOUT_SECS", "30");
        let upload_max_bytes: usize = env_parse("UPLOAD_MAX_BYTES", "104857600");
        let character_allowlist = env_list("CHARACTER_ALLOWLIST", "");

        let heygen = HeyGenConfig {
            base_url: trim_slash(env_or("HEYGEN_BASE_URL", "https://api.heygen.com")),
            upload_url: trim_slash(env_or("HEYGEN_UPLOAD_URL", "https://upload.heygen.com")),
            api_key: env_or("HEYGEN_API_KEY", ""),
        };

        let liveavatar = LiveAvatarConfig {
            base_url: trim_slash(env_or("LIVEAVATAR_API_URL", "https://api.liveavatar.com")),
            api_key: env_or("LIVEAVATAR_API_KEY", ""),
        };

        let sessions = SessionSettings {
            default_voice_id: env_or(
                "LIVEAVATAR_DEFAULT_VOICE_ID",
                "c2527536-6d1f-4412-a643-53a3497dada9",
            ),
            language: env_or("LIVEAVATAR_LANGUAGE", "ja"),
            stop_settle: Duration::from_millis(env_parse("SESSION_STOP_SETTLE_MS", "2000")),
            replace_settle: Duration::from_millis(env_parse("SESSION_REPLACE_SETTLE_MS", "1000")),
        };

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            vendor_timeout_secs,
            upload_max_bytes,
            character_allowlist,
            heygen,
            liveavatar,
            sessions,
        }
    }

    /// Names of vendor credentials that are unset.
    pub fn missing_credentials(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.heygen.api_key.is_empty() {
            missing.push("HEYGEN_API_KEY");
        }
        if self.liveavatar.api_key.is_empty() {
            missing.push("LIVEAVATAR_API_KEY");
        }
        missing
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.into())
}

fn env_parse<T>(key: &str, default: &str) -> T
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    env_or(key, default)
        .parse()
        .unwrap_or_else(|e| panic!("{key} must be a valid number: {e}"))
}

fn env_list(key: &str, default: &str) -> Vec<String> {
    env_or(key, default)
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn trim_slash(url: String) -> String {
    url.trim_end_matches('/').to_string()
}
