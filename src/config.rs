use crate::ai::{DEFAULT_API_BASE, DEFAULT_MODEL};
use std::path::PathBuf;
use std::time::Duration;

/// Bundled config for mobile builds (iOS/Android)
const BUNDLED_CONFIG: &str = include_str!("../assets/config.env");

pub const DEFAULT_TEXT_TIMEOUT: Duration = Duration::from_secs(20);
pub const DEFAULT_AUDIO_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} must be a whole number of seconds, got {value:?}")]
    InvalidSeconds { name: &'static str, value: String },
}

/// Runtime settings. The API key is deliberately not one of them: it lives
/// in the secure store.
#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
    pub api_base: String,
    pub model: String,
    pub text_timeout: Duration,
    pub audio_timeout: Duration,
    pub store_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            model: DEFAULT_MODEL.to_string(),
            text_timeout: DEFAULT_TEXT_TIMEOUT,
            audio_timeout: DEFAULT_AUDIO_TIMEOUT,
            store_dir: None,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable source; unset or blank variables keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut config = Self::default();

        if let Some(base) = get("GEMINI_API_BASE") {
            config.api_base = base;
        }
        if let Some(model) = get("GEMINI_MODEL") {
            config.model = model;
        }
        if let Some(raw) = get("GEMINI_TEXT_TIMEOUT_SECS") {
            config.text_timeout = parse_seconds("GEMINI_TEXT_TIMEOUT_SECS", raw)?;
        }
        if let Some(raw) = get("GEMINI_AUDIO_TIMEOUT_SECS") {
            config.audio_timeout = parse_seconds("GEMINI_AUDIO_TIMEOUT_SECS", raw)?;
        }
        config.store_dir = get("GEMINI_CHAT_STORE_DIR").map(PathBuf::from);

        Ok(config)
    }
}

fn parse_seconds(name: &'static str, value: String) -> Result<Duration, ConfigError> {
    match value.parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(ConfigError::InvalidSeconds { name, value }),
    }
}

/// Load `.env` for desktop development, falling back to the bundled config.
#[cfg(not(target_arch = "wasm32"))]
pub fn load_environment() {
    // First try to load from .env file (desktop dev)
    if dotenvy::dotenv().is_ok() {
        return;
    }

    // Fall back to bundled config (mobile builds)
    load_bundled_config();
}

#[cfg(target_arch = "wasm32")]
pub fn load_environment() {
    load_bundled_config();
}

fn load_bundled_config() {
    for (key, value) in parse_env_lines(BUNDLED_CONFIG) {
        // Only set if not already set (allow env override)
        if std::env::var(key).is_err() {
            // SAFETY: called from main before any threads are spawned
            unsafe {
                std::env::set_var(key, value);
            }
        }
    }
}

/// `KEY=VALUE` pairs, skipping comments and blank lines.
fn parse_env_lines(source: &str) -> impl Iterator<Item = (&str, &str)> {
    source.lines().filter_map(|line| {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return None;
        }
        let (key, value) = line.split_once('=')?;
        Some((key.trim(), value.trim()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.text_timeout, Duration::from_secs(20));
        assert_eq!(config.audio_timeout, Duration::from_secs(60));
    }

    #[test]
    fn reads_overrides() {
        let config = AppConfig::from_lookup(lookup(&[
            ("GEMINI_MODEL", "gemini-2.0-pro"),
            ("GEMINI_AUDIO_TIMEOUT_SECS", "45"),
            ("GEMINI_CHAT_STORE_DIR", "/tmp/store"),
            ("GEMINI_API_BASE", "  "),
        ]))
        .unwrap();
        assert_eq!(config.model, "gemini-2.0-pro");
        assert_eq!(config.audio_timeout, Duration::from_secs(45));
        assert_eq!(config.store_dir, Some(PathBuf::from("/tmp/store")));
        assert_eq!(config.api_base, DEFAULT_API_BASE);
    }

    #[test]
    fn rejects_bad_timeouts() {
        for bad in ["soon", "0", "-5"] {
            let err = AppConfig::from_lookup(lookup(&[("GEMINI_TEXT_TIMEOUT_SECS", bad)]));
            assert!(matches!(err, Err(ConfigError::InvalidSeconds { .. })), "{bad}");
        }
    }

    #[test]
    fn parses_env_lines() {
        let pairs: Vec<_> = parse_env_lines("# comment\n\nGEMINI_MODEL = flash \nbroken\n").collect();
        assert_eq!(pairs, vec![("GEMINI_MODEL", "flash")]);
    }

    #[test]
    fn bundled_config_has_no_credentials() {
        assert!(parse_env_lines(BUNDLED_CONFIG).all(|(key, _)| !key.contains("KEY")));
    }
}
