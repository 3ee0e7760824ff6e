//! Configuration management for the Weight Progress backend
//!
//! Configuration is loaded hierarchically:
//! 1. Default values (in code)
//! 2. TOML config files (config/development.toml or config/production.toml)
//! 3. Environment variables (prefix: WP__)

use anyhow::Result;
use secrecy::SecretString;
use serde::Deserialize;
use std::env;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub mode: Mode,
    pub server: ServerConfig,
    pub fetch: FetchConfig,
    pub mfp: MfpConfig,
    #[serde(default)]
    pub profiles: Vec<ProfileConfig>,
}

/// Run mode: print once to stdout, or serve over HTTP with a periodic
/// background refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Cli,
    Server,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Background refresh configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FetchConfig {
    pub interval_secs: u64,
}

/// Upstream MyFitnessPal endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct MfpConfig {
    pub base_url: String,
    pub api_url: String,
}

/// One tracked profile and its upstream credentials
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileConfig {
    pub name: String,
    pub username: String,
    pub password: SecretString,
}

impl AppConfig {
    /// Load configuration from files and environment
    ///
    /// Loading order (later sources override earlier):
    /// 1. Default values
    /// 2. Config file based on RUST_ENV (development.toml or production.toml)
    /// 3. Environment variables with WP__ prefix
    pub fn load() -> Result<Self> {
        let env = env::var("RUST_ENV").unwrap_or_else(|_| "development".to_string());
        let config_file = format!("config/{}.toml", env);

        let config = config::Config::builder()
            // Start with defaults
            .set_default("mode", "cli")?
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 5678)?
            .set_default("fetch.interval_secs", 6 * 60 * 60)?
            .set_default("mfp.base_url", "https://www.myfitnesspal.com")?
            .set_default("mfp.api_url", "https://api.myfitnesspal.com")?
            // Load from environment-specific config file
            .add_source(config::File::with_name(&config_file).required(false))
            // Override with environment variables (WP__ prefix)
            // e.g., WP__SERVER__PORT=9000 sets server.port
            .add_source(config::Environment::with_prefix("WP").separator("__"))
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// Reject configurations the process cannot meaningfully run with
    pub fn validate(&self) -> Result<()> {
        if self.profiles.is_empty() {
            anyhow::bail!("no profiles configured; add at least one [[profiles]] entry");
        }

        let mut seen = std::collections::HashSet::new();
        for profile in &self.profiles {
            if !seen.insert(profile.name.as_str()) {
                anyhow::bail!("duplicate profile name: {}", profile.name);
            }
        }

        Ok(())
    }

    /// Check if running in production mode
    pub fn is_production() -> bool {
        env::var("RUST_ENV")
            .map(|v| v == "production")
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> AppConfig {
        AppConfig {
            mode: Mode::Cli,
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 5678,
            },
            fetch: FetchConfig {
                interval_secs: 21600,
            },
            mfp: MfpConfig {
                base_url: "https://www.myfitnesspal.com".to_string(),
                api_url: "https://api.myfitnesspal.com".to_string(),
            },
            profiles: vec![ProfileConfig {
                name: "alice".to_string(),
                username: "alice@example.com".to_string(),
                password: SecretString::new("hunter2".to_string()),
            }],
        }
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::load().expect("defaults should load");
        assert_eq!(config.mode, Mode::Cli);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 5678);
        assert_eq!(config.fetch.interval_secs, 21600);
        assert!(config.profiles.is_empty());
    }

    #[test]
    fn test_validate_requires_profiles() {
        let mut config = base_config();
        config.profiles.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_duplicate_names() {
        let mut config = base_config();
        config.profiles.push(config.profiles[0].clone());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_accepts_distinct_profiles() {
        let mut config = base_config();
        let mut second = config.profiles[0].clone();
        second.name = "bob".to_string();
        config.profiles.push(second);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_is_production() {
        // Default should be false (development)
        assert!(!AppConfig::is_production());
    }
}
