//! Configuration loading and schema.
//!
//! TOML file at `~/.config/attendance-bot/config.toml` (or a path given
//! with `--config`), with environment overrides for the bot token.

use crate::attendance::{Component, WeightPolicy, DEFAULT_PASS_THRESHOLD};
use crate::conversation::AttendancePolicy;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Telegram transport. Absent means the CLI channel is used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub telegram: Option<TelegramConfig>,

    #[serde(default)]
    pub attendance: AttendanceConfig,

    #[serde(default)]
    pub observability: ObservabilityConfig,
}

/// Telegram channel configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Bot API token. Overridable via `ATTENDANCE_BOT_TOKEN`.
    #[serde(default)]
    pub bot_token: String,

    /// Telegram @usernames or numeric user ids; `"*"` allows everyone.
    #[serde(default)]
    pub allowed_users: Vec<String>,
}

/// Aggregation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceConfig {
    /// Use the arithmetic mean instead of per-component weights.
    #[serde(default)]
    pub equal_weight: bool,

    /// Per-component weights, keyed by component label. Missing entries
    /// fall back to the built-in weights.
    #[serde(default)]
    pub weights: HashMap<String, f64>,

    /// Pass/fail threshold in percent. Fixed at startup.
    #[serde(default = "default_pass_threshold")]
    pub pass_threshold: f64,
}

impl Default for AttendanceConfig {
    fn default() -> Self {
        Self {
            equal_weight: false,
            weights: HashMap::new(),
            pass_threshold: default_pass_threshold(),
        }
    }
}

impl AttendanceConfig {
    /// Resolve the configured policy. Unknown component labels in the
    /// weights table are logged and skipped.
    pub fn policy(&self) -> AttendancePolicy {
        let weights = if self.equal_weight {
            WeightPolicy::Equal
        } else {
            let mut table: HashMap<Component, f64> = Component::ALL
                .iter()
                .map(|c| (*c, c.default_weight()))
                .collect();

            for (label, weight) in &self.weights {
                match Component::parse(label) {
                    Some(component) => {
                        table.insert(component, *weight);
                    }
                    None => {
                        tracing::warn!("Unknown component '{label}' in weights table, skipping");
                    }
                }
            }
            WeightPolicy::Weighted(table)
        };

        AttendancePolicy {
            weights,
            pass_threshold: self.pass_threshold,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log format (json, pretty)
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_pass_threshold() -> f64 {
    DEFAULT_PASS_THRESHOLD
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

/// Default config file location.
fn config_path() -> PathBuf {
    directories::ProjectDirs::from("", "", "attendance-bot")
        .map(|dirs| dirs.config_dir().join("config.toml"))
        .unwrap_or_else(|| PathBuf::from("config.toml"))
}

impl Config {
    /// Load configuration from the default path, falling back to defaults
    /// when no file exists.
    pub fn load() -> Result<Self> {
        let path = config_path();
        if !path.exists() {
            tracing::info!("Config file not found, using defaults");
            let mut config = Self::default();
            config.apply_env_overrides();
            return Ok(config);
        }
        Self::load_from(&path)
    }

    /// Load configuration from a specific path. `~` is expanded.
    pub fn load_from_str_path(path: &str) -> Result<Self> {
        let expanded = shellexpand::tilde(path);
        Self::load_from(&PathBuf::from(expanded.as_ref()))
    }

    pub fn load_from(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        let mut config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides to the configuration.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(token) = std::env::var("ATTENDANCE_BOT_TOKEN") {
            let tg = self.telegram.get_or_insert(TelegramConfig {
                enabled: true,
                bot_token: String::new(),
                allowed_users: vec![],
            });
            tg.bot_token = token;
        }
    }
}
