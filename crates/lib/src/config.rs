//! Configuration types and loading.
//!
//! Config is loaded from a JSON file (e.g. `~/.timewatcher/config.json`) and environment.
//! The launcher environment variables (BOT_API_KEY, BOT_NAME, ENVIRONMENT) override file values.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default bot display name when neither config nor BOT_NAME is set.
pub const DEFAULT_BOT_NAME: &str = "time-watcher-bot";

fn default_bot_name() -> String {
    DEFAULT_BOT_NAME.to_string()
}

fn default_prod_base_url() -> String {
    "https://banco-de-horas.herokuapp.com/api/saldo".to_string()
}

fn default_dev_base_url() -> String {
    "http://127.0.0.1:3000/saldo".to_string()
}

/// Top-level application config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Bot identity and environment.
    #[serde(default)]
    pub bot: BotConfig,

    /// Balance service endpoints.
    #[serde(default)]
    pub balance: BalanceServiceConfig,
}

/// Bot identity: token, display name, environment selector.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BotConfig {
    /// Slack API token. Overridden by BOT_API_KEY env when set.
    pub api_token: Option<String>,

    /// Bot display name, used both to resolve the bot's own user id from the
    /// roster and as a mention keyword. Overridden by BOT_NAME env when set.
    #[serde(default = "default_bot_name")]
    pub name: String,

    /// Selects the balance service endpoint and response shape. Overridden by
    /// ENVIRONMENT env when set; any value other than "prod" means dev.
    #[serde(default)]
    pub environment: Environment,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            api_token: None,
            name: default_bot_name(),
            environment: Environment::default(),
        }
    }
}

/// Deployment environment for the balance service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Dev fixture service: id as query parameter, array-wrapped response.
    #[default]
    Dev,

    /// Production service: id as path segment, single-object response.
    Prod,
}

/// Balance service base URLs per environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceServiceConfig {
    #[serde(default = "default_prod_base_url")]
    pub prod_base_url: String,

    #[serde(default = "default_dev_base_url")]
    pub dev_base_url: String,
}

impl Default for BalanceServiceConfig {
    fn default() -> Self {
        Self {
            prod_base_url: default_prod_base_url(),
            dev_base_url: default_dev_base_url(),
        }
    }
}

/// Resolve the Slack API token: env BOT_API_KEY overrides config.
pub fn resolve_api_token(config: &Config) -> Option<String> {
    std::env::var("BOT_API_KEY")
        .ok()
        .and_then(|s| {
            let t = s.trim();
            if t.is_empty() {
                None
            } else {
                Some(t.to_string())
            }
        })
        .or_else(|| {
            config
                .bot
                .api_token
                .as_ref()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        })
}

/// Resolve the bot display name: env BOT_NAME overrides config.
pub fn resolve_bot_name(config: &Config) -> String {
    std::env::var("BOT_NAME")
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| config.bot.name.clone())
}

/// Resolve the environment: env ENVIRONMENT overrides config.
pub fn resolve_environment(config: &Config) -> Environment {
    match std::env::var("ENVIRONMENT") {
        Ok(s) if !s.trim().is_empty() => parse_environment(&s),
        _ => config.bot.environment,
    }
}

/// Parse an environment selector string; anything other than "prod" means Dev.
pub fn parse_environment(s: &str) -> Environment {
    if s.trim().eq_ignore_ascii_case("prod") {
        Environment::Prod
    } else {
        Environment::Dev
    }
}

/// Resolve config path from env or default.
pub fn default_config_path() -> PathBuf {
    std::env::var("TIMEWATCHER_CONFIG_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::home_dir()
                .map(|h| h.join(".timewatcher").join("config.json"))
                .unwrap_or_else(|| PathBuf::from("config.json"))
        })
}

/// Load config from the default path (or TIMEWATCHER_CONFIG_PATH). Missing file => default config.
/// Returns the config and the path that was used.
pub fn load_config(path: Option<PathBuf>) -> Result<(Config, PathBuf)> {
    let path = path.unwrap_or_else(default_config_path);
    let config = if !path.exists() {
        log::debug!("config file not found, using defaults: {}", path.display());
        Config::default()
    } else {
        let s = std::fs::read_to_string(&path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        serde_json::from_str(&s)
            .with_context(|| format!("parsing config from {}", path.display()))?
    };
    Ok((config, path))
}

/// Create the config directory and a default config file if they do not exist.
pub fn init_config_dir(config_path: &Path) -> Result<PathBuf> {
    let config_dir = config_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(config_dir)
        .with_context(|| format!("creating config directory {}", config_dir.display()))?;

    if !config_path.exists() {
        let default_config = serde_json::to_string_pretty(&Config::default())
            .context("serializing default config")?;
        std::fs::write(config_path, default_config)
            .with_context(|| format!("writing default config to {}", config_path.display()))?;
        log::info!("created default config at {}", config_path.display());
    }

    Ok(config_dir.to_path_buf())
}
