//! Configuration loading.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::FixedOffset;
use serde::{Deserialize, Serialize};

use crate::instrument::Instrument;
use crate::model::RewardCatalog;
use crate::parser;

/// Top-level brightsteps configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrightstepsConfig {
    /// Instrument TOML to use instead of the built-in M-CHAT-R table.
    #[serde(default)]
    pub instrument: Option<PathBuf>,
    /// Reward catalog TOML to use instead of the standard catalog.
    #[serde(default)]
    pub rewards: Option<PathBuf>,
    /// Badge ledger JSON file.
    #[serde(default)]
    pub ledger: Option<PathBuf>,
    /// Offset from UTC used for window boundaries. Unset means UTC.
    #[serde(default)]
    pub timezone_offset_minutes: Option<i32>,
}

impl BrightstepsConfig {
    /// The configured instrument, or the built-in M-CHAT-R table.
    pub fn load_instrument(&self) -> Result<Instrument> {
        match &self.instrument {
            Some(path) => parser::parse_instrument(path),
            None => Ok(Instrument::mchat_r()),
        }
    }

    /// The configured reward catalog, or the standard one.
    pub fn load_rewards(&self) -> Result<RewardCatalog> {
        match &self.rewards {
            Some(path) => parser::parse_rewards(path),
            None => Ok(RewardCatalog::standard()),
        }
    }

    /// Time zone used to place window boundaries.
    pub fn timezone(&self) -> Result<FixedOffset> {
        let minutes = self.timezone_offset_minutes.unwrap_or(0);
        minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .with_context(|| format!("timezone_offset_minutes out of range: {minutes}"))
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
///
/// Substituted values are inserted as-is and not scanned again.
fn resolve_env_vars(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        let Some(end) = rest[start..].find('}') else {
            break;
        };
        let var_name = &rest[start + 2..start + end];
        result.push_str(&rest[..start]);
        result.push_str(&std::env::var(var_name).unwrap_or_default());
        rest = &rest[start + end + 1..];
    }
    result.push_str(rest);
    result
}

fn resolve_path(path: &Path) -> PathBuf {
    PathBuf::from(resolve_env_vars(&path.to_string_lossy()))
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `brightsteps.toml` in the current directory
/// 2. `~/.config/brightsteps/config.toml`
///
/// Environment variable overrides: `BRIGHTSTEPS_INSTRUMENT`, `BRIGHTSTEPS_REWARDS`.
pub fn load_config() -> Result<BrightstepsConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<BrightstepsConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("brightsteps.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            parse_config_str(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => BrightstepsConfig::default(),
    };

    apply_env_overrides(&mut config);
    Ok(config)
}

fn parse_config_str(content: &str) -> Result<BrightstepsConfig> {
    let mut config: BrightstepsConfig = toml::from_str(content)?;
    config.instrument = config.instrument.as_deref().map(resolve_path);
    config.rewards = config.rewards.as_deref().map(resolve_path);
    config.ledger = config.ledger.as_deref().map(resolve_path);
    Ok(config)
}

fn apply_env_overrides(config: &mut BrightstepsConfig) {
    if let Ok(path) = std::env::var("BRIGHTSTEPS_INSTRUMENT") {
        config.instrument = Some(PathBuf::from(path));
    }
    if let Ok(path) = std::env::var("BRIGHTSTEPS_REWARDS") {
        config.rewards = Some(PathBuf::from(path));
    }
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("brightsteps"))
}
