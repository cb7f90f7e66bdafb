use std::{path::Path, time::Duration};

use serde::Deserialize;

use crate::error::BotError;

pub const STRATEGY_ENV: &str = "LORBOT_STRATEGY";
pub const DECISION_TIMEOUT_ENV: &str = "LORBOT_DECISION_TIMEOUT_MS";

const DEFAULT_STRATEGY: &str = "Generic";
const DEFAULT_DECISION_TIMEOUT_MS: u64 = 2000;

/// Settings as they appear in a YAML config file. Every key is optional.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BotConfigFile {
    pub strategy: Option<String>,
    pub decision_timeout_ms: Option<u64>,
}

impl BotConfigFile {
    pub fn from_yaml_file(path: &Path) -> Result<Self, BotError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    pub fn from_yaml_str(contents: &str) -> Result<Self, BotError> {
        Ok(serde_yaml::from_str(contents)?)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotConfig {
    pub strategy: String,
    pub decision_timeout: Duration,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            strategy: DEFAULT_STRATEGY.to_string(),
            decision_timeout: Duration::from_millis(DEFAULT_DECISION_TIMEOUT_MS),
        }
    }
}

impl BotConfig {
    pub fn from_cli_or_env_or_yaml(
        cli_strategy: Option<String>,
        cli_timeout_ms: Option<u64>,
        yaml_config: Option<BotConfigFile>,
    ) -> Result<Self, BotError> {
        Self::resolve(
            cli_strategy,
            cli_timeout_ms,
            std::env::var(STRATEGY_ENV).ok(),
            std::env::var(DECISION_TIMEOUT_ENV).ok(),
            yaml_config.unwrap_or_default(),
        )
    }

    fn resolve(
        cli_strategy: Option<String>,
        cli_timeout_ms: Option<u64>,
        env_strategy: Option<String>,
        env_timeout_ms: Option<String>,
        yaml: BotConfigFile,
    ) -> Result<Self, BotError> {
        let strategy = if let Some(arg) = cli_strategy {
            arg
        } else if let Some(env) = env_strategy {
            env
        } else if let Some(yaml) = yaml.strategy {
            yaml
        } else {
            DEFAULT_STRATEGY.to_string()
        };

        let timeout_ms = if let Some(arg) = cli_timeout_ms {
            arg
        } else if let Some(env) = env_timeout_ms {
            env.trim().parse().map_err(|e| {
                BotError::Config(format!("{DECISION_TIMEOUT_ENV}={env:?} is not a number: {e}"))
            })?
        } else if let Some(yaml) = yaml.decision_timeout_ms {
            yaml
        } else {
            DEFAULT_DECISION_TIMEOUT_MS
        };

        if strategy.trim().is_empty() {
            return Err(BotError::Config("strategy id is empty".to_string()));
        }
        if timeout_ms == 0 {
            return Err(BotError::Config(
                "decision timeout must be at least 1ms".to_string(),
            ));
        }

        Ok(Self {
            strategy,
            decision_timeout: Duration::from_millis(timeout_ms),
        })
    }
}
