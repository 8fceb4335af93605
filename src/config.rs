use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::scoring::FactorWeights;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    pub api_base: String,
    pub model: String,
    pub timeout_ms: u64,
    pub temperature: f64,
    pub max_retries: u32,
    pub retry_base_ms: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            timeout_ms: 30_000,
            temperature: 0.2,
            max_retries: 3,
            retry_base_ms: 500,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FanoutConfig {
    pub max_concurrent_analyses: usize,
}

impl Default for FanoutConfig {
    fn default() -> Self {
        Self {
            max_concurrent_analyses: 4,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegenerationConfig {
    pub cooldown_hours: i64,
}

impl Default for RegenerationConfig {
    fn default() -> Self {
        Self { cooldown_hours: 24 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    pub dir: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            dir: "data".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MatchConfig {
    pub weights: FactorWeights,
    pub llm: LlmConfig,
    pub fanout: FanoutConfig,
    pub regeneration: RegenerationConfig,
    pub data: DataConfig,
}

impl MatchConfig {
    pub fn load(path: Option<PathBuf>) -> Result<(Self, Option<PathBuf>), String> {
        let config_path = path.or_else(default_config_path);
        let mut config = if let Some(path) = config_path.as_ref() {
            if path.exists() {
                let contents = std::fs::read_to_string(path)
                    .map_err(|err| format!("failed to read config: {}", err))?;
                toml::from_str(&contents)
                    .map_err(|err| format!("failed to parse config: {}", err))?
            } else {
                MatchConfig::default()
            }
        } else {
            MatchConfig::default()
        };

        config.apply_env_overrides();
        Ok((config, config_path))
    }

    pub fn write(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|err| format!("failed to create config dir: {}", err))?;
        }
        let payload = toml::to_string_pretty(self)
            .map_err(|err| format!("failed to serialize config: {}", err))?;
        std::fs::write(path, payload).map_err(|err| format!("failed to write config: {}", err))?;
        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(api_base) = env::var("PAIRMATCH_LLM_API_BASE") {
            if !api_base.trim().is_empty() {
                self.llm.api_base = api_base;
            }
        }
        if let Ok(model) = env::var("PAIRMATCH_LLM_MODEL") {
            if !model.trim().is_empty() {
                self.llm.model = model;
            }
        }
        if let Ok(timeout) = env::var("PAIRMATCH_LLM_TIMEOUT_MS") {
            if let Ok(value) = timeout.parse::<u64>() {
                self.llm.timeout_ms = value;
            }
        }
        if let Ok(concurrency) = env::var("PAIRMATCH_FANOUT_CONCURRENCY") {
            if let Ok(value) = concurrency.parse::<usize>() {
                if value > 0 {
                    self.fanout.max_concurrent_analyses = value;
                }
            }
        }
        if let Ok(cooldown) = env::var("PAIRMATCH_REGEN_COOLDOWN_HOURS") {
            if let Ok(value) = cooldown.parse::<i64>() {
                self.regeneration.cooldown_hours = value;
            }
        }
        if let Ok(dir) = env::var("PAIRMATCH_DATA_DIR") {
            if !dir.trim().is_empty() {
                self.data.dir = dir;
            }
        }
    }
}

fn default_config_path() -> Option<PathBuf> {
    env::var("PAIRMATCH_CONFIG_PATH")
        .ok()
        .filter(|value| !value.trim().is_empty())
        .map(PathBuf::from)
        .or_else(|| Some(PathBuf::from("config/pairmatch.toml")))
}
