use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::CoachError;
use crate::prompts::ModuleKind;
use crate::util::SecretString;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Provider {
    #[serde(rename = "gemini")]
    Gemini,
    #[serde(rename = "openai-compatible")]
    OpenAICompatible,
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provider::Gemini => write!(f, "gemini"),
            Provider::OpenAICompatible => write!(f, "openai-compatible"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    pub provider: Provider,
    pub model: String,
    /// Name of the environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    /// Override the provider's endpoint (proxies, local gateways, tests)
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Models tried in order when the service does not know `model`
    #[serde(default)]
    pub fallback_models: Vec<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: Provider::Gemini,
            model: "gemini-1.5-flash".to_string(),
            api_key_env: default_api_key_env(),
            base_url: None,
            timeout_secs: default_timeout_secs(),
            fallback_models: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Extra attempts after a failed generation call
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,

    /// Where `.md` exports go when no directory is given on the command line
    #[serde(default)]
    pub output_dir: Option<PathBuf>,

    #[serde(default)]
    pub temperatures: TemperatureOverrides,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            output_dir: None,
            temperatures: TemperatureOverrides::default(),
        }
    }
}

/// Optional per-module temperature overrides. Unset modules keep their
/// built-in value.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct TemperatureOverrides {
    #[serde(default)]
    pub training: Option<f32>,
    #[serde(default)]
    pub nutrition: Option<f32>,
    #[serde(default)]
    pub tactical: Option<f32>,
}

impl TemperatureOverrides {
    pub fn for_module(&self, module: ModuleKind) -> Option<f32> {
        match module {
            ModuleKind::Training => self.training,
            ModuleKind::Nutrition => self.nutrition,
            ModuleKind::Tactical => self.tactical,
        }
    }
}

fn default_api_key_env() -> String {
    "GEMINI_API_KEY".to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_max_retries() -> usize {
    1
}

impl Config {
    /// Load configuration from a specific path, or use default search paths
    pub fn load_with_path(path: Option<&Path>) -> Result<Self> {
        if let Some(config_path) = path {
            debug!("Loading config from explicit path: {}", config_path.display());
            return Self::load_from_path(config_path);
        }

        // Per-directory config first
        if let Ok(config) = Self::load_from_path("coachbot.toml") {
            debug!("Loaded config from ./coachbot.toml");
            return Ok(config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let config_path = config_dir.join("coachbot").join("config.toml");
            if let Ok(config) = Self::load_from_path(&config_path) {
                debug!("Loaded config from {:?}", config_path);
                return Ok(config);
            }
        }

        debug!("Using default config");
        Ok(Self::default())
    }

    fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    /// Read the API key named by `llm.api_key_env`.
    ///
    /// A missing or blank key is a configuration error: the caller must not
    /// build a generation client without one.
    pub fn api_key(&self) -> std::result::Result<SecretString, CoachError> {
        let var = &self.llm.api_key_env;
        let key = env::var(var).map(SecretString::from).map_err(|_| {
            CoachError::Configuration(format!(
                "API key not found in environment variable: {}",
                var
            ))
        })?;
        if key.is_blank() {
            return Err(CoachError::Configuration(format!(
                "API key in environment variable {} is empty",
                var
            )));
        }
        Ok(key)
    }
}
