//! Study configuration and provider factory.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use sciprep_core::error::StudyError;
use sciprep_core::session::SessionSettings;
use sciprep_core::traits::LlmProvider;

use crate::anthropic::AnthropicProvider;
use crate::gemini::GeminiProvider;
use crate::openai::OpenAiProvider;

/// Environment variable that overrides the default provider's key.
pub const API_KEY_ENV: &str = "SCIPREP_API_KEY";
/// Older name for [`API_KEY_ENV`], still honoured.
pub const LEGACY_API_KEY_ENV: &str = "API_KEY";

/// File name looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "sciprep.toml";

/// Configuration for a single LLM provider.
///
/// Note: Custom Debug impl masks API keys to prevent accidental exposure in logs.
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProviderConfig {
    Gemini {
        api_key: String,
        #[serde(default)]
        base_url: Option<String>,
    },
    Anthropic {
        api_key: String,
        #[serde(default)]
        base_url: Option<String>,
    },
    OpenAI {
        api_key: String,
        #[serde(default)]
        base_url: Option<String>,
        #[serde(default)]
        org_id: Option<String>,
    },
}

impl ProviderConfig {
    /// An entry with an empty key for a known provider name.
    pub fn empty_for(name: &str) -> Option<Self> {
        match name {
            "gemini" => Some(Self::Gemini {
                api_key: String::new(),
                base_url: None,
            }),
            "anthropic" => Some(Self::Anthropic {
                api_key: String::new(),
                base_url: None,
            }),
            "openai" => Some(Self::OpenAI {
                api_key: String::new(),
                base_url: None,
                org_id: None,
            }),
            _ => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Gemini { .. } => "gemini",
            Self::Anthropic { .. } => "anthropic",
            Self::OpenAI { .. } => "openai",
        }
    }

    pub fn api_key(&self) -> &str {
        match self {
            Self::Gemini { api_key, .. }
            | Self::Anthropic { api_key, .. }
            | Self::OpenAI { api_key, .. } => api_key,
        }
    }

    fn api_key_mut(&mut self) -> &mut String {
        match self {
            Self::Gemini { api_key, .. }
            | Self::Anthropic { api_key, .. }
            | Self::OpenAI { api_key, .. } => api_key,
        }
    }

    fn resolved(&self) -> Self {
        match self {
            Self::Gemini { api_key, base_url } => Self::Gemini {
                api_key: resolve_env_vars(api_key),
                base_url: base_url.as_deref().map(resolve_env_vars),
            },
            Self::Anthropic { api_key, base_url } => Self::Anthropic {
                api_key: resolve_env_vars(api_key),
                base_url: base_url.as_deref().map(resolve_env_vars),
            },
            Self::OpenAI {
                api_key,
                base_url,
                org_id,
            } => Self::OpenAI {
                api_key: resolve_env_vars(api_key),
                base_url: base_url.as_deref().map(resolve_env_vars),
                org_id: org_id.as_deref().map(resolve_env_vars),
            },
        }
    }
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderConfig::Gemini {
                api_key: _,
                base_url,
            } => f
                .debug_struct("Gemini")
                .field("api_key", &"***")
                .field("base_url", base_url)
                .finish(),
            ProviderConfig::Anthropic {
                api_key: _,
                base_url,
            } => f
                .debug_struct("Anthropic")
                .field("api_key", &"***")
                .field("base_url", base_url)
                .finish(),
            ProviderConfig::OpenAI {
                api_key: _,
                base_url,
                org_id,
            } => f
                .debug_struct("OpenAI")
                .field("api_key", &"***")
                .field("base_url", base_url)
                .field("org_id", org_id)
                .finish(),
        }
    }
}

/// Top-level sciprep configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudyConfig {
    /// Provider configurations keyed by name.
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
    /// Provider used for generation and analysis.
    #[serde(default = "default_provider")]
    pub default_provider: String,
    /// Model passed to the provider.
    #[serde(default = "default_model")]
    pub default_model: String,
    /// Sampling temperature for question generation.
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    /// Questions requested per session.
    #[serde(default = "default_questions")]
    pub questions_per_session: usize,
    #[serde(default = "default_generation_timeout")]
    pub generation_timeout_secs: u64,
    #[serde(default = "default_analysis_timeout")]
    pub analysis_timeout_secs: u64,
}

fn default_provider() -> String {
    "gemini".to_string()
}
fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}
fn default_temperature() -> f64 {
    0.7
}
fn default_questions() -> usize {
    3
}
fn default_generation_timeout() -> u64 {
    60
}
fn default_analysis_timeout() -> u64 {
    30
}

impl Default for StudyConfig {
    fn default() -> Self {
        Self {
            providers: HashMap::new(),
            default_provider: default_provider(),
            default_model: default_model(),
            temperature: default_temperature(),
            questions_per_session: default_questions(),
            generation_timeout_secs: default_generation_timeout(),
            analysis_timeout_secs: default_analysis_timeout(),
        }
    }
}

impl StudyConfig {
    /// The selected provider's configuration, if it carries a key.
    pub fn require_credential(&self) -> Result<&ProviderConfig, StudyError> {
        let provider = self.providers.get(&self.default_provider).ok_or_else(|| {
            StudyError::Configuration(format!(
                "provider '{}' is not configured; set {API_KEY_ENV} or add [providers.{}] to {LOCAL_CONFIG_FILE}",
                self.default_provider, self.default_provider
            ))
        })?;
        if provider.api_key().trim().is_empty() {
            return Err(StudyError::Configuration(format!(
                "no API key for provider '{}'; set {API_KEY_ENV}",
                self.default_provider
            )));
        }
        Ok(provider)
    }

    /// Session limits for the core controllers.
    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            question_count: self.questions_per_session.max(1),
            generation_timeout: Duration::from_secs(self.generation_timeout_secs),
            analysis_timeout: Duration::from_secs(self.analysis_timeout_secs),
        }
    }

    /// Put `key` on the default provider, creating its entry when the name
    /// is a known provider.
    fn override_key(&mut self, key: String) {
        if !self.providers.contains_key(&self.default_provider) {
            match ProviderConfig::empty_for(&self.default_provider) {
                Some(entry) => {
                    self.providers.insert(self.default_provider.clone(), entry);
                }
                None => {
                    tracing::warn!(
                        provider = %self.default_provider,
                        "ignoring {API_KEY_ENV}: unknown provider"
                    );
                    return;
                }
            }
        }
        if let Some(provider) = self.providers.get_mut(&self.default_provider) {
            *provider.api_key_mut() = key;
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        if let Some(end) = result[start..].find('}') {
            let var_name = &result[start + 2..start + end];
            let value = std::env::var(var_name).unwrap_or_default();
            result = format!(
                "{}{}{}",
                &result[..start],
                value,
                &result[start + end + 1..]
            );
        } else {
            break;
        }
    }
    result
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `sciprep.toml` in the current directory
/// 2. `~/.config/sciprep/config.toml`
///
/// `SCIPREP_API_KEY` (or `API_KEY`) overrides the default provider's key.
pub fn load_config() -> Result<StudyConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<StudyConfig> {
    let config_path = match path {
        Some(p) if p.exists() => Some(p.to_path_buf()),
        Some(p) => anyhow::bail!("config file not found: {}", p.display()),
        None => find_config_file(),
    };

    let config = match config_path {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading config");
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            parse_config(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => StudyConfig::default(),
    };

    let key = std::env::var(API_KEY_ENV)
        .or_else(|_| std::env::var(LEGACY_API_KEY_ENV))
        .ok();
    Ok(finish_config(config, key))
}

/// Parse a TOML document into a config.
pub fn parse_config(content: &str) -> Result<StudyConfig> {
    Ok(toml::from_str(content)?)
}

/// Apply the key override and resolve `${VAR}` references.
fn finish_config(mut config: StudyConfig, key_override: Option<String>) -> StudyConfig {
    if let Some(key) = key_override.filter(|k| !k.trim().is_empty()) {
        config.override_key(key);
    }
    config.providers = config
        .providers
        .iter()
        .map(|(k, v)| (k.clone(), v.resolved()))
        .collect();
    config
}

fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from(LOCAL_CONFIG_FILE);
    if local.exists() {
        return Some(local);
    }
    let global = dirs_path()?.join("config.toml");
    global.exists().then_some(global)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("sciprep"))
}

/// Create a provider instance from its configuration.
pub fn create_provider(config: &ProviderConfig) -> Result<Box<dyn LlmProvider>> {
    Ok(match config {
        ProviderConfig::Gemini { api_key, base_url } => {
            Box::new(GeminiProvider::new(api_key, base_url.clone())?)
        }
        ProviderConfig::Anthropic { api_key, base_url } => {
            Box::new(AnthropicProvider::new(api_key, base_url.clone())?)
        }
        ProviderConfig::OpenAI {
            api_key,
            base_url,
            org_id,
        } => Box::new(OpenAiProvider::new(
            api_key,
            base_url.clone(),
            org_id.clone(),
        )?),
    })
}
