//! sciprep-providers — LLM provider integrations.
//!
//! Implements the `LlmProvider` trait for Gemini, Anthropic, and OpenAI,
//! and loads the `sciprep.toml` configuration that selects between them.

pub mod anthropic;
pub mod config;
pub mod gemini;
mod http;
pub mod mock;
pub mod openai;

pub use config::{create_provider, load_config, load_config_from, ProviderConfig, StudyConfig};
pub use sciprep_core::error::ProviderError;
