//! Core trait definitions for LLM providers and the tutoring gateways.
//!
//! `LlmProvider` is implemented by the `sciprep-providers` crate.
//! `QuizGenerator` and `WeaknessAnalyzer` are the two external contracts the
//! study flow consumes; [`crate::gateway::TutorGateway`] implements both on
//! top of any provider.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::StudyError;
use crate::model::{Question, Subject};

// ---------------------------------------------------------------------------
// LLM Provider trait
// ---------------------------------------------------------------------------

/// Trait for LLM backends that answer a single prompt.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Human-readable provider name (e.g. "gemini").
    fn name(&self) -> &str;

    /// Send one prompt and return the model's text.
    async fn complete(&self, request: &CompletionRequest) -> anyhow::Result<CompletionResponse>;

    /// List available models for this provider.
    fn available_models(&self) -> Vec<ModelInfo>;
}

/// Request for a single completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// Model identifier (e.g. "gemini-2.5-flash").
    pub model: String,
    /// The user prompt.
    pub prompt: String,
    /// Optional system prompt.
    #[serde(default)]
    pub system_prompt: Option<String>,
    /// Maximum tokens to generate.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f64,
    /// Ask the backend for a JSON-only response where it supports it.
    #[serde(default)]
    pub json_output: bool,
}

/// Response from a completion request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    /// The raw response text.
    pub content: String,
    /// Model that actually generated the response.
    pub model: String,
    /// Token usage.
    pub token_usage: TokenUsage,
    /// Latency in milliseconds.
    pub latency_ms: u64,
}

/// Token accounting for one request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Information about an available model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    /// Model identifier.
    pub id: String,
    /// Human-readable model name.
    pub name: String,
    /// Provider name.
    pub provider: String,
    /// Maximum context window size in tokens.
    pub max_context: u32,
}

// ---------------------------------------------------------------------------
// Gateway traits
// ---------------------------------------------------------------------------

/// Produces quiz questions for a subject and topic filter.
#[async_trait]
pub trait QuizGenerator: Send + Sync {
    /// Generate up to `count` questions. An empty `topics` slice means a
    /// general mix across the subject.
    async fn generate(
        &self,
        subject: Subject,
        topics: &[String],
        count: usize,
    ) -> Result<Vec<Question>, StudyError>;
}

/// Explains what a student got wrong.
#[async_trait]
pub trait WeaknessAnalyzer: Send + Sync {
    async fn analyze(&self, failed: &[Question]) -> Result<String, StudyError>;
}

// ---------------------------------------------------------------------------
// JSON payload extraction
// ---------------------------------------------------------------------------

/// Extract a JSON document from a possibly markdown-formatted LLM response.
///
/// Handles:
/// - ```json``` blocks (the first one wins)
/// - Generic ``` blocks (if no json-specific block is found)
/// - Raw JSON with no markdown (returned trimmed)
pub fn extract_json_payload(response: &str) -> String {
    let mut json_blocks = Vec::new();
    let mut generic_blocks = Vec::new();
    let mut in_block = false;
    let mut is_json_block = false;
    let mut is_generic_block = false;
    let mut current_block = String::new();

    for line in response.lines() {
        let trimmed = line.trim();

        if !in_block && trimmed.starts_with("```") {
            in_block = true;
            let lang = trimmed.trim_start_matches('`').trim().to_lowercase();
            is_json_block = lang == "json";
            is_generic_block = lang.is_empty();
            current_block.clear();
            continue;
        }

        if in_block && trimmed == "```" {
            in_block = false;
            if is_json_block {
                json_blocks.push(current_block.clone());
            } else if is_generic_block {
                generic_blocks.push(current_block.clone());
            }
            current_block.clear();
            continue;
        }

        if in_block {
            if !current_block.is_empty() {
                current_block.push('\n');
            }
            current_block.push_str(line);
        }
    }

    // Truncated (unclosed) block
    if in_block && !current_block.is_empty() {
        if is_json_block {
            json_blocks.push(current_block);
        } else if is_generic_block {
            generic_blocks.push(current_block);
        }
    }

    if let Some(block) = json_blocks.into_iter().next() {
        return block.trim().to_string();
    }

    if let Some(block) = generic_blocks.into_iter().next() {
        return block.trim().to_string();
    }

    response.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_json_block() {
        let input = "Here you go:\n\n```json\n[{\"text\": \"q\"}]\n```\n\nGood luck!";
        assert_eq!(extract_json_payload(input), "[{\"text\": \"q\"}]");
    }

    #[test]
    fn extract_raw_json() {
        let input = "  [1, 2, 3]\n";
        assert_eq!(extract_json_payload(input), "[1, 2, 3]");
    }

    #[test]
    fn extract_generic_block_fallback() {
        let input = "```\n{\"questions\": []}\n```";
        assert_eq!(extract_json_payload(input), "{\"questions\": []}");
    }

    #[test]
    fn extract_prefers_json_over_generic() {
        let input = "```\nnot this\n```\n\n```json\n[]\n```\n";
        assert_eq!(extract_json_payload(input), "[]");
    }

    #[test]
    fn extract_truncated_block() {
        let input = "```json\n[{\"text\": \"cut";
        assert_eq!(extract_json_payload(input), "[{\"text\": \"cut");
    }

    #[test]
    fn extract_ignores_other_languages() {
        let input = "```python\nprint(1)\n```\n\n```json\n{}\n```\n";
        assert_eq!(extract_json_payload(input), "{}");
    }
}
