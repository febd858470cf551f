//! Tutoring gateway over an LLM provider.
//!
//! Builds the question-generation and weakness-analysis prompts, and
//! validates the decoded question payload against the `Question` schema
//! instead of trusting its shape.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use tracing::instrument;
use uuid::Uuid;

use crate::error::{ProviderError, StudyError};
use crate::model::{Difficulty, Question, Subject, OPTION_COUNT};
use crate::traits::{
    extract_json_payload, CompletionRequest, LlmProvider, QuizGenerator, WeaknessAnalyzer,
};

/// Shown when the analysis call fails or times out.
pub const ANALYSIS_FALLBACK: &str =
    "The analysis service is temporarily unavailable. Please review the explanations of the questions you missed.";

/// Shown instead of an analysis when every answer was correct.
pub const PERFECT_SCORE_MESSAGE: &str =
    "Perfect score! Try a harder unit next, or challenge yourself with another subject.";

const GENERATION_SYSTEM_PROMPT: &str = "You are an expert tutor for Taiwanese science-class entrance exams (for example the Chien Kuo and Taipei First Girls science classes). You respond with JSON only.";

const DEFAULT_MAX_TOKENS: u32 = 4096;
const ANALYSIS_MAX_TOKENS: u32 = 1024;

/// Ways a generated question payload can fail validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PayloadError {
    #[error("response is not valid question JSON: {0}")]
    Malformed(String),

    #[error("question {index}: expected 4 options, got {got}")]
    WrongOptionCount { index: usize, got: usize },

    #[error("question {index}: correct index {value} is out of range")]
    CorrectIndexOutOfRange { index: usize, value: i64 },

    #[error("question {index}: {field} is empty")]
    EmptyField { index: usize, field: &'static str },

    #[error("question {index}: {reason}")]
    Difficulty { index: usize, reason: String },
}

/// Question as the model returns it, before validation.
#[derive(Debug, Deserialize)]
struct RawQuestion {
    text: String,
    options: Vec<String>,
    #[serde(alias = "correct_index")]
    #[serde(rename = "correctIndex")]
    correct_index: i64,
    #[serde(default)]
    explanation: String,
    #[serde(alias = "topic_tag")]
    #[serde(rename = "topicTag")]
    topic_tag: String,
    difficulty: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawBatch {
    List(Vec<RawQuestion>),
    Wrapped { questions: Vec<RawQuestion> },
}

impl RawQuestion {
    fn validate(self, index: usize, batch: &str) -> Result<Question, PayloadError> {
        if self.text.trim().is_empty() {
            return Err(PayloadError::EmptyField {
                index,
                field: "text",
            });
        }
        if self.topic_tag.trim().is_empty() {
            return Err(PayloadError::EmptyField {
                index,
                field: "topicTag",
            });
        }
        let got = self.options.len();
        let options: [String; OPTION_COUNT] = self
            .options
            .try_into()
            .map_err(|_| PayloadError::WrongOptionCount { index, got })?;
        if !(0..OPTION_COUNT as i64).contains(&self.correct_index) {
            return Err(PayloadError::CorrectIndexOutOfRange {
                index,
                value: self.correct_index,
            });
        }
        let difficulty = self
            .difficulty
            .parse::<Difficulty>()
            .map_err(|reason| PayloadError::Difficulty { index, reason })?;

        Ok(Question {
            id: format!("{batch}-{index}"),
            text: self.text,
            options,
            correct_index: self.correct_index as u8,
            explanation: self.explanation,
            difficulty,
            topic_tag: self.topic_tag,
        })
    }
}

/// Decode and validate a question batch.
///
/// Accepts a bare JSON array or an object with a `questions` array,
/// optionally wrapped in markdown fences. Any invalid question rejects the
/// whole batch. At most `limit` questions are kept.
pub fn parse_question_batch(raw: &str, limit: usize) -> Result<Vec<Question>, PayloadError> {
    let payload = extract_json_payload(raw);
    let batch: RawBatch =
        serde_json::from_str(&payload).map_err(|e| PayloadError::Malformed(e.to_string()))?;
    let questions = match batch {
        RawBatch::List(q) => q,
        RawBatch::Wrapped { questions } => questions,
    };

    let batch_id = Uuid::new_v4().simple().to_string();
    questions
        .into_iter()
        .take(limit)
        .enumerate()
        .map(|(i, q)| q.validate(i, &batch_id))
        .collect()
}

/// Prompt for a batch of `count` questions.
pub fn question_prompt(subject: Subject, topics: &[String], count: usize) -> String {
    let scope = if topics.is_empty() {
        "comprehensive range".to_string()
    } else {
        topics.join("、")
    };

    format!(
        "Write {count} single-answer multiple-choice questions in the subject \"{subject}\" \
         for gifted grade 9 students preparing for a science-class entrance exam.\n\
         \n\
         Requirements:\n\
         1. Challenging, close to entrance-exam or junior olympiad level.\n\
         2. Scope: {scope}.\n\
         3. Use the Traditional Chinese terminology customary in Taiwan.\n\
         \n\
         Respond with a JSON array only. Each element must have: \
         \"text\" (the question), \"options\" (exactly 4 strings), \
         \"correctIndex\" (0-3), \"explanation\" (concepts and worked steps), \
         \"topicTag\" (the specific sub-topic, e.g. Newton's second law), \
         \"difficulty\" (one of \"easy\", \"medium\", \"hard\")."
    )
}

/// Prompt asking for an analysis of the missed questions.
pub fn analysis_prompt(failed: &[Question]) -> String {
    let questions = failed
        .iter()
        .map(|q| {
            format!(
                "Question: {}\nTopic: {}\nExplanation: {}",
                q.text, q.topic_tag, q.explanation
            )
        })
        .collect::<Vec<_>>()
        .join("\n---\n");

    format!(
        "A student missed the following questions in a science-class mock exam. \
         In an encouraging but professional tone, identify the gaps in their \
         understanding and give concrete advice, such as which chapter or concept \
         to review. Keep the answer within about 100 words, as bullet points.\n\
         \n\
         Missed questions:\n{questions}"
    )
}

/// Implements both gateway contracts over one LLM provider.
#[derive(Clone)]
pub struct TutorGateway {
    provider: Arc<dyn LlmProvider>,
    model: String,
    temperature: f64,
}

impl TutorGateway {
    pub fn new(provider: Arc<dyn LlmProvider>, model: impl Into<String>, temperature: f64) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature,
        }
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }
}

/// Turn a provider failure into a readable reason.
fn describe_provider_error(err: &anyhow::Error) -> String {
    match err.downcast_ref::<ProviderError>() {
        Some(ProviderError::AuthenticationFailed(_)) => {
            "the API key was rejected by the provider".to_string()
        }
        Some(ProviderError::RateLimited { retry_after_ms }) => {
            format!("rate limited, try again in {}s", retry_after_ms / 1000)
        }
        Some(other) => other.to_string(),
        None => format!("{err:#}"),
    }
}

#[async_trait]
impl QuizGenerator for TutorGateway {
    #[instrument(skip(self, topics), fields(provider = %self.provider.name(), model = %self.model))]
    async fn generate(
        &self,
        subject: Subject,
        topics: &[String],
        count: usize,
    ) -> Result<Vec<Question>, StudyError> {
        let request = CompletionRequest {
            model: self.model.clone(),
            prompt: question_prompt(subject, topics, count),
            system_prompt: Some(GENERATION_SYSTEM_PROMPT.to_string()),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: self.temperature,
            json_output: true,
        };

        let response = self.provider.complete(&request).await.map_err(|e| {
            tracing::error!("question generation request failed: {e:#}");
            StudyError::GenerationFailed(describe_provider_error(&e))
        })?;

        let questions = parse_question_batch(&response.content, count).map_err(|e| {
            tracing::warn!("rejected question payload: {e}");
            StudyError::GenerationFailed(e.to_string())
        })?;

        if questions.is_empty() {
            return Err(StudyError::GenerationFailed(
                "the model returned no questions".to_string(),
            ));
        }

        tracing::info!(
            count = questions.len(),
            latency_ms = response.latency_ms,
            "generated question batch"
        );
        Ok(questions)
    }
}

#[async_trait]
impl WeaknessAnalyzer for TutorGateway {
    #[instrument(skip(self, failed), fields(provider = %self.provider.name(), failed = failed.len()))]
    async fn analyze(&self, failed: &[Question]) -> Result<String, StudyError> {
        if failed.is_empty() {
            return Ok(PERFECT_SCORE_MESSAGE.to_string());
        }

        let request = CompletionRequest {
            model: self.model.clone(),
            prompt: analysis_prompt(failed),
            system_prompt: None,
            max_tokens: ANALYSIS_MAX_TOKENS,
            temperature: self.temperature,
            json_output: false,
        };

        let response = self
            .provider
            .complete(&request)
            .await
            .map_err(|e| StudyError::AnalysisUnavailable(describe_provider_error(&e)))?;

        let text = response.content.trim();
        if text.is_empty() {
            return Err(StudyError::AnalysisUnavailable(
                "the model returned an empty analysis".to_string(),
            ));
        }
        Ok(text.to_string())
    }
}
