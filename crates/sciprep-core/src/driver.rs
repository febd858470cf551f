//! Executes reducer commands against the gateways.
//!
//! Every gateway call is bounded by a timeout from [`SessionSettings`] and
//! turned back into an [`AppEvent`] carrying the token it was issued for.
//! Failures never escape as errors: generation failures become a failed
//! `QuestionsLoaded`, analysis failures degrade to [`ANALYSIS_FALLBACK`].

use std::sync::Arc;

use crate::error::StudyError;
use crate::gateway::ANALYSIS_FALLBACK;
use crate::navigation::{AppEvent, Command};
use crate::session::SessionSettings;
use crate::traits::{QuizGenerator, WeaknessAnalyzer};

/// The collaborators a command needs.
#[derive(Clone)]
pub struct Services {
    pub generator: Arc<dyn QuizGenerator>,
    pub analyzer: Arc<dyn WeaknessAnalyzer>,
    pub settings: SessionSettings,
}

impl Services {
    pub fn new(
        generator: Arc<dyn QuizGenerator>,
        analyzer: Arc<dyn WeaknessAnalyzer>,
        settings: SessionSettings,
    ) -> Self {
        Self {
            generator,
            analyzer,
            settings,
        }
    }
}

/// Run one command to completion and return the event it produces.
pub async fn execute(services: &Services, command: Command) -> AppEvent {
    match command {
        Command::GenerateQuestions {
            token,
            subject,
            topics,
            count,
        } => {
            let timeout = services.settings.generation_timeout;
            let call = services.generator.generate(subject, &topics, count);
            let result = match tokio::time::timeout(timeout, call).await {
                Ok(result) => result,
                Err(_) => {
                    tracing::warn!(%token, "question generation timed out after {timeout:?}");
                    Err(StudyError::GenerationFailed(format!(
                        "no response within {}s",
                        timeout.as_secs()
                    )))
                }
            };
            AppEvent::QuestionsLoaded { token, result }
        }

        Command::AnalyzeWeaknesses { token, failed } => {
            let timeout = services.settings.analysis_timeout;
            let call = services.analyzer.analyze(&failed);
            let result = match tokio::time::timeout(timeout, call).await {
                Ok(result) => result,
                Err(_) => Err(StudyError::AnalysisUnavailable(format!(
                    "no response within {}s",
                    timeout.as_secs()
                ))),
            };
            let text = result.unwrap_or_else(|e| {
                tracing::warn!(%token, "{e}");
                ANALYSIS_FALLBACK.to_string()
            });
            AppEvent::AnalysisReady { token, text }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::model::{Difficulty, Question, Subject};
    use crate::session::SessionToken;

    struct SlowGenerator {
        delay: Duration,
        questions: Vec<Question>,
    }

    #[async_trait]
    impl QuizGenerator for SlowGenerator {
        async fn generate(
            &self,
            _subject: Subject,
            _topics: &[String],
            count: usize,
        ) -> Result<Vec<Question>, StudyError> {
            tokio::time::sleep(self.delay).await;
            Ok(self.questions.iter().take(count).cloned().collect())
        }
    }

    struct FailingAnalyzer;

    #[async_trait]
    impl WeaknessAnalyzer for FailingAnalyzer {
        async fn analyze(&self, _failed: &[Question]) -> Result<String, StudyError> {
            Err(StudyError::AnalysisUnavailable("quota exceeded".into()))
        }
    }

    struct EchoAnalyzer;

    #[async_trait]
    impl WeaknessAnalyzer for EchoAnalyzer {
        async fn analyze(&self, failed: &[Question]) -> Result<String, StudyError> {
            Ok(format!("{} to review", failed.len()))
        }
    }

    fn question() -> Question {
        Question {
            id: "b-0".into(),
            text: "q".into(),
            options: ["a".into(), "b".into(), "c".into(), "d".into()],
            correct_index: 0,
            explanation: String::new(),
            difficulty: Difficulty::Easy,
            topic_tag: "t".into(),
        }
    }

    fn services(delay: Duration, analyzer: Arc<dyn WeaknessAnalyzer>) -> Services {
        Services::new(
            Arc::new(SlowGenerator {
                delay,
                questions: vec![question(), question()],
            }),
            analyzer,
            SessionSettings {
                question_count: 2,
                generation_timeout: Duration::from_secs(60),
                analysis_timeout: Duration::from_secs(30),
            },
        )
    }

    fn generate(token: u64) -> Command {
        Command::GenerateQuestions {
            token: SessionToken(token),
            subject: Subject::Math,
            topics: vec![],
            count: 2,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn generation_within_timeout() {
        let services = services(Duration::from_secs(5), Arc::new(EchoAnalyzer));
        match execute(&services, generate(3)).await {
            AppEvent::QuestionsLoaded { token, result } => {
                assert_eq!(token, SessionToken(3));
                assert_eq!(result.unwrap().len(), 2);
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn generation_timeout_is_generation_failed() {
        let services = services(Duration::from_secs(600), Arc::new(EchoAnalyzer));
        match execute(&services, generate(9)).await {
            AppEvent::QuestionsLoaded { token, result } => {
                assert_eq!(token, SessionToken(9));
                assert_eq!(
                    result.unwrap_err(),
                    StudyError::GenerationFailed("no response within 60s".into())
                );
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[tokio::test]
    async fn analysis_failure_degrades_to_fallback() {
        let services = services(Duration::ZERO, Arc::new(FailingAnalyzer));
        let event = execute(
            &services,
            Command::AnalyzeWeaknesses {
                token: SessionToken(2),
                failed: vec![question()],
            },
        )
        .await;
        match event {
            AppEvent::AnalysisReady { token, text } => {
                assert_eq!(token, SessionToken(2));
                assert_eq!(text, ANALYSIS_FALLBACK);
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[tokio::test]
    async fn analysis_success_passes_text_through() {
        let services = services(Duration::ZERO, Arc::new(EchoAnalyzer));
        let event = execute(
            &services,
            Command::AnalyzeWeaknesses {
                token: SessionToken(5),
                failed: vec![question(), question()],
            },
        )
        .await;
        assert!(matches!(event, AppEvent::AnalysisReady { text, .. } if text == "2 to review"));
    }
}
