//! Quiz session controller.
//!
//! Drives one bounded quiz: waits for its question batch, takes one answer
//! per question, and emits a [`SessionOutcome`] after the last question.
//! Every session carries a [`SessionToken`]; a generation result for any
//! other token is rejected, so a request that resolves after the session
//! was abandoned cannot touch a newer one.

use std::fmt;
use std::time::Duration;

use crate::error::{SessionError, StudyError};
use crate::model::{Question, SessionOutcome, Subject};

/// Message shown when no question batch could be obtained.
pub const GENERATION_FAILED_MESSAGE: &str =
    "Could not generate questions. Check your network connection or try again later.";

/// Pacing and timeout settings for quiz sessions.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSettings {
    /// Questions requested per session.
    pub question_count: usize,
    /// Upper bound on waiting for a question batch.
    pub generation_timeout: Duration,
    /// Upper bound on waiting for a weakness analysis.
    pub analysis_timeout: Duration,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            question_count: 3,
            generation_timeout: Duration::from_secs(60),
            analysis_timeout: Duration::from_secs(30),
        }
    }
}

/// Identifies one session instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionToken(pub u64);

impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Lifecycle phase of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionPhase {
    /// Waiting for the question batch. No answers accepted.
    Loading,
    /// Questions are being answered.
    Active,
    /// No batch could be obtained. The only way out is exit.
    Failed { message: String, reason: StudyError },
    /// The last question was answered and the outcome emitted.
    Completed,
}

/// Feedback for an accepted answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerFeedback {
    pub selected: usize,
    pub correct_index: usize,
    pub is_correct: bool,
}

/// Result of a successful `advance`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advance {
    /// Moved on to the question at this index.
    Next(usize),
    /// The session is over.
    Finished(SessionOutcome),
}

/// One micro-quiz.
#[derive(Debug, Clone)]
pub struct QuizSession {
    token: SessionToken,
    subject: Subject,
    topics: Vec<String>,
    requested: usize,
    phase: SessionPhase,
    questions: Vec<Question>,
    current: usize,
    selected: Option<usize>,
    score: u32,
    failed: Vec<Question>,
}

impl QuizSession {
    /// Create a session waiting for `question_count` questions.
    pub fn start(
        token: SessionToken,
        subject: Subject,
        topics: Vec<String>,
        question_count: usize,
    ) -> Self {
        Self {
            token,
            subject,
            topics,
            requested: question_count.max(1),
            phase: SessionPhase::Loading,
            questions: Vec::new(),
            current: 0,
            selected: None,
            score: 0,
            failed: Vec::new(),
        }
    }

    pub fn token(&self) -> SessionToken {
        self.token
    }

    pub fn subject(&self) -> Subject {
        self.subject
    }

    pub fn topics(&self) -> &[String] {
        &self.topics
    }

    /// Number of questions asked of the generator.
    pub fn requested(&self) -> usize {
        self.requested
    }

    pub fn phase(&self) -> &SessionPhase {
        &self.phase
    }

    pub fn is_loading(&self) -> bool {
        self.phase == SessionPhase::Loading
    }

    /// Zero-based index of the current question.
    pub fn current_index(&self) -> usize {
        self.current
    }

    /// Number of questions in the loaded batch.
    pub fn total(&self) -> usize {
        self.questions.len()
    }

    /// The question being answered, while active.
    pub fn current_question(&self) -> Option<&Question> {
        match self.phase {
            SessionPhase::Active => self.questions.get(self.current),
            _ => None,
        }
    }

    /// The option chosen for the current question, if answered.
    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn is_answered(&self) -> bool {
        self.selected.is_some()
    }

    pub fn is_last_question(&self) -> bool {
        self.current + 1 >= self.questions.len()
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn failed_questions(&self) -> &[Question] {
        &self.failed
    }

    /// Apply the generator's result for this session.
    ///
    /// An error or an empty batch moves the session to `Failed`. Batches
    /// longer than requested are cut down to the requested size.
    pub fn apply_generation(
        &mut self,
        token: SessionToken,
        result: Result<Vec<Question>, StudyError>,
    ) -> Result<(), SessionError> {
        if token != self.token {
            return Err(SessionError::StaleGeneration {
                expected: self.token.0,
                got: token.0,
            });
        }
        if self.phase != SessionPhase::Loading {
            return Err(SessionError::NotLoading);
        }

        let reason = match result {
            Ok(mut questions) if !questions.is_empty() => {
                questions.truncate(self.requested);
                self.questions = questions;
                self.current = 0;
                self.selected = None;
                self.score = 0;
                self.failed.clear();
                self.phase = SessionPhase::Active;
                return Ok(());
            }
            Ok(_) => StudyError::GenerationFailed("the generator returned no questions".into()),
            Err(StudyError::GenerationFailed(reason)) => StudyError::GenerationFailed(reason),
            Err(other) => StudyError::GenerationFailed(other.to_string()),
        };

        tracing::warn!(token = %self.token, "session failed to load: {reason}");
        self.phase = SessionPhase::Failed {
            message: GENERATION_FAILED_MESSAGE.to_string(),
            reason,
        };
        Ok(())
    }

    /// Answer the current question.
    ///
    /// Returns `Ok(None)` without changing anything when the question was
    /// already answered.
    pub fn submit(&mut self, option: usize) -> Result<Option<AnswerFeedback>, SessionError> {
        if self.phase != SessionPhase::Active {
            return Err(SessionError::NotActive);
        }
        if self.selected.is_some() {
            return Ok(None);
        }

        let question = &self.questions[self.current];
        let available = question.options.len();
        if option >= available {
            return Err(SessionError::OptionOutOfRange { option, available });
        }

        let is_correct = question.is_correct(option);
        let correct_index = question.correct_index as usize;
        if is_correct {
            self.score += 1;
        } else {
            self.failed.push(question.clone());
        }
        self.selected = Some(option);

        Ok(Some(AnswerFeedback {
            selected: option,
            correct_index,
            is_correct,
        }))
    }

    /// Move past the current (answered) question.
    ///
    /// After the last question the session completes and returns its
    /// outcome. The score already counts the last answer.
    pub fn advance(&mut self) -> Result<Advance, SessionError> {
        if self.phase != SessionPhase::Active {
            return Err(SessionError::NotActive);
        }
        if self.selected.is_none() {
            return Err(SessionError::NotAnswered {
                index: self.current,
            });
        }

        if !self.is_last_question() {
            self.current += 1;
            self.selected = None;
            return Ok(Advance::Next(self.current));
        }

        self.phase = SessionPhase::Completed;
        Ok(Advance::Finished(SessionOutcome {
            correct_count: self.score,
            total: self.questions.len() as u32,
            failed_questions: self.failed.clone(),
        }))
    }
}
