//! Core data model types for sciprep.
//!
//! Questions, subjects, topics, and the per-user progress record that the
//! session, aggregator, and navigation modules share.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Number of answer options on every question.
pub const OPTION_COUNT: usize = 4;

/// One multiple-choice quiz item. Immutable once generated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// Unique within the batch that produced it.
    pub id: String,
    /// The question prompt.
    pub text: String,
    /// Exactly four answer options.
    pub options: [String; OPTION_COUNT],
    /// Index of the correct option (0-3).
    pub correct_index: u8,
    /// Worked explanation shown after answering.
    pub explanation: String,
    pub difficulty: Difficulty,
    /// Free-text sub-topic label, used to group weak topics.
    pub topic_tag: String,
}

impl Question {
    /// Whether `option` is the correct answer.
    pub fn is_correct(&self, option: usize) -> bool {
        option == self.correct_index as usize
    }
}

/// Question difficulty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difficulty::Easy => write!(f, "easy"),
            Difficulty::Medium => write!(f, "medium"),
            Difficulty::Hard => write!(f, "hard"),
        }
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(format!("unknown difficulty: {other}")),
        }
    }
}

/// The four quizzed subjects. Adding one is a code change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Subject {
    Math,
    Physics,
    Chemistry,
    Biology,
}

impl Subject {
    /// All subjects in display order.
    pub const ALL: [Subject; 4] = [
        Subject::Math,
        Subject::Physics,
        Subject::Chemistry,
        Subject::Biology,
    ];

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            Subject::Math => "Gifted Mathematics",
            Subject::Physics => "Advanced Physics",
            Subject::Chemistry => "Olympiad Chemistry",
            Subject::Biology => "Advanced Biology",
        }
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Subject::Math => write!(f, "math"),
            Subject::Physics => write!(f, "physics"),
            Subject::Chemistry => write!(f, "chemistry"),
            Subject::Biology => write!(f, "biology"),
        }
    }
}

impl FromStr for Subject {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "math" | "maths" | "mathematics" => Ok(Subject::Math),
            "physics" => Ok(Subject::Physics),
            "chemistry" | "chem" => Ok(Subject::Chemistry),
            "biology" | "bio" => Ok(Subject::Biology),
            other => Err(format!("unknown subject: {other}")),
        }
    }
}

/// A static catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopicNode {
    pub id: &'static str,
    /// Display name, also sent to the generator as the topic filter.
    pub name: &'static str,
    pub subject: Subject,
    pub description: &'static str,
}

/// Per-topic mastery status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TopicStatus {
    #[default]
    Locked,
    Learning,
    Mastered,
}

impl fmt::Display for TopicStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TopicStatus::Locked => write!(f, "locked"),
            TopicStatus::Learning => write!(f, "learning"),
            TopicStatus::Mastered => write!(f, "mastered"),
        }
    }
}

/// What a finished quiz session emits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionOutcome {
    pub correct_count: u32,
    pub total: u32,
    /// Incorrectly answered questions, in answer order.
    pub failed_questions: Vec<Question>,
}

impl SessionOutcome {
    /// Accuracy as a whole percentage, rounded.
    pub fn accuracy_percent(&self) -> u32 {
        if self.total == 0 {
            return 0;
        }
        (self.correct_count as f64 / self.total as f64 * 100.0).round() as u32
    }

    /// Distinct topic tags of the failed questions, in first-seen order.
    pub fn weak_topics(&self) -> Vec<String> {
        let mut tags: Vec<String> = Vec::new();
        for q in &self.failed_questions {
            if !tags.iter().any(|t| t == &q.topic_tag) {
                tags.push(q.topic_tag.clone());
            }
        }
        tags
    }
}

/// An activity record, created once when a session completes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuizResult {
    pub total_questions: u32,
    pub correct_count: u32,
    pub timestamp: DateTime<Utc>,
    pub subject: Subject,
    /// Distinct topic tags of the incorrectly answered questions.
    pub weak_topics: Vec<String>,
}

/// Cumulative user state for the lifetime of the process.
///
/// Fields are private: a new value is produced only by
/// [`crate::progress::apply_session`], which keeps `level` derived from `xp`,
/// mastery within `[0, 100]`, and the activity list bounded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserProgress {
    pub(crate) xp: u32,
    pub(crate) level: u32,
    pub(crate) streak: u32,
    pub(crate) last_login_date: NaiveDate,
    pub(crate) subject_mastery: BTreeMap<Subject, u8>,
    pub(crate) topic_mastery: BTreeMap<String, TopicStatus>,
    pub(crate) recent_activity: Vec<QuizResult>,
}

impl UserProgress {
    pub fn xp(&self) -> u32 {
        self.xp
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn streak(&self) -> u32 {
        self.streak
    }

    pub fn last_login_date(&self) -> NaiveDate {
        self.last_login_date
    }

    /// Mastery score for a subject, in `[0, 100]`.
    pub fn subject_mastery(&self, subject: Subject) -> u8 {
        self.subject_mastery.get(&subject).copied().unwrap_or(0)
    }

    /// Stored status of a topic. Absent entries are locked.
    pub fn topic_status(&self, topic_id: &str) -> TopicStatus {
        self.topic_mastery
            .get(topic_id)
            .copied()
            .unwrap_or_default()
    }

    pub fn topic_mastery(&self) -> &BTreeMap<String, TopicStatus> {
        &self.topic_mastery
    }

    /// Most recent first, at most five entries.
    pub fn recent_activity(&self) -> &[QuizResult] {
        &self.recent_activity
    }

    /// Weak topics of the latest session, if any.
    pub fn latest_weak_topics(&self) -> &[String] {
        self.recent_activity
            .first()
            .map(|r| r.weak_topics.as_slice())
            .unwrap_or(&[])
    }

    /// Returns a copy with one subject's mastery replaced (clamped to 100).
    pub fn with_subject_mastery(mut self, subject: Subject, value: u8) -> Self {
        self.subject_mastery.insert(subject, value.min(100));
        self
    }

    /// Returns a copy with one topic's stored status replaced.
    pub fn with_topic_status(mut self, topic_id: &str, status: TopicStatus) -> Self {
        self.topic_mastery.insert(topic_id.to_string(), status);
        self
    }
}
