//! Progress aggregation.
//!
//! Folds a finished session into the user's cumulative progress. The
//! function is pure: the timestamp is passed in by the caller.

use chrono::{DateTime, Utc};

use crate::model::{QuizResult, SessionOutcome, Subject, UserProgress};

/// XP awarded per correct answer.
pub const XP_PER_CORRECT: u32 = 50;
/// XP span of one level.
pub const XP_PER_LEVEL: u32 = 500;
/// Mastery points gained per correct answer.
pub const MASTERY_PER_CORRECT: u32 = 2;
/// Ceiling of every subject mastery score.
pub const MAX_MASTERY: u32 = 100;
/// Number of activity records kept.
pub const MAX_RECENT_ACTIVITY: usize = 5;

/// Level for a given XP total.
pub fn level_for_xp(xp: u32) -> u32 {
    xp / XP_PER_LEVEL + 1
}

/// XP earned by a session.
pub fn earned_xp(outcome: &SessionOutcome) -> u32 {
    outcome.correct_count.saturating_mul(XP_PER_CORRECT)
}

/// Fold a completed session into `progress`, returning the new value.
pub fn apply_session(
    progress: &UserProgress,
    outcome: &SessionOutcome,
    subject: Subject,
    at: DateTime<Utc>,
) -> UserProgress {
    let mut next = progress.clone();

    next.xp = progress.xp.saturating_add(earned_xp(outcome));
    next.level = level_for_xp(next.xp);

    // No penalty for a zero score.
    if outcome.correct_count > 0 {
        let current = progress.subject_mastery(subject) as u32;
        let gained = outcome.correct_count.saturating_mul(MASTERY_PER_CORRECT);
        let updated = current.saturating_add(gained).min(MAX_MASTERY);
        next.subject_mastery.insert(subject, updated as u8);
    }

    let record = QuizResult {
        total_questions: outcome.total,
        correct_count: outcome.correct_count,
        timestamp: at,
        subject,
        weak_topics: outcome.weak_topics(),
    };
    next.recent_activity.insert(0, record);
    next.recent_activity.truncate(MAX_RECENT_ACTIVITY);

    next
}

/// XP position within the current level, for the dashboard.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelProgress {
    pub level: u32,
    pub xp: u32,
    /// XP total at which the next level starts.
    pub next_level_xp: u32,
    /// `xp / next_level_xp`, as a percentage capped at 100.
    pub percent: f64,
}

impl LevelProgress {
    pub fn of(progress: &UserProgress) -> Self {
        let next_level_xp = progress.level().saturating_mul(XP_PER_LEVEL);
        let percent = if next_level_xp == 0 {
            0.0
        } else {
            (progress.xp() as f64 / next_level_xp as f64 * 100.0).min(100.0)
        };
        Self {
            level: progress.level(),
            xp: progress.xp(),
            next_level_xp,
            percent,
        }
    }
}
