//! View-navigation controller.
//!
//! `AppState` is owned by the top-level loop and replaced on every event by
//! [`AppState::reduce`]. The reducer never performs I/O: asynchronous work
//! is returned as a [`Command`], and its result comes back as another
//! [`AppEvent`] tagged with the token it was issued for.

use chrono::{DateTime, Utc};

use crate::catalog::DEFAULT_SUBJECT;
use crate::error::StudyError;
use crate::gateway::PERFECT_SCORE_MESSAGE;
use crate::mastery_map;
use crate::model::{Question, SessionOutcome, Subject, UserProgress};
use crate::progress;
use crate::session::{Advance, QuizSession, SessionToken};

/// The active screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Dashboard,
    /// Also covers quiz setup, which launches the same session.
    QuizSession,
    QuizResult,
    MasteryMap,
}

/// Inputs to the reducer.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// Dashboard quick start for a whole subject.
    QuickStart(Subject),
    /// Mastery-map topic pick, by topic id.
    SelectTopic(String),
    /// Result of a `GenerateQuestions` command.
    QuestionsLoaded {
        token: SessionToken,
        result: Result<Vec<Question>, StudyError>,
    },
    /// Answer the current question with this option index.
    Answer(usize),
    /// Next question, or finish. `at` stamps the activity record.
    Advance { at: DateTime<Utc> },
    /// Leave the quiz without a result.
    ExitSession,
    /// Run another session with the same subject and topics.
    Retry,
    /// Back to the dashboard from the result screen.
    Home,
    NavigateDashboard,
    NavigateMasteryMap,
    /// Result of an `AnalyzeWeaknesses` command.
    AnalysisReady { token: SessionToken, text: String },
}

/// Asynchronous work requested by the reducer.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    GenerateQuestions {
        token: SessionToken,
        subject: Subject,
        topics: Vec<String>,
        count: usize,
    },
    AnalyzeWeaknesses {
        token: SessionToken,
        failed: Vec<Question>,
    },
}

/// Weakness analysis shown on the result screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Analysis {
    Pending,
    Ready(String),
}

/// The most recent completed session.
#[derive(Debug, Clone)]
pub struct LastResult {
    pub token: SessionToken,
    pub subject: Subject,
    pub outcome: SessionOutcome,
    pub analysis: Analysis,
}

/// Application state.
#[derive(Debug, Clone)]
pub struct AppState {
    view: View,
    subject: Subject,
    topics: Vec<String>,
    progress: UserProgress,
    session: Option<QuizSession>,
    last_result: Option<LastResult>,
    question_count: usize,
    next_token: u64,
    notice: Option<String>,
}

/// New state plus the work it asks for.
#[derive(Debug)]
pub struct Transition {
    pub state: AppState,
    pub command: Option<Command>,
}

impl AppState {
    /// Dashboard, default subject, empty topic filter, no result.
    pub fn new(progress: UserProgress, question_count: usize) -> Self {
        Self {
            view: View::Dashboard,
            subject: DEFAULT_SUBJECT,
            topics: Vec::new(),
            progress,
            session: None,
            last_result: None,
            question_count,
            next_token: 1,
            notice: None,
        }
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn subject(&self) -> Subject {
        self.subject
    }

    /// Topic-name filter. Empty means a general mix.
    pub fn topics(&self) -> &[String] {
        &self.topics
    }

    pub fn progress(&self) -> &UserProgress {
        &self.progress
    }

    pub fn session(&self) -> Option<&QuizSession> {
        self.session.as_ref()
    }

    pub fn last_result(&self) -> Option<&LastResult> {
        self.last_result.as_ref()
    }

    /// Why the last event was rejected, if it was.
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// Apply one event.
    pub fn reduce(mut self, event: AppEvent) -> Transition {
        self.notice = None;

        match event {
            AppEvent::QuickStart(subject) => {
                if self.view != View::Dashboard {
                    return self.reject("quick start is only available from the dashboard");
                }
                self.subject = subject;
                self.topics.clear();
                self.start_session()
            }

            AppEvent::SelectTopic(topic_id) => {
                if self.view != View::MasteryMap {
                    return self.reject("topics are picked from the mastery map");
                }
                let Some(tile) = mastery_map::tile_for(&self.progress, &topic_id) else {
                    return self.reject(format!("unknown topic: {topic_id}"));
                };
                if !tile.is_selectable() {
                    return self.reject(format!("{} is still locked", tile.topic.name));
                }
                self.subject = tile.topic.subject;
                self.topics = vec![tile.topic.name.to_string()];
                self.start_session()
            }

            AppEvent::QuestionsLoaded { token, result } => {
                let live = self.view == View::QuizSession;
                match self.session.as_mut() {
                    Some(session) if live && session.token() == token => {
                        if let Err(e) = session.apply_generation(token, result) {
                            tracing::debug!(%token, "ignored generation result: {e}");
                        }
                    }
                    _ => tracing::debug!(%token, "dropping stale question batch"),
                }
                self.stay()
            }

            AppEvent::Answer(option) => {
                let Some(session) = self.session.as_mut() else {
                    return self.reject("no quiz in progress");
                };
                match session.submit(option) {
                    Ok(_) => self.stay(),
                    Err(e) => self.reject(e.to_string()),
                }
            }

            AppEvent::Advance { at } => {
                let Some(session) = self.session.as_mut() else {
                    return self.reject("no quiz in progress");
                };
                match session.advance() {
                    Ok(Advance::Next(_)) => self.stay(),
                    Ok(Advance::Finished(outcome)) => self.finish_session(outcome, at),
                    Err(e) => self.reject(e.to_string()),
                }
            }

            AppEvent::ExitSession => {
                if self.view != View::QuizSession {
                    return self.reject("no quiz in progress");
                }
                self.discard_session();
                self.view = View::Dashboard;
                self.stay()
            }

            AppEvent::Retry => {
                if self.view != View::QuizResult {
                    return self.reject("nothing to retry");
                }
                self.start_session()
            }

            AppEvent::Home => {
                if self.view != View::QuizResult {
                    return self.reject("home is only available from the result screen");
                }
                self.view = View::Dashboard;
                self.stay()
            }

            AppEvent::NavigateDashboard => {
                self.discard_session();
                self.view = View::Dashboard;
                self.stay()
            }

            AppEvent::NavigateMasteryMap => {
                self.discard_session();
                self.view = View::MasteryMap;
                self.stay()
            }

            AppEvent::AnalysisReady { token, text } => {
                match self.last_result.as_mut() {
                    Some(last) if last.token == token && last.analysis == Analysis::Pending => {
                        last.analysis = Analysis::Ready(text);
                    }
                    _ => tracing::debug!(%token, "dropping stale analysis"),
                }
                self.stay()
            }
        }
    }

    fn stay(self) -> Transition {
        Transition {
            state: self,
            command: None,
        }
    }

    fn reject(mut self, reason: impl Into<String>) -> Transition {
        let reason = reason.into();
        tracing::debug!(view = ?self.view, "rejected event: {reason}");
        self.notice = Some(reason);
        self.stay()
    }

    fn discard_session(&mut self) {
        if let Some(session) = self.session.take() {
            tracing::debug!(token = %session.token(), "session discarded");
        }
    }

    fn allocate_token(&mut self) -> SessionToken {
        let token = SessionToken(self.next_token);
        self.next_token += 1;
        token
    }

    fn start_session(mut self) -> Transition {
        let token = self.allocate_token();
        let session = QuizSession::start(
            token,
            self.subject,
            self.topics.clone(),
            self.question_count,
        );
        let command = Command::GenerateQuestions {
            token,
            subject: self.subject,
            topics: self.topics.clone(),
            count: session.requested(),
        };
        tracing::info!(%token, subject = %self.subject, topics = ?self.topics, "starting quiz session");

        self.session = Some(session);
        self.view = View::QuizSession;
        Transition {
            state: self,
            command: Some(command),
        }
    }

    fn finish_session(mut self, outcome: SessionOutcome, at: DateTime<Utc>) -> Transition {
        let Some(session) = self.session.take() else {
            return self.stay();
        };
        let token = session.token();
        let subject = session.subject();

        self.progress = progress::apply_session(&self.progress, &outcome, subject, at);
        tracing::info!(
            %token,
            correct = outcome.correct_count,
            total = outcome.total,
            xp = self.progress.xp(),
            level = self.progress.level(),
            "quiz session completed"
        );

        let (analysis, command) = if outcome.failed_questions.is_empty() {
            (Analysis::Ready(PERFECT_SCORE_MESSAGE.to_string()), None)
        } else {
            (
                Analysis::Pending,
                Some(Command::AnalyzeWeaknesses {
                    token,
                    failed: outcome.failed_questions.clone(),
                }),
            )
        };

        self.last_result = Some(LastResult {
            token,
            subject,
            outcome,
            analysis,
        });
        self.view = View::QuizResult;
        Transition {
            state: self,
            command,
        }
    }
}

/// Topic filter as shown to the user.
pub fn describe_topics(topics: &[String]) -> String {
    if topics.is_empty() {
        "general mix".to_string()
    } else {
        topics.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeZone};

    use super::*;
    use crate::catalog::initial_progress;
    use crate::model::Difficulty;
    use crate::session::SessionPhase;

    fn state() -> AppState {
        AppState::new(
            initial_progress(NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()),
            3,
        )
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 10, 0, 0).unwrap()
    }

    fn question(n: usize, correct: u8, tag: &str) -> Question {
        Question {
            id: format!("b-{n}"),
            text: format!("Q{n}"),
            options: ["A".into(), "B".into(), "C".into(), "D".into()],
            correct_index: correct,
            explanation: "see notes".into(),
            difficulty: Difficulty::Hard,
            topic_tag: tag.into(),
        }
    }

    fn batch() -> Vec<Question> {
        vec![question(0, 0, "X"), question(1, 1, "X"), question(2, 2, "Z")]
    }

    fn token_of(command: &Option<Command>) -> SessionToken {
        match command {
            Some(Command::GenerateQuestions { token, .. }) => *token,
            other => panic!("expected GenerateQuestions, got {other:?}"),
        }
    }

    /// Quick start, load the batch, answer with `answers`, and finish.
    fn play(state: AppState, subject: Subject, answers: &[usize]) -> Transition {
        let t = state.reduce(AppEvent::QuickStart(subject));
        let token = token_of(&t.command);
        let mut t = t.state.reduce(AppEvent::QuestionsLoaded {
            token,
            result: Ok(batch()),
        });
        for &a in answers {
            t = t.state.reduce(AppEvent::Answer(a));
            t = t.state.reduce(AppEvent::Advance { at: now() });
        }
        t
    }

    #[test]
    fn initial_state() {
        let s = state();
        assert_eq!(s.view(), View::Dashboard);
        assert_eq!(s.subject(), Subject::Math);
        assert!(s.topics().is_empty());
        assert!(s.last_result().is_none());
        assert!(s.session().is_none());
    }

    #[test]
    fn quick_start_clears_topics_and_requests_questions() {
        let t = state().reduce(AppEvent::QuickStart(Subject::Physics));
        assert_eq!(t.state.view(), View::QuizSession);
        assert_eq!(t.state.subject(), Subject::Physics);
        assert!(t.state.topics().is_empty());
        assert!(t.state.session().unwrap().is_loading());
        assert_eq!(
            t.command,
            Some(Command::GenerateQuestions {
                token: SessionToken(1),
                subject: Subject::Physics,
                topics: vec![],
                count: 3,
            })
        );
    }

    #[test]
    fn select_unlocked_topic_from_mastery_map() {
        let t = state().reduce(AppEvent::NavigateMasteryMap);
        assert_eq!(t.state.view(), View::MasteryMap);

        let t = t.state.reduce(AppEvent::SelectTopic("chem_stoich".into()));
        assert_eq!(t.state.view(), View::QuizSession);
        assert_eq!(t.state.subject(), Subject::Chemistry);
        assert_eq!(t.state.topics(), ["Stoichiometry"]);
        assert!(matches!(
            t.command,
            Some(Command::GenerateQuestions { ref topics, .. }) if topics == &["Stoichiometry".to_string()]
        ));
    }

    #[test]
    fn select_locked_topic_is_rejected() {
        let t = state().reduce(AppEvent::NavigateMasteryMap);
        let t = t.state.reduce(AppEvent::SelectTopic("chem_gas".into()));
        assert_eq!(t.state.view(), View::MasteryMap);
        assert!(t.command.is_none());
        assert!(t.state.notice().unwrap().contains("locked"));
        assert_eq!(t.state.subject(), Subject::Math);
    }

    #[test]
    fn completed_session_updates_progress_and_shows_result() {
        // Right, wrong, wrong.
        let t = play(state(), Subject::Math, &[0, 3, 3]);
        assert_eq!(t.state.view(), View::QuizResult);

        let progress = t.state.progress();
        assert_eq!(progress.xp(), 50);
        assert_eq!(progress.subject_mastery(Subject::Math), 22);
        assert_eq!(progress.recent_activity()[0].weak_topics, vec!["X", "Z"]);
        assert_eq!(progress.recent_activity()[0].timestamp, now());

        let last = t.state.last_result().unwrap();
        assert_eq!(last.outcome.correct_count, 1);
        assert_eq!(last.analysis, Analysis::Pending);
        assert!(matches!(
            t.command,
            Some(Command::AnalyzeWeaknesses { ref failed, .. }) if failed.len() == 2
        ));
        assert!(t.state.session().is_none());
    }

    #[test]
    fn perfect_score_needs_no_analysis_call() {
        let t = play(state(), Subject::Biology, &[0, 1, 2]);
        assert!(t.command.is_none());
        assert_eq!(
            t.state.last_result().unwrap().analysis,
            Analysis::Ready(PERFECT_SCORE_MESSAGE.to_string())
        );
    }

    #[test]
    fn analysis_result_is_applied_once_for_matching_token() {
        let t = play(state(), Subject::Math, &[3, 3, 3]);
        let token = t.state.last_result().unwrap().token;

        let t = t.state.reduce(AppEvent::AnalysisReady {
            token: SessionToken(token.0 + 10),
            text: "stale".into(),
        });
        assert_eq!(t.state.last_result().unwrap().analysis, Analysis::Pending);

        let t = t.state.reduce(AppEvent::AnalysisReady {
            token,
            text: "Review gas laws".into(),
        });
        assert_eq!(
            t.state.last_result().unwrap().analysis,
            Analysis::Ready("Review gas laws".into())
        );
    }

    #[test]
    fn retry_keeps_subject_and_topics() {
        let t = state().reduce(AppEvent::NavigateMasteryMap);
        let t = t.state.reduce(AppEvent::SelectTopic("bio_cell".into()));
        let token = token_of(&t.command);
        let mut t = t.state.reduce(AppEvent::QuestionsLoaded {
            token,
            result: Ok(batch()),
        });
        for a in [0, 1, 2] {
            t = t.state.reduce(AppEvent::Answer(a));
            t = t.state.reduce(AppEvent::Advance { at: now() });
        }
        assert_eq!(t.state.view(), View::QuizResult);

        let t = t.state.reduce(AppEvent::Retry);
        assert_eq!(t.state.view(), View::QuizSession);
        assert_eq!(t.state.subject(), Subject::Biology);
        assert_eq!(t.state.topics(), ["Cell Physiology"]);
        assert_ne!(token_of(&t.command), token);
    }

    #[test]
    fn home_returns_to_dashboard() {
        let t = play(state(), Subject::Math, &[0, 1, 2]);
        let t = t.state.reduce(AppEvent::Home);
        assert_eq!(t.state.view(), View::Dashboard);
        assert!(t.state.last_result().is_some());
    }

    #[test]
    fn late_batch_after_exit_changes_nothing() {
        let t = state().reduce(AppEvent::QuickStart(Subject::Math));
        let token = token_of(&t.command);
        let t = t.state.reduce(AppEvent::ExitSession);
        assert_eq!(t.state.view(), View::Dashboard);
        let before = t.state.progress().clone();

        let t = t.state.reduce(AppEvent::QuestionsLoaded {
            token,
            result: Ok(batch()),
        });
        assert_eq!(t.state.view(), View::Dashboard);
        assert!(t.state.session().is_none());
        assert_eq!(t.state.progress(), &before);
        assert!(t.command.is_none());
    }

    #[test]
    fn late_batch_does_not_reach_newer_session() {
        let t = state().reduce(AppEvent::QuickStart(Subject::Math));
        let old = token_of(&t.command);
        let t = t.state.reduce(AppEvent::NavigateDashboard);
        let t = t.state.reduce(AppEvent::QuickStart(Subject::Physics));
        let new = token_of(&t.command);
        assert_ne!(old, new);

        let t = t.state.reduce(AppEvent::QuestionsLoaded {
            token: old,
            result: Ok(batch()),
        });
        assert!(t.state.session().unwrap().is_loading());

        let t = t.state.reduce(AppEvent::QuestionsLoaded {
            token: new,
            result: Ok(batch()),
        });
        assert_eq!(t.state.session().unwrap().phase(), &SessionPhase::Active);
    }

    #[test]
    fn generation_failure_offers_only_exit() {
        let t = state().reduce(AppEvent::QuickStart(Subject::Chemistry));
        let token = token_of(&t.command);
        let t = t.state.reduce(AppEvent::QuestionsLoaded {
            token,
            result: Ok(vec![]),
        });
        assert!(matches!(
            t.state.session().unwrap().phase(),
            SessionPhase::Failed { .. }
        ));

        let t = t.state.reduce(AppEvent::Answer(0));
        assert!(t.state.notice().is_some());
        let t = t.state.reduce(AppEvent::Retry);
        assert_eq!(t.state.view(), View::QuizSession);
        assert!(t.command.is_none());

        let t = t.state.reduce(AppEvent::ExitSession);
        assert_eq!(t.state.view(), View::Dashboard);
        assert_eq!(t.state.progress().recent_activity().len(), 0);
    }

    #[test]
    fn navbar_discards_running_session() {
        let t = state().reduce(AppEvent::QuickStart(Subject::Math));
        let token = token_of(&t.command);
        let t = t.state.reduce(AppEvent::QuestionsLoaded {
            token,
            result: Ok(batch()),
        });
        let t = t.state.reduce(AppEvent::Answer(0));
        let t = t.state.reduce(AppEvent::NavigateMasteryMap);
        assert_eq!(t.state.view(), View::MasteryMap);
        assert!(t.state.session().is_none());
        assert_eq!(t.state.progress().xp(), 0);
        assert_eq!(t.state.subject(), Subject::Math);
    }

    #[test]
    fn advance_before_answer_is_rejected() {
        let t = state().reduce(AppEvent::QuickStart(Subject::Math));
        let token = token_of(&t.command);
        let t = t.state.reduce(AppEvent::QuestionsLoaded {
            token,
            result: Ok(batch()),
        });
        let t = t.state.reduce(AppEvent::Advance { at: now() });
        assert_eq!(t.state.view(), View::QuizSession);
        assert!(t.state.notice().unwrap().contains("not been answered"));
        assert_eq!(t.state.session().unwrap().current_index(), 0);
    }

    #[test]
    fn quick_start_outside_dashboard_is_rejected() {
        let t = state().reduce(AppEvent::NavigateMasteryMap);
        let t = t.state.reduce(AppEvent::QuickStart(Subject::Physics));
        assert_eq!(t.state.view(), View::MasteryMap);
        assert!(t.command.is_none());
    }

    #[test]
    fn describe_topic_filter() {
        assert_eq!(describe_topics(&[]), "general mix");
        assert_eq!(describe_topics(&["Gas Laws".to_string()]), "Gas Laws");
    }
}
