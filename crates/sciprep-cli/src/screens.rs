//! Text rendering of the four views.

use std::fmt::Write as _;

use comfy_table::{Cell, Table};

use sciprep_core::error::StudyError;
use sciprep_core::mastery_map::{mastery_map, TopicTile};
use sciprep_core::model::{Subject, UserProgress};
use sciprep_core::navigation::{describe_topics, Analysis, AppState, LastResult, View};
use sciprep_core::progress::{earned_xp, LevelProgress};
use sciprep_core::session::{QuizSession, SessionPhase};

const OPTION_LABELS: [char; 4] = ['A', 'B', 'C', 'D'];

/// Render whatever the current view shows, plus any rejection notice.
pub fn render(state: &AppState) -> String {
    let mut out = match state.view() {
        View::Dashboard => dashboard(state),
        View::QuizSession => match state.session() {
            Some(session) => quiz_session(session),
            None => String::from("No quiz in progress.\n"),
        },
        View::QuizResult => match state.last_result() {
            Some(last) => quiz_result(last),
            None => String::from("No result yet.\n"),
        },
        View::MasteryMap => mastery(state.progress()),
    };
    if let Some(notice) = state.notice() {
        let _ = writeln!(out, "! {notice}");
    }
    out
}

fn dashboard(state: &AppState) -> String {
    let progress = state.progress();
    let level = LevelProgress::of(progress);
    let mut out = String::new();

    let _ = writeln!(
        out,
        "== Dashboard ==  Level {}  |  {} / {} XP ({:.0}%)  |  {} day streak",
        level.level,
        level.xp,
        level.next_level_xp,
        level.percent,
        progress.streak()
    );

    let mut table = Table::new();
    table.set_header(vec!["Subject", "Mastery"]);
    for subject in Subject::ALL {
        table.add_row(vec![
            Cell::new(subject.label()),
            Cell::new(format!("{}%", progress.subject_mastery(subject))),
        ]);
    }
    let _ = writeln!(out, "{table}");

    let weak = progress.latest_weak_topics();
    if weak.is_empty() {
        let _ = writeln!(out, "Weak spots: none recorded yet");
    } else {
        let _ = writeln!(out, "Weak spots: {}", weak.join(", "));
    }
    let _ = writeln!(
        out,
        "Last quiz: {} ({})",
        state.subject().label(),
        describe_topics(state.topics())
    );
    out
}

fn quiz_session(session: &QuizSession) -> String {
    let mut out = String::new();
    match session.phase() {
        SessionPhase::Loading => {
            let _ = writeln!(
                out,
                "Generating {} {} questions ({})...",
                session.requested(),
                session.subject().label(),
                describe_topics(session.topics())
            );
        }
        SessionPhase::Failed { message, reason } => {
            let _ = writeln!(out, "{message}");
            let _ = writeln!(out, "  ({reason})");
            let _ = writeln!(out, "Type `exit` to return to the dashboard.");
        }
        SessionPhase::Completed => {
            let _ = writeln!(out, "Quiz complete.");
        }
        SessionPhase::Active => {
            let Some(question) = session.current_question() else {
                return out;
            };
            let _ = writeln!(
                out,
                "== {} ==  Question {}/{}  [{}]  {}  |  score {}",
                session.subject().label(),
                session.current_index() + 1,
                session.total(),
                question.difficulty,
                question.topic_tag,
                session.score()
            );
            let _ = writeln!(out, "{}", question.text);
            for (label, option) in OPTION_LABELS.iter().zip(&question.options) {
                let _ = writeln!(out, "  {label}) {option}");
            }

            if let Some(selected) = session.selected() {
                let correct = usize::from(question.correct_index);
                if selected == correct {
                    let _ = writeln!(out, "Correct!");
                } else {
                    let _ = writeln!(
                        out,
                        "Not quite. You chose {}, the answer is {}.",
                        OPTION_LABELS[selected], OPTION_LABELS[correct]
                    );
                }
                if !question.explanation.is_empty() {
                    let _ = writeln!(out, "Explanation: {}", question.explanation);
                }
                let next = if session.is_last_question() {
                    "finish"
                } else {
                    "the next question"
                };
                let _ = writeln!(out, "Press Enter for {next}.");
            }
        }
    }
    out
}

fn quiz_result(last: &LastResult) -> String {
    let outcome = &last.outcome;
    let mut out = String::new();
    let _ = writeln!(
        out,
        "== {} result ==  {}/{} correct ({}%)  |  +{} XP",
        last.subject.label(),
        outcome.correct_count,
        outcome.total,
        outcome.accuracy_percent(),
        earned_xp(outcome)
    );
    let weak = outcome.weak_topics();
    if !weak.is_empty() {
        let _ = writeln!(out, "Topics to review: {}", weak.join(", "));
    }
    match &last.analysis {
        Analysis::Pending => {
            let _ = writeln!(out, "Analyzing your answers...");
        }
        Analysis::Ready(text) => {
            let _ = writeln!(out, "Tutor analysis:\n{text}");
        }
    }
    let _ = writeln!(out, "`retry` for another round, Enter for the dashboard.");
    out
}

fn mastery(progress: &UserProgress) -> String {
    let mut table = Table::new();
    table.set_header(vec!["Id", "Topic", "Subject", "Status"]);
    for (subject, tiles) in mastery_map(progress) {
        for tile in tiles {
            table.add_row(tile_row(subject, &tile));
        }
    }
    format!("== Mastery map ==\n{table}\nType a topic id to start a quiz on it.\n")
}

fn tile_row(subject: Subject, tile: &TopicTile) -> Vec<Cell> {
    vec![
        Cell::new(tile.topic.id),
        Cell::new(tile.topic.name),
        Cell::new(subject.label()),
        Cell::new(tile.displayed),
    ]
}

/// Shown instead of any view when no credential is available.
pub fn configuration_error(err: &StudyError) -> String {
    format!(
        "== Configuration error ==\n{err}\n\
         sciprep needs an API key for its question generator.\n\
         Set SCIPREP_API_KEY or run `sciprep init` and edit sciprep.toml.\n"
    )
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use sciprep_core::catalog::initial_progress;
    use sciprep_core::error::StudyError;
    use sciprep_core::model::{Difficulty, Question};
    use sciprep_core::navigation::AppEvent;
    use sciprep_core::session::SessionToken;

    use super::*;

    fn state() -> AppState {
        AppState::new(
            initial_progress(NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()),
            3,
        )
    }

    fn question() -> Question {
        Question {
            id: "b-0".into(),
            text: "Which gas law relates P and V at constant T?".into(),
            options: [
                "Boyle".into(),
                "Charles".into(),
                "Gay-Lussac".into(),
                "Avogadro".into(),
            ],
            correct_index: 0,
            explanation: "PV = const at fixed T".into(),
            difficulty: Difficulty::Easy,
            topic_tag: "Gas laws".into(),
        }
    }

    #[test]
    fn dashboard_shows_level_and_mastery() {
        let text = render(&state());
        assert!(text.contains("Level 1"));
        assert!(text.contains("0 / 500 XP"));
        assert!(text.contains("Math"));
        assert!(text.contains("20%"));
        assert!(text.contains("none recorded yet"));
    }

    #[test]
    fn session_screens_follow_phase() {
        let loading = state().reduce(AppEvent::QuickStart(Subject::Chemistry)).state;
        assert!(render(&loading).contains("Generating 3"));

        let active = loading
            .reduce(AppEvent::QuestionsLoaded {
                token: SessionToken(1),
                result: Ok(vec![question()]),
            })
            .state;
        let text = render(&active);
        assert!(text.contains("Question 1/1"));
        assert!(text.contains("A) Boyle"));

        let answered = active.reduce(AppEvent::Answer(1)).state;
        let text = render(&answered);
        assert!(text.contains("the answer is A"));
        assert!(text.contains("PV = const"));
        assert!(text.contains("finish"));
    }

    #[test]
    fn failed_session_offers_exit() {
        let failed = state()
            .reduce(AppEvent::QuickStart(Subject::Math))
            .state
            .reduce(AppEvent::QuestionsLoaded {
                token: SessionToken(1),
                result: Err(StudyError::GenerationFailed("offline".into())),
            })
            .state;
        let text = render(&failed);
        assert!(text.contains("offline"));
        assert!(text.contains("exit"));
    }

    #[test]
    fn mastery_map_lists_first_topics_as_learning() {
        let text = render(&state().reduce(AppEvent::NavigateMasteryMap).state);
        assert!(text.contains("math_num"));
        assert!(text.contains("learning"));
        assert!(text.contains("locked"));
    }

    #[test]
    fn rejected_event_shows_notice() {
        let text = render(&state().reduce(AppEvent::Retry).state);
        assert!(text.contains("! nothing to retry"));
    }

    #[test]
    fn configuration_error_names_the_variable() {
        let text = configuration_error(&StudyError::Configuration("no API key".into()));
        assert!(text.contains("SCIPREP_API_KEY"));
        assert!(text.contains("no API key"));
    }
}
