//! Turns a line typed at the prompt into an application event.

use chrono::{DateTime, Utc};

use sciprep_core::model::{Subject, OPTION_COUNT};
use sciprep_core::navigation::{AppEvent, View};

/// What the user asked for.
#[derive(Debug)]
pub enum Input {
    Event(AppEvent),
    Help,
    Quit,
}

/// Parse one line in the context of the current view.
///
/// `current_subject` is used when `start` is typed without a subject.
pub fn parse(
    line: &str,
    view: View,
    current_subject: Subject,
    now: DateTime<Utc>,
) -> Result<Input, String> {
    let line = line.trim();
    let lower = line.to_ascii_lowercase();
    let mut words = lower.split_whitespace();
    let head = words.next().unwrap_or("");
    let arg = words.next();

    match head {
        "q" | "quit" => return Ok(Input::Quit),
        "h" | "help" | "?" => return Ok(Input::Help),
        "dashboard" => return Ok(Input::Event(AppEvent::NavigateDashboard)),
        "m" | "map" => return Ok(Input::Event(AppEvent::NavigateMasteryMap)),
        _ => {}
    }

    match view {
        View::Dashboard => {
            let subject = match (head, arg) {
                ("", _) => return Ok(Input::Help),
                ("start" | "s", None) => current_subject,
                ("start" | "s", Some(name)) => name.parse().map_err(|e| format!("{e}"))?,
                (name, None) => name
                    .parse()
                    .map_err(|_| format!("unknown command: {line}"))?,
                _ => return Err(format!("unknown command: {line}")),
            };
            Ok(Input::Event(AppEvent::QuickStart(subject)))
        }

        View::MasteryMap => {
            let topic = match (head, arg) {
                ("", _) => return Err("type a topic id, e.g. math_num".to_string()),
                ("start" | "s", Some(id)) => id,
                (id, None) => id,
                _ => return Err(format!("unknown command: {line}")),
            };
            Ok(Input::Event(AppEvent::SelectTopic(topic.to_string())))
        }

        View::QuizSession => match head {
            "" | "n" | "next" => Ok(Input::Event(AppEvent::Advance { at: now })),
            "x" | "exit" => Ok(Input::Event(AppEvent::ExitSession)),
            choice => option_index(choice)
                .map(|i| Input::Event(AppEvent::Answer(i)))
                .ok_or_else(|| format!("answer with a-d or 1-{OPTION_COUNT}")),
        },

        View::QuizResult => match head {
            "r" | "retry" => Ok(Input::Event(AppEvent::Retry)),
            "" | "home" => Ok(Input::Event(AppEvent::Home)),
            _ => Err(format!("unknown command: {line}")),
        },
    }
}

/// `a`-`d` or `1`-`4` to a zero-based option index.
fn option_index(choice: &str) -> Option<usize> {
    let mut chars = choice.chars();
    let c = chars.next()?;
    if chars.next().is_some() {
        return None;
    }
    let index = match c {
        'a'..='z' => c as usize - 'a' as usize,
        '1'..='9' => c as usize - '1' as usize,
        _ => return None,
    };
    (index < OPTION_COUNT).then_some(index)
}

/// Commands available in a view.
pub fn help(view: View) -> &'static str {
    match view {
        View::Dashboard => {
            "start [subject]   quick quiz (math, physics, chemistry, biology)\n\
             <subject>         same as start <subject>\n\
             map               open the mastery map\n\
             quit              leave sciprep"
        }
        View::MasteryMap => {
            "<topic id>        quiz on one unlocked topic\n\
             dashboard         back to the dashboard\n\
             quit              leave sciprep"
        }
        View::QuizSession => {
            "a-d or 1-4        answer the current question\n\
             next (or Enter)   go to the next question\n\
             exit              abandon the quiz\n\
             quit              leave sciprep"
        }
        View::QuizResult => {
            "retry             new quiz with the same subject and topics\n\
             home (or Enter)   back to the dashboard\n\
             map               open the mastery map\n\
             quit              leave sciprep"
        }
    }
}
