//! The `sciprep play` command: the interactive study loop.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use sciprep_core::catalog::initial_progress;
use sciprep_core::driver::{self, Services};
use sciprep_core::gateway::TutorGateway;
use sciprep_core::model::Subject;
use sciprep_core::navigation::{AppEvent, AppState, Transition};
use sciprep_core::traits::LlmProvider;
use sciprep_providers::config::load_config_from;
use sciprep_providers::create_provider;

use crate::input::{self, Input};
use crate::screens;

pub async fn execute(
    subject: Option<Subject>,
    model: Option<String>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let mut config = load_config_from(config_path.as_deref())?;
    if let Some(model) = model {
        config.default_model = model;
    }

    let provider_config = match config.require_credential() {
        Ok(provider) => provider,
        Err(e) => {
            print!("{}", screens::configuration_error(&e));
            return Err(e.into());
        }
    };

    let provider: Arc<dyn LlmProvider> = Arc::from(
        create_provider(provider_config)
            .with_context(|| format!("failed to create provider '{}'", config.default_provider))?,
    );
    let gateway = Arc::new(TutorGateway::new(
        provider,
        config.default_model.clone(),
        config.temperature,
    ));
    let settings = config.session_settings();
    tracing::info!(
        provider = %gateway.provider_name(),
        model = %config.default_model,
        questions = settings.question_count,
        "starting study session"
    );
    let services = Services::new(gateway.clone(), gateway, settings.clone());

    let progress = initial_progress(chrono::Local::now().date_naive());
    let mut state = AppState::new(progress, settings.question_count);
    let (tx, mut rx) = mpsc::unbounded_channel::<AppEvent>();

    if let Some(subject) = subject {
        state = dispatch(state, AppEvent::QuickStart(subject), &services, &tx);
    }
    print!("{}", screens::render(&state));
    println!("Type `help` for commands.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("failed to read input")? else {
                    break;
                };
                match input::parse(&line, state.view(), state.subject(), Utc::now()) {
                    Ok(Input::Quit) => break,
                    Ok(Input::Help) => println!("{}", input::help(state.view())),
                    Ok(Input::Event(event)) => {
                        state = dispatch(state, event, &services, &tx);
                        print!("{}", screens::render(&state));
                    }
                    Err(message) => println!("{message}"),
                }
            }
            Some(event) = rx.recv() => {
                state = dispatch(state, event, &services, &tx);
                print!("{}", screens::render(&state));
            }
        }
    }

    let progress = state.progress();
    println!(
        "Bye! Level {} with {} XP this run.",
        progress.level(),
        progress.xp()
    );
    Ok(())
}

/// Reduce one event and start the command it asks for, if any.
///
/// The command runs on its own task; its result comes back through `tx`.
fn dispatch(
    state: AppState,
    event: AppEvent,
    services: &Services,
    tx: &mpsc::UnboundedSender<AppEvent>,
) -> AppState {
    let Transition { state, command } = state.reduce(event);
    if let Some(command) = command {
        let services = services.clone();
        let tx = tx.clone();
        tokio::spawn(async move {
            let event = driver::execute(&services, command).await;
            // The receiver only goes away when the loop has ended.
            let _ = tx.send(event);
        });
    }
    state
}
