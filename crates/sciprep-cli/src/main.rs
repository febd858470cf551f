//! sciprep CLI — an LLM-backed quiz trainer for science-class admission prep.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

use sciprep_core::model::Subject;

mod commands;
mod input;
mod screens;

#[derive(Parser)]
#[command(name = "sciprep", version, about = "Quiz trainer for science-class admission prep")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive study session
    Play {
        /// Jump straight into a quick quiz on this subject
        #[arg(long)]
        subject: Option<Subject>,

        /// Model override (e.g. "gemini-2.5-pro")
        #[arg(long)]
        model: Option<String>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Show the topic catalog as the mastery map presents it
    Topics {
        /// Only this subject
        #[arg(long)]
        subject: Option<Subject>,
    },

    /// List available models
    ListModels {
        /// Filter to specific provider
        #[arg(long)]
        provider: Option<String>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Check that a provider and API key are configured
    CheckConfig {
        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Create a starter sciprep.toml
    Init,
}

#[tokio::main]
async fn main() {
    let filter = tracing_subscriber::EnvFilter::from_default_env();
    let filter = match "sciprep=info".parse() {
        Ok(directive) => filter.add_directive(directive),
        Err(_) => filter,
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Play {
            subject,
            model,
            config,
        } => commands::play::execute(subject, model, config).await,
        Commands::Topics { subject } => commands::topics::execute(subject),
        Commands::ListModels { provider, config } => {
            commands::list_models::execute(provider, config)
        }
        Commands::CheckConfig { config } => commands::check_config::execute(config),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
