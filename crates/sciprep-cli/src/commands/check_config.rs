//! The `sciprep check-config` command.

use std::path::PathBuf;

use anyhow::Result;

use sciprep_providers::config::load_config_from;

use crate::screens;

pub fn execute(config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;

    let provider = match config.require_credential() {
        Ok(provider) => provider,
        Err(e) => {
            print!("{}", screens::configuration_error(&e));
            return Err(e.into());
        }
    };

    let settings = config.session_settings();
    println!("Provider:   {} ({:?})", config.default_provider, provider);
    println!("Model:      {}", config.default_model);
    println!("Temperature: {}", config.temperature);
    println!("Questions:  {} per session", settings.question_count);
    println!(
        "Timeouts:   generation {}s, analysis {}s",
        settings.generation_timeout.as_secs(),
        settings.analysis_timeout.as_secs()
    );
    println!("Configuration OK");
    Ok(())
}
