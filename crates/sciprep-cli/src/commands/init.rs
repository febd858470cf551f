//! The `sciprep init` command.

use anyhow::Result;

use sciprep_providers::config::LOCAL_CONFIG_FILE;

pub fn execute() -> Result<()> {
    if std::path::Path::new(LOCAL_CONFIG_FILE).exists() {
        println!("{LOCAL_CONFIG_FILE} already exists, skipping.");
    } else {
        std::fs::write(LOCAL_CONFIG_FILE, SAMPLE_CONFIG)?;
        println!("Created {LOCAL_CONFIG_FILE}");
    }

    println!("\nNext steps:");
    println!("  1. Export GEMINI_API_KEY (or edit {LOCAL_CONFIG_FILE})");
    println!("  2. Run: sciprep check-config");
    println!("  3. Run: sciprep play");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# sciprep configuration

default_provider = "gemini"
default_model = "gemini-2.5-flash"
temperature = 0.7
questions_per_session = 3
generation_timeout_secs = 60
analysis_timeout_secs = 30

[providers.gemini]
type = "gemini"
api_key = "${GEMINI_API_KEY}"

[providers.anthropic]
type = "anthropic"
api_key = "${ANTHROPIC_API_KEY}"

[providers.openai]
type = "openai"
api_key = "${OPENAI_API_KEY}"
"#;
