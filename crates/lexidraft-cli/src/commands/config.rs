//! `lexidraft config`: inspect the resolved configuration.

use crate::{
    cli::{ConfigCommands, GlobalArgs},
    config::AppConfig,
    error::{CliError, CliResult},
    output::OutputManager,
};

const MASK: &str = "********";

pub fn execute(
    cmd: ConfigCommands,
    global: &GlobalArgs,
    config: AppConfig,
    output: &OutputManager,
) -> CliResult<()> {
    match cmd {
        ConfigCommands::Get { key } => {
            let value = get_config_value(&config, &key)?;
            output.result(&value)?;
        }

        ConfigCommands::List => {
            let shown = masked(config);
            if output.is_json() {
                output.json(&shown)?;
                return Ok(());
            }
            output.header("Current Configuration:")?;
            let serialised = toml::to_string_pretty(&shown).map_err(|e| CliError::ConfigError {
                message: format!("Failed to serialise config: {e}"),
                source: Some(Box::new(e)),
            })?;
            output.result(serialised.trim_end())?;
        }

        ConfigCommands::Path => {
            let path = global.config.clone().unwrap_or_else(AppConfig::config_path);
            output.result(&path.display().to_string())?;
        }
    }

    Ok(())
}

// ── helpers ───────────────────────────────────────────────────────────────────

fn get_config_value(config: &AppConfig, key: &str) -> CliResult<String> {
    let optional = |v: &Option<String>| v.clone().unwrap_or_default();
    let secret = |v: &Option<String>| if v.is_some() { "set" } else { "unset" }.to_string();

    match key {
        "storage.data_dir" => Ok(config.data_dir(None).display().to_string()),
        "documents.max_file_size_mb" => Ok(config.documents.max_file_size_mb.to_string()),
        "documents.allowed_mime_types" => Ok(config.documents.allowed_mime_types.join(",")),
        "documents.chunk_size" => Ok(config.documents.chunk_size.to_string()),
        "generative.model" => Ok(optional(&config.generative.model)),
        "generative.api_key" => Ok(secret(&config.generative.api_key)),
        "generative.search_api_key" => Ok(secret(&config.generative.search_api_key)),
        "output.no_color" => Ok(config.output.no_color.to_string()),
        "logging.file" => Ok(config
            .logging
            .file
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_default()),
        _ => Err(CliError::ConfigError {
            message: format!("Unknown config key: '{key}'"),
            source: None,
        }),
    }
}

/// Secrets never reach the terminal.
fn masked(mut config: AppConfig) -> AppConfig {
    for secret in [
        &mut config.generative.api_key,
        &mut config.generative.search_api_key,
    ] {
        if secret.is_some() {
            *secret = Some(MASK.to_string());
        }
    }
    config
}

// ── tests ─────────────────────────────────────────────────────────────────────
