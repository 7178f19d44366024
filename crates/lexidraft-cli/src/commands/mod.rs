//! Command handlers, one module per subcommand.
//!
//! Handlers translate arguments into service calls and render the results.
//! No business logic lives here.

use std::{fs, path::Path};

use lexidraft_core::domain::{AnswerSet, ValidationErrors};

use crate::{
    cli::AnswerArgs,
    error::{CliError, CliResult, IntoCli},
    output::OutputManager,
};

pub mod completions;
pub mod config;
pub mod draft;
pub mod history;
pub mod id;
pub mod init;
pub mod matching;
pub mod questions;
pub mod templates;
pub mod upload;
pub mod validate;

/// Answers from `--answers FILE`, overlaid with every `--set key=value`.
pub fn load_answers(args: &AnswerArgs) -> CliResult<AnswerSet> {
    let mut answers = match &args.answers {
        Some(path) => {
            let raw = read_text(path)?;
            serde_json::from_str::<AnswerSet>(&raw).map_err(|e| CliError::UnreadableFile {
                path: path.clone(),
                reason: format!("not a JSON object of answers: {e}"),
            })?
        }
        None => AnswerSet::new(),
    };

    for (key, value) in &args.set {
        answers.insert(key.clone(), value.clone());
    }
    Ok(answers)
}

pub fn read_text(path: &Path) -> CliResult<String> {
    fs::read_to_string(path).map_err(|e| CliError::UnreadableFile {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Print each failed field as `key: message`.
pub fn report_validation(errors: &ValidationErrors, output: &OutputManager) -> CliResult<()> {
    for (key, message) in errors.iter() {
        output.warning(&format!("{key}: {message}"))?;
    }
    Ok(())
}

/// Ask a yes/no question on stdin. An empty answer means yes.
pub fn confirm(prompt: &str) -> CliResult<bool> {
    use std::io::{self, Write};

    print!("{prompt} [Y/n] ");
    io::stdout()
        .flush()
        .with_cli_context(|| "failed to flush stdout")?;

    let mut input = String::new();
    io::stdin()
        .read_line(&mut input)
        .with_cli_context(|| "failed to read confirmation input")?;

    let input = input.trim().to_ascii_lowercase();
    Ok(input.is_empty() || input == "y" || input == "yes")
}
