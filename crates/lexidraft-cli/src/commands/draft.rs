//! `lexidraft draft`: render a template with answers and keep the result.

use std::fs;

use tracing::{info, instrument};

use lexidraft_core::{
    application::{ApplicationError, DraftMode},
    domain::{AnswerSet, TemplateId},
    error::LexiError,
};

use crate::{
    app::App,
    cli::{DraftArgs, GlobalArgs},
    commands::{load_answers, report_validation},
    config::AppConfig,
    error::{CliError, CliResult},
    output::OutputManager,
};

#[instrument(skip_all, fields(template_id = %args.answers.id, lenient = args.lenient))]
pub fn execute(
    args: DraftArgs,
    global: &GlobalArgs,
    config: AppConfig,
    output: &OutputManager,
) -> CliResult<()> {
    let mut answers = load_answers(&args.answers)?;
    let app = App::open(global, config)?;
    let id = TemplateId::new(args.answers.id.clone());

    if args.interactive {
        prompt_for_missing(&app, &id, &mut answers)?;
    }

    let mode = if args.lenient {
        DraftMode::Lenient
    } else {
        DraftMode::Strict
    };

    let outcome = match app.drafts(mode).generate(&id, answers, args.query) {
        Ok(outcome) => outcome,
        Err(LexiError::Application(ApplicationError::AnswersRejected { errors })) => {
            report_validation(&errors, output)?;
            return Err(LexiError::from(ApplicationError::AnswersRejected { errors }).into());
        }
        Err(e) => return Err(e.into()),
    };

    if !outcome.validation.is_valid() {
        report_validation(&outcome.validation, output)?;
    }

    let draft = &outcome.draft;
    match &args.output {
        Some(path) => {
            fs::write(path, &draft.draft_markdown).map_err(|e| CliError::IoError {
                message: format!("failed to write draft to '{}'", path.display()),
                source: e,
            })?;
            info!(draft_id = %draft.id, path = %path.display(), "Draft written");
            if output.is_json() {
                output.json(draft)?;
            } else {
                output.success(&format!("Draft written to {}", path.display()))?;
            }
        }
        None if output.is_json() => output.json(draft)?,
        None => output.result(&draft.draft_markdown)?,
    }
    Ok(())
}

#[cfg(feature = "interactive")]
fn prompt_for_missing(app: &App, id: &TemplateId, answers: &mut AnswerSet) -> CliResult<()> {
    use dialoguer::{Input, Select, theme::ColorfulTheme};

    let questions = app.assist(None)?.clarifying_questions(id, answers)?;
    let theme = ColorfulTheme::default();

    for q in questions {
        let value = match &q.enum_values {
            Some(values) if !values.is_empty() => {
                let picked = Select::with_theme(&theme)
                    .with_prompt(&q.question)
                    .items(values)
                    .default(0)
                    .interact()
                    .map_err(prompt_failed)?;
                values[picked].clone()
            }
            _ => {
                let mut input = Input::<String>::with_theme(&theme)
                    .with_prompt(&q.question)
                    .allow_empty(!q.required);
                if let Some(example) = &q.example {
                    input = input.with_initial_text(example);
                }
                input.interact_text().map_err(prompt_failed)?
            }
        };

        // Skipped optional answers stay unanswered.
        if !value.trim().is_empty() {
            answers.insert(q.key, value);
        }
    }
    Ok(())
}

#[cfg(feature = "interactive")]
fn prompt_failed(e: dialoguer::Error) -> CliError {
    CliError::InvalidInput {
        message: format!("prompt failed: {e}"),
        source: Some(Box::new(e)),
    }
}

#[cfg(not(feature = "interactive"))]
fn prompt_for_missing(_app: &App, _id: &TemplateId, _answers: &mut AnswerSet) -> CliResult<()> {
    Err(CliError::FeatureNotAvailable {
        feature: "interactive",
    })
}
