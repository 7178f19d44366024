//! `lexidraft validate`: check answers without rendering or storing anything.

use tracing::instrument;

use lexidraft_core::{application::ApplicationError, domain::TemplateId, error::LexiError};

use crate::{
    app::App,
    cli::{AnswerArgs, GlobalArgs},
    commands::{load_answers, report_validation},
    config::AppConfig,
    error::CliResult,
    output::OutputManager,
};

#[instrument(skip_all, fields(template_id = %args.id))]
pub fn execute(
    args: AnswerArgs,
    global: &GlobalArgs,
    config: AppConfig,
    output: &OutputManager,
) -> CliResult<()> {
    let answers = load_answers(&args)?;
    let app = App::open(global, config)?;

    let id = TemplateId::new(args.id);
    let errors = app.drafts(Default::default()).validate(&id, &answers)?;

    if output.is_json() {
        output.json(&errors)?;
    }
    if errors.is_valid() {
        if !output.is_json() {
            output.success(&format!("All answers for {id} are valid"))?;
        }
        return Ok(());
    }

    if !output.is_json() {
        report_validation(&errors, output)?;
    }
    Err(LexiError::from(ApplicationError::AnswersRejected { errors }).into())
}
