//! `lexidraft questions`: what is still unanswered for a template.

use lexidraft_core::domain::TemplateId;

use crate::{
    app::App,
    cli::{AnswerArgs, GlobalArgs},
    commands::load_answers,
    config::AppConfig,
    error::CliResult,
    output::OutputManager,
};

pub fn execute(
    args: AnswerArgs,
    global: &GlobalArgs,
    config: AppConfig,
    output: &OutputManager,
) -> CliResult<()> {
    let answers = load_answers(&args)?;
    let app = App::open(global, config)?;
    let questions = app
        .assist(None)?
        .clarifying_questions(&TemplateId::new(args.id), &answers)?;

    if output.is_json() {
        output.json(&questions)?;
        return Ok(());
    }

    if questions.is_empty() {
        output.success("Every variable is answered")?;
        return Ok(());
    }

    for q in &questions {
        let mut line = format!("{}: {}", q.key, q.question);
        if let Some(example) = &q.example {
            line.push_str(&format!(" (e.g. {example})"));
        }
        if q.required {
            line.push_str(" [required]");
        }
        output.result(&line)?;
    }
    Ok(())
}
