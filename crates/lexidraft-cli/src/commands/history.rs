//! `lexidraft history`: drafts previously rendered from a template.

use chrono::Local;

use lexidraft_core::domain::TemplateId;

use crate::{
    app::App,
    cli::{GlobalArgs, HistoryArgs},
    config::AppConfig,
    error::CliResult,
    output::OutputManager,
};

pub fn execute(
    args: HistoryArgs,
    global: &GlobalArgs,
    config: AppConfig,
    output: &OutputManager,
) -> CliResult<()> {
    let app = App::open(global, config)?;
    let id = TemplateId::new(args.id);

    // Unknown ids should say so rather than print an empty history.
    app.templates().get(&id)?;
    let drafts = app.drafts(Default::default()).history(&id)?;

    if output.is_json() {
        output.json(&drafts)?;
        return Ok(());
    }

    if drafts.is_empty() {
        output.info(&format!("No drafts generated from {id} yet"))?;
        return Ok(());
    }

    output.header(&format!("Drafts from {id}:"))?;
    for draft in &drafts {
        let mut line = format!(
            "  {}  {}  {} answer(s)",
            draft.id,
            draft.created_at.with_timezone(&Local).format("%Y-%m-%d %H:%M"),
            draft.answers.len()
        );
        if let Some(query) = &draft.user_query {
            line.push_str(&format!("  \"{query}\""));
        }
        output.result(&line)?;
    }
    Ok(())
}
