//! `lexidraft match`: pick the stored template that fits a request.

use serde_json::json;
use tracing::instrument;

use crate::{
    app::App,
    cli::{GlobalArgs, MatchArgs},
    config::AppConfig,
    error::CliResult,
    output::OutputManager,
};

#[instrument(skip_all)]
pub fn execute(
    args: MatchArgs,
    global: &GlobalArgs,
    config: AppConfig,
    output: &OutputManager,
) -> CliResult<()> {
    let app = App::open(global, config)?;
    let found = app.assist(args.reply.as_deref())?.match_query(&args.query)?;

    // No match is an answer, not a failure.
    let Some(m) = found else {
        if output.is_json() {
            output.json(&json!({ "match": null }))?;
        } else {
            output.info("No stored template matches that request")?;
        }
        return Ok(());
    };

    if output.is_json() {
        output.json(&json!({
            "match": {
                "templateId": m.template.template_id,
                "title": m.template.title,
                "confidence": m.confidence,
                "reasoning": m.reasoning,
            }
        }))?;
        return Ok(());
    }

    output.success(&format!(
        "{} ({}), confidence {}",
        m.template.title, m.template.template_id, m.confidence
    ))?;
    if !m.reasoning.is_empty() {
        output.print(&format!("  {}", m.reasoning))?;
    }
    output.print(&format!(
        "  Next: lexidraft questions {}",
        m.template.template_id
    ))?;
    Ok(())
}
