//! `lexidraft upload`: turn a document into a stored template.

use std::fs;

use tracing::{info, instrument};

use lexidraft_adapters::mime_from_extension;
use lexidraft_core::application::DocumentAnalysis;

use crate::{
    app::App,
    cli::{GlobalArgs, UploadArgs},
    config::AppConfig,
    error::{CliError, CliResult},
    output::OutputManager,
};

#[instrument(skip_all, fields(file = %args.file.display()))]
pub fn execute(
    args: UploadArgs,
    global: &GlobalArgs,
    config: AppConfig,
    output: &OutputManager,
) -> CliResult<()> {
    let mime = match args.mime {
        Some(mime) => mime,
        None => args
            .file
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(mime_from_extension)
            .map(str::to_string)
            .ok_or_else(|| CliError::InvalidInput {
                message: format!(
                    "cannot tell the document type of '{}'; pass --mime",
                    args.file.display()
                ),
                source: None,
            })?,
    };

    let bytes = fs::read(&args.file).map_err(|e| CliError::UnreadableFile {
        path: args.file.clone(),
        reason: e.to_string(),
    })?;

    let app = App::open(global, config)?;
    let authoring = app.authoring(args.reply.as_deref())?;

    let analysis = authoring.analyze_document(&bytes, &mime)?;
    for rejected in &analysis.rejected {
        output.warning(&format!("Dropped proposed variable: {rejected}"))?;
    }

    if args.dry_run {
        return show_analysis(&analysis, output);
    }

    let template = authoring.create_template(analysis)?;
    info!(template_id = %template.template_id, "Template stored");

    if output.is_json() {
        output.json(&template)?;
        return Ok(());
    }

    output.success(&format!(
        "Stored template {} with {} variable(s)",
        template.template_id,
        template.variables.len()
    ))?;
    output.print(&format!("  Title:    {}", template.title))?;
    output.print(&format!("  Type:     {}", template.doc_type))?;
    output.print(&format!("  Location: {}", app.data_dir().display()))?;
    Ok(())
}

fn show_analysis(analysis: &DocumentAnalysis, output: &OutputManager) -> CliResult<()> {
    if output.is_json() {
        output.json(analysis)?;
        return Ok(());
    }

    output.header(&format!("Analysis (not stored): {}", analysis.title))?;
    output.print(&format!("  Type:         {}", analysis.doc_type))?;
    if let Some(jurisdiction) = &analysis.jurisdiction {
        output.print(&format!("  Jurisdiction: {jurisdiction}"))?;
    }
    if !analysis.similarity_tags.is_empty() {
        let tags: Vec<&str> = analysis.similarity_tags.iter().map(String::as_str).collect();
        output.print(&format!("  Tags:         {}", tags.join(", ")))?;
    }

    output.print("")?;
    output.print("Variables:")?;
    if analysis.variables.is_empty() {
        output.print("  (none)")?;
    }
    for var in &analysis.variables {
        output.print(&format!(
            "  {:<24} {:<8} {}{}",
            var.key,
            var.data_type.as_str(),
            var.label,
            if var.required { " (required)" } else { "" }
        ))?;
    }
    Ok(())
}
