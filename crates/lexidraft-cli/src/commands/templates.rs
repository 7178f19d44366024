//! `lexidraft templates`: list, inspect, create, import and remove templates.

use chrono::Local;
use serde::Serialize;
use tracing::{info, instrument, warn};

use lexidraft_adapters::ManifestLoader;
use lexidraft_core::{
    domain::{Template, TemplateId, VariableDraftInput, normalize_all},
    error::LexiError,
};

use crate::{
    app::App,
    cli::{CreateArgs, GlobalArgs, ListArgs, ListFormat, TemplateCommands},
    commands::{confirm, read_text},
    config::AppConfig,
    error::{CliError, CliResult},
    output::OutputManager,
};

pub fn execute(
    cmd: TemplateCommands,
    global: &GlobalArgs,
    config: AppConfig,
    output: &OutputManager,
) -> CliResult<()> {
    let app = App::open(global, config)?;

    match cmd {
        TemplateCommands::List(args) => list(&app, args, output),
        TemplateCommands::Show { id, body } => show(&app, &id.into(), body, output),
        TemplateCommands::Create(args) => create(&app, args, output),
        TemplateCommands::Import { dir } => import(&app, &dir, output),
        TemplateCommands::Remove { id, yes } => remove(&app, &id.into(), yes, global, output),
    }
}

/// One row of `templates list`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TemplateSummary<'a> {
    template_id: &'a str,
    title: &'a str,
    doc_type: &'a str,
    variables: usize,
    created_at: String,
}

impl<'a> From<&'a Template> for TemplateSummary<'a> {
    fn from(t: &'a Template) -> Self {
        Self {
            template_id: t.template_id.as_str(),
            title: &t.title,
            doc_type: &t.doc_type,
            variables: t.variables.len(),
            created_at: t.created_at.to_rfc3339(),
        }
    }
}

fn list(app: &App, args: ListArgs, output: &OutputManager) -> CliResult<()> {
    let templates = app.templates().list(args.skip, args.limit)?;

    if output.is_json() {
        let rows: Vec<TemplateSummary> = templates.iter().map(TemplateSummary::from).collect();
        output.json(&rows)?;
        return Ok(());
    }

    match args.format {
        ListFormat::Table => {
            if templates.is_empty() {
                output.info("No templates stored yet. Try: lexidraft upload <FILE>")?;
                return Ok(());
            }
            output.header("Stored Templates:")?;
            for t in &templates {
                output.result(&format!(
                    "  {:<40} {:<12} {:>3} vars  {}  {}",
                    t.template_id.as_str(),
                    t.doc_type,
                    t.variables.len(),
                    t.created_at.with_timezone(&Local).format("%Y-%m-%d %H:%M"),
                    t.title
                ))?;
            }
        }
        ListFormat::List => {
            for t in &templates {
                output.result(t.template_id.as_str())?;
            }
        }
        ListFormat::Json => {
            let rows: Vec<TemplateSummary> = templates.iter().map(TemplateSummary::from).collect();
            output.json(&rows)?;
        }
        ListFormat::Csv => {
            output.result("template_id,title,doc_type,variables,created_at")?;
            for t in &templates {
                output.result(&format!(
                    "{},{},{},{},{}",
                    t.template_id,
                    csv_field(&t.title),
                    csv_field(&t.doc_type),
                    t.variables.len(),
                    t.created_at.to_rfc3339()
                ))?;
            }
        }
    }

    Ok(())
}

fn show(app: &App, id: &TemplateId, with_body: bool, output: &OutputManager) -> CliResult<()> {
    let template = app.templates().get(id)?;

    if output.is_json() {
        output.json(&template)?;
        return Ok(());
    }

    output.header(&format!("{} ({})", template.title, template.template_id))?;
    if let Some(description) = &template.description {
        output.print(&format!("  {description}"))?;
    }
    output.print(&format!("  Type:         {}", template.doc_type))?;
    if let Some(jurisdiction) = &template.jurisdiction {
        output.print(&format!("  Jurisdiction: {jurisdiction}"))?;
    }
    if !template.similarity_tags.is_empty() {
        let tags: Vec<&str> = template.similarity_tags.iter().map(String::as_str).collect();
        output.print(&format!("  Tags:         {}", tags.join(", ")))?;
    }
    output.print(&format!(
        "  Created:      {}",
        template.created_at.with_timezone(&Local).format("%Y-%m-%d %H:%M")
    ))?;

    output.print("")?;
    output.print(&format!(
        "Variables ({} required):",
        template.required_variables().count()
    ))?;
    for var in &template.variables {
        let mut line = format!(
            "  {:<24} {:<8} {}",
            var.key,
            var.data_type.as_str(),
            var.label
        );
        if var.required {
            line.push_str(" *");
        }
        if let Some(example) = &var.example {
            line.push_str(&format!("  e.g. {example}"));
        }
        if let Some(values) = &var.enum_values {
            line.push_str(&format!("  one of: {}", values.join(" | ")));
        }
        output.result(&line)?;
    }

    for key in template.unbound_placeholders() {
        output.warning(&format!("Placeholder {{{{{key}}}}} has no variable and renders verbatim"))?;
    }

    if with_body {
        output.print("")?;
        output.result(&template.body_markdown)?;
    }
    Ok(())
}

#[instrument(skip_all, fields(title = %args.title))]
fn create(app: &App, args: CreateArgs, output: &OutputManager) -> CliResult<()> {
    let body = read_text(&args.body)?;

    let variables = match &args.variables {
        Some(path) => {
            let raw: Vec<VariableDraftInput> =
                serde_json::from_str(&read_text(path)?).map_err(|e| CliError::UnreadableFile {
                    path: path.clone(),
                    reason: format!("not a JSON array of variables: {e}"),
                })?;
            let normalized = normalize_all(raw);
            for e in &normalized.rejected {
                output.warning(&format!("Dropped variable: {e}"))?;
            }
            normalized.accepted
        }
        None => Vec::new(),
    };

    let service = app.templates();
    let mut builder = Template::builder()
        .title(args.title.clone())
        .jurisdiction(args.jurisdiction)
        .tags(args.tags)
        .body(body)
        .variables(variables);

    builder = match args.id {
        Some(id) => builder.id(id),
        None => builder.version(service.next_version(&args.title)?),
    };
    if let Some(description) = args.description {
        builder = builder.description(description);
    }
    if let Some(doc_type) = args.doc_type {
        builder = builder.doc_type(doc_type);
    }

    let template = service.create(builder.build().map_err(LexiError::from)?)?;
    info!(template_id = %template.template_id, "Template created");

    if output.is_json() {
        output.json(&template)?;
    } else {
        output.success(&format!("Created template {}", template.template_id))?;
        for key in template.unbound_placeholders() {
            output.warning(&format!("Placeholder {{{{{key}}}}} has no variable"))?;
        }
    }
    Ok(())
}

fn import(app: &App, dir: &std::path::Path, output: &OutputManager) -> CliResult<()> {
    let loaded = ManifestLoader::new(dir)
        .load_all()
        .map_err(LexiError::from)?;

    let service = app.templates();
    let mut imported = Vec::new();
    for loaded in loaded {
        let id = loaded.template.template_id.clone();
        for e in &loaded.rejected {
            output.warning(&format!("{id}: dropped variable: {e}"))?;
        }
        match service.create(loaded.template) {
            Ok(t) => imported.push(t.template_id),
            Err(e) => {
                warn!(template_id = %id, error = %e, "Skipping template");
                output.warning(&format!("Skipped {id}: {e}"))?;
            }
        }
    }

    if output.is_json() {
        output.json(&imported)?;
    } else if imported.is_empty() {
        output.warning(&format!("No templates imported from {}", dir.display()))?;
    } else {
        for id in &imported {
            output.success(&format!("Imported {id}"))?;
        }
    }
    Ok(())
}

fn remove(
    app: &App,
    id: &TemplateId,
    yes: bool,
    global: &GlobalArgs,
    output: &OutputManager,
) -> CliResult<()> {
    let template = app.templates().get(id)?;

    if !yes && !global.quiet && !confirm(&format!("Remove '{}' ({})?", template.title, id))? {
        return Err(CliError::Cancelled);
    }

    app.templates().remove(id)?;
    output.success(&format!("Removed {id}"))?;
    Ok(())
}

/// Quote a CSV field when it contains a separator, quote or newline.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
