//! CLI argument definitions using the clap derive API.
//!
//! This module is the *only* place that knows about argument names, aliases,
//! help text, and value enums.  No business logic lives here.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

pub mod global;
pub use global::{GlobalArgs, OutputFormat};

// ── Top-level CLI ─────────────────────────────────────────────────────────────

/// Main CLI entry-point.
#[derive(Debug, Parser)]
#[command(
    name    = "lexidraft",
    bin_name = "lexidraft",
    version  = env!("CARGO_PKG_VERSION"),
    author   = env!("CARGO_PKG_AUTHORS"),
    about    = "Turn legal documents into templates and fill them into drafts",
    long_about = "Lexidraft turns an uploaded document into a reusable template with \
                  named {{placeholders}}, then renders drafts from it after checking \
                  every answer against the variable's type, pattern and allowed values.",
    after_help = "EXAMPLES:\n\
        \x20 lexidraft upload lease.md --reply proposal.json\n\
        \x20 lexidraft templates list\n\
        \x20 lexidraft draft tpl_residential_lease_v1 --set tenant_name=\"Asha Rao\" --set monthly_rent=25000\n\
        \x20 lexidraft completions bash > /usr/share/bash-completion/completions/lexidraft",
    arg_required_else_help = true,
    subcommand_required    = true,
)]
pub struct Cli {
    /// Flags available on every subcommand.
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

// ── Subcommands ───────────────────────────────────────────────────────────────

/// All available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Analyse a document and store it as a template.
    #[command(
        visible_alias = "up",
        about = "Turn a document into a template",
        after_help = "EXAMPLES:\n\
            \x20 lexidraft upload notice.txt\n\
            \x20 lexidraft upload lease.md --reply proposal.json --dry-run\n\
            \x20 lexidraft upload contract --mime text/plain"
    )]
    Upload(UploadArgs),

    /// Manage stored templates.
    #[command(subcommand, visible_alias = "t", about = "Manage stored templates")]
    Templates(TemplateCommands),

    /// Print the identifier a title would get.
    #[command(
        about = "Derive a template identifier",
        after_help = "EXAMPLES:\n\
            \x20 lexidraft id \"Residential Lease\"            # tpl_residential_lease_v1\n\
            \x20 lexidraft id \"Residential Lease\" 3           # tpl_residential_lease_v3"
    )]
    Id(IdArgs),

    /// Check answers against a template without rendering.
    #[command(
        about = "Validate answers for a template",
        after_help = "EXAMPLES:\n\
            \x20 lexidraft validate tpl_lease_v1 --answers answers.json\n\
            \x20 lexidraft validate tpl_lease_v1 --set start_date=2025-01-05"
    )]
    Validate(AnswerArgs),

    /// Render a draft from a template.
    #[command(
        about = "Generate a draft",
        after_help = "EXAMPLES:\n\
            \x20 lexidraft draft tpl_lease_v1 --answers answers.json --output lease.md\n\
            \x20 lexidraft draft tpl_lease_v1 --interactive\n\
            \x20 lexidraft draft tpl_lease_v1 --set tenant_name=Ann --lenient"
    )]
    Draft(DraftArgs),

    /// List the questions still open for a template.
    #[command(
        visible_alias = "q",
        about = "Show clarifying questions for unanswered variables"
    )]
    Questions(AnswerArgs),

    /// Find the stored template best suited to a request.
    #[command(
        about = "Match a request to a template",
        after_help = "EXAMPLES:\n\
            \x20 lexidraft match \"I need a rental agreement\"\n\
            \x20 lexidraft match \"notify my insurer\" --reply match.json"
    )]
    Match(MatchArgs),

    /// Show drafts rendered from a template.
    #[command(about = "List drafts generated from a template")]
    History(HistoryArgs),

    /// Initialise a Lexidraft configuration file.
    #[command(
        about = "Initialise configuration",
        after_help = "EXAMPLES:\n\
            \x20 lexidraft init                       # default location\n\
            \x20 lexidraft init --path ./lexidraft.toml\n\
            \x20 lexidraft init --force"
    )]
    Init(InitArgs),

    /// Generate shell completion scripts.
    #[command(
        about = "Generate shell completions",
        after_help = "EXAMPLES:\n\
            \x20 lexidraft completions bash > ~/.local/share/bash-completion/completions/lexidraft\n\
            \x20 lexidraft completions zsh  > ~/.zfunc/_lexidraft\n\
            \x20 lexidraft completions fish > ~/.config/fish/completions/lexidraft.fish"
    )]
    Completions(CompletionsArgs),

    /// Inspect the Lexidraft configuration.
    #[command(
        about = "Configuration management",
        subcommand,
        after_help = "EXAMPLES:\n\
            \x20 lexidraft config get documents.chunk_size\n\
            \x20 lexidraft config list\n\
            \x20 lexidraft config path"
    )]
    Config(ConfigCommands),
}

// ── upload ────────────────────────────────────────────────────────────────────

/// Arguments for `lexidraft upload`.
#[derive(Debug, Args)]
pub struct UploadArgs {
    /// Document to analyse.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// MIME type, when the extension does not give it away.
    #[arg(long = "mime", value_name = "TYPE")]
    pub mime: Option<String>,

    /// Use a recorded model reply instead of the configured proposer.
    #[arg(long = "reply", value_name = "FILE")]
    pub reply: Option<PathBuf>,

    /// Show the analysis without storing a template.
    #[arg(long = "dry-run", help = "Show the analysis without storing")]
    pub dry_run: bool,
}

// ── templates ─────────────────────────────────────────────────────────────────

/// Subcommands for `lexidraft templates`.
#[derive(Debug, Subcommand)]
pub enum TemplateCommands {
    /// List stored templates.
    #[command(visible_alias = "ls")]
    List(ListArgs),

    /// Show one template with its variables.
    Show {
        /// Template identifier.
        id: String,

        /// Also print the markdown body.
        #[arg(long = "body")]
        body: bool,
    },

    /// Create a template from a markdown body and a variable list.
    Create(CreateArgs),

    /// Import `template.toml` manifests from a directory.
    Import {
        /// Directory holding one manifest, or a tree of them.
        #[arg(value_name = "DIR")]
        dir: PathBuf,
    },

    /// Remove a template.
    #[command(visible_alias = "rm")]
    Remove {
        /// Template identifier.
        id: String,

        /// Skip the confirmation prompt.
        #[arg(short = 'y', long = "yes")]
        yes: bool,
    },
}

/// Arguments for `lexidraft templates list`.
#[derive(Debug, Args)]
pub struct ListArgs {
    /// Number of templates to skip.
    #[arg(long = "skip", default_value_t = 0)]
    pub skip: usize,

    /// Maximum number of templates to show.
    #[arg(long = "limit", default_value_t = 100)]
    pub limit: usize,

    /// Listing layout.
    #[arg(long = "format", value_enum, default_value = "table")]
    pub format: ListFormat,
}

/// Output format for the `templates list` command.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ListFormat {
    /// Human-readable table.
    Table,
    /// One identifier per line.
    List,
    /// JSON array.
    Json,
    /// CSV rows.
    Csv,
}

/// Arguments for `lexidraft templates create`.
#[derive(Debug, Args)]
pub struct CreateArgs {
    /// Template title.
    #[arg(long = "title")]
    pub title: String,

    /// Markdown body with `{{key}}` placeholders.
    #[arg(long = "body", value_name = "FILE")]
    pub body: PathBuf,

    /// JSON array of variable definitions.
    #[arg(long = "variables", value_name = "FILE")]
    pub variables: Option<PathBuf>,

    /// Explicit identifier; derived from the title when absent.
    #[arg(long = "id")]
    pub id: Option<String>,

    #[arg(long = "description")]
    pub description: Option<String>,

    #[arg(long = "doc-type", value_name = "TYPE")]
    pub doc_type: Option<String>,

    #[arg(long = "jurisdiction")]
    pub jurisdiction: Option<String>,

    /// Similarity tag; repeat for several.
    #[arg(long = "tag", value_name = "TAG")]
    pub tags: Vec<String>,
}

// ── id ────────────────────────────────────────────────────────────────────────

/// Arguments for `lexidraft id`.
#[derive(Debug, Args)]
pub struct IdArgs {
    /// Template title.
    pub title: String,

    /// Identifier version.
    #[arg(default_value_t = 1)]
    pub version: u32,
}

// ── answers ───────────────────────────────────────────────────────────────────

/// A template plus the answers supplied for it.
#[derive(Debug, Args)]
pub struct AnswerArgs {
    /// Template identifier.
    pub id: String,

    /// JSON object of answers, keyed by variable.
    #[arg(short = 'a', long = "answers", value_name = "FILE")]
    pub answers: Option<PathBuf>,

    /// Single answer as `key=value`; repeat for several. Wins over `--answers`.
    #[arg(short = 's', long = "set", value_name = "KEY=VALUE", value_parser = parse_key_val)]
    pub set: Vec<(String, String)>,
}

/// Arguments for `lexidraft draft`.
#[derive(Debug, Args)]
pub struct DraftArgs {
    #[command(flatten)]
    pub answers: AnswerArgs,

    /// Render even when answers fail validation.
    #[arg(long = "lenient")]
    pub lenient: bool,

    /// Prompt for every unanswered variable.
    #[arg(short = 'i', long = "interactive")]
    pub interactive: bool,

    /// The request that led to this draft, kept with it.
    #[arg(long = "query", value_name = "TEXT")]
    pub query: Option<String>,

    /// Write the draft here instead of stdout.
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output: Option<PathBuf>,
}

// ── match / history ───────────────────────────────────────────────────────────

/// Arguments for `lexidraft match`.
#[derive(Debug, Args)]
pub struct MatchArgs {
    /// Free-text request.
    pub query: String,

    /// Use a recorded model reply instead of the configured matcher.
    #[arg(long = "reply", value_name = "FILE")]
    pub reply: Option<PathBuf>,
}

/// Arguments for `lexidraft history`.
#[derive(Debug, Args)]
pub struct HistoryArgs {
    /// Template identifier.
    pub id: String,
}

// ── init ──────────────────────────────────────────────────────────────────────

/// Arguments for `lexidraft init`.
#[derive(Debug, Args)]
pub struct InitArgs {
    /// Where to write the file; defaults to the platform config directory.
    #[arg(long = "path", value_name = "FILE")]
    pub path: Option<PathBuf>,

    /// Overwrite an existing config file.
    #[arg(short = 'f', long = "force", help = "Overwrite existing configuration")]
    pub force: bool,
}

// ── completions ───────────────────────────────────────────────────────────────

/// Arguments for `lexidraft completions`.
#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell.
    #[arg(value_enum, help = "Shell to generate completions for")]
    pub shell: Shell,
}

/// Supported shells for completion generation.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

// ── config subcommands ────────────────────────────────────────────────────────

/// Subcommands for `lexidraft config`.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print the value of a configuration key.
    Get {
        /// Dotted key path, e.g. `documents.chunk_size`.
        key: String,
    },
    /// Print all configuration values.
    List,
    /// Print the path to the active configuration file.
    Path,
}

// ── value parsers ─────────────────────────────────────────────────────────────

/// `key=value`, split on the first `=`. The value may be empty.
fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{s}'"))?;

    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing key in '{s}'"));
    }
    Ok((key.to_string(), value.to_string()))
}

// ── tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn parse_upload_command() {
        let cli = Cli::parse_from(["lexidraft", "upload", "lease.md", "--dry-run"]);
        let Commands::Upload(args) = cli.command else {
            panic!("expected Upload command");
        };
        assert_eq!(args.file, PathBuf::from("lease.md"));
        assert!(args.dry_run);
    }

    #[test]
    fn set_values_split_on_first_equals() {
        let cli = Cli::parse_from([
            "lexidraft",
            "draft",
            "tpl_lease_v1",
            "--set",
            "note=a=b",
            "-s",
            "empty=",
        ]);
        let Commands::Draft(args) = cli.command else {
            panic!("expected Draft command");
        };
        assert_eq!(
            args.answers.set,
            vec![
                ("note".to_string(), "a=b".to_string()),
                ("empty".to_string(), String::new())
            ]
        );
    }

    #[test]
    fn set_without_equals_is_rejected() {
        let result = Cli::try_parse_from(["lexidraft", "validate", "tpl_x_v1", "--set", "oops"]);
        assert!(result.is_err());
    }

    #[test]
    fn templates_alias_and_remove() {
        let cli = Cli::parse_from(["lexidraft", "t", "rm", "tpl_x_v1", "-y"]);
        assert!(matches!(
            cli.command,
            Commands::Templates(TemplateCommands::Remove { yes: true, .. })
        ));
    }

    #[test]
    fn data_dir_is_global() {
        let cli = Cli::parse_from(["lexidraft", "history", "tpl_x_v1", "--data-dir", "/tmp/lx"]);
        assert_eq!(cli.global.data_dir, Some(PathBuf::from("/tmp/lx")));
    }

    #[test]
    fn quiet_and_verbose_conflict() {
        // clap should reject --quiet --verbose together
        let result = Cli::try_parse_from(["lexidraft", "--quiet", "--verbose", "templates", "list"]);
        assert!(result.is_err());
    }
}
