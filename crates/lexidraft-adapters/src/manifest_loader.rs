//! Filesystem-based template manifest loader.
//!
//! Discovers `template.toml` manifests in a directory tree and turns each into
//! a domain [`Template`], ready to be stored. This is how hand-written
//! templates enter the system without going through document analysis.
//!
//! # Directory layout expected
//!
//! ```text
//! catalogue/
//! ├── residential-lease/
//! │   ├── template.toml        ← manifest (required)
//! │   └── body.md              ← markdown body with {{key}} tokens
//! └── notices/
//!     └── insurer-incident/
//!         ├── template.toml
//!         └── notice.md        ← named by `body` in the manifest
//! ```
//!
//! # `template.toml` format
//!
//! ```toml
//! [template]
//! title        = "Residential Lease"
//! id           = "tpl_residential_lease_v1"  # optional; derived from title
//! description  = "11-month lease"            # optional
//! doc_type     = "lease"                     # optional; default "document"
//! jurisdiction = "IN"                        # optional
//! tags         = ["rental", "housing"]       # optional
//! body         = "body.md"                   # optional; default "body.md"
//!
//! [[variables]]
//! key       = "monthly_rent"
//! label     = "Monthly Rent"
//! data_type = "number"        # string | number | date | email
//! required  = true
//! example   = "25000"
//! regex     = "[0-9]+"        # optional
//! enum      = ["a", "b"]      # optional
//! ```

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use tracing::{debug, instrument, warn};
use walkdir::WalkDir;

use lexidraft_core::domain::{DomainError, Template, VariableDraftInput, normalize_all};

const MANIFEST_FILE: &str = "template.toml";
const DEFAULT_BODY_FILE: &str = "body.md";

/// How deep below the root manifests are searched for.
const MAX_DEPTH: usize = 4;

// ── Manifest types ────────────────────────────────────────────────────────────

/// Deserialised representation of a `template.toml` file.
#[derive(Debug, Deserialize, Clone)]
pub struct TemplateManifest {
    pub template: TemplateSection,
    #[serde(default)]
    pub variables: Vec<VariableDraftInput>,
}

/// `[template]` section.
#[derive(Debug, Deserialize, Clone)]
pub struct TemplateSection {
    pub title: String,
    pub id: Option<String>,
    pub description: Option<String>,
    pub doc_type: Option<String>,
    pub jurisdiction: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Body file, relative to the manifest.
    pub body: Option<PathBuf>,
}

/// A template read from a manifest, plus the variables that were dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedTemplate {
    pub template: Template,
    /// One entry per `[[variables]]` table that failed normalization.
    pub rejected: Vec<DomainError>,
}

// ── Loader ────────────────────────────────────────────────────────────────────

/// Loads templates from `template.toml` manifests under a root directory.
pub struct ManifestLoader {
    root: PathBuf,
}

impl ManifestLoader {
    /// Create a loader pointed at `root`.
    ///
    /// The directory does not need to exist yet; [`load_all`](Self::load_all)
    /// returns an error if it is missing when called.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Load every valid template found under the root.
    ///
    /// A root that itself holds a `template.toml` yields exactly that one
    /// template.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidTemplate`] if the root does not exist.
    /// Individual manifests that are missing a body or are malformed are
    /// **skipped with a `WARN` log** rather than failing the whole batch.
    #[instrument(skip(self), fields(root = %self.root.display()))]
    pub fn load_all(&self) -> Result<Vec<LoadedTemplate>, DomainError> {
        if !self.root.is_dir() {
            return Err(DomainError::InvalidTemplate(format!(
                "template directory not found: {}",
                self.root.display()
            )));
        }

        if self.root.join(MANIFEST_FILE).is_file() {
            return load_template_from_dir(&self.root).map(|t| vec![t]);
        }

        let mut templates = Vec::new();

        let manifests = WalkDir::new(&self.root)
            .min_depth(2)
            .max_depth(MAX_DEPTH)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!(error = %e, "skipping unreadable path");
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file() && entry.file_name() == MANIFEST_FILE);

        for entry in manifests {
            let Some(dir) = entry.path().parent() else {
                continue;
            };

            match load_template_from_dir(dir) {
                Ok(loaded) => {
                    debug!(template_id = %loaded.template.template_id, "loaded template");
                    templates.push(loaded);
                }
                Err(e) => {
                    // One bad template must not block all others.
                    warn!(
                        dir   = %dir.display(),
                        error = %e,
                        "skipping template directory due to load error"
                    );
                }
            }
        }

        debug!(count = templates.len(), "finished loading templates");
        Ok(templates)
    }
}

/// Load a single template from a directory holding `template.toml`.
///
/// Invalid variables are dropped and reported in
/// [`LoadedTemplate::rejected`]; the rest of the template is kept.
#[instrument(fields(dir = %dir.display()))]
pub fn load_template_from_dir(dir: &Path) -> Result<LoadedTemplate, DomainError> {
    let manifest_path = dir.join(MANIFEST_FILE);
    let raw = fs::read_to_string(&manifest_path).map_err(|e| {
        DomainError::InvalidTemplate(format!(
            "failed to read '{}': {e}",
            manifest_path.display()
        ))
    })?;

    let manifest: TemplateManifest = toml::from_str(&raw).map_err(|e| {
        DomainError::InvalidTemplate(format!(
            "failed to parse '{}': {e}",
            manifest_path.display()
        ))
    })?;

    let body_path = dir.join(
        manifest
            .template
            .body
            .as_deref()
            .unwrap_or(Path::new(DEFAULT_BODY_FILE)),
    );
    let body = fs::read_to_string(&body_path).map_err(|e| {
        DomainError::InvalidTemplate(format!("failed to read body '{}': {e}", body_path.display()))
    })?;

    let normalized = normalize_all(manifest.variables);
    for e in &normalized.rejected {
        warn!(manifest = %manifest_path.display(), error = %e, "dropping manifest variable");
    }

    let section = manifest.template;
    let mut builder = Template::builder()
        .title(section.title)
        .doc_type(section.doc_type.unwrap_or_default())
        .jurisdiction(section.jurisdiction)
        .tags(section.tags)
        .body(body)
        .variables(normalized.accepted);

    if let Some(id) = section.id {
        builder = builder.id(id);
    }
    if let Some(description) = section.description {
        builder = builder.description(description);
    }

    Ok(LoadedTemplate {
        template: builder.build()?,
        rejected: normalized.rejected,
    })
}
