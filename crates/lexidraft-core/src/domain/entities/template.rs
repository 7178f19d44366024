//! Template aggregate and identifier generation.
//!
//! A [`Template`] is a markdown body containing `{{key}}` placeholder tokens
//! plus the ordered [`VariableDefinition`]s that describe those tokens. The
//! variables are owned by the template: they are created with it and
//! dropped with it.
//!
//! ```text
//! Template (aggregate root)
//! ├── TemplateId            tpl_<slug>_v<n>, immutable once assigned
//! ├── title / docType / jurisdiction / similarityTags
//! ├── bodyMarkdown          "... {{landlord_name}} ..."
//! └── Vec<VariableDefinition>  (authoring order)
//! ```
//!
//! Construction goes through [`TemplateBuilder`], which enforces the
//! invariants that matter for storage (non-empty title, unique variable keys)
//! and derives the identifier from the title when none is supplied.
//! Placeholders without a matching variable are tolerated; rendering leaves
//! them visible.

use std::collections::{BTreeSet, HashSet};
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{entities::variable::VariableDefinition, error::DomainError, render};

/// Document type used when none is known.
pub const DEFAULT_DOC_TYPE: &str = "document";

// ============================================================================
// TemplateId
// ============================================================================

/// Stable external identifier of a template.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TemplateId(String);

impl TemplateId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Derive `tpl_<slug>_v<version>` from a title. See [`generate_id`].
    pub fn generate(title: &str, version: u32) -> Self {
        Self(generate_id(title, version))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TemplateId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for TemplateId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for TemplateId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Build a human-readable template identifier from a title.
///
/// Lowercases the title, strips everything that is not a letter, digit or
/// whitespace, and joins the remaining words with `_`. Edge whitespace is
/// dropped, so the slug never starts or ends with `_`. A title with no
/// usable characters yields the slug `untitled`.
///
/// ```
/// use lexidraft_core::domain::generate_id;
///
/// assert_eq!(
///     generate_id("Incident Notice to Insurer!", 1),
///     "tpl_incident_notice_to_insurer_v1"
/// );
/// ```
pub fn generate_id(title: &str, version: u32) -> String {
    let cleaned: String = title
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect();

    let slug = cleaned.split_whitespace().collect::<Vec<_>>().join("_");
    let slug = if slug.is_empty() { "untitled" } else { slug.as_str() };

    format!("tpl_{slug}_v{version}")
}

// ============================================================================
// Template
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub template_id: TemplateId,
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub doc_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jurisdiction: Option<String>,

    /// Free-form tags used for matching. Order is irrelevant.
    #[serde(default)]
    pub similarity_tags: BTreeSet<String>,

    pub body_markdown: String,

    #[serde(default)]
    pub variables: Vec<VariableDefinition>,

    pub created_at: DateTime<Utc>,
}

impl Template {
    pub fn builder() -> TemplateBuilder {
        TemplateBuilder::default()
    }

    /// Check the invariants a stored template must satisfy.
    ///
    /// Templates read back from storage or imported from disk bypass the
    /// builder, so stores call this before accepting one.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.template_id.as_str().trim().is_empty() {
            return Err(DomainError::MissingRequiredField {
                field: "templateId",
            });
        }
        if self.title.trim().is_empty() {
            return Err(DomainError::MissingRequiredField { field: "title" });
        }
        ensure_unique_keys(&self.variables)
    }

    pub fn variable(&self, key: &str) -> Option<&VariableDefinition> {
        self.variables.iter().find(|v| v.key == key)
    }

    pub fn variable_keys(&self) -> impl Iterator<Item = &str> {
        self.variables.iter().map(|v| v.key.as_str())
    }

    pub fn required_variables(&self) -> impl Iterator<Item = &VariableDefinition> {
        self.variables.iter().filter(|v| v.required)
    }

    /// Distinct placeholder keys referenced by the body.
    pub fn placeholder_keys(&self) -> Vec<String> {
        render::placeholder_keys(&self.body_markdown)
    }

    /// Placeholder keys in the body that no variable defines.
    ///
    /// Keys are compared case-insensitively, the same way rendering matches
    /// them.
    pub fn unbound_placeholders(&self) -> Vec<String> {
        let defined: HashSet<String> = self
            .variables
            .iter()
            .map(|v| v.key.to_lowercase())
            .collect();

        self.placeholder_keys()
            .into_iter()
            .filter(|k| !defined.contains(&k.to_lowercase()))
            .collect()
    }
}

fn ensure_unique_keys(variables: &[VariableDefinition]) -> Result<(), DomainError> {
    let mut seen = HashSet::new();
    for var in variables {
        if !seen.insert(var.key.as_str()) {
            return Err(DomainError::DuplicateVariableKey {
                key: var.key.clone(),
            });
        }
    }
    Ok(())
}

// ============================================================================
// TemplateBuilder
// ============================================================================

/// Fluent constructor for [`Template`].
///
/// The identifier is taken from [`id`](Self::id) when set, otherwise derived
/// from the title and [`version`](Self::version) (default 1).
#[derive(Debug, Default)]
pub struct TemplateBuilder {
    id: Option<TemplateId>,
    version: Option<u32>,
    title: Option<String>,
    description: Option<String>,
    doc_type: Option<String>,
    jurisdiction: Option<String>,
    similarity_tags: BTreeSet<String>,
    body_markdown: String,
    variables: Vec<VariableDefinition>,
    created_at: Option<DateTime<Utc>>,
}

impl TemplateBuilder {
    pub fn id(mut self, id: impl Into<TemplateId>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn version(mut self, version: u32) -> Self {
        self.version = Some(version);
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn doc_type(mut self, doc_type: impl Into<String>) -> Self {
        self.doc_type = Some(doc_type.into());
        self
    }

    pub fn jurisdiction(mut self, jurisdiction: Option<String>) -> Self {
        self.jurisdiction = jurisdiction;
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.similarity_tags.insert(tag.into());
        self
    }

    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.similarity_tags.extend(tags.into_iter().map(Into::into));
        self
    }

    pub fn body(mut self, body_markdown: impl Into<String>) -> Self {
        self.body_markdown = body_markdown.into();
        self
    }

    pub fn variable(mut self, variable: VariableDefinition) -> Self {
        self.variables.push(variable);
        self
    }

    pub fn variables(mut self, variables: impl IntoIterator<Item = VariableDefinition>) -> Self {
        self.variables.extend(variables);
        self
    }

    /// Restore the original creation time (for reconstruction from storage).
    pub fn created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    /// Consume the builder and construct the `Template`.
    ///
    /// # Errors
    ///
    /// - `MissingRequiredField` if the title is missing or blank
    /// - `DuplicateVariableKey` if two variables share a key
    pub fn build(self) -> Result<Template, DomainError> {
        let title = non_blank(self.title)
            .ok_or(DomainError::MissingRequiredField { field: "title" })?;

        ensure_unique_keys(&self.variables)?;

        let template_id = match self.id {
            Some(id) => id,
            None => TemplateId::generate(&title, self.version.unwrap_or(1)),
        };

        let template = Template {
            template_id,
            title,
            description: non_blank(self.description),
            doc_type: non_blank(self.doc_type).unwrap_or_else(|| DEFAULT_DOC_TYPE.to_string()),
            jurisdiction: non_blank(self.jurisdiction),
            similarity_tags: self
                .similarity_tags
                .into_iter()
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect(),
            body_markdown: self.body_markdown,
            variables: self.variables,
            created_at: self.created_at.unwrap_or_else(Utc::now),
        };

        let unbound = template.unbound_placeholders();
        if !unbound.is_empty() {
            debug!(
                template_id = %template.template_id,
                ?unbound,
                "template body references undefined variables"
            );
        }

        Ok(template)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_id_slugifies_title() {
        assert_eq!(
            generate_id("Incident Notice to Insurer!", 1),
            "tpl_incident_notice_to_insurer_v1"
        );
        assert_eq!(
            generate_id("  Rental   Agreement (2BHK) ", 3),
            "tpl_rental_agreement_2bhk_v3"
        );
    }

    #[test]
    fn generate_id_has_no_edge_underscores() {
        assert_eq!(generate_id("  Lease", 1), "tpl_lease_v1");
        assert_eq!(generate_id("Lease \t\n", 1), "tpl_lease_v1");
    }

    #[test]
    fn generate_id_handles_empty_slug() {
        assert_eq!(generate_id("!!!", 1), "tpl_untitled_v1");
        assert_eq!(generate_id("", 2), "tpl_untitled_v2");
    }

    #[test]
    fn generate_id_is_deterministic() {
        assert_eq!(generate_id("Lease Deed", 1), generate_id("Lease Deed", 1));
    }

    #[test]
    fn builder_derives_id_and_defaults_doc_type() {
        let t = Template::builder()
            .title("Lease Deed")
            .body("Between {{landlord}} and {{tenant}}")
            .build()
            .unwrap();

        assert_eq!(t.template_id.as_str(), "tpl_lease_deed_v1");
        assert_eq!(t.doc_type, DEFAULT_DOC_TYPE);
    }

    #[test]
    fn builder_respects_explicit_id_and_version() {
        let t = Template::builder().title("Lease").version(4).build().unwrap();
        assert_eq!(t.template_id.as_str(), "tpl_lease_v4");

        let t = Template::builder()
            .title("Lease")
            .id("custom_id")
            .build()
            .unwrap();
        assert_eq!(t.template_id.as_str(), "custom_id");
    }

    #[test]
    fn builder_requires_title() {
        let err = Template::builder().title("   ").build().unwrap_err();
        assert_eq!(err, DomainError::MissingRequiredField { field: "title" });
    }

    #[test]
    fn builder_rejects_duplicate_keys() {
        let err = Template::builder()
            .title("Lease")
            .variable(VariableDefinition::new("rent", "Rent"))
            .variable(VariableDefinition::new("rent", "Rent again"))
            .build()
            .unwrap_err();
        assert!(matches!(err, DomainError::DuplicateVariableKey { key } if key == "rent"));
    }

    #[test]
    fn unbound_placeholders_are_reported_not_rejected() {
        let t = Template::builder()
            .title("Lease")
            .body("{{Landlord}} lets to {{tenant}}")
            .variable(VariableDefinition::new("landlord", "Landlord"))
            .build()
            .unwrap();

        assert_eq!(t.unbound_placeholders(), vec!["tenant".to_string()]);
    }

    #[test]
    fn serializes_camel_case() {
        let t = Template::builder()
            .title("Lease")
            .doc_type("lease")
            .tags(["rental", "housing"])
            .build()
            .unwrap();
        let json = serde_json::to_value(&t).unwrap();

        assert_eq!(json["templateId"], "tpl_lease_v1");
        assert_eq!(json["docType"], "lease");
        assert!(json.get("bodyMarkdown").is_some());
        assert_eq!(json["similarityTags"], serde_json::json!(["housing", "rental"]));
    }
}
