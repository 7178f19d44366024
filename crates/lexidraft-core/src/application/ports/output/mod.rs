//! Driven (output) ports - implemented by infrastructure.
//!
//! These traits define what the application needs from external systems.
//! The `lexidraft-adapters` crate provides implementations.
//!
//! The three generative collaborators (`VariableProposer`, `TemplateMatcher`,
//! `QuestionPhraser`) are non-deterministic. Their failures are returned as
//! errors here and turned into deterministic fallbacks by the services, so
//! the core keeps working when they are unavailable.

use serde::{Deserialize, Serialize};

use crate::domain::{
    Confidence, DraftInstance, Template, TemplateId, VariableDefinition, VariableDraftInput,
};
use crate::error::LexiResult;

// ============================================================================
// Storage
// ============================================================================

/// Port for template storage and retrieval.
///
/// Implemented by:
/// - `lexidraft_adapters::store::InMemoryTemplateStore` (tests, ephemeral use)
/// - `lexidraft_adapters::store::FileTemplateStore` (JSON documents on disk)
///
/// A template is persisted together with its full variable list; a reader
/// never observes one without the other.
#[cfg_attr(test, mockall::automock)]
pub trait TemplateStore: Send + Sync {
    /// Get a specific template by ID.
    ///
    /// # Errors
    /// `TemplateNotFound` if no template has this ID.
    fn get(&self, id: &TemplateId) -> LexiResult<Template>;

    fn exists(&self, id: &TemplateId) -> LexiResult<bool>;

    /// List all stored templates, in no particular order.
    fn list(&self) -> LexiResult<Vec<Template>>;

    /// Insert a new template.
    ///
    /// # Errors
    /// `TemplateExists` if the ID is already taken.
    fn insert(&self, template: Template) -> LexiResult<()>;

    /// Remove a template and the variables it owns.
    fn remove(&self, id: &TemplateId) -> LexiResult<()>;
}

/// Append-only storage for rendered drafts.
#[cfg_attr(test, mockall::automock)]
pub trait DraftStore: Send + Sync {
    fn append(&self, draft: DraftInstance) -> LexiResult<()>;

    /// Drafts rendered from one template, oldest first.
    fn list_for(&self, template_id: &TemplateId) -> LexiResult<Vec<DraftInstance>>;
}

// ============================================================================
// Document extraction
// ============================================================================

/// Port for pulling plain text out of an uploaded document.
#[cfg_attr(test, mockall::automock)]
pub trait TextExtractor: Send + Sync {
    /// # Errors
    /// `UnsupportedFormat` for types the extractor cannot read,
    /// `ExtractionFailed` when reading fails.
    fn extract_text(&self, bytes: &[u8], mime_type: &str) -> LexiResult<String>;
}

// ============================================================================
// Generative collaborators
// ============================================================================

/// What a proposer suggests for one chunk of document text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VariableProposal {
    pub variables: Vec<VariableDraftInput>,
    pub title: Option<String>,
    #[serde(alias = "doc_type")]
    pub doc_type: Option<String>,
    pub jurisdiction: Option<String>,
    #[serde(alias = "similarity_tags")]
    pub similarity_tags: Vec<String>,
}

#[cfg_attr(test, mockall::automock)]
pub trait VariableProposer: Send + Sync {
    /// Suggest variables for `document_text`.
    ///
    /// `existing_keys` lists keys already proposed for earlier chunks of the
    /// same document so the proposer can reuse them.
    fn propose_variables(
        &self,
        document_text: &str,
        existing_keys: &[String],
    ) -> LexiResult<VariableProposal>;
}

/// A matcher's answer, before the confidence threshold is applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchReply {
    pub template_id: TemplateId,
    pub confidence: Confidence,
    #[serde(default)]
    pub reasoning: String,
}

#[cfg_attr(test, mockall::automock)]
pub trait TemplateMatcher: Send + Sync {
    /// Pick the candidate best suited to `query`, or `None`.
    fn match_template(
        &self,
        query: &str,
        candidates: &[Template],
    ) -> LexiResult<Option<MatchReply>>;
}

#[cfg_attr(test, mockall::automock)]
pub trait QuestionPhraser: Send + Sync {
    /// Phrase a question asking the user for `variable`.
    fn phrase_question(&self, variable: &VariableDefinition) -> LexiResult<String>;
}
