//! Application layer errors.
//!
//! These errors represent failures in orchestration, not business logic.
//! Business logic errors are `DomainError` from `crate::domain`.

use std::path::PathBuf;
use thiserror::Error;

use crate::domain::ValidationErrors;
use crate::error::ErrorCategory;

/// Errors that occur during application orchestration.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ApplicationError {
    #[error("Template not found: {id}")]
    TemplateNotFound { id: String },

    #[error("Template already exists: {id}")]
    TemplateExists { id: String },

    /// The document's MIME type is not on the allow-list.
    #[error("Unsupported document format: {mime}")]
    UnsupportedFormat { mime: String },

    /// Text could not be extracted, or the extracted text was empty.
    #[error("Text extraction failed: {reason}")]
    ExtractionFailed { reason: String },

    #[error("Document is {size} bytes, the limit is {limit} bytes")]
    DocumentTooLarge { size: u64, limit: u64 },

    /// Strict drafting refused answers that failed validation.
    #[error("{} answer(s) failed validation", errors.len())]
    AnswersRejected { errors: ValidationErrors },

    /// A generative collaborator failed. Services turn this into a fallback;
    /// it only escapes from the collaborator adapters themselves.
    #[error("{name} failed: {reason}")]
    Collaborator { name: &'static str, reason: String },

    #[error("Storage error at {path}: {reason}")]
    Storage { path: PathBuf, reason: String },

    /// Store access failed (lock poisoned, etc.).
    #[error("Store lock poisoned")]
    StoreLockError,
}

impl ApplicationError {
    /// Get user-actionable suggestions.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::TemplateNotFound { id } => vec![
                format!("No template with id '{}'", id),
                "Try: lexidraft templates list".into(),
            ],
            Self::TemplateExists { id } => vec![
                format!("'{}' is already stored", id),
                "Remove it first with: lexidraft templates remove".into(),
            ],
            Self::UnsupportedFormat { mime } => vec![
                format!("'{}' is not an accepted document type", mime),
                "Add it to documents.allowed_mime_types, or convert the file to text".into(),
            ],
            Self::ExtractionFailed { .. } => vec![
                "The document produced no usable text".into(),
                "Scanned PDFs need OCR before upload".into(),
            ],
            Self::DocumentTooLarge { limit, .. } => vec![
                format!("Upload a file smaller than {} MB", limit / (1024 * 1024)),
                "Or raise documents.max_file_size_mb".into(),
            ],
            Self::AnswersRejected { errors } => errors
                .iter()
                .map(|(key, message)| format!("{key}: {message}"))
                .collect(),
            Self::Storage { path, .. } => vec![
                format!("Failed to access: {}", path.display()),
                "Check that the data directory exists and is writable".into(),
            ],
            Self::StoreLockError => vec![
                "The template store is locked".into(),
                "Try again in a moment".into(),
            ],
            Self::Collaborator { .. } => vec!["Check the error details above".into()],
        }
    }

    /// Get error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::TemplateNotFound { .. } => ErrorCategory::NotFound,
            Self::TemplateExists { .. }
            | Self::UnsupportedFormat { .. }
            | Self::ExtractionFailed { .. }
            | Self::DocumentTooLarge { .. }
            | Self::AnswersRejected { .. } => ErrorCategory::Validation,
            Self::Collaborator { .. } | Self::Storage { .. } | Self::StoreLockError => {
                ErrorCategory::Internal
            }
        }
    }
}
