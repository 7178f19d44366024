//! Infrastructure adapters for Lexidraft.
//!
//! This crate implements the ports defined in `lexidraft-core::application::ports`.
//! It contains all external dependencies and I/O operations.

pub mod extractor;
pub mod generative;
pub mod manifest_loader;
pub mod store;

// Re-export commonly used adapters
pub use extractor::{PlainTextExtractor, mime_from_extension};
pub use generative::{
    GenerativeSettings, OfflineMatcher, OfflinePhraser, OfflineProposer, RecordedMatcher,
    RecordedProposer,
};
pub use manifest_loader::{LoadedTemplate, ManifestLoader, load_template_from_dir};
pub use store::{FileDraftStore, FileTemplateStore, InMemoryDraftStore, InMemoryTemplateStore};
