//! Template and draft storage adapters.

mod file;
mod memory;

pub use file::{FileDraftStore, FileTemplateStore};
pub use memory::{InMemoryDraftStore, InMemoryTemplateStore};
