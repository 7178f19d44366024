//! Application ports (traits) for external dependencies.
//!
//! In hexagonal architecture, ports define interfaces that the application
//! needs from the outside world. Adapters in `lexidraft-adapters` implement these.
//!
//! ## Port Types
//!
//! - **Driven (Output) Ports**: Called by application, implemented by infrastructure
//!   - `TemplateStore`, `DraftStore`: Persistence
//!   - `TextExtractor`: Document text extraction
//!   - `VariableProposer`, `TemplateMatcher`, `QuestionPhraser`: Generative collaborators
//!
//! - **Driving (Input) Ports**: Called by external world, implemented by application
//!   - (Defined in CLI layer, implemented by services)

pub mod output;

pub use output::{
    DraftStore, MatchReply, QuestionPhraser, TemplateMatcher, TemplateStore, TextExtractor,
    VariableProposal, VariableProposer,
};

#[cfg(test)]
pub use output::{
    MockDraftStore, MockQuestionPhraser, MockTemplateMatcher, MockTemplateStore,
    MockTextExtractor, MockVariableProposer,
};
