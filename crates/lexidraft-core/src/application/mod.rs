//! Application layer for Lexidraft.
//!
//! This layer contains:
//! - **Services**: Use case orchestration (AuthoringService, DraftService, ...)
//! - **Ports**: Interface definitions (traits) for external dependencies
//! - **Errors**: Application-specific error types
//!
//! The application layer coordinates the domain layer but contains no
//! business logic itself. All business rules live in `crate::domain`.

pub mod error;
pub mod ports;
pub mod services;

pub use services::{
    AssistService, AuthoringService, DocumentAnalysis, DocumentLimits, DraftMode, DraftOutcome,
    DraftService, Question, TemplateMatch, TemplateService,
};

// Re-export port traits (for adapter implementation)
pub use ports::{
    DraftStore, MatchReply, QuestionPhraser, TemplateMatcher, TemplateStore, TextExtractor,
    VariableProposal, VariableProposer,
};

pub use error::ApplicationError;
