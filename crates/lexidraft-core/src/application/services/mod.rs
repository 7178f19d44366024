//! Application services - orchestrate use cases.
//!
//! Services coordinate the domain layer and ports to accomplish
//! high-level use cases like "turn this document into a template" or
//! "draft from these answers".

pub mod assist_service;
pub mod authoring_service;
pub mod draft_service;
pub mod template_service;

pub use assist_service::{AssistService, Question, TemplateMatch, fallback_question};
pub use authoring_service::{
    AuthoringService, DocumentAnalysis, DocumentLimits, FALLBACK_TITLE, chunk_text,
};
pub use draft_service::{DraftMode, DraftOutcome, DraftService};
pub use template_service::TemplateService;
