//! Core domain layer for Lexidraft.
//!
//! This module contains the deterministic heart of the system: the variable
//! model, answer validation, placeholder rendering, template identifiers and
//! the authoring helper. Every operation here is a pure function over its
//! arguments.
//!
//! ## Hexagonal Architecture Compliance
//!
//! - **No async**: Domain logic is synchronous
//! - **No I/O**: No filesystem, network, or external calls
//! - **No shared state**: Safe to call from any number of threads
//! - **Untrusted input stops at the boundary**: proposals become
//!   `VariableDefinition`s only through `normalize`

pub mod authoring;
pub mod entities;
pub mod error;
pub mod render;
pub mod validation;
pub mod value_objects;

pub use authoring::build_template_body;
pub use entities::{
    draft::{AnswerSet, AnswerValue, DATE_FORMAT, DraftInstance},
    template::{DEFAULT_DOC_TYPE, Template, TemplateBuilder, TemplateId, generate_id},
    variable::{NormalizedVariables, VariableDefinition, VariableDraftInput, normalize_all},
};
pub use error::{DomainError, ErrorCategory};
pub use render::{placeholder_keys, render};
pub use validation::{DomainValidator, ValidationErrors, validate_answers};
pub use value_objects::{Confidence, DataType};
