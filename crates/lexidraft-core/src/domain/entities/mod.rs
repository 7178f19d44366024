pub mod draft;
pub mod template;
pub mod variable;

pub use crate::domain::DomainError;
pub use draft::{AnswerSet, AnswerValue, DraftInstance};
pub use template::{Template, TemplateBuilder, TemplateId};
pub use variable::{NormalizedVariables, VariableDefinition, VariableDraftInput};
