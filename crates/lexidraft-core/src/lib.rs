//! Lexidraft Core - Hexagonal Architecture Implementation
//!
//! This crate provides the domain and application layers for Lexidraft,
//! which turns legal documents into reusable templates and fills those
//! templates into drafts.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │          lexidraft-cli (CLI)            │
//! │     (Implements Driving Ports)          │
//! └──────────────────┬──────────────────────┘
//!                    │ calls
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Application Services            │
//! │  (Authoring, Template, Draft, Assist)   │
//! └──────────────────┬──────────────────────┘
//!                    │ uses
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │      Application Ports (Traits)         │
//! │ (Stores, Extractor, Proposer, Matcher)  │
//! └──────────────────┬──────────────────────┘
//!                    │ implemented by
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │   lexidraft-adapters (Infrastructure)   │
//! │  (File store, reply parsers, manifests) │
//! └─────────────────────────────────────────┘
//!                    │
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │        Domain Layer (Pure Logic)        │
//! │ (Variables, Validation, Render, Ids)    │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use lexidraft_core::prelude::*;
//!
//! let template = Template::builder()
//!     .title("Rent Reminder")
//!     .body("Dear {{tenant}}, rent of {{rent}} is due.")
//!     .variable(VariableDefinition::new("tenant", "Tenant").required())
//!     .variable(VariableDefinition::new("rent", "Rent").data_type(DataType::Number))
//!     .build()
//!     .unwrap();
//!
//! let answers = AnswerSet::new().with("tenant", "Ann").with("rent", 500);
//! assert!(validate_answers(&template.variables, &answers).is_valid());
//! assert_eq!(
//!     render(&template.body_markdown, &answers),
//!     "Dear Ann, rent of 500 is due."
//! );
//! ```

pub mod domain;

pub mod application;

pub mod error;

// Public API - what external crates should use
pub mod prelude {
    pub use crate::application::{
        AssistService, AuthoringService, DocumentLimits, DraftMode, DraftService,
        TemplateService,
        ports::{
            DraftStore, QuestionPhraser, TemplateMatcher, TemplateStore, TextExtractor,
            VariableProposer,
        },
    };
    pub use crate::domain::{
        AnswerSet, AnswerValue, DataType, DraftInstance, Template, TemplateId,
        ValidationErrors, VariableDefinition, VariableDraftInput, build_template_body,
        generate_id, render, validate_answers,
    };
    pub use crate::error::{LexiError, LexiResult};
}

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
