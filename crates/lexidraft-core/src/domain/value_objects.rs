//! Domain value objects: DataType and Confidence.
//!
//! # Design
//!
//! These are pure value types: `Copy`, equality-by-value, no identity.
//! This file's only job is to define the types, their string
//! representations, and their `FromStr` parsers.
//!
//! # Adding a new data type
//!
//! 1. Add the enum variant here
//! 2. Add the `as_str` arm and the `FromStr` arm here
//! 3. Add the type check arm in `validation.rs`

use crate::domain::error::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ── DataType ─────────────────────────────────────────────────────────────────

/// The declared type of a template variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    #[default]
    String,
    Number,
    Date,
    Email,
}

impl DataType {
    pub const ALL: [DataType; 4] = [Self::String, Self::Number, Self::Date, Self::Email];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Date => "date",
            Self::Email => "email",
        }
    }

    /// Format hint shown next to a question, if the type has one.
    pub const fn format_hint(&self) -> Option<&'static str> {
        match self {
            Self::Date => Some("YYYY-MM-DD"),
            Self::Number => Some("digits only, e.g. 25000"),
            Self::Email => Some("name@example.com"),
            Self::String => None,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "string" | "str" | "text" => Ok(Self::String),
            "number" | "float" | "int" | "integer" => Ok(Self::Number),
            "date" => Ok(Self::Date),
            "email" => Ok(Self::Email),
            other => Err(DomainError::InvalidTemplate(format!(
                "unknown data type: {other}"
            ))),
        }
    }
}

// ── Confidence ───────────────────────────────────────────────────────────────

/// Confidence reported by a template matcher, clamped to `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Confidence(f64);

impl Confidence {
    /// Scores below this are treated exactly like "no match".
    pub const MATCH_THRESHOLD: f64 = 0.6;

    /// Build a confidence score. NaN becomes 0.
    pub fn new(score: f64) -> Self {
        if score.is_nan() {
            Self(0.0)
        } else {
            Self(score.clamp(0.0, 1.0))
        }
    }

    pub const fn value(&self) -> f64 {
        self.0
    }

    /// Whether downstream logic may act on the match.
    pub fn is_actionable(&self) -> bool {
        self.0 >= Self::MATCH_THRESHOLD
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}
