// ============================================================================
// domain/error.rs - DOMAIN ERRORS
// ============================================================================

use thiserror::Error;

/// Root domain error type.
///
/// All errors are:
/// - Cloneable (a rejected variable is reported and the batch continues)
/// - Categorizable (for CLI display)
/// - Actionable (provides suggestions)
///
/// Answer validation failures are *not* represented here. They are values
/// (`ValidationErrors`) returned to the caller, never raised.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    // ========================================================================
    // Validation Errors (400-level equivalent)
    // ========================================================================
    /// A proposed or authored variable failed basic shape checks.
    #[error("Invalid variable '{key}': {reason}")]
    InvalidVariable { key: String, reason: String },

    #[error("Invalid template: {0}")]
    InvalidTemplate(String),

    #[error("Duplicate variable key in template: {key}")]
    DuplicateVariableKey { key: String },

    // ========================================================================
    // Constraint Violations
    // ========================================================================
    #[error("Required field missing: {field}")]
    MissingRequiredField { field: &'static str },
}

impl DomainError {
    /// Shorthand used by normalization, where every rejection names the key.
    pub(crate) fn invalid_variable(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidVariable {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::InvalidVariable { key, reason } => vec![
                format!("Variable '{}' was dropped: {}", key, reason),
                "Keys must be snake_case, e.g. landlord_name or monthly_rent".into(),
                "Every variable needs a non-empty label".into(),
            ],
            Self::InvalidTemplate(msg) => vec![
                "Check the template definition".into(),
                format!("Details: {}", msg),
            ],
            Self::DuplicateVariableKey { key } => vec![
                format!("The key '{}' is defined more than once", key),
                "Rename or merge the duplicated variable".into(),
            ],
            Self::MissingRequiredField { field } => {
                vec![format!("Provide a value for '{}'", field)]
            }
        }
    }

    /// Error category for CLI display styling.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidVariable { .. }
            | Self::InvalidTemplate(_)
            | Self::DuplicateVariableKey { .. } => ErrorCategory::Validation,
            Self::MissingRequiredField { .. } => ErrorCategory::Internal,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Internal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_variable_message_names_key() {
        let err = DomainError::invalid_variable("rent", "label is empty");
        assert_eq!(err.to_string(), "Invalid variable 'rent': label is empty");
        assert_eq!(err.category(), ErrorCategory::Validation);
    }

    #[test]
    fn duplicate_key_suggests_rename() {
        let err = DomainError::DuplicateVariableKey { key: "x".into() };
        assert!(err.suggestions().iter().any(|s| s.contains("Rename")));
    }
}
