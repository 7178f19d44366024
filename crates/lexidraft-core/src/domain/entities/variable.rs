//! Template variable model.
//!
//! A [`VariableDefinition`] describes one `{{key}}` slot of a template: its
//! display label, declared [`DataType`] and optional constraints.
//!
//! ## Trust boundary
//!
//! Variables proposed by an external generator arrive as loosely typed
//! [`VariableDraftInput`] values. The only way to turn one into a
//! `VariableDefinition` is [`VariableDraftInput::normalize`] (or the batch
//! form [`normalize_all`]), which trims every field, fills defaults and
//! rejects malformed shapes with [`DomainError::InvalidVariable`].
//!
//! ```text
//! generator JSON ──► VariableDraftInput ──normalize──► VariableDefinition
//!                      (lenient serde)      (rejects)     (trusted)
//! ```

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::domain::{error::DomainError, value_objects::DataType};

static KEY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z][a-z0-9_]*$").expect("key pattern is valid"));

// ============================================================================
// VariableDefinition
// ============================================================================

/// A named, typed, optionally constrained slot filled by a user answer.
///
/// `regex_pattern` and `enum_values` may both be set; each is checked
/// independently by the validator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableDefinition {
    /// Placeholder token, snake_case, unique within a template.
    pub key: String,

    /// Human-readable display name.
    pub label: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Sample value; also the literal the authoring helper replaces.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,

    #[serde(default)]
    pub required: bool,

    #[serde(default)]
    pub data_type: DataType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regex_pattern: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,
}

impl VariableDefinition {
    /// Create an optional `string` variable with no constraints.
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            description: None,
            example: None,
            required: false,
            data_type: DataType::String,
            regex_pattern: None,
            enum_values: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn data_type(mut self, data_type: DataType) -> Self {
        self.data_type = data_type;
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn example(mut self, example: impl Into<String>) -> Self {
        self.example = Some(example.into());
        self
    }

    pub fn regex_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.regex_pattern = Some(pattern.into());
        self
    }

    pub fn enum_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.enum_values = Some(values.into_iter().map(Into::into).collect());
        self
    }

    /// Label used in messages; falls back to the key when the label is blank.
    pub fn display_name(&self) -> &str {
        if self.label.trim().is_empty() {
            &self.key
        } else {
            &self.label
        }
    }

    /// The `{{key}}` token this variable binds to.
    pub fn placeholder(&self) -> String {
        format!("{{{{{}}}}}", self.key)
    }
}

// ============================================================================
// VariableDraftInput - untrusted proposal
// ============================================================================

/// A variable as proposed by an external source, before normalization.
///
/// Deserialization is deliberately forgiving: string fields accept numbers
/// and booleans (stringified), `required` accepts `"true"`/`"false"`, and
/// snake_case field names as well as the short forms `dtype`, `regex` and
/// `enum` are accepted as aliases.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableDraftInput {
    #[serde(default, deserialize_with = "lenient_string")]
    pub key: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub label: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub description: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub example: Option<String>,

    #[serde(default, deserialize_with = "lenient_bool")]
    pub required: Option<bool>,

    #[serde(
        default,
        alias = "dtype",
        alias = "data_type",
        deserialize_with = "lenient_string"
    )]
    pub data_type: Option<String>,

    #[serde(
        default,
        alias = "regex",
        alias = "regex_pattern",
        deserialize_with = "lenient_string"
    )]
    pub regex_pattern: Option<String>,

    #[serde(
        default,
        alias = "enum",
        alias = "enum_values",
        deserialize_with = "lenient_string_list"
    )]
    pub enum_values: Option<Vec<String>>,
}

impl VariableDraftInput {
    /// Validate and canonicalize this proposal.
    ///
    /// Trims whitespace from every string field, turns blank optionals into
    /// `None`, defaults `data_type` to `string` (also for unknown type names)
    /// and `required` to `false`.
    ///
    /// # Errors
    ///
    /// [`DomainError::InvalidVariable`] when the key is empty or not
    /// snake_case, the label is empty, or the regex pattern does not compile.
    pub fn normalize(self) -> Result<VariableDefinition, DomainError> {
        let key = trimmed(self.key).unwrap_or_default();
        if key.is_empty() {
            return Err(DomainError::invalid_variable("", "key is empty"));
        }
        if !KEY_RE.is_match(&key) {
            return Err(DomainError::invalid_variable(
                &key,
                "key must match [a-z][a-z0-9_]*",
            ));
        }

        let label = trimmed(self.label).unwrap_or_default();
        if label.is_empty() {
            return Err(DomainError::invalid_variable(&key, "label is empty"));
        }

        let data_type = match trimmed(self.data_type) {
            None => DataType::String,
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                debug!(key = %key, data_type = %raw, "unknown data type, using string");
                DataType::String
            }),
        };

        let regex_pattern = trimmed(self.regex_pattern);
        if let Some(pattern) = &regex_pattern {
            if let Err(e) = Regex::new(pattern) {
                return Err(DomainError::invalid_variable(
                    &key,
                    format!("regex pattern does not compile: {e}"),
                ));
            }
        }

        let enum_values = self
            .enum_values
            .map(|values| {
                values
                    .into_iter()
                    .map(|v| v.trim().to_string())
                    .filter(|v| !v.is_empty())
                    .collect::<Vec<_>>()
            })
            .filter(|values| !values.is_empty());

        Ok(VariableDefinition {
            key,
            label,
            description: trimmed(self.description),
            example: trimmed(self.example),
            required: self.required.unwrap_or(false),
            data_type,
            regex_pattern,
            enum_values,
        })
    }
}

impl TryFrom<VariableDraftInput> for VariableDefinition {
    type Error = DomainError;

    fn try_from(raw: VariableDraftInput) -> Result<Self, Self::Error> {
        raw.normalize()
    }
}

/// Outcome of normalizing a batch of proposals.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedVariables {
    /// Accepted definitions, in proposal order.
    pub accepted: Vec<VariableDefinition>,
    /// One entry per dropped proposal.
    pub rejected: Vec<DomainError>,
}

/// Normalize a batch, dropping invalid proposals and duplicate keys.
///
/// A bad entry never fails the batch. When two proposals share a key the
/// first one wins.
pub fn normalize_all<I>(inputs: I) -> NormalizedVariables
where
    I: IntoIterator<Item = VariableDraftInput>,
{
    let mut seen = HashSet::new();
    let mut out = NormalizedVariables::default();

    for input in inputs {
        match input.normalize() {
            Ok(def) if !seen.insert(def.key.clone()) => {
                warn!(key = %def.key, "dropping duplicate variable proposal");
                out.rejected
                    .push(DomainError::DuplicateVariableKey { key: def.key });
            }
            Ok(def) => out.accepted.push(def),
            Err(e) => {
                warn!(error = %e, "dropping invalid variable proposal");
                out.rejected.push(e);
            }
        }
    }

    out
}

// ============================================================================
// Lenient serde helpers
// ============================================================================

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn value_to_string(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Value>::deserialize(deserializer)?.and_then(value_to_string))
}

fn lenient_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Bool(b)) => Some(b),
        Some(Value::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" => Some(true),
            "false" | "no" | "0" => Some(false),
            _ => None,
        },
        Some(Value::Number(n)) => n.as_f64().map(|f| f != 0.0),
        _ => None,
    })
}

fn lenient_string_list<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Array(items)) => Some(items.into_iter().filter_map(value_to_string).collect()),
        Some(Value::String(s)) => Some(s.split(',').map(str::to_string).collect()),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(key: &str, label: &str) -> VariableDraftInput {
        VariableDraftInput {
            key: Some(key.into()),
            label: Some(label.into()),
            ..Default::default()
        }
    }

    #[test]
    fn normalize_trims_and_defaults() {
        let raw = VariableDraftInput {
            key: Some("  landlord_name ".into()),
            label: Some(" Landlord's Full Name\n".into()),
            description: Some("   ".into()),
            example: Some(" Priya Sharma ".into()),
            ..Default::default()
        };

        let def = raw.normalize().unwrap();
        assert_eq!(def.key, "landlord_name");
        assert_eq!(def.label, "Landlord's Full Name");
        assert_eq!(def.description, None);
        assert_eq!(def.example.as_deref(), Some("Priya Sharma"));
        assert_eq!(def.data_type, DataType::String);
        assert!(!def.required);
    }

    #[test]
    fn normalize_rejects_empty_key() {
        let err = input("   ", "Label").normalize().unwrap_err();
        assert!(matches!(err, DomainError::InvalidVariable { .. }));
    }

    #[test]
    fn normalize_rejects_empty_label() {
        let err = input("rent", "  ").normalize().unwrap_err();
        assert_eq!(
            err,
            DomainError::InvalidVariable {
                key: "rent".into(),
                reason: "label is empty".into()
            }
        );
    }

    #[test]
    fn normalize_rejects_non_snake_case_key() {
        assert!(input("Landlord Name", "Landlord").normalize().is_err());
        assert!(input("1st_party", "Party").normalize().is_err());
        assert!(input("party_1", "Party").normalize().is_ok());
    }

    #[test]
    fn normalize_rejects_bad_regex() {
        let mut raw = input("policy_number", "Policy");
        raw.regex_pattern = Some("([A-Z".into());
        assert!(raw.normalize().is_err());
    }

    #[test]
    fn unknown_data_type_falls_back_to_string() {
        let mut raw = input("amount", "Amount");
        raw.data_type = Some("currency".into());
        assert_eq!(raw.normalize().unwrap().data_type, DataType::String);
    }

    #[test]
    fn blank_enum_values_are_dropped() {
        let mut raw = input("status", "Status");
        raw.enum_values = Some(vec![" ".into(), "".into()]);
        assert_eq!(raw.normalize().unwrap().enum_values, None);

        let mut raw = input("status", "Status");
        raw.enum_values = Some(vec![" open ".into(), "closed".into()]);
        assert_eq!(
            raw.normalize().unwrap().enum_values,
            Some(vec!["open".to_string(), "closed".to_string()])
        );
    }

    #[test]
    fn lenient_deserialization_accepts_loose_json() {
        let json = r#"{
            "key": "monthly_rent",
            "label": "Monthly Rent",
            "example": 25000,
            "required": "true",
            "dtype": "number",
            "enum": ["1", 2]
        }"#;
        let raw: VariableDraftInput = serde_json::from_str(json).unwrap();
        let def = raw.normalize().unwrap();

        assert_eq!(def.example.as_deref(), Some("25000"));
        assert!(def.required);
        assert_eq!(def.data_type, DataType::Number);
        assert_eq!(
            def.enum_values,
            Some(vec!["1".to_string(), "2".to_string()])
        );
    }

    #[test]
    fn normalize_all_keeps_going_past_bad_entries() {
        let batch = vec![
            input("tenant_name", "Tenant"),
            input("", "No key"),
            input("tenant_name", "Tenant again"),
            input("rent", "Rent"),
        ];

        let out = normalize_all(batch);
        let keys: Vec<_> = out.accepted.iter().map(|v| v.key.as_str()).collect();
        assert_eq!(keys, vec!["tenant_name", "rent"]);
        assert_eq!(out.rejected.len(), 2);
        assert_eq!(out.accepted[0].label, "Tenant");
    }

    #[test]
    fn display_name_falls_back_to_key() {
        assert_eq!(VariableDefinition::new("x", "").display_name(), "x");
        assert_eq!(VariableDefinition::new("x", "Ex").display_name(), "Ex");
    }

    #[test]
    fn placeholder_wraps_key() {
        assert_eq!(VariableDefinition::new("rent", "Rent").placeholder(), "{{rent}}");
    }
}
