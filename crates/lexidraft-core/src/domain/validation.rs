use std::collections::BTreeMap;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::{
    entities::{AnswerSet, AnswerValue, Template, VariableDefinition, draft::DATE_FORMAT},
    error::DomainError,
    value_objects::DataType,
};

static DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").expect("date pattern is valid"));

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("email pattern is valid")
});

/// Per-field validation messages. Empty means every answer is acceptable.
///
/// This is a result value handed back to the caller, never an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, String>);

impl ValidationErrors {
    pub fn is_valid(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    fn record(&mut self, key: &str, message: String) {
        self.0.entry(key.to_string()).or_insert(message);
    }
}

impl IntoIterator for ValidationErrors {
    type Item = (String, String);
    type IntoIter = std::collections::btree_map::IntoIter<String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Check `answers` against `variables`.
///
/// For each variable, in order: required, then type, then regex, then enum.
/// Only the first failing check is reported for a key. Optional variables
/// without an answer are not checked at all. Answers for keys that no
/// variable defines are ignored.
pub fn validate_answers(variables: &[VariableDefinition], answers: &AnswerSet) -> ValidationErrors {
    let mut errors = ValidationErrors::default();

    for var in variables {
        let value = answers.get(&var.key).filter(|v| !v.is_empty());

        let Some(value) = value else {
            if var.required {
                errors.record(&var.key, format!("{} is required", var.display_name()));
            }
            continue;
        };

        if let Some(message) = check_value(var, value) {
            errors.record(&var.key, message);
        }
    }

    errors
}

fn check_value(var: &VariableDefinition, value: &AnswerValue) -> Option<String> {
    let text = value.as_text();

    if let Some(message) = check_type(var.data_type, value, &text) {
        return Some(message.to_string());
    }

    if let Some(pattern) = &var.regex_pattern {
        if !full_match(&var.key, pattern, &text) {
            return Some(format!("Must match pattern: {pattern}"));
        }
    }

    if let Some(allowed) = &var.enum_values {
        if !allowed.iter().any(|a| a == text.as_ref()) {
            return Some(format!("Must be one of: {}", allowed.join(", ")));
        }
    }

    None
}

fn check_type(data_type: DataType, value: &AnswerValue, text: &str) -> Option<&'static str> {
    match data_type {
        DataType::String => None,
        DataType::Date => (!matches!(value, AnswerValue::Date(_)) && !is_iso_date(text))
            .then_some("Date must be in YYYY-MM-DD format"),
        DataType::Number => (!matches!(value, AnswerValue::Number(_))
            && text.trim().parse::<f64>().is_err())
        .then_some("Must be a valid number"),
        DataType::Email => (!EMAIL_RE.is_match(text)).then_some("Must be a valid email address"),
    }
}

/// `YYYY-MM-DD` that also names a real calendar day.
fn is_iso_date(text: &str) -> bool {
    DATE_RE.is_match(text) && NaiveDate::parse_from_str(text, DATE_FORMAT).is_ok()
}

/// Whole-value match. A pattern that does not compile never matches.
fn full_match(key: &str, pattern: &str, text: &str) -> bool {
    match Regex::new(&format!("^(?:{pattern})$")) {
        Ok(re) => re.is_match(text),
        Err(e) => {
            warn!(key, pattern, error = %e, "variable regex does not compile");
            false
        }
    }
}

/// Centralized domain validation.
pub struct DomainValidator;

impl DomainValidator {
    pub fn validate_template(template: &Template) -> Result<(), DomainError> {
        template.validate()
    }

    pub fn validate_answers(template: &Template, answers: &AnswerSet) -> ValidationErrors {
        validate_answers(&template.variables, answers)
    }
}
