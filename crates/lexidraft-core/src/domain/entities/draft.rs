//! Answers and rendered drafts.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::template::TemplateId;

/// Format used for dates, both when validating and when rendering.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

// ============================================================================
// AnswerValue
// ============================================================================

/// One submitted answer.
///
/// On the wire an answer is a JSON string, number or `null`. `Date` exists
/// for callers that already hold a parsed date; it serializes as a
/// `YYYY-MM-DD` string and therefore reads back as `Text`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Null,
    Number(serde_json::Number),
    Text(String),
    Date(NaiveDate),
}

impl AnswerValue {
    /// Absent-equivalent: `null` or the empty string. Zero is an answer.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Text(s) => s.is_empty(),
            Self::Number(_) | Self::Date(_) => false,
        }
    }

    /// Canonical string form, as checked by the validator.
    ///
    /// `Null` becomes the empty string.
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            Self::Null => Cow::Borrowed(""),
            Self::Text(s) => Cow::Borrowed(s),
            Self::Number(n) => Cow::Owned(n.to_string()),
            Self::Date(d) => Cow::Owned(d.format(DATE_FORMAT).to_string()),
        }
    }
}

impl fmt::Display for AnswerValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_text())
    }
}

impl From<&str> for AnswerValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for AnswerValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

macro_rules! impl_from_integer {
    ($($t:ty),*) => {
        $(
            impl From<$t> for AnswerValue {
                fn from(n: $t) -> Self {
                    Self::Number(n.into())
                }
            }
        )*
    };
}

impl_from_integer!(i32, i64, u32, u64);

impl From<f64> for AnswerValue {
    /// Non-finite floats have no JSON form and become `Null`.
    fn from(n: f64) -> Self {
        serde_json::Number::from_f64(n).map_or(Self::Null, Self::Number)
    }
}

impl From<NaiveDate> for AnswerValue {
    fn from(d: NaiveDate) -> Self {
        Self::Date(d)
    }
}

impl<T: Into<AnswerValue>> From<Option<T>> for AnswerValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

// ============================================================================
// AnswerSet
// ============================================================================

/// Answers keyed by variable key, for a single validate or render call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerSet(BTreeMap<String, AnswerValue>);

impl AnswerSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<AnswerValue>) {
        self.0.insert(key.into(), value.into());
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<AnswerValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&AnswerValue> {
        self.0.get(key)
    }

    /// True when the key has a non-empty answer.
    pub fn is_answered(&self, key: &str) -> bool {
        self.get(key).is_some_and(|v| !v.is_empty())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &AnswerValue)> {
        self.0.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Merge `other` into `self`; answers in `other` win.
    pub fn extend(&mut self, other: AnswerSet) {
        self.0.extend(other.0);
    }
}

impl<K, V> FromIterator<(K, V)> for AnswerSet
where
    K: Into<String>,
    V: Into<AnswerValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

// ============================================================================
// DraftInstance
// ============================================================================

/// A rendered draft. Immutable after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftInstance {
    pub id: Uuid,
    pub template_id: TemplateId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_query: Option<String>,

    pub answers: AnswerSet,
    pub draft_markdown: String,
    pub created_at: DateTime<Utc>,
}

impl DraftInstance {
    pub fn new(
        template_id: TemplateId,
        user_query: Option<String>,
        answers: AnswerSet,
        draft_markdown: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            template_id,
            user_query,
            answers,
            draft_markdown,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_values_decode_untagged() {
        let answers: AnswerSet =
            serde_json::from_str(r#"{"rent": 25000, "name": "Ann", "due": null}"#).unwrap();

        assert!(matches!(answers.get("rent"), Some(AnswerValue::Number(_))));
        assert_eq!(answers.get("name"), Some(&AnswerValue::from("Ann")));
        assert_eq!(answers.get("due"), Some(&AnswerValue::Null));
    }

    #[test]
    fn emptiness_rules() {
        assert!(AnswerValue::Null.is_empty());
        assert!(AnswerValue::from("").is_empty());
        assert!(!AnswerValue::from(" ").is_empty());
        assert!(!AnswerValue::from(0).is_empty());
    }

    #[test]
    fn date_renders_iso() {
        let d = NaiveDate::from_ymd_opt(2025, 1, 5).unwrap();
        assert_eq!(AnswerValue::from(d).as_text(), "2025-01-05");
        assert_eq!(serde_json::to_string(&AnswerValue::from(d)).unwrap(), "\"2025-01-05\"");
    }

    #[test]
    fn non_finite_float_is_null() {
        assert_eq!(AnswerValue::from(f64::NAN), AnswerValue::Null);
        assert_eq!(AnswerValue::from(2.5).as_text(), "2.5");
    }

    #[test]
    fn is_answered_ignores_empty_values() {
        let answers = AnswerSet::new().with("a", "x").with("b", "").with("c", None::<String>);
        assert!(answers.is_answered("a"));
        assert!(!answers.is_answered("b"));
        assert!(!answers.is_answered("c"));
        assert!(!answers.is_answered("d"));
    }

    #[test]
    fn draft_instance_serializes_camel_case() {
        let draft = DraftInstance::new(
            TemplateId::from("tpl_lease_v1"),
            Some("need a lease".into()),
            AnswerSet::new().with("rent", 100),
            "Rent: 100".into(),
        );
        let json = serde_json::to_value(&draft).unwrap();
        assert_eq!(json["templateId"], "tpl_lease_v1");
        assert_eq!(json["draftMarkdown"], "Rent: 100");
        assert_eq!(json["answers"]["rent"], 100);
    }
}
