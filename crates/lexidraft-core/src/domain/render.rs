//! Placeholder substitution.
//!
//! Tokens have the form `{{` optional-space `key` optional-space `}}` and the
//! key is matched case-insensitively. Rendering is best-effort: tokens with
//! no answer stay in the output verbatim so partial drafts remain editable.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::{NoExpand, Regex};
use tracing::warn;

use crate::domain::entities::{AnswerSet, AnswerValue};

static TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_]*)\s*\}\}").expect("token pattern is valid")
});

/// Substitute every answered key into `body`.
///
/// `null` answers render as `[MISSING: <key>]`, dates as `YYYY-MM-DD` and
/// everything else in its canonical string form. Replacement text is
/// inserted literally, so `$` or `\` in an answer is preserved.
pub fn render(body: &str, answers: &AnswerSet) -> String {
    let mut out = body.to_string();

    for (key, value) in answers.iter() {
        let Some(token) = token_pattern(key) else {
            continue;
        };
        let replacement = format_value(key, value);
        out = token.replace_all(&out, NoExpand(&replacement)).into_owned();
    }

    out
}

fn token_pattern(key: &str) -> Option<Regex> {
    let pattern = format!(r"(?i)\{{\{{\s*{}\s*\}}\}}", regex::escape(key));
    match Regex::new(&pattern) {
        Ok(re) => Some(re),
        Err(e) => {
            warn!(key, error = %e, "skipping answer whose key cannot form a token pattern");
            None
        }
    }
}

fn format_value(key: &str, value: &AnswerValue) -> String {
    match value {
        AnswerValue::Null => format!("[MISSING: {key}]"),
        other => other.as_text().into_owned(),
    }
}

/// Distinct placeholder keys in `body`, in order of first appearance.
///
/// Keys differing only in case are reported once, spelled as first seen.
pub fn placeholder_keys(body: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    TOKEN_RE
        .captures_iter(body)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .filter(|key| seen.insert(key.to_lowercase()))
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn key_match_is_case_insensitive() {
        let answers = AnswerSet::new().with("name", "Ann");
        assert_eq!(render("Hello {{Name}}", &answers), "Hello Ann");
    }

    #[test]
    fn whitespace_inside_braces_is_allowed() {
        let answers = AnswerSet::new().with("name", "Ann");
        assert_eq!(render("{{ name }}/{{name  }}/{{\tname}}", &answers), "Ann/Ann/Ann");
    }

    #[test]
    fn null_renders_missing_marker() {
        let answers = AnswerSet::new().with("rent", None::<String>);
        assert_eq!(render("Rent: {{rent}}", &answers), "Rent: [MISSING: rent]");
    }

    #[test]
    fn unanswered_tokens_are_preserved() {
        let answers = AnswerSet::new().with("a", "1");
        assert_eq!(render("{{a}} {{k}}", &answers), "1 {{k}}");
    }

    #[test]
    fn every_occurrence_is_replaced() {
        let answers = AnswerSet::new().with("party", "Acme");
        assert_eq!(
            render("{{party}} and {{PARTY}} and {{ party }}", &answers),
            "Acme and Acme and Acme"
        );
    }

    #[test]
    fn values_are_formatted() {
        let answers = AnswerSet::new()
            .with("rent", 25000)
            .with("start", NaiveDate::from_ymd_opt(2025, 1, 5).unwrap());
        assert_eq!(
            render("{{rent}} from {{start}}", &answers),
            "25000 from 2025-01-05"
        );
    }

    #[test]
    fn replacement_text_is_literal() {
        let answers = AnswerSet::new().with("amount", "$1 \\0 ${x}");
        assert_eq!(render("Pay {{amount}}", &answers), "Pay $1 \\0 ${x}");
    }

    #[test]
    fn keys_with_regex_metacharacters_are_escaped() {
        let answers = AnswerSet::new().with("a.b", "x");
        assert_eq!(render("{{a.b}} {{aXb}}", &answers), "x {{aXb}}");
    }

    #[test]
    fn rerender_is_idempotent() {
        let body = "Dear {{name}}, rent {{rent}} due {{due}}. {{other}}";
        let answers = AnswerSet::new()
            .with("name", "Ann")
            .with("rent", 100)
            .with("due", None::<String>);

        let once = render(body, &answers);
        assert_eq!(render(&once, &answers), once);
    }

    #[test]
    fn placeholder_keys_are_distinct_and_ordered() {
        let body = "{{b}} {{ a }} {{B}} {{a}} {{c_1}} {{ not a key }}";
        assert_eq!(placeholder_keys(body), vec!["b", "a", "c_1"]);
    }
}
