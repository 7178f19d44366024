//! Turning a source document into a placeholder-bearing template body.

use crate::domain::entities::VariableDefinition;

enum Segment<'a> {
    Text(String),
    Token(&'a str),
}

/// Replace each variable's `example` in `source` with its `{{key}}` token.
///
/// Variables are applied in the given order. Text already turned into a
/// token is never scanned again, so a later example cannot match inside
/// an earlier token. Variables without an example are skipped.
pub fn build_template_body(source: &str, variables: &[VariableDefinition]) -> String {
    let mut segments = vec![Segment::Text(source.to_string())];

    for var in variables {
        let Some(example) = var.example.as_deref().filter(|e| !e.is_empty()) else {
            continue;
        };

        segments = segments
            .into_iter()
            .flat_map(|segment| split_on_example(segment, example, &var.key))
            .collect();
    }

    segments
        .into_iter()
        .map(|segment| match segment {
            Segment::Text(text) => text,
            Segment::Token(key) => format!("{{{{{key}}}}}"),
        })
        .collect()
}

fn split_on_example<'a>(segment: Segment<'a>, example: &str, key: &'a str) -> Vec<Segment<'a>> {
    let Segment::Text(text) = segment else {
        return vec![segment];
    };
    if !text.contains(example) {
        return vec![Segment::Text(text)];
    }

    let mut out = Vec::new();
    for (i, part) in text.split(example).enumerate() {
        if i > 0 {
            out.push(Segment::Token(key));
        }
        if !part.is_empty() {
            out.push(Segment::Text(part.to_string()));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn var(key: &str, example: &str) -> VariableDefinition {
        VariableDefinition::new(key, key).example(example)
    }

    #[test]
    fn replaces_every_occurrence() {
        let body = build_template_body(
            "Priya Sharma agrees. Signed, Priya Sharma.",
            &[var("landlord_name", "Priya Sharma")],
        );
        assert_eq!(body, "{{landlord_name}} agrees. Signed, {{landlord_name}}.");
    }

    #[test]
    fn skips_variables_without_example() {
        let vars = [VariableDefinition::new("rent", "Rent"), var("city", "")];
        assert_eq!(build_template_body("Rent in Pune", &vars), "Rent in Pune");
    }

    #[test]
    fn later_examples_do_not_touch_earlier_tokens() {
        // "name" occurs inside the token text "{{landlord_name}}" but must not be replaced.
        let vars = [var("landlord_name", "Priya"), var("n", "name")];
        assert_eq!(
            build_template_body("Priya, name here", &vars),
            "{{landlord_name}}, {{n}} here"
        );
    }

    #[test]
    fn earlier_variables_take_precedence_on_overlap() {
        let vars = [var("full_name", "Priya Sharma"), var("first_name", "Priya")];
        assert_eq!(
            build_template_body("Priya Sharma (Priya)", &vars),
            "{{full_name}} ({{first_name}})"
        );
    }

    #[test]
    fn adjacent_occurrences() {
        assert_eq!(build_template_body("abab", &[var("x", "ab")]), "{{x}}{{x}}");
    }
}
