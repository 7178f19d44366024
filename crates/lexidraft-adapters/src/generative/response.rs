//! Parsing of raw generative-model replies.
//!
//! Models wrap their JSON in prose or markdown fences, so every parser first
//! extracts the first balanced `{ … }` object from the reply and decodes
//! only that.

use serde::Deserialize;
use thiserror::Error;

use lexidraft_core::{
    application::{ApplicationError, MatchReply, VariableProposal},
    domain::{Confidence, TemplateId},
    error::LexiError,
};

#[derive(Debug, Error)]
pub enum ReplyError {
    #[error("reply contains no JSON object")]
    NoJsonObject,

    #[error("reply JSON is malformed: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("confidence {0} is outside 0..=1")]
    ConfidenceOutOfRange(f64),
}

impl ReplyError {
    /// Wrap as a collaborator failure attributed to `name`.
    pub fn into_collaborator(self, name: &'static str) -> LexiError {
        ApplicationError::Collaborator {
            name,
            reason: self.to_string(),
        }
        .into()
    }
}

/// The first balanced `{ … }` object in `text`, braces inside JSON strings
/// ignored.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in text[start..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..=start + offset]);
                }
            }
            _ => {}
        }
    }

    None
}

/// Decode a variable proposal reply.
pub fn parse_variable_proposal(reply: &str) -> Result<VariableProposal, ReplyError> {
    let json = extract_json_object(reply).ok_or(ReplyError::NoJsonObject)?;
    Ok(serde_json::from_str(json)?)
}

#[derive(Debug, Deserialize)]
struct RawMatch {
    #[serde(default, alias = "templateId")]
    template_id: Option<String>,
    #[serde(default, alias = "confidenceScore", alias = "confidence_score")]
    confidence: Option<f64>,
    #[serde(default)]
    reasoning: Option<String>,
}

/// Decode a template match reply.
///
/// A missing, empty or `"none"` template id means the model found no match.
/// A missing confidence counts as zero. A confidence outside `0..=1` (a
/// percentage, say) is an error rather than being clamped into range.
pub fn parse_match_reply(reply: &str) -> Result<Option<MatchReply>, ReplyError> {
    let json = extract_json_object(reply).ok_or(ReplyError::NoJsonObject)?;
    let raw: RawMatch = serde_json::from_str(json)?;

    let Some(id) = raw
        .template_id
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty() && !id.eq_ignore_ascii_case("none"))
    else {
        return Ok(None);
    };

    let score = raw.confidence.unwrap_or(0.0);
    if !(0.0..=1.0).contains(&score) {
        return Err(ReplyError::ConfidenceOutOfRange(score));
    }

    Ok(Some(MatchReply {
        template_id: TemplateId::new(id),
        confidence: Confidence::new(score),
        reasoning: raw.reasoning.unwrap_or_default(),
    }))
}
