//! Assist Service - template matching and clarifying questions.
//!
//! Both operations lean on generative collaborators and both degrade to a
//! deterministic answer when the collaborator fails:
//!
//! | Operation | Collaborator failure | Result |
//! |-----------|----------------------|--------|
//! | `match_query` | error, unknown id, confidence < 0.6 | no match |
//! | `clarifying_questions` | error or blank phrasing | `Please provide <label>` |

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::{
    application::ports::{QuestionPhraser, TemplateMatcher, TemplateStore},
    domain::{AnswerSet, Confidence, DataType, Template, TemplateId, VariableDefinition},
    error::LexiResult,
};

/// An actionable match: the template exists and confidence clears the threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateMatch {
    pub template: Template,
    pub confidence: Confidence,
    pub reasoning: String,
}

/// One question for an unanswered variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub key: String,
    pub question: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
    pub required: bool,
    pub data_type: DataType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,
}

/// The question asked when no phrasing is available.
pub fn fallback_question(variable: &VariableDefinition) -> String {
    format!("Please provide {}", variable.display_name().to_lowercase())
}

pub struct AssistService {
    templates: Arc<dyn TemplateStore>,
    matcher: Arc<dyn TemplateMatcher>,
    phraser: Arc<dyn QuestionPhraser>,
}

impl AssistService {
    pub fn new(
        templates: Arc<dyn TemplateStore>,
        matcher: Arc<dyn TemplateMatcher>,
        phraser: Arc<dyn QuestionPhraser>,
    ) -> Self {
        Self {
            templates,
            matcher,
            phraser,
        }
    }

    /// Find the stored template best suited to a free-text request.
    ///
    /// Only storage errors are returned. Every matcher problem yields `None`.
    #[instrument(skip(self))]
    pub fn match_query(&self, query: &str) -> LexiResult<Option<TemplateMatch>> {
        let candidates = self.templates.list()?;
        if candidates.is_empty() {
            debug!("No templates stored, nothing to match");
            return Ok(None);
        }

        let reply = match self.matcher.match_template(query, &candidates) {
            Ok(Some(reply)) => reply,
            Ok(None) => return Ok(None),
            Err(e) => {
                warn!(error = %e, "Template matcher failed, treating as no match");
                return Ok(None);
            }
        };

        if !reply.confidence.is_actionable() {
            debug!(confidence = %reply.confidence, "Match below threshold");
            return Ok(None);
        }

        let Some(template) = candidates
            .into_iter()
            .find(|t| t.template_id == reply.template_id)
        else {
            warn!(template_id = %reply.template_id, "Matcher named an unknown template");
            return Ok(None);
        };

        Ok(Some(TemplateMatch {
            template,
            confidence: reply.confidence,
            reasoning: reply.reasoning,
        }))
    }

    /// One question per variable not yet answered, in template order.
    #[instrument(skip(self, answers), fields(template_id = %template_id))]
    pub fn clarifying_questions(
        &self,
        template_id: &TemplateId,
        answers: &AnswerSet,
    ) -> LexiResult<Vec<Question>> {
        let template = self.templates.get(template_id)?;

        Ok(template
            .variables
            .iter()
            .filter(|v| !answers.is_answered(&v.key))
            .map(|v| Question {
                key: v.key.clone(),
                question: self.phrase(v),
                label: v.label.clone(),
                example: v.example.clone(),
                required: v.required,
                data_type: v.data_type,
                enum_values: v.enum_values.clone(),
            })
            .collect())
    }

    fn phrase(&self, variable: &VariableDefinition) -> String {
        match self.phraser.phrase_question(variable) {
            Ok(q) if !q.trim().is_empty() => q.trim().to_string(),
            Ok(_) => fallback_question(variable),
            Err(e) => {
                debug!(key = %variable.key, error = %e, "Question phraser failed, using fallback");
                fallback_question(variable)
            }
        }
    }
}
