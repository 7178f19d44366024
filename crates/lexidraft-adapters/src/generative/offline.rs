//! Stand-ins used when no generative model is reachable.
//!
//! Every call fails with a collaborator error. The services turn those
//! failures into their deterministic fallbacks, so the whole workflow stays
//! usable offline.

use serde::{Deserialize, Serialize};
use tracing::debug;

use lexidraft_core::{
    application::{
        ApplicationError, MatchReply, VariableProposal,
        ports::{QuestionPhraser, TemplateMatcher, VariableProposer},
    },
    domain::{Template, VariableDefinition},
    error::LexiResult,
};

/// Connection settings handed explicitly to generative collaborators.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerativeSettings {
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub search_api_key: Option<String>,
}

impl GenerativeSettings {
    /// Whether enough is configured to reach a model at all.
    pub fn is_configured(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }
}

fn unavailable<T>(name: &'static str, settings: &GenerativeSettings) -> LexiResult<T> {
    let reason = if settings.is_configured() {
        "no network client is compiled into this build".to_string()
    } else {
        "no API key configured".to_string()
    };
    debug!(collaborator = name, %reason, "generative collaborator unavailable");
    Err(ApplicationError::Collaborator { name, reason }.into())
}

#[derive(Debug, Clone, Default)]
pub struct OfflineProposer {
    settings: GenerativeSettings,
}

impl OfflineProposer {
    pub fn new(settings: GenerativeSettings) -> Self {
        Self { settings }
    }
}

impl VariableProposer for OfflineProposer {
    fn propose_variables(&self, _text: &str, _existing: &[String]) -> LexiResult<VariableProposal> {
        unavailable("variable proposer", &self.settings)
    }
}

#[derive(Debug, Clone, Default)]
pub struct OfflineMatcher {
    settings: GenerativeSettings,
}

impl OfflineMatcher {
    pub fn new(settings: GenerativeSettings) -> Self {
        Self { settings }
    }
}

impl TemplateMatcher for OfflineMatcher {
    fn match_template(&self, _query: &str, _candidates: &[Template]) -> LexiResult<Option<MatchReply>> {
        unavailable("template matcher", &self.settings)
    }
}

#[derive(Debug, Clone, Default)]
pub struct OfflinePhraser {
    settings: GenerativeSettings,
}

impl OfflinePhraser {
    pub fn new(settings: GenerativeSettings) -> Self {
        Self { settings }
    }
}

impl QuestionPhraser for OfflinePhraser {
    fn phrase_question(&self, _variable: &VariableDefinition) -> LexiResult<String> {
        unavailable("question phraser", &self.settings)
    }
}

#[cfg(test)]
mod tests {
    use lexidraft_core::error::LexiError;

    use super::*;

    #[test]
    fn every_stand_in_fails_as_collaborator() {
        let settings = GenerativeSettings::default();

        let err = OfflineProposer::new(settings.clone())
            .propose_variables("text", &[])
            .unwrap_err();
        assert!(matches!(
            err,
            LexiError::Application(ApplicationError::Collaborator { name: "variable proposer", .. })
        ));

        assert!(OfflineMatcher::new(settings.clone()).match_template("q", &[]).is_err());
        assert!(
            OfflinePhraser::new(settings)
                .phrase_question(&VariableDefinition::new("rent", "Rent"))
                .is_err()
        );
    }

    #[test]
    fn blank_key_is_not_configured() {
        let settings = GenerativeSettings {
            api_key: Some("  ".into()),
            ..Default::default()
        };
        assert!(!settings.is_configured());
    }
}
