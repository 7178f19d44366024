//! Collaborators that replay a reply captured from a model earlier.
//!
//! Useful for reproducing an analysis or match offline: the raw reply text is
//! fed through the same parsers a live client would use.

use std::{fs, path::Path};

use tracing::warn;

use lexidraft_core::{
    application::{
        ApplicationError, MatchReply, VariableProposal,
        ports::{TemplateMatcher, VariableProposer},
    },
    domain::Template,
    error::LexiResult,
};

use super::response::{parse_match_reply, parse_variable_proposal};

fn read_reply(path: &Path) -> LexiResult<String> {
    fs::read_to_string(path).map_err(|e| {
        ApplicationError::Storage {
            path: path.to_path_buf(),
            reason: e.to_string(),
        }
        .into()
    })
}

/// Replays a recorded variable-proposal reply for every chunk.
#[derive(Debug, Clone)]
pub struct RecordedProposer {
    reply: String,
}

impl RecordedProposer {
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
        }
    }

    pub fn from_file(path: &Path) -> LexiResult<Self> {
        read_reply(path).map(Self::new)
    }
}

impl VariableProposer for RecordedProposer {
    fn propose_variables(&self, _text: &str, existing: &[String]) -> LexiResult<VariableProposal> {
        let mut proposal = parse_variable_proposal(&self.reply)
            .map_err(|e| e.into_collaborator("variable proposer"))?;

        // Later chunks only contribute keys not seen before.
        let before = proposal.variables.len();
        proposal.variables.retain(|v| {
            v.key
                .as_deref()
                .is_none_or(|key| !existing.iter().any(|seen| seen == key.trim()))
        });
        if before > 0 && proposal.variables.is_empty() {
            warn!("recorded reply has no new variables for this chunk");
        }

        Ok(proposal)
    }
}

/// Replays a recorded match reply.
#[derive(Debug, Clone)]
pub struct RecordedMatcher {
    reply: String,
}

impl RecordedMatcher {
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
        }
    }

    pub fn from_file(path: &Path) -> LexiResult<Self> {
        read_reply(path).map(Self::new)
    }
}

impl TemplateMatcher for RecordedMatcher {
    fn match_template(&self, _query: &str, _candidates: &[Template]) -> LexiResult<Option<MatchReply>> {
        parse_match_reply(&self.reply).map_err(|e| e.into_collaborator("template matcher"))
    }
}
