//! Generative-model collaborators and the parsers for their replies.

mod offline;
mod recorded;
pub mod response;

pub use offline::{GenerativeSettings, OfflineMatcher, OfflinePhraser, OfflineProposer};
pub use recorded::{RecordedMatcher, RecordedProposer};
pub use response::{ReplyError, parse_match_reply, parse_variable_proposal};
