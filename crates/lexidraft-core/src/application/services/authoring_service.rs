//! Authoring Service - documents in, templates out.
//!
//! This service coordinates the authoring workflow:
//! 1. Check the upload against the configured limits
//! 2. Extract text (driven port)
//! 3. Ask the proposer for variables, chunk by chunk (driven port, may fail)
//! 4. Normalize every proposal before it is trusted
//! 5. Replace example values with placeholders and store the template

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::{
    application::{
        ApplicationError,
        ports::{TemplateStore, TextExtractor, VariableProposal, VariableProposer},
        services::TemplateService,
    },
    domain::{
        DEFAULT_DOC_TYPE, DomainError, Template, VariableDefinition, VariableDraftInput,
        build_template_body, normalize_all,
    },
    error::{LexiError, LexiResult},
};

/// Title used when the proposer gives none.
pub const FALLBACK_TITLE: &str = "Untitled Template";

/// How many identifier versions to try when a concurrent insert wins the race.
const INSERT_ATTEMPTS: u32 = 5;

/// Upload limits applied before any text is extracted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentLimits {
    pub max_bytes: u64,
    /// Lowercase MIME types without parameters.
    pub allowed_mime_types: Vec<String>,
    /// Size of the text chunks sent to the proposer, in characters.
    pub chunk_size: usize,
}

impl Default for DocumentLimits {
    fn default() -> Self {
        Self {
            max_bytes: 10 * 1024 * 1024,
            allowed_mime_types: vec![
                "application/pdf".into(),
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document".into(),
                "text/plain".into(),
                "text/markdown".into(),
            ],
            chunk_size: 3000,
        }
    }
}

/// Everything learned from one uploaded document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentAnalysis {
    /// Extracted text, unchunked.
    pub text: String,
    pub title: String,
    pub doc_type: String,
    pub jurisdiction: Option<String>,
    pub similarity_tags: BTreeSet<String>,
    pub variables: Vec<VariableDefinition>,
    /// Human-readable reasons for every dropped proposal.
    #[serde(default)]
    pub rejected: Vec<String>,
}

pub struct AuthoringService {
    extractor: Arc<dyn TextExtractor>,
    proposer: Arc<dyn VariableProposer>,
    templates: TemplateService,
    limits: DocumentLimits,
}

impl AuthoringService {
    pub fn new(
        extractor: Arc<dyn TextExtractor>,
        proposer: Arc<dyn VariableProposer>,
        store: Arc<dyn TemplateStore>,
        limits: DocumentLimits,
    ) -> Self {
        Self {
            extractor,
            proposer,
            templates: TemplateService::new(store),
            limits,
        }
    }

    /// Extract text from a document and propose its variables.
    ///
    /// Proposer failures never fail the analysis: the chunk contributes no
    /// variables and the defaults (`Untitled Template`, `document`) apply.
    ///
    /// # Errors
    /// - `UnsupportedFormat` if the MIME type is not allowed
    /// - `DocumentTooLarge` if the upload exceeds the size limit
    /// - `ExtractionFailed` if extraction fails or yields no text
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub fn analyze_document(&self, bytes: &[u8], mime_type: &str) -> LexiResult<DocumentAnalysis> {
        let mime = normalize_mime(mime_type);
        if !self.limits.allowed_mime_types.iter().any(|m| *m == mime) {
            return Err(ApplicationError::UnsupportedFormat { mime }.into());
        }

        let size = bytes.len() as u64;
        if size > self.limits.max_bytes {
            return Err(ApplicationError::DocumentTooLarge {
                size,
                limit: self.limits.max_bytes,
            }
            .into());
        }

        let text = self.extractor.extract_text(bytes, &mime)?;
        if text.trim().is_empty() {
            return Err(ApplicationError::ExtractionFailed {
                reason: "document contains no text".into(),
            }
            .into());
        }

        self.analyze_text(text)
    }

    /// Propose variables for text that is already extracted.
    #[instrument(skip_all, fields(chars = text.len()))]
    pub fn analyze_text(&self, text: String) -> LexiResult<DocumentAnalysis> {
        let chunks = chunk_text(&text, self.limits.chunk_size);
        debug!(chunks = chunks.len(), "Proposing variables");

        let mut raw: Vec<VariableDraftInput> = Vec::new();
        let mut meta = VariableProposal::default();
        let mut tags = BTreeSet::new();

        for (index, chunk) in chunks.iter().enumerate() {
            let existing_keys: Vec<String> = raw
                .iter()
                .filter_map(|v| non_blank(v.key.clone()))
                .collect();

            let proposal = match self.proposer.propose_variables(chunk, &existing_keys) {
                Ok(proposal) => proposal,
                Err(e) => {
                    warn!(chunk = index, error = %e, "Variable proposer failed, using fallback");
                    VariableProposal::default()
                }
            };

            meta.title = meta.title.or(non_blank(proposal.title));
            meta.doc_type = meta.doc_type.or(non_blank(proposal.doc_type));
            meta.jurisdiction = meta.jurisdiction.or(non_blank(proposal.jurisdiction));
            tags.extend(proposal.similarity_tags.into_iter().filter_map(|t| non_blank(Some(t))));
            raw.extend(proposal.variables);
        }

        let normalized = normalize_all(raw);
        info!(
            accepted = normalized.accepted.len(),
            rejected = normalized.rejected.len(),
            "Document analyzed"
        );

        Ok(DocumentAnalysis {
            text,
            title: meta.title.unwrap_or_else(|| FALLBACK_TITLE.to_string()),
            doc_type: meta
                .doc_type
                .unwrap_or_else(|| DEFAULT_DOC_TYPE.to_string()),
            jurisdiction: meta.jurisdiction,
            similarity_tags: tags,
            variables: normalized.accepted,
            rejected: normalized
                .rejected
                .iter()
                .map(DomainError::to_string)
                .collect(),
        })
    }

    /// Turn an analysis into a stored template.
    ///
    /// Example values in the text become placeholders. The identifier is the
    /// lowest free `tpl_<slug>_v<n>` for the title.
    #[instrument(skip_all, fields(title = %analysis.title))]
    pub fn create_template(&self, analysis: DocumentAnalysis) -> LexiResult<Template> {
        let body = build_template_body(&analysis.text, &analysis.variables);
        let mut version = self.templates.next_version(&analysis.title)?;

        for attempt in 1..=INSERT_ATTEMPTS {
            let template = Template::builder()
                .title(analysis.title.clone())
                .version(version)
                .doc_type(analysis.doc_type.clone())
                .jurisdiction(analysis.jurisdiction.clone())
                .tags(analysis.similarity_tags.iter().cloned())
                .body(body.clone())
                .variables(analysis.variables.iter().cloned())
                .build()?;

            match self.templates.create(template) {
                Err(LexiError::Application(ApplicationError::TemplateExists { id }))
                    if attempt < INSERT_ATTEMPTS =>
                {
                    debug!(%id, "Identifier taken concurrently, trying next version");
                    version += 1;
                }
                other => return other,
            }
        }

        Err(LexiError::Internal {
            message: "identifier allocation loop exited without a result".into(),
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Lowercase and drop parameters: `Text/Plain; charset=utf-8` -> `text/plain`.
fn normalize_mime(mime_type: &str) -> String {
    mime_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// Split text on word boundaries into chunks of at most `size` characters.
///
/// Words are re-joined with single spaces. A single word longer than `size`
/// becomes its own chunk.
pub fn chunk_text(text: &str, size: usize) -> Vec<String> {
    let size = size.max(1);
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();
        if current_len > 0 && current_len + 1 + word_len > size {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if current_len > 0 {
            current.push(' ');
            current_len += 1;
        }
        current.push_str(word);
        current_len += word_len;
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{
        MockTemplateStore, MockTextExtractor, MockVariableProposer,
    };

    fn draft(key: &str, label: &str, example: &str) -> VariableDraftInput {
        VariableDraftInput {
            key: Some(key.into()),
            label: Some(label.into()),
            example: Some(example.into()),
            ..Default::default()
        }
    }

    fn service(
        extractor: MockTextExtractor,
        proposer: MockVariableProposer,
        store: MockTemplateStore,
    ) -> AuthoringService {
        AuthoringService::new(
            Arc::new(extractor),
            Arc::new(proposer),
            Arc::new(store),
            DocumentLimits::default(),
        )
    }

    #[test]
    fn chunk_text_respects_size_and_word_boundaries() {
        let chunks = chunk_text("aaa bbb ccc ddd", 7);
        assert_eq!(chunks, vec!["aaa bbb", "ccc ddd"]);

        assert_eq!(chunk_text("  ", 10), Vec::<String>::new());
        assert_eq!(chunk_text("oversizedword x", 4), vec!["oversizedword", "x"]);
    }

    #[test]
    fn rejects_disallowed_mime_before_extracting() {
        let mut extractor = MockTextExtractor::new();
        extractor.expect_extract_text().never();

        let svc = service(extractor, MockVariableProposer::new(), MockTemplateStore::new());
        let err = svc.analyze_document(b"x", "image/png").unwrap_err();
        assert!(matches!(
            err,
            LexiError::Application(ApplicationError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn rejects_oversized_documents() {
        let mut extractor = MockTextExtractor::new();
        extractor.expect_extract_text().never();

        let mut svc = service(extractor, MockVariableProposer::new(), MockTemplateStore::new());
        svc.limits.max_bytes = 4;
        let err = svc.analyze_document(b"12345", "text/plain").unwrap_err();
        assert!(matches!(
            err,
            LexiError::Application(ApplicationError::DocumentTooLarge { size: 5, limit: 4 })
        ));
    }

    #[test]
    fn empty_text_stops_before_proposing() {
        let mut extractor = MockTextExtractor::new();
        extractor
            .expect_extract_text()
            .returning(|_, _| Ok("  \n ".into()));
        let mut proposer = MockVariableProposer::new();
        proposer.expect_propose_variables().never();

        let svc = service(extractor, proposer, MockTemplateStore::new());
        let err = svc
            .analyze_document(b"  \n ", "text/plain; charset=utf-8")
            .unwrap_err();
        assert!(matches!(
            err,
            LexiError::Application(ApplicationError::ExtractionFailed { .. })
        ));
    }

    #[test]
    fn proposer_failure_falls_back_to_defaults() {
        let mut extractor = MockTextExtractor::new();
        extractor
            .expect_extract_text()
            .returning(|_, _| Ok("Lease between Priya and Rahul".into()));
        let mut proposer = MockVariableProposer::new();
        proposer.expect_propose_variables().returning(|_, _| {
            Err(ApplicationError::Collaborator {
                name: "proposer",
                reason: "timeout".into(),
            }
            .into())
        });

        let svc = service(extractor, proposer, MockTemplateStore::new());
        let analysis = svc.analyze_document(b"...", "text/plain").unwrap();

        assert_eq!(analysis.title, FALLBACK_TITLE);
        assert_eq!(analysis.doc_type, "document");
        assert!(analysis.variables.is_empty());
    }

    #[test]
    fn proposals_are_normalized_and_merged_across_chunks() {
        let mut extractor = MockTextExtractor::new();
        extractor
            .expect_extract_text()
            .returning(|_, _| Ok("one two three four".into()));

        let mut proposer = MockVariableProposer::new();
        let mut call = 0;
        proposer
            .expect_propose_variables()
            .times(2)
            .returning(move |_, existing| {
                call += 1;
                if call == 1 {
                    assert!(existing.is_empty());
                    Ok(VariableProposal {
                        variables: vec![draft("tenant", "Tenant", "one"), draft("", "bad", "x")],
                        title: Some(" Lease ".into()),
                        similarity_tags: vec!["rental".into()],
                        ..Default::default()
                    })
                } else {
                    assert_eq!(existing, ["tenant".to_string()]);
                    Ok(VariableProposal {
                        variables: vec![draft("tenant", "Dup", "two"), draft("rent", "Rent", "four")],
                        doc_type: Some("lease".into()),
                        similarity_tags: vec!["housing".into()],
                        ..Default::default()
                    })
                }
            });

        let mut svc = service(extractor, proposer, MockTemplateStore::new());
        svc.limits.chunk_size = 10;
        let analysis = svc.analyze_document(b"...", "text/plain").unwrap();

        assert_eq!(analysis.title, "Lease");
        assert_eq!(analysis.doc_type, "lease");
        let keys: Vec<_> = analysis.variables.iter().map(|v| v.key.as_str()).collect();
        assert_eq!(keys, vec!["tenant", "rent"]);
        assert_eq!(analysis.rejected.len(), 2);
        assert_eq!(analysis.similarity_tags.len(), 2);
    }

    #[test]
    fn create_template_uses_next_free_version() {
        let mut store = MockTemplateStore::new();
        store
            .expect_exists()
            .returning(|id| Ok(id.as_str() == "tpl_lease_v1"));
        store.expect_insert().times(1).returning(|_| Ok(()));

        let svc = service(MockTextExtractor::new(), MockVariableProposer::new(), store);
        let analysis = DocumentAnalysis {
            text: "Tenant Rahul pays 500".into(),
            title: "Lease".into(),
            doc_type: "lease".into(),
            jurisdiction: None,
            similarity_tags: BTreeSet::new(),
            variables: vec![
                VariableDefinition::new("tenant", "Tenant").example("Rahul"),
                VariableDefinition::new("rent", "Rent").example("500"),
            ],
            rejected: vec![],
        };

        let template = svc.create_template(analysis).unwrap();
        assert_eq!(template.template_id.as_str(), "tpl_lease_v2");
        assert_eq!(template.body_markdown, "Tenant {{tenant}} pays {{rent}}");
    }

    #[test]
    fn create_template_retries_on_concurrent_insert() {
        let mut store = MockTemplateStore::new();
        store.expect_exists().returning(|_| Ok(false));
        store.expect_insert().returning(|t| {
            if t.template_id.as_str() == "tpl_lease_v1" {
                Err(ApplicationError::TemplateExists {
                    id: t.template_id.to_string(),
                }
                .into())
            } else {
                Ok(())
            }
        });

        let svc = service(MockTextExtractor::new(), MockVariableProposer::new(), store);
        let analysis = DocumentAnalysis {
            text: "x".into(),
            title: "Lease".into(),
            doc_type: "lease".into(),
            jurisdiction: None,
            similarity_tags: BTreeSet::new(),
            variables: vec![],
            rejected: vec![],
        };

        let template = svc.create_template(analysis).unwrap();
        assert_eq!(template.template_id.as_str(), "tpl_lease_v2");
    }
}
