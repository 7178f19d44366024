//! Integration tests for lexidraft-core.
//!
//! The adapters crate depends on this one, so the ports are satisfied here
//! with small fixed stubs.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::thread;

use lexidraft_core::{
    application::{
        ApplicationError, AssistService, AuthoringService, DocumentLimits, DraftMode,
        DraftService, MatchReply, TemplateService, VariableProposal,
        ports::{
            DraftStore, QuestionPhraser, TemplateMatcher, TemplateStore, TextExtractor,
            VariableProposer,
        },
    },
    domain::{Confidence, VariableDraftInput},
    error::{LexiError, LexiResult},
    prelude::*,
};

// ----------------------------------------------------------------------------
// Stubs
// ----------------------------------------------------------------------------

#[derive(Default)]
struct Templates(Mutex<HashMap<TemplateId, Template>>);

impl TemplateStore for Templates {
    fn get(&self, id: &TemplateId) -> LexiResult<Template> {
        self.0
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or_else(|| LexiError::not_found(id.as_str()))
    }

    fn exists(&self, id: &TemplateId) -> LexiResult<bool> {
        Ok(self.0.lock().unwrap().contains_key(id))
    }

    fn list(&self) -> LexiResult<Vec<Template>> {
        Ok(self.0.lock().unwrap().values().cloned().collect())
    }

    fn insert(&self, template: Template) -> LexiResult<()> {
        let mut inner = self.0.lock().unwrap();
        if inner.contains_key(&template.template_id) {
            return Err(ApplicationError::TemplateExists {
                id: template.template_id.to_string(),
            }
            .into());
        }
        inner.insert(template.template_id.clone(), template);
        Ok(())
    }

    fn remove(&self, id: &TemplateId) -> LexiResult<()> {
        self.0
            .lock()
            .unwrap()
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| LexiError::not_found(id.as_str()))
    }
}

#[derive(Default)]
struct Drafts(Mutex<Vec<DraftInstance>>);

impl DraftStore for Drafts {
    fn append(&self, draft: DraftInstance) -> LexiResult<()> {
        self.0.lock().unwrap().push(draft);
        Ok(())
    }

    fn list_for(&self, template_id: &TemplateId) -> LexiResult<Vec<DraftInstance>> {
        Ok(self
            .0
            .lock()
            .unwrap()
            .iter()
            .filter(|d| &d.template_id == template_id)
            .cloned()
            .collect())
    }
}

struct Utf8Extractor;

impl TextExtractor for Utf8Extractor {
    fn extract_text(&self, bytes: &[u8], _mime_type: &str) -> LexiResult<String> {
        String::from_utf8(bytes.to_vec()).map_err(|e| {
            ApplicationError::ExtractionFailed {
                reason: e.to_string(),
            }
            .into()
        })
    }
}

struct LeaseProposer;

impl VariableProposer for LeaseProposer {
    fn propose_variables(&self, _text: &str, _keys: &[String]) -> LexiResult<VariableProposal> {
        let var = |key: &str, label: &str, example: &str, dtype: &str, required: bool| {
            VariableDraftInput {
                key: Some(key.into()),
                label: Some(label.into()),
                example: Some(example.into()),
                data_type: Some(dtype.into()),
                required: Some(required),
                ..Default::default()
            }
        };
        Ok(VariableProposal {
            variables: vec![
                var("landlord_name", "Landlord Name", "Priya Sharma", "string", true),
                var("monthly_rent", "Monthly Rent", "25000", "number", true),
                var("start_date", "Start Date", "2024-04-01", "date", false),
                var("Bad Key", "Ignored", "x", "string", false),
            ],
            title: Some("Residential Lease Agreement".into()),
            doc_type: Some("lease".into()),
            jurisdiction: Some("IN".into()),
            similarity_tags: vec!["rental".into(), "housing".into()],
        })
    }
}

struct DownProposer;

impl VariableProposer for DownProposer {
    fn propose_variables(&self, _text: &str, _keys: &[String]) -> LexiResult<VariableProposal> {
        Err(ApplicationError::Collaborator {
            name: "proposer",
            reason: "unavailable".into(),
        }
        .into())
    }
}

struct FirstCandidate(f64);

impl TemplateMatcher for FirstCandidate {
    fn match_template(&self, _query: &str, candidates: &[Template]) -> LexiResult<Option<MatchReply>> {
        Ok(candidates.first().map(|t| MatchReply {
            template_id: t.template_id.clone(),
            confidence: Confidence::new(self.0),
            reasoning: "only candidate".into(),
        }))
    }
}

struct SilentPhraser;

impl QuestionPhraser for SilentPhraser {
    fn phrase_question(&self, _variable: &VariableDefinition) -> LexiResult<String> {
        Err(ApplicationError::Collaborator {
            name: "phraser",
            reason: "unavailable".into(),
        }
        .into())
    }
}

const LEASE_TEXT: &str = "This lease is made between Priya Sharma (Landlord) and the Tenant. \
The monthly rent is 25000, payable from 2024-04-01. Priya Sharma may inspect the premises.";

// ----------------------------------------------------------------------------
// Workflows
// ----------------------------------------------------------------------------

#[test]
fn upload_match_question_and_draft() {
    let store: Arc<Templates> = Arc::default();
    let drafts: Arc<Drafts> = Arc::default();

    let authoring = AuthoringService::new(
        Arc::new(Utf8Extractor),
        Arc::new(LeaseProposer),
        store.clone(),
        DocumentLimits::default(),
    );

    let analysis = authoring
        .analyze_document(LEASE_TEXT.as_bytes(), "text/plain")
        .unwrap();
    assert_eq!(analysis.variables.len(), 3);
    assert_eq!(analysis.rejected.len(), 1);

    let template = authoring.create_template(analysis.clone()).unwrap();
    assert_eq!(
        template.template_id.as_str(),
        "tpl_residential_lease_agreement_v1"
    );
    assert!(template.body_markdown.contains("between {{landlord_name}} (Landlord)"));
    assert!(template.body_markdown.contains("{{landlord_name}} may inspect"));
    assert!(!template.body_markdown.contains("25000"));

    // Same title again gets the next version.
    let second = authoring.create_template(analysis).unwrap();
    assert_eq!(
        second.template_id.as_str(),
        "tpl_residential_lease_agreement_v2"
    );

    let assist = AssistService::new(
        store.clone(),
        Arc::new(FirstCandidate(0.9)),
        Arc::new(SilentPhraser),
    );
    assert!(assist.match_query("I need a rental agreement").unwrap().is_some());

    let answers = AnswerSet::new().with("landlord_name", "Rahul Mehta");
    let questions = assist
        .clarifying_questions(&template.template_id, &answers)
        .unwrap();
    let asked: Vec<_> = questions.iter().map(|q| q.question.as_str()).collect();
    assert_eq!(
        asked,
        vec!["Please provide monthly rent", "Please provide start date"]
    );

    let drafting = DraftService::new(store.clone(), drafts.clone(), DraftMode::Strict);
    let rejected = drafting.generate(&template.template_id, answers.clone(), None);
    assert!(matches!(
        rejected,
        Err(LexiError::Application(ApplicationError::AnswersRejected { .. }))
    ));

    let complete = answers
        .with("monthly_rent", 30000)
        .with("start_date", "2025-01-05");
    let outcome = drafting
        .generate(&template.template_id, complete, Some("rental agreement".into()))
        .unwrap();

    assert!(outcome.draft.draft_markdown.contains("between Rahul Mehta (Landlord)"));
    assert!(outcome.draft.draft_markdown.contains("rent is 30000, payable from 2025-01-05"));
    assert_eq!(drafting.history(&template.template_id).unwrap().len(), 1);

    let templates = TemplateService::new(store);
    templates.remove(&second.template_id).unwrap();
    assert_eq!(templates.list_all().unwrap().len(), 1);
}

#[test]
fn core_stays_usable_when_collaborators_are_down() {
    let store: Arc<Templates> = Arc::default();
    let authoring = AuthoringService::new(
        Arc::new(Utf8Extractor),
        Arc::new(DownProposer),
        store.clone(),
        DocumentLimits::default(),
    );

    let analysis = authoring
        .analyze_document(LEASE_TEXT.as_bytes(), "text/plain")
        .unwrap();
    assert_eq!(analysis.title, "Untitled Template");
    assert_eq!(analysis.doc_type, "document");

    let template = authoring.create_template(analysis).unwrap();
    assert_eq!(template.template_id.as_str(), "tpl_untitled_template_v1");
    assert_eq!(template.body_markdown, LEASE_TEXT);

    let assist = AssistService::new(
        store,
        Arc::new(FirstCandidate(0.3)),
        Arc::new(SilentPhraser),
    );
    assert!(assist.match_query("anything").unwrap().is_none());
}

#[test]
fn pure_operations_run_concurrently() {
    let variables = Arc::new(vec![
        VariableDefinition::new("name", "Name").required(),
        VariableDefinition::new("rent", "Rent").data_type(DataType::Number),
    ]);

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let variables = Arc::clone(&variables);
            thread::spawn(move || {
                let answers = AnswerSet::new()
                    .with("name", format!("Tenant {i}"))
                    .with("rent", i * 100);
                assert!(validate_answers(&variables, &answers).is_valid());
                render("{{name}} pays {{rent}}", &answers)
            })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        assert_eq!(handle.join().unwrap(), format!("Tenant {i} pays {}", i * 100));
    }
}
