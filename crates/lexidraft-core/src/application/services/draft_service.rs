//! Draft Service - answers in, drafts out.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::{
    application::{
        ApplicationError,
        ports::{DraftStore, TemplateStore},
    },
    domain::{
        AnswerSet, DomainValidator as validator, DraftInstance, TemplateId, ValidationErrors,
        render,
    },
    error::LexiResult,
};

/// What to do when answers fail validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DraftMode {
    /// Refuse to render. Nothing is stored.
    #[default]
    Strict,
    /// Render anyway and report the problems alongside the draft.
    Lenient,
}

/// A stored draft plus the validation result it was rendered with.
#[derive(Debug, Clone, PartialEq)]
pub struct DraftOutcome {
    pub draft: DraftInstance,
    pub validation: ValidationErrors,
}

pub struct DraftService {
    templates: Arc<dyn TemplateStore>,
    drafts: Arc<dyn DraftStore>,
    mode: DraftMode,
}

impl DraftService {
    pub fn new(
        templates: Arc<dyn TemplateStore>,
        drafts: Arc<dyn DraftStore>,
        mode: DraftMode,
    ) -> Self {
        Self {
            templates,
            drafts,
            mode,
        }
    }

    pub fn mode(&self) -> DraftMode {
        self.mode
    }

    /// Check `answers` against a stored template without rendering.
    pub fn validate(&self, template_id: &TemplateId, answers: &AnswerSet) -> LexiResult<ValidationErrors> {
        let template = self.templates.get(template_id)?;
        Ok(validator::validate_answers(&template, answers))
    }

    /// Render a draft from a stored template and persist it.
    ///
    /// # Errors
    /// - `TemplateNotFound` if the template does not exist
    /// - `AnswersRejected` in [`DraftMode::Strict`] when validation fails
    #[instrument(skip(self, answers, user_query), fields(template_id = %template_id, mode = ?self.mode))]
    pub fn generate(
        &self,
        template_id: &TemplateId,
        answers: AnswerSet,
        user_query: Option<String>,
    ) -> LexiResult<DraftOutcome> {
        let template = self.templates.get(template_id)?;
        let validation = validator::validate_answers(&template, &answers);

        if !validation.is_valid() {
            match self.mode {
                DraftMode::Strict => {
                    return Err(ApplicationError::AnswersRejected { errors: validation }.into());
                }
                DraftMode::Lenient => {
                    warn!(failed = validation.len(), "Rendering draft with invalid answers");
                }
            }
        }

        let markdown = render(&template.body_markdown, &answers);
        let draft = DraftInstance::new(template.template_id, user_query, answers, markdown);
        self.drafts.append(draft.clone())?;
        info!(draft_id = %draft.id, "Draft generated");

        Ok(DraftOutcome { draft, validation })
    }

    /// Drafts rendered from a template, oldest first.
    pub fn history(&self, template_id: &TemplateId) -> LexiResult<Vec<DraftInstance>> {
        let mut drafts = self.drafts.list_for(template_id)?;
        drafts.sort_by_key(|d| d.created_at);
        Ok(drafts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{MockDraftStore, MockTemplateStore};
    use crate::domain::{DataType, Template, VariableDefinition};
    use crate::error::LexiError;

    fn lease() -> Template {
        Template::builder()
            .title("Lease")
            .body("Tenant {{tenant}} pays {{rent}}.")
            .variable(VariableDefinition::new("tenant", "Tenant").required())
            .variable(VariableDefinition::new("rent", "Rent").data_type(DataType::Number))
            .build()
            .unwrap()
    }

    fn templates() -> Arc<MockTemplateStore> {
        let mut store = MockTemplateStore::new();
        store.expect_get().returning(|_| Ok(lease()));
        Arc::new(store)
    }

    #[test]
    fn strict_mode_refuses_invalid_answers() {
        let mut drafts = MockDraftStore::new();
        drafts.expect_append().never();

        let svc = DraftService::new(templates(), Arc::new(drafts), DraftMode::Strict);
        let err = svc
            .generate(&"tpl_lease_v1".into(), AnswerSet::new().with("rent", "lots"), None)
            .unwrap_err();

        let LexiError::Application(ApplicationError::AnswersRejected { errors }) = err else {
            panic!("expected AnswersRejected, got {err:?}");
        };
        assert_eq!(errors.get("tenant"), Some("Tenant is required"));
        assert_eq!(errors.get("rent"), Some("Must be a valid number"));
    }

    #[test]
    fn lenient_mode_renders_and_reports() {
        let mut drafts = MockDraftStore::new();
        drafts.expect_append().times(1).returning(|_| Ok(()));

        let svc = DraftService::new(templates(), Arc::new(drafts), DraftMode::Lenient);
        let outcome = svc
            .generate(&"tpl_lease_v1".into(), AnswerSet::new().with("rent", 500), None)
            .unwrap();

        assert_eq!(outcome.draft.draft_markdown, "Tenant {{tenant}} pays 500.");
        assert_eq!(outcome.validation.len(), 1);
    }

    #[test]
    fn valid_answers_are_stored_with_query() {
        let mut drafts = MockDraftStore::new();
        drafts
            .expect_append()
            .withf(|d| d.user_query.as_deref() == Some("need a lease") && d.answers.len() == 2)
            .times(1)
            .returning(|_| Ok(()));

        let svc = DraftService::new(templates(), Arc::new(drafts), DraftMode::Strict);
        let answers = AnswerSet::new().with("tenant", "Rahul").with("rent", "500");
        let outcome = svc
            .generate(&"tpl_lease_v1".into(), answers, Some("need a lease".into()))
            .unwrap();

        assert!(outcome.validation.is_valid());
        assert_eq!(outcome.draft.template_id.as_str(), "tpl_lease_v1");
        assert_eq!(outcome.draft.draft_markdown, "Tenant Rahul pays 500.");
    }

    #[test]
    fn missing_template_is_not_found() {
        let mut store = MockTemplateStore::new();
        store
            .expect_get()
            .returning(|id| Err(LexiError::not_found(id.as_str())));

        let svc = DraftService::new(Arc::new(store), Arc::new(MockDraftStore::new()), DraftMode::Strict);
        let err = svc.validate(&"nope".into(), &AnswerSet::new()).unwrap_err();
        assert_eq!(err, LexiError::not_found("nope"));
    }
}
