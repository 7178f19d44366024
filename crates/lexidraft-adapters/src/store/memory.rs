//! In-memory stores.

use std::{
    collections::HashMap,
    sync::{Arc, RwLock},
};

use lexidraft_core::{
    application::{
        ApplicationError,
        ports::{DraftStore, TemplateStore},
    },
    domain::{DomainValidator as validator, DraftInstance, Template, TemplateId},
    error::{LexiError, LexiResult},
};

/// Thread-safe in-memory template store.
#[derive(Clone, Default)]
pub struct InMemoryTemplateStore {
    inner: Arc<RwLock<HashMap<TemplateId, Template>>>,
}

impl InMemoryTemplateStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-filled with `templates`.
    pub fn with_templates(templates: impl IntoIterator<Item = Template>) -> LexiResult<Self> {
        let store = Self::new();
        for template in templates {
            store.insert(template)?;
        }
        Ok(store)
    }

    /// Get the number of templates.
    pub fn len(&self) -> usize {
        self.inner.read().map(|inner| inner.len()).unwrap_or(0)
    }

    /// Check if store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl TemplateStore for InMemoryTemplateStore {
    fn get(&self, id: &TemplateId) -> LexiResult<Template> {
        let inner = self
            .inner
            .read()
            .map_err(|_| ApplicationError::StoreLockError)?;

        inner
            .get(id)
            .cloned()
            .ok_or_else(|| LexiError::not_found(id.as_str()))
    }

    fn exists(&self, id: &TemplateId) -> LexiResult<bool> {
        let inner = self
            .inner
            .read()
            .map_err(|_| ApplicationError::StoreLockError)?;

        Ok(inner.contains_key(id))
    }

    fn list(&self) -> LexiResult<Vec<Template>> {
        let inner = self
            .inner
            .read()
            .map_err(|_| ApplicationError::StoreLockError)?;

        Ok(inner.values().cloned().collect())
    }

    fn insert(&self, template: Template) -> LexiResult<()> {
        // Validate before insertion
        validator::validate_template(&template)?;

        let mut inner = self
            .inner
            .write()
            .map_err(|_| ApplicationError::StoreLockError)?;

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
        let mut inner = self
            .inner
            .write()
            .map_err(|_| ApplicationError::StoreLockError)?;

        inner
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| LexiError::not_found(id.as_str()))
    }
}

/// Thread-safe in-memory draft log.
#[derive(Clone, Default)]
pub struct InMemoryDraftStore {
    inner: Arc<RwLock<Vec<DraftInstance>>>,
}

impl InMemoryDraftStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DraftStore for InMemoryDraftStore {
    fn append(&self, draft: DraftInstance) -> LexiResult<()> {
        self.inner
            .write()
            .map_err(|_| ApplicationError::StoreLockError)?
            .push(draft);
        Ok(())
    }

    fn list_for(&self, template_id: &TemplateId) -> LexiResult<Vec<DraftInstance>> {
        let inner = self
            .inner
            .read()
            .map_err(|_| ApplicationError::StoreLockError)?;

        Ok(inner
            .iter()
            .filter(|d| &d.template_id == template_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use lexidraft_core::domain::{AnswerSet, VariableDefinition};

    use super::*;

    fn template(title: &str) -> Template {
        Template::builder().title(title).build().unwrap()
    }

    #[test]
    fn insert_then_get() {
        let store = InMemoryTemplateStore::new();
        store.insert(template("Lease")).unwrap();

        let got = store.get(&"tpl_lease_v1".into()).unwrap();
        assert_eq!(got.title, "Lease");
        assert!(store.exists(&"tpl_lease_v1".into()).unwrap());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn duplicate_insert_is_rejected() {
        let store = InMemoryTemplateStore::with_templates([template("Lease")]).unwrap();
        let err = store.insert(template("Lease")).unwrap_err();
        assert!(matches!(
            err,
            LexiError::Application(ApplicationError::TemplateExists { .. })
        ));
    }

    #[test]
    fn invalid_template_is_rejected() {
        let mut bad = template("Lease");
        bad.variables = vec![
            VariableDefinition::new("a", "A"),
            VariableDefinition::new("a", "A again"),
        ];
        assert!(InMemoryTemplateStore::new().insert(bad).is_err());
    }

    #[test]
    fn remove_missing_is_not_found() {
        let store = InMemoryTemplateStore::new();
        assert_eq!(
            store.remove(&"tpl_x_v1".into()).unwrap_err(),
            LexiError::not_found("tpl_x_v1")
        );
    }

    #[test]
    fn drafts_are_filtered_by_template() {
        let drafts = InMemoryDraftStore::new();
        for id in ["tpl_a_v1", "tpl_b_v1", "tpl_a_v1"] {
            drafts
                .append(DraftInstance::new(id.into(), None, AnswerSet::new(), String::new()))
                .unwrap();
        }
        assert_eq!(drafts.list_for(&"tpl_a_v1".into()).unwrap().len(), 2);
    }
}
