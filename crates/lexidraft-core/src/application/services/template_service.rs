//! Template Service - template management operations.
//!
//! Handles template CRUD operations and identifier allocation.

use std::sync::Arc;

use tracing::{info, instrument};

use crate::{
    application::ports::TemplateStore,
    domain::{DomainValidator as validator, Template, TemplateId},
    error::LexiResult,
};

/// Upper bound on `v<n>` probing when allocating an identifier.
const MAX_VERSION: u32 = 10_000;

/// Service for template operations.
#[derive(Clone)]
pub struct TemplateService {
    store: Arc<dyn TemplateStore>,
}

impl TemplateService {
    pub fn new(store: Arc<dyn TemplateStore>) -> Self {
        Self { store }
    }

    /// Validate and store a new template.
    ///
    /// # Errors
    /// `TemplateExists` when the identifier is taken; domain errors when the
    /// template breaks an invariant.
    #[instrument(skip_all, fields(template_id = %template.template_id))]
    pub fn create(&self, template: Template) -> LexiResult<Template> {
        validator::validate_template(&template)?;
        self.store.insert(template.clone())?;
        info!(variables = template.variables.len(), "Template stored");
        Ok(template)
    }

    pub fn get(&self, id: &TemplateId) -> LexiResult<Template> {
        self.store.get(id)
    }

    /// List templates oldest first, skipping `skip` and returning at most `limit`.
    pub fn list(&self, skip: usize, limit: usize) -> LexiResult<Vec<Template>> {
        let mut templates = self.store.list()?;
        templates.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.template_id.cmp(&b.template_id))
        });
        Ok(templates.into_iter().skip(skip).take(limit).collect())
    }

    /// All templates, same order as [`list`](Self::list).
    pub fn list_all(&self) -> LexiResult<Vec<Template>> {
        self.list(0, usize::MAX)
    }

    #[instrument(skip(self), fields(template_id = %id))]
    pub fn remove(&self, id: &TemplateId) -> LexiResult<()> {
        self.store.remove(id)?;
        info!("Template removed");
        Ok(())
    }

    /// Lowest version `n` such that `tpl_<slug>_v<n>` is not stored yet.
    pub fn next_version(&self, title: &str) -> LexiResult<u32> {
        for version in 1..MAX_VERSION {
            if !self.store.exists(&TemplateId::generate(title, version))? {
                return Ok(version);
            }
        }
        Ok(MAX_VERSION)
    }
}
