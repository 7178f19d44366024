//! Wiring of adapters into the core services.
//!
//! Commands that touch storage open an [`App`]; the rest never create the
//! data directory.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use tracing::debug;

use lexidraft_adapters::{
    FileDraftStore, FileTemplateStore, OfflineMatcher, OfflinePhraser, OfflineProposer,
    PlainTextExtractor, RecordedMatcher, RecordedProposer,
};
use lexidraft_core::application::{
    AssistService, AuthoringService, DraftMode, DraftService, TemplateService,
    ports::{TemplateMatcher, VariableProposer},
};

use crate::{cli::GlobalArgs, config::AppConfig, error::CliResult};

pub struct App {
    config: AppConfig,
    data_dir: PathBuf,
    templates: Arc<FileTemplateStore>,
    drafts: Arc<FileDraftStore>,
}

impl App {
    /// Open the stores under the resolved data directory, creating it if
    /// needed.
    pub fn open(global: &GlobalArgs, config: AppConfig) -> CliResult<Self> {
        let data_dir = config.data_dir(global.data_dir.as_deref());
        debug!(data_dir = %data_dir.display(), "Opening stores");

        Ok(Self {
            templates: Arc::new(FileTemplateStore::open(&data_dir)?),
            drafts: Arc::new(FileDraftStore::open(&data_dir)?),
            data_dir,
            config,
        })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn templates(&self) -> TemplateService {
        TemplateService::new(self.templates.clone())
    }

    pub fn drafts(&self, mode: DraftMode) -> DraftService {
        DraftService::new(self.templates.clone(), self.drafts.clone(), mode)
    }

    /// Authoring with a recorded reply when given, else the configured model.
    pub fn authoring(&self, reply: Option<&Path>) -> CliResult<AuthoringService> {
        let proposer: Arc<dyn VariableProposer> = match reply {
            Some(path) => Arc::new(RecordedProposer::from_file(path)?),
            None => Arc::new(OfflineProposer::new(self.config.generative.clone())),
        };

        Ok(AuthoringService::new(
            Arc::new(PlainTextExtractor::new()),
            proposer,
            self.templates.clone(),
            self.config.documents.limits(),
        ))
    }

    pub fn assist(&self, reply: Option<&Path>) -> CliResult<AssistService> {
        let matcher: Arc<dyn TemplateMatcher> = match reply {
            Some(path) => Arc::new(RecordedMatcher::from_file(path)?),
            None => Arc::new(OfflineMatcher::new(self.config.generative.clone())),
        };

        Ok(AssistService::new(
            self.templates.clone(),
            matcher,
            Arc::new(OfflinePhraser::new(self.config.generative.clone())),
        ))
    }
}
