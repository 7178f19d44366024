//! JSON file-backed stores.
//!
//! # Layout
//!
//! ```text
//! <data_dir>/
//! ├── templates/
//! │   └── tpl_residential_lease_v1.json      ← template + all its variables
//! └── drafts/
//!     └── tpl_residential_lease_v1/
//!         └── 20250105T101500.123_<uuid>.json
//! ```
//!
//! Every write goes to a hidden temporary file in the target directory and
//! is then moved into place, so readers see either the whole document or
//! nothing. Template inserts use a hard link for the final step, which fails
//! when the name is already taken and makes "insert if absent" atomic across
//! processes.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use lexidraft_core::{
    application::{
        ApplicationError,
        ports::{DraftStore, TemplateStore},
    },
    domain::{DomainValidator as validator, DraftInstance, Template, TemplateId},
    error::{LexiError, LexiResult},
};

const TEMPLATES_DIR: &str = "templates";
const DRAFTS_DIR: &str = "drafts";

// ============================================================================
// Templates
// ============================================================================

/// One JSON document per template under `<data_dir>/templates/`.
#[derive(Debug, Clone)]
pub struct FileTemplateStore {
    dir: PathBuf,
}

impl FileTemplateStore {
    /// Open (and create if needed) the template directory under `data_dir`.
    pub fn open(data_dir: impl AsRef<Path>) -> LexiResult<Self> {
        let dir = data_dir.as_ref().join(TEMPLATES_DIR);
        fs::create_dir_all(&dir).map_err(|e| map_io_error(&dir, e, "create directory"))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, id: &TemplateId) -> LexiResult<PathBuf> {
        Ok(self.dir.join(format!("{}.json", file_stem(id)?)))
    }
}

impl TemplateStore for FileTemplateStore {
    fn get(&self, id: &TemplateId) -> LexiResult<Template> {
        let path = self.path_for(id)?;
        match fs::read_to_string(&path) {
            Ok(raw) => decode(&path, &raw),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(LexiError::not_found(id.as_str())),
            Err(e) => Err(map_io_error(&path, e, "read template")),
        }
    }

    fn exists(&self, id: &TemplateId) -> LexiResult<bool> {
        Ok(self.path_for(id)?.is_file())
    }

    #[instrument(skip(self), fields(dir = %self.dir.display()))]
    fn list(&self) -> LexiResult<Vec<Template>> {
        let mut templates = Vec::new();

        for path in json_files(&self.dir)? {
            let loaded = fs::read_to_string(&path)
                .map_err(|e| map_io_error(&path, e, "read template"))
                .and_then(|raw| decode::<Template>(&path, &raw));

            match loaded {
                Ok(template) => templates.push(template),
                Err(e) => {
                    // One corrupt document must not hide the others.
                    warn!(path = %path.display(), error = %e, "skipping unreadable template");
                }
            }
        }

        debug!(count = templates.len(), "listed templates");
        Ok(templates)
    }

    #[instrument(skip_all, fields(template_id = %template.template_id))]
    fn insert(&self, template: Template) -> LexiResult<()> {
        validator::validate_template(&template)?;

        let path = self.path_for(&template.template_id)?;
        let tmp = write_temp(&self.dir, &template)?;

        let linked = fs::hard_link(&tmp, &path);
        remove_temp(&tmp);

        match linked {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Err(ApplicationError::TemplateExists {
                id: template.template_id.to_string(),
            }
            .into()),
            Err(e) => Err(map_io_error(&path, e, "store template")),
        }
    }

    fn remove(&self, id: &TemplateId) -> LexiResult<()> {
        let path = self.path_for(id)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(LexiError::not_found(id.as_str())),
            Err(e) => Err(map_io_error(&path, e, "remove template")),
        }
    }
}

// ============================================================================
// Drafts
// ============================================================================

/// Append-only draft log under `<data_dir>/drafts/<template_id>/`.
#[derive(Debug, Clone)]
pub struct FileDraftStore {
    dir: PathBuf,
}

impl FileDraftStore {
    pub fn open(data_dir: impl AsRef<Path>) -> LexiResult<Self> {
        let dir = data_dir.as_ref().join(DRAFTS_DIR);
        fs::create_dir_all(&dir).map_err(|e| map_io_error(&dir, e, "create directory"))?;
        Ok(Self { dir })
    }

    fn dir_for(&self, id: &TemplateId) -> LexiResult<PathBuf> {
        Ok(self.dir.join(file_stem(id)?))
    }
}

impl DraftStore for FileDraftStore {
    #[instrument(skip_all, fields(template_id = %draft.template_id, draft_id = %draft.id))]
    fn append(&self, draft: DraftInstance) -> LexiResult<()> {
        let dir = self.dir_for(&draft.template_id)?;
        fs::create_dir_all(&dir).map_err(|e| map_io_error(&dir, e, "create directory"))?;

        let name = format!(
            "{}_{}.json",
            draft.created_at.format("%Y%m%dT%H%M%S%.3f"),
            draft.id
        );
        let path = dir.join(name);
        let tmp = write_temp(&dir, &draft)?;

        fs::rename(&tmp, &path).map_err(|e| {
            remove_temp(&tmp);
            map_io_error(&path, e, "store draft")
        })
    }

    fn list_for(&self, template_id: &TemplateId) -> LexiResult<Vec<DraftInstance>> {
        let dir = self.dir_for(template_id)?;
        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut drafts = Vec::new();
        for path in json_files(&dir)? {
            let raw = fs::read_to_string(&path).map_err(|e| map_io_error(&path, e, "read draft"))?;
            match decode::<DraftInstance>(&path, &raw) {
                Ok(draft) => drafts.push(draft),
                Err(e) => warn!(path = %path.display(), error = %e, "skipping unreadable draft"),
            }
        }

        drafts.sort_by_key(|d| d.created_at);
        Ok(drafts)
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Template ids become file names, so they must not be able to escape the
/// store directory.
fn file_stem(id: &TemplateId) -> LexiResult<&str> {
    let stem = id.as_str();
    let usable = !stem.is_empty()
        && !stem.starts_with('.')
        && stem
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'));

    if usable {
        Ok(stem)
    } else {
        Err(ApplicationError::Storage {
            path: PathBuf::from(stem),
            reason: "template id is not usable as a file name".into(),
        }
        .into())
    }
}

/// Visible `*.json` files in `dir`, sorted by name.
fn json_files(dir: &Path) -> LexiResult<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).map_err(|e| map_io_error(dir, e, "read directory"))?;

    let mut paths = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| map_io_error(dir, e, "read directory entry"))?.path();
        let hidden = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with('.'));
        if path.is_file() && !hidden && path.extension().is_some_and(|ext| ext == "json") {
            paths.push(path);
        }
    }

    paths.sort();
    Ok(paths)
}

fn write_temp<T: Serialize>(dir: &Path, value: &T) -> LexiResult<PathBuf> {
    let json = serde_json::to_vec_pretty(value).map_err(|e| ApplicationError::Storage {
        path: dir.to_path_buf(),
        reason: format!("Failed to serialize: {e}"),
    })?;

    let tmp = dir.join(format!(".tmp-{}", Uuid::new_v4()));
    fs::write(&tmp, json).map_err(|e| map_io_error(&tmp, e, "write file"))?;
    Ok(tmp)
}

fn remove_temp(tmp: &Path) {
    if let Err(e) = fs::remove_file(tmp) {
        warn!(path = %tmp.display(), error = %e, "failed to remove temporary file");
    }
}

fn decode<T: DeserializeOwned>(path: &Path, raw: &str) -> LexiResult<T> {
    serde_json::from_str(raw).map_err(|e| {
        ApplicationError::Storage {
            path: path.to_path_buf(),
            reason: format!("Failed to parse: {e}"),
        }
        .into()
    })
}

fn map_io_error(path: &Path, e: io::Error, operation: &str) -> LexiError {
    ApplicationError::Storage {
        path: path.to_path_buf(),
        reason: format!("Failed to {}: {}", operation, e),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use lexidraft_core::domain::{AnswerSet, DataType, VariableDefinition};
    use tempfile::TempDir;

    use super::*;

    fn lease() -> Template {
        Template::builder()
            .title("Lease")
            .body("{{tenant}} pays {{rent}}")
            .variable(VariableDefinition::new("tenant", "Tenant").required())
            .variable(VariableDefinition::new("rent", "Rent").data_type(DataType::Number))
            .build()
            .unwrap()
    }

    #[test]
    fn template_round_trips_with_variables() {
        let temp = TempDir::new().unwrap();
        let store = FileTemplateStore::open(temp.path()).unwrap();

        store.insert(lease()).unwrap();
        let got = store.get(&"tpl_lease_v1".into()).unwrap();

        assert_eq!(got, lease_with_time(got.created_at));
        assert!(temp.path().join("templates/tpl_lease_v1.json").is_file());
    }

    fn lease_with_time(created_at: chrono::DateTime<chrono::Utc>) -> Template {
        let mut t = lease();
        t.created_at = created_at;
        t
    }

    #[test]
    fn insert_does_not_overwrite() {
        let temp = TempDir::new().unwrap();
        let store = FileTemplateStore::open(temp.path()).unwrap();

        store.insert(lease()).unwrap();
        let err = store.insert(lease()).unwrap_err();
        assert!(matches!(
            err,
            LexiError::Application(ApplicationError::TemplateExists { .. })
        ));
        assert_eq!(store.list().unwrap().len(), 1);
    }

    #[test]
    fn no_temporary_files_are_left_behind() {
        let temp = TempDir::new().unwrap();
        let store = FileTemplateStore::open(temp.path()).unwrap();
        store.insert(lease()).unwrap();
        let _ = store.insert(lease());

        let names: Vec<_> = fs::read_dir(store.dir())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, vec!["tpl_lease_v1.json"]);
    }

    #[test]
    fn corrupt_documents_are_skipped_by_list() {
        let temp = TempDir::new().unwrap();
        let store = FileTemplateStore::open(temp.path()).unwrap();
        store.insert(lease()).unwrap();
        fs::write(store.dir().join("broken.json"), "{ not json").unwrap();

        assert_eq!(store.list().unwrap().len(), 1);
        assert!(matches!(
            store.get(&"broken".into()).unwrap_err(),
            LexiError::Application(ApplicationError::Storage { .. })
        ));
    }

    #[test]
    fn remove_and_missing() {
        let temp = TempDir::new().unwrap();
        let store = FileTemplateStore::open(temp.path()).unwrap();
        store.insert(lease()).unwrap();

        store.remove(&"tpl_lease_v1".into()).unwrap();
        assert!(!store.exists(&"tpl_lease_v1".into()).unwrap());
        assert_eq!(
            store.get(&"tpl_lease_v1".into()).unwrap_err(),
            LexiError::not_found("tpl_lease_v1")
        );
    }

    #[test]
    fn path_like_ids_are_refused() {
        let temp = TempDir::new().unwrap();
        let store = FileTemplateStore::open(temp.path()).unwrap();
        assert!(store.get(&"../escape".into()).is_err());
        assert!(store.get(&".hidden".into()).is_err());
    }

    #[test]
    fn drafts_are_listed_oldest_first() {
        let temp = TempDir::new().unwrap();
        let drafts = FileDraftStore::open(temp.path()).unwrap();
        let id: TemplateId = "tpl_lease_v1".into();

        let mut first = DraftInstance::new(id.clone(), None, AnswerSet::new(), "one".into());
        first.created_at -= chrono::Duration::minutes(5);
        let second = DraftInstance::new(id.clone(), None, AnswerSet::new(), "two".into());

        drafts.append(second).unwrap();
        drafts.append(first).unwrap();

        let listed: Vec<_> = drafts
            .list_for(&id)
            .unwrap()
            .into_iter()
            .map(|d| d.draft_markdown)
            .collect();
        assert_eq!(listed, vec!["one", "two"]);
        assert!(drafts.list_for(&"tpl_other_v1".into()).unwrap().is_empty());
    }
}
