//! The saved-projects collection and structure cache.
//!
//! All projects live under a single `projects` key as a JSON array, the way
//! the browser client kept them. Every mutation is a read-modify-write of that
//! array under a process-local lock.
//!
//! Records that fail to parse are never dropped: they are carried through
//! every rewrite byte-for-byte, after the readable ones.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use chrono::Utc;
use sage_core::entities::{PaperStructure, ProjectRecord, WizardData};
use sage_core::ids;

use crate::error::StoreError;
use crate::kv::KeyValueStore;

pub const PROJECTS_KEY: &str = "projects";
pub const ACTIVE_PROJECT_KEY: &str = "active_project";
pub const CORRUPT_BACKUP_KEY: &str = "projects.corrupt";
const STRUCTURE_CACHE_PREFIX: &str = "structure_cache";

/// Cache key for a generated paper structure.
#[must_use]
pub fn structure_cache_key(paper_type: &str, methodology_id: Option<&str>) -> String {
    format!(
        "{STRUCTURE_CACHE_PREFIX}:{paper_type}:{}",
        methodology_id.unwrap_or("none")
    )
}

/// The parsed collection plus the raw records that did not parse.
#[derive(Default)]
struct Collection {
    records: Vec<ProjectRecord>,
    unreadable: Vec<serde_json::Value>,
}

/// Project persistence over any [`KeyValueStore`].
pub struct ProjectStore<S> {
    kv: Arc<S>,
    write_lock: Arc<Mutex<()>>,
}

impl<S> Clone for ProjectStore<S> {
    fn clone(&self) -> Self {
        Self {
            kv: Arc::clone(&self.kv),
            write_lock: Arc::clone(&self.write_lock),
        }
    }
}

impl<S: KeyValueStore> ProjectStore<S> {
    pub fn new(kv: S) -> Self {
        Self {
            kv: Arc::new(kv),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    #[must_use]
    pub fn kv(&self) -> &S {
        &self.kv
    }

    // -- collection ---------------------------------------------------------

    /// All saved projects, in save order.
    pub fn list(&self) -> Result<Vec<ProjectRecord>, StoreError> {
        let _guard = self.lock();
        Ok(self.load()?.records)
    }

    pub fn get(&self, id: &str) -> Result<ProjectRecord, StoreError> {
        self.list()?
            .into_iter()
            .find(|p| p.id == id)
            .ok_or_else(|| StoreError::ProjectNotFound(id.to_string()))
    }

    /// Create a new record from the current wizard snapshot.
    pub fn save_new(
        &self,
        name: &str,
        description: &str,
        data: WizardData,
    ) -> Result<ProjectRecord, StoreError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StoreError::Validation("project name is required".into()));
        }
        let _guard = self.lock();
        let mut projects = self.load()?;
        let now = Utc::now();
        let record = ProjectRecord {
            id: fresh_id(&projects.records),
            name: name.to_string(),
            description: description.trim().to_string(),
            created_at: now,
            updated_at: now,
            data,
        };
        projects.records.push(record.clone());
        self.store(&projects)?;
        tracing::info!(id = %record.id, name = %record.name, "project saved");
        Ok(record)
    }

    /// Copy project `id` with `data` under a new record. The name defaults
    /// to `"<name> - Copy"`.
    pub fn save_as(
        &self,
        id: &str,
        name: Option<&str>,
        data: WizardData,
    ) -> Result<ProjectRecord, StoreError> {
        let source = self.get(id)?;
        let name = name.map_or_else(|| format!("{} - Copy", source.name), str::to_string);
        self.save_new(&name, &source.description, data)
    }

    /// Overwrite the `data` snapshot of project `id` in place.
    ///
    /// Every other record is left byte-for-byte as it was loaded.
    pub fn quick_save(&self, id: &str, data: WizardData) -> Result<ProjectRecord, StoreError> {
        let _guard = self.lock();
        let mut projects = self.load()?;
        let record = projects
            .records
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| StoreError::ProjectNotFound(id.to_string()))?;
        record.data = data;
        record.updated_at = Utc::now();
        let saved = record.clone();
        self.store(&projects)?;
        tracing::debug!(id, "project quick-saved");
        Ok(saved)
    }

    pub fn delete(&self, id: &str) -> Result<(), StoreError> {
        let _guard = self.lock();
        let mut projects = self.load()?;
        let before = projects.records.len();
        projects.records.retain(|p| p.id != id);
        if projects.records.len() == before {
            return Err(StoreError::ProjectNotFound(id.to_string()));
        }
        self.store(&projects)?;
        if self.active_id()?.as_deref() == Some(id) {
            self.kv.remove(ACTIVE_PROJECT_KEY)?;
        }
        tracing::info!(id, "project deleted");
        Ok(())
    }

    // -- export / import ----------------------------------------------------

    /// Write project `id` as pretty JSON. When `dest` is a directory the
    /// file is named after the project.
    pub fn export(&self, id: &str, dest: &Path) -> Result<PathBuf, StoreError> {
        let record = self.get(id)?;
        let path = if dest.is_dir() {
            dest.join(record.export_file_name())
        } else {
            dest.to_path_buf()
        };
        let json = serde_json::to_string_pretty(&record)?;
        std::fs::write(&path, json)?;
        tracing::info!(id, path = %path.display(), "project exported");
        Ok(path)
    }

    /// Read an exported project and add it under a fresh id.
    pub fn import(&self, path: &Path) -> Result<ProjectRecord, StoreError> {
        let text = std::fs::read_to_string(path)?;
        let mut record: ProjectRecord = serde_json::from_str(&text)?;
        record.data.migrate_legacy_drafts();

        let _guard = self.lock();
        let mut projects = self.load()?;
        record.id = fresh_id(&projects.records);
        record.updated_at = Utc::now();
        projects.records.push(record.clone());
        self.store(&projects)?;
        tracing::info!(id = %record.id, path = %path.display(), "project imported");
        Ok(record)
    }

    // -- active project -----------------------------------------------------

    pub fn active_id(&self) -> Result<Option<String>, StoreError> {
        Ok(self
            .kv
            .get(ACTIVE_PROJECT_KEY)?
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty()))
    }

    /// The active project, if one is set and still exists.
    pub fn active(&self) -> Result<Option<ProjectRecord>, StoreError> {
        let Some(id) = self.active_id()? else {
            return Ok(None);
        };
        match self.get(&id) {
            Ok(record) => Ok(Some(record)),
            Err(StoreError::ProjectNotFound(_)) => {
                tracing::warn!(%id, "active project no longer exists");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    pub fn set_active(&self, id: &str) -> Result<(), StoreError> {
        self.get(id)?;
        self.kv.set(ACTIVE_PROJECT_KEY, id)
    }

    // -- structure cache ----------------------------------------------------

    pub fn cached_structure(
        &self,
        paper_type: &str,
        methodology_id: Option<&str>,
    ) -> Result<Option<PaperStructure>, StoreError> {
        let key = structure_cache_key(paper_type, methodology_id);
        let Some(text) = self.kv.get(&key)? else {
            return Ok(None);
        };
        match serde_json::from_str(&text) {
            Ok(structure) => Ok(Some(structure)),
            Err(e) => {
                tracing::warn!(key, error = %e, "discarding unreadable structure cache entry");
                self.kv.remove(&key)?;
                Ok(None)
            }
        }
    }

    pub fn cache_structure(
        &self,
        methodology_id: Option<&str>,
        structure: &PaperStructure,
    ) -> Result<(), StoreError> {
        let key = structure_cache_key(&structure.paper_type, methodology_id);
        self.kv.set(&key, &serde_json::to_string(structure)?)
    }

    // -- internals ----------------------------------------------------------

    fn lock(&self) -> std::sync::MutexGuard<'_, ()> {
        self.write_lock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Parse the collection. An unreadable collection is backed up and
    /// treated as empty. Unreadable records are hidden from callers but kept
    /// as raw JSON. Records from older clients are normalized and written
    /// back once so that generated outline ids stay stable.
    fn load(&self) -> Result<Collection, StoreError> {
        let Some(text) = self.kv.get(PROJECTS_KEY)? else {
            return Ok(Collection::default());
        };
        let raw: Vec<serde_json::Value> = match serde_json::from_str(&text) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(error = %e, "project collection is corrupt; treating as empty");
                self.kv.set(CORRUPT_BACKUP_KEY, &text)?;
                return Ok(Collection::default());
            }
        };

        let mut projects = Collection {
            records: Vec::with_capacity(raw.len()),
            unreadable: Vec::new(),
        };
        let mut normalized = false;
        for value in raw {
            match serde_json::from_value::<ProjectRecord>(value.clone()) {
                Ok(mut record) => {
                    if !record.data.migrate_legacy_drafts().is_empty() {
                        normalized = true;
                    }
                    if !normalized && serde_json::to_value(&record)? != value {
                        normalized = true;
                    }
                    projects.records.push(record);
                }
                Err(e) => {
                    let id = value.get("id").map(ToString::to_string).unwrap_or_default();
                    tracing::warn!(%id, error = %e, "keeping unreadable project record as-is");
                    projects.unreadable.push(value);
                }
            }
        }
        if normalized {
            tracing::info!(count = projects.records.len(), "normalizing stored projects");
            self.store(&projects)?;
        }
        Ok(projects)
    }

    /// Write readable records followed by the untouched unreadable ones.
    fn store(&self, projects: &Collection) -> Result<(), StoreError> {
        let mut raw = Vec::with_capacity(projects.records.len() + projects.unreadable.len());
        for record in &projects.records {
            raw.push(serde_json::to_value(record)?);
        }
        raw.extend(projects.unreadable.iter().cloned());
        self.kv.set(PROJECTS_KEY, &serde_json::to_string(&raw)?)
    }
}

/// A project id not used by any record in `projects`.
fn fresh_id(projects: &[ProjectRecord]) -> String {
    loop {
        let id = ids::generate_project_id();
        if projects.iter().all(|p| p.id != id) {
            return id;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::MemoryStore;
    use pretty_assertions::assert_eq;
    use sage_core::enums::PaperLength;

    fn store() -> ProjectStore<MemoryStore> {
        ProjectStore::new(MemoryStore::new())
    }

    fn thesis(text: &str) -> WizardData {
        WizardData {
            thesis_draft: text.into(),
            ..WizardData::default()
        }
    }

    #[test]
    fn save_new_requires_a_name() {
        let err = store().save_new("   ", "", WizardData::default()).unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
    }

    #[test]
    fn quick_save_unknown_id_is_not_found() {
        let err = store()
            .quick_save("prj-0-00000000", WizardData::default())
            .unwrap_err();
        assert!(matches!(err, StoreError::ProjectNotFound(_)));
    }

    #[test]
    fn save_as_defaults_to_copy_name() {
        let s = store();
        let original = s.save_new("Wages", "seminar", thesis("a")).unwrap();
        let copy = s.save_as(&original.id, None, thesis("b")).unwrap();
        assert_eq!(copy.name, "Wages - Copy");
        assert_eq!(copy.description, "seminar");
        assert_ne!(copy.id, original.id);
        assert_eq!(s.get(&original.id).unwrap().data.thesis_draft, "a");
    }

    #[test]
    fn delete_clears_active_pointer() {
        let s = store();
        let p = s.save_new("P", "", WizardData::default()).unwrap();
        s.set_active(&p.id).unwrap();
        s.delete(&p.id).unwrap();
        assert_eq!(s.active_id().unwrap(), None);
        assert!(matches!(
            s.delete(&p.id),
            Err(StoreError::ProjectNotFound(_))
        ));
    }

    #[test]
    fn corrupt_collection_is_backed_up_and_empty() {
        let s = store();
        s.kv().set(PROJECTS_KEY, "{not json").unwrap();
        assert!(s.list().unwrap().is_empty());
        assert_eq!(
            s.kv().get(CORRUPT_BACKUP_KEY).unwrap().as_deref(),
            Some("{not json")
        );
        // Saving still works afterwards.
        s.save_new("Fresh", "", WizardData::default()).unwrap();
        assert_eq!(s.list().unwrap().len(), 1);
    }

    #[test]
    fn unreadable_records_are_skipped() {
        let s = store();
        let good = s.save_new("Good", "", WizardData::default()).unwrap();
        let mut raw: Vec<serde_json::Value> =
            serde_json::from_str(&s.kv().get(PROJECTS_KEY).unwrap().unwrap()).unwrap();
        raw.push(serde_json::json!({ "id": 7 }));
        s.kv()
            .set(PROJECTS_KEY, &serde_json::to_string(&raw).unwrap())
            .unwrap();

        let projects = s.list().unwrap();
        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].id, good.id);
    }

    #[test]
    fn unreadable_records_survive_reads_and_writes() {
        let s = store();
        let odd = serde_json::json!({
            "id": "1700000000000",
            "name": "Old",
            "createdAt": "2024-01-01T00:00:00Z",
            "updatedAt": "2024-01-01T00:00:00Z",
            "data": { "thesisDraft": "Keep me", "outlineStage": "halfway" }
        });
        let raw = serde_json::to_string(&vec![odd.clone()]).unwrap();
        s.kv().set(PROJECTS_KEY, &raw).unwrap();

        assert!(s.list().unwrap().is_empty());
        assert_eq!(s.kv().get(PROJECTS_KEY).unwrap().as_deref(), Some(raw.as_str()));

        let fresh = s.save_new("Fresh", "", thesis("new")).unwrap();
        s.quick_save(&fresh.id, thesis("edited")).unwrap();
        s.delete(&fresh.id).unwrap();

        let stored: Vec<serde_json::Value> =
            serde_json::from_str(&s.kv().get(PROJECTS_KEY).unwrap().unwrap()).unwrap();
        assert_eq!(stored, vec![odd]);
    }

    #[test]
    fn string_paper_length_from_older_clients_loads() {
        let s = store();
        let legacy = serde_json::json!([{
            "id": "1700000000001",
            "name": "Legacy",
            "createdAt": "2024-01-01T00:00:00Z",
            "updatedAt": "2024-01-01T00:00:00Z",
            "data": { "paperLength": "15" }
        }]);
        s.kv().set(PROJECTS_KEY, &legacy.to_string()).unwrap();

        let projects = s.list().unwrap();
        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].data.paper_length, PaperLength::Pages(15));
    }

    #[test]
    fn legacy_outline_ids_are_stable_across_loads() {
        let s = store();
        let legacy = serde_json::json!([{
            "id": "1700000000000",
            "name": "Old",
            "createdAt": "2024-01-01T00:00:00Z",
            "updatedAt": "2024-01-01T00:00:00Z",
            "data": {
                "outlineData": [{
                    "section_title": "Findings",
                    "subsections": [{
                        "subsection_title": "Wages",
                        "questions": [{ "question": "What changed?" }]
                    }]
                }],
                "draftData": { "responses": { "0-0-0": ["answer"] } }
            }
        }]);
        s.kv()
            .set(PROJECTS_KEY, &serde_json::to_string(&legacy).unwrap())
            .unwrap();

        let first = s.get("1700000000000").unwrap();
        let second = s.get("1700000000000").unwrap();
        let qid = &first.data.outline_data[0].subsections[0].questions[0].id;
        assert_eq!(
            qid,
            &second.data.outline_data[0].subsections[0].questions[0].id
        );
        assert_eq!(
            first.data.draft_data.responses[qid].selected_text(),
            Some("answer")
        );
    }

    #[test]
    fn structure_cache_roundtrip() {
        let s = store();
        let structure = PaperStructure {
            paper_type: "research".into(),
            methodology: None,
            sections: vec!["Abstract".into(), "Introduction".into()],
            has_methodology_sections: false,
        };
        assert_eq!(s.cached_structure("research", None).unwrap(), None);
        s.cache_structure(None, &structure).unwrap();
        assert_eq!(s.cached_structure("research", None).unwrap(), Some(structure));
        assert!(s.kv().keys().unwrap().contains(&"structure_cache:research:none".to_string()));
    }
}
