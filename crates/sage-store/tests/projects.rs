//! Project collection behaviour over the file backend.

use pretty_assertions::assert_eq;
use sage_core::entities::{CategoryChoice, Section, WizardData};
use sage_core::enums::{PaperLength, SectionKind, Tab};
use sage_store::projects::PROJECTS_KEY;
use sage_store::{FileStore, KeyValueStore, ProjectStore, StoreError};

fn file_store(dir: &tempfile::TempDir) -> ProjectStore<FileStore> {
    ProjectStore::new(FileStore::open(dir.path().join("data")).unwrap())
}

fn rich_data() -> WizardData {
    WizardData {
        selected_paper_type: Some("research".into()),
        paper_length: PaperLength::MaximumDetail,
        thesis_draft: "Remote work raises productivity".into(),
        final_thesis: "Remote work raises productivity".into(),
        category_candidates: vec![CategoryChoice::selected("Labor economics")],
        source_categories: vec!["Labor economics".into()],
        outline_data: vec![Section::new("Findings", "Evidence", SectionKind::Data)],
        thesis_finalized: true,
        source_categories_activated: true,
        categories_finalized: true,
        active_tab: Tab::Framework,
        ..WizardData::default()
    }
}

fn raw_records(store: &ProjectStore<FileStore>) -> Vec<serde_json::Value> {
    serde_json::from_str(&store.kv().get(PROJECTS_KEY).unwrap().unwrap()).unwrap()
}

#[test]
fn quick_save_only_touches_the_matching_record() {
    let dir = tempfile::tempdir().unwrap();
    let store = file_store(&dir);
    let a = store.save_new("A", "", rich_data()).unwrap();
    let b = store.save_new("B", "other", WizardData::default()).unwrap();
    let before_b = raw_records(&store)[1].clone();

    let mut edited = rich_data();
    edited.thesis_draft = "Edited".into();
    store.quick_save(&a.id, edited).unwrap();

    let after = raw_records(&store);
    assert_eq!(after[1], before_b);
    assert_eq!(store.get(&b.id).unwrap().data, WizardData::default());
    assert_eq!(store.get(&a.id).unwrap().data.thesis_draft, "Edited");
    assert_eq!(store.list().unwrap().len(), 2);
}

#[test]
fn export_then_import_reproduces_data_under_new_id() {
    let dir = tempfile::tempdir().unwrap();
    let store = file_store(&dir);
    let original = store
        .save_new("Remote work: a study", "", rich_data())
        .unwrap();

    let path = store.export(&original.id, dir.path()).unwrap();
    assert_eq!(
        path.file_name().unwrap().to_str().unwrap(),
        "Remote_work__a_study.json"
    );

    let imported = store.import(&path).unwrap();
    assert_ne!(imported.id, original.id);
    assert_eq!(imported.data, original.data);
    assert_eq!(imported.name, original.name);
    assert!(imported.updated_at >= original.updated_at);
    assert_eq!(store.list().unwrap().len(), 2);
}

#[test]
fn importing_twice_yields_distinct_ids() {
    let dir = tempfile::tempdir().unwrap();
    let store = file_store(&dir);
    let original = store.save_new("P", "", WizardData::default()).unwrap();
    let path = store.export(&original.id, &dir.path().join("p.json")).unwrap();

    let first = store.import(&path).unwrap();
    let second = store.import(&path).unwrap();
    let ids: std::collections::HashSet<_> =
        store.list().unwrap().into_iter().map(|p| p.id).collect();
    assert_eq!(ids.len(), 3);
    assert_ne!(first.id, second.id);
}

#[test]
fn import_of_garbage_fails_without_touching_store() {
    let dir = tempfile::tempdir().unwrap();
    let store = file_store(&dir);
    store.save_new("Keep", "", WizardData::default()).unwrap();
    let bad = dir.path().join("bad.json");
    std::fs::write(&bad, "not json").unwrap();

    assert!(matches!(store.import(&bad), Err(StoreError::Serde(_))));
    assert_eq!(store.list().unwrap().len(), 1);
}

#[test]
fn active_project_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let id = {
        let store = file_store(&dir);
        let p = store.save_new("P", "", rich_data()).unwrap();
        store.set_active(&p.id).unwrap();
        p.id
    };
    let reopened = file_store(&dir);
    let active = reopened.active().unwrap().unwrap();
    assert_eq!(active.id, id);
    assert_eq!(active.data, rich_data_with_ids(&active.data));
}

// Section ids are generated, so compare against the stored ones.
fn rich_data_with_ids(stored: &WizardData) -> WizardData {
    let mut expected = rich_data();
    expected.outline_data[0].id.clone_from(&stored.outline_data[0].id);
    expected
}
