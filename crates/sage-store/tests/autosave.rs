//! Autosave worker behaviour under paused tokio time.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use pretty_assertions::assert_eq;
use sage_core::entities::WizardData;
use sage_store::{Autosaver, MemoryStore, ProjectSnapshot, ProjectStore, SaveSink, StoreError};
use tokio::time::{Instant, sleep};

const WINDOW: Duration = Duration::from_millis(2000);

#[derive(Clone, Default)]
struct Recorder {
    writes: Arc<Mutex<Vec<(Instant, u32)>>>,
}

impl Recorder {
    fn payloads(&self) -> Vec<u32> {
        self.writes.lock().unwrap().iter().map(|(_, p)| *p).collect()
    }
}

impl SaveSink<u32> for Recorder {
    fn save(&mut self, payload: u32) -> Result<(), StoreError> {
        self.writes.lock().unwrap().push((Instant::now(), payload));
        Ok(())
    }
}

#[tokio::test(start_paused = true)]
async fn rapid_edits_produce_one_write_with_last_payload() {
    let recorder = Recorder::default();
    let saver = Autosaver::spawn(recorder.clone(), WINDOW);
    let start = Instant::now();

    for n in 1..=5 {
        saver.debounced(n).unwrap();
        sleep(Duration::from_millis(400)).await;
    }
    // Last edit at 1600 ms; nothing may be written before 3600 ms.
    sleep(Duration::from_millis(1000)).await;
    assert!(recorder.payloads().is_empty());

    sleep(Duration::from_millis(2000)).await;
    assert_eq!(recorder.payloads(), vec![5]);
    let (written_at, _) = recorder.writes.lock().unwrap()[0];
    assert_eq!(written_at - start, Duration::from_millis(3600));

    saver.shutdown().await.unwrap();
    assert_eq!(recorder.payloads(), vec![5]);
}

#[tokio::test(start_paused = true)]
async fn immediate_save_cancels_pending_debounce() {
    let recorder = Recorder::default();
    let saver = Autosaver::spawn(recorder.clone(), WINDOW);

    saver.debounced(1).unwrap();
    saver.immediate(2).await.unwrap();
    sleep(WINDOW * 2).await;

    assert_eq!(recorder.payloads(), vec![2]);
    saver.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn shutdown_flushes_pending_write() {
    let recorder = Recorder::default();
    let saver = Autosaver::spawn(recorder.clone(), WINDOW);

    saver.debounced(7).unwrap();
    saver.shutdown().await.unwrap();
    assert_eq!(recorder.payloads(), vec![7]);
}

#[tokio::test(start_paused = true)]
async fn project_store_is_a_save_sink() {
    let store = ProjectStore::new(MemoryStore::new());
    let project = store
        .save_new("Wages", "", WizardData::default())
        .unwrap();
    let saver = Autosaver::spawn(store.clone(), WINDOW);

    for text in ["a", "ab", "abc"] {
        saver
            .debounced(ProjectSnapshot {
                project_id: project.id.clone(),
                data: WizardData {
                    thesis_draft: text.into(),
                    ..WizardData::default()
                },
            })
            .unwrap();
    }
    sleep(WINDOW + Duration::from_millis(1)).await;
    assert_eq!(store.get(&project.id).unwrap().data.thesis_draft, "abc");

    let err = saver
        .immediate(ProjectSnapshot {
            project_id: "prj-0-deadbeef".into(),
            data: WizardData::default(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::ProjectNotFound(_)));
    saver.shutdown().await.unwrap();
}
