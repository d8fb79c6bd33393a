use serde_json::json;
use willsuite_storage::conformance::run_conformance_suite;
use willsuite_storage::{DraftStorage, FsDraftStorage, MemoryDraftStorage};

#[tokio::test]
async fn memory_backend_conforms() {
    let report = run_conformance_suite(|| async { MemoryDraftStorage::new() }).await;
    assert!(report.failed == 0, "{report}");
    assert!(report.total >= 14);
}

#[tokio::test]
async fn fs_backend_conforms() {
    let root = tempfile::tempdir().unwrap();
    let counter = std::sync::atomic::AtomicUsize::new(0);
    let report = run_conformance_suite(|| {
        let n = counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        let dir = root.path().join(format!("run-{n}"));
        async move { FsDraftStorage::new(dir) }
    })
    .await;
    assert!(report.failed == 0, "{report}");
}

#[tokio::test]
async fn fs_drafts_survive_a_new_instance() {
    let root = tempfile::tempdir().unwrap();
    let first = FsDraftStorage::new(root.path());
    let saved = first
        .save_draft("jane", json!({"fullName": "Jane Doe"}), None)
        .await
        .unwrap();
    assert!(root.path().join("jane.json").exists());

    let second = FsDraftStorage::new(root.path());
    let loaded = second.load_draft("jane").await.unwrap();
    assert_eq!(loaded, saved);
}

#[tokio::test]
async fn fs_list_skips_foreign_files() {
    let root = tempfile::tempdir().unwrap();
    let storage = FsDraftStorage::new(root.path());
    storage.save_draft("ok", json!({}), None).await.unwrap();
    std::fs::write(root.path().join("notes.txt"), "hello").unwrap();
    std::fs::write(root.path().join("broken.json"), "{not json").unwrap();
    let ids: Vec<String> = storage
        .list_drafts()
        .await
        .unwrap()
        .into_iter()
        .map(|d| d.draft_id)
        .collect();
    assert_eq!(ids, vec!["ok"]);
}
