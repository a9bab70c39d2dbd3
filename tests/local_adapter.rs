use dashcat::domain::{BackupDocument, Dashboard, DashboardDraft, DashboardPatch, ErrorKind};
use dashcat::storage::{FileStore, MemoryStore};
use dashcat::sync::{DashboardStore, LocalAdapter, Phase, LEGACY_KEY, STORAGE_KEY};

fn error_kind(adapter: &LocalAdapter) -> Option<ErrorKind> {
    adapter.error().map(|e| e.kind)
}

fn persisted(store: &MemoryStore) -> Vec<Dashboard> {
    let text = store.peek(STORAGE_KEY).expect("primary blob");
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    serde_json::from_value(value["dashboards"].clone()).unwrap()
}

#[test]
fn empty_store_is_seeded_with_six_dashboards() {
    let store = MemoryStore::new();
    let adapter = LocalAdapter::open(store.clone());

    let categories: Vec<_> = adapter
        .records()
        .iter()
        .map(|d| d.category.clone().unwrap_or_default())
        .collect();
    assert_eq!(categories, ["CNPq", "CAPES", "FAPESP", "MCTI", "FINEP", "BNDES"]);
    assert_eq!(adapter.phase(), Phase::Ready);
    assert!(adapter.error().is_none());
    assert_eq!(persisted(&store).len(), 6);
    assert!(store.peek(LEGACY_KEY).is_some());
}

#[test]
fn first_operation_initializes_lazily() {
    let adapter = LocalAdapter::new(MemoryStore::new());
    assert_eq!(adapter.phase(), Phase::Uninitialized);

    adapter.export_snapshot().unwrap();
    assert_eq!(adapter.phase(), Phase::Ready);
}

#[test]
fn concurrent_first_use_keeps_persisted_records() {
    use futures_util::FutureExt;
    use std::sync::Barrier;

    for round in 0..200 {
        let store = MemoryStore::new();
        LocalAdapter::open(store.clone()).close();
        let adapter = LocalAdapter::new(store.clone());
        let barrier = Barrier::new(2);

        std::thread::scope(|scope| {
            scope.spawn(|| {
                barrier.wait();
                adapter.initialize();
            });
            scope.spawn(|| {
                barrier.wait();
                adapter
                    .create(DashboardDraft::new("late", "https://late.test"))
                    .now_or_never()
                    .expect("local mutations resolve immediately")
                    .unwrap();
            });
        });

        assert_eq!(persisted(&store).len(), 7, "round {round}");
        assert_eq!(adapter.records().len(), 7, "round {round}");
    }
}

#[tokio::test]
async fn create_adds_exactly_one_record() {
    let adapter = LocalAdapter::open(MemoryStore::new());
    let before = adapter.records();

    let draft = DashboardDraft::new("A", "https://a.test").with_category("");
    let id = adapter.create(draft).await.unwrap();

    let after = adapter.records();
    assert_eq!(after.len(), before.len() + 1);
    assert!(!id.is_empty());
    assert!(before.iter().all(|d| d.id != id));

    let created = after.iter().find(|d| d.id == id).unwrap();
    assert_eq!(created.title, "A");
    assert_eq!(created.url, "https://a.test");
    assert_eq!(created.category, None);
    assert_eq!(created.created_at, created.updated_at);
}

#[tokio::test]
async fn local_mutations_are_published_before_the_future_resolves() {
    let adapter = LocalAdapter::open(MemoryStore::new());
    assert!(adapter.capabilities().optimistic_local_update);
    let mut rx = adapter.subscribe();

    let pending = adapter.create(DashboardDraft::new("A", "https://a.test"));
    assert_eq!(adapter.records().len(), 7);
    assert!(rx.has_changed().unwrap());
    assert_eq!(rx.borrow_and_update().len(), 7);

    pending.await.unwrap();
}

#[tokio::test]
async fn rapid_creates_get_distinct_ids() {
    let adapter = LocalAdapter::open(MemoryStore::new());
    let mut ids = Vec::new();
    for i in 0..5 {
        ids.push(
            adapter
                .create(DashboardDraft::new(format!("D{i}"), "https://d.test"))
                .await
                .unwrap(),
        );
    }
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 5);
}

#[tokio::test]
async fn update_changes_only_supplied_fields() {
    let store = MemoryStore::new();
    let adapter = LocalAdapter::open(store.clone());
    let original = adapter.records().iter().find(|d| d.id == "2").cloned().unwrap();

    adapter
        .update("2", DashboardPatch::default().title("Bolsas CAPES").category(None))
        .await
        .unwrap();

    let updated = adapter.records().iter().find(|d| d.id == "2").cloned().unwrap();
    assert_eq!(updated.title, "Bolsas CAPES");
    assert_eq!(updated.category, None);
    assert_eq!(updated.url, original.url);
    assert_eq!(updated.description, original.description);
    assert_eq!(updated.created_at, original.created_at);
    assert!(updated.updated_at >= original.updated_at);
    assert_eq!(persisted(&store), adapter.records().to_vec());
}

#[tokio::test]
async fn update_of_unknown_id_is_a_no_op() {
    let store = MemoryStore::new();
    let adapter = LocalAdapter::open(store.clone());
    let blob = store.peek(STORAGE_KEY);
    let mut rx = adapter.subscribe();

    adapter
        .update("missing", DashboardPatch::default().title("x"))
        .await
        .unwrap();

    assert!(!rx.has_changed().unwrap());
    assert!(adapter.error().is_none());
    assert_eq!(store.peek(STORAGE_KEY), blob);
}

#[tokio::test]
async fn update_rejects_blank_required_fields() {
    let adapter = LocalAdapter::open(MemoryStore::new());

    let err = adapter
        .update("1", DashboardPatch::default().url("  "))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ValidationFailed);
    assert_eq!(error_kind(&adapter), Some(ErrorKind::ValidationFailed));
    assert_ne!(adapter.records()[0].url.trim(), "");
}

#[tokio::test]
async fn create_rejects_missing_title() {
    let adapter = LocalAdapter::open(MemoryStore::new());

    assert!(adapter.create(DashboardDraft::new("", "https://a.test")).await.is_err());
    assert_eq!(adapter.records().len(), 6);
    assert_eq!(error_kind(&adapter), Some(ErrorKind::ValidationFailed));

    adapter.create(DashboardDraft::new("ok", "https://a.test")).await.unwrap();
    assert!(adapter.error().is_none());
}

#[tokio::test]
async fn delete_is_idempotent() {
    let adapter = LocalAdapter::open(MemoryStore::new());

    adapter.delete("3").await.unwrap();
    let after_first = adapter.records();
    adapter.delete("3").await.unwrap();

    assert_eq!(after_first.len(), 5);
    assert_eq!(adapter.records().to_vec(), after_first.to_vec());
    assert!(adapter.records().iter().all(|d| d.id != "3"));
}

#[tokio::test]
async fn export_then_import_round_trips() {
    let source = LocalAdapter::open(MemoryStore::new());
    source.create(DashboardDraft::new("Extra", "https://x.test")).await.unwrap();
    let exported = source.export_snapshot().unwrap();
    assert!(exported.categories.is_empty());

    let json = exported.to_pretty_json().unwrap();
    let target = LocalAdapter::open(MemoryStore::new());
    target.delete("1").await.unwrap();
    target
        .import_snapshot(BackupDocument::from_json(&json).unwrap())
        .await
        .unwrap();

    assert_eq!(target.records().to_vec(), source.records().to_vec());
}

#[tokio::test]
async fn import_rejects_invalid_documents_without_mutation() {
    let adapter = LocalAdapter::open(MemoryStore::new());
    let mut document = adapter.export_snapshot().unwrap();
    document.dashboards[1].id = document.dashboards[0].id.clone();

    let err = adapter.import_snapshot(document).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::MalformedData);
    assert_eq!(adapter.records().len(), 6);
    assert_eq!(error_kind(&adapter), Some(ErrorKind::MalformedData));
}

#[tokio::test]
async fn records_survive_reopening_a_file_store() {
    let dir = tempfile::tempdir().unwrap();
    {
        let adapter = LocalAdapter::open(FileStore::new(dir.path()).unwrap());
        adapter.delete("6").await.unwrap();
    }

    let reopened = LocalAdapter::open(FileStore::new(dir.path()).unwrap());
    assert_eq!(reopened.records().len(), 5);
    assert!(reopened.error().is_none());
}

#[test]
fn legacy_only_store_is_adopted_and_migrated() {
    let store = MemoryStore::new();
    let legacy: Vec<Dashboard> = dashcat::storage::seed_dashboards().into_iter().take(2).collect();
    store.poke(LEGACY_KEY, &serde_json::to_string(&legacy).unwrap());

    let adapter = LocalAdapter::open(store.clone());

    assert_eq!(adapter.records().to_vec(), legacy);
    assert_eq!(persisted(&store), legacy);
}

#[test]
fn primary_key_wins_over_legacy_key() {
    let store = MemoryStore::new();
    let seed = dashcat::storage::seed_dashboards();
    store.poke(STORAGE_KEY, &serde_json::json!({ "dashboards": &seed[..1] }).to_string());
    store.poke(LEGACY_KEY, &serde_json::to_string(&seed).unwrap());

    let adapter = LocalAdapter::open(store);
    assert_eq!(adapter.records().len(), 1);
}

#[tokio::test]
async fn corrupt_blob_falls_back_to_seed_until_next_write() {
    let store = MemoryStore::new();
    store.poke(STORAGE_KEY, "{\"dashboards\": [oops");

    let adapter = LocalAdapter::open(store.clone());

    assert_eq!(error_kind(&adapter), Some(ErrorKind::MalformedData));
    assert_eq!(adapter.records().len(), 6);
    assert_eq!(adapter.phase(), Phase::Ready);
    assert_eq!(store.peek(STORAGE_KEY).as_deref(), Some("{\"dashboards\": [oops"));

    adapter.delete("1").await.unwrap();
    assert!(adapter.error().is_none());
    assert_eq!(persisted(&store).len(), 5);
}

#[test]
fn blob_violating_record_invariants_is_malformed() {
    let store = MemoryStore::new();
    store.poke(
        STORAGE_KEY,
        r#"{"dashboards":[{"id":"1","title":"","description":"","url":"u",
            "createdAt":"2024-01-15T00:00:00Z","updatedAt":"2024-01-15T00:00:00Z"}]}"#,
    );

    let adapter = LocalAdapter::open(store);
    assert_eq!(error_kind(&adapter), Some(ErrorKind::MalformedData));
    assert_eq!(adapter.records().len(), 6);
}

#[test]
fn unreachable_store_is_reported_and_leaves_the_set_empty() {
    let store = MemoryStore::new();
    store.set_unavailable(true);

    let adapter = LocalAdapter::open(store);

    assert_eq!(error_kind(&adapter), Some(ErrorKind::StorageUnavailable));
    assert_eq!(adapter.phase(), Phase::Ready);
    assert!(adapter.records().is_empty());
}

#[tokio::test]
async fn rejected_write_keeps_last_known_good_set() {
    let store = MemoryStore::new();
    let adapter = LocalAdapter::open(store.clone());
    store.set_read_only(true);

    let err = adapter
        .create(DashboardDraft::new("A", "https://a.test"))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::StorageUnavailable);
    assert_eq!(error_kind(&adapter), Some(ErrorKind::StorageUnavailable));
    assert_eq!(adapter.records().len(), 6);

    store.set_read_only(false);
    adapter.delete("1").await.unwrap();
    assert!(adapter.error().is_none());
}

#[tokio::test]
async fn import_is_not_rolled_back_when_persisting_fails() {
    let store = MemoryStore::new();
    let adapter = LocalAdapter::open(store.clone());
    let document = BackupDocument::new(
        dashcat::storage::seed_dashboards().into_iter().take(3).collect(),
        chrono::Utc::now(),
    );
    store.set_read_only(true);

    assert!(adapter.import_snapshot(document).await.is_err());

    assert_eq!(adapter.records().len(), 3);
    assert_eq!(error_kind(&adapter), Some(ErrorKind::StorageUnavailable));
    assert_eq!(persisted(&store).len(), 6);
}

#[tokio::test]
async fn closed_adapter_stops_publishing() {
    let store = MemoryStore::new();
    let adapter = LocalAdapter::open(store.clone());
    adapter.close();

    adapter.create(DashboardDraft::new("late", "https://late.test")).await.unwrap();

    assert_eq!(adapter.phase(), Phase::Closed);
    assert_eq!(adapter.records().len(), 6);
    assert_eq!(persisted(&store).len(), 7);
}

#[test]
fn download_backup_writes_timestamped_file() {
    let dir = tempfile::tempdir().unwrap();
    let adapter = LocalAdapter::open(MemoryStore::new());

    let path = adapter.download_backup(&dir.path().join("backups")).unwrap();

    let name = path.file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("dashboard-backup-"));
    assert!(name.ends_with(".json"));

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.contains('\n'));
    let document = BackupDocument::from_json(&text).unwrap();
    assert_eq!(document.dashboards.len(), 6);
    assert!(document.categories.is_empty());
}
