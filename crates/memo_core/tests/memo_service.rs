use memo_core::{
    KeyValueStore, MemoDraft, MemoFilter, MemoPatch, MemoService, MemoryKvStore, ServiceError,
    ServiceOptions, SqliteKvStore, StoreError, StoreResult, Tag, TAGS_KEY,
};
use std::cell::Cell;

/// Memory store whose writes to one key can be switched to fail.
#[derive(Default)]
struct FlakyStore {
    inner: MemoryKvStore,
    fail_tags: Cell<bool>,
}

impl KeyValueStore for FlakyStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        if self.fail_tags.get() && key == TAGS_KEY {
            return Err(StoreError::MissingRequiredTable("kv_entries"));
        }
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        self.inner.remove(key)
    }
}

#[test]
fn create_memo_stores_tag_ids_and_returns_hydrated_view() {
    let store = MemoryKvStore::new();
    let mut service = MemoService::open(&store).unwrap();
    let work = service.create_tag("work").unwrap();

    let created = service
        .create_memo(MemoDraft::new("Plan", "body", vec![work.clone()]))
        .unwrap();
    assert_eq!(created.tags, vec![work]);

    let found = service.find_memo(&created.id).unwrap();
    assert_eq!(found, created);
}

#[test]
fn renamed_tag_is_reflected_in_existing_memos() {
    let store = MemoryKvStore::new();
    let mut service = MemoService::open(&store).unwrap();
    let tag = service.create_tag("draft").unwrap();
    let memo = service
        .create_memo(MemoDraft::new("Essay", "", vec![tag.clone()]))
        .unwrap();
    assert_eq!(service.memos_with_tags()[0].tags[0].label, "draft");

    assert!(service.update_tag(&tag.id, "final").unwrap());
    let hydrated = service.find_memo(&memo.id).unwrap();
    assert_eq!(hydrated.tags[0].label, "final");
    assert_eq!(service.memos_with_tags()[0].tags[0].label, "final");
}

#[test]
fn deleted_tag_disappears_from_view_but_stays_in_storage_by_default() {
    let store = SqliteKvStore::open_in_memory().unwrap();
    let mut service = MemoService::open(&store).unwrap();
    let keep = service.create_tag("keep").unwrap();
    let stale = service.create_tag("stale").unwrap();
    let memo = service
        .create_memo(MemoDraft::new("Tagged", "", vec![keep.clone(), stale.clone()]))
        .unwrap();

    assert!(service.delete_tag(&stale.id).unwrap());
    assert_eq!(service.find_memo(&memo.id).unwrap().tags, vec![keep.clone()]);
    assert!(service.filtered_view("", &[stale.clone()]).is_empty());

    assert_stored_tag_id(&store, &memo.id, &stale.id);

    let mut service = MemoService::open(&store).unwrap();
    assert_eq!(service.prune_dangling_tag_ids().unwrap(), 1);
    assert_eq!(service.prune_dangling_tag_ids().unwrap(), 0);
}

fn assert_stored_tag_id(store: &SqliteKvStore, memo_id: &str, tag_id: &str) {
    let raw: serde_json::Value =
        serde_json::from_str(&memo_core::KeyValueStore::get(store, "MEMOS").unwrap().unwrap())
            .unwrap();
    let memo = raw
        .as_array()
        .unwrap()
        .iter()
        .find(|memo| memo["id"] == memo_id)
        .unwrap();
    assert!(memo["tagIds"]
        .as_array()
        .unwrap()
        .iter()
        .any(|value| value == tag_id));
}

#[test]
fn prune_on_tag_delete_removes_stale_ids() {
    let store = MemoryKvStore::new();
    let options = ServiceOptions {
        prune_on_tag_delete: true,
    };
    let mut service = MemoService::with_options(&store, options).unwrap();
    let tag = service.create_tag("temp").unwrap();
    let memo = service
        .create_memo(MemoDraft::new("M", "", vec![tag.clone()]))
        .unwrap();

    assert!(service.delete_tag(&tag.id).unwrap());
    drop(service);

    let reopened = memo_core::MemoRepository::open(&store).unwrap();
    assert!(reopened.find_by_id(&memo.id).unwrap().tag_ids.is_empty());
}

#[test]
fn failed_tag_removal_keeps_tag_registered_and_retry_completes() {
    let store = FlakyStore::default();
    let options = ServiceOptions {
        prune_on_tag_delete: true,
    };
    let mut service = MemoService::with_options(&store, options).unwrap();
    let tag = service.create_tag("temp").unwrap();
    let memo = service
        .create_memo(MemoDraft::new("M", "", vec![tag.clone()]))
        .unwrap();

    store.fail_tags.set(true);
    let err = service.delete_tag(&tag.id).unwrap_err();
    assert!(matches!(err, ServiceError::Repo(_)));
    assert!(service.find_tag(&tag.id).is_some());

    store.fail_tags.set(false);
    assert!(service.delete_tag(&tag.id).unwrap());
    assert!(service.find_tag(&tag.id).is_none());
    assert!(service.find_memo(&memo.id).unwrap().tags.is_empty());
}

#[test]
fn delete_unknown_tag_writes_nothing() {
    let store = MemoryKvStore::new();
    let options = ServiceOptions {
        prune_on_tag_delete: true,
    };
    let mut service = MemoService::with_options(&store, options).unwrap();
    assert!(!service.delete_tag("missing").unwrap());
    assert_eq!(store.write_count(), 0);
}

#[test]
fn unregistered_tag_id_is_stored_and_resolves_once_registered() {
    let store = MemoryKvStore::new();
    let mut service = MemoService::open(&store).unwrap();
    let memo = service
        .create_memo(MemoDraft::new("early", "", vec![Tag::with_id("later", "")]))
        .unwrap();
    assert!(memo.tags.is_empty());

    service.add_tag(Tag::with_id("later", "arrived")).unwrap();
    let hydrated = service.find_memo(&memo.id).unwrap();
    assert_eq!(hydrated.tags, vec![Tag::with_id("later", "arrived")]);
}

#[test]
fn filtered_view_combines_title_and_tags() {
    let store = MemoryKvStore::new();
    let mut service = MemoService::open(&store).unwrap();
    let x = service.create_tag("x").unwrap();
    let y = service.create_tag("y").unwrap();
    for (title, tags) in [
        ("Project A", vec![x.clone(), y.clone()]),
        ("Home", vec![x.clone(), y.clone()]),
        ("Projector", vec![x.clone()]),
    ] {
        service.create_memo(MemoDraft::new(title, "", tags)).unwrap();
    }

    let titles = |memos: Vec<memo_core::HydratedMemo>| -> Vec<String> {
        memos.into_iter().map(|memo| memo.title).collect()
    };

    assert_eq!(
        titles(service.filtered_view("", &[])),
        vec!["Project A", "Home", "Projector"]
    );
    assert_eq!(
        titles(service.filtered_view("proj", &[])),
        vec!["Project A", "Projector"]
    );
    assert_eq!(
        titles(service.filtered_view("", &[x.clone(), y.clone()])),
        vec!["Project A", "Home"]
    );
    assert_eq!(
        titles(service.filtered_view("PROJ", &[y.clone()])),
        vec!["Project A"]
    );

    let filter = MemoFilter::new("home", vec![x]);
    assert_eq!(titles(filter.apply(&service.memos_with_tags())), vec!["Home"]);
}

#[test]
fn views_are_never_stale_after_mutations() {
    let store = MemoryKvStore::new();
    let mut service = MemoService::open(&store).unwrap();
    let memo = service
        .create_memo(MemoDraft::new("first", "", Vec::new()))
        .unwrap();
    assert_eq!(service.memos_with_tags().len(), 1);

    service
        .patch_memo(&memo.id, MemoPatch::default().title("renamed"))
        .unwrap();
    assert_eq!(service.memos_with_tags()[0].title, "renamed");

    service.delete_memo(&memo.id).unwrap();
    assert!(service.memos_with_tags().is_empty());
    assert!(service.find_memo(&memo.id).is_none());
}

#[test]
fn update_memo_replaces_fields_and_reports_missing_ids() {
    let store = MemoryKvStore::new();
    let mut service = MemoService::open(&store).unwrap();
    let tag = service.create_tag("t").unwrap();
    let memo = service
        .create_memo(MemoDraft::new("old", "old body", vec![tag]))
        .unwrap();

    let updated = service
        .update_memo(&memo.id, MemoDraft::new("new", "new body", Vec::new()))
        .unwrap()
        .unwrap();
    assert_eq!(updated.title, "new");
    assert_eq!(updated.body, "new body");
    assert!(updated.tags.is_empty());

    let missing = service
        .update_memo("missing", MemoDraft::new("x", "", Vec::new()))
        .unwrap();
    assert!(missing.is_none());
}

#[test]
fn validation_rejects_blank_title_and_blank_labels() {
    let store = MemoryKvStore::new();
    let mut service = MemoService::open(&store).unwrap();

    let err = service
        .create_memo(MemoDraft::new("  ", "body", Vec::new()))
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidMemo(_)));

    let err = service.create_tag(" ").unwrap_err();
    assert!(matches!(err, ServiceError::InvalidTagLabel(_)));

    let memo = service
        .create_memo(MemoDraft::new("ok", "", Vec::new()))
        .unwrap();
    let err = service
        .patch_memo(&memo.id, MemoPatch::default().title(""))
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidMemo(_)));
    assert_eq!(store.write_count(), 1);
}

#[test]
fn add_tag_accepts_external_ids_and_rejects_duplicates() {
    let store = MemoryKvStore::new();
    let mut service = MemoService::open(&store).unwrap();
    service.add_tag(Tag::with_id("fixed", "fixed")).unwrap();
    assert!(service.find_tag("fixed").is_some());

    let err = service.add_tag(Tag::with_id("fixed", "again")).unwrap_err();
    assert!(matches!(err, ServiceError::Repo(_)));
    assert_eq!(service.available_tags().len(), 1);
}

#[test]
fn state_survives_reopening_the_store() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("memos.db");
    let memo_id = {
        let store = SqliteKvStore::open(&path).unwrap();
        let mut service = MemoService::open(&store).unwrap();
        let tag = service.create_tag("persisted").unwrap();
        service
            .create_memo(MemoDraft::new("saved", "text", vec![tag]))
            .unwrap()
            .id
    };

    let store = SqliteKvStore::open(&path).unwrap();
    let service = MemoService::open(&store).unwrap();
    let memo = service.find_memo(&memo_id).unwrap();
    assert_eq!(memo.title, "saved");
    assert_eq!(memo.tags[0].label, "persisted");
}
