//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose memo/tag operations to Dart via FRB as plain envelopes.
//! - Resolve the store location once per process.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - "Not found" is reported as `ok=false` or `None`, never as a panic.
//! - Every call reloads state from the store, so no stale view is served.
//! - Calls are serialized process-wide; each one is a whole-record
//!   read-modify-write of `MEMOS`/`TAGS`.

use log::warn;
use memo_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    CoreConfig, HydratedMemo, MemoDraft, MemoService, ServiceOptions, SqliteKvStore, Tag,
};
use std::sync::{Mutex, OnceLock};

static CONFIG: OnceLock<CoreConfig> = OnceLock::new();
static CALL_LOCK: Mutex<()> = Mutex::new(());

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Tag as seen by the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagItem {
    pub id: String,
    pub label: String,
}

/// Memo with resolved tags as seen by the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoItem {
    pub id: String,
    pub title: String,
    pub body: String,
    pub tags: Vec<TagItem>,
}

/// List envelope for memo and tag queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoListResponse {
    pub items: Vec<MemoItem>,
    /// Human-readable response message for diagnostics.
    pub message: String,
}

/// Generic action envelope for mutations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionResponse {
    /// Whether something changed.
    pub ok: bool,
    /// Id of the affected memo or tag, when known.
    pub id: Option<String>,
    pub message: String,
}

impl ActionResponse {
    fn success(message: impl Into<String>, id: String) -> Self {
        Self {
            ok: true,
            id: Some(id),
            message: message.into(),
        }
    }

    fn unchanged(message: impl Into<String>, id: String) -> Self {
        Self {
            ok: false,
            id: Some(id),
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            id: None,
            message: message.into(),
        }
    }
}

/// Creates a memo. `tag_ids` are stored as given, including ids with no
/// registered tag.
#[flutter_rust_bridge::frb(sync)]
pub fn memo_create(title: String, body: String, tag_ids: Vec<String>) -> ActionResponse {
    let result = with_service(|service| {
        let draft = MemoDraft::new(title, body, tag_refs(&tag_ids));
        service.create_memo(draft)
    });
    match result {
        Ok(memo) => ActionResponse::success("Memo created.", memo.id),
        Err(err) => ActionResponse::failure(format!("memo_create failed: {err}")),
    }
}

/// Replaces title, body and tags of memo `id`.
#[flutter_rust_bridge::frb(sync)]
pub fn memo_update(
    id: String,
    title: String,
    body: String,
    tag_ids: Vec<String>,
) -> ActionResponse {
    let result = with_service(|service| {
        let draft = MemoDraft::new(title, body, tag_refs(&tag_ids));
        service.update_memo(&id, draft)
    });
    match result {
        Ok(Some(_)) => ActionResponse::success("Memo updated.", id),
        Ok(None) => ActionResponse::unchanged("Memo not found.", id),
        Err(err) => ActionResponse::failure(format!("memo_update failed: {err}")),
    }
}

/// Deletes memo `id`.
#[flutter_rust_bridge::frb(sync)]
pub fn memo_delete(id: String) -> ActionResponse {
    match with_service(|service| service.delete_memo(&id)) {
        Ok(true) => ActionResponse::success("Memo deleted.", id),
        Ok(false) => ActionResponse::unchanged("Memo not found.", id),
        Err(err) => ActionResponse::failure(format!("memo_delete failed: {err}")),
    }
}

/// Loads one memo; `None` routes the UI to its not-found view.
#[flutter_rust_bridge::frb(sync)]
pub fn memo_get(id: String) -> Option<MemoItem> {
    match with_service(|service| Ok(service.find_memo(&id))) {
        Ok(found) => found.map(to_memo_item),
        Err(err) => {
            warn!("event=ffi_call module=ffi status=error call=memo_get error={err}");
            None
        }
    }
}

/// Memos whose title contains `title_query` and that carry every tag in
/// `tag_ids`. An id with no registered tag matches no memo.
#[flutter_rust_bridge::frb(sync)]
pub fn memos_filtered(title_query: String, tag_ids: Vec<String>) -> MemoListResponse {
    let result = with_service(|service| {
        Ok(service.filtered_view(&title_query, &tag_refs(&tag_ids)))
    });
    match result {
        Ok(memos) => {
            let items = memos.into_iter().map(to_memo_item).collect::<Vec<_>>();
            let message = if items.is_empty() {
                "No memos.".to_string()
            } else {
                format!("Found {} memo(s).", items.len())
            };
            MemoListResponse { items, message }
        }
        Err(err) => MemoListResponse {
            items: Vec::new(),
            message: format!("memos_filtered failed: {err}"),
        },
    }
}

/// Creates a tag with a fresh id.
#[flutter_rust_bridge::frb(sync)]
pub fn tag_create(label: String) -> ActionResponse {
    match with_service(|service| service.create_tag(label)) {
        Ok(tag) => ActionResponse::success("Tag created.", tag.id),
        Err(err) => ActionResponse::failure(format!("tag_create failed: {err}")),
    }
}

/// Renames tag `id`.
#[flutter_rust_bridge::frb(sync)]
pub fn tag_update(id: String, label: String) -> ActionResponse {
    match with_service(|service| service.update_tag(&id, label)) {
        Ok(true) => ActionResponse::success("Tag updated.", id),
        Ok(false) => ActionResponse::unchanged("Tag unchanged.", id),
        Err(err) => ActionResponse::failure(format!("tag_update failed: {err}")),
    }
}

/// Deletes tag `id`.
#[flutter_rust_bridge::frb(sync)]
pub fn tag_delete(id: String) -> ActionResponse {
    match with_service(|service| service.delete_tag(&id)) {
        Ok(true) => ActionResponse::success("Tag deleted.", id),
        Ok(false) => ActionResponse::unchanged("Tag not found.", id),
        Err(err) => ActionResponse::failure(format!("tag_delete failed: {err}")),
    }
}

/// All tags in registry order; empty on storage failure.
#[flutter_rust_bridge::frb(sync)]
pub fn tags_list() -> Vec<TagItem> {
    match with_service(|service| Ok(service.available_tags().to_vec())) {
        Ok(tags) => tags.into_iter().map(to_tag_item).collect(),
        Err(err) => {
            warn!("event=ffi_call module=ffi status=error call=tags_list error={err}");
            Vec::new()
        }
    }
}

fn config() -> &'static CoreConfig {
    CONFIG.get_or_init(CoreConfig::from_env)
}

fn with_service<T>(
    f: impl FnOnce(&mut MemoService<'_, SqliteKvStore>) -> memo_core::ServiceResult<T>,
) -> Result<T, String> {
    let _guard = CALL_LOCK
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    let config = config();
    let store = SqliteKvStore::open(&config.db_path)
        .map_err(|err| format!("store open failed: {err}"))?;
    let mut service = MemoService::with_options(&store, ServiceOptions::from(config))
        .map_err(|err| format!("service init failed: {err}"))?;
    f(&mut service).map_err(|err| err.to_string())
}

/// Id-only tag references; storage and filtering compare ids, never labels.
fn tag_refs(tag_ids: &[String]) -> Vec<Tag> {
    tag_ids
        .iter()
        .map(|id| Tag::with_id(id.as_str(), ""))
        .collect()
}

fn to_memo_item(memo: HydratedMemo) -> MemoItem {
    MemoItem {
        id: memo.id,
        title: memo.title,
        body: memo.body,
        tags: memo.tags.into_iter().map(to_tag_item).collect(),
    }
}

fn to_tag_item(tag: Tag) -> TagItem {
    TagItem {
        id: tag.id,
        label: tag.label,
    }
}

#[cfg(test)]
mod tests {
    use super::{
        core_version, init_logging, memo_create, memo_delete, memo_get, memo_update,
        memos_filtered, ping, tag_create, tag_delete, tag_update, tags_list,
    };
    use std::time::{SystemTime, UNIX_EPOCH};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_empty_log_dir() {
        let error = init_logging("info".to_string(), String::new());
        assert!(!error.is_empty());
    }

    #[test]
    fn init_logging_rejects_unsupported_level() {
        let error = init_logging("verbose".to_string(), "tmp/logs".to_string());
        assert!(!error.is_empty());
    }

    #[test]
    fn memo_lifecycle_round_trips_through_ffi() {
        let token = unique_token("ffi-memo");
        let tag = tag_create(format!("tag {token}"));
        assert!(tag.ok, "{}", tag.message);
        let tag_id = tag.id.expect("tag id");

        let created = memo_create(format!("memo {token}"), "body".to_string(), vec![tag_id.clone()]);
        assert!(created.ok, "{}", created.message);
        let memo_id = created.id.expect("memo id");

        let loaded = memo_get(memo_id.clone()).expect("memo should exist");
        assert_eq!(loaded.tags.len(), 1);
        assert_eq!(loaded.tags[0].id, tag_id);

        let filtered = memos_filtered(token.to_uppercase(), vec![tag_id.clone()]);
        assert!(filtered.items.iter().any(|item| item.id == memo_id));

        let updated = memo_update(
            memo_id.clone(),
            format!("renamed {token}"),
            String::new(),
            Vec::new(),
        );
        assert!(updated.ok, "{}", updated.message);
        assert!(memo_get(memo_id.clone()).expect("memo").tags.is_empty());

        assert!(memo_delete(memo_id.clone()).ok);
        assert!(memo_get(memo_id.clone()).is_none());
        assert!(!memo_delete(memo_id).ok);
    }

    #[test]
    fn tag_rename_and_delete_report_unknown_ids() {
        let token = unique_token("ffi-tag");
        let created = tag_create(format!("label {token}"));
        let tag_id = created.id.expect("tag id");

        assert!(tag_update(tag_id.clone(), format!("renamed {token}")).ok);
        assert!(tags_list()
            .iter()
            .any(|tag| tag.id == tag_id && tag.label == format!("renamed {token}")));

        assert!(tag_delete(tag_id.clone()).ok);
        assert!(!tag_delete(tag_id.clone()).ok);
        assert!(!tag_update(tag_id, "x".to_string()).ok);
    }

    #[test]
    fn filter_requiring_deleted_tag_matches_nothing() {
        let token = unique_token("ffi-gone");
        let tag_id = tag_create(format!("gone {token}")).id.expect("tag id");
        let created = memo_create(format!("untagged {token}"), String::new(), Vec::new());
        assert!(created.ok, "{}", created.message);
        assert!(tag_delete(tag_id.clone()).ok);

        let filtered = memos_filtered(token.clone(), vec![tag_id]);
        assert!(filtered.items.is_empty());

        let unfiltered = memos_filtered(token, Vec::new());
        assert_eq!(unfiltered.items.len(), 1);
    }

    #[test]
    fn memo_with_unregistered_tag_id_is_accepted() {
        let token = unique_token("ffi-unregistered");
        let created = memo_create(
            format!("memo {token}"),
            String::new(),
            vec![format!("no-such-tag-{token}")],
        );
        assert!(created.ok, "{}", created.message);

        let loaded = memo_get(created.id.expect("memo id")).expect("memo should exist");
        assert!(loaded.tags.is_empty());
    }

    #[test]
    fn blank_title_is_rejected() {
        let response = memo_create("   ".to_string(), "body".to_string(), Vec::new());
        assert!(!response.ok);
        assert!(response.id.is_none());
        assert!(response.message.contains("title"));
    }

    fn unique_token(prefix: &str) -> String {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time went backwards")
            .as_nanos();
        format!("{prefix}-{nanos}")
    }
}
