use serde_json::Value;
use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};
use synapse_core::db::{open_db_in_memory, DbError};
use synapse_core::{
    ActivityStore, CaptureError, CaptureErrorKind, CaptureService, KvStore, MemoryKvStore,
    NoteDraft, NoteType, PatchOutcome, RemoteTransport, Session, SqliteKvStore, StoreError,
    StoreResult, SyncClient, SyncError, SyncMode, TransportResponse,
};

const ENDPOINT: &str = "https://script.example.com/exec";

#[derive(Clone)]
struct FakeTransport {
    reply: Result<TransportResponse, SyncError>,
    calls: Rc<RefCell<Vec<(String, String)>>>,
}

impl FakeTransport {
    fn replying(status: u16, body: &str) -> Self {
        Self {
            reply: Ok(TransportResponse {
                status,
                body: body.to_string(),
            }),
            calls: Rc::default(),
        }
    }

    fn failing(err: SyncError) -> Self {
        Self {
            reply: Err(err),
            calls: Rc::default(),
        }
    }

    fn last_body(&self) -> Value {
        let calls = self.calls.borrow();
        let (_, body) = calls.last().expect("transport should be called");
        serde_json::from_str(body).unwrap()
    }
}

impl RemoteTransport for FakeTransport {
    fn post_json(&self, url: &str, body: String) -> Result<TransportResponse, SyncError> {
        self.calls.borrow_mut().push((url.to_string(), body));
        self.reply.clone()
    }
}

/// Accepts the session key but refuses to write the activity list.
#[derive(Default)]
struct ActivityWriteFails {
    inner: MemoryKvStore,
}

impl KvStore for ActivityWriteFails {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        if key == "synapse_activities" {
            return Err(StoreError::Db(DbError::Io {
                path: "synapse.sqlite3".into(),
                source: std::io::Error::other("disk full"),
            }));
        }
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        self.inner.remove(key)
    }
}

fn service<'a, K: KvStore>(
    kv: &'a K,
    endpoint: Option<&str>,
    transport: FakeTransport,
) -> CaptureService<&'a K, FakeTransport> {
    let mut session = Session::load(kv).unwrap();
    session.login("1234").unwrap();
    let store = ActivityStore::load(kv).unwrap();
    let sync = SyncClient::new(endpoint.map(str::to_string), transport, Duration::ZERO);
    CaptureService::new(session, store, sync)
}

#[test]
fn remote_success_patches_summary_and_category() {
    let kv = MemoryKvStore::new();
    let transport = FakeTransport::replying(
        200,
        r#"{"status":"success","data":{"summary":"AI summary","category":"finance","fileUrl":"https://drive/x"}}"#,
    );
    let mut capture = service(&kv, Some(ENDPOINT), transport.clone());

    let draft = NoteDraft::new(NoteType::Text, "budget notes [[Plan]]").with_tags("money, q3");
    let saved = capture.save(&draft).unwrap();

    assert!(saved.persisted);
    assert_eq!(saved.record.summary.as_deref(), Some("AI summary"));
    assert_eq!(saved.record.category, "finance");
    assert_eq!(capture.store().all()[0], saved.record);

    let body = transport.last_body();
    assert_eq!(body["accessKey"], "1234");
    assert_eq!(body["category"], "auto");
    assert_eq!(body["wikilinks"][0], "Plan");
    assert_eq!(body["tags"][1], "q3");
    assert!(body.get("id").is_none());
    assert_eq!(transport.calls.borrow()[0].0, ENDPOINT);
}

#[test]
fn remote_rejection_keeps_unsummarized_local_copy() {
    let kv = MemoryKvStore::new();
    let transport = FakeTransport::replying(
        200,
        r#"{"status":"error","message":"Unauthorized: Invalid Access Key"}"#,
    );
    let mut capture = service(&kv, Some(ENDPOINT), transport);

    let err = capture
        .save(&NoteDraft::new(NoteType::Text, "hello"))
        .unwrap_err();
    assert_eq!(err.kind(), CaptureErrorKind::RemoteRejection);
    assert!(err.user_message().contains("Invalid Access Key"));

    let saved_id = err.saved_record().expect("record saved locally");
    let stored = capture.store().get(saved_id).expect("record present");
    assert!(stored.summary.is_none());
    assert_eq!(ActivityStore::load(&kv).unwrap().len(), 1);
}

#[test]
fn network_and_protocol_failures_are_reported_as_sync_errors() {
    let cases = [
        (
            FakeTransport::failing(SyncError::Network("connection refused".to_string())),
            CaptureErrorKind::Network,
        ),
        (
            FakeTransport::replying(200, "<html>not json</html>"),
            CaptureErrorKind::Protocol,
        ),
        (
            FakeTransport::replying(502, "Bad Gateway"),
            CaptureErrorKind::Protocol,
        ),
    ];

    for (transport, expected) in cases {
        let kv = MemoryKvStore::new();
        let mut capture = service(&kv, Some(ENDPOINT), transport);
        let err = capture
            .save(&NoteDraft::new(NoteType::Link, "https://example.com"))
            .unwrap_err();
        assert_eq!(err.kind(), expected);
        assert_eq!(err.user_message(), "Saved locally, sync failed.");
        assert_eq!(capture.store().len(), 1);
    }
}

#[test]
fn demo_mode_uses_local_fallback_summary_without_transport() {
    let kv = MemoryKvStore::new();
    let transport = FakeTransport::replying(500, "unused");
    let mut capture = service(&kv, None, transport.clone());

    let saved = capture
        .save(
            &NoteDraft::new(
                NoteType::Text,
                "First sentence. Second sentence. Third sentence.",
            )
            .with_category("study"),
        )
        .unwrap()
        .record;

    let summary = saved.summary.expect("fallback summary");
    assert!(summary.starts_with("First sentence. Second sentence"));
    assert!(summary.ends_with("(awaiting AI integration)"));
    assert_eq!(saved.category, "study");
    assert!(transport.calls.borrow().is_empty());
}

#[test]
fn validation_and_login_gate_block_saves() {
    let kv = MemoryKvStore::new();
    let mut capture = service(&kv, None, FakeTransport::replying(200, "{}"));

    let err = capture
        .save(&NoteDraft::new(NoteType::Text, "   "))
        .unwrap_err();
    assert!(matches!(err, CaptureError::Validation(_)));
    assert!(err.saved_record().is_none());

    let image = capture.save(&NoteDraft::new(NoteType::Image, "")).unwrap();
    assert_eq!(image.record.title, "New Note");

    capture.session_mut().logout().unwrap();
    let err = capture
        .save(&NoteDraft::new(NoteType::Text, "locked out"))
        .unwrap_err();
    assert_eq!(err.kind(), CaptureErrorKind::Locked);
    assert_eq!(capture.store().len(), 1);
}

#[test]
fn sync_client_commits_locally_before_remote_call() {
    let kv = MemoryKvStore::new();
    let mut store = ActivityStore::load(&kv).unwrap();
    let sync = SyncClient::new(
        Some(ENDPOINT.to_string()),
        FakeTransport::failing(SyncError::Network("timeout".to_string())),
        Duration::ZERO,
    );

    let record = synapse_core::NoteRecord::from_draft(
        &NoteDraft::new(NoteType::Text, "local first"),
        "1234",
    )
    .unwrap();
    let id = record.id;
    let err = sync.send(&mut store, record).unwrap_err();

    assert!(matches!(err, SyncError::Network(_)));
    assert!(store.get(id).is_some());
    assert!(kv.get("synapse_activities").unwrap().is_some());
}

#[test]
fn demo_report_marks_patch_applied() {
    let kv = MemoryKvStore::new();
    let mut store = ActivityStore::load(&kv).unwrap();
    let sync = SyncClient::new(None, FakeTransport::replying(200, ""), Duration::ZERO);
    let record = synapse_core::NoteRecord::from_draft(
        &NoteDraft::new(NoteType::Text, "One! Two? Three."),
        "k",
    )
    .unwrap();

    let report = sync.send(&mut store, record).unwrap();
    assert_eq!(report.mode, SyncMode::Demo);
    assert_eq!(report.patch, PatchOutcome::Applied);
    assert!(report.persisted);
    assert!(sync.is_demo());
}

#[test]
fn sqlite_backed_capture_survives_restart() {
    let conn = open_db_in_memory().unwrap();
    let kv = SqliteKvStore::new(&conn);
    let mut session = Session::load(kv).unwrap();
    session.login("1234").unwrap();
    let store = ActivityStore::load(kv).unwrap();
    let sync = SyncClient::new(None, FakeTransport::replying(200, ""), Duration::ZERO);
    let mut capture = CaptureService::new(session, store, sync);

    capture
        .save(&NoteDraft::new(NoteType::Text, "persist me").with_title("P"))
        .unwrap();
    let before = capture.store().all().to_vec();

    let reloaded = ActivityStore::load(SqliteKvStore::new(&conn)).unwrap();
    assert_eq!(reloaded.all(), before.as_slice());
    assert_eq!(
        Session::load(SqliteKvStore::new(&conn))
            .unwrap()
            .access_key(),
        Some("1234")
    );
}

#[test]
fn failed_local_write_is_reported_on_success_and_failure() {
    let kv = ActivityWriteFails::default();
    let mut capture = service(&kv, None, FakeTransport::replying(200, ""));

    let saved = capture
        .save(&NoteDraft::new(NoteType::Text, "Only in memory."))
        .unwrap();
    assert!(!saved.persisted);
    assert!(saved.record.summary.is_some());
    assert_eq!(capture.store().len(), 1);
    assert!(ActivityStore::load(&kv).unwrap().is_empty());

    let mut capture = service(
        &kv,
        Some(ENDPOINT),
        FakeTransport::failing(SyncError::Network("offline".to_string())),
    );
    let err = capture
        .save(&NoteDraft::new(NoteType::Text, "lost twice"))
        .unwrap_err();
    assert!(matches!(
        err,
        CaptureError::Sync {
            persisted: false,
            ..
        }
    ));
    assert_eq!(err.user_message(), "Not saved locally, sync failed.");
}

#[test]
fn demo_mode_waits_for_configured_delay() {
    let kv = MemoryKvStore::new();
    let mut store = ActivityStore::load(&kv).unwrap();
    let delay = Duration::from_millis(20);
    let sync = SyncClient::new(None, FakeTransport::replying(200, ""), delay);
    let record = synapse_core::NoteRecord::from_draft(
        &NoteDraft::new(NoteType::Text, "slow down"),
        "k",
    )
    .unwrap();

    let started_at = Instant::now();
    let report = sync.send(&mut store, record).unwrap();
    assert!(started_at.elapsed() >= delay);
    assert_eq!(report.mode, SyncMode::Demo);
}
