//! Core domain logic for Digital Synapse.
//! This crate is the single source of truth for capture, storage, sync and
//! graph invariants.

pub mod config;
pub mod db;
pub mod graph;
pub mod logging;
pub mod model;
pub mod service;
pub mod store;
pub mod sync;
pub mod wikilink;

pub use config::{ConfigError, SynapseConfig};
pub use graph::builder::{build as build_graph, EdgeKind, Graph, GraphEdge, GraphNode, NodeGroup};
pub use graph::layout::{ForceLayout, LayoutConfig, NodePosition};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::note::{NoteDraft, NoteId, NoteRecord, NoteType, NoteValidationError, AUTO_CATEGORY};
pub use service::capture_service::{CaptureError, CaptureErrorKind, CaptureService, SavedNote};
pub use store::activity::{ActivityStore, PatchOutcome, ACTIVITY_LIMIT};
pub use store::kv::{KvStore, MemoryKvStore, SqliteKvStore};
pub use store::session::{Session, SessionError};
pub use store::{StoreError, StoreResult};
pub use sync::client::{SyncClient, SyncMode, SyncReport};
pub use sync::transport::{HttpTransport, RemoteTransport, TransportResponse};
pub use sync::SyncError;
pub use wikilink::extract as extract_wikilinks;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
