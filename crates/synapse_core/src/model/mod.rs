//! Domain model for captured notes.
//!
//! # Responsibility
//! - Define the record shape shared by local storage, sync and the graph.
//!
//! # Invariants
//! - Every record is identified by a stable `NoteId`.
//! - Records leave the store only through size-bound eviction.

pub mod note;
