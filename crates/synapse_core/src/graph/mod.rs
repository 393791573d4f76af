//! Knowledge graph over the activity list.
//!
//! # Responsibility
//! - `builder`: pure records -> nodes/edges transform.
//! - `layout`: stateful force simulation consuming the builder output.
//! - `export`: JSON and Graphviz renderings of a laid-out graph.

pub mod builder;
pub mod export;
pub mod layout;
