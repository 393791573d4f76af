//! Activity list to node/edge graph.
//!
//! # Invariants
//! - Output depends only on input order and field values.
//! - Note node ids are `note-{index}`; hub ids are `cat-{category}`.
//! - Wikilinks resolve to the first note with an exactly equal title;
//!   unresolved references produce nothing.

use crate::model::note::NoteRecord;
use serde::Serialize;

const DEFAULT_COLOR: &str = "#6366f1";
const CATEGORY_COLORS: &[(&str, &str)] = &[
    ("AI 강의", "#38bdf8"),
    ("재무", "#10b981"),
    ("Pixel Rest", "#f472b6"),
    ("업무", "#fbbf24"),
    ("개인", "#a78bfa"),
    ("기타", "#94a3b8"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeGroup {
    Note,
    Category,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphNode {
    pub id: String,
    pub title: String,
    pub category: String,
    pub group: NodeGroup,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    /// Note to its category hub.
    Membership,
    /// Explicit `[[wikilink]]` between notes.
    Direct,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphEdge {
    pub source: String,
    pub target: String,
    pub kind: EdgeKind,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Graph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

impl Graph {
    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|node| node.id == id)
    }

    pub fn nodes_in(&self, group: NodeGroup) -> impl Iterator<Item = &GraphNode> {
        self.nodes.iter().filter(move |node| node.group == group)
    }

    pub fn edges_of(&self, kind: EdgeKind) -> impl Iterator<Item = &GraphEdge> {
        self.edges.iter().filter(move |edge| edge.kind == kind)
    }
}

/// Builds the note/category graph for `records` (newest-first).
pub fn build(records: &[NoteRecord]) -> Graph {
    let mut nodes: Vec<GraphNode> = records
        .iter()
        .enumerate()
        .map(|(index, record)| GraphNode {
            id: note_node_id(index),
            title: record.title.clone(),
            category: record.category.clone(),
            group: NodeGroup::Note,
        })
        .collect();
    let note_count = nodes.len();
    let mut edges = Vec::new();

    let mut categories: Vec<&str> = Vec::new();
    for record in records {
        if !categories.contains(&record.category.as_str()) {
            categories.push(&record.category);
        }
    }

    for category in categories {
        let hub_id = category_node_id(category);
        for note in nodes[..note_count]
            .iter()
            .filter(|note| note.category == category)
        {
            edges.push(GraphEdge {
                source: note.id.clone(),
                target: hub_id.clone(),
                kind: EdgeKind::Membership,
            });
        }
        nodes.push(GraphNode {
            id: hub_id,
            title: category.to_string(),
            category: category.to_string(),
            group: NodeGroup::Category,
        });
    }

    for (index, record) in records.iter().enumerate() {
        for target_title in &record.wikilinks {
            if let Some(target) = nodes[..note_count]
                .iter()
                .find(|note| &note.title == target_title)
            {
                edges.push(GraphEdge {
                    source: note_node_id(index),
                    target: target.id.clone(),
                    kind: EdgeKind::Direct,
                });
            }
        }
    }

    Graph { nodes, edges }
}

/// Display colour for a category; unknown categories share one colour.
pub fn category_color(category: &str) -> &'static str {
    CATEGORY_COLORS
        .iter()
        .find(|&&(name, _)| name == category)
        .map_or(DEFAULT_COLOR, |&(_, color)| color)
}

fn note_node_id(index: usize) -> String {
    format!("note-{index}")
}

fn category_node_id(category: &str) -> String {
    format!("cat-{category}")
}
