//! Renderings of a laid-out graph for external viewers.

use super::builder::{category_color, EdgeKind, GraphEdge, NodeGroup};
use super::layout::ForceLayout;
use serde::Serialize;
use std::fmt::Write;

#[derive(Debug, Serialize)]
struct ExportNode<'a> {
    id: &'a str,
    title: &'a str,
    category: &'a str,
    group: NodeGroup,
    color: &'static str,
    x: f64,
    y: f64,
    radius: f64,
}

#[derive(Debug, Serialize)]
struct ExportGraph<'a> {
    nodes: Vec<ExportNode<'a>>,
    edges: &'a [GraphEdge],
}

/// Pretty JSON with node positions and colours.
pub fn to_json(layout: &ForceLayout) -> serde_json::Result<String> {
    let positions = layout.positions();
    let graph = layout.graph();
    let nodes = graph
        .nodes
        .iter()
        .zip(&positions)
        .map(|(node, position)| ExportNode {
            id: &node.id,
            title: &node.title,
            category: &node.category,
            group: node.group,
            color: category_color(&node.category),
            x: position.x,
            y: position.y,
            radius: position.radius,
        })
        .collect();
    serde_json::to_string_pretty(&ExportGraph {
        nodes,
        edges: &graph.edges,
    })
}

/// Graphviz DOT with pinned positions (`neato -n` friendly).
pub fn to_dot(layout: &ForceLayout) -> String {
    let positions = layout.positions();
    let graph = layout.graph();
    let mut out = String::from("digraph synapse {\n  node [style=filled];\n");

    for (node, position) in graph.nodes.iter().zip(&positions) {
        let shape = match node.group {
            NodeGroup::Category => "doublecircle",
            NodeGroup::Note => "circle",
        };
        let _ = writeln!(
            out,
            "  \"{}\" [label=\"{}\", shape={}, fillcolor=\"{}\", pos=\"{:.1},{:.1}!\"];",
            escape(&node.id),
            escape(&node.title),
            shape,
            category_color(&node.category),
            position.x,
            position.y
        );
    }
    for edge in &graph.edges {
        let style = match edge.kind {
            EdgeKind::Membership => "dashed",
            EdgeKind::Direct => "solid",
        };
        let _ = writeln!(
            out,
            "  \"{}\" -> \"{}\" [style={}];",
            escape(&edge.source),
            escape(&edge.target),
            style
        );
    }
    out.push_str("}\n");
    out
}

fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
