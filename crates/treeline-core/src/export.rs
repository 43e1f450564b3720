//! Read-only output sinks for a completed graph
//!
//! Neither sink feeds back into the graph. Writing is best-effort:
//! failures are reported as a boolean to the caller, never surfaced
//! as an error value, and any prior output file is preserved under a
//! `~` suffix when possible.

use crate::graph::UnitGraph;
use crate::model::{DepNode, NodeId};
use serde::Serialize;
use std::fs;
use std::path::Path;

#[derive(Serialize)]
struct SerializedGraph<'a> {
    unit: &'a str,
    nodes: Vec<&'a DepNode>,
    arcs: Vec<(NodeId, NodeId)>,
}

/// Structured textual serialization: nodes sorted by key, arcs sorted
/// by endpoint ids. Deterministic for identical graphs.
pub fn render_json(graph: &UnitGraph) -> serde_json::Result<String> {
    let mut arcs: Vec<(NodeId, NodeId)> = graph.arcs().collect();
    arcs.sort();
    let doc = SerializedGraph {
        unit: graph.unit_name(),
        nodes: graph.nodes_sorted_by_key(),
        arcs,
    };
    serde_json::to_string_pretty(&doc)
}

/// Graphviz rendering for visualization.
pub fn render_dot(graph: &UnitGraph) -> String {
    let mut out = String::from("digraph deps {\n");
    for node in graph.nodes_sorted_by_key() {
        let shape = if node.is_provider { "box" } else { "ellipse" };
        out.push_str(&format!(
            "  n{} [label=\"{}\", shape={}];\n",
            node.id.0,
            node.key.to_string().replace('"', "'"),
            shape
        ));
    }
    let mut arcs: Vec<(NodeId, NodeId)> = graph.arcs().collect();
    arcs.sort();
    for (from, to) in arcs {
        out.push_str(&format!("  n{} -> n{};\n", from.0, to.0));
    }
    out.push_str("}\n");
    out
}

/// Write the graph to `path` (JSON) and, if requested, a sibling dot
/// file. Returns true if any write failed.
pub fn emit(graph: &UnitGraph, path: &Path, also_dot: bool) -> bool {
    let mut had_error = false;

    // Preserve any previous output. Just a nicety; ignore failure.
    let mut backup = path.as_os_str().to_owned();
    backup.push("~");
    let _ = fs::rename(path, &backup);

    match render_json(graph) {
        Ok(json) => {
            if let Err(e) = fs::write(path, json) {
                tracing::warn!("cannot write dependency graph to {}: {}", path.display(), e);
                had_error = true;
            }
        }
        Err(e) => {
            tracing::warn!("cannot serialize dependency graph: {}", e);
            had_error = true;
        }
    }

    if also_dot {
        let dot_path = path.with_extension("dot");
        if let Err(e) = fs::write(&dot_path, render_dot(graph)) {
            tracing::warn!("cannot write dot file to {}: {}", dot_path.display(), e);
            had_error = true;
        }
    }

    had_error
}
