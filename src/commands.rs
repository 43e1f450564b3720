//! CLI command implementations

use std::path::PathBuf;
use treeline_builder::{build_unit_graph, BuildOptions, UnitSummary};

pub fn build(
    summary_path: PathBuf,
    output: PathBuf,
    dot: bool,
    options: BuildOptions,
) -> anyhow::Result<()> {
    let summary = UnitSummary::from_json_file(&summary_path)?;
    tracing::info!(
        "building dependency graph for unit {} ({} declarations)",
        summary.name,
        summary.declarations.decls.len()
    );

    let graph = build_unit_graph(&summary, options);
    graph.verify()?;
    tracing::info!(
        "graph complete: {} nodes, {} arcs",
        graph.node_count(),
        graph.arc_count()
    );

    // The writer reports failure as a flag, never as an error value.
    let had_error = treeline_core::emit(&graph, &output, dot);
    if had_error {
        anyhow::bail!("failed to write dependency graph to {}", output.display());
    }
    tracing::info!("wrote {}", output.display());
    Ok(())
}
