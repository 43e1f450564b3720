//! Orchestrates graph construction for one compiled unit
//!
//! Order matters: the whole-unit pair first, then every provider,
//! then every use. A use resolves its using node against nodes the
//! provider pass registered; running these out of order is a contract
//! violation, not a recoverable error.

use crate::providers::ProviderEnumerator;
use crate::summary::UnitFrontend;
use crate::uses::enumerate_uses;
use treeline_core::{Aspect, UnitGraph};

/// Configuration for one construction run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildOptions {
    /// Emit providers for declarations that cannot affect other units.
    pub include_private_declarations: bool,
    /// Keep uses of same-file private declarations.
    pub include_intrafile_dependencies: bool,
    /// Per-declaration (type body) fingerprinting is enabled.
    pub type_fingerprints: bool,
}

impl BuildOptions {
    /// Per-declaration fingerprinting diverts token hashing into type
    /// bodies before privacy of a difference is known, so both
    /// inclusion flags are forced on to keep fingerprint effects
    /// observable.
    pub fn normalized(self) -> Self {
        if self.type_fingerprints {
            BuildOptions {
                include_private_declarations: true,
                include_intrafile_dependencies: true,
                type_fingerprints: true,
            }
        } else {
            self
        }
    }
}

/// Build the definition/use graph for one unit. Single-threaded; the
/// returned graph is owned by the caller and never shared across
/// units.
///
/// When the unit failed to compile, the graph degrades to the
/// whole-unit node pair alone: downstream treats the unit as depending
/// on nothing and being depended on only through its whole-unit
/// fingerprint.
pub fn build_unit_graph(frontend: &dyn UnitFrontend, options: BuildOptions) -> UnitGraph {
    let options = options.normalized();
    let mut graph = UnitGraph::new(frontend.unit_name());
    let unit_pair = graph.add_whole_unit_pair(frontend.interface_fingerprint());

    if frontend.had_compilation_error() {
        tracing::warn!(
            "unit {} had compilation errors; recording whole-unit node only",
            frontend.unit_name()
        );
        debug_assert!(graph.verify().is_ok());
        return graph;
    }

    let providers = ProviderEnumerator::new(
        frontend.declarations(),
        frontend.dynamic_lookup_members(),
        options.include_private_declarations,
    )
    .enumerate();
    for provided in providers {
        let pair = graph.find_or_create_node_pair(&provided.key, provided.fingerprint.as_deref());
        // The whole-unit fingerprint covers tokens per-declaration
        // fingerprints omit (attributes among them), so it dominates
        // every provider.
        graph.add_arc(unit_pair.interface, pair.interface);
    }

    let unit_interface_key = graph
        .node(unit_pair.interface)
        .expect("whole-unit node is live")
        .key
        .clone();
    let unit_implementation_key = unit_interface_key.with_aspect(Aspect::Implementation);

    let uses = enumerate_uses(
        frontend.referenced_names(),
        frontend.external_dependencies(),
        options.include_intrafile_dependencies,
    );
    for used in uses {
        // What is depended upon may be defined elsewhere; unresolved
        // targets stay non-providers until graphs are merged
        // downstream.
        let def = graph.find_or_create_node(used.key, None, false);
        let using_key = if used.cascades {
            &unit_interface_key
        } else {
            &unit_implementation_key
        };
        let using = graph.expect_provider(using_key);
        graph.add_arc(def, using);
    }

    tracing::debug!(
        "built dependency graph for {}: {} nodes, {} arcs",
        graph.unit_name(),
        graph.node_count(),
        graph.arc_count()
    );
    debug_assert!(graph.verify().is_ok(), "constructed graph failed verification");
    graph
}
