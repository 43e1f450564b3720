//! Treeline Core - dependency keys, the per-unit graph store, and export sinks

pub mod export;
pub mod graph;
pub mod key;
pub mod model;

pub use export::{emit, render_dot, render_json};
pub use graph::{GraphError, UnitGraph};
pub use key::{key_for_definition, key_for_use, key_for_whole_unit, DefinedEntity, UsedEntity};
pub use model::{Aspect, DepNode, DependencyKey, EntityKind, NodeId, NodePair};
