//! Core data structures for the per-unit dependency graph

use std::fmt;

use serde::{Deserialize, Serialize};

/// Discriminates what kind of program entity a key addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityKind {
    /// The compiled unit itself. Exactly one node pair per graph.
    WholeUnit,
    /// A top-level name: function, variable, alias, operator,
    /// precedence group.
    TopLevel,
    /// A nominal type, keyed purely by its canonical type identity.
    Nominal,
    /// Placeholder for "some member of this type exists / was added
    /// or removed", independent of any specific member.
    PotentialMember,
    /// A specific named member of a holder type.
    Member,
    /// A name reachable only through dynamic/open lookup.
    DynamicLookup,
    /// A cross-unit dependency identifier. Always cascades.
    ExternalDepend,
}

/// Which facet of a defined entity a node represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Aspect {
    /// The externally visible surface.
    Interface,
    /// The internal body.
    Implementation,
}

/// Canonical key identifying one entity facet within a graph.
///
/// Within one graph each (kind, aspect, context, name) maps to exactly
/// one node. `context` holds a canonical type-identity string where
/// the kind calls for one, empty otherwise; `name` holds the canonical
/// base name, empty where the key is context-only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DependencyKey {
    pub kind: EntityKind,
    pub aspect: Aspect,
    pub context: String,
    pub name: String,
}

impl DependencyKey {
    pub fn new(kind: EntityKind, aspect: Aspect, context: String, name: String) -> Self {
        DependencyKey {
            kind,
            aspect,
            context,
            name,
        }
    }

    /// The same key viewed at a different aspect.
    pub fn with_aspect(&self, aspect: Aspect) -> Self {
        DependencyKey {
            aspect,
            ..self.clone()
        }
    }
}

impl fmt::Display for DependencyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?}/{:?} context='{}' name='{}'",
            self.kind, self.aspect, self.context, self.name
        )
    }
}

/// Stable integer id for a node. Assigned by the graph, never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct NodeId(pub u32);

/// A single node in the dependency graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepNode {
    pub id: NodeId,
    pub key: DependencyKey,
    /// Opaque content hash, where the entity carries one. Write-once:
    /// the first registration wins.
    pub fingerprint: Option<String>,
    /// True if this node was created as a definition of the unit;
    /// false if it only stands for an unresolved use target, defined
    /// elsewhere and unconfirmed until graphs are merged downstream.
    pub is_provider: bool,
}

/// The interface/implementation twin nodes registered for every
/// definition key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodePair {
    pub interface: NodeId,
    pub implementation: NodeId,
}
