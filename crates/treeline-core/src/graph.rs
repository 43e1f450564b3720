//! Graph store built on petgraph::StableDiGraph with a key index
//!
//! One `UnitGraph` owns every node and arc for exactly one compiled
//! unit. It is populated once by the constructor and then handed
//! read-only to consumers; it is never shared across units.

use crate::key::key_for_whole_unit;
use crate::model::{Aspect, DepNode, DependencyKey, NodeId, NodePair};
use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use std::collections::{HashMap, HashSet};
use thiserror::Error;

/// Structural defects reported by [`UnitGraph::verify`].
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("arc endpoint {0:?} does not resolve to a live node")]
    DanglingArcEndpoint(NodeId),
    #[error("key index entry for {0} points at a dead node")]
    StaleKeyIndex(DependencyKey),
    #[error("node {0:?} with key {1} is missing from the key index")]
    UnindexedNode(NodeId, DependencyKey),
    #[error("key {0} maps to two distinct nodes")]
    DuplicateKey(DependencyKey),
}

/// The definition/use graph of one compiled unit.
pub struct UnitGraph {
    unit_name: String,
    inner: StableDiGraph<DepNode, ()>,
    by_key: HashMap<DependencyKey, NodeIndex>,
    // Identical (from, to) arcs carry no extra information downstream,
    // so they are deduplicated on insertion.
    arcs_seen: HashSet<(NodeIndex, NodeIndex)>,
    whole_unit: Option<NodePair>,
}

impl std::fmt::Debug for UnitGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnitGraph")
            .field("unit", &self.unit_name)
            .field("node_count", &self.inner.node_count())
            .field("arc_count", &self.inner.edge_count())
            .finish()
    }
}

impl UnitGraph {
    pub fn new(unit_name: &str) -> Self {
        UnitGraph {
            unit_name: unit_name.to_string(),
            inner: StableDiGraph::new(),
            by_key: HashMap::new(),
            arcs_seen: HashSet::new(),
            whole_unit: None,
        }
    }

    pub fn unit_name(&self) -> &str {
        &self.unit_name
    }

    /// Register the node pair standing for the whole unit, carrying
    /// its interface fingerprint. Idempotent.
    pub fn add_whole_unit_pair(&mut self, fingerprint: &str) -> NodePair {
        let key = key_for_whole_unit(&self.unit_name);
        let pair = self.find_or_create_node_pair(&key, Some(fingerprint));
        self.whole_unit = Some(pair);
        pair
    }

    /// The whole-unit pair, once registered.
    pub fn whole_unit_pair(&self) -> Option<NodePair> {
        self.whole_unit
    }

    /// Find or create the interface/implementation twins for a
    /// definition key. The aspect of `key` is forced to interface;
    /// repeat calls are idempotent and never overwrite a fingerprint.
    pub fn find_or_create_node_pair(
        &mut self,
        key: &DependencyKey,
        fingerprint: Option<&str>,
    ) -> NodePair {
        let interface = self.find_or_create_node(key.with_aspect(Aspect::Interface), fingerprint, true);
        let implementation =
            self.find_or_create_node(key.with_aspect(Aspect::Implementation), fingerprint, true);
        NodePair {
            interface,
            implementation,
        }
    }

    /// Find or create a single node. An existing node keeps the
    /// fingerprint from its first registration; registering it again
    /// as a provider upgrades the flag.
    pub fn find_or_create_node(
        &mut self,
        key: DependencyKey,
        fingerprint: Option<&str>,
        is_provider: bool,
    ) -> NodeId {
        if let Some(&idx) = self.by_key.get(&key) {
            let node = self
                .inner
                .node_weight_mut(idx)
                .expect("key index entry points at a live node");
            node.is_provider |= is_provider;
            return node.id;
        }
        let idx = self.inner.add_node(DepNode {
            id: NodeId(0),
            key: key.clone(),
            fingerprint: fingerprint.map(str::to_string),
            is_provider,
        });
        let id = NodeId(idx.index() as u32);
        self.inner[idx].id = id;
        self.by_key.insert(key, idx);
        id
    }

    /// Look up a node by key without creating it.
    pub fn find_node(&self, key: &DependencyKey) -> Option<NodeId> {
        self.by_key.get(key).map(|&idx| NodeId(idx.index() as u32))
    }

    /// Resolve a key that the caller guarantees was registered as a
    /// provider. A miss means providers and uses were enumerated out
    /// of order, or the front end handed over inconsistent data; that
    /// is an unrecoverable invariant violation, not a runtime error.
    pub fn expect_provider(&self, key: &DependencyKey) -> NodeId {
        let id = self.find_node(key).unwrap_or_else(|| {
            panic!("use addresses same-unit key {key} that was never registered")
        });
        let node = self.node(id).expect("found id resolves");
        assert!(
            node.is_provider,
            "use addresses same-unit key {key} that was never registered as a provider"
        );
        id
    }

    /// Get a node by id.
    pub fn node(&self, id: NodeId) -> Option<&DepNode> {
        self.inner.node_weight(NodeIndex::new(id.0 as usize))
    }

    /// Append an arc: `to` depends on `from`. If `from`'s fingerprint
    /// changes, `to` must be treated as changed. Duplicates are
    /// dropped; self-arcs are unexpected.
    pub fn add_arc(&mut self, from: NodeId, to: NodeId) {
        let a = NodeIndex::new(from.0 as usize);
        let b = NodeIndex::new(to.0 as usize);
        debug_assert!(self.inner.node_weight(a).is_some(), "arc source is live");
        debug_assert!(self.inner.node_weight(b).is_some(), "arc target is live");
        debug_assert_ne!(from, to, "self-arc");
        if self.arcs_seen.insert((a, b)) {
            self.inner.add_edge(a, b, ());
        }
    }

    pub fn node_count(&self) -> usize {
        self.inner.node_count()
    }

    pub fn arc_count(&self) -> usize {
        self.inner.edge_count()
    }

    /// Iterate over all nodes in id order.
    pub fn nodes(&self) -> impl Iterator<Item = &DepNode> {
        self.inner
            .node_indices()
            .filter_map(move |idx| self.inner.node_weight(idx))
    }

    /// All nodes sorted by key, for reproducible output.
    pub fn nodes_sorted_by_key(&self) -> Vec<&DepNode> {
        let mut nodes: Vec<&DepNode> = self.nodes().collect();
        nodes.sort_by(|a, b| a.key.cmp(&b.key));
        nodes
    }

    /// Iterate over all arcs as (from, to) id pairs.
    pub fn arcs(&self) -> impl Iterator<Item = (NodeId, NodeId)> + '_ {
        self.inner.edge_indices().filter_map(move |idx| {
            self.inner.edge_endpoints(idx).map(|(from, to)| {
                (
                    NodeId(from.index() as u32),
                    NodeId(to.index() as u32),
                )
            })
        })
    }

    /// Ids of nodes this node depends on (arc sources into it).
    pub fn arcs_into(&self, to: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.inner
            .edges_directed(NodeIndex::new(to.0 as usize), Direction::Incoming)
            .map(|e| NodeId(e.source().index() as u32))
    }

    /// Ids of nodes depending on this node (arc targets out of it).
    pub fn arcs_from(&self, from: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.inner
            .edges_directed(NodeIndex::new(from.0 as usize), Direction::Outgoing)
            .map(|e| NodeId(e.target().index() as u32))
    }

    /// Verification pass: every arc endpoint resolves to a live node
    /// and the key index is a bijection onto the live nodes.
    pub fn verify(&self) -> Result<(), GraphError> {
        for idx in self.inner.edge_indices() {
            let (from, to) = self
                .inner
                .edge_endpoints(idx)
                .expect("edge index is live");
            for endpoint in [from, to] {
                if self.inner.node_weight(endpoint).is_none() {
                    return Err(GraphError::DanglingArcEndpoint(NodeId(
                        endpoint.index() as u32
                    )));
                }
            }
        }
        let mut seen: HashSet<NodeIndex> = HashSet::new();
        for (key, &idx) in &self.by_key {
            let node = self
                .inner
                .node_weight(idx)
                .ok_or_else(|| GraphError::StaleKeyIndex(key.clone()))?;
            if &node.key != key {
                return Err(GraphError::DuplicateKey(key.clone()));
            }
            if !seen.insert(idx) {
                return Err(GraphError::DuplicateKey(key.clone()));
            }
        }
        for idx in self.inner.node_indices() {
            let node = &self.inner[idx];
            if self.by_key.get(&node.key) != Some(&idx) {
                return Err(GraphError::UnindexedNode(node.id, node.key.clone()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::{key_for_definition, key_for_use, DefinedEntity, UsedEntity};

    fn nominal_key(identity: &str) -> DependencyKey {
        key_for_definition(DefinedEntity::Nominal {
            type_identity: identity,
        })
    }

    #[test]
    fn node_pair_registers_both_aspects() {
        let mut g = UnitGraph::new("u.unit");
        let pair = g.find_or_create_node_pair(&nominal_key("1T"), Some("fp"));
        assert_ne!(pair.interface, pair.implementation);
        assert_eq!(g.node_count(), 2);
        let interface = g.node(pair.interface).unwrap();
        let implementation = g.node(pair.implementation).unwrap();
        assert_eq!(interface.key.aspect, Aspect::Interface);
        assert_eq!(implementation.key.aspect, Aspect::Implementation);
        assert!(interface.is_provider);
        assert_eq!(interface.fingerprint.as_deref(), Some("fp"));
    }

    #[test]
    fn node_pair_creation_is_idempotent_and_keeps_first_fingerprint() {
        let mut g = UnitGraph::new("u.unit");
        let first = g.find_or_create_node_pair(&nominal_key("1T"), Some("first"));
        let second = g.find_or_create_node_pair(&nominal_key("1T"), Some("second"));
        assert_eq!(first, second);
        assert_eq!(g.node_count(), 2);
        assert_eq!(
            g.node(first.interface).unwrap().fingerprint.as_deref(),
            Some("first")
        );
    }

    #[test]
    fn use_target_is_not_a_provider_until_registered_as_one() {
        let mut g = UnitGraph::new("u.unit");
        let key = key_for_use(UsedEntity::TopLevel { name: "g" });
        let id = g.find_or_create_node(key.clone(), None, false);
        assert!(!g.node(id).unwrap().is_provider);
        let again = g.find_or_create_node(key, None, true);
        assert_eq!(id, again);
        assert!(g.node(id).unwrap().is_provider);
    }

    #[test]
    fn duplicate_arcs_are_dropped() {
        let mut g = UnitGraph::new("u.unit");
        let a = g.find_or_create_node(nominal_key("1A"), None, true);
        let b = g.find_or_create_node(nominal_key("1B"), None, true);
        g.add_arc(a, b);
        g.add_arc(a, b);
        assert_eq!(g.arc_count(), 1);
    }

    #[test]
    fn find_node_does_not_create() {
        let g = UnitGraph::new("u.unit");
        assert!(g.find_node(&nominal_key("1T")).is_none());
    }

    #[test]
    #[should_panic(expected = "never registered")]
    fn resolving_an_unregistered_provider_is_fatal() {
        let g = UnitGraph::new("u.unit");
        g.expect_provider(&nominal_key("1T"));
    }

    #[test]
    fn whole_unit_pair_carries_interface_fingerprint() {
        let mut g = UnitGraph::new("u.unit");
        let pair = g.add_whole_unit_pair("H1");
        assert_eq!(g.whole_unit_pair(), Some(pair));
        assert_eq!(
            g.node(pair.interface).unwrap().fingerprint.as_deref(),
            Some("H1")
        );
        assert_eq!(
            g.node(pair.implementation).unwrap().fingerprint.as_deref(),
            Some("H1")
        );
    }

    #[test]
    fn verify_accepts_a_well_formed_graph() {
        let mut g = UnitGraph::new("u.unit");
        let pair = g.add_whole_unit_pair("H1");
        let t = g.find_or_create_node_pair(&nominal_key("1T"), None);
        g.add_arc(pair.interface, t.interface);
        assert!(g.verify().is_ok());
    }
}
