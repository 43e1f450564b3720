//! Enumerates everything a unit defines
//!
//! Walks the declaration tree, applies the visibility rules, and
//! emits one (key, optional fingerprint) per provided entity. The
//! walk is an explicit two-phase pass: classify top-level
//! declarations into buckets, then drain a worklist of container
//! bodies, so that extension-privacy judgments (which depend on
//! member privacy) never interleave with recursion.

use crate::summary::{AccessLevel, Decl, DeclId, DeclKind, DeclTree};
use treeline_core::{key_for_definition, DefinedEntity, DependencyKey};

/// One entity the unit defines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvidedEntity {
    pub key: DependencyKey,
    pub fingerprint: Option<String>,
}

impl ProvidedEntity {
    fn new(entity: DefinedEntity<'_>, fingerprint: Option<&str>) -> Self {
        ProvidedEntity {
            key: key_for_definition(entity),
            fingerprint: fingerprint.map(str::to_string),
        }
    }
}

/// A nominal type as seen during the walk. For extensions of types
/// declared elsewhere this is all we know about the extended type.
#[derive(Debug, Clone)]
struct NominalRef {
    identity: String,
    access: AccessLevel,
    fingerprint: Option<String>,
}

impl NominalRef {
    fn from_type_decl(decl: &Decl) -> Self {
        NominalRef {
            identity: decl.type_identity.clone(),
            access: decl.access,
            fingerprint: decl.body_fingerprint.clone(),
        }
    }
}

/// A container body queued for the walk: a type declaration's own
/// members, or an extension's contribution to its extended type.
#[derive(Clone)]
struct Container {
    nominal: NominalRef,
    members: Vec<DeclId>,
    via_extension: Option<DeclId>,
}

pub struct ProviderEnumerator<'a> {
    tree: &'a DeclTree,
    dynamic_members: &'a [String],
    include_private: bool,
}

impl<'a> ProviderEnumerator<'a> {
    pub fn new(tree: &'a DeclTree, dynamic_members: &'a [String], include_private: bool) -> Self {
        ProviderEnumerator {
            tree,
            dynamic_members,
            include_private,
        }
    }

    /// Produce every provided entity, in a deterministic order.
    pub fn enumerate(&self) -> Vec<ProvidedEntity> {
        // Phase 1: bucket top-level declarations by kind. Inherently
        // local kinds never reach any bucket.
        let mut precedence_groups: Vec<&str> = Vec::new();
        let mut operators: Vec<&str> = Vec::new();
        let mut top_values: Vec<&str> = Vec::new();
        let mut worklist: Vec<Container> = Vec::new();

        for &id in &self.tree.top_level {
            let decl = self.tree.decl(id);
            match decl.kind {
                DeclKind::Extension => {
                    // An extension of a malformed (absent) type
                    // contributes nothing.
                    if let Some(extended) = &decl.extended_type {
                        worklist.push(Container {
                            nominal: NominalRef {
                                identity: extended.type_identity.clone(),
                                access: extended.access,
                                fingerprint: extended.body_fingerprint.clone(),
                            },
                            members: decl.members.clone(),
                            via_extension: Some(id),
                        });
                    }
                }
                DeclKind::Operator => operators.push(&decl.name),
                DeclKind::PrecedenceGroup => precedence_groups.push(&decl.name),
                DeclKind::TypeDecl => {
                    if !self.excluded(decl) {
                        worklist.push(Container {
                            nominal: NominalRef::from_type_decl(decl),
                            members: decl.members.clone(),
                            via_extension: None,
                        });
                    }
                }
                DeclKind::TypeAlias | DeclKind::Var | DeclKind::Function | DeclKind::Accessor => {
                    if !self.excluded(decl) {
                        top_values.push(&decl.name);
                    }
                }
                _ => {}
            }
        }

        // Phase 2: drain the worklist. Nested types append to it.
        let mut member_operators: Vec<String> = Vec::new();
        let mut all_nominals: Vec<NominalRef> = Vec::new();
        let mut potential_member_holders: Vec<String> = Vec::new();
        let mut container_members: Vec<(String, String)> = Vec::new();

        let mut cursor = 0;
        while cursor < worklist.len() {
            let container = worklist[cursor].clone();
            cursor += 1;

            if !self.include_private && container.nominal.access <= AccessLevel::FilePrivate {
                continue;
            }

            // An extension's contribution is observable when it
            // conforms the type to a non-private inherited type, or
            // when it has at least one non-private member. The
            // conformance alone is externally visible even if every
            // member is private.
            let exposed_conformance = container
                .via_extension
                .map(|ext| !self.all_inherited_private(ext))
                .unwrap_or(false);
            let via_extension = container.via_extension.is_some();
            if via_extension
                && !self.include_private
                && !exposed_conformance
                && self.all_members_private(&container.members)
            {
                continue;
            }
            // A members-only extension exposes member existence, not
            // the nominal's interface: the extended type is not
            // provided here unless a conformance is visible.
            if !via_extension || exposed_conformance || self.include_private {
                all_nominals.push(container.nominal.clone());
            }
            // Member-existence changes are not covered by
            // fingerprints; every holder gets a potential-member node.
            potential_member_holders.push(container.nominal.identity.clone());

            for &member_id in &container.members {
                let member = self.tree.decl(member_id);
                if !member.kind.is_value_member() || self.excluded(member) {
                    continue;
                }
                if member.is_operator_named {
                    member_operators.push(member.name.clone());
                }
                if member.kind == DeclKind::TypeDecl {
                    worklist.push(Container {
                        nominal: NominalRef::from_type_decl(member),
                        members: member.members.clone(),
                        via_extension: None,
                    });
                }
                if !member.name.is_empty() {
                    container_members
                        .push((container.nominal.identity.clone(), member.name.clone()));
                }
            }
        }

        // Emission order mirrors the bucket order; it affects only
        // assigned node ids, never correctness.
        let mut out = Vec::new();
        for name in precedence_groups {
            out.push(ProvidedEntity::new(DefinedEntity::TopLevel { name }, None));
        }
        for name in &member_operators {
            out.push(ProvidedEntity::new(DefinedEntity::TopLevel { name }, None));
        }
        for name in operators {
            out.push(ProvidedEntity::new(DefinedEntity::TopLevel { name }, None));
        }
        for name in top_values {
            out.push(ProvidedEntity::new(DefinedEntity::TopLevel { name }, None));
        }
        for nominal in &all_nominals {
            out.push(ProvidedEntity::new(
                DefinedEntity::Nominal {
                    type_identity: &nominal.identity,
                },
                nominal.fingerprint.as_deref(),
            ));
        }
        for identity in &potential_member_holders {
            out.push(ProvidedEntity::new(
                DefinedEntity::PotentialMember {
                    type_identity: identity,
                },
                None,
            ));
        }
        for (holder, name) in &container_members {
            out.push(ProvidedEntity::new(
                DefinedEntity::Member {
                    holder_identity: holder,
                    name,
                },
                None,
            ));
        }
        // Dynamic dispatch bypasses normal visibility, so these come
        // straight from the collaborator, independent of the walk.
        for name in self.dynamic_members {
            out.push(ProvidedEntity::new(DefinedEntity::DynamicLookup { name }, None));
        }
        out
    }

    fn excluded(&self, decl: &Decl) -> bool {
        !self.include_private && decl.is_private()
    }

    fn all_inherited_private(&self, extension: DeclId) -> bool {
        self.tree
            .decl(extension)
            .inherited
            .iter()
            .all(|inherited| inherited.is_private)
    }

    fn all_members_private(&self, members: &[DeclId]) -> bool {
        members.iter().all(|&id| self.tree.decl(id).is_private())
    }
}
