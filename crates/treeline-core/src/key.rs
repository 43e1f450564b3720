//! Deterministic mapping from entity descriptions to canonical keys

use crate::model::{Aspect, DependencyKey, EntityKind};

/// Tagged payload describing an entity the unit defines.
///
/// Type identities are canonical mangled strings produced by the front
/// end; they are stable across compilations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefinedEntity<'a> {
    TopLevel { name: &'a str },
    Nominal { type_identity: &'a str },
    PotentialMember { type_identity: &'a str },
    Member { holder_identity: &'a str, name: &'a str },
    DynamicLookup { name: &'a str },
}

/// Tagged payload describing an entity the unit references. The
/// referent may be defined in another unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsedEntity<'a> {
    TopLevel { name: &'a str },
    DynamicLookup { name: &'a str },
    ExternalDepend { name: &'a str },
    Nominal { type_identity: &'a str },
    /// An empty or absent member name denotes a potential-member use:
    /// the unit is sensitive to member existence on the holder, not to
    /// any specific member.
    Member {
        holder_identity: &'a str,
        name: Option<&'a str>,
    },
}

/// Key for the node pair representing the whole unit. The unit name is
/// a caller contract and must be non-empty.
pub fn key_for_whole_unit(unit_name: &str) -> DependencyKey {
    assert!(!unit_name.is_empty(), "whole-unit key requires a unit name");
    DependencyKey::new(
        EntityKind::WholeUnit,
        Aspect::Interface,
        String::new(),
        unit_name.to_string(),
    )
}

/// Key for something the unit defines. Definition keys are always
/// produced at interface aspect; the graph registers the
/// implementation twin.
pub fn key_for_definition(entity: DefinedEntity<'_>) -> DependencyKey {
    match entity {
        DefinedEntity::TopLevel { name } => {
            DependencyKey::new(EntityKind::TopLevel, Aspect::Interface, String::new(), name.to_string())
        }
        DefinedEntity::Nominal { type_identity } => DependencyKey::new(
            EntityKind::Nominal,
            Aspect::Interface,
            context_from(type_identity),
            String::new(),
        ),
        DefinedEntity::PotentialMember { type_identity } => DependencyKey::new(
            EntityKind::PotentialMember,
            Aspect::Interface,
            context_from(type_identity),
            String::new(),
        ),
        DefinedEntity::Member {
            holder_identity,
            name,
        } => DependencyKey::new(
            EntityKind::Member,
            Aspect::Interface,
            context_from(holder_identity),
            name.to_string(),
        ),
        DefinedEntity::DynamicLookup { name } => DependencyKey::new(
            EntityKind::DynamicLookup,
            Aspect::Interface,
            String::new(),
            name.to_string(),
        ),
    }
}

/// Key for something the unit references. Mirrors [`key_for_definition`]
/// so that a use of a same-unit definition lands on the same node.
pub fn key_for_use(entity: UsedEntity<'_>) -> DependencyKey {
    match entity {
        UsedEntity::TopLevel { name } => {
            DependencyKey::new(EntityKind::TopLevel, Aspect::Interface, String::new(), name.to_string())
        }
        UsedEntity::DynamicLookup { name } => DependencyKey::new(
            EntityKind::DynamicLookup,
            Aspect::Interface,
            String::new(),
            name.to_string(),
        ),
        UsedEntity::ExternalDepend { name } => DependencyKey::new(
            EntityKind::ExternalDepend,
            Aspect::Interface,
            String::new(),
            name.to_string(),
        ),
        UsedEntity::Nominal { type_identity } => DependencyKey::new(
            EntityKind::Nominal,
            Aspect::Interface,
            context_from(type_identity),
            String::new(),
        ),
        UsedEntity::Member {
            holder_identity,
            name,
        } => match name.filter(|n| !n.is_empty()) {
            Some(member) => DependencyKey::new(
                EntityKind::Member,
                Aspect::Interface,
                context_from(holder_identity),
                member.to_string(),
            ),
            None => DependencyKey::new(
                EntityKind::PotentialMember,
                Aspect::Interface,
                context_from(holder_identity),
                String::new(),
            ),
        },
    }
}

/// An absent type identity yields an empty context. Should not occur
/// on well-formed input.
fn context_from(type_identity: &str) -> String {
    type_identity.to_string()
}
