//! Enumerates everything a unit references
//!
//! Turns the front end's reference-tracking data into (used key,
//! cascade flag) pairs. A cascading use is one whose referent's change
//! must invalidate this unit's externally visible interface, not just
//! its body.

use crate::summary::{MemberUse, ReferencedNames};
use treeline_core::{key_for_use, DependencyKey, UsedEntity};
use std::collections::BTreeSet;

/// One entity the unit references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsedReference {
    pub key: DependencyKey,
    pub cascades: bool,
}

/// Produce every used reference, in a deterministic order.
///
/// Member uses on a private holder are dropped unless intrafile
/// tracking is on; everything else is always visible.
pub fn enumerate_uses(
    references: &ReferencedNames,
    external_dependencies: &[String],
    include_intrafile: bool,
) -> Vec<UsedReference> {
    let mut out = Vec::new();

    for (name, &cascades) in &references.top_level {
        out.push(UsedReference {
            key: key_for_use(UsedEntity::TopLevel { name }),
            cascades,
        });
    }
    for (name, &cascades) in &references.dynamic_lookup {
        out.push(UsedReference {
            key: key_for_use(UsedEntity::DynamicLookup { name }),
            cascades,
        });
    }
    // External dependencies always cascade.
    for name in external_dependencies {
        out.push(UsedReference {
            key: key_for_use(UsedEntity::ExternalDepend { name }),
            cascades: true,
        });
    }

    let visible: Vec<&MemberUse> = references
        .members
        .iter()
        .filter(|m| include_intrafile || !m.holder_is_private)
        .collect();

    // Pass 1: holders with at least one cascading member use. A type
    // that changed observably through any member must propagate
    // through all code merely naming the type, so the nominal use's
    // cascade flag is a property of the holder, not of the specific
    // member access.
    let cascading_holders: BTreeSet<&str> = visible
        .iter()
        .filter(|m| m.cascades)
        .map(|m| m.holder_identity.as_str())
        .collect();

    // Pass 2: one nominal use per member-use entry.
    for member in &visible {
        out.push(UsedReference {
            key: key_for_use(UsedEntity::Nominal {
                type_identity: &member.holder_identity,
            }),
            cascades: cascading_holders.contains(member.holder_identity.as_str()),
        });
    }

    // Member (or potential-member) uses keep their own cascade flag.
    for member in &visible {
        out.push(UsedReference {
            key: key_for_use(UsedEntity::Member {
                holder_identity: &member.holder_identity,
                name: member.member.as_deref(),
            }),
            cascades: member.cascades,
        });
    }

    out
}
