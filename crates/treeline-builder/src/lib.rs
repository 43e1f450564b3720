//! Treeline Builder - turns one unit's declarations and name
//! references into its definition/use dependency graph

pub mod construct;
pub mod providers;
pub mod summary;
pub mod uses;

pub use construct::{build_unit_graph, BuildOptions};
pub use providers::{ProvidedEntity, ProviderEnumerator};
pub use summary::{
    AccessLevel, Decl, DeclId, DeclKind, DeclTree, ExtendedTypeRef, InheritedType, MemberUse,
    ReferencedNames, UnitFrontend, UnitSummary,
};
pub use uses::{enumerate_uses, UsedReference};
