//! Frontend collaborator seam: the unit summary data model
//!
//! The front end (parser/type-checker) is an external collaborator.
//! What it hands over is captured here as a serde-friendly snapshot:
//! the declaration tree of one compiled unit, its reference-tracking
//! data, fingerprints, and external dependency identifiers. Type
//! identities arrive pre-mangled; the canonical mangling algorithm is
//! the front end's business.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Formal access level of a declaration, ordered from most to least
/// restrictive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AccessLevel {
    Private,
    FilePrivate,
    Internal,
    Public,
    Open,
}

/// Declaration kinds as the front end reports them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeclKind {
    PrecedenceGroup,
    Operator,
    TypeDecl,
    TypeAlias,
    Function,
    Var,
    Accessor,
    Extension,
    // Kinds that can never affect other units.
    Import,
    PatternBinding,
    EnumCase,
    TopLevelStatement,
    ConditionalBlock,
    DiagnosticPragma,
}

impl DeclKind {
    /// Kinds that are local to their unit regardless of access level.
    pub fn is_inherently_local(self) -> bool {
        matches!(
            self,
            DeclKind::Import
                | DeclKind::PatternBinding
                | DeclKind::EnumCase
                | DeclKind::TopLevelStatement
                | DeclKind::ConditionalBlock
                | DeclKind::DiagnosticPragma
        )
    }

    /// Named value-like kinds that can appear as members of a type or
    /// extension body.
    pub fn is_value_member(self) -> bool {
        matches!(
            self,
            DeclKind::TypeDecl
                | DeclKind::TypeAlias
                | DeclKind::Function
                | DeclKind::Var
                | DeclKind::Accessor
        )
    }
}

/// Index of a declaration in the unit's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeclId(pub u32);

/// An inherited (conformed-to) type in an extension or type
/// declaration. Only its privacy matters here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InheritedType {
    pub name: String,
    #[serde(default)]
    pub is_private: bool,
}

/// The type an extension extends. It may be declared in another unit,
/// so it is described by value rather than by arena index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtendedTypeRef {
    pub name: String,
    /// Canonical mangled identity. Empty only on malformed input.
    pub type_identity: String,
    pub access: AccessLevel,
    #[serde(default)]
    pub body_fingerprint: Option<String>,
}

/// One declaration in the unit's tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Decl {
    pub kind: DeclKind,
    /// Canonical base name. May be empty (anonymous members).
    #[serde(default)]
    pub name: String,
    pub access: AccessLevel,
    /// True for operator-named member functions.
    #[serde(default)]
    pub is_operator_named: bool,
    /// Canonical mangled identity; type declarations only.
    #[serde(default)]
    pub type_identity: String,
    /// Body-level content hash; container-like declarations only.
    #[serde(default)]
    pub body_fingerprint: Option<String>,
    /// Nested members, by arena index.
    #[serde(default)]
    pub members: Vec<DeclId>,
    /// The extended type; extensions only.
    #[serde(default)]
    pub extended_type: Option<ExtendedTypeRef>,
    /// Inherited-type list; extensions and type declarations.
    #[serde(default)]
    pub inherited: Vec<InheritedType>,
}

impl Decl {
    /// Convenience constructor for front ends assembling a tree;
    /// remaining fields via struct update.
    pub fn new(kind: DeclKind, name: impl Into<String>, access: AccessLevel) -> Decl {
        Decl {
            kind,
            name: name.into(),
            access,
            is_operator_named: false,
            type_identity: String::new(),
            body_fingerprint: None,
            members: vec![],
            extended_type: None,
            inherited: vec![],
        }
    }

    /// True if this declaration cannot affect other units: its access
    /// level is at or below file-private, or its kind is inherently
    /// local. Operators and extensions are never private by this rule
    /// alone.
    pub fn is_private(&self) -> bool {
        if self.kind.is_inherently_local() {
            return true;
        }
        match self.kind {
            DeclKind::Operator | DeclKind::Extension => false,
            _ => self.access <= AccessLevel::FilePrivate,
        }
    }
}

/// Arena of declarations plus the ids of the top-level ones. Nested
/// structure is expressed through indices, not ownership pointers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeclTree {
    #[serde(default)]
    pub decls: Vec<Decl>,
    #[serde(default)]
    pub top_level: Vec<DeclId>,
}

impl DeclTree {
    pub fn decl(&self, id: DeclId) -> &Decl {
        &self.decls[id.0 as usize]
    }

    /// Add a declaration to the arena, returning its id.
    pub fn push(&mut self, decl: Decl) -> DeclId {
        let id = DeclId(self.decls.len() as u32);
        self.decls.push(decl);
        id
    }

    /// Add a declaration and record it as top-level.
    pub fn push_top_level(&mut self, decl: Decl) -> DeclId {
        let id = self.push(decl);
        self.top_level.push(id);
        id
    }
}

/// One entry in the referenced-members map: a (holder type, member)
/// access with its cascade flag. An absent member name is a
/// potential-member use.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberUse {
    pub holder_identity: String,
    #[serde(default)]
    pub holder_is_private: bool,
    #[serde(default)]
    pub member: Option<String>,
    pub cascades: bool,
}

/// Reference-tracking data the front end collected while resolving
/// names. The boolean values are cascade flags: true when a change to
/// the referent must invalidate this unit's interface, not just its
/// body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReferencedNames {
    #[serde(default)]
    pub top_level: BTreeMap<String, bool>,
    #[serde(default)]
    pub dynamic_lookup: BTreeMap<String, bool>,
    #[serde(default)]
    pub members: Vec<MemberUse>,
}

/// Everything the graph constructor needs to know about one compiled
/// unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitSummary {
    pub name: String,
    /// Covers every token of the unit, including ones per-declaration
    /// fingerprints omit. Always present.
    pub interface_fingerprint: String,
    #[serde(default)]
    pub had_compilation_error: bool,
    #[serde(default)]
    pub declarations: DeclTree,
    #[serde(default)]
    pub references: ReferencedNames,
    /// Cross-unit dependency identifiers, in discovery order.
    #[serde(default)]
    pub external_dependencies: Vec<String>,
    /// Base names reachable only via dynamic/open lookup. Dynamic
    /// dispatch bypasses normal visibility.
    #[serde(default)]
    pub dynamic_members: Vec<String>,
}

impl UnitSummary {
    pub fn from_json_file(path: &Path) -> anyhow::Result<UnitSummary> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read unit summary {}", path.display()))?;
        let summary: UnitSummary = serde_json::from_str(&text)
            .with_context(|| format!("cannot parse unit summary {}", path.display()))?;
        summary
            .validate()
            .with_context(|| format!("malformed unit summary {}", path.display()))?;
        Ok(summary)
    }

    /// Reject declaration ids that do not resolve into the arena, so
    /// malformed input fails here rather than mid-construction.
    pub fn validate(&self) -> anyhow::Result<()> {
        let total = self.declarations.decls.len();
        let check = |id: DeclId, place: &str| -> anyhow::Result<()> {
            if (id.0 as usize) < total {
                Ok(())
            } else {
                anyhow::bail!(
                    "{place} references declaration {} but the unit declares {total}",
                    id.0
                )
            }
        };
        for &id in &self.declarations.top_level {
            check(id, "top-level list")?;
        }
        for decl in &self.declarations.decls {
            for &member in &decl.members {
                check(member, "member list")?;
            }
        }
        Ok(())
    }
}

/// Queries the graph constructor makes against the front end.
pub trait UnitFrontend {
    fn unit_name(&self) -> &str;
    fn interface_fingerprint(&self) -> &str;
    fn had_compilation_error(&self) -> bool;
    fn declarations(&self) -> &DeclTree;
    fn referenced_names(&self) -> &ReferencedNames;
    fn external_dependencies(&self) -> &[String];
    fn dynamic_lookup_members(&self) -> &[String];
}

impl UnitFrontend for UnitSummary {
    fn unit_name(&self) -> &str {
        &self.name
    }

    fn interface_fingerprint(&self) -> &str {
        &self.interface_fingerprint
    }

    fn had_compilation_error(&self) -> bool {
        self.had_compilation_error
    }

    fn declarations(&self) -> &DeclTree {
        &self.declarations
    }

    fn referenced_names(&self) -> &ReferencedNames {
        &self.references
    }

    fn external_dependencies(&self) -> &[String] {
        &self.external_dependencies
    }

    fn dynamic_lookup_members(&self) -> &[String] {
        &self.dynamic_members
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_private_value_is_private() {
        let decl = Decl::new(DeclKind::Function, "helper", AccessLevel::FilePrivate);
        assert!(decl.is_private());
    }

    #[test]
    fn operators_and_extensions_are_never_private_by_access() {
        for kind in [DeclKind::Operator, DeclKind::Extension] {
            let decl = Decl::new(kind, "x", AccessLevel::Private);
            assert!(!decl.is_private(), "{kind:?}");
        }
    }

    #[test]
    fn inherently_local_kinds_are_private_regardless_of_access() {
        let decl = Decl::new(DeclKind::Import, "", AccessLevel::Public);
        assert!(decl.is_private());
    }

    #[test]
    fn loading_reads_a_well_formed_summary() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("u.summary.json");
        std::fs::write(
            &path,
            r#"{
                "name": "U",
                "interface_fingerprint": "H1",
                "declarations": {
                    "decls": [{"kind": "Function", "name": "f", "access": "Public"}],
                    "top_level": [0]
                }
            }"#,
        )
        .unwrap();
        let summary = UnitSummary::from_json_file(&path).unwrap();
        assert_eq!(summary.name, "U");
        assert_eq!(summary.declarations.top_level.len(), 1);
    }

    #[test]
    fn loading_rejects_out_of_range_declaration_ids() {
        let dir = tempfile::tempdir().unwrap();

        let top_level = dir.path().join("top.summary.json");
        std::fs::write(
            &top_level,
            r#"{"name": "U", "interface_fingerprint": "H1",
                "declarations": {"decls": [], "top_level": [3]}}"#,
        )
        .unwrap();
        let err = UnitSummary::from_json_file(&top_level).unwrap_err();
        assert!(format!("{err:#}").contains("declaration 3"), "{err:#}");

        let member = dir.path().join("member.summary.json");
        std::fs::write(
            &member,
            r#"{"name": "U", "interface_fingerprint": "H1",
                "declarations": {
                    "decls": [{"kind": "TypeDecl", "name": "T",
                               "access": "Public", "members": [7]}],
                    "top_level": [0]
                }}"#,
        )
        .unwrap();
        let err = UnitSummary::from_json_file(&member).unwrap_err();
        assert!(format!("{err:#}").contains("declaration 7"), "{err:#}");
    }

    #[test]
    fn summary_round_trips_through_json() {
        let mut tree = DeclTree::default();
        tree.push_top_level(Decl::new(DeclKind::Function, "f", AccessLevel::Public));
        let summary = UnitSummary {
            name: "u.unit".to_string(),
            interface_fingerprint: "H1".to_string(),
            had_compilation_error: false,
            declarations: tree,
            references: ReferencedNames::default(),
            external_dependencies: vec!["libX".to_string()],
            dynamic_members: vec![],
        };
        let json = serde_json::to_string(&summary).unwrap();
        let back: UnitSummary = serde_json::from_str(&json).unwrap();
        assert_eq!(back.name, "u.unit");
        assert_eq!(back.declarations.top_level.len(), 1);
        assert_eq!(back.external_dependencies, vec!["libX".to_string()]);
    }
}
