//! The compiler collaborator contract.
//!
//! Symbol resolution lives outside the orchestrator: some compiled unit
//! knows which namespaces exist, and the pipeline only ever asks it two
//! questions. [`SymbolTable`] is the in-memory stand-in used by the CLI
//! and tests when no real compiler backend is attached.

use std::collections::HashSet;

use quill_core::NamespacePath;

/// Opaque reference to a resolved namespace in the compiled unit.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SymbolHandle(String);

impl SymbolHandle {
    fn from_qualified(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Fully qualified name of the resolved namespace.
    pub fn qualified_name(&self) -> &str {
        &self.0
    }
}

/// Maps dotted names to namespace handles within a compiled unit.
pub trait SymbolResolver: Send + Sync {
    fn resolve_namespace(&self, name: &NamespacePath) -> Option<SymbolHandle>;

    fn child_namespace(&self, handle: &SymbolHandle, simple_name: &str) -> Option<SymbolHandle>;
}

/// In-memory resolver backed by an explicit namespace set.
///
/// In permissive mode every well-formed name resolves; that is what the
/// CLI runs with when no compiled unit is available.
#[derive(Debug, Default, Clone)]
pub struct SymbolTable {
    namespaces: HashSet<String>,
    permissive: bool,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// A table that resolves every name.
    pub fn permissive() -> Self {
        Self {
            namespaces: HashSet::new(),
            permissive: true,
        }
    }

    /// Declare a namespace, by fully qualified dotted name.
    pub fn insert(&mut self, qualified_name: impl Into<String>) -> &mut Self {
        self.namespaces.insert(qualified_name.into());
        self
    }

    pub fn contains(&self, qualified_name: &str) -> bool {
        self.permissive || self.namespaces.contains(qualified_name)
    }
}

impl SymbolResolver for SymbolTable {
    fn resolve_namespace(&self, name: &NamespacePath) -> Option<SymbolHandle> {
        self.contains(name.as_str())
            .then(|| SymbolHandle::from_qualified(name.as_str()))
    }

    fn child_namespace(&self, handle: &SymbolHandle, simple_name: &str) -> Option<SymbolHandle> {
        let qualified = format!("{}.{}", handle.qualified_name(), simple_name);
        self.contains(&qualified)
            .then(|| SymbolHandle::from_qualified(qualified))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_table_resolves_only_known_names() {
        let mut table = SymbolTable::new();
        table.insert("Game").insert("Game.Combat");

        let game = NamespacePath::parse("Game").unwrap();
        let hud = NamespacePath::parse("Hud").unwrap();
        assert!(table.resolve_namespace(&game).is_some());
        assert!(table.resolve_namespace(&hud).is_none());
    }

    #[test]
    fn child_lookup_qualifies_against_parent() {
        let mut table = SymbolTable::new();
        table.insert("Game").insert("Game.Editor");

        let game = NamespacePath::parse("Game").unwrap();
        let handle = table.resolve_namespace(&game).unwrap();

        let editor = table.child_namespace(&handle, "Editor").unwrap();
        assert_eq!(editor.qualified_name(), "Game.Editor");
        assert!(table.child_namespace(&handle, "Runtime").is_none());
    }

    #[test]
    fn permissive_table_resolves_everything() {
        let table = SymbolTable::permissive();
        let name = NamespacePath::parse("Anything.At.All").unwrap();
        assert!(table.resolve_namespace(&name).is_some());
    }
}
