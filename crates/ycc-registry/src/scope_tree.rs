//! Class scope tree.
//!
//! Uses `petgraph::DiGraph` with:
//! - Nodes: `ScopeData` (member variables and methods of one class)
//! - Edges: `Contains(name)` from an enclosing scope to a nested class scope
//!
//! The root node is the global scope. Nodes are never removed, so a
//! `ScopeId` stays valid for the life of the tree.

use std::fmt;

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use rustc_hash::FxHashMap;
use ycc_core::TypeId;

use crate::symbol::{MethodInfo, SymbolInfo};

/// Stable handle of a scope node.
pub type ScopeId = NodeIndex;

/// Edge types in the scope graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeEdge {
    /// Parent scope contains the named child class scope.
    Contains(String),
}

/// Symbols declared directly in one scope.
#[derive(Debug, Default)]
pub struct ScopeData {
    pub variables: FxHashMap<String, SymbolInfo>,
    pub methods: FxHashMap<String, MethodInfo>,
    /// The class type this scope belongs to. `None` for the global scope.
    pub class_type: Option<TypeId>,
}

/// The tree of class scopes rooted at the global scope.
#[derive(Debug)]
pub struct ScopeTree {
    graph: DiGraph<ScopeData, ScopeEdge>,
    root: ScopeId,
}

impl Default for ScopeTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeTree {
    /// A tree holding only the global scope.
    pub fn new() -> Self {
        let mut graph = DiGraph::new();
        let root = graph.add_node(ScopeData::default());
        Self { graph, root }
    }

    /// The global scope.
    pub fn root(&self) -> ScopeId {
        self.root
    }

    /// Contents of a scope.
    pub fn get(&self, scope: ScopeId) -> Option<&ScopeData> {
        self.graph.node_weight(scope)
    }

    /// Mutable contents of a scope.
    pub fn get_mut(&mut self, scope: ScopeId) -> Option<&mut ScopeData> {
        self.graph.node_weight_mut(scope)
    }

    /// Find a directly nested scope by name. Siblings and grandchildren are
    /// not searched.
    pub fn find_child(&self, parent: ScopeId, name: &str) -> Option<ScopeId> {
        self.graph.edges(parent).find_map(|edge| match edge.weight() {
            ScopeEdge::Contains(child) if child == name => Some(edge.target()),
            _ => None,
        })
    }

    /// Get or create the child scope `name` under `parent`.
    pub fn add_child(&mut self, parent: ScopeId, name: &str, class_type: TypeId) -> ScopeId {
        if let Some(child) = self.find_child(parent, name) {
            return child;
        }
        let child = self.graph.add_node(ScopeData {
            class_type: Some(class_type),
            ..ScopeData::default()
        });
        self.graph
            .add_edge(parent, child, ScopeEdge::Contains(name.to_string()));
        child
    }

    /// Enclosing scope; `None` for the global scope.
    pub fn parent(&self, scope: ScopeId) -> Option<ScopeId> {
        self.graph
            .edges_directed(scope, Direction::Incoming)
            .next()
            .map(|edge| edge.source())
    }

    /// Simple name of a scope; the global scope has none.
    pub fn name(&self, scope: ScopeId) -> Option<&str> {
        self.graph
            .edges_directed(scope, Direction::Incoming)
            .find_map(|edge| match edge.weight() {
                ScopeEdge::Contains(name) => Some(name.as_str()),
            })
    }

    /// Scope names from just below the global scope down to `scope`.
    pub fn path(&self, scope: ScopeId) -> Vec<&str> {
        let mut path = Vec::new();
        let mut current = scope;
        while let Some(parent) = self.parent(current) {
            if let Some(name) = self.name(current) {
                path.push(name);
            }
            current = parent;
        }
        path.reverse();
        path
    }

    /// Dotted path of a scope, empty for the global scope.
    pub fn qualifier(&self, scope: ScopeId) -> String {
        self.path(scope).join(".")
    }

    /// `qualifier.simple`, or just `simple` at global scope.
    pub fn qualified_name(&self, scope: ScopeId, simple: &str) -> String {
        let qualifier = self.qualifier(scope);
        if qualifier.is_empty() {
            simple.to_string()
        } else {
            format!("{qualifier}.{simple}")
        }
    }

    /// The chain `scope, parent, grandparent, ..., root`.
    pub fn ancestors(&self, scope: ScopeId) -> impl Iterator<Item = ScopeId> + '_ {
        std::iter::successors(Some(scope), |s| self.parent(*s))
    }

    /// Find a variable in `scope` or its enclosing scopes.
    pub fn find_variable(&self, scope: ScopeId, name: &str) -> Option<&SymbolInfo> {
        self.ancestors(scope)
            .find_map(|s| self.get(s).and_then(|data| data.variables.get(name)))
    }

    /// Mutable counterpart of [`find_variable`](Self::find_variable).
    pub fn find_variable_mut(&mut self, scope: ScopeId, name: &str) -> Option<&mut SymbolInfo> {
        let owner = self
            .ancestors(scope)
            .find(|s| self.get(*s).is_some_and(|d| d.variables.contains_key(name)))?;
        self.get_mut(owner)?.variables.get_mut(name)
    }

    /// Find a method in `scope` or its enclosing scopes.
    pub fn find_method(&self, scope: ScopeId, name: &str) -> Option<&MethodInfo> {
        self.ancestors(scope)
            .find_map(|s| self.get(s).and_then(|data| data.methods.get(name)))
    }

    /// Nested class scopes of `scope` with their names.
    pub fn children(&self, scope: ScopeId) -> Vec<(&str, ScopeId)> {
        let mut children: Vec<_> = self
            .graph
            .edges(scope)
            .map(|edge| match edge.weight() {
                ScopeEdge::Contains(name) => (name.as_str(), edge.target()),
            })
            .collect();
        children.sort_by(|a, b| a.0.cmp(b.0));
        children
    }

    fn fmt_scope(&self, f: &mut fmt::Formatter<'_>, scope: ScopeId, depth: usize) -> fmt::Result {
        let indent = "  ".repeat(depth);
        let Some(data) = self.get(scope) else {
            return Ok(());
        };
        let mut variables: Vec<_> = data.variables.iter().collect();
        variables.sort_by(|a, b| a.0.cmp(b.0));
        for (name, symbol) in variables {
            writeln!(
                f,
                "{indent}var {name}: {} [{:?}] {}",
                symbol.ty, symbol.flags, symbol.qualified_name
            )?;
        }
        let mut methods: Vec<_> = data.methods.iter().collect();
        methods.sort_by(|a, b| a.0.cmp(b.0));
        for (name, method) in methods {
            writeln!(
                f,
                "{indent}method {name}/{} -> {} {}",
                method.arity(),
                method.return_type(),
                method.qualified_name()
            )?;
        }
        for (name, child) in self.children(scope) {
            writeln!(f, "{indent}class {name} {{")?;
            self.fmt_scope(f, child, depth + 1)?;
            writeln!(f, "{indent}}}")?;
        }
        Ok(())
    }
}

impl fmt::Display for ScopeTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_scope(f, self.root, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ycc_core::SymbolFlags;

    #[test]
    fn nested_scopes_build_dotted_names() {
        let mut tree = ScopeTree::new();
        let outer = tree.add_child(tree.root(), "Outer", TypeId::new(10));
        let inner = tree.add_child(outer, "Inner", TypeId::new(11));

        assert_eq!(tree.qualifier(tree.root()), "");
        assert_eq!(tree.qualifier(inner), "Outer.Inner");
        assert_eq!(tree.qualified_name(inner, "x"), "Outer.Inner.x");
        assert_eq!(tree.parent(inner), Some(outer));
        assert_eq!(tree.name(tree.root()), None);
    }

    #[test]
    fn add_child_is_idempotent() {
        let mut tree = ScopeTree::new();
        let a = tree.add_child(tree.root(), "A", TypeId::new(10));
        let again = tree.add_child(tree.root(), "A", TypeId::new(10));
        assert_eq!(a, again);
    }

    #[test]
    fn lookup_walks_parents_but_not_siblings() {
        let mut tree = ScopeTree::new();
        let a = tree.add_child(tree.root(), "A", TypeId::new(10));
        let b = tree.add_child(tree.root(), "B", TypeId::new(11));
        let inner = tree.add_child(a, "Inner", TypeId::new(12));

        if let Some(data) = tree.get_mut(a) {
            data.variables
                .insert("count".into(), SymbolInfo::new(TypeId::INT, SymbolFlags::MEMBER));
        }

        assert!(tree.find_variable(inner, "count").is_some());
        assert!(tree.find_variable(b, "count").is_none());
        assert!(tree.find_child(tree.root(), "Inner").is_none());
    }
}
