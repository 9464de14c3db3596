//! The scope environment shared by the parser, the analyzer and the IR
//! generator.
//!
//! It owns the type registry, the class scope tree, the local-variable
//! stack of the method being processed and the two side tables (statics and
//! string literals) consumed by the IR module prologue.

use std::fmt;

use rustc_hash::FxHashMap;
use tracing::trace;
use ycc_core::{ScopeError, SymbolFlags, TypeId};

use crate::literals::{LiteralId, LiteralPool};
use crate::scope_tree::{ScopeId, ScopeTree};
use crate::symbol::{MethodInfo, SymbolInfo};
use crate::types::{TypeEntry, TypeRegistry};

type Result<T> = std::result::Result<T, ScopeError>;

/// Symbol and type environment of one compilation unit.
///
/// # Locals
///
/// Locals of the current method live on a single stack. [`enter_block`]
/// records the stack height and [`leave_block`] truncates back to it, so
/// the innermost declaration of a name is always the one nearest the top.
///
/// [`enter_block`]: ScopeEnvironment::enter_block
/// [`leave_block`]: ScopeEnvironment::leave_block
#[derive(Debug)]
pub struct ScopeEnvironment {
    types: TypeRegistry,
    tree: ScopeTree,
    current: ScopeId,
    class_scopes: FxHashMap<TypeId, ScopeId>,
    method: Option<String>,
    locals: Vec<(String, SymbolInfo)>,
    marks: Vec<usize>,
    statics: Vec<SymbolInfo>,
    members: Vec<SymbolInfo>,
    literals: LiteralPool,
}

impl Default for ScopeEnvironment {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeEnvironment {
    /// An environment with the built-in types registered and the global
    /// scope current.
    pub fn new() -> Self {
        let tree = ScopeTree::new();
        let current = tree.root();
        Self {
            types: TypeRegistry::with_builtins(),
            tree,
            current,
            class_scopes: FxHashMap::default(),
            method: None,
            locals: Vec::new(),
            marks: Vec::new(),
            statics: Vec::new(),
            members: Vec::new(),
            literals: LiteralPool::new(),
        }
    }

    // ========================================================================
    // Types
    // ========================================================================

    /// Register a type, or return the id a type of that name already has.
    pub fn add_type(&mut self, name: &str, width: u32, element: Option<TypeId>) -> TypeId {
        self.types.add(name, width, element)
    }

    /// Whether a type is registered under exactly this name.
    pub fn has_type(&self, name: &str) -> bool {
        self.types.contains(name)
    }

    /// Id of the type registered under exactly this name. Nested classes
    /// are registered under their qualified name; see [`resolve_class`].
    ///
    /// [`resolve_class`]: ScopeEnvironment::resolve_class
    pub fn type_id(&self, name: &str) -> Option<TypeId> {
        self.types.lookup(name)
    }

    /// Entry of a registered type.
    pub fn type_of(&self, id: TypeId) -> Option<&TypeEntry> {
        self.types.get(id)
    }

    /// Name of a type for messages and IR.
    pub fn type_name(&self, id: TypeId) -> &str {
        self.types.name(id)
    }

    /// The array type of `element`, registered on first use.
    pub fn array_of(&mut self, element: TypeId) -> TypeId {
        self.types.array_of(element)
    }

    /// The underlying type table.
    pub fn types(&self) -> &TypeRegistry {
        &self.types
    }

    // ========================================================================
    // Class scopes
    // ========================================================================

    /// The class scope tree.
    pub fn tree(&self) -> &ScopeTree {
        &self.tree
    }

    /// The scope new classes, methods and members are declared into.
    pub fn current_scope(&self) -> ScopeId {
        self.current
    }

    /// Dotted path from the global scope to the current class scope.
    pub fn qualifier(&self) -> String {
        self.tree.qualifier(self.current)
    }

    /// Type of the class whose scope is current, if any.
    pub fn current_class(&self) -> Option<TypeId> {
        self.tree.get(self.current).and_then(|d| d.class_type)
    }

    /// Declare a class in the current scope and make its new scope current.
    pub fn declare_class(&mut self, name: &str, modifiers: SymbolFlags) -> Result<TypeId> {
        if self.class_declared_here(name) {
            return Err(ScopeError::DuplicateSymbol {
                name: name.to_string(),
            });
        }
        let qualified = self.tree.qualified_name(self.current, name);
        let ty = self.class_type(name, &qualified);
        let mut symbol = SymbolInfo::new(ty, (modifiers & SymbolFlags::MODIFIERS) | SymbolFlags::CLASS);
        symbol.qualified_name = qualified;
        trace!(class = %symbol.qualified_name, "declare class");

        if let Some(scope) = self.tree.get_mut(self.current) {
            scope.variables.insert(name.to_string(), symbol);
        }
        let child = self.tree.add_child(self.current, name, ty);
        self.class_scopes.insert(ty, child);
        self.current = child;
        Ok(ty)
    }

    /// Type id for a class being declared.
    ///
    /// Top-level classes are registered under their simple name, nested ones
    /// under their qualified name. A nested class takes over a placeholder
    /// its simple name got from an earlier forward reference, as long as no
    /// other class has claimed it.
    fn class_type(&mut self, name: &str, qualified: &str) -> TypeId {
        if name == qualified {
            return self.types.add(name, 0, None);
        }
        match self.types.lookup(name) {
            Some(id) if self.types.is_class(id) && !self.class_scopes.contains_key(&id) => {
                self.types.rename(id, qualified);
                id
            }
            _ => self.types.add(qualified, 0, None),
        }
    }

    fn class_declared_here(&self, name: &str) -> bool {
        self.tree.find_child(self.current, name).is_some()
    }

    /// Move into the already declared class scope `name`.
    pub fn enter_class(&mut self, name: &str) -> Result<()> {
        match self.tree.find_child(self.current, name) {
            Some(child) => {
                self.current = child;
                Ok(())
            }
            None => Err(ScopeError::UnknownScope {
                name: name.to_string(),
            }),
        }
    }

    /// Move back to the enclosing scope. Staying at the global scope is a
    /// no-op.
    pub fn leave_class(&mut self) {
        if let Some(parent) = self.tree.parent(self.current) {
            self.current = parent;
        }
    }

    /// Scope of a class type.
    pub fn class_scope(&self, class: TypeId) -> Option<ScopeId> {
        self.class_scopes.get(&class).copied()
    }

    /// Total storage of the instance fields of a class, at least one byte.
    pub fn instance_size(&self, class: TypeId) -> u32 {
        let Some(data) = self.class_scope(class).and_then(|s| self.tree.get(s)) else {
            return 1;
        };
        let size: u32 = data
            .variables
            .values()
            .filter(|v| v.is_member() && !v.is_static())
            .map(|v| self.types.store_size(v.ty))
            .sum();
        size.max(1)
    }

    // ========================================================================
    // Methods
    // ========================================================================

    /// Declare a method in the current class scope.
    pub fn declare_method(&mut self, name: &str, mut method: MethodInfo) -> Result<()> {
        let qualified = self.tree.qualified_name(self.current, name);
        let Some(scope) = self.tree.get_mut(self.current) else {
            return Err(ScopeError::UnknownScope { name: qualified });
        };
        if scope.methods.contains_key(name) {
            return Err(ScopeError::DuplicateSymbol {
                name: name.to_string(),
            });
        }
        method.symbol.flags |= SymbolFlags::METHOD;
        method.symbol.qualified_name = qualified;
        trace!(method = %method.symbol.qualified_name, arity = method.arity(), "declare method");
        scope.methods.insert(name.to_string(), method);
        self.move_field_global(name);
        Ok(())
    }

    /// Global symbol of a member variable of the current class. A method of
    /// the same name owns the plain qualified symbol, so the field moves to
    /// `<qualified>-field`; `-` never occurs in a source identifier.
    fn member_symbol(&self, name: &str) -> String {
        let qualified = self.tree.qualified_name(self.current, name);
        let clashes = self
            .tree
            .get(self.current)
            .is_some_and(|data| data.methods.contains_key(name));
        if clashes {
            format!("{qualified}-field")
        } else {
            qualified
        }
    }

    /// Re-symbol a field declared before a method that took its name.
    fn move_field_global(&mut self, name: &str) {
        let renamed = self.member_symbol(name);
        let Some(field) = self
            .tree
            .get_mut(self.current)
            .and_then(|data| data.variables.get_mut(name))
            .filter(|symbol| symbol.is_member())
        else {
            return;
        };
        let previous = std::mem::replace(&mut field.qualified_name, renamed.clone());
        for global in self.members.iter_mut().chain(self.statics.iter_mut()) {
            if global.qualified_name == previous {
                global.qualified_name = renamed.clone();
            }
        }
    }

    /// Find a method visible from the current class scope.
    pub fn resolve_method(&self, name: &str) -> Result<&MethodInfo> {
        self.tree
            .find_method(self.current, name)
            .ok_or_else(|| ScopeError::UnresolvedSymbol {
                name: name.to_string(),
            })
    }

    /// Find a method declared directly in a class.
    pub fn resolve_method_in(&self, class: TypeId, name: &str) -> Result<&MethodInfo> {
        self.class_scope(class)
            .and_then(|s| self.tree.get(s))
            .and_then(|data| data.methods.get(name))
            .ok_or_else(|| ScopeError::UnresolvedSymbol {
                name: name.to_string(),
            })
    }

    /// Start a method body: reset the local stack and bind the parameters.
    pub fn enter_method(&mut self, name: &str) -> Result<()> {
        let params = self.resolve_method(name)?.params.clone();
        self.locals.clear();
        self.marks.clear();
        self.marks.push(0);
        self.method = Some(name.to_string());

        let qualifier = self.method_qualifier();
        for param in params {
            let mut symbol = SymbolInfo::new(param.ty, SymbolFlags::VARIABLE | SymbolFlags::PARAMETER);
            symbol.qualified_name = format!("{qualifier}.{}", param.name);
            self.locals.push((param.name, symbol));
        }
        Ok(())
    }

    /// End the current method body and drop its locals.
    pub fn leave_method(&mut self) {
        self.locals.clear();
        self.marks.clear();
        self.method = None;
    }

    /// Name of the method whose body is being processed.
    pub fn current_method(&self) -> Option<&str> {
        self.method.as_deref()
    }

    /// Whether a method body is being processed.
    pub fn in_method(&self) -> bool {
        !self.marks.is_empty()
    }

    fn method_qualifier(&self) -> String {
        let method = self.method.as_deref().unwrap_or_default();
        let class = self.qualifier();
        if class.is_empty() {
            method.to_string()
        } else {
            format!("{class}.{method}")
        }
    }

    // ========================================================================
    // Blocks
    // ========================================================================

    /// Open a block; locals declared from here on go out of scope at the
    /// matching [`leave_block`].
    ///
    /// [`leave_block`]: ScopeEnvironment::leave_block
    pub fn enter_block(&mut self) {
        self.marks.push(self.locals.len());
    }

    /// Drop every local declared since the matching [`enter_block`].
    ///
    /// [`enter_block`]: ScopeEnvironment::enter_block
    pub fn leave_block(&mut self) {
        if let Some(mark) = self.marks.pop() {
            self.locals.truncate(mark);
        }
    }

    fn block_start(&self) -> usize {
        self.marks.last().copied().unwrap_or(0)
    }

    // ========================================================================
    // Variables
    // ========================================================================

    /// Declare a variable in the innermost block (inside a method) or as a
    /// member of the current class.
    ///
    /// Returns the stored symbol with its qualified name filled in.
    pub fn declare_variable(&mut self, name: &str, mut symbol: SymbolInfo) -> Result<SymbolInfo> {
        if self.resolve_variable(name, false).is_ok() {
            return Err(ScopeError::DuplicateSymbol {
                name: name.to_string(),
            });
        }

        if self.in_method() {
            symbol.flags |= SymbolFlags::VARIABLE;
            symbol.qualified_name = format!("{}.{name}", self.method_qualifier());
            self.locals.push((name.to_string(), symbol.clone()));
        } else {
            symbol.flags |= SymbolFlags::MEMBER;
            symbol.qualified_name = self.member_symbol(name);
            if let Some(scope) = self.tree.get_mut(self.current) {
                scope.variables.insert(name.to_string(), symbol.clone());
            }
            self.members.push(symbol.clone());
        }

        if symbol.is_static()
            && !self
                .statics
                .iter()
                .any(|s| s.qualified_name == symbol.qualified_name)
        {
            self.statics.push(symbol.clone());
        }

        trace!(name, qualified = %symbol.qualified_name, ty = %symbol.ty, "declare variable");
        Ok(symbol)
    }

    /// Resolve a variable name.
    ///
    /// Locals are scanned from the top of the stack down. With `search_up`
    /// the class scope chain is searched afterwards; without it only the
    /// innermost block (or, outside methods, the current class scope) is
    /// consulted.
    pub fn resolve_variable(&self, name: &str, search_up: bool) -> Result<&SymbolInfo> {
        let unresolved = || ScopeError::UnresolvedSymbol {
            name: name.to_string(),
        };

        if self.in_method() {
            let floor = if search_up { 0 } else { self.block_start() };
            if let Some((_, symbol)) = self.locals[floor..].iter().rev().find(|(n, _)| n == name) {
                return Ok(symbol);
            }
            if !search_up {
                return Err(unresolved());
            }
        }

        let found = if search_up {
            self.tree.find_variable(self.current, name)
        } else {
            self.tree
                .get(self.current)
                .and_then(|data| data.variables.get(name))
        };
        found
            .filter(|symbol| !symbol.flags.contains(SymbolFlags::CLASS))
            .ok_or_else(unresolved)
    }

    /// Clear `UNDEFINED` on the innermost visible declaration of `name`.
    pub fn mark_initialized(&mut self, name: &str) -> Result<()> {
        if let Some((_, symbol)) = self.locals.iter_mut().rev().find(|(n, _)| n == name) {
            symbol.flags.remove(SymbolFlags::UNDEFINED);
            return Ok(());
        }
        let symbol = self
            .tree
            .find_variable_mut(self.current, name)
            .ok_or_else(|| ScopeError::UnresolvedSymbol {
                name: name.to_string(),
            })?;
        symbol.flags.remove(SymbolFlags::UNDEFINED);
        let qualified = symbol.qualified_name.clone();
        for member in self.members.iter_mut().chain(self.statics.iter_mut()) {
            if member.qualified_name == qualified {
                member.flags.remove(SymbolFlags::UNDEFINED);
            }
        }
        Ok(())
    }

    /// Find a member variable declared directly in a class.
    pub fn resolve_member(&self, class: TypeId, name: &str) -> Result<&SymbolInfo> {
        self.class_scope(class)
            .and_then(|s| self.tree.get(s))
            .and_then(|data| data.variables.get(name))
            .filter(|symbol| !symbol.flags.contains(SymbolFlags::CLASS))
            .ok_or_else(|| ScopeError::UnresolvedSymbol {
                name: name.to_string(),
            })
    }

    /// Find a class name visible from the current scope.
    pub fn resolve_class(&self, name: &str) -> Option<TypeId> {
        self.tree
            .ancestors(self.current)
            .filter_map(|s| self.tree.get(s).and_then(|d| d.variables.get(name)))
            .find(|symbol| symbol.flags.contains(SymbolFlags::CLASS))
            .map(|symbol| symbol.ty)
    }

    // ========================================================================
    // Side tables
    // ========================================================================

    /// Add a string literal to the pool; every call gets a new `.str.N`.
    pub fn intern_string_literal(&mut self, text: &str) -> LiteralId {
        self.literals.intern(text)
    }

    /// Interned string literals in insertion order.
    pub fn literals(&self) -> &LiteralPool {
        &self.literals
    }

    /// Static variables in declaration order.
    pub fn statics(&self) -> &[SymbolInfo] {
        &self.statics
    }

    /// Every class member variable in declaration order.
    pub fn member_globals(&self) -> &[SymbolInfo] {
        &self.members
    }
}

impl fmt::Display for ScopeEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "types:")?;
        for (id, entry) in self.types.iter() {
            writeln!(f, "  {:>3} {} ({} bytes)", id.index(), entry.name, entry.width)?;
        }
        writeln!(f, "scopes:")?;
        write!(f, "{}", self.tree)?;
        if !self.statics.is_empty() {
            writeln!(f, "statics:")?;
            for symbol in &self.statics {
                writeln!(f, "  {}", symbol.qualified_name)?;
            }
        }
        if !self.literals.is_empty() {
            writeln!(f, "literals:")?;
            for literal in self.literals.iter() {
                writeln!(f, "  {} = c\"{}\"", literal.id, literal.encoded)?;
            }
        }
        Ok(())
    }
}
