//! Stack slots of the function being emitted.
//!
//! Slots are reserved for every declaration before the body is emitted.
//! A name declared more than once in a function gets a numeric suffix
//! (`%x`, `%x.1`, `%x.2`) so each declaration has its own slot. During
//! emission, blocks bind names to the reserved slots and restore shadowed
//! bindings when they close.

use rustc_hash::FxHashMap;
use ycc_core::{GenerationError, Span, TypeId};

/// A binding of a source name to its slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalSlot {
    /// Slot name without the `%` sigil.
    pub slot: String,
    pub ty: TypeId,
    depth: u32,
}

#[derive(Debug, Default)]
pub struct LocalFrame {
    /// Visible bindings by source name.
    variables: FxHashMap<String, LocalSlot>,
    depth: u32,
    /// Bindings hidden by an inner declaration, with the depth at which
    /// the hiding happened.
    shadowed: Vec<(u32, String, LocalSlot)>,
    /// Number of slots already reserved for each source name.
    reserved: FxHashMap<String, u32>,
    /// Slot reserved for each declaration, keyed by the declared name's span.
    declarations: FxHashMap<Span, String>,
}

impl LocalFrame {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve a slot for a local declaration and return its name.
    pub fn reserve(&mut self, name: &str, declaration: Span) -> String {
        let count = self.reserved.entry(name.to_string()).or_insert(0);
        let slot = if *count == 0 {
            name.to_string()
        } else {
            format!("{name}.{count}")
        };
        *count += 1;
        self.declarations.insert(declaration, slot.clone());
        slot
    }

    /// Slot name of a parameter's spill slot.
    pub fn param_slot(name: &str) -> String {
        format!("{name}.addr")
    }

    pub fn push_scope(&mut self) {
        self.depth += 1;
    }

    /// Drop the bindings of the innermost scope and bring back the ones
    /// they shadowed.
    pub fn pop_scope(&mut self) {
        let depth = self.depth;
        self.variables.retain(|_, local| local.depth < depth);
        while let Some((shadowing_depth, _, _)) = self.shadowed.last() {
            if *shadowing_depth != depth {
                break;
            }
            if let Some((_, name, local)) = self.shadowed.pop() {
                self.variables.insert(name, local);
            }
        }
        self.depth = self.depth.saturating_sub(1);
    }

    /// Make a reserved declaration visible in the current scope.
    pub fn bind(&mut self, name: &str, declaration: Span, ty: TypeId) -> Result<String, GenerationError> {
        let slot = self
            .declarations
            .get(&declaration)
            .cloned()
            .ok_or_else(|| GenerationError::UnknownStorage {
                name: name.to_string(),
                span: declaration,
            })?;
        self.insert(name, slot.clone(), ty);
        Ok(slot)
    }

    /// Make a parameter visible; its slot is always `<name>.addr`.
    ///
    /// The incoming value itself is `%<name>`, so a local of the same name
    /// reserved afterwards starts at `<name>.1`.
    pub fn bind_param(&mut self, name: &str, ty: TypeId) -> String {
        let count = self.reserved.entry(name.to_string()).or_insert(0);
        *count = (*count).max(1);
        let slot = Self::param_slot(name);
        self.insert(name, slot.clone(), ty);
        slot
    }

    fn insert(&mut self, name: &str, slot: String, ty: TypeId) {
        let local = LocalSlot {
            slot,
            ty,
            depth: self.depth,
        };
        if let Some(previous) = self.variables.insert(name.to_string(), local) {
            if previous.depth < self.depth {
                self.shadowed.push((self.depth, name.to_string(), previous));
            }
        }
    }

    pub fn lookup(&self, name: &str) -> Option<&LocalSlot> {
        self.variables.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_names_get_suffixed_slots() {
        let mut frame = LocalFrame::new();
        assert_eq!(frame.reserve("x", Span::point(1, 1)), "x");
        assert_eq!(frame.reserve("x", Span::point(2, 1)), "x.1");
        assert_eq!(frame.reserve("y", Span::point(3, 1)), "y");
        assert_eq!(frame.reserve("x", Span::point(4, 1)), "x.2");
    }

    #[test]
    fn inner_bindings_shadow_and_restore() {
        let mut frame = LocalFrame::new();
        let outer = Span::point(1, 5);
        let inner = Span::point(2, 9);
        frame.reserve("x", outer);
        frame.reserve("x", inner);

        frame.push_scope();
        frame.bind("x", outer, TypeId::INT).unwrap();
        frame.push_scope();
        frame.bind("x", inner, TypeId::DOUBLE).unwrap();
        assert_eq!(frame.lookup("x").map(|l| l.slot.as_str()), Some("x.1"));
        assert_eq!(frame.lookup("x").map(|l| l.ty), Some(TypeId::DOUBLE));

        frame.pop_scope();
        assert_eq!(frame.lookup("x").map(|l| l.slot.as_str()), Some("x"));
        frame.pop_scope();
        assert!(frame.lookup("x").is_none());
    }

    #[test]
    fn parameters_live_in_addr_slots() {
        let mut frame = LocalFrame::new();
        frame.push_scope();
        assert_eq!(frame.bind_param("a", TypeId::INT), "a.addr");
        assert_eq!(frame.lookup("a").map(|l| l.slot.as_str()), Some("a.addr"));
    }

    #[test]
    fn locals_never_take_a_parameter_name() {
        let mut frame = LocalFrame::new();
        frame.push_scope();
        frame.bind_param("a", TypeId::INT);
        assert_eq!(frame.reserve("a", Span::point(1, 30)), "a.1");
        assert_eq!(frame.reserve("b", Span::point(1, 40)), "b");
    }

    #[test]
    fn binding_an_unreserved_declaration_fails() {
        let mut frame = LocalFrame::new();
        assert!(frame.bind("z", Span::point(9, 9), TypeId::INT).is_err());
    }
}
