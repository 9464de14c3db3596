//! Type registry: the flat, append-only table of every type in a unit.

use rustc_hash::FxHashMap;
use ycc_core::TypeId;

/// What kind of type an entry describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    Builtin,
    Class,
    Array,
}

/// A registered type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeEntry {
    pub name: String,
    /// Storage width in bytes; arrays carry their element's width.
    pub width: u32,
    pub element: Option<TypeId>,
    pub kind: TypeKind,
}

/// Built-ins in registration order. The order is the promotion rank of the
/// numeric types and must match the constants on [`TypeId`].
const BUILTINS: [(&str, u32); 9] = [
    ("void", 0),
    ("boolean", 1),
    ("byte", 1),
    ("char", 2),
    ("short", 2),
    ("int", 4),
    ("long", 8),
    ("float", 4),
    ("double", 8),
];

/// Width of a pointer in the emitted IR.
pub const POINTER_WIDTH: u32 = 8;

/// Name-to-id table with per-type metadata.
///
/// Ids are handed out sequentially and never reused or removed.
#[derive(Debug, Clone)]
pub struct TypeRegistry {
    entries: Vec<TypeEntry>,
    by_name: FxHashMap<String, TypeId>,
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl TypeRegistry {
    /// A registry holding the ten built-in types.
    pub fn with_builtins() -> Self {
        let mut registry = Self {
            entries: Vec::with_capacity(32),
            by_name: FxHashMap::default(),
        };
        for (name, width) in BUILTINS {
            registry.insert(name, width, None, TypeKind::Builtin);
        }
        let char_width = registry.entries[TypeId::CHAR.index() as usize].width;
        registry.insert("String", char_width, Some(TypeId::CHAR), TypeKind::Builtin);
        debug_assert_eq!(registry.lookup("String"), Some(TypeId::STRING));
        registry
    }

    fn insert(&mut self, name: &str, width: u32, element: Option<TypeId>, kind: TypeKind) -> TypeId {
        let id = TypeId::new(self.entries.len() as u32);
        self.entries.push(TypeEntry {
            name: name.to_string(),
            width,
            element,
            kind,
        });
        self.by_name.insert(name.to_string(), id);
        id
    }

    /// Register a type, or return the id it already has.
    pub fn add(&mut self, name: &str, width: u32, element: Option<TypeId>) -> TypeId {
        if let Some(id) = self.lookup(name) {
            return id;
        }
        let kind = if element.is_some() {
            TypeKind::Array
        } else {
            TypeKind::Class
        };
        self.insert(name, width, element, kind)
    }

    /// Give a type a new name. Array types built on it are renamed along
    /// with it.
    pub fn rename(&mut self, id: TypeId, name: &str) {
        let start = id.index() as usize;
        let Some(entry) = self.entries.get_mut(start) else {
            return;
        };
        let old = std::mem::replace(&mut entry.name, name.to_string());
        self.by_name.remove(&old);
        self.by_name.insert(name.to_string(), id);

        let mut renamed = vec![id];
        for index in start + 1..self.entries.len() {
            let entry = &self.entries[index];
            let Some(element) = entry.element.filter(|e| entry.kind == TypeKind::Array && renamed.contains(e))
            else {
                continue;
            };
            let name = format!("{}[]", self.name(element));
            let old = std::mem::replace(&mut self.entries[index].name, name.clone());
            self.by_name.remove(&old);
            let array = TypeId::new(index as u32);
            self.by_name.insert(name, array);
            renamed.push(array);
        }
    }

    /// Register (or find) the array type whose elements are `element`.
    pub fn array_of(&mut self, element: TypeId) -> TypeId {
        let name = format!("{}[]", self.name(element));
        let width = self.get(element).map_or(0, |e| e.width);
        self.add(&name, width, Some(element))
    }

    /// Whether a type of this exact name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Id of the type registered under this exact name.
    pub fn lookup(&self, name: &str) -> Option<TypeId> {
        self.by_name.get(name).copied()
    }

    /// Entry of a registered type.
    pub fn get(&self, id: TypeId) -> Option<&TypeEntry> {
        self.entries.get(id.index() as usize)
    }

    /// Name of a type, `<unknown>` for a foreign id.
    pub fn name(&self, id: TypeId) -> &str {
        self.get(id).map_or("<unknown>", |e| e.name.as_str())
    }

    /// Number of registered types, built-ins included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false once the built-ins are in.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Types in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (TypeId, &TypeEntry)> {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, e)| (TypeId::new(i as u32), e))
    }

    /// Whether `id` is an array type.
    pub fn is_array(&self, id: TypeId) -> bool {
        self.get(id).is_some_and(|e| e.kind == TypeKind::Array)
    }

    /// Whether `id` is a class type, declared or only referenced so far.
    pub fn is_class(&self, id: TypeId) -> bool {
        self.get(id).is_some_and(|e| e.kind == TypeKind::Class)
    }

    /// Element type of an array (or `char` for `String`).
    pub fn element(&self, id: TypeId) -> Option<TypeId> {
        self.get(id).and_then(|e| e.element)
    }

    /// Values of this type are pointers in the emitted IR.
    pub fn is_reference(&self, id: TypeId) -> bool {
        id == TypeId::STRING || self.is_array(id) || self.is_class(id)
    }

    /// The IR spelling of a type.
    ///
    /// Integers render as `iN` with N = width * 8, both floating types as
    /// `double`, arrays as one `*` per dimension and classes as pointers to
    /// an opaque struct.
    pub fn ir_type(&self, id: TypeId) -> String {
        match id {
            TypeId::VOID => "void".to_string(),
            TypeId::BOOLEAN => "i1".to_string(),
            TypeId::FLOAT | TypeId::DOUBLE => "double".to_string(),
            TypeId::STRING => "i8*".to_string(),
            _ => match self.get(id) {
                Some(TypeEntry {
                    kind: TypeKind::Array,
                    element: Some(element),
                    ..
                }) => format!("{}*", self.ir_type(*element)),
                Some(TypeEntry {
                    kind: TypeKind::Class,
                    name,
                    ..
                }) => format!("%{name}*"),
                Some(entry) => format!("i{}", entry.width * 8),
                None => "void".to_string(),
            },
        }
    }

    /// Alignment used for slots and globals of this type.
    pub fn align(&self, id: TypeId) -> u32 {
        if self.is_reference(id) {
            return POINTER_WIDTH;
        }
        match id {
            TypeId::FLOAT | TypeId::DOUBLE => 8,
            _ => self.get(id).map_or(1, |e| e.width.max(1)),
        }
    }

    /// Size in bytes of one stored value, used for heap allocation.
    pub fn store_size(&self, id: TypeId) -> u32 {
        if self.is_reference(id) {
            POINTER_WIDTH
        } else {
            self.align(id)
        }
    }

    /// The zero value of a type as an IR constant.
    pub fn zero_value(&self, id: TypeId) -> &'static str {
        if self.is_reference(id) {
            "null"
        } else if id == TypeId::BOOLEAN {
            "false"
        } else if id.is_floating() {
            "0.0"
        } else {
            "0"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtins_keep_registration_rank() {
        let registry = TypeRegistry::with_builtins();
        let expected = [
            ("void", TypeId::VOID),
            ("boolean", TypeId::BOOLEAN),
            ("byte", TypeId::BYTE),
            ("char", TypeId::CHAR),
            ("short", TypeId::SHORT),
            ("int", TypeId::INT),
            ("long", TypeId::LONG),
            ("float", TypeId::FLOAT),
            ("double", TypeId::DOUBLE),
            ("String", TypeId::STRING),
        ];
        for (name, id) in expected {
            assert_eq!(registry.lookup(name), Some(id), "{name}");
        }
        assert_eq!(registry.len(), 10);
    }

    #[test]
    fn user_types_never_land_between_builtins() {
        let mut registry = TypeRegistry::with_builtins();
        let foo = registry.add("Foo", 0, None);
        let ints = registry.array_of(TypeId::INT);
        assert!(foo > TypeId::STRING);
        assert!(ints > foo);
        assert_eq!(TypeId::SHORT.max_rank(TypeId::LONG), TypeId::LONG);
    }

    #[test]
    fn string_is_an_array_of_char() {
        let registry = TypeRegistry::with_builtins();
        assert_eq!(registry.element(TypeId::STRING), Some(TypeId::CHAR));
        assert_eq!(registry.get(TypeId::STRING).map(|e| e.width), Some(2));
        assert!(registry.is_reference(TypeId::STRING));
    }

    #[test]
    fn adding_a_known_name_returns_its_id() {
        let mut registry = TypeRegistry::with_builtins();
        let first = registry.add("Point", 0, None);
        let again = registry.add("Point", 0, None);
        assert_eq!(first, again);
        assert_eq!(registry.len(), 11);
    }

    #[test]
    fn ir_spelling() {
        let mut registry = TypeRegistry::with_builtins();
        let int_array = registry.array_of(TypeId::INT);
        let matrix = registry.array_of(int_array);
        let point = registry.add("Point", 0, None);

        assert_eq!(registry.ir_type(TypeId::INT), "i32");
        assert_eq!(registry.ir_type(TypeId::CHAR), "i16");
        assert_eq!(registry.ir_type(TypeId::LONG), "i64");
        assert_eq!(registry.ir_type(TypeId::BOOLEAN), "i1");
        assert_eq!(registry.ir_type(TypeId::FLOAT), "double");
        assert_eq!(registry.ir_type(int_array), "i32*");
        assert_eq!(registry.ir_type(matrix), "i32**");
        assert_eq!(registry.ir_type(point), "%Point*");
        assert_eq!(registry.name(matrix), "int[][]");
        assert_eq!(registry.get(matrix).map(|e| e.width), Some(4));
    }

    #[test]
    fn renaming_carries_array_types_along() {
        let mut registry = TypeRegistry::with_builtins();
        let inner = registry.add("In", 0, None);
        let inners = registry.array_of(inner);
        let grid = registry.array_of(inners);

        registry.rename(inner, "A.In");
        assert_eq!(registry.lookup("A.In"), Some(inner));
        assert_eq!(registry.lookup("In"), None);
        assert_eq!(registry.name(grid), "A.In[][]");
        assert_eq!(registry.array_of(inner), inners);

        let other = registry.add("In", 0, None);
        assert_ne!(other, inner);
        assert_ne!(registry.array_of(other), inners);
    }

    #[test]
    fn zero_values_follow_the_type() {
        let registry = TypeRegistry::with_builtins();
        assert_eq!(registry.zero_value(TypeId::INT), "0");
        assert_eq!(registry.zero_value(TypeId::DOUBLE), "0.0");
        assert_eq!(registry.zero_value(TypeId::BOOLEAN), "false");
        assert_eq!(registry.zero_value(TypeId::STRING), "null");
    }
}
