//! Struct and enum definitions seen during one parse.

use indexmap::IndexMap;
use layoutfmt_core::{BaseType, LayoutCursor, PointerTypeId, TypeNode};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DefKind {
    Struct,
    Enum { base: BaseType },
}

/// A definition and the placement state of its body.
///
/// The root scope is a nameless `Struct` def that never enters the table.
#[derive(Clone, Debug)]
pub struct TypeDef {
    pub kind: DefKind,
    pub node: TypeNode,
    /// Source line of each member, parallel to `node.members`.
    pub member_lines: Vec<u32>,
    pub cursor: LayoutCursor,
    pub single: bool,
    pub declared_size: Option<u32>,
    /// Line of the member that is, or contains, the unbounded array.
    pub unbounded_line: Option<u32>,
    /// Assigned the first time the definition is used behind a pointer.
    pub pointer_id: Option<PointerTypeId>,
    pub line: u32,
    pub finalized: bool,
}

impl TypeDef {
    pub fn structure(name: &str, line: u32) -> Self {
        Self {
            kind: DefKind::Struct,
            node: TypeNode::structure("", name, Vec::new(), 0),
            member_lines: Vec::new(),
            cursor: LayoutCursor::new(),
            single: false,
            declared_size: None,
            unbounded_line: None,
            pointer_id: None,
            line,
            finalized: false,
        }
    }

    pub fn enumeration(name: &str, base: BaseType, line: u32) -> Self {
        let node = TypeNode {
            type_name: name.to_string(),
            base: BaseType::Enum,
            enum_base: Some(base),
            ..TypeNode::default()
        };
        Self {
            kind: DefKind::Enum { base },
            node,
            ..Self::structure(name, line)
        }
    }

    pub fn name(&self) -> &str {
        &self.node.type_name
    }

    pub fn has_unbounded(&self) -> bool {
        self.unbounded_line.is_some()
    }

    pub fn is_enum(&self) -> bool {
        matches!(self.kind, DefKind::Enum { .. })
    }

    /// Value an enum entry without `= value` receives.
    pub fn next_enum_value(&self) -> u64 {
        self.node
            .enum_values
            .last()
            .map_or(0, |v| v.value.wrapping_add(1))
    }
}

/// Definitions in declaration order.
#[derive(Clone, Debug, Default)]
pub struct SymbolTable {
    defs: IndexMap<String, TypeDef>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.defs.contains_key(name)
    }

    /// Adds a definition, returning its index.
    pub fn insert(&mut self, def: TypeDef) -> usize {
        let (index, _) = self.defs.insert_full(def.name().to_string(), def);
        index
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.defs.get_index_of(name)
    }

    pub fn def(&self, index: usize) -> Option<&TypeDef> {
        self.defs.get_index(index).map(|(_, def)| def)
    }

    pub fn def_mut(&mut self, index: usize) -> Option<&mut TypeDef> {
        self.defs.get_index_mut(index).map(|(_, def)| def)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.defs.keys().map(String::as_str)
    }
}
