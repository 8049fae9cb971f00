//! Pointer-type registry: stable ids for the targets of GPU pointer members.

use std::collections::HashMap;

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::types::TypeNode;

/// Registry-global id of a pointee type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PointerTypeId(pub u32);

/// Scope in which a node's `pointer_type_id` is interpreted.
///
/// Reflection data numbers its pointer types per shader; trees built by the
/// parser already carry registry-global ids and use [`OwnerId::GLOBAL`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(pub u64);

impl OwnerId {
    pub const GLOBAL: Self = Self(0);
}

/// Lookup and registration contract for pointee types.
///
/// Implementations are append-only: ids handed out stay valid for the
/// lifetime of the registry.
pub trait PointerTypeRegistry {
    /// Resolves an owner-scoped pointer id to a registry-global id.
    fn type_id(&self, owner: OwnerId, local: u32) -> Option<PointerTypeId>;

    /// Registers `node`, or returns the id of a structurally equal node.
    fn register(&mut self, node: &TypeNode) -> PointerTypeId;

    fn descriptor(&self, id: PointerTypeId) -> Option<&TypeNode>;

    /// Resolves a pointer member straight to its pointee.
    fn pointee(&self, owner: OwnerId, node: &TypeNode) -> Option<(PointerTypeId, &TypeNode)> {
        let id = self.type_id(owner, node.pointer_type_id?)?;
        self.descriptor(id).map(|desc| (id, desc))
    }
}

/// In-memory registry, deduplicating pointee types by structural equality.
#[derive(Clone, Debug, Default)]
pub struct TypeRegistry {
    types: IndexSet<TypeNode>,
    locals: HashMap<(OwnerId, u32), PointerTypeId>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds an owner-scoped id to `node`, registering the node if needed.
    pub fn bind_local(&mut self, owner: OwnerId, local: u32, node: &TypeNode) -> PointerTypeId {
        let id = self.register(node);
        self.locals.insert((owner, local), id);
        id
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl PointerTypeRegistry for TypeRegistry {
    fn type_id(&self, owner: OwnerId, local: u32) -> Option<PointerTypeId> {
        if owner == OwnerId::GLOBAL {
            return ((local as usize) < self.types.len()).then_some(PointerTypeId(local));
        }
        self.locals.get(&(owner, local)).copied()
    }

    fn register(&mut self, node: &TypeNode) -> PointerTypeId {
        if let Some(index) = self.types.get_index_of(node) {
            return PointerTypeId(index as u32);
        }
        let (index, _) = self.types.insert_full(node.clone());
        PointerTypeId(index as u32)
    }

    fn descriptor(&self, id: PointerTypeId) -> Option<&TypeNode> {
        self.types.get_index(id.0 as usize)
    }
}
