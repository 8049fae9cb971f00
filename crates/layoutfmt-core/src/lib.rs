#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Core data structures for layoutfmt.
//!
//! - `packing`: the five packing axes, named presets and API families
//! - `types`: the type tree describing a buffer layout
//! - `layout`: alignment/size/stride arithmetic and the placement cursor
//! - `registry`: the pointer-type registry contract and an in-memory implementation

pub mod layout;
pub mod packing;
pub mod registry;
pub mod types;

#[cfg(test)]
mod packing_tests;

pub use layout::LayoutCursor;
pub use packing::{ApiFamily, PackingAxis, PackingPreset, PackingRules};
pub use registry::{OwnerId, PointerTypeId, PointerTypeRegistry, TypeRegistry};
pub use types::{BaseType, EnumValue, TypeFlags, TypeNode, UNBOUNDED};
