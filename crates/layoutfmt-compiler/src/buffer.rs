//! Default format text for a bound buffer resource.
//!
//! Reflection describes the resource's variable type when there is one; plain
//! typed views only have a view format to go on.

use layoutfmt_core::{
    ApiFamily, BaseType, OwnerId, PackingRules, PointerTypeRegistry, TypeFlags, TypeNode,
};

use crate::declare::Declarer;
use crate::estimate::Estimator;
use crate::parser::vocab;

/// Format used when nothing is known about the contents.
pub const OPAQUE_FORMAT: &str = "xint4 data;";

/// A buffer binding as reflection reports it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResourceDescriptor {
    pub name: String,
    /// Element type of the buffer, when the shader declares one.
    pub variable_type: Option<TypeNode>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ComponentType {
    Float,
    UNorm,
    SNorm,
    UInt,
    SInt,
}

/// Format of a typed buffer view.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewFormat {
    R10G10B10A2 { unorm: bool },
    R11G11B10,
    Regular {
        component: ComponentType,
        byte_width: u32,
        count: u32,
    },
}

impl ViewFormat {
    /// Element type keyword with its component count, e.g. `unormb4`.
    pub fn keyword(&self) -> Option<String> {
        let (component, byte_width, count) = match *self {
            Self::R10G10B10A2 { unorm: true } => return Some("unormten".to_string()),
            Self::R10G10B10A2 { unorm: false } => return Some("uintten".to_string()),
            Self::R11G11B10 => return Some("floateleven".to_string()),
            Self::Regular {
                component,
                byte_width,
                count,
            } => (component, byte_width, count),
        };
        if !(1..=4).contains(&count) {
            return None;
        }

        let (base, flags) = match (component, byte_width) {
            (ComponentType::UNorm, 1) => (BaseType::UByte, TypeFlags::UNORM),
            (ComponentType::SNorm, 1) => (BaseType::SByte, TypeFlags::SNORM),
            (ComponentType::UNorm, 2) => (BaseType::UShort, TypeFlags::UNORM),
            (ComponentType::SNorm, 2) => (BaseType::SShort, TypeFlags::SNORM),
            (ComponentType::Float, 2) => (BaseType::Half, TypeFlags::empty()),
            (ComponentType::Float, 4) => (BaseType::Float, TypeFlags::empty()),
            (ComponentType::Float, 8) => (BaseType::Double, TypeFlags::empty()),
            (ComponentType::UNorm, 4) => (BaseType::UInt, TypeFlags::UNORM),
            (ComponentType::SNorm, 4) => (BaseType::SInt, TypeFlags::SNORM),
            (ComponentType::UInt, width) => (BaseType::integer(width, false)?, TypeFlags::empty()),
            (ComponentType::SInt, width) => (BaseType::integer(width, true)?, TypeFlags::empty()),
            _ => return None,
        };

        let (name, uncovered) = vocab::canonical_name(base, flags, 1, count as u8);
        let annotation = if uncovered.contains(TypeFlags::UNORM) {
            "[[unorm]] "
        } else if uncovered.contains(TypeFlags::SNORM) {
            "[[snorm]] "
        } else {
            ""
        };
        Some(format!("{annotation}{name}"))
    }
}

/// Format text describing `resource`.
///
/// `rules` overrides the packing otherwise estimated from the variable type.
pub fn buffer_format_string(
    api: ApiFamily,
    rules: Option<PackingRules>,
    owner: OwnerId,
    resource: &ResourceDescriptor,
    view: Option<ViewFormat>,
    registry: &dyn PointerTypeRegistry,
) -> String {
    if let Some(ty) = &resource.variable_type {
        if !ty.members.is_empty() {
            let rules = rules.unwrap_or_else(|| {
                Estimator::new(api, registry).owner(owner).estimate(&ty.members)
            });
            let name = match ty.type_name.as_str() {
                "" | "struct" => resource.name.as_str(),
                name => name,
            };
            return Declarer::new(rules, registry)
                .api(api)
                .owner(owner)
                .declare(name, &ty.members, ty.array_byte_stride);
        }
        if !ty.is_struct() {
            let (base, flags) = match ty.base {
                BaseType::Enum => (ty.component_type(), ty.flags),
                BaseType::GpuPointer => (BaseType::ULong, TypeFlags::HEX),
                base => (base, ty.flags),
            };
            let (name, _) = vocab::canonical_name(base, flags, ty.rows, ty.columns);
            let member = if ty.name.is_empty() { "data" } else { ty.name.as_str() };
            return format!("{name} {member};");
        }
    }

    match view.as_ref().and_then(ViewFormat::keyword) {
        Some(keyword) => format!("{keyword} data;"),
        None => {
            tracing::debug!(resource = %resource.name, "no usable type information, using opaque format");
            OPAQUE_FORMAT.to_string()
        }
    }
}
