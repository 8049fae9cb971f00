//! Type tree: the in-memory representation of buffer layouts.

use std::fmt;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// Element count marking an unbounded (runtime-sized) array.
pub const UNBOUNDED: u32 = u32::MAX;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BaseType {
    Bool,
    SByte,
    UByte,
    SShort,
    UShort,
    SInt,
    UInt,
    SLong,
    ULong,
    Half,
    #[default]
    Float,
    Double,
    Struct,
    Enum,
    GpuPointer,
}

impl BaseType {
    /// Storage width of one component in bytes. Aggregates report 0.
    pub fn byte_size(self) -> u32 {
        match self {
            Self::SByte | Self::UByte => 1,
            Self::SShort | Self::UShort | Self::Half => 2,
            Self::Bool | Self::SInt | Self::UInt | Self::Float => 4,
            Self::SLong | Self::ULong | Self::Double | Self::GpuPointer => 8,
            Self::Struct | Self::Enum => 0,
        }
    }

    pub fn is_integer(self) -> bool {
        matches!(
            self,
            Self::SByte
                | Self::UByte
                | Self::SShort
                | Self::UShort
                | Self::SInt
                | Self::UInt
                | Self::SLong
                | Self::ULong
        )
    }

    pub fn is_signed(self) -> bool {
        matches!(self, Self::SByte | Self::SShort | Self::SInt | Self::SLong)
    }

    pub fn is_float(self) -> bool {
        matches!(self, Self::Half | Self::Float | Self::Double)
    }

    /// The integer type of the given width and signedness.
    pub fn integer(bytes: u32, signed: bool) -> Option<Self> {
        let ty = match (bytes, signed) {
            (1, true) => Self::SByte,
            (1, false) => Self::UByte,
            (2, true) => Self::SShort,
            (2, false) => Self::UShort,
            (4, true) => Self::SInt,
            (4, false) => Self::UInt,
            (8, true) => Self::SLong,
            (8, false) => Self::ULong,
            _ => return None,
        };
        Some(ty)
    }

    /// Canonical DSL keyword for the scalar type.
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::SByte => "byte",
            Self::UByte => "ubyte",
            Self::SShort => "short",
            Self::UShort => "ushort",
            Self::SInt => "int",
            Self::UInt => "uint",
            Self::SLong => "long",
            Self::ULong => "ulong",
            Self::Half => "half",
            Self::Float => "float",
            Self::Double => "double",
            Self::Struct => "struct",
            Self::Enum => "enum",
            Self::GpuPointer => "pointer",
        }
    }
}

bitflags! {
    /// Display and interpretation flags carried by a leaf.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct TypeFlags: u32 {
        const ROW_MAJOR = 1 << 0;
        const UNORM = 1 << 1;
        const SNORM = 1 << 2;
        const HEX = 1 << 3;
        const BINARY = 1 << 4;
        const RGB = 1 << 5;
        const R10G10B10A2 = 1 << 6;
        const R11G11B10 = 1 << 7;
    }
}

impl TypeFlags {
    pub const PACKED: Self = Self::R10G10B10A2.union(Self::R11G11B10);
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnumValue {
    pub name: String,
    /// Two's-complement bit pattern for signed enums.
    pub value: u64,
}

/// A field or type definition with its resolved placement.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct TypeNode {
    pub name: String,
    pub type_name: String,
    pub base: BaseType,
    pub rows: u8,
    pub columns: u8,
    pub elements: u32,
    pub byte_offset: u32,
    pub array_byte_stride: u32,
    pub matrix_byte_stride: u32,
    pub flags: TypeFlags,
    pub bit_field_offset: u16,
    pub bit_field_size: u16,
    /// Owner-scoped pointee id, resolved through a
    /// [`PointerTypeRegistry`](crate::registry::PointerTypeRegistry).
    pub pointer_type_id: Option<u32>,
    /// Underlying integer type of an enum.
    pub enum_base: Option<BaseType>,
    pub members: Vec<TypeNode>,
    pub enum_values: Vec<EnumValue>,
}

impl Default for TypeNode {
    fn default() -> Self {
        Self {
            name: String::new(),
            type_name: String::new(),
            base: BaseType::default(),
            rows: 1,
            columns: 1,
            elements: 1,
            byte_offset: 0,
            array_byte_stride: 0,
            matrix_byte_stride: 0,
            flags: TypeFlags::empty(),
            bit_field_offset: 0,
            bit_field_size: 0,
            pointer_type_id: None,
            enum_base: None,
            members: Vec::new(),
            enum_values: Vec::new(),
        }
    }
}

impl TypeNode {
    /// A scalar, vector or matrix leaf. Strides are left for the caller to compute.
    pub fn leaf(name: impl Into<String>, base: BaseType, rows: u8, columns: u8) -> Self {
        Self {
            name: name.into(),
            base,
            rows,
            columns,
            ..Self::default()
        }
    }

    pub fn structure(
        name: impl Into<String>,
        type_name: impl Into<String>,
        members: Vec<TypeNode>,
        stride: u32,
    ) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            base: BaseType::Struct,
            array_byte_stride: stride,
            members,
            ..Self::default()
        }
    }

    pub fn is_struct(&self) -> bool {
        self.base == BaseType::Struct
    }

    pub fn is_enum(&self) -> bool {
        self.base == BaseType::Enum
    }

    pub fn is_pointer(&self) -> bool {
        self.base == BaseType::GpuPointer
    }

    pub fn is_unbounded(&self) -> bool {
        self.elements == UNBOUNDED
    }

    /// Fixed arrays of more than one element and unbounded arrays.
    pub fn is_array(&self) -> bool {
        self.elements > 1
    }

    /// Element count with unbounded arrays treated as a single element.
    pub fn count(&self) -> u32 {
        if self.is_unbounded() { 1 } else { self.elements }
    }

    pub fn is_matrix(&self) -> bool {
        self.rows > 1
    }

    pub fn is_row_major(&self) -> bool {
        self.flags.contains(TypeFlags::ROW_MAJOR)
    }

    pub fn is_packed(&self) -> bool {
        self.flags.intersects(TypeFlags::PACKED)
    }

    pub fn is_bitfield(&self) -> bool {
        self.bit_field_size > 0
    }

    /// Scalar type that determines component width: the enum base for enums.
    pub fn component_type(&self) -> BaseType {
        match (self.base, self.enum_base) {
            (BaseType::Enum, Some(base)) => base,
            (BaseType::Enum, None) => BaseType::UInt,
            (base, _) => base,
        }
    }

    /// Storage width of one component. Bools are stored as 32-bit values.
    pub fn component_size(&self) -> u32 {
        self.component_type().byte_size()
    }

    /// Components in one "vector": the column when column-major, else the row.
    pub fn vector_len(&self) -> u32 {
        if self.is_matrix() && !self.is_row_major() {
            self.rows as u32
        } else {
            self.columns as u32
        }
    }

    /// Number of vectors making up a matrix. 1 for vectors and scalars.
    pub fn major_count(&self) -> u32 {
        if !self.is_matrix() {
            1
        } else if self.is_row_major() {
            self.rows as u32
        } else {
            self.columns as u32
        }
    }
}

impl fmt::Display for TypeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_node(self, 0, f)
    }
}

fn fmt_node(node: &TypeNode, depth: usize, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let indent = "  ".repeat(depth);
    let ty = if node.type_name.is_empty() {
        node.base.keyword()
    } else {
        node.type_name.as_str()
    };
    write!(f, "{indent}{ty} {}", node.name)?;
    if node.is_unbounded() {
        write!(f, "[]")?;
    } else if node.is_array() {
        write!(f, "[{}]", node.elements)?;
    }
    write!(f, " @{} stride={}", node.byte_offset, node.array_byte_stride)?;
    if node.is_bitfield() {
        write!(f, " bits={}+{}", node.bit_field_offset, node.bit_field_size)?;
    }
    writeln!(f)?;
    for member in &node.members {
        fmt_node(member, depth + 1, f)?;
    }
    Ok(())
}
