//! Layout arithmetic: alignment, size and stride of a node under a rule set.
//!
//! Everything here is a pure function of `(node, rules)`. The parser, the
//! estimator and the declaration generator all place members through
//! [`LayoutCursor`], so the three directions agree on every offset.
//!
//! Byte arithmetic saturates at `u32::MAX`. A layout whose extent passes
//! [`MAX_EXTENT`] does not fit the 32-bit address range and is rejected by
//! the parser.

use crate::packing::PackingRules;
use crate::types::{BaseType, TypeNode};

/// Largest byte extent a layout may reach. Leaves room to round it up to
/// any alignment a member can require.
pub const MAX_EXTENT: u32 = u32::MAX - 63;

pub const fn align_up(value: u32, alignment: u32) -> u32 {
    if alignment <= 1 {
        value
    } else {
        value.div_ceil(alignment).saturating_mul(alignment)
    }
}

/// Alignment of a vector of `len` components of `width` bytes.
fn vector_alignment(width: u32, len: u32, rules: PackingRules) -> u32 {
    if rules.vector_align_component || len <= 1 {
        width
    } else if len == 2 {
        width * 2
    } else {
        width * 4
    }
}

pub fn alignment(node: &TypeNode, rules: PackingRules) -> u32 {
    match node.base {
        BaseType::GpuPointer => 8,
        BaseType::Struct => {
            let members = node
                .members
                .iter()
                .map(|m| alignment(m, rules))
                .max()
                .unwrap_or(1);
            if rules.tight_arrays {
                members
            } else {
                members.max(16)
            }
        }
        _ if node.is_packed() => 4,
        _ => vector_alignment(node.component_size(), node.vector_len(), rules),
    }
}

/// Alignment used when placing the node as a member.
///
/// Arrays, matrices and structs start on a 16-byte boundary unless arrays are tight.
pub fn placement_alignment(node: &TypeNode, rules: PackingRules) -> u32 {
    let align = alignment(node, rules);
    if !rules.tight_arrays && (node.is_array() || node.is_matrix() || node.is_struct()) {
        align.max(16)
    } else {
        align
    }
}

/// Byte span tested against 16-byte boundaries. Structs report 0.
pub fn straddle_size(node: &TypeNode) -> u32 {
    match node.base {
        BaseType::Struct => 0,
        BaseType::GpuPointer => 8,
        _ if node.is_packed() => 4,
        _ => node.component_size() * node.vector_len(),
    }
}

pub fn matrix_stride(component_size: u32, vector_len: u32, rules: PackingRules) -> u32 {
    let bytes = component_size * vector_len;
    if rules.tight_arrays {
        align_up(bytes, vector_alignment(component_size, vector_len, rules))
    } else {
        align_up(bytes, 16)
    }
}

/// Size of a single element, ignoring the array dimension.
pub fn element_size(node: &TypeNode) -> u32 {
    match node.base {
        BaseType::Struct => node.array_byte_stride,
        BaseType::GpuPointer => 8,
        _ if node.is_packed() => 4,
        _ if node.is_matrix() => node.matrix_byte_stride * node.major_count(),
        _ => node.component_size() * node.columns as u32,
    }
}

/// Stride between elements of the node when it is (or becomes) an array.
///
/// Structs keep their own stride. Everything else rounds its element size up
/// to its alignment, and arrays round to 16 unless arrays are tight.
pub fn array_stride(node: &TypeNode, rules: PackingRules) -> u32 {
    if node.is_struct() {
        return node.array_byte_stride;
    }
    let stride = align_up(element_size(node), alignment(node, rules));
    if node.is_array() && !rules.tight_arrays {
        align_up(stride, 16)
    } else {
        stride
    }
}

/// Bytes one instance occupies, including its internal and trailing padding.
pub fn size_and_trail(node: &TypeNode) -> u32 {
    if node.is_array() {
        node.array_byte_stride.saturating_mul(node.count())
    } else {
        element_size(node)
    }
}

/// Extent of a single element with trailing padding removed.
pub fn tight_size(node: &TypeNode) -> u32 {
    match node.base {
        BaseType::Struct => node
            .members
            .iter()
            .map(|m| m.byte_offset.saturating_add(member_extent(m)))
            .max()
            .unwrap_or(0),
        BaseType::GpuPointer => 8,
        _ if node.is_packed() => 4,
        _ if node.is_matrix() => {
            node.matrix_byte_stride * (node.major_count() - 1)
                + node.component_size() * node.vector_len()
        }
        _ => node.component_size() * node.columns as u32,
    }
}

/// Extent of the whole node, up to the end of the last element's tight size.
pub fn tight_extent(node: &TypeNode) -> u32 {
    if node.is_array() {
        node.array_byte_stride
            .saturating_mul(node.count() - 1)
            .saturating_add(tight_size(node))
    } else {
        tight_size(node)
    }
}

fn member_extent(node: &TypeNode) -> u32 {
    if node.is_bitfield() {
        (node.bit_field_offset as u32 + node.bit_field_size as u32).div_ceil(8)
    } else {
        tight_extent(node)
    }
}

/// How far the cursor moves past a member placed at its offset.
pub fn advance(node: &TypeNode, rules: PackingRules) -> u32 {
    if rules.trailing_overlap {
        tight_extent(node)
    } else {
        size_and_trail(node)
    }
}

/// Whether `[offset, offset + size)` crosses a 16-byte boundary.
pub fn crosses_16b(offset: u32, size: u32) -> bool {
    size > 0 && offset / 16 != offset.saturating_add(size - 1) / 16
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct BitWindow {
    base: u32,
    pos: u32,
}

impl BitWindow {
    fn consumed_bytes(&self) -> u32 {
        self.base.saturating_add(self.pos.div_ceil(8))
    }
}

/// Placement state for one struct scope: byte cursor, open bit-field group
/// and the largest alignment seen.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LayoutCursor {
    offset: u32,
    max_align: u32,
    bits: Option<BitWindow>,
}

impl LayoutCursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current byte position, with any open bit-field group rounded up to whole bytes.
    pub fn size(&self) -> u32 {
        match self.bits {
            Some(window) => window.consumed_bytes().max(self.offset),
            None => self.offset,
        }
    }

    /// Whether everything placed so far ends within [`MAX_EXTENT`].
    pub fn in_range(&self) -> bool {
        self.size() <= MAX_EXTENT
    }

    pub fn max_align(&self) -> u32 {
        self.max_align.max(1)
    }

    /// Stride of the struct laid out so far.
    pub fn stride(&self, rules: PackingRules) -> u32 {
        let stride = align_up(self.size(), self.max_align());
        if rules.tight_arrays {
            stride
        } else {
            align_up(stride, 16)
        }
    }

    fn flush_bits(&mut self) {
        if let Some(window) = self.bits.take() {
            self.offset = self.offset.max(window.consumed_bytes());
        }
    }

    /// Offset the next non-bit-field member would be placed at.
    pub fn next_offset(&self, node: &TypeNode, rules: PackingRules) -> u32 {
        let mut offset = align_up(self.size(), placement_alignment(node, rules));
        if !rules.vector_straddle_16b && crosses_16b(offset, straddle_size(node)) {
            offset = align_up(offset, 16);
        }
        offset
    }

    /// Records a member at `offset` and moves past it.
    pub fn commit(&mut self, offset: u32, node: &TypeNode, rules: PackingRules) {
        self.flush_bits();
        self.max_align = self.max_align.max(alignment(node, rules));
        self.offset = offset.saturating_add(advance(node, rules));
    }

    /// Moves the cursor to an explicit byte offset, closing any bit-field group.
    pub fn restart_at(&mut self, offset: u32) {
        self.bits = None;
        self.offset = offset;
    }

    /// Places `bits` bits of a `width`-byte base type.
    ///
    /// Returns the byte offset of the storage word and the bit offset within it.
    pub fn place_bits(&mut self, width: u32, bits: u32, rules: PackingRules) -> (u32, u32) {
        let width = width.max(1);
        let mut window = match self.bits {
            Some(window) => window,
            None => BitWindow {
                base: align_up(self.offset, width),
                pos: 0,
            },
        };
        if window.pos + bits > width * 8 {
            if rules.tight_bitfield_packing {
                window.base = window.base.saturating_add(window.pos / 8);
                window.pos %= 8;
            } else {
                window.base = align_up(window.consumed_bytes(), width);
                window.pos = 0;
            }
        }
        let placed = (window.base, window.pos);
        window.pos += bits;
        self.bits = Some(window);
        self.max_align = self.max_align.max(width);
        placed
    }

    /// Advances the bit cursor without producing a member.
    pub fn skip_bits(&mut self, width: u32, bits: u32, rules: PackingRules) {
        self.place_bits(width, bits, rules);
    }

    /// The position the next bit-field of the given shape would get, without placing it.
    pub fn peek_bits(&self, width: u32, bits: u32, rules: PackingRules) -> (u32, u32) {
        self.clone().place_bits(width, bits, rules)
    }
}
