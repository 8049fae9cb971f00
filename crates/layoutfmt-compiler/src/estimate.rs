//! Packing estimation: infers the rule set a reflected layout was built with.
//!
//! The walk starts from the strictest preset of the API and collects
//! evidence: every placement the start rules could not have produced relaxes
//! one axis. The union is then snapped to a named preset.

use std::collections::HashSet;

use layoutfmt_core::layout;
use layoutfmt_core::{
    ApiFamily, OwnerId, PackingAxis, PackingPreset, PackingRules, PointerTypeId,
    PointerTypeRegistry, TypeNode,
};

/// Array elements checked for 16-byte straddling. Offsets repeat with the
/// stride, so the pattern is periodic well before this.
const STRADDLE_PROBE_ELEMENTS: u32 = 16;

pub struct Estimator<'r> {
    api: ApiFamily,
    owner: OwnerId,
    registry: &'r dyn PointerTypeRegistry,
}

impl<'r> Estimator<'r> {
    pub fn new(api: ApiFamily, registry: &'r dyn PointerTypeRegistry) -> Self {
        Self {
            api,
            owner: OwnerId::GLOBAL,
            registry,
        }
    }

    /// Scope the members' pointer ids are interpreted in.
    pub fn owner(mut self, owner: OwnerId) -> Self {
        self.owner = owner;
        self
    }

    fn walk(&self, members: &[TypeNode]) -> Walk<'r> {
        let mut walk = Walk {
            registry: self.registry,
            start: self.api.strictest_packing().rules(),
            evidence: PackingRules::NONE,
            visited: HashSet::new(),
        };
        walk.members(self.owner, members);
        walk
    }

    /// Start rules plus every relaxation observed, without snapping.
    pub fn observe(&self, members: &[TypeNode]) -> PackingRules {
        self.walk(members).rules()
    }

    /// The preset best describing `members`.
    pub fn estimate(&self, members: &[TypeNode]) -> PackingRules {
        let walk = self.walk(members);
        let preset = snap(self.api, walk.rules(), walk.evidence);
        tracing::debug!(api = ?self.api, preset = preset.name(), "packing estimated");
        preset.rules()
    }
}

/// Shorthand for `Estimator::new(api, registry).owner(owner).estimate(members)`.
pub fn estimate(
    api: ApiFamily,
    owner: OwnerId,
    members: &[TypeNode],
    registry: &dyn PointerTypeRegistry,
) -> PackingRules {
    Estimator::new(api, registry).owner(owner).estimate(members)
}

fn snap(api: ApiFamily, rules: PackingRules, evidence: PackingRules) -> PackingPreset {
    if api.is_d3d() {
        if rules == PackingPreset::D3DConstantBuffer.rules() {
            PackingPreset::D3DConstantBuffer
        } else if evidence.is_subset_of(&PackingPreset::D3DUav.rules()) {
            PackingPreset::D3DUav
        } else {
            PackingPreset::Scalar
        }
    } else if rules == PackingPreset::Std140.rules() {
        PackingPreset::Std140
    } else if rules == PackingPreset::Std430.rules() {
        PackingPreset::Std430
    } else {
        PackingPreset::Scalar
    }
}

struct Walk<'r> {
    registry: &'r dyn PointerTypeRegistry,
    start: PackingRules,
    evidence: PackingRules,
    visited: HashSet<PointerTypeId>,
}

impl Walk<'_> {
    fn rules(&self) -> PackingRules {
        self.start.union(self.evidence)
    }

    fn saturated(&self) -> bool {
        self.rules() == PackingPreset::Scalar.rules()
    }

    fn relax(&mut self, axis: PackingAxis, node: &TypeNode, offset: u32) {
        if self.evidence.get(axis) {
            return;
        }
        tracing::debug!(
            axis = axis.keyword(),
            node = %node.name,
            offset,
            "relaxing packing"
        );
        self.evidence = self.evidence.with(axis, true);
    }

    fn members(&mut self, owner: OwnerId, members: &[TypeNode]) {
        for member in members {
            if self.saturated() {
                return;
            }
            self.node(owner, member);
        }
        for pair in members.windows(2) {
            if let [prev, next] = pair {
                self.siblings(prev, next);
            }
        }
    }

    fn node(&mut self, owner: OwnerId, node: &TypeNode) {
        if node.is_bitfield() {
            self.bitfield(node);
            return;
        }

        self.tight_arrays(node);
        if !node.is_struct() && !node.is_pointer() && !node.is_packed() && node.vector_len() >= 2 {
            self.vector(node);
        }

        if node.is_struct() {
            self.members(owner, &node.members);
        } else if node.is_pointer() {
            let registry = self.registry;
            if let Some((id, pointee)) = registry.pointee(owner, node)
                && self.visited.insert(id)
            {
                self.tight_arrays(pointee);
                self.members(OwnerId::GLOBAL, &pointee.members);
            }
        }
    }

    fn tight_arrays(&mut self, node: &TypeNode) {
        let aggregate = node.is_array() || node.is_matrix() || node.is_struct();
        let untight = (node.is_array() && node.array_byte_stride % 16 != 0)
            || (node.is_matrix() && node.matrix_byte_stride % 16 != 0)
            || (node.is_struct() && node.array_byte_stride % 16 != 0)
            || (aggregate && node.byte_offset % 16 != 0);
        if untight {
            self.relax(PackingAxis::TightArrays, node, node.byte_offset);
        }
    }

    fn vector(&mut self, node: &TypeNode) {
        let full = layout::alignment(node, PackingRules::NONE);
        if node.byte_offset % full != 0 {
            self.relax(PackingAxis::VectorAlignComponent, node, node.byte_offset);
        }

        let size = layout::straddle_size(node);
        for i in 0..node.count().min(STRADDLE_PROBE_ELEMENTS) {
            let element = node
                .byte_offset
                .saturating_add(i.saturating_mul(node.array_byte_stride));
            for v in 0..node.major_count() {
                let offset = element.saturating_add(v.saturating_mul(node.matrix_byte_stride));
                if layout::crosses_16b(offset, size) {
                    self.relax(PackingAxis::VectorStraddle16b, node, offset);
                    return;
                }
            }
        }
    }

    fn bitfield(&mut self, node: &TypeNode) {
        let width = node.component_size().max(1);
        let end = node.bit_field_offset as u32 + node.bit_field_size as u32;
        if end > width.saturating_mul(8) || node.byte_offset % width != 0 {
            self.relax(PackingAxis::TightBitfieldPacking, node, node.byte_offset);
        }
    }

    /// A member placed inside its predecessor's trailing padding.
    fn siblings(&mut self, prev: &TypeNode, next: &TypeNode) {
        if prev.is_bitfield() || next.is_bitfield() {
            return;
        }
        let tight_end = prev.byte_offset.saturating_add(layout::tight_extent(prev));
        let padded_end = prev.byte_offset.saturating_add(layout::size_and_trail(prev));
        if (tight_end..padded_end).contains(&next.byte_offset) {
            self.relax(PackingAxis::TrailingOverlap, next, next.byte_offset);
        }
    }
}
