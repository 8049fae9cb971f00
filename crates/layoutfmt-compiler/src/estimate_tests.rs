use layoutfmt_core::{
    ApiFamily, BaseType, LayoutCursor, OwnerId, PackingAxis, PackingPreset, PackingRules,
    PointerTypeRegistry, TypeNode, TypeRegistry, UNBOUNDED,
};

use crate::estimate::{Estimator, estimate};
use crate::parser::ParseConfig;
use crate::test_utils::parse;

const MIXED: &str = "float a;\nfloat3 b;\nfloat2 c[2];\nfloat d;";

fn std140() -> PackingRules {
    PackingPreset::Std140.rules()
}

fn leaf(base: BaseType, columns: u8, offset: u32, stride: u32) -> TypeNode {
    TypeNode {
        byte_offset: offset,
        array_byte_stride: stride,
        ..TypeNode::leaf("v", base, 1, columns)
    }
}

fn pointer(local: u32) -> TypeNode {
    TypeNode {
        pointer_type_id: Some(local),
        array_byte_stride: 8,
        ..TypeNode::leaf("p", BaseType::GpuPointer, 1, 1)
    }
}

fn observe_gl(members: &[TypeNode]) -> PackingRules {
    Estimator::new(ApiFamily::OpenGL, &TypeRegistry::new()).observe(members)
}

/// Estimates the members of a format parsed without implicit promotion.
fn estimate_text(api: ApiFamily, text: &str) -> PackingRules {
    let parsed = parse(text, &ParseConfig::new().api(api).cbuffer(true));
    assert!(parsed.is_valid());
    estimate(api, OwnerId::GLOBAL, &parsed.fixed.members, &TypeRegistry::new())
}

#[test]
fn gl_presets_are_recovered() {
    for preset in [PackingPreset::Std140, PackingPreset::Std430] {
        let text = format!("#pack({})\n{MIXED}", preset.name());
        assert_eq!(estimate_text(ApiFamily::OpenGL, &text), preset.rules(), "{preset:?}");
    }
}

#[test]
fn relaxed_gl_layouts_snap_to_scalar() {
    for preset in [PackingPreset::C, PackingPreset::Scalar] {
        let text = format!("#pack({})\n{MIXED}", preset.name());
        assert_eq!(
            estimate_text(ApiFamily::Vulkan, &text),
            PackingPreset::Scalar.rules(),
            "{preset:?}"
        );
    }
}

#[test]
fn d3d_cbuffer_is_recovered() {
    assert_eq!(
        estimate_text(ApiFamily::D3D, MIXED),
        PackingPreset::D3DConstantBuffer.rules()
    );
}

#[test]
fn d3d_structured_buffer_is_recovered() {
    let parsed = parse(MIXED, &ParseConfig::new());
    let element = parsed.repeating.expect("promoted element");
    let rules = estimate(ApiFamily::D3D, OwnerId::GLOBAL, &element.members, &TypeRegistry::new());
    assert_eq!(rules, PackingPreset::D3DUav.rules());
}

#[test]
fn d3d_with_overlap_and_tight_arrays_is_scalar() {
    let text = "#pack(scalar)\nstruct S { double d; float f; }\nS s;\nfloat x[2];";
    assert_eq!(estimate_text(ApiFamily::D3D, text), PackingPreset::Scalar.rules());
}

#[test]
fn component_aligned_vector() {
    let members = [leaf(BaseType::Float, 2, 4, 8)];
    assert_eq!(
        observe_gl(&members),
        std140().with(PackingAxis::VectorAlignComponent, true)
    );
}

#[test]
fn straddling_vector() {
    let members = [leaf(BaseType::Float, 2, 12, 8)];
    assert_eq!(
        observe_gl(&members),
        std140().with(PackingAxis::VectorStraddle16b, true)
    );
}

#[test]
fn straddling_array_element() {
    let mut array = leaf(BaseType::Float, 3, 0, 12);
    array.elements = 2;
    let observed = observe_gl(&[array]);
    assert!(observed.vector_straddle_16b);
    assert!(observed.tight_arrays);
}

#[test]
fn tight_scalar_array() {
    let mut array = leaf(BaseType::Float, 1, 0, 4);
    array.elements = 4;
    assert_eq!(observe_gl(&[array]), std140().with(PackingAxis::TightArrays, true));
}

#[test]
fn tight_unbounded_array() {
    let mut array = leaf(BaseType::UInt, 1, 0, 4);
    array.elements = UNBOUNDED;
    assert_eq!(observe_gl(&[array]), PackingPreset::Std430.rules());
}

#[test]
fn member_in_trailing_padding() {
    let mut array = leaf(BaseType::Float, 3, 0, 16);
    array.elements = 2;
    let members = [array, leaf(BaseType::Float, 1, 28, 4)];
    assert_eq!(observe_gl(&members), std140().with(PackingAxis::TrailingOverlap, true));
}

#[test]
fn bitfield_across_storage_units() {
    let field = TypeNode {
        byte_offset: 3,
        bit_field_offset: 6,
        bit_field_size: 20,
        array_byte_stride: 4,
        ..TypeNode::leaf("f", BaseType::UInt, 1, 1)
    };
    assert_eq!(
        observe_gl(&[field]),
        std140().with(PackingAxis::TightBitfieldPacking, true)
    );
}

#[test]
fn pointers_are_followed_within_their_owner() {
    let mut array = leaf(BaseType::Float, 1, 0, 4);
    array.elements = 4;
    let pointee = TypeNode::structure("", "Pointee", vec![array], 16);

    let owner = OwnerId(7);
    let mut registry = TypeRegistry::new();
    registry.bind_local(owner, 3, &pointee);

    let members = [pointer(3)];
    let with_owner = Estimator::new(ApiFamily::Vulkan, &registry).owner(owner);
    assert_eq!(with_owner.observe(&members), PackingPreset::Std430.rules());

    let unresolved = Estimator::new(ApiFamily::Vulkan, &registry);
    assert_eq!(unresolved.observe(&[pointer(9)]), std140());
}

#[test]
fn pointer_cycles_terminate() {
    let mut value = leaf(BaseType::Float, 1, 8, 4);
    value.name = "value".to_string();
    let node = TypeNode::structure("", "Node", vec![pointer(0), value], 16);

    let mut registry = TypeRegistry::new();
    let id = registry.register(&node);
    assert_eq!(id.0, 0);

    let estimator = Estimator::new(ApiFamily::OpenGL, &registry);
    assert_eq!(estimator.estimate(&[pointer(0)]), std140());
}

#[test]
fn estimated_rules_never_push_a_member_past_its_offset() {
    let layouts = [MIXED, "float2 a;\nfloat3 b[2];\nuint c;\nhalf h;\nfloat4 d;"];
    for api in [ApiFamily::D3D, ApiFamily::OpenGL] {
        for preset in PackingPreset::ALL {
            for layout in layouts {
                let text = format!("#pack({})\n{layout}", preset.name());
                let parsed = parse(&text, &ParseConfig::new().api(api).cbuffer(true));
                assert!(parsed.is_valid(), "{text}");

                let members = &parsed.fixed.members;
                let rules = estimate(api, OwnerId::GLOBAL, members, &TypeRegistry::new());
                let mut cursor = LayoutCursor::new();
                for member in members {
                    let natural = cursor.next_offset(member, rules);
                    assert!(
                        natural <= member.byte_offset,
                        "{preset:?} on {api:?}: `{}` lands at {natural}, declared at {}",
                        member.name,
                        member.byte_offset
                    );
                    cursor.commit(member.byte_offset, member, rules);
                }
            }
        }
    }
}
