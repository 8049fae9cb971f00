use layoutfmt_compiler::{ParseConfig, try_parse_format};
use layoutfmt_core::{ApiFamily, BaseType, TypeNode, TypeRegistry, UNBOUNDED};

use super::declare::{declaration, reattach};

fn declare_text(text: &str, config: &ParseConfig, name: Option<&str>) -> String {
    let mut registry = TypeRegistry::new();
    let parsed = try_parse_format(text, config, &mut registry).expect("valid format");
    declaration(parsed, config, name, &registry)
}

#[test]
fn implicit_array_is_declared_by_its_element() {
    let text = declare_text("float a;\nuint b;", &ParseConfig::new(), None);
    insta::assert_snapshot!(text, @r"
    #pack(d3duav)

    struct Root
    {
        float a;
        uint b;
    }
    ");
}

#[test]
fn repeating_tail_goes_back_as_an_unbounded_array() {
    let config = ParseConfig::new().api(ApiFamily::Vulkan);
    let text = declare_text("uint count;\nfloat4 items[];", &config, Some("Particles"));
    insta::assert_snapshot!(text, @r"
    #pack(std430)

    struct Particles
    {
        uint count;
        float4 items[];
    }
    ");
}

#[test]
fn implicit_array_on_vulkan_is_declared_by_its_element() {
    let config = ParseConfig::new().api(ApiFamily::Vulkan);
    let text = declare_text("float a;\nfloat b;", &config, None);
    insta::assert_snapshot!(text, @r"
    #pack(std430)

    struct Root
    {
        float a;
        float b;
    }
    ");
}

#[test]
fn declared_text_parses_to_the_same_layout() {
    let config = ParseConfig::new().api(ApiFamily::OpenGL).cbuffer(true);
    let source = "#pack(std140)\nfloat a;\nfloat3 b;\nfloat2 c[2];\n[[hex]] uint d;";

    let mut registry = TypeRegistry::new();
    let first = try_parse_format(source, &config, &mut registry).expect("valid format");
    let text = declaration(first.clone(), &config, None, &registry);
    let again = try_parse_format(&text, &config, &mut registry).expect("valid declaration");
    assert_eq!(again.packing, first.packing);
    assert_eq!(again.fixed.members, first.fixed.members);
}

#[test]
fn dotted_tail_is_reattached_inside_its_parent() {
    let count = TypeNode {
        array_byte_stride: 4,
        ..TypeNode::leaf("count", BaseType::UInt, 1, 1)
    };
    let block = TypeNode::structure("block", "Block", vec![count], 4);
    let mut members = vec![block];

    let tail = TypeNode {
        byte_offset: 4,
        array_byte_stride: 4,
        ..TypeNode::leaf("block.data", BaseType::Float, 1, 1)
    };
    reattach(&mut members, tail);

    assert_eq!(members.len(), 1);
    let inner = &members[0].members;
    assert_eq!(inner.len(), 2);
    assert_eq!(inner[1].name, "data");
    assert_eq!(inner[1].elements, UNBOUNDED);
}

#[test]
fn unmatched_parent_stops_at_the_deepest_match() {
    let mut members = vec![TypeNode::leaf("x", BaseType::Float, 1, 1)];
    reattach(
        &mut members,
        TypeNode::leaf("missing.tail", BaseType::Float, 1, 1),
    );
    assert_eq!(members.len(), 2);
    assert_eq!(members[1].name, "tail");
}
