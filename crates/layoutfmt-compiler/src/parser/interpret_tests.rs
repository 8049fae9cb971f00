use crate::{shot_error, shot_parse};

#[test]
fn bitfields_roll_over_their_storage_unit() {
    shot_parse!("
        uint a : 16;
        uint b : 14;
        uint c : 20;
        uint d : 14;
    ", @r"
    packing: d3duav
    struct  @0 stride=0
    repeating:
    struct  @0 stride=12
      uint a @0 stride=4 bits=0+16
      uint b @0 stride=4 bits=16+14
      uint c @4 stride=4 bits=0+20
      uint d @8 stride=4 bits=0+14
    ");
}

#[test]
fn tight_bitfields_straddle_their_storage_unit() {
    shot_parse!("
        #pack(scalar)
        uint a : 16;
        uint b : 14;
        uint c : 20;
        uint d : 14;
    ", @r"
    packing: scalar
    struct  @0 stride=0
    repeating:
    struct  @0 stride=8
      uint a @0 stride=4 bits=0+16
      uint b @0 stride=4 bits=16+14
      uint c @3 stride=4 bits=6+20
      uint d @6 stride=4 bits=2+14
    ");
}

#[test]
fn unbounded_array_is_the_repeating_element() {
    shot_parse!("float a[];", @r"
    packing: d3duav
    struct  @0 stride=0
    repeating:
    float a @0 stride=4
    ");
}

#[test]
fn struct_array_as_repeating_element() {
    shot_parse!("
        struct Item
        {
            float3 pos;
            uint id;
        }
        Item items[];
    ", @r"
    packing: d3duav
    struct  @0 stride=0
    repeating:
    Item items @0 stride=16
      float3 pos @0 stride=12
      uint id @12 stride=4
    ");
}

#[test]
fn last_struct_becomes_the_root() {
    shot_parse!("
        struct Vertex
        {
            float4 pos;
            float2 uv;
        }
    ", @r"
    packing: d3duav
    Vertex  @0 stride=0
    repeating:
    Vertex  @0 stride=24
      float4 pos @0 stride=16
      float2 uv @16 stride=8
    ");
}

#[test]
fn single_member_is_not_promoted() {
    shot_parse!("[[single]] float4 color;", @r"
    packing: d3duav
    struct  @0 stride=16
      float4 color @0 stride=16
    ");
}

#[test]
fn sole_member_becomes_an_array() {
    shot_parse!("row_major float4x3 m;", @r"
    packing: d3duav
    struct  @0 stride=0
    repeating:
    float4x3 m @0 stride=48
    ");
}

#[test]
fn explicit_offsets_and_padding() {
    shot_parse!("
        [[offset(16)]] float a;
        [[pad]] float b;
        uint c;
    ", @r"
    packing: d3duav
    struct  @0 stride=0
    repeating:
    struct  @0 stride=28
      float a @16 stride=4
      uint c @24 stride=4
    ");
}

#[test]
fn annotation_line_applies_to_next_declaration() {
    shot_parse!("
        [[offset(8)]]
        [[hex]]
        uint flags;
        uint count;
    ", @r"
    packing: d3duav
    struct  @0 stride=0
    repeating:
    struct  @0 stride=16
      xint flags @8 stride=4
      uint count @12 stride=4
    ");
}

#[test]
fn enum_members() {
    let parsed = crate::test_utils::expect_valid(indoc::indoc! {"
        enum Mode : ubyte
        {
            Off,
            On,
            Blink = 7,
        }
        Mode mode;
        uint value;
    "});
    let element = parsed.repeating.expect("repeating element");
    let mode = &element.members[0];
    assert_eq!(mode.type_name, "Mode");
    assert_eq!(mode.component_size(), 1);
    let values: Vec<_> = mode.enum_values.iter().map(|v| (v.name.as_str(), v.value)).collect();
    assert_eq!(values, vec![("Off", 0), ("On", 1), ("Blink", 7)]);
    assert_eq!(element.members[1].byte_offset, 4);
}

#[test]
fn signed_enum_values_are_twos_complement() {
    let parsed = crate::test_utils::expect_valid(indoc::indoc! {"
        enum Delta : int { Down = -1, Same, Up }
        [[single]] Delta delta;
    "});
    let values: Vec<_> = parsed.fixed.members[0]
        .enum_values
        .iter()
        .map(|v| v.value)
        .collect();
    assert_eq!(values, vec![u64::MAX, 0, 1]);
}

#[test]
fn unknown_type() {
    shot_error!("flaot a;", @"line 1: unknown type `flaot`");
}

#[test]
fn zero_sized_array() {
    shot_error!("float a[0];", @"line 1: invalid array size: `float a[0]`");
}

#[test]
fn unbounded_not_last() {
    shot_error!("
        float a[];
        float b;
    ", @"line 2: an unbounded array must be the last member: `b` follows it");
}

#[test]
fn unbounded_not_alone_on_d3d() {
    shot_error!("
        float a;
        float b[];
    ", @"line 2: on D3D an unbounded array must be the only root member: `a` on line 1 is also a root member");
}

#[test]
fn matrix_dimensions_out_of_range() {
    shot_error!("float4x5 m;", @"line 1: vector and matrix dimensions must be between 1 and 4: `float4x5`");
}

#[test]
fn unknown_packing_rule() {
    shot_error!("#pack(std999)", @"line 1: unknown packing rule `std999`");
}

#[test]
fn pack_between_root_declarations() {
    let parsed = crate::test_utils::expect_valid(indoc::indoc! {"
        struct A
        {
            float a;
        }
        #pack(std430)
        A a;
    "});
    assert_eq!(parsed.packing, layoutfmt_core::PackingPreset::Std430.rules());
    let element = parsed.repeating.expect("promoted member");
    assert_eq!(element.name, "a");
    assert_eq!(element.type_name, "A");
}

#[test]
fn pack_inside_struct_body() {
    shot_error!("
        struct A
        {
            #pack(std430)
            float a;
        }
    ", @"line 3: packing rules can only be set at global scope");
}

#[test]
fn bitfield_wider_than_storage() {
    shot_error!("uint a : 40;", @"line 1: invalid bitfield: 40 bits don't fit in `uint`");
}

#[test]
fn double_pointer() {
    shot_error!("
        struct S { float a; }
        S** q;
    ", @"line 2: only single-level pointers are supported");
}

#[test]
fn offset_moving_backwards() {
    shot_error!("
        [[offset(8)]] float a;
        [[offset(4)]] float b;
    ", @"line 2: explicit offset moves backwards: 4 is before the current offset 12");
}

#[test]
fn empty_struct() {
    shot_error!("
        struct S
        {
        }
    ", @"line 3: definition has no members: `S` is empty");
}

#[test]
fn unknown_annotation() {
    shot_error!("[[bogus]] float a;", @"line 1: unknown annotation `bogus`");
}

#[test]
fn pointer_to_enum() {
    shot_error!("
        enum E : uint { A }
        E* e;
    ", @"line 2: pointers must point to a complete struct: `E*`");
}

#[test]
fn bool_bitfields() {
    shot_parse!("
        bool a : 1;
        bool b : 1;
    ", @r"
    packing: d3duav
    struct  @0 stride=0
    repeating:
    struct  @0 stride=4
      bool a @0 stride=4 bits=0+1
      bool b @0 stride=4 bits=1+1
    ");
}

#[test]
fn float_bitfield() {
    shot_error!("float a : 3;", @"line 1: invalid bitfield: `float` is not an integer type");
}

#[test]
fn unused_definition_does_not_count_towards_unbounded_limit() {
    shot_parse!("
        struct A
        {
            float x[];
        }
        float z[];
    ", @r"
    packing: d3duav
    struct  @0 stride=0
    repeating:
    float z @0 stride=4
    ");
}

#[test]
fn second_unbounded_array() {
    shot_error!("
        float a[];
        float b[];
    ", @"line 2: only one unbounded array is allowed: the first is on line 1");
}

#[test]
fn struct_with_unbounded_member_after_unbounded_array() {
    shot_error!("
        struct A
        {
            float x[];
        }
        float z[];
        A a;
    ", @"line 6: only one unbounded array is allowed: the first is on line 5");
}

#[test]
fn array_too_large_for_address_range() {
    shot_error!("
        float4 a[300000000];
        float b;
    ", @"line 1: layout does not fit in a 32-bit byte range: `a` would end past byte 4294967232");
}

#[test]
fn offset_past_address_range() {
    shot_error!(
        "[[offset(4294967292)]] float4 a;",
        @"line 1: layout does not fit in a 32-bit byte range: `a` would end past byte 4294967232"
    );
}

#[test]
fn duplicate_definition() {
    shot_error!("
        struct A
        {
            float a;
        }
        struct A
        {
            float b;
        }
    ", @"line 5: `A` is already defined");
}

#[test]
fn enum_value_out_of_range() {
    shot_error!("
        enum E : ubyte
        {
            Big = 256
        }
    ", @"line 3: enum value out of range: 256 does not fit in `ubyte`");
}

#[test]
fn array_of_arrays() {
    shot_error!("float a[2][3];", @"line 1: arrays of arrays are not supported");
}

#[test]
fn declared_size_too_small() {
    shot_error!("
        [[size(4)]] struct S
        {
            float2 a;
        }
        S s;
    ", @"line 4: declared size is smaller than the struct: `S` needs 8 bytes, declared 4");
}

#[test]
fn second_single_member() {
    shot_error!("
        [[single]] float a;
        [[single]] float b;
    ", @"line 2: `[[single]]` is only valid once, on the sole root member");
}

#[test]
fn single_struct_cannot_be_arrayed() {
    shot_error!("
        [[single]] struct S
        {
            float a;
        }
        S s[2];
    ", @"line 5: `[[single]]` is only valid once, on the sole root member: `S` is `[[single]]` and cannot be arrayed");
}
