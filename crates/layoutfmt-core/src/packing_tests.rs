use crate::packing::{ApiFamily, PackingAxis, PackingPreset, PackingRules};

#[test]
fn presets_match_their_axes() {
    let cb = PackingPreset::D3DConstantBuffer.rules();
    assert!(cb.vector_align_component);
    assert!(!cb.vector_straddle_16b);
    assert!(!cb.tight_arrays);
    assert!(cb.trailing_overlap);

    let std430 = PackingPreset::Std430.rules();
    assert_eq!(std430.with(PackingAxis::TightArrays, false), PackingPreset::Std140.rules());

    assert_eq!(PackingPreset::C.rules(), PackingPreset::D3DUav.rules());
    let scalar = PackingPreset::Scalar.rules();
    assert!(PackingAxis::ALL.into_iter().all(|axis| scalar.get(axis)));
}

#[test]
fn every_preset_keeps_straddle_invariant() {
    for preset in PackingPreset::ALL {
        let rules = preset.rules();
        assert!(!rules.vector_straddle_16b || rules.vector_align_component, "{preset:?}");
    }
}

#[test]
fn synonyms_resolve() {
    assert_eq!(PackingPreset::from_name("cbuffer"), Some(PackingPreset::D3DConstantBuffer));
    assert_eq!(PackingPreset::from_name("UBO"), Some(PackingPreset::Std140));
    assert_eq!(PackingPreset::from_name("glsl"), Some(PackingPreset::Std140));
    assert_eq!(PackingPreset::from_name("ssbo"), Some(PackingPreset::Std430));
    assert_eq!(PackingPreset::from_name("Scalar"), Some(PackingPreset::Scalar));
    assert_eq!(PackingPreset::from_name("std999"), None);
}

#[test]
fn axis_keywords() {
    assert_eq!(
        PackingAxis::from_keyword("tight_arrays"),
        Some((PackingAxis::TightArrays, true))
    );
    assert_eq!(
        PackingAxis::from_keyword("no_vector_straddle_16b"),
        Some((PackingAxis::VectorStraddle16b, false))
    );
    assert_eq!(PackingAxis::from_keyword("no_such_axis"), None);
}

#[test]
fn toggles_preserve_straddle_invariant() {
    let rules = PackingRules::default().with(PackingAxis::VectorStraddle16b, true);
    assert!(rules.vector_align_component);

    let rules = rules.with(PackingAxis::VectorAlignComponent, false);
    assert!(!rules.vector_straddle_16b);
}

#[test]
fn shared_bit_pattern_names_follow_api() {
    let rules = PackingPreset::C.rules();
    assert_eq!(rules.matching_preset(ApiFamily::D3D), Some(PackingPreset::D3DUav));
    assert_eq!(rules.matching_preset(ApiFamily::Vulkan), Some(PackingPreset::C));
}

#[test]
fn describe_preset() {
    let rules = PackingPreset::Std430.rules();
    assert_eq!(rules.describe(ApiFamily::Vulkan), "#pack(std430)\n");
}

#[test]
fn describe_custom_rules() {
    let rules = PackingPreset::Std430
        .rules()
        .with(PackingAxis::TightBitfieldPacking, true);
    let text = rules.describe(ApiFamily::Vulkan);
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 11);
    assert_eq!(lines[0], "// custom packing rules");
    assert!(lines[1].starts_with("#pack(no_vector_align_component)"));
    assert!(lines[2].starts_with("// #pack(vector_align_component)"));
    assert!(lines[5].starts_with("#pack(tight_arrays)"));
    assert!(lines[9].starts_with("#pack(tight_bitfield_packing)"));
    assert!(lines[10].starts_with("// #pack(no_tight_bitfield_packing)"));
}

#[test]
fn default_packing_by_api() {
    assert_eq!(ApiFamily::D3D.default_packing(true), PackingPreset::D3DConstantBuffer);
    assert_eq!(ApiFamily::D3D.default_packing(false), PackingPreset::D3DUav);
    assert_eq!(ApiFamily::Vulkan.default_packing(true), PackingPreset::Std140);
    assert_eq!(ApiFamily::OpenGL.default_packing(false), PackingPreset::Std430);
}

#[test]
fn rules_round_trip_through_json() {
    let rules = PackingPreset::D3DConstantBuffer.rules();
    let json = serde_json::to_string(&rules).unwrap();
    let back: PackingRules = serde_json::from_str(&json).unwrap();
    assert_eq!(back, rules);
}
