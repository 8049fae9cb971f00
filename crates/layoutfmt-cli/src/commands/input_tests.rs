use std::path::Path;

use layoutfmt_core::{ApiFamily, BaseType, OwnerId, PackingPreset, TypeRegistry};

use super::input::{InputError, load_format, parse_reflection};

#[test]
fn inline_text_wins_over_path() {
    let source = load_format(Some(Path::new("ignored.fmt")), Some("float a;")).unwrap();
    assert_eq!(source.text, "float a;");
    assert_eq!(source.origin, "<inline>");
}

#[test]
fn missing_input() {
    let err = load_format(None, None).unwrap_err();
    assert!(matches!(err, InputError::Missing));
    insta::assert_snapshot!(err, @"format is required: use a positional argument or -f/--format");
}

#[test]
fn unreadable_file() {
    let err = load_format(Some(Path::new("/nonexistent/layout.fmt")), None).unwrap_err();
    assert!(matches!(err, InputError::Read { .. }));
    assert!(
        err.to_string()
            .starts_with("failed to read '/nonexistent/layout.fmt': ")
    );
}

#[test]
fn reflection_members_fill_in_defaults() {
    let json = r#"[
        {"name": "a", "base": "Float", "array_byte_stride": 4},
        {"name": "b", "base": "Float", "columns": 3, "byte_offset": 16, "array_byte_stride": 12}
    ]"#;
    let members = parse_reflection(json, "members.json").unwrap();
    assert_eq!(members.len(), 2);
    assert_eq!(members[0].rows, 1);
    assert_eq!(members[0].elements, 1);
    assert_eq!(members[1].base, BaseType::Float);
    assert_eq!(members[1].columns, 3);

    let rules = layoutfmt_compiler::estimate(
        ApiFamily::OpenGL,
        OwnerId::GLOBAL,
        &members,
        &TypeRegistry::new(),
    );
    assert_eq!(rules, PackingPreset::Std140.rules());
}

#[test]
fn malformed_reflection() {
    let err = parse_reflection("{}", "members.json").unwrap_err();
    assert!(matches!(err, InputError::Json { .. }));
    assert!(
        err.to_string()
            .starts_with("invalid reflection JSON in 'members.json': ")
    );
}
