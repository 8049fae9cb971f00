use super::*;

#[test]
fn kind_messages() {
    insta::assert_snapshot!(DiagnosticKind::UnknownType.message(Some("flaot")), @"unknown type `flaot`");
    insta::assert_snapshot!(
        DiagnosticKind::OffsetRetreat.message(Some("4 is before 8")),
        @"explicit offset moves backwards: 4 is before 8"
    );
    insta::assert_snapshot!(DiagnosticKind::ArrayOfArrays.message(None), @"arrays of arrays are not supported");
}

#[test]
fn first_diagnostic_per_line_wins() {
    let mut diagnostics = Diagnostics::new();
    diagnostics.push(Diagnostic::new(DiagnosticKind::UnknownType, 2, 0..3).detail("a"));
    diagnostics.push(Diagnostic::new(DiagnosticKind::UnknownType, 2, 0..3).detail("b"));
    diagnostics.push(Diagnostic::new(DiagnosticKind::ArrayOfArrays, 0, 0..1));

    assert_eq!(diagnostics.len(), 2);
    assert!(diagnostics.has_errors());
    let lines = diagnostics.line_messages();
    assert_eq!(lines.keys().copied().collect::<Vec<_>>(), vec![0, 2]);
    assert_eq!(lines[&2], "unknown type `a`");
}

#[test]
fn display_is_one_based() {
    let diag = Diagnostic::new(DiagnosticKind::EmptyDefinition, 0, 0..1);
    insta::assert_snapshot!(diag.to_string(), @"line 1: definition has no members");
}

#[test]
fn default_hint_is_attached() {
    let diag = Diagnostic::new(DiagnosticKind::MissingSeparator, 0, 0..1);
    assert_eq!(
        diag.hint.as_deref(),
        Some("separate declarations with `;` or a newline")
    );
}

#[test]
fn render_plain_without_source() {
    let diagnostics = Diagnostics::from(
        Diagnostic::new(DiagnosticKind::UnknownType, 1, 9..14).detail("flaot"),
    );
    insta::assert_snapshot!(diagnostics.printer().render(), @"error: line 2: unknown type `flaot`");
}

#[test]
fn render_with_source() {
    let source = "float a;\nflaot b;\n";
    let diagnostics = Diagnostics::from(
        Diagnostic::new(DiagnosticKind::UnknownType, 1, 9..16)
            .detail("flaot")
            .hint("did you mean `float`?"),
    );
    let out = diagnostics.printer().source(source).path("format.txt").render();
    assert!(out.contains("unknown type `flaot`"));
    assert!(out.contains("format.txt"));
    assert!(out.contains("did you mean `float`?"));
}
