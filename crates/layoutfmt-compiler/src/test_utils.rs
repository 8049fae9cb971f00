//! Test utilities and snapshot macros.

use std::fmt::Write;

use layoutfmt_core::{ApiFamily, TypeRegistry};

use crate::parser::{ParseConfig, ParsedFormat, parse_format, try_parse_format};

/// Parses with a throwaway registry.
pub fn parse(text: &str, config: &ParseConfig) -> ParsedFormat {
    parse_format(text, config, &mut TypeRegistry::new())
}

/// Parses as a D3D structured buffer, panicking on any diagnostic.
pub fn expect_valid(text: &str) -> ParsedFormat {
    let config = ParseConfig::new();
    match try_parse_format(text, &config, &mut TypeRegistry::new()) {
        Ok(parsed) => parsed,
        Err(diagnostic) => panic!("expected a valid format, got {diagnostic}"),
    }
}

/// Parses as a D3D structured buffer, expecting exactly one diagnostic.
pub fn expect_invalid(text: &str) -> String {
    let config = ParseConfig::new();
    match try_parse_format(text, &config, &mut TypeRegistry::new()) {
        Ok(parsed) => panic!("expected an error, got:\n{}", dump(&parsed, ApiFamily::D3D)),
        Err(diagnostic) => diagnostic.to_string(),
    }
}

/// Packing preset, the fixed tree and the repeating element.
pub fn dump(parsed: &ParsedFormat, api: ApiFamily) -> String {
    let mut out = String::new();
    let packing = parsed.packing.preset_name(api).unwrap_or("custom");
    let _ = writeln!(out, "packing: {packing}");
    out.push_str(&parsed.fixed.to_string());
    if let Some(repeating) = &parsed.repeating {
        out.push_str("repeating:\n");
        out.push_str(&repeating.to_string());
    }
    for diagnostic in parsed.diagnostics.iter() {
        let _ = writeln!(out, "error: {diagnostic}");
    }
    out
}

/// Snapshot of a valid parse as a D3D structured buffer.
#[macro_export]
macro_rules! shot_parse {
    ($text:literal, @$snapshot:literal) => {{
        let text = indoc::indoc!($text);
        let parsed = $crate::test_utils::expect_valid(text);
        let output = $crate::test_utils::dump(&parsed, layoutfmt_core::ApiFamily::D3D);
        insta::assert_snapshot!(output, @$snapshot);
    }};
}

/// Snapshot of the diagnostic for an invalid format.
#[macro_export]
macro_rules! shot_error {
    ($text:literal, @$snapshot:literal) => {{
        let text = indoc::indoc!($text);
        let output = $crate::test_utils::expect_invalid(text);
        insta::assert_snapshot!(output, @$snapshot);
    }};
}
