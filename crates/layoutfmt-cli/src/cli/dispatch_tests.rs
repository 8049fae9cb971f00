//! Tests for CLI dispatch logic.
//!
//! These tests verify:
//! 1. Params extraction: correct fields are extracted from ArgMatches
//! 2. Flag parsing: API names, lengths and conflicting inputs
//! 3. Params → Args conversion builds the parse configuration

use std::path::PathBuf;

use layoutfmt_compiler::ParseConfig;
use layoutfmt_core::ApiFamily;

use super::*;
use crate::cli::commands::{check_command, declare_command, estimate_command, parse_command};
use crate::commands::check::CheckArgs;
use crate::commands::parse::ParseArgs;

#[test]
fn check_defaults() {
    let m = check_command()
        .try_get_matches_from(["check", "layout.fmt"])
        .unwrap();
    let params = CheckParams::from_matches(&m);

    assert_eq!(params.format_path, Some(PathBuf::from("layout.fmt")));
    assert_eq!(params.format_text, None);
    assert_eq!(params.api, ApiFamily::D3D);
    assert!(!params.cbuffer);
    assert_eq!(params.max_len, 0);
    assert_eq!(params.color, ColorChoice::Auto);
}

#[test]
fn check_builds_parse_config() {
    let m = check_command()
        .try_get_matches_from([
            "check",
            "-f",
            "float a;",
            "--api",
            "vk",
            "--cbuffer",
            "--max-len",
            "12",
            "--color",
            "never",
        ])
        .unwrap();
    let args: CheckArgs = CheckParams::from_matches(&m).into();

    assert_eq!(args.format_text.as_deref(), Some("float a;"));
    assert_eq!(
        args.config,
        ParseConfig::new()
            .api(ApiFamily::Vulkan)
            .cbuffer(true)
            .max_len_hint(12)
    );
    assert!(!args.color);
}

#[test]
fn api_names_are_case_insensitive() {
    for (name, api) in [
        ("D3D12", ApiFamily::D3D),
        ("gl", ApiFamily::OpenGL),
        ("Vulkan", ApiFamily::Vulkan),
    ] {
        let m = parse_command()
            .try_get_matches_from(["parse", "x.fmt", "--api", name])
            .unwrap();
        assert_eq!(ParseParams::from_matches(&m).api, api, "{name}");
    }
}

#[test]
fn unknown_api_is_rejected() {
    let result = parse_command().try_get_matches_from(["parse", "x.fmt", "--api", "metal"]);
    let err = result.err().expect("metal is not an API family");
    assert!(err.to_string().contains("unknown API family 'metal'"));
}

#[test]
fn non_numeric_max_len_is_rejected() {
    let result = check_command().try_get_matches_from(["check", "x.fmt", "--max-len", "big"]);
    assert!(result.is_err());
}

#[test]
fn path_and_inline_text_conflict() {
    let result = declare_command().try_get_matches_from(["declare", "x.fmt", "-f", "float a;"]);
    assert!(result.is_err());
}

#[test]
fn parse_compact() {
    let m = parse_command()
        .try_get_matches_from(["parse", "-f", "uint a : 3;", "--compact"])
        .unwrap();
    let args: ParseArgs = ParseParams::from_matches(&m).into();
    assert!(args.compact);
    assert_eq!(args.config, ParseConfig::new());
}

#[test]
fn declare_name() {
    let m = declare_command()
        .try_get_matches_from(["declare", "x.fmt", "--name", "Light", "--color", "always"])
        .unwrap();
    let params = DeclareParams::from_matches(&m);
    assert_eq!(params.name.as_deref(), Some("Light"));
    assert_eq!(params.color, ColorChoice::Always);
}

#[test]
fn estimate_requires_reflection() {
    assert!(estimate_command().try_get_matches_from(["estimate"]).is_err());

    let m = estimate_command()
        .try_get_matches_from(["estimate", "-", "--api", "gl", "--declare"])
        .unwrap();
    let params = EstimateParams::from_matches(&m);
    assert_eq!(params.reflection_path, PathBuf::from("-"));
    assert_eq!(params.api, ApiFamily::OpenGL);
    assert!(params.declare);
    assert_eq!(params.name, None);
}

#[test]
fn verbosity_reaches_subcommands() {
    let m = build_cli()
        .try_get_matches_from(["layoutfmt", "check", "x.fmt", "-vv"])
        .unwrap();
    let (name, sub) = m.subcommand().unwrap();
    assert_eq!(name, "check");
    assert_eq!(sub.get_count("verbose"), 2);
}

#[test]
fn estimate_help_hides_format_flags() {
    let help = estimate_command().render_help().to_string();
    assert!(!help.contains("--cbuffer"));
    assert!(!help.contains("--max-len"));
    assert!(help.contains("--declare"));
}
