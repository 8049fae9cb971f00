//! Shared argument builders for CLI commands.
//!
//! Each function returns a `clap::Arg` that can be composed into commands.

use std::path::PathBuf;

use clap::{Arg, ArgAction, value_parser};
use layoutfmt_core::ApiFamily;

/// Format file (positional). `-` reads stdin.
pub fn format_path_arg() -> Arg {
    Arg::new("format_path")
        .value_name("FORMAT")
        .value_parser(value_parser!(PathBuf))
        .conflicts_with("format_text")
        .help("Format file ('-' for stdin)")
}

/// Inline format text (-f/--format).
pub fn format_text_arg() -> Arg {
    Arg::new("format_text")
        .short('f')
        .long("format")
        .value_name("TEXT")
        .help("Inline format text")
}

/// Reflection JSON file (positional). `-` reads stdin.
pub fn reflection_path_arg() -> Arg {
    Arg::new("reflection_path")
        .value_name("REFLECTION")
        .value_parser(value_parser!(PathBuf))
        .required(true)
        .help("JSON array of reflected members ('-' for stdin)")
}

/// Graphics API family (--api).
pub fn api_arg() -> Arg {
    Arg::new("api")
        .long("api")
        .value_name("API")
        .default_value("d3d")
        .value_parser(parse_api)
        .help("API family the layout is interpreted for (d3d, gl, vk)")
}

/// Constant buffer binding (--cbuffer).
pub fn cbuffer_arg() -> Arg {
    Arg::new("cbuffer")
        .long("cbuffer")
        .action(ArgAction::SetTrue)
        .help("Treat the buffer as a constant buffer (no implicit array)")
}

/// Byte length of the viewed data (--max-len).
pub fn max_len_arg() -> Arg {
    Arg::new("max_len")
        .long("max-len")
        .value_name("BYTES")
        .default_value("0")
        .value_parser(value_parser!(u64))
        .help("Length of the viewed data, sizes the fallback layout")
}

/// Root struct name for generated declarations (--name).
pub fn name_arg() -> Arg {
    Arg::new("name")
        .long("name")
        .value_name("NAME")
        .help("Name of the generated root struct")
}

/// Color output control (--color).
pub fn color_arg() -> Arg {
    Arg::new("color")
        .long("color")
        .value_name("WHEN")
        .default_value("auto")
        .value_parser(["auto", "always", "never"])
        .help("Colorize output")
}

/// Compact JSON output (--compact).
pub fn compact_arg() -> Arg {
    Arg::new("compact")
        .long("compact")
        .action(ArgAction::SetTrue)
        .help("Output compact JSON")
}

/// Also print the declaration (--declare).
pub fn declare_arg() -> Arg {
    Arg::new("declare")
        .long("declare")
        .action(ArgAction::SetTrue)
        .help("Also print a declaration using the estimated packing")
}

/// Log verbosity (-v, -vv).
pub fn verbose_arg() -> Arg {
    Arg::new("verbose")
        .short('v')
        .global(true)
        .action(ArgAction::Count)
        .help("Verbosity level (-v for debug logs, -vv for trace logs)")
}

fn parse_api(name: &str) -> Result<ApiFamily, String> {
    ApiFamily::from_name(name).ok_or_else(|| format!("unknown API family '{name}'"))
}
