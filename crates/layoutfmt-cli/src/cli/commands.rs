//! Command builders for the CLI.
//!
//! Each command is built using the shared arg builders from `args.rs`.

use clap::Command;

use super::args::*;

/// Add the parse context args shared by every format-reading command.
fn with_parse_args(cmd: Command) -> Command {
    cmd.arg(format_path_arg())
        .arg(format_text_arg())
        .arg(api_arg())
        .arg(cbuffer_arg())
        .arg(max_len_arg())
}

/// Build the complete CLI with all subcommands.
pub fn build_cli() -> Command {
    Command::new("layoutfmt")
        .about("Parse, estimate and generate GPU buffer layout descriptions")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(verbose_arg())
        .subcommand(check_command())
        .subcommand(parse_command())
        .subcommand(declare_command())
        .subcommand(estimate_command())
}

/// Validate a format.
pub fn check_command() -> Command {
    let cmd = Command::new("check")
        .about("Validate a format")
        .override_usage(
            "\
  layoutfmt check <FORMAT>
  layoutfmt check -f <TEXT> [--api <API>] [--cbuffer]",
        )
        .after_help(
            r#"EXAMPLES:
  layoutfmt check particle.fmt               # structured buffer on D3D
  layoutfmt check cb.fmt --cbuffer           # constant buffer
  layoutfmt check -f 'float3 a[];' --api vk  # inline format"#,
        )
        .arg(color_arg());

    with_parse_args(cmd)
}

/// Parse a format and print the resolved layout as JSON.
pub fn parse_command() -> Command {
    let cmd = Command::new("parse")
        .about("Print the resolved layout as JSON")
        .override_usage(
            "\
  layoutfmt parse <FORMAT> [--compact]
  layoutfmt parse -f <TEXT> [--compact]",
        )
        .after_help(
            r#"EXAMPLES:
  layoutfmt parse particle.fmt               # pretty JSON
  layoutfmt parse -f 'uint a : 3;' --compact # one line"#,
        )
        .arg(compact_arg());

    with_parse_args(cmd)
}

/// Parse a format and print it back in canonical form.
pub fn declare_command() -> Command {
    let cmd = Command::new("declare")
        .about("Re-emit a format as canonical declarations")
        .override_usage(
            "\
  layoutfmt declare <FORMAT> [--name <NAME>]
  layoutfmt declare -f <TEXT> [--name <NAME>]",
        )
        .after_help(
            r#"EXAMPLES:
  layoutfmt declare particle.fmt
  layoutfmt declare -f 'float a; float3 b;' --api gl --cbuffer"#,
        )
        .arg(name_arg())
        .arg(color_arg());

    with_parse_args(cmd)
}

/// Estimate the packing of reflected members.
pub fn estimate_command() -> Command {
    Command::new("estimate")
        .about("Estimate packing rules for reflected members")
        .override_usage(
            "\
  layoutfmt estimate <REFLECTION> [--api <API>]
  layoutfmt estimate <REFLECTION> --declare [--name <NAME>]",
        )
        .after_help(
            r#"EXAMPLES:
  layoutfmt estimate members.json --api vk   # print the #pack header
  layoutfmt estimate - --declare < members.json"#,
        )
        .arg(reflection_path_arg())
        .arg(api_arg())
        .arg(declare_arg())
        .arg(name_arg())
}
