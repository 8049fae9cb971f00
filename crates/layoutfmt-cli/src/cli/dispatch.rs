//! Dispatch logic: extract params from ArgMatches and convert to command args.
//!
//! `*Params` structs mirror command `*Args` but are populated from clap.
//! The `Into<*Args>` impls build the library configuration for each command.

use std::path::PathBuf;

use clap::ArgMatches;
use layoutfmt_compiler::ParseConfig;
use layoutfmt_core::ApiFamily;

use super::ColorChoice;
use crate::commands::check::CheckArgs;
use crate::commands::declare::DeclareArgs;
use crate::commands::estimate::EstimateArgs;
use crate::commands::parse::ParseArgs;

pub struct CheckParams {
    pub format_path: Option<PathBuf>,
    pub format_text: Option<String>,
    pub api: ApiFamily,
    pub cbuffer: bool,
    pub max_len: u64,
    pub color: ColorChoice,
}

impl CheckParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            format_path: m.get_one::<PathBuf>("format_path").cloned(),
            format_text: m.get_one::<String>("format_text").cloned(),
            api: parse_api(m),
            cbuffer: m.get_flag("cbuffer"),
            max_len: parse_max_len(m),
            color: parse_color(m),
        }
    }
}

impl From<CheckParams> for CheckArgs {
    fn from(p: CheckParams) -> Self {
        Self {
            format_path: p.format_path,
            format_text: p.format_text,
            config: parse_config(p.api, p.cbuffer, p.max_len),
            color: p.color.should_colorize(),
        }
    }
}

pub struct ParseParams {
    pub format_path: Option<PathBuf>,
    pub format_text: Option<String>,
    pub api: ApiFamily,
    pub cbuffer: bool,
    pub max_len: u64,
    pub compact: bool,
}

impl ParseParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            format_path: m.get_one::<PathBuf>("format_path").cloned(),
            format_text: m.get_one::<String>("format_text").cloned(),
            api: parse_api(m),
            cbuffer: m.get_flag("cbuffer"),
            max_len: parse_max_len(m),
            compact: m.get_flag("compact"),
        }
    }
}

impl From<ParseParams> for ParseArgs {
    fn from(p: ParseParams) -> Self {
        Self {
            format_path: p.format_path,
            format_text: p.format_text,
            config: parse_config(p.api, p.cbuffer, p.max_len),
            compact: p.compact,
        }
    }
}

pub struct DeclareParams {
    pub format_path: Option<PathBuf>,
    pub format_text: Option<String>,
    pub api: ApiFamily,
    pub cbuffer: bool,
    pub max_len: u64,
    pub name: Option<String>,
    pub color: ColorChoice,
}

impl DeclareParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            format_path: m.get_one::<PathBuf>("format_path").cloned(),
            format_text: m.get_one::<String>("format_text").cloned(),
            api: parse_api(m),
            cbuffer: m.get_flag("cbuffer"),
            max_len: parse_max_len(m),
            name: m.get_one::<String>("name").cloned(),
            color: parse_color(m),
        }
    }
}

impl From<DeclareParams> for DeclareArgs {
    fn from(p: DeclareParams) -> Self {
        Self {
            format_path: p.format_path,
            format_text: p.format_text,
            config: parse_config(p.api, p.cbuffer, p.max_len),
            name: p.name,
            color: p.color.should_colorize(),
        }
    }
}

pub struct EstimateParams {
    pub reflection_path: PathBuf,
    pub api: ApiFamily,
    pub declare: bool,
    pub name: Option<String>,
}

impl EstimateParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            reflection_path: m
                .get_one::<PathBuf>("reflection_path")
                .cloned()
                .unwrap_or_else(|| PathBuf::from("-")),
            api: parse_api(m),
            declare: m.get_flag("declare"),
            name: m.get_one::<String>("name").cloned(),
        }
    }
}

impl From<EstimateParams> for EstimateArgs {
    fn from(p: EstimateParams) -> Self {
        Self {
            reflection_path: p.reflection_path,
            api: p.api,
            declare: p.declare,
            name: p.name,
        }
    }
}

fn parse_config(api: ApiFamily, cbuffer: bool, max_len: u64) -> ParseConfig {
    ParseConfig::new()
        .api(api)
        .cbuffer(cbuffer)
        .max_len_hint(max_len)
}

fn parse_api(m: &ArgMatches) -> ApiFamily {
    m.get_one::<ApiFamily>("api").copied().unwrap_or_default()
}

fn parse_max_len(m: &ArgMatches) -> u64 {
    m.get_one::<u64>("max_len").copied().unwrap_or(0)
}

fn parse_color(m: &ArgMatches) -> ColorChoice {
    match m.get_one::<String>("color").map(|s| s.as_str()) {
        Some("always") => ColorChoice::Always,
        Some("never") => ColorChoice::Never,
        _ => ColorChoice::Auto,
    }
}
