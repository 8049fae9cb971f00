use std::path::PathBuf;

use layoutfmt_compiler::{ParseConfig, parse_format};
use layoutfmt_core::TypeRegistry;

use super::input::load_format;

pub struct ParseArgs {
    pub format_path: Option<PathBuf>,
    pub format_text: Option<String>,
    pub config: ParseConfig,
    pub compact: bool,
}

/// Prints the parse result as JSON, including the fallback layout when the
/// format is invalid. Diagnostics travel inside the JSON.
pub fn run(args: ParseArgs) {
    let source = match load_format(args.format_path.as_deref(), args.format_text.as_deref()) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    };

    let parsed = parse_format(&source.text, &args.config, &mut TypeRegistry::new());
    let json = if args.compact {
        serde_json::to_string(&parsed)
    } else {
        serde_json::to_string_pretty(&parsed)
    };
    match json {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("error: failed to serialize layout: {}", e);
            std::process::exit(1);
        }
    }
}
