use std::path::PathBuf;

use layoutfmt_compiler::{ParseConfig, parse_format};
use layoutfmt_core::TypeRegistry;

use super::input::load_format;

pub struct CheckArgs {
    pub format_path: Option<PathBuf>,
    pub format_text: Option<String>,
    pub config: ParseConfig,
    pub color: bool,
}

pub fn run(args: CheckArgs) {
    let source = match load_format(args.format_path.as_deref(), args.format_text.as_deref()) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    };

    let parsed = parse_format(&source.text, &args.config, &mut TypeRegistry::new());
    if !parsed.is_valid() {
        let rendered = parsed
            .diagnostics
            .printer()
            .source(&source.text)
            .path(&source.origin)
            .colored(args.color)
            .render();
        eprint!("{}", rendered);
        std::process::exit(1);
    }

    // Silent on success (like cargo check)
}
