use std::path::PathBuf;

use layoutfmt_compiler::{Declarer, Diagnostics, ParseConfig, ParsedFormat, try_parse_format};
use layoutfmt_core::{PointerTypeRegistry, TypeNode, TypeRegistry, UNBOUNDED};

use super::input::load_format;

pub struct DeclareArgs {
    pub format_path: Option<PathBuf>,
    pub format_text: Option<String>,
    pub config: ParseConfig,
    pub name: Option<String>,
    pub color: bool,
}

pub fn run(args: DeclareArgs) {
    let source = match load_format(args.format_path.as_deref(), args.format_text.as_deref()) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    };

    let mut registry = TypeRegistry::new();
    let parsed = match try_parse_format(&source.text, &args.config, &mut registry) {
        Ok(parsed) => parsed,
        Err(diagnostic) => {
            let diagnostics = Diagnostics::from(diagnostic);
            let rendered = diagnostics
                .printer()
                .source(&source.text)
                .path(&source.origin)
                .colored(args.color)
                .render();
            eprint!("{}", rendered);
            std::process::exit(1);
        }
    };

    print!(
        "{}",
        declaration(parsed, &args.config, args.name.as_deref(), &registry)
    );
}

/// Canonical text for a parsed format.
///
/// A struct promoted to an implicit array is declared by its members, which
/// the parser promotes again. Any other repeating tail goes back to the end
/// of the member chain it was detached from as an unbounded array.
pub fn declaration(
    parsed: ParsedFormat,
    config: &ParseConfig,
    name: Option<&str>,
    registry: &dyn PointerTypeRegistry,
) -> String {
    let ParsedFormat {
        mut fixed,
        repeating,
        packing,
        ..
    } = parsed;
    let implicit = !config.is_cbuffer();

    let (root, stride) = match repeating {
        Some(element) if implicit && fixed.members.is_empty() && element.is_struct() => {
            let stride = element.array_byte_stride;
            (element, stride)
        }
        Some(tail) => {
            reattach(&mut fixed.members, tail);
            (fixed, 0)
        }
        None => {
            let stride = fixed.array_byte_stride;
            (fixed, stride)
        }
    };

    let name = match name {
        Some(name) => name,
        None if root.type_name.is_empty() => "Root",
        None => root.type_name.as_str(),
    };
    Declarer::new(packing, registry)
        .api(config.api_family())
        .declare(name, &root.members, stride)
}

/// Pushes `tail` onto the struct its dotted name points into.
pub(super) fn reattach(members: &mut Vec<TypeNode>, mut tail: TypeNode) {
    let path = std::mem::take(&mut tail.name);
    let (parents, leaf) = match path.rsplit_once('.') {
        Some((parents, leaf)) => (parents, leaf),
        None => ("", path.as_str()),
    };
    tail.name = leaf.to_string();
    tail.elements = UNBOUNDED;

    let mut target = members;
    for parent in parents.split('.').filter(|p| !p.is_empty()) {
        let descend = target
            .last()
            .is_some_and(|last| last.is_struct() && last.name == parent);
        if !descend {
            break;
        }
        let index = target.len() - 1;
        target = &mut target[index].members;
    }
    target.push(tail);
}
