//! Format text parser.
//!
//! # Architecture
//!
//! Parsing runs in three stages:
//! 1. `segment` splits the text into declarations and records their lines
//! 2. `lexer` tokenizes one declaration at a time
//! 3. `interpret` matches each declaration against the grammar forms, updating
//!    the symbol table and placing members through a `LayoutCursor`
//!
//! `finalize` then picks the root, applies implicit array promotion and
//! detaches the unbounded tail.
//!
//! Errors are fail-fast: the first one aborts the parse. [`parse_format`]
//! turns it into a single diagnostic plus an opaque fallback layout, while
//! [`try_parse_format`] hands it back to the caller.

mod annotations;
mod finalize;
mod interpret;
mod lexer;
mod segment;
mod stream;
mod symbols;
pub(crate) mod vocab;

#[cfg(test)]
mod interpret_tests;

use layoutfmt_core::{ApiFamily, PackingRules, PointerTypeRegistry, TypeNode};
use serde::Serialize;

use crate::diagnostics::{Diagnostic, Diagnostics};

pub use segment::{Declaration, segment};

/// Caller-side context for a parse.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ParseConfig {
    api: ApiFamily,
    cbuffer: bool,
    max_len_hint: u64,
}

impl ParseConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn api(mut self, api: ApiFamily) -> Self {
        self.api = api;
        self
    }

    /// The buffer is bound as a constant buffer: no implicit array promotion.
    pub fn cbuffer(mut self, cbuffer: bool) -> Self {
        self.cbuffer = cbuffer;
        self
    }

    /// Byte length of the data being viewed, used to size the fallback layout.
    pub fn max_len_hint(mut self, max_len_hint: u64) -> Self {
        self.max_len_hint = max_len_hint;
        self
    }

    pub fn api_family(&self) -> ApiFamily {
        self.api
    }

    pub fn is_cbuffer(&self) -> bool {
        self.cbuffer
    }

    pub fn len_hint(&self) -> u64 {
        self.max_len_hint
    }

    /// Rules in effect before any `#pack` directive.
    pub fn default_packing(&self) -> PackingRules {
        self.api.default_packing(self.cbuffer).rules()
    }
}

/// Parser output: the bounded layout plus the repeating tail.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ParsedFormat {
    /// Root struct holding every bounded member.
    pub fixed: TypeNode,
    /// The unbounded array element, detached from `fixed` with `elements = 1`.
    pub repeating: Option<TypeNode>,
    pub packing: PackingRules,
    pub diagnostics: Diagnostics,
}

impl ParsedFormat {
    pub fn is_valid(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Parses `text`, substituting an opaque layout on failure.
pub fn parse_format(
    text: &str,
    config: &ParseConfig,
    registry: &mut dyn PointerTypeRegistry,
) -> ParsedFormat {
    let (result, rules) = run(text, config, registry);
    match result {
        Ok(Some(parsed)) => parsed,
        Ok(None) => {
            tracing::warn!("format declares no members, using opaque fallback");
            finalize::fallback(config, rules, Diagnostics::new())
        }
        Err(diagnostic) => {
            tracing::warn!(
                line = diagnostic.line + 1,
                "{}, using opaque fallback",
                diagnostic.message
            );
            finalize::fallback(config, rules, diagnostic.into())
        }
    }
}

/// Parses `text`, returning the first error instead of falling back.
///
/// A format that declares nothing yields the same opaque layout as
/// [`parse_format`], with no diagnostics.
pub fn try_parse_format(
    text: &str,
    config: &ParseConfig,
    registry: &mut dyn PointerTypeRegistry,
) -> Result<ParsedFormat, Diagnostic> {
    let (result, rules) = run(text, config, registry);
    Ok(match result? {
        Some(parsed) => parsed,
        None => finalize::fallback(config, rules, Diagnostics::new()),
    })
}

/// Runs the parse, also returning the rules in effect when it stopped.
fn run(
    text: &str,
    config: &ParseConfig,
    registry: &mut dyn PointerTypeRegistry,
) -> (Result<Option<ParsedFormat>, Diagnostic>, PackingRules) {
    let source = text.replace("\r\n", "\n");
    let mut parser = interpret::FormatParser::new(config, registry);
    for decl in segment(&source) {
        if let Err(diagnostic) = parser.declaration(&decl) {
            return (Err(diagnostic), parser.rules());
        }
    }
    let rules = parser.rules();
    (parser.finish(), rules)
}
