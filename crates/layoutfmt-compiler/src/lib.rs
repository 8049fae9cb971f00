//! layoutfmt compiler: format text parser, packing estimator and declaration generator.
//!
//! This crate provides the three directions of the buffer-layout DSL:
//! - `parser` - format text to type tree
//! - `estimate` - reflected type tree to packing rules
//! - `declare` - type tree to canonical format text
//! - `buffer` - default format text for a bound resource
//! - `diagnostics` - error reporting

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod buffer;
pub mod declare;
pub mod diagnostics;
pub mod estimate;
pub mod parser;
pub mod utils;

#[cfg(test)]
pub mod test_utils;

#[cfg(test)]
mod estimate_tests;

pub use buffer::{ComponentType, ResourceDescriptor, ViewFormat, buffer_format_string};
pub use declare::{Declarer, declare};
pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics, DiagnosticsPrinter};
pub use estimate::{Estimator, estimate};
pub use parser::{ParseConfig, ParsedFormat, parse_format, try_parse_format};
