//! Line-indexed diagnostics produced by the format parser.

mod message;
mod printer;

#[cfg(test)]
mod tests;

use std::collections::BTreeMap;

use serde::{Serialize, Serializer};

pub use message::{Diagnostic, DiagnosticKind};
pub use printer::DiagnosticsPrinter;

/// Ordered map from 0-based source line to the diagnostic reported there.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    messages: BTreeMap<u32, Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `diagnostic`. The first diagnostic on a line wins.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.messages.entry(diagnostic.line).or_insert(diagnostic);
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn has_errors(&self) -> bool {
        !self.is_empty()
    }

    pub fn get(&self, line: u32) -> Option<&Diagnostic> {
        self.messages.get(&line)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.messages.values()
    }

    /// Plain `line -> message` view, as editors consume it.
    pub fn line_messages(&self) -> BTreeMap<u32, String> {
        self.messages
            .iter()
            .map(|(line, diag)| (*line, diag.message.clone()))
            .collect()
    }

    pub fn printer(&self) -> DiagnosticsPrinter<'_, '_> {
        DiagnosticsPrinter::new(self)
    }
}

/// Serializes as the `line -> message` map.
impl Serialize for Diagnostics {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.messages.iter().map(|(line, diag)| (line, &diag.message)))
    }
}

impl From<Diagnostic> for Diagnostics {
    fn from(diagnostic: Diagnostic) -> Self {
        let mut diagnostics = Self::new();
        diagnostics.push(diagnostic);
        diagnostics
    }
}
