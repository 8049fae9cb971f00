//! `[[name]]` / `[[name(param)]]` annotations preceding a declaration.

use crate::diagnostics::DiagnosticKind;

use super::lexer::TokenKind;
use super::stream::TokenStream;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AnnotationKind {
    Size,
    Single,
    Offset,
    Pad,
    Rgb,
    Hex,
    Bin,
    Unorm,
    Snorm,
    RowMajor,
    ColMajor,
    Packed,
}

impl AnnotationKind {
    pub fn from_name(name: &str) -> Option<Self> {
        let kind = match name.to_ascii_lowercase().as_str() {
            "size" | "byte_size" => Self::Size,
            "single" | "fixed" => Self::Single,
            "offset" | "byte_offset" => Self::Offset,
            "pad" | "padding" => Self::Pad,
            "rgb" => Self::Rgb,
            "hex" | "hexadecimal" => Self::Hex,
            "bin" | "binary" => Self::Bin,
            "unorm" => Self::Unorm,
            "snorm" => Self::Snorm,
            "row_major" => Self::RowMajor,
            "col_major" | "column_major" => Self::ColMajor,
            "packed" => Self::Packed,
            _ => return None,
        };
        Some(kind)
    }

    fn takes_param(self) -> bool {
        matches!(self, Self::Size | Self::Offset | Self::Packed)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Annotation {
    pub kind: AnnotationKind,
    /// Name as written, for messages.
    pub name: String,
    pub param: Option<String>,
}

impl Annotation {
    /// Parameter as a byte count: decimal or `0x` hex.
    pub fn number(&self) -> Result<u32, (DiagnosticKind, String)> {
        let param = self.param.as_deref().unwrap_or_default();
        parse_u64(param)
            .and_then(|n| u32::try_from(n).ok())
            .ok_or_else(|| {
                (
                    DiagnosticKind::InvalidAnnotationParameter,
                    format!("`{param}` is not a valid byte count for `[[{}]]`", self.name),
                )
            })
    }
}

/// Parses a non-negative decimal or `0x` hex literal.
pub fn parse_u64(text: &str) -> Option<u64> {
    let text = text.trim();
    match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16).ok(),
        None => text.parse().ok(),
    }
}

/// Strips leading annotations from `stream`.
pub fn strip(stream: &mut TokenStream<'_>) -> Result<Vec<Annotation>, (DiagnosticKind, String)> {
    let mut annotations = Vec::new();
    while stream.eat(TokenKind::AttrOpen).is_some() {
        let Some(name) = stream.eat(TokenKind::Ident) else {
            return Err((
                DiagnosticKind::UnrecognizedDeclaration,
                "expected annotation name after `[[`".to_string(),
            ));
        };
        let Some(kind) = AnnotationKind::from_name(name) else {
            return Err((DiagnosticKind::UnknownAnnotation, name.to_string()));
        };

        let param = if stream.eat(TokenKind::ParenOpen).is_some() {
            let Some(param) = stream.until(TokenKind::ParenClose) else {
                return Err((
                    DiagnosticKind::UnrecognizedDeclaration,
                    format!("missing `)` in `[[{name}(...)]]`"),
                ));
            };
            stream.bump();
            (!param.is_empty()).then(|| param.to_string())
        } else {
            None
        };

        if stream.eat(TokenKind::AttrClose).is_none() {
            return Err((
                DiagnosticKind::UnrecognizedDeclaration,
                format!("missing `]]` after `[[{name}`"),
            ));
        }

        match (kind.takes_param(), &param) {
            (true, None) => return Err((DiagnosticKind::MissingAnnotationParameter, name.to_string())),
            (false, Some(p)) => {
                return Err((
                    DiagnosticKind::InvalidAnnotationParameter,
                    format!("`[[{name}]]` takes no parameter, got `{p}`"),
                ));
            }
            _ => {}
        }

        annotations.push(Annotation {
            kind,
            name: name.to_string(),
            param,
        });
    }
    Ok(annotations)
}

/// Pending annotations awaiting the declaration that consumes them.
#[derive(Clone, Debug, Default)]
pub struct Pending {
    items: Vec<Annotation>,
}

impl Pending {
    pub fn extend(&mut self, annotations: Vec<Annotation>) {
        self.items.extend(annotations);
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Removes and returns every annotation of `kind`.
    pub fn take(&mut self, kind: AnnotationKind) -> Option<Annotation> {
        let index = self.items.iter().position(|a| a.kind == kind)?;
        let found = self.items.remove(index);
        self.items.retain(|a| a.kind != kind);
        Some(found)
    }

    pub fn take_flag(&mut self, kind: AnnotationKind) -> bool {
        self.take(kind).is_some()
    }

    /// First annotation left over after a declaration consumed what it accepts.
    pub fn leftover(&self) -> Option<&Annotation> {
        self.items.first()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}
