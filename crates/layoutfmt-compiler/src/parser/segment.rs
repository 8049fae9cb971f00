//! Splits format text into declarations.
//!
//! Declarations end at `;`, `,` or a newline outside comments. Braces are
//! declarations of their own so `struct S { float a; }` fits on one line.

use std::ops::Range;

/// One declaration, trimmed, with its position in the normalized source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration<'s> {
    pub text: &'s str,
    /// 0-based line of the declaration's first character.
    pub line: u32,
    pub span: Range<usize>,
}

pub fn segment(source: &str) -> Vec<Declaration<'_>> {
    let bytes = source.as_bytes();
    let mut decls = Vec::new();
    let mut start: Option<(usize, u32)> = None;
    let mut line = 0u32;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'/' if bytes.get(i + 1) == Some(&b'/') => {
                flush(source, &mut start, i, &mut decls);
                while i < bytes.len() && bytes[i] != b'\n' {
                    i += 1;
                }
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                let body_start = i + 2;
                let end = source[body_start..]
                    .find("*/")
                    .map_or(bytes.len(), |pos| body_start + pos + 2);
                line += source[i..end].matches('\n').count() as u32;
                i = end;
            }
            b';' | b',' | b'\n' => {
                flush(source, &mut start, i, &mut decls);
                if bytes[i] == b'\n' {
                    line += 1;
                }
                i += 1;
            }
            b'{' | b'}' => {
                flush(source, &mut start, i, &mut decls);
                decls.push(Declaration {
                    text: &source[i..i + 1],
                    line,
                    span: i..i + 1,
                });
                i += 1;
            }
            b if b.is_ascii_whitespace() => i += 1,
            _ => {
                if start.is_none() {
                    start = Some((i, line));
                }
                i += 1;
            }
        }
    }
    flush(source, &mut start, bytes.len(), &mut decls);

    decls
}

fn flush<'s>(
    source: &'s str,
    start: &mut Option<(usize, u32)>,
    end: usize,
    decls: &mut Vec<Declaration<'s>>,
) {
    if let Some((begin, line)) = start.take() {
        let text = source[begin..end].trim_end();
        if !text.is_empty() {
            decls.push(Declaration {
                text,
                line,
                span: begin..begin + text.len(),
            });
        }
    }
}
