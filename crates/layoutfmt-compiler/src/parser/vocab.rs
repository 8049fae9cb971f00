//! Built-in scalar, vector and matrix type keywords.

use layoutfmt_core::{BaseType, TypeFlags};

use crate::diagnostics::DiagnosticKind;

/// How a keyword accepts dimension suffixes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Suffix {
    /// HLSL style: `float`, `float4`, `float4x3` (rows x columns).
    Hlsl,
    /// Exact keyword only: `uint32_t`, `uintten`.
    None,
    /// GLSL vectors: `vec3`. A component count is required.
    GlslVec,
    /// GLSL matrices: `mat3` (square) or `mat2x3` (columns x rows).
    GlslMat,
}

struct Keyword {
    text: &'static str,
    base: BaseType,
    flags: TypeFlags,
    columns: u8,
    suffix: Suffix,
}

const fn kw(text: &'static str, base: BaseType, suffix: Suffix) -> Keyword {
    Keyword {
        text,
        base,
        flags: TypeFlags::empty(),
        columns: 1,
        suffix,
    }
}

const fn flagged(text: &'static str, base: BaseType, flags: TypeFlags, columns: u8, suffix: Suffix) -> Keyword {
    Keyword {
        text,
        base,
        flags,
        columns,
        suffix,
    }
}

const KEYWORDS: &[Keyword] = &[
    kw("bool", BaseType::Bool, Suffix::Hlsl),
    kw("byte", BaseType::SByte, Suffix::Hlsl),
    kw("char", BaseType::SByte, Suffix::Hlsl),
    kw("ubyte", BaseType::UByte, Suffix::Hlsl),
    kw("uchar", BaseType::UByte, Suffix::Hlsl),
    kw("short", BaseType::SShort, Suffix::Hlsl),
    kw("ushort", BaseType::UShort, Suffix::Hlsl),
    kw("int", BaseType::SInt, Suffix::Hlsl),
    kw("uint", BaseType::UInt, Suffix::Hlsl),
    kw("long", BaseType::SLong, Suffix::Hlsl),
    kw("ulong", BaseType::ULong, Suffix::Hlsl),
    kw("half", BaseType::Half, Suffix::Hlsl),
    kw("float", BaseType::Float, Suffix::Hlsl),
    kw("double", BaseType::Double, Suffix::Hlsl),
    flagged("xbyte", BaseType::UByte, TypeFlags::HEX, 1, Suffix::Hlsl),
    flagged("xshort", BaseType::UShort, TypeFlags::HEX, 1, Suffix::Hlsl),
    flagged("xint", BaseType::UInt, TypeFlags::HEX, 1, Suffix::Hlsl),
    flagged("xlong", BaseType::ULong, TypeFlags::HEX, 1, Suffix::Hlsl),
    flagged("unormh", BaseType::UShort, TypeFlags::UNORM, 1, Suffix::Hlsl),
    flagged("unormb", BaseType::UByte, TypeFlags::UNORM, 1, Suffix::Hlsl),
    flagged("snormh", BaseType::SShort, TypeFlags::SNORM, 1, Suffix::Hlsl),
    flagged("snormb", BaseType::SByte, TypeFlags::SNORM, 1, Suffix::Hlsl),
    flagged("uintten", BaseType::UInt, TypeFlags::R10G10B10A2, 4, Suffix::None),
    flagged(
        "unormten",
        BaseType::UInt,
        TypeFlags::R10G10B10A2.union(TypeFlags::UNORM),
        4,
        Suffix::None,
    ),
    flagged("floateleven", BaseType::Float, TypeFlags::R11G11B10, 3, Suffix::None),
    kw("int8_t", BaseType::SByte, Suffix::None),
    kw("uint8_t", BaseType::UByte, Suffix::None),
    kw("int16_t", BaseType::SShort, Suffix::None),
    kw("uint16_t", BaseType::UShort, Suffix::None),
    kw("int32_t", BaseType::SInt, Suffix::None),
    kw("uint32_t", BaseType::UInt, Suffix::None),
    kw("int64_t", BaseType::SLong, Suffix::None),
    kw("uint64_t", BaseType::ULong, Suffix::None),
    kw("float16_t", BaseType::Half, Suffix::None),
    kw("float32_t", BaseType::Float, Suffix::None),
    kw("float64_t", BaseType::Double, Suffix::None),
    kw("vec", BaseType::Float, Suffix::GlslVec),
    kw("ivec", BaseType::SInt, Suffix::GlslVec),
    kw("uvec", BaseType::UInt, Suffix::GlslVec),
    kw("bvec", BaseType::Bool, Suffix::GlslVec),
    kw("dvec", BaseType::Double, Suffix::GlslVec),
    kw("mat", BaseType::Float, Suffix::GlslMat),
    kw("imat", BaseType::SInt, Suffix::GlslMat),
    kw("umat", BaseType::UInt, Suffix::GlslMat),
    kw("dmat", BaseType::Double, Suffix::GlslMat),
];

/// A resolved built-in type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Builtin {
    pub base: BaseType,
    pub flags: TypeFlags,
    pub rows: u8,
    pub columns: u8,
}

/// Parses `N` or `NxM`. `Err` when the suffix is numeric but out of range.
fn dims(suffix: &str) -> Option<Result<(u8, Option<u8>), DiagnosticKind>> {
    let (first, second) = match suffix.split_once('x') {
        Some((a, b)) => (a, Some(b)),
        None => (suffix, None),
    };
    let parse = |s: &str| -> Option<u32> {
        (!s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()))
            .then(|| s.parse().ok())
            .flatten()
    };
    let first = parse(first)?;
    let second = match second {
        Some(s) => Some(parse(s)?),
        None => None,
    };
    let in_range = |n: u32| (1..=4).contains(&n);
    if !in_range(first) || second.is_some_and(|n| !in_range(n)) {
        return Some(Err(DiagnosticKind::InvalidDimensions));
    }
    Some(Ok((first as u8, second.map(|n| n as u8))))
}

fn resolve(keyword: &Keyword, suffix: &str) -> Option<Result<Builtin, DiagnosticKind>> {
    let builtin = |rows: u8, columns: u8| Builtin {
        base: keyword.base,
        flags: keyword.flags,
        rows,
        columns,
    };

    match keyword.suffix {
        Suffix::None => suffix
            .is_empty()
            .then(|| Ok(builtin(1, keyword.columns))),
        Suffix::Hlsl if suffix.is_empty() => Some(Ok(builtin(1, 1))),
        Suffix::Hlsl => Some(dims(suffix)?.map(|d| match d {
            (columns, None) => builtin(1, columns),
            (rows, Some(columns)) => builtin(rows, columns),
        })),
        Suffix::GlslVec => Some(dims(suffix)?.and_then(|d| match d {
            (columns, None) => Ok(builtin(1, columns)),
            _ => Err(DiagnosticKind::InvalidDimensions),
        })),
        Suffix::GlslMat => Some(dims(suffix)?.map(|d| match d {
            (n, None) => builtin(n, n),
            (columns, Some(rows)) => builtin(rows, columns),
        })),
    }
}

/// Looks up a built-in type keyword with its dimension suffix.
///
/// `None` when `ident` is not a built-in at all.
pub fn lookup(ident: &str) -> Option<Result<Builtin, DiagnosticKind>> {
    let mut candidates: Vec<&Keyword> = KEYWORDS
        .iter()
        .filter(|k| ident.starts_with(k.text))
        .collect();
    candidates.sort_by_key(|k| std::cmp::Reverse(k.text.len()));
    candidates
        .into_iter()
        .find_map(|k| resolve(k, &ident[k.text.len()..]))
}

/// All keywords, for suggestions.
pub fn keywords() -> impl Iterator<Item = &'static str> {
    KEYWORDS.iter().map(|k| k.text)
}

/// Flags a canonical keyword already expresses, so they need no annotation.
fn keyword_for(base: BaseType, flags: TypeFlags) -> (&'static str, TypeFlags) {
    if flags.contains(TypeFlags::R10G10B10A2) {
        return if flags.contains(TypeFlags::UNORM) {
            ("unormten", TypeFlags::R10G10B10A2 | TypeFlags::UNORM)
        } else {
            ("uintten", TypeFlags::R10G10B10A2)
        };
    }
    if flags.contains(TypeFlags::R11G11B10) {
        return ("floateleven", TypeFlags::R11G11B10);
    }
    match base {
        BaseType::UShort if flags.contains(TypeFlags::UNORM) => ("unormh", TypeFlags::UNORM),
        BaseType::UByte if flags.contains(TypeFlags::UNORM) => ("unormb", TypeFlags::UNORM),
        BaseType::SShort if flags.contains(TypeFlags::SNORM) => ("snormh", TypeFlags::SNORM),
        BaseType::SByte if flags.contains(TypeFlags::SNORM) => ("snormb", TypeFlags::SNORM),
        BaseType::UByte if flags.contains(TypeFlags::HEX) => ("xbyte", TypeFlags::HEX),
        BaseType::UShort if flags.contains(TypeFlags::HEX) => ("xshort", TypeFlags::HEX),
        BaseType::UInt if flags.contains(TypeFlags::HEX) => ("xint", TypeFlags::HEX),
        BaseType::ULong if flags.contains(TypeFlags::HEX) => ("xlong", TypeFlags::HEX),
        _ => (base.keyword(), TypeFlags::empty()),
    }
}

/// Canonical spelling of a built-in type, and the flags it leaves unexpressed.
pub fn canonical_name(base: BaseType, flags: TypeFlags, rows: u8, columns: u8) -> (String, TypeFlags) {
    let (keyword, covered) = keyword_for(base, flags);
    let name = if flags.intersects(TypeFlags::PACKED) {
        keyword.to_string()
    } else if rows > 1 {
        format!("{keyword}{rows}x{columns}")
    } else if columns > 1 {
        format!("{keyword}{columns}")
    } else {
        keyword.to_string()
    };
    (name, flags - covered)
}
