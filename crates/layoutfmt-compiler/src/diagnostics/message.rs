use std::ops::Range;

/// Every class of error the format parser reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum DiagnosticKind {
    // Lexical / grammar
    UnexpectedCharacter,
    UnrecognizedDeclaration,
    MissingSeparator,
    UnknownType,

    // Definitions
    DuplicateDefinition,
    NestedDefinition,
    EmptyDefinition,
    UnknownEnumBase,
    NonIntegerEnumBase,
    InvalidEnumValue,
    EnumValueOutOfRange,
    DuplicateEnumValue,

    // Member shape
    InvalidBitfield,
    InvalidDimensions,
    InvalidArraySize,
    ArrayOfArrays,
    InvalidModifier,
    MultiplePointerLevels,
    InvalidPointerTarget,
    InvalidPackedFormat,

    // Annotations
    UnknownAnnotation,
    MissingAnnotationParameter,
    InvalidAnnotationParameter,
    MisplacedAnnotation,
    SingleMisuse,

    // Placement
    OffsetRetreat,
    DeclaredSizeTooSmall,
    LayoutOverflow,

    // Unbounded arrays
    MultipleUnbounded,
    UnboundedNotLast,
    UnboundedInArray,
    UnboundedNotAlone,

    // Packing directives
    MisplacedPack,
    UnknownPackingRule,
}

impl DiagnosticKind {
    /// Default hint for this kind, automatically included in diagnostics.
    pub fn default_hint(&self) -> Option<&'static str> {
        match self {
            Self::MissingSeparator => Some("separate declarations with `;` or a newline"),
            Self::MisplacedPack => Some("move `#pack(...)` outside the struct or enum body"),
            Self::UnboundedNotAlone => {
                Some("on D3D, wrap the fixed members and the array element in a struct")
            }
            Self::OffsetRetreat => Some("members must be declared in increasing offset order"),
            Self::InvalidPointerTarget => Some("declare the pointee struct before using it"),
            _ => None,
        }
    }

    /// Base message for this diagnostic kind, used when no custom message is provided.
    pub fn fallback_message(&self) -> &'static str {
        match self {
            Self::UnexpectedCharacter => "unexpected character",
            Self::UnrecognizedDeclaration => "unrecognized declaration",
            Self::MissingSeparator => "unexpected tokens after declaration",
            Self::UnknownType => "unknown type",

            Self::DuplicateDefinition => "duplicate definition",
            Self::NestedDefinition => "nested struct and enum definitions are not supported",
            Self::EmptyDefinition => "definition has no members",
            Self::UnknownEnumBase => "unknown enum base type",
            Self::NonIntegerEnumBase => "enum base type must be an integer scalar",
            Self::InvalidEnumValue => "expected enum value `NAME = value`",
            Self::EnumValueOutOfRange => "enum value out of range",
            Self::DuplicateEnumValue => "duplicate enum value",

            Self::InvalidBitfield => "invalid bitfield",
            Self::InvalidDimensions => "vector and matrix dimensions must be between 1 and 4",
            Self::InvalidArraySize => "invalid array size",
            Self::ArrayOfArrays => "arrays of arrays are not supported",
            Self::InvalidModifier => "invalid type modifier",
            Self::MultiplePointerLevels => "only single-level pointers are supported",
            Self::InvalidPointerTarget => "pointers must point to a complete struct",
            Self::InvalidPackedFormat => "invalid packed format",

            Self::UnknownAnnotation => "unknown annotation",
            Self::MissingAnnotationParameter => "annotation requires a parameter",
            Self::InvalidAnnotationParameter => "invalid annotation parameter",
            Self::MisplacedAnnotation => "annotation is not valid here",
            Self::SingleMisuse => "`[[single]]` is only valid once, on the sole root member",

            Self::OffsetRetreat => "explicit offset moves backwards",
            Self::DeclaredSizeTooSmall => "declared size is smaller than the struct",
            Self::LayoutOverflow => "layout does not fit in a 32-bit byte range",

            Self::MultipleUnbounded => "only one unbounded array is allowed",
            Self::UnboundedNotLast => "an unbounded array must be the last member",
            Self::UnboundedInArray => "a struct containing an unbounded array cannot be arrayed",
            Self::UnboundedNotAlone => "on D3D an unbounded array must be the only root member",

            Self::MisplacedPack => "packing rules can only be set at global scope",
            Self::UnknownPackingRule => "unknown packing rule",
        }
    }

    /// Template for custom messages. Contains `{}` placeholder for caller-provided detail.
    pub fn custom_message(&self) -> String {
        match self {
            Self::UnknownType => "unknown type `{}`".to_string(),
            Self::DuplicateDefinition => "`{}` is already defined".to_string(),
            Self::UnknownEnumBase => "unknown enum base type `{}`".to_string(),
            Self::UnknownAnnotation => "unknown annotation `{}`".to_string(),
            Self::UnknownPackingRule => "unknown packing rule `{}`".to_string(),
            Self::DuplicateEnumValue => "enum value `{}` is already defined".to_string(),
            Self::MissingAnnotationParameter => "`[[{}]]` requires a parameter".to_string(),
            Self::UnexpectedCharacter => "unexpected character `{}`".to_string(),
            _ => format!("{}: {{}}", self.fallback_message()),
        }
    }

    /// Render the final message.
    ///
    /// - `None` → returns `fallback_message()`
    /// - `Some(detail)` → returns `custom_message()` with `{}` replaced by detail
    pub fn message(&self, msg: Option<&str>) -> String {
        match msg {
            None => self.fallback_message().to_string(),
            Some(detail) => self.custom_message().replace("{}", detail),
        }
    }
}

/// A single parse failure, anchored to the declaration that caused it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("line {}: {message}", .line + 1)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    /// 0-based source line of the offending declaration.
    pub line: u32,
    /// Byte range of the declaration in the `\r\n`-normalized source.
    pub span: Range<usize>,
    pub message: String,
    pub hint: Option<String>,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, line: u32, span: Range<usize>) -> Self {
        Self {
            kind,
            line,
            span,
            message: kind.fallback_message().to_string(),
            hint: kind.default_hint().map(str::to_string),
        }
    }

    /// Replace the message with the kind's template filled in with `detail`.
    pub fn detail(mut self, detail: impl AsRef<str>) -> Self {
        self.message = self.kind.message(Some(detail.as_ref()));
        self
    }

    pub fn hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}
