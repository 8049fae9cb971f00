//! Declaration interpreter: matches each declaration against the grammar
//! forms and places members as it goes.

use std::collections::BTreeMap;
use std::ops::Range;

use layoutfmt_core::layout;
use layoutfmt_core::{
    BaseType, EnumValue, PackingAxis, PackingPreset, PackingRules, PointerTypeRegistry, TypeFlags,
    TypeNode, UNBOUNDED,
};

use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::utils::find_similar;

use super::ParseConfig;
use super::annotations::{self, AnnotationKind, Pending, parse_u64};
use super::lexer::TokenKind;
use super::segment::Declaration;
use super::stream::TokenStream;
use super::symbols::{DefKind, SymbolTable, TypeDef};
use super::vocab::{self, Builtin};

/// Name given to members declared without one.
const DEFAULT_MEMBER_NAME: &str = "data";

/// Where a declaration lands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Scope {
    Root,
    Def(usize),
}

/// Surface syntax of a member line, before type resolution.
#[derive(Debug, Default)]
struct MemberSyntax<'s> {
    row_major: Option<bool>,
    signed: Option<bool>,
    rgb: bool,
    has_modifiers: bool,
    type_name: &'s str,
    stars: usize,
    name: Option<&'s str>,
    elements: Option<u32>,
    bits: Option<u32>,
}

pub(super) struct FormatParser<'a> {
    config: ParseConfig,
    registry: &'a mut dyn PointerTypeRegistry,
    pub(super) rules: PackingRules,
    pub(super) symbols: SymbolTable,
    pub(super) root: TypeDef,
    /// Definition declared but not yet opened by `{`.
    pub(super) pending_def: Option<usize>,
    pub(super) current: Option<usize>,
    annotations: Pending,
    /// Line of a `[[single]]` root member.
    pub(super) single_line: Option<u32>,
    pub(super) last_struct: Option<usize>,
    /// Position of the declaration being interpreted.
    pub(super) line: u32,
    pub(super) span: Range<usize>,
    /// Span of the first declaration on each line, for errors raised after the fact.
    spans: BTreeMap<u32, Range<usize>>,
}

impl<'a> FormatParser<'a> {
    pub fn new(config: &ParseConfig, registry: &'a mut dyn PointerTypeRegistry) -> Self {
        Self {
            config: *config,
            registry,
            rules: config.default_packing(),
            symbols: SymbolTable::new(),
            root: TypeDef::structure("", 0),
            pending_def: None,
            current: None,
            annotations: Pending::default(),
            single_line: None,
            last_struct: None,
            line: 0,
            span: 0..0,
            spans: BTreeMap::new(),
        }
    }

    pub fn rules(&self) -> PackingRules {
        self.rules
    }

    pub(super) fn config(&self) -> &ParseConfig {
        &self.config
    }

    pub(super) fn error(&self, kind: DiagnosticKind) -> Diagnostic {
        Diagnostic::new(kind, self.line, self.span.clone())
    }

    /// Error anchored to an earlier declaration.
    pub(super) fn error_at(&self, kind: DiagnosticKind, line: u32) -> Diagnostic {
        let span = self.spans.get(&line).cloned().unwrap_or(self.span.clone());
        Diagnostic::new(kind, line, span)
    }

    pub fn declaration(&mut self, decl: &Declaration<'_>) -> Result<(), Diagnostic> {
        self.line = decl.line;
        self.span = decl.span.clone();
        self.spans.entry(decl.line).or_insert_with(|| decl.span.clone());
        tracing::trace!(line = decl.line + 1, text = decl.text, "declaration");

        match decl.text {
            "{" => return self.open_brace(),
            "}" => return self.close_brace(),
            _ => {}
        }

        let mut stream = TokenStream::new(decl.text);
        if let Some(garbage) = stream.garbage() {
            return Err(self.error(DiagnosticKind::UnexpectedCharacter).detail(garbage));
        }

        let stripped =
            annotations::strip(&mut stream).map_err(|(kind, detail)| self.error(kind).detail(detail))?;
        self.annotations.extend(stripped);
        if stream.at_end() {
            return Ok(());
        }

        if stream.at(TokenKind::Hash) {
            self.pack_directive(&mut stream)?;
        } else if stream.at_word("struct") && stream.nth(1) == Some(TokenKind::Ident) {
            self.struct_declaration(&mut stream)?;
        } else if stream.at_word("enum") && stream.nth(1) == Some(TokenKind::Ident) {
            self.enum_declaration(&mut stream)?;
        } else if let Some(index) = self.current.filter(|&i| self.def(i).is_enum()) {
            self.enum_value(index, &mut stream)?;
        } else {
            self.member(&mut stream)?;
        }

        if let Some(leftover) = self.annotations.leftover() {
            let name = leftover.name.clone();
            return Err(self
                .error(DiagnosticKind::MisplacedAnnotation)
                .detail(format!("`[[{name}]]`")));
        }
        self.annotations.clear();
        Ok(())
    }

    pub(super) fn def(&self, index: usize) -> &TypeDef {
        match self.symbols.def(index) {
            Some(def) => def,
            None => &self.root,
        }
    }

    fn scope(&self) -> Scope {
        self.current.map_or(Scope::Root, Scope::Def)
    }

    fn scope_mut(&mut self, scope: Scope) -> &mut TypeDef {
        match scope {
            Scope::Def(index) => match self.symbols.def_mut(index) {
                Some(def) => def,
                None => &mut self.root,
            },
            Scope::Root => &mut self.root,
        }
    }

    fn open_brace(&mut self) -> Result<(), Diagnostic> {
        if self.current.is_some() {
            return Err(self.error(DiagnosticKind::NestedDefinition));
        }
        if let Some(index) = self.pending_def.take() {
            self.current = Some(index);
        }
        Ok(())
    }

    fn close_brace(&mut self) -> Result<(), Diagnostic> {
        if self.current.is_some() {
            self.close_def()?;
        }
        Ok(())
    }

    /// Finalizes the open definition: computes the struct stride and freezes it.
    pub(super) fn close_def(&mut self) -> Result<(), Diagnostic> {
        let Some(index) = self.current.take() else {
            return Ok(());
        };
        let rules = self.rules;
        let error = self.error(DiagnosticKind::EmptyDefinition);
        let def = self.scope_mut(Scope::Def(index));

        let empty = match def.kind {
            DefKind::Struct => def.node.members.is_empty(),
            DefKind::Enum { .. } => def.node.enum_values.is_empty(),
        };
        if empty {
            let name = def.name().to_string();
            return Err(error.detail(format!("`{name}` is empty")));
        }

        if def.kind == DefKind::Struct {
            let stride = def.cursor.stride(rules);
            let stride = match def.declared_size {
                Some(size) if size < stride => {
                    let name = def.name().to_string();
                    return Err(Diagnostic {
                        kind: DiagnosticKind::DeclaredSizeTooSmall,
                        ..error
                    }
                    .detail(format!("`{name}` needs {stride} bytes, declared {size}")));
                }
                Some(size) => size,
                None => stride,
            };
            def.node.array_byte_stride = stride;
            self.last_struct = Some(index);
        }

        let def = self.def(index);
        tracing::debug!(
            name = def.name(),
            stride = def.node.array_byte_stride,
            "definition closed"
        );
        if let Some(def) = self.symbols.def_mut(index) {
            def.finalized = true;
        }
        Ok(())
    }

    fn pack_directive(&mut self, stream: &mut TokenStream<'_>) -> Result<(), Diagnostic> {
        stream.bump();
        let well_formed = stream.at_word("pack")
            && stream.bump().is_some()
            && stream.eat(TokenKind::ParenOpen).is_some();
        let rule = if well_formed {
            stream.until(TokenKind::ParenClose)
        } else {
            None
        };
        let Some(rule) = rule else {
            return Err(self
                .error(DiagnosticKind::UnrecognizedDeclaration)
                .detail(stream.text()));
        };
        stream.bump();
        self.expect_end(stream)?;

        if self.current.is_some() {
            return Err(self.error(DiagnosticKind::MisplacedPack));
        }
        if let Some(annotation) = self.annotations.leftover() {
            let detail = format!("`[[{}]]` on `#pack`", annotation.name);
            return Err(self.error(DiagnosticKind::MisplacedAnnotation).detail(detail));
        }

        if let Some(preset) = PackingPreset::from_name(rule) {
            self.rules = preset.rules();
        } else if let Some((axis, value)) = PackingAxis::from_keyword(rule) {
            self.rules = self.rules.with(axis, value);
        } else {
            let candidates = PackingPreset::ALL
                .into_iter()
                .map(PackingPreset::name)
                .chain(PackingAxis::ALL.into_iter().map(PackingAxis::keyword));
            let diag = self.error(DiagnosticKind::UnknownPackingRule).detail(rule);
            return Err(match find_similar(rule, candidates, 3) {
                Some(similar) => diag.hint(format!("did you mean `{similar}`?")),
                None => diag,
            });
        }
        tracing::debug!(rule, rules = ?self.rules, "packing selected");
        Ok(())
    }

    fn check_new_definition(&self, name: &str) -> Result<(), Diagnostic> {
        if self.current.is_some() {
            return Err(self.error(DiagnosticKind::NestedDefinition));
        }
        if let Some(index) = self.pending_def {
            let name = self.def(index).name().to_string();
            return Err(self
                .error(DiagnosticKind::EmptyDefinition)
                .detail(format!("`{name}` has no body")));
        }
        if self.symbols.contains(name) {
            return Err(self.error(DiagnosticKind::DuplicateDefinition).detail(name));
        }
        Ok(())
    }

    fn struct_declaration(&mut self, stream: &mut TokenStream<'_>) -> Result<(), Diagnostic> {
        stream.bump();
        let name = stream.bump().unwrap_or_default();
        self.expect_end(stream)?;
        self.check_new_definition(name)?;

        let mut def = TypeDef::structure(name, self.line);
        def.single = self.annotations.take_flag(AnnotationKind::Single);
        if let Some(size) = self.annotations.take(AnnotationKind::Size) {
            let size = size.number().map_err(|(kind, detail)| self.error(kind).detail(detail))?;
            def.declared_size = Some(size);
        }

        self.pending_def = Some(self.symbols.insert(def));
        Ok(())
    }

    fn enum_declaration(&mut self, stream: &mut TokenStream<'_>) -> Result<(), Diagnostic> {
        stream.bump();
        let name = stream.bump().unwrap_or_default();
        if stream.eat(TokenKind::Colon).is_none() {
            return Err(self
                .error(DiagnosticKind::UnknownEnumBase)
                .hint(format!("declare the underlying type: `enum {name} : uint`")));
        }
        let Some(base_name) = stream.eat(TokenKind::Ident) else {
            return Err(self.error(DiagnosticKind::UnknownEnumBase).detail(stream.rest()));
        };
        self.expect_end(stream)?;
        self.check_new_definition(name)?;

        let base = match vocab::lookup(base_name) {
            Some(Ok(builtin)) if is_integer_scalar(&builtin) => builtin.base,
            Some(Ok(_)) => {
                return Err(self
                    .error(DiagnosticKind::NonIntegerEnumBase)
                    .detail(format!("`{base_name}`")));
            }
            Some(Err(_)) | None => {
                return Err(self.error(DiagnosticKind::UnknownEnumBase).detail(base_name));
            }
        };

        let mut def = TypeDef::enumeration(name, base, self.line);
        def.node.flags = self.display_flags(&[AnnotationKind::Hex, AnnotationKind::Bin]);

        self.pending_def = Some(self.symbols.insert(def));
        Ok(())
    }

    fn enum_value(&mut self, index: usize, stream: &mut TokenStream<'_>) -> Result<(), Diagnostic> {
        let Some(name) = stream.eat(TokenKind::Ident) else {
            return Err(self.error(DiagnosticKind::InvalidEnumValue).detail(stream.rest()));
        };
        let def = self.def(index);
        let DefKind::Enum { base } = def.kind else {
            return Ok(());
        };

        let value = if stream.eat(TokenKind::Equals).is_some() {
            let negative = stream.eat(TokenKind::Minus).is_some();
            let literal = stream.eat(TokenKind::Number).and_then(parse_u64);
            let Some(magnitude) = literal else {
                return Err(self.error(DiagnosticKind::InvalidEnumValue).detail(stream.text()));
            };
            self.expect_end(stream)?;
            enum_value_in_range(base, negative, magnitude).ok_or_else(|| {
                let sign = if negative { "-" } else { "" };
                self.error(DiagnosticKind::EnumValueOutOfRange)
                    .detail(format!("{sign}{magnitude} does not fit in `{}`", base.keyword()))
            })?
        } else {
            self.expect_end(stream)?;
            let next = def.next_enum_value();
            if !fits(base, next) {
                return Err(self
                    .error(DiagnosticKind::EnumValueOutOfRange)
                    .detail(format!("implicit value of `{name}` does not fit in `{}`", base.keyword())));
            }
            next
        };

        if def.node.enum_values.iter().any(|v| v.name == name) {
            return Err(self.error(DiagnosticKind::DuplicateEnumValue).detail(name));
        }

        let line = self.line;
        let def = self.scope_mut(Scope::Def(index));
        def.node.enum_values.push(EnumValue {
            name: name.to_string(),
            value,
        });
        def.member_lines.push(line);
        Ok(())
    }

    fn expect_end(&self, stream: &TokenStream<'_>) -> Result<(), Diagnostic> {
        if stream.at_end() {
            return Ok(());
        }
        Err(self
            .error(DiagnosticKind::MissingSeparator)
            .detail(format!("`{}`", stream.rest())))
    }

    fn member_syntax<'s>(&self, stream: &mut TokenStream<'s>) -> Result<MemberSyntax<'s>, Diagnostic> {
        let mut syntax = MemberSyntax::default();

        while stream.at(TokenKind::Ident) && stream.nth(1) == Some(TokenKind::Ident) {
            let modifier = stream.peek_text(0).unwrap_or_default();
            match modifier {
                "row_major" => syntax.row_major = Some(true),
                "column_major" | "col_major" => syntax.row_major = Some(false),
                "signed" => syntax.signed = Some(true),
                "unsigned" => syntax.signed = Some(false),
                "rgb" => syntax.rgb = true,
                _ => break,
            }
            syntax.has_modifiers = true;
            stream.bump();
        }

        let Some(type_name) = stream.eat(TokenKind::Ident) else {
            return Err(self
                .error(DiagnosticKind::UnrecognizedDeclaration)
                .detail(format!("`{}`", stream.text())));
        };
        syntax.type_name = type_name;

        while stream.eat(TokenKind::Star).is_some() {
            syntax.stars += 1;
        }
        syntax.name = stream.eat(TokenKind::Ident);

        if stream.eat(TokenKind::BracketOpen).is_some() {
            let elements = if stream.eat(TokenKind::BracketClose).is_some() {
                UNBOUNDED
            } else {
                let count = stream
                    .eat(TokenKind::Number)
                    .and_then(parse_u64)
                    .and_then(|n| u32::try_from(n).ok())
                    .filter(|&n| n > 0 && n != UNBOUNDED);
                match (count, stream.eat(TokenKind::BracketClose)) {
                    (Some(count), Some(_)) => count,
                    _ => {
                        return Err(self
                            .error(DiagnosticKind::InvalidArraySize)
                            .detail(format!("`{}`", stream.text())));
                    }
                }
            };
            syntax.elements = Some(elements);
            if stream.at(TokenKind::BracketOpen) || stream.at(TokenKind::AttrOpen) {
                return Err(self.error(DiagnosticKind::ArrayOfArrays));
            }
        }

        if stream.eat(TokenKind::Colon).is_some() {
            if let Some(bits) = stream.eat(TokenKind::Number) {
                let bits = parse_u64(bits)
                    .and_then(|n| u32::try_from(n).ok())
                    .filter(|&n| n > 0);
                let Some(bits) = bits else {
                    return Err(self
                        .error(DiagnosticKind::InvalidBitfield)
                        .detail("a bitfield needs at least one bit"));
                };
                syntax.bits = Some(bits);
            } else if stream.eat(TokenKind::Ident).is_none() {
                return Err(self
                    .error(DiagnosticKind::InvalidBitfield)
                    .detail("expected a bit count or semantic after `:`"));
            }
        }

        self.expect_end(stream)?;
        Ok(syntax)
    }

    fn member(&mut self, stream: &mut TokenStream<'_>) -> Result<(), Diagnostic> {
        let syntax = self.member_syntax(stream)?;

        if syntax.stars > 1 {
            return Err(self.error(DiagnosticKind::MultiplePointerLevels));
        }

        if syntax.name.is_none()
            && syntax.elements.is_none()
            && let Some(bits) = syntax.bits
        {
            return self.bitfield_skip(&syntax, bits);
        }

        let name = syntax.name.unwrap_or(DEFAULT_MEMBER_NAME);
        let node = match self.symbols.index_of(syntax.type_name) {
            Some(index) => self.defined_member(index, name, &syntax)?,
            None => self.builtin_member(name, &syntax)?,
        };
        let contains_unbounded = match self.symbols.index_of(syntax.type_name) {
            Some(index) => syntax.stars == 0 && self.def(index).has_unbounded(),
            None => false,
        };
        self.place(node, contains_unbounded)
    }

    fn defined_member(
        &mut self,
        index: usize,
        name: &str,
        syntax: &MemberSyntax<'_>,
    ) -> Result<TypeNode, Diagnostic> {
        let def = self.def(index).clone();
        let type_name = def.name().to_string();

        if syntax.has_modifiers {
            return Err(self
                .error(DiagnosticKind::InvalidModifier)
                .detail(format!("modifiers don't apply to `{type_name}`")));
        }

        if syntax.stars == 1 {
            return self.pointer_member(index, name, syntax);
        }

        if !def.finalized {
            return Err(self
                .error(DiagnosticKind::UnknownType)
                .detail(&type_name)
                .hint(format!("`{type_name}` cannot be used inside its own definition")));
        }

        if def.is_enum() {
            let mut node = def.node.clone();
            node.name = name.to_string();
            node.elements = syntax.elements.unwrap_or(1);
            node.flags |= self.display_flags(&[AnnotationKind::Hex, AnnotationKind::Bin]);
            if let Some(bits) = syntax.bits {
                self.check_bits(&node, bits)?;
                node.bit_field_size = bits as u16;
            }
            node.array_byte_stride = layout::array_stride(&node, self.rules);
            return Ok(node);
        }

        if syntax.bits.is_some() {
            return Err(self
                .error(DiagnosticKind::InvalidBitfield)
                .detail(format!("`{type_name}` is a struct")));
        }
        if syntax.elements.is_some() {
            if def.has_unbounded() {
                return Err(self.error(DiagnosticKind::UnboundedInArray).detail(&type_name));
            }
            if def.single {
                return Err(self
                    .error(DiagnosticKind::SingleMisuse)
                    .detail(format!("`{type_name}` is `[[single]]` and cannot be arrayed")));
            }
        }

        let mut node = def.node.clone();
        node.name = name.to_string();
        node.elements = syntax.elements.unwrap_or(1);
        Ok(node)
    }

    fn pointer_member(
        &mut self,
        index: usize,
        name: &str,
        syntax: &MemberSyntax<'_>,
    ) -> Result<TypeNode, Diagnostic> {
        let def = self.def(index).clone();
        let type_name = def.name().to_string();

        if def.is_enum() || !def.finalized {
            return Err(self.error(DiagnosticKind::InvalidPointerTarget).detail(format!("`{type_name}*`")));
        }
        if syntax.bits.is_some() {
            return Err(self
                .error(DiagnosticKind::InvalidBitfield)
                .detail("pointers cannot be bitfields"));
        }

        let id = match def.pointer_id {
            Some(id) => id,
            None => {
                let id = self.registry.register(&def.node);
                self.scope_mut(Scope::Def(index)).pointer_id = Some(id);
                id
            }
        };

        let mut node = TypeNode {
            name: name.to_string(),
            type_name,
            base: BaseType::GpuPointer,
            elements: syntax.elements.unwrap_or(1),
            flags: TypeFlags::HEX,
            pointer_type_id: Some(id.0),
            ..TypeNode::default()
        };
        node.array_byte_stride = layout::array_stride(&node, self.rules);
        Ok(node)
    }

    fn builtin_member(&mut self, name: &str, syntax: &MemberSyntax<'_>) -> Result<TypeNode, Diagnostic> {
        let builtin = match vocab::lookup(syntax.type_name) {
            Some(Ok(builtin)) => builtin,
            Some(Err(kind)) => return Err(self.error(kind).detail(format!("`{}`", syntax.type_name))),
            None => return Err(self.unknown_type(syntax.type_name)),
        };
        if syntax.stars > 0 {
            return Err(self
                .error(DiagnosticKind::InvalidPointerTarget)
                .detail(format!("`{}*`", syntax.type_name)));
        }

        let mut node = TypeNode::leaf(name, builtin.base, builtin.rows, builtin.columns);
        node.flags = builtin.flags;
        node.elements = syntax.elements.unwrap_or(1);

        if let Some(signed) = syntax.signed {
            let swapped = builtin
                .base
                .is_integer()
                .then(|| BaseType::integer(builtin.base.byte_size(), signed))
                .flatten();
            let Some(base) = swapped else {
                return Err(self
                    .error(DiagnosticKind::InvalidModifier)
                    .detail(format!("`{}` is not an integer type", syntax.type_name)));
            };
            node.base = base;
        }

        let row_major = match (
            self.annotations.take_flag(AnnotationKind::RowMajor),
            self.annotations.take_flag(AnnotationKind::ColMajor),
        ) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => syntax.row_major,
        };
        if row_major == Some(true) && node.is_matrix() {
            node.flags |= TypeFlags::ROW_MAJOR;
        }

        if syntax.rgb | self.annotations.take_flag(AnnotationKind::Rgb) {
            node.flags |= TypeFlags::RGB;
        }

        for (kind, flag) in [
            (AnnotationKind::Unorm, TypeFlags::UNORM),
            (AnnotationKind::Snorm, TypeFlags::SNORM),
        ] {
            if self.annotations.take_flag(kind) {
                self.require_integer(&node, kind)?;
                node.flags |= flag;
            }
        }
        let display = self.display_flags(&[AnnotationKind::Hex, AnnotationKind::Bin]);
        if !display.is_empty() {
            self.require_integer(&node, AnnotationKind::Hex)?;
            node.flags |= display;
        }

        if let Some(packed) = self.annotations.take(AnnotationKind::Packed) {
            let format = packed.param.as_deref().unwrap_or_default();
            node.flags |= self.packed_format(&builtin, &node, format)?;
        }

        if let Some(bits) = syntax.bits {
            self.check_bits(&node, bits)?;
            node.bit_field_size = bits as u16;
        }

        if node.is_matrix() {
            node.matrix_byte_stride =
                layout::matrix_stride(node.component_size(), node.vector_len(), self.rules);
        }
        node.array_byte_stride = layout::array_stride(&node, self.rules);

        let (type_name, _) = vocab::canonical_name(node.base, node.flags, node.rows, node.columns);
        node.type_name = type_name;
        Ok(node)
    }

    fn unknown_type(&self, name: &str) -> Diagnostic {
        let diag = self.error(DiagnosticKind::UnknownType).detail(name);
        let candidates = vocab::keywords()
            .map(|keyword| -> &str { keyword })
            .chain(self.symbols.names());
        match find_similar(name, candidates, 2) {
            Some(similar) => diag.hint(format!("did you mean `{similar}`?")),
            None => diag,
        }
    }

    /// Takes the display annotations among `kinds` as flags.
    fn display_flags(&mut self, kinds: &[AnnotationKind]) -> TypeFlags {
        let mut flags = TypeFlags::empty();
        for &kind in kinds {
            if self.annotations.take_flag(kind) {
                flags |= match kind {
                    AnnotationKind::Bin => TypeFlags::BINARY,
                    _ => TypeFlags::HEX,
                };
            }
        }
        flags
    }

    fn require_integer(&self, node: &TypeNode, kind: AnnotationKind) -> Result<(), Diagnostic> {
        if node.base.is_integer() {
            return Ok(());
        }
        Err(self
            .error(DiagnosticKind::MisplacedAnnotation)
            .detail(format!("`[[{kind:?}]]` needs an integer type").to_lowercase()))
    }

    fn packed_format(&self, builtin: &Builtin, node: &TypeNode, format: &str) -> Result<TypeFlags, Diagnostic> {
        let (flag, base, columns) = match format.to_ascii_lowercase().as_str() {
            "r10g10b10a2" => (TypeFlags::R10G10B10A2, BaseType::UInt, 4),
            "r11g11b10" => (TypeFlags::R11G11B10, BaseType::Float, 3),
            _ => {
                return Err(self
                    .error(DiagnosticKind::InvalidPackedFormat)
                    .detail(format!("`{format}`")));
            }
        };
        if node.base != base || builtin.rows != 1 || builtin.columns != columns {
            let expected = if base == BaseType::UInt { "uint4" } else { "float3" };
            return Err(self
                .error(DiagnosticKind::InvalidPackedFormat)
                .detail(format!("`{format}` applies to `{expected}`")));
        }
        Ok(flag)
    }

    fn check_bits(&self, node: &TypeNode, bits: u32) -> Result<(), Diagnostic> {
        let reason = if node.is_array() {
            Some("arrays cannot be bitfields".to_string())
        } else if node.columns > 1 || node.rows > 1 {
            Some("vectors and matrices cannot be bitfields".to_string())
        } else if node.is_packed() {
            Some("packed formats cannot be bitfields".to_string())
        } else if !is_bitfield_storage(node.component_type()) {
            Some(format!("`{}` is not an integer type", node.component_type().keyword()))
        } else if bits > node.component_size() * 8 {
            Some(format!(
                "{bits} bits don't fit in `{}`",
                node.component_type().keyword()
            ))
        } else {
            None
        };
        match reason {
            Some(reason) => Err(self.error(DiagnosticKind::InvalidBitfield).detail(reason)),
            None => Ok(()),
        }
    }

    fn explicit_offset(&mut self) -> Result<Option<u32>, Diagnostic> {
        let Some(annotation) = self.annotations.take(AnnotationKind::Offset) else {
            return Ok(None);
        };
        annotation
            .number()
            .map(Some)
            .map_err(|(kind, detail)| self.error(kind).detail(detail))
    }

    fn bitfield_skip(&mut self, syntax: &MemberSyntax<'_>, bits: u32) -> Result<(), Diagnostic> {
        let builtin = match vocab::lookup(syntax.type_name) {
            Some(Ok(builtin)) => builtin,
            Some(Err(kind)) => return Err(self.error(kind).detail(format!("`{}`", syntax.type_name))),
            None if self.symbols.contains(syntax.type_name) => {
                return Err(self
                    .error(DiagnosticKind::InvalidBitfield)
                    .detail(format!("`{}` cannot be a bitfield", syntax.type_name)));
            }
            None => return Err(self.unknown_type(syntax.type_name)),
        };
        let node = TypeNode::leaf("", builtin.base, builtin.rows, builtin.columns);
        self.check_bits(&node, bits)?;

        let offset = self.explicit_offset()?;
        let rules = self.rules;
        let scope = self.scope();
        let retreat = self.retreat_error(scope, offset);
        let overflow = self.overflow_error(syntax.type_name);
        let def = self.scope_mut(scope);
        if let Some(offset) = offset {
            if offset < def.cursor.size() {
                return Err(retreat);
            }
            def.cursor.restart_at(offset);
        }
        def.cursor.skip_bits(node.component_size(), bits, rules);
        if !def.cursor.in_range() {
            return Err(overflow);
        }
        Ok(())
    }

    fn overflow_error(&self, name: &str) -> Diagnostic {
        self.error(DiagnosticKind::LayoutOverflow).detail(format!(
            "`{name}` would end past byte {}",
            layout::MAX_EXTENT
        ))
    }

    fn retreat_error(&self, scope: Scope, offset: Option<u32>) -> Diagnostic {
        let current = match scope {
            Scope::Root => self.root.cursor.size(),
            Scope::Def(index) => self.def(index).cursor.size(),
        };
        self.error(DiagnosticKind::OffsetRetreat).detail(format!(
            "{} is before the current offset {current}",
            offset.unwrap_or_default()
        ))
    }

    /// Validates and places `node` in the current scope.
    fn place(&mut self, mut node: TypeNode, contains_unbounded: bool) -> Result<(), Diagnostic> {
        let scope = self.scope();
        let rules = self.rules;
        let line = self.line;

        if let Some(first) = self.scope_unbounded_line(scope) {
            let diag = if node.is_unbounded() || contains_unbounded {
                self.error(DiagnosticKind::MultipleUnbounded)
                    .detail(format!("the first is on line {}", first + 1))
            } else {
                self.error(DiagnosticKind::UnboundedNotLast)
                    .detail(format!("`{}` follows it", node.name))
            };
            return Err(diag);
        }

        let single = self.annotations.take_flag(AnnotationKind::Single);
        if single {
            if scope != Scope::Root || self.single_line.is_some() {
                return Err(self.error(DiagnosticKind::SingleMisuse));
            }
            if node.is_unbounded() {
                return Err(self
                    .error(DiagnosticKind::SingleMisuse)
                    .detail("an unbounded array is never a single instance"));
            }
        }
        let pad = self.annotations.take_flag(AnnotationKind::Pad);
        let offset = self.explicit_offset()?;
        let retreat = self.retreat_error(scope, offset);
        let overflow = self.overflow_error(&node.name);

        let def = self.scope_mut(scope);
        if node.is_bitfield() {
            if let Some(offset) = offset {
                if offset < def.cursor.size() {
                    return Err(retreat);
                }
                def.cursor.restart_at(offset);
            }
            let (byte, bit) =
                def.cursor
                    .place_bits(node.component_size(), node.bit_field_size as u32, rules);
            node.byte_offset = byte;
            node.bit_field_offset = bit as u16;
        } else {
            let at = match offset {
                Some(offset) if offset < def.cursor.size() => return Err(retreat),
                Some(offset) => offset,
                None => def.cursor.next_offset(&node, rules),
            };
            def.cursor.commit(at, &node, rules);
            node.byte_offset = at;
        }
        if !def.cursor.in_range() {
            return Err(overflow);
        }

        if pad {
            tracing::trace!(line = line + 1, name = %node.name, "padding member discarded");
            return Ok(());
        }

        let unbounded = node.is_unbounded() || contains_unbounded;
        if single {
            self.single_line = Some(line);
        }
        let def = self.scope_mut(scope);
        if unbounded {
            def.unbounded_line = Some(line);
        }
        def.node.members.push(node);
        def.member_lines.push(line);
        Ok(())
    }

    /// Line of the scope's member that is, or contains, the unbounded array.
    fn scope_unbounded_line(&self, scope: Scope) -> Option<u32> {
        let def = match scope {
            Scope::Root => &self.root,
            Scope::Def(index) => self.def(index),
        };
        def.unbounded_line
    }
}

/// Integers and 32-bit bools can hold bit-fields.
fn is_bitfield_storage(base: BaseType) -> bool {
    base.is_integer() || base == BaseType::Bool
}

fn is_integer_scalar(builtin: &Builtin) -> bool {
    builtin.base.is_integer()
        && builtin.rows == 1
        && builtin.columns == 1
        && !builtin.flags.intersects(TypeFlags::PACKED)
}

/// Whether an unsigned bit pattern is a valid value of `base`.
fn fits(base: BaseType, value: u64) -> bool {
    let bits = base.byte_size() * 8;
    if bits >= 64 {
        return true;
    }
    if base.is_signed() {
        let value = value as i64;
        let min = -(1i64 << (bits - 1));
        let max = (1i64 << (bits - 1)) - 1;
        (min..=max).contains(&value)
    } else {
        value < (1u64 << bits)
    }
}

/// Range-checks a literal and returns its two's-complement bit pattern.
fn enum_value_in_range(base: BaseType, negative: bool, magnitude: u64) -> Option<u64> {
    let bits = base.byte_size() * 8;
    if !negative {
        let limit = if base.is_signed() { bits - 1 } else { bits };
        return (limit >= 64 || magnitude < (1u64 << limit)).then_some(magnitude);
    }
    if !base.is_signed() {
        return None;
    }
    let limit = 1u64 << (bits - 1);
    (magnitude <= limit).then(|| magnitude.wrapping_neg())
}
