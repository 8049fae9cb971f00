//! Declaration generator: renders a type tree back into format text.
//!
//! Members are replayed through a [`LayoutCursor`] under the target rules and
//! only placements the cursor would not reproduce get an explicit
//! `[[offset(n)]]`, so a tree produced by the parser parses back unchanged.

use std::collections::{HashMap, HashSet};
use std::fmt::Write;

use layoutfmt_core::{
    ApiFamily, BaseType, EnumValue, LayoutCursor, OwnerId, PackingRules, PointerTypeRegistry,
    TypeFlags, TypeNode,
};

use crate::parser::vocab;

/// Body indentation.
const INDENT: &str = "    ";

pub struct Declarer<'r> {
    rules: PackingRules,
    api: ApiFamily,
    owner: OwnerId,
    registry: &'r dyn PointerTypeRegistry,
}

impl<'r> Declarer<'r> {
    pub fn new(rules: PackingRules, registry: &'r dyn PointerTypeRegistry) -> Self {
        Self {
            rules,
            api: ApiFamily::default(),
            owner: OwnerId::GLOBAL,
            registry,
        }
    }

    /// API the packing header is named for.
    pub fn api(mut self, api: ApiFamily) -> Self {
        self.api = api;
        self
    }

    /// Scope the members' pointer ids are interpreted in.
    pub fn owner(mut self, owner: OwnerId) -> Self {
        self.owner = owner;
        self
    }

    /// Renders `members` as struct `name`, preceded by the packing header and
    /// every struct and enum it depends on.
    ///
    /// A non-zero `required_stride` above the packed size is kept as `[[size(n)]]`.
    pub fn declare(&self, name: &str, members: &[TypeNode], required_stride: u32) -> String {
        let mut emitter = Emitter {
            rules: self.rules,
            registry: self.registry,
            blocks: Vec::new(),
            taken: HashSet::new(),
            assigned: HashMap::new(),
        };
        emitter.structure(name, self.owner, members, required_stride);

        let mut out = self.rules.describe(self.api);
        for block in &emitter.blocks {
            out.push('\n');
            out.push_str(block);
        }
        out
    }
}

/// Shorthand for `Declarer::new(rules, registry).api(api).owner(owner).declare(...)`.
pub fn declare(
    rules: PackingRules,
    api: ApiFamily,
    owner: OwnerId,
    name: &str,
    members: &[TypeNode],
    required_stride: u32,
    registry: &dyn PointerTypeRegistry,
) -> String {
    Declarer::new(rules, registry)
        .api(api)
        .owner(owner)
        .declare(name, members, required_stride)
}

/// Content a definition name is bound to. Pointer members compare by id.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
enum Shape {
    Struct { members: Vec<TypeNode>, stride: u32 },
    Enum { base: BaseType, values: Vec<EnumValue> },
}

struct Emitter<'r> {
    rules: PackingRules,
    registry: &'r dyn PointerTypeRegistry,
    /// Definition blocks, dependencies first.
    blocks: Vec<String>,
    taken: HashSet<String>,
    assigned: HashMap<(String, Shape), String>,
}

impl Emitter<'_> {
    /// Binds a name to `shape`. The flag is false when it was already bound.
    fn assign(&mut self, requested: &str, shape: Shape) -> (String, bool) {
        let requested = identifier(requested);
        let key = (requested, shape);
        if let Some(name) = self.assigned.get(&key) {
            return (name.clone(), false);
        }

        let name = if key.0.is_empty() {
            self.unique("anon", 0)
        } else if self.taken.contains(&key.0) {
            self.unique(&format!("{}_", key.0), 1)
        } else {
            key.0.clone()
        };
        self.taken.insert(name.clone());
        self.assigned.insert(key, name.clone());
        (name, true)
    }

    fn unique(&self, prefix: &str, first: u32) -> String {
        let mut n = first;
        loop {
            let candidate = format!("{prefix}{n}");
            if !self.taken.contains(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }

    fn structure(&mut self, requested: &str, owner: OwnerId, members: &[TypeNode], stride: u32) -> String {
        let shape = Shape::Struct {
            members: members.to_vec(),
            stride,
        };
        // Bound before the body so pointer cycles end here.
        let (name, new) = self.assign(requested, shape);
        if !new {
            return name;
        }

        let mut cursor = LayoutCursor::new();
        let mut body = String::new();
        for (index, member) in members.iter().enumerate() {
            self.member(&mut body, &mut cursor, owner, index, member);
        }

        let mut block = String::new();
        let packed = cursor.stride(self.rules);
        if stride > packed {
            let _ = writeln!(block, "[[size({stride})]]");
        } else if stride != 0 && stride < packed {
            tracing::warn!(name = %name, stride, packed, "stride is smaller than the packed struct");
        }
        let _ = writeln!(block, "struct {name}");
        block.push_str("{\n");
        block.push_str(&body);
        block.push_str("}\n");
        self.blocks.push(block);
        name
    }

    fn enumeration(&mut self, node: &TypeNode) -> String {
        let base = node.component_type();
        let shape = Shape::Enum {
            base,
            values: node.enum_values.clone(),
        };
        let (name, new) = self.assign(&node.type_name, shape);
        if !new {
            return name;
        }

        let mut block = format!("enum {name} : {}\n{{\n", base.keyword());
        for value in &node.enum_values {
            let _ = writeln!(block, "{INDENT}{} = {},", value.name, enum_literal(base, value.value));
        }
        block.push_str("}\n");
        self.blocks.push(block);
        name
    }

    fn member(
        &mut self,
        out: &mut String,
        cursor: &mut LayoutCursor,
        owner: OwnerId,
        index: usize,
        node: &TypeNode,
    ) {
        let name = if node.name.is_empty() {
            format!("_child{index}")
        } else {
            node.name.clone()
        };
        let (ty, mut annotations) = self.type_text(owner, node);

        if node.is_bitfield() {
            if let Some(offset) = self.bitfield_placement(out, cursor, node, &name) {
                annotations.insert(0, offset);
            }
        } else {
            let actual = node.byte_offset;
            if actual < cursor.size() {
                tracing::warn!(
                    member = %name,
                    offset = actual,
                    cursor = cursor.size(),
                    "member overlaps its predecessor"
                );
            }
            if cursor.next_offset(node, self.rules) != actual {
                annotations.insert(0, format!("offset({actual})"));
            }
            cursor.commit(actual, node, self.rules);
        }

        out.push_str(INDENT);
        for annotation in &annotations {
            let _ = write!(out, "[[{annotation}]] ");
        }
        let _ = write!(out, "{ty} {name}");
        if node.is_unbounded() {
            out.push_str("[]");
        } else if node.is_array() {
            let _ = write!(out, "[{}]", node.elements);
        }
        if node.is_bitfield() {
            let _ = write!(out, " : {}", node.bit_field_size);
        }
        out.push_str(";\n");
    }

    /// Replays a bit-field, writing skips for gaps. Returns the offset
    /// annotation when the member has to restart at an explicit byte.
    fn bitfield_placement(
        &self,
        out: &mut String,
        cursor: &mut LayoutCursor,
        node: &TypeNode,
        name: &str,
    ) -> Option<String> {
        let rules = self.rules;
        let width = node.component_size();
        let bits = node.bit_field_size as u32;
        let target = (node.byte_offset, node.bit_field_offset as u32);
        let storage = node.component_type().keyword();

        let mut annotation = None;
        if cursor.peek_bits(width, bits, rules) == target {
            // Packs naturally.
        } else if let Some(gap) = bit_gap(cursor, width, bits, target, rules) {
            let _ = writeln!(out, "{INDENT}{storage} : {gap};");
            cursor.skip_bits(width, gap, rules);
        } else {
            let (byte, bit) = target;
            if byte < cursor.size() {
                tracing::warn!(member = %name, offset = byte, "bit-field overlaps its predecessor");
            }
            cursor.restart_at(byte);
            if bit > 0 {
                let _ = writeln!(out, "{INDENT}[[offset({byte})]] {storage} : {bit};");
                cursor.skip_bits(width, bit, rules);
            } else {
                annotation = Some(format!("offset({byte})"));
            }
            if cursor.peek_bits(width, bits, rules) != target {
                tracing::warn!(member = %name, byte, bit, "bit-field position is not representable");
            }
        }
        cursor.place_bits(width, bits, rules);
        annotation
    }

    /// Type as written before the member name, plus its flag annotations.
    fn type_text(&mut self, owner: OwnerId, node: &TypeNode) -> (String, Vec<String>) {
        match node.base {
            BaseType::Struct => {
                let name = self.structure(&node.type_name, owner, &node.members, node.array_byte_stride);
                (name, Vec::new())
            }
            BaseType::Enum => (self.enumeration(node), display_annotations(node.flags)),
            BaseType::GpuPointer => {
                let registry = self.registry;
                match registry.pointee(owner, node) {
                    Some((_, pointee)) => {
                        let name = self.structure(
                            &pointee.type_name,
                            OwnerId::GLOBAL,
                            &pointee.members,
                            pointee.array_byte_stride,
                        );
                        (format!("{name}*"), Vec::new())
                    }
                    None => {
                        tracing::warn!(
                            member = %node.name,
                            id = ?node.pointer_type_id,
                            "unresolved pointer target, declaring as an address"
                        );
                        ("xlong".to_string(), Vec::new())
                    }
                }
            }
            _ => leaf_text(node),
        }
    }
}

fn leaf_text(node: &TypeNode) -> (String, Vec<String>) {
    let (name, uncovered) = vocab::canonical_name(node.base, node.flags, node.rows, node.columns);
    let mut annotations = Vec::new();
    if uncovered.contains(TypeFlags::RGB) {
        annotations.push("rgb".to_string());
    }
    if node.base.is_integer() {
        annotations.extend(display_annotations(uncovered));
        if uncovered.contains(TypeFlags::UNORM) {
            annotations.push("unorm".to_string());
        }
        if uncovered.contains(TypeFlags::SNORM) {
            annotations.push("snorm".to_string());
        }
    }
    if node.is_matrix() && uncovered.contains(TypeFlags::ROW_MAJOR) {
        annotations.push("row_major".to_string());
    }
    (name, annotations)
}

fn display_annotations(flags: TypeFlags) -> Vec<String> {
    let mut annotations = Vec::new();
    if flags.contains(TypeFlags::HEX) {
        annotations.push("hex".to_string());
    }
    if flags.contains(TypeFlags::BINARY) {
        annotations.push("bin".to_string());
    }
    annotations
}

/// Bits to skip so the next bit-field lands on `target` within the same
/// storage unit.
fn bit_gap(
    cursor: &LayoutCursor,
    width: u32,
    bits: u32,
    target: (u32, u32),
    rules: PackingRules,
) -> Option<u32> {
    let (byte, bit) = cursor.peek_bits(width, bits, rules);
    if byte != target.0 || bit >= target.1 {
        return None;
    }
    let gap = target.1 - bit;
    let mut probe = cursor.clone();
    probe.skip_bits(width, gap, rules);
    (probe.peek_bits(width, bits, rules) == target).then_some(gap)
}

/// Signed values are sign-extended from the base width.
fn enum_literal(base: BaseType, value: u64) -> String {
    if !base.is_signed() {
        return value.to_string();
    }
    let shift = 64 - base.byte_size() * 8;
    (((value << shift) as i64) >> shift).to_string()
}

/// Definition name usable in format text. `struct` counts as anonymous.
fn identifier(name: &str) -> String {
    if name == "struct" {
        return String::new();
    }
    let mut ident: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if ident.starts_with(|c: char| c.is_ascii_digit()) {
        ident.insert(0, '_');
    }
    ident
}
