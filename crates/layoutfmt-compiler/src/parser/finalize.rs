//! End-of-input processing: root selection, implicit array promotion and
//! detaching the unbounded tail.

use layoutfmt_core::layout;
use layoutfmt_core::{BaseType, PackingRules, TypeFlags, TypeNode, UNBOUNDED};

use crate::diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};

use super::interpret::FormatParser;
use super::symbols::TypeDef;
use super::{ParseConfig, ParsedFormat, vocab};

impl FormatParser<'_> {
    /// Completes the parse. `None` when nothing usable was declared.
    pub fn finish(mut self) -> Result<Option<ParsedFormat>, Diagnostic> {
        if self.current.is_some() {
            self.close_def()?;
        }
        if let Some(index) = self.pending_def {
            let name = self.def(index).name().to_string();
            return Err(self
                .error(DiagnosticKind::EmptyDefinition)
                .detail(format!("`{name}` has no body")));
        }

        let rules = self.rules;
        let mut root = std::mem::replace(&mut self.root, TypeDef::structure("", 0));
        let mut stride = root.cursor.stride(rules);
        if root.node.members.is_empty()
            && let Some(index) = self.last_struct
        {
            let def = self.def(index);
            tracing::debug!(name = def.name(), "no root members, using last struct");
            root = def.clone();
            stride = def.node.array_byte_stride;
        }
        if root.node.members.is_empty() {
            return Ok(None);
        }

        if let Some(line) = self.single_line
            && root.node.members.len() != 1
        {
            return Err(self
                .error_at(DiagnosticKind::SingleMisuse, line)
                .detail("other members are declared at root"));
        }
        let single = self.single_line.is_some()
            || root.single
            || root.node.members.iter().any(|m| self.holds_single(m));

        if self.config().api_family().is_d3d() && root.has_unbounded() {
            let alone = matches!(root.node.members.as_slice(), [only] if only.is_unbounded());
            if !alone {
                let line = root.unbounded_line.unwrap_or(root.line);
                let diag = self.error_at(DiagnosticKind::UnboundedNotAlone, line);
                let other = root
                    .node
                    .members
                    .iter()
                    .zip(&root.member_lines)
                    .find(|(member, _)| !member.is_unbounded());
                return Err(match other {
                    Some((member, at)) if root.node.members.len() > 1 => diag.detail(format!(
                        "`{}` on line {} is also a root member",
                        member.name,
                        at + 1
                    )),
                    _ => diag,
                });
            }
        }

        if !self.config().is_cbuffer() && !single && !root.has_unbounded() {
            promote(&mut root.node, stride, rules);
        }

        let repeating = detach_unbounded(&mut root.node.members, "");
        let fixed_stride = match &repeating {
            Some((node, true)) => node.byte_offset,
            _ => stride,
        };
        let fixed = TypeNode::structure("", root.node.type_name, root.node.members, fixed_stride);
        let repeating = repeating.map(|(node, _)| node);

        tracing::debug!(
            members = fixed.members.len(),
            repeating = ?repeating.as_ref().map(|r| r.name.as_str()),
            "format parsed"
        );
        Ok(Some(ParsedFormat {
            fixed,
            repeating,
            packing: rules,
            diagnostics: Diagnostics::new(),
        }))
    }
}

impl FormatParser<'_> {
    /// Whether `node` is, or embeds, an instance of a `[[single]]` struct.
    fn holds_single(&self, node: &TypeNode) -> bool {
        if !node.is_struct() {
            return false;
        }
        let single = self
            .symbols
            .index_of(&node.type_name)
            .is_some_and(|index| self.def(index).single);
        single || node.members.iter().any(|m| self.holds_single(m))
    }
}

/// Turns the root into an implicit array of itself.
fn promote(root: &mut TypeNode, stride: u32, rules: PackingRules) {
    if let [member] = root.members.as_mut_slice()
        && !member.is_array()
        && !member.is_bitfield()
    {
        tracing::debug!(name = %member.name, "promoting sole member to an unbounded array");
        member.elements = UNBOUNDED;
        member.array_byte_stride = layout::array_stride(member, rules);
        return;
    }

    tracing::debug!("wrapping root members in an unbounded struct");
    let members = std::mem::take(&mut root.members);
    root.members.push(TypeNode {
        elements: UNBOUNDED,
        ..TypeNode::structure("", root.type_name.clone(), members, stride)
    });
}

/// Removes the unbounded node from the end of the last-member chain.
///
/// The node comes back with `elements = 1`, its name prefixed by the dotted
/// path of its ancestors, and whether it was a direct member of `members`.
fn detach_unbounded(members: &mut Vec<TypeNode>, prefix: &str) -> Option<(TypeNode, bool)> {
    let last = members.last_mut()?;
    if last.is_unbounded() {
        let mut node = members.pop()?;
        node.name = join_path(prefix, &node.name);
        node.elements = 1;
        return Some((node, true));
    }
    if last.is_struct() && !last.is_array() {
        let path = join_path(prefix, &last.name);
        return detach_unbounded(&mut last.members, &path).map(|(node, _)| (node, false));
    }
    None
}

fn join_path(prefix: &str, name: &str) -> String {
    match (prefix.is_empty(), name.is_empty()) {
        (true, _) => name.to_string(),
        (false, true) => prefix.to_string(),
        (false, false) => format!("{prefix}.{name}"),
    }
}

/// Opaque layout used when the format is unusable: a hex word array sized to the data.
pub(super) fn fallback(
    config: &ParseConfig,
    rules: PackingRules,
    diagnostics: Diagnostics,
) -> ParsedFormat {
    let (base, columns) = match config.len_hint() {
        1..=3 => (BaseType::UByte, 1),
        4..=15 => (BaseType::UInt, 1),
        _ => (BaseType::UInt, 4),
    };
    let mut data = TypeNode::leaf("data", base, 1, columns);
    data.flags = TypeFlags::HEX;
    data.array_byte_stride = layout::array_stride(&data, rules);
    data.type_name = vocab::canonical_name(base, data.flags, 1, columns).0;

    ParsedFormat {
        fixed: TypeNode::structure("", "", Vec::new(), 0),
        repeating: Some(data),
        packing: rules,
        diagnostics,
    }
}
