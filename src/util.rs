//! A small diagnostic renderer for [crate::tlv::Tlv] trees.
//!
//! Mirrors the teacher's `PrettyPrinter` / `to_diag_string()` role (a compact textual dump used
//! for logging and error messages) without attempting to be a full presentation layer — that is
//! the excluded CLI collaborator's job. `render_tree` never fails: a leaf whose bytes don't
//! decode under its own `value_type` falls back to compact hex rather than erroring, since a
//! diagnostic dump must never itself panic or bubble a fresh error while reporting one.

use crate::tlv::{Tlv, TlvValue};
use crate::value::{self, FormatOptions};

/// Render a tree as one indented line per node: `type`, `length`, and a compact formatted value
/// (or `<N sub-tlvs>` for a compound node). Depth is expressed as two spaces of indent per level.
pub fn render_tree(tree: &[Tlv]) -> String {
    let mut out = String::new();
    for node in tree {
        render_node(node, 0, &mut out);
    }
    out
}

fn render_node(node: &Tlv, depth: usize, out: &mut String) {
    let indent = "  ".repeat(depth);
    match &node.value {
        TlvValue::Leaf(bytes) => {
            let text = value::format_value(&node.value_type, bytes, &FormatOptions::default())
                .map(|v| v.to_string())
                .unwrap_or_else(|_| hex::encode_upper(bytes));
            out.push_str(&format!(
                "{}type {} ({}), length {}: {}\n",
                indent,
                node.r#type,
                node.value_type.name(),
                node.length,
                text
            ));
        }
        TlvValue::Compound(children) => {
            out.push_str(&format!(
                "{}type {} (compound), length {}: {} sub-tlv{}\n",
                indent,
                node.r#type,
                node.length,
                children.len(),
                if children.len() == 1 { "" } else { "s" }
            ));
            for child in children {
                render_node(child, depth + 1, out);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::ValueType;

    #[test]
    fn renders_leaf_with_formatted_value() {
        let node = Tlv::leaf(1, vec![0x23, 0x39, 0xF1, 0xC0], ValueType::Frequency);
        let rendered = render_tree(&[node]);
        assert!(rendered.contains("type 1 (frequency), length 4: 591 MHz"));
    }

    #[test]
    fn renders_compound_with_indented_children() {
        let child = Tlv::leaf(1, vec![0x01], ValueType::Uint8);
        let node = Tlv::compound(24, vec![child]);
        let rendered = render_tree(&[node]);
        let mut lines = rendered.lines();
        assert!(lines.next().unwrap().starts_with("type 24 (compound)"));
        assert!(lines.next().unwrap().starts_with("  type 1 (uint8)"));
    }

    #[test]
    fn never_panics_on_malformed_leaf() {
        let node = Tlv::leaf(1, vec![0xAB], ValueType::Frequency);
        let rendered = render_tree(&[node]);
        assert!(rendered.contains("AB"));
    }
}
