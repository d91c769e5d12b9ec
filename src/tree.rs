//! The structured (JSON/YAML-shaped) representation of a TLV tree and its serializers (C5).
//!
//! [`StructuredTlv`] is a `serde`-derived record mirroring the canonical structured form from
//! spec §4.5: `{type, length, value, formatted_value?, value_type?, subtlvs?}`. This crate stops
//! at producing/consuming this Rust value — turning it into actual JSON or YAML *text* is an
//! excluded outer collaborator's job (mirroring `kmip-ttlv`'s own "the high-level API is a serde
//! data format, not a text format" stance).

use serde::{Deserialize, Serialize};

use crate::error::{Error, ErrorLocation, ParseError, Result};
use crate::registry::SpecRegistry;
use crate::tlv::{DecodeOptions, EncodeOptions, Tlv, TlvValue};
use crate::value::{self, FormatOptions, FormattedValue, ValueType};

/// The canonical structured record for one TLV node, (de)serializable as JSON or YAML.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct StructuredTlv {
    pub r#type: u8,
    /// Advisory: on ingestion this is re-derived from the reconstructed bytes and never trusted.
    pub length: usize,
    /// Uppercase hex for a leaf; empty for a compound node (its content lives in `subtlvs`).
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formatted_value: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtlvs: Option<Vec<StructuredTlv>>,
}

/// Turn a parsed tree into its structured record form, formatting each leaf's value with default
/// format options. `subtlvs` preserves the original child insertion order (spec §9, open question
/// on sub-TLV ordering: insertion-order is mandated, any sorting is a separate pass this crate
/// does not perform).
pub fn emit_structured(tree: &[Tlv]) -> Vec<StructuredTlv> {
    tree.iter().map(emit_node).collect()
}

fn emit_node(node: &Tlv) -> StructuredTlv {
    match &node.value {
        TlvValue::Leaf(bytes) => {
            let formatted = value::format_value(&node.value_type, bytes, &FormatOptions::default())
                .ok()
                .map(formatted_value_to_json);
            StructuredTlv {
                r#type: node.r#type,
                length: node.length,
                value: hex::encode_upper(bytes),
                formatted_value: formatted,
                value_type: Some(node.value_type.name().to_string()),
                subtlvs: None,
            }
        }
        TlvValue::Compound(children) => StructuredTlv {
            r#type: node.r#type,
            length: node.length,
            value: String::new(),
            formatted_value: None,
            value_type: Some(ValueType::Compound.name().to_string()),
            subtlvs: Some(children.iter().map(emit_node).collect()),
        },
    }
}

fn formatted_value_to_json(v: FormattedValue) -> serde_json::Value {
    match v {
        FormattedValue::Text(s) => serde_json::Value::String(s),
        FormattedValue::Structured(obj) => obj,
    }
}

/// Reconstruct a tree from its structured record form. Bytes are rebuilt from the hex `value` for
/// leaves and from `subtlvs` for compound nodes; `length` on the input is advisory and is ignored
/// in favor of the reconstructed byte count (spec §4.5).
pub fn parse_structured(objects: &[StructuredTlv], registry: &SpecRegistry, opts: DecodeOptions) -> Result<Vec<Tlv>> {
    objects.iter().map(|o| parse_structured_node(o, registry, opts)).collect()
}

fn parse_structured_node(object: &StructuredTlv, registry: &SpecRegistry, opts: DecodeOptions) -> Result<Tlv> {
    if let Some(children_objs) = &object.subtlvs {
        let children = children_objs
            .iter()
            .map(|c| parse_structured_node(c, registry, opts))
            .collect::<Result<Vec<_>>>()?;
        return Ok(Tlv::compound(object.r#type, children));
    }

    let bytes = hex::decode(&object.value).map_err(|_| {
        Error::pinpoint(
            ParseError::MalformedLength,
            ErrorLocation::unknown().with_type(object.r#type),
        )
    })?;

    let declared_type = object
        .value_type
        .as_deref()
        .and_then(|name| lookup_value_type_by_name(registry, object.r#type, opts, name))
        .unwrap_or(ValueType::Unknown);
    let effective = declared_type.effective_for(&bytes);
    Ok(Tlv::leaf(object.r#type, bytes, effective))
}

/// The structured form only carries a `value_type` *name*; a real `ValueType` (with its enum map,
/// for `enum`/`enum<M,u>`) is recovered by re-consulting the registry for this node's type. This
/// keeps `StructuredTlv` a plain serde value instead of needing to serialize enum maps inline.
fn lookup_value_type_by_name(registry: &SpecRegistry, r#type: u8, opts: DecodeOptions, name: &str) -> Option<ValueType> {
    let entry = registry.lookup_tlv(r#type, opts.docsis_version)?;
    if entry.value_type.name() == name {
        Some(entry.value_type.clone())
    } else {
        None
    }
}

/// Re-encode a structured tree back to the binary wire format, via [`parse_structured`] then
/// [`crate::tlv::emit_binary`] — the reconstruction path spec §4.5 describes ("re-invokes the
/// encoder").
pub fn emit_structured_to_binary(
    objects: &[StructuredTlv],
    registry: &SpecRegistry,
    decode_opts: DecodeOptions,
    encode_opts: EncodeOptions,
) -> Result<Vec<u8>> {
    let tree = parse_structured(objects, registry, decode_opts)?;
    crate::tlv::emit_binary(&tree, encode_opts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Dialect, DocsisVersion};

    fn decode_opts() -> DecodeOptions {
        DecodeOptions {
            docsis_version: DocsisVersion::V3_1,
            dialect: Dialect::Extended,
        }
    }

    fn encode_opts() -> EncodeOptions {
        EncodeOptions {
            docsis_version: DocsisVersion::V3_1,
            dialect: Dialect::Extended,
        }
    }

    #[test]
    fn leaf_emits_hex_value_and_formatted_text() {
        let node = Tlv::leaf(1, vec![0x23, 0x39, 0xF1, 0xC0], ValueType::Frequency);
        let structured = emit_structured(&[node]);
        assert_eq!(structured[0].value, "2339F1C0");
        assert_eq!(
            structured[0].formatted_value,
            Some(serde_json::Value::String("591 MHz".to_string()))
        );
        assert_eq!(structured[0].value_type.as_deref(), Some("frequency"));
    }

    #[test]
    fn compound_preserves_subtlv_order() {
        let child_a = Tlv::leaf(1, vec![0x01], ValueType::Uint8);
        let child_b = Tlv::leaf(2, vec![0x02], ValueType::Uint8);
        let node = Tlv::compound(24, vec![child_a, child_b]);
        let structured = emit_structured(&[node]);
        let subtlvs = structured[0].subtlvs.as_ref().unwrap();
        assert_eq!(subtlvs[0].r#type, 1);
        assert_eq!(subtlvs[1].r#type, 2);
    }

    #[test]
    fn ingestion_ignores_advisory_length() {
        let registry = SpecRegistry::docsis();
        let object = StructuredTlv {
            r#type: 1,
            length: 999,
            value: "2339F1C0".to_string(),
            formatted_value: None,
            value_type: Some("frequency".to_string()),
            subtlvs: None,
        };
        let tree = parse_structured(&[object], &registry, decode_opts()).unwrap();
        assert_eq!(tree[0].length, 4);
    }

    #[test]
    fn structured_round_trips_through_binary() {
        let registry = SpecRegistry::docsis();
        let original = [0x01u8, 0x04, 0x23, 0x39, 0xF1, 0xC0];
        let tree = crate::tlv::parse_binary(&original, &registry, decode_opts()).unwrap();
        let structured = emit_structured(&tree);
        let bytes = emit_structured_to_binary(&structured, &registry, decode_opts(), encode_opts()).unwrap();
        assert_eq!(bytes, original);
    }
}
