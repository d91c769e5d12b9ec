//! The TLV data model (spec §3) and binary wire codec (C4).
//!
//! A [`Tlv`] node is either a leaf (raw bytes, tagged with a [`ValueType`]) or compound (an
//! ordered list of child nodes); which one a given `type` is, at a given DOCSIS version, is
//! decided purely by consulting the [`SpecRegistry`] — never inferred from the bytes themselves
//! (spec §9, "Compound vs leaf decision").

use crate::error::{Error, ErrorLocation, GenerationError, ParseError, Result};
use crate::registry::SpecRegistry;
use crate::types::{ByteOffset, Dialect, DocsisVersion};
use crate::value::ValueType;

// --- data model -------------------------------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq)]
pub enum TlvValue {
    Leaf(Vec<u8>),
    Compound(Vec<Tlv>),
}

/// One node of a parsed TLV tree.
#[derive(Clone, Debug, PartialEq)]
pub struct Tlv {
    pub r#type: u8,
    /// The byte count actually consumed for this node's value, per spec §3 invariant 1 — always
    /// derived from `value`, never trusted from an external declaration.
    pub length: usize,
    pub value: TlvValue,
    /// Derived from `(parent_type_chain, type, docsis_version)` via the registry; `unknown` when
    /// the registry has no entry covering this type.
    pub value_type: ValueType,
}

impl Tlv {
    pub fn leaf(r#type: u8, bytes: Vec<u8>, value_type: ValueType) -> Self {
        Tlv {
            r#type,
            length: bytes.len(),
            value: TlvValue::Leaf(bytes),
            value_type,
        }
    }

    pub fn compound(r#type: u8, children: Vec<Tlv>) -> Self {
        let length = encoded_children_len(&children);
        Tlv {
            r#type,
            length,
            value: TlvValue::Compound(children),
            value_type: ValueType::Compound,
        }
    }

    pub fn is_compound(&self) -> bool {
        matches!(self.value, TlvValue::Compound(_))
    }

    pub fn as_leaf_bytes(&self) -> Option<&[u8]> {
        match &self.value {
            TlvValue::Leaf(b) => Some(b),
            TlvValue::Compound(_) => None,
        }
    }

    pub fn children(&self) -> Option<&[Tlv]> {
        match &self.value {
            TlvValue::Compound(c) => Some(c),
            TlvValue::Leaf(_) => None,
        }
    }
}

fn encoded_children_len(children: &[Tlv]) -> usize {
    // A node's own length never includes its type/length header, only the encoded value bytes;
    // for a compound node that is the concatenation of each child's own full (type+length+value)
    // encoding. Marker (type 255) and reserved (type 0) children are single bytes with no length
    // field of their own.
    children
        .iter()
        .map(|c| match c.r#type {
            255 => 1,
            0 => 1,
            _ => 1 + length_field_width_guess(c.length) + c.length,
        })
        .sum()
}

/// A conservative guess at how many bytes a length field would need, used only to size a
/// not-yet-encoded compound node's own `length` for display purposes; `emit_binary` recomputes
/// the true figure as it serializes, so this never has to be exact for round-tripping.
fn length_field_width_guess(len: usize) -> usize {
    if len < 0x80 {
        1
    } else {
        1 + minimal_be_bytes(len).len()
    }
}

// --- options ----------------------------------------------------------------------------------------------------

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DecodeOptions {
    pub docsis_version: DocsisVersion,
    pub dialect: Dialect,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        DecodeOptions {
            docsis_version: DocsisVersion::default(),
            dialect: Dialect::default(),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct EncodeOptions {
    pub docsis_version: DocsisVersion,
    pub dialect: Dialect,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        EncodeOptions {
            docsis_version: DocsisVersion::default(),
            dialect: Dialect::default(),
        }
    }
}

// --- decode -----------------------------------------------------------------------------------------------------

pub fn parse_binary(bytes: &[u8], registry: &SpecRegistry, opts: DecodeOptions) -> Result<Vec<Tlv>> {
    let mut parent_chain = Vec::new();
    decode_level(bytes, 0, registry, opts.docsis_version, opts.dialect, None, &mut parent_chain)
}

fn decode_level(
    data: &[u8],
    base_offset: usize,
    registry: &SpecRegistry,
    version: DocsisVersion,
    dialect: Dialect,
    parent_type: Option<u8>,
    parent_chain: &mut Vec<u8>,
) -> Result<Vec<Tlv>> {
    let mut out = Vec::new();
    let mut pos = 0;

    while pos < data.len() {
        let r#type = data[pos];

        if r#type == 255 {
            out.push(Tlv::leaf(255, Vec::new(), ValueType::Marker));
            break;
        }

        if r#type == 0 {
            match dialect {
                Dialect::Extended => {
                    pos += 1;
                    continue;
                }
                Dialect::Classic => {
                    return Err(Error::pinpoint(
                        ParseError::ReservedType(0),
                        ErrorLocation::at(ByteOffset::from(base_offset + pos))
                            .with_parent_types(parent_chain.as_slice())
                            .with_type(0),
                    ));
                }
            }
        }

        pos += 1;
        let (length, length_len) = read_length(&data[pos..], dialect).map_err(|e| {
            Error::pinpoint(
                e,
                ErrorLocation::at(ByteOffset::from(base_offset + pos))
                    .with_parent_types(parent_chain.as_slice())
                    .with_type(r#type),
            )
        })?;
        pos += length_len;

        if pos + length > data.len() {
            return Err(Error::pinpoint(
                ParseError::LengthOverrun {
                    declared: length,
                    remaining: data.len().saturating_sub(pos),
                },
                ErrorLocation::at(ByteOffset::from(base_offset + pos))
                    .with_parent_types(parent_chain.as_slice())
                    .with_type(r#type),
            ));
        }
        let value_bytes = &data[pos..pos + length];
        let value_start = base_offset + pos;
        pos += length;

        let entry = match parent_type {
            Some(parent) => registry.lookup_subtlv(parent, r#type),
            None => registry.lookup_tlv(r#type, version),
        };

        let node = match entry {
            Some(e) if e.is_compound => {
                tracing::trace!(tlv_type = r#type, parent = ?parent_type, "descending into compound TLV");
                parent_chain.push(r#type);
                let children = decode_level(
                    value_bytes,
                    value_start,
                    registry,
                    version,
                    dialect,
                    Some(r#type),
                    parent_chain,
                )?;
                parent_chain.pop();
                Tlv {
                    r#type,
                    length,
                    value: TlvValue::Compound(children),
                    value_type: ValueType::Compound,
                }
            }
            Some(e) => {
                let effective = e.value_type.effective_for(value_bytes);
                Tlv::leaf(r#type, value_bytes.to_vec(), effective)
            }
            None => {
                tracing::debug!(tlv_type = r#type, "no registry entry, tagging as unknown");
                Tlv::leaf(r#type, value_bytes.to_vec(), ValueType::Unknown)
            }
        };
        out.push(node);
    }

    Ok(out)
}

fn read_length(data: &[u8], dialect: Dialect) -> std::result::Result<(usize, usize), ParseError> {
    match dialect {
        Dialect::Classic => {
            let b = *data.first().ok_or(ParseError::Truncated { needed: 1, available: 0 })?;
            Ok((b as usize, 1))
        }
        Dialect::Extended => {
            let first = *data.first().ok_or(ParseError::Truncated { needed: 1, available: 0 })?;
            if first & 0x80 == 0 {
                return Ok((first as usize, 1));
            }
            let n = (first & 0x7F) as usize;
            if n == 0 || n > std::mem::size_of::<usize>() {
                return Err(ParseError::MalformedLength);
            }
            if data.len() < 1 + n {
                return Err(ParseError::Truncated {
                    needed: 1 + n,
                    available: data.len(),
                });
            }
            let mut len = 0usize;
            for i in 0..n {
                len = (len << 8) | data[1 + i] as usize;
            }
            Ok((len, 1 + n))
        }
    }
}

// --- encode -----------------------------------------------------------------------------------------------------

pub fn emit_binary(tree: &[Tlv], opts: EncodeOptions) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    for node in tree {
        encode_node(node, opts.dialect, &mut out)?;
    }
    Ok(out)
}

fn encode_node(node: &Tlv, dialect: Dialect, out: &mut Vec<u8>) -> Result<()> {
    if node.r#type == 255 || node.r#type == 0 {
        out.push(node.r#type);
        return Ok(());
    }

    let value_bytes = match &node.value {
        TlvValue::Leaf(bytes) => bytes.clone(),
        TlvValue::Compound(children) => {
            let mut buf = Vec::new();
            for c in children {
                encode_node(c, dialect, &mut buf)?;
            }
            buf
        }
    };

    out.push(node.r#type);
    write_length(value_bytes.len(), dialect, out)?;
    out.extend(value_bytes);
    Ok(())
}

fn write_length(len: usize, dialect: Dialect, out: &mut Vec<u8>) -> Result<()> {
    match dialect {
        Dialect::Classic => {
            if len > 255 {
                return Err(Error::pinpoint(
                    GenerationError::ExceedsMaxLength { length: len, max: 255 },
                    ErrorLocation::unknown(),
                ));
            }
            out.push(len as u8);
        }
        Dialect::Extended => {
            if len < 0x80 {
                out.push(len as u8);
            } else {
                let bytes = minimal_be_bytes(len);
                out.push(0x80 | bytes.len() as u8);
                out.extend(bytes);
            }
        }
    }
    Ok(())
}

fn minimal_be_bytes(mut len: usize) -> Vec<u8> {
    let mut bytes = Vec::new();
    while len > 0 {
        bytes.push((len & 0xFF) as u8);
        len >>= 8;
    }
    bytes.reverse();
    if bytes.is_empty() {
        bytes.push(0);
    }
    bytes
}
