//! A crate to decode, encode, and validate DOCSIS / PacketCable MTA
//! configuration files: a recursive, length-prefixed TLV (Type-Length-Value)
//! wire format used to provision cable modems and embedded multimedia
//! terminal adapters.
//!
//! This is the detailed API documentation. For the wire format itself see
//! [tlv]; for the typed value codec see [value]; for validation see
//! [validator].
//!
//! Note that this crate only (de)serializes and validates TLV trees — it
//! does **not** generate Message Integrity Checks, talk to a modem over
//! SNMP, or read/write files. Those are the job of a surrounding CLI or
//! provisioning-system collaborator.
//!
//! # Usage
//!
//! ```toml
//! [dependencies]
//! docsis-tlv = "0.1"
//! ```
//!
//! ```
//! use docsis_tlv::{parse_binary, emit_binary, DecodeOptions, EncodeOptions, SpecRegistry};
//!
//! let registry = SpecRegistry::docsis();
//! let opts = DecodeOptions::default();
//! let bytes = [0x01, 0x04, 0x23, 0x39, 0xF1, 0xC0];
//! let tree = parse_binary(&bytes, &registry, opts).unwrap();
//! assert_eq!(tree[0].r#type, 1);
//!
//! let round_tripped = emit_binary(&tree, EncodeOptions::default()).unwrap();
//! assert_eq!(round_tripped, bytes);
//! ```
//!
//! # TLV format
//!
//! Each node in the tree is a Type-Length-Value triple: a 1-byte `type`, a
//! length field (1 byte in the classic DOCSIS dialect, variable-width in
//! the extended PacketCable/DOCSIS-3.1+ dialect — see [types::Dialect]),
//! and `length` bytes of value. A compound TLV's value is itself a
//! sequence of sub-TLVs; whether a given `type` is compound or a leaf is
//! never inferred from its bytes, only from the [registry::SpecRegistry]
//! (see [tlv] for the recursive decoder/encoder).
//!
//! Leaf values carry a semantic [value::ValueType] — a frequency, an IP
//! address, a MAC address, a vendor OUI, an embedded ASN.1 DER blob, and so
//! on — resolved from the registry at decode time and used by [value] to
//! format bytes as human text (or parse text back to bytes).
//!
//! # DOCSIS versions
//!
//! `1.0`, `1.1`, `2.0`, `3.0`, `3.1`, `4.0` are recognized
//! ([types::DocsisVersion]); the default is `3.1`. A TLV type's
//! admissibility, value type, and sub-TLV schema are all looked up scoped
//! to the version in effect for a given decode/validate call.
//!
//! # Error handling
//!
//! Every fallible operation in this crate returns `Result<T, error::Error>`
//! rather than panicking. An [error::Error] carries both an
//! [error::ErrorKind] (what went wrong) and an [error::ErrorLocation] (a
//! byte offset and the ancestor TLV-type chain leading to the fault), so
//! callers can report exactly where in a large configuration file
//! something failed.
//!
//! This crate does not try to be allocation-free; it builds full `Vec`-based
//! trees in memory. Temporary buffers and tree nodes are scoped to a single
//! decode/encode/validate call and released when it returns — there is no
//! shared mutable state, so a [registry::SpecRegistry] may be constructed
//! once and used concurrently across threads.

pub mod asn1;
pub mod error;
pub mod oui;
pub mod registry;
pub mod tlv;
pub mod tree;
pub mod types;
pub mod util;
pub mod validator;
pub mod value;

#[doc(inline)]
pub use error::{Error, ErrorKind, ErrorLocation, Result};
#[doc(inline)]
pub use registry::{SpecRegistry, TlvSpecEntry};
#[doc(inline)]
pub use tlv::{emit_binary, parse_binary, DecodeOptions, EncodeOptions, Tlv, TlvValue};
#[doc(inline)]
pub use tree::{emit_structured, emit_structured_to_binary, parse_structured, StructuredTlv};
#[doc(inline)]
pub use types::{ByteOffset, Dialect, DocsisVersion};
#[doc(inline)]
pub use validator::{validate, Finding, Report, Severity, Status, ValidateOptions};
#[doc(inline)]
pub use value::{format_value, parse_value, EnumMap, FormatOptions, FormatStyle, FormattedValue, UnitPreference, ValueType};

#[cfg(test)]
mod tests {
    use super::*;

    /// Scenario 1 from spec §8, exercised through the public crate surface rather than the
    /// individual module's own internal test.
    #[test]
    fn end_to_end_frequency_scenario() {
        let registry = SpecRegistry::docsis();
        let bytes = [0x01u8, 0x04, 0x23, 0x39, 0xF1, 0xC0];
        let tree = parse_binary(&bytes, &registry, DecodeOptions::default()).unwrap();
        assert_eq!(tree[0].value_type, ValueType::Frequency);

        let formatted = format_value(&tree[0].value_type, tree[0].as_leaf_bytes().unwrap(), &FormatOptions::default()).unwrap();
        assert_eq!(formatted.as_text(), Some("591 MHz"));

        assert_eq!(emit_binary(&tree, EncodeOptions::default()).unwrap(), bytes);
    }

    #[test]
    fn end_to_end_structured_and_validate() {
        let registry = SpecRegistry::docsis();
        let bytes = [0x18u8, 0x06, 0x01, 0x01, 0x01, 0x02, 0x01, 0x02];
        let tree = parse_binary(&bytes, &registry, DecodeOptions::default()).unwrap();

        let structured = emit_structured(&tree);
        assert_eq!(structured[0].r#type, 24);
        assert!(structured[0].subtlvs.is_some());

        let report = validate(&tree, &registry, ValidateOptions::default());
        assert_eq!(report.status, Status::Invalid);
        assert!(report.errors.iter().any(|f| f.kind == "missing_dependency"));
    }
}
