//! End-to-end scenarios and round-trip properties from spec §8, exercised entirely through the
//! crate's public surface (`docsis_tlv::*`) rather than any module-internal API.

use docsis_tlv::{
    emit_binary, emit_structured, format_value, parse_binary, parse_value, validate, DecodeOptions,
    Dialect, DocsisVersion, EncodeOptions, FormatOptions, FormattedValue, SpecRegistry, Status,
    ValidateOptions, ValueType,
};
use pretty_assertions::assert_eq;

fn registry() -> SpecRegistry {
    SpecRegistry::docsis()
}

fn decode_opts(version: DocsisVersion, dialect: Dialect) -> DecodeOptions {
    DecodeOptions {
        docsis_version: version,
        dialect,
    }
}

fn encode_opts(version: DocsisVersion, dialect: Dialect) -> EncodeOptions {
    EncodeOptions {
        docsis_version: version,
        dialect,
    }
}

#[test]
fn scenario_1_frequency_leaf() {
    let bytes = [0x01, 0x04, 0x23, 0x39, 0xF1, 0xC0];
    let tree = parse_binary(&bytes, &registry(), decode_opts(DocsisVersion::V3_1, Dialect::Extended)).unwrap();
    assert_eq!(tree.len(), 1);
    assert_eq!(tree[0].r#type, 1);
    assert_eq!(tree[0].length, 4);
    assert_eq!(tree[0].value_type, ValueType::Frequency);

    let formatted = format_value(&tree[0].value_type, tree[0].as_leaf_bytes().unwrap(), &FormatOptions::default()).unwrap();
    assert_eq!(formatted.as_text(), Some("591 MHz"));

    let back = emit_binary(&tree, encode_opts(DocsisVersion::V3_1, Dialect::Extended)).unwrap();
    assert_eq!(back, bytes);
}

#[test]
fn scenario_2_boolean_leaf() {
    let registry = registry();
    let opts = decode_opts(DocsisVersion::V3_1, Dialect::Extended);

    let enabled = parse_binary(&[0x03, 0x01, 0x01], &registry, opts).unwrap();
    let formatted = format_value(&enabled[0].value_type, enabled[0].as_leaf_bytes().unwrap(), &FormatOptions::default()).unwrap();
    assert_eq!(formatted.as_text(), Some("Enabled"));

    let disabled = parse_binary(&[0x03, 0x01, 0x00], &registry, opts).unwrap();
    let formatted = format_value(&disabled[0].value_type, disabled[0].as_leaf_bytes().unwrap(), &FormatOptions::default()).unwrap();
    assert_eq!(formatted.as_text(), Some("Disabled"));
}

#[test]
fn scenario_3_ipv4_leaf() {
    let bytes = [0x15, 0x04, 0xC0, 0xA8, 0x01, 0x64];
    let tree = parse_binary(&bytes, &registry(), decode_opts(DocsisVersion::V3_1, Dialect::Extended)).unwrap();
    let formatted = format_value(&tree[0].value_type, tree[0].as_leaf_bytes().unwrap(), &FormatOptions::default()).unwrap();
    assert_eq!(formatted.as_text(), Some("192.168.1.100"));
}

#[test]
fn scenario_4_compound_with_missing_dependency() {
    let registry = registry();
    let bytes = [0x18, 0x06, 0x01, 0x01, 0x01, 0x02, 0x01, 0x02];
    let tree = parse_binary(&bytes, &registry, decode_opts(DocsisVersion::V3_1, Dialect::Extended)).unwrap();
    assert_eq!(tree[0].r#type, 24);
    assert!(tree[0].is_compound());
    let children = tree[0].children().unwrap();
    assert_eq!(children[0].r#type, 1);
    assert_eq!(children[1].r#type, 2);

    let report = validate(
        &tree,
        &registry,
        ValidateOptions {
            docsis_version: DocsisVersion::V3_1,
            strict: false,
        },
    );
    assert_eq!(report.status, Status::Invalid);
    assert!(report.errors.iter().any(|f| f.kind == "missing_dependency" && f.tlv_type == 24));
}

#[test]
fn scenario_5_mac_address_with_vendor_annotation() {
    let bytes = [0x06, 0x06, 0x00, 0x10, 0x95, 0xAB, 0xCD, 0xEF];
    let tree = parse_binary(&bytes, &registry(), decode_opts(DocsisVersion::V3_1, Dialect::Extended)).unwrap();
    let formatted = format_value(&tree[0].value_type, tree[0].as_leaf_bytes().unwrap(), &FormatOptions::default()).unwrap();
    assert_eq!(formatted.as_text(), Some("00:10:95:AB:CD:EF"));

    let oui_formatted = format_value(&ValueType::VendorOui, &[0x00, 0x10, 0x95], &FormatOptions::default()).unwrap();
    assert_eq!(oui_formatted.as_text(), Some("00:10:95 (Broadcom Corporation)"));
}

#[test]
fn scenario_6_snmp_mib_object() {
    // SEQUENCE { OID 1.3.6.1.2.1.1.1, INTEGER 42 }
    let oid_bytes = docsis_tlv::asn1::encode_oid(&[1, 3, 6, 1, 2, 1, 1, 1]).unwrap();
    let mut seq_payload = vec![0x06, oid_bytes.len() as u8];
    seq_payload.extend(&oid_bytes);
    seq_payload.extend(&[0x02, 0x01, 0x2A]);
    let mut der = vec![0x30, seq_payload.len() as u8];
    der.extend(&seq_payload);

    let mut verbose = FormatOptions::default();
    verbose.format_style = docsis_tlv::FormatStyle::Verbose;
    let formatted = format_value(&ValueType::Asn1Der, &der, &verbose).unwrap();
    match formatted {
        FormattedValue::Structured(serde_json::Value::Object(obj)) => {
            assert_eq!(obj.get("oid").unwrap(), "1.3.6.1.2.1.1.1");
            assert_eq!(obj.get("type").unwrap(), "INTEGER");
            assert_eq!(obj.get("value").unwrap(), 42);
        }
        other => panic!("expected structured SNMP MIB object, got {:?}", other),
    }
}

#[test]
fn boundary_zero_length_leaf() {
    let registry = registry();
    let bytes = [0x09, 0x00];
    let tree = parse_binary(&bytes, &registry, decode_opts(DocsisVersion::V3_1, Dialect::Extended)).unwrap();
    assert_eq!(tree[0].length, 0);
    assert_eq!(emit_binary(&tree, encode_opts(DocsisVersion::V3_1, Dialect::Extended)).unwrap(), bytes);
}

#[test]
fn boundary_classic_length_255_is_ok_256_fails() {
    let registry = registry();
    let mut ok_bytes = vec![0x09, 0xFF];
    ok_bytes.extend(std::iter::repeat(0x41).take(255));
    let tree = parse_binary(&ok_bytes, &registry, decode_opts(DocsisVersion::V3_1, Dialect::Classic)).unwrap();
    assert_eq!(tree[0].length, 255);

    let mut oversized = docsis_tlv::Tlv::leaf(9, vec![0x41; 256], ValueType::String);
    oversized.length = 256;
    let err = emit_binary(&[oversized], encode_opts(DocsisVersion::V3_1, Dialect::Classic)).unwrap_err();
    assert!(matches!(
        err.kind(),
        docsis_tlv::ErrorKind::Generation(docsis_tlv::error::GenerationError::ExceedsMaxLength { length: 256, max: 255 })
    ));
}

#[test]
fn boundary_extended_length_256_uses_minimal_form() {
    let node = docsis_tlv::Tlv::leaf(9, vec![0x41; 256], ValueType::String);
    let bytes = emit_binary(&[node], encode_opts(DocsisVersion::V3_1, Dialect::Extended)).unwrap();
    assert_eq!(&bytes[..4], &[0x09, 0x82, 0x01, 0x00]);
}

#[test]
fn boundary_five_level_nesting_round_trips() {
    use docsis_tlv::Tlv;
    let registry = registry();
    let innermost = Tlv::leaf(1, vec![0x00, 0x00, 0x00, 0x01], ValueType::Frequency);
    let l4 = Tlv::compound(24, vec![innermost]);
    let l3 = Tlv::compound(24, vec![l4]);
    let l2 = Tlv::compound(24, vec![l3]);
    let l1 = Tlv::compound(24, vec![l2]);

    let bytes = emit_binary(&[l1], encode_opts(DocsisVersion::V3_1, Dialect::Extended)).unwrap();
    let tree = parse_binary(&bytes, &registry, decode_opts(DocsisVersion::V3_1, Dialect::Extended)).unwrap();
    let mut depth = 0;
    let mut node = &tree[0];
    loop {
        depth += 1;
        match node.children() {
            Some(children) if !children.is_empty() => node = &children[0],
            _ => break,
        }
    }
    assert_eq!(depth, 5);
}

#[test]
fn boundary_trailing_ff_padding_is_skipped() {
    let registry = registry();
    let bytes = [0x03, 0x01, 0x01, 0xFF, 0xFF, 0xFF];
    let tree = parse_binary(&bytes, &registry, decode_opts(DocsisVersion::V3_1, Dialect::Extended)).unwrap();
    assert_eq!(tree.len(), 2);
    assert_eq!(tree[1].value_type, ValueType::Marker);
}

#[test]
fn round_trip_binary_for_every_recognized_docsis_version() {
    let registry = registry();
    let bytes = [0x02, 0x01, 0x05];
    for version in DocsisVersion::ALL {
        let tree = parse_binary(&bytes, &registry, decode_opts(version, Dialect::Extended)).unwrap();
        let back = emit_binary(&tree, encode_opts(version, Dialect::Extended)).unwrap();
        assert_eq!(back, bytes, "round trip failed for version {}", version);
    }
}

#[test]
fn structured_round_trip_preserves_hex_value_and_subtlv_order() {
    let registry = registry();
    let bytes = [0x18, 0x06, 0x01, 0x01, 0x01, 0x02, 0x01, 0x02];
    let tree = parse_binary(&bytes, &registry, decode_opts(DocsisVersion::V3_1, Dialect::Extended)).unwrap();
    let structured = emit_structured(&tree);
    let subtlvs = structured[0].subtlvs.as_ref().unwrap();
    assert_eq!(subtlvs[0].r#type, 1);
    assert_eq!(subtlvs[0].value, "01");
    assert_eq!(subtlvs[1].r#type, 2);
    assert_eq!(subtlvs[1].value, "02");

    let reconstructed = docsis_tlv::emit_structured_to_binary(
        &structured,
        &registry,
        decode_opts(DocsisVersion::V3_1, Dialect::Extended),
        encode_opts(DocsisVersion::V3_1, Dialect::Extended),
    )
    .unwrap();
    assert_eq!(reconstructed, bytes);
}

#[test]
fn full_basic_config_validates_cleanly_and_renders() {
    let registry = registry();
    let bytes = [
        0x01, 0x04, 0x23, 0x39, 0xF1, 0xC0, // downstream frequency
        0x02, 0x01, 0x05, // upstream channel id
        0x03, 0x01, 0x01, // network access control
    ];
    let tree = parse_binary(&bytes, &registry, decode_opts(DocsisVersion::V3_1, Dialect::Extended)).unwrap();
    let report = validate(&tree, &registry, ValidateOptions::default());
    assert_eq!(report.status, Status::Valid);
    assert_eq!(report.summary.config_completeness, 1.0);

    let rendered = docsis_tlv::util::render_tree(&tree);
    assert!(rendered.contains("591 MHz"));
    assert!(rendered.contains("Enabled"));
}

#[test]
fn value_round_trip_holds_for_every_scalar_type_in_spec_table() {
    let cases: Vec<(ValueType, Vec<u8>)> = vec![
        (ValueType::Uint8, vec![7]),
        (ValueType::Uint16, vec![0x01, 0x02]),
        (ValueType::Uint32, vec![0x00, 0x00, 0x01, 0x00]),
        (ValueType::Ipv4, vec![10, 0, 0, 1]),
        (ValueType::Ipv6, vec![0; 16]),
        (ValueType::MacAddress, vec![0xDE, 0xAD, 0xBE, 0xEF, 0x00, 0x01]),
        (ValueType::Frequency, vec![0x23, 0x39, 0xF1, 0xC0]),
        (ValueType::Bandwidth, vec![0x05, 0xF5, 0xE1, 0x00]),
        (ValueType::Boolean, vec![1]),
        (ValueType::Duration, vec![0, 0, 14, 16]),
        (ValueType::Percentage, vec![50]),
        (ValueType::PowerQuarterDb, vec![60]),
        (ValueType::ServiceFlowRef, vec![3]),
        (ValueType::VendorOui, vec![0x00, 0x1D, 0xD8]),
        (ValueType::Timestamp, vec![0, 0, 0, 0]),
        (ValueType::Marker, vec![]),
    ];
    for (value_type, bytes) in cases {
        let formatted = format_value(&value_type, &bytes, &FormatOptions::default())
            .unwrap_or_else(|e| panic!("format_value({:?}) failed: {}", value_type, e));
        let back = parse_value(&value_type, &formatted, &FormatOptions::default())
            .unwrap_or_else(|e| panic!("parse_value({:?}) failed: {}", value_type, e));
        assert_eq!(back, bytes, "round trip mismatch for {:?}", value_type);
    }
}
