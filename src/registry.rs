//! The Spec Registry (C1): read-only, version-scoped TLV and sub-TLV metadata.
//!
//! A [`SpecRegistry`] is a plain value, not a global singleton — callers pass it explicitly into
//! [crate::tlv::parse_binary]/[crate::tlv::emit_binary]/[crate::validator::validate] so that
//! several DOCSIS versions (or a test fixture) can coexist in one process (spec §9, "Registry
//! injection"). Once constructed it is immutable and freely `Send + Sync`.

use std::collections::HashMap;
use std::ops::RangeInclusive;

use crate::types::DocsisVersion;
use crate::value::{EnumMap, ValueType};

/// Metadata for one TLV type (top-level or sub-TLV), scoped to the version window it applies to.
#[derive(Clone, Debug)]
pub struct TlvSpecEntry {
    pub r#type: u8,
    pub name: &'static str,
    pub value_type: ValueType,
    pub version_introduced: DocsisVersion,
    pub version_deprecated: Option<DocsisVersion>,
    /// `None` means unlimited.
    pub max_length: Option<usize>,
    pub is_compound: bool,
    /// Identifies the sub-TLV table this entry's children are parsed against, when compound.
    pub subtlv_schema_id: Option<u32>,
    pub description: &'static str,
}

impl TlvSpecEntry {
    fn covers(&self, version: DocsisVersion) -> bool {
        version >= self.version_introduced && self.version_deprecated.map_or(true, |d| version < d)
    }
}

/// The read-only, version-scoped TLV/sub-TLV metadata tables.
#[derive(Clone, Debug, Default)]
pub struct SpecRegistry {
    top_level: HashMap<u8, Vec<TlvSpecEntry>>,
    sub_tlvs: HashMap<(u32, u8), TlvSpecEntry>,
    version_ranges: HashMap<DocsisVersion, RangeInclusive<u8>>,
    required_basic: Vec<u8>,
    dependencies: Vec<(u8, Vec<u8>)>,
}

impl SpecRegistry {
    fn new() -> Self {
        let version_ranges = [
            (DocsisVersion::V1_0, 1..=30),
            (DocsisVersion::V1_1, 1..=42),
            (DocsisVersion::V2_0, 1..=50),
            (DocsisVersion::V3_0, 1..=85),
            (DocsisVersion::V3_1, 1..=130),
            (DocsisVersion::V4_0, 1..=255),
        ]
        .into_iter()
        .collect();

        SpecRegistry {
            top_level: HashMap::new(),
            sub_tlvs: HashMap::new(),
            version_ranges,
            required_basic: vec![1, 2, 3],
            dependencies: vec![(24, vec![1, 2]), (25, vec![1, 2]), (30, vec![31]), (38, vec![39])],
        }
    }

    fn push_top_level(&mut self, entry: TlvSpecEntry) {
        self.top_level.entry(entry.r#type).or_default().push(entry);
    }

    fn push_sub_tlv(&mut self, schema_id: u32, entry: TlvSpecEntry) {
        self.sub_tlvs.insert((schema_id, entry.r#type), entry);
    }

    /// `Found(entry) | NotFound`, realized as `Option`: the entry covering `type` at `version`, if any.
    pub fn lookup_tlv(&self, r#type: u8, version: DocsisVersion) -> Option<&TlvSpecEntry> {
        self.top_level
            .get(&r#type)?
            .iter()
            .find(|e| e.covers(version))
    }

    /// `Found(entry) | NotFound`: the sub-TLV entry for `sub_type` under `parent_type`'s schema.
    ///
    /// The parent's schema is resolved from whichever of its version-scoped entries declares one;
    /// sub-TLV admissibility itself is not further scoped by version in this registry.
    pub fn lookup_subtlv(&self, parent_type: u8, sub_type: u8) -> Option<&TlvSpecEntry> {
        let schema_id = self
            .top_level
            .get(&parent_type)?
            .iter()
            .find_map(|e| e.subtlv_schema_id)?;
        self.sub_tlvs.get(&(schema_id, sub_type))
    }

    /// The inclusive range of `type` values admissible at `version`.
    pub fn version_allowed_types(&self, version: DocsisVersion) -> RangeInclusive<u8> {
        self.version_ranges
            .get(&version)
            .cloned()
            .unwrap_or(1..=0)
    }

    /// The basic TLV types every complete configuration must include: `{1, 2, 3}`.
    pub fn required_basic(&self) -> &[u8] {
        &self.required_basic
    }

    /// `{24→[1,2], 25→[1,2], 30→[31], 38→[39]}`: if the first type is present at the top level,
    /// every type in the associated list must also be present there.
    pub fn dependencies(&self) -> &[(u8, Vec<u8>)] {
        &self.dependencies
    }

    pub fn dependency_for(&self, r#type: u8) -> Option<&[u8]> {
        self.dependencies
            .iter()
            .find(|(t, _)| *t == r#type)
            .map(|(_, reqs)| reqs.as_slice())
    }

    /// The built-in DOCSIS/PacketCable table, covering every [`ValueType`] variant and the
    /// dependency/required-set examples from spec §8.
    pub fn docsis() -> Self {
        let mut r = SpecRegistry::new();

        r.push_top_level(entry(1, "Downstream Frequency", ValueType::Frequency, Some(4), false, None, "Center frequency of the downstream channel."));
        r.push_top_level(entry(2, "Upstream Channel ID", ValueType::Uint8, Some(1), false, None, "Identifies the upstream channel to use."));
        r.push_top_level(entry(3, "Network Access Control", ValueType::Boolean, Some(1), false, None, "Enables or disables network access for the CM."));
        r.push_top_level(entry(4, "Class of Service", ValueType::Compound, None, true, Some(10), "Legacy class-of-service configuration."));
        r.push_top_level(entry(5, "Modem Capabilities", ValueType::Compound, None, true, Some(11), "Optional feature support flags reported by the CM."));
        r.push_top_level(entry(6, "Customer CPE MAC Address", ValueType::MacAddress, Some(6), false, None, "MAC address of an authorized CPE device."));
        r.push_top_level(entry(7, "CM Message Integrity Check", ValueType::Binary, None, false, None, "Keyed hash covering the preceding TLVs."));
        r.push_top_level(entry(8, "CMTS Message Integrity Check", ValueType::Binary, None, false, None, "Keyed hash computed by the CMTS."));
        r.push_top_level(entry(9, "Software Upgrade Filename", ValueType::String, None, false, None, "Filename of a firmware image to download."));
        r.push_top_level(entry(10, "Configuration File Timestamp", ValueType::Timestamp, Some(4), false, None, "Unix-epoch time this configuration was generated."));
        r.push_top_level(entry(11, "SNMP MIB Object", ValueType::Asn1Der, None, false, None, "A single SNMP varbind encoded as SEQUENCE { OID, value }."));
        r.push_top_level(entry(12, "TFTP Server Address", ValueType::Ipv4, Some(4), false, None, "Address of the TFTP server to re-fetch configuration from."));
        r.push_top_level(entry(13, "Software Upgrade Timeout", ValueType::Duration, Some(4), false, None, "Maximum time allowed for a firmware upgrade to complete."));
        r.push_top_level(entry(14, "Upstream Utilization Threshold", ValueType::Percentage, Some(1), false, None, "Utilization percentage above which an event is logged."));
        r.push_top_level(entry(15, "Client-visible IP Address", ValueType::Ipv4, Some(4), false, None, "IP address presented to management applications."));
        r.push_top_level(entry(17, "Event Throttle MIB", ValueType::SnmpOid, None, false, None, "MIB object governing event-throttling behavior."));
        r.push_top_level(entry(18, "Vendor Identifier", ValueType::VendorOui, Some(3), false, None, "OUI of the device vendor."));
        r.push_top_level(entry(19, "Vendor Specific Information", ValueType::Vendor, None, false, None, "Vendor-private TLV payload, OUI-prefixed."));
        r.push_top_level(entry(20, "Maximum Upstream Transmit Power", ValueType::PowerQuarterDb, Some(1), false, None, "Ceiling on upstream transmit power."));
        r.push_top_level(entry(21, "Default Upstream Service Flow Reference", ValueType::ServiceFlowRef, None, false, None, "Reference to the default upstream service flow."));
        r.push_top_level(entry(22, "Maximum Number of Classifiers", ValueType::Uint16, Some(2), false, None, "Limit on classifiers the CM will accept."));
        r.push_top_level(entry(23, "Global Privacy Enable", ValueType::Uint32, Some(4), false, None, "BPI+ privacy enforcement flag."));
        r.push_top_level(entry(24, "Upstream Service Flow", ValueType::Compound, None, true, Some(20), "Encodes a single upstream service flow's parameters."));
        r.push_top_level(entry(25, "Downstream Service Flow", ValueType::Compound, None, true, Some(20), "Encodes a single downstream service flow's parameters."));
        r.push_top_level(entry(31, "Subscriber Management CPE IP Table", ValueType::Boolean, Some(1), false, None, "Required companion of TLV 30."));
        r.push_top_level(entry(30, "Subscriber Management Control", ValueType::Compound, None, true, Some(30), "Subscriber-management feature configuration."));
        r.push_top_level(entry(39, "MTA Provisioning Flag", ValueType::Uint8, Some(1), false, None, "Required companion of TLV 38."));
        r.push_top_level(entry(38, "PacketCable MTA Endpoint Configuration", ValueType::Enum(mta_endpoint_map()), Some(1), false, None, "Selects the MTA endpoint provisioning mode."));

        r.push_top_level(entry_since(40, "MTA Device Certificate", ValueType::Certificate, None, false, None, "X.509 certificate presented by the MTA.", DocsisVersion::V3_0));
        r.push_top_level(entry_since(41, "MTA IPv6 Address", ValueType::Ipv6, Some(16), false, None, "IPv6 address assigned to the MTA endpoint.", DocsisVersion::V3_0));
        r.push_top_level(entry_since(42, "Provisioning State", ValueType::EnumWithWidth(provisioning_state_map(), 2), None, false, None, "Current provisioning state, explicit 16-bit width.", DocsisVersion::V3_1));
        r.push_top_level(entry_since(43, "Maximum Downstream Bandwidth", ValueType::Bandwidth, Some(4), false, None, "Ceiling on downstream throughput.", DocsisVersion::V1_1));
        r.push_top_level(entry_since(44, "Vendor OID", ValueType::Oid, None, false, None, "Vendor-assigned object identifier.", DocsisVersion::V2_0));

        r.push_top_level(entry(255, "End-of-Data", ValueType::Marker, Some(0), false, None, "Zero-length marker that stops decoding at this nesting level."));

        r.push_sub_tlv(10, entry(1, "Class ID", ValueType::Uint8, Some(1), false, None, "Identifies the class-of-service profile."));
        r.push_sub_tlv(10, entry(2, "Maximum Downstream Rate", ValueType::Uint32, Some(4), false, None, "Downstream rate limit in bps."));
        r.push_sub_tlv(10, entry(3, "Maximum Upstream Burst", ValueType::Uint32, Some(4), false, None, "Upstream burst limit in bytes."));
        r.push_sub_tlv(11, entry(1, "Concatenation Support", ValueType::Boolean, Some(1), false, None, "Whether the CM supports concatenation."));
        r.push_sub_tlv(11, entry(2, "DBC Support", ValueType::Boolean, Some(1), false, None, "Whether the CM supports Dynamic Bonding Change."));
        r.push_sub_tlv(20, entry(1, "Service Flow Reference", ValueType::Uint8, Some(1), false, None, "Identifies this service flow within the configuration."));
        r.push_sub_tlv(20, entry(2, "Service Class Name Reference", ValueType::Uint8, Some(1), false, None, "References a named service class profile."));
        r.push_sub_tlv(30, entry(1, "Control Flag", ValueType::Uint8, Some(1), false, None, "Subscriber-management enforcement flag."));

        r
    }

    /// A small registry for unit tests that don't need the full built-in table, mirroring the
    /// teacher's pattern of constructing minimal fixture configs rather than the production one.
    pub fn fixture() -> Self {
        let mut r = SpecRegistry::new();
        r.push_top_level(entry(1, "Downstream Frequency", ValueType::Frequency, Some(4), false, None, "Fixture entry."));
        r.push_top_level(entry(2, "Upstream Channel ID", ValueType::Uint8, Some(1), false, None, "Fixture entry."));
        r.push_top_level(entry(3, "Network Access Control", ValueType::Boolean, Some(1), false, None, "Fixture entry."));
        r.push_top_level(entry(6, "Customer CPE MAC Address", ValueType::MacAddress, Some(6), false, None, "Fixture entry."));
        r.push_top_level(entry(15, "Client-visible IP Address", ValueType::Ipv4, Some(4), false, None, "Fixture entry."));
        r.push_top_level(entry(24, "Upstream Service Flow", ValueType::Compound, None, true, Some(20), "Fixture entry."));
        r.push_top_level(entry(25, "Downstream Service Flow", ValueType::Compound, None, true, Some(20), "Fixture entry."));
        r.push_sub_tlv(20, entry(1, "Service Flow Reference", ValueType::Uint8, Some(1), false, None, "Fixture entry."));
        r.push_sub_tlv(20, entry(2, "Service Class Name Reference", ValueType::Uint8, Some(1), false, None, "Fixture entry."));
        r
    }
}

fn entry(
    r#type: u8,
    name: &'static str,
    value_type: ValueType,
    max_length: Option<usize>,
    is_compound: bool,
    subtlv_schema_id: Option<u32>,
    description: &'static str,
) -> TlvSpecEntry {
    TlvSpecEntry {
        r#type,
        name,
        value_type,
        version_introduced: DocsisVersion::V1_0,
        version_deprecated: None,
        max_length,
        is_compound,
        subtlv_schema_id,
        description,
    }
}

#[allow(clippy::too_many_arguments)]
fn entry_since(
    r#type: u8,
    name: &'static str,
    value_type: ValueType,
    max_length: Option<usize>,
    is_compound: bool,
    subtlv_schema_id: Option<u32>,
    description: &'static str,
    version_introduced: DocsisVersion,
) -> TlvSpecEntry {
    let mut e = entry(r#type, name, value_type, max_length, is_compound, subtlv_schema_id, description);
    e.version_introduced = version_introduced;
    e
}

fn mta_endpoint_map() -> EnumMap {
    EnumMap::from_static(&[(1, "Primary Line"), (2, "Secondary Line"), (3, "Data Only")])
}

fn provisioning_state_map() -> EnumMap {
    EnumMap::from_static(&[(0, "Unprovisioned"), (1, "Provisioning"), (2, "Provisioned"), (3, "Rejected")])
}
