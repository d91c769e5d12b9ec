//! The typed value codec (C3): bidirectional mapping between an opaque byte string and a
//! type-aware textual or structured representation.
//!
//! Every [`ValueType`] variant is a member of the closed set spec'd for this format; dispatch on
//! it is a match, never open-ended dynamic dispatch (spec §9, "Polymorphic dispatch on
//! value_type"). The handful of documented fallbacks (string → binary when not printable, wrong
//! width → hex for small fixed-width numerics) are explicit ordered attempts inside each
//! formatter, never exceptions or panics (spec §9, "Fallback chain").

use std::fmt::Write as _;

use crate::error::{Error, ErrorLocation, FormatError, Result};
use crate::oui;

// --- ValueType --------------------------------------------------------------------------------------------------

/// A mapping from an integer value to a human-readable name, shared by `Enum` and `EnumWithWidth`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnumMap(std::sync::Arc<Vec<(u32, String)>>);

impl EnumMap {
    pub fn new(entries: Vec<(u32, String)>) -> Self {
        EnumMap(std::sync::Arc::new(entries))
    }

    pub fn from_static(entries: &[(u32, &str)]) -> Self {
        Self::new(entries.iter().map(|(v, n)| (*v, n.to_string())).collect())
    }

    pub fn name_of(&self, value: u32) -> Option<&str> {
        self.0
            .iter()
            .find(|(v, _)| *v == value)
            .map(|(_, n)| n.as_str())
    }

    pub fn value_of(&self, name: &str) -> Option<u32> {
        self.0
            .iter()
            .find(|(_, n)| n == name)
            .map(|(v, _)| *v)
    }
}

/// The closed set of semantic types a TLV leaf's bytes can carry, per spec §3.
#[derive(Clone, Debug, PartialEq)]
pub enum ValueType {
    Uint8,
    Uint16,
    Uint32,
    Ipv4,
    Ipv6,
    Frequency,
    Bandwidth,
    Boolean,
    MacAddress,
    Duration,
    Percentage,
    PowerQuarterDb,
    String,
    Binary,
    ServiceFlowRef,
    VendorOui,
    Vendor,
    Compound,
    Marker,
    Oid,
    SnmpOid,
    Certificate,
    Asn1Der,
    Timestamp,
    /// `enum<M>`: integer value named via `map`, underlying width inferred from the byte count.
    Enum(EnumMap),
    /// `enum<M,underlying>`: as `Enum`, but with an explicit declared underlying width in bytes
    /// (1, 2 or 4) so mismatched byte counts can be reported precisely.
    EnumWithWidth(EnumMap, u8),
    Unknown,
}

impl ValueType {
    pub fn name(&self) -> &'static str {
        match self {
            ValueType::Uint8 => "uint8",
            ValueType::Uint16 => "uint16",
            ValueType::Uint32 => "uint32",
            ValueType::Ipv4 => "ipv4",
            ValueType::Ipv6 => "ipv6",
            ValueType::Frequency => "frequency",
            ValueType::Bandwidth => "bandwidth",
            ValueType::Boolean => "boolean",
            ValueType::MacAddress => "mac_address",
            ValueType::Duration => "duration",
            ValueType::Percentage => "percentage",
            ValueType::PowerQuarterDb => "power_quarter_db",
            ValueType::String => "string",
            ValueType::Binary => "binary",
            ValueType::ServiceFlowRef => "service_flow_ref",
            ValueType::VendorOui => "vendor_oui",
            ValueType::Vendor => "vendor",
            ValueType::Compound => "compound",
            ValueType::Marker => "marker",
            ValueType::Oid => "oid",
            ValueType::SnmpOid => "snmp_oid",
            ValueType::Certificate => "certificate",
            ValueType::Asn1Der => "asn1_der",
            ValueType::Timestamp => "timestamp",
            ValueType::Enum(_) => "enum",
            ValueType::EnumWithWidth(_, _) => "enum",
            ValueType::Unknown => "unknown",
        }
    }

    /// The value_type actually in effect for these bytes, applying the one documented whole-type
    /// fallback (`string` → `binary` when the bytes aren't printable). Callers building a TLV
    /// tree node should call this once and store the result as the node's derived `value_type`,
    /// so that a later `parse_value` call is handed the same tag `format_value` used — this is
    /// what spec §4.3's round-trip contract means by "the parser is given the emitted value_type
    /// tag and uses it as authoritative".
    pub fn effective_for(&self, bytes: &[u8]) -> ValueType {
        if let ValueType::String = self {
            if !is_printable(strip_trailing_nul(bytes)) {
                return ValueType::Binary;
            }
        }
        self.clone()
    }
}

// --- FormatOptions ----------------------------------------------------------------------------------------------

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum UnitPreference {
    Auto,
    Hz,
    KHz,
    MHz,
    GHz,
    Bps,
    Kbps,
    Mbps,
    Gbps,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FormatStyle {
    Compact,
    Verbose,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormatOptions {
    /// `None` means "use this value type's own default" (2 for most scaled numerics, 1 for
    /// `power_quarter_db`); `Some(0)` forces integer-only output.
    pub precision: Option<u8>,
    pub unit_preference: UnitPreference,
    pub format_style: FormatStyle,
}

impl Default for FormatOptions {
    fn default() -> Self {
        FormatOptions {
            precision: None,
            unit_preference: UnitPreference::Auto,
            format_style: FormatStyle::Compact,
        }
    }
}

// --- FormattedValue ---------------------------------------------------------------------------------------------

/// The textual or structured result of formatting a leaf's bytes.
#[derive(Clone, Debug, PartialEq)]
pub enum FormattedValue {
    Text(String),
    Structured(serde_json::Value),
}

impl FormattedValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FormattedValue::Text(s) => Some(s),
            FormattedValue::Structured(_) => None,
        }
    }

    pub fn into_text(self) -> Option<String> {
        match self {
            FormattedValue::Text(s) => Some(s),
            FormattedValue::Structured(_) => None,
        }
    }
}

impl std::fmt::Display for FormattedValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FormattedValue::Text(s) => f.write_str(s),
            FormattedValue::Structured(v) => write!(f, "{}", v),
        }
    }
}

// --- format_value -----------------------------------------------------------------------------------------------

pub fn format_value(value_type: &ValueType, bytes: &[u8], opts: &FormatOptions) -> Result<FormattedValue> {
    let text = match value_type {
        ValueType::Uint8 => format_uint(bytes, 1),
        ValueType::Uint16 => format_uint(bytes, 2),
        ValueType::Uint32 => format_uint(bytes, 4),
        ValueType::Ipv4 => format_ipv4(bytes)?,
        ValueType::Ipv6 => format_ipv6(bytes)?,
        ValueType::Frequency => format_scaled_unit(bytes, opts, &["Hz", "KHz", "MHz", "GHz"], freq_unit_index(opts))?,
        ValueType::Bandwidth => {
            format_scaled_unit(bytes, opts, &["bps", "Kbps", "Mbps", "Gbps"], bw_unit_index(opts))?
        }
        ValueType::Boolean => format_boolean(bytes),
        ValueType::MacAddress => format_mac(bytes)?,
        ValueType::Duration => format_duration(bytes)?,
        ValueType::Percentage => format_percentage(bytes)?,
        ValueType::PowerQuarterDb => format_power_quarter_db(bytes, opts)?,
        ValueType::String => return Ok(FormattedValue::Text(format_string(bytes))),
        ValueType::Binary => format_binary(bytes, opts),
        ValueType::ServiceFlowRef => format_service_flow_ref(bytes)?,
        ValueType::VendorOui => format_vendor_oui(bytes)?,
        ValueType::Vendor => return format_vendor(bytes, opts),
        ValueType::Compound => format!("<Compound TLV: {} bytes>", bytes.len()),
        ValueType::Marker => format_marker(bytes)?,
        ValueType::Oid | ValueType::SnmpOid => format_oid(bytes),
        ValueType::Certificate | ValueType::Asn1Der => return format_asn1(bytes, opts),
        ValueType::Timestamp => format_timestamp(bytes)?,
        ValueType::Enum(map) => format_enum(bytes, map, None, opts)?,
        ValueType::EnumWithWidth(map, width) => format_enum(bytes, map, Some(*width), opts)?,
        ValueType::Unknown => format_binary(bytes, opts),
    };
    Ok(FormattedValue::Text(text))
}

// --- parse_value ------------------------------------------------------------------------------------------------

pub fn parse_value(value_type: &ValueType, value: &FormattedValue, _opts: &FormatOptions) -> Result<Vec<u8>> {
    match value_type {
        ValueType::Vendor => return parse_vendor(value),
        ValueType::Certificate | ValueType::Asn1Der => return parse_asn1(value),
        _ => {}
    }

    let text = value
        .as_text()
        .ok_or_else(|| format_err(value_type, "<structured>"))?;

    match value_type {
        ValueType::Uint8 => parse_uint(text, 1, value_type),
        ValueType::Uint16 => parse_uint(text, 2, value_type),
        ValueType::Uint32 => parse_uint(text, 4, value_type),
        ValueType::Ipv4 => parse_ipv4(text),
        ValueType::Ipv6 => parse_ipv6(text),
        ValueType::Frequency => parse_scaled_unit(text, &["hz", "khz", "mhz", "ghz"], value_type),
        ValueType::Bandwidth => parse_scaled_unit(text, &["bps", "kbps", "mbps", "gbps"], value_type),
        ValueType::Boolean => parse_boolean(text),
        ValueType::MacAddress => parse_mac(text),
        ValueType::Duration => parse_duration(text, value_type),
        ValueType::Percentage => parse_percentage(text, value_type),
        ValueType::PowerQuarterDb => parse_power_quarter_db(text, value_type),
        ValueType::String => Ok(text.as_bytes().to_vec()),
        ValueType::Binary => parse_binary(text, value_type),
        ValueType::ServiceFlowRef => parse_service_flow_ref(text, value_type),
        ValueType::VendorOui => parse_vendor_oui(text, value_type),
        ValueType::Compound => Err(format_err(value_type, text)),
        ValueType::Marker => parse_marker(text, value_type),
        ValueType::Oid | ValueType::SnmpOid => parse_oid(text, value_type),
        ValueType::Timestamp => parse_timestamp(text, value_type),
        ValueType::Enum(map) => parse_enum(text, map, None, value_type),
        ValueType::EnumWithWidth(map, width) => parse_enum(text, map, Some(*width), value_type),
        ValueType::Unknown => parse_binary(text, value_type),
        ValueType::Vendor | ValueType::Certificate | ValueType::Asn1Der => unreachable!(),
    }
}

fn format_err(value_type: &ValueType, text: &str) -> Error {
    Error::pinpoint(
        FormatError::InvalidText {
            value_type: value_type.name().to_string(),
            text: text.to_string(),
        },
        ErrorLocation::unknown(),
    )
}

fn len_err(value_type: &ValueType, expected: impl Into<String>, actual: usize) -> Error {
    Error::pinpoint(
        FormatError::WrongByteLength {
            value_type: value_type.name().to_string(),
            expected: expected.into(),
            actual,
        },
        ErrorLocation::unknown(),
    )
}

// --- fixed-width unsigned integers ------------------------------------------------------------------------------

fn format_uint(bytes: &[u8], width: usize) -> String {
    if bytes.len() != width {
        // "Wrong width for uint8 falls back to uppercase hex" generalizes to all fixed widths.
        return to_hex_compact(bytes);
    }
    let mut buf = [0u8; 8];
    buf[8 - width..].copy_from_slice(bytes);
    format!("{}", u64::from_be_bytes(buf))
}

fn parse_uint(text: &str, width: usize, value_type: &ValueType) -> Result<Vec<u8>> {
    if let Ok(v) = text.parse::<u64>() {
        let full = v.to_be_bytes();
        return Ok(full[8 - width..].to_vec());
    }
    // Accept the hex fallback form produced for wrong-width input.
    from_hex_compact(text).ok_or_else(|| format_err(value_type, text))
}

// --- IPv4 / IPv6 ------------------------------------------------------------------------------------------------

fn format_ipv4(bytes: &[u8]) -> Result<String> {
    if bytes.len() != 4 {
        return Err(len_err(&ValueType::Ipv4, "4", bytes.len()));
    }
    Ok(format!("{}.{}.{}.{}", bytes[0], bytes[1], bytes[2], bytes[3]))
}

fn parse_ipv4(text: &str) -> Result<Vec<u8>> {
    let parts: Vec<&str> = text.split('.').collect();
    if parts.len() != 4 {
        return Err(format_err(&ValueType::Ipv4, text));
    }
    let mut out = Vec::with_capacity(4);
    for p in parts {
        out.push(p.parse::<u8>().map_err(|_| format_err(&ValueType::Ipv4, text))?);
    }
    Ok(out)
}

fn format_ipv6(bytes: &[u8]) -> Result<String> {
    if bytes.len() != 16 {
        return Err(len_err(&ValueType::Ipv6, "16", bytes.len()));
    }
    let groups: Vec<String> = bytes
        .chunks(2)
        .map(|c| format!("{:02x}{:02x}", c[0], c[1]))
        .collect();
    Ok(groups.join(":"))
}

fn parse_ipv6(text: &str) -> Result<Vec<u8>> {
    let parts: Vec<&str> = text.split(':').collect();
    if parts.len() != 8 {
        return Err(format_err(&ValueType::Ipv6, text));
    }
    let mut out = Vec::with_capacity(16);
    for p in parts {
        let v = u16::from_str_radix(p, 16).map_err(|_| format_err(&ValueType::Ipv6, text))?;
        out.extend_from_slice(&v.to_be_bytes());
    }
    Ok(out)
}

// --- frequency / bandwidth (auto-scaled) -------------------------------------------------------------------------

fn freq_unit_index(opts: &FormatOptions) -> Option<usize> {
    match opts.unit_preference {
        UnitPreference::Hz => Some(0),
        UnitPreference::KHz => Some(1),
        UnitPreference::MHz => Some(2),
        UnitPreference::GHz => Some(3),
        _ => None,
    }
}

fn bw_unit_index(opts: &FormatOptions) -> Option<usize> {
    match opts.unit_preference {
        UnitPreference::Bps => Some(0),
        UnitPreference::Kbps => Some(1),
        UnitPreference::Mbps => Some(2),
        UnitPreference::Gbps => Some(3),
        _ => None,
    }
}

fn format_scaled_unit(
    bytes: &[u8],
    opts: &FormatOptions,
    units: &[&str; 4],
    forced_index: Option<usize>,
) -> Result<String> {
    let value_type = if units[0] == "Hz" { ValueType::Frequency } else { ValueType::Bandwidth };
    if bytes.len() != 4 {
        return Err(len_err(&value_type, "4", bytes.len()));
    }
    let mut buf = [0u8; 4];
    buf.copy_from_slice(bytes);
    let raw = u32::from_be_bytes(buf) as f64;

    let index = forced_index.unwrap_or_else(|| {
        if raw >= 1_000_000_000.0 {
            3
        } else if raw >= 1_000_000.0 {
            2
        } else if raw >= 1_000.0 {
            1
        } else {
            0
        }
    });
    let scaled = raw / 1000f64.powi(index as i32);
    let precision = opts.precision.unwrap_or(2);
    Ok(format!("{} {}", format_number(scaled, precision), units[index]))
}

fn parse_scaled_unit(text: &str, units_lower: &[&str; 4], value_type: &ValueType) -> Result<Vec<u8>> {
    let text = text.trim();
    let split_at = text
        .find(|c: char| c.is_alphabetic())
        .ok_or_else(|| format_err(value_type, text))?;
    let (num_part, unit_part) = text.split_at(split_at);
    let num: f64 = num_part.trim().parse().map_err(|_| format_err(value_type, text))?;
    let unit_lower = unit_part.trim().to_lowercase();
    let index = units_lower
        .iter()
        .position(|u| *u == unit_lower)
        .ok_or_else(|| format_err(value_type, text))?;
    let raw = (num * 1000f64.powi(index as i32)).round();
    if raw < 0.0 || raw > u32::MAX as f64 {
        return Err(format_err(value_type, text));
    }
    Ok((raw as u32).to_be_bytes().to_vec())
}

fn format_number(value: f64, precision: u8) -> String {
    if precision == 0 {
        return format!("{}", value.round() as i64);
    }
    let s = format!("{:.*}", precision as usize, value);
    if s.contains('.') {
        let trimmed = s.trim_end_matches('0').trim_end_matches('.');
        trimmed.to_string()
    } else {
        s
    }
}

// --- boolean ----------------------------------------------------------------------------------------------------

fn format_boolean(bytes: &[u8]) -> String {
    match bytes {
        [1] => "Enabled".to_string(),
        [0] => "Disabled".to_string(),
        _ => to_hex_spaced(bytes),
    }
}

fn parse_boolean(text: &str) -> Result<Vec<u8>> {
    match text {
        "Enabled" => Ok(vec![1]),
        "Disabled" => Ok(vec![0]),
        _ => from_hex_spaced(text).ok_or_else(|| format_err(&ValueType::Boolean, text)),
    }
}

// --- MAC address ------------------------------------------------------------------------------------------------

fn format_mac(bytes: &[u8]) -> Result<String> {
    if bytes.len() != 6 {
        return Err(len_err(&ValueType::MacAddress, "6", bytes.len()));
    }
    Ok(bytes
        .iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(":"))
}

fn parse_mac(text: &str) -> Result<Vec<u8>> {
    let parts: Vec<&str> = text.split(':').collect();
    if parts.len() != 6 {
        return Err(format_err(&ValueType::MacAddress, text));
    }
    let mut out = Vec::with_capacity(6);
    for p in parts {
        out.push(u8::from_str_radix(p, 16).map_err(|_| format_err(&ValueType::MacAddress, text))?);
    }
    Ok(out)
}

// --- duration ---------------------------------------------------------------------------------------------------

const DURATION_UNITS: [(u32, &str); 4] = [(86400, "day"), (3600, "hour"), (60, "minute"), (1, "second")];

fn format_duration(bytes: &[u8]) -> Result<String> {
    if bytes.len() != 4 {
        return Err(len_err(&ValueType::Duration, "4", bytes.len()));
    }
    let mut buf = [0u8; 4];
    buf.copy_from_slice(bytes);
    let seconds = u32::from_be_bytes(buf);

    for (unit_secs, name) in DURATION_UNITS {
        if seconds % unit_secs == 0 {
            let value = seconds / unit_secs;
            let plural = if value == 1 { "" } else { "s" };
            return Ok(format!("{} {}{}", value, name, plural));
        }
    }
    unreachable!("1 divides every value");
}

fn parse_duration(text: &str, value_type: &ValueType) -> Result<Vec<u8>> {
    let mut parts = text.split_whitespace();
    let value: u32 = parts
        .next()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| format_err(value_type, text))?;
    let unit = parts.next().ok_or_else(|| format_err(value_type, text))?;
    let unit_secs = DURATION_UNITS
        .iter()
        .find(|(_, name)| unit.trim_end_matches('s') == *name)
        .map(|(s, _)| *s)
        .ok_or_else(|| format_err(value_type, text))?;
    Ok((value * unit_secs).to_be_bytes().to_vec())
}

// --- percentage -------------------------------------------------------------------------------------------------

fn format_percentage(bytes: &[u8]) -> Result<String> {
    if bytes.len() != 1 {
        return Err(len_err(&ValueType::Percentage, "1", bytes.len()));
    }
    Ok(format!("{}%", bytes[0]))
}

fn parse_percentage(text: &str, value_type: &ValueType) -> Result<Vec<u8>> {
    let digits = text.strip_suffix('%').ok_or_else(|| format_err(value_type, text))?;
    let v: u8 = digits.parse().map_err(|_| format_err(value_type, text))?;
    Ok(vec![v])
}

// --- power_quarter_db -------------------------------------------------------------------------------------------

fn format_power_quarter_db(bytes: &[u8], opts: &FormatOptions) -> Result<String> {
    if bytes.len() != 1 {
        return Err(len_err(&ValueType::PowerQuarterDb, "1", bytes.len()));
    }
    let precision = opts.precision.unwrap_or(1);
    let value = bytes[0] as f64 / 4.0;
    Ok(format!("{} dBmV", format_number(value, precision.max(1))))
}

fn parse_power_quarter_db(text: &str, value_type: &ValueType) -> Result<Vec<u8>> {
    let digits = text.strip_suffix(" dBmV").ok_or_else(|| format_err(value_type, text))?;
    let v: f64 = digits.parse().map_err(|_| format_err(value_type, text))?;
    let quarters = (v * 4.0).round();
    if !(0.0..=255.0).contains(&quarters) {
        return Err(format_err(value_type, text));
    }
    Ok(vec![quarters as u8])
}

// --- string / binary --------------------------------------------------------------------------------------------

fn strip_trailing_nul(bytes: &[u8]) -> &[u8] {
    match bytes.iter().rposition(|&b| b != 0) {
        Some(last) => &bytes[..=last],
        None => &[],
    }
}

fn is_printable(bytes: &[u8]) -> bool {
    std::str::from_utf8(bytes)
        .map(|s| s.chars().all(|c| !c.is_control() || c == '\n' || c == '\t'))
        .unwrap_or(false)
}

fn format_string(bytes: &[u8]) -> String {
    let stripped = strip_trailing_nul(bytes);
    // Callers are expected to have called `ValueType::effective_for` first so that unprintable
    // bytes never reach this formatter tagged as `string`; this is a last-resort safety net.
    if is_printable(stripped) {
        String::from_utf8_lossy(stripped).into_owned()
    } else {
        to_hex_compact(stripped)
    }
}

fn format_binary(bytes: &[u8], opts: &FormatOptions) -> String {
    match opts.format_style {
        FormatStyle::Compact => to_hex_compact(bytes),
        FormatStyle::Verbose => {
            let mut out = String::new();
            for (i, chunk) in bytes.chunks(16).enumerate() {
                if i > 0 {
                    out.push('\n');
                }
                let hex: Vec<String> = chunk.iter().map(|b| format!("{:02X}", b)).collect();
                let ascii: String = chunk
                    .iter()
                    .map(|&b| if (0x20..0x7F).contains(&b) { b as char } else { '.' })
                    .collect();
                let _ = write!(out, "{:<47}  {}", hex.join(" "), ascii);
            }
            out
        }
    }
}

fn parse_binary(text: &str, value_type: &ValueType) -> Result<Vec<u8>> {
    // Accept either the compact hex form or a verbose dump's leading hex columns per line.
    if let Some(bytes) = from_hex_compact(text) {
        return Ok(bytes);
    }
    let mut out = Vec::new();
    for line in text.lines() {
        let hex_part = line.split("  ").next().unwrap_or(line);
        for tok in hex_part.split_whitespace() {
            out.push(u8::from_str_radix(tok, 16).map_err(|_| format_err(value_type, text))?);
        }
    }
    if out.is_empty() && !text.is_empty() {
        return Err(format_err(value_type, text));
    }
    Ok(out)
}

fn to_hex_compact(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02X}", b)).collect()
}

fn from_hex_compact(text: &str) -> Option<Vec<u8>> {
    if text.is_empty() {
        return Some(Vec::new());
    }
    hex::decode(text).ok()
}

fn to_hex_spaced(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02X}", b)).collect::<Vec<_>>().join(" ")
}

fn from_hex_spaced(text: &str) -> Option<Vec<u8>> {
    let mut out = Vec::new();
    for tok in text.split_whitespace() {
        out.push(u8::from_str_radix(tok, 16).ok()?);
    }
    Some(out)
}

// --- service_flow_ref -------------------------------------------------------------------------------------------

fn format_service_flow_ref(bytes: &[u8]) -> Result<String> {
    let n = match bytes.len() {
        1 => bytes[0] as u32,
        2 => u16::from_be_bytes([bytes[0], bytes[1]]) as u32,
        _ => return Err(len_err(&ValueType::ServiceFlowRef, "1 or 2", bytes.len())),
    };
    Ok(format!("Service Flow #{}", n))
}

fn parse_service_flow_ref(text: &str, value_type: &ValueType) -> Result<Vec<u8>> {
    let n: u32 = text
        .strip_prefix("Service Flow #")
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| format_err(value_type, text))?;
    if n <= u8::MAX as u32 {
        Ok(vec![n as u8])
    } else if n <= u16::MAX as u32 {
        Ok((n as u16).to_be_bytes().to_vec())
    } else {
        Err(format_err(value_type, text))
    }
}

// --- vendor_oui / vendor ----------------------------------------------------------------------------------------

fn format_vendor_oui(bytes: &[u8]) -> Result<String> {
    if bytes.len() != 3 {
        return Err(len_err(&ValueType::VendorOui, "3", bytes.len()));
    }
    let base = format!("{:02X}:{:02X}:{:02X}", bytes[0], bytes[1], bytes[2]);
    match oui::lookup(bytes[0], bytes[1], bytes[2]) {
        Some(name) => Ok(format!("{} ({})", base, name)),
        None => Ok(base),
    }
}

fn parse_vendor_oui(text: &str, value_type: &ValueType) -> Result<Vec<u8>> {
    let prefix = text.split(' ').next().ok_or_else(|| format_err(value_type, text))?;
    let parts: Vec<&str> = prefix.split(':').collect();
    if parts.len() != 3 {
        return Err(format_err(value_type, text));
    }
    let mut out = Vec::with_capacity(3);
    for p in parts {
        out.push(u8::from_str_radix(p, 16).map_err(|_| format_err(value_type, text))?);
    }
    Ok(out)
}

fn format_vendor(bytes: &[u8], opts: &FormatOptions) -> Result<FormattedValue> {
    if bytes.len() < 3 {
        return Err(len_err(&ValueType::Vendor, "at least 3", bytes.len()));
    }
    let oui_bytes = &bytes[..3];
    let data = &bytes[3..];
    let oui_str = format!("{:02X}:{:02X}:{:02X}", oui_bytes[0], oui_bytes[1], oui_bytes[2]);
    let mut obj = serde_json::Map::new();
    obj.insert("oui".to_string(), serde_json::Value::String(oui_str));
    obj.insert("data".to_string(), serde_json::Value::String(to_hex_compact(data)));
    if let Some(name) = oui::lookup(oui_bytes[0], oui_bytes[1], oui_bytes[2]) {
        obj.insert("vendor_name".to_string(), serde_json::Value::String(name.to_string()));
    }
    let _ = opts;
    Ok(FormattedValue::Structured(serde_json::Value::Object(obj)))
}

fn parse_vendor(value: &FormattedValue) -> Result<Vec<u8>> {
    let obj = match value {
        FormattedValue::Structured(serde_json::Value::Object(m)) => m,
        _ => return Err(format_err(&ValueType::Vendor, "<non-object>")),
    };
    let oui_str = obj
        .get("oui")
        .and_then(|v| v.as_str())
        .ok_or_else(|| format_err(&ValueType::Vendor, "<missing oui>"))?;
    let parts: Vec<&str> = oui_str.split(':').collect();
    if parts.len() != 3 {
        return Err(format_err(&ValueType::Vendor, oui_str));
    }
    let mut out = Vec::with_capacity(3);
    for p in parts {
        out.push(u8::from_str_radix(p, 16).map_err(|_| format_err(&ValueType::Vendor, oui_str))?);
    }
    if let Some(data) = obj.get("data").and_then(|v| v.as_str()) {
        out.extend(from_hex_compact(data).ok_or_else(|| format_err(&ValueType::Vendor, data))?);
    }
    Ok(out)
}

// --- compound / marker ------------------------------------------------------------------------------------------

fn format_marker(bytes: &[u8]) -> Result<String> {
    if !bytes.is_empty() {
        return Err(len_err(&ValueType::Marker, "0", bytes.len()));
    }
    Ok("<End-of-Data>".to_string())
}

fn parse_marker(text: &str, value_type: &ValueType) -> Result<Vec<u8>> {
    if text == "<End-of-Data>" {
        Ok(Vec::new())
    } else {
        Err(format_err(value_type, text))
    }
}

// --- oid / snmp_oid ---------------------------------------------------------------------------------------------

fn format_oid(bytes: &[u8]) -> String {
    match crate::asn1::decode_oid(bytes) {
        Ok(components) => components
            .iter()
            .map(|c| c.to_string())
            .collect::<Vec<_>>()
            .join("."),
        Err(_) => to_hex_compact(bytes),
    }
}

fn parse_oid(text: &str, value_type: &ValueType) -> Result<Vec<u8>> {
    if text.contains('.') {
        let components: std::result::Result<Vec<u64>, _> = text.split('.').map(|p| p.parse::<u64>()).collect();
        if let Ok(components) = components {
            if let Ok(bytes) = crate::asn1::encode_oid(&components) {
                return Ok(bytes);
            }
        }
    }
    from_hex_compact(text).ok_or_else(|| format_err(value_type, text))
}

// --- certificate / asn1_der --------------------------------------------------------------------------------------

fn format_asn1(bytes: &[u8], opts: &FormatOptions) -> Result<FormattedValue> {
    match opts.format_style {
        FormatStyle::Compact => Ok(FormattedValue::Text(format!("<{} bytes>", bytes.len()))),
        FormatStyle::Verbose => {
            if let Ok((node, consumed)) = crate::asn1::parse_one(bytes) {
                if consumed == bytes.len() {
                    if let Some((oid, value_node)) = node.as_snmp_mib_object() {
                        let mut obj = serde_json::Map::new();
                        obj.insert(
                            "oid".to_string(),
                            serde_json::Value::String(
                                oid.iter().map(|c| c.to_string()).collect::<Vec<_>>().join("."),
                            ),
                        );
                        obj.insert("type".to_string(), serde_json::Value::String(asn1_type_name(value_node)));
                        obj.insert("value".to_string(), asn1_value_json(value_node));
                        return Ok(FormattedValue::Structured(serde_json::Value::Object(obj)));
                    }
                    return Ok(FormattedValue::Structured(asn1_summary_json(&node)));
                }
            }
            Ok(FormattedValue::Text(format!("<{} bytes>", bytes.len())))
        }
    }
}

fn parse_asn1(value: &FormattedValue) -> Result<Vec<u8>> {
    match value {
        FormattedValue::Text(text) => from_hex_compact(text).ok_or_else(|| format_err(&ValueType::Asn1Der, text)),
        FormattedValue::Structured(serde_json::Value::Object(obj)) => {
            let oid_str = obj
                .get("oid")
                .and_then(|v| v.as_str())
                .ok_or_else(|| format_err(&ValueType::Asn1Der, "<missing oid>"))?;
            let components: Vec<u64> = oid_str
                .split('.')
                .map(|p| p.parse())
                .collect::<std::result::Result<_, _>>()
                .map_err(|_| format_err(&ValueType::Asn1Der, oid_str))?;
            let oid_payload = crate::asn1::encode_oid(&components)
                .map_err(|_| format_err(&ValueType::Asn1Der, oid_str))?;
            let mut oid_tlv = vec![0x06, oid_payload.len() as u8];
            oid_tlv.extend(&oid_payload);

            let value = obj.get("value").ok_or_else(|| format_err(&ValueType::Asn1Der, "<missing value>"))?;
            let int_value: i64 = value
                .as_i64()
                .ok_or_else(|| format_err(&ValueType::Asn1Der, "<non-integer value>"))?;
            let int_bytes = minimal_signed_bytes(int_value);
            let mut int_tlv = vec![0x02, int_bytes.len() as u8];
            int_tlv.extend(&int_bytes);

            let mut payload = oid_tlv;
            payload.extend(int_tlv);
            let mut seq = vec![0x30, payload.len() as u8];
            seq.extend(payload);
            Ok(seq)
        }
        FormattedValue::Structured(_) => Err(format_err(&ValueType::Asn1Der, "<unsupported structure>")),
    }
}

fn minimal_signed_bytes(value: i64) -> Vec<u8> {
    let mut bytes = value.to_be_bytes().to_vec();
    while bytes.len() > 1 {
        let keep_leading_zero = bytes[0] == 0x00 && bytes[1] & 0x80 == 0;
        let keep_leading_ff = bytes[0] == 0xFF && bytes[1] & 0x80 != 0;
        if keep_leading_zero || keep_leading_ff {
            bytes.remove(0);
        } else {
            break;
        }
    }
    bytes
}

fn asn1_type_name(node: &crate::asn1::Asn1Node) -> String {
    use crate::asn1::universal;
    match node.tag_number {
        universal::INTEGER => "INTEGER".to_string(),
        universal::OCTET_STRING => "OCTET_STRING".to_string(),
        universal::OBJECT_IDENTIFIER => "OID".to_string(),
        universal::SEQUENCE => "SEQUENCE".to_string(),
        universal::SET => "SET".to_string(),
        n => format!("TAG_{}", n),
    }
}

fn asn1_value_json(node: &crate::asn1::Asn1Node) -> serde_json::Value {
    use crate::asn1::DecodedValue;
    match &node.decoded {
        DecodedValue::Integer(i) => {
            // Most SNMP MIB scalars fit i64; fall back to a decimal string for anything larger.
            match i.to_string().parse::<i64>() {
                Ok(v) => serde_json::Value::Number(v.into()),
                Err(_) => serde_json::Value::String(i.to_string()),
            }
        }
        DecodedValue::OctetString(bytes) => serde_json::Value::String(to_hex_compact(bytes)),
        DecodedValue::ObjectIdentifier(oid) => {
            serde_json::Value::String(oid.iter().map(|c| c.to_string()).collect::<Vec<_>>().join("."))
        }
        DecodedValue::Raw => serde_json::Value::String(to_hex_compact(&node.payload)),
    }
}

fn asn1_summary_json(node: &crate::asn1::Asn1Node) -> serde_json::Value {
    let mut obj = serde_json::Map::new();
    obj.insert("type".to_string(), serde_json::Value::String(asn1_type_name(node)));
    if node.children.is_empty() {
        obj.insert("value".to_string(), asn1_value_json(node));
    } else {
        let children: Vec<serde_json::Value> = node.children.iter().map(asn1_summary_json).collect();
        obj.insert("children".to_string(), serde_json::Value::Array(children));
    }
    serde_json::Value::Object(obj)
}

// --- timestamp --------------------------------------------------------------------------------------------------

fn format_timestamp(bytes: &[u8]) -> Result<String> {
    if bytes.len() != 4 {
        return Err(len_err(&ValueType::Timestamp, "4", bytes.len()));
    }
    let mut buf = [0u8; 4];
    buf.copy_from_slice(bytes);
    let secs = u32::from_be_bytes(buf);
    if secs == 0 {
        return Ok("Not Set".to_string());
    }
    match chrono::DateTime::from_timestamp(secs as i64, 0) {
        Some(dt) => Ok(dt.format("%Y-%m-%d %H:%M:%S UTC").to_string()),
        None => Ok(format!("Invalid timestamp: {}", secs)),
    }
}

fn parse_timestamp(text: &str, value_type: &ValueType) -> Result<Vec<u8>> {
    if text == "Not Set" {
        return Ok(vec![0, 0, 0, 0]);
    }
    if let Some(rest) = text.strip_prefix("Invalid timestamp: ") {
        let secs: u32 = rest.parse().map_err(|_| format_err(value_type, text))?;
        return Ok(secs.to_be_bytes().to_vec());
    }
    let dt = chrono::NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S UTC")
        .map_err(|_| format_err(value_type, text))?;
    let secs = dt.and_utc().timestamp();
    if secs < 0 || secs > u32::MAX as i64 {
        return Err(format_err(value_type, text));
    }
    Ok((secs as u32).to_be_bytes().to_vec())
}

// --- enum<M> / enum<M,underlying> ---------------------------------------------------------------------------------

fn enum_width(bytes_len: usize, declared: Option<u8>) -> Result<usize> {
    let err = || {
        Error::pinpoint(
            FormatError::WrongByteLength {
                value_type: "enum".to_string(),
                expected: declared.map(|w| w.to_string()).unwrap_or_else(|| "1, 2 or 4".to_string()),
                actual: bytes_len,
            },
            ErrorLocation::unknown(),
        )
    };
    if let Some(w) = declared {
        if bytes_len != w as usize {
            return Err(err());
        }
    }
    match bytes_len {
        1 | 2 | 4 => Ok(bytes_len),
        _ => Err(err()),
    }
}

fn format_enum(bytes: &[u8], map: &EnumMap, declared_width: Option<u8>, opts: &FormatOptions) -> Result<String> {
    let width = enum_width(bytes.len(), declared_width)?;
    let mut buf = [0u8; 8];
    buf[8 - width..].copy_from_slice(bytes);
    let value = u64::from_be_bytes(buf) as u32;
    let name = map.name_of(value);
    Ok(match (opts.format_style, name) {
        (FormatStyle::Compact, Some(n)) => n.to_string(),
        (FormatStyle::Compact, None) => format!("{} (unknown)", value),
        (FormatStyle::Verbose, Some(n)) => format!("{} ({})", value, n),
        (FormatStyle::Verbose, None) => format!("{} (unknown)", value),
    })
}

fn parse_enum(text: &str, map: &EnumMap, declared_width: Option<u8>, value_type: &ValueType) -> Result<Vec<u8>> {
    let value: u32 = if let Some(stripped) = text.strip_suffix(" (unknown)") {
        stripped.parse().map_err(|_| format_err(value_type, text))?
    } else if let Some(open) = text.find(" (") {
        if let Some(name) = text[open + 2..].strip_suffix(')') {
            if let Some(v) = map.value_of(name) {
                v
            } else {
                text[..open].parse().map_err(|_| format_err(value_type, text))?
            }
        } else {
            return Err(format_err(value_type, text));
        }
    } else if let Some(v) = map.value_of(text) {
        v
    } else {
        return Err(format_err(value_type, text));
    };

    let width = declared_width.map(|w| w as usize).unwrap_or_else(|| {
        if value <= u8::MAX as u32 {
            1
        } else if value <= u16::MAX as u32 {
            2
        } else {
            4
        }
    });
    let full = value.to_be_bytes();
    Ok(full[4 - width..].to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts() -> FormatOptions {
        FormatOptions::default()
    }

    #[test]
    fn frequency_round_trips_scenario_1() {
        let bytes = [0x23, 0x39, 0xF1, 0xC0];
        let formatted = format_value(&ValueType::Frequency, &bytes, &opts()).unwrap();
        assert_eq!(formatted.as_text(), Some("591 MHz"));
        let back = parse_value(&ValueType::Frequency, &formatted, &opts()).unwrap();
        assert_eq!(back, bytes);
    }

    #[test]
    fn boolean_enabled_and_disabled() {
        assert_eq!(
            format_value(&ValueType::Boolean, &[1], &opts()).unwrap().as_text(),
            Some("Enabled")
        );
        assert_eq!(
            format_value(&ValueType::Boolean, &[0], &opts()).unwrap().as_text(),
            Some("Disabled")
        );
    }

    #[test]
    fn ipv4_formats_dotted() {
        let bytes = [192, 168, 1, 100];
        let formatted = format_value(&ValueType::Ipv4, &bytes, &opts()).unwrap();
        assert_eq!(formatted.as_text(), Some("192.168.1.100"));
        assert_eq!(parse_value(&ValueType::Ipv4, &formatted, &opts()).unwrap(), bytes);
    }

    #[test]
    fn mac_address_round_trips() {
        let bytes = [0x00, 0x10, 0x95, 0xAB, 0xCD, 0xEF];
        let formatted = format_value(&ValueType::MacAddress, &bytes, &opts()).unwrap();
        assert_eq!(formatted.as_text(), Some("00:10:95:AB:CD:EF"));
        assert_eq!(parse_value(&ValueType::MacAddress, &formatted, &opts()).unwrap(), bytes);
    }

    #[test]
    fn vendor_oui_annotates_known_vendor() {
        let bytes = [0x00, 0x10, 0x95];
        let formatted = format_value(&ValueType::VendorOui, &bytes, &opts()).unwrap();
        assert!(formatted.as_text().unwrap().contains("Broadcom"));
        assert_eq!(parse_value(&ValueType::VendorOui, &formatted, &opts()).unwrap(), bytes);
    }

    #[test]
    fn duration_picks_largest_clean_unit() {
        assert_eq!(
            format_value(&ValueType::Duration, &90u32.to_be_bytes(), &opts()).unwrap().as_text(),
            Some("90 seconds")
        );
        assert_eq!(
            format_value(&ValueType::Duration, &120u32.to_be_bytes(), &opts()).unwrap().as_text(),
            Some("2 minutes")
        );
        assert_eq!(
            format_value(&ValueType::Duration, &3600u32.to_be_bytes(), &opts()).unwrap().as_text(),
            Some("1 hour")
        );
        assert_eq!(
            format_value(&ValueType::Duration, &86400u32.to_be_bytes(), &opts()).unwrap().as_text(),
            Some("1 day")
        );
    }

    #[test]
    fn string_falls_back_to_binary_when_not_printable() {
        let bytes = [0xFF, 0xFE, 0x01];
        let effective = ValueType::String.effective_for(&bytes);
        assert_eq!(effective, ValueType::Binary);
        let formatted = format_value(&effective, &bytes, &opts()).unwrap();
        let back = parse_value(&effective, &formatted, &opts()).unwrap();
        assert_eq!(back, bytes);
    }

    #[test]
    fn string_strips_trailing_nul() {
        let bytes = b"hello\0\0\0";
        let formatted = format_value(&ValueType::String, bytes, &opts()).unwrap();
        assert_eq!(formatted.as_text(), Some("hello"));
    }

    #[test]
    fn timestamp_zero_is_not_set() {
        let formatted = format_value(&ValueType::Timestamp, &[0, 0, 0, 0], &opts()).unwrap();
        assert_eq!(formatted.as_text(), Some("Not Set"));
        assert_eq!(parse_value(&ValueType::Timestamp, &formatted, &opts()).unwrap(), vec![0, 0, 0, 0]);
    }

    #[test]
    fn enum_unknown_value_reports_unknown() {
        let map = EnumMap::from_static(&[(1, "Gold"), (2, "Silver")]);
        let formatted = format_value(&ValueType::Enum(map), &[3], &opts()).unwrap();
        assert_eq!(formatted.as_text(), Some("3 (unknown)"));
    }

    #[test]
    fn snmp_mib_object_formats_structured() {
        let oid_bytes = crate::asn1::encode_oid(&[1, 3, 6, 1, 2, 1, 1, 1]).unwrap();
        let mut seq_payload = vec![0x06, oid_bytes.len() as u8];
        seq_payload.extend(&oid_bytes);
        seq_payload.extend(&[0x02, 0x01, 0x2A]);
        let mut der = vec![0x30, seq_payload.len() as u8];
        der.extend(&seq_payload);

        let mut verbose = opts();
        verbose.format_style = FormatStyle::Verbose;
        let formatted = format_value(&ValueType::Asn1Der, &der, &verbose).unwrap();
        match &formatted {
            FormattedValue::Structured(serde_json::Value::Object(m)) => {
                assert_eq!(m.get("oid").unwrap(), "1.3.6.1.2.1.1.1");
                assert_eq!(m.get("type").unwrap(), "INTEGER");
                assert_eq!(m.get("value").unwrap(), 42);
            }
            other => panic!("expected structured object, got {:?}", other),
        }
        let back = parse_value(&ValueType::Asn1Der, &formatted, &opts()).unwrap();
        assert_eq!(back, der);
    }
}
