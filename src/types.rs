//! Small shared value types used throughout the crate: byte offsets, the
//! recognized DOCSIS versions, and the two TLV length-field dialects.

use std::fmt::{Debug, Display};
use std::ops::Deref;

// --- ByteOffset -------------------------------------------------------------------------------------------------

/// An offset into a collection of bytes, relative to the start of the original input.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ByteOffset(pub u64);

impl Deref for ByteOffset {
    type Target = u64;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Debug for ByteOffset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Display for ByteOffset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<usize> for ByteOffset {
    fn from(v: usize) -> Self {
        ByteOffset(v as u64)
    }
}

impl From<u64> for ByteOffset {
    fn from(v: u64) -> Self {
        ByteOffset(v)
    }
}

// --- DocsisVersion ----------------------------------------------------------------------------------------------

/// A DOCSIS specification version recognized by the [crate::registry::SpecRegistry].
///
/// Ordering matches the spec's own progression: `V1_0 < V1_1 < V2_0 < V3_0 < V3_1 < V4_0`. This
/// ordering underpins the registry monotonicity property in spec §8 — a TLV type admissible at
/// version `v` stays admissible at every later version unless explicitly deprecated.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DocsisVersion {
    V1_0,
    V1_1,
    V2_0,
    V3_0,
    V3_1,
    V4_0,
}

impl DocsisVersion {
    pub const ALL: [DocsisVersion; 6] = [
        DocsisVersion::V1_0,
        DocsisVersion::V1_1,
        DocsisVersion::V2_0,
        DocsisVersion::V3_0,
        DocsisVersion::V3_1,
        DocsisVersion::V4_0,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DocsisVersion::V1_0 => "1.0",
            DocsisVersion::V1_1 => "1.1",
            DocsisVersion::V2_0 => "2.0",
            DocsisVersion::V3_0 => "3.0",
            DocsisVersion::V3_1 => "3.1",
            DocsisVersion::V4_0 => "4.0",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|v| v.as_str() == s)
    }
}

impl Default for DocsisVersion {
    /// The default recognized version, per spec §6.
    fn default() -> Self {
        DocsisVersion::V3_1
    }
}

impl Display for DocsisVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// --- Dialect ----------------------------------------------------------------------------------------------------

/// The TLV length-field encoding in effect for a decode/encode operation.
///
/// This is a parameter of the operation, not a property baked into a [crate::tlv::Tlv] tree: the
/// same tree can be emitted under either dialect, and round-trips exactly under the one it was
/// decoded from (spec §9, "Length encoding choice").
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Dialect {
    /// Single-byte length field; values over 255 bytes cannot be represented.
    Classic,
    /// Variable-width length field: high bit set on the first byte means "number of additional
    /// big-endian length bytes follows"; otherwise the byte is the length directly.
    Extended,
}

impl Default for Dialect {
    fn default() -> Self {
        Dialect::Extended
    }
}
