//! The error taxonomy shared by every component of the crate.
//!
//! An [`Error`] pairs an [`ErrorKind`] (what went wrong) with an
//! [`ErrorLocation`] (where in the TLV tree or byte stream it went wrong).
//! Components that have no notion of position (e.g. the value codec acting
//! on an isolated byte string) may construct an [`ErrorLocation::unknown`].

use std::fmt::{Debug, Display};

use crate::types::ByteOffset;

pub type Result<T> = std::result::Result<T, Error>;

// --- Error ------------------------------------------------------------------------------------------------------

/// Details of a failure and the location in the data where it occurred.
#[derive(Debug)]
#[non_exhaustive]
pub struct Error {
    kind: ErrorKind,
    location: ErrorLocation,
}

impl Error {
    pub fn new(kind: ErrorKind, location: ErrorLocation) -> Self {
        Self { kind, location }
    }

    /// Get details about the kind of error that occurred.
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// Get details about where in the data the error occurred.
    pub fn location(&self) -> &ErrorLocation {
        &self.location
    }

    pub(crate) fn pinpoint<T, L>(error: T, location: L) -> Self
    where
        ErrorKind: From<T>,
        ErrorLocation: From<L>,
    {
        Self {
            kind: error.into(),
            location: location.into(),
        }
    }

    pub(crate) fn with_location(mut self, location: ErrorLocation) -> Self {
        self.location = self.location.merge(location);
        self
    }
}

impl std::error::Error for Error {}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (at {})", self.kind, self.location)
    }
}

// --- ErrorKind ----------------------------------------------------------------------------------------------------

/// The taxonomy of faults this crate can raise.
///
/// Roughly grouped as:
///   - Faults while reading/writing the binary wire format: [ErrorKind::Parse], [ErrorKind::Generation].
///   - Faults while validating a parsed tree: [ErrorKind::Validation].
///   - Faults while (de)serializing a single typed value: [ErrorKind::Format].
///   - Faults raised only by external collaborators but reserved here for a stable taxonomy:
///     [ErrorKind::File], [ErrorKind::Mic].
///   - Faults raised while manipulating a [crate::tlv::Tlv] node directly: [ErrorKind::Tlv].
#[derive(Debug)]
#[non_exhaustive]
pub enum ErrorKind {
    /// The binary TLV wire format could not be decoded.
    Parse(ParseError),
    /// A TLV tree could not be validated against a declared DOCSIS version.
    Validation(ValidationError),
    /// A TLV tree could not be re-encoded to the binary wire format.
    Generation(GenerationError),
    /// Reserved for an external file-I/O collaborator; this crate never constructs it.
    File(String),
    /// Reserved for an external Message Integrity Check collaborator; this crate never constructs it.
    Mic(String),
    /// A fault local to a single TLV node that does not fit the parse/generation split.
    Tlv(String),
    /// A typed value could not be formatted or parsed.
    Format(FormatError),
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::Parse(e) => write!(f, "parse error: {}", e),
            ErrorKind::Validation(e) => write!(f, "validation error: {}", e),
            ErrorKind::Generation(e) => write!(f, "generation error: {}", e),
            ErrorKind::File(msg) => write!(f, "file error: {}", msg),
            ErrorKind::Mic(msg) => write!(f, "MIC error: {}", msg),
            ErrorKind::Tlv(msg) => write!(f, "TLV error: {}", msg),
            ErrorKind::Format(e) => write!(f, "format error: {}", e),
        }
    }
}

impl From<ParseError> for ErrorKind {
    fn from(e: ParseError) -> Self {
        ErrorKind::Parse(e)
    }
}

impl From<GenerationError> for ErrorKind {
    fn from(e: GenerationError) -> Self {
        ErrorKind::Generation(e)
    }
}

impl From<FormatError> for ErrorKind {
    fn from(e: FormatError) -> Self {
        ErrorKind::Format(e)
    }
}

impl From<ValidationError> for ErrorKind {
    fn from(e: ValidationError) -> Self {
        ErrorKind::Validation(e)
    }
}

// --- ParseError -----------------------------------------------------------------------------------------------------

/// Faults raised while decoding the binary TLV wire format or an embedded ASN.1 DER blob.
#[derive(Debug)]
#[non_exhaustive]
pub enum ParseError {
    /// The input ended before a complete `type`/`length`/`value` triple could be read.
    Truncated { needed: usize, available: usize },
    /// A declared `length` would read past the end of the enclosing buffer.
    LengthOverrun { declared: usize, remaining: usize },
    /// `length` did not match the number of bytes actually consumed while decoding.
    LengthMismatch { declared: usize, actual: usize },
    /// TLV type `0` or `255` was encountered without the dialect flag that permits it.
    ReservedType(u8),
    /// The ASN.1 DER length used the reserved indefinite-length form.
    IndefiniteLength,
    /// An ASN.1 OBJECT IDENTIFIER's base-128 sub-identifier encoding was malformed.
    MalformedOid,
    /// A length could not be represented with the available length-field bytes.
    MalformedLength,
}

impl Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::Truncated { needed, available } => write!(
                f,
                "truncated input: needed {} bytes, only {} available",
                needed, available
            ),
            ParseError::LengthOverrun { declared, remaining } => write!(
                f,
                "declared length {} exceeds {} remaining bytes",
                declared, remaining
            ),
            ParseError::LengthMismatch { declared, actual } => write!(
                f,
                "declared length {} does not match {} actual bytes",
                declared, actual
            ),
            ParseError::ReservedType(t) => {
                write!(f, "TLV type {} is reserved in this dialect", t)
            }
            ParseError::IndefiniteLength => {
                write!(f, "indefinite-form ASN.1 length is not permitted")
            }
            ParseError::MalformedOid => {
                write!(f, "malformed OBJECT IDENTIFIER continuation bytes")
            }
            ParseError::MalformedLength => write!(f, "malformed length encoding"),
        }
    }
}

// --- GenerationError ------------------------------------------------------------------------------------------------

/// Faults raised while re-encoding a TLV tree to the binary wire format.
#[derive(Debug)]
#[non_exhaustive]
pub enum GenerationError {
    /// A node's value length cannot be represented in the active dialect's length encoding.
    ExceedsMaxLength { length: usize, max: usize },
}

impl Display for GenerationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GenerationError::ExceedsMaxLength { length, max } => write!(
                f,
                "value length {} exceeds the maximum {} representable in this dialect",
                length, max
            ),
        }
    }
}

// --- ValidationError -------------------------------------------------------------------------------------------------

/// Faults raised while validating a parsed tree; these are distinct from the warnings/errors
/// that accumulate in a [crate::validator::Report] and are only raised when validation itself
/// cannot proceed (e.g. a malformed registry fixture).
#[derive(Debug)]
#[non_exhaustive]
pub enum ValidationError {
    /// The DOCSIS version requested for validation is not one this crate recognizes.
    UnrecognizedVersion(String),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::UnrecognizedVersion(v) => {
                write!(f, "unrecognized DOCSIS version {:?}", v)
            }
        }
    }
}

// --- FormatError ----------------------------------------------------------------------------------------------------

/// Faults raised by the value codec, either formatting bytes to text or parsing text back to bytes.
#[derive(Debug)]
#[non_exhaustive]
pub enum FormatError {
    /// The byte string's length is not one this value type accepts.
    WrongByteLength { value_type: String, expected: String, actual: usize },
    /// The textual form could not be parsed as this value type.
    InvalidText { value_type: String, text: String },
    /// The byte string is not printable and cannot be formatted as `string`.
    NotPrintable,
}

impl Display for FormatError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FormatError::WrongByteLength { value_type, expected, actual } => write!(
                f,
                "{} expects {} bytes, got {}",
                value_type, expected, actual
            ),
            FormatError::InvalidText { value_type, text } => {
                write!(f, "{:?} is not a valid {} value", text, value_type)
            }
            FormatError::NotPrintable => write!(f, "byte string is not printable"),
        }
    }
}

// --- ErrorLocation --------------------------------------------------------------------------------------------------

/// Details about where in the data an error occurred: a byte offset relative to the original
/// input, plus the chain of ancestor TLV types leading to the fault.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ErrorLocation {
    offset: Option<ByteOffset>,
    parent_types: Vec<u8>,
    r#type: Option<u8>,
}

impl ErrorLocation {
    pub fn unknown() -> Self {
        Self::default()
    }

    pub fn at(offset: ByteOffset) -> Self {
        Self {
            offset: Some(offset),
            ..Default::default()
        }
    }

    pub fn with_offset(mut self, offset: ByteOffset) -> Self {
        self.offset.get_or_insert(offset);
        self
    }

    pub fn with_parent_types(mut self, parent_types: &[u8]) -> Self {
        if self.parent_types.is_empty() {
            self.parent_types.extend_from_slice(parent_types);
        }
        self
    }

    pub fn with_type(mut self, r#type: u8) -> Self {
        self.r#type.get_or_insert(r#type);
        self
    }

    pub(crate) fn merge(mut self, other: ErrorLocation) -> Self {
        if let Some(offset) = other.offset {
            self = self.with_offset(offset);
        }
        self = self.with_parent_types(&other.parent_types);
        if let Some(t) = other.r#type {
            self = self.with_type(t);
        }
        self
    }

    pub fn is_unknown(&self) -> bool {
        self.offset.is_none() && self.parent_types.is_empty() && self.r#type.is_none()
    }

    pub fn offset(&self) -> Option<ByteOffset> {
        self.offset
    }

    pub fn parent_types(&self) -> &[u8] {
        &self.parent_types
    }

    pub fn r#type(&self) -> Option<u8> {
        self.r#type
    }
}

impl From<ByteOffset> for ErrorLocation {
    fn from(offset: ByteOffset) -> Self {
        ErrorLocation::at(offset)
    }
}

impl From<usize> for ErrorLocation {
    fn from(offset: usize) -> Self {
        ErrorLocation::at(ByteOffset(offset as u64))
    }
}

impl Display for ErrorLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_unknown() {
            return f.write_str("unknown location");
        }

        let mut sep_str = "";
        let mut sep = || {
            let s = sep_str;
            sep_str = ", ";
            s
        };

        if let Some(offset) = self.offset {
            write!(f, "{}offset {}", sep(), *offset)?;
        }
        if !self.parent_types.is_empty() {
            write!(f, "{}path ", sep())?;
            let mut iter = self.parent_types.iter();
            write!(f, "{}", iter.next().unwrap())?;
            for t in iter {
                write!(f, ">{}", t)?;
            }
        }
        if let Some(t) = self.r#type {
            write!(f, "{}type {}", sep(), t)?;
        }
        Ok(())
    }
}
