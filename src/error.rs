//! Error types for integrity rule operations.
//!
//! Four failure classes exist: formula construction errors, binary encode
//! and decode errors, and rule store errors. All are `thiserror` enums;
//! `IntegrityError` wraps them for callers that want a single error type.

use alloc::string::String;
use thiserror::Error;

use crate::formula::{Connector, Key, Operator};

/// A formula or rule could not be constructed because it violates an invariant.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FormulaError {
    /// Connector code outside AND/OR/NOT
    #[error("Unknown connector: {0}")]
    UnknownConnector(i32),

    /// Key code outside the known subject attributes
    #[error("Unknown key: {0}")]
    UnknownKey(i32),

    /// Operator code outside EQ..NE
    #[error("Unknown operator: {0}")]
    UnknownOperator(i32),

    /// Effect code other than DENY or ALLOW
    #[error("Unknown effect: {0}")]
    UnknownEffect(i32),

    /// Unary connector (NOT) given other than exactly one child
    #[error("Connector {connector} must have 1 formula only (found {found})")]
    UnaryArity { connector: Connector, found: usize },

    /// Binary connector (AND/OR) given fewer than two children
    #[error("Connector {connector} must have at least 2 formulas (found {found})")]
    BinaryArity { connector: Connector, found: usize },

    /// Ordering operator applied to a string or boolean key
    #[error("Operator {operator} is not supported for key {key}")]
    OperatorNotSupported { key: Key, operator: Operator },

    /// Literal type does not match the key's value type
    #[error("Key {key} expects a {expected} value")]
    ValueTypeMismatch { key: Key, expected: &'static str },

    /// Hashed flag set on a non-string key
    #[error("Key {0} does not support hashed values")]
    HashedValueNotSupported(Key),
}

/// A formula, rule or rule list cannot be represented in the binary format.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EncodeError {
    /// String literal longer than the decoder accepts
    #[error("String of {0} bytes exceeds the encoding limit")]
    StringTooLong(usize),

    /// Compound nesting deeper than the decoder accepts
    #[error("Formula nesting exceeds depth limit of {0}")]
    DepthLimitExceeded(usize),

    /// Rule or child count does not fit the u32 length prefix
    #[error("{0} elements do not fit a u32 count")]
    TooManyElements(usize),
}

/// A byte buffer could not be decoded into a formula, rule or rule list.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DecodeError {
    /// Input ended before a field or counted sequence was complete
    #[error("Truncated input: needed {needed} bytes, {remaining} remaining")]
    Truncated { needed: usize, remaining: usize },

    /// Rule list does not start with the expected magic
    #[error("Bad magic: not a rule list document")]
    BadMagic,

    /// Format version byte not understood by this build
    #[error("Unsupported format version: {0}")]
    UnsupportedVersion(u8),

    /// Node tag is not one of the atomic or compound tags
    #[error("Unknown formula tag: {0}")]
    UnknownFormulaTag(u8),

    /// Boolean byte other than 0 or 1
    #[error("Invalid boolean byte: {0}")]
    InvalidBoolean(u8),

    /// String length prefix above the limit
    #[error("String of {0} bytes exceeds the encoding limit")]
    StringTooLong(usize),

    /// String bytes are not UTF-8
    #[error("String value is not valid UTF-8")]
    InvalidUtf8,

    /// Compound nesting deeper than the limit
    #[error("Formula nesting exceeds depth limit of {0}")]
    DepthLimitExceeded(usize),

    /// Bytes left over after a complete value
    #[error("{0} trailing bytes after encoded value")]
    TrailingBytes(usize),

    /// Decoded parts fail formula or rule validation
    #[error("Invalid formula: {0}")]
    Formula(#[from] FormulaError),
}

/// The rule store could not supply or persist rules.
#[derive(Debug, Error)]
pub enum RuleStoreError {
    /// Underlying file IO failed
    #[cfg(feature = "std")]
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored bytes failed the integrity check
    #[error("Rule file corrupted: {0}")]
    Corrupted(String),

    /// Rules could not be encoded for persisting
    #[error("Rule encode failed: {0}")]
    Encode(#[from] EncodeError),

    /// Stored bytes passed the checksum but are not a valid rule list
    #[error("Rule decode failed: {0}")]
    Decode(#[from] DecodeError),

    /// Backing source is not reachable
    #[error("Rule store unavailable: {0}")]
    Unavailable(String),
}

/// Umbrella error for integrity operations.
#[derive(Debug, Error)]
pub enum IntegrityError {
    #[error(transparent)]
    Formula(#[from] FormulaError),

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    RuleStore(#[from] RuleStoreError),
}

/// Result type alias for integrity operations.
pub type Result<T> = core::result::Result<T, IntegrityError>;
