//! Atomic formulas: a single typed comparison between a subject attribute
//! and a literal.

use alloc::string::String;
use core::fmt;
use serde::Serialize;

use crate::error::FormulaError;
use crate::formula::{Key, Operator, ValueType};
use crate::metadata::{AppInstallMetadata, Attribute};
use crate::utils::hex_digest;

/// Names longer than this are stored hashed by [`AtomicFormula::string_auto_hashed`].
pub const MAX_PLAINTEXT_NAME_LEN: usize = 32;

/// Literal an atomic formula compares against.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum FormulaValue {
    String(String),
    Long(i64),
    Boolean(bool),
}

impl FormulaValue {
    pub fn value_type(&self) -> ValueType {
        match self {
            FormulaValue::String(_) => ValueType::String,
            FormulaValue::Long(_) => ValueType::Long,
            FormulaValue::Boolean(_) => ValueType::Boolean,
        }
    }
}

/// `key <operator> value`, optionally against a hashed subject attribute.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct AtomicFormula {
    key: Key,
    operator: Operator,
    value: FormulaValue,
    is_hashed_value: bool,
}

impl AtomicFormula {
    /// Validating constructor.
    ///
    /// Fails if the value type does not match the key, the operator is not
    /// legal for the key, or `is_hashed_value` is set on a non-string key.
    pub fn new(
        key: Key,
        operator: Operator,
        value: FormulaValue,
        is_hashed_value: bool,
    ) -> Result<Self, FormulaError> {
        let expected = key.value_type();
        if value.value_type() != expected {
            return Err(FormulaError::ValueTypeMismatch {
                key,
                expected: expected.name(),
            });
        }
        if !key.supports(operator) {
            return Err(FormulaError::OperatorNotSupported { key, operator });
        }
        if is_hashed_value && expected != ValueType::String {
            return Err(FormulaError::HashedValueNotSupported(key));
        }
        Ok(Self::from_parts(key, operator, value, is_hashed_value))
    }

    /// String equality formula.
    pub fn string(
        key: Key,
        value: impl Into<String>,
        is_hashed_value: bool,
    ) -> Result<Self, FormulaError> {
        Self::new(
            key,
            Operator::Eq,
            FormulaValue::String(value.into()),
            is_hashed_value,
        )
    }

    /// Integer comparison formula.
    pub fn long(key: Key, operator: Operator, value: i64) -> Result<Self, FormulaError> {
        Self::new(key, operator, FormulaValue::Long(value), false)
    }

    /// Boolean equality formula.
    pub fn boolean(key: Key, value: bool) -> Result<Self, FormulaError> {
        Self::new(key, Operator::Eq, FormulaValue::Boolean(value), false)
    }

    /// String equality where long package or installer names are stored
    /// as their digest instead of plaintext.
    pub(crate) fn string_auto_hashed(key: Key, value: impl Into<String>) -> Self {
        let value = value.into();
        let hash = matches!(key, Key::PackageName | Key::InstallerName)
            && value.len() > MAX_PLAINTEXT_NAME_LEN;
        if hash {
            Self::from_parts(
                key,
                Operator::Eq,
                FormulaValue::String(hex_digest(value.as_bytes())),
                true,
            )
        } else {
            Self::from_parts(key, Operator::Eq, FormulaValue::String(value), false)
        }
    }

    /// Callers must already hold a valid combination.
    pub(crate) fn from_parts(
        key: Key,
        operator: Operator,
        value: FormulaValue,
        is_hashed_value: bool,
    ) -> Self {
        Self {
            key,
            operator,
            value,
            is_hashed_value,
        }
    }

    pub fn key(&self) -> Key {
        self.key
    }

    pub fn operator(&self) -> Operator {
        self.operator
    }

    pub fn value(&self) -> &FormulaValue {
        &self.value
    }

    pub fn is_hashed_value(&self) -> bool {
        self.is_hashed_value
    }

    pub fn matches(&self, metadata: &AppInstallMetadata) -> bool {
        match (&self.value, metadata.attribute(self.key)) {
            (FormulaValue::String(expected), Attribute::Str(actual)) => {
                if self.is_hashed_value {
                    hex_digest(actual.as_bytes()).as_bytes() == expected.as_bytes()
                } else {
                    actual == expected.as_str()
                }
            }
            (FormulaValue::Long(expected), Attribute::Long(actual)) => {
                compare_long(self.operator, actual, *expected)
            }
            (FormulaValue::Boolean(expected), Attribute::Boolean(actual)) => actual == *expected,
            // unreachable for validated formulas
            _ => false,
        }
    }
}

fn compare_long(operator: Operator, actual: i64, expected: i64) -> bool {
    match operator {
        Operator::Eq => actual == expected,
        Operator::Ne => actual != expected,
        Operator::Gt => actual > expected,
        Operator::Ge => actual >= expected,
        Operator::Lt => actual < expected,
        Operator::Le => actual <= expected,
    }
}

impl fmt::Display for AtomicFormula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({} {} ", self.key, self.operator)?;
        match &self.value {
            FormulaValue::String(s) => f.write_str(s)?,
            FormulaValue::Long(v) => write!(f, "{}", v)?,
            FormulaValue::Boolean(b) => write!(f, "{}", b)?,
        }
        f.write_str(")")
    }
}
