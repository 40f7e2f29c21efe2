//! Boolean formula algebra over install metadata.
//!
//! A formula is a tree: atomic comparisons at the leaves, AND/OR/NOT
//! connectors at the inner nodes. Every constructor validates its
//! invariants, so a formula that exists in memory is always well formed.

pub mod atomic;
pub mod compound;

use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;
use core::fmt;
use serde::{Deserialize, Serialize};

use crate::error::FormulaError;
use crate::metadata::AppInstallMetadata;

pub use atomic::{AtomicFormula, FormulaValue};
pub use compound::CompoundFormula;

/// Subject attribute referenced by an atomic formula.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum Key {
    PackageName = 0,
    AppCertificate = 1,
    InstallerName = 2,
    InstallerCertificate = 3,
    VersionCode = 4,
    PreInstalled = 5,
}

/// The type of literal a key is compared against.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ValueType {
    String,
    Long,
    Boolean,
}

impl ValueType {
    pub fn name(&self) -> &'static str {
        match self {
            ValueType::String => "string",
            ValueType::Long => "integer",
            ValueType::Boolean => "boolean",
        }
    }
}

impl Key {
    pub fn code(self) -> i32 {
        self as i32
    }

    pub fn from_code(code: i32) -> Result<Self, FormulaError> {
        match code {
            0 => Ok(Key::PackageName),
            1 => Ok(Key::AppCertificate),
            2 => Ok(Key::InstallerName),
            3 => Ok(Key::InstallerCertificate),
            4 => Ok(Key::VersionCode),
            5 => Ok(Key::PreInstalled),
            _ => Err(FormulaError::UnknownKey(code)),
        }
    }

    pub fn value_type(self) -> ValueType {
        match self {
            Key::PackageName
            | Key::AppCertificate
            | Key::InstallerName
            | Key::InstallerCertificate => ValueType::String,
            Key::VersionCode => ValueType::Long,
            Key::PreInstalled => ValueType::Boolean,
        }
    }

    /// Whether `operator` is legal for this key's value type.
    pub fn supports(self, operator: Operator) -> bool {
        match self.value_type() {
            ValueType::Long => true,
            ValueType::String | ValueType::Boolean => operator == Operator::Eq,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Key::PackageName => "PACKAGE_NAME",
            Key::AppCertificate => "APP_CERTIFICATE",
            Key::InstallerName => "INSTALLER_NAME",
            Key::InstallerCertificate => "INSTALLER_CERTIFICATE",
            Key::VersionCode => "VERSION_CODE",
            Key::PreInstalled => "PRE_INSTALLED",
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Comparison applied by an atomic formula: `subject <op> value`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Operator {
    Eq = 0,
    Gt = 1,
    Ge = 2,
    Lt = 3,
    Le = 4,
    Ne = 5,
}

impl Operator {
    pub fn code(self) -> i32 {
        self as i32
    }

    pub fn from_code(code: i32) -> Result<Self, FormulaError> {
        match code {
            0 => Ok(Operator::Eq),
            1 => Ok(Operator::Gt),
            2 => Ok(Operator::Ge),
            3 => Ok(Operator::Lt),
            4 => Ok(Operator::Le),
            5 => Ok(Operator::Ne),
            _ => Err(FormulaError::UnknownOperator(code)),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Operator::Eq => "EQ",
            Operator::Gt => "GT",
            Operator::Ge => "GE",
            Operator::Lt => "LT",
            Operator::Le => "LE",
            Operator::Ne => "NE",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Boolean connector of a compound formula.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Connector {
    And = 0,
    Or = 1,
    Not = 2,
}

impl Connector {
    pub fn code(self) -> i32 {
        self as i32
    }

    pub fn from_code(code: i32) -> Result<Self, FormulaError> {
        match code {
            0 => Ok(Connector::And),
            1 => Ok(Connector::Or),
            2 => Ok(Connector::Not),
            _ => Err(FormulaError::UnknownConnector(code)),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Connector::And => "AND",
            Connector::Or => "OR",
            Connector::Not => "NOT",
        }
    }
}

impl fmt::Display for Connector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A boolean-valued expression over install metadata.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum IntegrityFormula {
    Atomic(AtomicFormula),
    Compound(CompoundFormula),
}

impl IntegrityFormula {
    /// Evaluate the formula against a subject.
    pub fn matches(&self, metadata: &AppInstallMetadata) -> bool {
        match self {
            IntegrityFormula::Atomic(f) => f.matches(metadata),
            IntegrityFormula::Compound(f) => f.matches(metadata),
        }
    }

    /// True if any leaf compares the app certificate.
    pub fn is_app_certificate_formula(&self) -> bool {
        self.any_leaf(&|f: &AtomicFormula| f.key() == Key::AppCertificate)
    }

    /// True if any leaf compares the installer name or certificate.
    pub fn is_installer_formula(&self) -> bool {
        self.any_leaf(&|f: &AtomicFormula| {
            matches!(f.key(), Key::InstallerName | Key::InstallerCertificate)
        })
    }

    fn any_leaf(&self, pred: &dyn Fn(&AtomicFormula) -> bool) -> bool {
        match self {
            IntegrityFormula::Atomic(f) => pred(f),
            IntegrityFormula::Compound(f) => f.formulas().iter().any(|c| c.any_leaf(pred)),
        }
    }

    /// `AND` over `formulas`; fails with fewer than two.
    pub fn all(formulas: Vec<IntegrityFormula>) -> Result<Self, FormulaError> {
        Ok(CompoundFormula::new(Connector::And, formulas)?.into())
    }

    /// `OR` over `formulas`; fails with fewer than two.
    pub fn any(formulas: Vec<IntegrityFormula>) -> Result<Self, FormulaError> {
        Ok(CompoundFormula::new(Connector::Or, formulas)?.into())
    }

    /// `NOT` of a single formula. Always well formed.
    pub fn not(formula: IntegrityFormula) -> Self {
        IntegrityFormula::Compound(CompoundFormula::from_parts(Connector::Not, vec![formula]))
    }

    pub fn package_name_equals(package_name: impl Into<String>) -> Self {
        let atom = AtomicFormula::string_auto_hashed(Key::PackageName, package_name);
        atom.into()
    }

    pub fn certificate_equals(app_certificate: impl Into<String>) -> Self {
        atom(
            Key::AppCertificate,
            Operator::Eq,
            FormulaValue::String(app_certificate.into()),
        )
    }

    pub fn installer_name_equals(installer_name: impl Into<String>) -> Self {
        let atom = AtomicFormula::string_auto_hashed(Key::InstallerName, installer_name);
        atom.into()
    }

    pub fn installer_certificate_equals(installer_certificate: impl Into<String>) -> Self {
        atom(
            Key::InstallerCertificate,
            Operator::Eq,
            FormulaValue::String(installer_certificate.into()),
        )
    }

    pub fn version_code_equals(version_code: i64) -> Self {
        atom(Key::VersionCode, Operator::Eq, FormulaValue::Long(version_code))
    }

    pub fn version_code_greater_than(version_code: i64) -> Self {
        atom(Key::VersionCode, Operator::Gt, FormulaValue::Long(version_code))
    }

    pub fn version_code_greater_than_or_equal_to(version_code: i64) -> Self {
        atom(Key::VersionCode, Operator::Ge, FormulaValue::Long(version_code))
    }

    pub fn is_pre_installed() -> Self {
        atom(Key::PreInstalled, Operator::Eq, FormulaValue::Boolean(true))
    }
}

/// Plain (unhashed) atom for key/operator/value combinations known to be legal.
fn atom(key: Key, operator: Operator, value: FormulaValue) -> IntegrityFormula {
    AtomicFormula::from_parts(key, operator, value, false).into()
}

impl From<AtomicFormula> for IntegrityFormula {
    fn from(f: AtomicFormula) -> Self {
        IntegrityFormula::Atomic(f)
    }
}

impl From<CompoundFormula> for IntegrityFormula {
    fn from(f: CompoundFormula) -> Self {
        IntegrityFormula::Compound(f)
    }
}

impl fmt::Display for IntegrityFormula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntegrityFormula::Atomic(a) => fmt::Display::fmt(a, f),
            IntegrityFormula::Compound(c) => fmt::Display::fmt(c, f),
        }
    }
}
