//! Compound formulas: AND/OR/NOT over child formulas.

use alloc::vec::Vec;
use core::fmt;
use serde::Serialize;

use crate::error::FormulaError;
use crate::formula::{Connector, IntegrityFormula};
use crate::metadata::AppInstallMetadata;

/// A connector applied to an ordered list of child formulas.
///
/// NOT carries exactly one child, AND and OR at least two.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct CompoundFormula {
    connector: Connector,
    formulas: Vec<IntegrityFormula>,
}

impl CompoundFormula {
    pub fn new(
        connector: Connector,
        formulas: Vec<IntegrityFormula>,
    ) -> Result<Self, FormulaError> {
        validate_arity(connector, formulas.len())?;
        Ok(Self::from_parts(connector, formulas))
    }

    /// Construct from a raw connector code, as found in persisted rules.
    pub fn from_code(
        connector: i32,
        formulas: Vec<IntegrityFormula>,
    ) -> Result<Self, FormulaError> {
        Self::new(Connector::from_code(connector)?, formulas)
    }

    pub(crate) fn from_parts(connector: Connector, formulas: Vec<IntegrityFormula>) -> Self {
        Self {
            connector,
            formulas,
        }
    }

    pub fn connector(&self) -> Connector {
        self.connector
    }

    pub fn formulas(&self) -> &[IntegrityFormula] {
        &self.formulas
    }

    pub fn matches(&self, metadata: &AppInstallMetadata) -> bool {
        match self.connector {
            Connector::Not => !self.formulas[0].matches(metadata),
            Connector::And => self.formulas.iter().all(|f| f.matches(metadata)),
            Connector::Or => self.formulas.iter().any(|f| f.matches(metadata)),
        }
    }
}

fn validate_arity(connector: Connector, found: usize) -> Result<(), FormulaError> {
    match connector {
        Connector::Not if found != 1 => Err(FormulaError::UnaryArity { connector, found }),
        Connector::And | Connector::Or if found < 2 => {
            Err(FormulaError::BinaryArity { connector, found })
        }
        _ => Ok(()),
    }
}

impl fmt::Display for CompoundFormula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.connector == Connector::Not {
            return write!(f, "NOT {}", self.formulas[0]);
        }
        f.write_str("(")?;
        for (i, child) in self.formulas.iter().enumerate() {
            if i > 0 {
                write!(f, " {} ", self.connector)?;
            }
            write!(f, "{}", child)?;
        }
        f.write_str(")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formula::{AtomicFormula, Key, Operator};
    use alloc::string::ToString;
    use alloc::vec;

    fn package_test1() -> IntegrityFormula {
        let atom = AtomicFormula::string(Key::PackageName, "test1", false).unwrap();
        atom.into()
    }

    fn version_1() -> IntegrityFormula {
        let atom = AtomicFormula::long(Key::VersionCode, Operator::Eq, 1).unwrap();
        atom.into()
    }

    #[test]
    fn test_valid_compound_keeps_order() {
        let children = vec![package_test1(), version_1()];
        let f = CompoundFormula::new(Connector::And, children).unwrap();
        assert_eq!(f.connector(), Connector::And);
        assert_eq!(f.formulas(), &[package_test1(), version_1()]);
    }

    #[test]
    fn test_arity_errors_name_connector_and_count() {
        let err = CompoundFormula::new(Connector::And, vec![package_test1()]);
        assert_eq!(
            err,
            Err(FormulaError::BinaryArity {
                connector: Connector::And,
                found: 1,
            })
        );

        let err = CompoundFormula::new(Connector::Or, vec![]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Connector OR must have at least 2 formulas (found 0)"
        );

        let children = vec![package_test1(), version_1()];
        let err = CompoundFormula::new(Connector::Not, children).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Connector NOT must have 1 formula only (found 2)"
        );

        let err = CompoundFormula::new(Connector::Not, vec![]);
        assert_eq!(
            err,
            Err(FormulaError::UnaryArity {
                connector: Connector::Not,
                found: 0,
            })
        );
    }

    #[test]
    fn test_unknown_connector_code() {
        let children = vec![package_test1(), version_1()];
        let err = CompoundFormula::from_code(-1, children).unwrap_err();
        assert_eq!(err.to_string(), "Unknown connector: -1");
    }

    #[test]
    fn test_deep_nesting() {
        let mut f = package_test1();
        for _ in 0..1000 {
            f = IntegrityFormula::not(f);
        }
        let m = AppInstallMetadata::builder().package_name("test1").build();
        // 1000 negations cancel out.
        assert!(f.matches(&m));
    }
}
