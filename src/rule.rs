//! Rules: a formula paired with an effect.

use core::fmt;
use serde::{Deserialize, Serialize};

use crate::error::FormulaError;
use crate::formula::IntegrityFormula;

/// What happens to an install when a rule's formula matches.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Effect {
    Deny = 0,
    Allow = 1,
}

impl Effect {
    pub fn code(self) -> i32 {
        self as i32
    }

    pub fn from_code(code: i32) -> Result<Self, FormulaError> {
        match code {
            0 => Ok(Effect::Deny),
            1 => Ok(Effect::Allow),
            _ => Err(FormulaError::UnknownEffect(code)),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Effect::Deny => "DENY",
            Effect::Allow => "ALLOW",
        }
    }
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An immutable formula/effect pair.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Rule {
    formula: IntegrityFormula,
    effect: Effect,
}

impl Rule {
    pub fn new(formula: IntegrityFormula, effect: Effect) -> Self {
        Self { formula, effect }
    }

    pub fn formula(&self) -> &IntegrityFormula {
        &self.formula
    }

    pub fn effect(&self) -> Effect {
        self.effect
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Rule: {}, {}", self.formula, self.effect)
    }
}
