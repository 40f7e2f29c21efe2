//! Verdict of an integrity check.

use alloc::vec::Vec;
use serde::Serialize;

use crate::rule::{Effect, Rule};

/// ALLOW/DENY decision plus the rules that produced it.
///
/// A default ALLOW (no rule matched) carries no rules.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct IntegrityCheckResult {
    effect: Effect,
    matched_rules: Vec<Rule>,
}

impl IntegrityCheckResult {
    /// Default verdict when nothing matched.
    pub fn allow() -> Self {
        Self {
            effect: Effect::Allow,
            matched_rules: Vec::new(),
        }
    }

    /// ALLOW caused by explicitly matching rules.
    pub fn allow_with(rules: Vec<Rule>) -> Self {
        Self {
            effect: Effect::Allow,
            matched_rules: rules,
        }
    }

    pub fn deny(rules: Vec<Rule>) -> Self {
        Self {
            effect: Effect::Deny,
            matched_rules: rules,
        }
    }

    pub fn effect(&self) -> Effect {
        self.effect
    }

    pub fn is_allowed(&self) -> bool {
        self.effect == Effect::Allow
    }

    /// The first rule that decided the verdict, if any.
    pub fn rule(&self) -> Option<&Rule> {
        self.matched_rules.first()
    }

    pub fn matched_rules(&self) -> &[Rule] {
        &self.matched_rules
    }

    pub fn is_caused_by_app_cert_rule(&self) -> bool {
        self.matched_rules
            .iter()
            .any(|r| r.formula().is_app_certificate_formula())
    }

    pub fn is_caused_by_installer_rule(&self) -> bool {
        self.matched_rules
            .iter()
            .any(|r| r.formula().is_installer_formula())
    }
}
