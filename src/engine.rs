//! Rule Evaluation Engine.
//!
//! Loads the candidate rules for an install, appends a synthesized
//! allowed-installers rule and folds everything into a single verdict.

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;

use crate::evaluator::evaluate_rules;
use crate::formula::{
    AtomicFormula, CompoundFormula, Connector, FormulaValue, IntegrityFormula, Key, Operator,
};
use crate::metadata::AppInstallMetadata;
use crate::result::IntegrityCheckResult;
use crate::rule::{Effect, Rule};
use crate::store::RuleStore;

/// Evaluates installs against rules from a [`RuleStore`].
///
/// Holds no per-call state; `evaluate` may be called concurrently when the
/// store is `Sync`.
#[derive(Debug)]
pub struct RuleEvaluationEngine<S> {
    store: S,
}

impl<S: RuleStore> RuleEvaluationEngine<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Evaluate an install.
    ///
    /// `allowed_installers` maps installer name to installer certificate.
    /// When non-empty, installs from any other (name, certificate) pair are
    /// denied; a matching store ALLOW rule does not lift that denial.
    pub fn evaluate(
        &self,
        metadata: &AppInstallMetadata,
        allowed_installers: &BTreeMap<String, String>,
    ) -> IntegrityCheckResult {
        let mut rules = self.load_rules(metadata);
        let installer_rule = allowed_installers_rule(allowed_installers);
        let synthesized = installer_rule.is_some();
        rules.extend(installer_rule);

        let result = evaluate_rules(&rules, metadata);
        tracing::debug!(
            package = metadata.package_name(),
            rules = rules.len(),
            synthesized_installer_rule = synthesized,
            effect = %result.effect(),
            "integrity check evaluated"
        );
        result
    }

    fn load_rules(&self, metadata: &AppInstallMetadata) -> Vec<Rule> {
        match self.store.read_rules(metadata) {
            Ok(rules) => rules,
            Err(e) => {
                tracing::error!(
                    package = metadata.package_name(),
                    error = %e,
                    "Error loading rules."
                );
                Vec::new()
            }
        }
    }
}

/// `DENY NOT(OR(AND(INSTALLER_NAME = name, INSTALLER_CERTIFICATE = cert), ...))`,
/// or `None` when no installers are configured.
pub fn allowed_installers_rule(allowed_installers: &BTreeMap<String, String>) -> Option<Rule> {
    let mut formulas: Vec<IntegrityFormula> = allowed_installers
        .iter()
        .map(|(installer, cert)| allowed_installer_formula(installer, cert))
        .collect();

    // OR requires at least two operands.
    let all_installers = match formulas.len() {
        0 => return None,
        1 => formulas.remove(0),
        _ => CompoundFormula::from_parts(Connector::Or, formulas).into(),
    };

    Some(Rule::new(IntegrityFormula::not(all_installers), Effect::Deny))
}

fn allowed_installer_formula(installer: &str, cert: &str) -> IntegrityFormula {
    let name = AtomicFormula::from_parts(
        Key::InstallerName,
        Operator::Eq,
        FormulaValue::String(installer.into()),
        false,
    );
    let cert = AtomicFormula::from_parts(
        Key::InstallerCertificate,
        Operator::Eq,
        FormulaValue::String(cert.into()),
        false,
    );
    CompoundFormula::from_parts(Connector::And, alloc::vec![name.into(), cert.into()]).into()
}

#[cfg(feature = "std")]
mod global {
    use std::boxed::Box;
    use std::sync::OnceLock;

    use super::RuleEvaluationEngine;
    use crate::store::RuleStore;

    /// Engine over a type-erased, thread-safe store.
    pub type SharedRuleEvaluationEngine = RuleEvaluationEngine<Box<dyn RuleStore + Send + Sync>>;

    static ENGINE: OnceLock<SharedRuleEvaluationEngine> = OnceLock::new();

    /// Process-wide engine, created on first use.
    ///
    /// `init` runs at most once, even under concurrent first calls; later
    /// calls ignore their `init` and return the existing engine.
    pub fn global_engine<F>(init: F) -> &'static SharedRuleEvaluationEngine
    where
        F: FnOnce() -> Box<dyn RuleStore + Send + Sync>,
    {
        ENGINE.get_or_init(|| {
            tracing::info!("creating rule evaluation engine");
            RuleEvaluationEngine::new(init())
        })
    }
}

#[cfg(feature = "std")]
pub use global::{global_engine, SharedRuleEvaluationEngine};

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    fn installers(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_no_installers_no_rule() {
        assert!(allowed_installers_rule(&BTreeMap::new()).is_none());
    }

    #[test]
    fn test_single_installer_skips_or() {
        let rule = allowed_installers_rule(&installers(&[("inst1", "certA")])).unwrap();
        assert_eq!(rule.effect(), Effect::Deny);
        assert_eq!(
            rule.formula().to_string(),
            "NOT ((INSTALLER_NAME EQ inst1) AND (INSTALLER_CERTIFICATE EQ certA))"
        );
    }

    #[test]
    fn test_multiple_installers_use_or() {
        let rule = allowed_installers_rule(&installers(&[("a", "1"), ("b", "2")])).unwrap();
        let IntegrityFormula::Compound(not) = rule.formula() else {
            panic!("expected compound");
        };
        assert_eq!(not.connector(), Connector::Not);
        let IntegrityFormula::Compound(or) = &not.formulas()[0] else {
            panic!("expected compound");
        };
        assert_eq!(or.connector(), Connector::Or);
        assert_eq!(or.formulas().len(), 2);
    }

    #[test]
    fn test_long_installer_names_are_compared_in_plaintext() {
        let long = "com.example.installer.with.a.name.longer.than.limit";
        let rule = allowed_installers_rule(&installers(&[(long, "cert")])).unwrap();
        let subject = AppInstallMetadata::builder()
            .installer_name(long)
            .installer_certificate("cert")
            .build();
        assert!(!rule.formula().matches(&subject));
    }
}
