//! Deterministic rule evaluation.
//!
//! Every rule is matched against the subject. Precedence is most
//! restrictive wins:
//! 1. any matching DENY rule denies the install, whatever else matches;
//! 2. otherwise any matching ALLOW rule allows it;
//! 3. otherwise the install is allowed by default.
//!
//! The verdict carries all matching rules of the deciding effect, in list order.

use alloc::vec::Vec;

use crate::metadata::AppInstallMetadata;
use crate::result::IntegrityCheckResult;
use crate::rule::{Effect, Rule};

/// Evaluate an ordered rule list against a subject.
pub fn evaluate_rules(rules: &[Rule], metadata: &AppInstallMetadata) -> IntegrityCheckResult {
    let (denies, allows): (Vec<&Rule>, Vec<&Rule>) = rules
        .iter()
        .filter(|rule| rule.formula().matches(metadata))
        .partition(|rule| rule.effect() == Effect::Deny);

    if !denies.is_empty() {
        return IntegrityCheckResult::deny(denies.into_iter().cloned().collect());
    }
    if !allows.is_empty() {
        return IntegrityCheckResult::allow_with(allows.into_iter().cloned().collect());
    }
    IntegrityCheckResult::allow()
}
