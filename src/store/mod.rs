//! Rule sources consulted by the evaluation engine.

#[cfg(feature = "std")]
pub mod file;

use alloc::boxed::Box;
use alloc::sync::Arc;
use alloc::vec::Vec;

use crate::error::RuleStoreError;
use crate::metadata::AppInstallMetadata;
use crate::rule::Rule;

#[cfg(feature = "std")]
pub use file::FileRuleStore;

/// Supplies the candidate rules for an install.
pub trait RuleStore {
    fn read_rules(&self, metadata: &AppInstallMetadata) -> Result<Vec<Rule>, RuleStoreError>;
}

impl<T: RuleStore + ?Sized> RuleStore for &T {
    fn read_rules(&self, metadata: &AppInstallMetadata) -> Result<Vec<Rule>, RuleStoreError> {
        (**self).read_rules(metadata)
    }
}

impl<T: RuleStore + ?Sized> RuleStore for Box<T> {
    fn read_rules(&self, metadata: &AppInstallMetadata) -> Result<Vec<Rule>, RuleStoreError> {
        (**self).read_rules(metadata)
    }
}

impl<T: RuleStore + ?Sized> RuleStore for Arc<T> {
    fn read_rules(&self, metadata: &AppInstallMetadata) -> Result<Vec<Rule>, RuleStoreError> {
        (**self).read_rules(metadata)
    }
}

/// A fixed rule list, returned for every subject.
#[derive(Clone, Debug, Default)]
pub struct InMemoryRuleStore {
    rules: Vec<Rule>,
}

impl InMemoryRuleStore {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }
}

impl RuleStore for InMemoryRuleStore {
    fn read_rules(&self, _metadata: &AppInstallMetadata) -> Result<Vec<Rule>, RuleStoreError> {
        Ok(self.rules.clone())
    }
}
