//! # App Integrity
//!
//! Install-time integrity rules: decide whether an application install is
//! allowed by evaluating administrator-supplied rules against metadata
//! describing the package.
//!
//! ## Features
//!
//! - **Formula Algebra**: Atomic comparisons combined with AND/OR/NOT,
//!   validated at construction so invalid trees never exist
//! - **Hashed Values**: Rules can reference identities by SHA-256 digest
//! - **Binary Codec**: Versioned encoding for persisting and transporting rules
//! - **Evaluation Engine**: Loads rules, synthesizes an allowed-installers
//!   constraint and returns a single ALLOW/DENY verdict
//!
//! ## Quick Start
//!
//! ```rust
//! use std::collections::BTreeMap;
//! use app_integrity::{AppInstallMetadata, Effect, InMemoryRuleStore, RuleEvaluationEngine};
//!
//! let engine = RuleEvaluationEngine::new(InMemoryRuleStore::default());
//! let subject = AppInstallMetadata::builder()
//!     .package_name("com.example.app")
//!     .installer_name("com.store")
//!     .installer_certificate("STORE_CERT")
//!     .build();
//!
//! let mut allowed = BTreeMap::new();
//! allowed.insert("com.store".to_string(), "STORE_CERT".to_string());
//! assert_eq!(engine.evaluate(&subject, &allowed).effect(), Effect::Allow);
//!
//! allowed.insert("com.store".to_string(), "OTHER_CERT".to_string());
//! assert_eq!(engine.evaluate(&subject, &allowed).effect(), Effect::Deny);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

// Module declarations
pub mod codec;
pub mod engine;
pub mod error;
pub mod evaluator;
pub mod formula;
pub mod metadata;
pub mod result;
pub mod rule;
pub mod store;
pub mod utils;

// Re-export core functionality
pub use engine::{allowed_installers_rule, RuleEvaluationEngine};
#[cfg(feature = "std")]
pub use engine::{global_engine, SharedRuleEvaluationEngine};
pub use evaluator::evaluate_rules;

// Re-export types
pub use error::{DecodeError, EncodeError, FormulaError, IntegrityError, Result, RuleStoreError};
pub use formula::{
    AtomicFormula, CompoundFormula, Connector, FormulaValue, IntegrityFormula, Key, Operator,
};
pub use metadata::{AppInstallMetadata, AppInstallMetadataBuilder};
pub use result::IntegrityCheckResult;
pub use rule::{Effect, Rule};
pub use store::{InMemoryRuleStore, RuleStore};
#[cfg(feature = "std")]
pub use store::FileRuleStore;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
