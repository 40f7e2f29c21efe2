//! File-backed rule store.
//!
//! The file holds an encoded rule list followed by a 32-byte SHA3-256
//! checksum of that list. A missing file means no rules are installed.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::codec::{decode_rules, encode_rules};
use crate::error::RuleStoreError;
use crate::metadata::AppInstallMetadata;
use crate::rule::Rule;
use crate::store::RuleStore;
use crate::utils::sha3_256;

const CHECKSUM_LEN: usize = 32;

#[derive(Clone, Debug)]
pub struct FileRuleStore {
    path: PathBuf,
}

impl FileRuleStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replace the stored rules. Written to a sibling temp file then renamed.
    ///
    /// Rules the codec cannot represent are rejected before anything is
    /// written, leaving the previous file in place.
    pub fn write_rules(&self, rules: &[Rule]) -> Result<(), RuleStoreError> {
        let mut bytes = encode_rules(rules)?;
        let checksum = sha3_256(&bytes);
        bytes.extend_from_slice(&checksum);

        let tmp = self.path.with_extension("tmp");
        if let Err(e) = fs::write(&tmp, &bytes).and_then(|()| fs::rename(&tmp, &self.path)) {
            let _ = fs::remove_file(&tmp);
            tracing::warn!(path = %self.path.display(), error = %e, "rule file write failed");
            return Err(e.into());
        }
        tracing::debug!(path = %self.path.display(), rules = rules.len(), "wrote rule file");
        Ok(())
    }

    fn load(&self) -> Result<Vec<Rule>, RuleStoreError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        if bytes.len() < CHECKSUM_LEN {
            return Err(RuleStoreError::Corrupted(format!(
                "{} bytes is shorter than the checksum",
                bytes.len()
            )));
        }

        let (body, checksum) = bytes.split_at(bytes.len() - CHECKSUM_LEN);
        if sha3_256(body) != checksum {
            tracing::warn!(path = %self.path.display(), "rule file checksum mismatch");
            return Err(RuleStoreError::Corrupted("checksum mismatch".into()));
        }
        Ok(decode_rules(body)?)
    }
}

impl RuleStore for FileRuleStore {
    fn read_rules(&self, _metadata: &AppInstallMetadata) -> Result<Vec<Rule>, RuleStoreError> {
        self.load()
    }
}
