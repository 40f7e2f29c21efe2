//! Hashing helpers.

use alloc::string::String;
use sha2::Sha256;
use sha3::{Digest, Sha3_256};

/// Upper-case hex SHA-256 digest, the form hashed rule values are stored in.
pub fn hex_digest(data: &[u8]) -> String {
    hex::encode_upper(Sha256::digest(data))
}

/// SHA3-256 hash helper.
pub fn sha3_256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha3_256::new();
    hasher.update(data);
    hasher.finalize().into()
}
