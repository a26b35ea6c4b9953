use sha2::{Digest, Sha512};

use crate::types::Pseudonym;

const SALT_PREFIX: &str = "AskMe";

/// Canonical form of an identity string before hashing or lookup.
#[must_use]
pub fn normalize_identity(identity: &str) -> String {
    identity.trim().to_ascii_lowercase()
}

/// Derives the display-safe pseudonym for an identity.
///
/// `SHA-512("AskMe" + normalized identity)` as lowercase hex, cut into
/// `hex[0..4]-hex[5..10]-hex[11..15]-hex[16..20]`.
#[must_use]
pub fn derive(identity: &str) -> Pseudonym {
    let digest = Sha512::digest(format!("{SALT_PREFIX}{}", normalize_identity(identity)));
    let hex = hex::encode(digest);
    Pseudonym(format!(
        "{}-{}-{}-{}",
        &hex[0..4],
        &hex[5..10],
        &hex[11..15],
        &hex[16..20]
    ))
}
