//! Salted password hashing.
//!
//! Stored form is `{salt}${hash}`, both base64: the salt is 16 random
//! bytes, the hash is SHA-256 over salt followed by the password bytes.
//! Verification re-derives the hash and compares in constant time.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use constant_time_eq::constant_time_eq;
use rand::RngCore;
use sha2::{Digest, Sha256};

fn digest(salt: &[u8], password: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(password.as_bytes());
    hasher.finalize().into()
}

/// Hash a plaintext password with a fresh random salt.
#[must_use]
pub fn hash_password(password: &str) -> String {
    let mut salt = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut salt);
    let hash = digest(&salt, password);
    format!(
        "{}${}",
        URL_SAFE_NO_PAD.encode(salt),
        URL_SAFE_NO_PAD.encode(hash)
    )
}

/// Verify a plaintext password against a stored `{salt}${hash}` value.
///
/// Malformed stored values verify as `false` rather than erroring, so a
/// corrupt row behaves like a wrong password.
#[must_use]
pub fn verify_password(password: &str, stored: &str) -> bool {
    let Some((salt_b64, hash_b64)) = stored.split_once('$') else {
        return false;
    };
    let (Ok(salt), Ok(expected)) = (
        URL_SAFE_NO_PAD.decode(salt_b64),
        URL_SAFE_NO_PAD.decode(hash_b64),
    ) else {
        return false;
    };
    let actual = digest(&salt, password);
    constant_time_eq(&actual, &expected)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_verifies() {
        let stored = hash_password("correct horse");
        assert!(verify_password("correct horse", &stored));
    }

    #[test]
    fn wrong_password_fails() {
        let stored = hash_password("correct horse");
        assert!(!verify_password("battery staple", &stored));
    }

    #[test]
    fn salts_differ_between_hashes() {
        assert_ne!(hash_password("same"), hash_password("same"));
    }

    #[test]
    fn malformed_stored_value_fails_closed() {
        assert!(!verify_password("anything", "no-dollar-sign"));
        assert!(!verify_password("anything", "!!$!!"));
    }
}
