//! Salted SHA-256 password hashes stored as `sha256${salt}${hex digest}`.
//!
//! One SHA-256 round is cheap to brute-force offline. Stored hashes must be
//! treated as sensitive, and a key-stretching scheme should replace this before
//! the database leaves a trusted host.

use sha2::{Digest, Sha256};
use uuid::Uuid;

const ALGORITHM: &str = "sha256";

fn digest(salt: &str, raw: &str) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(raw.as_bytes());
    hasher.finalize().to_vec()
}

/// Compares without short-circuiting on the first differing byte.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

pub fn hash_password(raw: &str) -> String {
    let salt = Uuid::new_v4().simple().to_string();
    format!("{}${}${}", ALGORITHM, salt, hex::encode(digest(&salt, raw)))
}

pub fn verify_password(raw: &str, stored: &str) -> bool {
    let mut parts = stored.splitn(3, '$');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(ALGORITHM), Some(salt), Some(expected)) => match hex::decode(expected) {
            Ok(expected) => constant_time_eq(&digest(salt, raw), &expected),
            Err(_) => false,
        },
        _ => false,
    }
}
