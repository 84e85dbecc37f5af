//! SECRET_KEY resolution.
//!
//! An already-set SECRET_KEY is passed through untouched. When unset, a
//! 32-byte cryptographically random value is generated and hex-encoded.
//! Generated values are ephemeral: they are exported for this run only and
//! never persisted, so session tokens issued under a generated key do not
//! survive a redeploy.

use rand::rngs::OsRng;
use rand::RngCore;
use serde::Serialize;

pub const SECRET_KEY_VAR: &str = "SECRET_KEY";
const SECRET_BYTES: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SecretSource {
    Environment,
    Generated,
}

#[derive(Debug, Clone)]
pub struct SecretResolution {
    pub value: String,
    pub source: SecretSource,
}

/// Resolve the secret from an existing environment value, generating a fresh
/// one when the variable is unset or empty.
pub fn resolve(existing: Option<String>) -> SecretResolution {
    match existing {
        Some(value) if !value.is_empty() => SecretResolution {
            value,
            source: SecretSource::Environment,
        },
        _ => SecretResolution {
            value: generate(),
            source: SecretSource::Generated,
        },
    }
}

/// 32 random bytes from the OS CSPRNG, hex-encoded (64 characters).
pub fn generate() -> String {
    let mut buf = [0u8; SECRET_BYTES];
    OsRng.fill_bytes(&mut buf);
    hex::encode(buf)
}
