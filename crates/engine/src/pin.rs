//! PIN validation and hashing.
//!
//! The profile never stores the PIN itself: only a random salt and the
//! SHA-256 of `salt ‖ pin`, both hex encoded.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

const PIN_LEN: usize = 4;

/// A PIN that passed registration rules: exactly four ASCII digits.
#[derive(Clone, PartialEq, Eq)]
pub struct Pin(String);

impl Pin {
    /// Validates a PIN typed at registration. Surrounding whitespace is ignored.
    ///
    /// ```rust
    /// use engine::Pin;
    ///
    /// assert!(Pin::parse("5678").is_ok());
    /// assert!(Pin::parse("12a4").is_err());
    /// assert!(Pin::parse("123").is_err());
    /// ```
    pub fn parse(input: &str) -> ResultEngine<Self> {
        let trimmed = input.trim();
        if trimmed.len() != PIN_LEN || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(EngineError::InvalidPin);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Pin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Pin(****)")
    }
}

/// Salted hash of the profile PIN.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinHash {
    pub salt: String,
    pub sha256: String,
}

impl PinHash {
    /// Hashes a validated PIN with a fresh random salt.
    pub fn new(pin: &Pin) -> Self {
        let salt = Uuid::new_v4().simple().to_string();
        let sha256 = salted_sha256_hex(&salt, pin.as_str());
        Self { salt, sha256 }
    }

    /// Returns `true` iff `input` (trimmed) is exactly the registered PIN.
    pub fn verify(&self, input: &str) -> bool {
        salted_sha256_hex(&self.salt, input.trim()) == self.sha256
    }
}

fn salted_sha256_hex(salt: &str, pin: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(pin.as_bytes());
    hex::encode(hasher.finalize())
}
