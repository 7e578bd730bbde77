//! Environment abstraction for deterministic testing.
//!
//! Decouples document logic from the entropy source. Production code draws
//! identifiers, IVs and share keys from the OS; tests substitute fixed or
//! failing randomness.

use pasteburn_crypto::{IV_SIZE, KEY_SIZE, SecretKey};
use uuid::{Builder, Uuid};

use crate::error::DocumentError;

/// Abstract environment providing randomness.
///
/// # Safety
///
/// Implementations MUST use cryptographically secure entropy in production.
/// A predictable IV or share key defeats the encryption.
pub trait Environment: Clone + Send + Sync + 'static {
    /// Fills the provided buffer with random bytes.
    ///
    /// # Errors
    ///
    /// - `Randomness`: the entropy source is unavailable
    fn random_bytes(&self, buffer: &mut [u8]) -> Result<(), DocumentError>;

    /// Generates a random version 4 UUID.
    fn random_uuid(&self) -> Result<Uuid, DocumentError> {
        let mut bytes = [0u8; 16];
        self.random_bytes(&mut bytes)?;
        Ok(Builder::from_random_bytes(bytes).into_uuid())
    }

    /// Generates a fresh CBC initialization vector.
    fn random_iv(&self) -> Result<[u8; IV_SIZE], DocumentError> {
        let mut iv = [0u8; IV_SIZE];
        self.random_bytes(&mut iv)?;
        Ok(iv)
    }

    /// Generates a fresh 256-bit key.
    fn random_key(&self) -> Result<SecretKey, DocumentError> {
        let mut bytes = [0u8; KEY_SIZE];
        self.random_bytes(&mut bytes)?;
        Ok(SecretKey::new(bytes))
    }
}

/// Production environment using the OS cryptographic RNG (getrandom).
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemEnv;

impl SystemEnv {
    /// Create a new system environment.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Environment for SystemEnv {
    fn random_bytes(&self, buffer: &mut [u8]) -> Result<(), DocumentError> {
        getrandom::fill(buffer).map_err(|e| DocumentError::Randomness(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_env_random_bytes_are_random() {
        let env = SystemEnv::new();

        let mut bytes1 = [0u8; 32];
        let mut bytes2 = [0u8; 32];

        env.random_bytes(&mut bytes1).unwrap();
        env.random_bytes(&mut bytes2).unwrap();

        // Extremely unlikely to be equal if random
        assert_ne!(bytes1, bytes2, "Random bytes should differ");
    }

    #[test]
    fn random_uuid_is_version_4() {
        let id = SystemEnv::new().random_uuid().unwrap();
        assert_eq!(id.get_version_num(), 4);
    }

    #[test]
    fn random_ivs_differ() {
        let env = SystemEnv::new();
        assert_ne!(env.random_iv().unwrap(), env.random_iv().unwrap());
    }
}
