//! 256-bit key material

use std::fmt;

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::{cipher::KEY_SIZE, error::CipherError};

/// An AES-256 key.
///
/// Zeroized on drop. `Debug` never prints the bytes.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct SecretKey([u8; KEY_SIZE]);

impl SecretKey {
    /// Wrap raw key bytes.
    pub fn new(bytes: [u8; KEY_SIZE]) -> Self {
        Self(bytes)
    }

    /// Copy key bytes out of a slice.
    ///
    /// # Errors
    ///
    /// - `InvalidKeyLength`: slice is not exactly 32 bytes
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CipherError> {
        let array: [u8; KEY_SIZE] = bytes.try_into().map_err(|_| CipherError::InvalidKeyLength {
            expected: KEY_SIZE,
            actual: bytes.len(),
        })?;
        Ok(Self(array))
    }

    /// Raw key bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }
}

impl AsRef<[u8]> for SecretKey {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey([REDACTED])")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_slice_accepts_32_bytes() {
        let key = SecretKey::from_slice(&[7u8; 32]).unwrap();
        assert_eq!(key.as_bytes(), &[7u8; 32]);
    }

    #[test]
    fn from_slice_rejects_wrong_length() {
        let err = SecretKey::from_slice(b"too short").unwrap_err();
        assert_eq!(err, CipherError::InvalidKeyLength { expected: 32, actual: 9 });
    }

    #[test]
    fn debug_is_redacted() {
        let key = SecretKey::new([0x41; 32]);
        let printed = format!("{key:?}");
        assert!(!printed.contains("65"));
        assert!(printed.contains("REDACTED"));
    }
}
