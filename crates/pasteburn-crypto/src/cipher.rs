//! AES-256-CBC encryption with a prepended IV
//!
//! All functions are pure - the IV must be provided by the caller.

use aes::Aes256;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit, block_padding::NoPadding};
use zeroize::Zeroize;

use crate::{
    error::CipherError,
    padding::{pad, unpad},
};

/// AES block size (16 bytes)
pub const BLOCK_SIZE: usize = 16;

/// IV size, one block (16 bytes)
pub const IV_SIZE: usize = BLOCK_SIZE;

/// AES-256 key size (32 bytes)
pub const KEY_SIZE: usize = 32;

type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;

/// Encrypt `plaintext` under `key` with the given IV.
///
/// Returns `iv || ciphertext`. The ciphertext is always at least one block
/// because padding always adds at least one byte.
///
/// # Security
///
/// The caller MUST provide a fresh cryptographically random IV for every call
/// in production. Encrypting twice under the same key and IV produces
/// identical output.
///
/// # Errors
///
/// - `InvalidKeyLength`: key is not 32 bytes
pub fn encrypt_with_iv(
    plaintext: &[u8],
    key: &[u8],
    iv: [u8; IV_SIZE],
) -> Result<Vec<u8>, CipherError> {
    check_key(key)?;

    let mut body = plaintext.to_vec();
    pad(&mut body);
    let padded_len = body.len();

    let mut out = Vec::with_capacity(IV_SIZE + padded_len);
    out.extend_from_slice(&iv);
    out.extend_from_slice(&body);
    body.zeroize();

    let encryptor = Aes256CbcEnc::new_from_slices(key, &iv)
        .map_err(|_| CipherError::InvalidKeyLength { expected: KEY_SIZE, actual: key.len() })?;
    encryptor
        .encrypt_padded_mut::<NoPadding>(&mut out[IV_SIZE..], padded_len)
        .map_err(|_| CipherError::corrupt("padded plaintext is not block aligned"))?;

    debug_assert_eq!(out.len(), IV_SIZE + padded_len);
    debug_assert_eq!(&out[..IV_SIZE], &iv);

    Ok(out)
}

/// Decrypt `iv || ciphertext` under `key`.
///
/// Splits off the leading IV, CBC-decrypts the remainder and strips the
/// padding named by the last decrypted byte.
///
/// # Errors
///
/// - `InvalidKeyLength`: key is not 32 bytes
/// - `CorruptCiphertext`: input is shorter than two blocks, not block aligned,
///   or decrypts to invalid padding (tampering or the wrong key)
pub fn decrypt(iv_and_ciphertext: &[u8], key: &[u8]) -> Result<Vec<u8>, CipherError> {
    check_key(key)?;

    let len = iv_and_ciphertext.len();
    if len < IV_SIZE + BLOCK_SIZE {
        return Err(CipherError::corrupt(format!(
            "input is {len} bytes, need at least {}",
            IV_SIZE + BLOCK_SIZE
        )));
    }
    if (len - IV_SIZE) % BLOCK_SIZE != 0 {
        return Err(CipherError::corrupt(format!(
            "ciphertext length {} is not a multiple of {BLOCK_SIZE}",
            len - IV_SIZE
        )));
    }

    let (iv, ciphertext) = iv_and_ciphertext.split_at(IV_SIZE);
    let decryptor = Aes256CbcDec::new_from_slices(key, iv)
        .map_err(|_| CipherError::InvalidKeyLength { expected: KEY_SIZE, actual: key.len() })?;

    let mut buf = ciphertext.to_vec();
    decryptor
        .decrypt_padded_mut::<NoPadding>(&mut buf)
        .map_err(|_| CipherError::corrupt("ciphertext is not block aligned"))?;

    if let Err(err) = unpad(&mut buf) {
        buf.zeroize();
        return Err(err);
    }

    Ok(buf)
}

fn check_key(key: &[u8]) -> Result<(), CipherError> {
    if key.len() == KEY_SIZE {
        Ok(())
    } else {
        Err(CipherError::InvalidKeyLength { expected: KEY_SIZE, actual: key.len() })
    }
}
