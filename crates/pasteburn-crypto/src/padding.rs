//! Block padding (RFC 5246 §6.2.3.2 convention)
//!
//! Every pad byte holds the pad length. An already-aligned input gets a full
//! block of `16`s so the last byte is always a length and never data.

use crate::{cipher::BLOCK_SIZE, error::CipherError};

/// Append padding so `buf.len()` becomes a non-zero multiple of the block size.
pub fn pad(buf: &mut Vec<u8>) {
    let pad_len = BLOCK_SIZE - (buf.len() % BLOCK_SIZE);
    debug_assert!((1..=BLOCK_SIZE).contains(&pad_len));

    buf.resize(buf.len() + pad_len, pad_len as u8);

    debug_assert_eq!(buf.len() % BLOCK_SIZE, 0);
}

/// Strip padding in place.
///
/// # Errors
///
/// - `CorruptCiphertext`: buffer is empty or not block-aligned, the pad length
///   byte is zero or larger than a block or the buffer, or the pad bytes
///   disagree with each other.
pub fn unpad(buf: &mut Vec<u8>) -> Result<(), CipherError> {
    if buf.is_empty() || buf.len() % BLOCK_SIZE != 0 {
        return Err(CipherError::corrupt(format!(
            "padded length {} is not a positive multiple of {BLOCK_SIZE}",
            buf.len()
        )));
    }

    let Some(&last) = buf.last() else {
        return Err(CipherError::corrupt("empty buffer"));
    };
    let pad_len = usize::from(last);

    if pad_len == 0 || pad_len > BLOCK_SIZE || pad_len > buf.len() {
        return Err(CipherError::corrupt(format!("invalid padding length {pad_len}")));
    }

    let body_len = buf.len() - pad_len;
    if buf[body_len..].iter().any(|&b| b != last) {
        return Err(CipherError::corrupt("inconsistent padding bytes"));
    }

    buf.truncate(body_len);
    Ok(())
}
