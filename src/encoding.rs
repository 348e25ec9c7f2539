//! Byte-level helpers shared by every token layout.
//!
//! Tokens use the URL-safe base64 alphabet with all `=` padding removed. Decoding
//! restores the padding before handing the data to a strict decoder, so
//! non-canonical trailing bits are rejected rather than silently ignored.

use base64::engine::general_purpose::{URL_SAFE, URL_SAFE_NO_PAD};
use base64::Engine;

use crate::error::{Result, SignerError};

/// Characters that may appear in an encoded signature or timestamp.
pub const BASE64_ALPHABET: &[u8] =
    b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789-_=";

/// Encode bytes as URL-safe base64 with no trailing padding.
#[must_use]
pub fn base64_encode(data: &[u8]) -> Vec<u8> {
    URL_SAFE_NO_PAD.encode(data).into_bytes()
}

/// Decode unpadded URL-safe base64.
///
/// Tokens never carry `=`, so any pad byte in the input is rejected. The input
/// is then re-padded to a multiple of four; an input that already ends on a
/// complete quantum needs no padding.
pub fn base64_decode(data: &[u8]) -> Result<Vec<u8>> {
    if data.contains(&b'=') {
        return Err(invalid_base64());
    }

    let mut padded = data.to_vec();
    padded.resize(data.len().next_multiple_of(4), b'=');

    URL_SAFE.decode(&padded).map_err(|_| invalid_base64())
}

fn invalid_base64() -> SignerError {
    SignerError::BadData("Invalid base64-encoded data".into())
}

/// Concatenate byte slices in order, with nothing inserted between them.
#[must_use]
pub fn concat(parts: &[&[u8]]) -> Vec<u8> {
    parts.concat()
}

/// Split `data` at the last occurrence of `sep`, excluding the separator itself.
///
/// Returns `None` when `sep` is empty or absent.
#[must_use]
pub fn rsplit_once<'a>(data: &'a [u8], sep: &[u8]) -> Option<(&'a [u8], &'a [u8])> {
    if sep.is_empty() || sep.len() > data.len() {
        return None;
    }
    let idx = data.windows(sep.len()).rposition(|window| window == sep)?;
    let (head, rest) = data.split_at(idx);
    Some((head, rest.get(sep.len()..)?))
}

/// Whether `sep` could be confused with base64url content.
#[must_use]
pub fn is_ambiguous_separator(sep: &[u8]) -> bool {
    sep.is_empty() || sep.iter().any(|b| BASE64_ALPHABET.contains(b))
}
