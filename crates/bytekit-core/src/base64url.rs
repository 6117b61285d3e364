//! URL-safe base64 without padding.
//!
//! The text transforms mirror the classic substitution: `+` becomes `-`,
//! `/` becomes `_` and trailing `=` padding is dropped. Decoding restores
//! the padding from the input length, which is why a length of `4k + 1`
//! can never be valid.

use base64::{engine::general_purpose, Engine as _};

use crate::error::{BytekitError, Result};

/// Turn standard (padded) base64 text into its url-safe, unpadded form.
pub fn url_encode(standard: &str) -> String {
    standard
        .chars()
        .filter(|&c| c != '=')
        .map(|c| match c {
            '+' => '-',
            '/' => '_',
            other => other,
        })
        .collect()
}

/// Turn url-safe base64 text back into standard, padded base64 text.
pub fn url_decode(url: &str) -> Result<String> {
    let mut standard: String = url
        .chars()
        .map(|c| match c {
            '-' => '+',
            '_' => '/',
            other => other,
        })
        .collect();
    match url.len() % 4 {
        0 => {}
        1 => return Err(BytekitError::InvalidLength { len: url.len() }),
        2 => standard.push_str("=="),
        _ => standard.push('='),
    }
    Ok(standard)
}

/// Standard, padded base64 of `bytes`.
pub fn encode_bytes(bytes: &[u8]) -> String {
    general_purpose::STANDARD.encode(bytes)
}

/// Url-safe, unpadded base64 of `bytes`.
pub fn encode_url_bytes(bytes: &[u8]) -> String {
    url_encode(&encode_bytes(bytes))
}

/// Decode standard, padded base64 text.
pub fn decode_bytes(text: &str) -> Result<Vec<u8>> {
    Ok(general_purpose::STANDARD.decode(text)?)
}

/// Decode url-safe, unpadded base64 text.
pub fn decode_url_bytes(text: &str) -> Result<Vec<u8>> {
    decode_bytes(&url_decode(text)?)
}
