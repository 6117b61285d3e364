//! Lower-case hex text for byte sequences.

use crate::error::Result;

/// Render `bytes` as lower-case hex, two digits per byte.
pub fn to_hex(bytes: &[u8]) -> String {
    ::hex::encode(bytes)
}

/// Parse hex text back into bytes. Odd-length input is treated as if it
/// carried one leading `0` nibble, so `"abc"` decodes like `"0abc"`.
pub fn from_hex(text: &str) -> Result<Vec<u8>> {
    if text.len() % 2 == 1 {
        let mut padded = String::with_capacity(text.len() + 1);
        padded.push('0');
        padded.push_str(text);
        return Ok(::hex::decode(padded)?);
    }
    Ok(::hex::decode(text)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BytekitError;

    #[test]
    fn encodes_lower_case() {
        assert_eq!(to_hex(&[0x00, 0xab, 0xff, 0x10]), "00abff10");
        assert_eq!(to_hex(&[]), "");
    }

    #[test]
    fn odd_length_is_left_padded() {
        assert_eq!(from_hex("abc").expect("decode"), vec![0x0a, 0xbc]);
        assert_eq!(from_hex("f").expect("decode"), vec![0x0f]);
    }

    #[test]
    fn accepts_upper_case_input() {
        assert_eq!(from_hex("DEADbeef").expect("decode"), vec![0xde, 0xad, 0xbe, 0xef]);
    }

    #[test]
    fn rejects_non_hex_digits() {
        let err = from_hex("zz").unwrap_err();
        assert!(matches!(err, BytekitError::InvalidHex(_)));
    }
}
