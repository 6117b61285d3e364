//! Bitcoin-style base58.
//!
//! Leading zero bytes have no numeric weight, so they are carried
//! positionally: each one becomes a leading `'1'` and vice versa.

use malachite::Natural;

use crate::bigint;
use crate::error::{BytekitError, Result};

/// Base58 alphabet (no `0`, `O`, `I`, `l`).
pub const ALPHABET: &[u8; 58] = b"123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

const ZERO_DIGIT: char = '1';

/// Encode `bytes` as base58 text.
pub fn encode(bytes: &[u8]) -> String {
    let zeros = bytes.iter().take_while(|&&b| b == 0).count();

    let base = Natural::from(58u32);
    let zero = Natural::from(0u32);
    let mut n = bigint::from_bytes(bytes);
    let mut digits = Vec::new();
    while n != zero {
        let rem = &n % &base;
        n /= &base;
        // The remainder is below 58 and therefore a single byte.
        let idx = bigint::to_bytes(&rem).last().copied().unwrap_or(0);
        digits.push(ALPHABET[usize::from(idx)]);
    }

    let mut out = String::with_capacity(zeros + digits.len());
    out.extend(std::iter::repeat(ZERO_DIGIT).take(zeros));
    out.extend(digits.iter().rev().map(|&d| char::from(d)));
    out
}

/// Decode base58 text back into bytes.
pub fn decode(text: &str) -> Result<Vec<u8>> {
    // Little-endian base-256 accumulator.
    let mut acc: Vec<u8> = Vec::new();
    for (position, character) in text.chars().enumerate() {
        let digit = digit_value(character)
            .ok_or(BytekitError::InvalidCharacter { character, position })?;
        let mut carry = u32::from(digit);
        for byte in acc.iter_mut() {
            carry += u32::from(*byte) * 58;
            *byte = (carry & 0xff) as u8;
            carry >>= 8;
        }
        while carry > 0 {
            acc.push((carry & 0xff) as u8);
            carry >>= 8;
        }
    }

    let zeros = text.chars().take_while(|&c| c == ZERO_DIGIT).count();
    let mut out = vec![0u8; zeros];
    out.extend(acc.iter().rev());
    Ok(out)
}

fn digit_value(c: char) -> Option<u8> {
    let c = u8::try_from(c).ok()?;
    ALPHABET.iter().position(|&a| a == c).map(|idx| idx as u8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hex::from_hex;

    #[test]
    fn known_vectors() {
        assert_eq!(encode(b"hello world"), "StV1DL6CwTryKyV");
        let addr = from_hex("00010966776006953d5567439e5e39f86a0d273beed61967f6").expect("hex");
        assert_eq!(encode(&addr), "16UwLL9Risc3QfPqBUvKofHmBQ7wMtjvM");
        assert_eq!(decode("16UwLL9Risc3QfPqBUvKofHmBQ7wMtjvM").expect("decode"), addr);
    }

    #[test]
    fn leading_zero_bytes_become_ones() {
        assert_eq!(encode(&[1]), "2");
        assert_eq!(encode(&[0, 0, 1]), "112");
        assert_eq!(encode(&[0]), "1");
        assert_eq!(encode(&[]), "");
        assert_eq!(decode("112").expect("decode"), vec![0, 0, 1]);
        assert_eq!(decode("1").expect("decode"), vec![0]);
        assert_eq!(decode("").expect("decode"), Vec::<u8>::new());
    }

    #[test]
    fn rejects_characters_outside_alphabet() {
        for bad in ["0", "abcO", "Il", "é"] {
            assert!(matches!(
                decode(bad),
                Err(BytekitError::InvalidCharacter { .. })
            ));
        }
        match decode("12l4") {
            Err(BytekitError::InvalidCharacter { character, position }) => {
                assert_eq!(character, 'l');
                assert_eq!(position, 2);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
