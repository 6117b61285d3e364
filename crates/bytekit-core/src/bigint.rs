//! Arbitrary-precision unsigned integers to and from big-endian bytes.
//!
//! The byte form is derived from the hex rendering of the number, so zero
//! encodes as a single `0x00` byte and every other value has no leading
//! zero byte.

use malachite::base::num::arithmetic::traits::Parity;
use malachite::base::num::basic::traits::Zero;
use malachite::base::num::conversion::traits::PowerOf2Digits;
use malachite::Natural;

use crate::hex::from_hex;

/// Minimal big-endian encoding of `n`.
pub fn to_bytes(n: &Natural) -> Vec<u8> {
    let digits = format!("{n:x}");
    // `{:x}` only ever yields hex digits, so decoding cannot fail.
    from_hex(&digits).unwrap_or_default()
}

/// Big-endian encoding of `n` left-padded with zero bytes to `size`.
///
/// When the minimal encoding is already longer than `size` it is returned
/// unchanged; the result is never truncated.
pub fn to_bytes_fixed(n: &Natural, size: usize) -> Vec<u8> {
    let natural = to_bytes(n);
    if natural.len() >= size {
        return natural;
    }
    let mut out = vec![0u8; size - natural.len()];
    out.extend_from_slice(&natural);
    out
}

/// Interpret `bytes` as an unsigned big-endian integer. Empty input is zero.
pub fn from_bytes(bytes: &[u8]) -> Natural {
    // Every u8 is a valid base-256 digit, so the conversion cannot fail.
    <Natural as PowerOf2Digits<u8>>::from_power_of_2_digits_desc(8, bytes.iter().copied())
        .unwrap_or(Natural::ZERO)
}

/// `base^exp mod m` by square-and-multiply, scanning the exponent's bits
/// from the most significant end.
pub fn mod_pow(base: &Natural, exp: &Natural, m: &Natural) -> Natural {
    let one = Natural::from(1u32);
    if *m == one {
        return Natural::from(0u32);
    }
    let base = base % m;
    let mut result = one;
    for byte in to_bytes(exp) {
        for bit in (0..8).rev() {
            result = &result * &result % m;
            if (byte >> bit) & 1 == 1 {
                result = &result * &base % m;
            }
        }
    }
    result
}

/// Whether `n` is odd.
pub(crate) fn is_odd(n: &Natural) -> bool {
    n.odd()
}
