use rand::rngs::OsRng;
use rand::RngCore;

use crate::hex::to_hex;

/// Default length, in hex digits, of [`random_hex_string`].
pub const DEFAULT_HEX_LEN: usize = 32;

/// `size` bytes from the operating system CSPRNG.
pub fn random_bytes(size: usize) -> Vec<u8> {
    let mut data = vec![0u8; size];
    OsRng.fill_bytes(&mut data);
    data
}

/// `len / 2` random bytes rendered as lower-case hex.
pub fn random_hex_string(len: usize) -> String {
    to_hex(&random_bytes(len / 2))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizes() {
        assert_eq!(random_bytes(0).len(), 0);
        assert_eq!(random_bytes(48).len(), 48);
        assert_eq!(random_hex_string(DEFAULT_HEX_LEN).len(), 32);
        assert_eq!(random_hex_string(7).len(), 6);
    }

    #[test]
    fn output_is_hex_and_varies() {
        let a = random_hex_string(64);
        let b = random_hex_string(64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert_ne!(a, b);
    }
}
