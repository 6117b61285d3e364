//! Core primitives for the bytekit toolchain.
//!
//! The crate groups a handful of small, self-contained binary encoding
//! building blocks:
//!
//! * [`hex`], [`base64url`], [`base58`] and [`bigint`]: text and number
//!   codecs for byte sequences.
//! * [`frame`]: length-prefixed packing of byte-array lists, plain and
//!   name-tagged.
//! * [`value`]: JSON documents carrying raw bytes as tagged base64 strings.
//! * [`crc32`] and [`archive`]: a streaming CRC-32 and an in-memory,
//!   store-only ZIP writer built on it.
//! * [`ecc`]: compressed elliptic-curve point encoding with square-root
//!   recovery of `y`.
//! * [`random`]: thin helpers over the OS random source.
//!
//! Everything except [`archive::ArchiveWriter`] is a pure function of its
//! input and can be called from any thread.

pub mod archive;
pub mod base58;
pub mod base64url;
pub mod bigint;
pub mod crc32;
pub mod ecc;
pub mod frame;
pub mod hex;
pub mod random;
pub mod value;

mod error;

pub use error::{BytekitError, Result};
pub use malachite::Natural;
