//! Compressed points on short-Weierstrass curves `y² = x³ + ax + b (mod p)`.
//!
//! Only primes with `p ≡ 3 (mod 4)` are accepted: for those,
//! `v^((p+1)/4)` is a square root of any quadratic residue `v`, so `y` can be
//! recovered with a single modular exponentiation.

use malachite::Natural;

use crate::bigint::{self, from_bytes, mod_pow, to_bytes_fixed};
use crate::error::{BytekitError, Result};
use crate::hex::from_hex;

const P256_P: &str = "ffffffff00000001000000000000000000000000ffffffffffffffffffffffff";
const P256_B: &str = "5ac635d8aa3a93e7b3ebbd55769886bc651d06b0cc53b0f63bce3c3e27d2604b";

/// Curve coefficients, field prime and the derived square-root exponent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CurveParams {
    a: Natural,
    b: Natural,
    p: Natural,
    sqrt_exponent: Natural,
    coordinate_size: usize,
}

impl CurveParams {
    /// Build parameters for `y² = x³ + ax + b (mod p)`. Fails unless
    /// `p ≡ 3 (mod 4)`.
    pub fn new(a: Natural, b: Natural, p: Natural) -> Result<Self> {
        let four = Natural::from(4u32);
        if &p % &four != Natural::from(3u32) {
            return Err(BytekitError::UnsupportedPrime);
        }
        let sqrt_exponent = (&p + Natural::from(1u32)) / &four;
        let coordinate_size = bigint::to_bytes(&p).len();
        Ok(Self {
            a,
            b,
            p,
            sqrt_exponent,
            coordinate_size,
        })
    }

    /// NIST P-256 (secp256r1).
    pub fn p256() -> Self {
        let p = natural_from_hex(P256_P);
        let a = &p - Natural::from(3u32);
        let sqrt_exponent = (&p + Natural::from(1u32)) / Natural::from(4u32);
        Self {
            a,
            b: natural_from_hex(P256_B),
            p,
            sqrt_exponent,
            coordinate_size: 32,
        }
    }

    pub fn a(&self) -> &Natural {
        &self.a
    }

    pub fn b(&self) -> &Natural {
        &self.b
    }

    pub fn p(&self) -> &Natural {
        &self.p
    }

    /// `(p + 1) / 4`
    pub fn sqrt_exponent(&self) -> &Natural {
        &self.sqrt_exponent
    }

    /// Byte length of one encoded coordinate.
    pub fn coordinate_size(&self) -> usize {
        self.coordinate_size
    }

    // x³ + ax + b mod p
    fn rhs(&self, x: &Natural) -> Natural {
        let x3 = x * x % &self.p * x;
        (x3 + &self.a * x + &self.b) % &self.p
    }
}

// Only used with the compile-time constants above.
fn natural_from_hex(hex: &str) -> Natural {
    from_hex(hex).map_or_else(|_| Natural::from(0u32), |bytes| from_bytes(&bytes))
}

/// Affine curve point.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Point {
    pub x: Natural,
    pub y: Natural,
}

impl Point {
    pub fn new(x: Natural, y: Natural) -> Self {
        Self { x, y }
    }

    /// Whether `y² ≡ x³ + ax + b (mod p)`.
    pub fn is_on_curve(&self, params: &CurveParams) -> bool {
        &self.y * &self.y % params.p() == params.rhs(&self.x)
    }
}

/// `[2 + (y mod 2)] ++ x`, with `x` left-padded to the coordinate size.
pub fn compress(point: &Point, params: &CurveParams) -> Vec<u8> {
    let mut out = Vec::with_capacity(1 + params.coordinate_size());
    out.push(2 + u8::from(bigint::is_odd(&point.y)));
    out.extend_from_slice(&to_bytes_fixed(&point.x, params.coordinate_size()));
    out
}

/// Recover the full point from its compressed form.
///
/// The result is not checked against the curve; a non-residue `x` yields a
/// point that fails [`Point::is_on_curve`].
pub fn decompress(compressed: &[u8], params: &CurveParams) -> Result<Point> {
    let (&prefix, x_bytes) = compressed
        .split_first()
        .ok_or(BytekitError::InvalidPointEncoding(0))?;
    if prefix != 2 && prefix != 3 {
        return Err(BytekitError::InvalidPointEncoding(prefix));
    }

    let x = from_bytes(x_bytes);
    let y_squared = params.rhs(&x);
    let root = mod_pow(&y_squared, params.sqrt_exponent(), params.p());

    let y = if bigint::is_odd(&root) == (prefix == 3) {
        root
    } else {
        (params.p() - &root) % params.p()
    };
    Ok(Point { x, y })
}
