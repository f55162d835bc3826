//! Curve primitives (component C1): secp256k1 scalar/point arithmetic,
//! compressed encoding, hashing, Ethereum address derivation, EIP-55
//! checksumming, and constant-time scalar hygiene.
//!
//! Scalar-point multiplication here goes through `k256`'s variable-base
//! scalar multiplication, which RustCrypto implements with constant-time,
//! Montgomery-ladder-style field arithmetic — no branching on secret bits,
//! no secret-dependent table index. Hashing and ABI-level encoding are not
//! constant-time and don't need to be (spec §4.1).

use k256::elliptic_curve::group::GroupEncoding as _;
use k256::elliptic_curve::sec1::{FromEncodedPoint, ToEncodedPoint};
use k256::elliptic_curve::{Field, PrimeField};
use k256::{AffinePoint, EncodedPoint, ProjectivePoint};
use rand::RngCore;
use sha2::{Digest, Sha256};
use sha3::Keccak256;
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{Error, Result};

/// A secp256k1 scalar in `[1, n-1]`.
///
/// Never implements `Clone`/`Copy` — callers that genuinely need a second
/// owned copy (e.g. to hand one off for signing while keeping the other)
/// must call [`Scalar::copy`] explicitly, which carries the same
/// zero-on-drop guarantee as the original. The inner bytes are wiped on
/// every drop path, including unwinding.
#[derive(ZeroizeOnDrop)]
pub struct Scalar(k256::Scalar);

impl Scalar {
    /// Draw a uniformly random scalar in `[1, n-1]` by rejection sampling.
    pub fn random() -> Result<Self> {
        for _ in 0..16 {
            let mut bytes = [0u8; 32];
            rand::thread_rng().try_fill_bytes(&mut bytes).map_err(|e| {
                Error::RngFailure { reason: e.to_string() }
            })?;
            if let Ok(scalar) = Self::from_bytes(&bytes) {
                bytes.zeroize();
                return Ok(scalar);
            }
            bytes.zeroize();
        }
        Err(Error::RngFailure { reason: "failed to sample a nonzero in-range scalar after 16 draws".into() })
    }

    /// Parse a scalar from 32 big-endian bytes. Fails when `b >= n` or
    /// `b == 0`.
    pub fn from_bytes(b: &[u8; 32]) -> Result<Self> {
        let candidate: Option<k256::Scalar> = k256::Scalar::from_repr((*b).into()).into();
        let scalar = candidate
            .ok_or_else(|| Error::invalid_scalar("scalar", "bytes are >= the group order"))?;
        if bool::from(scalar.is_zero()) {
            return Err(Error::invalid_scalar("scalar", "scalar is zero"));
        }
        Ok(Scalar(scalar))
    }

    /// Serialize to 32 big-endian bytes.
    pub fn to_bytes(&self) -> [u8; 32] {
        self.0.to_bytes().into()
    }

    /// Explicit, auditable copy. Carries the same wipe-on-drop guarantee.
    pub fn copy(&self) -> Scalar {
        Scalar(self.0)
    }

    /// `self + other mod n`.
    pub fn add(&self, other: &Scalar) -> Scalar {
        Scalar(self.0 + other.0)
    }

    /// `self - other mod n`.
    pub fn sub(&self, other: &Scalar) -> Scalar {
        Scalar(self.0 - other.0)
    }

    /// Scalar corresponding to a small integer value, e.g. a Pedersen
    /// commitment's plaintext amount. Not secret, not subject to the
    /// nonzero/in-range invariant the wrapped-key variants enforce.
    pub(crate) fn from_u64(value: u64) -> Self {
        Scalar(k256::Scalar::from(value))
    }

    pub(crate) fn inner(&self) -> &k256::Scalar {
        &self.0
    }
}

/// A non-identity point on secp256k1, always stored compressed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Point(AffinePoint);

impl Point {
    /// The secp256k1 base generator `G`.
    pub fn generator() -> Point {
        Point(ProjectivePoint::GENERATOR.to_affine())
    }

    /// `k * P`.
    pub fn mul(scalar: &Scalar, point: &Point) -> Point {
        Point((ProjectivePoint::from(point.0) * scalar.0).to_affine())
    }

    /// `k * G`.
    pub fn mul_generator(scalar: &Scalar) -> Point {
        Point((ProjectivePoint::GENERATOR * scalar.0).to_affine())
    }

    /// `P + Q`.
    pub fn add(&self, other: &Point) -> Point {
        Point((ProjectivePoint::from(self.0) + ProjectivePoint::from(other.0)).to_affine())
    }

    /// `P - Q`.
    pub fn sub(&self, other: &Point) -> Point {
        Point((ProjectivePoint::from(self.0) - ProjectivePoint::from(other.0)).to_affine())
    }

    /// 33-byte compressed SEC1 encoding (leading `0x02`/`0x03` + X).
    pub fn compress(&self) -> [u8; 33] {
        let encoded = self.0.to_encoded_point(true);
        let mut out = [0u8; 33];
        out.copy_from_slice(encoded.as_bytes());
        out
    }

    /// Parse a 33-byte compressed point. Fails with `InvalidPoint` when the
    /// parity byte isn't 2 or 3, the X coordinate isn't on the curve, or the
    /// point is the identity.
    pub fn decompress(bytes: &[u8; 33]) -> Result<Point> {
        if bytes[0] != 0x02 && bytes[0] != 0x03 {
            return Err(Error::invalid_point("point", "parity byte must be 0x02 or 0x03"));
        }
        let encoded = EncodedPoint::from_bytes(bytes)
            .map_err(|e| Error::invalid_point("point", e.to_string()))?;
        let affine: Option<AffinePoint> = AffinePoint::from_encoded_point(&encoded).into();
        let affine = affine.ok_or_else(|| {
            Error::invalid_point("point", "no curve point for the given X coordinate")
        })?;
        if bool::from(ProjectivePoint::from(affine).is_identity()) {
            return Err(Error::invalid_point("point", "identity point is forbidden"));
        }
        Ok(Point(affine))
    }

    /// Constant-time equality of the compressed encodings, for use inside
    /// the ownership check where one operand is secret-derived.
    pub fn ct_eq(&self, other: &Point) -> bool {
        self.compress().ct_eq(&other.compress()).into()
    }

    pub(crate) fn inner(&self) -> AffinePoint {
        self.0
    }
}

/// SHA-256 of arbitrary bytes.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Keccak-256 of arbitrary bytes (Ethereum's hash function, distinct from
/// the SHA-3 standard's padding).
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Derive a 20-byte Ethereum address from a public key: decompress, drop the
/// `0x04` tag byte, keccak256 the remaining 64 bytes, take the last 20.
pub fn eth_address_from_point(point: &Point) -> [u8; 20] {
    let uncompressed = point.0.to_encoded_point(false);
    let without_prefix = &uncompressed.as_bytes()[1..];
    let hash = keccak256(without_prefix);
    let mut address = [0u8; 20];
    address.copy_from_slice(&hash[12..]);
    address
}

/// Apply the EIP-55 mixed-case checksum to a 20-byte address.
pub fn eip55_checksum(address: &[u8; 20]) -> String {
    let hex_lower = hex::encode(address);
    let checksum_hash = keccak256(hex_lower.as_bytes());

    let mut out = String::with_capacity(42);
    out.push_str("0x");
    for (i, c) in hex_lower.chars().enumerate() {
        if c.is_ascii_digit() {
            out.push(c);
        } else {
            let nibble = (checksum_hash[i / 2] >> (4 * (1 - (i % 2)))) & 0x0f;
            if nibble >= 8 {
                out.push(c.to_ascii_uppercase());
            } else {
                out.push(c);
            }
        }
    }
    out
}
