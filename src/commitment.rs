//! Pedersen commitments (component C3) over secp256k1.
//!
//! `C = v*G + r*H` where `G` is the standard base point and `H` is an
//! independent, nothing-up-my-sleeve second generator derived once via
//! hash-to-curve and memoized behind a one-time initializer (spec §4.3, §5,
//! §9). Homomorphic add/subtract on commitments and blindings supports
//! aggregation without ever revealing the individual values.

use crate::config::PEDERSEN_H_DOMAIN_TAG;
use crate::curve::{sha256, Point, Scalar};
use crate::error::Result;
use crate::types::PedersenCommitment;

lazy_static::lazy_static! {
    /// The second Pedersen generator. Computed once on first use and never
    /// mutated afterward (spec §5 "Shared resource policy").
    static ref H: Point = generate_h();
}

/// Derive `H` deterministically: hash `"{tag}:{counter}"`, incrementing
/// `counter` until the 32-byte digest parses as the X coordinate of a valid
/// even-Y curve point distinct from the identity and from `G`.
fn generate_h() -> Point {
    for counter in 0u32.. {
        let input = format!("{}:{}", PEDERSEN_H_DOMAIN_TAG, counter);
        let hash = sha256(input.as_bytes());

        let mut candidate = [0u8; 33];
        candidate[0] = 0x02; // even Y
        candidate[1..].copy_from_slice(&hash);

        if let Ok(point) = Point::decompress(&candidate) {
            if point != Point::generator() {
                return point;
            }
        }
    }
    unreachable!("sha256 pre-image space exhausted before a valid curve point was found");
}

/// Return the memoized second generator `H`, exposed for ZK-proof or audit
/// integrations that need to pin generators explicitly.
pub fn get_generator_h() -> Point {
    *H
}

/// Commit to `value` with a freshly drawn blinding factor.
///
/// `v` must be `< n` (the group order); values this core deals with are
/// `u64` amounts, always comfortably below `n`, so in practice this only
/// fails on `RngFailure`.
pub fn commit(value: u64) -> Result<PedersenCommitment> {
    let blinding = Scalar::random()?;
    commit_with_blinding(value, blinding)
}

/// Commit to `value` with a caller-supplied blinding factor. Useful for
/// deterministic tests and for reconstructing a commitment whose blinding
/// was recovered from an encrypted metadata channel.
pub fn commit_with_blinding(value: u64, blinding: Scalar) -> Result<PedersenCommitment> {
    let v = Scalar::from_u64(value);
    let commitment = if value == 0 {
        Point::mul(&blinding, &H)
    } else {
        Point::mul_generator(&v).add(&Point::mul(&blinding, &H))
    };
    Ok(PedersenCommitment { commitment, blinding })
}

/// A commitment to zero, i.e. `r*H`.
pub fn zero(blinding: Scalar) -> Result<PedersenCommitment> {
    commit_with_blinding(0, blinding)
}

/// Recompute `v*G + r*H` and compare against `commitment`.
pub fn verify_opening(commitment: &Point, value: u64, blinding: &Scalar) -> bool {
    let v = Scalar::from_u64(value);
    let expected = if value == 0 {
        Point::mul(blinding, &H)
    } else {
        Point::mul_generator(&v).add(&Point::mul(blinding, &H))
    };
    *commitment == expected
}

/// `isZero(C, r)`: does `C` open to zero under blinding `r`?
pub fn is_zero(commitment: &Point, blinding: &Scalar) -> bool {
    verify_opening(commitment, 0, blinding)
}

/// `C1 + C2`, opening to `v1 + v2` under `add_blindings(r1, r2)`.
pub fn add_commitments(c1: &Point, c2: &Point) -> Point {
    c1.add(c2)
}

/// `C1 - C2`, opening to `v1 - v2` under `subtract_blindings(r1, r2)`.
pub fn subtract_commitments(c1: &Point, c2: &Point) -> Point {
    c1.sub(c2)
}

/// `(r1 + r2) mod n`.
pub fn add_blindings(r1: &Scalar, r2: &Scalar) -> Scalar {
    r1.add(r2)
}

/// `(r1 - r2) mod n`.
pub fn subtract_blindings(r1: &Scalar, r2: &Scalar) -> Scalar {
    r1.sub(r2)
}

/// Draw a fresh random blinding factor.
pub fn generate_blinding() -> Result<Scalar> {
    Scalar::random()
}

/// A commitment annotated with ERC-20 context for UX purposes only; the
/// underlying commitment math is identical to [`commit`].
pub struct TokenCommitment {
    pub pedersen: PedersenCommitment,
    pub token_address: [u8; 20],
    pub decimals: u8,
    pub raw_amount: Option<u128>,
}

/// Commit to a token-denominated amount. Cryptographically identical to
/// [`commit`]; the token metadata is informational.
pub fn commit_token(
    value: u64,
    token_address: [u8; 20],
    decimals: u8,
    raw_amount: Option<u128>,
) -> Result<TokenCommitment> {
    let pedersen = commit(value)?;
    Ok(TokenCommitment { pedersen, token_address, decimals, raw_amount })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commit_and_verify() {
        let c = commit(100).unwrap();
        assert!(verify_opening(&c.commitment, 100, &c.blinding));
        assert!(!verify_opening(&c.commitment, 101, &c.blinding));
    }

    #[test]
    fn wrong_blinding_fails() {
        let c1 = commit(100).unwrap();
        let c2 = commit(100).unwrap();
        assert!(!verify_opening(&c1.commitment, 100, &c2.blinding));
    }

    #[test]
    fn homomorphic_addition() {
        let c1 = commit(100).unwrap();
        let c2 = commit(250).unwrap();

        let c_sum = add_commitments(&c1.commitment, &c2.commitment);
        let r_sum = add_blindings(&c1.blinding, &c2.blinding);

        assert!(verify_opening(&c_sum, 350, &r_sum));
    }

    #[test]
    fn add_then_subtract_recovers_original() {
        let c1 = commit(100).unwrap();
        let c2 = commit(40).unwrap();

        let sum = add_commitments(&c1.commitment, &c2.commitment);
        let recovered = subtract_commitments(&sum, &c2.commitment);

        assert_eq!(recovered, c1.commitment);
    }

    #[test]
    fn zero_commitment_opens_to_zero() {
        let blinding = generate_blinding().unwrap();
        let c = zero(blinding).unwrap();
        assert!(is_zero(&c.commitment, &c.blinding));
    }

    #[test]
    fn h_is_distinct_from_g() {
        assert_ne!(get_generator_h(), Point::generator());
    }

    #[test]
    fn h_is_memoized_and_stable_across_calls() {
        assert_eq!(get_generator_h(), get_generator_h());
    }
}
