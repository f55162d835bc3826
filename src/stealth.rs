//! Stealth address scheme (component C2): meta-address generation, one-shot
//! stealth-address derivation, ownership check, and spending-key recovery.
//!
//! Implements the EIP-5564-style dual-key ECDH + scalar-tweak construction
//! of spec §4.2. The shared secret is always computed against the
//! *spending* key while the stealth point is offset from the *viewing* key
//! — swapping that pairing silently breaks ownership detection, so every
//! function here names its operands `spending_*`/`viewing_*` rather than
//! generic `a`/`b` to keep the pairing visible at the call site.

use crate::config::{META_ADDRESS_HEX_LEN, META_ADDRESS_LEN, META_ADDRESS_PREFIX};
use crate::curve::{eth_address_from_point, sha256, Point, Scalar};
use crate::error::{Error, Result};
use crate::types::{MetaAddress, StealthAddress, StealthMetaSecrets};

/// Generate a fresh stealth meta-address keypair for `chain_tag`.
pub fn generate_meta_address(chain_tag: &str) -> Result<(MetaAddress, StealthMetaSecrets)> {
    let spending_priv = Scalar::random()?;
    let viewing_priv = Scalar::random()?;

    let spending_pub = Point::mul_generator(&spending_priv);
    let viewing_pub = Point::mul_generator(&viewing_priv);

    let meta = MetaAddress::new(spending_pub, viewing_pub, chain_tag.to_string());
    let secrets = StealthMetaSecrets { spending_priv, viewing_priv };
    Ok((meta, secrets))
}

/// Encode a meta-address as `st:eth:0x` + 132 lowercase hex digits (141
/// characters total). Label and scheme id are not carried — they are
/// context, not part of the wire form.
pub fn encode_meta_address(meta: &MetaAddress) -> String {
    format!(
        "{}{}{}",
        META_ADDRESS_PREFIX,
        hex::encode(meta.spending_pub.compress()),
        hex::encode(meta.viewing_pub.compress())
    )
}

/// Parse a `st:eth:0x...` meta-address. Rejects wrong prefix, wrong length
/// (must be exactly 141 characters), non-hex characters, and
/// non-decompressible key bytes.
pub fn decode_meta_address(encoded: &str) -> Result<MetaAddress> {
    if encoded.len() != META_ADDRESS_LEN {
        return Err(Error::InvalidMetaAddressFormat {
            reason: format!("expected {} characters, got {}", META_ADDRESS_LEN, encoded.len()),
        });
    }
    if !encoded.starts_with(META_ADDRESS_PREFIX) {
        return Err(Error::InvalidMetaAddressFormat {
            reason: format!("expected prefix `{}`", META_ADDRESS_PREFIX),
        });
    }

    let hex_part = &encoded[META_ADDRESS_PREFIX.len()..];
    debug_assert_eq!(hex_part.len(), META_ADDRESS_HEX_LEN);

    let raw = hex::decode(hex_part)
        .map_err(|e| Error::InvalidMetaAddressFormat { reason: format!("non-hex characters: {e}") })?;
    if raw.len() != 66 {
        return Err(Error::InvalidMetaAddressFormat {
            reason: format!("expected 66 decoded bytes, got {}", raw.len()),
        });
    }

    let spending_bytes: [u8; 33] = raw[..33].try_into().unwrap();
    let viewing_bytes: [u8; 33] = raw[33..].try_into().unwrap();

    let spending_pub = Point::decompress(&spending_bytes)?;
    let viewing_pub = Point::decompress(&viewing_bytes)?;

    Ok(MetaAddress::new(spending_pub, viewing_pub, "eth"))
}

/// Sender side: derive a one-time stealth address for `recipient`.
///
/// 1. Draw an ephemeral keypair `(ephPriv, ephPub = ephPriv * G)`.
/// 2. `S = ephPriv * spendingPub` (ECDH against the recipient's *spending*
///    key — not the viewing key).
/// 3. `h = sha256(compress(S))`.
/// 4. `stealthPub = viewingPub + h * G`.
/// 5. `viewTag = h[0]`.
///
/// `ephPriv` is wiped before returning.
pub fn generate_stealth_address(recipient: &MetaAddress) -> Result<StealthAddress> {
    let eph_priv = Scalar::random()?;
    let eph_pub = Point::mul_generator(&eph_priv);

    let shared_secret = Point::mul(&eph_priv, &recipient.spending_pub);
    let h_bytes = sha256(&shared_secret.compress());
    let h = Scalar::from_bytes(&h_bytes)
        .map_err(|_| Error::invalid_scalar("shared_secret_hash", "hash did not reduce to a valid scalar"))?;

    let stealth_pub = recipient.viewing_pub.add(&Point::mul_generator(&h));
    let view_tag = h_bytes[0];

    drop(eph_priv);

    Ok(StealthAddress { stealth_pub, ephemeral_pub: eph_pub, view_tag })
}

/// Recompute the shared secret hash `h = sha256(compress(spendingPriv *
/// ephPub))` that both the ownership check and the scanner's pre-filter
/// need. Shared by [`check_ownership`] and [`recover_spending_key`] so the
/// two stay in lock-step.
fn shared_secret_hash(spending_priv: &Scalar, ephemeral_pub: &Point) -> [u8; 32] {
    let shared_secret = Point::mul(spending_priv, ephemeral_pub);
    sha256(&shared_secret.compress())
}

/// Receiver side: derive the one-time private key for `stealth.stealth_pub`.
///
/// Does **not** itself check that the recovered key matches
/// `stealth.stealth_pub` — callers who need that confirmation should use
/// [`check_ownership`] first, or compare `Point::mul_generator(&recovered)`
/// against `stealth.stealth_pub` themselves.
pub fn recover_spending_key(
    stealth: &StealthAddress,
    spending_priv: &Scalar,
    viewing_priv: &Scalar,
) -> Result<Scalar> {
    recover_spending_key_from_ephemeral(&stealth.ephemeral_pub, spending_priv, viewing_priv)
}

/// Same as [`recover_spending_key`], but for callers that only have the
/// ephemeral public key on hand (e.g. the scanner, working from an
/// `Announcement` rather than a full `StealthAddress`).
pub fn recover_spending_key_from_ephemeral(
    ephemeral_pub: &Point,
    spending_priv: &Scalar,
    viewing_priv: &Scalar,
) -> Result<Scalar> {
    let h_bytes = shared_secret_hash(spending_priv, ephemeral_pub);
    let h = Scalar::from_bytes(&h_bytes)
        .map_err(|_| Error::invalid_scalar("shared_secret_hash", "hash did not reduce to a valid scalar"))?;
    Ok(viewing_priv.add(&h))
}

/// Receiver side ownership check (spec §4.2).
///
/// Fast-rejects via the view tag (expected ~255/256 rejection rate on
/// unrelated announcements) before doing the full scalar recovery and a
/// constant-time compressed-point comparison.
pub fn check_ownership(
    stealth: &StealthAddress,
    spending_priv: &Scalar,
    viewing_priv: &Scalar,
) -> Result<bool> {
    let h_bytes = shared_secret_hash(spending_priv, &stealth.ephemeral_pub);
    if h_bytes[0] != stealth.view_tag {
        return Ok(false);
    }

    let h = Scalar::from_bytes(&h_bytes)
        .map_err(|_| Error::invalid_scalar("shared_secret_hash", "hash did not reduce to a valid scalar"))?;
    let expected_priv = viewing_priv.add(&h);
    let expected_pub = Point::mul_generator(&expected_priv);

    Ok(expected_pub.ct_eq(&stealth.stealth_pub))
}

/// Address-based ownership check, for announcements that carry only a
/// 20-byte Ethereum address rather than the full compressed stealth
/// public key.
pub fn check_ownership_by_address(
    ephemeral_pub: &Point,
    announced_address: &[u8; 20],
    view_tag: u8,
    spending_priv: &Scalar,
    viewing_priv: &Scalar,
) -> Result<bool> {
    let h_bytes = shared_secret_hash(spending_priv, ephemeral_pub);
    if h_bytes[0] != view_tag {
        return Ok(false);
    }

    let h = Scalar::from_bytes(&h_bytes)
        .map_err(|_| Error::invalid_scalar("shared_secret_hash", "hash did not reduce to a valid scalar"))?;
    let expected_priv = viewing_priv.add(&h);
    let expected_pub = Point::mul_generator(&expected_priv);
    let expected_address = eth_address_from_point(&expected_pub);

    use subtle::ConstantTimeEq;
    Ok(expected_address.ct_eq(announced_address).into())
}

/// Viewing-key-only fast filter (spec §4.5 step 1, §9 "observed ambiguity").
///
/// The source computes the scanner's cheap pre-filter as
/// `sha256(viewingPriv · ephPub)[0]`, justified by an ECDH identity that
/// only holds for `spendingPriv`/`ephPriv`, not `viewingPriv` — a
/// viewing-only party cannot actually reconstruct the sender's shared
/// secret this way. This function implements that filter literally, for
/// callers who only hold a viewing key and want a best-effort signal; it is
/// **not** equivalent to [`check_ownership`]'s fast reject and MUST NOT be
/// used as the sole gate before recovering a spending key. The scanner
/// (component C5) uses the correct, spending-key-based fast reject inside
/// [`check_ownership_by_address`] instead.
pub fn viewing_only_prefilter(viewing_priv: &Scalar, ephemeral_pub: &Point, view_tag: u8) -> bool {
    let shared = Point::mul(viewing_priv, ephemeral_pub);
    let h_bytes = sha256(&shared.compress());
    h_bytes[0] == view_tag
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_and_recover_round_trip() {
        let (meta, secrets) = generate_meta_address("ethereum").unwrap();
        let stealth = generate_stealth_address(&meta).unwrap();

        assert!(check_ownership(&stealth, &secrets.spending_priv, &secrets.viewing_priv).unwrap());

        let recovered =
            recover_spending_key(&stealth, &secrets.spending_priv, &secrets.viewing_priv).unwrap();
        assert_eq!(Point::mul_generator(&recovered), stealth.stealth_pub);
    }

    #[test]
    fn unrelated_recipient_does_not_own_it() {
        let (meta, _) = generate_meta_address("ethereum").unwrap();
        let (_, other_secrets) = generate_meta_address("ethereum").unwrap();
        let stealth = generate_stealth_address(&meta).unwrap();

        assert!(!check_ownership(&stealth, &other_secrets.spending_priv, &other_secrets.viewing_priv)
            .unwrap());
    }

    #[test]
    fn encode_decode_meta_address_round_trip() {
        let (meta, _) = generate_meta_address("ethereum").unwrap();
        let encoded = encode_meta_address(&meta);
        assert_eq!(encoded.len(), META_ADDRESS_LEN);

        let decoded = decode_meta_address(&encoded).unwrap();
        assert_eq!(decoded.spending_pub, meta.spending_pub);
        assert_eq!(decoded.viewing_pub, meta.viewing_pub);
    }

    #[test]
    fn decode_rejects_wrong_length() {
        let (meta, _) = generate_meta_address("ethereum").unwrap();
        let mut encoded = encode_meta_address(&meta);
        encoded.push('0');
        assert!(decode_meta_address(&encoded).is_err());
        encoded.pop();
        encoded.pop();
        assert!(decode_meta_address(&encoded).is_err());
    }

    #[test]
    fn decode_rejects_wrong_prefix() {
        let (meta, _) = generate_meta_address("ethereum").unwrap();
        let encoded = encode_meta_address(&meta);
        let bad = format!("xx:eth:0x{}", &encoded[META_ADDRESS_PREFIX.len()..]);
        assert!(decode_meta_address(&bad).is_err());
    }

    #[test]
    fn view_tag_distribution_is_roughly_uniform() {
        let (meta, _) = generate_meta_address("ethereum").unwrap();
        let mut buckets = [0u32; 256];
        let samples = 2560;
        for _ in 0..samples {
            let stealth = generate_stealth_address(&meta).unwrap();
            buckets[stealth.view_tag as usize] += 1;
        }
        let expected = samples as f64 / 256.0;
        for count in buckets {
            let ratio = count as f64 / expected;
            assert!(ratio >= 0.30 && ratio <= 3.00, "bucket ratio {ratio} out of range");
        }
    }
}
