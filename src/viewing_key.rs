//! Viewing keys (component C6): generation, portable export/import,
//! permission-scoped sharing, expiry, registry indexing, and an
//! ECDH-derived encrypted channel for carrying a Pedersen blinding factor
//! (or any other small payload) to a viewing-key holder off-chain.
//!
//! The encrypted channel uses an ECDH-derived key rather than a pre-shared
//! symmetric secret: the channel key is derived via ECDH against the
//! recipient's `viewingPub`, so a sender who only has the recipient's
//! public `ViewingKeyExport` can still encrypt to them (spec §3: "the
//! blinding travels in the encrypted metadata or off-channel").

use chacha20poly1305::{
    aead::{Aead, KeyInit},
    XChaCha20Poly1305, XNonce,
};
use rand::RngCore;

use crate::curve::{sha256, Point, Scalar};
use crate::error::{Error, Result};
use crate::types::{
    BlockRange, EncryptedPayload, SharedViewingKey, ViewingKeyExport, ViewingPermissions,
};

/// Reference export-format version. Unknown versions are accepted on
/// import with the rest of the record trusted as-is, mirroring the
/// metadata sub-format's tolerance policy (§4.4, §6).
pub const VIEWING_KEY_VERSION: u8 = 1;

/// Freshly generated viewing-key material. Holds the private scalar —
/// never serialize this directly; call [`export`] for the portable form.
pub struct ViewingKeyMaterial {
    pub viewing_priv: Scalar,
    pub viewing_pub: Point,
    pub spending_pub: Point,
    pub label: Option<String>,
}

/// Generate a fresh viewing key bound to an existing `spendingPub` (spec
/// §4.6 "Generate"). Callers who need deterministic derivation must supply
/// their own RNG or derivation path; that's out of scope for this core.
pub fn generate(spending_pub: Point, label: Option<String>) -> Result<ViewingKeyMaterial> {
    let viewing_priv = Scalar::random()?;
    let viewing_pub = Point::mul_generator(&viewing_priv);
    Ok(ViewingKeyMaterial { viewing_priv, viewing_pub, spending_pub, label })
}

/// Wrap the public components of `material` into a portable export. Never
/// touches `material.viewing_priv`.
pub fn export(
    material: &ViewingKeyMaterial,
    chain_tag: impl Into<String>,
    network: impl Into<String>,
    created_at: u64,
    expires_at: Option<u64>,
) -> ViewingKeyExport {
    let chain_tag = chain_tag.into();
    let network = network.into();
    tracing::debug!(%chain_tag, %network, created_at, "viewing key exported");
    ViewingKeyExport {
        version: VIEWING_KEY_VERSION,
        chain_tag,
        network,
        viewing_pub: material.viewing_pub,
        spending_pub: material.spending_pub,
        label: material.label.clone(),
        created_at,
        expires_at,
    }
}

/// Import a viewing-key export from its raw parts, validating that both
/// embedded public keys decompress (spec §4.6 "Import"). An unrecognized
/// version byte is accepted rather than rejected, matching the metadata
/// sub-format's tolerance policy.
#[allow(clippy::too_many_arguments)]
pub fn import(
    version: u8,
    chain_tag: impl Into<String>,
    network: impl Into<String>,
    viewing_pub_bytes: &[u8; 33],
    spending_pub_bytes: &[u8; 33],
    label: Option<String>,
    created_at: u64,
    expires_at: Option<u64>,
) -> Result<ViewingKeyExport> {
    let chain_tag = chain_tag.into();
    let network = network.into();
    let viewing_pub = Point::decompress(viewing_pub_bytes).inspect_err(|err| {
        tracing::warn!(%chain_tag, %network, %err, "viewing key import failed: bad viewing_pub");
    })?;
    let spending_pub = Point::decompress(spending_pub_bytes).inspect_err(|err| {
        tracing::warn!(%chain_tag, %network, %err, "viewing key import failed: bad spending_pub");
    })?;
    tracing::debug!(%chain_tag, %network, created_at, "viewing key imported");
    Ok(ViewingKeyExport {
        version,
        chain_tag,
        network,
        viewing_pub,
        spending_pub,
        label,
        created_at,
        expires_at,
    })
}

/// `isExpired(export, now) = export.expiresAt != null && export.expiresAt < now`.
pub fn is_expired(export: &ViewingKeyExport, now: u64) -> bool {
    export.expires_at.map_or(false, |expires_at| expires_at < now)
}

/// `registryHash(viewingPub) = sha256(compress(viewingPub))`: a short,
/// deterministic index for a registry collaborator.
pub fn registry_hash(viewing_pub: &Point) -> [u8; 32] {
    sha256(&viewing_pub.compress())
}

/// Validate a block range: `from <= to`.
fn validate_block_range(range: &BlockRange) -> Result<()> {
    if range.from > range.to {
        return Err(Error::PermissionViolation {
            reason: format!("block range {}..{} has from > to", range.from, range.to),
        });
    }
    Ok(())
}

/// Attach permission scope to an export, validating the block range if
/// present.
pub fn scope(export: ViewingKeyExport, permissions: ViewingPermissions) -> Result<SharedViewingKey> {
    if let Some(range) = permissions.block_range {
        validate_block_range(&range)?;
    }
    Ok(SharedViewingKey { export, permissions })
}

/// Check that `shared` permits viewing an event at `block_number`, and
/// additionally that it permits viewing amounts if `wants_amounts` is set.
/// Returns `PermissionViolation` on any scope failure and `Expired` if the
/// underlying export has lapsed.
pub fn check_permission(
    shared: &SharedViewingKey,
    block_number: u64,
    wants_amounts: bool,
    now: u64,
) -> Result<()> {
    if is_expired(&shared.export, now) {
        return Err(Error::Expired {
            reason: format!("viewing key expired at {:?}, now is {now}", shared.export.expires_at),
        });
    }
    if let Some(range) = shared.permissions.block_range {
        if block_number < range.from || block_number > range.to {
            return Err(Error::PermissionViolation {
                reason: format!(
                    "block {block_number} outside permitted range {}..{}",
                    range.from, range.to
                ),
            });
        }
    }
    if wants_amounts && !shared.permissions.can_view_amounts {
        return Err(Error::PermissionViolation {
            reason: "viewing key does not grant canViewAmounts".to_string(),
        });
    }
    Ok(())
}

/// Derive a symmetric key for the channel to `viewing_pub` from an ECDH
/// shared point, the same shared-secret-hash pattern the stealth scheme
/// uses (spec §4.2 step 3) rather than a bespoke construction.
fn channel_key(shared_point: &Point) -> [u8; 32] {
    sha256(&shared_point.compress())
}

/// Encrypt `plaintext` for the holder of `viewing_pub`. Returns the
/// ciphertext/nonce payload plus the fresh ephemeral public key the
/// recipient needs to recompute the same shared secret.
pub fn encrypt_for_viewing_pub(
    viewing_pub: &Point,
    plaintext: &[u8],
) -> Result<(EncryptedPayload, Point)> {
    let ephemeral_priv = Scalar::random()?;
    let ephemeral_pub = Point::mul_generator(&ephemeral_priv);
    let shared_point = Point::mul(&ephemeral_priv, viewing_pub);
    let key = channel_key(&shared_point);

    let mut nonce_bytes = [0u8; 24];
    rand::thread_rng().fill_bytes(&mut nonce_bytes);
    let nonce = XNonce::from_slice(&nonce_bytes);

    let cipher = XChaCha20Poly1305::new_from_slice(&key)
        .map_err(|e| Error::Encryption { reason: e.to_string() })?;
    let ciphertext = cipher
        .encrypt(nonce, plaintext)
        .map_err(|e| Error::Encryption { reason: e.to_string() })?;

    Ok((EncryptedPayload { ciphertext, nonce: nonce_bytes }, ephemeral_pub))
}

/// Decrypt a payload produced by [`encrypt_for_viewing_pub`] using the
/// recipient's `viewingPriv` and the sender's published ephemeral key.
pub fn decrypt_with_viewing_priv(
    viewing_priv: &Scalar,
    ephemeral_pub: &Point,
    payload: &EncryptedPayload,
) -> Result<Vec<u8>> {
    let shared_point = Point::mul(viewing_priv, ephemeral_pub);
    let key = channel_key(&shared_point);

    let nonce = XNonce::from_slice(&payload.nonce);
    let cipher = XChaCha20Poly1305::new_from_slice(&key)
        .map_err(|e| Error::Decryption { reason: e.to_string() })?;
    cipher
        .decrypt(nonce, payload.ciphertext.as_slice())
        .map_err(|e| Error::Decryption { reason: e.to_string() })
}
