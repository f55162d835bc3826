//! Data model shared across components (spec §3).

use crate::curve::{Point, Scalar};

/// A long-lived, publicly shareable stealth meta-address: two independent
/// public keys plus chain/label context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaAddress {
    pub spending_pub: Point,
    pub viewing_pub: Point,
    pub chain_tag: String,
    pub label: Option<String>,
}

impl MetaAddress {
    pub fn new(spending_pub: Point, viewing_pub: Point, chain_tag: impl Into<String>) -> Self {
        Self { spending_pub, viewing_pub, chain_tag: chain_tag.into(), label: None }
    }

    pub fn with_label(
        spending_pub: Point,
        viewing_pub: Point,
        chain_tag: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        Self {
            spending_pub,
            viewing_pub,
            chain_tag: chain_tag.into(),
            label: Some(label.into()),
        }
    }
}

/// Recipient-only secrets behind a [`MetaAddress`]. Lives only in the
/// creating process.
pub struct StealthMetaSecrets {
    pub spending_priv: Scalar,
    pub viewing_priv: Scalar,
}

/// A one-time stealth address derived from a meta-address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StealthAddress {
    pub stealth_pub: Point,
    pub ephemeral_pub: Point,
    pub view_tag: u8,
}

/// A Pedersen commitment and the blinding factor that opens it. Only ever
/// hand the `commitment` field to a counterparty; `blinding` is secret.
pub struct PedersenCommitment {
    pub commitment: Point,
    pub blinding: Scalar,
}

/// A reference to the on-chain transaction a parsed announcement came from.
/// `(tx_hash, log_index)` is unique.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxRef {
    pub tx_hash: [u8; 32],
    pub block_number: u64,
    pub log_index: u64,
}

/// The on-chain announcement record (spec §3, §4.4).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Announcement {
    pub scheme_id: u32,
    pub stealth_eth_address: [u8; 20],
    pub caller: [u8; 20],
    pub ephemeral_pub: Point,
    pub view_tag: u8,
    pub metadata: Vec<u8>,
    pub tx_ref: TxRef,
}

/// Parsed version-1 metadata sub-format (spec §4.4, §6). Fields are
/// present-or-absent by payload length, not by tags; an unrecognized
/// version byte is accepted with only `version` populated.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AnnouncementMetadata {
    pub version: u8,
    pub token_address: Option<[u8; 20]>,
    pub amount_commitment: Option<Point>,
    pub blinding_hash: Option<[u8; 32]>,
    pub extra_data: Option<Vec<u8>>,
}

/// A detected incoming payment, as produced by the scanner (component C5).
/// `recovered_spending_key` is the one-time private key for `stealth_pub`;
/// the caller is responsible for wiping it after use (spec §4.2).
pub struct DetectedPayment {
    pub announcement: Announcement,
    pub recipient_label: Option<String>,
    pub recovered_spending_key: Scalar,
}

/// A registered scanning recipient: the secrets and context the scanner
/// needs to detect and label payments for one recipient. Per spec §4.5/§9,
/// the scanner's cheap pre-filter only needs `viewing_priv`; the full
/// ownership check additionally needs `spending_priv`.
pub struct ScanRecipient {
    pub viewing_priv: Scalar,
    pub spending_priv: Scalar,
    pub label: Option<String>,
}

/// A portable, publishable export of a viewing capability. Never carries a
/// private scalar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewingKeyExport {
    pub version: u8,
    pub chain_tag: String,
    pub network: String,
    pub viewing_pub: Point,
    pub spending_pub: Point,
    pub label: Option<String>,
    pub created_at: u64,
    pub expires_at: Option<u64>,
}

/// Scanning is restricted to `[from, to]` inclusive when present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockRange {
    pub from: u64,
    pub to: u64,
}

/// Permission scoping for a shared viewing key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewingPermissions {
    pub can_view_incoming: bool,
    pub can_view_outgoing: bool,
    pub can_view_amounts: bool,
    pub block_range: Option<BlockRange>,
}

/// A viewing-key export plus the scope it was shared under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharedViewingKey {
    pub export: ViewingKeyExport,
    pub permissions: ViewingPermissions,
}

/// Encrypted payload (ciphertext + nonce) for the metadata/viewing-key
/// encrypted channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedPayload {
    pub ciphertext: Vec<u8>,
    pub nonce: [u8; 24],
}
