//! # stealth-core
//!
//! EIP-5564-compatible stealth addresses, Pedersen commitments, and viewing
//! keys for secp256k1 chains: one-time unlinkable recipient addresses,
//! view-tag-accelerated scanning, amount-hiding commitments with homomorphic
//! aggregation, and on-chain announcement encode/decode. Chain RPC, gas
//! estimation, and wallet transport are deliberately not this crate's job —
//! it builds and parses the logical records a host SDK plugs into those.
//!
//! ## Quick start
//!
//! ```rust
//! use stealth_core::{
//!     stealth::{generate_meta_address, generate_stealth_address, check_ownership},
//!     commitment::commit,
//! };
//!
//! // Recipient generates a meta-address and shares its encoded form.
//! let (meta, secrets) = generate_meta_address("ethereum").unwrap();
//!
//! // Sender derives a one-time stealth address for that recipient.
//! let stealth = generate_stealth_address(&meta).unwrap();
//! assert!(check_ownership(&stealth, &secrets.spending_priv, &secrets.viewing_priv).unwrap());
//!
//! // Sender commits to an amount without revealing it on-chain.
//! let commitment = commit(100).unwrap();
//! ```

pub mod announcement;
pub mod commitment;
pub mod config;
pub mod curve;
pub mod error;
pub mod scanner;
pub mod stealth;
pub mod types;
pub mod viewing_key;

pub use announcement::{
    build_announcement_calldata, build_topic_filter, encode_announcement_calldata,
    encode_metadata, event_signature_hash, parse_announcement, parse_metadata, RawLogRecord,
};
pub use commitment::{
    add_blindings, add_commitments, commit, generate_blinding, get_generator_h,
    subtract_blindings, subtract_commitments, verify_opening,
};
pub use curve::{eip55_checksum, eth_address_from_point, keccak256, sha256, Point, Scalar};
pub use error::{Error, Result};
pub use scanner::{scan_all, CancellationToken, NeverCancel};
#[cfg(feature = "parallel")]
pub use scanner::par_scan_all;
pub use stealth::{
    check_ownership, check_ownership_by_address, decode_meta_address, encode_meta_address,
    generate_meta_address, generate_stealth_address, recover_spending_key,
};
pub use types::{
    Announcement, AnnouncementMetadata, BlockRange, DetectedPayment, EncryptedPayload,
    MetaAddress, PedersenCommitment, ScanRecipient, SharedViewingKey, StealthAddress,
    StealthMetaSecrets, TxRef, ViewingKeyExport, ViewingPermissions,
};
pub use viewing_key::{is_expired, registry_hash};

/// Crate version, re-exported for host SDKs that want to pin compatibility.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
