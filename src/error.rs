//! Error types for the stealth core.
//!
//! The nine variants through `UnsupportedScheme` are the tagged taxonomy of
//! spec §7; `Encryption`/`Decryption` are ambient additions for the
//! viewing-key metadata channel's encrypted transport, which the taxonomy
//! doesn't otherwise name.

use thiserror::Error;

/// Result type for stealth-core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Tagged error taxonomy. Every fallible operation in this crate returns one
/// of these, carrying the offending field and a human-readable reason. There
/// is no retry, no logging, and no silent coercion inside the core; callers
/// get the structured fault.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Byte-string is zero or >= the secp256k1 group order.
    #[error("invalid scalar in `{field}`: {reason}")]
    InvalidScalar { field: &'static str, reason: String },

    /// Compressed byte-string does not decode to a valid non-identity point.
    #[error("invalid point in `{field}`: {reason}")]
    InvalidPoint { field: &'static str, reason: String },

    /// Wrong prefix, wrong length, or non-hex characters in a meta-address.
    #[error("invalid stealth meta-address format: {reason}")]
    InvalidMetaAddressFormat { reason: String },

    /// Insufficient topics, malformed ABI offsets, wrong ephemeral-key
    /// length, or decompression failure while parsing an announcement.
    #[error("invalid announcement layout in `{field}`: {reason}")]
    InvalidAnnouncementLayout { field: &'static str, reason: String },

    /// Pedersen value is >= the group order.
    #[error("value out of range in `{field}`: {reason}")]
    ValueOutOfRange { field: &'static str, reason: String },

    /// A viewing-key permission check failed (e.g. block outside range).
    #[error("permission violation: {reason}")]
    PermissionViolation { reason: String },

    /// The viewing key is past its `expires_at`.
    #[error("viewing key expired: {reason}")]
    Expired { reason: String },

    /// The underlying RNG refused to produce randomness.
    #[error("RNG failure: {reason}")]
    RngFailure { reason: String },

    /// The announcement's `schemeId` is not recognized by this core.
    #[error("unsupported scheme id {scheme_id}")]
    UnsupportedScheme { scheme_id: u32 },

    /// The metadata symmetric-encryption channel failed to encrypt.
    #[error("encryption failed: {reason}")]
    Encryption { reason: String },

    /// The metadata symmetric-encryption channel failed to decrypt or
    /// authenticate (tampering, wrong key, or wrong nonce).
    #[error("decryption failed: {reason}")]
    Decryption { reason: String },
}

impl Error {
    pub(crate) fn invalid_scalar(field: &'static str, reason: impl Into<String>) -> Self {
        Error::InvalidScalar { field, reason: reason.into() }
    }

    pub(crate) fn invalid_point(field: &'static str, reason: impl Into<String>) -> Self {
        Error::InvalidPoint { field, reason: reason.into() }
    }

    pub(crate) fn invalid_layout(field: &'static str, reason: impl Into<String>) -> Self {
        Error::InvalidAnnouncementLayout { field, reason: reason.into() }
    }

    pub(crate) fn value_out_of_range(field: &'static str, reason: impl Into<String>) -> Self {
        Error::ValueOutOfRange { field, reason: reason.into() }
    }
}
