//! Protocol-fixed constants.
//!
//! The core is pure and stateless (no ambient state besides the RNG), so
//! there is no config-file or environment loader here — just the handful of
//! bit-exact constants the spec pins down.

/// EIP-5564 scheme identifier for the secp256k1 variant. No other scheme is
/// defined by this core.
pub const SCHEME_ID_SECP256K1: u32 = 1;

/// Version byte for the announcement metadata sub-format (§4.4/§6).
pub const METADATA_VERSION: u8 = 1;

/// 4-byte selector for `announce(uint256,address,bytes,bytes)`.
pub const ANNOUNCEMENT_SELECTOR: [u8; 4] = [0x3f, 0x62, 0xa9, 0xe6];

/// Canonical event signature hashed to produce `topics[0]`.
pub const ANNOUNCEMENT_EVENT_SIGNATURE: &str =
    "Announcement(uint256,address,address,bytes,bytes)";

/// Domain-separation tag for deriving the nothing-up-my-sleeve Pedersen
/// generator `H`. Bit-exact to spec §4.3 — changing this string changes `H`
/// and silently breaks interoperability with any other implementation of
/// this spec.
pub const PEDERSEN_H_DOMAIN_TAG: &str = "Pedersen secp256k1 second generator";

/// Text meta-address prefix (§6).
pub const META_ADDRESS_PREFIX: &str = "st:eth:0x";

/// Total length of an encoded meta-address, prefix included (§6).
pub const META_ADDRESS_LEN: usize = 141;

/// Number of hex digits following the prefix (132 = 2 * 33-byte compressed
/// keys, hex-encoded).
pub const META_ADDRESS_HEX_LEN: usize = 132;
