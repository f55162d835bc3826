//! On-chain announcement encoding (component C4): EVM log topics, the
//! offsets-then-data ABI body for `announce(uint256,address,bytes,bytes)`,
//! and the version-1 metadata sub-format.
//!
//! The view tag cannot live in `ephemeralPubKey`'s leading byte the way a
//! literal reading of the on-chain layout suggests — that byte is the SEC1
//! parity tag (`0x02`/`0x03`), not the 8-bit, near-uniform `h[0]` the scanner
//! pre-filter (§4.5) and the view-tag distribution property (§8) depend on.
//! This core instead carries the view tag as the leading byte of the
//! `metadata` wire field, ahead of the version-prefixed application payload;
//! see DESIGN.md for the full rationale.

use crate::config::{
    ANNOUNCEMENT_EVENT_SIGNATURE, ANNOUNCEMENT_SELECTOR, METADATA_VERSION, SCHEME_ID_SECP256K1,
};
use crate::curve::{keccak256, Point};
use crate::error::{Error, Result};
use crate::types::{Announcement, AnnouncementMetadata, TxRef};

/// A raw, unparsed EVM log record as returned by an external log source
/// (spec §6 "Log source" collaborator interface). The core only parses
/// records handed to it; it never fetches them.
#[derive(Debug, Clone)]
pub struct RawLogRecord {
    pub address: [u8; 20],
    pub topics: Vec<[u8; 32]>,
    pub data: Vec<u8>,
    pub block_number: u64,
    pub transaction_hash: [u8; 32],
    pub log_index: u64,
}

/// `keccak256("Announcement(uint256,address,address,bytes,bytes)")`,
/// `topics[0]` on every announcement log.
pub fn event_signature_hash() -> [u8; 32] {
    keccak256(ANNOUNCEMENT_EVENT_SIGNATURE.as_bytes())
}

fn word_from_u64(value: u64) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[24..].copy_from_slice(&value.to_be_bytes());
    word
}

fn word_from_address(address: &[u8; 20]) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[12..].copy_from_slice(address);
    word
}

fn address_from_word(word: &[u8; 32]) -> [u8; 20] {
    let mut out = [0u8; 20];
    out.copy_from_slice(&word[12..]);
    out
}

/// Interpret a topic word as a `schemeId`: reject anything outside `u32`
/// range (the high 28 bytes must be zero, not just the high 24 `word_to_usize`
/// checks), then reject any in-range value this core doesn't recognize.
fn scheme_id_from_word(word: &[u8; 32]) -> Result<u32> {
    if word[..28].iter().any(|&b| b != 0) {
        return Err(Error::invalid_layout("scheme_id", "value exceeds u32 range"));
    }
    let mut buf = [0u8; 4];
    buf.copy_from_slice(&word[28..]);
    let scheme_id = u32::from_be_bytes(buf);
    if scheme_id != SCHEME_ID_SECP256K1 {
        return Err(Error::UnsupportedScheme { scheme_id });
    }
    Ok(scheme_id)
}

/// Interpret a 32-byte big-endian word as a `usize` offset or length.
/// Anything that would not fit is treated as malformed input rather than
/// silently truncated.
fn word_to_usize(word: &[u8; 32]) -> Result<usize> {
    if word[..24].iter().any(|&b| b != 0) {
        return Err(Error::invalid_layout("abi_word", "value exceeds usize range"));
    }
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&word[24..]);
    Ok(u64::from_be_bytes(buf) as usize)
}

fn pad32(data: &[u8]) -> Vec<u8> {
    let mut out = data.to_vec();
    let remainder = out.len() % 32;
    if remainder != 0 {
        out.extend(std::iter::repeat(0u8).take(32 - remainder));
    }
    out
}

/// Encode a single dynamic `bytes` region: 32-byte length, then the data
/// right-padded to a multiple of 32 bytes.
fn encode_dynamic_bytes(data: &[u8]) -> Vec<u8> {
    let mut out = word_from_u64(data.len() as u64).to_vec();
    out.extend(pad32(data));
    out
}

/// Build the calldata for the announcer contract: selector, then the
/// four-parameter ABI body with `ephemeralPubKey`/`metadataWire` packed as
/// the standard offsets-then-data layout for `(bytes,bytes)`.
///
/// `metadata_wire` is the already-assembled metadata wire field — view tag
/// byte followed by the application payload from [`encode_metadata`] (or
/// empty for no application metadata).
pub fn encode_announcement_calldata(
    scheme_id: u32,
    stealth_eth_address: &[u8; 20],
    ephemeral_pub_key: &[u8; 33],
    metadata_wire: &[u8],
) -> Vec<u8> {
    let head_words = 4u64; // schemeId, stealthEthAddress, offset1, offset2
    let offset_eph = head_words * 32;
    let eph_region = encode_dynamic_bytes(ephemeral_pub_key);
    let offset_meta = offset_eph + eph_region.len() as u64;

    let mut out = Vec::with_capacity(4 + 128 + eph_region.len() + 32 + metadata_wire.len());
    out.extend_from_slice(&ANNOUNCEMENT_SELECTOR);
    out.extend_from_slice(&word_from_u64(scheme_id as u64));
    out.extend_from_slice(&word_from_address(stealth_eth_address));
    out.extend_from_slice(&word_from_u64(offset_eph));
    out.extend_from_slice(&word_from_u64(offset_meta));
    out.extend(eph_region);
    out.extend(encode_dynamic_bytes(metadata_wire));
    out
}

/// Build a viewing-key-free convenience wrapper over
/// [`encode_announcement_calldata`]: assemble `metadataWire` from a view tag
/// and an already-encoded application metadata payload.
pub fn build_announcement_calldata(
    scheme_id: u32,
    stealth_eth_address: &[u8; 20],
    ephemeral_pub_key: &[u8; 33],
    view_tag: u8,
    application_metadata: &[u8],
) -> Vec<u8> {
    let mut wire = Vec::with_capacity(1 + application_metadata.len());
    wire.push(view_tag);
    wire.extend_from_slice(application_metadata);
    encode_announcement_calldata(scheme_id, stealth_eth_address, ephemeral_pub_key, &wire)
}

/// Decode one ABI-encoded dynamic `bytes` region given its byte offset into
/// `data` (the offset is relative to the start of the non-indexed payload,
/// per the standard EVM ABI convention).
fn decode_dynamic_bytes(data: &[u8], offset: usize) -> Result<Vec<u8>> {
    let length_word: &[u8; 32] = data
        .get(offset..offset + 32)
        .ok_or_else(|| Error::invalid_layout("abi_data", "offset points past end of data"))?
        .try_into()
        .unwrap();
    let length = word_to_usize(length_word)?;
    let start = offset + 32;
    let end = start
        .checked_add(length)
        .ok_or_else(|| Error::invalid_layout("abi_data", "length overflows"))?;
    data.get(start..end)
        .map(|s| s.to_vec())
        .ok_or_else(|| Error::invalid_layout("abi_data", "declared length exceeds available data"))
}

/// Parse a raw log record into an [`Announcement`].
///
/// Validates at least four topics (signature hash plus three indexed
/// slots), decodes the two dynamic `bytes` regions, validates that
/// `ephemeralPubKey` is exactly 33 bytes and decompressible, and splits the
/// metadata wire field into the view tag and the application payload.
pub fn parse_announcement(record: &RawLogRecord) -> Result<Announcement> {
    if record.topics.len() < 4 {
        return Err(Error::invalid_layout("topics", "expected at least 4 topics"));
    }

    let scheme_id = scheme_id_from_word(&record.topics[1])?;
    let stealth_eth_address = address_from_word(&record.topics[2]);
    let caller = address_from_word(&record.topics[3]);

    if record.data.len() < 64 {
        return Err(Error::invalid_layout("data", "data region shorter than two ABI offsets"));
    }
    let offset_eph = word_to_usize(record.data[0..32].try_into().unwrap())?;
    let offset_meta = word_to_usize(record.data[32..64].try_into().unwrap())?;

    let ephemeral_pub_key = decode_dynamic_bytes(&record.data, offset_eph)?;
    if ephemeral_pub_key.len() != 33 {
        return Err(Error::invalid_layout(
            "ephemeral_pub_key",
            format!("expected 33 bytes, got {}", ephemeral_pub_key.len()),
        ));
    }
    let eph_bytes: [u8; 33] = ephemeral_pub_key.try_into().unwrap();
    let ephemeral_pub = Point::decompress(&eph_bytes)?;

    let metadata_wire = decode_dynamic_bytes(&record.data, offset_meta)?;
    let (view_tag, metadata) = match metadata_wire.split_first() {
        Some((tag, rest)) => (*tag, rest.to_vec()),
        None => (0u8, Vec::new()),
    };

    Ok(Announcement {
        scheme_id,
        stealth_eth_address,
        caller,
        ephemeral_pub,
        view_tag,
        metadata,
        tx_ref: TxRef {
            tx_hash: record.transaction_hash,
            block_number: record.block_number,
            log_index: record.log_index,
        },
    })
}

/// Encode the version-1 application metadata sub-format: version byte,
/// then token address, compressed commitment, blinding hash, and any
/// remaining extra data, each present only if the preceding fields are.
pub fn encode_metadata(fields: &AnnouncementMetadata) -> Vec<u8> {
    let mut out = vec![fields.version];

    let Some(token_address) = fields.token_address else {
        return out;
    };
    out.extend_from_slice(&token_address);

    let Some(amount_commitment) = &fields.amount_commitment else {
        return out;
    };
    out.extend_from_slice(&amount_commitment.compress());

    let Some(blinding_hash) = fields.blinding_hash else {
        return out;
    };
    out.extend_from_slice(&blinding_hash);

    if let Some(extra) = &fields.extra_data {
        out.extend_from_slice(extra);
    }
    out
}

/// Parse the version-1 application metadata sub-format. An empty slice
/// parses to the default (zero value, all fields unset). Shorter-than-full
/// payloads leave trailing fields unset rather than erroring; an unknown
/// version byte is accepted with only `version` populated.
pub fn parse_metadata(bytes: &[u8]) -> Result<AnnouncementMetadata> {
    let Some((&version, rest)) = bytes.split_first() else {
        return Ok(AnnouncementMetadata::default());
    };

    let mut fields = AnnouncementMetadata { version, ..Default::default() };
    if version != METADATA_VERSION {
        return Ok(fields);
    }

    if rest.len() < 20 {
        return Ok(fields);
    }
    let token_address: [u8; 20] = rest[..20].try_into().unwrap();
    fields.token_address = Some(token_address);

    let rest = &rest[20..];
    if rest.len() < 33 {
        return Ok(fields);
    }
    let commitment_bytes: [u8; 33] = rest[..33].try_into().unwrap();
    fields.amount_commitment = Some(Point::decompress(&commitment_bytes)?);

    let rest = &rest[33..];
    if rest.len() < 32 {
        return Ok(fields);
    }
    let blinding_hash: [u8; 32] = rest[..32].try_into().unwrap();
    fields.blinding_hash = Some(blinding_hash);

    let rest = &rest[32..];
    if !rest.is_empty() {
        fields.extra_data = Some(rest.to_vec());
    }

    Ok(fields)
}

/// Build the indexed-topic filter for a receiver-side log query:
/// `[eventSignatureHash, ?schemeId, ?stealthEthAddress, ?caller]` with
/// `None` for unfiltered slots.
pub fn build_topic_filter(
    scheme_id: Option<u32>,
    stealth_eth_address: Option<[u8; 20]>,
    caller: Option<[u8; 20]>,
) -> Vec<Option<[u8; 32]>> {
    vec![
        Some(event_signature_hash()),
        scheme_id.map(|s| word_from_u64(s as u64)),
        stealth_eth_address.map(|a| word_from_address(&a)),
        caller.map(|a| word_from_address(&a)),
    ]
}

/// Record-level filtering helpers (§4.4 "Filtering helpers").
pub fn filter_by_scheme(announcements: &[Announcement], scheme_id: u32) -> Vec<&Announcement> {
    announcements.iter().filter(|a| a.scheme_id == scheme_id).collect()
}

pub fn filter_by_view_tag(announcements: &[Announcement], view_tag: u8) -> Vec<&Announcement> {
    announcements.iter().filter(|a| a.view_tag == view_tag).collect()
}

pub fn filter_by_block_range(
    announcements: &[Announcement],
    from: u64,
    to: u64,
) -> Vec<&Announcement> {
    announcements
        .iter()
        .filter(|a| a.tx_ref.block_number >= from && a.tx_ref.block_number <= to)
        .collect()
}

/// Filters by token address, decoding each announcement's metadata on the
/// fly. Announcements whose metadata doesn't parse or carry a token address
/// are excluded rather than causing the whole filter to fail.
pub fn filter_by_token_address<'a>(
    announcements: &'a [Announcement],
    token_address: [u8; 20],
) -> Vec<&'a Announcement> {
    announcements
        .iter()
        .filter(|a| {
            parse_metadata(&a.metadata)
                .ok()
                .and_then(|m| m.token_address)
                .map(|t| t == token_address)
                .unwrap_or(false)
        })
        .collect()
}
