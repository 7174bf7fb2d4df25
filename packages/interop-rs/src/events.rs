//! Source-chain event parsing
//!
//! Extracts the `InteropBundleSent` emission from a mined send receipt. The
//! destination verifies bytes re-derived from this event, never bytes supplied
//! by the caller.

use alloy::primitives::{Address, Log, B256};
use alloy::sol_types::SolEvent;
use tracing::warn;

use crate::bundle::MessageBundle;
use crate::contracts::InteropCenter::InteropBundleSent;
use crate::error::RelayError;

/// Parsed `InteropBundleSent` event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleSentEvent {
    /// Messenger hash of the bundle's L2→L1 message
    pub message_hash: B256,
    /// Bundle hash assigned by the interop center
    pub bundle_hash: B256,
    /// The bundle exactly as committed
    pub bundle: MessageBundle,
}

/// Find and decode the `InteropBundleSent` event emitted by `interop_center`.
///
/// Missing event is a [`RelayError::MissingArtifact`]; a present but
/// undecodable event is a codec error.
pub fn find_bundle_sent(logs: &[Log], interop_center: Address) -> Result<BundleSentEvent, RelayError> {
    let log = logs
        .iter()
        .find(|log| {
            log.address == interop_center
                && log.data.topics().first() == Some(&InteropBundleSent::SIGNATURE_HASH)
        })
        .ok_or_else(|| {
            warn!(
                interop_center = %interop_center,
                log_count = logs.len(),
                "No InteropBundleSent event in send receipt"
            );
            RelayError::MissingArtifact(format!(
                "InteropBundleSent event from {} not found in {} receipt logs",
                interop_center,
                logs.len()
            ))
        })?;

    let event = InteropBundleSent::decode_log_data(&log.data, true)?;

    Ok(BundleSentEvent {
        message_hash: event.l2l1MsgHash,
        bundle_hash: event.interopBundleHash,
        bundle: MessageBundle::try_from(event.interopBundle)?,
    })
}
