//! Interop root availability waiter
//!
//! Waits for the destination chain's mirror of the source chain's batch root
//! to be written, and checks it against the root the proof resolves to.
//!
//! A mirrored root never changes once non-zero, so a non-zero value that
//! differs from the expected root is reported immediately as a mismatch and
//! never retried: it means the proof data is wrong or the destination saw a
//! different source history.

use alloy::primitives::B256;
use tracing::{info, warn};

use crate::endpoint::ChainEndpoint;
use crate::error::RelayError;
use crate::hash::bytes32_to_hex;
use crate::polling::{poll_until, PollError, PollPolicy};

/// Wait until `destination` stores `expected_root` for
/// `(source_chain_id, batch_number)`.
///
/// - zero root: not yet written, retried
/// - expected root: success
/// - any other root: [`RelayError::RootMismatch`] after that single read
///
/// Timing out without ever seeing a non-zero root yields
/// [`RelayError::RootUnavailable`]. The deadline is local to this call.
pub async fn await_root<E>(
    destination: &E,
    source_chain_id: u64,
    batch_number: u64,
    expected_root: B256,
    policy: &PollPolicy,
) -> Result<(), RelayError>
where
    E: ChainEndpoint + ?Sized,
{
    let result = poll_until("interop root", policy, move || async move {
        let observed = destination
            .interop_root(source_chain_id, batch_number)
            .await?;

        if observed.is_zero() {
            return Ok(None);
        }
        if observed != expected_root {
            warn!(
                chain_id = source_chain_id,
                batch_number,
                expected = %bytes32_to_hex(&expected_root.0),
                observed = %bytes32_to_hex(&observed.0),
                "Interop root mismatch on destination"
            );
            return Err(PollError::Fatal(RelayError::RootMismatch {
                chain_id: source_chain_id,
                batch_number,
                expected: expected_root,
                observed,
            }));
        }
        Ok(Some(()))
    })
    .await;

    match result {
        Ok(()) => {
            info!(
                destination_chain_id = destination.chain_id(),
                chain_id = source_chain_id,
                batch_number,
                root = %bytes32_to_hex(&expected_root.0),
                "Interop root available on destination"
            );
            Ok(())
        }
        Err(RelayError::Timeout { elapsed, .. }) => Err(RelayError::RootUnavailable {
            chain_id: source_chain_id,
            batch_number,
            elapsed,
        }),
        Err(e) => Err(e),
    }
}
