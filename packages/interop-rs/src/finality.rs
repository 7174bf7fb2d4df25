//! Finality waiter
//!
//! Blocks until a source block is covered by the chain's finalized pointer.
//! Proofs for non-finalized blocks are not guaranteed stable, so this must
//! complete before the proof is requested.

use tracing::{debug, info};

use crate::endpoint::ChainEndpoint;
use crate::error::RelayError;
use crate::polling::{poll_until, PollError, PollPolicy};

/// Wait until `block_number` is finalized on `endpoint`.
///
/// A failed read of the finalized pointer counts as height 0 and is retried.
/// The deadline is local to this call.
pub async fn await_finality<E>(
    endpoint: &E,
    block_number: u64,
    policy: &PollPolicy,
) -> Result<(), RelayError>
where
    E: ChainEndpoint + ?Sized,
{
    let finalized = poll_until("block finality", policy, move || async move {
        let finalized = endpoint
            .finalized_block_number()
            .await
            .unwrap_or_else(|e| {
                debug!(error = %e, "Failed to read finalized block, treating as 0");
                0
            });
        Ok::<_, PollError>((finalized >= block_number).then_some(finalized))
    })
    .await?;

    info!(
        chain_id = endpoint.chain_id(),
        block_number,
        finalized,
        "Block finalized"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockEndpoint;
    use std::time::Duration;

    fn policy() -> PollPolicy {
        PollPolicy::new(Duration::from_secs(1), Duration::from_secs(10)).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_waits_until_height_reached() {
        let endpoint = MockEndpoint::new(1);
        endpoint.script_finalized([Ok(5), Ok(8), Ok(12)]);

        await_finality(&endpoint, 10, &policy()).await.unwrap();
        assert_eq!(endpoint.calls().finalized, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_read_failures_are_not_fatal() {
        let endpoint = MockEndpoint::new(1);
        endpoint.script_finalized([Err("connection reset"), Err("timeout"), Ok(10)]);

        await_finality(&endpoint, 10, &policy()).await.unwrap();
        assert_eq!(endpoint.calls().finalized, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_times_out_when_never_finalized() {
        let endpoint = MockEndpoint::new(1);
        endpoint.script_finalized([Ok(3)]);

        let err = await_finality(&endpoint, 10, &policy()).await.unwrap_err();
        match err {
            RelayError::Timeout { operation, .. } => assert_eq!(operation, "block finality"),
            other => panic!("expected timeout, got {:?}", other),
        }
        assert_eq!(endpoint.calls().finalized, policy().max_attempts() as usize);
    }
}
