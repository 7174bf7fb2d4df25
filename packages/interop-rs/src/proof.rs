//! Log proof fetcher
//!
//! Waits for the source chain to produce an inclusion proof for one outbound
//! log. Only existence is checked here; the proof's root is validated later
//! against the destination's interop root.

use alloy::primitives::B256;
use tracing::info;

use crate::endpoint::ChainEndpoint;
use crate::error::RelayError;
use crate::polling::{poll_until, PollError, PollPolicy};
use crate::types::LogProof;

/// Wait for the proof of outbound log `log_index` of `tx_hash`.
///
/// Absence and endpoint errors are retried until the policy times out. The
/// deadline is local to this call.
pub async fn await_proof<E>(
    endpoint: &E,
    tx_hash: B256,
    log_index: u64,
    policy: &PollPolicy,
) -> Result<LogProof, RelayError>
where
    E: ChainEndpoint + ?Sized,
{
    let proof = poll_until("log proof", policy, move || async move {
        let proof = endpoint.log_proof(tx_hash, log_index).await?;
        Ok::<_, PollError>(proof)
    })
    .await?;

    info!(
        tx_hash = %tx_hash,
        log_index,
        batch_number = proof.batch_number,
        message_index = proof.id,
        root = %proof.root,
        path_len = proof.proof.len(),
        "Log proof obtained"
    );
    Ok(proof)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockEndpoint;
    use std::time::Duration;

    fn policy() -> PollPolicy {
        PollPolicy::new(Duration::from_millis(500), Duration::from_secs(5)).unwrap()
    }

    fn sample_proof() -> LogProof {
        LogProof {
            batch_number: 7,
            id: 0,
            root: B256::repeat_byte(0x71),
            proof: vec![B256::repeat_byte(1), B256::repeat_byte(2)],
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_returns_proof_once_produced() {
        let endpoint = MockEndpoint::new(1);
        endpoint.script_proofs([Ok(None), Err("rate limited"), Ok(Some(sample_proof()))]);

        let proof = await_proof(&endpoint, B256::repeat_byte(0xaa), 0, &policy())
            .await
            .unwrap();
        assert_eq!(proof, sample_proof());
        assert_eq!(endpoint.calls().proofs, 3);
        assert_eq!(
            endpoint.last_proof_request(),
            Some((B256::repeat_byte(0xaa), 0))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_times_out_without_proof() {
        let endpoint = MockEndpoint::new(1);
        endpoint.script_proofs([Ok(None)]);

        let err = await_proof(&endpoint, B256::ZERO, 0, &policy())
            .await
            .unwrap_err();
        assert!(matches!(err, RelayError::Timeout { .. }));
    }
}
