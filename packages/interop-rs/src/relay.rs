//! Relay orchestrator
//!
//! Drives one bundle from the source chain to the destination chain:
//!
//! ```text
//! Idle → Sent → Finalized → ProofObtained → RootVerified → Executed
//!   └──────────────── any fatal error ────────────────────→ Failed
//! ```
//!
//! Steps run strictly in order; each depends on the previous step's output.
//! There is no partial resume: a failed relay is re-run from `Idle`, and
//! `sendBundle` is the only non-idempotent effect, submitted once per run.

use alloy::primitives::{Address, Bytes, B256, U256};
use std::fmt;
use tracing::{error, info};

use crate::contracts::{L2Message, MessageInclusionProof};
use crate::endpoint::{ChainEndpoint, OutboundMessage};
use crate::error::RelayError;
use crate::events::{find_bundle_sent, BundleSentEvent};
use crate::finality::await_finality;
use crate::polling::{poll_until, PollError, PollPolicy};
use crate::proof::await_proof;
use crate::root::await_root;
use crate::types::{LogProof, MessageReceipt, OutboundLog};

/// Which destination entrypoint completes the relay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionMode {
    /// `proveL2MessageInclusionShared` (read-only)
    #[default]
    Verify,
    /// `executeBundle` (transaction)
    Execute,
}

impl std::str::FromStr for ExecutionMode {
    type Err = RelayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "verify" => Ok(ExecutionMode::Verify),
            "execute" => Ok(ExecutionMode::Execute),
            other => Err(RelayError::Config(format!(
                "Invalid execution mode '{}', expected 'verify' or 'execute'",
                other
            ))),
        }
    }
}

/// Relay progress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayState {
    Idle,
    Sent,
    Finalized,
    ProofObtained,
    RootVerified,
    Executed,
    Failed,
}

impl fmt::Display for RelayState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RelayState::Idle => "idle",
            RelayState::Sent => "sent",
            RelayState::Finalized => "finalized",
            RelayState::ProofObtained => "proof_obtained",
            RelayState::RootVerified => "root_verified",
            RelayState::Executed => "executed",
            RelayState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Per-step policies and destination mode
#[derive(Debug, Clone, Default)]
pub struct RelayConfig {
    pub finality_policy: PollPolicy,
    pub proof_policy: PollPolicy,
    pub root_policy: PollPolicy,
    /// Index of the bundle's outbound log within the send transaction
    pub outbound_log_index: u64,
    pub mode: ExecutionMode,
}

/// How the destination accepted the proof
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DestinationResult {
    /// Read-only verification returned `true`
    Included,
    /// `executeBundle` was mined successfully
    Executed { tx_hash: B256 },
}

/// Summary of a completed relay
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayOutcome {
    pub source_tx_hash: B256,
    pub bundle_hash: B256,
    pub batch_number: u64,
    pub message_index: u64,
    pub root: B256,
    pub result: DestinationResult,
}

/// Runs a relay between two endpoints
pub struct RelayOrchestrator<S, D> {
    source: S,
    destination: D,
    config: RelayConfig,
    history: Vec<RelayState>,
}

impl<S, D> RelayOrchestrator<S, D>
where
    S: ChainEndpoint,
    D: ChainEndpoint,
{
    /// Create an orchestrator in the `Idle` state
    pub fn new(source: S, destination: D, config: RelayConfig) -> Self {
        Self {
            source,
            destination,
            config,
            history: vec![RelayState::Idle],
        }
    }

    /// Current state
    pub fn state(&self) -> RelayState {
        self.history.last().copied().unwrap_or(RelayState::Idle)
    }

    /// Every state visited so far, oldest first
    pub fn history(&self) -> &[RelayState] {
        &self.history
    }

    /// Relay `message` end to end.
    ///
    /// Any error moves the orchestrator to `Failed` and is returned as-is.
    /// Each wait step honours only its own policy's deadline.
    pub async fn run(&mut self, message: &OutboundMessage) -> Result<RelayOutcome, RelayError> {
        if self.state() != RelayState::Idle {
            self.history = vec![RelayState::Idle];
        }

        match self.drive(message).await {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                let failed_in = self.state();
                self.transition(RelayState::Failed);
                error!(
                    state = %failed_in,
                    kind = ?e.kind(),
                    error = %e,
                    "Relay failed"
                );
                Err(e)
            }
        }
    }

    async fn drive(&mut self, message: &OutboundMessage) -> Result<RelayOutcome, RelayError> {
        // Idle → Sent
        let (receipt, event) = self.send(message).await?;
        self.transition(RelayState::Sent);

        // Sent → Finalized
        await_finality(
            &self.source,
            receipt.block_number,
            &self.config.finality_policy,
        )
        .await?;
        self.transition(RelayState::Finalized);

        // Finalized → ProofObtained
        let proof = await_proof(
            &self.source,
            receipt.tx_hash,
            self.config.outbound_log_index,
            &self.config.proof_policy,
        )
        .await?;
        let message_proof = self.inclusion_proof(&receipt, &event, &proof).await?;
        self.transition(RelayState::ProofObtained);

        // ProofObtained → RootVerified
        await_root(
            &self.destination,
            self.source.chain_id(),
            proof.batch_number,
            proof.root,
            &self.config.root_policy,
        )
        .await?;
        self.transition(RelayState::RootVerified);

        // RootVerified → Executed
        let result = self.deliver(&event, &proof, &message_proof).await?;
        self.transition(RelayState::Executed);

        let outcome = RelayOutcome {
            source_tx_hash: receipt.tx_hash,
            bundle_hash: event.bundle_hash,
            batch_number: proof.batch_number,
            message_index: proof.id,
            root: proof.root,
            result,
        };
        info!(
            source_tx = %outcome.source_tx_hash,
            bundle_hash = %outcome.bundle_hash,
            batch_number = outcome.batch_number,
            message_index = outcome.message_index,
            result = ?outcome.result,
            "Relay complete"
        );
        Ok(outcome)
    }

    /// Submit the bundle and bind the receipt's event to the destination
    async fn send(
        &self,
        message: &OutboundMessage,
    ) -> Result<(MessageReceipt, BundleSentEvent), RelayError> {
        info!(
            source_chain_id = self.source.chain_id(),
            destination_chain_id = message.destination_chain_id,
            calls = message.calls.len(),
            "Sending interop bundle"
        );

        let receipt = self
            .source
            .send_bundle(message)
            .await
            .map_err(|e| RelayError::endpoint("send bundle", e))?;
        if !receipt.status {
            return Err(RelayError::TransactionReverted {
                tx_hash: receipt.tx_hash,
            });
        }

        let event = find_bundle_sent(&receipt.logs, self.source.interop_center())?;

        let expected_source = U256::from(self.source.chain_id());
        if event.bundle.source_chain_id != expected_source {
            return Err(RelayError::IntegrityMismatch {
                what: "bundle source chain".to_string(),
                expected: expected_source.to_string(),
                observed: event.bundle.source_chain_id.to_string(),
            });
        }

        let expected_destination = U256::from(self.destination.chain_id());
        if event.bundle.destination_chain_id != expected_destination {
            return Err(RelayError::IntegrityMismatch {
                what: "bundle destination chain".to_string(),
                expected: expected_destination.to_string(),
                observed: event.bundle.destination_chain_id.to_string(),
            });
        }

        let rederived = event.bundle.message_hash();
        if rederived != event.message_hash {
            return Err(RelayError::IntegrityMismatch {
                what: "bundle message hash".to_string(),
                expected: event.message_hash.to_string(),
                observed: rederived.to_string(),
            });
        }

        info!(
            tx_hash = %receipt.tx_hash,
            block_number = receipt.block_number,
            bundle_hash = %event.bundle_hash,
            "Bundle sent"
        );
        Ok((receipt, event))
    }

    /// Build the proof record for the bundle's outbound log.
    ///
    /// Batch placement is only known once the batch is sealed, so the receipt
    /// is re-read here rather than taken from the send step. The read is
    /// polled under the proof policy: a missing receipt or a failed read is
    /// retried, never a reason to abort after the bundle was sent.
    async fn inclusion_proof(
        &self,
        sent: &MessageReceipt,
        event: &BundleSentEvent,
        proof: &LogProof,
    ) -> Result<MessageInclusionProof, RelayError> {
        let source = &self.source;
        let tx_hash = sent.tx_hash;
        let receipt = poll_until(
            "sealed receipt",
            &self.config.proof_policy,
            move || async move {
                let receipt = source.transaction_receipt(tx_hash).await?;
                Ok::<_, PollError>(receipt)
            },
        )
        .await?;

        let outbound = select_outbound_log(&receipt, self.config.outbound_log_index)?;

        let sender = outbound.message_sender();
        let interop_center = self.source.interop_center();
        if sender != interop_center {
            return Err(RelayError::MissingArtifact(format!(
                "outbound log {} was sent by {}, not the interop center {}",
                self.config.outbound_log_index, sender, interop_center
            )));
        }
        if outbound.value != event.message_hash {
            return Err(RelayError::IntegrityMismatch {
                what: "outbound log message hash".to_string(),
                expected: event.message_hash.to_string(),
                observed: outbound.value.to_string(),
            });
        }

        let tx_number = outbound
            .tx_index_in_l1_batch
            .or(receipt.l1_batch_tx_index)
            .ok_or_else(|| {
                RelayError::MissingArtifact(format!(
                    "batch transaction index missing for {}",
                    receipt.tx_hash
                ))
            })?;
        let tx_number_in_batch = u16::try_from(tx_number).map_err(|_| {
            RelayError::MissingArtifact(format!(
                "batch transaction index {} exceeds uint16",
                tx_number
            ))
        })?;

        Ok(build_inclusion_proof(
            self.source.chain_id(),
            proof,
            tx_number_in_batch,
            sender,
            event.bundle.l2_message_data(),
        ))
    }

    /// Hand the proof to the destination and interpret the result
    async fn deliver(
        &self,
        event: &BundleSentEvent,
        proof: &LogProof,
        message_proof: &MessageInclusionProof,
    ) -> Result<DestinationResult, RelayError> {
        match self.config.mode {
            ExecutionMode::Verify => {
                let included = self
                    .destination
                    .prove_message_inclusion(message_proof)
                    .await
                    .map_err(|e| RelayError::endpoint("prove message inclusion", e))?;
                if !included {
                    return Err(RelayError::VerificationRejected {
                        batch_number: proof.batch_number,
                        message_index: proof.id,
                    });
                }
                info!(
                    batch_number = proof.batch_number,
                    message_index = proof.id,
                    "Destination verified message inclusion"
                );
                Ok(DestinationResult::Included)
            }
            ExecutionMode::Execute => {
                let outcome = self
                    .destination
                    .execute_bundle(event.bundle.encode(), message_proof)
                    .await
                    .map_err(|e| RelayError::endpoint("execute bundle", e))?;
                if !outcome.status {
                    return Err(RelayError::TransactionReverted {
                        tx_hash: outcome.tx_hash,
                    });
                }
                info!(tx_hash = %outcome.tx_hash, "Bundle executed on destination");
                Ok(DestinationResult::Executed {
                    tx_hash: outcome.tx_hash,
                })
            }
        }
    }

    fn transition(&mut self, next: RelayState) {
        let from = self.state();
        info!(from = %from, to = %next, "Relay state transition");
        self.history.push(next);
    }
}

/// Resolve the outbound log the proof was requested for.
///
/// Never falls back to another index.
pub fn select_outbound_log(
    receipt: &MessageReceipt,
    log_index: u64,
) -> Result<&OutboundLog, RelayError> {
    receipt.outbound_log(log_index).ok_or_else(|| {
        RelayError::MissingArtifact(format!(
            "outbound log {} not found in receipt {} ({} outbound logs)",
            log_index,
            receipt.tx_hash,
            receipt.outbound_logs.len()
        ))
    })
}

/// Assemble the destination proof record
pub fn build_inclusion_proof(
    source_chain_id: u64,
    proof: &LogProof,
    tx_number_in_batch: u16,
    sender: Address,
    data: Bytes,
) -> MessageInclusionProof {
    MessageInclusionProof {
        chainId: U256::from(source_chain_id),
        l1BatchNumber: U256::from(proof.batch_number),
        l2MessageIndex: U256::from(proof.id),
        message: L2Message {
            txNumberInBatch: tx_number_in_batch,
            sender,
            data,
        },
        proof: proof.proof.clone(),
    }
}
