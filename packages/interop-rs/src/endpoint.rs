//! Chain capability interface
//!
//! The orchestrator and every waiter talk to chains only through
//! [`ChainEndpoint`], so JSON-RPC clients and scripted test endpoints are
//! interchangeable.

use alloy::primitives::{Address, Bytes, B256, U256};
use alloy::sol_types::SolCall;
use async_trait::async_trait;
use eyre::Result;

use crate::address_codec::{encode_interoperable_address, InteroperableAddress};
use crate::contracts::{IERC7786Attributes, InteropCallStarter, MessageInclusionProof};
use crate::types::{LogProof, MessageReceipt};

/// Read and write surface of one chain
#[async_trait]
pub trait ChainEndpoint: Send + Sync {
    /// Numeric chain id
    fn chain_id(&self) -> u64;

    /// Address of the interop center whose events and messages are relayed
    fn interop_center(&self) -> Address;

    /// Height of the latest finalized block
    async fn finalized_block_number(&self) -> Result<u64>;

    /// Inclusion proof for an outbound log, `None` until it is produced
    async fn log_proof(&self, tx_hash: B256, log_index: u64) -> Result<Option<LogProof>>;

    /// Receipt of a mined transaction, `None` if unknown
    async fn transaction_receipt(&self, tx_hash: B256) -> Result<Option<MessageReceipt>>;

    /// Locally mirrored root of `chain_id`'s batch; zero until written
    async fn interop_root(&self, chain_id: u64, batch_number: u64) -> Result<B256>;

    /// Submit `sendBundle` and wait for it to be mined
    async fn send_bundle(&self, message: &OutboundMessage) -> Result<MessageReceipt>;

    /// Read-only inclusion check (`proveL2MessageInclusionShared`)
    async fn prove_message_inclusion(&self, proof: &MessageInclusionProof) -> Result<bool>;

    /// Submit `executeBundle` and wait for it to be mined
    async fn execute_bundle(&self, bundle: Bytes, proof: &MessageInclusionProof)
        -> Result<TxOutcome>;
}

/// Result of a mined transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxOutcome {
    pub tx_hash: B256,
    pub status: bool,
}

// ============================================================================
// Outbound messages
// ============================================================================

/// One call to perform on the destination chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundCall {
    pub to: Address,
    pub value: U256,
    pub data: Bytes,
}

/// What the relay asks the source chain to send
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub destination_chain_id: u64,
    pub calls: Vec<OutboundCall>,
    /// Restrict execution to this destination account
    pub execution_address: Option<Address>,
    /// Restrict unbundling to this destination account
    pub unbundler_address: Option<Address>,
}

impl OutboundMessage {
    /// A single-call message with no bundle restrictions
    pub fn single(destination_chain_id: u64, call: OutboundCall) -> Self {
        Self {
            destination_chain_id,
            calls: vec![call],
            execution_address: None,
            unbundler_address: None,
        }
    }

    /// `msg.value` required by `sendBundle`
    pub fn total_value(&self) -> U256 {
        self.calls
            .iter()
            .fold(U256::ZERO, |acc, call| acc.saturating_add(call.value))
    }

    /// ERC-7930 destination chain argument
    pub fn destination(&self) -> Bytes {
        encode_interoperable_address(Some(self.destination_chain_id), None)
    }

    /// Per-call starters, carrying `interopCallValue` when value is attached
    pub fn call_starters(&self) -> Vec<InteropCallStarter> {
        self.calls
            .iter()
            .map(|call| {
                let mut attributes = Vec::new();
                if !call.value.is_zero() {
                    attributes.push(
                        IERC7786Attributes::interopCallValueCall { value: call.value }
                            .abi_encode()
                            .into(),
                    );
                }
                InteropCallStarter {
                    to: InteroperableAddress::account(call.to).to_bytes(),
                    data: call.data.clone(),
                    callAttributes: attributes,
                }
            })
            .collect()
    }

    /// Bundle-level attributes
    pub fn bundle_attributes(&self) -> Vec<Bytes> {
        let mut attributes = Vec::new();
        if let Some(executor) = self.execution_address {
            let target = InteroperableAddress::qualified(self.destination_chain_id, executor);
            attributes.push(
                IERC7786Attributes::executionAddressCall {
                    executionAddress: target.to_bytes(),
                }
                .abi_encode()
                .into(),
            );
        }
        if let Some(unbundler) = self.unbundler_address {
            let target = InteroperableAddress::qualified(self.destination_chain_id, unbundler);
            attributes.push(
                IERC7786Attributes::unbundlerAddressCall {
                    unbundlerAddress: target.to_bytes(),
                }
                .abi_encode()
                .into(),
            );
        }
        attributes
    }
}
