//! Scripted chain endpoint
//!
//! Each read is answered from a script. Scripts are sticky: once exhausted the
//! last entry keeps being returned, so "never becomes available" is a
//! one-element script.

use alloy::primitives::{Address, Bytes, B256};
use async_trait::async_trait;
use eyre::{eyre, Result};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::contracts::{MessageInclusionProof, INTEROP_CENTER_ADDRESS};
use crate::endpoint::{ChainEndpoint, OutboundMessage, TxOutcome};
use crate::types::{LogProof, MessageReceipt};

/// Number of times each capability was invoked
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub finalized: usize,
    pub proofs: usize,
    pub receipts: usize,
    pub roots: usize,
    pub sends: usize,
    pub proves: usize,
    pub executes: usize,
}

#[derive(Debug, Clone)]
struct Script<T> {
    items: Vec<Result<T, String>>,
    cursor: usize,
}

impl<T: Clone> Script<T> {
    fn new(items: impl IntoIterator<Item = Result<T, &'static str>>) -> Self {
        Self {
            items: items
                .into_iter()
                .map(|item| item.map_err(str::to_string))
                .collect(),
            cursor: 0,
        }
    }

    fn next_response(&mut self, what: &str) -> Result<T> {
        let last = match self.items.len().checked_sub(1) {
            Some(last) => last,
            None => return Err(eyre!("no scripted {} response", what)),
        };
        let item = self.items[self.cursor.min(last)].clone();
        self.cursor += 1;
        item.map_err(|e| eyre!(e))
    }
}

impl<T> Default for Script<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            cursor: 0,
        }
    }
}

#[derive(Debug)]
struct MockState {
    finalized: Script<u64>,
    proofs: Script<Option<LogProof>>,
    roots: Script<B256>,
    send_receipt: Option<MessageReceipt>,
    sealed_receipt: Option<MessageReceipt>,
    receipt_failures: usize,
    prove_result: bool,
    execute_outcome: TxOutcome,
    calls: CallCounts,
    last_proof_request: Option<(B256, u64)>,
    last_root_request: Option<(u64, u64)>,
    sent_messages: Vec<OutboundMessage>,
    last_inclusion_proof: Option<MessageInclusionProof>,
    last_executed_bundle: Option<Bytes>,
}

/// In-memory [`ChainEndpoint`]; clones share state
#[derive(Debug, Clone)]
pub struct MockEndpoint {
    chain_id: u64,
    interop_center: Address,
    state: Arc<Mutex<MockState>>,
}

impl MockEndpoint {
    /// Endpoint for `chain_id` with empty scripts
    pub fn new(chain_id: u64) -> Self {
        Self {
            chain_id,
            interop_center: INTEROP_CENTER_ADDRESS,
            state: Arc::new(Mutex::new(MockState {
                finalized: Script::default(),
                proofs: Script::default(),
                roots: Script::default(),
                send_receipt: None,
                sealed_receipt: None,
                receipt_failures: 0,
                prove_result: true,
                execute_outcome: TxOutcome {
                    tx_hash: B256::repeat_byte(0xee),
                    status: true,
                },
                calls: CallCounts::default(),
                last_proof_request: None,
                last_root_request: None,
                sent_messages: Vec::new(),
                last_inclusion_proof: None,
                last_executed_bundle: None,
            })),
        }
    }

    /// Same shared state, reporting a different chain id
    pub fn with_chain_id(mut self, chain_id: u64) -> Self {
        self.chain_id = chain_id;
        self
    }

    /// Use a non-default interop center
    pub fn with_interop_center(mut self, interop_center: Address) -> Self {
        self.interop_center = interop_center;
        self
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn script_finalized(&self, items: impl IntoIterator<Item = Result<u64, &'static str>>) {
        self.state().finalized = Script::new(items);
    }

    pub fn script_proofs(
        &self,
        items: impl IntoIterator<Item = Result<Option<LogProof>, &'static str>>,
    ) {
        self.state().proofs = Script::new(items);
    }

    pub fn script_roots(&self, items: impl IntoIterator<Item = Result<B256, &'static str>>) {
        self.state().roots = Script::new(items);
    }

    /// Receipt returned by `send_bundle`
    pub fn set_send_receipt(&self, receipt: MessageReceipt) {
        self.state().send_receipt = Some(receipt);
    }

    pub fn edit_send_receipt(&self, edit: impl FnOnce(&mut MessageReceipt)) {
        if let Some(receipt) = self.state().send_receipt.as_mut() {
            edit(receipt);
        }
    }

    /// Receipt returned by `transaction_receipt`, i.e. after batch sealing
    pub fn set_sealed_receipt(&self, receipt: MessageReceipt) {
        self.state().sealed_receipt = Some(receipt);
    }

    pub fn edit_sealed_receipt(&self, edit: impl FnOnce(&mut MessageReceipt)) {
        if let Some(receipt) = self.state().sealed_receipt.as_mut() {
            edit(receipt);
        }
    }

    pub fn clear_sealed_receipt(&self) {
        self.state().sealed_receipt = None;
    }

    /// Fail the next `count` receipt reads
    pub fn fail_receipt_reads(&self, count: usize) {
        self.state().receipt_failures = count;
    }

    pub fn set_prove_result(&self, included: bool) {
        self.state().prove_result = included;
    }

    pub fn set_execute_status(&self, status: bool) {
        self.state().execute_outcome.status = status;
    }

    pub fn calls(&self) -> CallCounts {
        self.state().calls
    }

    pub fn last_proof_request(&self) -> Option<(B256, u64)> {
        self.state().last_proof_request
    }

    pub fn last_root_request(&self) -> Option<(u64, u64)> {
        self.state().last_root_request
    }

    pub fn sent_messages(&self) -> Vec<OutboundMessage> {
        self.state().sent_messages.clone()
    }

    pub fn last_inclusion_proof(&self) -> Option<MessageInclusionProof> {
        self.state().last_inclusion_proof.clone()
    }

    pub fn last_executed_bundle(&self) -> Option<Bytes> {
        self.state().last_executed_bundle.clone()
    }
}

#[async_trait]
impl ChainEndpoint for MockEndpoint {
    fn chain_id(&self) -> u64 {
        self.chain_id
    }

    fn interop_center(&self) -> Address {
        self.interop_center
    }

    async fn finalized_block_number(&self) -> Result<u64> {
        let mut state = self.state();
        state.calls.finalized += 1;
        state.finalized.next_response("finalized block")
    }

    async fn log_proof(&self, tx_hash: B256, log_index: u64) -> Result<Option<LogProof>> {
        let mut state = self.state();
        state.calls.proofs += 1;
        state.last_proof_request = Some((tx_hash, log_index));
        state.proofs.next_response("log proof")
    }

    async fn transaction_receipt(&self, _tx_hash: B256) -> Result<Option<MessageReceipt>> {
        let mut state = self.state();
        state.calls.receipts += 1;
        if state.receipt_failures > 0 {
            state.receipt_failures -= 1;
            return Err(eyre!("receipt read failed"));
        }
        Ok(state.sealed_receipt.clone())
    }

    async fn interop_root(&self, chain_id: u64, batch_number: u64) -> Result<B256> {
        let mut state = self.state();
        state.calls.roots += 1;
        state.last_root_request = Some((chain_id, batch_number));
        state.roots.next_response("interop root")
    }

    async fn send_bundle(&self, message: &OutboundMessage) -> Result<MessageReceipt> {
        let mut state = self.state();
        state.calls.sends += 1;
        state.sent_messages.push(message.clone());
        state
            .send_receipt
            .clone()
            .ok_or_else(|| eyre!("no scripted send receipt"))
    }

    async fn prove_message_inclusion(&self, proof: &MessageInclusionProof) -> Result<bool> {
        let mut state = self.state();
        state.calls.proves += 1;
        state.last_inclusion_proof = Some(proof.clone());
        Ok(state.prove_result)
    }

    async fn execute_bundle(
        &self,
        bundle: Bytes,
        proof: &MessageInclusionProof,
    ) -> Result<TxOutcome> {
        let mut state = self.state();
        state.calls.executes += 1;
        state.last_inclusion_proof = Some(proof.clone());
        state.last_executed_bundle = Some(bundle);
        Ok(state.execute_outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_script_is_sticky() {
        let endpoint = MockEndpoint::new(1);
        endpoint.script_finalized([Ok(1), Err("boom"), Ok(3)]);

        assert_eq!(endpoint.finalized_block_number().await.unwrap(), 1);
        assert!(endpoint.finalized_block_number().await.is_err());
        assert_eq!(endpoint.finalized_block_number().await.unwrap(), 3);
        assert_eq!(endpoint.finalized_block_number().await.unwrap(), 3);
        assert_eq!(endpoint.calls().finalized, 4);
    }

    #[tokio::test]
    async fn test_unscripted_read_errors() {
        let endpoint = MockEndpoint::new(1);
        assert!(endpoint.interop_root(1, 1).await.is_err());
        assert!(endpoint.send_bundle(&OutboundMessage {
            destination_chain_id: 2,
            calls: vec![],
            execution_address: None,
            unbundler_address: None,
        })
        .await
        .is_err());
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let endpoint = MockEndpoint::new(1);
        let clone = endpoint.clone();
        clone.script_roots([Ok(B256::repeat_byte(1))]);

        assert_eq!(endpoint.interop_root(1, 2).await.unwrap(), B256::repeat_byte(1));
        assert_eq!(clone.calls().roots, 1);
        assert_eq!(clone.last_root_request(), Some((1, 2)));
    }
}
