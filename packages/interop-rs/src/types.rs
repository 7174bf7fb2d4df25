//! Common types for cross-chain relay
//!
//! Receipts, outbound logs and log proofs as observed on a chain. All of these
//! are produced by chain infrastructure; the relay only reads them.

use alloy::primitives::{Address, Log, B256};

// ============================================================================
// Receipts
// ============================================================================

/// A mined transaction as seen by the relay
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageReceipt {
    /// Transaction hash
    pub tx_hash: B256,
    /// Block the transaction was mined in
    pub block_number: u64,
    /// Transaction sender
    pub from: Address,
    /// Execution status (`true` = success)
    pub status: bool,
    /// Batch the transaction was sealed into, once known
    pub l1_batch_number: Option<u64>,
    /// Position of the transaction inside its batch, once known
    pub l1_batch_tx_index: Option<u64>,
    /// Event logs emitted by the transaction
    pub logs: Vec<Log>,
    /// L2→L1 (outbound) logs emitted by the transaction
    pub outbound_logs: Vec<OutboundLog>,
}

impl MessageReceipt {
    /// Find the outbound log at `index` within this transaction.
    ///
    /// Matches on the log's own transaction-local index, not on its position
    /// in the list, so a sparse or reordered list never resolves to the wrong
    /// entry.
    pub fn outbound_log(&self, index: u64) -> Option<&OutboundLog> {
        self.outbound_logs
            .iter()
            .find(|log| log.transaction_log_index == index)
    }
}

/// An L2→L1 log emitted through the messenger system contract
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundLog {
    /// Index of this log within its transaction
    pub transaction_log_index: u64,
    /// Position of the emitting transaction inside its batch, once known
    pub tx_index_in_l1_batch: Option<u64>,
    /// System contract that emitted the log
    pub sender: Address,
    /// Left-padded address of the account that sent the message
    pub key: B256,
    /// Hash of the message payload
    pub value: B256,
}

impl OutboundLog {
    /// Account that sent the message (low 20 bytes of `key`)
    pub fn message_sender(&self) -> Address {
        Address::from_word(self.key)
    }
}

// ============================================================================
// Proofs
// ============================================================================

/// Inclusion proof for one outbound log.
///
/// Only meaningful together with the `(tx_hash, log_index)` it was requested
/// for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogProof {
    /// Batch the log was committed in
    pub batch_number: u64,
    /// Index of the message within the batch
    pub id: u64,
    /// Root the proof path resolves to
    pub root: B256,
    /// Ordered sibling path
    pub proof: Vec<B256>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outbound(index: u64) -> OutboundLog {
        OutboundLog {
            transaction_log_index: index,
            tx_index_in_l1_batch: Some(3),
            sender: Address::repeat_byte(0x80),
            key: Address::repeat_byte(0xaa).into_word(),
            value: B256::repeat_byte(index as u8),
        }
    }

    fn receipt(outbound_logs: Vec<OutboundLog>) -> MessageReceipt {
        MessageReceipt {
            tx_hash: B256::repeat_byte(1),
            block_number: 10,
            from: Address::ZERO,
            status: true,
            l1_batch_number: Some(7),
            l1_batch_tx_index: Some(3),
            logs: vec![],
            outbound_logs,
        }
    }

    #[test]
    fn test_outbound_log_lookup_by_index() {
        let receipt = receipt(vec![outbound(1), outbound(0)]);

        assert_eq!(receipt.outbound_log(0).unwrap().value, B256::repeat_byte(0));
        assert_eq!(receipt.outbound_log(1).unwrap().value, B256::repeat_byte(1));
        assert!(receipt.outbound_log(2).is_none());
    }

    #[test]
    fn test_outbound_log_lookup_never_falls_back() {
        let receipt = receipt(vec![outbound(1)]);
        assert!(receipt.outbound_log(0).is_none());
    }

    #[test]
    fn test_message_sender_from_key() {
        let log = outbound(0);
        assert_eq!(log.message_sender(), Address::repeat_byte(0xaa));
    }
}
