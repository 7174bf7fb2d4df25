//! Raw JSON-RPC access for chain-specific methods
//!
//! Receipts carrying batch placement and L2→L1 logs, and L2→L1 log proofs,
//! are not part of the standard Ethereum RPC surface, so they are fetched
//! with plain JSON-RPC requests and decoded into the types below.

use alloy::primitives::{Address, Bytes, LogData, B256, U64};
use eyre::{eyre, Result, WrapErr};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

use crate::types::{LogProof, MessageReceipt, OutboundLog};

/// Per-request HTTP timeout
pub const RPC_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// JSON-RPC request envelope
#[derive(Debug, Serialize)]
struct RpcRequest<'a, P> {
    jsonrpc: &'static str,
    method: &'a str,
    params: P,
    id: u64,
}

/// JSON-RPC response wrapper
#[derive(Debug, Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcError>,
}

/// JSON-RPC error
#[derive(Debug, Deserialize)]
struct RpcError {
    code: i64,
    message: String,
}

/// Block header fields the relay reads
#[derive(Debug, Clone, Deserialize)]
pub struct BlockHeader {
    pub number: U64,
}

/// Transaction receipt with batch placement and L2→L1 logs
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZkReceipt {
    pub transaction_hash: B256,
    pub block_number: U64,
    pub from: Address,
    pub status: U64,
    #[serde(default)]
    pub l1_batch_number: Option<U64>,
    #[serde(default)]
    pub l1_batch_tx_index: Option<U64>,
    #[serde(default)]
    pub logs: Vec<ZkLog>,
    #[serde(default, rename = "l2ToL1Logs")]
    pub l2_to_l1_logs: Vec<ZkL2ToL1Log>,
}

/// Event log inside a receipt
#[derive(Debug, Clone, Deserialize)]
pub struct ZkLog {
    pub address: Address,
    pub topics: Vec<B256>,
    pub data: Bytes,
}

/// L2→L1 log inside a receipt
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZkL2ToL1Log {
    pub transaction_log_index: U64,
    #[serde(default)]
    pub tx_index_in_l1_batch: Option<U64>,
    pub sender: Address,
    pub key: B256,
    pub value: B256,
}

/// `zks_getL2ToL1LogProof` result
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawLogProof {
    /// Present on nodes that report the batch alongside the proof
    #[serde(default, alias = "batch_number")]
    pub batch_number: Option<U64>,
    pub id: u64,
    pub root: B256,
    pub proof: Vec<B256>,
}

impl RawLogProof {
    /// Attach the batch number, preferring the one reported with the proof
    pub fn into_log_proof(self, receipt_batch: Option<u64>) -> Option<LogProof> {
        let batch_number = self
            .batch_number
            .map(|b| b.to::<u64>())
            .or(receipt_batch)?;
        Some(LogProof {
            batch_number,
            id: self.id,
            root: self.root,
            proof: self.proof,
        })
    }
}

impl From<ZkReceipt> for MessageReceipt {
    fn from(raw: ZkReceipt) -> Self {
        let logs = raw
            .logs
            .into_iter()
            .map(|log| alloy::primitives::Log {
                address: log.address,
                data: LogData::new_unchecked(log.topics, log.data),
            })
            .collect();
        let outbound_logs = raw
            .l2_to_l1_logs
            .into_iter()
            .map(|log| OutboundLog {
                transaction_log_index: log.transaction_log_index.to::<u64>(),
                tx_index_in_l1_batch: log.tx_index_in_l1_batch.map(|i| i.to::<u64>()),
                sender: log.sender,
                key: log.key,
                value: log.value,
            })
            .collect();

        MessageReceipt {
            tx_hash: raw.transaction_hash,
            block_number: raw.block_number.to::<u64>(),
            from: raw.from,
            status: raw.status == U64::from(1),
            l1_batch_number: raw.l1_batch_number.map(|b| b.to::<u64>()),
            l1_batch_tx_index: raw.l1_batch_tx_index.map(|i| i.to::<u64>()),
            logs,
            outbound_logs,
        }
    }
}

/// Minimal JSON-RPC client
#[derive(Debug, Clone)]
pub struct RpcClient {
    url: Url,
    client: Client,
}

impl RpcClient {
    pub fn new(url: Url) -> Result<Self> {
        let client = Client::builder().timeout(RPC_REQUEST_TIMEOUT).build()?;
        Ok(Self { url, client })
    }

    /// Issue one request; a `null` result is `Ok(None)`
    pub async fn request<P, T>(&self, method: &str, params: P) -> Result<Option<T>>
    where
        P: Serialize,
        T: DeserializeOwned,
    {
        let body = RpcRequest {
            jsonrpc: "2.0",
            method,
            params,
            id: 1,
        };

        let response = self
            .client
            .post(self.url.clone())
            .json(&body)
            .send()
            .await
            .wrap_err_with(|| format!("{} request failed", method))?
            .json::<RpcResponse<T>>()
            .await
            .wrap_err_with(|| format!("{} returned an invalid response", method))?;

        if let Some(error) = response.error {
            return Err(eyre!("RPC error: {} - {}", error.code, error.message));
        }

        Ok(response.result)
    }

    /// Latest finalized block
    pub async fn finalized_block(&self) -> Result<u64> {
        let header: BlockHeader = self
            .request("eth_getBlockByNumber", ("finalized", false))
            .await?
            .ok_or_else(|| eyre!("No finalized block returned"))?;
        Ok(header.number.to::<u64>())
    }

    pub async fn transaction_receipt(&self, tx_hash: B256) -> Result<Option<ZkReceipt>> {
        self.request("eth_getTransactionReceipt", [tx_hash]).await
    }

    /// `zks_getL2ToL1LogProof`, with the proof mode argument only when set
    pub async fn log_proof(
        &self,
        tx_hash: B256,
        log_index: u64,
        mode: Option<&str>,
    ) -> Result<Option<RawLogProof>> {
        match mode {
            Some(mode) => {
                self.request("zks_getL2ToL1LogProof", (tx_hash, log_index, mode))
                    .await
            }
            None => {
                self.request("zks_getL2ToL1LogProof", (tx_hash, log_index))
                    .await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;

    const RECEIPT_JSON: &str = r#"{
        "transactionHash": "0x5e5e5e5e5e5e5e5e5e5e5e5e5e5e5e5e5e5e5e5e5e5e5e5e5e5e5e5e5e5e5e5e",
        "blockNumber": "0x1a",
        "blockHash": "0x1111111111111111111111111111111111111111111111111111111111111111",
        "from": "0x0000000000000000000000000000000000000b0b",
        "to": "0x000000000000000000000000000000000001000d",
        "status": "0x1",
        "l1BatchNumber": "0x7",
        "l1BatchTxIndex": "0x3",
        "logs": [
            {
                "address": "0x000000000000000000000000000000000001000d",
                "topics": ["0x2222222222222222222222222222222222222222222222222222222222222222"],
                "data": "0xdeadbeef",
                "logIndex": "0x0"
            }
        ],
        "l2ToL1Logs": [
            {
                "blockNumber": "0x1a",
                "l1BatchNumber": "0x7",
                "transactionIndex": "0x0",
                "transactionLogIndex": "0x0",
                "txIndexInL1Batch": "0x3",
                "shardId": "0x0",
                "isService": true,
                "sender": "0x0000000000000000000000000000000000008008",
                "key": "0x000000000000000000000000000000000000000000000000000000000001000d",
                "value": "0x3333333333333333333333333333333333333333333333333333333333333333",
                "logIndex": "0x0"
            }
        ]
    }"#;

    #[test]
    fn test_receipt_deserialize() {
        let raw: ZkReceipt = serde_json::from_str(RECEIPT_JSON).unwrap();
        let receipt = MessageReceipt::from(raw);

        assert_eq!(receipt.block_number, 26);
        assert!(receipt.status);
        assert_eq!(receipt.l1_batch_number, Some(7));
        assert_eq!(receipt.l1_batch_tx_index, Some(3));
        assert_eq!(receipt.logs.len(), 1);
        assert_eq!(receipt.logs[0].data.data.to_vec(), vec![0xde, 0xad, 0xbe, 0xef]);

        let outbound = receipt.outbound_log(0).unwrap();
        assert_eq!(outbound.tx_index_in_l1_batch, Some(3));
        assert_eq!(
            outbound.message_sender(),
            address!("000000000000000000000000000000000001000d")
        );
    }

    #[test]
    fn test_unsealed_receipt_has_no_batch() {
        let json = r#"{
            "transactionHash": "0x5e5e5e5e5e5e5e5e5e5e5e5e5e5e5e5e5e5e5e5e5e5e5e5e5e5e5e5e5e5e5e5e",
            "blockNumber": "0x1a",
            "from": "0x0000000000000000000000000000000000000b0b",
            "status": "0x0",
            "l1BatchNumber": null,
            "l1BatchTxIndex": null,
            "logs": [],
            "l2ToL1Logs": []
        }"#;
        let receipt = MessageReceipt::from(serde_json::from_str::<ZkReceipt>(json).unwrap());

        assert!(!receipt.status);
        assert_eq!(receipt.l1_batch_number, None);
        assert!(receipt.outbound_logs.is_empty());
    }

    #[test]
    fn test_log_proof_batch_from_receipt() {
        let json = r#"{
            "id": 4,
            "root": "0x7171717171717171717171717171717171717171717171717171717171717171",
            "proof": [
                "0x0101010101010101010101010101010101010101010101010101010101010101"
            ]
        }"#;
        let raw: RawLogProof = serde_json::from_str(json).unwrap();

        assert!(raw.clone().into_log_proof(None).is_none());
        let proof = raw.into_log_proof(Some(7)).unwrap();
        assert_eq!(proof.batch_number, 7);
        assert_eq!(proof.id, 4);
        assert_eq!(proof.proof, vec![B256::repeat_byte(0x01)]);
    }

    #[test]
    fn test_log_proof_reported_batch_wins() {
        let json = r#"{
            "batchNumber": "0x9",
            "id": 0,
            "root": "0x7171717171717171717171717171717171717171717171717171717171717171",
            "proof": []
        }"#;
        let raw: RawLogProof = serde_json::from_str(json).unwrap();
        assert_eq!(raw.into_log_proof(Some(7)).unwrap().batch_number, 9);
    }

    #[test]
    fn test_error_response() {
        let json = r#"{"jsonrpc":"2.0","id":1,"error":{"code":-32601,"message":"method not found"}}"#;
        let response: RpcResponse<RawLogProof> = serde_json::from_str(json).unwrap();
        assert!(response.result.is_none());
        assert_eq!(response.error.unwrap().code, -32601);
    }
}
