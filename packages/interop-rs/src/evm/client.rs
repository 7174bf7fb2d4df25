//! EVM RPC endpoint
//!
//! [`ChainEndpoint`] over JSON-RPC: contract reads and writes go through
//! alloy, chain-specific receipt and proof methods through [`RpcClient`].

use alloy::{
    network::EthereumWallet,
    primitives::{Address, Bytes, B256, U256},
    providers::{Provider, ProviderBuilder, RootProvider},
    rpc::types::TransactionReceipt,
    signers::local::PrivateKeySigner,
    transports::http::{Client, Http},
};
use async_trait::async_trait;
use eyre::{eyre, Result, WrapErr};
use std::fmt;
use tracing::{debug, info};
use url::Url;

use super::rpc::RpcClient;
use crate::contracts::{
    InteropCenter, InteropHandler, L2InteropRootStorage, L2MessageVerification,
    MessageInclusionProof, INTEROP_CENTER_ADDRESS, INTEROP_HANDLER_ADDRESS,
    INTEROP_ROOT_STORAGE_ADDRESS, MESSAGE_VERIFICATION_ADDRESS,
};
use crate::endpoint::{ChainEndpoint, OutboundMessage, TxOutcome};
use crate::redact::Redacted;
use crate::types::{LogProof, MessageReceipt};

/// Interop system contract addresses on one chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InteropContracts {
    pub interop_center: Address,
    pub interop_handler: Address,
    pub root_storage: Address,
    pub message_verification: Address,
}

impl Default for InteropContracts {
    fn default() -> Self {
        Self {
            interop_center: INTEROP_CENTER_ADDRESS,
            interop_handler: INTEROP_HANDLER_ADDRESS,
            root_storage: INTEROP_ROOT_STORAGE_ADDRESS,
            message_verification: MESSAGE_VERIFICATION_ADDRESS,
        }
    }
}

/// EVM endpoint configuration
#[derive(Clone)]
pub struct EvmEndpointConfig {
    /// RPC URL (e.g., "http://localhost:3050")
    pub rpc_url: Url,
    /// Private key for signing (required for write operations)
    pub private_key: Option<Redacted<String>>,
    pub contracts: InteropContracts,
    /// Fixed gas limit for writes; estimated when unset
    pub gas_limit: Option<u64>,
    /// Optional third argument to `zks_getL2ToL1LogProof`
    pub log_proof_mode: Option<String>,
}

impl EvmEndpointConfig {
    pub fn new(rpc_url: Url) -> Self {
        Self {
            rpc_url,
            private_key: None,
            contracts: InteropContracts::default(),
            gas_limit: None,
            log_proof_mode: None,
        }
    }
}

impl fmt::Debug for EvmEndpointConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EvmEndpointConfig")
            .field("rpc_url", &self.rpc_url.as_str())
            .field("private_key", &self.private_key.as_ref().map(|_| "<redacted>"))
            .field("contracts", &self.contracts)
            .field("gas_limit", &self.gas_limit)
            .field("log_proof_mode", &self.log_proof_mode)
            .finish()
    }
}

/// A chain reached over JSON-RPC
pub struct EvmEndpoint {
    provider: RootProvider<Http<Client>>,
    rpc: RpcClient,
    signer: Option<PrivateKeySigner>,
    chain_id: u64,
    config: EvmEndpointConfig,
}

impl EvmEndpoint {
    /// Connect and read the chain id from the node
    pub async fn connect(config: EvmEndpointConfig) -> Result<Self> {
        let signer = match &config.private_key {
            Some(key) => Some(
                key.expose()
                    .parse::<PrivateKeySigner>()
                    .map_err(|e| eyre!("Invalid private key: {}", e))?,
            ),
            None => None,
        };

        let provider = ProviderBuilder::new().on_http(config.rpc_url.clone());
        let chain_id = provider
            .get_chain_id()
            .await
            .wrap_err_with(|| format!("Failed to read chain id from {}", config.rpc_url))?;
        let rpc = RpcClient::new(config.rpc_url.clone())?;

        info!(
            rpc_url = %config.rpc_url,
            chain_id = chain_id,
            signer = ?signer.as_ref().map(|s| s.address()),
            "Connected EVM endpoint"
        );

        Ok(Self {
            provider,
            rpc,
            signer,
            chain_id,
            config,
        })
    }

    /// Address writes are signed by, if a key is configured
    pub fn signer_address(&self) -> Option<Address> {
        self.signer.as_ref().map(|s| s.address())
    }

    fn wallet(&self) -> Result<EthereumWallet> {
        let signer = self
            .signer
            .clone()
            .ok_or_else(|| eyre!("No private key configured for chain {}", self.chain_id))?;
        Ok(EthereumWallet::from(signer))
    }

}

/// Convert the receipt alloy returns for a mined write.
///
/// Batch placement and L2→L1 logs are not known yet at this point; callers
/// that need them read the receipt again once the batch is sealed.
pub fn mined_receipt(receipt: &TransactionReceipt) -> Result<MessageReceipt> {
    let block_number = receipt
        .block_number
        .ok_or_else(|| eyre!("Receipt for {} has no block number", receipt.transaction_hash))?;

    Ok(MessageReceipt {
        tx_hash: receipt.transaction_hash,
        block_number,
        from: receipt.from,
        status: receipt.status(),
        l1_batch_number: None,
        l1_batch_tx_index: None,
        logs: receipt
            .inner
            .logs()
            .iter()
            .map(|log| log.inner.clone())
            .collect(),
        outbound_logs: Vec::new(),
    })
}

#[async_trait]
impl ChainEndpoint for EvmEndpoint {
    fn chain_id(&self) -> u64 {
        self.chain_id
    }

    fn interop_center(&self) -> Address {
        self.config.contracts.interop_center
    }

    async fn finalized_block_number(&self) -> Result<u64> {
        self.rpc.finalized_block().await
    }

    async fn log_proof(&self, tx_hash: B256, log_index: u64) -> Result<Option<LogProof>> {
        let raw = match self
            .rpc
            .log_proof(tx_hash, log_index, self.config.log_proof_mode.as_deref())
            .await?
        {
            Some(raw) => raw,
            None => return Ok(None),
        };

        let receipt_batch = match raw.batch_number {
            Some(_) => None,
            None => self
                .rpc
                .transaction_receipt(tx_hash)
                .await?
                .and_then(|r| r.l1_batch_number)
                .map(|b| b.to::<u64>()),
        };

        let proof = raw.into_log_proof(receipt_batch);
        if proof.is_none() {
            debug!(tx_hash = %tx_hash, "Log proof returned before batch number is known");
        }
        Ok(proof)
    }

    async fn transaction_receipt(&self, tx_hash: B256) -> Result<Option<MessageReceipt>> {
        Ok(self
            .rpc
            .transaction_receipt(tx_hash)
            .await?
            .map(MessageReceipt::from))
    }

    async fn interop_root(&self, chain_id: u64, batch_number: u64) -> Result<B256> {
        let storage = L2InteropRootStorage::new(self.config.contracts.root_storage, &self.provider);
        let root = storage
            .interopRoots(U256::from(chain_id), U256::from(batch_number))
            .call()
            .await
            .map_err(|e| eyre!("Failed to read interop root: {}", e))?;
        Ok(root._0)
    }

    async fn send_bundle(&self, message: &OutboundMessage) -> Result<MessageReceipt> {
        let provider = ProviderBuilder::new()
            .with_recommended_fillers()
            .wallet(self.wallet()?)
            .on_http(self.config.rpc_url.clone());
        let center = InteropCenter::new(self.config.contracts.interop_center, &provider);

        let mut call = center
            .sendBundle(
                message.destination(),
                message.call_starters(),
                message.bundle_attributes(),
            )
            .value(message.total_value());
        if let Some(gas) = self.config.gas_limit {
            call = call.gas(gas);
        }

        debug!(
            destination_chain_id = message.destination_chain_id,
            value = %message.total_value(),
            "Submitting sendBundle"
        );

        let pending_tx = call
            .send()
            .await
            .map_err(|e| eyre!("Failed to send sendBundle tx: {}", e))?;
        let tx_hash = *pending_tx.tx_hash();
        info!(tx_hash = %tx_hash, "sendBundle transaction sent");

        let receipt = pending_tx
            .get_receipt()
            .await
            .map_err(|e| eyre!("Failed to get receipt: {}", e))?;

        mined_receipt(&receipt)
    }

    async fn prove_message_inclusion(&self, proof: &MessageInclusionProof) -> Result<bool> {
        let verifier = L2MessageVerification::new(
            self.config.contracts.message_verification,
            &self.provider,
        );
        let result = verifier
            .proveL2MessageInclusionShared(
                proof.chainId,
                proof.l1BatchNumber,
                proof.l2MessageIndex,
                proof.message.clone(),
                proof.proof.clone(),
            )
            .call()
            .await
            .map_err(|e| eyre!("Failed to call proveL2MessageInclusionShared: {}", e))?;
        Ok(result._0)
    }

    async fn execute_bundle(
        &self,
        bundle: Bytes,
        proof: &MessageInclusionProof,
    ) -> Result<TxOutcome> {
        let provider = ProviderBuilder::new()
            .with_recommended_fillers()
            .wallet(self.wallet()?)
            .on_http(self.config.rpc_url.clone());
        let handler = InteropHandler::new(self.config.contracts.interop_handler, &provider);

        let mut call = handler.executeBundle(bundle, proof.clone());
        if let Some(gas) = self.config.gas_limit {
            call = call.gas(gas);
        }

        let pending_tx = call
            .send()
            .await
            .map_err(|e| eyre!("Failed to send executeBundle tx: {}", e))?;
        let tx_hash = *pending_tx.tx_hash();
        info!(tx_hash = %tx_hash, "executeBundle transaction sent");

        let receipt = pending_tx
            .get_receipt()
            .await
            .map_err(|e| eyre!("Failed to get receipt: {}", e))?;

        Ok(TxOutcome {
            tx_hash: receipt.transaction_hash,
            status: receipt.status(),
        })
    }
}
