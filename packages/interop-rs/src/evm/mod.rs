//! EVM Chain Support Module
//!
//! JSON-RPC implementation of [`crate::ChainEndpoint`] for ZKsync-style
//! chains.
//!
//! ## Submodules
//!
//! - `client` - The endpoint: contract calls via alloy, signer per write
//! - `rpc` - Raw JSON-RPC for receipts with L2→L1 logs and log proofs

pub mod client;
pub mod rpc;

// Re-export commonly used items
pub use client::{EvmEndpoint, EvmEndpointConfig, InteropContracts};
pub use rpc::{RpcClient, ZkReceipt};
