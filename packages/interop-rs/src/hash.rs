//! Hash helpers for interop messages
//!
//! The L2→L1 messenger commits to `keccak256(message)`; the relay recomputes
//! that hash from the re-encoded bundle to bind the event payload to the
//! outbound log it proves.

use alloy::primitives::B256;
use tiny_keccak::{Hasher, Keccak};

/// Compute keccak256 hash of data
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak::v256();
    hasher.update(data);
    let mut output = [0u8; 32];
    hasher.finalize(&mut output);
    output
}

/// Compute the messenger hash of an L2→L1 message payload
pub fn message_hash(message: &[u8]) -> B256 {
    B256::from(keccak256(message))
}

/// Convert bytes32 to hex string with 0x prefix
pub fn bytes32_to_hex(bytes: &[u8; 32]) -> String {
    format!("0x{}", hex::encode(bytes))
}
