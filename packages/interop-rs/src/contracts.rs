//! Interop contract ABI definitions
//!
//! Uses alloy's sol! macro to generate type-safe bindings for the interop
//! system contracts and the structs they exchange. The bundle structs are the
//! canonical wire schema used by [`crate::bundle`].

#![allow(clippy::too_many_arguments)]

use alloy::primitives::{address, Address};
use alloy::sol;

/// Default `InteropCenter` system contract address
pub const INTEROP_CENTER_ADDRESS: Address = address!("000000000000000000000000000000000001000d");

/// Default `InteropHandler` system contract address
pub const INTEROP_HANDLER_ADDRESS: Address = address!("000000000000000000000000000000000001000e");

/// Default `L2InteropRootStorage` system contract address
pub const INTEROP_ROOT_STORAGE_ADDRESS: Address =
    address!("0000000000000000000000000000000000010008");

/// Default `L2MessageVerification` system contract address
pub const MESSAGE_VERIFICATION_ADDRESS: Address =
    address!("0000000000000000000000000000000000010009");

/// `L1Messenger` system contract, emitter of every L2→L1 log
pub const L1_MESSENGER_ADDRESS: Address = address!("0000000000000000000000000000000000008008");

sol! {
    // ========================================================================
    // Bundle Schema
    // ========================================================================

    /// One call inside a bundle
    #[derive(Debug, PartialEq, Eq)]
    struct InteropCall {
        bytes1 version;
        bool shadowAccount;
        address to;
        address from;
        uint256 value;
        bytes data;
    }

    /// Bundle-level execution and unbundling permissions (ERC-7930 addresses)
    #[derive(Debug, PartialEq, Eq)]
    struct BundleAttributes {
        bytes executionAddress;
        bytes unbundlerAddress;
    }

    /// The transported bundle, committed on the source as `0x01 ‖ abi.encode(bundle)`
    #[derive(Debug, PartialEq, Eq)]
    struct InteropBundle {
        bytes1 version;
        uint256 sourceChainId;
        uint256 destinationChainId;
        bytes32 interopBundleSalt;
        InteropCall[] calls;
        BundleAttributes bundleAttributes;
    }

    /// Caller-side description of one call passed to `sendBundle`
    #[derive(Debug, PartialEq, Eq)]
    struct InteropCallStarter {
        bytes to;
        bytes data;
        bytes[] callAttributes;
    }

    // ========================================================================
    // Proof Schema
    // ========================================================================

    /// An L2→L1 message as reconstructed for inclusion proofs
    #[derive(Debug, PartialEq, Eq)]
    struct L2Message {
        uint16 txNumberInBatch;
        address sender;
        bytes data;
    }

    /// Full proof record passed to the destination handler
    #[derive(Debug, PartialEq, Eq)]
    struct MessageInclusionProof {
        uint256 chainId;
        uint256 l1BatchNumber;
        uint256 l2MessageIndex;
        L2Message message;
        bytes32[] proof;
    }

    // ========================================================================
    // Contracts
    // ========================================================================

    /// Source-side entrypoint
    #[sol(rpc)]
    contract InteropCenter {
        /// Send a bundle of calls to the destination chain
        function sendBundle(
            bytes destinationChainId,
            InteropCallStarter[] callStarters,
            bytes[] bundleAttributes
        ) external payable returns (bytes32 bundleHash);

        /// Emitted once per bundle; `l2l1MsgHash` is the messenger hash of the outbound message
        event InteropBundleSent(bytes32 l2l1MsgHash, bytes32 interopBundleHash, InteropBundle interopBundle);
    }

    /// Destination-side execution entrypoint
    #[sol(rpc)]
    contract InteropHandler {
        function executeBundle(bytes bundle, MessageInclusionProof proof) external;
    }

    /// Destination-side mirror of other chains' batch roots
    #[sol(rpc)]
    contract L2InteropRootStorage {
        function interopRoots(uint256 chainId, uint256 batchNumber) external view returns (bytes32);
    }

    /// Destination-side read-only verification entrypoint
    #[sol(rpc)]
    contract L2MessageVerification {
        function proveL2MessageInclusionShared(
            uint256 chainId,
            uint256 blockOrBatchNumber,
            uint256 index,
            L2Message message,
            bytes32[] proof
        ) external view returns (bool);
    }

    /// ERC-7786 attribute selectors accepted by `sendBundle`
    interface IERC7786Attributes {
        function interopCallValue(uint256 value) external;
        function executionAddress(bytes executionAddress) external;
        function unbundlerAddress(bytes unbundlerAddress) external;
    }
}
