//! Interop-RS: Cross-Chain Inclusion-Proof Relay Library
//!
//! This crate relays an interop bundle from a source chain to a destination
//! chain and proves to the destination that the bundle's L2→L1 message was
//! included in a finalized batch of the source:
//!
//! - **Polling** - Bounded-retry primitive shared by every waiter
//! - **Finality / Proof / Root** - Waiters for block finality, log proofs and
//!   the destination's mirrored interop root
//! - **Bundle** - Canonical ABI codec for the transported bundle
//! - **Relay** - The end-to-end orchestrator state machine
//! - **EVM Module** - JSON-RPC implementation of [`ChainEndpoint`]
//! - **Testing Module** - Scripted in-memory endpoints for tests
//!
//! ## Usage
//!
//! ```toml
//! [dependencies]
//! interop-rs = { path = "../interop-rs" }
//! ```
//!
//! ## Feature Flags
//!
//! - `evm` - Enable the JSON-RPC endpoint (default)
//! - `testing` - Enable scripted mock endpoints and scenario fixtures
//! - `full` - Enable all features

// Core modules (always available)
pub mod address_codec;
pub mod bundle;
pub mod contracts;
pub mod endpoint;
pub mod error;
pub mod events;
pub mod finality;
pub mod hash;
pub mod polling;
pub mod proof;
pub mod redact;
pub mod relay;
pub mod root;
pub mod types;

// Chain-specific modules (feature-gated)
#[cfg(feature = "evm")]
pub mod evm;

// Testing utilities (feature-gated)
#[cfg(any(test, feature = "testing"))]
pub mod testing;

// Re-export commonly used items at the crate root
pub use address_codec::{
    decode_interoperable_address, encode_interoperable_address, InteroperableAddress,
};
pub use bundle::{BundleAttributes, BundleCall, MessageBundle, BUNDLE_IDENTIFIER, BUNDLE_VERSION};
pub use endpoint::{ChainEndpoint, OutboundCall, OutboundMessage, TxOutcome};
pub use error::{ErrorKind, RelayError};
pub use finality::await_finality;
pub use polling::{poll_until, PollError, PollPolicy};
pub use proof::await_proof;
pub use relay::{
    DestinationResult, ExecutionMode, RelayConfig, RelayOrchestrator, RelayOutcome, RelayState,
};
pub use root::await_root;
pub use types::{LogProof, MessageReceipt, OutboundLog};
