//! Testing Utilities Module
//!
//! Scripted in-memory endpoints and ready-made relay scenarios, so waiters
//! and the orchestrator can be exercised without a chain.
//!
//! ## Submodules
//!
//! - `mock_endpoint` - Scripted [`crate::ChainEndpoint`] implementation
//! - `fixtures` - Sample bundles, event logs and a complete relay scenario

pub mod fixtures;
pub mod mock_endpoint;

// Re-export commonly used items
pub use fixtures::*;
pub use mock_endpoint::*;
