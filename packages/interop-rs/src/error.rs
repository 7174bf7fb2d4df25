//! Relay error taxonomy
//!
//! Every waiter and the orchestrator return [`RelayError`]. None of these are
//! retried by the orchestrator: "not yet available" conditions are absorbed
//! inside the polling loop and never surface here.

use alloy::primitives::B256;
use std::time::Duration;
use thiserror::Error;

/// Fatal relay errors
#[derive(Debug, Error)]
pub enum RelayError {
    /// A required setting is missing or unparseable
    #[error("configuration error: {0}")]
    Config(String),

    /// A poll policy violates `interval > 0 && timeout >= interval`
    #[error("invalid poll policy: {0}")]
    InvalidPolicy(String),

    /// A polling loop exhausted its budget
    #[error("{operation} timed out after {elapsed:?} ({attempts} attempts)")]
    Timeout {
        operation: String,
        elapsed: Duration,
        attempts: u32,
    },

    /// The destination never exposed a non-zero interop root for the key
    #[error(
        "interop root for chain {chain_id} batch {batch_number} never appeared within {elapsed:?}"
    )]
    RootUnavailable {
        chain_id: u64,
        batch_number: u64,
        elapsed: Duration,
    },

    /// The destination's interop root differs from the proof root
    #[error(
        "interop root mismatch for chain {chain_id} batch {batch_number}: expected {expected}, observed {observed}"
    )]
    RootMismatch {
        chain_id: u64,
        batch_number: u64,
        expected: B256,
        observed: B256,
    },

    /// Any other observed value that conflicts with the expected one
    #[error("integrity mismatch on {what}: expected {expected}, observed {observed}")]
    IntegrityMismatch {
        what: String,
        expected: String,
        observed: String,
    },

    /// An event, log or field is absent from an otherwise successful response
    #[error("missing artifact: {0}")]
    MissingArtifact(String),

    /// Bundle or call carries a version tag this codec does not know
    #[error("unsupported {what} version 0x{found:02x}")]
    UnsupportedVersion { what: &'static str, found: u8 },

    /// Bundle bytes are not valid ABI
    #[error("malformed bundle encoding: {0}")]
    Codec(#[from] alloy::sol_types::Error),

    /// Bundle bytes decode but do not re-encode to the same bytes
    #[error("bundle encoding is not canonical")]
    NonCanonicalEncoding,

    /// A submitted transaction was mined with a failed status
    #[error("transaction {tx_hash} reverted")]
    TransactionReverted { tx_hash: B256 },

    /// The read-only verification entrypoint returned `false`
    #[error("destination rejected inclusion proof for batch {batch_number} message {message_index}")]
    VerificationRejected {
        batch_number: u64,
        message_index: u64,
    },

    /// A write-path request failed
    #[error("endpoint request failed during {operation}: {report}")]
    Endpoint {
        operation: String,
        report: eyre::Report,
    },
}

/// Coarse classification used for reporting and exit handling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Config,
    Timeout,
    IntegrityMismatch,
    MissingArtifact,
    Endpoint,
}

impl RelayError {
    /// Wrap an endpoint failure with the operation that produced it
    pub fn endpoint(operation: impl Into<String>, report: eyre::Report) -> Self {
        RelayError::Endpoint {
            operation: operation.into(),
            report,
        }
    }

    /// Classify into the reporting taxonomy
    pub fn kind(&self) -> ErrorKind {
        match self {
            RelayError::Config(_) | RelayError::InvalidPolicy(_) => ErrorKind::Config,
            RelayError::Timeout { .. } | RelayError::RootUnavailable { .. } => ErrorKind::Timeout,
            RelayError::RootMismatch { .. }
            | RelayError::IntegrityMismatch { .. }
            | RelayError::NonCanonicalEncoding
            | RelayError::VerificationRejected { .. } => ErrorKind::IntegrityMismatch,
            RelayError::MissingArtifact(_)
            | RelayError::UnsupportedVersion { .. }
            | RelayError::Codec(_) => ErrorKind::MissingArtifact,
            RelayError::TransactionReverted { .. } | RelayError::Endpoint { .. } => {
                ErrorKind::Endpoint
            }
        }
    }

    /// Whether this error signals conflicting chain data rather than unavailability
    pub fn is_integrity_failure(&self) -> bool {
        self.kind() == ErrorKind::IntegrityMismatch
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_mismatch_is_integrity_failure() {
        let err = RelayError::RootMismatch {
            chain_id: 1,
            batch_number: 7,
            expected: B256::repeat_byte(0x11),
            observed: B256::repeat_byte(0x22),
        };
        assert!(err.is_integrity_failure());

        let msg = err.to_string();
        assert!(msg.contains("batch 7"));
        assert!(msg.contains(&format!("{}", B256::repeat_byte(0x11))));
        assert!(msg.contains(&format!("{}", B256::repeat_byte(0x22))));
    }

    #[test]
    fn test_error_kinds() {
        let timeout = RelayError::RootUnavailable {
            chain_id: 1,
            batch_number: 2,
            elapsed: Duration::from_secs(3),
        };
        assert_eq!(timeout.kind(), ErrorKind::Timeout);
        assert_eq!(
            RelayError::Config("PRIVATE_KEY required".into()).kind(),
            ErrorKind::Config
        );
        assert_eq!(
            RelayError::MissingArtifact("InteropBundleSent".into()).kind(),
            ErrorKind::MissingArtifact
        );
        assert_eq!(
            RelayError::endpoint("send bundle", eyre::eyre!("connection refused")).kind(),
            ErrorKind::Endpoint
        );
    }

    #[test]
    fn test_endpoint_error_display_includes_report() {
        let err = RelayError::endpoint("execute bundle", eyre::eyre!("nonce too low"));
        assert_eq!(
            err.to_string(),
            "endpoint request failed during execute bundle: nonce too low"
        );
    }
}
