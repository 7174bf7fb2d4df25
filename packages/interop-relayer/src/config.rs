//! Relayer configuration
//!
//! Everything is read from environment variables, optionally seeded from a
//! `.env` file. Missing or unparseable values fail at startup with
//! [`RelayError::Config`].

use alloy::primitives::{Address, Bytes, U256};
use interop_rs::evm::{EvmEndpointConfig, InteropContracts};
use interop_rs::polling::{DEFAULT_POLL_INTERVAL, DEFAULT_POLL_TIMEOUT};
use interop_rs::redact::Redacted;
use interop_rs::{ExecutionMode, OutboundCall, OutboundMessage, PollPolicy, RelayConfig, RelayError};
use std::env;
use std::fmt::Display;
use std::str::FromStr;
use tracing::debug;
use url::Url;

/// Complete relayer configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub source: EvmEndpointConfig,
    pub destination: EvmEndpointConfig,
    pub relay: RelayConfig,
    pub call: CallConfig,
}

/// The single call relayed to the destination
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallConfig {
    pub target: Address,
    pub calldata: Bytes,
    pub value: U256,
}

impl Config {
    /// Load configuration from environment variables
    /// Loads .env file if present, then reads from environment
    pub fn load() -> Result<Self, RelayError> {
        match dotenvy::dotenv() {
            Ok(path) => debug!(path = %path.display(), "Loaded .env file"),
            Err(e) if e.not_found() => {}
            Err(e) => return Err(RelayError::Config(format!("Failed to load .env file: {}", e))),
        }
        Self::from_env()
    }

    /// Read configuration from the current environment only
    pub fn from_env() -> Result<Self, RelayError> {
        let private_key = Redacted(required("PRIVATE_KEY")?);
        validate_private_key(private_key.expose())?;

        let contracts = InteropContracts {
            interop_center: optional("INTEROP_CENTER_ADDRESS")?
                .unwrap_or(InteropContracts::default().interop_center),
            interop_handler: optional("INTEROP_HANDLER_ADDRESS")?
                .unwrap_or(InteropContracts::default().interop_handler),
            root_storage: optional("INTEROP_ROOT_STORAGE_ADDRESS")?
                .unwrap_or(InteropContracts::default().root_storage),
            message_verification: optional("MESSAGE_VERIFICATION_ADDRESS")?
                .unwrap_or(InteropContracts::default().message_verification),
        };
        let gas_limit = optional::<u64>("GAS_LIMIT")?;
        let log_proof_mode = optional::<String>("LOG_PROOF_MODE")?;

        let endpoint = |rpc_url: Url| EvmEndpointConfig {
            rpc_url,
            private_key: Some(private_key.clone()),
            contracts,
            gas_limit,
            log_proof_mode: log_proof_mode.clone(),
        };
        let source = endpoint(parse("SOURCE_RPC_URL", &required("SOURCE_RPC_URL")?)?);
        let destination = endpoint(parse(
            "DESTINATION_RPC_URL",
            &required("DESTINATION_RPC_URL")?,
        )?);

        let interval_ms = optional("POLL_INTERVAL_MS")?
            .unwrap_or(DEFAULT_POLL_INTERVAL.as_millis() as u64);
        let policy = |timeout_var: &str| -> Result<PollPolicy, RelayError> {
            let timeout_secs = optional(timeout_var)?.unwrap_or(DEFAULT_POLL_TIMEOUT.as_secs());
            PollPolicy::from_millis_and_secs(interval_ms, timeout_secs)
        };
        let relay = RelayConfig {
            finality_policy: policy("FINALITY_TIMEOUT_SECS")?,
            proof_policy: policy("PROOF_TIMEOUT_SECS")?,
            root_policy: policy("ROOT_TIMEOUT_SECS")?,
            outbound_log_index: optional("OUTBOUND_LOG_INDEX")?.unwrap_or(0),
            mode: optional::<ExecutionMode>("EXECUTION_MODE")?.unwrap_or_default(),
        };

        let call = CallConfig {
            target: parse("RELAY_TARGET", &required("RELAY_TARGET")?)?,
            calldata: optional("RELAY_CALLDATA")?.unwrap_or_default(),
            value: optional("RELAY_VALUE")?.unwrap_or(U256::ZERO),
        };

        Ok(Config {
            source,
            destination,
            relay,
            call,
        })
    }

    /// The message to submit on the source chain
    pub fn outbound_message(&self, destination_chain_id: u64) -> OutboundMessage {
        OutboundMessage::single(
            destination_chain_id,
            OutboundCall {
                to: self.call.target,
                value: self.call.value,
                data: self.call.calldata.clone(),
            },
        )
    }
}

fn required(name: &str) -> Result<String, RelayError> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
        _ => Err(RelayError::Config(format!(
            "{} environment variable is required",
            name
        ))),
    }
}

/// Parse an optional variable; present but unparseable is an error
fn optional<T>(name: &str) -> Result<Option<T>, RelayError>
where
    T: FromStr,
    T::Err: Display,
{
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => parse(name, &value).map(Some),
        _ => Ok(None),
    }
}

fn parse<T>(name: &str, value: &str) -> Result<T, RelayError>
where
    T: FromStr,
    T::Err: Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| RelayError::Config(format!("{} is invalid: {}", name, e)))
}

fn validate_private_key(key: &str) -> Result<(), RelayError> {
    let hex_part = key.strip_prefix("0x").unwrap_or(key);
    if hex_part.len() != 64 || !hex_part.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(RelayError::Config(
            "PRIVATE_KEY must be 32 bytes of hex (optionally 0x-prefixed)".to_string(),
        ));
    }
    Ok(())
}
