//! Relay fixtures
//!
//! A sample "set greeting" bundle from chain 1 to chain 2 and a fully scripted
//! scenario in which it relays successfully.

use alloy::primitives::{address, b256, Address, Bytes, Log, B256, U256};
use alloy::sol;
use alloy::sol_types::{SolCall, SolEvent};

use crate::bundle::{BundleAttributes, BundleCall, MessageBundle, BUNDLE_VERSION, CALL_VERSION};
use crate::contracts::InteropCenter::InteropBundleSent;
use crate::contracts::{INTEROP_CENTER_ADDRESS, L1_MESSENGER_ADDRESS};
use crate::endpoint::{OutboundCall, OutboundMessage};
use crate::testing::MockEndpoint;
use crate::types::{LogProof, MessageReceipt, OutboundLog};

sol! {
    interface IGreeter {
        function setGreeting(string greeting) external;
    }
}

pub const SOURCE_CHAIN_ID: u64 = 1;
pub const DESTINATION_CHAIN_ID: u64 = 2;

/// Destination contract the sample bundle calls
pub const GREETER_ADDRESS: Address = address!("00000000000000000000000000000000000a11ce");

/// Account that sends the sample bundle
pub const SENDER_ADDRESS: Address = address!("0000000000000000000000000000000000000b0b");

pub const GREETING_SALT: B256 =
    b256!("abcabcabcabcabcabcabcabcabcabcabcabcabcabcabcabcabcabcabcabcabca");

pub const SEND_TX_HASH: B256 =
    b256!("5e5e5e5e5e5e5e5e5e5e5e5e5e5e5e5e5e5e5e5e5e5e5e5e5e5e5e5e5e5e5e5e");

/// Calldata for `setGreeting("hi")`
pub fn greeting_calldata() -> Bytes {
    IGreeter::setGreetingCall {
        greeting: "hi".to_string(),
    }
    .abi_encode()
    .into()
}

/// What a caller would hand the relay to produce [`greeting_bundle`]
pub fn greeting_message() -> OutboundMessage {
    OutboundMessage::single(
        DESTINATION_CHAIN_ID,
        OutboundCall {
            to: GREETER_ADDRESS,
            value: U256::ZERO,
            data: greeting_calldata(),
        },
    )
}

/// The bundle the interop center commits for [`greeting_message`]
pub fn greeting_bundle() -> MessageBundle {
    MessageBundle {
        version: BUNDLE_VERSION,
        source_chain_id: U256::from(SOURCE_CHAIN_ID),
        destination_chain_id: U256::from(DESTINATION_CHAIN_ID),
        salt: GREETING_SALT,
        calls: vec![BundleCall {
            version: CALL_VERSION,
            shadow_account: false,
            to: GREETER_ADDRESS,
            from: SENDER_ADDRESS,
            value: U256::ZERO,
            data: greeting_calldata(),
        }],
        attributes: BundleAttributes::default(),
    }
}

/// `InteropBundleSent` log as emitted by the default interop center
pub fn bundle_sent_log(bundle: &MessageBundle) -> Log {
    let event = InteropBundleSent {
        l2l1MsgHash: bundle.message_hash(),
        interopBundleHash: B256::repeat_byte(0xb0),
        interopBundle: bundle.into(),
    };
    Log {
        address: INTEROP_CENTER_ADDRESS,
        data: event.encode_log_data(),
    }
}

/// Outbound log carrying `bundle`'s message, sent by the default interop center
pub fn bundle_outbound_log(bundle: &MessageBundle, tx_index_in_l1_batch: Option<u64>) -> OutboundLog {
    OutboundLog {
        transaction_log_index: 0,
        tx_index_in_l1_batch,
        sender: L1_MESSENGER_ADDRESS,
        key: INTEROP_CENTER_ADDRESS.into_word(),
        value: bundle.message_hash(),
    }
}

/// A source and destination scripted so that a relay of
/// [`greeting_message`] completes on the first attempt of every wait
#[derive(Debug, Clone)]
pub struct Scenario {
    pub source: MockEndpoint,
    pub destination: MockEndpoint,
    pub bundle: MessageBundle,
    pub proof: LogProof,
    pub root: B256,
}

impl Scenario {
    pub fn greeting() -> Self {
        let bundle = greeting_bundle();
        let root = B256::repeat_byte(0x71);
        let proof = LogProof {
            batch_number: 7,
            id: 0,
            root,
            proof: vec![B256::repeat_byte(0x01), B256::repeat_byte(0x02)],
        };

        let sent = MessageReceipt {
            tx_hash: SEND_TX_HASH,
            block_number: 10,
            from: SENDER_ADDRESS,
            status: true,
            l1_batch_number: None,
            l1_batch_tx_index: None,
            logs: vec![bundle_sent_log(&bundle)],
            outbound_logs: vec![bundle_outbound_log(&bundle, None)],
        };
        let sealed = MessageReceipt {
            l1_batch_number: Some(7),
            l1_batch_tx_index: Some(3),
            outbound_logs: vec![bundle_outbound_log(&bundle, Some(3))],
            ..sent.clone()
        };

        let source = MockEndpoint::new(SOURCE_CHAIN_ID);
        source.set_send_receipt(sent);
        source.set_sealed_receipt(sealed);
        source.script_finalized([Ok(12)]);
        source.script_proofs([Ok(Some(proof.clone()))]);

        let destination = MockEndpoint::new(DESTINATION_CHAIN_ID);
        destination.script_roots([Ok(root)]);

        Self {
            source,
            destination,
            bundle,
            proof,
            root,
        }
    }
}
