//! Canonical bundle codec
//!
//! A bundle is encoded as `abi.encode(InteropBundle)`. The source commits to
//! `BUNDLE_IDENTIFIER ‖ abi.encode(bundle)` as its L2→L1 message, and the
//! destination re-derives the same bytes from the emitted event, so the codec
//! must be deterministic and must reject anything it would not re-encode to
//! identical bytes.

use alloy::primitives::{Address, Bytes, FixedBytes, B256, U256};
use alloy::sol_types::SolValue;

use crate::contracts;
use crate::error::RelayError;
use crate::hash::message_hash;

/// Only bundle format this codec understands
pub const BUNDLE_VERSION: u8 = 0x01;

/// Only call format this codec understands
pub const CALL_VERSION: u8 = 0x01;

/// Prefix of every bundle's L2→L1 message
pub const BUNDLE_IDENTIFIER: u8 = 0x01;

/// A transported bundle of calls
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageBundle {
    pub version: u8,
    pub source_chain_id: U256,
    pub destination_chain_id: U256,
    /// Per-bundle uniqueness token
    pub salt: B256,
    pub calls: Vec<BundleCall>,
    pub attributes: BundleAttributes,
}

/// One call inside a bundle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleCall {
    pub version: u8,
    /// Execute through the sender's shadow account on the destination
    pub shadow_account: bool,
    pub to: Address,
    pub from: Address,
    pub value: U256,
    pub data: Bytes,
}

/// Who may execute or unbundle the bundle on the destination.
///
/// Empty bytes mean "anyone".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BundleAttributes {
    pub execution_address: Bytes,
    pub unbundler_address: Bytes,
}

impl MessageBundle {
    /// Canonical ABI bytes of this bundle
    pub fn encode(&self) -> Bytes {
        encode(self)
    }

    /// The L2→L1 message this bundle is committed as
    pub fn l2_message_data(&self) -> Bytes {
        let encoded = encode(self);
        let mut data = Vec::with_capacity(1 + encoded.len());
        data.push(BUNDLE_IDENTIFIER);
        data.extend_from_slice(&encoded);
        data.into()
    }

    /// Messenger hash of [`Self::l2_message_data`]
    pub fn message_hash(&self) -> B256 {
        message_hash(&self.l2_message_data())
    }
}

/// Encode a bundle to its canonical bytes
pub fn encode(bundle: &MessageBundle) -> Bytes {
    contracts::InteropBundle::from(bundle).abi_encode().into()
}

/// Decode canonical bundle bytes.
///
/// Rejects unknown bundle or call versions, malformed ABI, and any input that
/// does not re-encode byte-identically.
pub fn decode(data: &[u8]) -> Result<MessageBundle, RelayError> {
    let raw = <contracts::InteropBundle as SolValue>::abi_decode(data, true)?;
    let bundle = MessageBundle::try_from(raw)?;

    if encode(&bundle).as_ref() != data {
        return Err(RelayError::NonCanonicalEncoding);
    }
    Ok(bundle)
}

// ============================================================================
// ABI conversions
// ============================================================================

impl From<&MessageBundle> for contracts::InteropBundle {
    fn from(bundle: &MessageBundle) -> Self {
        Self {
            version: FixedBytes([bundle.version]),
            sourceChainId: bundle.source_chain_id,
            destinationChainId: bundle.destination_chain_id,
            interopBundleSalt: bundle.salt,
            calls: bundle.calls.iter().map(contracts::InteropCall::from).collect(),
            bundleAttributes: contracts::BundleAttributes {
                executionAddress: bundle.attributes.execution_address.clone(),
                unbundlerAddress: bundle.attributes.unbundler_address.clone(),
            },
        }
    }
}

impl From<&BundleCall> for contracts::InteropCall {
    fn from(call: &BundleCall) -> Self {
        Self {
            version: FixedBytes([call.version]),
            shadowAccount: call.shadow_account,
            to: call.to,
            from: call.from,
            value: call.value,
            data: call.data.clone(),
        }
    }
}

impl TryFrom<contracts::InteropBundle> for MessageBundle {
    type Error = RelayError;

    fn try_from(raw: contracts::InteropBundle) -> Result<Self, Self::Error> {
        let version = raw.version.0[0];
        if version != BUNDLE_VERSION {
            return Err(RelayError::UnsupportedVersion {
                what: "bundle",
                found: version,
            });
        }

        let calls = raw
            .calls
            .into_iter()
            .map(BundleCall::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            version,
            source_chain_id: raw.sourceChainId,
            destination_chain_id: raw.destinationChainId,
            salt: raw.interopBundleSalt,
            calls,
            attributes: BundleAttributes {
                execution_address: raw.bundleAttributes.executionAddress,
                unbundler_address: raw.bundleAttributes.unbundlerAddress,
            },
        })
    }
}

impl TryFrom<contracts::InteropCall> for BundleCall {
    type Error = RelayError;

    fn try_from(raw: contracts::InteropCall) -> Result<Self, Self::Error> {
        let version = raw.version.0[0];
        if version != CALL_VERSION {
            return Err(RelayError::UnsupportedVersion {
                what: "call",
                found: version,
            });
        }
        Ok(Self {
            version,
            shadow_account: raw.shadowAccount,
            to: raw.to,
            from: raw.from,
            value: raw.value,
            data: raw.data,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address_codec::{encode_interoperable_address, InteroperableAddress};
    use crate::contracts::InteropCenter::InteropBundleSent;
    use crate::testing::fixtures::{bundle_sent_log, greeting_bundle};
    use alloy::sol_types::SolEvent;

    #[test]
    fn test_round_trip() {
        let bundle = greeting_bundle();
        let decoded = decode(&encode(&bundle)).unwrap();
        assert_eq!(decoded, bundle);
    }

    #[test]
    fn test_round_trip_empty_calls_and_attributes() {
        let bundle = MessageBundle {
            version: BUNDLE_VERSION,
            source_chain_id: U256::from(270u64),
            destination_chain_id: U256::from(271u64),
            salt: B256::ZERO,
            calls: vec![],
            attributes: BundleAttributes::default(),
        };
        assert_eq!(decode(&bundle.encode()).unwrap(), bundle);
    }

    fn call(to: u8, value: u64, shadow_account: bool, data: &[u8]) -> BundleCall {
        BundleCall {
            version: CALL_VERSION,
            shadow_account,
            to: Address::repeat_byte(to),
            from: Address::repeat_byte(0x0b),
            value: U256::from(value),
            data: Bytes::copy_from_slice(data),
        }
    }

    fn bundle_with(calls: Vec<BundleCall>, attributes: BundleAttributes) -> MessageBundle {
        MessageBundle {
            version: BUNDLE_VERSION,
            source_chain_id: U256::from(270u64),
            destination_chain_id: U256::from(271u64),
            salt: B256::repeat_byte(0x5a),
            calls,
            attributes,
        }
    }

    fn attributes() -> BundleAttributes {
        BundleAttributes {
            execution_address: InteroperableAddress::qualified(271, Address::repeat_byte(0xe1))
                .to_bytes(),
            unbundler_address: encode_interoperable_address(None, Some(Address::repeat_byte(0xe2))),
        }
    }

    #[test]
    fn test_round_trip_bundle_shapes() {
        let cases = vec![
            (
                "multiple calls",
                bundle_with(
                    vec![
                        call(0xa1, 0, false, &[0x01, 0x02]),
                        call(0xa2, 0, false, &[]),
                        call(0xa3, 0, false, &[0xff; 70]),
                    ],
                    BundleAttributes::default(),
                ),
            ),
            (
                "shadow account",
                bundle_with(vec![call(0xa1, 0, true, &[0x01])], BundleAttributes::default()),
            ),
            (
                "value transfer",
                bundle_with(
                    vec![call(0xa1, 1_000_000_000_000_000_000, false, &[])],
                    BundleAttributes::default(),
                ),
            ),
            (
                "execution and unbundler attributes",
                bundle_with(vec![call(0xa1, 0, false, &[0x01])], attributes()),
            ),
            (
                "everything at once",
                bundle_with(
                    vec![
                        call(0xa1, 7, true, &[0x01, 0x02, 0x03]),
                        call(0xa2, 0, false, &[]),
                    ],
                    attributes(),
                ),
            ),
        ];

        for (name, bundle) in cases {
            let encoded = encode(&bundle);
            let decoded = decode(&encoded).unwrap_or_else(|e| panic!("{}: {}", name, e));
            assert_eq!(decoded, bundle, "{}", name);
            assert_eq!(encode(&decoded), encoded, "{}", name);
        }
    }

    #[test]
    fn test_event_payload_re_encodes_identically() {
        let bundle = bundle_with(
            vec![
                call(0xa1, 5, true, &[0xca, 0xfe]),
                call(0xa2, 0, false, &[]),
            ],
            attributes(),
        );
        let log = bundle_sent_log(&bundle);
        let event = InteropBundleSent::decode_log_data(&log.data, true).unwrap();
        let payload = event.interopBundle.abi_encode();

        let decoded = decode(&payload).unwrap();
        assert_eq!(decoded, bundle);
        assert_eq!(encode(&decoded).as_ref(), payload.as_slice());
    }

    #[test]
    fn test_encoding_is_deterministic() {
        let bundle = greeting_bundle();
        assert_eq!(encode(&bundle), encode(&bundle.clone()));
    }

    #[test]
    fn test_encode_matches_solidity_abi_encode() {
        // abi.encode of a dynamic struct starts with the offset of the tuple
        let encoded = greeting_bundle().encode();
        assert_eq!(encoded.len() % 32, 0);
        assert_eq!(U256::from_be_slice(&encoded[..32]), U256::from(32u64));
        // version is left-aligned bytes1 in the first tuple word
        assert_eq!(encoded[32], BUNDLE_VERSION);
        assert!(encoded[33..64].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_decode_rejects_unknown_bundle_version() {
        let mut bundle = greeting_bundle();
        bundle.version = 0x02;
        let err = decode(&bundle.encode()).unwrap_err();
        assert!(matches!(
            err,
            RelayError::UnsupportedVersion {
                what: "bundle",
                found: 0x02
            }
        ));
    }

    #[test]
    fn test_decode_rejects_unknown_call_version() {
        let mut bundle = greeting_bundle();
        bundle.calls[0].version = 0x07;
        let err = decode(&bundle.encode()).unwrap_err();
        assert!(matches!(
            err,
            RelayError::UnsupportedVersion {
                what: "call",
                found: 0x07
            }
        ));
    }

    #[test]
    fn test_decode_rejects_garbage() {
        let err = decode(&[0xde, 0xad, 0xbe, 0xef]).unwrap_err();
        assert!(matches!(err, RelayError::Codec(_)));
    }

    #[test]
    fn test_decode_rejects_trailing_bytes() {
        let mut data = greeting_bundle().encode().to_vec();
        data.extend_from_slice(&[0u8; 32]);
        assert!(decode(&data).is_err());
    }

    #[test]
    fn test_l2_message_data_is_prefixed() {
        let bundle = greeting_bundle();
        let data = bundle.l2_message_data();
        assert_eq!(data[0], BUNDLE_IDENTIFIER);
        assert_eq!(&data[1..], bundle.encode().as_ref());
        assert_eq!(bundle.message_hash(), alloy::primitives::keccak256(&data));
    }
}
