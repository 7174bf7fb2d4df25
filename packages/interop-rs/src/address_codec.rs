//! Interoperable Address Codec (ERC-7930)
//!
//! `sendBundle` identifies the destination chain, call targets and bundle
//! permissions with ERC-7930 binary addresses:
//!
//! ```text
//! | version (2) | chain type (2) | ref len (1) | chain ref | addr len (1) | address |
//! ```
//!
//! Only the EIP-155 chain type is supported. The chain reference is the chain
//! id as minimal big-endian bytes; either part may be empty.

use alloy::primitives::{Address, Bytes};
use eyre::{eyre, Result};
use std::fmt;

/// ERC-7930 format version
pub const INTEROPERABLE_ADDRESS_VERSION: [u8; 2] = [0x00, 0x01];

/// EIP-155 chain namespace
pub const CHAIN_TYPE_EIP155: [u8; 2] = [0x00, 0x00];

/// A decoded interoperable address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InteroperableAddress {
    /// EIP-155 chain id, if the address is chain-qualified
    pub chain_id: Option<u64>,
    /// Account on that chain, if present
    pub address: Option<Address>,
}

impl InteroperableAddress {
    /// A chain-only address (e.g. `sendBundle` destination)
    pub fn chain(chain_id: u64) -> Self {
        Self {
            chain_id: Some(chain_id),
            address: None,
        }
    }

    /// An address-only value (e.g. a call target on the destination)
    pub fn account(address: Address) -> Self {
        Self {
            chain_id: None,
            address: Some(address),
        }
    }

    /// An account qualified by its chain
    pub fn qualified(chain_id: u64, address: Address) -> Self {
        Self {
            chain_id: Some(chain_id),
            address: Some(address),
        }
    }

    /// Encode to ERC-7930 bytes
    pub fn to_bytes(&self) -> Bytes {
        encode_interoperable_address(self.chain_id, self.address)
    }
}

impl fmt::Display for InteroperableAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.chain_id, self.address) {
            (Some(chain), Some(addr)) => write!(f, "{}@eip155:{}", addr, chain),
            (Some(chain), None) => write!(f, "@eip155:{}", chain),
            (None, Some(addr)) => write!(f, "{}", addr),
            (None, None) => write!(f, "<empty>"),
        }
    }
}

/// Encode an ERC-7930 interoperable address
pub fn encode_interoperable_address(chain_id: Option<u64>, address: Option<Address>) -> Bytes {
    let chain_ref = chain_id.map(chain_reference).unwrap_or_default();
    let addr: &[u8] = address.as_ref().map(|a| a.as_slice()).unwrap_or_default();

    let mut out = Vec::with_capacity(6 + chain_ref.len() + addr.len());
    out.extend_from_slice(&INTEROPERABLE_ADDRESS_VERSION);
    out.extend_from_slice(&CHAIN_TYPE_EIP155);
    out.push(chain_ref.len() as u8);
    out.extend_from_slice(&chain_ref);
    out.push(addr.len() as u8);
    out.extend_from_slice(addr);
    out.into()
}

/// Decode an ERC-7930 interoperable address
pub fn decode_interoperable_address(bytes: &[u8]) -> Result<InteroperableAddress> {
    if bytes.len() < 6 {
        return Err(eyre!(
            "Interoperable address too short: {} bytes",
            bytes.len()
        ));
    }
    if bytes[0..2] != INTEROPERABLE_ADDRESS_VERSION {
        return Err(eyre!(
            "Unsupported interoperable address version: 0x{}",
            hex::encode(&bytes[0..2])
        ));
    }
    if bytes[2..4] != CHAIN_TYPE_EIP155 {
        return Err(eyre!(
            "Unsupported chain type: 0x{}",
            hex::encode(&bytes[2..4])
        ));
    }

    let ref_len = bytes[4] as usize;
    let addr_len_pos = 5 + ref_len;
    if bytes.len() <= addr_len_pos {
        return Err(eyre!("Truncated chain reference"));
    }
    let chain_ref = &bytes[5..addr_len_pos];
    let addr_len = bytes[addr_len_pos] as usize;
    let addr_bytes = &bytes[addr_len_pos + 1..];
    if addr_bytes.len() != addr_len {
        return Err(eyre!(
            "Address length mismatch: header says {}, got {}",
            addr_len,
            addr_bytes.len()
        ));
    }

    let chain_id = if chain_ref.is_empty() {
        None
    } else {
        if chain_ref.len() > 8 {
            return Err(eyre!("Chain reference exceeds u64: {} bytes", chain_ref.len()));
        }
        let mut padded = [0u8; 8];
        padded[8 - chain_ref.len()..].copy_from_slice(chain_ref);
        Some(u64::from_be_bytes(padded))
    };

    let address = match addr_len {
        0 => None,
        20 => Some(Address::from_slice(addr_bytes)),
        n => return Err(eyre!("EVM address must be 20 bytes, got {}", n)),
    };

    Ok(InteroperableAddress { chain_id, address })
}

/// Minimal big-endian bytes of a chain id
fn chain_reference(chain_id: u64) -> Vec<u8> {
    let bytes = chain_id.to_be_bytes();
    let first = bytes.iter().position(|b| *b != 0).unwrap_or(bytes.len() - 1);
    bytes[first..].to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_chain_only() {
        // chain 271 = 0x010f
        let encoded = encode_interoperable_address(Some(271), None);
        assert_eq!(hex::encode(&encoded), "0001000002010f00");
    }

    #[test]
    fn test_encode_address_only() {
        let addr = Address::repeat_byte(0x11);
        let encoded = encode_interoperable_address(None, Some(addr));
        assert_eq!(encoded.len(), 6 + 20);
        assert_eq!(&encoded[..6], &[0x00, 0x01, 0x00, 0x00, 0x00, 0x14]);
        assert_eq!(&encoded[6..], addr.as_slice());
    }

    #[test]
    fn test_chain_reference_is_minimal() {
        assert_eq!(chain_reference(1), vec![0x01]);
        assert_eq!(chain_reference(256), vec![0x01, 0x00]);
        assert_eq!(chain_reference(0), vec![0x00]);
    }

    #[test]
    fn test_decode_qualified() {
        let original = InteroperableAddress::qualified(324, Address::repeat_byte(0xab));
        let decoded = decode_interoperable_address(&original.to_bytes()).unwrap();
        assert_eq!(decoded, original);
        assert_eq!(
            decoded.to_string(),
            format!("{}@eip155:324", Address::repeat_byte(0xab))
        );
    }

    #[test]
    fn test_decode_rejects_bad_version() {
        let mut bytes = InteroperableAddress::chain(1).to_bytes().to_vec();
        bytes[1] = 0x02;
        assert!(decode_interoperable_address(&bytes).is_err());
    }

    #[test]
    fn test_decode_rejects_length_mismatch() {
        let mut bytes = InteroperableAddress::account(Address::ZERO).to_bytes().to_vec();
        bytes.pop();
        assert!(decode_interoperable_address(&bytes).is_err());
    }

    #[test]
    fn test_decode_rejects_short_input() {
        assert!(decode_interoperable_address(&[0x00, 0x01]).is_err());
    }
}
