//! # Contract Addresses
//!
//! Managers live at originated-contract addresses: `KT1`-prefixed
//! Base58Check strings wrapping a 20-byte hash.

use multibase::Base;
use sha2::{Digest, Sha256};

const CONTRACT_PREFIX: [u8; 3] = [2, 90, 121];
const HASH_LEN: usize = 20;
const CHECKSUM_LEN: usize = 4;

/// Returns `true` if `address` is a well-formed contract address.
#[must_use]
pub fn is_contract_address(address: &str) -> bool {
    if !address.starts_with("KT1") {
        return false;
    }
    let Ok((Base::Base58Btc, bytes)) = multibase::decode(format!("z{address}")) else {
        return false;
    };
    if bytes.len() != CONTRACT_PREFIX.len() + HASH_LEN + CHECKSUM_LEN
        || bytes[..CONTRACT_PREFIX.len()] != CONTRACT_PREFIX
    {
        return false;
    }

    let (payload, checksum) = bytes.split_at(bytes.len() - CHECKSUM_LEN);
    checksum == &double_sha256(payload)[..CHECKSUM_LEN]
}

/// Encode a 20-byte contract hash as a contract address.
#[must_use]
pub fn encode_contract(hash: &[u8; HASH_LEN]) -> String {
    let mut bytes = CONTRACT_PREFIX.to_vec();
    bytes.extend_from_slice(hash);
    let checksum = double_sha256(&bytes);
    bytes.extend_from_slice(&checksum[..CHECKSUM_LEN]);

    // drop the multibase code
    let encoded = multibase::encode(Base::Base58Btc, &bytes);
    encoded[1..].to_string()
}

fn double_sha256(data: &[u8]) -> [u8; 32] {
    Sha256::digest(Sha256::digest(data)).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encoded_is_valid() {
        for seed in 0..=255u8 {
            let address = encode_contract(&[seed; HASH_LEN]);
            assert!(address.starts_with("KT1"), "{address} should start with KT1");
            assert_eq!(address.len(), 36);
            assert!(is_contract_address(&address));
        }
    }

    #[test]
    fn checksum() {
        let address = encode_contract(&[7; HASH_LEN]);
        let last = address.chars().last().expect("not empty");
        let swapped = if last == 'a' { 'b' } else { 'a' };
        let tampered = format!("{}{swapped}", &address[..address.len() - 1]);
        assert!(!is_contract_address(&tampered));
    }

    #[test]
    fn not_a_contract() {
        assert!(!is_contract_address(""));
        assert!(!is_contract_address("KT1"));
        assert!(!is_contract_address("tz1VSUr8wwNhLAzempoch5d6hLRiTh8Cjcjb"));
        assert!(!is_contract_address("KT1 has spaces and 0OIl"));
    }
}
