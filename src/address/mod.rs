//! Address encoding and decoding
//!
//! # Examples
//!
//! Encode a compressed public key as a pay-to-public-key-hash address:
//!
//! ```rust
//! use lightwallet::address::pubkey_to_address;
//! use lightwallet::network::Network;
//!
//! let pubkey = [2; 33];
//! let addr = pubkey_to_address(&pubkey, Network::Mainnet);
//! ```
//!
//! Extract the hash and address type from a base-58 address:
//!
//! ```rust
//! use lightwallet::address::addr_decode;
//! use lightwallet::network::Network;
//!
//! let addr = "15wpV72HRpAFPMmosR3jvGq7axU7t6ghX5";
//! let (hash, addr_type) = addr_decode(&addr, Network::Mainnet).unwrap();
//! ```
use crate::network::Network;
use crate::script::Script;
use crate::util::{base58check_decode, base58check_encode, hash160, Error, Hash160, Result};

/// Address type which is either P2PKH or P2SH
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressType {
    /// Pay-to-public-key-hash address
    P2PKH,
    /// Pay-to-script-hash address
    P2SH,
}

/// Converts a 160-bit hash to its base-58 address
pub fn addr_encode(hash160: &Hash160, addr_type: AddressType, network: Network) -> String {
    let mut v = Vec::with_capacity(1 + hash160.0.len());
    v.push(match addr_type {
        AddressType::P2PKH => network.addr_pubkeyhash_flag(),
        AddressType::P2SH => network.addr_script_flag(),
    });
    v.extend_from_slice(&hash160.0);
    base58check_encode(&v)
}

/// Decodes a base-58 address to its 160-bit hash
pub fn addr_decode(input: &str, network: Network) -> Result<(Hash160, AddressType)> {
    let v = base58check_decode(input)?;
    if v.len() != 21 {
        let msg = format!("Address payload must be 21 bytes, got {}", v.len());
        return Err(Error::BadData(msg));
    }

    let addr_type = if v[0] == network.addr_pubkeyhash_flag() {
        AddressType::P2PKH
    } else if v[0] == network.addr_script_flag() {
        AddressType::P2SH
    } else {
        let msg = format!("Unknown address type {}", v[0]);
        return Err(Error::BadData(msg));
    };

    let mut hash = [0; 20];
    hash.clone_from_slice(&v[1..]);
    Ok((Hash160(hash), addr_type))
}

/// Pay-to-public-key-hash address of a serialized public key
pub fn pubkey_to_address(pubkey: &[u8], network: Network) -> String {
    addr_encode(&hash160(pubkey), AddressType::P2PKH, network)
}

/// Pay-to-script-hash address of a redeem script
pub fn script_to_address(script: &Script, network: Network) -> String {
    addr_encode(&hash160(&script.0), AddressType::P2SH, network)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex;

    #[test]
    fn to_addr() {
        let pubkey_hex = "04005937fd439b3c19014d5f328df8c7ed514eaaf41c1980b8aeab461dffb23fbf3317e42395db24a52ce9fc947d9c22f54dc3217c8b11dfc7a09c59e0dca591d3";
        let pubkey = hex::decode(pubkey_hex).unwrap();
        assert!(pubkey_to_address(&pubkey, Network::Mainnet) == "1NM2HFXin4cEQRBLjkNZAS98qLX9JKzjKn");
    }

    #[test]
    fn from_addr() {
        let (hash, addr_type) =
            addr_decode("1NM2HFXin4cEQRBLjkNZAS98qLX9JKzjKn", Network::Mainnet).unwrap();
        assert!(addr_type == AddressType::P2PKH);
        assert!(hex::encode(hash.0) == "ea2407829a5055466b27784cde8cf463167946bf");
    }

    #[test]
    fn script_addr() {
        let script = Script(vec![0x51, 0xae]);
        let addr = script_to_address(&script, Network::Mainnet);
        assert!(addr.starts_with('3'));
        let (hash, addr_type) = addr_decode(&addr, Network::Mainnet).unwrap();
        assert!(addr_type == AddressType::P2SH);
        assert!(hash == hash160(&script.0));
    }

    #[test]
    fn from_addr_errors() {
        assert!(addr_decode("0", Network::Mainnet).is_err());
        assert!(addr_decode("1000000000000000000000000000000000", Network::Mainnet).is_err());
        assert!(addr_decode("1NM2HFXin4cEQRBLjkNZAS98qLX9JKzjKn", Network::Testnet).is_err());
    }
}
