use crate::address::pubkey_to_address;
use crate::network::Network;
use crate::util::{base58check_decode, base58check_encode, Error, Result};
use crate::wallet::extended_key::is_private_key_valid;
use secp256k1::{PublicKey, Secp256k1, SecretKey};
use std::fmt;

/// A secp256k1 secret key together with the public key form it signs for
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct PrivateKey {
    pub secret: [u8; 32],
    /// Whether the matching public key and address use the 33-byte form
    pub compressed: bool,
}

impl PrivateKey {
    /// Wraps a 32-byte secret, checking it is in range
    pub fn new(secret: &[u8], compressed: bool) -> Result<PrivateKey> {
        if !is_private_key_valid(secret) {
            return Err(Error::BadArgument("Private key out of range".to_string()));
        }
        let mut s = [0; 32];
        s.clone_from_slice(secret);
        Ok(PrivateKey { secret: s, compressed })
    }

    /// Serialized public key, compressed or not per the key's flag
    pub fn public_key(&self) -> Result<Vec<u8>> {
        let secp = Secp256k1::signing_only();
        let secret_key = SecretKey::from_slice(&self.secret)?;
        let public_key = PublicKey::from_secret_key(&secp, &secret_key);
        if self.compressed {
            Ok(public_key.serialize().to_vec())
        } else {
            Ok(public_key.serialize_uncompressed().to_vec())
        }
    }

    /// Pay-to-public-key-hash address this key spends from
    pub fn address(&self, network: Network) -> Result<String> {
        Ok(pubkey_to_address(&self.public_key()?, network))
    }

    /// Encodes in wallet import format
    pub fn to_wif(&self, network: Network) -> String {
        let mut v = Vec::with_capacity(34);
        v.push(network.wif_flag());
        v.extend_from_slice(&self.secret);
        if self.compressed {
            v.push(0x01);
        }
        base58check_encode(&v)
    }

    /// Decodes a wallet import format string
    pub fn from_wif(wif: &str) -> Result<(PrivateKey, Network)> {
        let v = base58check_decode(wif)?;
        let compressed = match v.len() {
            33 => false,
            34 if v[33] == 0x01 => true,
            _ => return Err(Error::BadData(format!("Bad WIF payload length {}", v.len()))),
        };
        let network = Network::from_wif_flag(v[0])?;
        Ok((PrivateKey::new(&v[1..33], compressed)?, network))
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "PrivateKey(compressed={})", self.compressed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex;

    const SECRET: &str = "0c28fca386c7a227600b2fe50b7cae11ec86d3bf1fbe471be89827e19d72aa1d";

    #[test]
    fn wif_vectors() {
        let secret = hex::decode(SECRET).unwrap();
        let uncompressed = PrivateKey::new(&secret, false).unwrap();
        assert!(uncompressed.to_wif(Network::Mainnet) == "5HueCGU8rMjxEXxiPuD5BDku4MkFqeZyd4dZ1jvhTVqvbTLvyTJ");
        let compressed = PrivateKey::new(&secret, true).unwrap();
        assert!(compressed.to_wif(Network::Mainnet) == "KwdMAjGmerYanjeui5SHS7JkmpZvVipYvB2LJGU1ZxJwYvP98617");

        let (decoded, network) = PrivateKey::from_wif("KwdMAjGmerYanjeui5SHS7JkmpZvVipYvB2LJGU1ZxJwYvP98617").unwrap();
        assert!(decoded == compressed);
        assert!(network == Network::Mainnet);
    }

    #[test]
    fn public_key_forms() {
        let secret = hex::decode(SECRET).unwrap();
        let k = PrivateKey::new(&secret, true).unwrap();
        assert!(k.public_key().unwrap().len() == 33);
        let k = PrivateKey::new(&secret, false).unwrap();
        assert!(k.public_key().unwrap().len() == 65);
        assert!(k.address(Network::Mainnet).unwrap().starts_with('1'));
    }

    #[test]
    fn invalid() {
        assert!(PrivateKey::new(&[0; 32], true).is_err());
        assert!(PrivateKey::new(&[1; 31], true).is_err());
        assert!(PrivateKey::from_wif("not a key").is_err());
        let testnet = PrivateKey::new(&[1; 32], true).unwrap().to_wif(Network::Testnet);
        assert!(PrivateKey::from_wif(&testnet).unwrap().1 == Network::Testnet);
    }
}
