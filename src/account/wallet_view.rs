use crate::account::Chain;
use crate::util::{Error, Result};
use crate::wallet::{pw_decode, pw_encode, ExtendedKey, ExtendedKeyType};
use std::collections::HashSet;

/// Number of trailing unused receiving addresses kept by default
pub const DEFAULT_GAP_LIMIT: usize = 20;

/// Number of trailing unused change addresses kept by default
pub const DEFAULT_GAP_LIMIT_FOR_CHANGE: usize = 6;

/// The parts of a wallet that accounts consult
pub trait WalletView {
    /// Number of trailing unused addresses a chain must end with
    fn gap_limit(&self, chain: Chain) -> usize;

    /// Whether the address has ever received funds
    fn is_address_used(&self, address: &str) -> bool;

    /// Called for every address an account creates while synchronizing
    fn register_address(&mut self, address: &str);

    /// Master private keys whose public form equals `xpub`
    ///
    /// Returns an empty list for watch-only keys.
    fn get_master_private_key(
        &self,
        xpub: &ExtendedKey,
        password: Option<&str>,
    ) -> Result<Vec<ExtendedKey>>;
}

/// Wallet state held in memory
#[derive(Debug, Clone)]
pub struct MemoryWallet {
    pub gap_limit: usize,
    pub gap_limit_for_change: usize,
    used: HashSet<String>,
    registered: Vec<String>,
    /// Master public key and its password-encoded private key
    master_keys: Vec<(ExtendedKey, String)>,
}

impl MemoryWallet {
    pub fn new(gap_limit: usize, gap_limit_for_change: usize) -> MemoryWallet {
        MemoryWallet {
            gap_limit,
            gap_limit_for_change,
            used: HashSet::new(),
            registered: Vec::new(),
            master_keys: Vec::new(),
        }
    }

    /// Records that an address has received funds
    pub fn mark_used(&mut self, address: &str) {
        self.used.insert(address.to_string());
    }

    /// Addresses registered by accounts, in order
    pub fn registered(&self) -> &[String] {
        &self.registered
    }

    /// Stores a master private key encrypted under the password
    pub fn add_master_private_key(
        &mut self,
        xprv: &ExtendedKey,
        password: Option<&str>,
    ) -> Result<()> {
        if xprv.key_type()? != ExtendedKeyType::Private {
            let msg = "Master key must be private".to_string();
            return Err(Error::BadArgument(msg));
        }
        let encoded = pw_encode(&xprv.encode(), password)?;
        self.master_keys.push((xprv.extended_public_key()?, encoded));
        Ok(())
    }
}

impl Default for MemoryWallet {
    fn default() -> MemoryWallet {
        MemoryWallet::new(DEFAULT_GAP_LIMIT, DEFAULT_GAP_LIMIT_FOR_CHANGE)
    }
}

impl WalletView for MemoryWallet {
    fn gap_limit(&self, chain: Chain) -> usize {
        match chain {
            Chain::Receiving => self.gap_limit,
            Chain::Change => self.gap_limit_for_change,
        }
    }

    fn is_address_used(&self, address: &str) -> bool {
        self.used.contains(address)
    }

    fn register_address(&mut self, address: &str) {
        self.registered.push(address.to_string());
    }

    fn get_master_private_key(
        &self,
        xpub: &ExtendedKey,
        password: Option<&str>,
    ) -> Result<Vec<ExtendedKey>> {
        let mut keys = Vec::new();
        for (master_xpub, encoded) in self.master_keys.iter() {
            if master_xpub != xpub {
                continue;
            }
            let decoded = pw_decode(encoded, password)?;
            let xprv = ExtendedKey::decode(&decoded).map_err(|_| Error::InvalidPassword)?;
            keys.push(xprv);
        }
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::Network;

    #[test]
    fn gap_limits() {
        let wallet = MemoryWallet::new(5, 2);
        assert!(wallet.gap_limit(Chain::Receiving) == 5);
        assert!(wallet.gap_limit(Chain::Change) == 2);
        assert!(MemoryWallet::default().gap_limit(Chain::Receiving) == DEFAULT_GAP_LIMIT);
    }

    #[test]
    fn master_key_lookup() {
        let xprv = ExtendedKey::from_seed(&[9; 32], Network::Mainnet).unwrap();
        let xpub = xprv.extended_public_key().unwrap();
        let other = ExtendedKey::from_seed(&[8; 32], Network::Mainnet).unwrap();

        let mut wallet = MemoryWallet::default();
        wallet.add_master_private_key(&xprv, Some("pw")).unwrap();
        assert!(wallet.add_master_private_key(&xpub, Some("pw")).is_err());

        let keys = wallet.get_master_private_key(&xpub, Some("pw")).unwrap();
        assert!(keys == vec![xprv]);
        let none = wallet.get_master_private_key(&other.extended_public_key().unwrap(), Some("pw"));
        assert!(none.unwrap().is_empty());
        match wallet.get_master_private_key(&xpub, Some("wrong")) {
            Err(Error::InvalidPassword) => {}
            _ => panic!("Expected InvalidPassword"),
        }
    }

    #[test]
    fn used_and_registered() {
        let mut wallet = MemoryWallet::default();
        wallet.mark_used("a");
        assert!(wallet.is_address_used("a"));
        assert!(!wallet.is_address_used("b"));
        wallet.register_address("b");
        assert!(wallet.registered() == ["b".to_string()]);
    }
}
