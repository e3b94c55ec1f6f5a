//! Wallet accounts and address discovery
//!
//! Every account kind keeps two append-only chains of public keys and the
//! addresses computed from them, one for receiving and one for change. The
//! kinds differ only in how new keys are produced and how keys map to an
//! address.
//!
//! # Examples
//!
//! Load an HD account from its persisted form and discover addresses:
//!
//! ```no_run, rust
//! use lightwallet::account::{load_account, AccountConfig, Chain, MemoryWallet};
//! use lightwallet::network::Network;
//!
//! let config = AccountConfig::from_json(r#"{"xpub": "xpub661MyMwAqRbcFtXgS5sYJABqqG9YLmC4Q1Rdap9gSE8NqtwybGhePY2gZ29ESFjqJoCu1Rupje8YtGqsefD265TMg7usUDFdp6W1EGMcet8"}"#).unwrap();
//! let mut account = load_account(&config, Network::Mainnet).unwrap();
//!
//! let mut wallet = MemoryWallet::default();
//! account.synchronize(&mut wallet).unwrap();
//! let receiving = account.get_addresses(Chain::Receiving);
//! ```

mod base;
mod chains;
mod config;
mod hd;
mod imported;
mod multisig;
mod sync;
mod wallet_view;

pub use self::base::BaseAccount;
pub use self::chains::{AddressChain, AddressChains};
pub use self::config::{AccountConfig, StoredPubkeys};
pub use self::hd::{parse_xpubkey, xpubkey_encode, HdAccount};
pub use self::imported::ImportedAccount;
pub use self::multisig::MultisigAccount;
pub use self::sync::synchronize_chain;
pub use self::wallet_view::{
    MemoryWallet, WalletView, DEFAULT_GAP_LIMIT, DEFAULT_GAP_LIMIT_FOR_CHANGE,
};

use crate::address::pubkey_to_address;
use crate::network::Network;
use crate::script::Script;
use crate::util::{Error, Result};
use crate::wallet::{PrivateKey, HARDENED_KEY};
use hex;

/// Public keys backing a single address
///
/// One key for single-signature accounts, one per cosigner for multisig.
pub type PubkeySet = Vec<Vec<u8>>;

/// Derivation branch of an account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Chain {
    Receiving = 0,
    Change = 1,
}

impl Chain {
    /// Both chains, receiving first
    pub const ALL: [Chain; 2] = [Chain::Receiving, Chain::Change];

    /// Index used as the first step of derivation
    pub fn index(self) -> u32 {
        self as u32
    }

    /// Converts a derivation index back into a chain
    pub fn from_index(i: u32) -> Result<Chain> {
        match i {
            0 => Ok(Chain::Receiving),
            1 => Ok(Chain::Change),
            _ => Err(Error::BadArgument(format!("Unknown chain {}", i))),
        }
    }
}

/// Capabilities shared by every account kind
pub trait Account {
    /// Stored public keys and addresses
    fn chains(&self) -> &AddressChains;

    /// Mutable access to the stored chains
    fn chains_mut(&mut self) -> &mut AddressChains;

    /// Network used to encode addresses
    fn network(&self) -> Network;

    /// Computes the public keys at a position without storing them
    fn derive_pubkeys(&self, chain: Chain, n: usize) -> Result<PubkeySet>;

    /// Maps public keys to the address that pays them
    fn pubkeys_to_address(&self, pubkeys: &PubkeySet) -> Result<String> {
        match pubkeys.as_slice() {
            [pubkey] => Ok(pubkey_to_address(pubkey, self.network())),
            _ => {
                let msg = format!("Expected one public key, got {}", pubkeys.len());
                Err(Error::BadArgument(msg))
            }
        }
    }

    /// Gets the stored public keys at a position
    fn get_pubkeys(&self, chain: Chain, n: usize) -> Result<PubkeySet> {
        Ok(self.chains().get(chain).pubkeys(n)?.clone())
    }

    /// Gets the first stored public key at a position
    fn get_pubkey(&self, chain: Chain, n: usize) -> Result<Vec<u8>> {
        match self.chains().get(chain).pubkeys(n)?.first() {
            Some(pubkey) => Ok(pubkey.clone()),
            None => Err(Error::IllegalState(format!("No public key at {}", n))),
        }
    }

    /// Gets the stored address at a position
    fn get_address(&self, chain: Chain, n: usize) -> Result<String> {
        Ok(self.chains().get(chain).address(n)?.to_string())
    }

    /// Copies every address on a chain in order
    fn get_addresses(&self, chain: Chain) -> Vec<String> {
        self.chains().get(chain).addresses().to_vec()
    }

    /// Derives the next position on a chain, stores it, and returns its address
    ///
    /// Nothing is stored if derivation fails.
    fn create_new_address(&mut self, chain: Chain) -> Result<String> {
        let n = self.chains().get(chain).len();
        let pubkeys = self.derive_pubkeys(chain, n)?;
        let address = self.pubkeys_to_address(&pubkeys)?;
        self.chains_mut().get_mut(chain).push(pubkeys, address.clone());
        Ok(address)
    }

    /// Extends both chains until each ends in a run of unused addresses
    fn synchronize(&mut self, wallet: &mut dyn WalletView) -> Result<()> {
        for chain in Chain::ALL.iter() {
            synchronize_chain(&mut *self, &mut *wallet, *chain)?;
        }
        Ok(())
    }

    /// Whether any receiving address has been used
    fn is_used(&self, wallet: &dyn WalletView) -> bool {
        let chain = self.chains().get(Chain::Receiving);
        chain.addresses().iter().any(|a| wallet.is_address_used(a))
    }

    fn has_change(&self) -> bool {
        true
    }

    /// Script revealed when spending from the address, if it is script-hashed
    fn redeem_script(&self, _chain: Chain, _n: usize) -> Result<Option<Script>> {
        Ok(None)
    }

    /// Extended public keys this account derives from
    fn get_master_pubkeys(&self) -> Vec<String> {
        Vec::new()
    }

    /// Public key descriptors to embed in unsigned transactions
    fn get_xpubkeys(&self, chain: Chain, n: usize) -> Result<Vec<String>> {
        Ok(self.get_pubkeys(chain, n)?.iter().map(hex::encode).collect())
    }

    /// Recovers the private keys for a position
    ///
    /// Accounts without key material return an empty list.
    fn get_private_key(
        &self,
        _chain: Chain,
        _n: usize,
        _wallet: &dyn WalletView,
        _password: Option<&str>,
    ) -> Result<Vec<PrivateKey>> {
        Ok(Vec::new())
    }

    fn get_type(&self) -> String;

    fn get_name(&self, _k: &str) -> String {
        "Main account".to_string()
    }

    /// Persisted form of the account
    fn dump(&self) -> AccountConfig;
}

/// Builds the account kind described by a persisted configuration
pub fn load_account(config: &AccountConfig, network: Network) -> Result<Box<dyn Account>> {
    if config.imported.is_some() {
        Ok(Box::new(ImportedAccount::from_config(config, network)?))
    } else if config.xpubs.is_some() {
        Ok(Box::new(MultisigAccount::from_config(config, network)?))
    } else if config.xpub.is_some() {
        Ok(Box::new(HdAccount::from_config(config, network)?))
    } else {
        Ok(Box::new(BaseAccount::from_config(config, network)?))
    }
}

/// Converts a chain position into a non-hardened derivation index
pub(crate) fn child_index(n: usize) -> Result<u32> {
    if n >= HARDENED_KEY as usize {
        return Err(Error::BadArgument(format!("Index {} too large", n)));
    }
    Ok(n as u32)
}
