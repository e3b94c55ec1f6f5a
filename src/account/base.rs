use crate::account::{Account, AccountConfig, AddressChains, Chain, PubkeySet};
use crate::address::pubkey_to_address;
use crate::network::Network;
use crate::util::{Error, Result};

/// Account holding a fixed list of stored keys
///
/// It has no way to produce new keys, so its chains only grow by loading.
#[derive(Debug, Clone)]
pub struct BaseAccount {
    chains: AddressChains,
    network: Network,
}

impl BaseAccount {
    pub fn new(network: Network) -> BaseAccount {
        BaseAccount {
            chains: AddressChains::default(),
            network,
        }
    }

    pub fn from_config(config: &AccountConfig, network: Network) -> Result<BaseAccount> {
        let chains = AddressChains::load(config.receiving(), config.change(), |pubkeys| {
            match pubkeys.as_slice() {
                [pubkey] => Ok(pubkey_to_address(pubkey, network)),
                _ => Err(Error::BadData("Expected one public key per address".to_string())),
            }
        })?;
        Ok(BaseAccount { chains, network })
    }
}

impl Account for BaseAccount {
    fn chains(&self) -> &AddressChains {
        &self.chains
    }

    fn chains_mut(&mut self) -> &mut AddressChains {
        &mut self.chains
    }

    fn network(&self) -> Network {
        self.network
    }

    fn derive_pubkeys(&self, _chain: Chain, _n: usize) -> Result<PubkeySet> {
        let msg = "Account has no key derivation".to_string();
        Err(Error::InvalidOperation(msg))
    }

    fn get_type(&self) -> String {
        "Standard".to_string()
    }

    fn dump(&self) -> AccountConfig {
        AccountConfig {
            receiving: Some(self.chains.dump(Chain::Receiving, false)),
            change: Some(self.chains.dump(Chain::Change, false)),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::MemoryWallet;

    const PUBKEY: &str = "0250863ad64a87ae8a2fe83c1af1a8403cb53f53e486d8511dad8a04887e5b2352";

    #[test]
    fn stored_keys() {
        let json = format!(r#"{{"receiving": ["{}"], "change": []}}"#, PUBKEY);
        let config = AccountConfig::from_json(&json).unwrap();
        let account = BaseAccount::from_config(&config, Network::Mainnet).unwrap();
        assert!(account.get_address(Chain::Receiving, 0).unwrap() == "1PMycacnJaSqwwJqjawXBErnLsZ7RkXUAs");
        assert!(account.get_pubkey(Chain::Receiving, 0).unwrap() == hex::decode(PUBKEY).unwrap());
        assert!(account.get_xpubkeys(Chain::Receiving, 0).unwrap() == vec![PUBKEY.to_string()]);
        assert!(account.dump() == config);
    }

    #[test]
    fn synchronize_fails_without_derivation() {
        let mut account = BaseAccount::new(Network::Mainnet);
        let mut wallet = MemoryWallet::new(2, 2);
        assert!(account.synchronize(&mut wallet).is_err());
        assert!(account.get_type() == "Standard");
        let keys = account.get_private_key(Chain::Receiving, 0, &wallet, None).unwrap();
        assert!(keys.is_empty());
    }
}
