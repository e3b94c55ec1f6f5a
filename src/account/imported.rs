use crate::account::{Account, AccountConfig, AddressChains, Chain, PubkeySet, WalletView};
use crate::address::pubkey_to_address;
use crate::network::Network;
use crate::util::{Error, Result};
use crate::wallet::{pw_decode, pw_encode, PrivateKey};
use hex;
use std::collections::BTreeMap;

/// Account of individually imported keys
///
/// Keys have no derivation relationship and there is no change chain. The
/// receiving chain lists the keys ordered by address, so positions shift as
/// keys are added and removed.
#[derive(Debug, Clone)]
pub struct ImportedAccount {
    chains: AddressChains,
    network: Network,
    /// Address to (public key hex, encrypted WIF private key)
    keypairs: BTreeMap<String, (String, String)>,
}

impl ImportedAccount {
    pub fn new(network: Network) -> ImportedAccount {
        ImportedAccount {
            chains: AddressChains::default(),
            network,
            keypairs: BTreeMap::new(),
        }
    }

    pub fn from_config(config: &AccountConfig, network: Network) -> Result<ImportedAccount> {
        let keypairs = match &config.imported {
            Some(keypairs) => keypairs.clone(),
            None => return Err(Error::BadData("Missing imported keys".to_string())),
        };
        let mut account = ImportedAccount {
            chains: AddressChains::default(),
            network,
            keypairs,
        };
        account.rebuild()?;
        Ok(account)
    }

    /// Imports a key, encrypting it under the password
    ///
    /// The key must spend from `address`. Replaces any key already stored there.
    pub fn add(
        &mut self,
        address: &str,
        pubkey: &[u8],
        privkey: &PrivateKey,
        password: Option<&str>,
    ) -> Result<()> {
        if privkey.address(self.network)? != address || privkey.public_key()? != pubkey {
            let msg = format!("Key does not match address {}", address);
            return Err(Error::BadArgument(msg));
        }
        let encrypted = pw_encode(&privkey.to_wif(self.network), password)?;
        self.keypairs
            .insert(address.to_string(), (hex::encode(pubkey), encrypted));
        self.rebuild()
    }

    /// Forgets the key stored for an address
    pub fn remove(&mut self, address: &str) -> Result<()> {
        if self.keypairs.remove(address).is_none() {
            let msg = format!("No imported key for {}", address);
            return Err(Error::BadArgument(msg));
        }
        self.rebuild()
    }

    /// Re-encrypts every key under a new password
    ///
    /// Nothing changes unless every key decrypts with the old password.
    pub fn update_password(&mut self, old: Option<&str>, new: Option<&str>) -> Result<()> {
        let mut updated = BTreeMap::new();
        for (address, (pubkey, encrypted)) in self.keypairs.iter() {
            let wif = pw_decode(encrypted, old)?;
            self.check_wif(&wif, address)?;
            updated.insert(address.clone(), (pubkey.clone(), pw_encode(&wif, new)?));
        }
        self.keypairs = updated;
        Ok(())
    }

    /// Addresses with imported keys, sorted
    pub fn addresses(&self) -> Vec<String> {
        self.keypairs.keys().cloned().collect()
    }

    fn check_wif(&self, wif: &str, address: &str) -> Result<PrivateKey> {
        let (key, _) = PrivateKey::from_wif(wif).map_err(|_| Error::InvalidPassword)?;
        if key.address(self.network)? != address {
            return Err(Error::InvalidPassword);
        }
        Ok(key)
    }

    fn rebuild(&mut self) -> Result<()> {
        let mut chains = AddressChains::default();
        for (address, (pubkey, _)) in self.keypairs.iter() {
            let pubkey = hex::decode(pubkey)?;
            if pubkey_to_address(&pubkey, self.network) != *address {
                let msg = format!("Imported public key does not match {}", address);
                return Err(Error::BadData(msg));
            }
            chains
                .get_mut(Chain::Receiving)
                .push(vec![pubkey], address.clone());
        }
        self.chains = chains;
        Ok(())
    }
}

impl Account for ImportedAccount {
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
        let msg = "Imported keys cannot be derived".to_string();
        Err(Error::InvalidOperation(msg))
    }

    fn synchronize(&mut self, _wallet: &mut dyn WalletView) -> Result<()> {
        Ok(())
    }

    fn has_change(&self) -> bool {
        false
    }

    fn get_private_key(
        &self,
        chain: Chain,
        n: usize,
        _wallet: &dyn WalletView,
        password: Option<&str>,
    ) -> Result<Vec<PrivateKey>> {
        if chain != Chain::Receiving {
            let msg = "Imported accounts have no change chain".to_string();
            return Err(Error::BadArgument(msg));
        }
        let address = self.get_address(chain, n)?;
        let encrypted = match self.keypairs.get(&address) {
            Some((_, encrypted)) => encrypted,
            None => return Err(Error::IllegalState(format!("No key for {}", address))),
        };
        let wif = pw_decode(encrypted, password)?;
        Ok(vec![self.check_wif(&wif, &address)?])
    }

    fn get_type(&self) -> String {
        "Imported".to_string()
    }

    fn get_name(&self, _k: &str) -> String {
        "Imported keys".to_string()
    }

    fn dump(&self) -> AccountConfig {
        AccountConfig {
            imported: Some(self.keypairs.clone()),
            ..Default::default()
        }
    }
}
