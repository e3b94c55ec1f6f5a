use crate::account::hd::{derive_private_keys, xpubkey_encode, BranchKeys};
use crate::account::{Account, AccountConfig, AddressChains, Chain, PubkeySet, WalletView};
use crate::address::script_to_address;
use crate::network::Network;
use crate::script::{create_multisig_script, Script, MAX_PUBKEYS_PER_MULTISIG};
use crate::util::{Error, Result};
use crate::wallet::{ExtendedKey, PrivateKey};

/// Required signatures when a stored account omits `m`
const DEFAULT_M: usize = 2;

/// m-of-n account whose addresses pay a script over one key per cosigner
///
/// Each cosigner contributes the key at the same `chain/n` position under its
/// own extended public key. Keys are sorted before building the script so the
/// address does not depend on cosigner order.
#[derive(Debug, Clone)]
pub struct MultisigAccount {
    chains: AddressChains,
    network: Network,
    m: usize,
    cosigners: Vec<BranchKeys>,
}

impl MultisigAccount {
    /// Creates an account with no addresses yet
    pub fn new(xpubs: &[ExtendedKey], m: usize, network: Network) -> Result<MultisigAccount> {
        check_m_of_n(m, xpubs.len())?;
        let mut cosigners = Vec::with_capacity(xpubs.len());
        for xpub in xpubs {
            cosigners.push(BranchKeys::new(*xpub)?);
        }
        Ok(MultisigAccount {
            chains: AddressChains::default(),
            network,
            m,
            cosigners,
        })
    }

    pub fn from_config(config: &AccountConfig, network: Network) -> Result<MultisigAccount> {
        let xpubs = match &config.xpubs {
            Some(xpubs) => xpubs,
            None => return Err(Error::BadData("Multisig account without xpubs".to_string())),
        };
        let m = config.m.unwrap_or(DEFAULT_M);
        check_m_of_n(m, xpubs.len())?;
        let mut cosigners = Vec::with_capacity(xpubs.len());
        for xpub in xpubs {
            cosigners.push(BranchKeys::decode(xpub)?);
        }
        let chains = AddressChains::load(config.receiving(), config.change(), |pubkeys| {
            multisig_address(pubkeys, m, network)
        })?;
        Ok(MultisigAccount {
            chains,
            network,
            m,
            cosigners,
        })
    }

    /// Signatures required to spend
    pub fn m(&self) -> usize {
        self.m
    }

    /// Number of cosigners
    pub fn n(&self) -> usize {
        self.cosigners.len()
    }

    fn roots(&self) -> Vec<&ExtendedKey> {
        self.cosigners.iter().map(|c| c.root()).collect()
    }
}

fn check_m_of_n(m: usize, n: usize) -> Result<()> {
    if n == 0 || n > MAX_PUBKEYS_PER_MULTISIG {
        let msg = format!("Cosigner count {} not in 1..={}", n, MAX_PUBKEYS_PER_MULTISIG);
        return Err(Error::BadArgument(msg));
    }
    if m == 0 || m > n {
        return Err(Error::BadArgument(format!("Bad threshold {} of {}", m, n)));
    }
    Ok(())
}

fn sorted_script(pubkeys: &PubkeySet, m: usize) -> Result<Script> {
    let mut sorted = pubkeys.clone();
    sorted.sort();
    create_multisig_script(&sorted, m)
}

fn multisig_address(pubkeys: &PubkeySet, m: usize, network: Network) -> Result<String> {
    Ok(script_to_address(&sorted_script(pubkeys, m)?, network))
}

impl Account for MultisigAccount {
    fn chains(&self) -> &AddressChains {
        &self.chains
    }

    fn chains_mut(&mut self) -> &mut AddressChains {
        &mut self.chains
    }

    fn network(&self) -> Network {
        self.network
    }

    /// One key per cosigner, in cosigner order
    fn derive_pubkeys(&self, chain: Chain, n: usize) -> Result<PubkeySet> {
        let mut pubkeys = Vec::with_capacity(self.cosigners.len());
        for cosigner in self.cosigners.iter() {
            pubkeys.push(cosigner.derive_pubkey(chain, n)?);
        }
        Ok(pubkeys)
    }

    fn pubkeys_to_address(&self, pubkeys: &PubkeySet) -> Result<String> {
        multisig_address(pubkeys, self.m, self.network)
    }

    fn redeem_script(&self, chain: Chain, n: usize) -> Result<Option<Script>> {
        let pubkeys = self.get_pubkeys(chain, n)?;
        Ok(Some(sorted_script(&pubkeys, self.m)?))
    }

    fn get_master_pubkeys(&self) -> Vec<String> {
        self.roots().iter().map(|xpub| xpub.encode()).collect()
    }

    fn get_xpubkeys(&self, chain: Chain, n: usize) -> Result<Vec<String>> {
        let mut xpubkeys = Vec::with_capacity(self.cosigners.len());
        for root in self.roots() {
            xpubkeys.push(xpubkey_encode(root, chain, n)?);
        }
        Ok(xpubkeys)
    }

    fn get_private_key(
        &self,
        chain: Chain,
        n: usize,
        wallet: &dyn WalletView,
        password: Option<&str>,
    ) -> Result<Vec<PrivateKey>> {
        derive_private_keys(&self.roots(), chain, n, wallet, password)
    }

    fn get_type(&self) -> String {
        format!("Multisig {} of {}", self.m, self.cosigners.len())
    }

    fn dump(&self) -> AccountConfig {
        AccountConfig {
            receiving: Some(self.chains.dump(Chain::Receiving, true)),
            change: Some(self.chains.dump(Chain::Change, true)),
            xpubs: Some(self.get_master_pubkeys()),
            m: Some(self.m),
            ..Default::default()
        }
    }
}
