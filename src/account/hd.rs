use crate::account::{
    child_index, Account, AccountConfig, AddressChains, Chain, PubkeySet, WalletView,
};
use crate::network::Network;
use crate::util::{Error, Result};
use crate::wallet::{ExtendedKey, ExtendedKeyType, PrivateKey, EXTENDED_KEY_LEN};
use byteorder::{ByteOrder, LittleEndian, WriteBytesExt};
use hex;

/// Tag byte marking an extended public key descriptor
const XPUBKEY_TAG: u8 = 0xff;

/// An extended public key and its two derived chain branches
#[derive(Debug, Clone)]
pub(crate) struct BranchKeys {
    root: ExtendedKey,
    receiving: ExtendedKey,
    change: ExtendedKey,
}

impl BranchKeys {
    pub(crate) fn new(root: ExtendedKey) -> Result<BranchKeys> {
        if root.key_type()? != ExtendedKeyType::Public {
            let msg = "Account key must be an extended public key".to_string();
            return Err(Error::BadArgument(msg));
        }
        Ok(BranchKeys {
            root,
            receiving: root.derive_public_key(Chain::Receiving.index())?,
            change: root.derive_public_key(Chain::Change.index())?,
        })
    }

    pub(crate) fn decode(xpub: &str) -> Result<BranchKeys> {
        BranchKeys::new(ExtendedKey::decode(xpub)?)
    }

    pub(crate) fn root(&self) -> &ExtendedKey {
        &self.root
    }

    pub(crate) fn branch(&self, chain: Chain) -> &ExtendedKey {
        match chain {
            Chain::Receiving => &self.receiving,
            Chain::Change => &self.change,
        }
    }

    /// Compressed public key at `root/chain/n`
    pub(crate) fn derive_pubkey(&self, chain: Chain, n: usize) -> Result<Vec<u8>> {
        let child = self.branch(chain).derive_public_key(child_index(n)?)?;
        Ok(child.public_key()?.to_vec())
    }
}

/// Derives `chain/n` from every wallet master private key matching one of the roots
pub(crate) fn derive_private_keys(
    roots: &[&ExtendedKey],
    chain: Chain,
    n: usize,
    wallet: &dyn WalletView,
    password: Option<&str>,
) -> Result<Vec<PrivateKey>> {
    let index = child_index(n)?;
    let mut keys = Vec::new();
    for root in roots {
        for xprv in wallet.get_master_private_key(root, password)? {
            let leaf = xprv.derive_private_key(chain.index())?.derive_private_key(index)?;
            keys.push(PrivateKey::new(&leaf.private_key()?, true)?);
        }
    }
    Ok(keys)
}

/// Encodes a cosigner key and position so it can be recognized in a partially signed transaction
///
/// Layout: `ff` tag, the 78 raw extended key bytes, then chain and index as
/// 2-byte little-endian integers, all hex encoded.
pub fn xpubkey_encode(xpub: &ExtendedKey, chain: Chain, n: usize) -> Result<String> {
    if n > u16::max_value() as usize {
        let msg = format!("Index {} does not fit an xpubkey descriptor", n);
        return Err(Error::BadArgument(msg));
    }
    let mut v = Vec::with_capacity(1 + EXTENDED_KEY_LEN + 4);
    v.push(XPUBKEY_TAG);
    v.extend_from_slice(&xpub.0);
    v.write_u16::<LittleEndian>(chain.index() as u16)?;
    v.write_u16::<LittleEndian>(n as u16)?;
    Ok(hex::encode(v))
}

/// Reverses `xpubkey_encode`
pub fn parse_xpubkey(s: &str) -> Result<(ExtendedKey, Chain, usize)> {
    let v = hex::decode(s)?;
    if v.len() != 1 + EXTENDED_KEY_LEN + 4 || v[0] != XPUBKEY_TAG {
        return Err(Error::BadData(format!("Not an xpubkey descriptor: {}", s)));
    }
    let xpub = ExtendedKey::from_bytes(&v[1..1 + EXTENDED_KEY_LEN])?;
    let path = &v[1 + EXTENDED_KEY_LEN..];
    let chain = Chain::from_index(LittleEndian::read_u16(&path[0..2]) as u32)?;
    let n = LittleEndian::read_u16(&path[2..4]) as usize;
    Ok((xpub, chain, n))
}

/// Account deriving every address from one extended public key
///
/// Addresses live at `xpub/chain/n`, with chain 0 for receiving and 1 for change.
#[derive(Debug, Clone)]
pub struct HdAccount {
    chains: AddressChains,
    network: Network,
    keys: BranchKeys,
}

impl HdAccount {
    /// Creates an account with no addresses yet
    pub fn new(xpub: ExtendedKey, network: Network) -> Result<HdAccount> {
        Ok(HdAccount {
            chains: AddressChains::default(),
            network,
            keys: BranchKeys::new(xpub)?,
        })
    }

    pub fn from_config(config: &AccountConfig, network: Network) -> Result<HdAccount> {
        let xpub = match &config.xpub {
            Some(xpub) => xpub,
            None => return Err(Error::BadData("HD account without xpub".to_string())),
        };
        let keys = BranchKeys::decode(xpub)?;
        let chains = AddressChains::load(config.receiving(), config.change(), |pubkeys| {
            single_key_address(pubkeys, network)
        })?;
        Ok(HdAccount {
            chains,
            network,
            keys,
        })
    }

    /// The account's extended public key
    pub fn xpub(&self) -> &ExtendedKey {
        self.keys.root()
    }

    /// The cached extended key of a chain branch
    pub fn branch_key(&self, chain: Chain) -> &ExtendedKey {
        self.keys.branch(chain)
    }

    /// Address and public keys of the first receiving position
    pub fn first_address(&self) -> Result<(String, PubkeySet)> {
        let pubkeys = self.derive_pubkeys(Chain::Receiving, 0)?;
        let address = self.pubkeys_to_address(&pubkeys)?;
        Ok((address, pubkeys))
    }
}

fn single_key_address(pubkeys: &PubkeySet, network: Network) -> Result<String> {
    match pubkeys.as_slice() {
        [pubkey] => Ok(crate::address::pubkey_to_address(pubkey, network)),
        _ => Err(Error::BadData("Expected one public key per address".to_string())),
    }
}

impl Account for HdAccount {
    fn chains(&self) -> &AddressChains {
        &self.chains
    }

    fn chains_mut(&mut self) -> &mut AddressChains {
        &mut self.chains
    }

    fn network(&self) -> Network {
        self.network
    }

    fn derive_pubkeys(&self, chain: Chain, n: usize) -> Result<PubkeySet> {
        Ok(vec![self.keys.derive_pubkey(chain, n)?])
    }

    fn get_master_pubkeys(&self) -> Vec<String> {
        vec![self.xpub().encode()]
    }

    fn get_xpubkeys(&self, chain: Chain, n: usize) -> Result<Vec<String>> {
        Ok(vec![xpubkey_encode(self.xpub(), chain, n)?])
    }

    fn get_private_key(
        &self,
        chain: Chain,
        n: usize,
        wallet: &dyn WalletView,
        password: Option<&str>,
    ) -> Result<Vec<PrivateKey>> {
        derive_private_keys(&[self.xpub()], chain, n, wallet, password)
    }

    fn get_type(&self) -> String {
        "Standard 1 of 1".to_string()
    }

    fn get_name(&self, k: &str) -> String {
        if k == "0" {
            "Main account".to_string()
        } else {
            format!("Account {}", k)
        }
    }

    fn dump(&self) -> AccountConfig {
        AccountConfig {
            receiving: Some(self.chains.dump(Chain::Receiving, false)),
            change: Some(self.chains.dump(Chain::Change, false)),
            xpub: Some(self.xpub().encode()),
            ..Default::default()
        }
    }
}
