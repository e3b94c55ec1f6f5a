use crate::account::{Chain, PubkeySet, StoredPubkeys};
use crate::util::{Error, Result};

/// Parallel public key and address sequences for one chain
///
/// Positions are stable once assigned. `addresses[i]` is always the address of
/// `pubkeys[i]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressChain {
    pubkeys: Vec<PubkeySet>,
    addresses: Vec<String>,
}

impl AddressChain {
    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }

    /// Public keys at a position
    pub fn pubkeys(&self, n: usize) -> Result<&PubkeySet> {
        self.pubkeys.get(n).ok_or_else(|| out_of_range(n, self.len()))
    }

    /// Address at a position
    pub fn address(&self, n: usize) -> Result<&str> {
        match self.addresses.get(n) {
            Some(address) => Ok(address),
            None => Err(out_of_range(n, self.len())),
        }
    }

    pub fn addresses(&self) -> &[String] {
        &self.addresses
    }

    pub fn all_pubkeys(&self) -> &[PubkeySet] {
        &self.pubkeys
    }

    pub(crate) fn push(&mut self, pubkeys: PubkeySet, address: String) {
        self.pubkeys.push(pubkeys);
        self.addresses.push(address);
    }

    fn to_stored(&self, multi: bool) -> Vec<StoredPubkeys> {
        self.pubkeys
            .iter()
            .map(|set| {
                let hexes: Vec<String> = set.iter().map(hex::encode).collect();
                match (multi, hexes.len()) {
                    (false, 1) => StoredPubkeys::Single(hexes[0].clone()),
                    _ => StoredPubkeys::Multi(hexes),
                }
            })
            .collect()
    }
}

/// Receiving and change chains of an account
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressChains {
    receiving: AddressChain,
    change: AddressChain,
}

impl AddressChains {
    /// Rebuilds chains from stored public keys, recomputing every address
    pub(crate) fn load<F>(
        receiving: &[StoredPubkeys],
        change: &[StoredPubkeys],
        to_address: F,
    ) -> Result<AddressChains>
    where
        F: Fn(&PubkeySet) -> Result<String>,
    {
        let mut chains = AddressChains::default();
        for (chain, stored) in [(Chain::Receiving, receiving), (Chain::Change, change)].iter() {
            for entry in stored.iter() {
                let pubkeys = entry.decode()?;
                let address = to_address(&pubkeys)?;
                chains.get_mut(*chain).push(pubkeys, address);
            }
        }
        Ok(chains)
    }

    pub fn get(&self, chain: Chain) -> &AddressChain {
        match chain {
            Chain::Receiving => &self.receiving,
            Chain::Change => &self.change,
        }
    }

    pub(crate) fn get_mut(&mut self, chain: Chain) -> &mut AddressChain {
        match chain {
            Chain::Receiving => &mut self.receiving,
            Chain::Change => &mut self.change,
        }
    }

    /// Stored form of a chain; `multi` keeps single keys wrapped in lists
    pub(crate) fn dump(&self, chain: Chain, multi: bool) -> Vec<StoredPubkeys> {
        self.get(chain).to_stored(multi)
    }
}

fn out_of_range(n: usize, len: usize) -> Error {
    Error::BadArgument(format!("Index {} out of range for chain of {}", n, len))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fake_address(pubkeys: &PubkeySet) -> Result<String> {
        Ok(format!("addr-{}", hex::encode(&pubkeys[0])))
    }

    #[test]
    fn load_and_dump() {
        let receiving = vec![
            StoredPubkeys::Single("02aa".to_string()),
            StoredPubkeys::Single("02bb".to_string()),
        ];
        let change = vec![StoredPubkeys::Multi(vec!["03cc".to_string(), "03dd".to_string()])];
        let chains = AddressChains::load(&receiving, &change, fake_address).unwrap();

        assert!(chains.get(Chain::Receiving).len() == 2);
        assert!(chains.get(Chain::Receiving).address(1).unwrap() == "addr-02bb");
        assert!(chains.get(Chain::Change).pubkeys(0).unwrap().len() == 2);
        assert!(chains.get(Chain::Change).address(1).is_err());

        assert!(chains.dump(Chain::Receiving, false) == receiving);
        assert!(chains.dump(Chain::Change, false) == change);
        let wrapped = chains.dump(Chain::Receiving, true);
        assert!(wrapped[0] == StoredPubkeys::Multi(vec!["02aa".to_string()]));
    }

    #[test]
    fn bad_hex() {
        let receiving = vec![StoredPubkeys::Single("zz".to_string())];
        assert!(AddressChains::load(&receiving, &[], fake_address).is_err());
    }

    #[test]
    fn push_keeps_sequences_parallel() {
        let mut chain = AddressChain::default();
        assert!(chain.is_empty());
        chain.push(vec![vec![2; 33]], "a".to_string());
        chain.push(vec![vec![3; 33]], "b".to_string());
        assert!(chain.len() == 2);
        assert!(chain.all_pubkeys().len() == chain.addresses().len());
        assert!(chain.address(0).unwrap() == "a");
    }
}
