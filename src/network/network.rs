use crate::util::{Error, Result};

/// Network type
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum Network {
    Mainnet = 0,
    Testnet = 1,
}

impl Network {
    /// Converts an integer to a network type
    pub fn from_u8(x: u8) -> Result<Network> {
        match x {
            x if x == Network::Mainnet as u8 => Ok(Network::Mainnet),
            x if x == Network::Testnet as u8 => Ok(Network::Testnet),
            _ => {
                let msg = format!("Unknown network type: {}", x);
                Err(Error::BadArgument(msg))
            }
        }
    }

    /// Returns the version byte flag for P2PKH-type addresses
    pub fn addr_pubkeyhash_flag(&self) -> u8 {
        match self {
            Network::Mainnet => 0x00,
            Network::Testnet => 0x6f,
        }
    }

    /// Returns the version byte flag for P2SH-type addresses
    pub fn addr_script_flag(&self) -> u8 {
        match self {
            Network::Mainnet => 0x05,
            Network::Testnet => 0xc4,
        }
    }

    /// Returns the version byte for WIF-encoded private keys
    pub fn wif_flag(&self) -> u8 {
        match self {
            Network::Mainnet => 0x80,
            Network::Testnet => 0xef,
        }
    }

    /// Returns the 4-byte version prefix of extended public keys
    pub fn xpub_version(&self) -> u32 {
        match self {
            Network::Mainnet => 0x0488_B21E,
            Network::Testnet => 0x0435_87CF,
        }
    }

    /// Returns the 4-byte version prefix of extended private keys
    pub fn xprv_version(&self) -> u32 {
        match self {
            Network::Mainnet => 0x0488_ADE4,
            Network::Testnet => 0x0435_8394,
        }
    }

    /// Finds the network whose WIF version byte matches
    pub fn from_wif_flag(flag: u8) -> Result<Network> {
        [Network::Mainnet, Network::Testnet]
            .iter()
            .find(|n| n.wif_flag() == flag)
            .cloned()
            .ok_or_else(|| Error::BadData(format!("Unknown WIF version {}", flag)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_u8() {
        assert!(Network::from_u8(0).unwrap() == Network::Mainnet);
        assert!(Network::from_u8(1).unwrap() == Network::Testnet);
        assert!(Network::from_u8(2).is_err());
    }

    #[test]
    fn wif_flags() {
        assert!(Network::from_wif_flag(0x80).unwrap() == Network::Mainnet);
        assert!(Network::from_wif_flag(0xef).unwrap() == Network::Testnet);
        assert!(Network::from_wif_flag(0x00).is_err());
    }
}
