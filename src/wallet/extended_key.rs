use crate::network::Network;
use crate::util::{base58check_decode, base58check_encode, hash160, Error, Result};
use byteorder::{BigEndian, ByteOrder, WriteBytesExt};
use ring::digest::SHA512;
use ring::hmac;
use secp256k1::{PublicKey, Secp256k1, SecretKey};
use std::fmt;
use std::slice;

/// Maximum private key value (exclusive)
const SECP256K1_CURVE_ORDER: [u8; 32] = [
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xfe,
    0xba, 0xae, 0xdc, 0xe6, 0xaf, 0x48, 0xa0, 0x3b, 0xbf, 0xd2, 0x5e, 0x8c, 0xd0, 0x36, 0x41, 0x41,
];

/// Index which begins the derived hardened keys
pub const HARDENED_KEY: u32 = 2147483648;

/// Length of a serialized extended key without its checksum
pub const EXTENDED_KEY_LEN: usize = 78;

/// Public or private key type
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum ExtendedKeyType {
    Public,
    Private,
}

/// A private or public key in an hierarchial deterministic wallet
///
/// Layout: version(4) depth(1) parent fingerprint(4) index(4) chain code(32) key(33).
#[derive(Clone, Copy)]
pub struct ExtendedKey(pub [u8; EXTENDED_KEY_LEN]);

impl ExtendedKey {
    /// Creates the master private key for a seed
    pub fn from_seed(seed: &[u8], network: Network) -> Result<ExtendedKey> {
        let key = hmac::SigningKey::new(&SHA512, b"Bitcoin seed");
        let i = hmac::sign(&key, seed);
        let (il, ir) = i.as_ref().split_at(32);
        if !is_private_key_valid(il) {
            return Err(Error::BadArgument("Seed produces an invalid key".to_string()));
        }
        ExtendedKey::new_private_key(network, 0, &[0; 4], 0, ir, il)
    }

    /// Creates a new extended public key
    pub fn new_public_key(
        network: Network,
        depth: u8,
        parent_fingerprint: &[u8],
        index: u32,
        chain_code: &[u8],
        public_key: &[u8],
    ) -> Result<ExtendedKey> {
        if public_key.len() != 33 {
            return Err(Error::BadArgument("Public key must be len 33".to_string()));
        }
        let header = (network.xpub_version(), depth, index);
        ExtendedKey::assemble(header, parent_fingerprint, chain_code, public_key)
    }

    /// Creates a new extended private key
    pub fn new_private_key(
        network: Network,
        depth: u8,
        parent_fingerprint: &[u8],
        index: u32,
        chain_code: &[u8],
        private_key: &[u8],
    ) -> Result<ExtendedKey> {
        if private_key.len() != 32 {
            return Err(Error::BadArgument("Private key must be len 32".to_string()));
        }
        let mut key_data = [0; 33];
        key_data[1..].clone_from_slice(private_key);
        let header = (network.xprv_version(), depth, index);
        ExtendedKey::assemble(header, parent_fingerprint, chain_code, &key_data)
    }

    fn assemble(
        header: (u32, u8, u32),
        parent_fingerprint: &[u8],
        chain_code: &[u8],
        key_data: &[u8],
    ) -> Result<ExtendedKey> {
        if parent_fingerprint.len() != 4 {
            return Err(Error::BadArgument("Fingerprint must be len 4".to_string()));
        }
        if chain_code.len() != 32 {
            return Err(Error::BadArgument("Chain code must be len 32".to_string()));
        }
        let (version, depth, index) = header;
        let mut k = ExtendedKey([0; EXTENDED_KEY_LEN]);
        BigEndian::write_u32(&mut k.0[0..4], version);
        k.0[4] = depth;
        k.0[5..9].clone_from_slice(parent_fingerprint);
        BigEndian::write_u32(&mut k.0[9..13], index);
        k.0[13..45].clone_from_slice(chain_code);
        k.0[45..].clone_from_slice(key_data);
        Ok(k)
    }

    /// Gets the extended key version prefix
    pub fn version(&self) -> u32 {
        BigEndian::read_u32(&self.0[0..4])
    }

    /// Gets the network
    pub fn network(&self) -> Result<Network> {
        let ver = self.version();
        for network in &[Network::Mainnet, Network::Testnet] {
            if ver == network.xpub_version() || ver == network.xprv_version() {
                return Ok(*network);
            }
        }
        Err(Error::BadData(format!("Unknown extended key version {:?}", ver)))
    }

    /// Gets the key type
    pub fn key_type(&self) -> Result<ExtendedKeyType> {
        let ver = self.version();
        if ver == Network::Mainnet.xpub_version() || ver == Network::Testnet.xpub_version() {
            Ok(ExtendedKeyType::Public)
        } else if ver == Network::Mainnet.xprv_version() || ver == Network::Testnet.xprv_version() {
            Ok(ExtendedKeyType::Private)
        } else {
            Err(Error::BadData(format!("Unknown extended key version {:?}", ver)))
        }
    }

    /// Gets the depth
    pub fn depth(&self) -> u8 {
        self.0[4]
    }

    /// Gets the first 4 bytes of the parent key, or 0 if this is the master key
    pub fn parent_fingerprint(&self) -> [u8; 4] {
        [self.0[5], self.0[6], self.0[7], self.0[8]]
    }

    /// Get the index of this key as derived from the parent
    pub fn index(&self) -> u32 {
        BigEndian::read_u32(&self.0[9..13])
    }

    /// Gets the chain code
    pub fn chain_code(&self) -> [u8; 32] {
        let mut chain_code = [0; 32];
        chain_code.clone_from_slice(&self.0[13..45]);
        chain_code
    }

    /// Gets the compressed public key, computing it for private keys
    pub fn public_key(&self) -> Result<[u8; 33]> {
        match self.key_type()? {
            ExtendedKeyType::Public => {
                let mut public_key = [0; 33];
                public_key.clone_from_slice(&self.0[45..]);
                Ok(public_key)
            }
            ExtendedKeyType::Private => {
                let secp = Secp256k1::signing_only();
                let secret_key = SecretKey::from_slice(&self.0[46..])?;
                Ok(PublicKey::from_secret_key(&secp, &secret_key).serialize())
            }
        }
    }

    /// Gets the private key if this is an extended private key
    pub fn private_key(&self) -> Result<[u8; 32]> {
        if self.key_type()? != ExtendedKeyType::Private {
            let msg = "Cannot get private key of public extended key";
            return Err(Error::BadData(msg.to_string()));
        }
        let mut private_key = [0; 32];
        private_key.clone_from_slice(&self.0[46..]);
        Ok(private_key)
    }

    /// Gets the fingerprint of the public key hash
    pub fn fingerprint(&self) -> Result<[u8; 4]> {
        let mut fingerprint = [0; 4];
        fingerprint.clone_from_slice(&hash160(&self.public_key()?).0[..4]);
        Ok(fingerprint)
    }

    /// Gets the extended public key for this key
    pub fn extended_public_key(&self) -> Result<ExtendedKey> {
        match self.key_type()? {
            ExtendedKeyType::Public => Ok(*self),
            ExtendedKeyType::Private => ExtendedKey::new_public_key(
                self.network()?,
                self.depth(),
                &self.0[5..9],
                self.index(),
                &self.0[13..45],
                &self.public_key()?,
            ),
        }
    }

    /// Derives an extended child private key from an extended parent private key
    pub fn derive_private_key(&self, index: u32) -> Result<ExtendedKey> {
        if self.key_type()? == ExtendedKeyType::Public {
            let msg = "Cannot derive private key from public key";
            return Err(Error::BadData(msg.to_string()));
        }
        let network = self.network()?;
        self.check_depth()?;

        let private_key = &self.0[46..];
        let mut data = Vec::with_capacity(37);
        if index >= HARDENED_KEY {
            data.push(0);
            data.extend_from_slice(private_key);
        } else {
            data.extend_from_slice(&self.public_key()?);
        }
        data.write_u32::<BigEndian>(index)?;
        let (offset, child_chain_code) = self.child_hmac(&data)?;

        let mut child_secret_key = SecretKey::from_slice(&offset)?;
        child_secret_key.add_assign(private_key)?;
        let child_private_key = unsafe { slice::from_raw_parts(child_secret_key.as_ptr(), 32) };

        ExtendedKey::new_private_key(
            network,
            self.depth() + 1,
            &self.fingerprint()?,
            index,
            &child_chain_code,
            child_private_key,
        )
    }

    /// Derives an extended child public key from an extended parent public key
    ///
    /// For private keys this derives from the corresponding public key, giving
    /// the same result as neutering the private child.
    pub fn derive_public_key(&self, index: u32) -> Result<ExtendedKey> {
        if index >= HARDENED_KEY {
            return Err(Error::BadArgument("i cannot be hardened".to_string()));
        }
        let network = self.network()?;
        self.check_depth()?;

        let public_key = self.public_key()?;
        let mut data = Vec::with_capacity(37);
        data.extend_from_slice(&public_key);
        data.write_u32::<BigEndian>(index)?;
        let (offset, child_chain_code) = self.child_hmac(&data)?;

        let secp = Secp256k1::signing_only();
        let offset = SecretKey::from_slice(&offset)?;
        let offset_point = PublicKey::from_secret_key(&secp, &offset);
        let child_public_key = PublicKey::from_slice(&public_key)?.combine(&offset_point)?;

        ExtendedKey::new_public_key(
            network,
            self.depth() + 1,
            &self.fingerprint()?,
            index,
            &child_chain_code,
            &child_public_key.serialize(),
        )
    }

    fn check_depth(&self) -> Result<()> {
        if self.depth() == 255 {
            let msg = "Cannot derive extended key. Depth already at max.";
            return Err(Error::BadData(msg.to_string()));
        }
        Ok(())
    }

    /// HMAC-SHA512 keyed by the chain code, split into key offset and child chain code
    fn child_hmac(&self, data: &[u8]) -> Result<([u8; 32], [u8; 32])> {
        let key = hmac::SigningKey::new(&SHA512, &self.0[13..45]);
        let i = hmac::sign(&key, data);
        if i.as_ref().len() != 64 {
            return Err(Error::IllegalState("HMAC invalid length".to_string()));
        }
        if !is_private_key_valid(&i.as_ref()[..32]) {
            let msg = "Invalid key. Try next index.".to_string();
            return Err(Error::IllegalState(msg));
        }
        let mut offset = [0; 32];
        let mut chain_code = [0; 32];
        offset.clone_from_slice(&i.as_ref()[..32]);
        chain_code.clone_from_slice(&i.as_ref()[32..]);
        Ok((offset, chain_code))
    }

    /// Encodes an extended key into a base58-check string
    pub fn encode(&self) -> String {
        base58check_encode(&self.0)
    }

    /// Decodes an extended key from a base58-check string
    pub fn decode(s: &str) -> Result<ExtendedKey> {
        ExtendedKey::from_bytes(&base58check_decode(s)?)
    }

    /// Reads the raw 78-byte serialization
    pub fn from_bytes(bytes: &[u8]) -> Result<ExtendedKey> {
        if bytes.len() != EXTENDED_KEY_LEN {
            let msg = format!("Extended key must be {} bytes, got {}", EXTENDED_KEY_LEN, bytes.len());
            return Err(Error::BadData(msg));
        }
        let mut extended_key = ExtendedKey([0; EXTENDED_KEY_LEN]);
        extended_key.0.clone_from_slice(bytes);
        extended_key.key_type()?;
        Ok(extended_key)
    }
}

impl fmt::Debug for ExtendedKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.encode())
    }
}

impl PartialEq for ExtendedKey {
    fn eq(&self, other: &ExtendedKey) -> bool {
        self.0[..] == other.0[..]
    }
}

impl Eq for ExtendedKey {}

/// Derives a key using the BIP-32 and BIP-44 shortened key notation
///
/// Paths starting with `m` derive private keys, `M` public keys.
pub fn derive_extended_key(master: &ExtendedKey, path: &str) -> Result<ExtendedKey> {
    let mut parts = path.split('/');
    let key_type = match parts.next() {
        Some("m") => {
            if master.key_type()? == ExtendedKeyType::Public {
                let msg = "Cannot derive private key from public master";
                return Err(Error::BadArgument(msg.to_string()));
            }
            ExtendedKeyType::Private
        }
        Some("M") => ExtendedKeyType::Public,
        _ => return Err(Error::BadArgument("Path must start with m or M".to_string())),
    };

    let mut key = *master;
    for part in parts {
        if part.is_empty() {
            return Err(Error::BadArgument("Empty part".to_string()));
        }
        let hardened = part.ends_with('\'') || part.ends_with('h') || part.ends_with('H');
        let index: u32 = part.trim_end_matches(|c: char| c == '\'' || c == 'h' || c == 'H').parse()?;
        let index = if hardened {
            if index >= HARDENED_KEY {
                let msg = "Key index is already hardened";
                return Err(Error::BadArgument(msg.to_string()));
            }
            index + HARDENED_KEY
        } else {
            index
        };

        key = match key_type {
            ExtendedKeyType::Public => key.derive_public_key(index)?,
            ExtendedKeyType::Private => key.derive_private_key(index)?,
        };
    }

    Ok(key)
}

/// Checks that a private key is in valid SECP256K1 range
pub fn is_private_key_valid(key: &[u8]) -> bool {
    if key.len() != 32 {
        return false;
    }
    // Big-endian comparison against the curve order
    let below_order = key < &SECP256K1_CURVE_ORDER[..];
    below_order && key.iter().any(|b| *b != 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex;

    fn master(seed: &str) -> ExtendedKey {
        ExtendedKey::from_seed(&hex::decode(seed).unwrap(), Network::Mainnet).unwrap()
    }

    fn xpub(key: &ExtendedKey) -> String {
        key.extended_public_key().unwrap().encode()
    }

    #[test]
    fn private_key_range() {
        let mut max = SECP256K1_CURVE_ORDER;
        max[31] -= 1;
        assert!(is_private_key_valid(&max));
        assert!(is_private_key_valid(&[0x01; 32]));

        assert!(!is_private_key_valid(&[0x00; 32]));
        assert!(!is_private_key_valid(&[0xff; 32]));
        assert!(!is_private_key_valid(&SECP256K1_CURVE_ORDER));
        assert!(!is_private_key_valid(&[0x01; 31]));
    }

    #[test]
    fn bip32_vector_1() {
        let m = master("000102030405060708090a0b0c0d0e0f");
        assert!(m.encode() == "xprv9s21ZrQH143K3QTDL4LXw2F7HEK3wJUD2nW2nRk4stbPy6cq3jPPqjiChkVvvNKmPGJxWUtg6LnF5kejMRNNU3TGtRBeJgk33yuGBxrMPHi");
        assert!(xpub(&m) == "xpub661MyMwAqRbcFtXgS5sYJABqqG9YLmC4Q1Rdap9gSE8NqtwybGhePY2gZ29ESFjqJoCu1Rupje8YtGqsefD265TMg7usUDFdp6W1EGMcet8");
        let k = derive_extended_key(&m, "m/0H").unwrap();
        assert!(k.encode() == "xprv9uHRZZhk6KAJC1avXpDAp4MDc3sQKNxDiPvvkX8Br5ngLNv1TxvUxt4cV1rGL5hj6KCesnDYUhd7oWgT11eZG7XnxHrnYeSvkzY7d2bhkJ7");
        let k = derive_extended_key(&m, "m/0h/1").unwrap();
        assert!(xpub(&k) == "xpub6ASuArnXKPbfEwhqN6e3mwBcDTgzisQN1wXN9BJcM47sSikHjJf3UFHKkNAWbWMiGj7Wf5uMash7SyYq527Hqck2AxYysAA7xmALppuCkwQ");
        let k = derive_extended_key(&m, "m/0H/1/2H/2/1000000000").unwrap();
        assert!(k.encode() == "xprvA41z7zogVVwxVSgdKUHDy1SKmdb533PjDz7J6N6mV6uS3ze1ai8FHa8kmHScGpWmj4WggLyQjgPie1rFSruoUihUZREPSL39UNdE3BBDu76");
        assert!(xpub(&k) == "xpub6H1LXWLaKsWFhvm6RVpEL9P4KfRZSW7abD2ttkWP3SSQvnyA8FSVqNTEcYFgJS2UaFcxupHiYkro49S8yGasTvXEYBVPamhGW6cFJodrTHy");
    }

    #[test]
    fn bip32_vector_2_public_derivation() {
        let m = master("fffcf9f6f3f0edeae7e4e1dedbd8d5d2cfccc9c6c3c0bdbab7b4b1aeaba8a5a29f9c999693908d8a8784817e7b7875726f6c696663605d5a5754514e4b484542");
        let xpub_m = m.extended_public_key().unwrap();
        assert!(xpub_m.encode() == "xpub661MyMwAqRbcFW31YEwpkMuc5THy2PSt5bDMsktWQcFF8syAmRUapSCGu8ED9W6oDMSgv6Zz8idoc4a6mr8BDzTJY47LJhkJ8UB7WEGuduB");

        // Public-only derivation matches the private path
        let child = xpub_m.derive_public_key(0).unwrap();
        assert!(child.encode() == "xpub69H7F5d8KSRgmmdJg2KhpAK8SR3DjMwAdkxj3ZuxV27CprR9LgpeyGmXUbC6wb7ERfvrnKZjXoUmmDznezpbZb7ap6r1D3tgFxHmwMkQTPH");
        assert!(child == derive_extended_key(&xpub_m, "M/0").unwrap());
        assert!(xpub_m.derive_public_key(HARDENED_KEY).is_err());
    }

    #[test]
    fn bip32_vector_3_leading_zeros() {
        let m = master("4b381541583be4423346c643850da4b320e46a87ae3d2a4e6da11eba819cd4acba45d239319ac14f863b8d5ab5a0d0c64d2e8a1e7d1457df2e5a3c51c73235be");
        assert!(m.encode() == "xprv9s21ZrQH143K25QhxbucbDDuQ4naNntJRi4KUfWT7xo4EKsHt2QJDu7KXp1A3u7Bi1j8ph3EGsZ9Xvz9dGuVrtHHs7pXeTzjuxBrCmmhgC6");
        let k = derive_extended_key(&m, "m/0H").unwrap();
        assert!(xpub(&k) == "xpub68NZiKmJWnxxS6aaHmn81bvJeTESw724CRDs6HbuccFQN9Ku14VQrADWgqbhhTHBaohPX4CjNLf9fq9MYo6oDaPPLPxSb7gwQN3ih19Zm4Y");
    }

    #[test]
    fn fields() {
        let key =
            ExtendedKey::new_public_key(Network::Testnet, 111, &[0, 1, 2, 3], 44, &[5; 32], &[6; 33])
                .unwrap();
        assert!(key.network().unwrap() == Network::Testnet);
        assert!(key.key_type().unwrap() == ExtendedKeyType::Public);
        assert!(key.depth() == 111);
        assert!(key.parent_fingerprint() == [0, 1, 2, 3]);
        assert!(key.index() == 44);
        assert!(key.chain_code() == [5; 32]);
        assert!(key.public_key().unwrap() == [6; 33]);
        assert!(key.private_key().is_err());

        let key = ExtendedKey::new_private_key(
            Network::Mainnet,
            255,
            &[4, 5, 6, 7],
            HARDENED_KEY + 100,
            &[7; 32],
            &[8; 32],
        )
        .unwrap();
        assert!(key.key_type().unwrap() == ExtendedKeyType::Private);
        assert!(key.index() == HARDENED_KEY + 100);
        assert!(key.private_key().unwrap() == [8; 32]);
        assert!(key.derive_private_key(0).is_err());
    }

    #[test]
    fn bad_arguments() {
        let net = Network::Testnet;
        assert!(ExtendedKey::new_public_key(net, 1, &[0, 1, 2], 4, &[5; 32], &[6; 33]).is_err());
        assert!(ExtendedKey::new_public_key(net, 1, &[0, 1, 2, 3], 4, &[5; 31], &[6; 33]).is_err());
        assert!(ExtendedKey::new_public_key(net, 1, &[0, 1, 2, 3], 4, &[5; 32], &[6; 32]).is_err());
        assert!(ExtendedKey::new_private_key(net, 1, &[0, 1, 2, 3], 4, &[5; 32], &[8; 33]).is_err());
        assert!(ExtendedKey([5; EXTENDED_KEY_LEN]).key_type().is_err());
        assert!(ExtendedKey::from_bytes(&[5; EXTENDED_KEY_LEN]).is_err());
        assert!(ExtendedKey::from_bytes(&[5; 10]).is_err());
    }

    #[test]
    fn paths() {
        let m = master("0123456789abcdef");
        assert!(m == ExtendedKey::decode(&m.encode()).unwrap());
        let k = derive_extended_key(&m, "M/1/2/3").unwrap();
        assert!(k.key_type().unwrap() == ExtendedKeyType::Public);
        assert!(k == ExtendedKey::decode(&k.encode()).unwrap());

        let xpub_m = m.extended_public_key().unwrap();
        assert!(derive_extended_key(&xpub_m, "m/1").is_err());
        assert!(derive_extended_key(&m, "x/1").is_err());
        assert!(derive_extended_key(&m, "m//1").is_err());
        assert!(derive_extended_key(&m, "m/2147483648H").is_err());
    }
}
