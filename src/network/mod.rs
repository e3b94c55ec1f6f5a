//! Version bytes for mainnet and testnet encodings

mod network;

pub use self::network::Network;
