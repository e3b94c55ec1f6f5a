//! Lightweight wallet accounts and an Electrum-style server interface.
//!
//! Accounts derive and track receiving and change addresses from extended
//! public keys, multisig cosigner sets, or imported keys. The server interface
//! speaks newline-delimited JSON to a remote server that answers queries about
//! addresses.

extern crate base64;
extern crate byteorder;
extern crate crypto;
extern crate digest;
extern crate dns_lookup;
extern crate hex;
#[macro_use]
extern crate log;
extern crate linked_hash_map;
extern crate rand;
extern crate ring;
extern crate ripemd160;
extern crate rust_base58;
extern crate secp256k1;
extern crate serde;
extern crate serde_json;
extern crate snowflake;
extern crate socket2;

pub mod account;
pub mod address;
pub mod interface;
pub mod network;
pub mod script;
pub mod util;
pub mod wallet;
