//! Key material: extended keys, private keys and password encryption

mod extended_key;
mod password;
mod private_key;

pub use self::extended_key::{
    derive_extended_key, is_private_key_valid, ExtendedKey, ExtendedKeyType, EXTENDED_KEY_LEN,
    HARDENED_KEY,
};
pub use self::password::{pw_decode, pw_encode};
pub use self::private_key::PrivateKey;
