//! Miscellaneous helpers

mod base58;
mod hash;
mod result;

pub use self::base58::{base58check_decode, base58check_encode};
pub use self::hash::{hash160, sha256d, Hash160};
pub use self::result::{Error, Result};
