use crate::util::{sha256d, Error, Result};
use rust_base58::base58::{FromBase58, ToBase58};

/// Appends a 4-byte double-SHA256 checksum and encodes to base-58
pub fn base58check_encode(payload: &[u8]) -> String {
    let checksum = sha256d(payload);
    let mut v = Vec::with_capacity(payload.len() + 4);
    v.extend_from_slice(payload);
    v.extend_from_slice(&checksum[..4]);
    v.to_base58()
}

/// Decodes a base-58 string and verifies and strips its checksum
pub fn base58check_decode(s: &str) -> Result<Vec<u8>> {
    let v = s.from_base58()?;
    if v.len() < 5 {
        let msg = format!("Base58 data too short: {}", v.len());
        return Err(Error::BadData(msg));
    }
    let (payload, checksum) = v.split_at(v.len() - 4);
    let expected = sha256d(payload);
    if checksum != &expected[..4] {
        let msg = format!("Bad checksum: {:?} != {:?}", &expected[..4], checksum);
        return Err(Error::BadData(msg));
    }
    Ok(payload.to_vec())
}
