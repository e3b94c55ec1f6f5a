use crate::account::PubkeySet;
use crate::util::Result;
use hex;
use serde::{Deserialize, Serialize};
use serde_json;
use std::collections::BTreeMap;

/// Public keys at one chain position as stored on disk
///
/// Single-key accounts store a hex string, multisig accounts a list of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StoredPubkeys {
    Single(String),
    Multi(Vec<String>),
}

impl StoredPubkeys {
    pub fn decode(&self) -> Result<PubkeySet> {
        match self {
            StoredPubkeys::Single(s) => Ok(vec![hex::decode(s)?]),
            StoredPubkeys::Multi(v) => {
                let mut pubkeys = Vec::with_capacity(v.len());
                for s in v {
                    pubkeys.push(hex::decode(s)?);
                }
                Ok(pubkeys)
            }
        }
    }
}

/// Persisted account fields
///
/// Which fields are present decides the account kind: `imported` for imported
/// keys, `xpubs` for multisig, `xpub` for HD, and neither for a plain list of
/// stored keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receiving: Option<Vec<StoredPubkeys>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change: Option<Vec<StoredPubkeys>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xpub: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xpubs: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub m: Option<usize>,
    /// Address to (public key hex, encrypted private key)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub imported: Option<BTreeMap<String, (String, String)>>,
}

impl AccountConfig {
    pub fn from_json(s: &str) -> Result<AccountConfig> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub(crate) fn receiving(&self) -> &[StoredPubkeys] {
        self.receiving.as_ref().map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub(crate) fn change(&self) -> &[StoredPubkeys] {
        self.change.as_ref().map(|v| v.as_slice()).unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_multisig() {
        let json = r#"{"receiving": [["02aa", "03bb"]], "change": [], "xpubs": ["a", "b"], "m": 2}"#;
        let config = AccountConfig::from_json(json).unwrap();
        assert!(config.m == Some(2));
        assert!(config.xpubs.as_ref().unwrap().len() == 2);
        let pubkeys = config.receiving()[0].decode().unwrap();
        assert!(pubkeys == vec![vec![0x02, 0xaa], vec![0x03, 0xbb]]);
        assert!(config.change().is_empty());
    }

    #[test]
    fn parse_imported() {
        let json = r#"{"imported": {"1abc": ["02aa", "ciphertext"]}}"#;
        let config = AccountConfig::from_json(json).unwrap();
        let imported = config.imported.unwrap();
        assert!(imported["1abc"] == ("02aa".to_string(), "ciphertext".to_string()));
    }

    #[test]
    fn absent_fields_are_not_written() {
        let config = AccountConfig {
            xpub: Some("xpub123".to_string()),
            ..Default::default()
        };
        assert!(config.to_json().unwrap() == r#"{"xpub":"xpub123"}"#);
        assert!(config.receiving().is_empty());
    }

    #[test]
    fn bad_json() {
        assert!(AccountConfig::from_json("{").is_err());
        assert!(AccountConfig::from_json(r#"{"m": "two"}"#).is_err());
    }
}
