//! Script construction for multisig redeem scripts
//!
//! # Examples
//!
//! Build a 2-of-3 redeem script:
//!
//! ```rust
//! use lightwallet::script::create_multisig_script;
//!
//! let pubkeys = vec![vec![2; 33], vec![3; 33], vec![4; 33]];
//! let script = create_multisig_script(&pubkeys, 2).unwrap();
//! ```

use crate::script::op_codes::*;
use hex;
use std::fmt;

mod multisig;
#[allow(dead_code)]
pub mod op_codes;

pub use self::multisig::{create_multisig_script, MAX_PUBKEYS_PER_MULTISIG};

/// Transaction script
#[derive(Default, Clone, PartialEq, Eq, Hash)]
pub struct Script(pub Vec<u8>);

impl Script {
    /// Creates a new empty script
    pub fn new() -> Script {
        Script(vec![])
    }

    /// Appends a single opcode or data byte
    pub fn append(&mut self, byte: u8) {
        self.0.push(byte);
    }

    /// Appends the opcodes and provided data that push it onto the stack
    pub fn append_data(&mut self, data: &[u8]) {
        let len = data.len();
        match len {
            0 => self.0.push(OP_0),
            1..=75 => {
                self.0.push(OP_PUSH + len as u8);
                self.0.extend_from_slice(data);
            }
            76..=255 => {
                self.0.push(OP_PUSHDATA1);
                self.0.push(len as u8);
                self.0.extend_from_slice(data);
            }
            256..=65535 => {
                self.0.push(OP_PUSHDATA2);
                self.0.push((len >> 0) as u8);
                self.0.push((len >> 8) as u8);
                self.0.extend_from_slice(data);
            }
            _ => {
                self.0.push(OP_PUSHDATA4);
                self.0.push((len >> 0) as u8);
                self.0.push((len >> 8) as u8);
                self.0.push((len >> 16) as u8);
                self.0.push((len >> 24) as u8);
                self.0.extend_from_slice(data);
            }
        }
    }

    /// Returns the script as a hex string
    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }
}

impl fmt::Debug for Script {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Script({})", self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_data() {
        let mut s = Script::new();
        s.append_data(&[]);
        assert!(s.0 == vec![OP_0]);

        let mut s = Script::new();
        s.append_data(&[7; 33]);
        assert!(s.0[0] == 33 && s.0.len() == 34);

        let mut s = Script::new();
        s.append_data(&[7; 80]);
        assert!(s.0[0] == OP_PUSHDATA1 && s.0[1] == 80 && s.0.len() == 82);

        let mut s = Script::new();
        s.append_data(&[7; 300]);
        assert!(s.0[..3] == [OP_PUSHDATA2, 44, 1]);
    }
}
