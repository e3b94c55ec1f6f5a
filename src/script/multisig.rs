//! Bare m-of-n multisig redeem scripts

use crate::script::op_codes::{OP_1, OP_CHECKMULTISIG};
use crate::script::Script;
use crate::util::{Error, Result};

/// Maximum number of public keys encodable with the small-number opcodes
pub const MAX_PUBKEYS_PER_MULTISIG: usize = 16;

/// Creates the redeem script `OP_m <pubkeys...> OP_n OP_CHECKMULTISIG`
///
/// Keys are written in the order given. Callers wanting an order-independent
/// script must sort them first.
pub fn create_multisig_script(pubkeys: &[Vec<u8>], m: usize) -> Result<Script> {
    let n = pubkeys.len();
    if n == 0 || n > MAX_PUBKEYS_PER_MULTISIG {
        let msg = format!("Multisig needs 1 to {} keys, got {}", MAX_PUBKEYS_PER_MULTISIG, n);
        return Err(Error::BadArgument(msg));
    }
    if m == 0 || m > n {
        let msg = format!("Threshold {} out of range for {} keys", m, n);
        return Err(Error::BadArgument(msg));
    }

    let mut script = Script::new();
    script.append(OP_1 + (m - 1) as u8);
    for pubkey in pubkeys {
        script.append_data(pubkey);
    }
    script.append(OP_1 + (n - 1) as u8);
    script.append(OP_CHECKMULTISIG);
    Ok(script)
}
