use crate::account::{Account, Chain, WalletView};
use crate::util::Result;

/// Extends a chain until its last `gap_limit` addresses are all unused
///
/// New addresses are registered with the wallet as they are created. Returns
/// how many were added. Must be run again whenever new activity is seen,
/// since funds may arrive past the current frontier.
pub fn synchronize_chain<A: Account + ?Sized>(
    account: &mut A,
    wallet: &mut dyn WalletView,
    chain: Chain,
) -> Result<usize> {
    let limit = wallet.gap_limit(chain);
    let mut created = 0;
    loop {
        let addresses = account.chains().get(chain).addresses();
        if addresses.len() >= limit {
            let trailing = &addresses[addresses.len() - limit..];
            if trailing.iter().all(|a| !wallet.is_address_used(a)) {
                break;
            }
        }
        let address = account.create_new_address(chain)?;
        debug!("New {:?} address {}", chain, address);
        wallet.register_address(&address);
        created += 1;
    }
    Ok(created)
}
