use anchor_lang::prelude::*;

use crate::constants::AUTHORITY_SEED;
use crate::state::AuthorityRegistry;

/// Permanently disables the registry. There is no way back.
pub fn shutdown_authority_registry(ctx: Context<ShutdownAuthorityRegistry>) -> Result<()> {
    let caller = ctx.accounts.principal.key();
    let registry = &mut ctx.accounts.authority_registry;
    registry.shutdown(&caller)?;

    emit!(AuthorityRegistryShutDown {
        principal: caller,
        last_ledger: registry.current_ledger,
    });
    Ok(())
}

#[derive(Accounts)]
pub struct ShutdownAuthorityRegistry<'info> {
    #[account(mut, seeds = [AUTHORITY_SEED], bump = authority_registry.bump)]
    pub authority_registry: Account<'info, AuthorityRegistry>,

    pub principal: Signer<'info>,
}

#[event]
pub struct AuthorityRegistryShutDown {
    pub principal: Pubkey,
    pub last_ledger: Pubkey,
}
