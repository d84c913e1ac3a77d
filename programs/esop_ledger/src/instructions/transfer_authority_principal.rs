use anchor_lang::prelude::*;

use crate::constants::AUTHORITY_SEED;
use crate::state::AuthorityRegistry;

pub fn transfer_authority_principal(
    ctx: Context<TransferAuthorityPrincipal>,
    new_principal: Pubkey,
) -> Result<()> {
    let caller = ctx.accounts.principal.key();
    let old_principal = ctx
        .accounts
        .authority_registry
        .transfer_principal(&caller, new_principal)?;

    emit!(PrincipalTransferred {
        old_principal,
        new_principal,
    });
    Ok(())
}

#[derive(Accounts)]
pub struct TransferAuthorityPrincipal<'info> {
    #[account(mut, seeds = [AUTHORITY_SEED], bump = authority_registry.bump)]
    pub authority_registry: Account<'info, AuthorityRegistry>,

    pub principal: Signer<'info>,
}

#[event]
pub struct PrincipalTransferred {
    pub old_principal: Pubkey,
    pub new_principal: Pubkey,
}
