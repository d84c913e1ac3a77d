use anchor_lang::prelude::*;

use crate::constants::{AUTHORITY_SEED, PLAN_LEDGER_SEED};
use crate::state::{AuthorityRegistry, PlanLedger};

/// Points the authority registry at `new_ledger`. The new instance must already be
/// open, so a migration target can only be published after verification.
pub fn set_ledger(ctx: Context<SetLedger>, expected_principal: Pubkey) -> Result<()> {
    ctx.accounts.new_ledger.ensure_open()?;
    let new_ledger = ctx.accounts.new_ledger.key();
    let caller = ctx.accounts.principal.key();

    let registry = &mut ctx.accounts.authority_registry;
    let old_ledger = registry.set_ledger(&caller, new_ledger, &expected_principal)?;

    emit!(LedgerChanged {
        old_ledger,
        new_ledger,
        change_count: registry.change_count,
    });
    Ok(())
}

#[derive(Accounts)]
pub struct SetLedger<'info> {
    #[account(mut, seeds = [AUTHORITY_SEED], bump = authority_registry.bump)]
    pub authority_registry: Account<'info, AuthorityRegistry>,

    #[account(
        seeds = [PLAN_LEDGER_SEED, &new_ledger.generation.to_le_bytes()],
        bump = new_ledger.bump
    )]
    pub new_ledger: Account<'info, PlanLedger>,

    pub principal: Signer<'info>,
}

#[event]
pub struct LedgerChanged {
    pub old_ledger: Pubkey,
    pub new_ledger: Pubkey,
    pub change_count: u64,
}
