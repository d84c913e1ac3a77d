use anchor_lang::prelude::*;

use crate::constants::{AUTHORITY_SEED, PLAN_LEDGER_SEED};
use crate::state::{AuthorityRegistry, PlanLedger};

pub fn initialize_authority_registry(ctx: Context<InitializeAuthorityRegistry>) -> Result<()> {
    ctx.accounts.plan_ledger.ensure_open()?;
    let ledger_key = ctx.accounts.plan_ledger.key();
    let principal = ctx.accounts.principal.key();

    let registry = &mut ctx.accounts.authority_registry;
    registry.initialize(principal, ledger_key)?;
    registry.bump = ctx.bumps.authority_registry;

    emit!(AuthorityRegistryInitialized {
        principal,
        ledger: ledger_key,
    });
    Ok(())
}

#[derive(Accounts)]
pub struct InitializeAuthorityRegistry<'info> {
    #[account(
        init,
        payer = principal,
        space = 8 + AuthorityRegistry::SIZE,
        seeds = [AUTHORITY_SEED],
        bump
    )]
    pub authority_registry: Account<'info, AuthorityRegistry>,

    #[account(
        seeds = [PLAN_LEDGER_SEED, &plan_ledger.generation.to_le_bytes()],
        bump = plan_ledger.bump
    )]
    pub plan_ledger: Account<'info, PlanLedger>,

    #[account(mut)]
    pub principal: Signer<'info>,

    pub system_program: Program<'info, System>,
}

#[event]
pub struct AuthorityRegistryInitialized {
    pub principal: Pubkey,
    pub ledger: Pubkey,
}
