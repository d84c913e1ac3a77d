use anchor_lang::prelude::*;

use crate::constants::PLAN_LEDGER_SEED;
use crate::error::LedgerError;
use crate::state::PlanLedger;

/// Freezes the ledger so it can be copied.
pub fn begin_migration(ctx: Context<BeginMigration>) -> Result<()> {
    let ledger_key = ctx.accounts.plan_ledger.key();
    let ledger = &mut ctx.accounts.plan_ledger;
    require_keys_eq!(ctx.accounts.admin.key(), ledger.admin, LedgerError::UnauthorizedAdmin);

    ledger.begin_migration()?;

    emit!(MaintenanceEntered {
        ledger: ledger_key,
        generation: ledger.generation,
    });
    Ok(())
}

#[derive(Accounts)]
pub struct BeginMigration<'info> {
    #[account(
        mut,
        seeds = [PLAN_LEDGER_SEED, &plan_ledger.generation.to_le_bytes()],
        bump = plan_ledger.bump
    )]
    pub plan_ledger: Account<'info, PlanLedger>,

    pub admin: Signer<'info>,
}

#[event]
pub struct MaintenanceEntered {
    pub ledger: Pubkey,
    pub generation: u64,
}
