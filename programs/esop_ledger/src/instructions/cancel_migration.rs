use anchor_lang::prelude::*;

use crate::constants::PLAN_LEDGER_SEED;
use crate::error::LedgerError;
use crate::state::PlanLedger;

/// Leaves maintenance mode. Also opens a verified migration target.
pub fn cancel_migration(ctx: Context<CancelMigration>) -> Result<()> {
    let ledger_key = ctx.accounts.plan_ledger.key();
    let ledger = &mut ctx.accounts.plan_ledger;
    require_keys_eq!(ctx.accounts.admin.key(), ledger.admin, LedgerError::UnauthorizedAdmin);

    ledger.cancel_migration()?;

    emit!(MaintenanceExited {
        ledger: ledger_key,
        generation: ledger.generation,
        migrated_from: ledger.migrated_from,
    });
    Ok(())
}

#[derive(Accounts)]
pub struct CancelMigration<'info> {
    #[account(
        mut,
        seeds = [PLAN_LEDGER_SEED, &plan_ledger.generation.to_le_bytes()],
        bump = plan_ledger.bump
    )]
    pub plan_ledger: Account<'info, PlanLedger>,

    pub admin: Signer<'info>,
}

#[event]
pub struct MaintenanceExited {
    pub ledger: Pubkey,
    pub generation: u64,
    pub migrated_from: Option<Pubkey>,
}
