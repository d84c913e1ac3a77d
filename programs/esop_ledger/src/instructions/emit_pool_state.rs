use anchor_lang::prelude::*;

use crate::constants::PLAN_LEDGER_SEED;
use crate::state::{LedgerState, PlanLedger};

pub fn emit_pool_state(ctx: Context<EmitPoolState>) -> Result<()> {
    let ledger = &ctx.accounts.plan_ledger;
    let pool = ledger.pool_state()?;

    emit!(PoolStateEmitted {
        ledger: ledger.key(),
        generation: ledger.generation,
        state: ledger.state,
        pool_capacity: pool.pool_capacity,
        total_pool_options: pool.total_pool_options,
        total_extra_options: pool.total_extra_options,
        remaining_pool_options: pool.remaining_pool_options,
    });
    Ok(())
}

#[derive(Accounts)]
pub struct EmitPoolState<'info> {
    #[account(
        seeds = [PLAN_LEDGER_SEED, &plan_ledger.generation.to_le_bytes()],
        bump = plan_ledger.bump
    )]
    pub plan_ledger: Account<'info, PlanLedger>,
}

#[event]
pub struct PoolStateEmitted {
    pub ledger: Pubkey,
    pub generation: u64,
    pub state: LedgerState,
    pub pool_capacity: u64,
    pub total_pool_options: u64,
    pub total_extra_options: u64,
    pub remaining_pool_options: u64,
}
