use anchor_lang::prelude::*;

use crate::constants::{PLAN_LEDGER_SEED, REGISTRY_SEED};
use crate::error::LedgerError;
use crate::state::{ParticipantRegistry, PlanLedger};

pub fn emit_vesting_quote(ctx: Context<EmitVestingQuote>, participant: Pubkey) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    let quote = ctx
        .accounts
        .plan_ledger
        .vesting_quote(&ctx.accounts.registry, &participant, now)?;

    emit!(VestingQuoteEmitted {
        ledger: ctx.accounts.plan_ledger.key(),
        participant,
        as_of: now,
        vested_pool_options: quote.vested_pool_options,
        vested_extra_options: quote.vested_extra_options,
        retained_pool_options: quote.retained_pool_options,
        retained_extra_options: quote.retained_extra_options,
        bonus_options: quote.bonus_options,
        equity_units: quote.equity_units,
    });

    Ok(())
}

#[derive(Accounts)]
pub struct EmitVestingQuote<'info> {
    #[account(
        seeds = [PLAN_LEDGER_SEED, &plan_ledger.generation.to_le_bytes()],
        bump = plan_ledger.bump,
        has_one = registry @ LedgerError::RegistryMismatch
    )]
    pub plan_ledger: Account<'info, PlanLedger>,

    #[account(
        seeds = [REGISTRY_SEED, plan_ledger.key().as_ref()],
        bump = registry.bump
    )]
    pub registry: Box<Account<'info, ParticipantRegistry>>,
}

#[event]
pub struct VestingQuoteEmitted {
    pub ledger: Pubkey,
    pub participant: Pubkey,
    pub as_of: i64,
    pub vested_pool_options: u64,
    pub vested_extra_options: u64,
    pub retained_pool_options: u64,
    pub retained_extra_options: u64,
    pub bonus_options: u64,
    pub equity_units: u64,
}
