use anchor_lang::prelude::*;

use crate::constants::{PLAN_LEDGER_SEED, REGISTRY_SEED};
use crate::error::LedgerError;
use crate::state::{ParticipantRegistry, PlanLedger};

/// Permissionless: anyone may return an unsigned, expired offer to the pool.
pub fn reclaim_expired_offer(ctx: Context<ReclaimExpiredOffer>, participant: Pubkey) -> Result<()> {
    let ledger_key = ctx.accounts.plan_ledger.key();
    let now = Clock::get()?.unix_timestamp;

    let ledger = &mut ctx.accounts.plan_ledger;
    let record = ledger.reclaim_expired(&ledger_key, &mut ctx.accounts.registry, &participant, now)?;

    emit!(OfferExpired {
        ledger: ledger_key,
        participant,
        sign_deadline: record.sign_deadline,
        returned_pool_options: record.pool_options,
        released_extra_options: record.extra_options,
        remaining_pool_options: ledger.pool.remaining_pool_options,
    });
    Ok(())
}

#[derive(Accounts)]
pub struct ReclaimExpiredOffer<'info> {
    #[account(
        mut,
        seeds = [PLAN_LEDGER_SEED, &plan_ledger.generation.to_le_bytes()],
        bump = plan_ledger.bump,
        has_one = registry @ LedgerError::RegistryMismatch
    )]
    pub plan_ledger: Account<'info, PlanLedger>,

    #[account(
        mut,
        seeds = [REGISTRY_SEED, plan_ledger.key().as_ref()],
        bump = registry.bump
    )]
    pub registry: Box<Account<'info, ParticipantRegistry>>,
}

#[event]
pub struct OfferExpired {
    pub ledger: Pubkey,
    pub participant: Pubkey,
    pub sign_deadline: i64,
    pub returned_pool_options: u64,
    pub released_extra_options: u64,
    pub remaining_pool_options: u64,
}
