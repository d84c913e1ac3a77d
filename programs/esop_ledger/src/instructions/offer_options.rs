use anchor_lang::prelude::*;

use crate::constants::{PLAN_LEDGER_SEED, REGISTRY_SEED};
use crate::error::LedgerError;
use crate::state::{OfferTerms, ParticipantRegistry, PlanLedger};

pub fn offer_options(ctx: Context<OfferOptions>, terms: OfferTerms) -> Result<()> {
    let ledger_key = ctx.accounts.plan_ledger.key();
    let ledger = &mut ctx.accounts.plan_ledger;
    require_keys_eq!(ctx.accounts.admin.key(), ledger.admin, LedgerError::UnauthorizedAdmin);

    let now = Clock::get()?.unix_timestamp;
    let record = ledger.offer(
        &ledger_key,
        &mut ctx.accounts.registry,
        terms,
        now,
    )?;

    emit!(OptionsOffered {
        ledger: ledger_key,
        participant: record.participant,
        pool_options: record.pool_options,
        extra_options: record.extra_options,
        pool_cleanup: record.pool_cleanup,
        vesting_start: record.vesting_start,
        sign_deadline: record.sign_deadline,
        remaining_pool_options: ledger.pool.remaining_pool_options,
    });
    Ok(())
}

#[derive(Accounts)]
pub struct OfferOptions<'info> {
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

    pub admin: Signer<'info>,
}

#[event]
pub struct OptionsOffered {
    pub ledger: Pubkey,
    pub participant: Pubkey,
    pub pool_options: u64,
    pub extra_options: u64,
    pub pool_cleanup: bool,
    pub vesting_start: i64,
    pub sign_deadline: i64,
    pub remaining_pool_options: u64,
}
