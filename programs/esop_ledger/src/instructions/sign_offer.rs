use anchor_lang::prelude::*;

use crate::constants::{PLAN_LEDGER_SEED, REGISTRY_SEED};
use crate::error::LedgerError;
use crate::state::{ParticipantRegistry, PlanLedger};

pub fn sign_offer(ctx: Context<SignOffer>) -> Result<()> {
    let ledger_key = ctx.accounts.plan_ledger.key();
    let participant = ctx.accounts.participant.key();
    let now = Clock::get()?.unix_timestamp;

    let record = ctx.accounts.plan_ledger.sign(
        &ledger_key,
        &mut ctx.accounts.registry,
        &participant,
        now,
    )?;

    emit!(OfferSigned {
        ledger: ledger_key,
        participant,
        signed_at: now,
        pool_options: record.pool_options,
        extra_options: record.extra_options,
    });
    Ok(())
}

#[derive(Accounts)]
pub struct SignOffer<'info> {
    #[account(
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

    pub participant: Signer<'info>,
}

#[event]
pub struct OfferSigned {
    pub ledger: Pubkey,
    pub participant: Pubkey,
    pub signed_at: i64,
    pub pool_options: u64,
    pub extra_options: u64,
}
