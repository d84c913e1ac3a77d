use anchor_lang::prelude::*;

use crate::constants::{PLAN_LEDGER_SEED, REGISTRY_SEED};
use crate::error::LedgerError;
use crate::state::{ParticipantRegistry, PlanLedger, TerminationReason};

pub fn terminate_participant(
    ctx: Context<TerminateParticipant>,
    participant: Pubkey,
    termination_time: i64,
    reason: TerminationReason,
) -> Result<()> {
    let ledger_key = ctx.accounts.plan_ledger.key();
    let ledger = &mut ctx.accounts.plan_ledger;
    require_keys_eq!(ctx.accounts.admin.key(), ledger.admin, LedgerError::UnauthorizedAdmin);

    let now = Clock::get()?.unix_timestamp;
    let outcome = ledger.terminate(
        &ledger_key,
        &mut ctx.accounts.registry,
        &participant,
        termination_time,
        reason,
        now,
    )?;

    emit!(ParticipantTerminated {
        ledger: ledger_key,
        participant,
        termination_time,
        reason: outcome.reason,
        vested_pool_options: outcome.split.vested_base,
        forfeited_pool_options: outcome.split.forfeited_base,
        vested_extra_options: outcome.split.vested_extra,
        forfeited_extra_options: outcome.split.forfeited_extra,
        remaining_pool_options: ledger.pool.remaining_pool_options,
    });
    Ok(())
}

#[derive(Accounts)]
pub struct TerminateParticipant<'info> {
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
pub struct ParticipantTerminated {
    pub ledger: Pubkey,
    pub participant: Pubkey,
    pub termination_time: i64,
    pub reason: TerminationReason,
    pub vested_pool_options: u64,
    pub forfeited_pool_options: u64,
    pub vested_extra_options: u64,
    pub forfeited_extra_options: u64,
    pub remaining_pool_options: u64,
}
