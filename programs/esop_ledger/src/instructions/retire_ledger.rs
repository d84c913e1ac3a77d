use anchor_lang::prelude::*;

use crate::constants::{AUTHORITY_SEED, MIGRATION_SEED, PLAN_LEDGER_SEED, REGISTRY_SEED};
use crate::error::LedgerError;
use crate::state::{AuthorityRegistry, MigrationPhase, MigrationSession, ParticipantRegistry, PlanLedger};

/// Retires a migrated source instance once it still matches the completed session's
/// snapshot. The registry and session are closed to the admin; the ledger account stays
/// behind as a tombstone so later calls fail with `LedgerRetired`.
pub fn retire_ledger(ctx: Context<RetireLedger>) -> Result<()> {
    let ledger_key = ctx.accounts.plan_ledger.key();
    let destination_key = ctx.accounts.destination_ledger.key();
    let current = ctx.accounts.authority_registry.current_ledger()?;

    let ledger = &mut ctx.accounts.plan_ledger;
    require_keys_eq!(ctx.accounts.admin.key(), ledger.admin, LedgerError::UnauthorizedAdmin);
    ledger.retire(
        &ledger_key,
        &ctx.accounts.registry,
        &ctx.accounts.migration_session,
        &ctx.accounts.destination_ledger,
        &destination_key,
        &current,
    )?;

    emit!(PlanLedgerRetired {
        ledger: ledger_key,
        successor: destination_key,
        generation: ledger.generation,
    });
    Ok(())
}

#[derive(Accounts)]
pub struct RetireLedger<'info> {
    #[account(
        mut,
        seeds = [PLAN_LEDGER_SEED, &plan_ledger.generation.to_le_bytes()],
        bump = plan_ledger.bump,
        has_one = registry @ LedgerError::RegistryMismatch
    )]
    pub plan_ledger: Account<'info, PlanLedger>,

    #[account(
        mut,
        close = admin,
        seeds = [REGISTRY_SEED, plan_ledger.key().as_ref()],
        bump = registry.bump
    )]
    pub registry: Box<Account<'info, ParticipantRegistry>>,

    #[account(
        seeds = [PLAN_LEDGER_SEED, &destination_ledger.generation.to_le_bytes()],
        bump = destination_ledger.bump
    )]
    pub destination_ledger: Account<'info, PlanLedger>,

    #[account(
        mut,
        close = admin,
        seeds = [
            MIGRATION_SEED,
            plan_ledger.key().as_ref(),
            destination_ledger.key().as_ref()
        ],
        bump = migration_session.bump,
        constraint = migration_session.phase == MigrationPhase::Completed
            @ LedgerError::MigrationPhaseMismatch
    )]
    pub migration_session: Account<'info, MigrationSession>,

    #[account(seeds = [AUTHORITY_SEED], bump = authority_registry.bump)]
    pub authority_registry: Account<'info, AuthorityRegistry>,

    #[account(mut)]
    pub admin: Signer<'info>,
}

#[event]
pub struct PlanLedgerRetired {
    pub ledger: Pubkey,
    pub successor: Pubkey,
    pub generation: u64,
}
