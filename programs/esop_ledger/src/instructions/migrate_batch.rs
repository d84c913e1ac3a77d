use anchor_lang::prelude::*;

use crate::constants::{MIGRATION_SEED, PLAN_LEDGER_SEED, REGISTRY_SEED};
use crate::error::LedgerError;
use crate::state::{MigrationSession, ParticipantRegistry, PlanLedger};

/// Copies one batch of source records. Callers loop until the returned count is below
/// `batch_size`.
pub fn migrate_batch(ctx: Context<MigrateBatch>, cursor: u32, batch_size: u32) -> Result<u32> {
    let session_key = ctx.accounts.migration_session.key();
    let session = &mut ctx.accounts.migration_session;

    let copied = session.migrate_batch(
        &session_key,
        &ctx.accounts.source_ledger,
        &ctx.accounts.source_registry,
        &mut ctx.accounts.destination_registry,
        cursor,
        batch_size,
    )?;

    emit!(BatchMigrated {
        session: session_key,
        cursor,
        copied,
        high_water: session.cursor,
        expected_count: session.expected_count,
    });
    Ok(copied)
}

#[derive(Accounts)]
pub struct MigrateBatch<'info> {
    #[account(
        seeds = [PLAN_LEDGER_SEED, &source_ledger.generation.to_le_bytes()],
        bump = source_ledger.bump
    )]
    pub source_ledger: Account<'info, PlanLedger>,

    #[account(
        seeds = [REGISTRY_SEED, source_ledger.key().as_ref()],
        bump = source_registry.bump
    )]
    pub source_registry: Box<Account<'info, ParticipantRegistry>>,

    #[account(
        mut,
        seeds = [
            MIGRATION_SEED,
            source_ledger.key().as_ref(),
            migration_session.destination_ledger.as_ref()
        ],
        bump = migration_session.bump,
        has_one = source_registry @ LedgerError::SessionMismatch,
        has_one = destination_registry @ LedgerError::SessionMismatch,
        has_one = admin @ LedgerError::UnauthorizedAdmin
    )]
    pub migration_session: Account<'info, MigrationSession>,

    #[account(
        mut,
        seeds = [REGISTRY_SEED, migration_session.destination_ledger.as_ref()],
        bump = destination_registry.bump
    )]
    pub destination_registry: Box<Account<'info, ParticipantRegistry>>,

    pub admin: Signer<'info>,
}

#[event]
pub struct BatchMigrated {
    pub session: Pubkey,
    pub cursor: u32,
    pub copied: u32,
    pub high_water: u32,
    pub expected_count: u32,
}
