use anchor_lang::prelude::*;

use crate::constants::{MIGRATION_SEED, PLAN_LEDGER_SEED, REGISTRY_SEED};
use crate::error::LedgerError;
use crate::state::{MigrationSession, ParticipantRegistry, PlanLedger};

/// Reconciles the copy against the frozen source and marks the target verified.
pub fn complete_migration(ctx: Context<CompleteMigration>) -> Result<()> {
    let session_key = ctx.accounts.migration_session.key();
    let session = &mut ctx.accounts.migration_session;

    session.complete(
        &session_key,
        &ctx.accounts.source_ledger,
        &ctx.accounts.source_registry,
        &mut ctx.accounts.destination_ledger,
        &mut ctx.accounts.destination_registry,
    )?;

    emit!(MigrationCompleted {
        session: session_key,
        source: session.source_ledger,
        destination: session.destination_ledger,
        migrated_count: session.cursor,
        records_digest: session.records_digest,
    });
    Ok(())
}

#[derive(Accounts)]
pub struct CompleteMigration<'info> {
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
        seeds = [PLAN_LEDGER_SEED, &destination_ledger.generation.to_le_bytes()],
        bump = destination_ledger.bump
    )]
    pub destination_ledger: Account<'info, PlanLedger>,

    #[account(
        mut,
        seeds = [REGISTRY_SEED, destination_ledger.key().as_ref()],
        bump = destination_registry.bump
    )]
    pub destination_registry: Box<Account<'info, ParticipantRegistry>>,

    #[account(
        mut,
        seeds = [
            MIGRATION_SEED,
            source_ledger.key().as_ref(),
            destination_ledger.key().as_ref()
        ],
        bump = migration_session.bump,
        has_one = admin @ LedgerError::UnauthorizedAdmin
    )]
    pub migration_session: Account<'info, MigrationSession>,

    pub admin: Signer<'info>,
}

#[event]
pub struct MigrationCompleted {
    pub session: Pubkey,
    pub source: Pubkey,
    pub destination: Pubkey,
    pub migrated_count: u32,
    pub records_digest: [u8; 32],
}
