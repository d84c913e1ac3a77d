use anchor_lang::prelude::*;

use crate::constants::{MIGRATION_SEED, PLAN_LEDGER_SEED, REGISTRY_SEED};
use crate::error::LedgerError;
use crate::state::{MigrationEndpoints, MigrationSession, ParticipantRegistry, PlanLedger};

/// Imports the frozen source snapshot into the target, opens a copy session and locks
/// the source to the target until it retires.
pub fn start_migration(ctx: Context<StartMigration>) -> Result<()> {
    let admin = ctx.accounts.admin.key();
    require_keys_eq!(admin, ctx.accounts.source_ledger.admin, LedgerError::UnauthorizedAdmin);
    require_keys_eq!(
        admin,
        ctx.accounts.destination_ledger.admin,
        LedgerError::UnauthorizedAdmin
    );

    let endpoints = MigrationEndpoints {
        source_ledger: ctx.accounts.source_ledger.key(),
        source_registry: ctx.accounts.source_registry.key(),
        destination_ledger: ctx.accounts.destination_ledger.key(),
        destination_registry: ctx.accounts.destination_registry.key(),
    };
    let session_key = ctx.accounts.migration_session.key();

    let session = &mut ctx.accounts.migration_session;
    session.admin = admin;
    session.bump = ctx.bumps.migration_session;
    session.start(
        &session_key,
        endpoints,
        &mut ctx.accounts.source_ledger,
        &ctx.accounts.source_registry,
        &mut ctx.accounts.destination_ledger,
        &mut ctx.accounts.destination_registry,
    )?;

    emit!(MigrationStarted {
        session: session_key,
        source: endpoints.source_ledger,
        destination: endpoints.destination_ledger,
        expected_count: session.expected_count,
        pool_capacity: session.expected_pool.pool_capacity,
        total_pool_options: session.expected_pool.total_pool_options,
        total_extra_options: session.expected_pool.total_extra_options,
        legal_wrapper_hash: ctx.accounts.destination_ledger.legal_wrapper_hash,
    });
    Ok(())
}

#[derive(Accounts)]
pub struct StartMigration<'info> {
    #[account(
        mut,
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
        init,
        payer = admin,
        space = 8 + MigrationSession::SIZE,
        seeds = [
            MIGRATION_SEED,
            source_ledger.key().as_ref(),
            destination_ledger.key().as_ref()
        ],
        bump
    )]
    pub migration_session: Account<'info, MigrationSession>,

    #[account(mut)]
    pub admin: Signer<'info>,

    pub system_program: Program<'info, System>,
}

#[event]
pub struct MigrationStarted {
    pub session: Pubkey,
    pub source: Pubkey,
    pub destination: Pubkey,
    pub expected_count: u32,
    pub pool_capacity: u64,
    pub total_pool_options: u64,
    pub total_extra_options: u64,
    pub legal_wrapper_hash: [u8; 32],
}
