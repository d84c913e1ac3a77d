use anchor_lang::prelude::*;

use crate::constants::{MAX_PARTICIPANTS, PLAN_LEDGER_SEED, REGISTRY_SEED};
use crate::error::LedgerError;
use crate::state::{ParticipantRegistry, PlanLedger};

/// Creates the successor instance, frozen and empty, under a new generation. The
/// successor is bound to `legal_wrapper_hash`, which may differ from the source's.
pub fn prepare_migration_target(
    ctx: Context<PrepareMigrationTarget>,
    generation: u64,
    legal_wrapper_hash: [u8; 32],
) -> Result<()> {
    let source = &ctx.accounts.source_ledger;
    require_keys_eq!(ctx.accounts.admin.key(), source.admin, LedgerError::UnauthorizedAdmin);
    require!(generation != source.generation, LedgerError::InvalidConfig);
    source.ensure_readable()?;

    let source_key = source.key();
    let ledger_key = ctx.accounts.plan_ledger.key();
    let registry_key = ctx.accounts.registry.key();

    let ledger = &mut ctx.accounts.plan_ledger;
    ledger.generation = generation;
    ledger.registry = registry_key;
    ledger.bump = ctx.bumps.plan_ledger;
    ledger.prepare_migration_target(ctx.accounts.admin.key(), source_key, legal_wrapper_hash)?;

    let registry = &mut ctx.accounts.registry;
    registry.ledger = ledger_key;
    registry.controller = ledger_key;
    registry.participants = Vec::with_capacity(MAX_PARTICIPANTS);
    registry.bump = ctx.bumps.registry;

    emit!(MigrationTargetPrepared {
        source: source_key,
        destination: ledger_key,
        generation,
        legal_wrapper_hash,
    });
    Ok(())
}

#[derive(Accounts)]
#[instruction(generation: u64)]
pub struct PrepareMigrationTarget<'info> {
    #[account(
        seeds = [PLAN_LEDGER_SEED, &source_ledger.generation.to_le_bytes()],
        bump = source_ledger.bump
    )]
    pub source_ledger: Account<'info, PlanLedger>,

    #[account(
        init,
        payer = admin,
        space = 8 + PlanLedger::SIZE,
        seeds = [PLAN_LEDGER_SEED, &generation.to_le_bytes()],
        bump
    )]
    pub plan_ledger: Account<'info, PlanLedger>,

    #[account(
        init,
        payer = admin,
        space = ParticipantRegistry::space(MAX_PARTICIPANTS),
        seeds = [REGISTRY_SEED, plan_ledger.key().as_ref()],
        bump
    )]
    pub registry: Box<Account<'info, ParticipantRegistry>>,

    #[account(mut)]
    pub admin: Signer<'info>,

    pub system_program: Program<'info, System>,
}

#[event]
pub struct MigrationTargetPrepared {
    pub source: Pubkey,
    pub destination: Pubkey,
    pub generation: u64,
    pub legal_wrapper_hash: [u8; 32],
}
