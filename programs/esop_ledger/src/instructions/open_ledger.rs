use anchor_lang::prelude::*;

use crate::constants::{MAX_PARTICIPANTS, PLAN_LEDGER_SEED, REGISTRY_SEED};
use crate::state::{ParticipantRegistry, PlanLedger, PlanParameters};

pub fn open_ledger(
    ctx: Context<OpenLedger>,
    generation: u64,
    params: PlanParameters,
    pool_capacity: u64,
    legal_wrapper_hash: [u8; 32],
) -> Result<()> {
    let ledger_key = ctx.accounts.plan_ledger.key();
    let registry_key = ctx.accounts.registry.key();

    let ledger = &mut ctx.accounts.plan_ledger;
    ledger.generation = generation;
    ledger.admin = ctx.accounts.admin.key();
    ledger.registry = registry_key;
    ledger.migrated_from = None;
    ledger.migration_verified = false;
    ledger.bump = ctx.bumps.plan_ledger;
    ledger.open(params, pool_capacity, legal_wrapper_hash)?;

    let registry = &mut ctx.accounts.registry;
    registry.ledger = ledger_key;
    registry.controller = ledger_key;
    registry.participants = Vec::with_capacity(MAX_PARTICIPANTS);
    registry.bump = ctx.bumps.registry;

    emit!(LedgerOpened {
        ledger: ledger_key,
        generation,
        admin: ledger.admin,
        pool_capacity,
        legal_wrapper_hash,
    });
    Ok(())
}

#[derive(Accounts)]
#[instruction(generation: u64)]
pub struct OpenLedger<'info> {
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
pub struct LedgerOpened {
    pub ledger: Pubkey,
    pub generation: u64,
    pub admin: Pubkey,
    pub pool_capacity: u64,
    pub legal_wrapper_hash: [u8; 32],
}
