use anchor_lang::prelude::*;

pub mod constants;
pub mod error;
pub mod instructions;
pub mod state;
pub mod utils;

use instructions::*;
use state::*;

declare_id!("3yPW6vWDemaDfAaoAi2GnBx4tR7i2ghpUEWN9KdWUEk9");

#[program]
pub mod esop_ledger {
    use super::*;

    pub fn initialize_authority_registry(ctx: Context<InitializeAuthorityRegistry>) -> Result<()> {
        instructions::initialize_authority_registry::initialize_authority_registry(ctx)
    }

    pub fn open_ledger(
        ctx: Context<OpenLedger>,
        generation: u64,
        params: PlanParameters,
        pool_capacity: u64,
        legal_wrapper_hash: [u8; 32],
    ) -> Result<()> {
        instructions::open_ledger::open_ledger(ctx, generation, params, pool_capacity, legal_wrapper_hash)
    }

    pub fn offer_options(ctx: Context<OfferOptions>, terms: OfferTerms) -> Result<()> {
        instructions::offer_options::offer_options(ctx, terms)
    }

    pub fn sign_offer(ctx: Context<SignOffer>) -> Result<()> {
        instructions::sign_offer::sign_offer(ctx)
    }

    pub fn reclaim_expired_offer(ctx: Context<ReclaimExpiredOffer>, participant: Pubkey) -> Result<()> {
        instructions::reclaim_expired_offer::reclaim_expired_offer(ctx, participant)
    }

    pub fn terminate_participant(
        ctx: Context<TerminateParticipant>,
        participant: Pubkey,
        termination_time: i64,
        reason: TerminationReason,
    ) -> Result<()> {
        instructions::terminate_participant::terminate_participant(ctx, participant, termination_time, reason)
    }

    pub fn begin_migration(ctx: Context<BeginMigration>) -> Result<()> {
        instructions::begin_migration::begin_migration(ctx)
    }

    pub fn cancel_migration(ctx: Context<CancelMigration>) -> Result<()> {
        instructions::cancel_migration::cancel_migration(ctx)
    }

    pub fn prepare_migration_target(
        ctx: Context<PrepareMigrationTarget>,
        generation: u64,
        legal_wrapper_hash: [u8; 32],
    ) -> Result<()> {
        instructions::prepare_migration_target::prepare_migration_target(ctx, generation, legal_wrapper_hash)
    }

    pub fn start_migration(ctx: Context<StartMigration>) -> Result<()> {
        instructions::start_migration::start_migration(ctx)
    }

    pub fn migrate_batch(ctx: Context<MigrateBatch>, cursor: u32, batch_size: u32) -> Result<u32> {
        instructions::migrate_batch::migrate_batch(ctx, cursor, batch_size)
    }

    pub fn complete_migration(ctx: Context<CompleteMigration>) -> Result<()> {
        instructions::complete_migration::complete_migration(ctx)
    }

    pub fn set_ledger(ctx: Context<SetLedger>, expected_principal: Pubkey) -> Result<()> {
        instructions::set_ledger::set_ledger(ctx, expected_principal)
    }

    pub fn retire_ledger(ctx: Context<RetireLedger>) -> Result<()> {
        instructions::retire_ledger::retire_ledger(ctx)
    }

    pub fn transfer_authority_principal(
        ctx: Context<TransferAuthorityPrincipal>,
        new_principal: Pubkey,
    ) -> Result<()> {
        instructions::transfer_authority_principal::transfer_authority_principal(ctx, new_principal)
    }

    pub fn shutdown_authority_registry(ctx: Context<ShutdownAuthorityRegistry>) -> Result<()> {
        instructions::shutdown_authority_registry::shutdown_authority_registry(ctx)
    }

    pub fn emit_vesting_quote(ctx: Context<EmitVestingQuote>, participant: Pubkey) -> Result<()> {
        instructions::emit_vesting_quote::emit_vesting_quote(ctx, participant)
    }

    pub fn emit_pool_state(ctx: Context<EmitPoolState>) -> Result<()> {
        instructions::emit_pool_state::emit_pool_state(ctx)
    }
}
