use anchor_lang::prelude::*;

use crate::constants::{MAX_MIGRATION_BATCH, MAX_PARTICIPANTS};
use crate::error::{LedgerError, LedgerResult};
use crate::state::{ParticipantRecord, ParticipantRegistry, PlanLedger, PoolState};

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MigrationPhase {
    #[default]
    NotStarted,
    InProgress,
    Completed,
}

/// Account keys a session is bound to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MigrationEndpoints {
    pub source_ledger: Pubkey,
    pub source_registry: Pubkey,
    pub destination_ledger: Pubkey,
    pub destination_registry: Pubkey,
}

/// Resumable copy of one ledger instance into its successor.
/// Seeds: [b"migration", source_ledger, destination_ledger]
///
/// While the session runs it controls the destination registry. `cursor` is a
/// high-water mark: a batch may restart anywhere at or below it, and only records past
/// it are folded into the accumulators and `records_digest`.
#[account]
#[derive(Default)]
pub struct MigrationSession {
    pub source_ledger: Pubkey,
    pub destination_ledger: Pubkey,
    pub source_registry: Pubkey,
    pub destination_registry: Pubkey,
    pub admin: Pubkey,
    pub cursor: u32,
    pub phase: MigrationPhase,
    pub expected_count: u32,
    pub expected_pool: PoolState,
    pub accumulated_pool_options: u64,
    pub accumulated_extra_options: u64,
    /// blake3 chain over copied records in cursor order.
    pub records_digest: [u8; 32],
    pub bump: u8,
}

impl MigrationSession {
    pub const SIZE: usize =
        32 * 5 + // ledgers, registries, admin
        4 +      // cursor
        1 +      // phase
        4 +      // expected_count
        PoolState::SIZE +
        8 +      // accumulated_pool_options
        8 +      // accumulated_extra_options
        32 +     // records_digest
        1;       // bump

    fn ensure_phase(&self, phase: MigrationPhase) -> LedgerResult<()> {
        if self.phase != phase {
            return Err(LedgerError::MigrationPhaseMismatch);
        }
        Ok(())
    }

    fn ensure_registries(
        &self,
        source_registry: &ParticipantRegistry,
        destination_registry: &ParticipantRegistry,
    ) -> LedgerResult<()> {
        if source_registry.ledger != self.source_ledger
            || destination_registry.ledger != self.destination_ledger
        {
            return Err(LedgerError::RegistryMismatch);
        }
        Ok(())
    }

    /// Imports the frozen source snapshot into `destination`, takes control of the
    /// destination registry and locks the source to this destination.
    pub fn start(
        &mut self,
        session_key: &Pubkey,
        endpoints: MigrationEndpoints,
        source: &mut PlanLedger,
        source_registry: &ParticipantRegistry,
        destination: &mut PlanLedger,
        destination_registry: &mut ParticipantRegistry,
    ) -> LedgerResult<()> {
        self.ensure_phase(MigrationPhase::NotStarted)?;
        if source.registry != endpoints.source_registry
            || destination.registry != endpoints.destination_registry
            || source_registry.ledger != endpoints.source_ledger
            || destination_registry.ledger != endpoints.destination_ledger
        {
            return Err(LedgerError::RegistryMismatch);
        }
        destination_registry.ensure_controller(&endpoints.destination_ledger)?;
        if source.migrating_to.is_some() {
            return Err(LedgerError::MigrationLocked);
        }
        let expected_count =
            u32::try_from(source_registry.len()).map_err(|_| LedgerError::MathOverflow)?;

        let expected_pool = destination.import_snapshot(source, &endpoints.source_ledger)?;
        destination_registry.transfer_control(&endpoints.destination_ledger, *session_key)?;
        source.bind_migration(endpoints.destination_ledger)?;

        self.source_ledger = endpoints.source_ledger;
        self.source_registry = endpoints.source_registry;
        self.destination_ledger = endpoints.destination_ledger;
        self.destination_registry = endpoints.destination_registry;
        self.cursor = 0;
        self.expected_count = expected_count;
        self.expected_pool = expected_pool;
        self.accumulated_pool_options = 0;
        self.accumulated_extra_options = 0;
        self.records_digest = [0u8; 32];
        self.phase = MigrationPhase::InProgress;
        Ok(())
    }

    /// Copies up to `batch_size` source records starting at `cursor`. Returns how many
    /// were copied; fewer than `batch_size` means the source is exhausted.
    pub fn migrate_batch(
        &mut self,
        session_key: &Pubkey,
        source: &PlanLedger,
        source_registry: &ParticipantRegistry,
        destination_registry: &mut ParticipantRegistry,
        cursor: u32,
        batch_size: u32,
    ) -> LedgerResult<u32> {
        self.ensure_phase(MigrationPhase::InProgress)?;
        source.ensure_maintenance()?;
        if batch_size == 0 {
            return Err(LedgerError::EmptyBatch);
        }
        if batch_size > MAX_MIGRATION_BATCH {
            return Err(LedgerError::BatchTooLarge);
        }
        self.ensure_registries(source_registry, destination_registry)?;
        destination_registry.ensure_controller(session_key)?;
        if cursor > self.cursor {
            return Err(LedgerError::CursorOutOfRange);
        }

        let batch = source_registry.page(cursor as usize, batch_size as usize);
        let fresh_ids = batch
            .iter()
            .filter(|r| destination_registry.get(&r.participant).is_none())
            .count();
        if destination_registry.len() + fresh_ids > MAX_PARTICIPANTS {
            return Err(LedgerError::RegistryFull);
        }

        let mut high_water = self.cursor;
        let mut pool = self.accumulated_pool_options;
        let mut extra = self.accumulated_extra_options;
        let mut digest = self.records_digest;
        for (offset, record) in batch.iter().enumerate() {
            let index = cursor + offset as u32;
            if index < high_water {
                continue;
            }
            pool = pool
                .checked_add(record.retained_pool_options())
                .ok_or(LedgerError::MathOverflow)?;
            extra = extra
                .checked_add(record.retained_extra_options())
                .ok_or(LedgerError::MathOverflow)?;
            digest = chain_digest(&digest, record);
            high_water = index + 1;
        }

        for record in batch.iter() {
            destination_registry.upsert(session_key, *record)?;
        }

        self.cursor = high_water;
        self.accumulated_pool_options = pool;
        self.accumulated_extra_options = extra;
        self.records_digest = digest;
        Ok(batch.len() as u32)
    }

    /// Reconciles the copy and hands the destination registry back to its ledger.
    pub fn complete(
        &mut self,
        session_key: &Pubkey,
        source: &PlanLedger,
        source_registry: &ParticipantRegistry,
        destination: &mut PlanLedger,
        destination_registry: &mut ParticipantRegistry,
    ) -> LedgerResult<()> {
        self.ensure_phase(MigrationPhase::InProgress)?;
        source.ensure_maintenance()?;
        destination.ensure_maintenance()?;
        if destination.migrated_from != Some(self.source_ledger) {
            return Err(LedgerError::SessionMismatch);
        }
        self.ensure_registries(source_registry, destination_registry)?;
        destination_registry.ensure_controller(session_key)?;
        if (self.cursor as usize) < source_registry.len() || self.cursor < self.expected_count {
            return Err(LedgerError::MigrationIncomplete);
        }

        let faults = self.reconcile(source, source_registry, destination, destination_registry);
        if faults > 0 {
            msg!("migration reconcile failed: {} discrepancies", faults);
            return Err(LedgerError::MigrationIntegrityError);
        }

        destination_registry.transfer_control(session_key, self.destination_ledger)?;
        destination.migration_verified = true;
        self.phase = MigrationPhase::Completed;
        Ok(())
    }

    /// Checks that a completed session still describes `source` exactly, so retiring
    /// the source cannot drop anything the copy missed.
    pub fn ensure_completed_copy_of(
        &self,
        source: &PlanLedger,
        source_registry: &ParticipantRegistry,
    ) -> LedgerResult<()> {
        self.ensure_phase(MigrationPhase::Completed)?;
        if source_registry.ledger != self.source_ledger {
            return Err(LedgerError::RegistryMismatch);
        }
        if source.pool != self.expected_pool
            || source_registry.len() != self.expected_count as usize
            || records_digest(&source_registry.participants) != self.records_digest
        {
            msg!("source ledger changed after migration snapshot");
            return Err(LedgerError::MigrationIntegrityError);
        }
        Ok(())
    }

    /// Logs and counts every mismatch between the frozen source, the session
    /// accumulators and the destination.
    fn reconcile(
        &self,
        source: &PlanLedger,
        source_registry: &ParticipantRegistry,
        destination: &PlanLedger,
        destination_registry: &ParticipantRegistry,
    ) -> u32 {
        let mut faults = 0u32;
        let mut check = |ok: bool, what: &str| {
            if !ok {
                msg!("migration reconcile: {} mismatch", what);
                faults += 1;
            }
        };

        let expected = self.expected_count as usize;
        check(source_registry.len() == expected, "source record count");
        check(destination_registry.len() == expected, "destination record count");
        check(source.pool == self.expected_pool, "source pool");
        check(destination.pool == self.expected_pool, "destination pool");
        check(destination.params == source.params, "plan parameters");
        check(
            self.accumulated_pool_options == self.expected_pool.total_pool_options,
            "retained pool options",
        );
        check(
            self.accumulated_extra_options == self.expected_pool.total_extra_options,
            "retained extra options",
        );
        check(
            records_digest(&source_registry.participants) == self.records_digest,
            "source digest",
        );
        check(
            records_digest(&destination_registry.participants) == self.records_digest,
            "destination digest",
        );
        check(
            destination.check_conservation(destination_registry).is_ok(),
            "destination conservation",
        );
        faults
    }
}

fn chain_digest(prev: &[u8; 32], record: &ParticipantRecord) -> [u8; 32] {
    let mut hasher = blake3::Hasher::new();
    hasher.update(prev);
    record.hash_into(&mut hasher);
    *hasher.finalize().as_bytes()
}

/// blake3 chain over `records` in order, as accumulated by `migrate_batch`.
pub fn records_digest(records: &[ParticipantRecord]) -> [u8; 32] {
    records
        .iter()
        .fold([0u8; 32], |acc, r| chain_digest(&acc, r))
}
