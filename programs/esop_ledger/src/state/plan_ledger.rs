use anchor_lang::prelude::*;

use crate::error::{LedgerError, LedgerResult};
use crate::state::{
    MigrationSession, ParticipantRecord, ParticipantRegistry, ParticipantStatus, PlanParameters,
    TerminationReason,
};
use crate::utils::vesting::{OptionSplit, VestingCalculator};

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LedgerState {
    #[default]
    Uninitialized,
    Open,
    /// Frozen for migration: reads only.
    MaintenanceMode,
    /// Terminal.
    Retired,
}

/// Pool totals of one ledger instance.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PoolState {
    /// Fixed at open: `remaining_pool_options + total_pool_options`.
    pub pool_capacity: u64,
    /// Options currently allocated out of the pool (live grants + settled base).
    pub total_pool_options: u64,
    /// Extra options outstanding (live grants + settled extra).
    pub total_extra_options: u64,
    /// Unallocated pool balance.
    pub remaining_pool_options: u64,
}

impl PoolState {
    pub const SIZE: usize = 8 + 8 + 8 + 8;

    fn allocate(&self, pool_options: u64, extra_options: u64) -> LedgerResult<Self> {
        if pool_options > self.remaining_pool_options {
            return Err(LedgerError::InsufficientPool);
        }
        Ok(Self {
            pool_capacity: self.pool_capacity,
            total_pool_options: self
                .total_pool_options
                .checked_add(pool_options)
                .ok_or(LedgerError::MathOverflow)?,
            total_extra_options: self
                .total_extra_options
                .checked_add(extra_options)
                .ok_or(LedgerError::MathOverflow)?,
            remaining_pool_options: self.remaining_pool_options - pool_options,
        })
    }

    fn release(&self, pool_options: u64, extra_options: u64) -> LedgerResult<Self> {
        Ok(Self {
            pool_capacity: self.pool_capacity,
            total_pool_options: self
                .total_pool_options
                .checked_sub(pool_options)
                .ok_or(LedgerError::ConservationViolated)?,
            total_extra_options: self
                .total_extra_options
                .checked_sub(extra_options)
                .ok_or(LedgerError::ConservationViolated)?,
            remaining_pool_options: self
                .remaining_pool_options
                .checked_add(pool_options)
                .ok_or(LedgerError::MathOverflow)?,
        })
    }
}

/// Offer parameters supplied by the plan admin.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct OfferTerms {
    pub participant: Pubkey,
    pub vesting_start: i64,
    pub sign_deadline: i64,
    pub extra_options: u64,
    pub pool_cleanup: bool,
    /// Explicit base allocation; when absent the plan's sharing rule decides.
    pub pool_options: Option<u64>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TerminationOutcome {
    pub reason: TerminationReason,
    pub split: OptionSplit,
}

/// Read-only view handed to the settlement side.
///
/// `vested_*` follow the vesting schedule (frozen at the termination time once
/// terminated). `retained_*` are the options the participant still holds a claim on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct VestingQuote {
    pub vested_pool_options: u64,
    pub vested_extra_options: u64,
    pub retained_pool_options: u64,
    pub retained_extra_options: u64,
    pub bonus_options: u64,
    pub equity_units: u64,
}

/// One option plan instance. Seeds: [b"plan_ledger", generation.to_le_bytes()]
#[account]
#[derive(Default)]
pub struct PlanLedger {
    /// Instance number; distinguishes a migration target from its source.
    pub generation: u64,
    /// Plan administrator (company signer).
    pub admin: Pubkey,
    /// Participant registry PDA of this instance.
    pub registry: Pubkey,
    pub state: LedgerState,
    pub params: PlanParameters,
    pub pool: PoolState,
    /// Source instance when this ledger was created as a migration target.
    pub migrated_from: Option<Pubkey>,
    /// Set once the migration into this ledger passed reconciliation.
    pub migration_verified: bool,
    /// Successor bound by `start_migration`; the ledger cannot reopen while set.
    pub migrating_to: Option<Pubkey>,
    /// blake3 hash of the legal wrapper document.
    pub legal_wrapper_hash: [u8; 32],
    pub bump: u8,
}

impl PlanLedger {
    pub const SIZE: usize =
        8 +  // generation
        32 + // admin
        32 + // registry
        1 +  // state
        PlanParameters::SIZE +
        PoolState::SIZE +
        33 + // migrated_from
        1 +  // migration_verified
        33 + // migrating_to
        32 + // legal_wrapper_hash
        1;   // bump

    pub fn calculator(&self) -> VestingCalculator {
        VestingCalculator::new(self.params)
    }

    pub fn ensure_open(&self) -> LedgerResult<()> {
        match self.state {
            LedgerState::Open => Ok(()),
            LedgerState::MaintenanceMode => Err(LedgerError::MaintenanceInProgress),
            LedgerState::Retired => Err(LedgerError::LedgerRetired),
            LedgerState::Uninitialized => Err(LedgerError::LedgerNotOpen),
        }
    }

    /// Reads are served while open or frozen.
    pub fn ensure_readable(&self) -> LedgerResult<()> {
        match self.state {
            LedgerState::Open | LedgerState::MaintenanceMode => Ok(()),
            LedgerState::Retired => Err(LedgerError::LedgerRetired),
            LedgerState::Uninitialized => Err(LedgerError::LedgerNotOpen),
        }
    }

    pub fn ensure_maintenance(&self) -> LedgerResult<()> {
        match self.state {
            LedgerState::MaintenanceMode => Ok(()),
            LedgerState::Retired => Err(LedgerError::LedgerRetired),
            LedgerState::Open | LedgerState::Uninitialized => Err(LedgerError::NotInMaintenance),
        }
    }

    pub fn open(
        &mut self,
        params: PlanParameters,
        pool_capacity: u64,
        legal_wrapper_hash: [u8; 32],
    ) -> LedgerResult<()> {
        if self.state != LedgerState::Uninitialized {
            return Err(LedgerError::InvalidConfig);
        }
        params.validate()?;
        self.params = params;
        self.pool = PoolState {
            pool_capacity,
            total_pool_options: 0,
            total_extra_options: 0,
            remaining_pool_options: pool_capacity,
        };
        self.legal_wrapper_hash = legal_wrapper_hash;
        self.state = LedgerState::Open;
        Ok(())
    }

    pub fn offer(
        &mut self,
        ledger_key: &Pubkey,
        registry: &mut ParticipantRegistry,
        terms: OfferTerms,
        now: i64,
    ) -> LedgerResult<ParticipantRecord> {
        self.ensure_open()?;
        if terms.participant == Pubkey::default() {
            return Err(LedgerError::InvalidPubkey);
        }
        if terms.sign_deadline <= now {
            return Err(LedgerError::InvalidTimestamp);
        }

        let remaining = self.pool.remaining_pool_options;
        let pool_options = match terms.pool_options {
            Some(explicit) => explicit,
            None if terms.pool_cleanup => remaining,
            None => self.calculator().new_participant_pool_options(remaining)?,
        };
        if pool_options == 0 && terms.extra_options == 0 {
            return Err(LedgerError::EmptyGrant);
        }
        let pool = self.pool.allocate(pool_options, terms.extra_options)?;

        let record = ParticipantRecord::pending(
            terms.participant,
            terms.vesting_start,
            terms.sign_deadline,
            pool_options,
            terms.extra_options,
            terms.pool_cleanup,
        );
        registry.insert(ledger_key, record)?;
        self.pool = pool;
        Ok(record)
    }

    pub fn sign(
        &self,
        ledger_key: &Pubkey,
        registry: &mut ParticipantRegistry,
        participant: &Pubkey,
        now: i64,
    ) -> LedgerResult<ParticipantRecord> {
        self.ensure_open()?;
        let mut record = *registry
            .get(participant)
            .ok_or(LedgerError::UnknownParticipant)?;
        match record.status {
            ParticipantStatus::Pending => {}
            ParticipantStatus::Active => return Err(LedgerError::AlreadySigned),
            ParticipantStatus::Terminated => return Err(LedgerError::AlreadyTerminated),
            ParticipantStatus::Expired => return Err(LedgerError::DeadlineExpired),
        }
        if now > record.sign_deadline {
            return Err(LedgerError::DeadlineExpired);
        }
        record.signed_at = Some(now);
        record.status = ParticipantStatus::Active;
        registry.update(ledger_key, record)?;
        Ok(record)
    }

    /// Returns an unsigned, past-deadline allocation to the pool.
    pub fn reclaim_expired(
        &mut self,
        ledger_key: &Pubkey,
        registry: &mut ParticipantRegistry,
        participant: &Pubkey,
        now: i64,
    ) -> LedgerResult<ParticipantRecord> {
        self.ensure_open()?;
        let mut record = *registry
            .get(participant)
            .ok_or(LedgerError::UnknownParticipant)?;
        match record.status {
            ParticipantStatus::Pending => {}
            ParticipantStatus::Active => return Err(LedgerError::AlreadySigned),
            ParticipantStatus::Terminated => return Err(LedgerError::AlreadyTerminated),
            ParticipantStatus::Expired => return Err(LedgerError::DeadlineExpired),
        }
        if now <= record.sign_deadline {
            return Err(LedgerError::DeadlineNotReached);
        }
        let pool = self
            .pool
            .release(record.pool_options, record.extra_options)?;
        record.status = ParticipantStatus::Expired;
        registry.update(ledger_key, record)?;
        self.pool = pool;
        Ok(record)
    }

    pub fn terminate(
        &mut self,
        ledger_key: &Pubkey,
        registry: &mut ParticipantRegistry,
        participant: &Pubkey,
        termination_time: i64,
        reason: TerminationReason,
        now: i64,
    ) -> LedgerResult<TerminationOutcome> {
        self.ensure_open()?;
        let mut record = *registry
            .get(participant)
            .ok_or(LedgerError::UnknownParticipant)?;
        let reason = match record.status {
            // Nothing was accepted yet, so nothing can be kept.
            ParticipantStatus::Pending => TerminationReason::BadLeaver,
            ParticipantStatus::Active => reason,
            ParticipantStatus::Terminated => return Err(LedgerError::AlreadyTerminated),
            ParticipantStatus::Expired => return Err(LedgerError::DeadlineExpired),
        };
        if termination_time > now {
            return Err(LedgerError::InvalidTimestamp);
        }

        let split = match reason {
            TerminationReason::BadLeaver => {
                OptionSplit::forfeit_all(record.pool_options, record.extra_options)
            }
            TerminationReason::Regular => {
                if termination_time < record.vesting_start {
                    return Err(LedgerError::InvalidTimestamp);
                }
                self.calculator().split(
                    record.vesting_start,
                    termination_time,
                    record.pool_options,
                    record.extra_options,
                    true,
                )?
            }
        };

        let pool = self
            .pool
            .release(split.forfeited_base, split.forfeited_extra)?;
        record.status = ParticipantStatus::Terminated;
        record.terminated_at = Some(termination_time);
        record.settled_pool_options = record
            .pool_options
            .checked_sub(split.forfeited_base)
            .ok_or(LedgerError::MathOverflow)?;
        record.settled_extra_options = record
            .extra_options
            .checked_sub(split.forfeited_extra)
            .ok_or(LedgerError::MathOverflow)?;
        registry.update(ledger_key, record)?;
        self.pool = pool;
        Ok(TerminationOutcome { reason, split })
    }

    pub fn begin_migration(&mut self) -> LedgerResult<()> {
        self.ensure_open()?;
        self.state = LedgerState::MaintenanceMode;
        Ok(())
    }

    pub fn cancel_migration(&mut self) -> LedgerResult<()> {
        self.ensure_maintenance()?;
        if self.migrating_to.is_some() {
            return Err(LedgerError::MigrationLocked);
        }
        if self.migrated_from.is_some() && !self.migration_verified {
            return Err(LedgerError::MigrationNotVerified);
        }
        self.state = LedgerState::Open;
        Ok(())
    }

    /// Turns a fresh account into a frozen migration target of `source`. The target
    /// carries its own legal wrapper document.
    pub fn prepare_migration_target(
        &mut self,
        admin: Pubkey,
        source: Pubkey,
        legal_wrapper_hash: [u8; 32],
    ) -> LedgerResult<()> {
        if self.state != LedgerState::Uninitialized {
            return Err(LedgerError::InvalidConfig);
        }
        self.admin = admin;
        self.migrated_from = Some(source);
        self.migration_verified = false;
        self.legal_wrapper_hash = legal_wrapper_hash;
        self.state = LedgerState::MaintenanceMode;
        Ok(())
    }

    /// Locks a frozen source to `destination` until it retires.
    pub fn bind_migration(&mut self, destination: Pubkey) -> LedgerResult<()> {
        self.ensure_maintenance()?;
        if self.migrating_to.is_some() {
            return Err(LedgerError::MigrationLocked);
        }
        self.migrating_to = Some(destination);
        Ok(())
    }

    /// Copies parameters and pool totals from a frozen source in one read.
    pub fn import_snapshot(&mut self, source: &PlanLedger, source_key: &Pubkey) -> LedgerResult<PoolState> {
        self.ensure_maintenance()?;
        if self.migrated_from != Some(*source_key) {
            return Err(LedgerError::SessionMismatch);
        }
        if self.pool.pool_capacity != 0 || self.params.fp_scale != 0 {
            return Err(LedgerError::SnapshotAlreadyImported);
        }
        source.ensure_maintenance()?;
        source.params.validate()?;
        self.params = source.params;
        self.pool = source.pool;
        Ok(self.pool)
    }

    /// Final step of the source instance. Requires the source to still match the
    /// snapshot its session copied, the destination to be verified and open, and the
    /// authority registry to already point at it.
    pub fn retire(
        &mut self,
        ledger_key: &Pubkey,
        registry: &ParticipantRegistry,
        session: &MigrationSession,
        destination: &PlanLedger,
        destination_key: &Pubkey,
        authority_current_ledger: &Pubkey,
    ) -> LedgerResult<()> {
        self.ensure_maintenance()?;
        if self.migrating_to != Some(*destination_key)
            || session.source_ledger != *ledger_key
            || session.destination_ledger != *destination_key
        {
            return Err(LedgerError::SessionMismatch);
        }
        session.ensure_completed_copy_of(self, registry)?;
        if destination.migrated_from != Some(*ledger_key)
            || !destination.migration_verified
            || destination.state != LedgerState::Open
        {
            return Err(LedgerError::MigrationNotVerified);
        }
        if authority_current_ledger != destination_key {
            return Err(LedgerError::AuthorityNotSwitched);
        }
        self.state = LedgerState::Retired;
        Ok(())
    }

    pub fn pool_state(&self) -> LedgerResult<PoolState> {
        self.ensure_readable()?;
        Ok(self.pool)
    }

    pub fn vesting_quote(
        &self,
        registry: &ParticipantRegistry,
        participant: &Pubkey,
        now: i64,
    ) -> LedgerResult<VestingQuote> {
        self.ensure_readable()?;
        let record = registry
            .get(participant)
            .ok_or(LedgerError::UnknownParticipant)?;
        let calc = self.calculator();
        let (vested_pool_options, vested_extra_options) = match record.status {
            ParticipantStatus::Pending | ParticipantStatus::Expired => (0, 0),
            ParticipantStatus::Active => {
                let s = calc.split(
                    record.vesting_start,
                    now,
                    record.pool_options,
                    record.extra_options,
                    false,
                )?;
                (s.vested_base, s.vested_extra)
            }
            ParticipantStatus::Terminated => {
                let terminated_at = record
                    .terminated_at
                    .ok_or(LedgerError::InvalidTimestamp)?;
                let s = calc.split(
                    record.vesting_start,
                    terminated_at,
                    record.pool_options,
                    record.extra_options,
                    true,
                )?;
                // Bad leavers settle at zero whatever the schedule says.
                (
                    s.vested_base.min(record.settled_pool_options),
                    s.vested_extra.min(record.settled_extra_options),
                )
            }
        };
        let total = vested_pool_options
            .checked_add(vested_extra_options)
            .ok_or(LedgerError::MathOverflow)?;
        let bonus_options = calc.bonus_options(total)?;
        let with_bonus = total
            .checked_add(bonus_options)
            .ok_or(LedgerError::MathOverflow)?;
        Ok(VestingQuote {
            vested_pool_options,
            vested_extra_options,
            retained_pool_options: record.retained_pool_options(),
            retained_extra_options: record.retained_extra_options(),
            bonus_options,
            equity_units: calc.equity_units(with_bonus)?,
        })
    }

    /// Verifies pool conservation against every record in `registry`.
    pub fn check_conservation(&self, registry: &ParticipantRegistry) -> LedgerResult<()> {
        let allocated = self
            .pool
            .remaining_pool_options
            .checked_add(self.pool.total_pool_options)
            .ok_or(LedgerError::MathOverflow)?;
        if allocated != self.pool.pool_capacity {
            return Err(LedgerError::ConservationViolated);
        }
        let (retained_pool, retained_extra) = registry.retained_totals()?;
        if retained_pool != self.pool.total_pool_options
            || retained_extra != self.pool.total_extra_options
        {
            return Err(LedgerError::ConservationViolated);
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::constants::{DEFAULT_FP_SCALE, SECONDS_PER_DAY};
    use crate::state::migration_session::records_digest;
    use crate::state::MigrationPhase;

    pub const YEAR: i64 = 365 * SECONDS_PER_DAY;
    pub const WEEK: i64 = 7 * SECONDS_PER_DAY;
    pub const NOW: i64 = 1_700_000_000;

    pub fn key(n: u8) -> Pubkey {
        Pubkey::new_from_array([n; 32])
    }

    pub fn params() -> PlanParameters {
        PlanParameters {
            cliff_duration: YEAR,
            vesting_duration: 4 * YEAR,
            max_fadeout_rate: 8_000,
            bonus_options_rate: 2_000,
            new_participant_pool_rate: 1_000,
            options_per_share: 500,
            fp_scale: DEFAULT_FP_SCALE,
        }
    }

    /// Open ledger + its registry, both keyed by `ledger_key`.
    pub fn open_ledger(ledger_key: Pubkey, capacity: u64) -> (PlanLedger, ParticipantRegistry) {
        let mut ledger = PlanLedger {
            generation: 1,
            admin: key(250),
            ..Default::default()
        };
        ledger
            .open(params(), capacity, *blake3::hash(b"plan v1").as_bytes())
            .unwrap();
        let registry = ParticipantRegistry {
            ledger: ledger_key,
            controller: ledger_key,
            ..Default::default()
        };
        (ledger, registry)
    }

    pub fn terms(n: u8, pool_options: Option<u64>, extra: u64) -> OfferTerms {
        OfferTerms {
            participant: key(n),
            vesting_start: NOW,
            sign_deadline: NOW + 4 * WEEK,
            extra_options: extra,
            pool_cleanup: false,
            pool_options,
        }
    }

    #[test]
    fn offer_moves_options_out_of_the_pool() {
        let lk = key(100);
        let (mut ledger, mut reg) = open_ledger(lk, 1_000_000);
        let rec = ledger
            .offer(&lk, &mut reg, terms(1, Some(1_000), 50), NOW)
            .unwrap();
        assert_eq!(rec.status, ParticipantStatus::Pending);
        assert_eq!(ledger.pool.remaining_pool_options, 999_000);
        assert_eq!(ledger.pool.total_pool_options, 1_000);
        assert_eq!(ledger.pool.total_extra_options, 50);
        ledger.check_conservation(&reg).unwrap();
    }

    #[test]
    fn offer_uses_pool_share_or_cleanup_residue() {
        let lk = key(100);
        let (mut ledger, mut reg) = open_ledger(lk, 1_000_000);
        let rec = ledger.offer(&lk, &mut reg, terms(1, None, 0), NOW).unwrap();
        assert_eq!(rec.pool_options, 100_000);

        let cleanup = OfferTerms {
            pool_cleanup: true,
            ..terms(2, None, 10)
        };
        let rec = ledger.offer(&lk, &mut reg, cleanup, NOW).unwrap();
        assert_eq!(rec.pool_options, 900_000);
        assert!(rec.pool_cleanup);
        assert_eq!(ledger.pool.remaining_pool_options, 0);

        // Empty pool: the share rule yields nothing and there is no extra either.
        assert!(matches!(
            ledger.offer(&lk, &mut reg, terms(3, None, 0), NOW),
            Err(LedgerError::EmptyGrant)
        ));
        ledger.check_conservation(&reg).unwrap();
    }

    #[test]
    fn failed_offer_leaves_state_untouched() {
        let lk = key(100);
        let (mut ledger, mut reg) = open_ledger(lk, 5_000);
        ledger
            .offer(&lk, &mut reg, terms(1, Some(4_000), 0), NOW)
            .unwrap();
        let before = ledger.pool;

        assert!(matches!(
            ledger.offer(&lk, &mut reg, terms(2, Some(1_001), 5), NOW),
            Err(LedgerError::InsufficientPool)
        ));
        assert!(matches!(
            ledger.offer(&lk, &mut reg, terms(1, Some(10), 5), NOW),
            Err(LedgerError::DuplicateParticipant)
        ));
        let late = OfferTerms {
            sign_deadline: NOW,
            ..terms(3, Some(10), 0)
        };
        assert!(matches!(
            ledger.offer(&lk, &mut reg, late, NOW),
            Err(LedgerError::InvalidTimestamp)
        ));
        assert_eq!(ledger.pool, before);
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn offer_may_vest_after_signing_window() {
        let lk = key(100);
        let (mut ledger, mut reg) = open_ledger(lk, 1_000_000);
        let future_hire = OfferTerms {
            vesting_start: NOW + 60 * SECONDS_PER_DAY,
            sign_deadline: NOW + 14 * SECONDS_PER_DAY,
            ..terms(1, Some(1_000), 0)
        };
        let rec = ledger.offer(&lk, &mut reg, future_hire, NOW).unwrap();
        assert_eq!(rec.vesting_start, NOW + 60 * SECONDS_PER_DAY);
        ledger
            .sign(&lk, &mut reg, &key(1), NOW + 14 * SECONDS_PER_DAY)
            .unwrap();
        let q = ledger.vesting_quote(&reg, &key(1), NOW + YEAR).unwrap();
        assert_eq!(q.vested_pool_options, 0);
        assert_eq!(q.retained_pool_options, 1_000);
    }

    #[test]
    fn sign_respects_deadline() {
        let lk = key(100);
        let (mut ledger, mut reg) = open_ledger(lk, 1_000_000);
        ledger
            .offer(&lk, &mut reg, terms(1, Some(1_000), 0), NOW)
            .unwrap();
        ledger
            .offer(&lk, &mut reg, terms(2, Some(1_000), 0), NOW)
            .unwrap();

        let deadline = NOW + 4 * WEEK;
        let rec = ledger.sign(&lk, &mut reg, &key(1), deadline).unwrap();
        assert_eq!(rec.status, ParticipantStatus::Active);
        assert_eq!(rec.signed_at, Some(deadline));
        assert!(matches!(
            ledger.sign(&lk, &mut reg, &key(1), deadline),
            Err(LedgerError::AlreadySigned)
        ));

        let before = ledger.pool;
        assert!(matches!(
            ledger.sign(&lk, &mut reg, &key(2), deadline + 1),
            Err(LedgerError::DeadlineExpired)
        ));
        assert_eq!(ledger.pool, before);
        assert!(matches!(
            ledger.sign(&lk, &mut reg, &key(9), NOW),
            Err(LedgerError::UnknownParticipant)
        ));
    }

    #[test]
    fn expired_offer_returns_to_pool() {
        let lk = key(100);
        let (mut ledger, mut reg) = open_ledger(lk, 1_000_000);
        ledger
            .offer(&lk, &mut reg, terms(1, Some(1_000), 30), NOW)
            .unwrap();
        let deadline = NOW + 4 * WEEK;
        assert!(matches!(
            ledger.reclaim_expired(&lk, &mut reg, &key(1), deadline),
            Err(LedgerError::DeadlineNotReached)
        ));

        let rec = ledger
            .reclaim_expired(&lk, &mut reg, &key(1), deadline + 1)
            .unwrap();
        assert_eq!(rec.status, ParticipantStatus::Expired);
        assert_eq!(ledger.pool.remaining_pool_options, 1_000_000);
        assert_eq!(ledger.pool.total_pool_options, 0);
        assert_eq!(ledger.pool.total_extra_options, 0);
        ledger.check_conservation(&reg).unwrap();

        assert!(matches!(
            ledger.sign(&lk, &mut reg, &key(1), NOW),
            Err(LedgerError::DeadlineExpired)
        ));
        assert!(matches!(
            ledger.reclaim_expired(&lk, &mut reg, &key(1), deadline + 2),
            Err(LedgerError::DeadlineExpired)
        ));
    }

    #[test]
    fn terminate_settles_against_pool() {
        let lk = key(100);
        let (mut ledger, mut reg) = open_ledger(lk, 1_000_000);
        for n in 1..=3 {
            ledger
                .offer(&lk, &mut reg, terms(n, Some(1_000), 200), NOW)
                .unwrap();
            ledger.sign(&lk, &mut reg, &key(n), NOW).unwrap();
        }
        let later = NOW + 5 * YEAR;

        // Pre-cliff: everything back.
        let out = ledger
            .terminate(&lk, &mut reg, &key(1), NOW, TerminationReason::Regular, later)
            .unwrap();
        assert_eq!(out.split, OptionSplit::forfeit_all(1_000, 200));
        assert_eq!(ledger.pool.remaining_pool_options, 998_000);
        assert_eq!(ledger.pool.total_extra_options, 400);

        // Mid-band: half vested, 80% of the rest faded out.
        let out = ledger
            .terminate(&lk, &mut reg, &key(2), NOW + 2 * YEAR, TerminationReason::Regular, later)
            .unwrap();
        assert_eq!(out.split.forfeited_base, 400);
        assert_eq!(out.split.forfeited_extra, 100);
        let rec = reg.get(&key(2)).unwrap();
        assert_eq!(rec.settled_pool_options, 600);
        assert_eq!(rec.settled_extra_options, 100);
        assert_eq!(ledger.pool.total_pool_options, 1_600);
        assert_eq!(ledger.pool.total_extra_options, 300);

        // Fully vested: nothing returns.
        let out = ledger
            .terminate(&lk, &mut reg, &key(3), NOW + 4 * YEAR, TerminationReason::Regular, later)
            .unwrap();
        assert_eq!(out.split.forfeited_base, 0);
        assert_eq!(ledger.pool.total_pool_options, 1_600);
        ledger.check_conservation(&reg).unwrap();

        assert!(matches!(
            ledger.terminate(&lk, &mut reg, &key(3), later, TerminationReason::Regular, later),
            Err(LedgerError::AlreadyTerminated)
        ));
        assert!(matches!(
            ledger.terminate(&lk, &mut reg, &key(7), later, TerminationReason::Regular, later),
            Err(LedgerError::UnknownParticipant)
        ));
    }

    #[test]
    fn bad_leaver_and_pending_forfeit_everything() {
        let lk = key(100);
        let (mut ledger, mut reg) = open_ledger(lk, 10_000);
        ledger
            .offer(&lk, &mut reg, terms(1, Some(1_000), 10), NOW)
            .unwrap();
        ledger
            .offer(&lk, &mut reg, terms(2, Some(1_000), 10), NOW)
            .unwrap();
        ledger.sign(&lk, &mut reg, &key(2), NOW).unwrap();
        let later = NOW + 5 * YEAR;

        let out = ledger
            .terminate(&lk, &mut reg, &key(1), later, TerminationReason::Regular, later)
            .unwrap();
        assert_eq!(out.reason, TerminationReason::BadLeaver);
        let out = ledger
            .terminate(&lk, &mut reg, &key(2), later, TerminationReason::BadLeaver, later)
            .unwrap();
        assert_eq!(out.split.forfeited_base, 1_000);
        assert_eq!(ledger.pool.remaining_pool_options, 10_000);
        assert_eq!(ledger.pool.total_extra_options, 0);
        ledger.check_conservation(&reg).unwrap();
    }

    #[test]
    fn terminate_rejects_bad_timestamps() {
        let lk = key(100);
        let (mut ledger, mut reg) = open_ledger(lk, 10_000);
        ledger
            .offer(&lk, &mut reg, terms(1, Some(1_000), 0), NOW)
            .unwrap();
        ledger.sign(&lk, &mut reg, &key(1), NOW).unwrap();
        let before = ledger.pool;
        assert!(matches!(
            ledger.terminate(&lk, &mut reg, &key(1), NOW - 1, TerminationReason::Regular, NOW),
            Err(LedgerError::InvalidTimestamp)
        ));
        assert!(matches!(
            ledger.terminate(&lk, &mut reg, &key(1), NOW + 10, TerminationReason::Regular, NOW),
            Err(LedgerError::InvalidTimestamp)
        ));
        assert_eq!(ledger.pool, before);
        assert_eq!(reg.get(&key(1)).unwrap().status, ParticipantStatus::Active);
    }

    #[test]
    fn conservation_holds_across_mixed_sequence() {
        let lk = key(100);
        let (mut ledger, mut reg) = open_ledger(lk, 250_000);
        let deadline = NOW + 4 * WEEK;
        for n in 1..=20u8 {
            let pool = if n % 4 == 0 { None } else { Some(n as u64 * 997) };
            let rec = ledger
                .offer(&lk, &mut reg, terms(n, pool, n as u64 * 13), NOW)
                .unwrap();
            assert!(rec.pool_options > 0);
            ledger.check_conservation(&reg).unwrap();
        }
        assert!(matches!(
            ledger.offer(&lk, &mut reg, terms(21, Some(250_000), 0), NOW),
            Err(LedgerError::InsufficientPool)
        ));

        for n in (1..=20u8).filter(|n| n % 3 != 0) {
            ledger.sign(&lk, &mut reg, &key(n), NOW + n as i64).unwrap();
            ledger.check_conservation(&reg).unwrap();
        }
        for n in 1..=20u8 {
            let res = ledger.reclaim_expired(&lk, &mut reg, &key(n), deadline + 1);
            if n % 3 == 0 {
                assert_eq!(res.unwrap().status, ParticipantStatus::Expired);
            } else {
                assert!(matches!(res, Err(LedgerError::AlreadySigned)));
            }
            ledger.check_conservation(&reg).unwrap();
        }

        let later = NOW + 6 * YEAR;
        for n in 1..=20u8 {
            let at = NOW + (n as i64) * YEAR / 4;
            let reason = if n % 5 == 0 {
                TerminationReason::BadLeaver
            } else {
                TerminationReason::Regular
            };
            let res = ledger.terminate(&lk, &mut reg, &key(n), at, reason, later);
            if n % 3 == 0 {
                assert!(matches!(res, Err(LedgerError::DeadlineExpired)));
            } else {
                assert_eq!(res.unwrap().reason, reason);
            }
            ledger.check_conservation(&reg).unwrap();
        }
        assert_eq!(
            ledger.pool.remaining_pool_options + ledger.pool.total_pool_options,
            250_000
        );
    }

    #[test]
    fn maintenance_freezes_mutations_but_not_reads() {
        let lk = key(100);
        let (mut ledger, mut reg) = open_ledger(lk, 1_000_000);
        ledger
            .offer(&lk, &mut reg, terms(1, Some(1_000), 0), NOW)
            .unwrap();
        ledger.begin_migration().unwrap();
        let before = ledger.pool;

        assert!(matches!(
            ledger.offer(&lk, &mut reg, terms(2, Some(1_000), 0), NOW),
            Err(LedgerError::MaintenanceInProgress)
        ));
        assert!(matches!(
            ledger.sign(&lk, &mut reg, &key(1), NOW),
            Err(LedgerError::MaintenanceInProgress)
        ));
        assert!(matches!(
            ledger.reclaim_expired(&lk, &mut reg, &key(1), NOW + YEAR),
            Err(LedgerError::MaintenanceInProgress)
        ));
        assert!(matches!(
            ledger.terminate(&lk, &mut reg, &key(1), NOW, TerminationReason::Regular, NOW),
            Err(LedgerError::MaintenanceInProgress)
        ));
        assert!(matches!(
            ledger.begin_migration(),
            Err(LedgerError::MaintenanceInProgress)
        ));
        assert_eq!(ledger.pool, before);
        assert_eq!(ledger.pool_state().unwrap(), before);
        assert!(ledger.vesting_quote(&reg, &key(1), NOW).is_ok());

        ledger.cancel_migration().unwrap();
        assert!(matches!(
            ledger.cancel_migration(),
            Err(LedgerError::NotInMaintenance)
        ));
        ledger.sign(&lk, &mut reg, &key(1), NOW).unwrap();
    }

    #[test]
    fn retire_requires_bound_snapshot_and_verified_switch() {
        let lk = key(100);
        let dk = key(101);
        let (mut ledger, reg) = open_ledger(lk, 1_000);
        let mut dest = PlanLedger::default();
        dest.prepare_migration_target(key(250), lk, [7u8; 32])
            .unwrap();
        let mut session = MigrationSession {
            source_ledger: lk,
            destination_ledger: dk,
            phase: MigrationPhase::Completed,
            expected_pool: ledger.pool,
            expected_count: 0,
            records_digest: records_digest(&reg.participants),
            ..Default::default()
        };

        assert!(matches!(
            ledger.retire(&lk, &reg, &session, &dest, &dk, &dk),
            Err(LedgerError::NotInMaintenance)
        ));
        ledger.begin_migration().unwrap();
        assert!(matches!(
            ledger.retire(&lk, &reg, &session, &dest, &dk, &dk),
            Err(LedgerError::SessionMismatch)
        ));
        ledger.bind_migration(dk).unwrap();
        assert!(matches!(
            ledger.cancel_migration(),
            Err(LedgerError::MigrationLocked)
        ));
        assert!(matches!(
            ledger.retire(&lk, &reg, &session, &dest, &dk, &dk),
            Err(LedgerError::MigrationNotVerified)
        ));
        assert!(matches!(
            dest.cancel_migration(),
            Err(LedgerError::MigrationNotVerified)
        ));

        dest.migration_verified = true;
        dest.cancel_migration().unwrap();
        assert!(matches!(
            ledger.retire(&lk, &reg, &session, &dest, &dk, &lk),
            Err(LedgerError::AuthorityNotSwitched)
        ));

        session.phase = MigrationPhase::InProgress;
        assert!(matches!(
            ledger.retire(&lk, &reg, &session, &dest, &dk, &dk),
            Err(LedgerError::MigrationPhaseMismatch)
        ));
        session.phase = MigrationPhase::Completed;
        session.expected_pool.remaining_pool_options -= 1;
        assert!(matches!(
            ledger.retire(&lk, &reg, &session, &dest, &dk, &dk),
            Err(LedgerError::MigrationIntegrityError)
        ));
        session.expected_pool = ledger.pool;

        ledger.retire(&lk, &reg, &session, &dest, &dk, &dk).unwrap();
        assert_eq!(ledger.state, LedgerState::Retired);
        assert!(matches!(ledger.pool_state(), Err(LedgerError::LedgerRetired)));
        assert!(matches!(
            ledger.cancel_migration(),
            Err(LedgerError::LedgerRetired)
        ));
    }

    #[test]
    fn import_requires_frozen_source() {
        let sk = key(100);
        let (mut source, _reg) = open_ledger(sk, 1_000);
        let mut dest = PlanLedger::default();
        dest.prepare_migration_target(key(250), sk, [7u8; 32])
            .unwrap();

        assert!(matches!(
            dest.import_snapshot(&source, &sk),
            Err(LedgerError::NotInMaintenance)
        ));
        source.begin_migration().unwrap();
        assert!(matches!(
            dest.import_snapshot(&source, &key(7)),
            Err(LedgerError::SessionMismatch)
        ));
        let pool = dest.import_snapshot(&source, &sk).unwrap();
        assert_eq!(pool, source.pool);
        assert_eq!(dest.params, source.params);
        // The target keeps the legal wrapper it was prepared with.
        assert_eq!(dest.legal_wrapper_hash, [7u8; 32]);
        assert!(matches!(
            dest.import_snapshot(&source, &sk),
            Err(LedgerError::SnapshotAlreadyImported)
        ));
    }

    #[test]
    fn quote_projects_active_and_settled_grants() {
        let lk = key(100);
        let (mut ledger, mut reg) = open_ledger(lk, 1_000_000);
        ledger
            .offer(&lk, &mut reg, terms(1, Some(1_000), 200), NOW)
            .unwrap();
        let q = ledger.vesting_quote(&reg, &key(1), NOW + 2 * YEAR).unwrap();
        assert_eq!(q.vested_pool_options, 0);
        assert_eq!(q.bonus_options, 0);
        assert_eq!(q.retained_pool_options, 1_000);
        assert_eq!(q.retained_extra_options, 200);

        ledger.sign(&lk, &mut reg, &key(1), NOW).unwrap();
        let q = ledger.vesting_quote(&reg, &key(1), NOW + 2 * YEAR).unwrap();
        assert_eq!(q.vested_pool_options, 500);
        assert_eq!(q.vested_extra_options, 100);
        assert_eq!(q.bonus_options, 120);
        assert_eq!(q.equity_units, 1);

        let t = NOW + 2 * YEAR;
        ledger
            .terminate(&lk, &mut reg, &key(1), t, TerminationReason::Regular, t)
            .unwrap();
        // Vested amounts match the termination event; the unfaded remainder is retained.
        let q = ledger.vesting_quote(&reg, &key(1), NOW + 9 * YEAR).unwrap();
        assert_eq!(q.vested_pool_options, 500);
        assert_eq!(q.vested_extra_options, 100);
        assert_eq!(q.retained_pool_options, 600);
        assert_eq!(q.retained_extra_options, 100);
        assert_eq!(q.bonus_options, 120);
    }

    #[test]
    fn bad_leaver_quotes_nothing_vested() {
        let lk = key(100);
        let (mut ledger, mut reg) = open_ledger(lk, 1_000_000);
        ledger
            .offer(&lk, &mut reg, terms(1, Some(1_000), 200), NOW)
            .unwrap();
        ledger.sign(&lk, &mut reg, &key(1), NOW).unwrap();
        let t = NOW + 3 * YEAR;
        ledger
            .terminate(&lk, &mut reg, &key(1), t, TerminationReason::BadLeaver, t)
            .unwrap();
        let q = ledger.vesting_quote(&reg, &key(1), t).unwrap();
        assert_eq!(q, VestingQuote::default());
    }
}
