use anchor_lang::prelude::*;

use crate::constants::MAX_PARTICIPANTS;
use crate::error::{LedgerError, LedgerResult};
use crate::state::ParticipantRecord;

/// PDA holding every participant record of one ledger instance.
///
/// Records keep insertion order so a migration can walk them with a cursor. Only
/// `controller` may mutate the list; control moves between a ledger and a migration
/// session with `transfer_control`.
#[account]
#[derive(Default)]
pub struct ParticipantRegistry {
    /// Ledger this registry was created for.
    pub ledger: Pubkey,
    /// Current holder of write access.
    pub controller: Pubkey,
    pub participants: Vec<ParticipantRecord>,
    pub bump: u8,
}

impl ParticipantRegistry {
    /// Space for discriminator + header + `max` records.
    pub const fn space(max: usize) -> usize {
        8 + 32 + 32 + 4 + max * ParticipantRecord::SIZE + 1
    }

    pub fn ensure_controller(&self, caller: &Pubkey) -> LedgerResult<()> {
        if *caller != self.controller {
            return Err(LedgerError::UnauthorizedController);
        }
        Ok(())
    }

    /// Hands write access to `new_controller`; returns the previous controller.
    pub fn transfer_control(
        &mut self,
        caller: &Pubkey,
        new_controller: Pubkey,
    ) -> LedgerResult<Pubkey> {
        self.ensure_controller(caller)?;
        if new_controller == Pubkey::default() {
            return Err(LedgerError::InvalidPubkey);
        }
        let old = self.controller;
        self.controller = new_controller;
        Ok(old)
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    pub fn get(&self, participant: &Pubkey) -> Option<&ParticipantRecord> {
        self.participants.iter().find(|r| r.participant == *participant)
    }

    fn position(&self, participant: &Pubkey) -> Option<usize> {
        self.participants
            .iter()
            .position(|r| r.participant == *participant)
    }

    pub fn insert(&mut self, caller: &Pubkey, record: ParticipantRecord) -> LedgerResult<()> {
        self.ensure_controller(caller)?;
        if self.position(&record.participant).is_some() {
            return Err(LedgerError::DuplicateParticipant);
        }
        if self.participants.len() >= MAX_PARTICIPANTS {
            return Err(LedgerError::RegistryFull);
        }
        self.participants.push(record);
        Ok(())
    }

    /// Replaces the stored record with the same identity.
    pub fn update(&mut self, caller: &Pubkey, record: ParticipantRecord) -> LedgerResult<()> {
        self.ensure_controller(caller)?;
        let idx = self
            .position(&record.participant)
            .ok_or(LedgerError::UnknownParticipant)?;
        self.participants[idx] = record;
        Ok(())
    }

    /// Insert-or-overwrite keyed by identity. Returns true when the record is new.
    pub fn upsert(&mut self, caller: &Pubkey, record: ParticipantRecord) -> LedgerResult<bool> {
        self.ensure_controller(caller)?;
        match self.position(&record.participant) {
            Some(idx) => {
                self.participants[idx] = record;
                Ok(false)
            }
            None => {
                if self.participants.len() >= MAX_PARTICIPANTS {
                    return Err(LedgerError::RegistryFull);
                }
                self.participants.push(record);
                Ok(true)
            }
        }
    }

    /// Up to `limit` records starting at `cursor`; empty once past the end.
    pub fn page(&self, cursor: usize, limit: usize) -> &[ParticipantRecord] {
        let start = cursor.min(self.participants.len());
        let end = start.saturating_add(limit).min(self.participants.len());
        &self.participants[start..end]
    }

    /// Sum of retained (pool, extra) claims over every record.
    pub fn retained_totals(&self) -> LedgerResult<(u64, u64)> {
        let mut pool: u64 = 0;
        let mut extra: u64 = 0;
        for r in self.participants.iter() {
            pool = pool
                .checked_add(r.retained_pool_options())
                .ok_or(LedgerError::MathOverflow)?;
            extra = extra
                .checked_add(r.retained_extra_options())
                .ok_or(LedgerError::MathOverflow)?;
        }
        Ok((pool, extra))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(n: u8) -> Pubkey {
        Pubkey::new_from_array([n; 32])
    }

    fn registry(controller: Pubkey) -> ParticipantRegistry {
        ParticipantRegistry {
            ledger: controller,
            controller,
            ..Default::default()
        }
    }

    fn record(n: u8) -> ParticipantRecord {
        ParticipantRecord::pending(key(n), 100, 200, 1_000, 50, false)
    }

    #[test]
    fn only_controller_mutates() {
        let owner = key(200);
        let mut reg = registry(owner);
        assert!(matches!(
            reg.insert(&key(201), record(1)),
            Err(LedgerError::UnauthorizedController)
        ));
        reg.insert(&owner, record(1)).unwrap();
        assert_eq!(reg.len(), 1);

        let old = reg.transfer_control(&owner, key(202)).unwrap();
        assert_eq!(old, owner);
        assert!(matches!(
            reg.upsert(&owner, record(2)),
            Err(LedgerError::UnauthorizedController)
        ));
        assert!(matches!(
            reg.transfer_control(&owner, owner),
            Err(LedgerError::UnauthorizedController)
        ));
        assert!(reg.upsert(&key(202), record(2)).unwrap());
    }

    #[test]
    fn rejects_duplicates_and_overflow() {
        let owner = key(200);
        let mut reg = registry(owner);
        reg.insert(&owner, record(1)).unwrap();
        assert!(matches!(
            reg.insert(&owner, record(1)),
            Err(LedgerError::DuplicateParticipant)
        ));

        for n in 2..=MAX_PARTICIPANTS as u8 {
            reg.insert(&owner, record(n)).unwrap();
        }
        assert!(matches!(
            reg.insert(&owner, record(199)),
            Err(LedgerError::RegistryFull)
        ));
        assert!(matches!(
            reg.upsert(&owner, record(199)),
            Err(LedgerError::RegistryFull)
        ));
        // Overwriting an existing identity still works at capacity.
        assert!(!reg.upsert(&owner, record(1)).unwrap());
    }

    #[test]
    fn upsert_overwrites_by_identity() {
        let owner = key(200);
        let mut reg = registry(owner);
        reg.insert(&owner, record(1)).unwrap();
        let mut changed = record(1);
        changed.extra_options = 7;
        assert!(!reg.upsert(&owner, changed).unwrap());
        assert_eq!(reg.len(), 1);
        assert_eq!(reg.get(&key(1)).unwrap().extra_options, 7);
        assert!(matches!(
            reg.update(&owner, record(9)),
            Err(LedgerError::UnknownParticipant)
        ));
    }

    #[test]
    fn page_clamps_to_bounds() {
        let owner = key(200);
        let mut reg = registry(owner);
        for n in 1..=5 {
            reg.insert(&owner, record(n)).unwrap();
        }
        assert_eq!(reg.page(0, 2).len(), 2);
        assert_eq!(reg.page(4, 2).len(), 1);
        assert_eq!(reg.page(4, 2)[0].participant, key(5));
        assert!(reg.page(5, 2).is_empty());
        assert!(reg.page(50, 2).is_empty());
        assert_eq!(reg.retained_totals().unwrap(), (5_000, 250));
    }
}
