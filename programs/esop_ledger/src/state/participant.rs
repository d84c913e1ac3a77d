use anchor_lang::prelude::*;

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ParticipantStatus {
    /// Offered, waiting for the participant's signature.
    #[default]
    Pending,
    /// Signed before the deadline.
    Active,
    /// Removed from the plan; settled amounts are final.
    Terminated,
    /// Never signed; the allocation went back to the pool.
    Expired,
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum TerminationReason {
    /// Vesting and fade-out apply.
    Regular,
    /// Every option returns to the pool.
    BadLeaver,
}

/// A single grant stored in the participant registry PDA.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ParticipantRecord {
    pub participant: Pubkey,
    pub vesting_start: i64,
    pub sign_deadline: i64,
    pub signed_at: Option<i64>,
    pub terminated_at: Option<i64>,
    /// Base allocation taken from the pool.
    pub pool_options: u64,
    /// Discretionary allocation on top of the pool share.
    pub extra_options: u64,
    /// Funded from pool residue rather than a fresh share.
    pub pool_cleanup: bool,
    pub status: ParticipantStatus,
    /// Base options kept after termination (vested plus unfaded remainder).
    pub settled_pool_options: u64,
    /// Extra options kept after termination.
    pub settled_extra_options: u64,
}

impl ParticipantRecord {
    pub const SIZE: usize =
        32 + // participant
        8 +  // vesting_start
        8 +  // sign_deadline
        9 +  // signed_at
        9 +  // terminated_at
        8 +  // pool_options
        8 +  // extra_options
        1 +  // pool_cleanup
        1 +  // status
        8 +  // settled_pool_options
        8;   // settled_extra_options

    pub fn pending(
        participant: Pubkey,
        vesting_start: i64,
        sign_deadline: i64,
        pool_options: u64,
        extra_options: u64,
        pool_cleanup: bool,
    ) -> Self {
        Self {
            participant,
            vesting_start,
            sign_deadline,
            signed_at: None,
            terminated_at: None,
            pool_options,
            extra_options,
            pool_cleanup,
            status: ParticipantStatus::Pending,
            settled_pool_options: 0,
            settled_extra_options: 0,
        }
    }

    /// Pool options this record still has a claim on.
    pub fn retained_pool_options(&self) -> u64 {
        match self.status {
            ParticipantStatus::Pending | ParticipantStatus::Active => self.pool_options,
            ParticipantStatus::Terminated => self.settled_pool_options,
            ParticipantStatus::Expired => 0,
        }
    }

    pub fn retained_extra_options(&self) -> u64 {
        match self.status {
            ParticipantStatus::Pending | ParticipantStatus::Active => self.extra_options,
            ParticipantStatus::Terminated => self.settled_extra_options,
            ParticipantStatus::Expired => 0,
        }
    }

    /// Feeds every field, in declaration order, into a migration digest.
    pub fn hash_into(&self, hasher: &mut blake3::Hasher) {
        hasher.update(self.participant.as_ref());
        hasher.update(&self.vesting_start.to_le_bytes());
        hasher.update(&self.sign_deadline.to_le_bytes());
        hash_opt_ts(hasher, self.signed_at);
        hash_opt_ts(hasher, self.terminated_at);
        hasher.update(&self.pool_options.to_le_bytes());
        hasher.update(&self.extra_options.to_le_bytes());
        hasher.update(&[self.pool_cleanup as u8, self.status as u8]);
        hasher.update(&self.settled_pool_options.to_le_bytes());
        hasher.update(&self.settled_extra_options.to_le_bytes());
    }
}

fn hash_opt_ts(hasher: &mut blake3::Hasher, ts: Option<i64>) {
    match ts {
        Some(v) => {
            hasher.update(&[1u8]);
            hasher.update(&v.to_le_bytes());
        }
        None => {
            hasher.update(&[0u8]);
        }
    }
}
