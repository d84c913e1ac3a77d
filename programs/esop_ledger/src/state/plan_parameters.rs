use anchor_lang::prelude::*;

use crate::error::{LedgerError, LedgerResult};

/// Immutable vesting and pool-sharing rules of one ledger instance.
///
/// All rates are fractions of `fp_scale`.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PlanParameters {
    /// Seconds from vesting start before anything vests.
    pub cliff_duration: i64,
    /// Seconds from vesting start until the grant is fully vested.
    pub vesting_duration: i64,
    /// Share of the unvested base forfeited on a regular early termination.
    pub max_fadeout_rate: u32,
    /// Bonus options granted on top of vested options at conversion.
    pub bonus_options_rate: u32,
    /// Share of the remaining pool given to a new participant.
    pub new_participant_pool_rate: u32,
    /// Options that make up one unit of equity.
    pub options_per_share: u64,
    /// Fixed-point denominator for every rate above.
    pub fp_scale: u32,
}

impl PlanParameters {
    pub const SIZE: usize =
        8 + // cliff_duration
        8 + // vesting_duration
        4 + // max_fadeout_rate
        4 + // bonus_options_rate
        4 + // new_participant_pool_rate
        8 + // options_per_share
        4;  // fp_scale

    pub fn validate(&self) -> LedgerResult<()> {
        if self.fp_scale == 0 || self.options_per_share == 0 {
            return Err(LedgerError::InvalidConfig);
        }
        let rates = [
            self.max_fadeout_rate,
            self.bonus_options_rate,
            self.new_participant_pool_rate,
        ];
        if rates.iter().any(|r| *r > self.fp_scale) {
            return Err(LedgerError::InvalidConfig);
        }
        if self.vesting_duration <= 0
            || self.cliff_duration < 0
            || self.cliff_duration > self.vesting_duration
        {
            return Err(LedgerError::InvalidConfig);
        }
        Ok(())
    }
}
