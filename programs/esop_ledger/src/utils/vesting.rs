//! Cliff + linear vesting with fade-out on early termination.
//! - elapsed < cliff: nothing vested; a terminated grant forfeits base and extra in full
//! - cliff <= elapsed < duration: base and extra vest linearly; on termination a
//!   `max_fadeout_rate` share of the unvested base returns to the pool and all unvested
//!   extra options are forfeited
//! - elapsed >= duration: fully vested, nothing forfeited
//!
//! All products go through u128 and round down.

use crate::error::{LedgerError, LedgerResult};
use crate::state::PlanParameters;

/// Vested/forfeited amounts for one grant at one point in time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OptionSplit {
    pub vested_base: u64,
    pub forfeited_base: u64,
    pub vested_extra: u64,
    pub forfeited_extra: u64,
}

impl OptionSplit {
    /// Split that hands every option back to the pool.
    pub fn forfeit_all(base: u64, extra: u64) -> Self {
        Self {
            vested_base: 0,
            forfeited_base: base,
            vested_extra: 0,
            forfeited_extra: extra,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct VestingCalculator {
    params: PlanParameters,
}

impl VestingCalculator {
    pub fn new(params: PlanParameters) -> Self {
        Self { params }
    }

    pub fn split(
        &self,
        vesting_start: i64,
        now: i64,
        base: u64,
        extra: u64,
        terminated: bool,
    ) -> LedgerResult<OptionSplit> {
        let elapsed = now.saturating_sub(vesting_start).max(0);
        let p = &self.params;

        if elapsed < p.cliff_duration {
            if terminated {
                return Ok(OptionSplit::forfeit_all(base, extra));
            }
            return Ok(OptionSplit::default());
        }

        if elapsed >= p.vesting_duration {
            return Ok(OptionSplit {
                vested_base: base,
                forfeited_base: 0,
                vested_extra: extra,
                forfeited_extra: 0,
            });
        }

        let vested_base = mul_div(base, elapsed as u64, p.vesting_duration as u64)?;
        let vested_extra = mul_div(extra, elapsed as u64, p.vesting_duration as u64)?;
        if !terminated {
            return Ok(OptionSplit {
                vested_base,
                forfeited_base: 0,
                vested_extra,
                forfeited_extra: 0,
            });
        }

        let unvested_base = base
            .checked_sub(vested_base)
            .ok_or(LedgerError::MathOverflow)?;
        let forfeited_base = mul_div(
            unvested_base,
            p.max_fadeout_rate as u64,
            p.fp_scale as u64,
        )?;
        let forfeited_extra = extra
            .checked_sub(vested_extra)
            .ok_or(LedgerError::MathOverflow)?;

        Ok(OptionSplit {
            vested_base,
            forfeited_base,
            vested_extra,
            forfeited_extra,
        })
    }

    /// Base options for a new participant, as a share of what is left in the pool.
    pub fn new_participant_pool_options(&self, remaining_pool: u64) -> LedgerResult<u64> {
        mul_div(
            remaining_pool,
            self.params.new_participant_pool_rate as u64,
            self.params.fp_scale as u64,
        )
    }

    pub fn bonus_options(&self, vested: u64) -> LedgerResult<u64> {
        mul_div(
            vested,
            self.params.bonus_options_rate as u64,
            self.params.fp_scale as u64,
        )
    }

    /// Whole equity units represented by `options`; the remainder is dropped.
    pub fn equity_units(&self, options: u64) -> LedgerResult<u64> {
        options
            .checked_div(self.params.options_per_share)
            .ok_or(LedgerError::InvalidConfig)
    }
}

fn mul_div(amount: u64, numerator: u64, denominator: u64) -> LedgerResult<u64> {
    if denominator == 0 {
        return Err(LedgerError::InvalidConfig);
    }
    let v = (amount as u128)
        .checked_mul(numerator as u128)
        .ok_or(LedgerError::MathOverflow)?
        / (denominator as u128);
    u64::try_from(v).map_err(|_| LedgerError::MathOverflow)
}
