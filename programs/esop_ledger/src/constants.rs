//! Program-wide constants.

/// Max participant records stored in a single registry PDA.
pub const MAX_PARTICIPANTS: usize = 64;

/// Max records copied per `migrate_batch` call.
pub const MAX_MIGRATION_BATCH: u32 = 16;

/// Fixed-point scale used by the default plan (10_000 = 100%).
pub const DEFAULT_FP_SCALE: u32 = 10_000;

/// Seconds per day (UTC).
pub const SECONDS_PER_DAY: i64 = 86_400;

pub const PLAN_LEDGER_SEED: &[u8] = b"plan_ledger";
pub const REGISTRY_SEED: &[u8] = b"participant_registry";
pub const AUTHORITY_SEED: &[u8] = b"authority_registry";
pub const MIGRATION_SEED: &[u8] = b"migration";
