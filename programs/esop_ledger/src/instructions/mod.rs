pub mod initialize_authority_registry;
pub mod open_ledger;
pub mod offer_options;
pub mod sign_offer;
pub mod reclaim_expired_offer;
pub mod terminate_participant;
pub mod begin_migration;
pub mod cancel_migration;
pub mod prepare_migration_target;
pub mod start_migration;
pub mod migrate_batch;
pub mod complete_migration;
pub mod set_ledger;
pub mod retire_ledger;
pub mod transfer_authority_principal;
pub mod shutdown_authority_registry;
pub mod emit_vesting_quote;
pub mod emit_pool_state;

pub use initialize_authority_registry::*;
pub use open_ledger::*;
pub use offer_options::*;
pub use sign_offer::*;
pub use reclaim_expired_offer::*;
pub use terminate_participant::*;
pub use begin_migration::*;
pub use cancel_migration::*;
pub use prepare_migration_target::*;
pub use start_migration::*;
pub use migrate_batch::*;
pub use complete_migration::*;
pub use set_ledger::*;
pub use retire_ledger::*;
pub use transfer_authority_principal::*;
pub use shutdown_authority_registry::*;
pub use emit_vesting_quote::*;
pub use emit_pool_state::*;
