pub mod authority_registry;
pub mod migration_session;
pub mod participant;
pub mod participant_registry;
pub mod plan_ledger;
pub mod plan_parameters;

pub use authority_registry::*;
pub use migration_session::*;
pub use participant::*;
pub use participant_registry::*;
pub use plan_ledger::*;
pub use plan_parameters::*;
