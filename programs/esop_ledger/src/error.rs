use anchor_lang::prelude::*;

/// Result type returned by the ledger's domain methods.
pub type LedgerResult<T> = core::result::Result<T, LedgerError>;

/// Custom error codes for the option plan ledger.
#[error_code]
pub enum LedgerError {
    #[msg("Unauthorized: ledger admin signature required")]
    UnauthorizedAdmin,

    #[msg("Unauthorized: caller is not the authority registry principal")]
    UnauthorizedPrincipal,

    #[msg("Unauthorized: caller is not the registry controller")]
    UnauthorizedController,

    #[msg("Invalid public key")]
    InvalidPubkey,

    #[msg("Invalid plan configuration")]
    InvalidConfig,

    #[msg("Invalid timestamp")]
    InvalidTimestamp,

    #[msg("Grant would exceed the remaining pool")]
    InsufficientPool,

    #[msg("Grant carries neither pool nor extra options")]
    EmptyGrant,

    #[msg("Duplicate participant")]
    DuplicateParticipant,

    #[msg("Participant registry is full")]
    RegistryFull,

    #[msg("Participant registry does not belong to this ledger")]
    RegistryMismatch,

    #[msg("Unknown participant")]
    UnknownParticipant,

    #[msg("Offer was already signed")]
    AlreadySigned,

    #[msg("Sign deadline has expired")]
    DeadlineExpired,

    #[msg("Sign deadline has not been reached")]
    DeadlineNotReached,

    #[msg("Participant is already terminated")]
    AlreadyTerminated,

    #[msg("Ledger is not open")]
    LedgerNotOpen,

    #[msg("Ledger is in maintenance mode")]
    MaintenanceInProgress,

    #[msg("Ledger is not in maintenance mode")]
    NotInMaintenance,

    #[msg("Ledger is retired")]
    LedgerRetired,

    #[msg("Pool snapshot was already imported")]
    SnapshotAlreadyImported,

    #[msg("Migration session does not match the supplied accounts")]
    SessionMismatch,

    #[msg("Migration session is not in the required phase")]
    MigrationPhaseMismatch,

    #[msg("Migration cursor is past the copied range")]
    CursorOutOfRange,

    #[msg("Empty batch")]
    EmptyBatch,

    #[msg("Batch size too large")]
    BatchTooLarge,

    #[msg("Migration has not copied every record")]
    MigrationIncomplete,

    #[msg("Migration reconciliation failed")]
    MigrationIntegrityError,

    #[msg("Migration has not been verified")]
    MigrationNotVerified,

    #[msg("Ledger is bound to a migration session")]
    MigrationLocked,

    #[msg("Authority registry does not point at the destination ledger")]
    AuthorityNotSwitched,

    #[msg("Authority registry is shut down")]
    RegistryShutDown,

    #[msg("Pool conservation violated")]
    ConservationViolated,

    #[msg("Math overflow")]
    MathOverflow,
}
