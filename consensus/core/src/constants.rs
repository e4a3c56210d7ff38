/// Number of sompi in a single KAS
pub const SOMPI_PER_KASPA: u64 = 100_000_000;

/// Transaction version used by all transactions built by this workspace
pub const TX_VERSION: u16 = 0;

/// Every input is signed with a single signature
pub const SIG_OP_COUNT: u8 = 1;

/// Inputs do not use relative lock times
pub const SEQUENCE: u64 = 0;

pub const LOCK_TIME: u64 = 0;

pub const GAS: u64 = 0;
