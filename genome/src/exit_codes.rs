//! Stable exit codes for genome CLI commands.

/// Command succeeded.
pub const OK: i32 = 0;
/// Command failed: bad config, unknown gene, failed action, unreachable registry, ...
pub const FAILED: i32 = 1;
/// `genome mutate` attempted every entry but at least one failed.
pub const MUTATION_INCOMPLETE: i32 = 2;
