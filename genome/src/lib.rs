//! Reusable project genes: scaffold ("express") a gene into a directory,
//! then refresh ("mutate") every expressed gene later on.
//!
//! - **[`core`]**: Gene and genome data model plus version ranking. No I/O.
//! - **[`loader`]**: Builds a genome from a TOML file or a Packagist-style registry.
//! - **[`io`]**: Side effects (shell actions, HTTP, config, the expressed-genes manifest).
//!   Behind traits so tests can substitute recording fakes.
//!
//! Orchestration modules ([`express`], [`mutate`], [`bootstrap`], [`cli`]) tie
//! the genome to the I/O collaborators to implement the CLI commands.

pub mod bootstrap;
pub mod cli;
pub mod core;
pub mod error;
pub mod exit_codes;
pub mod express;
pub mod io;
pub mod loader;
pub mod logging;
pub mod mutate;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
