//! Action execution backends.
//!
//! The [`ActionRunner`] trait decouples express/mutate orchestration from how
//! an action string is actually run. Tests use recording runners that never
//! spawn processes.

use std::path::Path;
use std::process::Command;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use tracing::{debug, info, instrument};

use crate::io::config::GenomeConfig;
use crate::io::process::run_with_timeout;

/// Bytes of stderr quoted in a failed action's error.
const STDERR_EXCERPT_BYTES: usize = 2_000;

/// Runs a single opaque action in a working directory.
pub trait ActionRunner {
    fn run(&self, action: &str, workdir: &Path) -> Result<()>;
}

/// Runs each action through `sh -c`.
#[derive(Debug, Clone)]
pub struct ShellActionRunner {
    pub timeout: Duration,
    pub output_limit_bytes: usize,
}

impl ShellActionRunner {
    pub fn from_config(config: &GenomeConfig) -> Self {
        Self {
            timeout: Duration::from_secs(config.action_timeout_secs),
            output_limit_bytes: config.action_output_limit_bytes,
        }
    }
}

impl ActionRunner for ShellActionRunner {
    #[instrument(skip_all, fields(action = %action, workdir = %workdir.display()))]
    fn run(&self, action: &str, workdir: &Path) -> Result<()> {
        info!("running action");
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg(action).current_dir(workdir);

        let output = run_with_timeout(cmd, self.timeout, self.output_limit_bytes)
            .with_context(|| format!("run `{action}` in {}", workdir.display()))?;
        debug!(stdout = %String::from_utf8_lossy(&output.stdout), "action output");

        if output.timed_out {
            bail!("`{action}` timed out after {:?}", self.timeout);
        }
        if !output.status.success() {
            let stderr = output.stderr_tail(STDERR_EXCERPT_BYTES);
            if stderr.is_empty() {
                bail!("`{action}` exited with status {:?}", output.status.code());
            }
            bail!(
                "`{action}` exited with status {:?}: {stderr}",
                output.status.code()
            );
        }
        Ok(())
    }
}
