//! CLI command implementations.
//!
//! Each command bootstraps the project rooted at the working directory and
//! returns the process exit code.

use std::path::Path;

use anyhow::Result;
use tracing::debug;

use crate::bootstrap::bootstrap;
use crate::exit_codes;
use crate::express::Express;
use crate::io::actions::ShellActionRunner;
use crate::io::manifest::Manifest;
use crate::mutate::Mutate;

/// Express `gene` into `path` and record it in the manifest.
pub fn express(root: &Path, gene: &str, path: &Path) -> Result<i32> {
    let session = bootstrap(root)?;
    let runner = ShellActionRunner::from_config(&session.config);
    let manifest = Manifest::new(session.paths.manifest_path(&session.config));
    Express::new(&session.genome, &runner, manifest).express_gene(gene, path)?;
    println!("expressed {} in {}", gene, path.display());
    Ok(exit_codes::OK)
}

/// Mutate every gene recorded in the manifest.
pub fn mutate(root: &Path) -> Result<i32> {
    let session = bootstrap(root)?;
    let runner = ShellActionRunner::from_config(&session.config);
    let manifest = Manifest::new(session.paths.manifest_path(&session.config));
    let report = Mutate::new(&session.genome, &runner).mutate_all(&manifest)?;

    for entry in &report.mutated {
        println!("mutated {} in {}", entry.gene, entry.path);
    }
    for failure in &report.failures {
        eprintln!(
            "failed {} in {}: {}",
            failure.entry.gene,
            failure.entry.path,
            failure.error.chain()
        );
    }
    debug!(
        mutated = report.mutated.len(),
        failed = report.failures.len(),
        "mutate finished"
    );
    if report.is_success() {
        Ok(exit_codes::OK)
    } else {
        Ok(exit_codes::MUTATION_INCOMPLETE)
    }
}

/// Print every known gene name, one per line.
pub fn genes(root: &Path) -> Result<i32> {
    let session = bootstrap(root)?;
    for name in session.genome.names()? {
        println!("{name}");
    }
    Ok(exit_codes::OK)
}
