//! `genome mutate`: refresh genes previously expressed.

use std::path::Path;

use tracing::{debug, info, instrument, warn};

use crate::core::genome::Genome;
use crate::error::{GenomeError, Result};
use crate::io::actions::ActionRunner;
use crate::io::manifest::{ExpressedGene, Manifest};

pub struct Mutate<'a, R> {
    genome: &'a Genome,
    runner: &'a R,
}

/// Outcome of refreshing every manifest entry.
#[derive(Debug, Default)]
pub struct MutationReport {
    pub mutated: Vec<ExpressedGene>,
    pub failures: Vec<MutationFailure>,
}

#[derive(Debug)]
pub struct MutationFailure {
    pub entry: ExpressedGene,
    pub error: GenomeError,
}

impl MutationReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

impl<'a, R: ActionRunner> Mutate<'a, R> {
    pub fn new(genome: &'a Genome, runner: &'a R) -> Self {
        Self { genome, runner }
    }

    /// Run the gene's mutation actions in `path`. The manifest is left untouched.
    #[instrument(skip(self), fields(path = %path.display()))]
    pub fn mutate_gene(&self, name: &str, path: &Path) -> Result<()> {
        let gene = self.genome.get(name)?;
        info!(gene = %gene.name(), actions = gene.mutation().len(), "mutating gene");

        for action in gene.mutation() {
            debug!(%action, "mutation action");
            self.runner
                .run(action, path)
                .map_err(|source| GenomeError::MutationFailed {
                    gene: name.to_string(),
                    action: action.clone(),
                    source,
                })?;
        }
        Ok(())
    }

    /// Mutate every manifest entry in order.
    ///
    /// A failing entry is reported and the remaining entries are still
    /// attempted. An unreadable manifest or a genome that failed to load
    /// fails the whole batch.
    pub fn mutate_all(&self, manifest: &Manifest) -> Result<MutationReport> {
        let entries = manifest.entries().map_err(GenomeError::Manifest)?;
        info!(
            manifest = %manifest.path().display(),
            entries = entries.len(),
            "mutating expressed genes"
        );

        let mut report = MutationReport::default();
        for entry in entries {
            match self.mutate_gene(&entry.gene, Path::new(&entry.path)) {
                Ok(()) => report.mutated.push(entry),
                Err(error @ GenomeError::Load(_)) => return Err(error),
                Err(error) => {
                    warn!(gene = %entry.gene, path = %entry.path, %error, "mutation failed");
                    report.failures.push(MutationFailure { entry, error });
                }
            }
        }
        Ok(report)
    }
}
