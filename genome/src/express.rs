//! `genome express`: apply a gene to a path for the first time.

use std::fs;
use std::path::Path;

use tracing::{debug, info, instrument};

use crate::core::genome::Genome;
use crate::error::{GenomeError, Result};
use crate::io::actions::ActionRunner;
use crate::io::manifest::{ExpressedGene, Manifest};

pub struct Express<'a, R> {
    genome: &'a Genome,
    runner: &'a R,
    manifest: Manifest,
}

impl<'a, R: ActionRunner> Express<'a, R> {
    pub fn new(genome: &'a Genome, runner: &'a R, manifest: Manifest) -> Self {
        Self {
            genome,
            runner,
            manifest,
        }
    }

    /// Run the gene's expression actions in `path`, then record the expression.
    ///
    /// Actions run in declared order and the first failure stops the rest.
    /// Actions that already ran are not undone, and nothing is recorded.
    #[instrument(skip(self), fields(path = %path.display()))]
    pub fn express_gene(&self, name: &str, path: &Path) -> Result<()> {
        let gene = self.genome.get(name)?;
        info!(gene = %gene.name(), actions = gene.expression().len(), "expressing gene");

        fs::create_dir_all(path).map_err(|source| GenomeError::TargetDirectory {
            gene: name.to_string(),
            path: path.display().to_string(),
            source,
        })?;

        for action in gene.expression() {
            debug!(%action, "expression action");
            self.runner
                .run(action, path)
                .map_err(|source| GenomeError::ExpressionFailed {
                    gene: name.to_string(),
                    action: action.clone(),
                    source,
                })?;
        }

        self.manifest
            .append(ExpressedGene::new(gene.name().as_str(), path))
            .map_err(GenomeError::Manifest)?;
        info!(gene = %gene.name(), "gene expressed");
        Ok(())
    }
}
