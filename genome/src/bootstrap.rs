//! Builds the genome for a project root from its configuration.

use std::path::Path;
use std::rc::Rc;

use anyhow::{Context, Result};
use tracing::debug;

use crate::core::genome::Genome;
use crate::io::config::{GenomeConfig, GenomePaths, GenomeSource, load_config};
use crate::io::transport::HttpTransport;
use crate::loader::Loader;
use crate::loader::declarative::DeclarativeLoader;
use crate::loader::packagist::PackagistLoader;

/// Everything a command needs: resolved paths, configuration and the genome.
#[derive(Debug)]
pub struct Session {
    pub paths: GenomePaths,
    pub config: GenomeConfig,
    pub genome: Genome,
}

/// Load `.genome/config.toml` under `root` and the genome it points at.
pub fn bootstrap(root: &Path) -> Result<Session> {
    let paths = GenomePaths::new(root);
    let config = load_config(&paths.config_path)?;
    let genome = load_genome(&paths, &config)?;
    Ok(Session {
        paths,
        config,
        genome,
    })
}

/// Build the genome from the configured source.
pub fn load_genome(paths: &GenomePaths, config: &GenomeConfig) -> Result<Genome> {
    match &config.source {
        GenomeSource::File { path } => {
            let path = paths.resolve(path);
            debug!(path = %path.display(), "loading declarative genome");
            DeclarativeLoader.load(&path.to_string_lossy())
        }
        GenomeSource::Packagist { vendor } => {
            let transport =
                Rc::new(HttpTransport::new(&config.registry).context("create registry transport")?);
            PackagistLoader::new(transport, config.registry.clone()).load(vendor)
        }
    }
}
