//! Loader for a hand-written TOML genome file.
//!
//! ```toml
//! [genes."acme/skeleton"]
//! kind = "template"
//! expression = ["git init", "composer install"]
//! mutation = ["composer update"]
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, instrument};

use super::Loader;
use crate::core::gene::{Gene, GeneActions, GeneKind, GeneName};
use crate::core::genome::Genome;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct GenomeFile {
    #[serde(default)]
    genes: BTreeMap<String, GeneEntry>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct GeneEntry {
    kind: GeneKind,
    expression: Vec<String>,
    mutation: Vec<String>,
    suppression: Vec<String>,
}

impl GeneEntry {
    fn into_gene(self, name: GeneName) -> Gene {
        let actions = GeneActions {
            expression: self.expression,
            mutation: self.mutation,
            suppression: self.suppression,
        };
        Gene::new(self.kind, name, actions)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct DeclarativeLoader;

impl Loader for DeclarativeLoader {
    #[instrument(skip(self))]
    fn load(&self, source: &str) -> Result<Genome> {
        let path = Path::new(source);
        let contents =
            fs::read_to_string(path).with_context(|| format!("read genome {}", path.display()))?;
        let genome =
            parse_genome(&contents).with_context(|| format!("load genome {}", path.display()))?;
        Ok(genome)
    }
}

/// Parse genome TOML into an eager genome, genes ordered by name.
pub fn parse_genome(contents: &str) -> Result<Genome> {
    let file: GenomeFile = toml::from_str(contents).context("parse genome toml")?;
    debug!(genes = file.genes.len(), "genome file parsed");
    let genes = file
        .genes
        .into_iter()
        .map(|(name, entry)| {
            let name = GeneName::new(name.clone()).with_context(|| format!("gene {name:?}"))?;
            Ok(entry.into_gene(name))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(Genome::of(genes)?)
}
