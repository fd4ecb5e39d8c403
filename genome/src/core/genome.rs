//! The gene catalog.
//!
//! A [`Genome`] is either built eagerly from known genes or deferred over a
//! lazy, single-pass sequence (e.g. a registry being paged through). Deferred
//! genomes pull from their sequence only as far as a lookup needs and cache
//! every gene pulled, so the sequence is never restarted. A fatal item
//! poisons the genome: every later lookup fails with the same load error.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;

use anyhow::anyhow;
use tracing::{debug, warn};

use crate::core::gene::{Gene, GeneName};
use crate::error::{GenomeError, Result};

/// Lazy gene source. An `Err` item is fatal to the whole load.
type Sequence = Box<dyn Iterator<Item = anyhow::Result<Gene>>>;

pub struct Genome {
    state: RefCell<Materialized>,
}

#[derive(Default)]
struct Materialized {
    /// Genes in discovery order.
    genes: Vec<Gene>,
    index: HashMap<String, usize>,
    pending: Option<Sequence>,
    /// Rendered cause of the fatal item that ended the sequence.
    failed: Option<String>,
}

impl Genome {
    /// Build from an explicit set of genes.
    ///
    /// Fails with [`GenomeError::DuplicateGene`] when two genes share a name.
    pub fn of(genes: impl IntoIterator<Item = Gene>) -> Result<Self> {
        let mut materialized = Materialized::default();
        for gene in genes {
            if materialized.index.contains_key(gene.name().as_str()) {
                return Err(GenomeError::DuplicateGene {
                    name: gene.name().to_string(),
                });
            }
            materialized.insert(gene);
        }
        Ok(Self {
            state: RefCell::new(materialized),
        })
    }

    /// Build over a lazy sequence consumed on demand by lookups.
    pub fn defer<I>(sequence: I) -> Self
    where
        I: IntoIterator<Item = anyhow::Result<Gene>>,
        I::IntoIter: 'static,
    {
        Self {
            state: RefCell::new(Materialized {
                pending: Some(Box::new(sequence.into_iter())),
                ..Materialized::default()
            }),
        }
    }

    pub fn contains(&self, name: &str) -> Result<bool> {
        Ok(self.state.borrow_mut().position(name)?.is_some())
    }

    pub fn get(&self, name: &str) -> Result<Gene> {
        let mut state = self.state.borrow_mut();
        match state.position(name)? {
            Some(position) => Ok(state.genes[position].clone()),
            None => Err(GenomeError::unknown(name)),
        }
    }

    /// All gene names in discovery order. Fully materializes a deferred genome.
    pub fn names(&self) -> Result<Vec<GeneName>> {
        let mut state = self.state.borrow_mut();
        while state.pull()? {}
        Ok(state.genes.iter().map(|gene| gene.name().clone()).collect())
    }
}

impl fmt::Debug for Genome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("Genome")
            .field("loaded", &state.genes.len())
            .field("pending", &state.pending.is_some())
            .field("failed", &state.failed)
            .finish()
    }
}

impl Materialized {
    fn insert(&mut self, gene: Gene) {
        self.index
            .insert(gene.name().as_str().to_string(), self.genes.len());
        self.genes.push(gene);
    }

    /// Index of `name`, pulling from the pending sequence until found or exhausted.
    fn position(&mut self, name: &str) -> Result<Option<usize>> {
        self.check_loaded()?;
        loop {
            if let Some(position) = self.index.get(name) {
                return Ok(Some(*position));
            }
            if !self.pull()? {
                return Ok(None);
            }
        }
    }

    fn check_loaded(&self) -> Result<()> {
        match &self.failed {
            Some(cause) => Err(GenomeError::Load(anyhow!("{cause}"))),
            None => Ok(()),
        }
    }

    /// Pull one gene. Returns `false` once the sequence is exhausted (or absent).
    fn pull(&mut self) -> Result<bool> {
        self.check_loaded()?;
        let Some(sequence) = self.pending.as_mut() else {
            return Ok(false);
        };
        match sequence.next() {
            Some(Ok(gene)) => {
                if self.index.contains_key(gene.name().as_str()) {
                    warn!(gene = %gene.name(), "duplicate gene in deferred genome, keeping first");
                } else {
                    debug!(gene = %gene.name(), "gene materialized");
                    self.insert(gene);
                }
                Ok(true)
            }
            Some(Err(err)) => {
                let cause = format!("{err:#}");
                warn!(error = %cause, "deferred genome failed to load");
                self.pending = None;
                self.failed = Some(cause);
                Err(GenomeError::Load(err))
            }
            None => {
                debug!(genes = self.genes.len(), "deferred genome fully materialized");
                self.pending = None;
                Ok(false)
            }
        }
    }
}
