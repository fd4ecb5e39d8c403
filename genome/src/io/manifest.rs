//! Manifest of expressed genes (`expressed-genes.json`).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One successful expression: which gene, applied where.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExpressedGene {
    pub gene: String,
    pub path: String,
}

impl ExpressedGene {
    pub fn new(gene: impl Into<String>, path: &Path) -> Self {
        Self {
            gene: gene.into(),
            path: path.to_string_lossy().into_owned(),
        }
    }
}

/// JSON array of [`ExpressedGene`] records, in expression order.
#[derive(Debug, Clone)]
pub struct Manifest {
    path: PathBuf,
}

impl Manifest {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every record. A missing manifest has no records.
    pub fn entries(&self) -> Result<Vec<ExpressedGene>> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no manifest yet");
            return Ok(Vec::new());
        }
        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("read manifest {}", self.path.display()))?;
        let entries: Vec<ExpressedGene> = serde_json::from_str(&contents)
            .with_context(|| format!("parse manifest {}", self.path.display()))?;
        debug!(path = %self.path.display(), entries = entries.len(), "manifest loaded");
        Ok(entries)
    }

    /// Append one record, rewriting the file atomically.
    pub fn append(&self, entry: ExpressedGene) -> Result<()> {
        let mut entries = self.entries()?;
        debug!(gene = %entry.gene, path = %entry.path, "recording expressed gene");
        entries.push(entry);
        let mut buf = serde_json::to_string_pretty(&entries).context("serialize manifest")?;
        buf.push('\n');
        write_atomic(&self.path, &buf)
    }
}

fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("create directory {}", parent.display()))?;
    }
    let tmp_path = path.with_extension("json.tmp");
    fs::write(&tmp_path, contents)
        .with_context(|| format!("write temp manifest {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("replace manifest {}", path.display()))?;
    Ok(())
}
