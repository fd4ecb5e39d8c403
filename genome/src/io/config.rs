//! Configuration stored under `.genome/config.toml`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

/// Canonical paths for a project root.
#[derive(Debug, Clone)]
pub struct GenomePaths {
    pub root: PathBuf,
    pub config_dir: PathBuf,
    pub config_path: PathBuf,
}

impl GenomePaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let config_dir = root.join(".genome");
        Self {
            root,
            config_path: config_dir.join("config.toml"),
            config_dir,
        }
    }

    pub fn manifest_path(&self, config: &GenomeConfig) -> PathBuf {
        self.root.join(&config.manifest_file)
    }

    /// Resolve a configured path against the project root (absolute paths win).
    pub fn resolve(&self, path: &Path) -> PathBuf {
        self.root.join(path)
    }
}

/// Genome configuration (TOML).
///
/// Every field is optional in the file; missing ones fall back to defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GenomeConfig {
    /// Manifest of expressed genes, relative to the project root.
    pub manifest_file: PathBuf,

    /// Wall-clock limit for a single action, in seconds.
    pub action_timeout_secs: u64,

    /// Keep at most this many bytes of each action output stream.
    pub action_output_limit_bytes: usize,

    pub source: GenomeSource,

    pub registry: RegistryConfig,
}

/// Where the genome is loaded from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum GenomeSource {
    /// Declarative TOML file, relative to the project root.
    File { path: PathBuf },
    /// Every package published under `vendor/` on the registry.
    Packagist { vendor: String },
}

impl Default for GenomeSource {
    fn default() -> Self {
        Self::File {
            path: PathBuf::from("genome.toml"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RegistryConfig {
    pub base_url: String,

    /// Stop following `next` search pages after this many requests.
    pub max_search_pages: u32,

    /// Per-request HTTP timeout, in seconds.
    pub timeout_secs: u64,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            base_url: "https://packagist.org".to_string(),
            max_search_pages: 100,
            timeout_secs: 30,
        }
    }
}

impl Default for GenomeConfig {
    fn default() -> Self {
        Self {
            manifest_file: PathBuf::from("expressed-genes.json"),
            action_timeout_secs: 10 * 60,
            action_output_limit_bytes: 1_000_000,
            source: GenomeSource::default(),
            registry: RegistryConfig::default(),
        }
    }
}

impl GenomeConfig {
    pub fn validate(&self) -> Result<()> {
        if self.manifest_file.as_os_str().is_empty() {
            return Err(anyhow!("manifest_file must not be empty"));
        }
        if self.action_timeout_secs == 0 {
            return Err(anyhow!("action_timeout_secs must be > 0"));
        }
        if self.action_output_limit_bytes == 0 {
            return Err(anyhow!("action_output_limit_bytes must be > 0"));
        }
        if let GenomeSource::Packagist { vendor } = &self.source
            && vendor.trim_matches('/').trim().is_empty()
        {
            return Err(anyhow!("source.vendor must not be empty"));
        }
        self.registry.validate()
    }
}

impl RegistryConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(anyhow!(
                "registry.base_url must be an http(s) url, got {}",
                self.base_url
            ));
        }
        if self.max_search_pages == 0 {
            return Err(anyhow!("registry.max_search_pages must be > 0"));
        }
        if self.timeout_secs == 0 {
            return Err(anyhow!("registry.timeout_secs must be > 0"));
        }
        Ok(())
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `GenomeConfig::default()`.
pub fn load_config(path: &Path) -> Result<GenomeConfig> {
    if !path.exists() {
        let cfg = GenomeConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: GenomeConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()
        .with_context(|| format!("invalid config {}", path.display()))?;
    Ok(cfg)
}
