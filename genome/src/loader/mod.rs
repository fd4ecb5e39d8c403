//! Genome loaders.
//!
//! A [`Loader`] turns an external source into a [`Genome`]:
//! - [`declarative::DeclarativeLoader`] reads a TOML file and builds an eager genome.
//! - [`packagist::PackagistLoader`] pages through a package registry and builds a
//!   deferred genome that fetches candidates on demand.

use anyhow::Result;

use crate::core::genome::Genome;

pub mod declarative;
pub mod packagist;

pub trait Loader {
    /// Build a genome from `source` (a file path or a vendor prefix,
    /// depending on the implementation).
    fn load(&self, source: &str) -> Result<Genome>;
}
