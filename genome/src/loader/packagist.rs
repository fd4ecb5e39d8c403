//! Registry-backed loader speaking the Packagist API.
//!
//! Every package whose name starts with `<vendor>/` is a candidate. The
//! search is paged through once, on the first pull; candidates are then
//! fetched one at a time as the genome asks for more genes. A candidate that
//! does not yield a gene (no stable release, wrong package type, malformed
//! metadata) is skipped. Transport failures abort the load.

use std::collections::{BTreeMap, HashSet, VecDeque};
use std::rc::Rc;

use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use super::Loader;
use crate::core::gene::{Gene, GeneActions, GeneName};
use crate::core::genome::Genome;
use crate::core::version::{Stability, latest};
use crate::io::config::RegistryConfig;
use crate::io::transport::Transport;

/// Why a candidate produced no gene.
#[derive(Debug, Error)]
enum SkipReason {
    #[error("no stable, maintained version")]
    NoStableVersion,
    #[error("type {kind:?} is neither a project nor a library with binaries")]
    Unclassifiable { kind: String },
    #[error("malformed package metadata: {0}")]
    Malformed(String),
    #[error("invalid package name")]
    InvalidName,
}

#[derive(Debug, Deserialize)]
struct SearchPage {
    #[serde(default)]
    results: Vec<SearchResult>,
    #[serde(default)]
    next: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    name: String,
    #[serde(default, rename = "virtual")]
    is_virtual: bool,
}

#[derive(Debug, Deserialize)]
struct PackageDocument {
    package: PackageMetadata,
}

#[derive(Debug, Deserialize)]
struct PackageMetadata {
    #[serde(default, deserialize_with = "map_or_empty_list")]
    versions: BTreeMap<String, PublishedVersion>,
}

#[derive(Debug, Deserialize)]
struct PublishedVersion {
    #[serde(default)]
    name: Option<String>,
    #[serde(default, rename = "type")]
    package_type: Option<String>,
    /// `true`, or the name of the replacement package.
    #[serde(default)]
    abandoned: Value,
    #[serde(default)]
    bin: Option<Vec<String>>,
    #[serde(default)]
    extra: Value,
}

impl PublishedVersion {
    fn is_abandoned(&self) -> bool {
        match &self.abandoned {
            Value::Bool(flag) => *flag,
            Value::String(replacement) => !replacement.is_empty(),
            _ => false,
        }
    }

    fn has_bin(&self) -> bool {
        self.bin.as_ref().is_some_and(|bin| !bin.is_empty())
    }

    fn actions(&self) -> Result<GeneActions, SkipReason> {
        match self.extra.get("gene") {
            Some(gene) => serde_json::from_value(gene.clone())
                .map_err(|err| SkipReason::Malformed(format!("extra.gene: {err}"))),
            None => Ok(GeneActions::default()),
        }
    }
}

/// Empty PHP arrays are encoded as `[]` even where a map is expected.
fn map_or_empty_list<'de, D, T>(deserializer: D) -> Result<BTreeMap<String, T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum MapOrList<T> {
        Map(BTreeMap<String, T>),
        List(Vec<serde::de::IgnoredAny>),
    }

    match MapOrList::deserialize(deserializer)? {
        MapOrList::Map(map) => Ok(map),
        MapOrList::List(list) if list.is_empty() => Ok(BTreeMap::new()),
        MapOrList::List(_) => Err(serde::de::Error::custom("expected a map of versions")),
    }
}

/// Loads every gene published under a vendor prefix.
pub struct PackagistLoader<T> {
    transport: Rc<T>,
    config: RegistryConfig,
}

impl<T: Transport + 'static> PackagistLoader<T> {
    pub fn new(transport: Rc<T>, config: RegistryConfig) -> Self {
        Self { transport, config }
    }
}

impl<T: Transport + 'static> Loader for PackagistLoader<T> {
    /// `source` is the vendor name; a leading `/` is ignored.
    fn load(&self, source: &str) -> Result<Genome> {
        let vendor = source.trim_start_matches('/').trim_end_matches('/');
        info!(vendor, base_url = %self.config.base_url, "deferring registry genome");
        Ok(Genome::defer(Candidates {
            transport: Rc::clone(&self.transport),
            config: self.config.clone(),
            vendor: vendor.to_string(),
            queue: None,
        }))
    }
}

/// Lazy sequence of genes derived from registry candidates.
struct Candidates<T> {
    transport: Rc<T>,
    config: RegistryConfig,
    vendor: String,
    /// Candidate names still to fetch; `None` until the search has run.
    queue: Option<VecDeque<String>>,
}

impl<T: Transport> Candidates<T> {
    fn base_url(&self) -> &str {
        self.config.base_url.trim_end_matches('/')
    }

    /// Page through the search and keep the names that are real `<vendor>/` packages.
    #[instrument(skip(self), fields(vendor = %self.vendor))]
    fn search(&self) -> Result<VecDeque<String>> {
        let prefix = format!("{}/", self.vendor);
        let mut url = Some(format!("{}/search.json?q={prefix}", self.base_url()));
        let mut results = Vec::new();
        let mut pages = 0u32;

        while let Some(current) = url.take() {
            if pages >= self.config.max_search_pages {
                warn!(
                    pages,
                    next = %current,
                    "search page limit reached, ignoring remaining pages"
                );
                break;
            }
            let body = self.transport.get(&current)?;
            let page: SearchPage = serde_json::from_str(&body)
                .with_context(|| format!("parse search page {current}"))?;
            pages += 1;
            debug!(page = pages, results = page.results.len(), "search page fetched");
            results.extend(page.results);
            url = page.next.filter(|next| !next.is_empty());
        }

        let mut seen = HashSet::new();
        let candidates: VecDeque<String> = results
            .into_iter()
            .filter(|result| result.name.starts_with(&prefix) && !result.is_virtual)
            .map(|result| result.name)
            .filter(|name| seen.insert(name.clone()))
            .collect();
        info!(pages, candidates = candidates.len(), "registry search complete");
        Ok(candidates)
    }

    fn fetch_package(&self, name: &str) -> Result<String> {
        self.transport
            .get(&format!("{}/packages/{name}.json", self.base_url()))
            .with_context(|| format!("fetch package {name}"))
    }
}

impl<T: Transport> Iterator for Candidates<T> {
    type Item = Result<Gene>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.queue.is_none() {
            match self.search() {
                Ok(candidates) => self.queue = Some(candidates),
                Err(err) => {
                    self.queue = Some(VecDeque::new());
                    return Some(Err(err));
                }
            }
        }

        while let Some(name) = self.queue.as_mut()?.pop_front() {
            let body = match self.fetch_package(&name) {
                Ok(body) => body,
                Err(err) => {
                    self.queue = Some(VecDeque::new());
                    return Some(Err(err));
                }
            };
            match gene_of(&name, &body) {
                Ok(gene) => {
                    debug!(candidate = %name, kind = ?gene.kind(), "candidate accepted");
                    return Some(Ok(gene));
                }
                Err(reason) => {
                    warn!(candidate = %name, %reason, "candidate skipped");
                }
            }
        }
        None
    }
}

/// Derive a gene from a candidate's package metadata.
fn gene_of(candidate: &str, body: &str) -> Result<Gene, SkipReason> {
    let document: PackageDocument =
        serde_json::from_str(body).map_err(|err| SkipReason::Malformed(err.to_string()))?;
    let version = select_version(document.package.versions)?;

    let name = version
        .name
        .clone()
        .unwrap_or_else(|| candidate.to_string());
    let name = GeneName::new(name).map_err(|_| SkipReason::InvalidName)?;

    match version.package_type.as_deref() {
        Some("project") => Ok(Gene::template(name, version.actions()?)),
        Some("library") if version.has_bin() => Ok(Gene::functional(name, version.actions()?)),
        other => Err(SkipReason::Unclassifiable {
            kind: other.unwrap_or_default().to_string(),
        }),
    }
}

/// Highest stable, non-abandoned version.
fn select_version(
    mut versions: BTreeMap<String, PublishedVersion>,
) -> Result<PublishedVersion, SkipReason> {
    let eligible = versions
        .iter()
        .filter(|(version, meta)| Stability::of(version).is_stable() && !meta.is_abandoned())
        .map(|(version, _)| version.as_str());
    let selected = latest(eligible).ok_or(SkipReason::NoStableVersion)?;
    debug!(version = selected.as_str(), "selected version");
    versions
        .remove(selected.as_str())
        .ok_or(SkipReason::NoStableVersion)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::core::gene::GeneKind;
    use crate::error::GenomeError;
    use crate::test_support::FakeTransport;

    const BASE: &str = "https://registry.test";

    fn search_url() -> String {
        format!("{BASE}/search.json?q=acme/")
    }

    fn package_url(name: &str) -> String {
        format!("{BASE}/packages/{name}.json")
    }

    fn config() -> RegistryConfig {
        RegistryConfig {
            base_url: BASE.to_string(),
            ..RegistryConfig::default()
        }
    }

    fn search(names: &[&str]) -> Value {
        let results: Vec<Value> = names.iter().map(|name| json!({ "name": name })).collect();
        json!({ "results": results, "total": names.len() })
    }

    fn project(name: &str) -> Value {
        json!({
            "package": {
                "name": name,
                "versions": {
                    "1.0.0": { "name": name, "type": "project" }
                }
            }
        })
    }

    fn load(transport: &Rc<FakeTransport>) -> Genome {
        PackagistLoader::new(Rc::clone(transport), config())
            .load("acme")
            .expect("load")
    }

    fn names(genome: &Genome) -> Vec<String> {
        genome
            .names()
            .expect("names")
            .into_iter()
            .map(String::from)
            .collect()
    }

    #[test]
    fn selects_highest_stable_version() {
        let transport = Rc::new(
            FakeTransport::new()
                .route(&search_url(), search(&["acme/foo"]))
                .route(
                    &package_url("acme/foo"),
                    json!({
                        "package": {
                            "versions": {
                                "1.0.0": {
                                    "name": "acme/foo",
                                    "type": "project",
                                    "extra": { "gene": { "expression": ["v1"] } }
                                },
                                "1.1.0-beta": {
                                    "name": "acme/foo",
                                    "type": "project",
                                    "extra": { "gene": { "expression": ["beta"] } }
                                },
                                "2.0.0": {
                                    "name": "acme/foo",
                                    "type": "project",
                                    "extra": { "gene": { "expression": ["v2"], "mutation": ["m2"] } }
                                },
                                "3.0.0": {
                                    "name": "acme/foo",
                                    "type": "project",
                                    "abandoned": "acme/bar",
                                    "extra": { "gene": { "expression": ["abandoned"] } }
                                },
                                "dev-master": {
                                    "name": "acme/foo",
                                    "type": "project",
                                    "extra": { "gene": { "expression": ["dev"] } }
                                }
                            }
                        }
                    }),
                ),
        );

        let gene = load(&transport).get("acme/foo").expect("gene");
        assert_eq!(gene.expression(), ["v2"]);
        assert_eq!(gene.mutation(), ["m2"]);
        assert!(gene.suppression().is_empty());
    }

    #[test]
    fn package_type_decides_the_gene_kind() {
        let transport = Rc::new(
            FakeTransport::new()
                .route(
                    &search_url(),
                    search(&["acme/skeleton", "acme/cli", "acme/lib"]),
                )
                .route(&package_url("acme/skeleton"), project("acme/skeleton"))
                .route(
                    &package_url("acme/cli"),
                    json!({ "package": { "versions": {
                        "1.0.0": { "name": "acme/cli", "type": "library", "bin": ["bin/cli"] }
                    } } }),
                )
                .route(
                    &package_url("acme/lib"),
                    json!({ "package": { "versions": {
                        "1.0.0": { "name": "acme/lib", "type": "library" }
                    } } }),
                ),
        );

        let genome = load(&transport);
        assert_eq!(
            genome.get("acme/skeleton").expect("skeleton").kind(),
            GeneKind::Template
        );
        assert_eq!(
            genome.get("acme/cli").expect("cli").kind(),
            GeneKind::Functional
        );
        assert!(!genome.contains("acme/lib").expect("contains"));
        assert_eq!(names(&genome), vec!["acme/skeleton", "acme/cli"]);
    }

    #[test]
    fn search_follows_next_pages_before_filtering() {
        let page_two = format!("{BASE}/search.json?q=acme/&page=2");
        let transport = Rc::new(
            FakeTransport::new()
                .route(
                    &search_url(),
                    json!({ "results": [{ "name": "acme/one" }], "total": 2, "next": page_two.clone() }),
                )
                .route(
                    &page_two,
                    json!({ "results": [{ "name": "acme/two" }], "total": 2 }),
                )
                .route(&package_url("acme/one"), project("acme/one"))
                .route(&package_url("acme/two"), project("acme/two")),
        );

        let genome = load(&transport);
        assert_eq!(names(&genome), vec!["acme/one", "acme/two"]);

        let searches = transport
            .requests()
            .into_iter()
            .filter(|url| url.contains("/search.json"))
            .count();
        assert_eq!(searches, 2);
    }

    #[test]
    fn virtual_and_foreign_results_are_never_fetched() {
        let transport = Rc::new(
            FakeTransport::new()
                .route(
                    &search_url(),
                    json!({ "results": [
                        { "name": "acme/real" },
                        { "name": "acme/virtual", "virtual": true },
                        { "name": "notacme/thing" },
                        { "name": "acme-labs/thing" },
                        { "name": "acme/explicit", "virtual": false }
                    ] }),
                )
                .route(&package_url("acme/real"), project("acme/real"))
                .route(&package_url("acme/explicit"), project("acme/explicit")),
        );

        let genome = load(&transport);
        assert_eq!(names(&genome), vec!["acme/real", "acme/explicit"]);
        assert_eq!(
            transport.requests(),
            vec![
                search_url(),
                package_url("acme/real"),
                package_url("acme/explicit"),
            ]
        );
    }

    #[test]
    fn unusable_candidates_are_skipped_silently() {
        let transport = Rc::new(
            FakeTransport::new()
                .route(
                    &search_url(),
                    search(&["acme/x", "acme/y", "acme/plugin", "acme/beta", "acme/broken"]),
                )
                .route(&package_url("acme/x"), project("acme/x"))
                .route(&package_url("acme/y"), project("acme/y"))
                .route(
                    &package_url("acme/plugin"),
                    json!({ "package": { "versions": {
                        "1.0.0": { "name": "acme/plugin", "type": "composer-plugin" }
                    } } }),
                )
                .route(
                    &package_url("acme/beta"),
                    json!({ "package": { "versions": {
                        "0.1.0-beta": { "name": "acme/beta", "type": "project" },
                        "dev-main": { "name": "acme/beta", "type": "project" }
                    } } }),
                )
                .route_raw(&package_url("acme/broken"), "<html>oops</html>"),
        );

        let genome = load(&transport);
        assert!(genome.contains("acme/x").expect("contains"));
        assert!(genome.contains("acme/y").expect("contains"));
        assert_eq!(names(&genome), vec!["acme/x", "acme/y"]);
    }

    #[test]
    fn package_fetch_failure_aborts_the_load() {
        let transport = Rc::new(
            FakeTransport::new()
                .route(&search_url(), search(&["acme/x", "acme/missing"]))
                .route(&package_url("acme/x"), project("acme/x")),
        );

        let genome = load(&transport);
        let err = genome.names().unwrap_err();
        assert!(matches!(err, GenomeError::Load(_)));
        let rendered = format!("{:#}", anyhow::Error::new(err));
        assert!(rendered.contains("fetch package acme/missing"), "{rendered}");
    }

    #[test]
    fn search_failure_aborts_the_load() {
        let transport = Rc::new(FakeTransport::new());
        let genome = load(&transport);
        assert!(matches!(
            genome.contains("acme/x").unwrap_err(),
            GenomeError::Load(_)
        ));
    }

    #[test]
    fn candidates_are_fetched_on_demand() {
        let transport = Rc::new(
            FakeTransport::new()
                .route(&search_url(), search(&["acme/a", "acme/b"]))
                .route(&package_url("acme/a"), project("acme/a"))
                .route(&package_url("acme/b"), project("acme/b")),
        );

        let genome = load(&transport);
        assert!(transport.requests().is_empty());

        assert!(genome.contains("acme/a").expect("contains"));
        assert_eq!(
            transport.requests(),
            vec![search_url(), package_url("acme/a")]
        );

        assert!(genome.contains("acme/b").expect("contains"));
        assert!(genome.contains("acme/a").expect("contains"));
        assert_eq!(transport.requests().len(), 3);
    }

    #[test]
    fn pagination_stops_at_the_page_limit() {
        let transport = Rc::new(
            FakeTransport::new()
                .route(
                    &search_url(),
                    json!({ "results": [{ "name": "acme/loop" }], "next": search_url() }),
                )
                .route(&package_url("acme/loop"), project("acme/loop")),
        );
        let loader = PackagistLoader::new(
            Rc::clone(&transport),
            RegistryConfig {
                max_search_pages: 3,
                ..config()
            },
        );

        let genome = loader.load("acme").expect("load");
        assert_eq!(names(&genome), vec!["acme/loop"]);
        assert_eq!(
            transport
                .requests()
                .iter()
                .filter(|url| **url == package_url("acme/loop"))
                .count(),
            1
        );
        let searches = transport
            .requests()
            .into_iter()
            .filter(|url| url.contains("/search.json"))
            .count();
        assert_eq!(searches, 3);
    }

    #[test]
    fn leading_slash_in_vendor_is_ignored() {
        let transport = Rc::new(
            FakeTransport::new()
                .route(&search_url(), search(&["acme/x"]))
                .route(&package_url("acme/x"), project("acme/x")),
        );
        let genome = PackagistLoader::new(Rc::clone(&transport), config())
            .load("/acme")
            .expect("load");
        assert!(genome.contains("acme/x").expect("contains"));
    }

    #[test]
    fn empty_php_arrays_are_tolerated() {
        let transport = Rc::new(
            FakeTransport::new()
                .route(&search_url(), search(&["acme/x", "acme/empty"]))
                .route(
                    &package_url("acme/x"),
                    json!({ "package": { "versions": {
                        "1.0.0": { "name": "acme/x", "type": "project", "extra": [] }
                    } } }),
                )
                .route(
                    &package_url("acme/empty"),
                    json!({ "package": { "versions": [] } }),
                ),
        );

        let genome = load(&transport);
        assert_eq!(names(&genome), vec!["acme/x"]);
        assert!(genome.get("acme/x").expect("x").expression().is_empty());
    }
}
