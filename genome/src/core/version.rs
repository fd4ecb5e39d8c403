//! Stability classification and ordering of published package versions.
//!
//! Follows Composer's conventions: the stability is read off the version
//! string's modifier (`-beta2`, `RC1`, `-dev`, ...), and versions are compared
//! on up to four numeric components followed by the modifier.

use std::cmp::Ordering;
use std::sync::LazyLock;

use regex::Regex;

static MODIFIER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)[._-]?(?:(stable|beta|b|rc|alpha|a|patch|pl|p)((?:[.-]?\d+)*)?)?([.-]?dev)?(?:\+.*)?$",
    )
    .unwrap()
});

static VERSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^v?(\d+)(?:\.(\d+))?(?:\.(\d+))?(?:\.(\d+))?(?:[._-]?(stable|beta|b|rc|alpha|a|patch|pl|p)[.-]?(\d+)?)?(?:\+.*)?$",
    )
    .unwrap()
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stability {
    Stable,
    Rc,
    Beta,
    Alpha,
    Dev,
}

impl Stability {
    /// Classify a raw version string.
    pub fn of(version: &str) -> Self {
        let version = version.split('#').next().unwrap_or_default();
        let lowered = version.to_ascii_lowercase();
        if lowered.starts_with("dev-") || lowered.ends_with("-dev") {
            return Self::Dev;
        }
        let Some(caps) = MODIFIER_RE.captures(&lowered) else {
            return Self::Stable;
        };
        if caps.get(3).is_some_and(|m| !m.as_str().is_empty()) {
            return Self::Dev;
        }
        match caps.get(1).map(|m| m.as_str()) {
            Some("beta" | "b") => Self::Beta,
            Some("alpha" | "a") => Self::Alpha,
            Some("rc") => Self::Rc,
            _ => Self::Stable,
        }
    }

    pub fn is_stable(self) -> bool {
        self == Self::Stable
    }
}

/// A parsed, comparable version. Keeps the original string for lookups.
#[derive(Debug, Clone)]
pub struct Version {
    raw: String,
    numbers: [u64; 4],
    modifier: i8,
    modifier_number: u64,
}

impl Version {
    /// Parse a version string; `None` when it is not a numbered release
    /// (branches, dates with letters, ...).
    pub fn parse(raw: &str) -> Option<Self> {
        let caps = VERSION_RE.captures(raw.trim())?;
        let mut numbers = [0u64; 4];
        for (slot, group) in numbers.iter_mut().zip(1..=4) {
            if let Some(m) = caps.get(group) {
                *slot = m.as_str().parse().ok()?;
            }
        }
        let modifier = caps
            .get(5)
            .map(|m| modifier_rank(&m.as_str().to_ascii_lowercase()))
            .unwrap_or(0);
        let modifier_number = match caps.get(6) {
            Some(m) => m.as_str().parse().ok()?,
            None => 0,
        };
        Some(Self {
            raw: raw.to_string(),
            numbers,
            modifier,
            modifier_number,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    fn key(&self) -> ([u64; 4], i8, u64) {
        (self.numbers, self.modifier, self.modifier_number)
    }
}

fn modifier_rank(modifier: &str) -> i8 {
    match modifier {
        "alpha" | "a" => -3,
        "beta" | "b" => -2,
        "rc" => -1,
        "patch" | "pl" | "p" => 1,
        _ => 0,
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Version {}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

/// Sort parseable versions highest first, dropping the ones that don't parse.
pub fn sort_descending<'a, I>(versions: I) -> Vec<Version>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut parsed: Vec<Version> = versions.into_iter().filter_map(Version::parse).collect();
    parsed.sort_by(|a, b| b.cmp(a));
    parsed
}

/// Highest parseable version.
pub fn latest<'a, I>(versions: I) -> Option<Version>
where
    I: IntoIterator<Item = &'a str>,
{
    sort_descending(versions).into_iter().next()
}
