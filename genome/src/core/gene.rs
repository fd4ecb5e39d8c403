//! Gene value types.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::GenomeError;

/// Validated gene identifier, conventionally `vendor/name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct GeneName(String);

impl GeneName {
    pub fn new(name: impl Into<String>) -> Result<Self, GenomeError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(GenomeError::InvalidName);
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for GeneName {
    type Error = GenomeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<GeneName> for String {
    fn from(name: GeneName) -> Self {
        name.0
    }
}

impl AsRef<str> for GeneName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GeneName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How the gene's source was classified: a scaffolding project or an
/// installable tool. Carried as data only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeneKind {
    #[default]
    Template,
    Functional,
}

/// Ordered action lists of a gene. Each list defaults to empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneActions {
    /// Run in order when the gene is first applied to a path.
    pub expression: Vec<String>,
    /// Run in order when a previously expressed gene is refreshed.
    pub mutation: Vec<String>,
    /// Reserved for reversing an expression; never run by this crate.
    pub suppression: Vec<String>,
}

/// Immutable gene definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Gene {
    name: GeneName,
    kind: GeneKind,
    actions: GeneActions,
}

impl Gene {
    pub fn new(kind: GeneKind, name: GeneName, actions: GeneActions) -> Self {
        Self {
            name,
            kind,
            actions,
        }
    }

    pub fn template(name: GeneName, actions: GeneActions) -> Self {
        Self::new(GeneKind::Template, name, actions)
    }

    pub fn functional(name: GeneName, actions: GeneActions) -> Self {
        Self::new(GeneKind::Functional, name, actions)
    }

    pub fn name(&self) -> &GeneName {
        &self.name
    }

    pub fn kind(&self) -> GeneKind {
        self.kind
    }

    pub fn actions(&self) -> &GeneActions {
        &self.actions
    }

    pub fn expression(&self) -> &[String] {
        &self.actions.expression
    }

    pub fn mutation(&self) -> &[String] {
        &self.actions.mutation
    }

    pub fn suppression(&self) -> &[String] {
        &self.actions.suppression
    }
}
