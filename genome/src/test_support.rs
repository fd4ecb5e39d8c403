//! Test-only helpers: gene builders and recording fakes for the I/O seams.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Result, anyhow};
use serde_json::Value;

use crate::core::gene::{Gene, GeneActions, GeneName};
use crate::io::actions::ActionRunner;
use crate::io::transport::Transport;

/// Template gene without actions.
pub fn template(name: &str) -> Gene {
    Gene::template(gene_name(name), GeneActions::default())
}

/// Template gene with the given expression and mutation actions.
pub fn gene_with(name: &str, expression: &[&str], mutation: &[&str]) -> Gene {
    Gene::template(
        gene_name(name),
        GeneActions {
            expression: to_strings(expression),
            mutation: to_strings(mutation),
            suppression: Vec::new(),
        },
    )
}

fn gene_name(name: &str) -> GeneName {
    GeneName::new(name).expect("test gene name")
}

fn to_strings(actions: &[&str]) -> Vec<String> {
    actions.iter().map(|action| action.to_string()).collect()
}

/// Records every `(action, workdir)` instead of running anything.
///
/// Fails (after recording) on any action listed in `failing`.
#[derive(Debug, Default)]
pub struct RecordingRunner {
    calls: RefCell<Vec<(String, PathBuf)>>,
    failing: Vec<String>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(actions: &[&str]) -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            failing: to_strings(actions),
        }
    }

    pub fn calls(&self) -> Vec<(String, PathBuf)> {
        self.calls.borrow().clone()
    }

    pub fn actions(&self) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .map(|(action, _)| action.clone())
            .collect()
    }
}

impl ActionRunner for RecordingRunner {
    fn run(&self, action: &str, workdir: &Path) -> Result<()> {
        self.calls
            .borrow_mut()
            .push((action.to_string(), workdir.to_path_buf()));
        if self.failing.iter().any(|failing| failing == action) {
            return Err(anyhow!("scripted failure for `{action}`"));
        }
        Ok(())
    }
}

/// Serves canned bodies per URL and records every request.
///
/// Unknown URLs fail like an unreachable host.
#[derive(Debug, Default)]
pub struct FakeTransport {
    routes: HashMap<String, String>,
    requests: RefCell<Vec<String>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(self, url: &str, body: Value) -> Self {
        self.route_raw(url, &body.to_string())
    }

    pub fn route_raw(mut self, url: &str, body: &str) -> Self {
        self.routes.insert(url.to_string(), body.to_string());
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }
}

impl Transport for FakeTransport {
    fn get(&self, url: &str) -> Result<String> {
        self.requests.borrow_mut().push(url.to_string());
        self.routes
            .get(url)
            .cloned()
            .ok_or_else(|| anyhow!("no route for {url}"))
    }
}
