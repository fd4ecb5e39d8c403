//! Side-effecting collaborators: shell actions, HTTP, configuration and the manifest.

pub mod actions;
pub mod config;
pub mod manifest;
pub mod process;
pub mod transport;
