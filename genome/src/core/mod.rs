//! Pure data model: genes, the genome and version ranking.
//!
//! Core modules perform no I/O. A deferred genome pulls from whatever lazy
//! sequence it was given, but the sequence itself is built elsewhere.

pub mod gene;
pub mod genome;
pub mod version;
