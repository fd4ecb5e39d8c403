//! Express, mutate and list project genes.
//!
//! The genome comes from `genome.toml` (or whatever `.genome/config.toml`
//! points at); expressed genes are recorded in `expressed-genes.json`.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use genome::{cli, exit_codes, logging};

#[derive(Parser)]
#[command(name = "genome", version, about = "Express and mutate reusable project genes")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a gene's expression actions in PATH and record it.
    Express {
        /// Gene name, e.g. `acme/skeleton`.
        gene: String,
        /// Target directory (created if missing).
        path: PathBuf,
    },
    /// Run the mutation actions of every expressed gene.
    Mutate,
    /// List the known genes.
    Genes,
}

fn main() {
    logging::init();
    match run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("{:#}", err);
            std::process::exit(exit_codes::FAILED);
        }
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    let root = std::env::current_dir()?;
    match cli.command {
        Command::Express { gene, path } => cli::express(&root, &gene, &path),
        Command::Mutate => cli::mutate(&root),
        Command::Genes => cli::genes(&root),
    }
}
