//! Command-line interface for kpd-solver.
//!
//! This module implements the CLI using clap. Available commands:
//!
//! - **solve**: Build the compatibility graph for a patient pool and return
//!   the best matchings
//! - **crossmatch**: Resolve the virtual crossmatch for one donor-recipient
//!   combination
//! - **graph**: Build and dump the compatibility graph without solving
//!
//! ## Usage
//!
//! ```text
//! # Solve a pool with the default configuration
//! kpd-solver solve pool.json
//!
//! # Solve with an explicit configuration and nomenclature table
//! kpd-solver solve pool.json --config config.json --nomenclature hla.json
//!
//! # JSON output for scripting
//! kpd-solver solve pool.json --format json
//!
//! # Inspect one virtual crossmatch
//! kpd-solver crossmatch pool.json --donor D1 --recipient R2
//! ```

use std::path::Path;

use anyhow::Context;
use clap::{Parser, Subcommand};

use crate::core::config::Configuration;
use crate::core::patient::PatientPool;
use crate::crossmatch::nomenclature::NomenclatureTable;

pub mod crossmatch;
pub mod graph;
pub mod solve;

#[derive(Parser)]
#[command(name = "kpd-solver")]
#[command(author = "Fulcrum Genomics")]
#[command(version)]
#[command(about = "Compatibility and matching engine for kidney-paired-donation exchange")]
#[command(
    long_about = "kpd-solver scores donor-recipient compatibility in a kidney-paired-donation pool and selects the best disjoint exchange cycles and donation chains.\n\nIt resolves virtual crossmatches from HLA typings and antibody panels, builds a weighted compatibility graph, and optimizes cycle/chain selection under a lexicographic objective, reporting the K best distinct matchings."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Solve a patient pool into ranked matchings
    Solve(solve::SolveArgs),

    /// Resolve the virtual crossmatch for one donor-recipient combination
    Crossmatch(crossmatch::CrossmatchArgs),

    /// Build and dump the compatibility graph without solving
    Graph(graph::GraphArgs),
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

pub(crate) fn load_pool(path: &Path) -> anyhow::Result<PatientPool> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read pool file {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse pool file {}", path.display()))
}

pub(crate) fn load_config(path: Option<&Path>) -> anyhow::Result<Configuration> {
    match path {
        None => Ok(Configuration::default()),
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("Failed to parse config file {}", path.display()))
        }
    }
}

pub(crate) fn load_nomenclature(path: Option<&Path>) -> anyhow::Result<NomenclatureTable> {
    match path {
        None => Ok(NomenclatureTable::default()),
        Some(path) => {
            let text = std::fs::read_to_string(path).with_context(|| {
                format!("Failed to read nomenclature file {}", path.display())
            })?;
            NomenclatureTable::from_json_str(&text).with_context(|| {
                format!("Failed to parse nomenclature file {}", path.display())
            })
        }
    }
}
