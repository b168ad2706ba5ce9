//! # kpd-solver
//!
//! A library for scoring donor-recipient compatibility in kidney-paired-
//! donation pools and selecting the best combination of exchange cycles and
//! donation chains.
//!
//! A pool holds incompatible donor-recipient couples plus non-directed
//! (altruistic) donors. The engine decides, for every donor/recipient
//! combination, whether a transplant is immunologically and logistically
//! viable and at what quality, then optimizes which disjoint cycles and
//! chains to perform.
//!
//! ## Features
//!
//! - **Virtual crossmatch**: Resolves HLA typings against antibody panels at
//!   descending specificity, with ambiguous codes expanded via an injected
//!   nomenclature table
//! - **Multi-criteria scoring**: Per-antigen-group scores combined into a
//!   scalar per edge, with manual overrides and blood-group rules
//! - **Cycle/chain optimization**: Deterministic branch-and-bound over
//!   vertex-disjoint rounds under a lexicographic objective
//! - **Top-K retention**: The K best distinct matchings, not just the optimum
//! - **Conservative diagnostics**: Data-quality findings surface as issues,
//!   never abort the pool
//!
//! ## Example
//!
//! ```rust,no_run
//! use kpd_solver::{Configuration, GraphBuilder, MatchingSolver, NomenclatureTable, PatientPool};
//!
//! let pool = PatientPool::default(); // supplied by the caller
//! let config = Configuration::default();
//! let nomenclature = NomenclatureTable::default();
//!
//! let (graph, issues) = GraphBuilder::new(&pool, &nomenclature, &config).build();
//! let outcome = MatchingSolver::new().solve(&graph, &config);
//!
//! for issue in &issues {
//!     eprintln!("{issue}");
//! }
//! println!("{outcome:?}");
//! ```
//!
//! ## Modules
//!
//! - [`core`]: Patient pool, HLA code model, configuration
//! - [`crossmatch`]: Virtual crossmatch resolution and diagnostics
//! - [`scoring`]: Multi-criteria compatibility scoring
//! - [`graph`]: Compatibility graph construction
//! - [`solver`]: Cycle/chain optimization and top-K selection
//! - [`cli`]: Command-line interface implementation

pub mod cli;
pub mod core;
pub mod crossmatch;
pub mod graph;
pub mod scoring;
pub mod solver;

// Re-export commonly used types for convenience
pub use crate::core::config::{Configuration, ObjectiveKey};
pub use crate::core::hla::{HlaAntibody, HlaCode, HlaType};
pub use crate::core::patient::{Donor, Pair, PatientPool, Recipient};
pub use crate::core::types::{BloodGroup, Country, DonorId, DonorType, RecipientId};
pub use crate::crossmatch::nomenclature::NomenclatureTable;
pub use crate::crossmatch::resolver::{CrossmatchResolver, CrossmatchSummary};
pub use crate::crossmatch::{ParsingIssue, ParsingIssueKind};
pub use crate::graph::{CompatibilityEdge, CompatibilityGraph, GraphBuilder};
pub use crate::scoring::{CompatibilityScorer, DetailedScore};
pub use crate::solver::{
    Matching, MatchingSolver, ScoredMatching, SolveOutcome, SolveResult, TopKSelector,
};
