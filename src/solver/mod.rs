//! Cycle/chain matching optimization.
//!
//! The solver selects vertex-disjoint cycles and chains from the
//! compatibility graph maximizing a lexicographic objective, and retains
//! the K best distinct matchings:
//!
//! - [`engine::MatchingSolver`]: entry point; checks configuration
//!   feasibility, runs the strategy, shapes the outcome
//! - [`engine::SolverStrategy`]: pluggable solving backend, default
//!   [`engine::BranchAndBound`]
//! - [`search`]: round enumeration and the branch-and-bound core
//! - [`topk::TopKSelector`]: bounded best-K retention with
//!   replace-if-strictly-better semantics
//! - [`objective::ObjectiveVector`]: tuple-ordered multi-criteria value
//!
//! ## Guarantees
//!
//! Every returned matching is vertex-disjoint, respects cycle/chain length
//! limits and the per-round country bound, and contains all required
//! patients (or the solve reports infeasibility). A budget cutoff returns
//! the best incumbents found, flagged not proven optimal; a cancelled solve
//! discards partial results.

pub mod engine;
pub mod objective;
pub mod result;
pub mod search;
pub mod topk;

pub use engine::{BranchAndBound, MatchingSolver, SolverStrategy};
pub use objective::ObjectiveVector;
pub use result::{
    InfeasibilityReason, Matching, Round, RoundKind, ScoredMatching, SolveOutcome, SolveResult,
    TerminationReason, Transplant,
};
pub use topk::TopKSelector;
