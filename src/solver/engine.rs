use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use tracing::info;

use crate::core::config::Configuration;
use crate::graph::model::CompatibilityGraph;
use crate::solver::result::{
    InfeasibilityReason, SolveOutcome, SolveResult, TerminationReason,
};
use crate::solver::search::{self, SearchContext, SearchOutcome};

/// A pluggable way of solving the round-selection problem.
///
/// The default is deterministic branch-and-bound, which is exact for the
/// pool sizes national exchange programs run at; an external ILP backend
/// can be slotted in without touching the graph or scorer contracts.
pub trait SolverStrategy {
    fn solve(
        &self,
        graph: &CompatibilityGraph,
        config: &Configuration,
        ctx: &SearchContext,
    ) -> SearchOutcome;
}

/// Exact branch-and-bound: enumerate feasible rounds, then search disjoint
/// subsets with admissible pruning against the top-K worst incumbent.
#[derive(Debug, Default)]
pub struct BranchAndBound;

impl SolverStrategy for BranchAndBound {
    fn solve(
        &self,
        graph: &CompatibilityGraph,
        config: &Configuration,
        ctx: &SearchContext,
    ) -> SearchOutcome {
        let rounds = search::enumerate_rounds(graph, config, &config.objective);
        search::search(graph, &rounds, config, ctx)
    }
}

/// The matching solver: selects disjoint cycle/chain collections maximizing
/// the lexicographic objective, and retains the K best distinct matchings.
pub struct MatchingSolver {
    strategy: Box<dyn SolverStrategy>,
}

impl Default for MatchingSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl MatchingSolver {
    #[must_use]
    pub fn new() -> Self {
        Self {
            strategy: Box::new(BranchAndBound),
        }
    }

    #[must_use]
    pub fn with_strategy(strategy: Box<dyn SolverStrategy>) -> Self {
        Self { strategy }
    }

    /// Solve to completion or budget exhaustion.
    #[must_use]
    pub fn solve(&self, graph: &CompatibilityGraph, config: &Configuration) -> SolveOutcome {
        self.solve_with_cancellation(graph, config, None)
    }

    /// Solve with an optional cancellation flag. Setting the flag terminates
    /// the underlying search promptly; a cancelled solve discards partial
    /// results.
    #[must_use]
    pub fn solve_with_cancellation(
        &self,
        graph: &CompatibilityGraph,
        config: &Configuration,
        stop: Option<Arc<AtomicBool>>,
    ) -> SolveOutcome {
        if config.score_bounds_conflict() {
            return SolveOutcome::Infeasible {
                reason: InfeasibilityReason::ScoreBoundsConflict,
            };
        }
        if graph.is_empty() {
            return SolveOutcome::Infeasible {
                reason: InfeasibilityReason::EmptyGraph,
            };
        }

        let ctx = SearchContext {
            max_nodes: config.search_budget.max_nodes,
            time_limit: config.search_budget.time_limit,
            stop,
        };

        let outcome = self.strategy.solve(graph, config, &ctx);

        if outcome.termination == TerminationReason::Cancelled {
            info!("solve cancelled by caller, discarding partial results");
            return SolveOutcome::Cancelled;
        }

        // Infeasibility may only be claimed after an exhaustive search; an
        // empty selector under a budget cutoff proves nothing.
        if outcome.selector.is_empty() && outcome.termination == TerminationReason::Complete {
            let reason = if config.required_patient_ids.is_empty() {
                InfeasibilityReason::NoFeasibleMatching
            } else {
                InfeasibilityReason::RequiredPatientsUnsatisfiable {
                    missing: self.unreachable_required(graph, config),
                }
            };
            return SolveOutcome::Infeasible { reason };
        }

        let optimal = outcome.termination == TerminationReason::Complete;
        let matchings = outcome.selector.into_sorted();
        info!(
            matchings = matchings.len(),
            optimal,
            nodes = outcome.stats.nodes_expanded,
            "solve finished"
        );

        SolveOutcome::Feasible(SolveResult {
            matchings,
            optimal,
            termination: outcome.termination,
            stats: outcome.stats,
        })
    }

    /// Required recipients no edge can reach; when all are individually
    /// reachable the conflict is joint and the whole set is reported.
    fn unreachable_required(
        &self,
        graph: &CompatibilityGraph,
        config: &Configuration,
    ) -> Vec<crate::core::types::RecipientId> {
        let unreachable: Vec<_> = config
            .required_patient_ids
            .iter()
            .filter(|id| !graph.edges.iter().any(|e| &e.recipient_id == *id))
            .cloned()
            .collect();
        if unreachable.is_empty() {
            config.required_patient_ids.iter().cloned().collect()
        } else {
            unreachable
        }
    }
}
