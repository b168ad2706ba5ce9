use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use tracing::debug;

use crate::core::config::{Configuration, ObjectiveKey};
use crate::core::types::RecipientId;
use crate::graph::model::CompatibilityGraph;
use crate::solver::objective::ObjectiveVector;
use crate::solver::result::{
    Matching, Round, RoundKind, SearchStats, TerminationReason, Transplant,
};
use crate::solver::topk::TopKSelector;

/// One feasible cycle or chain, the unit the search selects from
#[derive(Debug, Clone)]
pub struct CandidateRound {
    pub kind: RoundKind,
    /// Edge indices into the graph, in execution order
    pub edges: Vec<usize>,
    /// Pair vertices this round occupies (including a chain's source)
    pub vertices: Vec<usize>,
    /// Contribution to each configured objective key
    pub contribution: ObjectiveVector,
    /// Recipients transplanted by this round
    pub recipients: Vec<RecipientId>,
}

/// Enumerate every cycle (2..=max_cycle_length) and chain
/// (1..=max_chain_length) that respects the per-round country-diversity
/// bound. Rounds come out in a deterministic order: contribution
/// descending, edge list ascending.
#[must_use]
pub fn enumerate_rounds(
    graph: &CompatibilityGraph,
    config: &Configuration,
    keys: &[ObjectiveKey],
) -> Vec<CandidateRound> {
    let adjacency = graph.adjacency();
    let mut rounds = Vec::new();

    enumerate_cycles(graph, config, keys, &adjacency, &mut rounds);
    enumerate_chains(graph, config, keys, &adjacency, &mut rounds);

    rounds.sort_by(|a, b| {
        b.contribution
            .cmp(&a.contribution)
            .then_with(|| a.edges.cmp(&b.edges))
    });

    debug!(candidate_rounds = rounds.len(), "round enumeration finished");
    rounds
}

fn enumerate_cycles(
    graph: &CompatibilityGraph,
    config: &Configuration,
    keys: &[ObjectiveKey],
    adjacency: &[Vec<usize>],
    out: &mut Vec<CandidateRound>,
) {
    if config.max_cycle_length < 2 {
        return;
    }

    // Canonical form: the cycle starts at its lowest vertex index, so each
    // cycle is emitted exactly once.
    for start in 0..graph.pairs.len() {
        let mut path_edges = Vec::new();
        let mut on_path = vec![false; graph.pairs.len()];
        on_path[start] = true;
        extend_cycle(
            graph, config, keys, adjacency, start, start, &mut path_edges, &mut on_path, out,
        );
    }
}

#[allow(clippy::too_many_arguments)]
fn extend_cycle(
    graph: &CompatibilityGraph,
    config: &Configuration,
    keys: &[ObjectiveKey],
    adjacency: &[Vec<usize>],
    start: usize,
    current: usize,
    path_edges: &mut Vec<usize>,
    on_path: &mut Vec<bool>,
    out: &mut Vec<CandidateRound>,
) {
    for &edge_idx in &adjacency[current] {
        let edge = &graph.edges[edge_idx];
        let next = edge.to_pair;

        if next == start && !path_edges.is_empty() {
            path_edges.push(edge_idx);
            record_round(graph, config, keys, RoundKind::Cycle, path_edges, out);
            path_edges.pop();
            continue;
        }

        if next > start && !on_path[next] && path_edges.len() + 1 < config.max_cycle_length {
            path_edges.push(edge_idx);
            on_path[next] = true;
            extend_cycle(
                graph, config, keys, adjacency, start, next, path_edges, on_path, out,
            );
            on_path[next] = false;
            path_edges.pop();
        }
    }
}

fn enumerate_chains(
    graph: &CompatibilityGraph,
    config: &Configuration,
    keys: &[ObjectiveKey],
    adjacency: &[Vec<usize>],
    out: &mut Vec<CandidateRound>,
) {
    if config.max_chain_length == 0 {
        return;
    }

    for start in 0..graph.pairs.len() {
        if !graph.pairs[start].donor_type.starts_chains() {
            continue;
        }
        let mut path_edges = Vec::new();
        let mut on_path = vec![false; graph.pairs.len()];
        on_path[start] = true;
        extend_chain(
            graph, config, keys, adjacency, start, &mut path_edges, &mut on_path, out,
        );
    }
}

#[allow(clippy::too_many_arguments)]
fn extend_chain(
    graph: &CompatibilityGraph,
    config: &Configuration,
    keys: &[ObjectiveKey],
    adjacency: &[Vec<usize>],
    current: usize,
    path_edges: &mut Vec<usize>,
    on_path: &mut Vec<bool>,
    out: &mut Vec<CandidateRound>,
) {
    for &edge_idx in &adjacency[current] {
        let edge = &graph.edges[edge_idx];
        let next = edge.to_pair;
        if on_path[next] {
            continue;
        }

        path_edges.push(edge_idx);
        on_path[next] = true;

        // Every prefix ending open at the last recipient's paired donor is
        // itself a feasible chain.
        record_round(graph, config, keys, RoundKind::Chain, path_edges, out);

        if path_edges.len() < config.max_chain_length {
            extend_chain(
                graph, config, keys, adjacency, next, path_edges, on_path, out,
            );
        }

        on_path[next] = false;
        path_edges.pop();
    }
}

fn record_round(
    graph: &CompatibilityGraph,
    config: &Configuration,
    keys: &[ObjectiveKey],
    kind: RoundKind,
    path_edges: &[usize],
    out: &mut Vec<CandidateRound>,
) {
    let mut vertices = Vec::with_capacity(path_edges.len() + 1);
    let mut countries = std::collections::BTreeSet::new();
    let mut recipients = Vec::with_capacity(path_edges.len());

    vertices.push(graph.edges[path_edges[0]].from_pair);
    for &edge_idx in path_edges {
        let edge = &graph.edges[edge_idx];
        if !vertices.contains(&edge.to_pair) {
            vertices.push(edge.to_pair);
        }
        recipients.push(edge.recipient_id.clone());
    }

    for &v in &vertices {
        let pair = &graph.pairs[v];
        countries.insert(&pair.donor_country);
        if let Some(c) = &pair.recipient_country {
            countries.insert(c);
        }
    }
    if countries.len() > config.max_distinct_countries_per_round {
        return;
    }

    let contribution =
        ObjectiveVector::of_edges(path_edges.iter().map(|&i| &graph.edges[i]), keys);

    out.push(CandidateRound {
        kind,
        edges: path_edges.to_vec(),
        vertices,
        contribution,
        recipients,
    });
}

/// Effort limits and cancellation for one search
#[derive(Debug, Clone, Default)]
pub struct SearchContext {
    pub max_nodes: u64,
    pub time_limit: Option<std::time::Duration>,
    /// Set by the caller to terminate the search promptly
    pub stop: Option<Arc<AtomicBool>>,
}

/// Result of the branch-and-bound search itself
pub struct SearchOutcome {
    pub selector: TopKSelector,
    pub termination: TerminationReason,
    pub stats: SearchStats,
}

/// Branch-and-bound over vertex-disjoint subsets of candidate rounds.
///
/// Every visited selection is an incumbent offered to the top-K selector;
/// pruning compares an admissible elementwise upper bound (current value
/// plus unconstrained suffix sum) against the selector's current worst.
pub fn search(
    graph: &CompatibilityGraph,
    rounds: &[CandidateRound],
    config: &Configuration,
    ctx: &SearchContext,
) -> SearchOutcome {
    // Suffix sums of contributions: an upper bound on what rounds[i..] can
    // still add, ignoring disjointness. Admissible because contributions
    // are non-negative.
    let key_count = config.objective.len();
    let mut suffix = vec![ObjectiveVector::zeros(key_count); rounds.len() + 1];
    for i in (0..rounds.len()).rev() {
        suffix[i] = suffix[i + 1].plus(&rounds[i].contribution);
    }

    let mut state = SearchState {
        graph,
        rounds,
        config,
        ctx,
        suffix,
        selector: TopKSelector::new(config.max_matchings_to_report),
        used: vec![false; graph.pairs.len()],
        chosen: Vec::new(),
        stats: SearchStats {
            candidate_rounds: rounds.len(),
            ..SearchStats::default()
        },
        started: Instant::now(),
        termination: TerminationReason::Complete,
    };

    state.dfs(0, &ObjectiveVector::zeros(key_count));

    SearchOutcome {
        selector: state.selector,
        termination: state.termination,
        stats: state.stats,
    }
}

struct SearchState<'a> {
    graph: &'a CompatibilityGraph,
    rounds: &'a [CandidateRound],
    config: &'a Configuration,
    ctx: &'a SearchContext,
    suffix: Vec<ObjectiveVector>,
    selector: TopKSelector,
    used: Vec<bool>,
    chosen: Vec<usize>,
    stats: SearchStats,
    started: Instant,
    termination: TerminationReason,
}

impl SearchState<'_> {
    /// Returns false when the search must stop.
    fn dfs(&mut self, from: usize, current: &ObjectiveVector) -> bool {
        self.stats.nodes_expanded += 1;
        if !self.check_budget() {
            return false;
        }

        self.record_incumbent(current);

        for i in from..self.rounds.len() {
            // Rounds are sorted by contribution descending, so once the
            // optimistic bound falls below the retained worst, no later
            // sibling can improve the selection either.
            if let Some(worst) = self.selector.pruning_bound() {
                if current.plus(&self.suffix[i]) <= *worst {
                    break;
                }
            }

            if self.conflicts(i) {
                continue;
            }

            for &v in &self.rounds[i].vertices {
                self.used[v] = true;
            }
            self.chosen.push(i);
            let extended = current.plus(&self.rounds[i].contribution);
            let keep_going = self.dfs(i + 1, &extended);
            self.chosen.pop();
            for &v in &self.rounds[i].vertices {
                self.used[v] = false;
            }

            if !keep_going {
                return false;
            }
        }
        true
    }

    fn conflicts(&self, round_idx: usize) -> bool {
        self.rounds[round_idx].vertices.iter().any(|&v| self.used[v])
    }

    fn record_incumbent(&mut self, current: &ObjectiveVector) {
        if self.chosen.is_empty() {
            return;
        }

        // Cheap reject before materializing the matching.
        if let Some(worst) = self.selector.pruning_bound() {
            if current <= worst {
                return;
            }
        }

        if !self.config.required_patient_ids.is_empty() {
            let covered: std::collections::BTreeSet<&RecipientId> = self
                .chosen
                .iter()
                .flat_map(|&i| self.rounds[i].recipients.iter())
                .collect();
            if !self
                .config
                .required_patient_ids
                .iter()
                .all(|id| covered.contains(id))
            {
                return;
            }
        }

        let matching = self.materialize();
        self.stats.incumbents_recorded += 1;
        self.selector.offer(matching, current.clone());
    }

    fn materialize(&self) -> Matching {
        let rounds = self
            .chosen
            .iter()
            .map(|&i| {
                let round = &self.rounds[i];
                Round {
                    kind: round.kind,
                    transplants: round
                        .edges
                        .iter()
                        .map(|&e| {
                            let edge = &self.graph.edges[e];
                            Transplant {
                                donor_id: edge.donor_id.clone(),
                                recipient_id: edge.recipient_id.clone(),
                                score: edge.score,
                            }
                        })
                        .collect(),
                }
            })
            .collect();
        Matching { rounds }
    }

    fn check_budget(&mut self) -> bool {
        if let Some(stop) = &self.ctx.stop {
            if stop.load(Ordering::Relaxed) {
                self.termination = TerminationReason::Cancelled;
                return false;
            }
        }
        if self.ctx.max_nodes > 0 && self.stats.nodes_expanded > self.ctx.max_nodes {
            self.termination = TerminationReason::NodeLimit;
            return false;
        }
        // Clock reads are amortized over many nodes.
        if self.stats.nodes_expanded % 1024 == 0 {
            if let Some(limit) = self.ctx.time_limit {
                if self.started.elapsed() > limit {
                    self.termination = TerminationReason::TimeLimit;
                    return false;
                }
            }
        }
        true
    }
}
