use serde::{Deserialize, Serialize};

use crate::core::types::{DonorId, RecipientId};
use crate::solver::objective::ObjectiveVector;

/// One performed transplant inside a round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transplant {
    pub donor_id: DonorId,
    pub recipient_id: RecipientId,
    pub score: f64,
}

/// Structural shape of a round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundKind {
    /// Closed loop of exchanges among incompatible pairs
    Cycle,
    /// Sequence opened by a non-directed or bridging donor, ending open at
    /// the last recipient's paired donor (the next bridge donor)
    Chain,
}

/// One cycle or chain of transplants performed together
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Round {
    pub kind: RoundKind,
    /// Transplants in execution order
    pub transplants: Vec<Transplant>,
}

impl Round {
    /// Number of transplants in this round.
    #[must_use]
    pub fn len(&self) -> usize {
        self.transplants.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.transplants.is_empty()
    }
}

/// An immutable matching: a set of disjoint rounds selected by the solver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matching {
    pub rounds: Vec<Round>,
}

impl Matching {
    #[must_use]
    pub fn transplant_count(&self) -> usize {
        self.rounds.iter().map(Round::len).sum()
    }

    #[must_use]
    pub fn total_score(&self) -> f64 {
        self.rounds
            .iter()
            .flat_map(|r| &r.transplants)
            .map(|t| t.score)
            .sum()
    }

    /// Canonical identity of this matching: its sorted transplant set.
    /// Two matchings with the same transplants are the same matching.
    #[must_use]
    pub fn signature(&self) -> Vec<(DonorId, RecipientId)> {
        let mut sig: Vec<(DonorId, RecipientId)> = self
            .rounds
            .iter()
            .flat_map(|r| &r.transplants)
            .map(|t| (t.donor_id.clone(), t.recipient_id.clone()))
            .collect();
        sig.sort();
        sig
    }

    /// Every recipient receiving a kidney in this matching.
    #[must_use]
    pub fn recipient_ids(&self) -> Vec<&RecipientId> {
        self.rounds
            .iter()
            .flat_map(|r| &r.transplants)
            .map(|t| &t.recipient_id)
            .collect()
    }
}

/// A matching together with its lexicographic objective value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredMatching {
    pub matching: Matching,
    pub objective: ObjectiveVector,
}

/// Why a solve produced no matching
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum InfeasibilityReason {
    /// No viable edge exists between any two pairs
    EmptyGraph,
    /// Edges exist but no cycle or chain can be formed within the limits
    NoFeasibleMatching,
    /// The required patients cannot all be matched together
    RequiredPatientsUnsatisfiable { missing: Vec<RecipientId> },
    /// `min_transplant_score` exceeds `max_transplant_score`
    ScoreBoundsConflict,
}

impl std::fmt::Display for InfeasibilityReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyGraph => write!(f, "compatibility graph has no viable edges"),
            Self::NoFeasibleMatching => {
                write!(f, "no cycle or chain is feasible within the configured limits")
            }
            Self::RequiredPatientsUnsatisfiable { missing } => {
                write!(f, "required patients cannot be jointly matched: ")?;
                for (i, id) in missing.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{id}")?;
                }
                Ok(())
            }
            Self::ScoreBoundsConflict => {
                write!(f, "min_transplant_score exceeds max_transplant_score")
            }
        }
    }
}

/// Why the search stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationReason {
    /// The search space was exhausted; the result is proven optimal
    Complete,
    /// Node budget ran out
    NodeLimit,
    /// Wall-clock budget ran out
    TimeLimit,
    /// The caller cancelled the solve
    Cancelled,
}

/// Search effort counters for one solve invocation
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SearchStats {
    pub nodes_expanded: u64,
    pub candidate_rounds: usize,
    pub incumbents_recorded: u64,
}

/// Result of a completed (or cut-off) solve
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolveResult {
    /// The K best distinct matchings found, best first
    pub matchings: Vec<ScoredMatching>,
    /// False when a budget cutoff means better matchings may exist
    pub optimal: bool,
    pub termination: TerminationReason,
    pub stats: SearchStats,
}

/// Outcome of one solve invocation.
///
/// When an exhaustive search finds nothing to match the outcome is
/// [`SolveOutcome::Infeasible`] with a structured reason. A budget cutoff is
/// never an infeasibility claim: it yields a [`SolveOutcome::Feasible`]
/// result with `optimal: false`, possibly with no matchings recorded yet.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum SolveOutcome {
    Feasible(SolveResult),
    Infeasible { reason: InfeasibilityReason },
    /// The solve was cancelled; partial results are discarded, never
    /// surfaced as final
    Cancelled,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transplant(d: &str, r: &str, score: f64) -> Transplant {
        Transplant {
            donor_id: DonorId::new(d),
            recipient_id: RecipientId::new(r),
            score,
        }
    }

    #[test]
    fn test_matching_aggregates() {
        let matching = Matching {
            rounds: vec![
                Round {
                    kind: RoundKind::Cycle,
                    transplants: vec![transplant("D1", "R2", 5.0), transplant("D2", "R1", 3.0)],
                },
                Round {
                    kind: RoundKind::Chain,
                    transplants: vec![transplant("D3", "R4", 2.0)],
                },
            ],
        };

        assert_eq!(matching.transplant_count(), 3);
        assert!((matching.total_score() - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_signature_is_order_independent() {
        let a = Matching {
            rounds: vec![Round {
                kind: RoundKind::Cycle,
                transplants: vec![transplant("D1", "R2", 5.0), transplant("D2", "R1", 3.0)],
            }],
        };
        let b = Matching {
            rounds: vec![Round {
                kind: RoundKind::Cycle,
                transplants: vec![transplant("D2", "R1", 3.0), transplant("D1", "R2", 5.0)],
            }],
        };
        assert_eq!(a.signature(), b.signature());
    }
}
