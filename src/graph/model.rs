use serde::{Deserialize, Serialize};

use crate::core::types::{Country, DonorId, DonorType, RecipientId};
use crate::scoring::DetailedScore;

/// One original donor-recipient couple (or lone non-directed/bridging
/// donor), the vertex unit of the compatibility graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairVertex {
    pub donor_id: DonorId,
    /// Absent for non-directed and bridging donors
    pub recipient_id: Option<RecipientId>,
    pub donor_type: DonorType,
    pub donor_country: Country,
    pub recipient_country: Option<Country>,
}

/// A viable directed transplant: the donor of one couple gives to the
/// recipient of another.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompatibilityEdge {
    /// Index of the donor's pair vertex
    pub from_pair: usize,
    /// Index of the recipient's pair vertex
    pub to_pair: usize,
    pub donor_id: DonorId,
    pub recipient_id: RecipientId,
    /// Final transplant score (computed, or a manual override)
    pub score: f64,
    /// Donor and recipient share the same ABO group
    pub abo_identical: bool,
    /// Full scoring breakdown; absent when a manual override replaced the
    /// computed score (audit trail only, no recomputation)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detailed_score: Option<DetailedScore>,
    pub manual_override: bool,
}

/// Weighted directed compatibility graph for one solve invocation.
///
/// Edges are stored in stable (donor id, recipient id) order so downstream
/// solver tie-breaks are reproducible. The graph owns edge lifetime for one
/// solve; matchings returned to the caller copy what they need.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompatibilityGraph {
    pub pairs: Vec<PairVertex>,
    pub edges: Vec<CompatibilityEdge>,
}

impl CompatibilityGraph {
    /// Outgoing edge indices per pair vertex, in stored (stable) order.
    #[must_use]
    pub fn adjacency(&self) -> Vec<Vec<usize>> {
        let mut adj = vec![Vec::new(); self.pairs.len()];
        for (idx, edge) in self.edges.iter().enumerate() {
            adj[edge.from_pair].push(idx);
        }
        adj
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}
