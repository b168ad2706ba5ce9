use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashSet};

use crate::core::types::{DonorId, RecipientId};
use crate::solver::objective::ObjectiveVector;
use crate::solver::result::{Matching, ScoredMatching};

#[derive(Debug, Clone)]
struct Entry {
    objective: ObjectiveVector,
    signature: Vec<(DonorId, RecipientId)>,
    matching: Matching,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.objective == other.objective && self.signature == other.signature
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // Objective first; signature keeps the order total and deterministic
        self.objective
            .cmp(&other.objective)
            .then_with(|| self.signature.cmp(&other.signature))
    }
}

/// Bounded best-K retention of distinct matchings.
///
/// A fixed-capacity min-heap keyed by objective: while below capacity every
/// distinct candidate is kept; at capacity a candidate replaces the current
/// worst entry only when strictly better. The final set is therefore the K
/// highest-scoring distinct matchings seen, independent of insertion order.
#[derive(Debug)]
pub struct TopKSelector {
    capacity: usize,
    heap: BinaryHeap<Reverse<Entry>>,
    seen: HashSet<Vec<(DonorId, RecipientId)>>,
}

impl TopKSelector {
    /// Capacity zero is clamped to one; a selector that can hold nothing is
    /// never useful.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            heap: BinaryHeap::new(),
            seen: HashSet::new(),
        }
    }

    /// Offer a candidate. Returns true when it was retained.
    pub fn offer(&mut self, matching: Matching, objective: ObjectiveVector) -> bool {
        let signature = matching.signature();
        if self.seen.contains(&signature) {
            return false;
        }

        let entry = Entry {
            objective,
            signature,
            matching,
        };

        if self.heap.len() < self.capacity {
            self.seen.insert(entry.signature.clone());
            self.heap.push(Reverse(entry));
            return true;
        }

        // Full: replace the worst-ranked entry only if strictly better
        let worst = self.heap.peek().expect("heap non-empty at capacity");
        if entry.objective <= worst.0.objective {
            return false;
        }

        let evicted = self.heap.pop().expect("heap non-empty at capacity");
        self.seen.remove(&evicted.0.signature);
        self.seen.insert(entry.signature.clone());
        self.heap.push(Reverse(entry));
        true
    }

    /// Objective of the current worst retained matching, when at capacity.
    /// Candidates bounded by this value cannot change the selection.
    #[must_use]
    pub fn pruning_bound(&self) -> Option<&ObjectiveVector> {
        if self.heap.len() < self.capacity {
            None
        } else {
            self.heap.peek().map(|e| &e.0.objective)
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Drain into the final collection, best first.
    #[must_use]
    pub fn into_sorted(self) -> Vec<ScoredMatching> {
        let mut entries: Vec<Entry> = self.heap.into_iter().map(|e| e.0).collect();
        entries.sort_by(|a, b| b.cmp(a));
        entries
            .into_iter()
            .map(|e| ScoredMatching {
                matching: e.matching,
                objective: e.objective,
            })
            .collect()
    }
}
