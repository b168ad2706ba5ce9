use serde::{Deserialize, Serialize};

use crate::core::config::ObjectiveKey;
use crate::graph::model::CompatibilityEdge;

/// Lexicographic objective value of a (partial) matching.
///
/// One component per configured [`ObjectiveKey`], most important first.
/// Comparison is strict tuple ordering over the components, never a blended
/// scalar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectiveVector(pub Vec<f64>);

impl ObjectiveVector {
    #[must_use]
    pub fn zeros(len: usize) -> Self {
        Self(vec![0.0; len])
    }

    /// Contribution of a single edge to each configured key.
    #[must_use]
    pub fn of_edge(edge: &CompatibilityEdge, keys: &[ObjectiveKey]) -> Self {
        Self(
            keys.iter()
                .map(|key| match key {
                    ObjectiveKey::TransplantCount => 1.0,
                    ObjectiveKey::TotalScore => edge.score,
                    ObjectiveKey::BloodCompatibleCount => {
                        if edge.abo_identical {
                            1.0
                        } else {
                            0.0
                        }
                    }
                })
                .collect(),
        )
    }

    /// Elementwise sum of edge contributions.
    #[must_use]
    pub fn of_edges<'a>(
        edges: impl IntoIterator<Item = &'a CompatibilityEdge>,
        keys: &[ObjectiveKey],
    ) -> Self {
        let mut total = Self::zeros(keys.len());
        for edge in edges {
            total.add(&Self::of_edge(edge, keys));
        }
        total
    }

    pub fn add(&mut self, other: &ObjectiveVector) {
        debug_assert_eq!(self.0.len(), other.0.len());
        for (a, b) in self.0.iter_mut().zip(&other.0) {
            *a += b;
        }
    }

    #[must_use]
    pub fn plus(&self, other: &ObjectiveVector) -> Self {
        let mut out = self.clone();
        out.add(other);
        out
    }
}

impl Eq for ObjectiveVector {}

impl PartialOrd for ObjectiveVector {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ObjectiveVector {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        for (a, b) in self.0.iter().zip(&other.0) {
            let ord = a.total_cmp(b);
            if ord != std::cmp::Ordering::Equal {
                return ord;
            }
        }
        self.0.len().cmp(&other.0.len())
    }
}

impl std::fmt::Display for ObjectiveVector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(")?;
        for (i, v) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{v:.2}")?;
        }
        write!(f, ")")
    }
}
