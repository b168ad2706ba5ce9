use std::collections::{BTreeSet, HashMap};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::types::{Country, DonorId, RecipientId};

/// One lexicographic priority of the solver objective.
///
/// Candidate matchings are compared by the first configured key, ties broken
/// by the next, and so on. `TotalScore` is typically the final tie-breaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectiveKey {
    /// Number of transplants performed
    TransplantCount,
    /// Sum of all transplant compatibility scores
    TotalScore,
    /// Number of transplants with ABO-identical donor and recipient
    BloodCompatibleCount,
}

/// Per-specificity points awarded for each donor antigen matched in the
/// recipient's own typing. The summed group scores form the transplant score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringWeights {
    pub high_res_match: f64,
    pub split_match: f64,
    pub broad_match: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            high_res_match: 3.0,
            split_match: 2.0,
            broad_match: 1.0,
        }
    }
}

/// Search effort limits for one solve invocation. On exhaustion the solver
/// returns the best incumbents found so far, flagged as not proven optimal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchBudget {
    /// Maximum number of branch-and-bound nodes to expand
    pub max_nodes: u64,
    /// Wall-clock limit for the search
    #[serde(default, skip_serializing_if = "Option::is_none", with = "opt_secs")]
    pub time_limit: Option<Duration>,
}

impl Default for SearchBudget {
    fn default() -> Self {
        Self {
            max_nodes: 5_000_000,
            time_limit: Some(Duration::from_secs(60)),
        }
    }
}

mod opt_secs {
    use super::Duration;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Option<Duration>, s: S) -> Result<S::Ok, S::Error> {
        match d {
            Some(d) => s.serialize_some(&d.as_secs_f64()),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Duration>, D::Error> {
        Ok(Option::<f64>::deserialize(d)?.map(Duration::from_secs_f64))
    }
}

/// Everything the caller can tune about one solve invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    /// Lexicographic objective priorities, most important first
    pub objective: Vec<ObjectiveKey>,

    /// Longest allowed exchange cycle (pairs per cycle)
    pub max_cycle_length: usize,

    /// Longest allowed donation chain (transplants per chain)
    pub max_chain_length: usize,

    /// Transplants scoring below this are excluded before search
    pub min_transplant_score: Option<f64>,

    /// Transplants scoring above this are excluded before search
    pub max_transplant_score: Option<f64>,

    /// Added to a transplant score when donor and recipient bloods are
    /// compatible
    pub blood_group_bonus: f64,

    /// Collapse every viable transplant score to 1.0 (feasibility-only runs)
    pub use_binary_scoring: bool,

    /// A positive crossmatch is an absolute contraindication
    pub positive_crossmatch_forbidden: bool,

    /// Bound on distinct countries inside a single cycle or chain
    pub max_distinct_countries_per_round: usize,

    /// Recipients that must appear in any returned matching
    pub required_patient_ids: BTreeSet<RecipientId>,

    /// Donor-country -> recipient-country combinations that may never
    /// exchange organs
    pub forbidden_country_pairs: BTreeSet<(Country, Country)>,

    /// Clinician-entered scores replacing the computed score for a specific
    /// transplant; a negative value forbids the transplant outright
    pub manual_score_overrides: Vec<ScoreOverride>,

    /// How many best matchings to retain and report (the K of top-K)
    pub max_matchings_to_report: usize,

    pub scoring_weights: ScoringWeights,

    pub search_budget: SearchBudget,
}

/// A clinician-entered score for one (donor, recipient) combination
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreOverride {
    pub donor_id: DonorId,
    pub recipient_id: RecipientId,
    pub score: f64,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            objective: vec![ObjectiveKey::TransplantCount, ObjectiveKey::TotalScore],
            max_cycle_length: 4,
            max_chain_length: 6,
            min_transplant_score: None,
            max_transplant_score: None,
            blood_group_bonus: 0.0,
            use_binary_scoring: false,
            positive_crossmatch_forbidden: true,
            max_distinct_countries_per_round: usize::MAX,
            required_patient_ids: BTreeSet::new(),
            forbidden_country_pairs: BTreeSet::new(),
            manual_score_overrides: Vec::new(),
            max_matchings_to_report: 10,
            scoring_weights: ScoringWeights::default(),
            search_budget: SearchBudget::default(),
        }
    }
}

impl Configuration {
    /// Manual overrides as a lookup map.
    #[must_use]
    pub fn override_index(&self) -> HashMap<(&DonorId, &RecipientId), f64> {
        self.manual_score_overrides
            .iter()
            .map(|o| ((&o.donor_id, &o.recipient_id), o.score))
            .collect()
    }

    /// Contradictory bounds make every transplant infeasible; callers should
    /// reject such configurations up front.
    #[must_use]
    pub fn score_bounds_conflict(&self) -> bool {
        match (self.min_transplant_score, self.max_transplant_score) {
            (Some(min), Some(max)) => min > max,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_objective_is_count_then_score() {
        let config = Configuration::default();
        assert_eq!(
            config.objective,
            vec![ObjectiveKey::TransplantCount, ObjectiveKey::TotalScore]
        );
    }

    #[test]
    fn test_score_bounds_conflict() {
        let mut config = Configuration::default();
        assert!(!config.score_bounds_conflict());

        config.min_transplant_score = Some(10.0);
        config.max_transplant_score = Some(5.0);
        assert!(config.score_bounds_conflict());

        config.max_transplant_score = Some(20.0);
        assert!(!config.score_bounds_conflict());
    }

    #[test]
    fn test_config_json_round_trip() {
        let config = Configuration::default();
        let json = serde_json::to_string(&config).unwrap();
        let back: Configuration = serde_json::from_str(&json).unwrap();
        assert_eq!(back.max_cycle_length, 4);
        assert_eq!(back.max_matchings_to_report, 10);
    }
}
