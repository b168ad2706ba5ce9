use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::config::Configuration;
use crate::core::patient::{Donor, Recipient};
use crate::core::types::HlaMatchType;
use crate::crossmatch::resolver::CrossmatchSummary;

/// Score contribution of one antigen group (A, B, DR, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupScore {
    pub group: String,
    /// Donor antigens in this group matched by the recipient's own typing
    pub matched_antigens: usize,
    /// Donor antigens in this group with a positive crossmatch verdict
    pub positive_crossmatches: usize,
    pub score: f64,
}

/// Full multi-group compatibility assessment of one donor-recipient pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailedScore {
    pub per_group: Vec<GroupScore>,

    /// Recipient's acceptable blood groups (or ABO default) contain the
    /// donor's group
    pub compatible_blood: bool,

    /// At least one donor antigen drew a positive crossmatch
    pub has_positive_crossmatch: bool,

    pub total_score: f64,
}

impl DetailedScore {
    /// Whether this pair can be transplanted at all under the given
    /// configuration. Nonviable pairs get no edge in the graph.
    #[must_use]
    pub fn is_viable(&self, config: &Configuration) -> bool {
        self.compatible_blood
            && !(self.has_positive_crossmatch && config.positive_crossmatch_forbidden)
    }
}

/// Multi-criteria compatibility scorer.
///
/// Per antigen group, each donor antigen matched in the recipient's own
/// typing contributes points by the specificity of the match (configurable
/// via [`crate::core::config::ScoringWeights`]); antigens with a positive
/// crossmatch contribute nothing. Group scores are summed into the total.
/// Fewer positive crossmatches and more antigen matches always mean a
/// higher score.
pub struct CompatibilityScorer<'a> {
    config: &'a Configuration,
}

impl<'a> CompatibilityScorer<'a> {
    pub fn new(config: &'a Configuration) -> Self {
        Self { config }
    }

    /// Score one donor-recipient combination.
    ///
    /// Returns `None` when the pair cannot be scored because medical data is
    /// missing (empty typing on either side). Missing data is not a zero
    /// score; the pair is excluded from the graph instead.
    #[must_use]
    pub fn score(
        &self,
        donor: &Donor,
        recipient: &Recipient,
        crossmatch_summaries: &[CrossmatchSummary],
    ) -> Option<DetailedScore> {
        if donor.hla_typing.is_empty() || recipient.hla_typing.is_empty() {
            return None;
        }

        let compatible_blood = recipient.accepts_blood_group(donor.blood_group);
        let has_positive_crossmatch = crossmatch_summaries
            .iter()
            .any(|s| s.is_positive_crossmatch);

        let weights = &self.config.scoring_weights;
        let mut groups: BTreeMap<String, GroupScore> = BTreeMap::new();

        for antigen in &donor.hla_typing {
            let group = antigen.code.group();
            let entry = groups.entry(group.clone()).or_insert_with(|| GroupScore {
                group,
                matched_antigens: 0,
                positive_crossmatches: 0,
                score: 0.0,
            });

            let crossmatched = crossmatch_summaries
                .iter()
                .any(|s| s.is_positive_crossmatch && s.hla_code == antigen.code);
            if crossmatched {
                entry.positive_crossmatches += 1;
                continue;
            }

            // Best specificity at which the recipient's typing carries the
            // same antigen.
            let best_match = recipient
                .hla_typing
                .iter()
                .filter_map(|r| antigen.code.match_level(&r.code))
                .max();

            if let Some(level) = best_match {
                entry.matched_antigens += 1;
                entry.score += match level {
                    HlaMatchType::HighRes => weights.high_res_match,
                    HlaMatchType::Split => weights.split_match,
                    HlaMatchType::Broad => weights.broad_match,
                };
            }
        }

        let mut total_score: f64 = groups.values().map(|g| g.score).sum();

        if compatible_blood && self.config.blood_group_bonus > 0.0 {
            total_score += self.config.blood_group_bonus;
        }

        if self.config.use_binary_scoring {
            // Feasibility-only runs: every viable transplant counts the same.
            total_score = 1.0;
        }

        Some(DetailedScore {
            per_group: groups.into_values().collect(),
            compatible_blood,
            has_positive_crossmatch,
            total_score,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::hla::{HlaCode, HlaType};
    use crate::core::types::{BloodGroup, Country, DonorId, DonorType, RecipientId};
    use std::collections::BTreeSet;

    fn antigen(code: HlaCode) -> HlaType {
        HlaType::new(code.display().to_string(), code)
    }

    fn donor(typing: Vec<HlaType>) -> Donor {
        Donor {
            id: DonorId::new("D1"),
            blood_group: BloodGroup::O,
            hla_typing: typing,
            country: Country::new("CZE"),
            donor_type: DonorType::Paired,
        }
    }

    fn recipient(typing: Vec<HlaType>) -> Recipient {
        Recipient {
            id: RecipientId::new("R1"),
            blood_group: BloodGroup::A,
            hla_typing: typing,
            antibodies: Vec::new(),
            acceptable_blood_groups: Vec::new(),
            country: Country::new("CZE"),
        }
    }

    fn negative_summary(code: HlaCode) -> CrossmatchSummary {
        CrossmatchSummary {
            group: code.group(),
            hla_code: code,
            mfi: None,
            is_positive_crossmatch: false,
            issues: BTreeSet::new(),
            antibody_matches: Vec::new(),
            assumed_hla_types: Vec::new(),
        }
    }

    #[test]
    fn test_specificity_weighted_group_scores() {
        let config = Configuration::default();
        let scorer = CompatibilityScorer::new(&config);

        let d = donor(vec![
            antigen(HlaCode::high_res("A1", "A1", "A*01:01")),
            antigen(HlaCode::split("B7", "B7")),
        ]);
        let r = recipient(vec![
            antigen(HlaCode::high_res("A1", "A1", "A*01:01")),
            antigen(HlaCode::split("B7", "B7")),
        ]);

        let score = scorer.score(&d, &r, &[]).unwrap();
        // high-res match 3.0 in group A, split match 2.0 in group B
        assert_eq!(score.per_group.len(), 2);
        assert!((score.total_score - 5.0).abs() < f64::EPSILON);
        assert!(score.compatible_blood);
    }

    #[test]
    fn test_positive_crossmatch_zeroes_antigen_contribution() {
        let config = Configuration::default();
        let scorer = CompatibilityScorer::new(&config);

        let code = HlaCode::high_res("A1", "A1", "A*01:01");
        let d = donor(vec![antigen(code.clone())]);
        let r = recipient(vec![antigen(code.clone())]);

        let mut summary = negative_summary(code);
        summary.is_positive_crossmatch = true;

        let score = scorer.score(&d, &r, &[summary]).unwrap();
        assert!(score.has_positive_crossmatch);
        assert!((score.total_score - 0.0).abs() < f64::EPSILON);
        assert!(!score.is_viable(&config));
    }

    #[test]
    fn test_missing_typing_yields_none_not_zero() {
        let config = Configuration::default();
        let scorer = CompatibilityScorer::new(&config);

        let d = donor(Vec::new());
        let r = recipient(vec![antigen(HlaCode::broad("A1"))]);
        assert!(scorer.score(&d, &r, &[]).is_none());
    }

    #[test]
    fn test_blood_group_bonus_applied_only_when_compatible() {
        let mut config = Configuration::default();
        config.blood_group_bonus = 10.0;
        let scorer = CompatibilityScorer::new(&config);

        let typing = vec![antigen(HlaCode::broad("A1"))];
        let d = donor(typing.clone());
        let r = recipient(typing.clone());

        let score = scorer.score(&d, &r, &[]).unwrap();
        // broad match 1.0 + bonus 10.0
        assert!((score.total_score - 11.0).abs() < f64::EPSILON);

        let mut ab_donor = donor(typing.clone());
        ab_donor.blood_group = BloodGroup::Ab;
        let score = scorer.score(&ab_donor, &r, &[]).unwrap();
        assert!(!score.compatible_blood);
        assert!((score.total_score - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_binary_scoring_collapses_total() {
        let mut config = Configuration::default();
        config.use_binary_scoring = true;
        let scorer = CompatibilityScorer::new(&config);

        let typing = vec![
            antigen(HlaCode::high_res("A1", "A1", "A*01:01")),
            antigen(HlaCode::high_res("B7", "B7", "B*07:02")),
        ];
        let d = donor(typing.clone());
        let r = recipient(typing);

        let score = scorer.score(&d, &r, &[]).unwrap();
        assert!((score.total_score - 1.0).abs() < f64::EPSILON);
    }
}
