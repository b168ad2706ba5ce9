use rayon::prelude::*;
use tracing::{debug, info};

use crate::core::config::Configuration;
use crate::core::patient::PatientPool;
use crate::crossmatch::issues::{ParsingIssue, ParsingIssueKind};
use crate::crossmatch::nomenclature::NomenclatureTable;
use crate::crossmatch::resolver::CrossmatchResolver;
use crate::graph::model::{CompatibilityEdge, CompatibilityGraph, PairVertex};
use crate::scoring::CompatibilityScorer;

/// Builds the weighted compatibility graph for one solve invocation.
///
/// Pairwise crossmatch resolution and scoring are embarrassingly parallel
/// and run under rayon; the final graph assembly is single-writer.
pub struct GraphBuilder<'a> {
    pool: &'a PatientPool,
    nomenclature: &'a NomenclatureTable,
    config: &'a Configuration,
}

impl<'a> GraphBuilder<'a> {
    pub fn new(
        pool: &'a PatientPool,
        nomenclature: &'a NomenclatureTable,
        config: &'a Configuration,
    ) -> Self {
        Self {
            pool,
            nomenclature,
            config,
        }
    }

    /// Construct the graph, dropping (and reporting) invalid pairs and
    /// nonviable combinations. An error in one pair never aborts the rest
    /// of the pool.
    pub fn build(&self) -> (CompatibilityGraph, Vec<ParsingIssue>) {
        let mut issues = Vec::new();
        let pairs = self.validate_pairs(&mut issues);

        let donors = self.pool.donor_index();
        let recipients = self.pool.recipient_index();
        let overrides = self.config.override_index();

        // Every (donor of pair i, recipient of pair j) combination across
        // different original couples.
        let combos: Vec<(usize, usize)> = (0..pairs.len())
            .flat_map(|i| {
                (0..pairs.len())
                    .filter(move |&j| i != j)
                    .map(move |j| (i, j))
            })
            .filter(|&(_, j)| pairs[j].recipient_id.is_some())
            .collect();

        let scored: Vec<(CompatibilityEdge, Vec<ParsingIssue>)> = combos
            .par_iter()
            .filter_map(|&(i, j)| {
                let donor_vertex = &pairs[i];
                let recipient_vertex = &pairs[j];
                let donor = donors.get(&donor_vertex.donor_id)?;
                let recipient_id = recipient_vertex.recipient_id.as_ref()?;
                let recipient = recipients.get(recipient_id)?;

                if self.config.forbidden_country_pairs.contains(&(
                    donor.country.clone(),
                    recipient.country.clone(),
                )) {
                    return None;
                }

                let mut combo_issues = Vec::new();
                let (score, detailed, manual_override) =
                    if let Some(&value) = overrides.get(&(&donor.id, &recipient.id)) {
                        // A clinician decision replaces computation entirely;
                        // a negative override forbids the transplant.
                        if value < 0.0 {
                            return None;
                        }
                        (value, None, true)
                    } else {
                        let resolver = CrossmatchResolver::new(self.nomenclature);
                        let (summaries, crossmatch_issues) =
                            resolver.resolve(&donor.hla_typing, &recipient.antibodies);
                        combo_issues = crossmatch_issues;

                        let scorer = CompatibilityScorer::new(self.config);
                        let detailed = scorer.score(donor, recipient, &summaries)?;
                        if !detailed.is_viable(self.config) {
                            return None;
                        }
                        (detailed.total_score, Some(detailed), false)
                    };

                if self
                    .config
                    .min_transplant_score
                    .is_some_and(|min| score < min)
                    || self
                        .config
                        .max_transplant_score
                        .is_some_and(|max| score > max)
                {
                    return None;
                }

                Some((
                    CompatibilityEdge {
                        from_pair: i,
                        to_pair: j,
                        donor_id: donor.id.clone(),
                        recipient_id: recipient.id.clone(),
                        score,
                        abo_identical: donor.blood_group == recipient.blood_group,
                        detailed_score: detailed,
                        manual_override,
                    },
                    combo_issues,
                ))
            })
            .collect();

        // Single-writer assembly in stable (donor, recipient) order.
        let mut edges = Vec::with_capacity(scored.len());
        for (edge, combo_issues) in scored {
            issues.extend(combo_issues);
            edges.push(edge);
        }
        edges.sort_by(|a, b| {
            (&a.donor_id, &a.recipient_id).cmp(&(&b.donor_id, &b.recipient_id))
        });

        info!(
            pairs = pairs.len(),
            edges = edges.len(),
            issues = issues.len(),
            "compatibility graph built"
        );

        (CompatibilityGraph { pairs, edges }, issues)
    }

    /// Keep only pairs whose ids resolve against the pool, reporting the
    /// rest.
    fn validate_pairs(&self, issues: &mut Vec<ParsingIssue>) -> Vec<PairVertex> {
        let donors = self.pool.donor_index();
        let recipients = self.pool.recipient_index();

        let mut vertices = Vec::new();
        for pair in &self.pool.pairs {
            let Some(donor) = donors.get(&pair.donor_id) else {
                issues.push(ParsingIssue::new(
                    ParsingIssueKind::InvalidPairReference,
                    pair.donor_id.to_string(),
                    format!("pair references unknown donor {}, pair excluded", pair.donor_id),
                ));
                continue;
            };

            let recipient_country = match &pair.recipient_id {
                Some(rid) => match recipients.get(rid) {
                    Some(r) => Some(r.country.clone()),
                    None => {
                        issues.push(ParsingIssue::new(
                            ParsingIssueKind::InvalidPairReference,
                            rid.to_string(),
                            format!("pair references unknown recipient {rid}, pair excluded"),
                        ));
                        continue;
                    }
                },
                None => None,
            };

            debug!(donor = %pair.donor_id, "pair admitted to graph");
            vertices.push(PairVertex {
                donor_id: pair.donor_id.clone(),
                recipient_id: pair.recipient_id.clone(),
                donor_type: donor.donor_type,
                donor_country: donor.country.clone(),
                recipient_country,
            });
        }
        vertices
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::ScoreOverride;
    use crate::core::hla::{HlaCode, HlaType};
    use crate::core::patient::{Donor, Pair, Recipient};
    use crate::core::types::{BloodGroup, Country, DonorId, DonorType, RecipientId};

    fn antigen(code: HlaCode) -> HlaType {
        HlaType::new(code.display().to_string(), code)
    }

    fn typing() -> Vec<HlaType> {
        vec![
            antigen(HlaCode::broad("A1")),
            antigen(HlaCode::broad("B7")),
        ]
    }

    fn donor(id: &str, blood: BloodGroup, country: &str) -> Donor {
        Donor {
            id: DonorId::new(id),
            blood_group: blood,
            hla_typing: typing(),
            country: Country::new(country),
            donor_type: DonorType::Paired,
        }
    }

    fn recipient(id: &str, blood: BloodGroup, country: &str) -> Recipient {
        Recipient {
            id: RecipientId::new(id),
            blood_group: blood,
            hla_typing: typing(),
            antibodies: Vec::new(),
            acceptable_blood_groups: Vec::new(),
            country: Country::new(country),
        }
    }

    fn two_pair_pool() -> PatientPool {
        PatientPool {
            donors: vec![
                donor("D1", BloodGroup::O, "CZE"),
                donor("D2", BloodGroup::O, "CZE"),
            ],
            recipients: vec![
                recipient("R1", BloodGroup::A, "CZE"),
                recipient("R2", BloodGroup::A, "CZE"),
            ],
            pairs: vec![
                Pair {
                    donor_id: DonorId::new("D1"),
                    recipient_id: Some(RecipientId::new("R1")),
                },
                Pair {
                    donor_id: DonorId::new("D2"),
                    recipient_id: Some(RecipientId::new("R2")),
                },
            ],
        }
    }

    #[test]
    fn test_no_self_pairing_and_stable_order() {
        let pool = two_pair_pool();
        let table = NomenclatureTable::default();
        let config = Configuration::default();
        let (graph, _) = GraphBuilder::new(&pool, &table, &config).build();

        // D1 -> R2 and D2 -> R1 only; never D1 -> R1
        assert_eq!(graph.edges.len(), 2);
        assert_eq!(graph.edges[0].donor_id, DonorId::new("D1"));
        assert_eq!(graph.edges[0].recipient_id, RecipientId::new("R2"));
        assert_eq!(graph.edges[1].donor_id, DonorId::new("D2"));
        assert_eq!(graph.edges[1].recipient_id, RecipientId::new("R1"));
    }

    #[test]
    fn test_invalid_pair_reference_excluded_and_reported() {
        let mut pool = two_pair_pool();
        pool.pairs.push(Pair {
            donor_id: DonorId::new("GHOST"),
            recipient_id: Some(RecipientId::new("R1")),
        });

        let table = NomenclatureTable::default();
        let config = Configuration::default();
        let (graph, issues) = GraphBuilder::new(&pool, &table, &config).build();

        assert_eq!(graph.pairs.len(), 2);
        assert!(issues
            .iter()
            .any(|i| i.kind == ParsingIssueKind::InvalidPairReference));
        // The rest of the pool was still processed
        assert_eq!(graph.edges.len(), 2);
    }

    #[test]
    fn test_forbidden_country_pairs_exclude_edges() {
        let mut pool = two_pair_pool();
        pool.donors[0].country = Country::new("AUT");

        let table = NomenclatureTable::default();
        let mut config = Configuration::default();
        config
            .forbidden_country_pairs
            .insert((Country::new("AUT"), Country::new("CZE")));

        let (graph, _) = GraphBuilder::new(&pool, &table, &config).build();
        // D1 (AUT) -> R2 (CZE) is forbidden; only D2 -> R1 remains
        assert_eq!(graph.edges.len(), 1);
        assert_eq!(graph.edges[0].donor_id, DonorId::new("D2"));
    }

    #[test]
    fn test_manual_override_replaces_score_and_detail() {
        let pool = two_pair_pool();
        let table = NomenclatureTable::default();
        let mut config = Configuration::default();
        config.manual_score_overrides.push(ScoreOverride {
            donor_id: DonorId::new("D1"),
            recipient_id: RecipientId::new("R2"),
            score: 42.0,
        });

        let (graph, _) = GraphBuilder::new(&pool, &table, &config).build();
        let edge = graph
            .edges
            .iter()
            .find(|e| e.donor_id == DonorId::new("D1"))
            .unwrap();
        assert!(edge.manual_override);
        assert!((edge.score - 42.0).abs() < f64::EPSILON);
        assert!(edge.detailed_score.is_none());
    }

    #[test]
    fn test_negative_override_forbids_edge() {
        let pool = two_pair_pool();
        let table = NomenclatureTable::default();
        let mut config = Configuration::default();
        config.manual_score_overrides.push(ScoreOverride {
            donor_id: DonorId::new("D1"),
            recipient_id: RecipientId::new("R2"),
            score: -1.0,
        });

        let (graph, _) = GraphBuilder::new(&pool, &table, &config).build();
        assert!(graph
            .edges
            .iter()
            .all(|e| e.donor_id != DonorId::new("D1")));
    }

    #[test]
    fn test_score_bounds_filter_edges() {
        let pool = two_pair_pool();
        let table = NomenclatureTable::default();
        let mut config = Configuration::default();
        // Both edges score 2.0 (two broad matches); a floor above that
        // removes everything.
        config.min_transplant_score = Some(5.0);

        let (graph, _) = GraphBuilder::new(&pool, &table, &config).build();
        assert!(graph.is_empty());
    }

    #[test]
    fn test_non_directed_donor_has_no_incoming_edges() {
        let mut pool = two_pair_pool();
        pool.donors.push(Donor {
            donor_type: DonorType::NonDirected,
            ..donor("D3", BloodGroup::O, "CZE")
        });
        pool.pairs.push(Pair {
            donor_id: DonorId::new("D3"),
            recipient_id: None,
        });

        let table = NomenclatureTable::default();
        let config = Configuration::default();
        let (graph, _) = GraphBuilder::new(&pool, &table, &config).build();

        let d3_vertex = graph
            .pairs
            .iter()
            .position(|p| p.donor_id == DonorId::new("D3"))
            .unwrap();
        // Outgoing edges exist (chain source), incoming are impossible
        assert!(graph.edges.iter().any(|e| e.from_pair == d3_vertex));
        assert!(graph.edges.iter().all(|e| e.to_pair != d3_vertex));
    }
}
