use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::hla::{AntibodyMatch, AssumedHlaType, HlaAntibody, HlaCode, HlaType};
use crate::core::types::HlaMatchType;
use crate::crossmatch::issues::{ParsingIssue, ParsingIssueKind};
use crate::crossmatch::nomenclature::NomenclatureTable;

/// Verdict for one donor antigen against a recipient's antibody panel
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrossmatchSummary {
    /// The donor antigen this verdict is about
    pub hla_code: HlaCode,

    /// Antigen group (locus family) of the donor antigen
    pub group: String,

    /// MFI of the strongest antibody compared against this antigen, `None`
    /// when no antibody evidence exists for the group
    pub mfi: Option<u32>,

    /// Positive iff at least one matched antibody is at or over its cutoff
    pub is_positive_crossmatch: bool,

    /// Diagnostic findings for this antigen, independent of the verdict
    pub issues: BTreeSet<ParsingIssueKind>,

    /// Every antibody paired to this antigen, with the specificity level of
    /// the pairing
    pub antibody_matches: Vec<AntibodyMatch>,

    /// High-resolution expansions assumed for an ambiguous donor code,
    /// carried for transparency even when unused in the verdict
    pub assumed_hla_types: Vec<AssumedHlaType>,
}

/// Resolves a donor typing against a recipient antibody panel into
/// per-antigen crossmatch verdicts.
///
/// Resolution always completes: unparseable codes surface a
/// [`ParsingIssue`] and are treated as "no evidence" rather than failing the
/// whole pair.
pub struct CrossmatchResolver<'a> {
    nomenclature: &'a NomenclatureTable,
}

impl<'a> CrossmatchResolver<'a> {
    pub fn new(nomenclature: &'a NomenclatureTable) -> Self {
        Self { nomenclature }
    }

    /// Resolve every donor antigen against the recipient's panel.
    ///
    /// Returns one [`CrossmatchSummary`] per donor antigen plus the flat
    /// list of diagnostic issues raised along the way.
    pub fn resolve(
        &self,
        donor_typing: &[HlaType],
        recipient_antibodies: &[HlaAntibody],
    ) -> (Vec<CrossmatchSummary>, Vec<ParsingIssue>) {
        let mut issues = Vec::new();

        // Antibodies with unusable codes carry no evidence; report and drop.
        let panel: Vec<&HlaAntibody> = recipient_antibodies
            .iter()
            .filter(|ab| {
                if ab.code.broad.is_empty() {
                    issues.push(ParsingIssue::new(
                        ParsingIssueKind::UnparseableHlaCode,
                        &ab.raw_code,
                        format!("antibody code {:?} could not be resolved, ignored", ab.raw_code),
                    ));
                    false
                } else {
                    true
                }
            })
            .collect();

        let summaries = donor_typing
            .iter()
            .map(|antigen| self.resolve_antigen(antigen, &panel, &mut issues))
            .collect();

        (summaries, issues)
    }

    fn resolve_antigen(
        &self,
        antigen: &HlaType,
        panel: &[&HlaAntibody],
        issues: &mut Vec<ParsingIssue>,
    ) -> CrossmatchSummary {
        if antigen.code.broad.is_empty() {
            issues.push(ParsingIssue::new(
                ParsingIssueKind::UnparseableHlaCode,
                &antigen.raw_code,
                format!(
                    "donor antigen code {:?} could not be resolved, treated as no evidence",
                    antigen.raw_code
                ),
            ));
            return CrossmatchSummary {
                hla_code: antigen.code.clone(),
                group: antigen.code.group(),
                mfi: None,
                is_positive_crossmatch: false,
                issues: BTreeSet::from([ParsingIssueKind::UnparseableHlaCode]),
                antibody_matches: Vec::new(),
                assumed_hla_types: Vec::new(),
            };
        }

        let group = antigen.code.group();
        let group_panel: Vec<&HlaAntibody> = panel
            .iter()
            .copied()
            .filter(|ab| ab.code.group() == group)
            .collect();

        // Expansions are looked up for any donor code that is not fully
        // resolved, and always carried in the summary.
        let assumed_hla_types: Vec<AssumedHlaType> = if antigen.code.high_res.is_none() {
            self.nomenclature.expand(&antigen.code).to_vec()
        } else {
            Vec::new()
        };

        let mut summary_issues = BTreeSet::new();

        if group_panel.is_empty() {
            summary_issues.insert(ParsingIssueKind::NoMatchingAntibody);
            issues.push(ParsingIssue::new(
                ParsingIssueKind::NoMatchingAntibody,
                antigen.code.display(),
                format!("no antibody evidence for antigen group {group}"),
            ));
            return CrossmatchSummary {
                hla_code: antigen.code.clone(),
                group,
                mfi: None,
                is_positive_crossmatch: false,
                issues: summary_issues,
                antibody_matches: Vec::new(),
                assumed_hla_types,
            };
        }

        let antibody_matches =
            collect_antibody_matches(&antigen.code, &assumed_hla_types, &group_panel);

        let positive_matches: Vec<&AntibodyMatch> = antibody_matches
            .iter()
            .filter(|m| m.antibody.is_over_cutoff())
            .collect();
        let is_positive = !positive_matches.is_empty();

        // Reported MFI is the strongest compared antibody, whatever the verdict.
        let mfi = antibody_matches.iter().map(|m| m.antibody.mfi).max();

        if antigen.code.high_res.is_some() {
            // Donor resolved at high resolution, but no antibody in the group
            // offered a high-resolution code to compare against.
            let any_high_res_evidence = group_panel.iter().any(|ab| ab.code.high_res.is_some());
            if !any_high_res_evidence {
                summary_issues.insert(ParsingIssueKind::HighResWithAssumedSplitCode);
                issues.push(ParsingIssue::new(
                    ParsingIssueKind::HighResWithAssumedSplitCode,
                    antigen.code.display(),
                    format!(
                        "donor antigen {} typed at high resolution but only split/broad antibody evidence was available",
                        antigen.code.display()
                    ),
                ));
            }
        }

        if is_positive {
            let decided_at_high_res = positive_matches
                .iter()
                .any(|m| m.match_type == HlaMatchType::HighRes && antigen.code.high_res.is_some());

            if !decided_at_high_res {
                summary_issues.insert(ParsingIssueKind::SplitBroadMatch);
                issues.push(ParsingIssue::new(
                    ParsingIssueKind::SplitBroadMatch,
                    antigen.code.display(),
                    format!(
                        "positive crossmatch for {} established below high resolution",
                        antigen.code.display()
                    ),
                ));
            }

            // A positive verdict on an ambiguous donor code cannot be
            // attributed to a single allele with certainty.
            if antigen.code.high_res.is_none() {
                summary_issues.insert(ParsingIssueKind::AntibodiesMightNotBeDsa);
                let frequent_only = assumed_hla_types.iter().all(|a| a.is_frequent);
                let detail = if assumed_hla_types.is_empty() || frequent_only {
                    String::new()
                } else {
                    " (some assumed alleles are rare in the population)".to_string()
                };
                issues.push(ParsingIssue::new(
                    ParsingIssueKind::AntibodiesMightNotBeDsa,
                    antigen.code.display(),
                    format!(
                        "antibodies matched ambiguous donor code {}; they might not be donor-specific{detail}",
                        antigen.code.display()
                    ),
                ));
            }
        } else if !antibody_matches.is_empty() {
            summary_issues.insert(ParsingIssueKind::NegativeAntibodyInSummary);
            issues.push(ParsingIssue::new(
                ParsingIssueKind::NegativeAntibodyInSummary,
                antigen.code.display(),
                format!(
                    "under-cutoff antibody present for {}, group verdict stays negative",
                    antigen.code.display()
                ),
            ));
        }

        debug!(
            antigen = %antigen.code,
            positive = is_positive,
            matches = antibody_matches.len(),
            "resolved crossmatch for donor antigen"
        );

        CrossmatchSummary {
            hla_code: antigen.code.clone(),
            group,
            mfi,
            is_positive_crossmatch: is_positive,
            issues: summary_issues,
            antibody_matches,
            assumed_hla_types,
        }
    }
}

/// Pair every group antibody to the donor antigen at the deepest specificity
/// it supports, considering assumed expansions of ambiguous donor codes.
///
/// Each antibody contributes at most one match, at its best level.
fn collect_antibody_matches(
    donor_code: &HlaCode,
    assumed: &[AssumedHlaType],
    group_panel: &[&HlaAntibody],
) -> Vec<AntibodyMatch> {
    let mut matches = Vec::new();

    for ab in group_panel {
        let direct = donor_code.match_level(&ab.code);

        // An antibody naming an allele the donor code could expand to is
        // high-resolution evidence against an assumed allele.
        let via_expansion = ab.code.high_res.as_ref().and_then(|ab_allele| {
            assumed
                .iter()
                .any(|a| a.code.high_res.as_deref() == Some(ab_allele))
                .then_some(HlaMatchType::HighRes)
        });

        let best = match (direct, via_expansion) {
            (Some(d), Some(e)) => Some(d.max(e)),
            (d, e) => d.or(e),
        };

        if let Some(match_type) = best {
            matches.push(AntibodyMatch {
                antibody: (*ab).clone(),
                match_type,
            });
        }
    }

    matches
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crossmatch::nomenclature::NomenclatureEntry;

    fn table_with_a1_expansions() -> NomenclatureTable {
        NomenclatureTable::from_entries([NomenclatureEntry {
            code: "A1".to_string(),
            expansions: vec![
                AssumedHlaType {
                    code: HlaCode::high_res("A1", "A1", "A*01:01"),
                    is_frequent: true,
                },
                AssumedHlaType {
                    code: HlaCode::high_res("A1", "A1", "A*01:03"),
                    is_frequent: false,
                },
            ],
        }])
        .unwrap()
    }

    fn antigen(code: HlaCode) -> HlaType {
        HlaType::new(code.display().to_string(), code)
    }

    #[test]
    fn test_exact_high_res_positive_without_split_broad_issue() {
        let table = NomenclatureTable::default();
        let resolver = CrossmatchResolver::new(&table);

        let typing = vec![antigen(HlaCode::high_res("A1", "A1", "A*01:01"))];
        let antibodies = vec![HlaAntibody::new(
            "A*01:01",
            HlaCode::high_res("A1", "A1", "A*01:01"),
            2500,
            2000,
        )];

        let (summaries, _) = resolver.resolve(&typing, &antibodies);
        assert_eq!(summaries.len(), 1);
        let summary = &summaries[0];
        assert!(summary.is_positive_crossmatch);
        assert_eq!(summary.mfi, Some(2500));
        assert!(!summary.issues.contains(&ParsingIssueKind::SplitBroadMatch));
        assert!(!summary
            .issues
            .contains(&ParsingIssueKind::AntibodiesMightNotBeDsa));
    }

    #[test]
    fn test_no_evidence_yields_negative_with_issue() {
        // Donor antigen A*01:02 with no antibody evidence at all
        let table = NomenclatureTable::default();
        let resolver = CrossmatchResolver::new(&table);

        let typing = vec![antigen(HlaCode::high_res("A1", "A1", "A*01:02"))];
        let (summaries, issues) = resolver.resolve(&typing, &[]);

        let summary = &summaries[0];
        assert!(!summary.is_positive_crossmatch);
        assert_eq!(summary.mfi, None);
        assert!(summary.issues.contains(&ParsingIssueKind::NoMatchingAntibody));
        assert!(issues
            .iter()
            .any(|i| i.kind == ParsingIssueKind::NoMatchingAntibody));
    }

    #[test]
    fn test_split_level_positive_raises_split_broad_and_dsa_issues() {
        // Donor resolved only to split A1; antibody A1 at 3000 over cutoff 2000
        let table = table_with_a1_expansions();
        let resolver = CrossmatchResolver::new(&table);

        let typing = vec![antigen(HlaCode::split("A1", "A1"))];
        let antibodies = vec![HlaAntibody::new(
            "A1",
            HlaCode::split("A1", "A1"),
            3000,
            2000,
        )];

        let (summaries, _) = resolver.resolve(&typing, &antibodies);
        let summary = &summaries[0];
        assert!(summary.is_positive_crossmatch);
        assert_eq!(summary.mfi, Some(3000));
        assert!(summary.issues.contains(&ParsingIssueKind::SplitBroadMatch));
        assert!(summary
            .issues
            .contains(&ParsingIssueKind::AntibodiesMightNotBeDsa));
        // Expansions are carried even though they did not decide the verdict
        assert_eq!(summary.assumed_hla_types.len(), 2);
    }

    #[test]
    fn test_expansion_mediated_high_res_match() {
        // Donor split A1 expands to A*01:01; recipient has an antibody
        // against exactly that allele.
        let table = table_with_a1_expansions();
        let resolver = CrossmatchResolver::new(&table);

        let typing = vec![antigen(HlaCode::split("A1", "A1"))];
        let antibodies = vec![HlaAntibody::new(
            "A*01:01",
            HlaCode::high_res("A1", "A1", "A*01:01"),
            4000,
            2000,
        )];

        let (summaries, _) = resolver.resolve(&typing, &antibodies);
        let summary = &summaries[0];
        assert!(summary.is_positive_crossmatch);
        assert_eq!(summary.antibody_matches[0].match_type, HlaMatchType::HighRes);
        // Verdict rests on an assumed allele, so donor specificity is uncertain
        assert!(summary
            .issues
            .contains(&ParsingIssueKind::AntibodiesMightNotBeDsa));
    }

    #[test]
    fn test_under_cutoff_antibody_is_informational_only() {
        let table = NomenclatureTable::default();
        let resolver = CrossmatchResolver::new(&table);

        let typing = vec![antigen(HlaCode::high_res("B7", "B7", "B*07:02"))];
        let antibodies = vec![HlaAntibody::new(
            "B*07:02",
            HlaCode::high_res("B7", "B7", "B*07:02"),
            500,
            2000,
        )];

        let (summaries, _) = resolver.resolve(&typing, &antibodies);
        let summary = &summaries[0];
        assert!(!summary.is_positive_crossmatch);
        assert_eq!(summary.mfi, Some(500));
        assert!(summary
            .issues
            .contains(&ParsingIssueKind::NegativeAntibodyInSummary));
    }

    #[test]
    fn test_high_res_donor_with_only_split_evidence() {
        let table = NomenclatureTable::default();
        let resolver = CrossmatchResolver::new(&table);

        let typing = vec![antigen(HlaCode::high_res("A1", "A1", "A*01:01"))];
        let antibodies = vec![HlaAntibody::new(
            "A1",
            HlaCode::split("A1", "A1"),
            3000,
            2000,
        )];

        let (summaries, _) = resolver.resolve(&typing, &antibodies);
        let summary = &summaries[0];
        assert!(summary.is_positive_crossmatch);
        assert!(summary
            .issues
            .contains(&ParsingIssueKind::HighResWithAssumedSplitCode));
        assert!(summary.issues.contains(&ParsingIssueKind::SplitBroadMatch));
    }

    #[test]
    fn test_unparseable_codes_do_not_abort_resolution() {
        let table = NomenclatureTable::default();
        let resolver = CrossmatchResolver::new(&table);

        let typing = vec![
            HlaType::new("??", HlaCode::broad("")),
            antigen(HlaCode::broad("B7")),
        ];
        let antibodies = vec![
            HlaAntibody::new("??", HlaCode::broad(""), 9000, 2000),
            HlaAntibody::new("B7", HlaCode::broad("B7"), 2500, 2000),
        ];

        let (summaries, issues) = resolver.resolve(&typing, &antibodies);
        assert_eq!(summaries.len(), 2);
        assert!(!summaries[0].is_positive_crossmatch);
        assert!(summaries[1].is_positive_crossmatch);
        assert_eq!(
            issues
                .iter()
                .filter(|i| i.kind == ParsingIssueKind::UnparseableHlaCode)
                .count(),
            2
        );
    }

    #[test]
    fn test_antibodies_of_other_groups_are_ignored() {
        let table = NomenclatureTable::default();
        let resolver = CrossmatchResolver::new(&table);

        let typing = vec![antigen(HlaCode::broad("DR4"))];
        let antibodies = vec![HlaAntibody::new(
            "A1",
            HlaCode::broad("A1"),
            9000,
            2000,
        )];

        let (summaries, _) = resolver.resolve(&typing, &antibodies);
        let summary = &summaries[0];
        assert!(!summary.is_positive_crossmatch);
        assert!(summary.issues.contains(&ParsingIssueKind::NoMatchingAntibody));
    }
}
