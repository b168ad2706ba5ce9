use serde::{Deserialize, Serialize};

/// Classification of a data-quality finding raised during crossmatch
/// resolution or graph construction.
///
/// Issues are diagnostic: they never change a crossmatch verdict and never
/// abort processing of the rest of the pool.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ParsingIssueKind {
    /// Donor typed at high resolution, but only split/broad-level antibody
    /// evidence was available for comparison
    HighResWithAssumedSplitCode,
    /// The positive match was established at split/broad level, not by exact
    /// high-resolution agreement
    SplitBroadMatch,
    /// A match was found but donor specificity of the antibody is not fully
    /// certain (ambiguous expansion)
    AntibodiesMightNotBeDsa,
    /// No antibody evidence exists for this donor antigen group at all
    NoMatchingAntibody,
    /// An under-cutoff antibody exists for the group even though the group
    /// verdict is negative (informational)
    NegativeAntibodyInSummary,
    /// An HLA code could not be interpreted and was treated as no evidence
    UnparseableHlaCode,
    /// A pair referenced a donor or recipient id not present in the pool
    InvalidPairReference,
}

impl std::fmt::Display for ParsingIssueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::HighResWithAssumedSplitCode => "high-res donor code compared at split/broad level",
            Self::SplitBroadMatch => "match established at split/broad level",
            Self::AntibodiesMightNotBeDsa => "antibodies might not be donor-specific",
            Self::NoMatchingAntibody => "no matching antibody",
            Self::NegativeAntibodyInSummary => "under-cutoff antibody present in group",
            Self::UnparseableHlaCode => "unparseable HLA code",
            Self::InvalidPairReference => "pair references unknown patient id",
        };
        write!(f, "{s}")
    }
}

/// A single diagnostic finding, attached to the HLA code or antigen group
/// (or pair) it concerns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsingIssue {
    pub kind: ParsingIssueKind,
    /// The HLA code or antigen group (or pair description) this issue is about
    pub subject: String,
    pub message: String,
}

impl ParsingIssue {
    pub fn new(kind: ParsingIssueKind, subject: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            subject: subject.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ParsingIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.kind, self.subject, self.message)
    }
}
