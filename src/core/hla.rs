use serde::{Deserialize, Serialize};

/// A partially-specified HLA code at up to three nomenclature levels.
///
/// `broad` is always present (e.g. `A9`); `split` refines it (e.g. `A24`);
/// `high_res` is the exact allele (e.g. `A*24:02`) and may be absent when the
/// typing method could not resolve it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HlaCode {
    pub broad: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub split: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub high_res: Option<String>,
}

impl HlaCode {
    pub fn broad(broad: impl Into<String>) -> Self {
        Self {
            broad: broad.into(),
            split: None,
            high_res: None,
        }
    }

    pub fn split(broad: impl Into<String>, split: impl Into<String>) -> Self {
        Self {
            broad: broad.into(),
            split: Some(split.into()),
            high_res: None,
        }
    }

    pub fn high_res(
        broad: impl Into<String>,
        split: impl Into<String>,
        high_res: impl Into<String>,
    ) -> Self {
        Self {
            broad: broad.into(),
            split: Some(split.into()),
            high_res: Some(high_res.into()),
        }
    }

    /// The most specific level this code is resolved to.
    #[must_use]
    pub fn specificity(&self) -> Specificity {
        if self.high_res.is_some() {
            Specificity::HighRes
        } else if self.split.is_some() {
            Specificity::Split
        } else {
            Specificity::Broad
        }
    }

    /// The antigen group (locus family) this code belongs to: the leading
    /// alphabetic prefix of the broad code, e.g. `A9 -> A`, `DR17 -> DR`.
    #[must_use]
    pub fn group(&self) -> String {
        self.broad
            .chars()
            .take_while(|c| c.is_ascii_alphabetic())
            .collect()
    }

    /// Most specific display form of this code.
    #[must_use]
    pub fn display(&self) -> &str {
        self.high_res
            .as_deref()
            .or(self.split.as_deref())
            .unwrap_or(&self.broad)
    }

    /// Compare two codes at descending specificity and report the deepest
    /// level at which they agree, or `None` when they do not match at all.
    #[must_use]
    pub fn match_level(&self, other: &HlaCode) -> Option<crate::core::types::HlaMatchType> {
        use crate::core::types::HlaMatchType;

        if let (Some(a), Some(b)) = (&self.high_res, &other.high_res) {
            if a == b {
                return Some(HlaMatchType::HighRes);
            }
        }
        if let (Some(a), Some(b)) = (&self.split, &other.split) {
            if a == b {
                return Some(HlaMatchType::Split);
            }
        }
        if self.broad == other.broad {
            return Some(HlaMatchType::Broad);
        }
        None
    }
}

impl std::fmt::Display for HlaCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display())
    }
}

impl PartialOrd for HlaCode {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HlaCode {
    /// Specificity first (`high_res > split > broad`), then code text so the
    /// ordering is total and deterministic.
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.specificity()
            .cmp(&other.specificity())
            .then_with(|| self.display().cmp(other.display()))
    }
}

/// Resolution level of an [`HlaCode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Specificity {
    Broad,
    Split,
    HighRes,
}

/// A single antigen observed on a donor's typing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HlaType {
    /// Code as received from the typing lab
    pub raw_code: String,
    /// Resolved nomenclature code
    pub code: HlaCode,
    /// Code shown to clinicians (most specific resolved form)
    pub display_code: String,
}

impl HlaType {
    pub fn new(raw_code: impl Into<String>, code: HlaCode) -> Self {
        let display_code = code.display().to_string();
        Self {
            raw_code: raw_code.into(),
            code,
            display_code,
        }
    }
}

/// A recipient's measured anti-HLA antibody
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HlaAntibody {
    /// Code as received from the antibody screen
    pub raw_code: String,
    /// Resolved nomenclature code
    pub code: HlaCode,
    /// Mean fluorescence intensity
    pub mfi: u32,
    /// Lab-specific positivity cutoff
    pub cutoff: u32,
}

impl HlaAntibody {
    pub fn new(raw_code: impl Into<String>, code: HlaCode, mfi: u32, cutoff: u32) -> Self {
        Self {
            raw_code: raw_code.into(),
            code,
            mfi,
            cutoff,
        }
    }

    /// An antibody is positive for its code iff `mfi >= cutoff`.
    #[must_use]
    pub fn is_over_cutoff(&self) -> bool {
        self.mfi >= self.cutoff
    }
}

/// One plausible high-resolution expansion of an ambiguous split/broad code.
///
/// The frequency flag down-weights rare expansions in diagnostics; it never
/// changes the crossmatch verdict itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssumedHlaType {
    pub code: HlaCode,
    pub is_frequent: bool,
}

/// Pairing of an antibody to a donor antigen, used as evidence for a
/// crossmatch verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AntibodyMatch {
    pub antibody: HlaAntibody,
    pub match_type: crate::core::types::HlaMatchType,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::HlaMatchType;

    #[test]
    fn test_group_extraction() {
        assert_eq!(HlaCode::broad("A9").group(), "A");
        assert_eq!(HlaCode::split("DR3", "DR17").group(), "DR");
        assert_eq!(HlaCode::broad("DQ7").group(), "DQ");
        assert_eq!(HlaCode::high_res("B7", "B7", "B*07:02").group(), "B");
    }

    #[test]
    fn test_specificity_ordering() {
        let broad = HlaCode::broad("A9");
        let split = HlaCode::split("A9", "A24");
        let high_res = HlaCode::high_res("A9", "A24", "A*24:02");

        assert!(high_res > split);
        assert!(split > broad);
        assert_eq!(high_res.specificity(), Specificity::HighRes);
    }

    #[test]
    fn test_match_level_descends_specificity() {
        let donor = HlaCode::high_res("A9", "A24", "A*24:02");
        let exact = HlaCode::high_res("A9", "A24", "A*24:02");
        let sibling = HlaCode::high_res("A9", "A24", "A*24:03");
        let split_only = HlaCode::split("A9", "A24");
        let unrelated = HlaCode::broad("B7");

        assert_eq!(donor.match_level(&exact), Some(HlaMatchType::HighRes));
        assert_eq!(donor.match_level(&sibling), Some(HlaMatchType::Split));
        assert_eq!(donor.match_level(&split_only), Some(HlaMatchType::Split));
        assert_eq!(donor.match_level(&unrelated), None);
    }

    #[test]
    fn test_antibody_cutoff() {
        let code = HlaCode::broad("A1");
        assert!(HlaAntibody::new("A1", code.clone(), 3000, 2000).is_over_cutoff());
        assert!(HlaAntibody::new("A1", code.clone(), 2000, 2000).is_over_cutoff());
        assert!(!HlaAntibody::new("A1", code, 1999, 2000).is_over_cutoff());
    }

    #[test]
    fn test_display_prefers_most_specific() {
        assert_eq!(HlaCode::broad("A9").display(), "A9");
        assert_eq!(HlaCode::split("A9", "A24").display(), "A24");
        assert_eq!(HlaCode::high_res("A9", "A24", "A*24:02").display(), "A*24:02");
    }
}
