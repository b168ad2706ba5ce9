use serde::{Deserialize, Serialize};

/// Unique identifier for a donor in the patient pool
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DonorId(pub String);

impl DonorId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }
}

impl std::fmt::Display for DonorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a recipient in the patient pool
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecipientId(pub String);

impl RecipientId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }
}

impl std::fmt::Display for RecipientId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Country code of the transplant center a patient is registered at
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Country(pub String);

impl Country {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }
}

impl std::fmt::Display for Country {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// ABO blood group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BloodGroup {
    O,
    A,
    B,
    #[serde(rename = "AB")]
    Ab,
}

impl BloodGroup {
    /// Standard ABO donation rules: O is universal donor, AB universal recipient.
    #[must_use]
    pub fn can_donate_to(self, recipient: BloodGroup) -> bool {
        match self {
            Self::O => true,
            Self::A => matches!(recipient, Self::A | Self::Ab),
            Self::B => matches!(recipient, Self::B | Self::Ab),
            Self::Ab => matches!(recipient, Self::Ab),
        }
    }
}

impl std::fmt::Display for BloodGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::O => write!(f, "O"),
            Self::A => write!(f, "A"),
            Self::B => write!(f, "B"),
            Self::Ab => write!(f, "AB"),
        }
    }
}

/// How a donor entered the pool, which determines the role it may play in
/// an exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DonorType {
    /// Donor registered together with an incompatible recipient; may only
    /// donate inside a cycle or as a continuation of a chain.
    #[default]
    Paired,
    /// Altruistic donor with no paired recipient; starts a chain.
    NonDirected,
    /// Donor left over from a previous exchange round; also starts a chain.
    Bridging,
}

impl DonorType {
    /// Whether this donor can open a chain (no incoming transplant required).
    #[must_use]
    pub fn starts_chains(self) -> bool {
        matches!(self, Self::NonDirected | Self::Bridging)
    }
}

/// Specificity level at which an antibody was matched to a donor antigen
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HlaMatchType {
    /// Matched at the broad antigen level only
    Broad,
    /// Matched at the split antigen level
    Split,
    /// Exact high-resolution allele agreement
    HighRes,
}
