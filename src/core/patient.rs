use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::core::hla::{HlaAntibody, HlaType};
use crate::core::types::{BloodGroup, Country, DonorId, DonorType, RecipientId};

/// A living kidney donor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Donor {
    pub id: DonorId,
    pub blood_group: BloodGroup,
    /// Resolved HLA typing; empty when typing is unavailable
    #[serde(default)]
    pub hla_typing: Vec<HlaType>,
    pub country: Country,
    #[serde(default)]
    pub donor_type: DonorType,
}

/// A transplant candidate waiting for a kidney
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipient {
    pub id: RecipientId,
    pub blood_group: BloodGroup,
    #[serde(default)]
    pub hla_typing: Vec<HlaType>,
    /// Luminex antibody screen results
    #[serde(default)]
    pub antibodies: Vec<HlaAntibody>,
    /// Blood groups this recipient will accept. Empty means standard ABO
    /// compatibility rules apply.
    #[serde(default)]
    pub acceptable_blood_groups: Vec<BloodGroup>,
    pub country: Country,
}

impl Recipient {
    /// Whether this recipient accepts a kidney from a donor of the given
    /// blood group, honoring an explicit acceptable set when present.
    #[must_use]
    pub fn accepts_blood_group(&self, donor_group: BloodGroup) -> bool {
        if self.acceptable_blood_groups.is_empty() {
            donor_group.can_donate_to(self.blood_group)
        } else {
            self.acceptable_blood_groups.contains(&donor_group)
        }
    }
}

/// A donor together with its paired recipient; `recipient_id` is absent for
/// non-directed and bridging donors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pair {
    pub donor_id: DonorId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient_id: Option<RecipientId>,
}

/// The full pool of patients considered in one solve invocation.
///
/// Supplied already validated and resolved by the caller; the engine performs
/// no I/O against it. Pairs referencing unknown ids are dropped (and
/// reported) during graph construction, never aborting the rest of the pool.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatientPool {
    pub donors: Vec<Donor>,
    pub recipients: Vec<Recipient>,
    pub pairs: Vec<Pair>,
}

impl PatientPool {
    /// Lookup map from donor id to donor.
    #[must_use]
    pub fn donor_index(&self) -> HashMap<&DonorId, &Donor> {
        self.donors.iter().map(|d| (&d.id, d)).collect()
    }

    /// Lookup map from recipient id to recipient.
    #[must_use]
    pub fn recipient_index(&self) -> HashMap<&RecipientId, &Recipient> {
        self.recipients.iter().map(|r| (&r.id, r)).collect()
    }
}
