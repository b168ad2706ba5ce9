use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::hla::{AssumedHlaType, HlaCode};

#[derive(Error, Debug)]
pub enum NomenclatureError {
    #[error("Failed to parse nomenclature table: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Duplicate nomenclature entry for code: {0}")]
    DuplicateEntry(String),
}

/// One row of the reference nomenclature: an ambiguous split/broad code and
/// the high-resolution alleles it may stand for.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NomenclatureEntry {
    /// Split or broad code this entry expands (e.g. `A24`)
    pub code: String,
    pub expansions: Vec<AssumedHlaType>,
}

/// Immutable reference table of plausible high-resolution expansions for
/// ambiguous split/broad codes.
///
/// The table is an in-memory lookup injected into the crossmatch resolver;
/// the engine never loads it itself. An empty table is valid and simply
/// yields no expansions.
#[derive(Debug, Clone, Default)]
pub struct NomenclatureTable {
    by_code: HashMap<String, Vec<AssumedHlaType>>,
}

impl NomenclatureTable {
    /// Build a table from entries, rejecting duplicate codes.
    pub fn from_entries(
        entries: impl IntoIterator<Item = NomenclatureEntry>,
    ) -> Result<Self, NomenclatureError> {
        let mut by_code: HashMap<String, Vec<AssumedHlaType>> = HashMap::new();
        for entry in entries {
            if by_code.contains_key(&entry.code) {
                return Err(NomenclatureError::DuplicateEntry(entry.code));
            }
            by_code.insert(entry.code, entry.expansions);
        }
        Ok(Self { by_code })
    }

    /// Parse a table from its JSON representation (an array of entries).
    pub fn from_json_str(json: &str) -> Result<Self, NomenclatureError> {
        let entries: Vec<NomenclatureEntry> = serde_json::from_str(json)?;
        Self::from_entries(entries)
    }

    /// All plausible high-resolution expansions of the given code, keyed by
    /// its most specific resolved form. Unknown codes expand to nothing.
    #[must_use]
    pub fn expand(&self, code: &HlaCode) -> &[AssumedHlaType] {
        self.by_code
            .get(code.display())
            .map_or(&[], Vec::as_slice)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_code.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_code.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn a24_entry() -> NomenclatureEntry {
        NomenclatureEntry {
            code: "A24".to_string(),
            expansions: vec![
                AssumedHlaType {
                    code: HlaCode::high_res("A9", "A24", "A*24:02"),
                    is_frequent: true,
                },
                AssumedHlaType {
                    code: HlaCode::high_res("A9", "A24", "A*24:10"),
                    is_frequent: false,
                },
            ],
        }
    }

    #[test]
    fn test_expand_known_code() {
        let table = NomenclatureTable::from_entries([a24_entry()]).unwrap();
        let expansions = table.expand(&HlaCode::split("A9", "A24"));
        assert_eq!(expansions.len(), 2);
        assert!(expansions[0].is_frequent);
    }

    #[test]
    fn test_expand_unknown_code_is_empty() {
        let table = NomenclatureTable::from_entries([a24_entry()]).unwrap();
        assert!(table.expand(&HlaCode::broad("B7")).is_empty());
    }

    #[test]
    fn test_duplicate_entry_rejected() {
        let result = NomenclatureTable::from_entries([a24_entry(), a24_entry()]);
        assert!(matches!(
            result,
            Err(NomenclatureError::DuplicateEntry(code)) if code == "A24"
        ));
    }

    #[test]
    fn test_from_json() {
        let json = r#"[
            {
                "code": "DR3",
                "expansions": [
                    {
                        "code": {"broad": "DR3", "split": "DR17", "high_res": "DRB1*03:01"},
                        "is_frequent": true
                    }
                ]
            }
        ]"#;
        let table = NomenclatureTable::from_json_str(json).unwrap();
        assert_eq!(table.len(), 1);
        let expansions = table.expand(&HlaCode::broad("DR3"));
        assert_eq!(expansions[0].code.high_res.as_deref(), Some("DRB1*03:01"));
    }
}
