//! Metadata field names and the extracted field mapping.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the six biotech metadata keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BioField {
    EligibilityCriteria,
    DoseSchema,
    SafetyNotes,
    ProteinTarget,
    MechanismOfAction,
    RegulatorySection,
}

impl BioField {
    /// All fields in extraction order.
    pub const ALL: [BioField; 6] = [
        BioField::EligibilityCriteria,
        BioField::DoseSchema,
        BioField::SafetyNotes,
        BioField::ProteinTarget,
        BioField::MechanismOfAction,
        BioField::RegulatorySection,
    ];

    /// Metadata key as stored on documents.
    pub fn as_str(self) -> &'static str {
        match self {
            BioField::EligibilityCriteria => "eligibility_criteria",
            BioField::DoseSchema => "dose_schema",
            BioField::SafetyNotes => "safety_notes",
            BioField::ProteinTarget => "protein_target",
            BioField::MechanismOfAction => "mechanism_of_action",
            BioField::RegulatorySection => "regulatory_section",
        }
    }

    /// Reverse lookup from a metadata key.
    pub fn from_key(key: &str) -> Option<BioField> {
        BioField::ALL.into_iter().find(|f| f.as_str() == key)
    }
}

impl fmt::Display for BioField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Extracted field values for one document.
///
/// Only fields that matched are present. Values are already trimmed and
/// never empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BioMetadata {
    fields: BTreeMap<BioField, String>,
}

impl BioMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a value; empty values are ignored.
    pub(crate) fn insert(&mut self, field: BioField, value: String) {
        if !value.is_empty() {
            self.fields.insert(field, value);
        }
    }

    pub fn get(&self, field: BioField) -> Option<&str> {
        self.fields.get(&field).map(String::as_str)
    }

    pub fn contains(&self, field: BioField) -> bool {
        self.fields.contains_key(&field)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (BioField, &str)> {
        self.fields.iter().map(|(k, v)| (*k, v.as_str()))
    }

    /// Writes the fields into an existing string metadata map.
    ///
    /// Keys outside the biotech set are left untouched; biotech keys are
    /// added or overwritten.
    pub fn merge_into(&self, metadata: &mut BTreeMap<String, String>) {
        for (field, value) in &self.fields {
            metadata.insert(field.as_str().to_string(), value.clone());
        }
    }
}
