//! Domain modes shared by ingestion and chat.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::ModeError;
use crate::field::BioField;

/// Human-readable list of accepted wire values.
pub const ALLOWED_MODES: &str = "clinical, moa, protein, regulatory";

/// Closed set of biotech domains.
///
/// A mode selects which metadata fields an ingestor keeps and which prompt
/// template a chat request uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Clinical,
    Moa,
    Protein,
    Regulatory,
}

impl Mode {
    pub const ALL: [Mode; 4] = [Mode::Clinical, Mode::Moa, Mode::Protein, Mode::Regulatory];

    /// Wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Clinical => "clinical",
            Mode::Moa => "moa",
            Mode::Protein => "protein",
            Mode::Regulatory => "regulatory",
        }
    }

    /// Metadata fields retained by an ingestor running in this mode.
    pub fn fields(self) -> &'static [BioField] {
        match self {
            Mode::Clinical => &[
                BioField::EligibilityCriteria,
                BioField::DoseSchema,
                BioField::SafetyNotes,
            ],
            Mode::Moa => &[BioField::MechanismOfAction, BioField::ProteinTarget],
            Mode::Protein => &[BioField::ProteinTarget, BioField::MechanismOfAction],
            Mode::Regulatory => &[BioField::RegulatorySection],
        }
    }

    /// Value written to the `document_type` metadata key.
    pub fn document_type(self) -> &'static str {
        self.as_str()
    }

    /// Parses an optional wire value. `None` stays `None`.
    pub fn parse_opt(value: Option<&str>) -> Result<Option<Mode>, ModeError> {
        value.map(str::parse).transpose()
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = ModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Mode::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| ModeError::Unknown {
                given: s.to_string(),
                allowed: ALLOWED_MODES,
            })
    }
}
