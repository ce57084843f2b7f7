//! Biotech metadata extraction for document chunks.
//!
//! This crate provides:
//! - [`BioField`]: the fixed set of metadata keys produced by extraction
//! - [`extract_all`] and the six single-field extractors
//! - [`Mode`]: the closed set of domain modes and the field subset each one keeps
//!
//! Everything here is pure: no I/O, no shared mutable state. Patterns are
//! compiled once per process and only read afterwards, so extraction can run
//! from any number of threads at once.

mod errors;
mod extractor;
mod field;
mod mode;
mod patterns;

pub use errors::{ExtractError, ModeError};
pub use extractor::{
    TextSource, extract_all, extract_all_metadata, extract_dose_schema,
    extract_eligibility_criteria, extract_field, extract_fields, extract_mechanism_of_action,
    extract_metadata_for,
    extract_protein_target, extract_regulatory_section, extract_safety_notes,
};
pub use field::{BioField, BioMetadata};
pub use mode::{ALLOWED_MODES, Mode};
