//! Field extractors.
//!
//! Every field is extracted independently over the full text. Patterns are
//! tried in priority order; for a given pattern the leftmost match in the
//! text wins. The value is capture group 1 when the pattern has one that
//! participated, otherwise the whole match, trimmed. A match that trims to
//! an empty string does not count and the next pattern is tried.

use tracing::{debug, trace};

use crate::errors::ExtractError;
use crate::field::{BioField, BioMetadata};
use crate::patterns::patterns_for;

/// Anything that exposes document text to the extractor.
pub trait TextSource {
    fn text(&self) -> &str;
}

impl TextSource for str {
    fn text(&self) -> &str {
        self
    }
}

impl TextSource for String {
    fn text(&self) -> &str {
        self.as_str()
    }
}

/// Extracts a single field, or `None` when no pattern matches.
pub fn extract_field(field: BioField, text: &str) -> Option<String> {
    if text.is_empty() {
        return None;
    }

    for p in patterns_for(field) {
        let Some(caps) = p.regex.captures(text) else {
            continue;
        };
        let span = caps.get(1).or_else(|| caps.get(0))?;
        let value = span.as_str().trim();
        if value.is_empty() {
            continue;
        }
        trace!(field = %field, pattern = p.description, "field matched");
        return Some(value.to_string());
    }
    None
}

pub fn extract_eligibility_criteria(text: &str) -> Option<String> {
    extract_field(BioField::EligibilityCriteria, text)
}

pub fn extract_dose_schema(text: &str) -> Option<String> {
    extract_field(BioField::DoseSchema, text)
}

pub fn extract_safety_notes(text: &str) -> Option<String> {
    extract_field(BioField::SafetyNotes, text)
}

pub fn extract_protein_target(text: &str) -> Option<String> {
    extract_field(BioField::ProteinTarget, text)
}

pub fn extract_mechanism_of_action(text: &str) -> Option<String> {
    extract_field(BioField::MechanismOfAction, text)
}

pub fn extract_regulatory_section(text: &str) -> Option<String> {
    extract_field(BioField::RegulatorySection, text)
}

/// Runs only the listed extractors.
pub fn extract_fields(text: &str, fields: &[BioField]) -> BioMetadata {
    let mut out = BioMetadata::new();
    for &field in fields {
        if let Some(value) = extract_field(field, text) {
            out.insert(field, value);
        }
    }
    out
}

/// Runs all six extractors. Empty text yields an empty mapping.
pub fn extract_all(text: &str) -> BioMetadata {
    let out = extract_fields(text, &BioField::ALL);
    debug!(
        text_len = text.len(),
        matched = out.len(),
        "extract_all completed"
    );
    out
}

fn check_text(text: &str) -> Result<(), ExtractError> {
    if text.contains('\0') {
        return Err(ExtractError::MalformedText {
            reason: "contains NUL bytes",
        });
    }
    if text.contains(char::REPLACEMENT_CHARACTER) {
        return Err(ExtractError::MalformedText {
            reason: "contains undecodable byte sequences",
        });
    }
    Ok(())
}

/// Extracts all fields from a document's text.
///
/// # Errors
/// Returns [`ExtractError::MalformedText`] when the text carries NUL bytes or
/// U+FFFD replacement characters left over from decoding invalid input.
pub fn extract_all_metadata<D>(document: &D) -> Result<BioMetadata, ExtractError>
where
    D: TextSource + ?Sized,
{
    let text = document.text();
    check_text(text)?;
    Ok(extract_all(text))
}

/// Same checks as [`extract_all_metadata`], but only the listed extractors run.
pub fn extract_metadata_for<D>(
    document: &D,
    fields: &[BioField],
) -> Result<BioMetadata, ExtractError>
where
    D: TextSource + ?Sized,
{
    let text = document.text();
    check_text(text)?;
    Ok(extract_fields(text, fields))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCENARIO: &str =
        "Eligibility criteria: Patients aged 18-65. Dose: 100mg daily. Adverse events: nausea.";

    #[test]
    fn empty_text_yields_nothing() {
        let meta = extract_all("");
        assert!(meta.is_empty());
        for f in BioField::ALL {
            assert!(meta.get(f).is_none());
        }
    }

    #[test]
    fn clinical_scenario() {
        let meta = extract_all(SCENARIO);

        assert!(
            meta.get(BioField::EligibilityCriteria)
                .unwrap()
                .contains("Patients aged 18-65")
        );
        assert_eq!(meta.get(BioField::DoseSchema), Some("100mg daily"));
        assert!(meta.get(BioField::SafetyNotes).unwrap().contains("nausea"));
        assert!(meta.get(BioField::ProteinTarget).is_none());
        assert!(meta.get(BioField::MechanismOfAction).is_none());
        assert!(meta.get(BioField::RegulatorySection).is_none());
    }

    #[test]
    fn extraction_is_idempotent() {
        let texts = [
            SCENARIO,
            "",
            "Mechanism of action: blocks VEGF signalling\n\nTargets: VEGF",
            "FDA approval: granted in 2019 for NSCLC",
        ];
        for t in texts {
            let first = extract_all(t);
            for _ in 0..3 {
                assert_eq!(extract_all(t), first);
            }
        }
    }

    #[test]
    fn earlier_pattern_wins_over_earlier_position() {
        // The section pattern has priority even though the bare amount
        // appears first in the text.
        let text = "Take 5mg daily.\nDosing regimen: 10 mg weekly for 4 weeks";
        assert_eq!(
            extract_dose_schema(text).as_deref(),
            Some("10 mg weekly for 4 weeks")
        );
    }

    #[test]
    fn leftmost_match_wins_within_a_pattern() {
        let text = "Warnings: hepatotoxicity\nWarnings: rash";
        assert_eq!(extract_safety_notes(text).as_deref(), Some("hepatotoxicity"));
    }

    #[test]
    fn dose_with_unit_per_weight() {
        assert_eq!(
            extract_dose_schema("The dose of 5 mg/kg was well tolerated").as_deref(),
            Some("5 mg/kg")
        );
    }

    #[test]
    fn eligibility_age_range_uses_whole_match() {
        assert_eq!(
            extract_eligibility_criteria("Subjects with age between 18 and 75 were enrolled")
                .as_deref(),
            Some("age between 18 and 75")
        );
    }

    #[test]
    fn protein_target_symbol_after_verb() {
        assert_eq!(
            extract_protein_target("Osimertinib inhibits EGFR with high selectivity").as_deref(),
            Some("EGFR")
        );
        assert_eq!(
            extract_protein_target("Pembrolizumab binds to PD-1 on T cells").as_deref(),
            Some("PD-1")
        );
    }

    #[test]
    fn protein_target_symbol_before_noun() {
        assert_eq!(
            extract_protein_target("Expression of the HER2 receptor was measured").as_deref(),
            Some("HER2")
        );
    }

    #[test]
    fn protein_target_ignores_plain_words() {
        assert_eq!(extract_protein_target("The study targets the elderly"), None);
    }

    #[test]
    fn mechanism_section_and_phrase() {
        assert_eq!(
            extract_mechanism_of_action(
                "Mechanism of action: selective inhibition of BTK\nIndications: CLL"
            )
            .as_deref(),
            Some("selective inhibition of BTK")
        );
        assert_eq!(
            extract_mechanism_of_action("The compound inhibits the MAPK signalling pathway.")
                .as_deref(),
            Some("inhibits the MAPK signalling pathway")
        );
    }

    #[test]
    fn regulatory_section() {
        assert_eq!(
            extract_regulatory_section("FDA: approved in 2017 for metastatic melanoma").as_deref(),
            Some("approved in 2017 for metastatic melanoma")
        );
        assert_eq!(
            extract_regulatory_section("Results from the Phase III: 24-month survival data")
                .as_deref(),
            Some("24-month survival data")
        );
    }

    #[test]
    fn fields_are_independent() {
        let only_mech = extract_fields(
            "Mechanism of action: blocks VEGF\n\nDose: 5mg",
            &[BioField::MechanismOfAction],
        );
        assert_eq!(only_mech.len(), 1);
        assert_eq!(only_mech.get(BioField::MechanismOfAction), Some("blocks VEGF"));
    }

    #[test]
    fn document_wrapper_rejects_malformed_text() {
        let text = String::from("Dose: 5mg\u{FFFD}daily");
        assert!(matches!(
            extract_all_metadata(&text),
            Err(ExtractError::MalformedText { .. })
        ));
        assert!(extract_all_metadata("nul\0byte").is_err());
        assert_eq!(extract_all_metadata(SCENARIO).unwrap(), extract_all(SCENARIO));
    }

    #[test]
    fn extraction_is_thread_safe() {
        let texts: Vec<String> = (0..64)
            .map(|i| match i % 4 {
                0 => format!("{SCENARIO} Cohort {i}."),
                1 => format!("Mechanism of action: blocks VEGF\n\nTargets: VEGF\nDose: {i}mg weekly"),
                2 => format!("FDA: approved in 20{i:02} for metastatic melanoma"),
                _ => format!("Osimertinib inhibits EGFR in {i} patients"),
            })
            .collect();
        let sequential: Vec<BioMetadata> = texts.iter().map(|t| extract_all(t)).collect();

        let concurrent: Vec<BioMetadata> = std::thread::scope(|s| {
            let handles: Vec<_> = texts
                .chunks(8)
                .map(|chunk| s.spawn(move || chunk.iter().map(|t| extract_all(t)).collect::<Vec<_>>()))
                .collect();
            handles
                .into_iter()
                .flat_map(|h| h.join().unwrap())
                .collect()
        });

        assert_eq!(concurrent, sequential);
        assert!(sequential.iter().all(|m| !m.is_empty()));
    }

    #[test]
    fn scoped_extraction_skips_other_fields() {
        let meta = extract_metadata_for(SCENARIO, &[BioField::DoseSchema]).unwrap();
        assert_eq!(meta.len(), 1);
        assert_eq!(meta.get(BioField::DoseSchema), Some("100mg daily"));
        assert!(extract_metadata_for("a\0b", &[BioField::DoseSchema]).is_err());
    }
}
