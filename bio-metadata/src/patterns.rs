//! Compiled pattern tables, one per field, in priority order.
//!
//! Section-style patterns capture lazily up to the first blank line, a
//! newline followed by an uppercase letter (next heading), or end of text.

use std::sync::LazyLock;

use regex::Regex;

use crate::field::BioField;

/// A compiled pattern with a short label used in trace logs.
pub(crate) struct FieldPattern {
    pub regex: Regex,
    pub description: &'static str,
}

fn pattern(regex_str: &str, description: &'static str) -> FieldPattern {
    FieldPattern {
        regex: Regex::new(regex_str).expect("Invalid metadata regex pattern"),
        description,
    }
}

/// Builds a section pattern: `<head>` followed by separators, then a lazy
/// capture that ends at the next section boundary.
fn section(head: &str, description: &'static str) -> FieldPattern {
    pattern(
        &format!(r"(?is){head}[:\s]+(.*?)(?:\n[ \t]*\n|\n(?-i:[A-Z])|$)"),
        description,
    )
}

static ELIGIBILITY_PATTERNS: LazyLock<Vec<FieldPattern>> = LazyLock::new(|| {
    vec![
        section(
            r"\b(?:inclusion|exclusion|eligibility)\s+criteria",
            "eligibility/inclusion criteria section",
        ),
        pattern(
            r"(?is)\bpatients?\s+(?:must|should|eligible)\s+(?:to|for|with|be|have)\s+(.*?)(?:\.|$)",
            "patients must/should/eligible clause",
        ),
        pattern(
            r"(?i)\bage[sd]?\s+(?:range|between|of)\s+\d+\s*(?:-|to|and)\s*\d+",
            "age range",
        ),
    ]
});

static DOSE_PATTERNS: LazyLock<Vec<FieldPattern>> = LazyLock::new(|| {
    vec![
        pattern(
            r"(?i)\bdos(?:es|e|age)\b\s*(?:of|:)?\s*(\d+(?:\.\d+)?\s*(?:mg|μg|mcg|g|IU|units?)(?:\s*(?:per|/)\s*(?:day|week|month|kg|m2))?(?:\s+(?:once\s+|twice\s+)?(?:daily|weekly|monthly|a\s+day))?)",
            "dose amount with optional frequency",
        ),
        section(
            r"\bdosing\s+(?:regimen|schedule|schema)",
            "dosing regimen section",
        ),
        pattern(
            r"(?i)\b\d+(?:\.\d+)?\s*(?:mg|μg|mcg|g)\s*(?:once|twice|daily|weekly|monthly)(?:\s+(?:daily|weekly|monthly))?",
            "bare amount with frequency",
        ),
    ]
});

static SAFETY_PATTERNS: LazyLock<Vec<FieldPattern>> = LazyLock::new(|| {
    vec![
        section(
            r"\b(?:adverse\s+(?:events?|reactions?)|side\s+effects?|safety|toxicit(?:y|ies))",
            "adverse events/side effects/safety section",
        ),
        section(r"\bcontraindications?", "contraindications section"),
        section(r"\bwarnings?", "warnings section"),
    ]
});

/// Gene/protein symbol: optional lowercase prefix (mTOR), then an uppercase
/// letter and at least one more uppercase letter or digit, hyphenated parts.
const SYMBOL: &str = r"[a-z]?[A-Z][A-Z0-9]+(?:-[A-Z0-9]+)*";

static PROTEIN_PATTERNS: LazyLock<Vec<FieldPattern>> = LazyLock::new(|| {
    vec![
        pattern(
            &format!(r"(?i:\btargets?|\binhibits?|\bbinds?\s+to|\bacts?\s+on)[:\s]+({SYMBOL})\b"),
            "targets/inhibits/binds to <symbol>",
        ),
        pattern(
            &format!(r"\b({SYMBOL})\s+(?i:receptors?|proteins?|enzymes?|kinases?|pathways?)\b"),
            "<symbol> receptor/protein/kinase",
        ),
        pattern(
            r"\b(?:PD-L1|PD-1|EGFR|HER2|VEGF|ALK|BRAF|KRAS|PI3K|mTOR)\b",
            "well-known target symbol",
        ),
    ]
});

static MOA_PATTERNS: LazyLock<Vec<FieldPattern>> = LazyLock::new(|| {
    vec![
        section(r"\bmechanism\s+of\s+action", "mechanism of action section"),
        section(r"(?:\bMOA\b|\bmode\s+of\s+action)", "MOA/mode of action section"),
        pattern(
            r"(?i)\b((?:inhibits?|blocks?|activates?|modulates?)\s+[^.\n]*?\b(?:pathways?|receptors?|enzymes?|proteins?))\b",
            "inhibits/blocks ... pathway/receptor phrase",
        ),
    ]
});

static REGULATORY_PATTERNS: LazyLock<Vec<FieldPattern>> = LazyLock::new(|| {
    vec![
        section(
            r"\b(?:FDA|EMA|regulatory|approval|indications?)",
            "FDA/EMA/regulatory/approval section",
        ),
        section(r"\b(?:indications?|approved\s+for)", "indications/approved for"),
        section(
            r"\b(?:phase\s+(?:IV|I{1,3})\b|clinical\s+trial)",
            "trial phase section",
        ),
    ]
});

/// Priority-ordered patterns for `field`.
pub(crate) fn patterns_for(field: BioField) -> &'static [FieldPattern] {
    match field {
        BioField::EligibilityCriteria => ELIGIBILITY_PATTERNS.as_slice(),
        BioField::DoseSchema => DOSE_PATTERNS.as_slice(),
        BioField::SafetyNotes => SAFETY_PATTERNS.as_slice(),
        BioField::ProteinTarget => PROTEIN_PATTERNS.as_slice(),
        BioField::MechanismOfAction => MOA_PATTERNS.as_slice(),
        BioField::RegulatorySection => REGULATORY_PATTERNS.as_slice(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_table_compiles_and_is_non_empty() {
        for f in BioField::ALL {
            assert!(!patterns_for(f).is_empty(), "{f} has no patterns");
        }
    }

    #[test]
    fn section_boundary_stops_at_next_heading() {
        let p = section(r"\bwarnings?", "test");
        let caps = p
            .regex
            .captures("Warnings: hepatotoxicity\nDosage: 5mg")
            .unwrap();
        assert_eq!(&caps[1], "hepatotoxicity");
    }

    #[test]
    fn section_boundary_stops_at_blank_line() {
        let p = section(r"\bwarnings?", "test");
        let caps = p
            .regex
            .captures("warning: avoid in pregnancy\n\nother text")
            .unwrap();
        assert_eq!(&caps[1], "avoid in pregnancy");
    }
}
