//! Context block builder with a character budget.

use bio_ingest::{FILE_NAME_KEY, ScoredDocument};

/// Joins retrieved chunks, best first, into at most `max_chars` characters.
///
/// Each chunk gets a `[n] <file> (score s)` header. The chunk that crosses
/// the budget is truncated on a char boundary and nothing follows it.
pub fn build_context(hits: &[ScoredDocument], max_chars: usize) -> String {
    let mut out = String::new();
    let mut budget = max_chars;

    for (i, h) in hits.iter().enumerate() {
        let header = format!(
            "[{}] {} (score {:.3})\n",
            i + 1,
            h.document
                .metadata
                .get(FILE_NAME_KEY)
                .map(String::as_str)
                .unwrap_or("unknown"),
            h.score
        );
        if header.len() >= budget {
            break;
        }
        out.push_str(&header);
        budget -= header.len();

        let text = h.document.text.trim();
        let take = budget.saturating_sub(2);
        if text.len() > take {
            out.push_str(safe_truncate(text, take));
            out.push_str("\n…");
            break;
        }
        out.push_str(text);
        out.push_str("\n\n");
        budget = budget.saturating_sub(text.len() + 2);
    }

    out.trim_end().to_string()
}

fn safe_truncate(s: &str, max: usize) -> &str {
    if s.len() <= max {
        s
    } else {
        let mut end = max;
        while end > 0 && !s.is_char_boundary(end) {
            end -= 1;
        }
        &s[..end]
    }
}
