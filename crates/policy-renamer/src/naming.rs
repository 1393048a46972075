//! Policy name extraction from first-page text.
//!
//! The concept is whatever follows the literal phrase `Póliza de`, up to the
//! word `correspondiente` or the end of the text. Matching is
//! case-insensitive; the phrase itself is fixed.

use std::sync::LazyLock;

use regex::Regex;

use crate::store::Outcome;

/// `.` does not cross newlines and `$` anchors at the end of the text.
static CONCEPT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)Póliza de\s+(.*?)(?:\s+correspondiente|$)")
        .expect("concept pattern is a valid regex")
});

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern is a valid regex"));

/// Characters that cannot appear in exported file names.
const FORBIDDEN_CHARS: &[char] = &['/', '\\', '?', '%', '*', ':', '|', '"', '<', '>'];

const PDF_EXTENSION: &str = ".pdf";

/// Finds the policy concept in `text`.
///
/// Returns `None` when the phrase is absent or captures nothing but
/// whitespace.
pub fn find_concept(text: &str) -> Option<String> {
    let captured = CONCEPT_PATTERN.captures(text)?.get(1)?.as_str();
    let concept = WHITESPACE_RUN.replace_all(captured.trim(), " ");

    if concept.is_empty() {
        None
    } else {
        Some(concept.into_owned())
    }
}

/// Replaces every forbidden character with a hyphen.
pub fn sanitize_concept(concept: &str) -> String {
    concept
        .chars()
        .map(|c| if FORBIDDEN_CHARS.contains(&c) { '-' } else { c })
        .collect()
}

/// Builds the export name for a concept: sanitized, with a `.pdf` suffix.
pub fn export_name(concept: &str) -> String {
    format!("{}{}", sanitize_concept(concept), PDF_EXTENSION)
}

/// Maps first-page text to a processing outcome. A miss is not an error.
pub fn outcome_for_text(text: &str) -> Outcome {
    match find_concept(text) {
        Some(concept) => Outcome::Renamed {
            derived_name: export_name(&concept),
            concept,
        },
        None => Outcome::Unmatched,
    }
}
