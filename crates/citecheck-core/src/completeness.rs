use serde::{Deserialize, Serialize};

use crate::Citation;
use crate::intext::parse_in_text_markers;
use crate::matching::match_in_text_marker;

/// Number of references, and of matched in-text citations, an answer needs
/// before it counts as complete.
pub const REQUIRED_CITATIONS: usize = 3;

/// Number of in-text markers in `answer` that resolve to a citation.
///
/// Capped at `citations.len()`: citing the same reference twice does not
/// count as two references.
pub fn count_matched(answer: &str, citations: &[Citation]) -> usize {
    let markers = parse_in_text_markers(answer);
    let matched = markers
        .iter()
        .filter(|m| match_in_text_marker(m, citations).is_some())
        .count();
    tracing::debug!(
        markers = markers.len(),
        matched,
        citations = citations.len(),
        "counted in-text citations"
    );
    matched.min(citations.len())
}

pub fn is_complete(citation_count: usize, matched_count: usize) -> bool {
    citation_count >= REQUIRED_CITATIONS && matched_count >= REQUIRED_CITATIONS
}

/// The derived fields stored on a question. Recompute whenever the answer
/// text or the citation list changes and persist all three together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedCounts {
    pub citation_count: usize,
    pub in_text_citation_count: usize,
    pub is_complete: bool,
}

/// What is still missing before an answer is complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Outstanding {
    pub citations_needed: usize,
    pub in_text_needed: usize,
}

impl Outstanding {
    pub fn is_empty(&self) -> bool {
        self.citations_needed == 0 && self.in_text_needed == 0
    }
}

impl DerivedCounts {
    pub fn outstanding(&self) -> Outstanding {
        Outstanding {
            citations_needed: REQUIRED_CITATIONS.saturating_sub(self.citation_count),
            in_text_needed: REQUIRED_CITATIONS.saturating_sub(self.in_text_citation_count),
        }
    }
}

pub fn recompute(answer: &str, citations: &[Citation]) -> DerivedCounts {
    let citation_count = citations.len();
    let in_text_citation_count = count_matched(answer, citations);
    DerivedCounts {
        citation_count,
        in_text_citation_count,
        is_complete: is_complete(citation_count, in_text_citation_count),
    }
}
