use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Citation;
use crate::doi::clean_doi;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CitationListError {
    #[error("this citation has already been added (DOI {doi})")]
    Duplicate { doi: String },
}

impl CitationListError {
    pub fn kind(&self) -> &'static str {
        match self {
            CitationListError::Duplicate { .. } => "duplicate-citation",
        }
    }
}

/// The reference list of one question, in insertion order.
///
/// Matching resolves ties to the earliest entry, so order is significant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CitationList {
    citations: Vec<Citation>,
}

impl CitationList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap rows already ordered by creation time. Duplicates are kept as
    /// given.
    pub fn from_rows(citations: Vec<Citation>) -> Self {
        Self { citations }
    }

    pub fn as_slice(&self) -> &[Citation] {
        &self.citations
    }

    pub fn len(&self) -> usize {
        self.citations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.citations.is_empty()
    }

    pub fn contains_doi(&self, doi: &str) -> bool {
        let wanted = clean_doi(doi).to_lowercase();
        self.citations
            .iter()
            .any(|c| clean_doi(&c.doi).to_lowercase() == wanted)
    }

    /// Append a citation; DOIs are unique per list (case-insensitive).
    pub fn insert(&mut self, citation: Citation) -> Result<&Citation, CitationListError> {
        if self.contains_doi(&citation.doi) {
            tracing::debug!(doi = %citation.doi, "rejecting duplicate citation");
            return Err(CitationListError::Duplicate {
                doi: clean_doi(&citation.doi),
            });
        }
        self.citations.push(citation);
        Ok(&self.citations[self.citations.len() - 1])
    }

    /// Remove the citation with this id, returning it.
    pub fn remove(&mut self, id: &str) -> Option<Citation> {
        let pos = self.citations.iter().position(|c| c.id == id)?;
        Some(self.citations.remove(pos))
    }
}
