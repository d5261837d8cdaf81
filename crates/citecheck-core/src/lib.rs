use std::time::Duration;

use serde::{Deserialize, Serialize};

pub mod authors;
pub mod bibtex;
pub mod completeness;
pub mod config_file;
pub mod consensus;
pub mod crossref;
pub mod doi;
pub mod format;
pub mod intext;
pub mod library;
pub mod matching;

// Re-export for convenience
pub use completeness::{
    DerivedCounts, Outstanding, REQUIRED_CITATIONS, count_matched, is_complete, recompute,
};
pub use doi::{CrossRefClient, LookupError, clean_doi, is_valid_doi};
pub use format::generate_anchor_id;
pub use intext::{InTextCitationMarker, Segment, parse_in_text_markers, segment_answer};
pub use library::{CitationList, CitationListError};
pub use matching::{RenderedSegment, match_in_text_marker, match_marker, resolve_segments};

/// A reference attached to a question.
///
/// `authors` is the Harvard display string ("Smith, J. and Jones, K."). When the
/// citation was built from structured metadata, `first_author_family` carries
/// the first author's full surname ("van der Berg"). Matching accepts it next
/// to the surname derived from `authors`; anchor ids only use the latter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub question_id: String,
    pub doi: String,
    #[serde(default)]
    pub bibtex: String,
    pub title: String,
    pub authors: String,
    #[serde(default)]
    pub journal: Option<String>,
    /// `None` means "no date" (cited as `n.d.`).
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_author_family: Option<String>,
}

impl Citation {
    /// Attach storage identity to a freshly looked-up citation.
    pub fn from_new(
        new: NewCitation,
        id: impl Into<String>,
        question_id: impl Into<String>,
        created_at: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            question_id: question_id.into(),
            doi: new.doi,
            bibtex: new.bibtex,
            title: new.title,
            authors: new.authors,
            journal: new.journal,
            year: new.year,
            url: new.url,
            created_at: created_at.into(),
            first_author_family: new.first_author_family,
        }
    }

    /// Surname of the first author, preferring the structured field. Used for
    /// suggested in-text markers.
    pub fn first_author_surname(&self) -> &str {
        match self.first_author_family.as_deref() {
            Some(family) if !family.trim().is_empty() => family.trim(),
            _ => authors::first_author_surname(&self.authors),
        }
    }

    /// Anchor id of this citation's entry in the rendered reference list.
    pub fn anchor_id(&self) -> String {
        format::generate_anchor_id(&self.authors, self.year)
    }

    /// Whether `wanted` (lowercased) names this citation's first author,
    /// either by the surname derived from `authors` or by the structured
    /// family name.
    pub fn has_first_author(&self, wanted: &str) -> bool {
        if wanted.is_empty() {
            return false;
        }
        let derived = authors::first_author_surname(&self.authors).to_lowercase();
        let family = self
            .first_author_family
            .as_deref()
            .map(|f| f.trim().to_lowercase())
            .filter(|f| !f.is_empty());
        derived == wanted || family.as_deref() == Some(wanted)
    }
}

/// A citation built from bibliographic metadata, before it is stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCitation {
    pub title: String,
    pub authors: String,
    pub journal: Option<String>,
    pub year: Option<i32>,
    pub url: Option<String>,
    pub doi: String,
    pub bibtex: String,
    pub first_author_family: Option<String>,
}

/// Default CrossRef REST endpoint.
pub const DEFAULT_CROSSREF_BASE_URL: &str = "https://api.crossref.org";

/// Configuration for the CrossRef lookup client.
#[derive(Clone)]
pub struct Config {
    pub crossref_base_url: String,
    /// Contact address sent in the user agent ("polite pool").
    pub crossref_mailto: Option<String>,
    pub timeout_secs: u64,
}

impl Config {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Fill unset fields from an on-disk config file.
    pub fn apply_file(mut self, file: &config_file::ConfigFile) -> Self {
        if let Some(crossref) = &file.crossref {
            if let Some(url) = &crossref.base_url {
                self.crossref_base_url = url.clone();
            }
            if let Some(mailto) = &crossref.mailto {
                self.crossref_mailto = Some(mailto.clone());
            }
            if let Some(secs) = crossref.timeout_secs {
                self.timeout_secs = secs;
            }
        }
        self
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("crossref_base_url", &self.crossref_base_url)
            .field(
                "crossref_mailto",
                &self.crossref_mailto.as_ref().map(|_| "***"),
            )
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            crossref_base_url: DEFAULT_CROSSREF_BASE_URL.to_string(),
            crossref_mailto: None,
            timeout_secs: 10,
        }
    }
}
