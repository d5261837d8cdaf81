//! CrossRef `works` metadata and its conversion into citation rows.

use serde::{Deserialize, Serialize};

use crate::NewCitation;
use crate::authors::{first_author_family, format_authors_harvard};
use crate::bibtex::{BibtexRecord, build_bibtex};
use crate::doi::clean_doi;

/// Envelope returned by `GET /works/{doi}`.
#[derive(Debug, Clone, Deserialize)]
pub struct CrossRefResponse {
    pub message: CrossRefWork,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossRefAuthor {
    #[serde(default)]
    pub given: Option<String>,
    #[serde(default)]
    pub family: Option<String>,
    /// Organisational or unsplit author name.
    #[serde(default)]
    pub name: Option<String>,
}

/// A CrossRef date: `{"date-parts": [[2019, 3, 14]]}`. Parts may be null.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DateParts {
    #[serde(rename = "date-parts", default)]
    pub date_parts: Vec<Vec<Option<i32>>>,
}

impl DateParts {
    pub fn year(&self) -> Option<i32> {
        self.date_parts.first()?.first().copied().flatten()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CrossRefWork {
    #[serde(default)]
    pub title: Vec<String>,
    #[serde(default)]
    pub author: Vec<CrossRefAuthor>,
    #[serde(rename = "container-title", default)]
    pub container_title: Vec<String>,
    #[serde(default)]
    pub published: Option<DateParts>,
    #[serde(rename = "published-print", default)]
    pub published_print: Option<DateParts>,
    #[serde(rename = "published-online", default)]
    pub published_online: Option<DateParts>,
    #[serde(rename = "URL", default)]
    pub url: Option<String>,
    #[serde(rename = "DOI", default)]
    pub doi: Option<String>,
    #[serde(rename = "type", default)]
    pub work_type: Option<String>,
}

impl CrossRefWork {
    /// First title, or "Untitled".
    pub fn display_title(&self) -> String {
        first_non_empty(&self.title).unwrap_or("Untitled").to_string()
    }

    pub fn journal(&self) -> Option<&str> {
        first_non_empty(&self.container_title)
    }
}

/// Publication year: `published`, then `published-print`, then
/// `published-online`. `None` means the work is cited as "n.d.".
pub fn derive_bibliography_year(work: &CrossRefWork) -> Option<i32> {
    [
        work.published.as_ref(),
        work.published_print.as_ref(),
        work.published_online.as_ref(),
    ]
    .into_iter()
    .flatten()
    .find_map(DateParts::year)
}

/// Display author for works CrossRef lists without any author.
pub const ANONYMOUS_AUTHOR: &str = "Anonymous";

/// Build a citation row from CrossRef metadata.
///
/// `requested_doi` is the DOI the user asked for; it is stored cleaned, and
/// the BibTeX record falls back to it when the response carries no `DOI`.
/// A work without authors is attributed to [`ANONYMOUS_AUTHOR`].
pub fn citation_from_work(work: &CrossRefWork, requested_doi: &str) -> NewCitation {
    let doi = clean_doi(requested_doi);
    let mut record = BibtexRecord::from_work(work);
    if record.doi.is_none() && !doi.is_empty() {
        record.doi = Some(doi.clone());
    }

    NewCitation {
        title: work.display_title(),
        authors: Some(format_authors_harvard(&work.author))
            .filter(|a| !a.trim().is_empty())
            .unwrap_or_else(|| ANONYMOUS_AUTHOR.to_string()),
        journal: work.journal().map(String::from),
        year: derive_bibliography_year(work),
        url: work.url.clone().filter(|u| !u.is_empty()),
        doi,
        bibtex: build_bibtex(&record),
        first_author_family: first_author_family(&work.author),
    }
}

fn first_non_empty(values: &[String]) -> Option<&str> {
    values
        .first()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
}
