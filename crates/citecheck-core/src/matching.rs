use once_cell::sync::Lazy;
use regex::Regex;

use crate::Citation;
use crate::intext::{InTextCitationMarker, NO_DATE, Segment, segment_answer};

/// " et al." (the trailing period is optional when stripping).
static ET_AL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\s+et\s+al\.?").unwrap());

/// " and <rest>" up to the end of the line.
static AND_TAIL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\s+and\s+.*").unwrap());

static AND_SPLIT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\s+and\s+").unwrap());

/// How a marker's author token is compared against a citation.
#[derive(Debug, Clone, PartialEq, Eq)]
enum AuthorPolicy {
    /// "Jones et al.": first-author surname must match.
    EtAl { surname: String },
    /// "Smith and Jones": first surname must match, the second must occur
    /// somewhere in the citation's authors.
    TwoAuthors { first: String, second: String },
    /// Anything else: first-author surname must match.
    Single { surname: String },
}

impl AuthorPolicy {
    fn from_token(author_token: &str) -> Self {
        let lowered = author_token.to_lowercase();

        if lowered.contains("et al.") {
            return AuthorPolicy::EtAl {
                surname: clean_author_token(author_token),
            };
        }

        let parts: Vec<&str> = AND_SPLIT_RE.split(&lowered).collect();
        if let [first, second] = parts.as_slice() {
            return AuthorPolicy::TwoAuthors {
                first: first.trim().to_string(),
                second: second.trim().to_string(),
            };
        }

        AuthorPolicy::Single {
            surname: clean_author_token(author_token),
        }
    }

    fn matches(&self, citation: &Citation) -> bool {
        match self {
            AuthorPolicy::EtAl { surname } | AuthorPolicy::Single { surname } => {
                citation.has_first_author(surname)
            }
            // Weak by construction: a short second name can occur inside an
            // unrelated author's name.
            AuthorPolicy::TwoAuthors { first, second } => {
                citation.has_first_author(first)
                    && citation.authors.to_lowercase().contains(second.as_str())
            }
        }
    }
}

/// Strip "et al." and any trailing "and ..." clause, then lowercase.
fn clean_author_token(author_token: &str) -> String {
    let without_et_al = ET_AL_RE.replace(author_token, "");
    AND_TAIL_RE
        .replace(&without_et_al, "")
        .trim()
        .to_lowercase()
}

/// Year a marker asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum YearQuery {
    NoDate,
    Year(i32),
    /// Not a year; matches nothing.
    Invalid,
}

impl YearQuery {
    fn from_token(year_token: &str) -> Self {
        let token = year_token.trim();
        if token == NO_DATE {
            return YearQuery::NoDate;
        }
        token.parse().map(YearQuery::Year).unwrap_or(YearQuery::Invalid)
    }

    fn matches(self, year: Option<i32>) -> bool {
        match (self, year) {
            (YearQuery::NoDate, None) => true,
            (YearQuery::Year(wanted), Some(y)) => wanted == y,
            _ => false,
        }
    }
}

/// Find the citation an in-text marker refers to.
///
/// Citations are checked in list order and the first match wins.
pub fn match_marker<'c>(
    author_token: &str,
    year_token: &str,
    citations: &'c [Citation],
) -> Option<&'c Citation> {
    let policy = AuthorPolicy::from_token(author_token);
    let year = YearQuery::from_token(year_token);

    let found = citations
        .iter()
        .find(|c| year.matches(c.year) && policy.matches(c));

    tracing::trace!(
        author = author_token,
        year = year_token,
        ?policy,
        matched = found.map(|c| c.id.as_str()),
        "resolved in-text citation"
    );
    found
}

pub fn match_in_text_marker<'c>(
    marker: &InTextCitationMarker,
    citations: &'c [Citation],
) -> Option<&'c Citation> {
    match_marker(&marker.author_token, &marker.year_token, citations)
}

/// A display segment with its citation resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderedSegment<'c> {
    Text(String),
    /// Rendered as a link to `#anchor_id`.
    Linked {
        marker: InTextCitationMarker,
        citation: &'c Citation,
        anchor_id: String,
    },
    /// Rendered as muted text.
    Unmatched(InTextCitationMarker),
}

impl RenderedSegment<'_> {
    pub fn as_str(&self) -> &str {
        match self {
            RenderedSegment::Text(text) => text,
            RenderedSegment::Linked { marker, .. } | RenderedSegment::Unmatched(marker) => {
                &marker.raw_text
            }
        }
    }
}

/// Segment answer text and resolve each marker against `citations`.
pub fn resolve_segments<'c>(text: &str, citations: &'c [Citation]) -> Vec<RenderedSegment<'c>> {
    segment_answer(text)
        .into_iter()
        .map(|segment| match segment {
            Segment::Text(text) => RenderedSegment::Text(text),
            Segment::Citation(marker) => match match_in_text_marker(&marker, citations) {
                Some(citation) => RenderedSegment::Linked {
                    anchor_id: citation.anchor_id(),
                    citation,
                    marker,
                },
                None => RenderedSegment::Unmatched(marker),
            },
        })
        .collect()
}
