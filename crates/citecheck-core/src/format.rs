use once_cell::sync::Lazy;
use regex::Regex;

use crate::Citation;
use crate::authors::first_author_surname;
use crate::intext::NO_DATE;

static AND_SPLIT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\s+and\s+").unwrap());

/// Anchor id of a reference-list entry: `citation-<surname>-<year|nd>`.
///
/// The surname is the first author's, reduced to lowercase ASCII letters, so
/// "Smith, J." and "John Smith" give the same anchor. This is the only anchor
/// rule: [`Citation::anchor_id`] and rendered links both go through it.
pub fn generate_anchor_id(authors: &str, year: Option<i32>) -> String {
    let clean: String = first_author_surname(authors)
        .to_lowercase()
        .chars()
        .filter(char::is_ascii_lowercase)
        .collect();
    match year {
        Some(y) => format!("citation-{}-{}", clean, y),
        None => format!("citation-{}-nd", clean),
    }
}

/// One-line reference: `Authors (Year). Title. Journal.`
pub fn format_citation_display(citation: &Citation) -> String {
    let year_part = citation
        .year
        .map(|y| format!(" ({})", y))
        .unwrap_or_default();
    let journal_part = citation
        .journal
        .as_deref()
        .filter(|j| !j.is_empty())
        .map(|j| format!(" {}.", j))
        .unwrap_or_default();
    format!(
        "{}{}. {}.{}",
        citation.authors, year_part, citation.title, journal_part
    )
}

/// The in-text marker an editor should write for a citation.
///
/// One author gives `(Smith, 2020)`, two give `(Smith and Jones, 2020)`,
/// more give `(Smith et al., 2020)`. The result always resolves back to the
/// citation it was built from.
pub fn format_in_text_citation(citation: &Citation) -> String {
    let surname = citation.first_author_surname();
    let year = citation
        .year
        .map(|y| y.to_string())
        .unwrap_or_else(|| NO_DATE.to_string());

    match classify_authors(&citation.authors) {
        AuthorCount::One => format!("({}, {})", surname, year),
        AuthorCount::Two(second) => format!("({} and {}, {})", surname, second, year),
        AuthorCount::Many => format!("({} et al., {})", surname, year),
    }
}

enum AuthorCount<'a> {
    One,
    Two(&'a str),
    Many,
}

/// Count authors in a Harvard display string. Each Harvard author carries
/// at most one comma ("Smith, J."), so a first " and "-part with more than
/// one comma holds several authors.
fn classify_authors(authors: &str) -> AuthorCount<'_> {
    if authors.to_lowercase().contains("et al") {
        return AuthorCount::Many;
    }
    let parts: Vec<&str> = AND_SPLIT_RE.split(authors.trim()).collect();
    match parts.as_slice() {
        [_] => AuthorCount::One,
        [first, second] if first.matches(',').count() <= 1 => {
            AuthorCount::Two(first_author_surname(second))
        }
        _ => AuthorCount::Many,
    }
}
