use once_cell::sync::Lazy;
use regex::Regex;

use crate::crossref::CrossRefAuthor;

/// Separators between given-name parts ("Jean-Paul", "Mary Ann").
static GIVEN_NAME_SPLIT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\s-]+").unwrap());

/// Reduce a given name to initials: "John Paul" → "J.P.", "Jean-Luc" → "J.L.".
pub fn initials(given: &str) -> String {
    GIVEN_NAME_SPLIT_RE
        .split(given.trim())
        .filter_map(|part| part.chars().next())
        .map(|c| format!("{}.", c.to_uppercase()))
        .collect()
}

/// Format a single author in Harvard style ("Surname, I.").
///
/// A bare `name` is split on spaces: the last token is the surname and the
/// rest become initials. A single-token `name` (e.g. a consortium) is used
/// as is.
pub fn format_harvard_author(author: &CrossRefAuthor) -> String {
    if let Some(name) = non_empty(author.name.as_deref()) {
        let parts: Vec<&str> = name.split_whitespace().collect();
        if let Some((last, rest)) = parts.split_last()
            && !rest.is_empty()
        {
            let initials: String = rest
                .iter()
                .filter_map(|p| p.chars().next())
                .map(|c| format!("{}.", c.to_uppercase()))
                .collect();
            return format!("{}, {}", last, initials);
        }
        return name.to_string();
    }

    let family = author.family.as_deref().unwrap_or("").trim();
    let initials = author.given.as_deref().map(initials).unwrap_or_default();
    if initials.is_empty() {
        family.to_string()
    } else {
        format!("{}, {}", family, initials)
    }
}

/// Join authors into the Harvard display string stored on a citation.
///
/// Two authors are joined by " and "; longer lists comma-join all but the
/// last, which follows " and " (no serial comma).
pub fn format_authors_harvard(authors: &[CrossRefAuthor]) -> String {
    let formatted: Vec<String> = authors.iter().map(format_harvard_author).collect();
    match formatted.as_slice() {
        [] => String::new(),
        [only] => only.clone(),
        [first, second] => format!("{} and {}", first, second),
        [init @ .., last] => format!("{} and {}", init.join(", "), last),
    }
}

/// Authors as written in a BibTeX `author` field: "Family, Given and ...".
pub fn format_authors_bibtex(authors: &[CrossRefAuthor]) -> String {
    authors
        .iter()
        .map(|author| {
            if let Some(name) = non_empty(author.name.as_deref()) {
                return name.to_string();
            }
            [author.family.as_deref(), author.given.as_deref()]
                .into_iter()
                .flatten()
                .filter(|p| !p.is_empty())
                .collect::<Vec<_>>()
                .join(", ")
        })
        .collect::<Vec<_>>()
        .join(" and ")
}

/// Surname of the first structured author: `family`, else the last token of
/// `name`.
pub fn first_author_family(authors: &[CrossRefAuthor]) -> Option<String> {
    let first = authors.first()?;
    non_empty(first.family.as_deref())
        .or_else(|| {
            non_empty(first.name.as_deref()).and_then(|n| n.split_whitespace().next_back())
        })
        .map(String::from)
}

/// Heuristic surname of the first author in a flattened authors string.
///
/// Takes the text before the first comma and returns its last space-delimited
/// word, so "Smith, J. and Jones, K." and "John Smith" both yield "Smith".
pub fn first_author_surname(authors: &str) -> &str {
    let first = authors.split(',').next().unwrap_or("").trim();
    first
        .rsplit(' ')
        .next()
        .filter(|s| !s.is_empty())
        .unwrap_or(first)
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person(given: &str, family: &str) -> CrossRefAuthor {
        CrossRefAuthor {
            given: Some(given.into()),
            family: Some(family.into()),
            name: None,
        }
    }

    fn named(name: &str) -> CrossRefAuthor {
        CrossRefAuthor {
            given: None,
            family: None,
            name: Some(name.into()),
        }
    }

    #[test]
    fn test_initials() {
        assert_eq!(initials("John"), "J.");
        assert_eq!(initials("nathan j. l."), "N.J.L.");
        assert_eq!(initials("Jean-Luc"), "J.L.");
        assert_eq!(initials(""), "");
    }

    #[test]
    fn test_single_author() {
        assert_eq!(
            format_authors_harvard(&[person("John", "Smith")]),
            "Smith, J."
        );
    }

    #[test]
    fn test_family_without_given() {
        assert_eq!(
            format_harvard_author(&CrossRefAuthor {
                given: None,
                family: Some("Smith".into()),
                name: None,
            }),
            "Smith"
        );
    }

    #[test]
    fn test_bare_name() {
        assert_eq!(format_harvard_author(&named("Ada Byron Lovelace")), "Lovelace, A.B.");
        assert_eq!(format_harvard_author(&named("IPCC")), "IPCC");
    }

    #[test]
    fn test_two_and_many_authors() {
        assert_eq!(
            format_authors_harvard(&[person("John", "Smith"), person("Kate", "Jones")]),
            "Smith, J. and Jones, K."
        );
        assert_eq!(
            format_authors_harvard(&[
                person("John", "Smith"),
                person("Kate", "Jones"),
                person("Li", "Wei"),
            ]),
            "Smith, J., Jones, K. and Wei, L."
        );
        assert_eq!(format_authors_harvard(&[]), "");
    }

    #[test]
    fn test_bibtex_authors() {
        assert_eq!(
            format_authors_bibtex(&[person("John", "Smith"), named("IPCC")]),
            "Smith, John and IPCC"
        );
    }

    #[test]
    fn test_first_author_family() {
        assert_eq!(
            first_author_family(&[person("John", "Smith")]).as_deref(),
            Some("Smith")
        );
        assert_eq!(
            first_author_family(&[named("Grace Hopper")]).as_deref(),
            Some("Hopper")
        );
        assert_eq!(first_author_family(&[]), None);
    }

    #[test]
    fn test_first_author_surname() {
        assert_eq!(first_author_surname("Smith, J. and Jones, K."), "Smith");
        assert_eq!(first_author_surname("John Smith"), "Smith");
        assert_eq!(first_author_surname("Lenssen, N. J. L. et al."), "Lenssen");
        assert_eq!(first_author_surname(""), "");
    }
}
