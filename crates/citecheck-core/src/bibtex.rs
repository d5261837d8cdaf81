use crate::authors::{first_author_family, format_authors_bibtex};
use crate::crossref::{CrossRefAuthor, CrossRefWork, derive_bibliography_year};

/// Fields of a generated BibTeX entry. Optional fields that are `None` are
/// left out of the entry entirely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BibtexRecord {
    pub entry_type: String,
    pub key: String,
    pub author: String,
    pub title: String,
    pub journal: Option<String>,
    pub year: Option<i32>,
    pub doi: Option<String>,
    pub url: Option<String>,
}

impl BibtexRecord {
    pub fn from_work(work: &CrossRefWork) -> Self {
        let year = derive_bibliography_year(work);
        Self {
            entry_type: map_work_type_to_bibtex_type(work.work_type.as_deref()).to_string(),
            key: generate_bibtex_key(&work.author, year),
            author: format_authors_bibtex(&work.author),
            title: work.display_title(),
            journal: work.journal().map(String::from),
            year,
            doi: work.doi.clone().filter(|d| !d.is_empty()),
            url: work.url.clone().filter(|u| !u.is_empty()),
        }
    }
}

/// Citation key: first author's surname, lowercased and stripped to `a-z`,
/// followed by the year or "nd".
pub fn generate_bibtex_key(authors: &[CrossRefAuthor], year: Option<i32>) -> String {
    let surname = first_author_family(authors).unwrap_or_else(|| "unknown".to_string());
    let clean: String = surname
        .to_lowercase()
        .chars()
        .filter(char::is_ascii_lowercase)
        .collect();
    match year {
        Some(y) => format!("{}{}", clean, y),
        None => format!("{}nd", clean),
    }
}

/// Map a CrossRef work type to a BibTeX entry type. Unknown types are
/// treated as articles.
pub fn map_work_type_to_bibtex_type(work_type: Option<&str>) -> &'static str {
    match work_type.unwrap_or("") {
        "journal-article" => "article",
        "book" => "book",
        "book-chapter" => "incollection",
        "proceedings-article" => "inproceedings",
        "dissertation" => "phdthesis",
        "report" => "techreport",
        "dataset" => "misc",
        _ => "article",
    }
}

pub fn build_bibtex(record: &BibtexRecord) -> String {
    let mut lines = vec![
        format!("@{}{{{},", record.entry_type, record.key),
        format!("  author = {{{}}},", record.author),
        format!("  title = {{{}}},", record.title),
    ];

    if let Some(journal) = &record.journal {
        lines.push(format!("  journal = {{{}}},", journal));
    }
    if let Some(year) = record.year {
        lines.push(format!("  year = {{{}}},", year));
    }
    if let Some(doi) = &record.doi {
        lines.push(format!("  doi = {{{}}},", doi));
    }
    if let Some(url) = &record.url {
        lines.push(format!("  url = {{{}}},", url));
    }

    lines.push("}".to_string());
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn author(given: &str, family: &str) -> CrossRefAuthor {
        CrossRefAuthor {
            given: Some(given.into()),
            family: Some(family.into()),
            name: None,
        }
    }

    fn record() -> BibtexRecord {
        BibtexRecord {
            entry_type: "article".into(),
            key: "smith2020".into(),
            author: "Smith, John".into(),
            title: "On Things".into(),
            journal: None,
            year: Some(2020),
            doi: Some("10.1000/xyz".into()),
            url: None,
        }
    }

    #[test]
    fn test_key() {
        assert_eq!(
            generate_bibtex_key(&[author("Jan", "O'Brien-Smith")], Some(2020)),
            "obriensmith2020"
        );
        assert_eq!(generate_bibtex_key(&[], None), "unknownnd");
        let named = CrossRefAuthor {
            name: Some("World Health Organization".into()),
            ..Default::default()
        };
        assert_eq!(generate_bibtex_key(&[named], Some(2011)), "organization2011");
    }

    #[test]
    fn test_type_map() {
        assert_eq!(map_work_type_to_bibtex_type(Some("book-chapter")), "incollection");
        assert_eq!(map_work_type_to_bibtex_type(Some("dissertation")), "phdthesis");
        assert_eq!(map_work_type_to_bibtex_type(Some("posted-content")), "article");
        assert_eq!(map_work_type_to_bibtex_type(None), "article");
    }

    #[test]
    fn test_absent_fields_are_omitted() {
        let bib = build_bibtex(&record());
        assert_eq!(
            bib,
            "@article{smith2020,\n  author = {Smith, John},\n  title = {On Things},\n  year = {2020},\n  doi = {10.1000/xyz},\n}"
        );
        assert!(!bib.contains("journal"));
        assert!(!bib.contains("url"));
    }

    #[test]
    fn test_all_fields() {
        let bib = build_bibtex(&BibtexRecord {
            journal: Some("Nature".into()),
            url: Some("https://example.org".into()),
            ..record()
        });
        assert!(bib.contains("  journal = {Nature},\n"));
        assert!(bib.contains("  url = {https://example.org},\n"));
        assert!(bib.ends_with("\n}"));
    }

    #[test]
    fn test_generated_entry_parses() {
        let bib = build_bibtex(&BibtexRecord {
            journal: Some("Nature".into()),
            ..record()
        });
        let parsed = biblatex::Bibliography::parse(&bib).unwrap();
        let entry = parsed.get("smith2020").unwrap();
        assert_eq!(entry.entry_type, biblatex::EntryType::Article);
        assert!(entry.get("journal").is_some());
        assert!(entry.get("doi").is_some());
        assert!(entry.get("url").is_none());
    }
}
