//! Harvard-style in-text citation markers: `(Smith, 2023)`,
//! `(Smith and Jones, 2020)`, `(Jones et al., 2021)`, `(Smith, n.d.)`.

use std::ops::Range;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

/// Year token used for undated works.
pub const NO_DATE: &str = "n.d.";

/// One marker in running text. Group 1 is the author token, group 2 the year.
static MARKER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\(([^,)]+(?:\s+(?:and\s+[^,)]+|et\s+al\.))?),\s*([0-9]{4}|n\.d\.)\)").unwrap()
});

/// A string that is exactly one marker.
static SINGLE_MARKER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\(([^,]+(?:\s+(?:and\s+[^,]+|et\s+al\.))?),\s*([0-9]{4}|n\.d\.)\)$").unwrap()
});

/// An in-text citation found in answer text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InTextCitationMarker {
    /// The matched text including parentheses.
    pub raw_text: String,
    pub author_token: String,
    /// Four digits, or `"n.d."`.
    pub year_token: String,
    /// Byte range of `raw_text` in the scanned text.
    pub span: Range<usize>,
}

impl InTextCitationMarker {
    /// Numeric year, or `None` for `n.d.` and unparseable tokens.
    pub fn year(&self) -> Option<i32> {
        if self.year_token == NO_DATE {
            None
        } else {
            self.year_token.parse().ok()
        }
    }
}

/// Answer text split into plain runs and citation markers, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Text(String),
    Citation(InTextCitationMarker),
}

impl Segment {
    /// The source text this segment covers.
    pub fn as_str(&self) -> &str {
        match self {
            Segment::Text(text) => text,
            Segment::Citation(marker) => &marker.raw_text,
        }
    }
}

/// Scan `text` left to right for non-overlapping citation markers.
pub fn parse_in_text_markers(text: &str) -> Vec<InTextCitationMarker> {
    MARKER_RE
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            Some(InTextCitationMarker {
                raw_text: whole.as_str().to_string(),
                author_token: caps.get(1)?.as_str().to_string(),
                year_token: caps.get(2)?.as_str().to_string(),
                span: whole.range(),
            })
        })
        .collect()
}

/// Split `text` into interleaved text and citation segments.
///
/// Gaps between markers are kept verbatim, so concatenating the segments
/// reproduces the input. Empty gaps produce no segment.
pub fn segment_answer(text: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut last = 0;

    for marker in parse_in_text_markers(text) {
        if marker.span.start > last {
            segments.push(Segment::Text(text[last..marker.span.start].to_string()));
        }
        last = marker.span.end;
        segments.push(Segment::Citation(marker));
    }

    if last < text.len() {
        segments.push(Segment::Text(text[last..].to_string()));
    }
    segments
}

/// Parse a string holding exactly one marker into `(authors, year)`.
pub fn parse_single_marker(text: &str) -> Option<(String, String)> {
    let caps = SINGLE_MARKER_RE.captures(text)?;
    Some((
        caps.get(1)?.as_str().trim().to_string(),
        caps.get(2)?.as_str().to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(text: &str) -> Vec<(String, String)> {
        parse_in_text_markers(text)
            .into_iter()
            .map(|m| (m.author_token, m.year_token))
            .collect()
    }

    fn pair(a: &str, y: &str) -> (String, String) {
        (a.to_string(), y.to_string())
    }

    #[test]
    fn test_no_markers() {
        assert!(parse_in_text_markers("").is_empty());
        assert!(parse_in_text_markers("Warming is unequivocal.").is_empty());
        assert!(parse_in_text_markers("see (figure 2) and (2020)").is_empty());
        assert!(parse_in_text_markers("(Smith, 20201)").is_empty());
        assert!(parse_in_text_markers("(Smith 2020)").is_empty());
    }

    #[test]
    fn test_basic_forms() {
        assert_eq!(
            tokens("(Smith, 2023) and (Jones et al., 2021)"),
            vec![pair("Smith", "2023"), pair("Jones et al.", "2021")]
        );
        assert_eq!(
            tokens("as shown (Smith and Jones,2020)."),
            vec![pair("Smith and Jones", "2020")]
        );
        assert_eq!(tokens("(IPCC, n.d.)"), vec![pair("IPCC", "n.d.")]);
    }

    #[test]
    fn test_multi_word_authors() {
        assert_eq!(
            tokens("(van der Berg, 2019)"),
            vec![pair("van der Berg", "2019")]
        );
    }

    #[test]
    fn test_spans_and_raw_text() {
        let text = "A (Smith, 2023) b.";
        let markers = parse_in_text_markers(text);
        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].raw_text, "(Smith, 2023)");
        assert_eq!(&text[markers[0].span.clone()], "(Smith, 2023)");
        assert_eq!(markers[0].year(), Some(2023));
    }

    #[test]
    fn test_year_of_undated_marker() {
        let markers = parse_in_text_markers("(Smith, n.d.)");
        assert_eq!(markers[0].year(), None);
    }

    #[test]
    fn test_repeated_scans_are_identical() {
        let text = "x (A, 2001) y (B et al., 2002) z";
        assert_eq!(parse_in_text_markers(text), parse_in_text_markers(text));
    }

    #[test]
    fn test_segments_reassemble_input() {
        let text = "Start (Smith, 2023) middle (Jones et al., 2021)(Lee, n.d.) end";
        let segments = segment_answer(text);
        let rebuilt: String = segments.iter().map(Segment::as_str).collect();
        assert_eq!(rebuilt, text);
        assert_eq!(segments.len(), 6);
        assert!(matches!(segments[0], Segment::Text(ref t) if t == "Start "));
        assert!(matches!(segments[3], Segment::Citation(_)));
        assert!(matches!(segments[4], Segment::Citation(_)));
        assert!(matches!(segments[5], Segment::Text(ref t) if t == " end"));
    }

    #[test]
    fn test_segments_of_plain_and_empty_text() {
        assert!(segment_answer("").is_empty());
        assert_eq!(
            segment_answer("no citations"),
            vec![Segment::Text("no citations".into())]
        );
    }

    #[test]
    fn test_single_marker() {
        assert_eq!(
            parse_single_marker("(Smith and Jones, 2020)"),
            Some(pair("Smith and Jones", "2020"))
        );
        assert_eq!(parse_single_marker("(Smith, 2020) extra"), None);
        assert_eq!(parse_single_marker("Smith, 2020"), None);
    }
}
