use std::io::Write;

use citecheck_core::format::{format_citation_display, format_in_text_citation};
use citecheck_core::{Citation, DerivedCounts, REQUIRED_CITATIONS, RenderedSegment};
use owo_colors::OwoColorize;

/// Whether to use colored output.
#[derive(Debug, Clone, Copy)]
pub struct ColorMode(pub bool);

impl ColorMode {
    pub fn enabled(&self) -> bool {
        self.0
    }
}

/// Print one line per in-text marker with the reference it resolved to.
pub fn print_marker_report(
    w: &mut dyn Write,
    segments: &[RenderedSegment<'_>],
    color: ColorMode,
) -> std::io::Result<()> {
    let markers: Vec<&RenderedSegment<'_>> = segments
        .iter()
        .filter(|s| !matches!(s, RenderedSegment::Text(_)))
        .collect();

    if markers.is_empty() {
        writeln!(w, "No in-text citations found.")?;
        writeln!(w)?;
        return Ok(());
    }

    writeln!(w, "Found {} in-text citations", markers.len())?;
    for (i, segment) in markers.iter().enumerate() {
        let idx = i + 1;
        match segment {
            RenderedSegment::Linked {
                marker, anchor_id, ..
            } => {
                if color.enabled() {
                    writeln!(
                        w,
                        "[{}] {} -> {} (#{})",
                        idx,
                        marker.raw_text.cyan(),
                        "MATCHED".green(),
                        anchor_id
                    )?;
                } else {
                    writeln!(w, "[{}] {} -> MATCHED (#{})", idx, marker.raw_text, anchor_id)?;
                }
            }
            RenderedSegment::Unmatched(marker) => {
                if color.enabled() {
                    writeln!(
                        w,
                        "[{}] {} -> {}",
                        idx,
                        marker.raw_text.cyan(),
                        "UNMATCHED".red()
                    )?;
                } else {
                    writeln!(w, "[{}] {} -> UNMATCHED", idx, marker.raw_text)?;
                }
            }
            RenderedSegment::Text(_) => {}
        }
    }
    writeln!(w)?;
    Ok(())
}

/// Print the derived counts and what is still missing.
pub fn print_completeness(
    w: &mut dyn Write,
    derived: &DerivedCounts,
    color: ColorMode,
) -> std::io::Result<()> {
    let sep = "=".repeat(60);
    if color.enabled() {
        writeln!(w, "{}", sep.bold())?;
        writeln!(w, "{}", "SUMMARY".bold())?;
        writeln!(w, "{}", sep.bold())?;
    } else {
        writeln!(w, "{}", sep)?;
        writeln!(w, "SUMMARY")?;
        writeln!(w, "{}", sep)?;
    }

    writeln!(
        w,
        "  References: {}/{}",
        derived.citation_count, REQUIRED_CITATIONS
    )?;
    writeln!(
        w,
        "  Matched in-text citations: {}/{}",
        derived.in_text_citation_count, REQUIRED_CITATIONS
    )?;
    writeln!(w)?;

    if derived.is_complete {
        if color.enabled() {
            writeln!(w, "  {}", "COMPLETE".green().bold())?;
        } else {
            writeln!(w, "  COMPLETE")?;
        }
        return Ok(());
    }

    if color.enabled() {
        writeln!(w, "  {}", "INCOMPLETE".yellow().bold())?;
    } else {
        writeln!(w, "  INCOMPLETE")?;
    }
    let outstanding = derived.outstanding();
    if outstanding.citations_needed > 0 {
        writeln!(
            w,
            "  Add {} more {}",
            outstanding.citations_needed,
            plural(outstanding.citations_needed, "reference", "references")
        )?;
    }
    if outstanding.in_text_needed > 0 {
        writeln!(
            w,
            "  Cite {} more {} in the answer text",
            outstanding.in_text_needed,
            plural(outstanding.in_text_needed, "reference", "references")
        )?;
    }
    Ok(())
}

/// Print a looked-up citation as a reference line.
pub fn print_citation(w: &mut dyn Write, citation: &Citation, color: ColorMode) -> std::io::Result<()> {
    let line = format_citation_display(citation);
    if color.enabled() {
        writeln!(w, "{}", line.cyan())?;
        writeln!(w, "{} https://doi.org/{}", "DOI:".bold(), citation.doi)?;
        writeln!(w, "{} {}", "Cite as:".bold(), format_in_text_citation(citation))?;
    } else {
        writeln!(w, "{}", line)?;
        writeln!(w, "DOI: https://doi.org/{}", citation.doi)?;
        writeln!(w, "Cite as: {}", format_in_text_citation(citation))?;
    }
    Ok(())
}

pub fn print_added(
    w: &mut dyn Write,
    citation: &Citation,
    total: usize,
    color: ColorMode,
) -> std::io::Result<()> {
    if color.enabled() {
        writeln!(w, "{} {}", "Added".green(), format_citation_display(citation))?;
    } else {
        writeln!(w, "Added {}", format_citation_display(citation))?;
    }
    writeln!(
        w,
        "Cite as {} ({} {} in list)",
        format_in_text_citation(citation),
        total,
        plural(total, "reference", "references")
    )?;
    Ok(())
}

/// Print the in-text marker and anchor id for every citation.
pub fn print_suggestions(
    w: &mut dyn Write,
    citations: &[Citation],
    color: ColorMode,
) -> std::io::Result<()> {
    if citations.is_empty() {
        writeln!(w, "Citation list is empty.")?;
        return Ok(());
    }
    for citation in citations {
        let marker = format_in_text_citation(citation);
        if color.enabled() {
            writeln!(
                w,
                "{}  {}  {}",
                marker.cyan(),
                format!("#{}", citation.anchor_id()).dimmed(),
                truncate(&citation.title, 60)
            )?;
        } else {
            writeln!(
                w,
                "{}  #{}  {}",
                marker,
                citation.anchor_id(),
                truncate(&citation.title, 60)
            )?;
        }
    }
    Ok(())
}

fn plural<'a>(n: usize, one: &'a str, many: &'a str) -> &'a str {
    if n == 1 { one } else { many }
}

fn truncate(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}
