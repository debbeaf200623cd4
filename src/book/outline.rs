//! Lenient outline parsing.
//!
//! An outline is free text where chapter lines start with an upper-case
//! Roman numeral and a period (`IV. Tides`) and section lines start with an
//! Arabic number and a period (`2. Neap tides`). Everything else is dropped.

use once_cell::sync::Lazy;
use regex::Regex;

use super::Chapter;

static CHAPTER_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[IVXLCDM]+\.\s+").expect("chapter pattern is valid"));

static SECTION_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+\.\s+").expect("section pattern is valid"));

/// Split an outline into trimmed, non-blank lines.
fn outline_lines(outline: &str) -> Vec<&str> {
    outline.lines().map(str::trim).filter(|line| !line.is_empty()).collect()
}

/// Parse outline text into unwritten chapters.
///
/// A section line seen before any chapter line has nowhere to go and is
/// discarded, as is any line matching neither pattern.
pub fn outline_to_chapters(outline: &str) -> Vec<Chapter> {
    let mut chapters: Vec<Chapter> = Vec::new();

    for line in outline_lines(outline) {
        if CHAPTER_LINE.is_match(line) {
            chapters.push(Chapter::new(line, Vec::new()));
        } else if SECTION_LINE.is_match(line) {
            if let Some(chapter) = chapters.last_mut() {
                chapter.sections.push(line.to_string());
            }
        }
    }

    chapters
}

/// Render chapters back into outline text, one line per header or section.
///
/// Chapter content is never included.
pub fn chapters_to_outline(chapters: &[Chapter]) -> String {
    let mut outline = String::new();
    for chapter in chapters {
        outline.push_str(&chapter.header);
        outline.push('\n');
        for section in &chapter.sections {
            outline.push_str(section);
            outline.push('\n');
        }
    }
    outline
}
