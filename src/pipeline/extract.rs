//! Section extraction: split page text into labelled sections by outline.
//!
//! Only level-2 outline entries open a section. Each section runs from its
//! entry's page to the page of the *next* entry (whatever its level), or to the
//! last page when it is the final entry. On the boundary pages the entry
//! titles are located by plain substring search: text up to and including the
//! first occurrence of the section title is dropped from the first page, and
//! text from the first occurrence of the next title onward is dropped from the
//! last page. A title that is not found (reflowed, split across lines,
//! different case) leaves that page untrimmed.
//!
//! Documents without an outline yield one section per page.

use crate::output::{PdfText, Section, TocEntry};
use tracing::debug;

/// Outline level whose entries act as section boundaries.
pub const SECTION_LEVEL: usize = 2;

/// Split a document into sections.
///
/// With an empty `toc` every page becomes a section titled `Page N`.
pub fn extract_sections(pdf: &PdfText, toc: &[TocEntry]) -> Vec<Section> {
    let page_count = pdf.page_count();
    if page_count == 0 {
        return Vec::new();
    }

    if toc.is_empty() {
        return (1..=page_count)
            .map(|page| Section {
                title: format!("Page {}", page),
                start_page: page,
                end_page: page,
                text: text_between_pages(pdf, page, page, None, None),
            })
            .collect();
    }

    let mut sections = Vec::new();
    for (i, entry) in toc.iter().enumerate() {
        if entry.level != SECTION_LEVEL {
            continue;
        }

        let (next_page, next_title) = match toc.get(i + 1) {
            Some(next) => (next.page, Some(next.title.as_str())),
            None => (page_count, None),
        };

        let start = entry.page.clamp(1, page_count);
        let end = next_page.clamp(start, page_count);

        let text = text_between_pages(pdf, start, end, Some(&entry.title), next_title);
        debug!(
            "Section '{}': pages {}-{}, {} chars",
            entry.title,
            start,
            end,
            text.len()
        );

        sections.push(Section {
            title: entry.title.clone(),
            start_page: start,
            end_page: end,
            text,
        });
    }

    sections
}

/// Concatenate the text of pages `start..=end`, trimming at boundary titles.
///
/// Each page is whitespace-trimmed and the pages are joined with a single
/// space.
pub fn text_between_pages(
    pdf: &PdfText,
    start: usize,
    end: usize,
    start_title: Option<&str>,
    end_title: Option<&str>,
) -> String {
    let start_title = start_title.filter(|t| !t.is_empty());
    let end_title = end_title.filter(|t| !t.is_empty());

    (start..=end)
        .map(|page| {
            let mut text = pdf.page_text(page);
            if page == start {
                if let Some(title) = start_title {
                    text = after_first(text, title);
                }
            }
            if page == end {
                if let Some(title) = end_title {
                    text = before_first(text, title);
                }
            }
            text.trim()
        })
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string()
}

/// Everything after the first occurrence of `needle`, or `haystack` unchanged.
fn after_first<'a>(haystack: &'a str, needle: &str) -> &'a str {
    match haystack.find(needle) {
        Some(pos) => &haystack[pos + needle.len()..],
        None => haystack,
    }
}

/// Everything before the first occurrence of `needle`, or `haystack` unchanged.
fn before_first<'a>(haystack: &'a str, needle: &str) -> &'a str {
    match haystack.find(needle) {
        Some(pos) => &haystack[..pos],
        None => haystack,
    }
}
