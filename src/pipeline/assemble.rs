//! Document assembly: sections plus rendered text → in-memory document.
//!
//! The result is a flat list of blocks. Serialisation to a file format lives
//! in [`crate::pipeline::docx`].

use crate::output::{Section, TextRun};
use crate::pipeline::postprocess::split_lines;

/// Heading presentation. Fixed for every section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeadingStyle {
    /// Font size in half-points (28 = 14 pt).
    pub size_half_points: u32,
    pub bold: bool,
}

impl Default for HeadingStyle {
    fn default() -> Self {
        Self {
            size_half_points: 28,
            bold: true,
        }
    }
}

/// Inline content of a paragraph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
    Run(TextRun),
    LineBreak,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    /// Left-aligned heading rendered with the document's [`HeadingStyle`].
    Heading(String),
    Paragraph(Vec<Inline>),
}

/// Assembled output document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    pub blocks: Vec<Block>,
    pub heading_style: HeadingStyle,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_heading(&mut self, text: impl Into<String>) {
        self.blocks.push(Block::Heading(text.into()));
    }

    /// Append one paragraph holding every line of `text`.
    ///
    /// Each source line contributes its runs followed by a line break,
    /// including the last line, so a paragraph always ends with a break.
    pub fn add_text_paragraph(&mut self, text: &str) {
        let mut inlines = Vec::new();
        for runs in split_lines(text) {
            inlines.extend(runs.into_iter().map(Inline::Run));
            inlines.push(Inline::LineBreak);
        }
        self.blocks.push(Block::Paragraph(inlines));
    }

    #[cfg(test)]
    fn heading_count(&self) -> usize {
        self.blocks
            .iter()
            .filter(|b| matches!(b, Block::Heading(_)))
            .count()
    }
}

/// Build the output document from sections and their rendered text.
///
/// `rendered` is indexed like `sections`; surplus entries on either side are
/// ignored. Headings are emitted only when `has_headings` is set (the source
/// had an outline).
pub fn assemble(sections: &[Section], rendered: &[String], has_headings: bool) -> Document {
    let mut doc = Document::new();
    for (section, text) in sections.iter().zip(rendered) {
        if has_headings {
            doc.add_heading(section.title.clone());
        }
        doc.add_text_paragraph(text);
    }
    doc
}
