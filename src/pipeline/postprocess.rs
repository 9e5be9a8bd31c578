//! Markdown reformatting of translated model output.
//!
//! The model answers in a small markdown subset. Before the text goes into
//! the Word document it is flattened by [`reformat`]:
//!
//! 1. Headings: a leading `#` run and the space after it are removed.
//! 2. Emphasis: single-asterisk spans are left exactly as they are.
//! 3. Lists: a leading `* ` becomes a bullet glyph `• `.
//!
//! Bold spans survive reformatting and are turned into styled runs per line
//! by [`split_runs`].
//!
//! Each pass is a pure `&str → String` function so the order can be tested
//! in isolation.

use crate::output::TextRun;
use once_cell::sync::Lazy;
use regex::Regex;

/// Bullet glyph substituted for `* ` list markers.
pub const BULLET: &str = "• ";

/// Apply the three formatting passes in order.
pub fn reformat(input: &str) -> String {
    let s = strip_heading_markers(input);
    let s = normalise_emphasis(&s);
    convert_list_markers(&s)
}

// ── Pass 1: Headings ─────────────────────────────────────────────────────────

static RE_HEADING: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^#+ ").unwrap());

fn strip_heading_markers(input: &str) -> String {
    RE_HEADING.replace_all(input, "").into_owned()
}

// ── Pass 2: Emphasis ─────────────────────────────────────────────────────────
//
// Single-asterisk italics are kept as literal markers. Whether they should
// become real italics downstream is undecided, so this pass only guarantees
// that such spans come out unchanged.

static RE_EMPHASIS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*(.+?)\*").unwrap());

fn normalise_emphasis(input: &str) -> String {
    RE_EMPHASIS.replace_all(input, "*${1}*").into_owned()
}

// ── Pass 3: Lists ────────────────────────────────────────────────────────────

static RE_LIST_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^\* ").unwrap());

fn convert_list_markers(input: &str) -> String {
    RE_LIST_MARKER.replace_all(input, BULLET).into_owned()
}

// ── Bold runs ────────────────────────────────────────────────────────────────

static RE_BOLD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*(.*?)\*\*").unwrap());

/// Split one line into runs at `**bold**` spans.
///
/// Matched spans become bold runs with the delimiters removed (an empty
/// `****` span yields an empty bold run). The text between spans becomes
/// plain runs; whitespace is kept byte-for-byte and empty plain pieces are
/// not emitted. Concatenating the run contents gives back the line minus the
/// consumed `**` delimiters.
pub fn split_runs(line: &str) -> Vec<TextRun> {
    let mut runs = Vec::new();
    let mut last = 0;

    for caps in RE_BOLD.captures_iter(line) {
        let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        if whole.start() > last {
            runs.push(TextRun::plain(&line[last..whole.start()]));
        }
        runs.push(TextRun::bold(inner.as_str()));
        last = whole.end();
    }

    if last < line.len() {
        runs.push(TextRun::plain(&line[last..]));
    }

    runs
}

/// Split reformatted text into physical lines and each line into runs.
pub fn split_lines(text: &str) -> Vec<Vec<TextRun>> {
    text.split('\n').map(split_runs).collect()
}

// ── Tests ────────────────────────────────────────────────────────────────────
