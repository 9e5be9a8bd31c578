//! Pipeline stages for PDF-to-Word rewriting.
//!
//! Each submodule implements exactly one step, so stages can be tested in
//! isolation and the external services swapped for fakes.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ pdf ──▶ extract ──▶ llm ──▶ translate ──▶ postprocess ──▶ assemble ──▶ docx
//! (scratch) (pdfium) (sections) (model)  (cloud)       (markdown)      (blocks)     (zip)
//! ```
//!
//! 1. [`input`]      : sanitise the upload name and stage files after a PDF header check
//! 2. [`pdf`]        : page text and outline via pdfium, inside `spawn_blocking`
//! 3. [`extract`]    : cut the text into sections at level-2 outline entries
//! 4. [`llm`]        : rewrite each section following the caller's instructions
//! 5. [`translate`]  : translate the rewrite into the configured language
//! 6. [`postprocess`]: flatten headings and list markers, split bold runs
//! 7. [`assemble`]   : headings and paragraphs in section order
//! 8. [`docx`]       : WordprocessingML package

pub mod assemble;
pub mod docx;
pub mod extract;
pub mod input;
pub mod llm;
pub mod pdf;
pub mod postprocess;
pub mod translate;
