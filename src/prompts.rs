//! Prompt templates for section generation.
//!
//! Kept in one place so the wording can change without touching the
//! pipeline, and so tests can check the exact text sent to the model.

/// Instruction prefix placed before the caller's free-text instructions.
pub const GENERATION_PREFIX: &str = "Genera la respuesta según las siguientes indicaciones: ";

/// Build the single-shot prompt for one section.
///
/// The caller's instructions are inserted verbatim, followed by a blank line
/// and the section text.
pub fn section_prompt(instructions: &str, section_text: &str) -> String {
    format!("{}{}\n\n{}", GENERATION_PREFIX, instructions, section_text)
}
