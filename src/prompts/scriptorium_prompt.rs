//! Scriptorium prompts
//!
//! The consultation prompt embeds the whole treatise so the model always
//! sees the current draft; the transcription instruction travels next to an
//! inline audio payload.

/// Instruction sent with recorded audio
pub const TRANSCRIPTION_INSTRUCTION: &str = r#"Transcribe this audio.

Instructions:
1. Capture the text exactly as spoken.
2. Do not paraphrase or summarize.
3. Remove only non-lexical filler words (like "um", "uh").
4. Preserve the speaker's natural flow and style."#;

const CONSULT_PREAMBLE: &str =
    "You are a sophisticated, open-minded intellectual partner in a Scriptorium.";

const CONSULT_GUIDANCE: &str = r#"Your role is to serve the user's intent with absolute utility and intelligence.
- If they want to debate a theory, debate it rigorously.
- If they want to change the style (e.g., to Dostoevsky, to poetry, to scientific, to raw stream of consciousness), do it.
- If they want to expand or cut, do it.
- If they just want to chat about the ideas, chat.

Do not impose a specific structure or tone. Be fluid, responsive, and intellectually rigorous."#;

/// Generate the consultation prompt for the current treatise
///
/// # Examples
///
/// ```
/// use storyweaver::prompts::scriptorium_prompt::generate_consult_prompt;
///
/// let prompt = generate_consult_prompt("Draft text", "Make it shorter");
/// assert!(prompt.contains("\"Draft text\""));
/// assert!(prompt.contains("User's latest input/request: \"Make it shorter\""));
/// ```
pub fn generate_consult_prompt(treatise: &str, instruction: &str) -> String {
    format!(
        "{}\n\nThe user is working on the following text:\n\"{}\"\n\nUser's latest input/request: \"{}\"\n\n{}",
        CONSULT_PREAMBLE, treatise, instruction, CONSULT_GUIDANCE
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_consult_prompt_embeds_empty_treatise() {
        let prompt = generate_consult_prompt("", "Where do I start?");
        assert!(prompt.contains("following text:\n\"\""));
        assert!(prompt.contains("\"Where do I start?\""));
    }

    #[test]
    fn test_consult_prompt_order() {
        let prompt = generate_consult_prompt("TREATISE", "INSTRUCTION");
        let t = prompt.find("TREATISE").unwrap();
        let i = prompt.find("INSTRUCTION").unwrap();
        assert!(t < i);
        assert!(prompt.ends_with("intellectually rigorous."));
    }

    #[test]
    fn test_transcription_instruction_forbids_paraphrase() {
        assert!(TRANSCRIPTION_INSTRUCTION.starts_with("Transcribe this audio."));
        assert!(TRANSCRIPTION_INSTRUCTION.contains("Do not paraphrase"));
    }
}
