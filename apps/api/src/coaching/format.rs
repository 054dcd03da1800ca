//! Best-effort reading of the scores the prompts ask the model to emit.
//!
//! Model output is always shown verbatim. These helpers only lift a number out of it
//! for the session view; `None` means the model strayed from the requested format.

const MATCH_SCORE_LABEL: &str = "match score";
const ANSWER_SCORE_LABEL: &str = "score";

/// Reads `Match Score: X%` (0–100) from a gap analysis.
pub fn extract_match_score(text: &str) -> Option<u8> {
    score_after_label(text, MATCH_SCORE_LABEL, 100)
}

/// Reads `Score: X/10` (0–10) from a grading turn.
pub fn extract_answer_score(text: &str) -> Option<u8> {
    score_after_label(text, ANSWER_SCORE_LABEL, 10)
}

fn score_after_label(text: &str, label: &str, max: u8) -> Option<u8> {
    // ASCII lowercasing keeps byte offsets aligned with `text`.
    let idx = text.to_ascii_lowercase().find(label)?;
    let rest = text[idx + label.len()..]
        .trim_start_matches(|c: char| c == ':' || c == '*' || c == '[' || c.is_whitespace());
    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse::<u8>().ok().filter(|score| *score <= max)
}
