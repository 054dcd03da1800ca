// All LLM prompt templates for the coaching module, and the pure functions that fill them.
// No I/O, clock or randomness here: identical inputs always produce identical prompts.
//
// Placeholders holding user-supplied text ({resume_text}, {gap_analysis}, {answer}) are
// substituted last so braces inside that text are never treated as placeholders.

use serde::Serialize;

use crate::catalog::RoleSkills;

/// Leading characters of the resume sent with the gap-analysis prompt.
pub const GAP_ANALYSIS_RESUME_CHARS: usize = 3000;
/// Leading characters of the resume sent with the summary-rewrite prompt.
pub const SUMMARY_RESUME_CHARS: usize = 2000;

/// Replace: {role}, {technical_skills}, {concepts}, {resume_text}
pub const GAP_ANALYSIS_PROMPT_TEMPLATE: &str = r#"Role: {role}
Required Skills: {technical_skills}
Required Concepts: {concepts}

User Resume Content:
{resume_text}

Task: Perform a Gap Analysis.
1. Identify missing critical skills.
2. Give a Match Score (0-100%).
3. List specific topics the user needs to study.

Output Format:
**Match Score:** [X]%

**Missing Skills:**
- [Skill 1]
- [Skill 2]

**Study Recommendation:**
[One sentence advice]"#;

/// Replace: {role}, {resume_text}
pub const SUMMARY_REWRITE_PROMPT_TEMPLATE: &str = r#"You are a top-tier Resume Writer.
Role: {role}
Resume Text: {resume_text}

Task: Rewrite the user's "Professional Summary" to sound senior, results-oriented, and tailored to {role}. Use action verbs."#;

/// Replace: {role}, {gap_analysis}
pub const ADAPTIVE_SEED_PROMPT_TEMPLATE: &str = r#"Context: The user is applying for {role}.
Their Resume Analysis showed these gaps: {gap_analysis}

Task: Generate a technical interview question specifically targeting ONE of these missing skills to test if they actually know it."#;

/// Replace: {role}
pub const GENERIC_SEED_PROMPT_TEMPLATE: &str =
    "Task: Generate a challenging introductory technical interview question for a {role} position.";

/// Replace: {question}, {answer}
pub const GRADING_PROMPT_TEMPLATE: &str = r#"Role: Expert Technical Interviewer.
Current Question: {question}
User Answer: {answer}

Task:
1. Grade the answer (0-10).
2. Explain the correct answer briefly.
3. Ask the NEXT technical question (make it harder).

Output Format:
**Score:** [X]/10

**Feedback:** [Explanation]

**Next Question:** [New Question]"#;

/// Which seed template a prompt was built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SeedKind {
    /// Targets one of the gaps found by a prior analysis.
    Adaptive,
    /// Generic introductory question for the role.
    Generic,
}

/// Returns at most the first `max_chars` characters of `text`, never splitting a character.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

pub fn build_gap_analysis_prompt(role: &str, skills: &RoleSkills, resume_text: &str) -> String {
    GAP_ANALYSIS_PROMPT_TEMPLATE
        .replace("{role}", role)
        .replace("{technical_skills}", &skills.technical_skills.join(", "))
        .replace("{concepts}", &skills.concepts.join(", "))
        .replace(
            "{resume_text}",
            truncate_chars(resume_text, GAP_ANALYSIS_RESUME_CHARS),
        )
}

pub fn build_summary_prompt(role: &str, resume_text: &str) -> String {
    SUMMARY_REWRITE_PROMPT_TEMPLATE
        .replace("{role}", role)
        .replace(
            "{resume_text}",
            truncate_chars(resume_text, SUMMARY_RESUME_CHARS),
        )
}

/// Builds the opening interview question prompt. Adaptive when a gap analysis exists.
pub fn build_seed_prompt(role: &str, gap_analysis: Option<&str>) -> (SeedKind, String) {
    match gap_analysis {
        Some(gaps) => (
            SeedKind::Adaptive,
            ADAPTIVE_SEED_PROMPT_TEMPLATE
                .replace("{role}", role)
                .replace("{gap_analysis}", gaps),
        ),
        None => (
            SeedKind::Generic,
            GENERIC_SEED_PROMPT_TEMPLATE.replace("{role}", role),
        ),
    }
}

pub fn build_grading_prompt(question: &str, answer: &str) -> String {
    // Single pass so that an answer quoting "{question}" stays literal.
    let (head, tail) = GRADING_PROMPT_TEMPLATE
        .split_once("{answer}")
        .unwrap_or((GRADING_PROMPT_TEMPLATE, ""));
    let mut prompt = head.replace("{question}", question);
    prompt.push_str(answer);
    prompt.push_str(tail);
    prompt
}
