//! Session views: the JSON snapshot returned after every action for the UI to render.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::coaching::format::{extract_answer_score, extract_match_score};
use crate::models::session::{ChatRole, Mode, OptimizedSummary, Phase};
use crate::session::SessionState;

#[derive(Debug, Serialize)]
pub struct SessionView {
    pub session_id: Uuid,
    pub mode: Mode,
    pub phase: Phase,
    /// A document has been uploaded and its text is available.
    pub resume_loaded: bool,
    /// A gap analysis has completed for an uploaded resume.
    pub resume_uploaded: bool,
    /// The interview seeds from detected gaps rather than a generic question.
    pub adaptive_interview: bool,
    pub gap_analysis: Option<GapAnalysisView>,
    pub optimized_summary: Option<OptimizedSummary>,
    pub chat_history: Vec<ChatTurnView>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct GapAnalysisView {
    pub role: String,
    pub text: String,
    pub match_score: Option<u8>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ChatTurnView {
    pub role: ChatRole,
    pub content: String,
    /// Grade parsed from a grading reply; always `None` for questions and answers.
    pub score: Option<u8>,
    pub created_at: DateTime<Utc>,
}

impl From<&SessionState> for SessionView {
    fn from(state: &SessionState) -> Self {
        let history = state.chat_history();
        let chat_history = history
            .iter()
            .enumerate()
            .map(|(i, turn)| {
                let follows_answer = i > 0 && history[i - 1].role == ChatRole::User;
                let score = match turn.role {
                    ChatRole::Ai if follows_answer => extract_answer_score(&turn.content),
                    _ => None,
                };
                ChatTurnView {
                    role: turn.role,
                    content: turn.content.clone(),
                    score,
                    created_at: turn.created_at,
                }
            })
            .collect();

        SessionView {
            session_id: state.id,
            mode: state.mode,
            phase: state.phase,
            resume_loaded: state.resume_text.is_some(),
            resume_uploaded: state.resume_uploaded,
            adaptive_interview: state.gap_analysis.is_some(),
            gap_analysis: state.gap_analysis.as_ref().map(|g| GapAnalysisView {
                role: g.role.clone(),
                text: g.text.clone(),
                match_score: extract_match_score(&g.text),
                created_at: g.created_at,
            }),
            optimized_summary: state.optimized_summary.clone(),
            chat_history,
            created_at: state.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::session::GapAnalysis;

    #[test]
    fn test_view_scores_only_grading_replies() {
        let mut state = SessionState::new(Uuid::new_v4());
        state.push_ai("Score the following: what is 2+2?");
        state.push_user("4");
        state.push_ai("**Score:** 10/10\n\n**Feedback:** Correct.");

        let view = SessionView::from(&state);
        assert_eq!(view.chat_history[0].score, None);
        assert_eq!(view.chat_history[1].score, None);
        assert_eq!(view.chat_history[2].score, Some(10));
    }

    #[test]
    fn test_view_exposes_match_score_and_adaptive_flag() {
        let mut state = SessionState::new(Uuid::new_v4());
        state.gap_analysis = Some(GapAnalysis {
            role: "Data Science".to_string(),
            text: "**Match Score:** 55%".to_string(),
            created_at: Utc::now(),
        });

        let view = SessionView::from(&state);
        assert!(view.adaptive_interview);
        assert_eq!(view.gap_analysis.unwrap().match_score, Some(55));
    }

    #[test]
    fn test_view_serializes_snake_case() {
        let state = SessionState::new(Uuid::new_v4());
        let json = serde_json::to_value(SessionView::from(&state)).unwrap();
        assert_eq!(json["mode"], "resume_architect");
        assert_eq!(json["phase"], "idle");
        assert_eq!(json["chat_history"], serde_json::json!([]));
        assert_eq!(json["created_at"], serde_json::to_value(state.created_at).unwrap());
    }
}
