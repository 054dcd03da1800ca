//! Per-session memory: everything one user's conversation has produced so far.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::session::{ChatRole, ChatTurn, GapAnalysis, Mode, OptimizedSummary, Phase};

#[derive(Debug, Clone)]
pub struct SessionState {
    pub id: Uuid,
    pub mode: Mode,
    pub phase: Phase,
    /// Text of the most recently uploaded document. Replaced by the next upload.
    pub resume_text: Option<String>,
    /// Set once a gap analysis has completed for an uploaded resume.
    pub resume_uploaded: bool,
    pub gap_analysis: Option<GapAnalysis>,
    pub optimized_summary: Option<OptimizedSummary>,
    /// Append-only. First entry is always an `ai` question.
    chat_history: Vec<ChatTurn>,
    pub created_at: DateTime<Utc>,
}

impl SessionState {
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            mode: Mode::default(),
            phase: Phase::default(),
            resume_text: None,
            resume_uploaded: false,
            gap_analysis: None,
            optimized_summary: None,
            chat_history: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn chat_history(&self) -> &[ChatTurn] {
        &self.chat_history
    }

    pub fn push_ai(&mut self, content: impl Into<String>) {
        self.chat_history.push(ChatTurn::ai(content));
    }

    /// Appends a user answer. The history must already hold the question being answered.
    pub fn push_user(&mut self, content: impl Into<String>) {
        debug_assert!(
            !self.chat_history.is_empty(),
            "a user turn can never open the chat history"
        );
        self.chat_history.push(ChatTurn::user(content));
    }

    /// Drops a trailing user turn whose grading never completed.
    pub fn discard_ungraded_answer(&mut self) -> Option<ChatTurn> {
        match self.chat_history.last() {
            Some(turn) if turn.role == ChatRole::User => self.chat_history.pop(),
            _ => None,
        }
    }

    /// The most recent `ai` turn, i.e. the question currently awaiting (or just given) an answer.
    pub fn last_question(&self) -> Option<&ChatTurn> {
        self.chat_history
            .iter()
            .rev()
            .find(|turn| turn.role == ChatRole::Ai)
    }
}
