use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which half of the assistant the user is looking at.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    #[default]
    ResumeArchitect,
    InterviewCoach,
}

/// Controller phase. The `Awaiting*` phases only exist while an inference call is in flight.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Idle,
    AwaitingGapAnalysis,
    GapAnalysisReady,
    AwaitingSummary,
    SummaryReady,
    AwaitingSeedQuestion,
    ChatActive,
    AwaitingGrading,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    Ai,
    User,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl ChatTurn {
    pub fn ai(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Ai,
            content: content.into(),
            created_at: Utc::now(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
            created_at: Utc::now(),
        }
    }
}

/// Raw model output of the gap-analysis prompt, with the role it was run against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GapAnalysis {
    pub role: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// Raw model output of the summary-rewrite prompt, with the role it was tailored to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizedSummary {
    pub role: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl OptimizedSummary {
    pub const DOWNLOAD_FILE_NAME: &'static str = "Optimized_Summary.txt";

    /// Plain-text download artifact.
    pub fn download_body(&self) -> String {
        format!(
            "OPTIMIZED PROFESSIONAL SUMMARY\nRole: {}\n\n{}",
            self.role, self.text
        )
    }
}
