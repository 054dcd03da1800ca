//! Conversation Controller: the state machine behind both assistant modes.
//!
//! One method per user action. Each takes the session's state by `&mut`, so the caller
//! must hold the session lock for the whole action, inference call included.
//!
//! Transitions:
//! - analyze:        resume mode only; Idle/* → AwaitingGapAnalysis → GapAnalysisReady
//! - rewrite:        resume mode only; Idle/* → AwaitingSummary → SummaryReady
//! - interview mode: empty history → AwaitingSeedQuestion → ChatActive
//!                   non-empty history → ChatActive (no new question)
//! - resume mode:    phase of the latest resume result, or Idle
//! - answer:         ChatActive → AwaitingGrading → ChatActive
//!
//! A failed inference call restores the phase held before the action and stores nothing.

use chrono::Utc;
use tracing::{info, warn};

use crate::catalog::{RoleSkills, SkillsCatalog};
use crate::coaching::prompts::{
    build_gap_analysis_prompt, build_grading_prompt, build_seed_prompt, build_summary_prompt,
    SeedKind,
};
use crate::errors::AppError;
use crate::llm_client::InferenceClient;
use crate::models::session::{GapAnalysis, Mode, OptimizedSummary, Phase};
use crate::session::SessionState;

pub struct ConversationController<'a> {
    inference: &'a dyn InferenceClient,
    catalog: &'a SkillsCatalog,
}

impl<'a> ConversationController<'a> {
    pub fn new(inference: &'a dyn InferenceClient, catalog: &'a SkillsCatalog) -> Self {
        Self { inference, catalog }
    }

    /// Makes freshly extracted resume text available to Analyze and Rewrite.
    /// No phase change and no inference call.
    pub fn upload_resume(&self, state: &mut SessionState, text: String) {
        info!(
            "Session {}: resume uploaded ({} chars)",
            state.id,
            text.chars().count()
        );
        state.resume_text = Some(text);
    }

    /// Runs the gap analysis for `role` against the uploaded resume.
    pub async fn analyze(&self, state: &mut SessionState, role: &str) -> Result<(), AppError> {
        require_mode(state, Mode::ResumeArchitect)?;
        let skills = self.role_skills(role)?;
        let prompt = build_gap_analysis_prompt(role, skills, require_resume(state)?);

        let text = self
            .generate(state, Phase::AwaitingGapAnalysis, &prompt)
            .await?;

        state.gap_analysis = Some(GapAnalysis {
            role: role.to_string(),
            text,
            created_at: Utc::now(),
        });
        state.resume_uploaded = true;
        state.phase = Phase::GapAnalysisReady;
        info!("Session {}: gap analysis stored for '{role}'", state.id);
        Ok(())
    }

    /// Rewrites the professional summary for `role`. Independent of `analyze`.
    pub async fn rewrite_summary(
        &self,
        state: &mut SessionState,
        role: &str,
    ) -> Result<(), AppError> {
        require_mode(state, Mode::ResumeArchitect)?;
        self.role_skills(role)?;
        let prompt = build_summary_prompt(role, require_resume(state)?);

        let text = self.generate(state, Phase::AwaitingSummary, &prompt).await?;

        state.optimized_summary = Some(OptimizedSummary {
            role: role.to_string(),
            text,
            created_at: Utc::now(),
        });
        state.phase = Phase::SummaryReady;
        info!("Session {}: optimized summary stored for '{role}'", state.id);
        Ok(())
    }

    /// Switches mode. Entering the interview with an empty history asks the opening
    /// question; returns which template was used, or `None` if nothing was generated.
    pub async fn select_mode(
        &self,
        state: &mut SessionState,
        mode: Mode,
        role: &str,
    ) -> Result<Option<SeedKind>, AppError> {
        self.role_skills(role)?;
        state.mode = mode;

        if mode != Mode::InterviewCoach {
            state.phase = resume_phase(state);
            return Ok(None);
        }
        if !state.chat_history().is_empty() {
            state.phase = Phase::ChatActive;
            return Ok(None);
        }
        self.seed_interview(state, role).await.map(Some)
    }

    async fn seed_interview(
        &self,
        state: &mut SessionState,
        role: &str,
    ) -> Result<SeedKind, AppError> {
        let gaps = state.gap_analysis.as_ref().map(|g| g.text.as_str());
        let (kind, prompt) = build_seed_prompt(role, gaps);

        let question = self
            .generate(state, Phase::AwaitingSeedQuestion, &prompt)
            .await?;

        state.push_ai(question);
        state.phase = Phase::ChatActive;
        info!("Session {}: interview seeded ({kind:?}) for '{role}'", state.id);
        Ok(kind)
    }

    /// Grades an answer to the current question and appends the model's reply,
    /// which carries the next question.
    pub async fn submit_answer(
        &self,
        state: &mut SessionState,
        answer: &str,
    ) -> Result<(), AppError> {
        require_mode(state, Mode::InterviewCoach)?;
        if answer.trim().is_empty() {
            return Err(AppError::Validation("answer cannot be empty".to_string()));
        }
        let question = state
            .last_question()
            .map(|turn| turn.content.clone())
            .ok_or_else(|| {
                AppError::Validation("The interview has not started yet".to_string())
            })?;
        if state.phase != Phase::ChatActive {
            return Err(AppError::Validation(format!(
                "No question is awaiting an answer (phase {:?})",
                state.phase
            )));
        }

        state.push_user(answer);
        let prompt = build_grading_prompt(&question, answer);

        match self.generate(state, Phase::AwaitingGrading, &prompt).await {
            Ok(reply) => {
                state.push_ai(reply);
                state.phase = Phase::ChatActive;
                Ok(())
            }
            Err(e) => {
                state.discard_ungraded_answer();
                Err(e)
            }
        }
    }

    fn role_skills(&self, role: &str) -> Result<&'a RoleSkills, AppError> {
        self.catalog
            .get(role)
            .ok_or_else(|| AppError::NotFound(format!("Role '{role}' is not in the skills catalog")))
    }

    /// Moves into `awaiting`, calls the model, and rolls the phase back on failure.
    async fn generate(
        &self,
        state: &mut SessionState,
        awaiting: Phase,
        prompt: &str,
    ) -> Result<String, AppError> {
        let prior = state.phase;
        state.phase = awaiting;

        match self.inference.generate(prompt).await {
            Ok(text) => Ok(text),
            Err(e) => {
                warn!(
                    "Session {}: {:?} failed, back to {:?}: {e}",
                    state.id, awaiting, prior
                );
                state.phase = prior;
                Err(e.into())
            }
        }
    }
}

fn require_mode(state: &SessionState, mode: Mode) -> Result<(), AppError> {
    if state.mode == mode {
        return Ok(());
    }
    let name = match mode {
        Mode::ResumeArchitect => "resume_architect",
        Mode::InterviewCoach => "interview_coach",
    };
    Err(AppError::Validation(format!("Switch to {name} mode first")))
}

/// Phase shown on returning to resume mode: whichever result was produced last.
fn resume_phase(state: &SessionState) -> Phase {
    match (&state.gap_analysis, &state.optimized_summary) {
        (Some(gaps), Some(summary)) if summary.created_at >= gaps.created_at => Phase::SummaryReady,
        (Some(_), _) => Phase::GapAnalysisReady,
        (None, Some(_)) => Phase::SummaryReady,
        (None, None) => Phase::Idle,
    }
}

fn require_resume(state: &SessionState) -> Result<&str, AppError> {
    state
        .resume_text
        .as_deref()
        .ok_or_else(|| AppError::Validation("Upload a resume first".to_string()))
}

/// The optimized summary as a downloadable text file body.
pub fn summary_download(state: &SessionState) -> Result<String, AppError> {
    state
        .optimized_summary
        .as_ref()
        .map(OptimizedSummary::download_body)
        .ok_or_else(|| AppError::NotFound("No optimized summary yet".to_string()))
}
