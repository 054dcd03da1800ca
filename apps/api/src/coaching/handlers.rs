//! Axum route handlers for the coaching API. One handler per user action.

use axum::{
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::RoleEntry;
use crate::coaching::controller::{summary_download, ConversationController};
use crate::coaching::prompts::SeedKind;
use crate::coaching::view::SessionView;
use crate::errors::AppError;
use crate::models::session::{Mode, OptimizedSummary};
use crate::resume::extract::extract_resume_text;
use crate::session::SharedSession;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RoleRequest {
    pub role: String,
}

#[derive(Debug, Deserialize)]
pub struct SelectModeRequest {
    pub mode: Mode,
    pub role: String,
}

#[derive(Debug, Deserialize)]
pub struct AnswerRequest {
    pub answer: String,
}

#[derive(Debug, Serialize)]
pub struct RolesResponse {
    pub roles: Vec<RoleEntry>,
}

#[derive(Debug, Serialize)]
pub struct SelectModeResponse {
    /// Template used for the opening question, when one was generated by this call.
    pub seeded: Option<SeedKind>,
    pub session: SessionView,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub extracted_chars: usize,
    pub session: SessionView,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/roles
pub async fn handle_list_roles(State(state): State<AppState>) -> Json<RolesResponse> {
    Json(RolesResponse {
        roles: state.catalog.roles().to_vec(),
    })
}

/// POST /api/v1/sessions
pub async fn handle_create_session(
    State(state): State<AppState>,
) -> (StatusCode, Json<SessionView>) {
    let (_, session) = state.sessions.create().await;
    let guard = session.lock().await;
    (StatusCode::CREATED, Json(SessionView::from(&*guard)))
}

/// GET /api/v1/sessions/:id
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, AppError> {
    let session = find_session(&state, id).await?;
    let guard = session.lock().await;
    Ok(Json(SessionView::from(&*guard)))
}

/// DELETE /api/v1/sessions/:id
pub async fn handle_end_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if state.sessions.remove(id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("Session {id} not found")))
    }
}

/// POST /api/v1/sessions/:id/mode
///
/// Entering `interview_coach` with an empty chat generates the opening question.
pub async fn handle_select_mode(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<SelectModeRequest>,
) -> Result<Json<SelectModeResponse>, AppError> {
    let session = find_session(&state, id).await?;
    let mut guard = session.lock().await;

    let seeded = controller(&state)
        .select_mode(&mut guard, request.mode, &request.role)
        .await?;

    Ok(Json(SelectModeResponse {
        seeded,
        session: SessionView::from(&*guard),
    }))
}

/// POST /api/v1/sessions/:id/resume
///
/// Multipart upload; the PDF is expected in the `file` field.
pub async fn handle_upload_resume(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let session = find_session(&state, id).await?;

    let mut document = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        if field.name() == Some("file") {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::Validation(format!("Failed to read upload: {e}")))?;
            document = Some(bytes);
            break;
        }
    }
    let document = document
        .ok_or_else(|| AppError::Validation("Multipart field 'file' is required".to_string()))?;

    // Extraction touches no session state, so it runs before taking the lock.
    let text = extract_resume_text(document).await?;
    let extracted_chars = text.chars().count();

    let mut guard = session.lock().await;
    controller(&state).upload_resume(&mut guard, text);

    Ok(Json(UploadResponse {
        extracted_chars,
        session: SessionView::from(&*guard),
    }))
}

/// POST /api/v1/sessions/:id/analyze
pub async fn handle_analyze(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<RoleRequest>,
) -> Result<Json<SessionView>, AppError> {
    let session = find_session(&state, id).await?;
    let mut guard = session.lock().await;

    controller(&state).analyze(&mut guard, &request.role).await?;

    Ok(Json(SessionView::from(&*guard)))
}

/// POST /api/v1/sessions/:id/summary
pub async fn handle_rewrite_summary(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<RoleRequest>,
) -> Result<Json<SessionView>, AppError> {
    let session = find_session(&state, id).await?;
    let mut guard = session.lock().await;

    controller(&state)
        .rewrite_summary(&mut guard, &request.role)
        .await?;

    Ok(Json(SessionView::from(&*guard)))
}

/// GET /api/v1/sessions/:id/summary/download
pub async fn handle_download_summary(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let session = find_session(&state, id).await?;
    let guard = session.lock().await;

    let body = summary_download(&guard)?;
    let disposition = format!(
        "attachment; filename=\"{}\"",
        OptimizedSummary::DOWNLOAD_FILE_NAME
    );

    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    ))
}

/// POST /api/v1/sessions/:id/answers
pub async fn handle_submit_answer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<AnswerRequest>,
) -> Result<Json<SessionView>, AppError> {
    let session = find_session(&state, id).await?;
    let mut guard = session.lock().await;

    controller(&state)
        .submit_answer(&mut guard, &request.answer)
        .await?;

    Ok(Json(SessionView::from(&*guard)))
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

fn controller(state: &AppState) -> ConversationController<'_> {
    ConversationController::new(state.inference.as_ref(), &state.catalog)
}

async fn find_session(state: &AppState, id: Uuid) -> Result<SharedSession, AppError> {
    state
        .sessions
        .get(id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Session {id} not found")))
}
