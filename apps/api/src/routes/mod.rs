pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::coaching::handlers;
use crate::state::AppState;

/// Resumes are small, but scanned PDFs can exceed axum's 2 MB default.
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/roles", get(handlers::handle_list_roles))
        // Sessions
        .route("/api/v1/sessions", post(handlers::handle_create_session))
        .route(
            "/api/v1/sessions/:id",
            get(handlers::handle_get_session).delete(handlers::handle_end_session),
        )
        .route(
            "/api/v1/sessions/:id/mode",
            post(handlers::handle_select_mode),
        )
        // Resume Architect
        .route(
            "/api/v1/sessions/:id/resume",
            post(handlers::handle_upload_resume).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route(
            "/api/v1/sessions/:id/analyze",
            post(handlers::handle_analyze),
        )
        .route(
            "/api/v1/sessions/:id/summary",
            post(handlers::handle_rewrite_summary),
        )
        .route(
            "/api/v1/sessions/:id/summary/download",
            get(handlers::handle_download_summary),
        )
        // Interview Coach
        .route(
            "/api/v1/sessions/:id/answers",
            post(handlers::handle_submit_answer),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
        response::Response,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use uuid::Uuid;

    use super::*;
    use crate::catalog::SkillsCatalog;
    use crate::config::Config;
    use crate::llm_client::testing::ScriptedInference;
    use crate::llm_client::{InferenceClient, WatsonxClient, WatsonxCredentials};
    use crate::resume::SAMPLE_RESUME_PDF;
    use crate::session::SessionStore;

    const CATALOG_JSON: &str = r#"{
        "Data Science": {"Technical Skills": ["Python", "SQL"], "Concepts": ["Statistics"]},
        "Backend Engineer": {"Technical Skills": ["Rust"], "Concepts": ["Concurrency"]}
    }"#;

    fn test_state(inference: Arc<dyn InferenceClient>) -> AppState {
        AppState {
            config: Config {
                watsonx: WatsonxCredentials::default(),
                skills_catalog_path: "skills.json".to_string(),
                inference_timeout_secs: 1,
                session_ttl_minutes: 60,
                port: 0,
                rust_log: "info".to_string(),
            },
            catalog: Arc::new(SkillsCatalog::from_json(CATALOG_JSON).unwrap()),
            inference,
            sessions: SessionStore::new(chrono::Duration::minutes(60)),
        }
    }

    fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn empty_request(method: &str, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn create_session(app: &Router) -> Uuid {
        let response = app
            .clone()
            .oneshot(empty_request("POST", "/api/v1/sessions"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = body_json(response).await;
        body["session_id"].as_str().unwrap().parse().unwrap()
    }

    #[tokio::test]
    async fn test_health_reports_inference_unconfigured() {
        let app = build_router(test_state(Arc::new(ScriptedInference::new())));
        let response = app.oneshot(empty_request("GET", "/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["inference_configured"], false);
        assert_eq!(body["roles"], 2);
    }

    #[tokio::test]
    async fn test_list_roles_in_catalog_order() {
        let app = build_router(test_state(Arc::new(ScriptedInference::new())));
        let response = app
            .oneshot(empty_request("GET", "/api/v1/roles"))
            .await
            .unwrap();
        let body = body_json(response).await;
        assert_eq!(body["roles"][0]["role"], "Data Science");
        assert_eq!(body["roles"][1]["Concepts"][0], "Concurrency");
    }

    #[tokio::test]
    async fn test_interview_flow_over_http() {
        let inference = Arc::new(ScriptedInference::with_responses([
            "What is a hash map?",
            "**Score:** 2/10\n\n**Feedback:** ...\n\n**Next Question:** What is hashing?",
        ]));
        let app = build_router(test_state(inference.clone()));
        let id = create_session(&app).await;

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                &format!("/api/v1/sessions/{id}/mode"),
                json!({"mode": "interview_coach", "role": "Backend Engineer"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["seeded"], "generic");
        assert_eq!(body["session"]["phase"], "chat_active");
        assert_eq!(body["session"]["chat_history"][0]["role"], "ai");

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                &format!("/api/v1/sessions/{id}/answers"),
                json!({"answer": "I don't know"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        let history = body["chat_history"].as_array().unwrap();
        assert_eq!(history.len(), 3);
        assert_eq!(history[1]["content"], "I don't know");
        assert_eq!(history[2]["score"], 2);

        // Leaving and re-entering the interview resumes without a new question.
        for mode in ["resume_architect", "interview_coach"] {
            let response = app
                .clone()
                .oneshot(json_request(
                    "POST",
                    &format!("/api/v1/sessions/{id}/mode"),
                    json!({"mode": mode, "role": "Backend Engineer"}),
                ))
                .await
                .unwrap();
            assert_eq!(body_json(response).await["seeded"], Value::Null);
        }
        assert_eq!(inference.calls(), 2);
    }

    #[tokio::test]
    async fn test_analyze_without_resume_is_bad_request() {
        let app = build_router(test_state(Arc::new(ScriptedInference::new())));
        let id = create_session(&app).await;

        let response = app
            .oneshot(json_request(
                "POST",
                &format!("/api/v1/sessions/{id}/analyze"),
                json!({"role": "Data Science"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_summary_rewrite_and_download() {
        let inference = Arc::new(ScriptedInference::with_responses([
            "Results-oriented engineer who ships.",
        ]));
        let state = test_state(inference);
        let app = build_router(state.clone());
        let id = create_session(&app).await;
        state
            .sessions
            .get(id)
            .await
            .unwrap()
            .lock()
            .await
            .resume_text = Some("Built services in Rust.".to_string());

        let response = app
            .clone()
            .oneshot(empty_request(
                "GET",
                &format!("/api/v1/sessions/{id}/summary/download"),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                &format!("/api/v1/sessions/{id}/summary"),
                json!({"role": "Backend Engineer"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["phase"], "summary_ready");

        let response = app
            .oneshot(empty_request(
                "GET",
                &format!("/api/v1/sessions/{id}/summary/download"),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"Optimized_Summary.txt\""
        );
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(
            &bytes[..],
            b"OPTIMIZED PROFESSIONAL SUMMARY\nRole: Backend Engineer\n\nResults-oriented engineer who ships."
        );
    }

    #[tokio::test]
    async fn test_missing_credentials_return_configuration_error() {
        let watsonx =
            WatsonxClient::new(WatsonxCredentials::default(), Duration::from_secs(1)).unwrap();
        let app = build_router(test_state(Arc::new(watsonx)));
        let id = create_session(&app).await;

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                &format!("/api/v1/sessions/{id}/mode"),
                json!({"mode": "interview_coach", "role": "Data Science"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "CONFIGURATION_ERROR");
        assert!(body["error"]["message"]
            .as_str()
            .unwrap()
            .contains("WATSONX_API_KEY"));

        // The session survives and is still empty.
        let response = app
            .oneshot(empty_request("GET", &format!("/api/v1/sessions/{id}")))
            .await
            .unwrap();
        let body = body_json(response).await;
        assert_eq!(body["chat_history"], json!([]));
        assert_eq!(body["mode"], "interview_coach");
    }

    #[tokio::test]
    async fn test_upload_rejects_non_pdf() {
        let app = build_router(test_state(Arc::new(ScriptedInference::new())));
        let id = create_session(&app).await;

        let boundary = "careerforge-test-boundary";
        let body = format!(
            "--{boundary}\r\n\
             Content-Disposition: form-data; name=\"file\"; filename=\"resume.txt\"\r\n\
             Content-Type: text/plain\r\n\r\n\
             plain text resume\r\n\
             --{boundary}--\r\n"
        );
        let request = Request::builder()
            .method("POST")
            .uri(format!("/api/v1/sessions/{id}/resume"))
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_uploaded_pdf_feeds_gap_analysis() {
        let inference = Arc::new(ScriptedInference::with_responses(["**Match Score:** 40%"]));
        let app = build_router(test_state(inference.clone()));
        let id = create_session(&app).await;

        let boundary = "careerforge-pdf-boundary";
        let mut body = format!(
            "--{boundary}\r\n\
             Content-Disposition: form-data; name=\"file\"; filename=\"resume.pdf\"\r\n\
             Content-Type: application/pdf\r\n\r\n"
        )
        .into_bytes();
        body.extend_from_slice(SAMPLE_RESUME_PDF);
        body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
        let request = Request::builder()
            .method("POST")
            .uri(format!("/api/v1/sessions/{id}/resume"))
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap();

        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert!(body["extracted_chars"].as_u64().unwrap() > 0);
        assert_eq!(body["session"]["resume_loaded"], true);
        assert_eq!(body["session"]["resume_uploaded"], false);
        assert_eq!(inference.calls(), 0);

        let response = app
            .oneshot(json_request(
                "POST",
                &format!("/api/v1/sessions/{id}/analyze"),
                json!({"role": "Data Science"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["phase"], "gap_analysis_ready");
        assert_eq!(body["gap_analysis"]["match_score"], 40);

        let prompt = &inference.prompts()[0];
        let first_page = prompt.find("Jane Doe").expect("page one missing from prompt");
        let second_page = prompt
            .find("Experience with Kubernetes and Kafka")
            .expect("page two missing from prompt");
        assert!(first_page < second_page);
    }

    #[tokio::test]
    async fn test_unknown_and_ended_sessions_are_not_found() {
        let app = build_router(test_state(Arc::new(ScriptedInference::new())));
        let response = app
            .clone()
            .oneshot(empty_request(
                "GET",
                &format!("/api/v1/sessions/{}", Uuid::new_v4()),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let id = create_session(&app).await;
        let response = app
            .clone()
            .oneshot(empty_request("DELETE", &format!("/api/v1/sessions/{id}")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = app
            .oneshot(empty_request("GET", &format!("/api/v1/sessions/{id}")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
