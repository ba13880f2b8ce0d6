//! Axum router configuration with middleware.
//!
//! All JSON routes are under `/api/`. Stored voice recordings are served
//! read-only from `/uploads/audio/`.
//! Middleware: CORS, tracing.

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use soultalk_infra::storage::audio::AUDIO_URL_PREFIX;

use crate::http::handlers;
use crate::state::AppState;

/// Upper bound for a voice upload.
const MAX_VOICE_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

/// Build the complete API router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        // Sessions
        .route("/session/new", post(handlers::session::new_session))
        .route("/session/list", post(handlers::session::list_sessions))
        .route("/session/messages", post(handlers::session::session_messages))
        .route("/session/rename", post(handlers::session::rename_session))
        .route("/session/delete", post(handlers::session::delete_session))
        // Turns
        .route("/message", post(handlers::message::send_message))
        .route(
            "/voice-message",
            post(handlers::message::send_voice_message)
                .layer(DefaultBodyLimit::max(MAX_VOICE_UPLOAD_BYTES)),
        );

    let audio_files = ServeDir::new(&state.audio_dir);

    Router::new()
        .nest("/api", api_routes)
        .nest_service(AUDIO_URL_PREFIX, audio_files)
        .route("/health", get(health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /health - Simple health check endpoint.
async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use soultalk_core::llm::box_provider::BoxLlmProvider;
    use soultalk_core::llm::provider::LlmProvider;
    use soultalk_infra::sqlite::pool::DatabasePool;
    use soultalk_types::config::{GlobalConfig, PerceptionConfig};
    use soultalk_types::llm::{CompletionRequest, CompletionResponse, LlmError, StopReason, Usage};

    use super::*;

    const ALICE: &str = "alice@example.com";

    /// Answers title prompts with a fixed title and everything else with a
    /// fixed reply.
    struct ScriptedProvider;

    impl LlmProvider for ScriptedProvider {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn complete(
            &self,
            request: &CompletionRequest,
        ) -> Result<CompletionResponse, LlmError> {
            let is_title = request
                .messages
                .last()
                .is_some_and(|m| m.content.contains("Title (main idea"));
            let content = if is_title {
                "Sleepless Nights"
            } else {
                "That sounds hard. I'm here with you."
            };

            Ok(CompletionResponse {
                id: "scripted-1".to_string(),
                content: content.to_string(),
                model: request.model.clone(),
                stop_reason: StopReason::EndTurn,
                usage: Usage::default(),
            })
        }
    }

    /// Serve a fake perception service on an ephemeral port.
    async fn spawn_perception() -> String {
        let app = Router::new()
            .route(
                "/emotion/text",
                post(|| async { axum::Json(json!([{"label": "sadness", "score": 0.9}])) }),
            )
            .route(
                "/emotion/audio",
                post(|| async { axum::Json(json!({"emotion": "fear"})) }),
            )
            .route(
                "/transcribe",
                post(|| async { axum::Json(json!({"text": "I can't sleep"})) }),
            );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn perception_at(base: &str) -> PerceptionConfig {
        PerceptionConfig {
            text_emotion_url: format!("{base}/emotion/text"),
            audio_emotion_url: format!("{base}/emotion/audio"),
            transcribe_url: format!("{base}/transcribe"),
            timeout_secs: 2,
        }
    }

    async fn test_state(perception: PerceptionConfig) -> AppState {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}?mode=rwc", dir.path().join("test.db").display());
        let audio_dir = dir.path().join("uploads").join("audio");
        std::fs::create_dir_all(&audio_dir).unwrap();
        // Leak tempdir so it lives for the test
        std::mem::forget(dir);

        let pool = DatabasePool::new(&url).await.unwrap();
        let config = GlobalConfig {
            perception,
            ..GlobalConfig::default()
        };
        AppState::from_parts(
            pool,
            BoxLlmProvider::new(ScriptedProvider),
            &config,
            audio_dir,
        )
        .unwrap()
    }

    async fn offline_router() -> Router {
        build_router(test_state(perception_at("http://127.0.0.1:1")).await)
    }

    async fn post_json(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        send(app, request).await
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn voice_request(fields: &[(&str, &str)], audio: Option<&[u8]>) -> Request<Body> {
        let boundary = "soultalk-test-boundary";
        let mut body = Vec::new();
        for (name, value) in fields {
            body.extend_from_slice(
                format!(
                    "--{boundary}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
                )
                .as_bytes(),
            );
        }
        if let Some(audio) = audio {
            body.extend_from_slice(
                format!(
                    "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"voice.wav\"\r\nContent-Type: audio/wav\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(audio);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri("/api/voice-message")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn new_session(app: &Router, email: &str) -> String {
        let (status, body) = post_json(app, "/api/session/new", json!({"email": email})).await;
        assert_eq!(status, StatusCode::OK);
        body["sessionId"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_health_check() {
        let app = offline_router().await;
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();

        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert!(body["version"].is_string());
    }

    #[tokio::test]
    async fn test_new_session_requires_email() {
        let app = offline_router().await;
        let (status, body) = post_json(&app, "/api/session/new", json!({})).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_INPUT");
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_unreadable_json_body_uses_error_envelope() {
        let app = offline_router().await;

        let malformed = Request::builder()
            .method("POST")
            .uri("/api/session/new")
            .header("content-type", "application/json")
            .body(Body::from("{\"email\": "))
            .unwrap();
        let (status, body) = send(&app, malformed).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_INPUT");
        assert!(body["error"].as_str().unwrap().starts_with("invalid JSON body"));

        let untyped = Request::builder()
            .method("POST")
            .uri("/api/message")
            .body(Body::from(json!({"email": ALICE}).to_string()))
            .unwrap();
        let (status, body) = send(&app, untyped).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_INPUT");
    }

    #[tokio::test]
    async fn test_session_lifecycle() {
        let app = offline_router().await;
        let first = new_session(&app, ALICE).await;
        let second = new_session(&app, ALICE).await;
        new_session(&app, "bob@example.com").await;

        let (status, body) = post_json(&app, "/api/session/list", json!({"email": ALICE})).await;
        assert_eq!(status, StatusCode::OK);
        let sessions = body["sessions"].as_array().unwrap();
        assert_eq!(sessions.len(), 2);
        assert!(sessions.iter().all(|s| s["email"] == ALICE && s["title"].is_null()));

        let (status, body) = post_json(
            &app,
            "/api/session/rename",
            json!({"email": ALICE, "sessionId": first, "title": "Late Night Talk"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);

        let (status, _) = post_json(
            &app,
            "/api/session/rename",
            json!({"email": ALICE, "sessionId": first, "title": "  "}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = post_json(
            &app,
            "/api/session/delete",
            json!({"email": ALICE, "sessionId": second}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Session deleted successfully");

        let (_, body) = post_json(&app, "/api/session/list", json!({"email": ALICE})).await;
        let sessions = body["sessions"].as_array().unwrap();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0]["sessionId"], first.as_str());
        assert_eq!(sessions[0]["title"], "Late Night Talk");
    }

    #[tokio::test]
    async fn test_other_owner_cannot_delete_or_rename() {
        let app = offline_router().await;
        let session_id = new_session(&app, ALICE).await;

        let (status, body) = post_json(
            &app,
            "/api/session/delete",
            json!({"email": "mallory@example.com", "sessionId": session_id}),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "NOT_FOUND");

        let (status, _) = post_json(
            &app,
            "/api/session/rename",
            json!({"email": "mallory@example.com", "sessionId": session_id, "title": "Mine"}),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (_, body) = post_json(&app, "/api/session/list", json!({"email": ALICE})).await;
        assert_eq!(body["sessions"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_messages_of_unknown_session_is_empty() {
        let app = offline_router().await;
        let (status, body) = post_json(
            &app,
            "/api/session/messages",
            json!({"sessionId": uuid::Uuid::now_v7().to_string()}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["messages"].as_array().unwrap().is_empty());

        let (status, _) = post_json(&app, "/api/session/messages", json!({})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_message_validation_and_unknown_session() {
        let app = offline_router().await;

        let (status, _) = post_json(
            &app,
            "/api/message",
            json!({"email": ALICE, "sessionId": "x", "message": "   "}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = post_json(
            &app,
            "/api/message",
            json!({"email": ALICE, "sessionId": uuid::Uuid::now_v7().to_string(), "message": "hello"}),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Session not found");
    }

    #[tokio::test]
    async fn test_unreachable_classifier_is_generic_500() {
        let app = offline_router().await;
        let session_id = new_session(&app, ALICE).await;

        let (status, body) = post_json(
            &app,
            "/api/message",
            json!({"email": ALICE, "sessionId": session_id, "message": "I feel lost"}),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Internal server error");
        assert_eq!(body["code"], "INTERNAL_ERROR");

        let (_, body) = post_json(&app, "/api/session/messages", json!({"sessionId": session_id})).await;
        assert!(body["messages"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_text_turns_end_to_end() {
        let base = spawn_perception().await;
        let app = build_router(test_state(perception_at(&base)).await);
        let session_id = new_session(&app, ALICE).await;

        let (status, body) = post_json(
            &app,
            "/api/message",
            json!({"email": ALICE, "sessionId": session_id, "message": "I can't sleep at night"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["emotion"], "SADNESS");
        assert_eq!(body["titleChanged"], true);
        assert_eq!(body["reply"], "That sounds hard. I'm here with you.");

        let (_, body) = post_json(
            &app,
            "/api/message",
            json!({"email": ALICE, "sessionId": session_id, "message": "Still awake"}),
        )
        .await;
        assert_eq!(body["titleChanged"], false);

        let (_, body) = post_json(&app, "/api/session/list", json!({"email": ALICE})).await;
        assert_eq!(body["sessions"][0]["title"], "Sleepless Nights");
        assert_eq!(body["sessions"][0]["emotion"], "SADNESS");

        let (_, body) = post_json(&app, "/api/session/messages", json!({"sessionId": session_id})).await;
        let messages = body["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0]["user_message"], "I can't sleep at night");
        assert_eq!(messages[1]["user_message"], "Still awake");
        assert_eq!(messages[1]["sessionId"], session_id.as_str());
    }

    #[tokio::test]
    async fn test_voice_turn_stores_and_serves_audio() {
        let base = spawn_perception().await;
        let app = build_router(test_state(perception_at(&base)).await);
        let session_id = new_session(&app, ALICE).await;

        let request = voice_request(
            &[("email", ALICE), ("sessionId", session_id.as_str())],
            Some(b"RIFF-fake-wav"),
        );
        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["emotion"], "FEAR");
        assert_eq!(body["transcription"], "I can't sleep");
        assert_eq!(body["titleChanged"], true);

        let audio_file = body["audioFile"].as_str().unwrap().to_string();
        assert!(audio_file.starts_with("/uploads/audio/"));

        let request = Request::builder().uri(&audio_file).body(Body::empty()).unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&bytes[..], b"RIFF-fake-wav");
    }

    #[tokio::test]
    async fn test_voice_message_validation() {
        let app = offline_router().await;

        let request = voice_request(&[("email", ALICE), ("sessionId", "x")], None);
        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_INPUT");

        let unknown = uuid::Uuid::now_v7().to_string();
        let request = voice_request(
            &[("email", ALICE), ("sessionId", unknown.as_str())],
            Some(b"RIFF"),
        );
        let (status, _) = send(&app, request).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
