//! HTTP server for translation and language detection

use crate::config::Config;
use crate::error::TranslationError;
use crate::languages::{self, Language, DEFAULT_LANGUAGE, SUPPORTED_LANGUAGES};
use crate::services::translator::TranslationPipeline;
use anyhow::{Context, Result};
use axum::{
    extract::{rejection::JsonRejection, Json, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{debug, error, info};

/// Shared state for API handlers
pub struct AppState {
    pub pipeline: TranslationPipeline,
}

/// Error response: `{ "error": message }` with a 400 or 500 status
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Internal(String),
}

impl ApiError {
    fn internal(message: String, fallback: &str) -> Self {
        if message.is_empty() {
            ApiError::Internal(fallback.to_string())
        } else {
            ApiError::Internal(message)
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::Internal(message) => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };
        (status, Json(ErrorBody { error })).into_response()
    }
}

/// Build the application router
pub fn router(state: AppState, cors: CorsLayer) -> Router {
    let api = Router::new()
        .route("/translate", post(translate))
        .route("/detect", post(detect))
        .route("/languages", get(list_languages))
        .layer(cors);

    Router::new()
        .route("/health", get(health))
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

/// Run the server until Ctrl-C
pub async fn serve(config: &Config, pipeline: TranslationPipeline) -> Result<()> {
    let cors = super::cors::layer(&config.server)?;
    let app = router(AppState { pipeline }, cors);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind server to {}", addr))?;

    info!("Verba listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => {
            error!("Failed to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
    }
}

/// Health check endpoint
async fn health() -> &'static str {
    "OK"
}

async fn list_languages() -> Json<&'static [Language]> {
    Json(SUPPORTED_LANGUAGES)
}

/// Keep a field only if it is present and non-empty
fn required(field: Option<String>) -> Option<String> {
    field.filter(|value| !value.is_empty())
}

fn invalid_body(rejection: JsonRejection) -> ApiError {
    debug!("Rejected request body: {}", rejection);
    ApiError::BadRequest(format!("Invalid request body: {}", rejection.body_text()))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TranslateRequest {
    text: Option<String>,
    source_language: Option<String>,
    target_language: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TranslateResponse {
    translated_text: String,
}

/// POST /api/translate
async fn translate(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<TranslateRequest>, JsonRejection>,
) -> Result<Json<TranslateResponse>, ApiError> {
    let Json(request) = payload.map_err(invalid_body)?;

    let (Some(text), Some(source), Some(target)) = (
        required(request.text),
        required(request.source_language),
        required(request.target_language),
    ) else {
        return Err(ApiError::BadRequest(
            "Missing required fields: text, sourceLanguage, targetLanguage".to_string(),
        ));
    };

    if source == target {
        return Ok(Json(TranslateResponse {
            translated_text: text,
        }));
    }

    if !languages::is_supported(&source) || !languages::is_supported(&target) {
        return Err(ApiError::BadRequest("Invalid language code".to_string()));
    }

    match state.pipeline.translate(&text, &source, &target).await {
        Ok(translated_text) => Ok(Json(TranslateResponse { translated_text })),
        Err(e @ TranslationError::UnsupportedLanguage(_)) => {
            Err(ApiError::BadRequest(e.to_string()))
        }
        Err(e) => {
            error!("Translation API error: {}", e);
            Err(ApiError::internal(e.to_string(), "Unknown translation error"))
        }
    }
}

#[derive(Deserialize)]
struct DetectRequest {
    text: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DetectResponse {
    detected_language: String,
}

/// POST /api/detect
async fn detect(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<DetectRequest>, JsonRejection>,
) -> Result<Json<DetectResponse>, ApiError> {
    let Json(request) = payload.map_err(invalid_body)?;

    let Some(text) = required(request.text) else {
        return Err(ApiError::BadRequest(
            "Missing required field: text".to_string(),
        ));
    };

    if text.trim().is_empty() {
        return Ok(Json(DetectResponse {
            detected_language: DEFAULT_LANGUAGE.to_string(),
        }));
    }

    match state.pipeline.detect_language(&text).await {
        Ok(detected_language) => Ok(Json(DetectResponse { detected_language })),
        Err(e) => {
            error!("Language detection API error: {}", e);
            Err(ApiError::internal(e.to_string(), "Unknown language detection error"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;
    use crate::services::model::fake::ScriptedModel;
    use crate::services::translator::FailurePolicy;
    use axum::body::Body;
    use axum::http::{header, Request};
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn app(pipeline: TranslationPipeline) -> Router {
        let cors = crate::api::cors::layer(&ServerConfig::default()).unwrap();
        router(AppState { pipeline }, cors)
    }

    fn app_with(model: &Arc<ScriptedModel>) -> Router {
        app(TranslationPipeline::new(model.clone()).unwrap())
    }

    async fn post_json(app: Router, uri: &str, body: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_translate_success() {
        let model = ScriptedModel::replying("  Hallo Welt ");
        let body = json!({ "text": "Hello world", "sourceLanguage": "en", "targetLanguage": "de" });

        let (status, json) = post_json(app_with(&model), "/api/translate", &body.to_string()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, json!({ "translatedText": "Hallo Welt" }));
        assert_eq!(model.calls(), 1);
    }

    #[tokio::test]
    async fn test_translate_same_language_short_circuits() {
        let model = ScriptedModel::replying("unused");
        let body = json!({ "text": "Hola", "sourceLanguage": "zz", "targetLanguage": "zz" });

        let (status, json) = post_json(app_with(&model), "/api/translate", &body.to_string()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["translatedText"], "Hola");
        assert_eq!(model.calls(), 0);
    }

    #[tokio::test]
    async fn test_translate_missing_fields() {
        let model = ScriptedModel::replying("unused");

        for body in [
            json!({ "sourceLanguage": "en", "targetLanguage": "fr" }),
            json!({ "text": "", "sourceLanguage": "en", "targetLanguage": "fr" }),
            json!({ "text": "Hi", "targetLanguage": "fr" }),
            json!({ "text": 42, "sourceLanguage": "en", "targetLanguage": "fr" }),
        ] {
            let (status, json) =
                post_json(app_with(&model), "/api/translate", &body.to_string()).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert!(json["error"].is_string());
        }

        let (status, _) = post_json(app_with(&model), "/api/translate", "{not json").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(model.calls(), 0);
    }

    #[tokio::test]
    async fn test_translate_invalid_language() {
        let model = ScriptedModel::replying("unused");
        let body = json!({ "text": "Hi", "sourceLanguage": "en", "targetLanguage": "klingon" });

        let (status, json) = post_json(app_with(&model), "/api/translate", &body.to_string()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json, json!({ "error": "Invalid language code" }));
        assert_eq!(model.calls(), 0);
    }

    #[tokio::test]
    async fn test_model_failure_translate_500_detect_200() {
        let model = ScriptedModel::failing(503);

        let body = json!({ "text": "Hi", "sourceLanguage": "en", "targetLanguage": "fr" });
        let (status, json) = post_json(app_with(&model), "/api/translate", &body.to_string()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(json["error"].as_str().unwrap().contains("503"));

        let body = json!({ "text": "Bonjour tout le monde" });
        let (status, json) = post_json(app_with(&model), "/api/detect", &body.to_string()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, json!({ "detectedLanguage": "en" }));
    }

    #[tokio::test]
    async fn test_detect_normalizes_model_output() {
        let model = ScriptedModel::replying(" FR ");
        let body = json!({ "text": "Bonjour tout le monde" });

        let (status, json) = post_json(app_with(&model), "/api/detect", &body.to_string()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, json!({ "detectedLanguage": "fr" }));
    }

    #[tokio::test]
    async fn test_detect_blank_and_missing() {
        let model = ScriptedModel::replying("de");

        let (status, json) = post_json(app_with(&model), "/api/detect", r#"{"text":"   "}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["detectedLanguage"], "en");

        let (status, json) = post_json(app_with(&model), "/api/detect", r#"{}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "Missing required field: text");

        assert_eq!(model.calls(), 0);
    }

    #[tokio::test]
    async fn test_detect_unexpected_failure_is_500() {
        let model = ScriptedModel::failing(500);
        let pipeline = TranslationPipeline::new(model)
            .unwrap()
            .with_detect_policy(FailurePolicy::FailClosed);

        let (status, json) = post_json(app(pipeline), "/api/detect", r#"{"text":"Hola"}"#).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(json["error"].is_string());
    }

    #[tokio::test]
    async fn test_languages_and_health() {
        let model = ScriptedModel::replying("unused");

        let response = app_with(&model)
            .oneshot(Request::builder().uri("/api/languages").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json.as_array().unwrap().len(), SUPPORTED_LANGUAGES.len());
        assert_eq!(json[0]["code"], "en");

        let response = app_with(&model)
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_cors_headers_on_api() {
        let model = ScriptedModel::replying("unused");
        let request = Request::builder()
            .uri("/api/languages")
            .header(header::ORIGIN, "https://somewhere.example")
            .body(Body::empty())
            .unwrap();

        let response = app_with(&model).oneshot(request).await.unwrap();
        let headers = response.headers();
        assert_eq!(
            headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "https://somewhere.example"
        );
        assert_eq!(
            headers.get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS).unwrap(),
            "true"
        );
    }

    #[tokio::test]
    async fn test_cors_production_restricts_origin() {
        let config = ServerConfig {
            production: true,
            public_url: Some("https://translate.example.com".to_string()),
            ..ServerConfig::default()
        };
        let model = ScriptedModel::replying("unused");
        let app = router(
            AppState {
                pipeline: TranslationPipeline::new(model).unwrap(),
            },
            crate::api::cors::layer(&config).unwrap(),
        );

        let request = Request::builder()
            .uri("/api/languages")
            .header(header::ORIGIN, "https://evil.example")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert!(response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .is_none());
    }

    #[tokio::test]
    async fn test_internal_error_fallback_message() {
        let cases = [
            (String::new(), "Unknown translation error"),
            ("quota exceeded".to_string(), "quota exceeded"),
        ];

        for (message, expected) in cases {
            let response = ApiError::internal(message, "Unknown translation error").into_response();
            assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

            let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
                .await
                .unwrap();
            let json: Value = serde_json::from_slice(&bytes).unwrap();
            assert_eq!(json, json!({ "error": expected }));
        }
    }
}
