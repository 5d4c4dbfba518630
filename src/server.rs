//! HTTP surface: multipart endpoints for subtitling and narration.
//!
//! Both endpoints accept POST multipart forms only. Subtitling replies with a
//! binary video stream and plain-text errors; narration replies with JSON
//! either way.

use crate::config::Config;
use crate::error::{Result, SubcastError};
use crate::generate::OpenAiGenerator;
use crate::media::{FfmpegTranscoder, MediaSource, YtDlpFetcher};
use crate::pipeline::{NarrationOutput, Pipeline, PipelineOptions, SubtitleOutput};
use crate::synthesize::NijivoiceSynthesizer;
use crate::transcribe::WhisperClient;

use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::error;

/// Upper bound for multipart bodies; uploads are whole videos.
const MAX_BODY_BYTES: usize = 512 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
}

pub fn router(config: Arc<Config>) -> Router {
    let state = AppState { config };
    Router::new()
        .route("/health", get(health))
        .route(
            "/api/subtitles",
            post(subtitle_video).fallback(method_not_allowed),
        )
        .route(
            "/api/narration",
            post(narration).fallback(method_not_allowed),
        )
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn method_not_allowed() -> Response {
    let err = SubcastError::MethodNotAllowed;
    (status_for(&err), err.to_string()).into_response()
}

fn status_for(err: &SubcastError) -> StatusCode {
    match err {
        SubcastError::BadRequest(_) => StatusCode::BAD_REQUEST,
        SubcastError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn build_pipeline(config: &Config, api_key: &str, voice_api_key: Option<&str>) -> Pipeline {
    let options = PipelineOptions {
        spoken_language: config.spoken_language.clone(),
        subtitle_language: config.subtitle_language.clone(),
        narration_language: config.narration_language.clone(),
        min_subtitle_duration: Duration::from_millis(config.min_subtitle_duration_ms),
        stage_timeout: Duration::from_secs(config.stage_timeout_secs),
    };

    let mut pipeline = Pipeline::new(
        Arc::new(YtDlpFetcher::new()),
        Arc::new(FfmpegTranscoder::new()),
        Arc::new(WhisperClient::new(api_key.to_string())),
        Arc::new(OpenAiGenerator::new(api_key.to_string())),
        options,
    );

    if let Some(key) = voice_api_key {
        pipeline = pipeline.with_synthesizer(Arc::new(
            NijivoiceSynthesizer::new(key.to_string())
                .with_voice_actor(config.voice_actor_id.clone()),
        ));
    }

    pipeline
}

// ---------------------------------------------------------------------------
// Subtitle burn-in
// ---------------------------------------------------------------------------

#[derive(Default)]
struct SubtitleForm {
    video: Option<(String, Vec<u8>)>,
    url: Option<String>,
    api_key: Option<String>,
}

async fn read_subtitle_form(mut multipart: Multipart) -> Result<SubtitleForm> {
    let mut form = SubtitleForm::default();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| SubcastError::BadRequest(format!("malformed multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "video" => {
                let file_name = field.file_name().unwrap_or("upload.mp4").to_string();
                let bytes = field.bytes().await.map_err(|e| {
                    SubcastError::BadRequest(format!("failed to read upload: {e}"))
                })?;
                form.video = Some((file_name, bytes.to_vec()));
            }
            "url" => {
                form.url = Some(field.text().await.map_err(|e| {
                    SubcastError::BadRequest(format!("failed to read url field: {e}"))
                })?);
            }
            "api_key" => {
                form.api_key = Some(field.text().await.map_err(|e| {
                    SubcastError::BadRequest(format!("failed to read api_key field: {e}"))
                })?);
            }
            _ => {}
        }
    }
    Ok(form)
}

async fn subtitle_video(State(state): State<AppState>, multipart: Multipart) -> Response {
    match handle_subtitles(state, multipart).await {
        Ok(output) => subtitle_response(output),
        Err(err) => {
            error!("subtitle request failed ({}): {}", err.kind(), err);
            (status_for(&err), err.to_string()).into_response()
        }
    }
}

async fn handle_subtitles(state: AppState, multipart: Multipart) -> Result<SubtitleOutput> {
    let form = read_subtitle_form(multipart).await?;

    let api_key = form
        .api_key
        .filter(|k| !k.trim().is_empty())
        .or_else(|| state.config.openai_api_key.clone())
        .ok_or_else(|| {
            SubcastError::BadRequest("a transcription API key is required".to_string())
        })?;

    let source = match (form.video, form.url) {
        (Some((file_name, bytes)), _) => MediaSource::Upload { file_name, bytes },
        (None, Some(url)) if !url.trim().is_empty() => MediaSource::Url(url),
        _ => {
            return Err(SubcastError::BadRequest(
                "provide a video upload or a video URL".to_string(),
            ))
        }
    };

    let pipeline = build_pipeline(&state.config, &api_key, None);
    pipeline.subtitle_video(source).await
}

fn subtitle_response(output: SubtitleOutput) -> Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, output.media_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", output.file_name),
            ),
        ],
        output.video,
    )
        .into_response()
}

// ---------------------------------------------------------------------------
// Narration
// ---------------------------------------------------------------------------

#[derive(Default)]
struct NarrationForm {
    url: Option<String>,
    api_key: Option<String>,
    voice_api_key: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct NarrationResponse {
    success: bool,
    audio_data: String,
    message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct NarrationErrorResponse {
    success: bool,
    kind: &'static str,
    message: String,
}

async fn read_narration_form(mut multipart: Multipart) -> Result<NarrationForm> {
    let mut form = NarrationForm::default();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| SubcastError::BadRequest(format!("malformed multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        let value = field
            .text()
            .await
            .map_err(|e| SubcastError::BadRequest(format!("failed to read {name} field: {e}")))?;
        match name.as_str() {
            "url" => form.url = Some(value),
            "api_key" => form.api_key = Some(value),
            "voice_api_key" => form.voice_api_key = Some(value),
            _ => {}
        }
    }
    Ok(form)
}

async fn narration(State(state): State<AppState>, multipart: Multipart) -> Response {
    match handle_narration(state, multipart).await {
        Ok(output) => (
            StatusCode::OK,
            Json(NarrationResponse {
                success: true,
                audio_data: output.audio_data,
                message: "narration generated".to_string(),
            }),
        )
            .into_response(),
        Err(err) => {
            error!("narration request failed ({}): {}", err.kind(), err);
            (
                status_for(&err),
                Json(NarrationErrorResponse {
                    success: false,
                    kind: err.kind(),
                    message: err.to_string(),
                }),
            )
                .into_response()
        }
    }
}

async fn handle_narration(state: AppState, multipart: Multipart) -> Result<NarrationOutput> {
    let form = read_narration_form(multipart).await?;

    let url = form
        .url
        .filter(|u| !u.trim().is_empty())
        .ok_or_else(|| SubcastError::BadRequest("a video URL is required".to_string()))?;

    let api_key = form
        .api_key
        .filter(|k| !k.trim().is_empty())
        .or_else(|| state.config.openai_api_key.clone())
        .ok_or_else(|| {
            SubcastError::BadRequest("a transcription API key is required".to_string())
        })?;

    let voice_api_key = form
        .voice_api_key
        .filter(|k| !k.trim().is_empty())
        .or_else(|| state.config.voice_api_key.clone())
        .ok_or_else(|| {
            SubcastError::BadRequest("a speech synthesis API key is required".to_string())
        })?;

    let pipeline = build_pipeline(&state.config, &api_key, Some(&voice_api_key));
    pipeline.narrate(&url).await
}
