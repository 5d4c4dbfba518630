use thiserror::Error;

#[derive(Error, Debug)]
pub enum SubcastError {
    #[error("{0}")]
    BadRequest(String),

    #[error("method not allowed")]
    MethodNotAllowed,

    #[error("source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("transcoding failed: {0}")]
    Transcode(String),

    #[error("transcription unavailable: {0}")]
    TranscriptionUnavailable(String),

    #[error("text generation failed: {0}")]
    GenerationFailed(String),

    #[error("speech synthesis failed: {0}")]
    SynthesisFailed(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl SubcastError {
    /// Machine-readable tag for the error class.
    pub fn kind(&self) -> &'static str {
        match self {
            SubcastError::BadRequest(_) => "bad_request",
            SubcastError::MethodNotAllowed => "method_not_allowed",
            SubcastError::SourceUnavailable(_) => "source_unavailable",
            SubcastError::Transcode(_) => "transcode_error",
            SubcastError::TranscriptionUnavailable(_) => "transcription_unavailable",
            SubcastError::GenerationFailed(_) => "generation_failed",
            SubcastError::SynthesisFailed(_) => "synthesis_failed",
            SubcastError::Config(_) => "config_error",
            SubcastError::Io(_) => "io_error",
            SubcastError::Http(_) => "http_error",
            SubcastError::Json(_) => "json_error",
            SubcastError::Internal(_) => "internal_error",
        }
    }
}

pub type Result<T> = std::result::Result<T, SubcastError>;
