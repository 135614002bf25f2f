use thiserror::Error;

/// Failures of the question-answering pipeline.
///
/// The HTTP boundary renders every variant through `Display` into a single
/// error shape; callers inside the crate can still match on the kind.
#[derive(Error, Debug)]
pub enum QaError {
    #[error("Failed to get transcript for video {video_id}: {reason}")]
    TranscriptUnavailable { video_id: String, reason: String },

    #[error("No API key found. Set GROQ_API_KEY environment variable.")]
    CredentialMissing,

    #[error("LLM API request failed with status {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("LLM API request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected LLM API response format: {0}")]
    MalformedReply(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

pub type Result<T> = std::result::Result<T, QaError>;
