use std::sync::Arc;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::answer::{QaResult, parse_reply};
use crate::error::{QaError, Result};
use crate::llm::LlmClient;
use crate::prompt::build_prompt;
use crate::transcript::{TranscriptCache, TranscriptFetcher};
use crate::youtube::CaptionSource;
use crate::{Segment, extract_video_id};

/// A question about one video
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QaRequest {
    pub video_url: String,
    pub question: String,
}

/// Runs transcript fetch, prompt, completion and reply parsing in sequence
#[derive(Clone)]
pub struct QaService {
    transcripts: TranscriptFetcher,
    llm: LlmClient,
    languages: Option<Vec<String>>,
}

impl QaService {
    pub fn new(source: Arc<dyn CaptionSource>, cache: TranscriptCache, llm: LlmClient) -> Self {
        Self {
            transcripts: TranscriptFetcher::new(source, cache),
            llm,
            languages: None,
        }
    }

    /// Override the default caption language preference.
    pub fn with_languages(mut self, languages: Vec<String>) -> Self {
        self.languages = Some(languages).filter(|l| !l.is_empty());
        self
    }

    pub async fn ask(&self, request: &QaRequest) -> Result<QaResult> {
        if request.video_url.trim().is_empty() {
            return Err(QaError::InvalidRequest("video_url must not be empty".to_string()));
        }
        if request.question.trim().is_empty() {
            return Err(QaError::InvalidRequest("question must not be empty".to_string()));
        }

        info!("Answering question for {}", extract_video_id(&request.video_url));

        let transcript = self
            .transcripts
            .fetch(&request.video_url, self.languages.as_deref())
            .await?;
        debug!("Transcript length: {} chars", transcript.chars().count());

        let prompt = build_prompt(&transcript, &request.question);
        let reply = self.llm.complete(&prompt).await?;
        let result = parse_reply(&reply);
        debug!("Parsed reply format: {:?}", result.format);

        Ok(result)
    }

    /// Normalized transcript text, served from the cache when present.
    pub async fn transcript(&self, video_ref: &str) -> Result<String> {
        self.transcripts.fetch(video_ref, self.languages.as_deref()).await
    }

    pub async fn transcript_segments(&self, video_ref: &str) -> Result<Vec<Segment>> {
        self.transcripts
            .fetch_with_timestamps(video_ref, self.languages.as_deref())
            .await
    }

    pub fn clear_cache(&self) {
        self.transcripts.clear_cache();
    }
}
