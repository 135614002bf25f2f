pub mod answer;
pub mod config;
pub mod error;
pub mod llm;
pub mod output;
pub mod pipeline;
pub mod prompt;
pub mod server;
pub mod transcript;
pub mod youtube;

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

pub use answer::{QaResult, ReplyFormat, parse_reply};
pub use error::{QaError, Result};
pub use llm::LlmClient;
pub use pipeline::{QaRequest, QaService};
pub use prompt::build_prompt;
pub use transcript::{TranscriptCache, TranscriptFetcher};
pub use youtube::{CaptionSource, YoutubeCaptions};

/// A single captioned segment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub text: String,
    pub start: f64,
    pub duration: f64,
}

// Watch, short and embed URLs first; then watch URLs where `v` is not the first parameter.
static VIDEO_ID_PATTERNS: LazyLock<[Regex; 2]> = LazyLock::new(|| {
    [
        Regex::new(r"(?:youtube\.com/watch\?v=|youtu\.be/|youtube\.com/embed/)([^&\n?#]+)").expect("valid regex"),
        Regex::new(r"youtube\.com/watch\?.*v=([^&\n?#]+)").expect("valid regex"),
    ]
});

/// Extract video ID from various YouTube URL formats.
///
/// Input that matches none of the known URL shapes is returned unchanged and
/// treated as a bare video ID.
pub fn extract_video_id(input: &str) -> String {
    VIDEO_ID_PATTERNS
        .iter()
        .find_map(|re| re.captures(input).map(|caps| caps[1].to_string()))
        .unwrap_or_else(|| input.to_string())
}
