//! Transcript acquisition with per-video memoization.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, LazyLock, Mutex, MutexGuard};

use log::debug;
use regex::Regex;

use crate::error::{QaError, Result};
use crate::youtube::CaptionSource;
use crate::{Segment, extract_video_id};

/// Language preference used when the caller supplies none
pub const DEFAULT_LANGUAGES: [&str; 3] = ["en", "en-US", "en-GB"];

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));
static BRACKETED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[.*?\]").expect("valid regex"));
static PARENTHETICAL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\(.*?\)").expect("valid regex"));

#[derive(Debug, Default)]
struct CacheInner {
    entries: HashMap<String, String>,
    order: VecDeque<String>,
}

/// Normalized transcripts keyed by video ID.
///
/// Unbounded unless built with [`TranscriptCache::with_capacity_limit`], in which
/// case the oldest insertion is evicted once the limit is reached. Cloning
/// shares the underlying storage.
#[derive(Debug, Clone, Default)]
pub struct TranscriptCache {
    inner: Arc<Mutex<CacheInner>>,
    capacity: Option<usize>,
}

impl TranscriptCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity_limit(capacity: usize) -> Self {
        Self {
            inner: Arc::default(),
            capacity: Some(capacity),
        }
    }

    // A poisoned lock still holds a consistent map: every write is a single insert or clear.
    fn lock(&self) -> MutexGuard<'_, CacheInner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn get(&self, video_id: &str) -> Option<String> {
        self.lock().entries.get(video_id).cloned()
    }

    pub fn insert(&self, video_id: &str, transcript: String) {
        if self.capacity == Some(0) {
            return;
        }
        let mut inner = self.lock();
        if inner.entries.insert(video_id.to_string(), transcript).is_some() {
            return;
        }
        inner.order.push_back(video_id.to_string());
        if let Some(capacity) = self.capacity {
            while inner.entries.len() > capacity {
                let Some(oldest) = inner.order.pop_front() else { break };
                debug!("Evicting cached transcript: {oldest}");
                inner.entries.remove(&oldest);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        let mut inner = self.lock();
        inner.entries.clear();
        inner.order.clear();
    }
}

/// Fetches transcripts from a [`CaptionSource`] and memoizes the normalized text.
#[derive(Clone)]
pub struct TranscriptFetcher {
    source: Arc<dyn CaptionSource>,
    cache: TranscriptCache,
}

impl TranscriptFetcher {
    pub fn new(source: Arc<dyn CaptionSource>, cache: TranscriptCache) -> Self {
        Self { source, cache }
    }

    pub fn cache(&self) -> &TranscriptCache {
        &self.cache
    }

    /// Normalized transcript text for a video URL or ID.
    ///
    /// A cached transcript is returned without contacting the caption source.
    pub async fn fetch(&self, video_ref: &str, languages: Option<&[String]>) -> Result<String> {
        let video_id = extract_video_id(video_ref);

        if let Some(cached) = self.cache.get(&video_id) {
            debug!("Transcript cache hit: {video_id}");
            return Ok(cached);
        }
        debug!("Transcript cache miss: {video_id}");

        let segments = self.fetch_segments(&video_id, languages).await?;
        let combined = segments.iter().map(|s| s.text.as_str()).collect::<Vec<_>>().join(" ");
        let transcript = normalize(&combined);

        self.cache.insert(&video_id, transcript.clone());
        Ok(transcript)
    }

    /// Raw caption segments with timing; bypasses the cache entirely.
    pub async fn fetch_with_timestamps(&self, video_ref: &str, languages: Option<&[String]>) -> Result<Vec<Segment>> {
        let video_id = extract_video_id(video_ref);
        self.fetch_segments(&video_id, languages).await
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    async fn fetch_segments(&self, video_id: &str, languages: Option<&[String]>) -> Result<Vec<Segment>> {
        let defaults: Vec<String>;
        let languages: &[String] = match languages {
            Some(langs) if !langs.is_empty() => langs,
            _ => {
                defaults = DEFAULT_LANGUAGES.iter().map(|l| l.to_string()).collect();
                &defaults
            }
        };

        self.source
            .fetch(video_id, languages)
            .await
            .map_err(|e| QaError::TranscriptUnavailable {
                video_id: video_id.to_string(),
                reason: format!("{e:#}"),
            })
    }
}

/// Collapse whitespace, strip `[...]` and `(...)` annotations, and trim.
pub fn normalize(text: &str) -> String {
    let collapsed = WHITESPACE.replace_all(text, " ");
    let stripped = BRACKETED.replace_all(&collapsed, "");
    let stripped = PARENTHETICAL.replace_all(&stripped, "");
    WHITESPACE.replace_all(&stripped, " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    struct StubSource {
        segments: Vec<Segment>,
        calls: AtomicUsize,
        last_languages: Mutex<Vec<String>>,
    }

    impl StubSource {
        fn new(texts: &[&str]) -> Self {
            let segments = texts
                .iter()
                .enumerate()
                .map(|(i, t)| Segment {
                    text: t.to_string(),
                    start: i as f64 * 2.0,
                    duration: 2.0,
                })
                .collect();
            Self {
                segments,
                calls: AtomicUsize::new(0),
                last_languages: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl CaptionSource for StubSource {
        async fn fetch(&self, _video_id: &str, languages: &[String]) -> eyre::Result<Vec<Segment>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_languages.lock().unwrap() = languages.to_vec();
            Ok(self.segments.clone())
        }
    }

    struct FailingSource;

    #[async_trait]
    impl CaptionSource for FailingSource {
        async fn fetch(&self, video_id: &str, _languages: &[String]) -> eyre::Result<Vec<Segment>> {
            eyre::bail!("no captions available for video {video_id}")
        }
    }

    fn fetcher(source: Arc<StubSource>) -> TranscriptFetcher {
        TranscriptFetcher::new(source, TranscriptCache::new())
    }

    #[test]
    fn test_normalize_strips_annotations() {
        assert_eq!(
            normalize("[music] Hello world. (laughs) This is a test. "),
            "Hello world. This is a test."
        );
    }

    #[test]
    fn test_normalize_collapses_whitespace() {
        assert_eq!(normalize("  one\n\ttwo   three "), "one two three");
    }

    #[test]
    fn test_normalize_shortest_match() {
        assert_eq!(normalize("a [x] b [y] c"), "a b c");
        assert_eq!(normalize("keep (this) and (that) out"), "keep and out");
    }

    #[test]
    fn test_normalize_idempotent() {
        let inputs = [
            "[Applause]  so  (inaudible) we begin",
            "plain text",
            "([nested]) leftover ) and [ open",
            "",
        ];
        for input in inputs {
            let once = normalize(input);
            assert_eq!(normalize(&once), once, "input: {input:?}");
        }
    }

    #[tokio::test]
    async fn test_fetch_joins_and_normalizes() {
        let source = Arc::new(StubSource::new(&["[music] Hello world.", "(laughs) This is a test."]));
        let transcript = fetcher(source).fetch("https://youtu.be/abc123", None).await.unwrap();
        assert_eq!(transcript, "Hello world. This is a test.");
    }

    #[tokio::test]
    async fn test_fetch_is_memoized() {
        let source = Arc::new(StubSource::new(&["Hello", "world"]));
        let fetcher = fetcher(source.clone());

        let first = fetcher.fetch("https://youtu.be/abc123", None).await.unwrap();
        let second = fetcher.fetch("https://www.youtube.com/watch?v=abc123", None).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(source.calls(), 1);
        assert_eq!(fetcher.cache().len(), 1);
    }

    #[tokio::test]
    async fn test_clear_cache_forces_refetch() {
        let source = Arc::new(StubSource::new(&["Hello"]));
        let fetcher = fetcher(source.clone());

        fetcher.fetch("abc123", None).await.unwrap();
        fetcher.clear_cache();
        assert!(fetcher.cache().is_empty());
        fetcher.fetch("abc123", None).await.unwrap();

        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn test_default_languages_passed_to_source() {
        let source = Arc::new(StubSource::new(&["Hello"]));
        fetcher(source.clone()).fetch("abc123", None).await.unwrap();
        assert_eq!(*source.last_languages.lock().unwrap(), vec!["en", "en-US", "en-GB"]);
    }

    #[tokio::test]
    async fn test_custom_languages_passed_to_source() {
        let source = Arc::new(StubSource::new(&["Hola"]));
        let langs = vec!["es".to_string()];
        fetcher(source.clone()).fetch("abc123", Some(&langs)).await.unwrap();
        assert_eq!(*source.last_languages.lock().unwrap(), vec!["es"]);
    }

    #[tokio::test]
    async fn test_fetch_with_timestamps_bypasses_cache() {
        let source = Arc::new(StubSource::new(&["[music] Hello", "world"]));
        let fetcher = fetcher(source.clone());

        let segments = fetcher.fetch_with_timestamps("abc123", None).await.unwrap();
        fetcher.fetch_with_timestamps("abc123", None).await.unwrap();

        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].text, "[music] Hello");
        assert_eq!(segments[1].start, 2.0);
        assert_eq!(source.calls(), 2);
        assert!(fetcher.cache().is_empty());
    }

    #[tokio::test]
    async fn test_source_failure_maps_to_transcript_unavailable() {
        let fetcher = TranscriptFetcher::new(Arc::new(FailingSource), TranscriptCache::new());
        let err = fetcher.fetch("https://youtu.be/abc123", None).await.unwrap_err();
        match err {
            QaError::TranscriptUnavailable { video_id, reason } => {
                assert_eq!(video_id, "abc123");
                assert!(reason.contains("no captions available"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(fetcher.cache().is_empty());
    }

    #[test]
    fn test_cache_capacity_evicts_oldest() {
        let cache = TranscriptCache::with_capacity_limit(2);
        cache.insert("a", "A".to_string());
        cache.insert("b", "B".to_string());
        cache.insert("a", "A2".to_string());
        cache.insert("c", "C".to_string());

        assert_eq!(cache.len(), 2);
        assert!(cache.get("a").is_none());
        assert_eq!(cache.get("b").as_deref(), Some("B"));
        assert_eq!(cache.get("c").as_deref(), Some("C"));
    }

    #[test]
    fn test_cache_clones_share_storage() {
        let cache = TranscriptCache::new();
        let other = cache.clone();
        cache.insert("a", "A".to_string());
        assert_eq!(other.get("a").as_deref(), Some("A"));
        other.clear();
        assert!(cache.is_empty());
    }
}
