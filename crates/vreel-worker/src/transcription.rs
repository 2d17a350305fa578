//! Timed transcription via the OpenAI Whisper API.

use std::path::Path;

use async_trait::async_trait;
use reqwest::{multipart, Client};
use serde::Deserialize;
use tracing::{debug, info};
use vreel_models::TimestampSegment;

use crate::config::{require_key, WhisperConfig};
use crate::error::{WorkerError, WorkerResult};
use crate::services::Transcriber;

/// Upload limit of the transcription endpoint.
pub const MAX_AUDIO_BYTES: u64 = 25 * 1024 * 1024;

/// Characters that close a sentence when merging words.
const SENTENCE_ENDERS: [char; 6] = ['.', '!', '?', '。', '！', '？'];

#[derive(Debug, Default, Deserialize)]
struct WhisperResponse {
    #[serde(default)]
    words: Vec<WhisperWord>,
    #[serde(default)]
    segments: Vec<WhisperSegment>,
}

#[derive(Debug, Clone, Deserialize)]
struct WhisperWord {
    word: String,
    start: f64,
    end: f64,
}

#[derive(Debug, Clone, Deserialize)]
struct WhisperSegment {
    start: f64,
    end: f64,
    text: String,
}

/// Transcriber backed by Whisper with word-level timestamps.
pub struct WhisperTranscriber {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl WhisperTranscriber {
    pub fn new(config: &WhisperConfig) -> WorkerResult<Self> {
        let api_key = require_key(&config.api_key, "OPENAI_API_KEY")?.to_string();
        Ok(Self {
            client: Client::new(),
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        })
    }

    async fn validate_audio(&self, audio_path: &Path) -> WorkerResult<()> {
        let metadata = tokio::fs::metadata(audio_path).await.map_err(|_| {
            WorkerError::transcription(format!("Audio file not found: {}", audio_path.display()))
        })?;

        if metadata.len() == 0 {
            return Err(WorkerError::transcription(format!(
                "Audio file is empty: {}",
                audio_path.display()
            )));
        }
        if metadata.len() > MAX_AUDIO_BYTES {
            return Err(WorkerError::transcription(format!(
                "Audio file exceeds 25MB limit: {} ({:.2}MB)",
                audio_path.display(),
                metadata.len() as f64 / 1024.0 / 1024.0
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl Transcriber for WhisperTranscriber {
    async fn transcribe(&self, audio_path: &Path) -> WorkerResult<Vec<TimestampSegment>> {
        self.validate_audio(audio_path).await?;

        let file_bytes = tokio::fs::read(audio_path).await?;
        let file_name = audio_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "audio.mp3".to_string());
        info!(path = %audio_path.display(), bytes = file_bytes.len(), "Transcribing narration");

        let file_part = multipart::Part::bytes(file_bytes)
            .file_name(file_name)
            .mime_str("audio/mpeg")
            .map_err(|e| WorkerError::transcription(format!("Invalid upload part: {}", e)))?;

        let form = multipart::Form::new()
            .part("file", file_part)
            .text("model", self.model.clone())
            .text("response_format", "verbose_json")
            .text("timestamp_granularities[]", "word");

        let response = self
            .client
            .post(format!("{}/audio/transcriptions", self.base_url))
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| WorkerError::transcription(format!("Whisper API request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(WorkerError::transcription(format!(
                "Whisper API error ({}): {}",
                status, error_body
            )));
        }

        let body: WhisperResponse = response.json().await.map_err(|e| {
            WorkerError::transcription(format!("Failed to parse Whisper response: {}", e))
        })?;

        let segments = extract_segments(body);
        info!(segments = segments.len(), "Transcription completed");
        Ok(segments)
    }
}

/// Prefer sentences merged from word timestamps, then the provider's own
/// segments. An empty result lets the timeline fall back to even slots.
fn extract_segments(response: WhisperResponse) -> Vec<TimestampSegment> {
    if !response.words.is_empty() {
        return merge_words(&response.words);
    }

    if !response.segments.is_empty() {
        return response
            .segments
            .into_iter()
            .map(|s| TimestampSegment::new(s.start, s.end, s.text.trim()))
            .filter(|s| !s.text.is_empty())
            .collect();
    }

    debug!("Whisper response had neither words nor segments");
    Vec::new()
}

fn ends_sentence(word: &str) -> bool {
    word.ends_with('\n') || word.trim().ends_with(SENTENCE_ENDERS)
}

/// Group words into sentence segments.
///
/// A sentence ends on a word ending in sentence punctuation or a newline;
/// the next sentence starts at the following word's start.
fn merge_words(words: &[WhisperWord]) -> Vec<TimestampSegment> {
    let Some(first) = words.first() else {
        return Vec::new();
    };

    let mut segments = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut sentence_start = first.start;

    for (i, word) in words.iter().enumerate() {
        current.push(&word.word);

        if ends_sentence(&word.word) {
            segments.push(TimestampSegment::new(
                sentence_start,
                word.end,
                current.join(" ").trim(),
            ));
            current.clear();
            sentence_start = words.get(i + 1).map_or(word.end, |next| next.start);
        }
    }

    if let (false, Some(last)) = (current.is_empty(), words.last()) {
        segments.push(TimestampSegment::new(
            sentence_start,
            last.end,
            current.join(" ").trim(),
        ));
    }

    segments.retain(|s| !s.text.is_empty());
    segments
}
