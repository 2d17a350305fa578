//! Narration synthesis via the MiniMax text-to-speech API.
//!
//! The API either answers with an audio URL directly or with a request ID
//! that is polled until the audio is ready. The audio is then downloaded
//! to `{output_dir}/audio/{job_id}.mp3`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::{require_key, MiniMaxConfig};
use crate::error::{WorkerError, WorkerResult};
use crate::retry::{retry_async, RetryConfig};
use crate::services::{SpeechOptions, SpeechSynthesizer};

pub const DEFAULT_VOICE_ID: &str = "z0000000425";
pub const DEFAULT_SPEED: f64 = 1.15;
pub const DEFAULT_TTS_MODEL: &str = "speech-01-mini-24k";

pub const MIN_SPEED: f64 = 0.5;
pub const MAX_SPEED: f64 = 2.0;

const SUBMIT_TIMEOUT: Duration = Duration::from_secs(120);
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Serialize)]
struct SynthesisRequest<'a> {
    text: &'a str,
    voice_id: &'a str,
    speed: f64,
    model: &'a str,
}

#[derive(Debug, Deserialize)]
struct SynthesisResponse {
    #[serde(default)]
    request_id: Option<String>,
    #[serde(default)]
    audio_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StatusResponse {
    status: String,
    #[serde(default)]
    audio: Option<String>,
    #[serde(default)]
    output: Option<String>,
}

/// Speech synthesizer backed by MiniMax.
pub struct MiniMaxSynthesizer {
    client: Client,
    api_key: String,
    base_url: String,
    output_dir: PathBuf,
    voice_id: String,
    speed: f64,
    model: String,
    poll_interval: Duration,
    max_polls: u32,
    retry: RetryConfig,
}

impl MiniMaxSynthesizer {
    /// Create a synthesizer writing audio under `output_dir/audio`.
    pub fn new(config: &MiniMaxConfig, output_dir: impl Into<PathBuf>) -> WorkerResult<Self> {
        let api_key = require_key(&config.api_key, "MINIMAX_API_KEY")?.to_string();

        Ok(Self {
            client: Client::new(),
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            output_dir: output_dir.into(),
            voice_id: config.voice_id.clone(),
            speed: DEFAULT_SPEED,
            model: config.model.clone(),
            poll_interval: Duration::from_secs(2),
            max_polls: 150,
            retry: RetryConfig::new("tts")
                .with_max_retries(2)
                .with_base_delay(Duration::from_millis(500)),
        })
    }

    pub fn with_poll_interval(mut self, interval: Duration, max_polls: u32) -> Self {
        self.poll_interval = interval;
        self.max_polls = max_polls;
        self
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Where the audio for `job_id` is written.
    pub fn audio_path(&self, job_id: &str) -> PathBuf {
        self.output_dir.join("audio").join(format!("{}.mp3", job_id))
    }

    async fn synthesize_once(
        &self,
        text: &str,
        voice_id: &str,
        speed: f64,
        target: &Path,
    ) -> WorkerResult<()> {
        let url = format!("{}/v1/text_to_speech_v2", self.base_url);
        let request = SynthesisRequest {
            text,
            voice_id,
            speed,
            model: &self.model,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .timeout(SUBMIT_TIMEOUT)
            .json(&request)
            .send()
            .await
            .map_err(|e| WorkerError::tts(format!("MiniMax request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(WorkerError::tts(format!(
                "MiniMax API returned {}: {}",
                status, error_text
            )));
        }

        let body: SynthesisResponse = response
            .json()
            .await
            .map_err(|e| WorkerError::tts(format!("Failed to parse MiniMax response: {}", e)))?;

        let audio_url = match (body.audio_url, body.request_id) {
            (Some(url), _) => url,
            (None, Some(request_id)) => self.poll_for_audio(&request_id).await?,
            (None, None) => return Err(WorkerError::tts("Invalid response from MiniMax API")),
        };

        self.download(&audio_url, target).await
    }

    async fn poll_for_audio(&self, request_id: &str) -> WorkerResult<String> {
        let url = format!("{}/v1/query/async_status/{}", self.base_url, request_id);
        debug!(request_id, "Polling MiniMax task");

        for _ in 0..self.max_polls {
            let response = self
                .client
                .get(&url)
                .bearer_auth(&self.api_key)
                .send()
                .await
                .map_err(|e| WorkerError::tts(format!("MiniMax status request failed: {}", e)))?;

            if !response.status().is_success() {
                return Err(WorkerError::tts(format!(
                    "MiniMax status returned {}",
                    response.status()
                )));
            }

            let body: StatusResponse = response
                .json()
                .await
                .map_err(|e| WorkerError::tts(format!("Failed to parse MiniMax status: {}", e)))?;

            match body.status.as_str() {
                "Success" => {
                    return body
                        .audio
                        .or(body.output)
                        .filter(|u| !u.is_empty())
                        .ok_or_else(|| WorkerError::tts("No audio URL in result"));
                }
                "Failed" => {
                    return Err(WorkerError::tts(format!(
                        "TTS generation failed for request {}",
                        request_id
                    )))
                }
                "InProgress" | "Queueing" => tokio::time::sleep(self.poll_interval).await,
                other => return Err(WorkerError::tts(format!("Unknown status: {}", other))),
            }
        }

        Err(WorkerError::tts(format!(
            "TTS request {} still pending after {} polls",
            request_id, self.max_polls
        )))
    }

    async fn download(&self, url: &str, target: &Path) -> WorkerResult<()> {
        let response = self
            .client
            .get(url)
            .timeout(DOWNLOAD_TIMEOUT)
            .send()
            .await
            .map_err(|e| WorkerError::tts(format!("Audio download failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(WorkerError::tts(format!(
                "Audio download returned {}",
                response.status()
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| WorkerError::tts(format!("Audio download failed: {}", e)))?;

        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(target, &bytes).await?;
        debug!(path = %target.display(), bytes = bytes.len(), "Audio saved");
        Ok(())
    }
}

#[async_trait]
impl SpeechSynthesizer for MiniMaxSynthesizer {
    async fn synthesize(
        &self,
        text: &str,
        job_id: &str,
        options: &SpeechOptions,
    ) -> WorkerResult<PathBuf> {
        let voice_id = options.voice_id.as_deref().unwrap_or(&self.voice_id);
        let speed = options.speed.unwrap_or(self.speed);

        if text.trim().is_empty() {
            return Err(WorkerError::tts("Text cannot be empty"));
        }
        if !(MIN_SPEED..=MAX_SPEED).contains(&speed) {
            return Err(WorkerError::tts(format!(
                "Speed must be between {} and {}, got {}",
                MIN_SPEED, MAX_SPEED, speed
            )));
        }

        let target = self.audio_path(job_id);
        info!(job_id, voice_id, speed, chars = text.chars().count(), "Synthesizing narration");

        retry_async(&self.retry, || self.synthesize_once(text, voice_id, speed, &target))
            .await
            .into_result()
            .map_err(|e| match e {
                WorkerError::Tts(msg) => WorkerError::tts(format!(
                    "Failed after {} attempts: {}",
                    self.retry.max_attempts(),
                    msg
                )),
                other => other,
            })?;

        info!(job_id, path = %target.display(), "Narration synthesized");
        Ok(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;
    use wiremock::matchers::{bearer_token, body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn minimax_config(base_url: String) -> MiniMaxConfig {
        MiniMaxConfig {
            api_key: Some("mm-key".to_string()),
            base_url,
            voice_id: DEFAULT_VOICE_ID.to_string(),
            model: DEFAULT_TTS_MODEL.to_string(),
        }
    }

    fn synthesizer(server: &MockServer, dir: &TempDir) -> MiniMaxSynthesizer {
        synthesizer_with(minimax_config(server.uri()), dir)
    }

    fn synthesizer_with(config: MiniMaxConfig, dir: &TempDir) -> MiniMaxSynthesizer {
        MiniMaxSynthesizer::new(&config, dir.path())
            .unwrap()
            .with_poll_interval(Duration::from_millis(5), 10)
            .with_retry(
                RetryConfig::new("tts")
                    .with_max_retries(2)
                    .with_base_delay(Duration::from_millis(1)),
            )
    }

    async fn mount_audio(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/files/voice.mp3"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"ID3audio".to_vec()))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_direct_audio_url() {
        let server = MockServer::start().await;
        let dir = TempDir::new().unwrap();
        Mock::given(method("POST"))
            .and(path("/v1/text_to_speech_v2"))
            .and(bearer_token("mm-key"))
            .and(body_partial_json(json!({
                "voice_id": DEFAULT_VOICE_ID,
                "speed": DEFAULT_SPEED,
                "model": DEFAULT_TTS_MODEL
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "audio_url": format!("{}/files/voice.mp3", server.uri())
            })))
            .expect(1)
            .mount(&server)
            .await;
        mount_audio(&server).await;

        let tts = synthesizer(&server, &dir);
        let path = tts
            .synthesize("Hello there", "job-1", &SpeechOptions::default())
            .await
            .unwrap();

        assert_eq!(path, dir.path().join("audio/job-1.mp3"));
        assert_eq!(std::fs::read(&path).unwrap(), b"ID3audio");
    }

    #[tokio::test]
    async fn test_configured_voice_and_model_are_sent() {
        let server = MockServer::start().await;
        let dir = TempDir::new().unwrap();
        Mock::given(method("POST"))
            .and(path("/v1/text_to_speech_v2"))
            .and(body_partial_json(json!({
                "voice_id": "narrator-2",
                "model": "speech-02-hd"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "audio_url": format!("{}/files/voice.mp3", server.uri())
            })))
            .expect(1)
            .mount(&server)
            .await;
        mount_audio(&server).await;

        let mut config = minimax_config(server.uri());
        config.voice_id = "narrator-2".to_string();
        config.model = "speech-02-hd".to_string();
        let tts = synthesizer_with(config, &dir);
        tts.synthesize("Hello", "job-voice", &SpeechOptions::default())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_polls_until_success() {
        let server = MockServer::start().await;
        let dir = TempDir::new().unwrap();
        Mock::given(method("POST"))
            .and(path("/v1/text_to_speech_v2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"request_id": "req-9"})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/query/async_status/req-9"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "Queueing"})))
            .up_to_n_times(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/query/async_status/req-9"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "Success",
                "output": format!("{}/files/voice.mp3", server.uri())
            })))
            .mount(&server)
            .await;
        mount_audio(&server).await;

        let tts = synthesizer(&server, &dir);
        let options = SpeechOptions {
            voice_id: Some("custom-voice".to_string()),
            speed: Some(1.0),
        };
        let path = tts.synthesize("Hello", "job-2", &options).await.unwrap();
        assert!(path.exists());

        let requests = server.received_requests().await.unwrap();
        let submit: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert_eq!(submit["voice_id"], "custom-voice");
        assert_eq!(submit["speed"], 1.0);
    }

    #[tokio::test]
    async fn test_failed_status_is_error() {
        let server = MockServer::start().await;
        let dir = TempDir::new().unwrap();
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"request_id": "bad"})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/query/async_status/bad"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "Failed"})))
            .mount(&server)
            .await;

        let tts = synthesizer(&server, &dir);
        let err = tts
            .synthesize("Hello", "job-3", &SpeechOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, WorkerError::Tts(_)));
        assert!(err.to_string().contains("failed"));
    }

    #[tokio::test]
    async fn test_transient_failure_is_retried() {
        let server = MockServer::start().await;
        let dir = TempDir::new().unwrap();
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "audio_url": format!("{}/files/voice.mp3", server.uri())
            })))
            .mount(&server)
            .await;
        mount_audio(&server).await;

        let tts = synthesizer(&server, &dir);
        assert!(tts
            .synthesize("Hello", "job-4", &SpeechOptions::default())
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_gives_up_after_three_attempts() {
        let server = MockServer::start().await;
        let dir = TempDir::new().unwrap();
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .expect(3)
            .mount(&server)
            .await;

        let tts = synthesizer(&server, &dir);
        let err = tts
            .synthesize("Hello", "job-5", &SpeechOptions::default())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("after 3 attempts"));
    }

    #[tokio::test]
    async fn test_input_validation_skips_network() {
        let server = MockServer::start().await;
        let dir = TempDir::new().unwrap();
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let tts = synthesizer(&server, &dir);
        assert!(tts
            .synthesize("  ", "job", &SpeechOptions::default())
            .await
            .is_err());

        for speed in [0.4, 2.01] {
            let options = SpeechOptions {
                voice_id: None,
                speed: Some(speed),
            };
            let err = tts.synthesize("Hello", "job", &options).await.unwrap_err();
            assert!(err.to_string().contains("Speed must be between"));
        }
    }

    #[test]
    fn test_missing_key() {
        let mut config = minimax_config("http://localhost".to_string());
        config.api_key = None;
        assert!(matches!(
            MiniMaxSynthesizer::new(&config, "/tmp"),
            Err(WorkerError::Config(_))
        ));
    }
}
