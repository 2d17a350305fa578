//! Pipeline configuration.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{WorkerError, WorkerResult};
use crate::tts::{DEFAULT_TTS_MODEL, DEFAULT_VOICE_ID};

pub const DEFAULT_ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com";
pub const DEFAULT_ANTHROPIC_MODEL: &str = "claude-sonnet-4-5";
pub const DEFAULT_MINIMAX_BASE_URL: &str = "https://api.minimaxi.com";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_WHISPER_MODEL: &str = "whisper-1";

/// Script-generation service settings.
#[derive(Debug, Clone)]
pub struct AnthropicConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    /// File overriding the built-in prompt template
    pub prompt_template: Option<PathBuf>,
}

/// Speech-synthesis service settings.
#[derive(Debug, Clone)]
pub struct MiniMaxConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    /// Voice used when a request does not name one
    pub voice_id: String,
    pub model: String,
}

/// Transcription service settings.
#[derive(Debug, Clone)]
pub struct WhisperConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
}

/// Render settings.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Remotion project directory
    pub remotion_dir: PathBuf,
    pub timeout: Option<Duration>,
    pub max_attempts: u32,
}

/// Full pipeline configuration.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub anthropic: AnthropicConfig,
    pub minimax: MiniMaxConfig,
    pub whisper: WhisperConfig,
    pub render: RenderConfig,
    /// Where videos and artifacts are written
    pub output_dir: PathBuf,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl PipelineConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create config from an arbitrary variable source. Blank values count
    /// as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            anthropic: AnthropicConfig {
                api_key: var("ANTHROPIC_API_KEY"),
                base_url: var("ANTHROPIC_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_ANTHROPIC_BASE_URL.to_string()),
                model: var("ANTHROPIC_MODEL")
                    .unwrap_or_else(|| DEFAULT_ANTHROPIC_MODEL.to_string()),
                prompt_template: var("SCRIPT_PROMPT_TEMPLATE").map(PathBuf::from),
            },
            minimax: MiniMaxConfig {
                api_key: var("MINIMAX_API_KEY").or_else(|| var("FAL_KEY")),
                base_url: var("MINIMAX_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_MINIMAX_BASE_URL.to_string()),
                voice_id: var("MINIMAX_VOICE_ID").unwrap_or_else(|| DEFAULT_VOICE_ID.to_string()),
                model: var("MINIMAX_MODEL").unwrap_or_else(|| DEFAULT_TTS_MODEL.to_string()),
            },
            whisper: WhisperConfig {
                api_key: var("OPENAI_API_KEY"),
                base_url: var("OPENAI_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
                model: var("WHISPER_MODEL").unwrap_or_else(|| DEFAULT_WHISPER_MODEL.to_string()),
            },
            render: RenderConfig {
                remotion_dir: var("REMOTION_DIR")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from("remotion")),
                timeout: Some(Duration::from_secs(
                    var("RENDER_TIMEOUT_SECS")
                        .and_then(|s| s.parse().ok())
                        .unwrap_or(1800),
                )),
                max_attempts: var("RENDER_MAX_ATTEMPTS")
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(3),
            },
            output_dir: var("VREEL_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("output").join("videos")),
        }
    }

    /// Names of required keys that are not set.
    pub fn missing_keys(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.anthropic.api_key.is_none() {
            missing.push("ANTHROPIC_API_KEY");
        }
        if self.minimax.api_key.is_none() {
            missing.push("MINIMAX_API_KEY");
        }
        if self.whisper.api_key.is_none() {
            missing.push("OPENAI_API_KEY");
        }
        missing
    }
}

/// Value of a required key, or a config error naming it.
pub(crate) fn require_key<'a>(value: &'a Option<String>, name: &str) -> WorkerResult<&'a str> {
    value
        .as_deref()
        .ok_or_else(|| WorkerError::config_error(format!("{} not set", name)))
}
