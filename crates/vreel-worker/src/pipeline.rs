//! End-to-end video pipeline.
//!
//! Stages run strictly in order: script, narration audio, timestamps,
//! scene orchestration, artifact persistence, render. Every collaborator is
//! injected, so the same pipeline runs against real services or doubles.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn, Instrument};
use uuid::Uuid;
use vreel_media::{ProgressCallback, RemotionRunner, RenderProgress, RenderRequest};
use vreel_models::{format_duration, GeneratedScript, TimestampSegment};
use vreel_timeline::{orchestrate_scenes, Orchestration};

use crate::artifacts::{load_json, save_artifacts, ArtifactPaths};
use crate::config::PipelineConfig;
use crate::error::WorkerResult;
use crate::logging::JobLogger;
use crate::metrics;
use crate::renderer::RemotionVideoRenderer;
use crate::script_generator::AnthropicScriptGenerator;
use crate::services::{
    ScriptGenerator, SpeechOptions, SpeechSynthesizer, Transcriber, VideoRenderer,
};
use crate::transcription::WhisperTranscriber;
use crate::tts::MiniMaxSynthesizer;

/// Render progress is mapped into this percent range.
const RENDER_PERCENT_START: u8 = 65;
const RENDER_PERCENT_END: u8 = 90;

/// Pipeline stage reported through progress callbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PipelineStep {
    ScriptGeneration,
    AudioGeneration,
    TimestampExtraction,
    SceneGeneration,
    VideoRendering,
    Complete,
    Error,
}

impl PipelineStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStep::ScriptGeneration => "script-generation",
            PipelineStep::AudioGeneration => "audio-generation",
            PipelineStep::TimestampExtraction => "timestamp-extraction",
            PipelineStep::SceneGeneration => "scene-generation",
            PipelineStep::VideoRendering => "video-rendering",
            PipelineStep::Complete => "complete",
            PipelineStep::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineProgress {
    pub step: PipelineStep,
    /// Overall progress, 0-100
    pub percent: u8,
    pub message: String,
}

pub type PipelineProgressCallback = Arc<dyn Fn(PipelineProgress) + Send + Sync>;

/// Per-video options.
#[derive(Clone, Default)]
pub struct VideoOptions {
    pub voice_id: Option<String>,
    pub speed: Option<f64>,
    /// Overrides the pipeline's output directory
    pub output_dir: Option<PathBuf>,
    /// Keep the narration audio after rendering
    pub keep_intermediate: bool,
    pub progress: Option<PipelineProgressCallback>,
}

impl VideoOptions {
    fn report(&self, step: PipelineStep, percent: u8, message: impl Into<String>) {
        if let Some(cb) = &self.progress {
            cb(PipelineProgress {
                step,
                percent,
                message: message.into(),
            });
        }
    }

    fn speech(&self) -> SpeechOptions {
        SpeechOptions {
            voice_id: self.voice_id.clone(),
            speed: self.speed,
        }
    }
}

/// Outcome of one finished video.
#[derive(Debug, Clone)]
pub struct VideoCreationResult {
    pub job_id: String,
    pub video_path: PathBuf,
    /// Present only when intermediate files are kept
    pub audio_path: Option<PathBuf>,
    pub artifacts: ArtifactPaths,
    /// Seconds of narration the scenes cover
    pub narration_duration: f64,
    pub scene_count: usize,
    pub matched_segments: usize,
    pub elapsed: Duration,
}

/// One topic of a batch run.
#[derive(Debug)]
pub struct BatchItem {
    pub topic: String,
    pub result: WorkerResult<VideoCreationResult>,
}

/// Orchestrates the collaborators for one or many topics.
pub struct VideoPipeline {
    script_generator: Arc<dyn ScriptGenerator>,
    synthesizer: Arc<dyn SpeechSynthesizer>,
    transcriber: Arc<dyn Transcriber>,
    renderer: Arc<dyn VideoRenderer>,
    output_dir: PathBuf,
}

impl VideoPipeline {
    pub fn new(
        script_generator: Arc<dyn ScriptGenerator>,
        synthesizer: Arc<dyn SpeechSynthesizer>,
        transcriber: Arc<dyn Transcriber>,
        renderer: Arc<dyn VideoRenderer>,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            script_generator,
            synthesizer,
            transcriber,
            renderer,
            output_dir: output_dir.into(),
        }
    }

    /// Wire the production clients. Fails on the first missing API key.
    pub fn from_config(config: &PipelineConfig) -> WorkerResult<Self> {
        Ok(Self::new(
            Arc::new(AnthropicScriptGenerator::new(&config.anthropic)?),
            Arc::new(MiniMaxSynthesizer::new(&config.minimax, &config.output_dir)?),
            Arc::new(WhisperTranscriber::new(&config.whisper)?),
            Arc::new(RemotionVideoRenderer::from_config(&config.render)),
            &config.output_dir,
        ))
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Produce one video for `topic`.
    pub async fn create_video(
        &self,
        topic: &str,
        options: &VideoOptions,
    ) -> WorkerResult<VideoCreationResult> {
        let job_id = new_job_id();
        let logger = JobLogger::new(&job_id, "create_video");
        let span = logger.create_span();

        let result = self
            .run(&job_id, topic, options, &logger)
            .instrument(span)
            .await;

        match &result {
            Ok(created) => {
                metrics::record_video(true);
                logger.log_completion(&format!(
                    "{} in {}",
                    created.video_path.display(),
                    format_duration(created.elapsed.as_secs_f64())
                ));
            }
            Err(e) => {
                metrics::record_video(false);
                logger.log_error(&format!("{} ({})", e, e.kind()));
                options.report(PipelineStep::Error, 0, e.to_string());
            }
        }
        result
    }

    async fn run(
        &self,
        job_id: &str,
        topic: &str,
        options: &VideoOptions,
        logger: &JobLogger,
    ) -> WorkerResult<VideoCreationResult> {
        let started = Instant::now();
        let output_dir = options
            .output_dir
            .clone()
            .unwrap_or_else(|| self.output_dir.clone());
        tokio::fs::create_dir_all(&output_dir).await?;
        logger.log_start(topic);

        options.report(PipelineStep::ScriptGeneration, 10, "Generating script");
        let script = stage("script", self.script_generator.generate(topic)).await?;
        options.report(
            PipelineStep::ScriptGeneration,
            20,
            format!("Script ready: {} segments", script.segments.len()),
        );

        options.report(PipelineStep::AudioGeneration, 30, "Synthesizing narration");
        let audio_path = stage(
            "tts",
            self.synthesizer
                .synthesize(&script.script, job_id, &options.speech()),
        )
        .await?;
        options.report(PipelineStep::AudioGeneration, 40, "Narration ready");

        options.report(
            PipelineStep::TimestampExtraction,
            45,
            "Extracting timestamps",
        );
        let timestamps = stage("transcription", self.transcriber.transcribe(&audio_path)).await?;
        if timestamps.is_empty() {
            logger.log_warning("Transcript is empty, scenes use even slots");
        }
        options.report(
            PipelineStep::TimestampExtraction,
            50,
            format!("{} timestamp segments", timestamps.len()),
        );

        options.report(PipelineStep::SceneGeneration, 55, "Aligning scenes");
        let orchestration = orchestrate_scenes(&script, &timestamps);
        metrics::record_alignment(
            orchestration.matched_segments,
            orchestration.fallback_segments(),
        );
        let artifacts = save_artifacts(
            &output_dir,
            job_id,
            &script,
            &timestamps,
            &orchestration.scenes,
        )
        .await?;
        options.report(
            PipelineStep::SceneGeneration,
            60,
            format!(
                "{} scenes over {}",
                orchestration.scenes.len(),
                format_duration(orchestration.total_duration)
            ),
        );

        options.report(
            PipelineStep::VideoRendering,
            RENDER_PERCENT_START,
            "Rendering video",
        );
        let request = RenderRequest {
            scenes: orchestration.scenes.clone(),
            audio_path: audio_path.clone(),
            output_path: output_dir.join(format!("{}.mp4", job_id)),
        };
        let video_path = stage(
            "render",
            self.renderer.render(&request, render_progress(options)),
        )
        .await?;
        options.report(PipelineStep::VideoRendering, RENDER_PERCENT_END, "Render finished");

        let audio_path = if options.keep_intermediate {
            Some(audio_path)
        } else {
            if let Err(e) = tokio::fs::remove_file(&audio_path).await {
                warn!(path = %audio_path.display(), error = %e, "Failed to remove narration audio");
            }
            None
        };

        let result = VideoCreationResult {
            job_id: job_id.to_string(),
            video_path,
            audio_path,
            artifacts,
            narration_duration: orchestration.total_duration,
            scene_count: orchestration.scenes.len(),
            matched_segments: orchestration.matched_segments,
            elapsed: started.elapsed(),
        };
        options.report(PipelineStep::Complete, 100, "Video created");
        Ok(result)
    }

    /// Produce one video per topic, sequentially. A failed topic does not
    /// stop the rest.
    pub async fn create_batch(&self, topics: &[String], options: &VideoOptions) -> Vec<BatchItem> {
        let total = topics.len();
        let mut items = Vec::with_capacity(total);

        for (i, topic) in topics.iter().enumerate() {
            let prefix = format!("[{}/{}]", i + 1, total);
            info!(topic = %topic, "{} Starting topic", prefix);

            let mut topic_options = options.clone();
            topic_options.progress = options.progress.clone().map(|cb| {
                Arc::new(move |p: PipelineProgress| {
                    cb(PipelineProgress {
                        message: format!("{} {}", prefix, p.message),
                        ..p
                    })
                }) as PipelineProgressCallback
            });

            let result = self.create_video(topic, &topic_options).await;
            if let Err(e) = &result {
                warn!(topic = %topic, error = %e, "Topic failed, continuing batch");
            }
            items.push(BatchItem {
                topic: topic.clone(),
                result,
            });
        }

        let succeeded = items.iter().filter(|item| item.result.is_ok()).count();
        info!(succeeded, failed = total - succeeded, "Batch finished");
        items
    }
}

/// Rerun scene orchestration from persisted artifacts.
pub async fn scenes_from_artifacts(
    script_path: &Path,
    timestamps_path: &Path,
) -> WorkerResult<Orchestration> {
    let script: GeneratedScript = load_json(script_path).await?;
    let timestamps: Vec<TimestampSegment> = load_json(timestamps_path).await?;
    Ok(orchestrate_scenes(&script, &timestamps))
}

/// Whether the Remotion CLI responds in `project_dir`.
pub async fn renderer_available(project_dir: &Path) -> bool {
    RemotionRunner::new(project_dir).is_available().await
}

fn new_job_id() -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}-{}", Utc::now().format("%Y%m%d-%H%M%S"), &suffix[..8])
}

/// Time a stage and record its outcome.
async fn stage<T, F>(name: &'static str, fut: F) -> WorkerResult<T>
where
    F: Future<Output = WorkerResult<T>>,
{
    let started = Instant::now();
    let result = fut.await;
    metrics::record_stage(name, result.is_ok(), started.elapsed().as_secs_f64());
    result
}

fn render_progress(options: &VideoOptions) -> Option<ProgressCallback> {
    if options.progress.is_none() {
        return None;
    }
    let options = options.clone();

    Some(Arc::new(move |p: RenderProgress| {
        if let Some(percent) = p.percent {
            let span = f64::from(RENDER_PERCENT_END - RENDER_PERCENT_START);
            let mapped = RENDER_PERCENT_START + (percent.clamp(0.0, 100.0) / 100.0 * span) as u8;
            options.report(
                PipelineStep::VideoRendering,
                mapped,
                format!("Rendering {:.0}% ({})", percent, p.step.as_str()),
            );
        }
    }))
}
