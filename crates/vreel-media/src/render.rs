//! Remotion render runner with progress tracking, timeout, and cancellation.

use std::collections::VecDeque;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};

use serde::Serialize;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use vreel_models::SceneData;

use crate::command::{RemotionCommand, RenderOptions};
use crate::error::{MediaError, MediaResult};
use crate::progress::{parse_progress_line, ProgressCallback};

/// Stderr lines kept for failure reports.
const STDERR_TAIL_LINES: usize = 50;

/// Everything needed to render one video.
#[derive(Debug, Clone)]
pub struct RenderRequest {
    pub scenes: Vec<SceneData>,
    pub audio_path: PathBuf,
    pub output_path: PathBuf,
}

/// Input props handed to the composition.
#[derive(Serialize)]
struct CompositionProps<'a> {
    scenes: &'a [SceneData],
    #[serde(rename = "audioUrl")]
    audio_url: String,
}

/// Runs `npx remotion render` inside a Remotion project.
#[derive(Debug, Clone)]
pub struct RemotionRunner {
    project_dir: PathBuf,
    program: String,
    options: RenderOptions,
    cancel_rx: Option<watch::Receiver<bool>>,
    timeout_secs: Option<u64>,
    retry_base: Duration,
}

impl RemotionRunner {
    /// Create a runner for the project at `project_dir`.
    pub fn new(project_dir: impl AsRef<Path>) -> Self {
        Self {
            project_dir: project_dir.as_ref().to_path_buf(),
            program: "npx".to_string(),
            options: RenderOptions::default(),
            cancel_rx: None,
            timeout_secs: None,
            retry_base: Duration::from_secs(1),
        }
    }

    pub fn with_options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }

    /// Launcher used in place of `npx`.
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Set cancellation signal.
    pub fn with_cancel(mut self, cancel_rx: watch::Receiver<bool>) -> Self {
        self.cancel_rx = Some(cancel_rx);
        self
    }

    /// Set timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    /// Unit of the `2^attempt` retry backoff.
    pub fn with_retry_base(mut self, base: Duration) -> Self {
        self.retry_base = base;
        self
    }

    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    /// Check the project and inputs before spawning anything.
    pub fn validate(&self, request: &RenderRequest) -> MediaResult<()> {
        if !self.project_dir.is_dir() {
            return Err(MediaError::ProjectNotFound(self.project_dir.clone()));
        }
        if request.scenes.is_empty() {
            return Err(MediaError::invalid_input("no scenes to render"));
        }
        if !request.audio_path.is_file() {
            return Err(MediaError::FileNotFound(request.audio_path.clone()));
        }
        Ok(())
    }

    /// Render `request`, returning the absolute output path.
    pub async fn render(
        &self,
        request: &RenderRequest,
        progress: Option<ProgressCallback>,
    ) -> MediaResult<PathBuf> {
        self.validate(request)?;

        let output = std::path::absolute(&request.output_path)?;
        let audio = std::path::absolute(&request.audio_path)?;
        if let Some(parent) = output.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let props_file = write_props(&request.scenes, &audio)?;
        let cmd = RemotionCommand::with_options(&output, self.options.clone())
            .props_file(props_file.path());

        info!(
            output = %output.display(),
            scenes = request.scenes.len(),
            composition = %self.options.composition,
            "Starting Remotion render"
        );
        let started = Instant::now();
        self.run(&cmd, progress).await?;

        if !output.exists() {
            return Err(MediaError::render_failed(
                "Remotion exited successfully but produced no output",
                None,
                Some(0),
            ));
        }

        info!(
            output = %output.display(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Remotion render completed"
        );
        Ok(output)
    }

    /// Render with up to `max_attempts` tries, backing off `2^attempt` units
    /// between retryable failures.
    pub async fn render_with_retry(
        &self,
        request: &RenderRequest,
        max_attempts: u32,
        progress: Option<ProgressCallback>,
    ) -> MediaResult<PathBuf> {
        let max_attempts = max_attempts.max(1);
        let mut attempt = 1;

        loop {
            info!(attempt, max_attempts, "Render attempt");
            match self.render(request, progress.clone()).await {
                Ok(path) => return Ok(path),
                Err(e) if e.is_retryable() && attempt < max_attempts => {
                    let delay = self.retry_base * 2u32.saturating_pow(attempt);
                    warn!(
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Render attempt failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Whether `npx remotion --version` works in the project directory.
    pub async fn is_available(&self) -> bool {
        if which::which(&self.program).is_err() {
            return false;
        }

        let output = Command::new(&self.program)
            .args(["remotion", "--version"])
            .current_dir(&self.project_dir)
            .stdin(Stdio::null())
            .output()
            .await;

        match output {
            Ok(out) => out.status.success() || !out.stdout.is_empty(),
            Err(e) => {
                debug!(error = %e, "Remotion availability check failed");
                false
            }
        }
    }

    async fn run(&self, cmd: &RemotionCommand, progress: Option<ProgressCallback>) -> MediaResult<()> {
        let program = which::which(&self.program).map_err(|_| MediaError::NpxNotFound)?;

        let args = cmd.build_args();
        debug!("Running Remotion: {} {}", self.program, args.join(" "));

        let mut child = Command::new(program)
            .args(&args)
            .current_dir(&self.project_dir)
            .env("REMOTION_LOG_LEVEL", "info")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| MediaError::render_failed("stdout not captured", None, None))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| MediaError::render_failed("stderr not captured", None, None))?;

        let stdout_task = spawn_reader(stdout, progress.clone(), 0);
        let stderr_task = spawn_reader(stderr, progress, STDERR_TAIL_LINES);

        let cancelled = wait_cancelled(self.cancel_rx.clone());
        let timeout = async {
            match self.timeout_secs {
                Some(secs) => tokio::time::sleep(Duration::from_secs(secs)).await,
                None => std::future::pending().await,
            }
        };

        let status = tokio::select! {
            status = child.wait() => status?,
            _ = cancelled => {
                info!("Remotion render cancelled, killing process");
                let _ = child.kill().await;
                return Err(MediaError::Cancelled);
            }
            _ = timeout => {
                let secs = self.timeout_secs.unwrap_or_default();
                warn!("Remotion timed out after {} seconds, killing process", secs);
                let _ = child.kill().await;
                return Err(MediaError::Timeout(secs));
            }
        };

        let _ = stdout_task.await;
        let stderr_tail = stderr_task.await.unwrap_or_default();

        if status.success() {
            return Ok(());
        }

        let message = match status.code() {
            Some(code) => format!("Remotion exited with code {}", code),
            None => "Remotion terminated by signal".to_string(),
        };
        let stderr = (!stderr_tail.is_empty()).then_some(stderr_tail);
        Err(MediaError::render_failed(message, stderr, status.code()))
    }
}

fn write_props(scenes: &[SceneData], audio: &Path) -> MediaResult<tempfile::NamedTempFile> {
    let props = CompositionProps {
        scenes,
        audio_url: audio.to_string_lossy().to_string(),
    };

    let mut file = tempfile::Builder::new()
        .prefix("vreel-props-")
        .suffix(".json")
        .tempfile()?;
    serde_json::to_writer(&mut file, &props)?;
    file.flush()?;
    Ok(file)
}

/// Forward parsed progress from a pipe and keep its last `keep` lines.
fn spawn_reader<R>(
    pipe: R,
    progress: Option<ProgressCallback>,
    keep: usize,
) -> JoinHandle<String>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut lines = BufReader::new(pipe).lines();
        let mut tail = VecDeque::with_capacity(keep);

        while let Ok(Some(line)) = lines.next_line().await {
            debug!(line = line.trim(), "remotion");
            if let (Some(cb), Some(p)) = (progress.as_ref(), parse_progress_line(&line)) {
                cb(p);
            }
            if keep > 0 {
                if tail.len() == keep {
                    tail.pop_front();
                }
                tail.push_back(line);
            }
        }

        Vec::from(tail).join("\n")
    })
}

async fn wait_cancelled(rx: Option<watch::Receiver<bool>>) {
    let Some(mut rx) = rx else {
        return std::future::pending().await;
    };
    loop {
        if *rx.borrow_and_update() {
            return;
        }
        if rx.changed().await.is_err() {
            // Sender gone, cancellation can no longer happen.
            return std::future::pending().await;
        }
    }
}
