//! Video renderer backed by the Remotion CLI.

use std::path::PathBuf;

use async_trait::async_trait;
use vreel_media::{ProgressCallback, RemotionRunner, RenderRequest};

use crate::config::RenderConfig;
use crate::error::WorkerResult;
use crate::services::VideoRenderer;

/// Adapts [`RemotionRunner`] to the pipeline's renderer seam.
pub struct RemotionVideoRenderer {
    runner: RemotionRunner,
    max_attempts: u32,
}

impl RemotionVideoRenderer {
    pub fn new(runner: RemotionRunner, max_attempts: u32) -> Self {
        Self {
            runner,
            max_attempts,
        }
    }

    pub fn from_config(config: &RenderConfig) -> Self {
        let mut runner = RemotionRunner::new(&config.remotion_dir);
        if let Some(timeout) = config.timeout {
            runner = runner.with_timeout(timeout.as_secs());
        }
        Self::new(runner, config.max_attempts)
    }

    pub fn runner(&self) -> &RemotionRunner {
        &self.runner
    }
}

#[async_trait]
impl VideoRenderer for RemotionVideoRenderer {
    async fn render(
        &self,
        request: &RenderRequest,
        progress: Option<ProgressCallback>,
    ) -> WorkerResult<PathBuf> {
        Ok(self
            .runner
            .render_with_retry(request, self.max_attempts, progress)
            .await?)
    }
}
