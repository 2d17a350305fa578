//! Intermediate artifacts persisted next to each video.
//!
//! The script and transcript are saved so a run can be resumed from the
//! scene stage without calling any external service again.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;
use vreel_models::{GeneratedScript, SceneData, TimestampSegment};

use crate::error::{WorkerError, WorkerResult};

/// Locations of one job's JSON artifacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub script: PathBuf,
    pub timestamps: PathBuf,
    pub scenes: PathBuf,
}

impl ArtifactPaths {
    pub fn new(dir: &Path, job_id: &str) -> Self {
        Self {
            script: dir.join(format!("{}-script.json", job_id)),
            timestamps: dir.join(format!("{}-timestamps.json", job_id)),
            scenes: dir.join(format!("{}-scenes.json", job_id)),
        }
    }
}

/// Write the script, transcript and scenes of a job as pretty JSON.
pub async fn save_artifacts(
    dir: &Path,
    job_id: &str,
    script: &GeneratedScript,
    timestamps: &[TimestampSegment],
    scenes: &[SceneData],
) -> WorkerResult<ArtifactPaths> {
    tokio::fs::create_dir_all(dir).await?;
    let paths = ArtifactPaths::new(dir, job_id);

    write_json(&paths.script, script).await?;
    write_json(&paths.timestamps, timestamps).await?;
    write_json(&paths.scenes, scenes).await?;

    debug!(job_id, dir = %dir.display(), "Saved artifacts");
    Ok(paths)
}

async fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> WorkerResult<()> {
    let json = serde_json::to_string_pretty(value)?;
    tokio::fs::write(path, json).await?;
    Ok(())
}

/// Read a JSON artifact.
pub async fn load_json<T: DeserializeOwned>(path: &Path) -> WorkerResult<T> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| WorkerError::artifact(format!("Cannot read {}: {}", path.display(), e)))?;
    serde_json::from_str(&content)
        .map_err(|e| WorkerError::artifact(format!("Cannot parse {}: {}", path.display(), e)))
}
