//! Scene data handed to the renderer.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Visual layout of a scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum SceneType {
    Title,
    Pain,
    Emphasis,
    Circle,
}

/// Pose of the on-screen mascot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Pose {
    Peek,
    Sit,
    Point,
    Circle,
    Think,
    Celebrate,
}

/// One timed, typed visual interval of the final video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SceneData {
    /// Start time in seconds
    pub start: f64,

    /// End time in seconds
    pub end: f64,

    /// Scene layout
    #[serde(rename = "type")]
    pub scene_type: SceneType,

    /// Mascot pose
    #[serde(rename = "xiaomo")]
    pub pose: Pose,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlight: Option<String>,
}

impl SceneData {
    /// Create a scene with no display fields set.
    pub fn new(start: f64, end: f64, scene_type: SceneType, pose: Pose) -> Self {
        Self {
            start,
            end,
            scene_type,
            pose,
            title: None,
            subtitle: None,
            number: None,
            highlight: None,
        }
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}
