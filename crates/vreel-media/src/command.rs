//! Remotion CLI command builder.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Composition rendered when none is specified.
pub const DEFAULT_COMPOSITION: &str = "WireframeVideo";

/// Output codec accepted by `remotion render --codec`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Codec {
    #[default]
    H264,
    H265,
    Prores,
    Vp8,
    Vp9,
    Gif,
}

impl Codec {
    pub fn as_str(&self) -> &'static str {
        match self {
            Codec::H264 => "h264",
            Codec::H265 => "h265",
            Codec::Prores => "prores",
            Codec::Vp8 => "vp8",
            Codec::Vp9 => "vp9",
            Codec::Gif => "gif",
        }
    }
}

/// Encoding settings for one render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderOptions {
    pub composition: String,
    pub codec: Codec,
    pub quality: Option<u8>,
    pub audio_bitrate: Option<String>,
    pub fps: Option<u32>,
    /// Remotion picks its own concurrency when unset
    pub concurrency: Option<u32>,
    pub mute: bool,
    pub overwrite: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            composition: DEFAULT_COMPOSITION.to_string(),
            codec: Codec::H264,
            quality: Some(90),
            audio_bitrate: Some("192k".to_string()),
            fps: Some(30),
            concurrency: None,
            mute: false,
            overwrite: true,
        }
    }
}

/// Builder for `npx remotion render` invocations.
#[derive(Debug, Clone)]
pub struct RemotionCommand {
    output: PathBuf,
    options: RenderOptions,
    props: Option<PathBuf>,
    extra_args: Vec<String>,
}

impl RemotionCommand {
    /// Create a command rendering the default composition to `output`.
    pub fn new(output: impl AsRef<Path>) -> Self {
        Self::with_options(output, RenderOptions::default())
    }

    pub fn with_options(output: impl AsRef<Path>, options: RenderOptions) -> Self {
        Self {
            output: output.as_ref().to_path_buf(),
            options,
            props: None,
            extra_args: Vec::new(),
        }
    }

    pub fn composition(mut self, id: impl Into<String>) -> Self {
        self.options.composition = id.into();
        self
    }

    pub fn codec(mut self, codec: Codec) -> Self {
        self.options.codec = codec;
        self
    }

    pub fn quality(mut self, quality: u8) -> Self {
        self.options.quality = Some(quality);
        self
    }

    pub fn audio_bitrate(mut self, bitrate: impl Into<String>) -> Self {
        self.options.audio_bitrate = Some(bitrate.into());
        self
    }

    pub fn fps(mut self, fps: u32) -> Self {
        self.options.fps = Some(fps);
        self
    }

    pub fn concurrency(mut self, concurrency: u32) -> Self {
        self.options.concurrency = Some(concurrency);
        self
    }

    pub fn mute(mut self, mute: bool) -> Self {
        self.options.mute = mute;
        self
    }

    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.options.overwrite = overwrite;
        self
    }

    /// JSON file passed to the composition as input props.
    pub fn props_file(mut self, path: impl AsRef<Path>) -> Self {
        self.props = Some(path.as_ref().to_path_buf());
        self
    }

    /// Add a raw argument after the generated ones.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.extra_args.push(arg.into());
        self
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Build the arguments passed to `npx`.
    pub fn build_args(&self) -> Vec<String> {
        let opts = &self.options;
        let mut args = vec![
            "remotion".to_string(),
            "render".to_string(),
            opts.composition.clone(),
            self.output.to_string_lossy().to_string(),
            format!("--codec={}", opts.codec.as_str()),
            "--sequence-frame=0".to_string(),
        ];

        if let Some(quality) = opts.quality {
            args.push(format!("--quality={}", quality));
        }
        if let Some(bitrate) = opts.audio_bitrate.as_deref().filter(|b| !b.is_empty()) {
            args.push(format!("--audio-bitrate={}", bitrate));
        }
        if let Some(fps) = opts.fps {
            args.push(format!("--fps={}", fps));
        }
        if let Some(concurrency) = opts.concurrency {
            args.push(format!("--concurrency={}", concurrency));
        }
        if opts.mute {
            args.push("--mute".to_string());
        }
        if opts.overwrite {
            args.push("--overwrite".to_string());
        }
        if let Some(ref props) = self.props {
            args.push(format!("--props={}", props.to_string_lossy()));
        }

        args.extend(self.extra_args.iter().cloned());
        args
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_args() {
        let args = RemotionCommand::new("/out/video.mp4").build_args();
        assert_eq!(
            args,
            vec![
                "remotion",
                "render",
                "WireframeVideo",
                "/out/video.mp4",
                "--codec=h264",
                "--sequence-frame=0",
                "--quality=90",
                "--audio-bitrate=192k",
                "--fps=30",
                "--overwrite",
            ]
        );
    }

    #[test]
    fn test_builder_overrides() {
        let args = RemotionCommand::new("out.webm")
            .composition("Other")
            .codec(Codec::Vp9)
            .concurrency(4)
            .mute(true)
            .overwrite(false)
            .props_file("/tmp/props.json")
            .build_args();

        assert_eq!(args[2], "Other");
        assert!(args.contains(&"--codec=vp9".to_string()));
        assert!(args.contains(&"--concurrency=4".to_string()));
        assert!(args.contains(&"--mute".to_string()));
        assert!(!args.contains(&"--overwrite".to_string()));
        assert_eq!(args.last().unwrap(), "--props=/tmp/props.json");
    }

    #[test]
    fn test_codec_serde() {
        assert_eq!(serde_json::to_string(&Codec::Prores).unwrap(), "\"prores\"");
        let codec: Codec = serde_json::from_str("\"h265\"").unwrap();
        assert_eq!(codec, Codec::H265);
    }
}
