//! `vreel` command-line interface.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;

use vreel_models::{format_duration, TopicList};
use vreel_worker::{
    init_tracing, renderer_available, scenes_from_artifacts, PipelineConfig, PipelineProgress,
    PipelineStep, TopicGenerator, VideoCreationResult, VideoOptions, VideoPipeline,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Turn a topic into a narrated short-form video", long_about = None)]
struct Cli {
    /// Log level for the vreel crates (RUST_LOG still applies)
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create one video from a topic
    Create {
        topic: String,
        #[command(flatten)]
        video: VideoArgs,
    },
    /// Suggest video topics
    Topics {
        /// How many topics to ask for
        #[arg(default_value_t = 5)]
        count: usize,
        /// Write the topics here instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
        /// Write the full topic list as JSON instead of one title per line
        #[arg(long)]
        json: bool,
    },
    /// Create one video per topic in a topics file (one title per line, or
    /// the JSON written by `vreel topics --json`)
    Batch {
        topics_file: PathBuf,
        #[command(flatten)]
        video: VideoArgs,
    },
    /// Rebuild scenes from saved script and timestamp artifacts
    Scenes {
        script: PathBuf,
        timestamps: PathBuf,
        /// Write scenes here instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Check API keys and the Remotion toolchain
    Check,
}

#[derive(Args, Debug)]
struct VideoArgs {
    /// Narration voice
    #[arg(long)]
    voice_id: Option<String>,
    /// Narration speed, 0.5 to 2.0
    #[arg(long)]
    speed: Option<f64>,
    /// Output directory for videos and artifacts
    #[arg(long)]
    output_dir: Option<PathBuf>,
    /// Keep the narration audio
    #[arg(long)]
    keep_intermediate: bool,
}

impl VideoArgs {
    fn into_options(self) -> VideoOptions {
        VideoOptions {
            voice_id: self.voice_id,
            speed: self.speed,
            output_dir: self.output_dir,
            keep_intermediate: self.keep_intermediate,
            progress: Some(Arc::new(print_progress)),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    let config = PipelineConfig::from_env();

    match cli.command {
        Commands::Create { topic, video } => {
            let pipeline = VideoPipeline::from_config(&config)?;
            let result = pipeline.create_video(&topic, &video.into_options()).await?;
            print_report(&result);
        }
        Commands::Topics { count, out, json } => {
            let generator = TopicGenerator::new(&config.anthropic)?;
            let list = generator.generate(count).await?;
            let text = if json {
                format!("{}\n", serde_json::to_string_pretty(&list)?)
            } else {
                list.to_lines()
            };
            match out {
                Some(path) => {
                    tokio::fs::write(&path, text)
                        .await
                        .with_context(|| format!("writing {}", path.display()))?;
                    info!(path = %path.display(), topics = list.topics.len(), "Wrote topics");
                }
                None => print!("{}", text),
            }
        }
        Commands::Batch { topics_file, video } => {
            let content = tokio::fs::read_to_string(&topics_file)
                .await
                .with_context(|| format!("reading {}", topics_file.display()))?;
            let topics = TopicList::titles_from_file(&content);
            if topics.is_empty() {
                bail!("no topics in {}", topics_file.display());
            }

            let pipeline = VideoPipeline::from_config(&config)?;
            let items = pipeline.create_batch(&topics, &video.into_options()).await;

            println!("\nBatch summary:");
            let mut failed = 0;
            for item in &items {
                match &item.result {
                    Ok(result) => println!("  ok    {} -> {}", item.topic, result.video_path.display()),
                    Err(e) => {
                        failed += 1;
                        println!("  fail  {}: {}", item.topic, e);
                    }
                }
            }
            if failed > 0 {
                bail!("{} of {} topics failed", failed, items.len());
            }
        }
        Commands::Scenes {
            script,
            timestamps,
            out,
        } => {
            let orchestration = scenes_from_artifacts(&script, &timestamps).await?;
            let json = serde_json::to_string_pretty(&orchestration.scenes)?;
            match out {
                Some(path) => {
                    tokio::fs::write(&path, json).await?;
                    info!(
                        path = %path.display(),
                        scenes = orchestration.scenes.len(),
                        matched = orchestration.matched_segments,
                        "Wrote scenes"
                    );
                }
                None => println!("{}", json),
            }
        }
        Commands::Check => {
            let missing = config.missing_keys();
            for key in &missing {
                println!("missing  {}", key);
            }
            let remotion = renderer_available(&config.render.remotion_dir).await;
            println!(
                "remotion {} ({})",
                if remotion { "ok" } else { "unavailable" },
                config.render.remotion_dir.display()
            );
            if !missing.is_empty() || !remotion {
                bail!("environment is not ready");
            }
            println!("ready");
        }
    }

    Ok(())
}

fn print_progress(progress: PipelineProgress) {
    const WIDTH: usize = 30;
    if progress.step == PipelineStep::Error {
        eprintln!("\nerror: {}", progress.message);
        return;
    }

    let filled = WIDTH * usize::from(progress.percent.min(100)) / 100;
    let mut stdout = std::io::stdout();
    let _ = write!(
        stdout,
        "\r[{}{}] {:>3}% {:<60}",
        "#".repeat(filled),
        "-".repeat(WIDTH - filled),
        progress.percent,
        progress.message
    );
    if progress.step == PipelineStep::Complete {
        let _ = writeln!(stdout);
    }
    let _ = stdout.flush();
}

fn print_report(result: &VideoCreationResult) {
    println!("Video:     {}", result.video_path.display());
    println!("Job:       {}", result.job_id);
    println!(
        "Scenes:    {} ({} aligned to speech)",
        result.scene_count, result.matched_segments
    );
    println!("Narration: {}", format_duration(result.narration_duration));
    println!("Artifacts: {}", result.artifacts.scenes.display());
    if let Some(audio) = &result.audio_path {
        println!("Audio:     {}", audio.display());
    }
    println!("Elapsed:   {}", format_duration(result.elapsed.as_secs_f64()));
}
