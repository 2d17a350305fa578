#![deny(unreachable_patterns)]
//! Remotion CLI wrapper for rendering scene timelines.
//!
//! This crate provides:
//! - Type-safe `remotion render` command building
//! - Progress parsing from Remotion's stdout/stderr
//! - Timeout and cancellation support via tokio
//! - Retry with exponential backoff and an availability check

pub mod command;
pub mod error;
pub mod progress;
pub mod render;

pub use command::{Codec, RemotionCommand, RenderOptions, DEFAULT_COMPOSITION};
pub use error::{MediaError, MediaResult};
pub use progress::{parse_progress_line, ProgressCallback, RenderProgress, RenderStep};
pub use render::{RemotionRunner, RenderRequest};
