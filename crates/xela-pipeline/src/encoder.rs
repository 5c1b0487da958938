//! Frame artifacts and the video encoder seam.
//!
//! Frame images are named `state_NNN.png` with the index zero-padded to at
//! least three digits, so a lexical and a numeric listing agree for runs of
//! up to a thousand frames and ffmpeg's `%03d` pattern picks them up in
//! order beyond that.

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, info};

use crate::error::PipelineError;

const PREFIX: &str = "state_";
const EXTENSION: &str = "png";

/// File name of frame `index`.
pub fn frame_file_name(index: usize) -> String {
    format!("{PREFIX}{index:03}.{EXTENSION}")
}

/// Inverse of [`frame_file_name`].
pub fn parse_frame_index(file_name: &str) -> Option<usize> {
    let digits = file_name
        .strip_prefix(PREFIX)?
        .strip_suffix(EXTENSION)?
        .strip_suffix('.')?;
    if digits.len() < 3 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Consumes an ordered, gap-free list of frame images.
pub trait VideoEncoder {
    /// Assemble `frames`, in order, into a video at `output`, played at
    /// `fps`. Any existing file at `output` has already been removed.
    fn encode(&self, frames: &[PathBuf], fps: u32, output: &Path) -> Result<(), PipelineError>;
}

/// Runs the `ffmpeg` binary over the frame directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FfmpegEncoder {
    /// Executable to run, normally `"ffmpeg"`.
    pub program: String,
    /// Output `(width, height)`; frames are rescaled with square pixels.
    pub scale: (u32, u32),
}

impl Default for FfmpegEncoder {
    fn default() -> Self {
        Self {
            program: "ffmpeg".to_string(),
            scale: (720, 1440),
        }
    }
}

impl FfmpegEncoder {
    /// The argument list for encoding frames `0..count` of `frame_dir`.
    ///
    /// Input starts at frame 0 and stops after `count` frames, so images
    /// past the end of the session never reach the video.
    pub fn args(&self, frame_dir: &Path, count: usize, fps: u32, output: &Path) -> Vec<String> {
        let pattern = frame_dir.join(format!("{PREFIX}%03d.{EXTENSION}"));
        vec![
            "-y".into(),
            "-loglevel".into(),
            "error".into(),
            "-framerate".into(),
            fps.to_string(),
            "-start_number".into(),
            "0".into(),
            "-i".into(),
            pattern.to_string_lossy().into_owned(),
            "-frames:v".into(),
            count.to_string(),
            "-vf".into(),
            format!("scale={}x{},setsar=1:1", self.scale.0, self.scale.1),
            output.to_string_lossy().into_owned(),
        ]
    }
}

/// Check that `frames` are exactly `state_000.png, state_001.png, ...` in
/// one directory, and return that directory.
fn sequence_dir(frames: &[PathBuf]) -> Result<&Path, PipelineError> {
    let Some(dir) = frames.first().and_then(|p| p.parent()) else {
        return Err(PipelineError::Encoder("no frames to encode".into()));
    };
    for (expected, path) in frames.iter().enumerate() {
        let index = path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(parse_frame_index);
        if path.parent() != Some(dir) || index != Some(expected) {
            return Err(PipelineError::Encoder(format!(
                "frame {expected} should be {}, got {}",
                dir.join(frame_file_name(expected)).display(),
                path.display()
            )));
        }
    }
    Ok(dir)
}

impl VideoEncoder for FfmpegEncoder {
    fn encode(&self, frames: &[PathBuf], fps: u32, output: &Path) -> Result<(), PipelineError> {
        let frame_dir = sequence_dir(frames)?;
        let args = self.args(frame_dir, frames.len(), fps, output);
        debug!(program = %self.program, ?args, "launching encoder");
        let status = Command::new(&self.program)
            .args(&args)
            .status()
            .map_err(|e| PipelineError::Encoder(format!("failed to launch {}: {e}", self.program)))?;
        if !status.success() {
            return Err(PipelineError::Encoder(format!("{} exited with {status}", self.program)));
        }
        info!(frames = frames.len(), fps, video = %output.display(), "video written");
        Ok(())
    }
}
