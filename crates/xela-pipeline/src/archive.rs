//! Recorded session archive.
//!
//! A session is stored as one JSON document: an array of frames, each an
//! array of `[x, y, z]` triples in wire order.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use tracing::info;
use xela_types::FlatFrame;

use crate::error::PipelineError;

/// Read every frame of a session archive.
pub fn load_frames(path: impl AsRef<Path>) -> Result<Vec<FlatFrame>, PipelineError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| PipelineError::io(path, e))?;
    let frames: Vec<FlatFrame> = serde_json::from_reader(BufReader::new(file))?;
    info!(path = %path.display(), frames = frames.len(), "session loaded");
    Ok(frames)
}

/// Write `frames` as a session archive, replacing any existing file.
pub fn save_frames(path: impl AsRef<Path>, frames: &[FlatFrame]) -> Result<(), PipelineError> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|e| PipelineError::io(path, e))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, frames)?;
    writer.flush().map_err(|e| PipelineError::io(path, e))?;
    info!(path = %path.display(), frames = frames.len(), "session saved");
    Ok(())
}
