//! Session capture.
//!
//! [`FrameRecorder`] holds the most recent reading of every taxel. The
//! sensor side calls [`update`](FrameRecorder::update) whenever a new
//! sample arrives; a clock calls [`sample`](FrameRecorder::sample) to
//! snapshot the current frame into the session. Both sides run at their own
//! rates, so a frame may be sampled several times or skipped.

use std::path::Path;

use tracing::{debug, info};
use xela_types::{FlatFrame, TaxelReading, XelaError};

use crate::archive::save_frames;
use crate::error::PipelineError;

#[derive(Debug, Clone)]
pub struct FrameRecorder {
    current: FlatFrame,
    primed: bool,
    session: Vec<FlatFrame>,
}

impl FrameRecorder {
    /// A recorder for frames of `total_taxels` readings.
    pub fn new(total_taxels: usize) -> Self {
        Self {
            current: FlatFrame::zeros(total_taxels),
            primed: false,
            session: Vec::new(),
        }
    }

    /// Replace the current frame.
    ///
    /// # Errors
    ///
    /// [`XelaError::ShapeMismatch`] if `points` is not exactly one reading
    /// per taxel; the current frame is left untouched.
    pub fn update(&mut self, points: &[TaxelReading]) -> Result<(), XelaError> {
        if points.len() != self.current.len() {
            return Err(XelaError::ShapeMismatch {
                expected: self.current.len(),
                actual: points.len(),
            });
        }
        self.current = FlatFrame::new(points.to_vec());
        self.primed = true;
        Ok(())
    }

    /// Append the current frame to the session.
    ///
    /// Returns `false`, appending nothing, until the first update.
    pub fn sample(&mut self) -> bool {
        if !self.primed {
            return false;
        }
        self.session.push(self.current.clone());
        debug!(frames = self.session.len(), "frame sampled");
        true
    }

    pub fn frames(&self) -> &[FlatFrame] {
        &self.session
    }

    pub fn into_frames(self) -> Vec<FlatFrame> {
        self.session
    }

    /// Write the session captured so far as an archive.
    pub fn dump(&self, path: impl AsRef<Path>) -> Result<(), PipelineError> {
        info!(frames = self.session.len(), "dumping session");
        save_frames(path, &self.session)
    }
}
