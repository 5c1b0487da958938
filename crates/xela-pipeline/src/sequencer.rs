//! [`Sequencer`] – drives a recorded session through every stage.
//!
//! For a session of frames, in order:
//!
//! 1. **Bias** – average the first `bias_window` frames once.
//! 2. **Normalize** – subtract the bias from the frame.
//! 3. **Convert** – scatter the frame into region tensors.
//! 4. **Render** – compose the frame image and write `state_NNN.png`.
//!
//! Frame `i + 1` is not touched until frame `i`'s image is on disk. Once
//! every frame is written the ordered image list goes to the
//! [`VideoEncoder`]; a video already at the target path is removed first.
//! Any failure stops the run: the encoder assumes a gap-free sequence.
//!
//! Images left in the output directory by an earlier, longer session are
//! deleted before rendering starts, so the directory only ever holds the
//! current session's frames.
//!
//! # Example
//!
//! ```rust,no_run
//! use xela_pipeline::{FfmpegEncoder, Sequencer, SequencerConfig};
//! use xela_topology::CurvedHandTopology;
//!
//! let hand = CurvedHandTopology::new().unwrap();
//! let seq = Sequencer::new(&hand, SequencerConfig::default(), FfmpegEncoder::default()).unwrap();
//! let frames = xela_pipeline::archive::load_frames("sensor_values.json").unwrap();
//! seq.run(&frames).unwrap();
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument, warn};
use xela_topology::TopologyResolver;
use xela_types::FlatFrame;

use crate::bias::BiasVector;
use crate::convert::FrameConverter;
use crate::encoder::{VideoEncoder, frame_file_name, parse_frame_index};
use crate::error::PipelineError;
use crate::layout::FrameRenderer;
use crate::render::{RenderStyle, Renderer};

/// Log an `info` progress line every this many frames.
const PROGRESS_EVERY: usize = 25;

// ─────────────────────────────────────────────────────────────────────────────
// Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Configuration bundle for [`Sequencer`].
#[derive(Debug, Clone, PartialEq)]
pub struct SequencerConfig {
    /// Number of leading frames averaged into the session bias.
    pub bias_window: usize,
    /// Playback rate handed to the encoder.
    pub frame_rate: u32,
    /// Directory receiving `state_NNN.png` images.
    pub output_dir: PathBuf,
    /// Video file to (re)create.
    pub video_path: PathBuf,
    pub style: RenderStyle,
}

impl Default for SequencerConfig {
    fn default() -> Self {
        Self {
            bias_window: 100,
            frame_rate: 10,
            output_dir: PathBuf::from("visualization"),
            video_path: PathBuf::from("visualization.mp4"),
            style: RenderStyle::default(),
        }
    }
}

/// What a finished run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    /// Frame images in frame order.
    pub artifacts: Vec<PathBuf>,
    pub video: PathBuf,
}

// ─────────────────────────────────────────────────────────────────────────────
// Sequencer
// ─────────────────────────────────────────────────────────────────────────────

/// Batch driver from raw frames to frame images and a video.
pub struct Sequencer<E> {
    config: SequencerConfig,
    converter: FrameConverter,
    frames: FrameRenderer,
    encoder: E,
}

impl<E: VideoEncoder> Sequencer<E> {
    /// Resolve the topology and layout up front.
    ///
    /// # Errors
    ///
    /// [`PipelineError::Style`] if the render constants are unusable,
    /// [`PipelineError::Domain`] if a wire index does not resolve, or
    /// [`PipelineError::Layout`] if the composite layout does not fit the
    /// topology.
    pub fn new(
        topology: &dyn TopologyResolver,
        config: SequencerConfig,
        encoder: E,
    ) -> Result<Self, PipelineError> {
        config.style.validate()?;
        let converter = FrameConverter::new(topology)?;
        let frames = FrameRenderer::new(topology, Renderer::new(config.style))?;
        info!(
            hand = %topology.hand(),
            taxels = converter.total_taxels(),
            bias_window = config.bias_window,
            "sequencer ready"
        );
        Ok(Self {
            config,
            converter,
            frames,
            encoder,
        })
    }

    pub fn config(&self) -> &SequencerConfig {
        &self.config
    }

    pub fn encoder(&self) -> &E {
        &self.encoder
    }

    /// Render every frame of the session in order, then encode the video.
    #[instrument(skip_all, fields(frames = session.len()))]
    pub fn run(&self, session: &[FlatFrame]) -> Result<RunSummary, PipelineError> {
        let bias = BiasVector::compute(session, self.config.bias_window)?;
        fs::create_dir_all(&self.config.output_dir)
            .map_err(|e| PipelineError::io(&self.config.output_dir, e))?;
        self.prune_stale(session.len())?;

        let mut artifacts = Vec::with_capacity(session.len());
        for (index, frame) in session.iter().enumerate() {
            artifacts.push(self.render_one(index, frame, &bias)?);
            if (index + 1) % PROGRESS_EVERY == 0 || index + 1 == session.len() {
                info!(done = index + 1, total = session.len(), "dumping frames");
            }
        }

        self.encode(&artifacts)?;
        Ok(RunSummary {
            artifacts,
            video: self.config.video_path.clone(),
        })
    }

    /// Normalize, convert, render and write frame `index`.
    ///
    /// Returns the image path. Nothing is written if the frame is rejected.
    pub fn render_one(
        &self,
        index: usize,
        frame: &FlatFrame,
        bias: &BiasVector,
    ) -> Result<PathBuf, PipelineError> {
        let normalized = bias.apply(frame)?;
        let tensors = self.converter.convert(&normalized)?;
        let image = self.frames.render_frame(&tensors)?;
        let path = self.config.output_dir.join(frame_file_name(index));
        image.save(&path).map_err(|source| PipelineError::Image {
            path: path.clone(),
            source,
        })?;
        debug!(index, path = %path.display(), "frame written");
        Ok(path)
    }

    /// Encode the frame images already in the output directory.
    ///
    /// # Errors
    ///
    /// [`PipelineError::Encoder`] if there are no images or the indices are
    /// not contiguous from zero.
    pub fn encode_existing(&self) -> Result<RunSummary, PipelineError> {
        let dir = &self.config.output_dir;
        let indexed = list_frames(dir)?;
        if indexed.is_empty() {
            return Err(PipelineError::Encoder(format!("no frame images in {}", dir.display())));
        }
        if let Some((expected, _)) = indexed
            .iter()
            .enumerate()
            .find(|(expected, (index, _))| expected != index)
        {
            return Err(PipelineError::Encoder(format!("frame {expected} is missing")));
        }

        let artifacts: Vec<PathBuf> = indexed.into_iter().map(|(_, p)| p).collect();
        self.encode(&artifacts)?;
        Ok(RunSummary {
            artifacts,
            video: self.config.video_path.clone(),
        })
    }

    /// Delete frame images with index `keep` or above.
    fn prune_stale(&self, keep: usize) -> Result<(), PipelineError> {
        let mut removed = 0;
        for (_, path) in list_frames(&self.config.output_dir)?
            .into_iter()
            .filter(|(index, _)| *index >= keep)
        {
            fs::remove_file(&path).map_err(|e| PipelineError::io(&path, e))?;
            removed += 1;
        }
        if removed > 0 {
            warn!(removed, dir = %self.config.output_dir.display(), "removed stale frame images");
        }
        Ok(())
    }

    fn encode(&self, artifacts: &[PathBuf]) -> Result<(), PipelineError> {
        let video = &self.config.video_path;
        replace_target(video)?;
        info!(frames = artifacts.len(), fps = self.config.frame_rate, video = %video.display(), "encoding video");
        self.encoder.encode(artifacts, self.config.frame_rate, video)
    }
}

/// Frame images in `dir`, sorted by index.
fn list_frames(dir: &Path) -> Result<Vec<(usize, PathBuf)>, PipelineError> {
    let mut indexed = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| PipelineError::io(dir, e))? {
        let entry = entry.map_err(|e| PipelineError::io(dir, e))?;
        if let Some(index) = entry.file_name().to_str().and_then(parse_frame_index) {
            indexed.push((index, entry.path()));
        }
    }
    indexed.sort_by_key(|(index, _)| *index);
    Ok(indexed)
}

/// Make room for a fresh file at `path`.
fn replace_target(path: &Path) -> Result<(), PipelineError> {
    if path.exists() {
        warn!(path = %path.display(), "removing existing video");
        fs::remove_file(path).map_err(|e| PipelineError::io(path, e))?;
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| PipelineError::io(parent, e))?;
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use xela_topology::FlatHandTopology;
    use xela_types::{TaxelReading, XelaError};

    #[derive(Default)]
    struct RecordingEncoder {
        calls: RefCell<Vec<(Vec<PathBuf>, u32, bool)>>,
    }

    impl VideoEncoder for RecordingEncoder {
        fn encode(&self, frames: &[PathBuf], fps: u32, output: &Path) -> Result<(), PipelineError> {
            self.calls
                .borrow_mut()
                .push((frames.to_vec(), fps, output.exists()));
            fs::write(output, b"video").map_err(|e| PipelineError::io(output, e))
        }
    }

    fn config(dir: &Path, bias_window: usize) -> SequencerConfig {
        SequencerConfig {
            bias_window,
            frame_rate: 15,
            output_dir: dir.join("visualization"),
            video_path: dir.join("visualization.mp4"),
            style: RenderStyle::default(),
        }
    }

    fn session(n: usize) -> Vec<FlatFrame> {
        (0..n)
            .map(|i| FlatFrame::new(vec![TaxelReading::new(i as f32, 0.0, 5.0 * i as f32); 240]))
            .collect()
    }

    #[test]
    fn run_writes_one_image_per_frame_and_encodes_once() {
        let dir = tempfile::tempdir().unwrap();
        let hand = FlatHandTopology::new().unwrap();
        let seq = Sequencer::new(&hand, config(dir.path(), 2), RecordingEncoder::default()).unwrap();
        let summary = seq.run(&session(4)).unwrap();

        let names: Vec<String> = summary
            .artifacts
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["state_000.png", "state_001.png", "state_002.png", "state_003.png"]);
        assert!(summary.artifacts.iter().all(|p| p.exists()));

        let calls = seq.encoder().calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, summary.artifacts);
        assert_eq!(calls[0].1, 15);
    }

    #[test]
    fn existing_video_is_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config(dir.path(), 1);
        fs::write(&cfg.video_path, b"stale").unwrap();
        let hand = FlatHandTopology::new().unwrap();
        let seq = Sequencer::new(&hand, cfg.clone(), RecordingEncoder::default()).unwrap();
        seq.run(&session(2)).unwrap();
        // The encoder never saw the stale file.
        assert!(!seq.encoder().calls.borrow()[0].2);
        assert_eq!(fs::read(&cfg.video_path).unwrap(), b"video");
    }

    #[test]
    fn shorter_rerun_drops_leftover_frames() {
        let dir = tempfile::tempdir().unwrap();
        let hand = FlatHandTopology::new().unwrap();
        let seq = Sequencer::new(&hand, config(dir.path(), 1), RecordingEncoder::default()).unwrap();
        seq.run(&session(5)).unwrap();
        let second = seq.run(&session(3)).unwrap();

        let out = dir.path().join("visualization");
        let on_disk: Vec<usize> = list_frames(&out).unwrap().into_iter().map(|(i, _)| i).collect();
        assert_eq!(on_disk, [0, 1, 2]);
        assert_eq!(seq.encoder().calls.borrow()[1].0, second.artifacts);
        assert_eq!(seq.encode_existing().unwrap().artifacts.len(), 3);
    }

    #[test]
    fn unusable_style_is_rejected_up_front() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = config(dir.path(), 1);
        cfg.style.pressure_scale = 0.0;
        let hand = FlatHandTopology::new().unwrap();
        assert!(matches!(
            Sequencer::new(&hand, cfg, RecordingEncoder::default()),
            Err(PipelineError::Style(_))
        ));
    }

    #[test]
    fn short_session_fails_before_any_output() {
        let dir = tempfile::tempdir().unwrap();
        let hand = FlatHandTopology::new().unwrap();
        let seq = Sequencer::new(&hand, config(dir.path(), 100), RecordingEncoder::default()).unwrap();
        let err = seq.run(&session(3)).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Domain(XelaError::InsufficientFrames {
                required: 100,
                available: 3
            })
        ));
        assert!(!dir.path().join("visualization").exists());
        assert!(seq.encoder().calls.borrow().is_empty());
    }

    #[test]
    fn wrong_length_frame_stops_the_run() {
        let dir = tempfile::tempdir().unwrap();
        let hand = FlatHandTopology::new().unwrap();
        let seq = Sequencer::new(&hand, config(dir.path(), 2), RecordingEncoder::default()).unwrap();
        let mut frames = session(4);
        frames.push(FlatFrame::zeros(239));
        let err = seq.run(&frames).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Domain(XelaError::ShapeMismatch {
                expected: 240,
                actual: 239
            })
        ));
        let out = dir.path().join("visualization");
        assert!(out.join("state_003.png").exists());
        assert!(!out.join("state_004.png").exists());
        assert!(seq.encoder().calls.borrow().is_empty());
    }

    #[test]
    fn encode_existing_lists_frames_in_index_order() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config(dir.path(), 1);
        fs::create_dir_all(&cfg.output_dir).unwrap();
        for i in [2, 0, 1] {
            fs::write(cfg.output_dir.join(frame_file_name(i)), b"png").unwrap();
        }
        fs::write(cfg.output_dir.join("notes.txt"), b"ignored").unwrap();
        let hand = FlatHandTopology::new().unwrap();
        let seq = Sequencer::new(&hand, cfg, RecordingEncoder::default()).unwrap();
        let summary = seq.encode_existing().unwrap();
        let indices: Vec<usize> = summary
            .artifacts
            .iter()
            .map(|p| parse_frame_index(p.file_name().unwrap().to_str().unwrap()).unwrap())
            .collect();
        assert_eq!(indices, [0, 1, 2]);
    }

    #[test]
    fn encode_existing_rejects_gaps() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config(dir.path(), 1);
        fs::create_dir_all(&cfg.output_dir).unwrap();
        for i in [0, 2] {
            fs::write(cfg.output_dir.join(frame_file_name(i)), b"png").unwrap();
        }
        let hand = FlatHandTopology::new().unwrap();
        let seq = Sequencer::new(&hand, cfg, RecordingEncoder::default()).unwrap();
        match seq.encode_existing() {
            Err(PipelineError::Encoder(msg)) => assert!(msg.contains("frame 1")),
            other => panic!("unexpected {other:?}"),
        }
    }
}
