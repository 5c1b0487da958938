//! `xela-pipeline` – From raw sensor frames to frame images and a video.
//!
//! # Modules
//!
//! - [`bias`] – [`BiasVector`][bias::BiasVector]: the per-wire resting
//!   baseline averaged over the first frames of a session, subtracted from
//!   every frame.
//! - [`convert`] – [`FrameConverter`][convert::FrameConverter]: scatters a
//!   flat frame into palm, fingertip and finger tensors through a
//!   [`TopologyResolver`][xela_topology::TopologyResolver].
//! - [`render`] – [`Renderer`][render::Renderer]: draws one sensor (or the
//!   palm panel) as displaced, pressure-sized circles.
//! - [`layout`] – [`FrameRenderer`][layout::FrameRenderer]: composes every
//!   sensor of a hand into one frame image.
//! - [`encoder`] – frame naming and the
//!   [`VideoEncoder`][encoder::VideoEncoder] seam, with the
//!   [`FfmpegEncoder`][encoder::FfmpegEncoder] implementation.
//! - [`sequencer`] – [`Sequencer`][sequencer::Sequencer]: runs a whole
//!   session through the stages above, one frame at a time.
//! - [`archive`] – JSON session archive load/save.
//! - [`recorder`] – [`FrameRecorder`][recorder::FrameRecorder]: captures a
//!   live session into an archive.
//! - [`error`] – [`PipelineError`][error::PipelineError].

pub mod archive;
pub mod bias;
pub mod convert;
pub mod encoder;
pub mod error;
pub mod layout;
pub mod recorder;
pub mod render;
pub mod sequencer;

pub use archive::{load_frames, save_frames};
pub use bias::BiasVector;
pub use convert::{FrameConverter, RegionTensors};
pub use encoder::{FfmpegEncoder, VideoEncoder, frame_file_name, parse_frame_index};
pub use error::PipelineError;
pub use layout::{FrameRenderer, HandLayout, Slot};
pub use recorder::FrameRecorder;
pub use render::{Circle, RenderStyle, Renderer};
pub use sequencer::{RunSummary, Sequencer, SequencerConfig};
