//! Visualizer settings – reads/writes `~/.xela/config.toml`.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use xela_pipeline::{FfmpegEncoder, RenderStyle, SequencerConfig};
use xela_types::HandKind;

/// Persisted settings stored in `~/.xela/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualizerConfig {
    /// Which hand the recording came from.
    #[serde(default)]
    pub hand: HandKind,

    /// Readings per frame; must match the hand's topology.
    #[serde(default = "default_total_taxels")]
    pub total_taxels: usize,

    /// Leading frames averaged into the resting baseline.
    #[serde(default = "default_bias_window")]
    pub bias_window: usize,

    /// Video playback rate in frames per second.
    #[serde(default = "default_frame_rate")]
    pub frame_rate: u32,

    /// Recorded session archive.
    #[serde(default = "default_input")]
    pub input: PathBuf,

    /// Directory receiving the frame images.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    #[serde(default = "default_video_path")]
    pub video_path: PathBuf,

    /// Encoded video `[width, height]`.
    #[serde(default = "default_video_scale")]
    pub video_scale: [u32; 2],

    /// Encoder executable.
    #[serde(default = "default_encoder")]
    pub encoder: String,

    #[serde(default)]
    pub render: RenderStyle,
}

fn default_total_taxels() -> usize {
    368
}
fn default_bias_window() -> usize {
    100
}
fn default_frame_rate() -> u32 {
    10
}
fn default_input() -> PathBuf {
    PathBuf::from("sensor_values.json")
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("visualization")
}
fn default_video_path() -> PathBuf {
    PathBuf::from("visualization.mp4")
}
fn default_video_scale() -> [u32; 2] {
    [720, 1440]
}
fn default_encoder() -> String {
    "ffmpeg".to_string()
}

impl Default for VisualizerConfig {
    fn default() -> Self {
        Self {
            hand: HandKind::default(),
            total_taxels: default_total_taxels(),
            bias_window: default_bias_window(),
            frame_rate: default_frame_rate(),
            input: default_input(),
            output_dir: default_output_dir(),
            video_path: default_video_path(),
            video_scale: default_video_scale(),
            encoder: default_encoder(),
            render: RenderStyle::default(),
        }
    }
}

impl VisualizerConfig {
    pub fn sequencer(&self) -> SequencerConfig {
        SequencerConfig {
            bias_window: self.bias_window,
            frame_rate: self.frame_rate,
            output_dir: self.output_dir.clone(),
            video_path: self.video_path.clone(),
            style: self.render,
        }
    }

    pub fn encoder(&self) -> FfmpegEncoder {
        FfmpegEncoder {
            program: self.encoder.clone(),
            scale: (self.video_scale[0], self.video_scale[1]),
        }
    }
}

/// Return the config path: `XELA_CONFIG` if set, else `~/.xela/config.toml`.
pub fn config_path() -> PathBuf {
    if let Ok(p) = std::env::var("XELA_CONFIG") {
        return PathBuf::from(p);
    }
    config_path_for_home(
        &std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string()),
    )
}

/// Build the config path relative to the given home directory.
pub(crate) fn config_path_for_home(home: &str) -> PathBuf {
    PathBuf::from(home).join(".xela").join("config.toml")
}

/// Load the config from disk.  Returns `None` if the file does not exist.
pub fn load() -> Result<Option<VisualizerConfig>, String> {
    load_from(&config_path())
}

/// Load the config from a specific path.
pub(crate) fn load_from(path: &Path) -> Result<Option<VisualizerConfig>, String> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config at {}: {}", path.display(), e))?;
    let mut cfg: VisualizerConfig =
        toml::from_str(&raw).map_err(|e| format!("Failed to parse config: {}", e))?;
    apply_env_overrides(&mut cfg);
    Ok(Some(cfg))
}

/// Apply `XELA_*` environment variable overrides to `cfg`.
///
/// | Variable | Config field |
/// |---|---|
/// | `XELA_INPUT` | `input` |
/// | `XELA_OUTPUT_DIR` | `output_dir` |
/// | `XELA_FRAME_RATE` | `frame_rate` |
/// | `XELA_BIAS_WINDOW` | `bias_window` |
pub fn apply_env_overrides(cfg: &mut VisualizerConfig) {
    if let Ok(v) = std::env::var("XELA_INPUT") {
        cfg.input = PathBuf::from(v);
    }
    if let Ok(v) = std::env::var("XELA_OUTPUT_DIR") {
        cfg.output_dir = PathBuf::from(v);
    }
    if let Ok(v) = std::env::var("XELA_FRAME_RATE")
        && let Ok(fps) = v.parse::<u32>()
    {
        cfg.frame_rate = fps;
    }
    if let Ok(v) = std::env::var("XELA_BIAS_WINDOW")
        && let Ok(k) = v.parse::<usize>()
    {
        cfg.bias_window = k;
    }
}

/// Save the config to disk, creating `~/.xela/` if necessary.
pub fn save(cfg: &VisualizerConfig) -> Result<(), String> {
    save_to(cfg, &config_path())
}

/// Save the config to a specific path.
pub(crate) fn save_to(cfg: &VisualizerConfig, path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create config directory: {}", e))?;
    }
    let raw =
        toml::to_string_pretty(cfg).map_err(|e| format!("Failed to serialize config: {}", e))?;
    fs::write(path, raw)
        .map_err(|e| format!("Failed to write config at {}: {}", path.display(), e))
}
