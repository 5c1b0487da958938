//! Pipeline error type.

use std::path::PathBuf;

use thiserror::Error;
use xela_types::XelaError;

/// Anything that can stop a visualization run.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Topology, shape or bias-window violation.
    #[error(transparent)]
    Domain(#[from] XelaError),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Image error on {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Archive format error: {0}")]
    Archive(#[from] serde_json::Error),

    /// The external video encoder could not be run or reported failure.
    #[error("Encoder error: {0}")]
    Encoder(String),

    /// Render constants that cannot produce a drawable circle.
    #[error("Render style error: {0}")]
    Style(String),

    /// The composite layout names a sensor the topology does not have.
    #[error("Layout error: {0}")]
    Layout(String),
}

impl PipelineError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_error_is_transparent() {
        let err: PipelineError = XelaError::ShapeMismatch {
            expected: 368,
            actual: 10,
        }
        .into();
        assert_eq!(err.to_string(), "Shape mismatch: expected 368 readings, got 10");
    }

    #[test]
    fn io_error_names_path() {
        let err = PipelineError::io(
            "/nowhere/state_000.png",
            std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        );
        assert!(err.to_string().contains("/nowhere/state_000.png"));
    }
}
