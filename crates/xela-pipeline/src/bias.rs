//! Session baseline removal.
//!
//! The first `K` frames of a session are averaged per wire index and
//! channel; that [`BiasVector`] is then subtracted from every frame,
//! including the `K` it was computed from, so the rendering shows change
//! relative to the resting hand.

use xela_types::{FlatFrame, TaxelReading, XelaError};

/// Per-wire resting baseline of one session.
#[derive(Debug, Clone, PartialEq)]
pub struct BiasVector(FlatFrame);

impl BiasVector {
    /// Average the first `window` frames.
    ///
    /// # Errors
    ///
    /// - [`XelaError::EmptyBiasWindow`] if `window` is zero.
    /// - [`XelaError::InsufficientFrames`] if fewer than `window` frames are
    ///   available.
    /// - [`XelaError::ShapeMismatch`] if the frames in the window differ in
    ///   length.
    pub fn compute(frames: &[FlatFrame], window: usize) -> Result<Self, XelaError> {
        if window == 0 {
            return Err(XelaError::EmptyBiasWindow);
        }
        if frames.len() < window {
            return Err(XelaError::InsufficientFrames {
                required: window,
                available: frames.len(),
            });
        }
        let width = frames[0].len();
        let mut sum = vec![TaxelReading::ZERO; width];
        for frame in &frames[..window] {
            frame.check_len(width)?;
            for (acc, &r) in sum.iter_mut().zip(frame.readings()) {
                *acc = acc.add(r);
            }
        }
        let inv = 1.0 / window as f32;
        Ok(Self(sum.into_iter().map(|r| r.scale(inv)).collect()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_frame(&self) -> &FlatFrame {
        &self.0
    }

    /// `frame - bias`, channel by channel.
    ///
    /// # Errors
    ///
    /// [`XelaError::ShapeMismatch`] if `frame` is not as wide as the bias.
    pub fn apply(&self, frame: &FlatFrame) -> Result<FlatFrame, XelaError> {
        frame.check_len(self.0.len())?;
        Ok(frame
            .readings()
            .iter()
            .zip(self.0.readings())
            .map(|(&r, &b)| r.sub(b))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(values: &[(f32, f32, f32)]) -> FlatFrame {
        values
            .iter()
            .map(|&(x, y, z)| TaxelReading::new(x, y, z))
            .collect()
    }

    #[test]
    fn single_frame_window_zeroes_that_frame() {
        let f = frame(&[(1.5, -2.0, 300.0), (7.0, 8.0, 9.0)]);
        let bias = BiasVector::compute(std::slice::from_ref(&f), 1).unwrap();
        let zeroed = bias.apply(&f).unwrap();
        assert!(zeroed.readings().iter().all(|&r| r == TaxelReading::ZERO));
    }

    #[test]
    fn averages_only_the_window() {
        let frames = vec![
            frame(&[(0.0, 0.0, 10.0)]),
            frame(&[(2.0, 4.0, 20.0)]),
            frame(&[(100.0, 100.0, 100.0)]),
        ];
        let bias = BiasVector::compute(&frames, 2).unwrap();
        assert_eq!(bias.as_frame().get(0), Some(TaxelReading::new(1.0, 2.0, 15.0)));
        let out = bias.apply(&frames[2]).unwrap();
        assert_eq!(out.get(0), Some(TaxelReading::new(99.0, 98.0, 85.0)));
    }

    #[test]
    fn too_few_frames() {
        let frames = vec![FlatFrame::zeros(4); 3];
        assert_eq!(
            BiasVector::compute(&frames, 100).unwrap_err(),
            XelaError::InsufficientFrames {
                required: 100,
                available: 3
            }
        );
    }

    #[test]
    fn zero_window_is_rejected() {
        let frames = vec![FlatFrame::zeros(4); 3];
        assert_eq!(
            BiasVector::compute(&frames, 0).unwrap_err(),
            XelaError::EmptyBiasWindow
        );
        assert_eq!(BiasVector::compute(&[], 0).unwrap_err(), XelaError::EmptyBiasWindow);
    }

    #[test]
    fn ragged_window_is_rejected() {
        let frames = vec![FlatFrame::zeros(4), FlatFrame::zeros(5)];
        assert_eq!(
            BiasVector::compute(&frames, 2).unwrap_err(),
            XelaError::ShapeMismatch {
                expected: 4,
                actual: 5
            }
        );
    }

    #[test]
    fn apply_checks_width() {
        let bias = BiasVector::compute(&[FlatFrame::zeros(4)], 1).unwrap();
        assert!(bias.apply(&FlatFrame::zeros(3)).is_err());
        assert_eq!(bias.len(), 4);
    }
}
