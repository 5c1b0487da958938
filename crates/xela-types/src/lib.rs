//! `xela-types` – shared data model for the Xela tactile hand pipeline.
//!
//! Everything that crosses a crate boundary lives here: the raw
//! [`TaxelReading`] and [`FlatFrame`] delivered by the sensor transport, the
//! [`TopologyEntry`] a wire index resolves to, the per-region
//! [`RegionTensor`] produced by frame conversion, and the [`XelaError`]
//! variants shared by every stage.

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ────────────────────────────────────────────────────────────────────────────
// Readings
// ────────────────────────────────────────────────────────────────────────────

/// One taxel sample.
///
/// `x` and `y` are the in-plane displacement, `z` the normal force. Units are
/// whatever the device reports; nothing in the pipeline rescales them before
/// rendering.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f32; 3]", into = "[f32; 3]")]
pub struct TaxelReading {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl TaxelReading {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Channel-wise difference `self - rhs`.
    pub fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }

    /// Channel-wise sum `self + rhs`.
    pub fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }

    pub fn scale(self, factor: f32) -> Self {
        Self::new(self.x * factor, self.y * factor, self.z * factor)
    }
}

impl From<[f32; 3]> for TaxelReading {
    fn from([x, y, z]: [f32; 3]) -> Self {
        Self::new(x, y, z)
    }
}

impl From<TaxelReading> for [f32; 3] {
    fn from(r: TaxelReading) -> Self {
        [r.x, r.y, r.z]
    }
}

/// All readings captured in one transport tick, indexed by wire index.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FlatFrame(Vec<TaxelReading>);

impl FlatFrame {
    pub fn new(readings: Vec<TaxelReading>) -> Self {
        Self(readings)
    }

    /// A frame of `len` zero readings.
    pub fn zeros(len: usize) -> Self {
        Self(vec![TaxelReading::ZERO; len])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn readings(&self) -> &[TaxelReading] {
        &self.0
    }

    pub fn get(&self, wire_index: usize) -> Option<TaxelReading> {
        self.0.get(wire_index).copied()
    }

    /// Fail with [`XelaError::ShapeMismatch`] unless the frame holds exactly
    /// `expected` readings.
    pub fn check_len(&self, expected: usize) -> Result<(), XelaError> {
        if self.len() == expected {
            Ok(())
        } else {
            Err(XelaError::ShapeMismatch {
                expected,
                actual: self.len(),
            })
        }
    }
}

impl From<Vec<TaxelReading>> for FlatFrame {
    fn from(readings: Vec<TaxelReading>) -> Self {
        Self(readings)
    }
}

impl FromIterator<TaxelReading> for FlatFrame {
    fn from_iter<I: IntoIterator<Item = TaxelReading>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Topology
// ────────────────────────────────────────────────────────────────────────────

/// A class of sensors sharing one tensor shape and one rendering grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    Palm,
    Fingertip,
    Finger,
}

impl Region {
    pub const ALL: [Region; 3] = [Region::Palm, Region::Fingertip, Region::Finger];
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Region::Palm => write!(f, "palm"),
            Region::Fingertip => write!(f, "fingertip"),
            Region::Finger => write!(f, "finger"),
        }
    }
}

/// Which physical hand is mounted, and therefore which wiring applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandKind {
    /// 368 taxels: curved fingertips, finger segments and a three-pad palm.
    #[default]
    Curved,
    /// 240 taxels: fifteen flat 4×4 pads, no palm.
    Flat,
}

impl std::fmt::Display for HandKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HandKind::Curved => write!(f, "curved"),
            HandKind::Flat => write!(f, "flat"),
        }
    }
}

/// Where a wire index physically lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TopologyEntry {
    pub region: Region,
    /// Sensor number, dense within `region`.
    pub sensor: usize,
    /// Row of the cell in the sensor's physical table.
    pub row: usize,
    /// Column of the cell in the sensor's physical table.
    pub col: usize,
    /// Compact taxel number within the sensor, `0..taxels_per_sensor`.
    pub local_id: usize,
}

/// `sensors × taxels` dimensions of one region tensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RegionShape {
    pub sensors: usize,
    pub taxels: usize,
}

impl RegionShape {
    pub const fn new(sensors: usize, taxels: usize) -> Self {
        Self { sensors, taxels }
    }

    pub const fn cells(&self) -> usize {
        self.sensors * self.taxels
    }
}

// ────────────────────────────────────────────────────────────────────────────
// RegionTensor
// ────────────────────────────────────────────────────────────────────────────

/// `[sensor][local id][channel]` readings for one region of one frame.
///
/// Stored flat, sensor-major, so a sensor's readings are one contiguous
/// slice in ascending local id.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionTensor {
    region: Region,
    shape: RegionShape,
    data: Vec<TaxelReading>,
}

impl RegionTensor {
    /// A tensor of the given shape with every cell at zero.
    pub fn zeros(region: Region, shape: RegionShape) -> Self {
        Self {
            region,
            shape,
            data: vec![TaxelReading::ZERO; shape.cells()],
        }
    }

    pub fn region(&self) -> Region {
        self.region
    }

    pub fn shape(&self) -> RegionShape {
        self.shape
    }

    fn offset(&self, sensor: usize, local_id: usize) -> Option<usize> {
        (sensor < self.shape.sensors && local_id < self.shape.taxels)
            .then(|| sensor * self.shape.taxels + local_id)
    }

    pub fn get(&self, sensor: usize, local_id: usize) -> Option<TaxelReading> {
        self.offset(sensor, local_id).map(|i| self.data[i])
    }

    /// Overwrite one cell.
    ///
    /// # Errors
    ///
    /// [`XelaError::ShapeMismatch`] when `(sensor, local_id)` is outside the
    /// tensor; `expected` reports the cell count, `actual` the flat offset
    /// that was requested.
    pub fn set(
        &mut self,
        sensor: usize,
        local_id: usize,
        reading: TaxelReading,
    ) -> Result<(), XelaError> {
        match self.offset(sensor, local_id) {
            Some(i) => {
                self.data[i] = reading;
                Ok(())
            }
            None => Err(XelaError::ShapeMismatch {
                expected: self.shape.cells(),
                actual: sensor * self.shape.taxels + local_id,
            }),
        }
    }

    /// The readings of one sensor in ascending local id.
    pub fn sensor(&self, sensor: usize) -> Option<&[TaxelReading]> {
        if sensor >= self.shape.sensors {
            return None;
        }
        let start = sensor * self.shape.taxels;
        Some(&self.data[start..start + self.shape.taxels])
    }

    /// Every reading, sensor-major.
    pub fn as_slice(&self) -> &[TaxelReading] {
        &self.data
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Errors
// ────────────────────────────────────────────────────────────────────────────

/// Domain errors shared by topology construction, conversion and
/// normalization.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum XelaError {
    #[error("Unmapped wire index {index}: no topology table contains it")]
    UnmappedIndex { index: usize },

    #[error("Wire index {index} appears in both {first} and {second}")]
    DuplicateIndex {
        index: usize,
        first: String,
        second: String,
    },

    #[error("Sensor {sensor}: cell folds to local taxel id {local_id}, which is out of range or already taken")]
    InvalidLocalId { sensor: String, local_id: i64 },

    #[error("Shape mismatch: expected {expected} readings, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("Insufficient frames for bias: need {required}, have {available}")]
    InsufficientFrames { required: usize, available: usize },

    #[error("Bias window must cover at least one frame")]
    EmptyBiasWindow,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn taxel_reading_serializes_as_triple() {
        let r = TaxelReading::new(1.0, -2.5, 300.0);
        let json = serde_json::to_string(&r).unwrap();
        assert_eq!(json, "[1.0,-2.5,300.0]");
        let back: TaxelReading = serde_json::from_str(&json).unwrap();
        assert_eq!(back, r);
    }

    #[test]
    fn flat_frame_is_transparent_array() {
        let frame = FlatFrame::new(vec![TaxelReading::new(1.0, 2.0, 3.0); 2]);
        let json = serde_json::to_string(&frame).unwrap();
        assert_eq!(json, "[[1.0,2.0,3.0],[1.0,2.0,3.0]]");
    }

    #[test]
    fn check_len_reports_both_sizes() {
        let frame = FlatFrame::zeros(367);
        assert_eq!(
            frame.check_len(368),
            Err(XelaError::ShapeMismatch {
                expected: 368,
                actual: 367
            })
        );
        assert!(FlatFrame::zeros(368).check_len(368).is_ok());
    }

    #[test]
    fn reading_arithmetic() {
        let a = TaxelReading::new(4.0, 6.0, 8.0);
        let b = TaxelReading::new(1.0, 2.0, 3.0);
        assert_eq!(a.sub(b), TaxelReading::new(3.0, 4.0, 5.0));
        assert_eq!(a.add(b), TaxelReading::new(5.0, 8.0, 11.0));
        assert_eq!(a.scale(0.5), TaxelReading::new(2.0, 3.0, 4.0));
    }

    #[test]
    fn region_tensor_set_get_and_sensor_slice() {
        let mut t = RegionTensor::zeros(Region::Palm, RegionShape::new(3, 24));
        t.set(1, 5, TaxelReading::new(1.0, 1.0, 1.0)).unwrap();
        assert_eq!(t.get(1, 5), Some(TaxelReading::new(1.0, 1.0, 1.0)));
        assert_eq!(t.sensor(1).unwrap()[5], TaxelReading::new(1.0, 1.0, 1.0));
        assert_eq!(t.sensor(1).unwrap().len(), 24);
        assert!(t.sensor(3).is_none());
        assert!(t.get(0, 24).is_none());
    }

    #[test]
    fn region_tensor_rejects_out_of_range_cell() {
        let mut t = RegionTensor::zeros(Region::Finger, RegionShape::new(11, 16));
        let err = t.set(11, 0, TaxelReading::ZERO).unwrap_err();
        assert!(matches!(err, XelaError::ShapeMismatch { expected: 176, .. }));
    }

    #[test]
    fn region_display_and_serde_are_lowercase() {
        assert_eq!(Region::Fingertip.to_string(), "fingertip");
        assert_eq!(serde_json::to_string(&Region::Palm).unwrap(), "\"palm\"");
    }

    #[test]
    fn hand_kind_defaults_to_curved() {
        assert_eq!(HandKind::default(), HandKind::Curved);
        let back: HandKind = serde_json::from_str("\"flat\"").unwrap();
        assert_eq!(back, HandKind::Flat);
    }

    #[test]
    fn xela_error_display() {
        let err = XelaError::UnmappedIndex { index: 12 };
        assert!(err.to_string().contains("Unmapped wire index 12"));
        let err = XelaError::InsufficientFrames {
            required: 100,
            available: 3,
        };
        assert!(err.to_string().contains("need 100, have 3"));
    }
}
