//! Per-sensor tactile images.
//!
//! Every region owns a fixed grid of pixel anchors, one per local taxel id,
//! laid out like the physical pad. A taxel is drawn as a filled circle moved
//! off its anchor by the in-plane displacement and grown or shrunk by the
//! normal force. Circles go down in ascending local id, so a later taxel may
//! cover an earlier one and the output is reproducible.

use image::{Rgb, RgbImage};
use imageproc::drawing::draw_filled_circle_mut;
use serde::{Deserialize, Serialize};
use xela_types::{Region, RegionTensor, TaxelReading};

use crate::error::PipelineError;

// ────────────────────────────────────────────────────────────────────────────
// Anchor grids
// ────────────────────────────────────────────────────────────────────────────

/// `(width, height)` of a finger or fingertip sensor image.
pub const SENSOR_CANVAS: (u32, u32) = (240, 240);

/// `(width, height)` of the palm image, which holds all three palm pads.
pub const PALM_CANVAS: (u32, u32) = (960, 480);

/// 4×4 finger segment, row-major.
#[rustfmt::skip]
pub const FINGER_ANCHORS: [(i32, i32); 16] = [
    (60, 60), (100, 60), (140, 60), (180, 60),
    (60, 100), (100, 100), (140, 100), (180, 100),
    (60, 140), (100, 140), (140, 140), (180, 140),
    (60, 180), (100, 180), (140, 180), (180, 180),
];

/// Curved tip: 2, 4, then four rows of 6, centred.
#[rustfmt::skip]
pub const FINGERTIP_ANCHORS: [(i32, i32); 30] = [
    (100, 20), (140, 20),
    (60, 60), (100, 60), (140, 60), (180, 60),
    (20, 100), (60, 100), (100, 100), (140, 100), (180, 100), (220, 100),
    (20, 140), (60, 140), (100, 140), (140, 140), (180, 140), (220, 140),
    (20, 180), (60, 180), (100, 180), (140, 180), (180, 180), (220, 180),
    (20, 220), (60, 220), (100, 220), (140, 220), (180, 220), (220, 220),
];

/// Three 4×6 palm pads: upper left, upper right, lower right.
#[rustfmt::skip]
pub const PALM_ANCHORS: [(i32, i32); 72] = [
    (220, 70), (260, 70), (300, 70), (340, 70), (380, 70), (420, 70),
    (220, 110), (260, 110), (300, 110), (340, 110), (380, 110), (420, 110),
    (220, 150), (260, 150), (300, 150), (340, 150), (380, 150), (420, 150),
    (220, 190), (260, 190), (300, 190), (340, 190), (380, 190), (420, 190),
    (540, 70), (580, 70), (620, 70), (660, 70), (700, 70), (740, 70),
    (540, 110), (580, 110), (620, 110), (660, 110), (700, 110), (740, 110),
    (540, 150), (580, 150), (620, 150), (660, 150), (700, 150), (740, 150),
    (540, 190), (580, 190), (620, 190), (660, 190), (700, 190), (740, 190),
    (540, 270), (580, 270), (620, 270), (660, 270), (700, 270), (740, 270),
    (540, 310), (580, 310), (620, 310), (660, 310), (700, 310), (740, 310),
    (540, 350), (580, 350), (620, 350), (660, 350), (700, 350), (740, 350),
    (540, 390), (580, 390), (620, 390), (660, 390), (700, 390), (740, 390),
];

/// Anchors of one sensor of `region`, or `None` if the region has no such
/// sensor slot in its grid.
pub fn anchors(region: Region, sensor: usize) -> Option<&'static [(i32, i32)]> {
    match region {
        Region::Finger => Some(&FINGER_ANCHORS),
        Region::Fingertip => Some(&FINGERTIP_ANCHORS),
        Region::Palm => {
            let per_pad = PALM_ANCHORS.len() / 3;
            PALM_ANCHORS.get(sensor * per_pad..(sensor + 1) * per_pad)
        }
    }
}

pub fn canvas_size(region: Region) -> (u32, u32) {
    match region {
        Region::Palm => PALM_CANVAS,
        Region::Finger | Region::Fingertip => SENSOR_CANVAS,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// RenderStyle
// ────────────────────────────────────────────────────────────────────────────

/// Circle geometry and colours.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderStyle {
    /// Device displacement units per pixel of circle offset.
    pub displacement_scale: f32,
    /// Device force units per pixel of radius.
    pub pressure_scale: f32,
    /// Radius of a taxel at zero force.
    pub base_radius: i32,
    /// Radius floor, however negative the force.
    pub min_radius: i32,
    pub color: [u8; 3],
    pub background: [u8; 3],
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self {
            displacement_scale: 20.0,
            pressure_scale: 10.0,
            base_radius: 10,
            min_radius: 2,
            color: [0, 255, 0],
            background: [255, 255, 255],
        }
    }
}

/// Bound on a circle's radius and on its offset from the anchor, in pixels.
/// Larger than the diagonal of any canvas, so clamping never changes the
/// image, and small enough that circle rasterization cannot overflow `i32`.
pub const MAX_EXTENT: i32 = 2048;

/// One taxel's circle, in canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Circle {
    pub center: (i32, i32),
    pub radius: i32,
}

impl RenderStyle {
    /// Reject scales that are zero, negative or not finite, and a negative
    /// radius floor.
    pub fn validate(&self) -> Result<(), PipelineError> {
        for (name, scale) in [
            ("displacement_scale", self.displacement_scale),
            ("pressure_scale", self.pressure_scale),
        ] {
            if !(scale.is_finite() && scale > 0.0) {
                return Err(PipelineError::Style(format!(
                    "{name} must be a positive number, got {scale}"
                )));
            }
        }
        if self.min_radius < 0 {
            return Err(PipelineError::Style(format!(
                "min_radius must not be negative, got {}",
                self.min_radius
            )));
        }
        Ok(())
    }

    /// Place the circle for `reading` at `anchor`. Offsets and the radius
    /// delta truncate toward zero; both are bounded by [`MAX_EXTENT`].
    pub fn circle(&self, anchor: (i32, i32), reading: TaxelReading) -> Circle {
        let offset = |v: f32| ((v / self.displacement_scale) as i32).clamp(-MAX_EXTENT, MAX_EXTENT);
        let grow = (reading.z / self.pressure_scale) as i32;
        Circle {
            center: (
                anchor.0.saturating_add(offset(reading.x)),
                anchor.1.saturating_add(offset(reading.y)),
            ),
            radius: self
                .base_radius
                .saturating_add(grow)
                .max(self.min_radius)
                .min(MAX_EXTENT),
        }
    }

    pub fn blank(&self, (width, height): (u32, u32)) -> RgbImage {
        RgbImage::from_pixel(width, height, Rgb(self.background))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Renderer
// ────────────────────────────────────────────────────────────────────────────

/// Draws sensor images from region tensors.
#[derive(Debug, Clone, Copy, Default)]
pub struct Renderer {
    style: RenderStyle,
}

impl Renderer {
    pub fn new(style: RenderStyle) -> Self {
        Self { style }
    }

    pub fn style(&self) -> &RenderStyle {
        &self.style
    }

    /// Render one sensor of `tensor` onto a fresh canvas.
    ///
    /// Palm sensors are drawn on the full palm canvas at their own pad's
    /// position.
    ///
    /// # Errors
    ///
    /// [`PipelineError::Layout`] if the tensor has no such sensor.
    pub fn render(&self, tensor: &RegionTensor, sensor: usize) -> Result<RgbImage, PipelineError> {
        let region = tensor.region();
        let mut canvas = self.style.blank(canvas_size(region));
        self.draw_sensor(&mut canvas, tensor, sensor)?;
        Ok(canvas)
    }

    /// Render every palm pad onto one palm canvas, pad by pad.
    pub fn render_palm(&self, palm: &RegionTensor) -> Result<RgbImage, PipelineError> {
        let mut canvas = self.style.blank(PALM_CANVAS);
        for sensor in 0..palm.shape().sensors {
            self.draw_sensor(&mut canvas, palm, sensor)?;
        }
        Ok(canvas)
    }

    fn draw_sensor(
        &self,
        canvas: &mut RgbImage,
        tensor: &RegionTensor,
        sensor: usize,
    ) -> Result<(), PipelineError> {
        let region = tensor.region();
        let missing = || PipelineError::Layout(format!("{region} sensor {sensor} does not exist"));
        let readings = tensor.sensor(sensor).ok_or_else(missing)?;
        let grid = anchors(region, sensor).ok_or_else(missing)?;
        if grid.len() != readings.len() {
            return Err(PipelineError::Layout(format!(
                "{region} grid has {} anchors for {} taxels",
                grid.len(),
                readings.len()
            )));
        }
        let color = Rgb(self.style.color);
        for (&anchor, &reading) in grid.iter().zip(readings) {
            let c = self.style.circle(anchor, reading);
            draw_filled_circle_mut(canvas, c.center, c.radius, color);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use xela_types::RegionShape;

    #[test]
    fn anchor_tables_match_taxel_counts() {
        assert_eq!(anchors(Region::Finger, 0).unwrap().len(), 16);
        assert_eq!(anchors(Region::Fingertip, 3).unwrap().len(), 30);
        for pad in 0..3 {
            assert_eq!(anchors(Region::Palm, pad).unwrap().len(), 24);
        }
        assert!(anchors(Region::Palm, 3).is_none());
    }

    #[test]
    fn anchors_are_distinct_and_inside_canvas() {
        for (table, (w, h)) in [
            (&FINGER_ANCHORS[..], SENSOR_CANVAS),
            (&FINGERTIP_ANCHORS[..], SENSOR_CANVAS),
            (&PALM_ANCHORS[..], PALM_CANVAS),
        ] {
            let mut seen = std::collections::HashSet::new();
            for &(x, y) in table {
                assert!(seen.insert((x, y)));
                assert!(x > 0 && y > 0 && (x as u32) < w && (y as u32) < h);
            }
        }
    }

    #[test]
    fn tip_top_rows_skip_corners() {
        assert_eq!(FINGERTIP_ANCHORS[..2], [(100, 20), (140, 20)]);
        assert!(FINGERTIP_ANCHORS[2..6].iter().all(|&(x, y)| y == 60 && x > 20 && x < 220));
    }

    #[test]
    fn circle_follows_reading() {
        let style = RenderStyle::default();
        let c = style.circle((60, 60), TaxelReading::new(45.0, -45.0, 35.0));
        assert_eq!(c.center, (62, 58));
        assert_eq!(c.radius, 13);
    }

    #[test]
    fn radius_never_below_floor() {
        let style = RenderStyle::default();
        for z in [-1e9, -500.0, -81.0, -80.0, 0.0, f32::NAN, f32::NEG_INFINITY] {
            let c = style.circle((0, 0), TaxelReading::new(0.0, 0.0, z));
            assert!(c.radius >= style.min_radius, "z = {z}");
        }
        let c = style.circle((0, 0), TaxelReading::new(0.0, 0.0, -500.0));
        assert_eq!(c.radius, 2);
    }

    #[test]
    fn radius_and_offset_stay_bounded() {
        let style = RenderStyle::default();
        for z in [2.2e10, 3.0e10, f32::MAX, f32::INFINITY] {
            let c = style.circle((60, 60), TaxelReading::new(0.0, 0.0, z));
            assert_eq!(c.radius, MAX_EXTENT, "z = {z}");
        }
        let c = style.circle((60, 60), TaxelReading::new(f32::MAX, -f32::MAX, 0.0));
        assert_eq!(c.center, (60 + MAX_EXTENT, 60 - MAX_EXTENT));
    }

    #[test]
    fn huge_pressure_renders_a_full_canvas() {
        let renderer = Renderer::default();
        let mut tensor = RegionTensor::zeros(Region::Finger, RegionShape::new(1, 16));
        tensor.set(0, 0, TaxelReading::new(0.0, 0.0, 3.0e10)).unwrap();
        let img = renderer.render(&tensor, 0).unwrap();
        assert_eq!(*img.get_pixel(0, 0), Rgb([0, 255, 0]));
        assert_eq!(*img.get_pixel(239, 239), Rgb([0, 255, 0]));
    }

    #[test]
    fn validate_rejects_degenerate_scales() {
        assert!(RenderStyle::default().validate().is_ok());
        for bad in [0.0, -20.0, f32::NAN, f32::INFINITY] {
            let style = RenderStyle {
                pressure_scale: bad,
                ..RenderStyle::default()
            };
            assert!(matches!(style.validate(), Err(PipelineError::Style(_))), "pressure {bad}");
            let style = RenderStyle {
                displacement_scale: bad,
                ..RenderStyle::default()
            };
            assert!(matches!(style.validate(), Err(PipelineError::Style(_))), "displacement {bad}");
        }
        let style = RenderStyle {
            min_radius: -1,
            ..RenderStyle::default()
        };
        assert!(style.validate().is_err());
    }

    #[test]
    fn render_paints_on_white() {
        let renderer = Renderer::default();
        let tensor = RegionTensor::zeros(Region::Finger, RegionShape::new(1, 16));
        let img = renderer.render(&tensor, 0).unwrap();
        assert_eq!(img.dimensions(), SENSOR_CANVAS);
        assert_eq!(*img.get_pixel(60, 60), Rgb([0, 255, 0]));
        assert_eq!(*img.get_pixel(5, 5), Rgb([255, 255, 255]));
    }

    #[test]
    fn displacement_moves_circle_off_anchor() {
        let renderer = Renderer::default();
        let mut tensor = RegionTensor::zeros(Region::Finger, RegionShape::new(1, 16));
        // Push taxel 1 onto taxel 0's anchor.
        tensor.set(0, 1, TaxelReading::new(-800.0, 0.0, 0.0)).unwrap();
        let img = renderer.render(&tensor, 0).unwrap();
        assert_eq!(*img.get_pixel(60, 60), Rgb([0, 255, 0]));
        assert_eq!(*img.get_pixel(100, 60), Rgb([255, 255, 255]));
    }

    #[test]
    fn rendering_is_deterministic() {
        let renderer = Renderer::default();
        let mut tensor = RegionTensor::zeros(Region::Fingertip, RegionShape::new(1, 30));
        for id in 0..30 {
            let v = id as f32 * 13.0 - 150.0;
            tensor.set(0, id, TaxelReading::new(v, -v, v * 2.0)).unwrap();
        }
        assert_eq!(renderer.render(&tensor, 0).unwrap(), renderer.render(&tensor, 0).unwrap());
    }

    #[test]
    fn palm_pads_render_in_place() {
        let renderer = Renderer::default();
        let palm = RegionTensor::zeros(Region::Palm, RegionShape::new(3, 24));
        let pad2 = renderer.render(&palm, 2).unwrap();
        assert_eq!(pad2.dimensions(), PALM_CANVAS);
        assert_eq!(*pad2.get_pixel(540, 270), Rgb([0, 255, 0]));
        assert_eq!(*pad2.get_pixel(220, 70), Rgb([255, 255, 255]));

        let all = renderer.render_palm(&palm).unwrap();
        assert_eq!(*all.get_pixel(220, 70), Rgb([0, 255, 0]));
        assert_eq!(*all.get_pixel(540, 390), Rgb([0, 255, 0]));
    }

    #[test]
    fn missing_sensor_is_a_layout_error() {
        let renderer = Renderer::default();
        let tensor = RegionTensor::zeros(Region::Fingertip, RegionShape::new(4, 30));
        assert!(matches!(renderer.render(&tensor, 4), Err(PipelineError::Layout(_))));
    }
}
