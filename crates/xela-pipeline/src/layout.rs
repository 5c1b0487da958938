//! Composite frame layout.
//!
//! A frame image is a grid of 240×240 cells: one column per finger (thumb,
//! index, middle, ring) and one row per segment, tip on top. The thumb has
//! one segment fewer than the other fingers, so its top cell is left empty
//! to keep the tips of the long fingers level. On the curved hand a 960×480
//! palm panel spans the bottom.

use image::imageops::overlay;
use image::{Rgb, RgbImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;
use xela_topology::TopologyResolver;
use xela_types::{HandKind, Region};

use crate::convert::RegionTensors;
use crate::error::PipelineError;
use crate::render::{PALM_CANVAS, Renderer, SENSOR_CANVAS};

const FINGERS: [&str; 4] = ["thumb", "index", "middle", "ring"];
const ROWS: u32 = 4;
const BORDER: [u8; 3] = [200, 200, 200];

/// A named cell of the composite grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Slot {
    /// Reserved blank cell.
    Empty,
    /// The cell shows the sensor with this physical name.
    Sensor(String),
}

/// Which sensor goes in which cell for one hand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandLayout {
    /// `cells[col][row]`.
    pub cells: Vec<Vec<Slot>>,
    /// Whether a palm panel sits below the finger grid.
    pub palm: bool,
}

impl HandLayout {
    pub fn for_hand(hand: HandKind) -> Self {
        let cells = FINGERS
            .iter()
            .map(|&finger| {
                let names: Vec<String> = match (hand, finger) {
                    (HandKind::Curved, "thumb") => {
                        vec!["thumb_tip".into(), "thumb_section1".into(), "thumb_section2".into()]
                    }
                    (HandKind::Curved, _) => std::iter::once(format!("{finger}_tip"))
                        .chain((1..=3).map(|i| format!("{finger}_section{i}")))
                        .collect(),
                    (HandKind::Flat, "thumb") => {
                        (1..=3).map(|i| format!("thumb_section{i}")).collect()
                    }
                    (HandKind::Flat, _) => (1..=4).map(|i| format!("{finger}_section{i}")).collect(),
                };
                let pad = ROWS as usize - names.len();
                std::iter::repeat_n(Slot::Empty, pad)
                    .chain(names.into_iter().map(Slot::Sensor))
                    .collect()
            })
            .collect();
        Self {
            cells,
            palm: hand == HandKind::Curved,
        }
    }

    /// `(width, height)` of the composite image.
    pub fn canvas_size(&self) -> (u32, u32) {
        let width = self.cells.len() as u32 * SENSOR_CANVAS.0;
        let mut height = ROWS * SENSOR_CANVAS.1;
        if self.palm {
            height += PALM_CANVAS.1;
        }
        (width, height)
    }
}

/// A sensor bound to its pixel origin in the composite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Placement {
    region: Region,
    sensor: usize,
    origin: (i32, i32),
}

/// Renders whole frames: every sensor in its cell plus the palm panel.
///
/// Layout names are resolved against the topology once, at construction.
#[derive(Debug, Clone)]
pub struct FrameRenderer {
    renderer: Renderer,
    placements: Vec<Placement>,
    palm_origin: Option<(i32, i32)>,
    size: (u32, u32),
}

impl FrameRenderer {
    /// # Errors
    ///
    /// [`PipelineError::Layout`] if the layout names a sensor the topology
    /// lacks, names one twice, or leaves a non-palm sensor unplaced.
    pub fn new(topology: &dyn TopologyResolver, renderer: Renderer) -> Result<Self, PipelineError> {
        let layout = HandLayout::for_hand(topology.hand());
        let mut placements = Vec::new();
        for (col, column) in layout.cells.iter().enumerate() {
            for (row, slot) in column.iter().enumerate() {
                let Slot::Sensor(name) = slot else { continue };
                let grid = topology.sensor_named(name).ok_or_else(|| {
                    PipelineError::Layout(format!("no sensor named {name} on the {} hand", topology.hand()))
                })?;
                let p = Placement {
                    region: grid.region,
                    sensor: grid.sensor,
                    origin: (cell_offset(col, SENSOR_CANVAS.0)?, cell_offset(row, SENSOR_CANVAS.1)?),
                };
                if placements
                    .iter()
                    .any(|q: &Placement| (q.region, q.sensor) == (p.region, p.sensor))
                {
                    return Err(PipelineError::Layout(format!("sensor {name} placed twice")));
                }
                placements.push(p);
            }
        }

        let unplaced = topology
            .sensors()
            .iter()
            .filter(|g| g.region != Region::Palm)
            .find(|g| !placements.iter().any(|p| (p.region, p.sensor) == (g.region, g.sensor)));
        if let Some(g) = unplaced {
            return Err(PipelineError::Layout(format!("sensor {} has no cell", g.name)));
        }

        let palm_origin = if layout.palm {
            Some((0, cell_offset(ROWS as usize, SENSOR_CANVAS.1)?))
        } else {
            None
        };
        Ok(Self {
            renderer,
            placements,
            palm_origin,
            size: layout.canvas_size(),
        })
    }

    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    /// Compose one frame on a fresh canvas.
    pub fn render_frame(&self, tensors: &RegionTensors) -> Result<RgbImage, PipelineError> {
        let style = self.renderer.style();
        let mut canvas = style.blank(self.size);
        for p in &self.placements {
            let tile = self.renderer.render(tensors.region(p.region), p.sensor)?;
            overlay(&mut canvas, &tile, p.origin.0.into(), p.origin.1.into());
            frame_cell(&mut canvas, p.origin, SENSOR_CANVAS);
        }
        if let Some(origin) = self.palm_origin {
            let palm = self.renderer.render_palm(&tensors.palm)?;
            overlay(&mut canvas, &palm, origin.0.into(), origin.1.into());
            frame_cell(&mut canvas, origin, PALM_CANVAS);
        }
        Ok(canvas)
    }
}

/// Pixel offset of grid cell `index` along an axis of `cell` pixels.
fn cell_offset(index: usize, cell: u32) -> Result<i32, PipelineError> {
    u32::try_from(index)
        .ok()
        .and_then(|i| i.checked_mul(cell))
        .and_then(|px| i32::try_from(px).ok())
        .ok_or_else(|| PipelineError::Layout(format!("cell {index} lies outside the canvas")))
}

fn frame_cell(canvas: &mut RgbImage, (x, y): (i32, i32), (w, h): (u32, u32)) {
    let rect = Rect::at(x, y).of_size(w, h);
    draw_hollow_rect_mut(canvas, rect, Rgb(BORDER));
}
