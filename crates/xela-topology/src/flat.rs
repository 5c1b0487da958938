//! The flat Xela hand: 240 taxels on fifteen 4×4 pads.
//!
//! Each finger is one long strip wired column-major: the thumb is 12 rows ×
//! 4 columns (three pads), the index, middle and ring fingers 16 × 4 (four
//! pads each). Every pad is square, so all fifteen land in
//! [`Region::Finger`]; the flat hand has no palm or fingertip sensors and
//! its palm and fingertip tensors have zero sensors.

use tracing::debug;
use xela_types::{HandKind, Region, RegionShape, TopologyEntry, XelaError};

use crate::TopologyResolver;
use crate::grid::{ReverseIndex, SensorGrid, SensorShape};

pub const TOTAL_TAXELS: usize = 240;

pub const FINGER_SHAPE: RegionShape = RegionShape::new(15, 16);

/// Pad edge length, in taxels.
const PAD: usize = 4;

/// `(name, first wire index, rows in the strip)` per finger.
const STRIPS: [(&str, usize, usize); 4] = [
    ("thumb", 0, 12),
    ("index", 48, 16),
    ("middle", 112, 16),
    ("ring", 176, 16),
];

/// Cells of pad `pad` of a strip starting at `base` with `rows` rows.
fn pad_cells(base: usize, rows: usize, pad: usize) -> Vec<Vec<Option<usize>>> {
    (0..PAD)
        .map(|r| {
            (0..PAD)
                .map(|c| Some(base + c * rows + pad * PAD + r))
                .collect()
        })
        .collect()
}

/// Validated topology of the flat hand.
#[derive(Debug, Clone)]
pub struct FlatHandTopology {
    sensors: Vec<SensorGrid>,
    index: ReverseIndex,
}

impl FlatHandTopology {
    pub fn new() -> Result<Self, XelaError> {
        let mut sensors = Vec::with_capacity(FINGER_SHAPE.sensors);
        for (finger, base, rows) in STRIPS {
            for pad in 0..rows / PAD {
                let slot = sensors.len();
                sensors.push(SensorGrid::from_cells(
                    format!("{finger}_section{}", pad + 1),
                    slot,
                    (Region::Finger, slot),
                    SensorShape::Square,
                    pad_cells(base, rows, pad),
                ));
            }
        }
        let index = ReverseIndex::build(TOTAL_TAXELS, &sensors, Self::shape_of)?;
        debug!(sensors = sensors.len(), "flat hand topology ready");
        Ok(Self { sensors, index })
    }

    fn shape_of(region: Region) -> RegionShape {
        match region {
            Region::Finger => FINGER_SHAPE,
            Region::Palm => RegionShape::new(0, SensorShape::Palm.taxels()),
            Region::Fingertip => RegionShape::new(0, SensorShape::Tip.taxels()),
        }
    }
}

impl TopologyResolver for FlatHandTopology {
    fn hand(&self) -> HandKind {
        HandKind::Flat
    }

    fn total_taxels(&self) -> usize {
        TOTAL_TAXELS
    }

    fn region_shape(&self, region: Region) -> RegionShape {
        Self::shape_of(region)
    }

    fn sensors(&self) -> &[SensorGrid] {
        &self.sensors
    }

    fn resolve(&self, wire_index: usize) -> Result<TopologyEntry, XelaError> {
        self.index.get(wire_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    /// Column-major strip arithmetic the firmware documents, used as an
    /// independent oracle for the grids.
    fn oracle(wire: usize) -> (usize, usize) {
        let (rows, finger, scaled) = if wire < 48 {
            (12, 0, wire)
        } else {
            (16, (wire - 48) / 64 + 1, (wire - 48) % 64)
        };
        let column = scaled / rows;
        let row = scaled % rows;
        let mut sensor = row / 4;
        if finger > 0 {
            sensor += 3 + (finger - 1) * 4;
        }
        (sensor, (row % 4) * 4 + column)
    }

    #[test]
    fn matches_strip_arithmetic_for_every_wire() {
        let hand = FlatHandTopology::new().unwrap();
        for wire in 0..TOTAL_TAXELS {
            let e = hand.resolve(wire).unwrap();
            assert_eq!(e.region, Region::Finger);
            assert_eq!((e.sensor, e.local_id), oracle(wire), "wire {wire}");
        }
    }

    #[test]
    fn bijection_onto_finger_tensor() {
        let hand = FlatHandTopology::new().unwrap();
        let cells: HashSet<_> = (0..TOTAL_TAXELS)
            .map(|w| {
                let e = hand.resolve(w).unwrap();
                (e.sensor, e.local_id)
            })
            .collect();
        assert_eq!(cells.len(), FINGER_SHAPE.cells());
        assert_eq!(hand.region_shape(Region::Palm).sensors, 0);
        assert_eq!(hand.region_shape(Region::Fingertip).sensors, 0);
    }

    #[test]
    fn pad_names_and_slots() {
        let hand = FlatHandTopology::new().unwrap();
        let names: Vec<&str> = hand.sensors().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names[0], "thumb_section1");
        assert_eq!(names[2], "thumb_section3");
        assert_eq!(names[3], "index_section1");
        assert_eq!(names[14], "ring_section4");
        assert_eq!(hand.sensor_named("middle_section2").unwrap().sensor, 8);
    }

    #[test]
    fn known_cells() {
        let hand = FlatHandTopology::new().unwrap();
        // Second column of the thumb strip starts at wire 12.
        let e = hand.resolve(12).unwrap();
        assert_eq!((e.sensor, e.row, e.col, e.local_id), (0, 0, 1, 1));
        // Wire 48 opens the index strip.
        let e = hand.resolve(48).unwrap();
        assert_eq!((e.sensor, e.local_id), (3, 0));
        assert!(hand.resolve(240).is_err());
    }
}
