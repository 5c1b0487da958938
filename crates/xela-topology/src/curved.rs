//! The curved Xela hand: 368 taxels.
//!
//! Eighteen sensors in raw slot order: for each of thumb, index, middle and
//! ring a curved tip followed by its square segments (two on the thumb,
//! three on the other fingers), then three palm pads. The wiring is
//! irregular, so every pad is a hand-authored table below, read row-major as
//! the pad sits on the hand.
//!
//! ```rust
//! use xela_topology::{CurvedHandTopology, TopologyResolver};
//! use xela_types::Region;
//!
//! let hand = CurvedHandTopology::new().unwrap();
//! let entry = hand.resolve(0).unwrap();
//! assert_eq!(entry.region, Region::Fingertip);
//! assert_eq!(entry.sensor, 0);
//! ```

use tracing::debug;
use xela_types::{HandKind, Region, RegionShape, TopologyEntry, XelaError};

use crate::TopologyResolver;
use crate::grid::{NO_TAXEL, ReverseIndex, SensorGrid, SensorShape};

const X: i16 = NO_TAXEL;

pub const TOTAL_TAXELS: usize = 368;

pub const PALM_SHAPE: RegionShape = RegionShape::new(3, 24);
pub const FINGERTIP_SHAPE: RegionShape = RegionShape::new(4, 30);
pub const FINGER_SHAPE: RegionShape = RegionShape::new(11, 16);

// ────────────────────────────────────────────────────────────────────────────
// Slot remapping
// ────────────────────────────────────────────────────────────────────────────

/// Raw sensor slot → `(region, dense sensor number within region)`.
///
/// Finger segments are numbered 0..=10 skipping the slots owned by tips
/// (0, 3, 7, 11); tips are 0..=3 and palm pads 0..=2.
pub const SLOT_ASSIGNMENT: [(Region, usize); 18] = [
    (Region::Fingertip, 0), // 0  thumb tip
    (Region::Finger, 0),    // 1  thumb section 1
    (Region::Finger, 1),    // 2  thumb section 2
    (Region::Fingertip, 1), // 3  index tip
    (Region::Finger, 2),    // 4
    (Region::Finger, 3),    // 5
    (Region::Finger, 4),    // 6
    (Region::Fingertip, 2), // 7  middle tip
    (Region::Finger, 5),    // 8
    (Region::Finger, 6),    // 9
    (Region::Finger, 7),    // 10
    (Region::Fingertip, 3), // 11 ring tip
    (Region::Finger, 8),    // 12
    (Region::Finger, 9),    // 13
    (Region::Finger, 10),   // 14
    (Region::Palm, 0),      // 15
    (Region::Palm, 1),      // 16
    (Region::Palm, 2),      // 17
];

/// Look up the region and dense sensor number of a raw slot.
pub fn slot_assignment(slot: usize) -> Option<(Region, usize)> {
    SLOT_ASSIGNMENT.get(slot).copied()
}

// ────────────────────────────────────────────────────────────────────────────
// Wiring tables
// ────────────────────────────────────────────────────────────────────────────

const THUMB_TIP: &[&[i16]] = &[
    &[X, X, 31, 17, X, X],
    &[X, 45, 32, 18, 4, X],
    &[58, 46, 33, 19, 5, 0],
    &[59, 47, 34, 20, 6, 1],
    &[60, 48, 35, 21, 7, 2],
    &[61, 49, 36, 22, 8, 3],
];
const THUMB_SECTION_1: &[&[i16]] = &[
    &[50, 37, 23, 9],
    &[51, 38, 24, 10],
    &[52, 39, 25, 11],
    &[53, 40, 26, 12],
];
const THUMB_SECTION_2: &[&[i16]] = &[
    &[54, 41, 27, 13],
    &[55, 42, 28, 14],
    &[56, 43, 29, 15],
    &[57, 44, 30, 16],
];

const INDEX_TIP: &[&[i16]] = &[
    &[X, X, 101, 83, X, X],
    &[X, 123, 102, 84, 66, X],
    &[144, 124, 103, 85, 67, 62],
    &[145, 125, 104, 86, 68, 63],
    &[146, 126, 105, 87, 69, 64],
    &[147, 127, 106, 88, 70, 65],
];
const INDEX_SECTION_1: &[&[i16]] = &[
    &[128, 107, 89, 71],
    &[129, 108, 90, 72],
    &[130, 109, 91, 73],
    &[131, 110, 92, 74],
];
const INDEX_SECTION_2: &[&[i16]] = &[
    &[132, 111, 93, 75],
    &[133, 112, 94, 76],
    &[134, 113, 95, 77],
    &[135, 114, 96, 78],
];
const INDEX_SECTION_3: &[&[i16]] = &[
    &[136, 115, 97, 79],
    &[137, 116, 98, 80],
    &[138, 117, 99, 81],
    &[139, 118, 100, 82],
];

const MIDDLE_TIP: &[&[i16]] = &[
    &[X, X, 203, 185, X, X],
    &[X, 221, 204, 186, 164, X],
    &[246, 222, 205, 187, 165, 156],
    &[247, 223, 206, 188, 166, 157],
    &[248, 224, 207, 189, 167, 158],
    &[249, 225, 208, 190, 168, 159],
];
const MIDDLE_SECTION_1: &[&[i16]] = &[
    &[226, 209, 191, 169],
    &[227, 210, 192, 170],
    &[228, 211, 193, 171],
    &[229, 212, 194, 172],
];
const MIDDLE_SECTION_2: &[&[i16]] = &[
    &[230, 213, 195, 173],
    &[231, 214, 196, 174],
    &[232, 215, 197, 175],
    &[233, 216, 198, 176],
];
const MIDDLE_SECTION_3: &[&[i16]] = &[
    &[234, 217, 199, 177],
    &[235, 218, 200, 178],
    &[236, 219, 201, 179],
    &[237, 220, 202, 180],
];

const RING_TIP: &[&[i16]] = &[
    &[X, X, 329, 303, X, X],
    &[X, 347, 330, 304, 278, X],
    &[364, 348, 331, 305, 279, 266],
    &[365, 349, 332, 306, 280, 267],
    &[366, 350, 333, 307, 281, 268],
    &[367, 351, 334, 308, 282, 269],
];
const RING_SECTION_1: &[&[i16]] = &[
    &[352, 335, 309, 283],
    &[353, 336, 310, 284],
    &[354, 337, 311, 285],
    &[355, 338, 312, 286],
];
const RING_SECTION_2: &[&[i16]] = &[
    &[356, 339, 313, 287],
    &[357, 340, 314, 288],
    &[358, 341, 315, 289],
    &[359, 342, 316, 290],
];
const RING_SECTION_3: &[&[i16]] = &[
    &[360, 343, 317, 291],
    &[361, 344, 318, 292],
    &[362, 345, 319, 293],
    &[363, 346, 320, 294],
];

const PALM_1: &[&[i16]] = &[
    &[119, 140, 148, 152, 160, 181],
    &[120, 141, 149, 153, 161, 182],
    &[121, 142, 150, 154, 162, 183],
    &[122, 143, 151, 155, 163, 184],
];
const PALM_2: &[&[i16]] = &[
    &[238, 250, 258, 270, 295, 321],
    &[239, 251, 259, 271, 296, 322],
    &[240, 252, 260, 272, 297, 323],
    &[241, 253, 261, 273, 298, 324],
];
const PALM_3: &[&[i16]] = &[
    &[242, 254, 262, 274, 299, 325],
    &[243, 255, 263, 275, 300, 326],
    &[244, 256, 264, 276, 301, 327],
    &[245, 257, 265, 277, 302, 328],
];

/// `(name, outline, table)` in raw slot order.
const TABLES: [(&str, SensorShape, &[&[i16]]); 18] = [
    ("thumb_tip", SensorShape::Tip, THUMB_TIP),
    ("thumb_section1", SensorShape::Square, THUMB_SECTION_1),
    ("thumb_section2", SensorShape::Square, THUMB_SECTION_2),
    ("index_tip", SensorShape::Tip, INDEX_TIP),
    ("index_section1", SensorShape::Square, INDEX_SECTION_1),
    ("index_section2", SensorShape::Square, INDEX_SECTION_2),
    ("index_section3", SensorShape::Square, INDEX_SECTION_3),
    ("middle_tip", SensorShape::Tip, MIDDLE_TIP),
    ("middle_section1", SensorShape::Square, MIDDLE_SECTION_1),
    ("middle_section2", SensorShape::Square, MIDDLE_SECTION_2),
    ("middle_section3", SensorShape::Square, MIDDLE_SECTION_3),
    ("ring_tip", SensorShape::Tip, RING_TIP),
    ("ring_section1", SensorShape::Square, RING_SECTION_1),
    ("ring_section2", SensorShape::Square, RING_SECTION_2),
    ("ring_section3", SensorShape::Square, RING_SECTION_3),
    ("palm_1", SensorShape::Palm, PALM_1),
    ("palm_2", SensorShape::Palm, PALM_2),
    ("palm_3", SensorShape::Palm, PALM_3),
];

// ────────────────────────────────────────────────────────────────────────────
// CurvedHandTopology
// ────────────────────────────────────────────────────────────────────────────

/// Validated topology of the curved hand.
#[derive(Debug, Clone)]
pub struct CurvedHandTopology {
    sensors: Vec<SensorGrid>,
    index: ReverseIndex,
}

impl CurvedHandTopology {
    /// Build the grids and the reverse wire index.
    ///
    /// # Errors
    ///
    /// Any table inconsistency ([`XelaError::UnmappedIndex`],
    /// [`XelaError::DuplicateIndex`], [`XelaError::InvalidLocalId`]). The
    /// tables are static, so an error here is a wiring bug.
    pub fn new() -> Result<Self, XelaError> {
        let sensors = TABLES
            .iter()
            .zip(SLOT_ASSIGNMENT)
            .enumerate()
            .map(|(slot, (&(name, shape, table), assignment))| {
                SensorGrid::from_table(name, slot, assignment, shape, table)
            })
            .collect::<Vec<_>>();
        let index = ReverseIndex::build(TOTAL_TAXELS, &sensors, Self::shape_of)?;
        debug!(sensors = sensors.len(), "curved hand topology ready");
        Ok(Self { sensors, index })
    }

    fn shape_of(region: Region) -> RegionShape {
        match region {
            Region::Palm => PALM_SHAPE,
            Region::Fingertip => FINGERTIP_SHAPE,
            Region::Finger => FINGER_SHAPE,
        }
    }
}

impl TopologyResolver for CurvedHandTopology {
    fn hand(&self) -> HandKind {
        HandKind::Curved
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

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
