//! Sensor grids and the wire-index reverse map.
//!
//! A [`SensorGrid`] is the physical table of one sensor: rows and columns as
//! they sit on the hand, each cell holding the wire index wired to it or
//! nothing. Folding a `(row, col)` into a compact local taxel id is a
//! per-[`SensorShape`] affine correction, so tip sensors whose first rows are
//! narrower still number their taxels densely from zero.

use std::collections::HashSet;

use tracing::debug;
use xela_types::{Region, RegionShape, TopologyEntry, XelaError};

/// Sentinel for a table cell with no taxel behind it.
pub const NO_TAXEL: i16 = -1;

// ────────────────────────────────────────────────────────────────────────────
// SensorShape
// ────────────────────────────────────────────────────────────────────────────

/// Physical outline of a sensor pad.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SensorShape {
    /// 6×6 curved fingertip; row 0 holds 2 taxels, row 1 holds 4, the rest 6.
    Tip,
    /// 4×4 finger segment.
    Square,
    /// 4×6 palm pad.
    Palm,
}

impl SensorShape {
    /// Correction added to `row * cols + col` for each tip row. Row 0 starts
    /// at column 2 and row 1 skips the four absent cells before it.
    const TIP_ROW_OFFSETS: [i64; 6] = [-2, -5, -6, -6, -6, -6];

    pub const fn rows(self) -> usize {
        match self {
            SensorShape::Tip => 6,
            SensorShape::Square | SensorShape::Palm => 4,
        }
    }

    pub const fn cols(self) -> usize {
        match self {
            SensorShape::Tip | SensorShape::Palm => 6,
            SensorShape::Square => 4,
        }
    }

    /// Number of real taxels on the pad.
    pub const fn taxels(self) -> usize {
        match self {
            SensorShape::Tip => 30,
            SensorShape::Square => 16,
            SensorShape::Palm => 24,
        }
    }

    /// The region every sensor of this outline belongs to.
    pub const fn region(self) -> Region {
        match self {
            SensorShape::Tip => Region::Fingertip,
            SensorShape::Square => Region::Finger,
            SensorShape::Palm => Region::Palm,
        }
    }

    pub fn row_offset(self, row: usize) -> i64 {
        match self {
            SensorShape::Tip => Self::TIP_ROW_OFFSETS.get(row).copied().unwrap_or(-6),
            SensorShape::Square | SensorShape::Palm => 0,
        }
    }

    /// Fold a physical cell into its local taxel id. May be negative or out
    /// of range for a cell the outline does not have.
    pub fn fold(self, row: usize, col: usize) -> i64 {
        (row * self.cols() + col) as i64 + self.row_offset(row)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// SensorGrid
// ────────────────────────────────────────────────────────────────────────────

/// One sensor's table of wire indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SensorGrid {
    /// Physical name, e.g. `"thumb_tip"` or `"palm_2"`.
    pub name: String,
    /// Raw sensor slot the device firmware numbers this pad with.
    pub slot: usize,
    pub region: Region,
    /// Sensor number, dense within `region`.
    pub sensor: usize,
    pub shape: SensorShape,
    cells: Vec<Vec<Option<usize>>>,
}

impl SensorGrid {
    /// Build a grid from a hand-authored table using [`NO_TAXEL`] for absent
    /// cells.
    pub fn from_table(
        name: impl Into<String>,
        slot: usize,
        (region, sensor): (Region, usize),
        shape: SensorShape,
        table: &[&[i16]],
    ) -> Self {
        let cells = table
            .iter()
            .map(|row| {
                row.iter()
                    .map(|&w| usize::try_from(w).ok())
                    .collect()
            })
            .collect();
        Self::from_cells(name, slot, (region, sensor), shape, cells)
    }

    pub fn from_cells(
        name: impl Into<String>,
        slot: usize,
        (region, sensor): (Region, usize),
        shape: SensorShape,
        cells: Vec<Vec<Option<usize>>>,
    ) -> Self {
        Self {
            name: name.into(),
            slot,
            region,
            sensor,
            shape,
            cells,
        }
    }

    pub fn wire_at(&self, row: usize, col: usize) -> Option<usize> {
        self.cells.get(row)?.get(col).copied().flatten()
    }

    /// `(row, col, wire)` of every real cell, row-major.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize, usize)> + '_ {
        self.cells.iter().enumerate().flat_map(|(r, row)| {
            row.iter()
                .enumerate()
                .filter_map(move |(c, w)| w.map(|w| (r, c, w)))
        })
    }

    /// Resolve every real cell to a [`TopologyEntry`].
    ///
    /// # Errors
    ///
    /// [`XelaError::InvalidLocalId`] if a cell folds outside
    /// `0..shape.taxels()` or two cells fold to the same id.
    pub fn entries(&self) -> Result<Vec<(usize, TopologyEntry)>, XelaError> {
        let mut taken = vec![false; self.shape.taxels()];
        let mut out = Vec::with_capacity(self.shape.taxels());
        for (row, col, wire) in self.cells() {
            let folded = self.shape.fold(row, col);
            let local_id = usize::try_from(folded)
                .ok()
                .filter(|&id| id < taken.len() && !taken[id])
                .ok_or_else(|| XelaError::InvalidLocalId {
                    sensor: self.name.clone(),
                    local_id: folded,
                })?;
            taken[local_id] = true;
            out.push((
                wire,
                TopologyEntry {
                    region: self.region,
                    sensor: self.sensor,
                    row,
                    col,
                    local_id,
                },
            ));
        }
        Ok(out)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// ReverseIndex
// ────────────────────────────────────────────────────────────────────────────

/// Wire index → [`TopologyEntry`], built once and validated as a bijection
/// onto the region tensors.
#[derive(Debug, Clone)]
pub(crate) struct ReverseIndex {
    entries: Vec<TopologyEntry>,
}

impl ReverseIndex {
    /// Index `grids` for a frame of `total` readings.
    ///
    /// Fails on a wire index claimed twice, a wire index claimed by nobody,
    /// a cell outside its region tensor, or region tensors whose cell count
    /// differs from `total`.
    pub(crate) fn build(
        total: usize,
        grids: &[SensorGrid],
        shape_of: impl Fn(Region) -> RegionShape,
    ) -> Result<Self, XelaError> {
        let mut by_wire: Vec<Option<(TopologyEntry, &str)>> = vec![None; total];
        let mut seen: HashSet<(Region, usize, usize)> = HashSet::with_capacity(total);

        for grid in grids {
            for (wire, entry) in grid.entries()? {
                let shape = shape_of(entry.region);
                let fits = entry.sensor < shape.sensors && entry.local_id < shape.taxels;
                if !fits || !seen.insert((entry.region, entry.sensor, entry.local_id)) {
                    return Err(XelaError::InvalidLocalId {
                        sensor: grid.name.clone(),
                        local_id: entry.local_id as i64,
                    });
                }
                let slot = by_wire.get_mut(wire).ok_or(XelaError::ShapeMismatch {
                    expected: total,
                    actual: wire + 1,
                })?;
                if let Some((_, first)) = slot {
                    return Err(XelaError::DuplicateIndex {
                        index: wire,
                        first: first.to_string(),
                        second: grid.name.clone(),
                    });
                }
                *slot = Some((entry, grid.name.as_str()));
            }
        }

        let entries = by_wire
            .into_iter()
            .enumerate()
            .map(|(index, e)| e.map(|(entry, _)| entry).ok_or(XelaError::UnmappedIndex { index }))
            .collect::<Result<Vec<_>, _>>()?;

        let capacity: usize = Region::ALL.iter().map(|&r| shape_of(r).cells()).sum();
        if capacity != total {
            return Err(XelaError::ShapeMismatch {
                expected: capacity,
                actual: total,
            });
        }

        debug!(total, sensors = grids.len(), "reverse wire index built");
        Ok(Self { entries })
    }

    pub(crate) fn get(&self, wire_index: usize) -> Result<TopologyEntry, XelaError> {
        self.entries
            .get(wire_index)
            .copied()
            .ok_or(XelaError::UnmappedIndex { index: wire_index })
    }
}
