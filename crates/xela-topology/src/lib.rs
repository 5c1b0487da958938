//! `xela-topology` – wire-index resolution for Xela tactile hands.
//!
//! The transport delivers one flat vector of readings per tick. Its position
//! (the *wire index*) is the only identifier a reading carries, so every
//! downstream stage depends on this crate folding that index back into a
//! physical place on the hand.
//!
//! # Modules
//!
//! - [`grid`] – [`SensorGrid`][grid::SensorGrid]: one sensor's row-major
//!   table of wire indices, plus the reverse index shared by every hand.
//! - [`curved`] – [`CurvedHandTopology`][curved::CurvedHandTopology]: the
//!   368-taxel hand with curved fingertips and a three-pad palm.
//! - [`flat`] – [`FlatHandTopology`][flat::FlatHandTopology]: the 240-taxel
//!   hand of fifteen flat 4×4 pads.
//!
//! Both hands implement [`TopologyResolver`]; pick one at runtime with
//! [`for_hand`].

pub mod curved;
pub mod flat;
pub mod grid;

pub use curved::CurvedHandTopology;
pub use flat::FlatHandTopology;
pub use grid::{SensorGrid, SensorShape};

use xela_types::{HandKind, Region, RegionShape, TopologyEntry, XelaError};

/// Maps wire indices to physical taxel positions.
///
/// Implementations validate their tables when constructed, so once a value
/// exists `resolve` is total over `0..total_taxels()`.
pub trait TopologyResolver: Send + Sync {
    /// Which hand this topology describes.
    fn hand(&self) -> HandKind;

    /// Length of a flat frame for this hand.
    fn total_taxels(&self) -> usize;

    /// Tensor dimensions of `region`. A region the hand has no sensors in
    /// reports zero sensors.
    fn region_shape(&self, region: Region) -> RegionShape;

    /// Every sensor grid, in raw slot order.
    fn sensors(&self) -> &[SensorGrid];

    /// Resolve `wire_index` to its region, sensor and local taxel id.
    ///
    /// # Errors
    ///
    /// [`XelaError::UnmappedIndex`] if `wire_index >= total_taxels()`.
    fn resolve(&self, wire_index: usize) -> Result<TopologyEntry, XelaError>;

    /// Look a sensor up by its physical name, e.g. `"index_tip"`.
    fn sensor_named(&self, name: &str) -> Option<&SensorGrid> {
        self.sensors().iter().find(|s| s.name == name)
    }
}

/// Build and validate the topology for `hand`.
pub fn for_hand(hand: HandKind) -> Result<Box<dyn TopologyResolver>, XelaError> {
    Ok(match hand {
        HandKind::Curved => Box::new(CurvedHandTopology::new()?),
        HandKind::Flat => Box::new(FlatHandTopology::new()?),
    })
}
