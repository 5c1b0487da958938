//! Flat frame → region tensors.
//!
//! [`FrameConverter`] resolves every wire index once, when it is built, and
//! then scatters each incoming [`FlatFrame`] into one [`RegionTensor`] per
//! [`Region`]. Because the topology is a validated bijection, every tensor
//! cell is written exactly once per frame.
//!
//! ```rust
//! use xela_pipeline::convert::FrameConverter;
//! use xela_topology::CurvedHandTopology;
//! use xela_types::FlatFrame;
//!
//! let hand = CurvedHandTopology::new().unwrap();
//! let converter = FrameConverter::new(&hand).unwrap();
//! let tensors = converter.convert(&FlatFrame::zeros(368)).unwrap();
//! assert_eq!(tensors.fingertip.shape().sensors, 4);
//! ```

use xela_topology::TopologyResolver;
use xela_types::{FlatFrame, Region, RegionShape, RegionTensor, TopologyEntry, XelaError};

/// The three region tensors of one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionTensors {
    pub palm: RegionTensor,
    pub fingertip: RegionTensor,
    pub finger: RegionTensor,
}

impl RegionTensors {
    pub fn region(&self, region: Region) -> &RegionTensor {
        match region {
            Region::Palm => &self.palm,
            Region::Fingertip => &self.fingertip,
            Region::Finger => &self.finger,
        }
    }

    fn region_mut(&mut self, region: Region) -> &mut RegionTensor {
        match region {
            Region::Palm => &mut self.palm,
            Region::Fingertip => &mut self.fingertip,
            Region::Finger => &mut self.finger,
        }
    }
}

/// Scatters flat frames into region tensors using a pre-resolved wire map.
#[derive(Debug, Clone)]
pub struct FrameConverter {
    entries: Vec<TopologyEntry>,
    palm: RegionShape,
    fingertip: RegionShape,
    finger: RegionShape,
}

impl FrameConverter {
    /// Resolve every wire index of `topology` up front.
    ///
    /// # Errors
    ///
    /// [`XelaError::UnmappedIndex`] if any index in `0..total_taxels()`
    /// does not resolve.
    pub fn new(topology: &dyn TopologyResolver) -> Result<Self, XelaError> {
        let entries = (0..topology.total_taxels())
            .map(|wire| topology.resolve(wire))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            entries,
            palm: topology.region_shape(Region::Palm),
            fingertip: topology.region_shape(Region::Fingertip),
            finger: topology.region_shape(Region::Finger),
        })
    }

    /// Frame length this converter accepts.
    pub fn total_taxels(&self) -> usize {
        self.entries.len()
    }

    pub fn region_shape(&self, region: Region) -> RegionShape {
        match region {
            Region::Palm => self.palm,
            Region::Fingertip => self.fingertip,
            Region::Finger => self.finger,
        }
    }

    /// Split `frame` into palm, fingertip and finger tensors.
    ///
    /// # Errors
    ///
    /// [`XelaError::ShapeMismatch`] if the frame length differs from the
    /// topology's taxel count. Frames are never truncated or padded.
    pub fn convert(&self, frame: &FlatFrame) -> Result<RegionTensors, XelaError> {
        frame.check_len(self.entries.len())?;
        let mut out = RegionTensors {
            palm: RegionTensor::zeros(Region::Palm, self.palm),
            fingertip: RegionTensor::zeros(Region::Fingertip, self.fingertip),
            finger: RegionTensor::zeros(Region::Finger, self.finger),
        };
        for (entry, &reading) in self.entries.iter().zip(frame.readings()) {
            out.region_mut(entry.region)
                .set(entry.sensor, entry.local_id, reading)?;
        }
        Ok(out)
    }
}
