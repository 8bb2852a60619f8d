use crate::types::{Features, Vec3};
use rayon::prelude::*;
use snafu::prelude::*;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
#[non_exhaustive]
pub enum FrameError {
    #[snafu(display("frame size must be positive"))]
    ZeroFrameSize,

    #[snafu(display("frame size ({width}x{height}) doesn't match the sample count ({len})"))]
    SampleCountMismatch { width: u16, height: u16, len: usize },

    #[snafu(display("sample index {index} is out of bounds for a frame of {len} samples"))]
    IndexOutOfBounds { index: usize, len: usize },
}

/// One grid-indexed point record as handed in by the acquisition side.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Sample {
    pub position: Vec3,
    /// 0..=255 per channel
    pub color: Vec3,
    /// Unit vector, or zero when no orientation could be estimated
    pub normal: Vec3,
    pub valid: bool,
}

/// Fixed-capacity frame buffer, one entry per pixel, stored as parallel arrays.
///
/// The length is fixed at construction. The acquisition side overwrites the
/// contents in place every frame through the `*_mut` accessors or [`FrameSoA::set`];
/// the clustering core only ever reads it.
#[derive(Debug, Clone)]
pub struct FrameSoA {
    width: u16,
    height: u16,
    positions: Vec<Vec3>,
    colors: Vec<Vec3>,
    normals: Vec<Vec3>,
    valid: Vec<bool>,
}

impl FrameSoA {
    /// A frame of `width * height` zeroed, invalid samples.
    pub fn new(width: u16, height: u16) -> Result<Self, FrameError> {
        ensure!(width > 0 && height > 0, ZeroFrameSizeSnafu);

        let n = width as usize * height as usize;
        Ok(Self {
            width,
            height,
            positions: vec![Vec3::ZERO; n],
            colors: vec![Vec3::ZERO; n],
            normals: vec![Vec3::ZERO; n],
            valid: vec![false; n],
        })
    }

    pub fn from_samples(width: u16, height: u16, samples: &[Sample]) -> Result<Self, FrameError> {
        let mut frame = Self::new(width, height)?;
        ensure!(
            samples.len() == frame.len(),
            SampleCountMismatchSnafu {
                width,
                height,
                len: samples.len()
            }
        );

        for (i, sample) in samples.iter().enumerate() {
            frame.write(i, sample);
        }

        Ok(frame)
    }

    pub fn set(&mut self, index: usize, sample: Sample) -> Result<(), FrameError> {
        ensure!(
            index < self.len(),
            IndexOutOfBoundsSnafu {
                index,
                len: self.len()
            }
        );
        self.write(index, &sample);
        Ok(())
    }

    #[inline(always)]
    fn write(&mut self, i: usize, sample: &Sample) {
        self.positions[i] = sample.position;
        self.colors[i] = sample.color;
        self.normals[i] = sample.normal;
        self.valid[i] = sample.valid;
    }

    pub fn sample(&self, index: usize) -> Option<Sample> {
        (index < self.len()).then(|| Sample {
            position: self.positions[index],
            color: self.colors[index],
            normal: self.normals[index],
            valid: self.valid[index],
        })
    }

    /// Panics when `index` is out of bounds.
    #[inline(always)]
    pub fn features(&self, index: usize) -> Features {
        Features {
            position: self.positions[index],
            color: self.colors[index],
            normal: self.normals[index],
        }
    }

    #[inline]
    pub fn width(&self) -> u16 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u16 {
        self.height
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Always false: a frame has at least one sample.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    #[inline]
    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    #[inline]
    pub fn colors(&self) -> &[Vec3] {
        &self.colors
    }

    #[inline]
    pub fn normals(&self) -> &[Vec3] {
        &self.normals
    }

    #[inline]
    pub fn valid(&self) -> &[bool] {
        &self.valid
    }

    pub fn positions_mut(&mut self) -> &mut [Vec3] {
        &mut self.positions
    }

    pub fn colors_mut(&mut self) -> &mut [Vec3] {
        &mut self.colors
    }

    pub fn normals_mut(&mut self) -> &mut [Vec3] {
        &mut self.normals
    }

    pub fn valid_mut(&mut self) -> &mut [bool] {
        &mut self.valid
    }

    pub fn valid_count(&self) -> usize {
        self.valid.par_iter().filter(|&&v| v).count()
    }
}

/// A single-row frame of valid samples with zero color and normal.
#[cfg(test)]
pub(crate) fn from_positions(positions: &[Vec3]) -> FrameSoA {
    let width = u16::try_from(positions.len()).expect("test frame too wide");
    let mut frame = FrameSoA::new(width, 1).unwrap();
    frame.positions_mut().copy_from_slice(positions);
    frame.valid_mut().fill(true);
    frame
}
