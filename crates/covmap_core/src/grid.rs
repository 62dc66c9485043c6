//! The two-dimensional descriptor grid swept by the mapper.

use serde::{Deserialize, Serialize};

use crate::error::MapperError;
use crate::point::DescriptorPoint;

/// Number of samples along each descriptor axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Resolution {
    Uniform(usize),
    PerAxis([usize; 2]),
}

impl Resolution {
    pub fn counts(&self) -> [usize; 2] {
        match *self {
            Resolution::Uniform(n) => [n, n],
            Resolution::PerAxis(counts) => counts,
        }
    }

    fn validate(&self) -> Result<(), MapperError> {
        let counts = self.counts();
        if counts.contains(&0) {
            return Err(MapperError::InvalidResolution(counts.to_vec()));
        }
        Ok(())
    }
}

impl TryFrom<&[usize]> for Resolution {
    type Error = MapperError;

    fn try_from(values: &[usize]) -> Result<Self, Self::Error> {
        let resolution = match *values {
            [n] => Resolution::Uniform(n),
            [nx, ny] => Resolution::PerAxis([nx, ny]),
            _ => return Err(MapperError::InvalidResolution(values.to_vec())),
        };
        resolution.validate()?;
        Ok(resolution)
    }
}

/// Grid of descriptor points, indexed `(i, j)` along the first and second axis.
///
/// Both axes run from the maximum of their range down to the minimum.
#[derive(Debug, Clone, PartialEq)]
pub struct DescriptorGrid {
    axes: [Vec<f64>; 2],
}

impl DescriptorGrid {
    pub fn new(ranges: &[(f64, f64)], resolution: Resolution) -> Result<Self, MapperError> {
        let [range_x, range_y] = match ranges {
            [x, y] => [*x, *y],
            _ => {
                return Err(MapperError::InvalidDescriptorRanges {
                    reason: format!("expected 2 descriptor ranges, got {}", ranges.len()),
                })
            }
        };
        for (min, max) in [range_x, range_y] {
            if !min.is_finite() || !max.is_finite() {
                return Err(MapperError::InvalidDescriptorRanges {
                    reason: format!("range ({min}, {max}) is not finite"),
                });
            }
        }
        resolution.validate()?;

        let [nx, ny] = resolution.counts();
        Ok(Self {
            axes: [reversed_linspace(range_x, nx), reversed_linspace(range_y, ny)],
        })
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.axes[0].len(), self.axes[1].len())
    }

    pub fn len(&self) -> usize {
        self.axes[0].len() * self.axes[1].len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn axis(&self, index: usize) -> &[f64] {
        &self.axes[index]
    }

    pub fn point(&self, i: usize, j: usize) -> DescriptorPoint {
        DescriptorPoint::new(vec![self.axes[0][i], self.axes[1][j]])
    }

    /// Index of the cell whose rounded coordinates equal the rounded `point`.
    pub fn locate(&self, point: &DescriptorPoint, precision: u32) -> Option<(usize, usize)> {
        let [x, y] = point.components() else {
            return None;
        };
        let i = position_at_precision(&self.axes[0], *x, precision)?;
        let j = position_at_precision(&self.axes[1], *y, precision)?;
        Some((i, j))
    }

    /// Neighbor of `(i, j)` offset by `(di, dj)`, if it lies inside the grid.
    pub fn offset(&self, (i, j): (usize, usize), (di, dj): (isize, isize)) -> Option<(usize, usize)> {
        let (m, n) = self.shape();
        let si = i.checked_add_signed(di).filter(|&si| si < m)?;
        let sj = j.checked_add_signed(dj).filter(|&sj| sj < n)?;
        Some((si, sj))
    }
}

fn reversed_linspace((min, max): (f64, f64), count: usize) -> Vec<f64> {
    if count == 1 {
        return vec![min];
    }
    let step = (max - min) / (count - 1) as f64;
    (0..count).rev().map(|k| min + step * k as f64).collect()
}

fn position_at_precision(axis: &[f64], value: f64, precision: u32) -> Option<usize> {
    let key = DescriptorPoint::new(vec![value]).rounded_key(precision);
    axis.iter()
        .position(|&v| DescriptorPoint::new(vec![v]).rounded_key(precision) == key)
}
