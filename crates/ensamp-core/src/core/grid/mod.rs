//! # Collective-Variable Grid Module
//!
//! This module implements the N-dimensional grid engine that sampling methods use
//! to accumulate, interpolate, and query fields over a continuous
//! collective-variable space.
//!
//! ## Overview
//!
//! A [`Grid`] is a fixed-shape, flat array of per-node records addressed by
//! integer coordinate tuples. Each node carries a primary scalar value plus a
//! fixed-length vector of auxiliary ("extra") scalars, so a single grid can hold
//! e.g. a free-energy estimate alongside its per-axis gradient components. Axes
//! may be periodic (queries wrap) or bounded (queries clamp), and continuous
//! values are resolved to nodes by nearest-node rounding or by multilinear
//! interpolation over the enclosing voxel.
//!
//! ## Key Components
//!
//! - [`Grid`] - The grid itself: shape, flat node storage, lookup and mutation
//! - [`build`] - The configuration document and factory that constructs grids
//! - [`GridError`] - Fatal access errors (range, dimension, extra-size)
//!
//! The grid shape (dimension count, bounds, periodicity, point counts, spacing)
//! is fixed at construction time; only node payloads are mutable. Grids are
//! owned by a single sampling method and are never shared mutably.

pub mod build;
mod interpolate;

pub use build::{BuildError, GridConfig, GridKind};

use std::io::{self, Write};
use thiserror::Error;

/// Errors raised by direct grid access.
///
/// All of these are fatal: an out-of-range direct index or a mis-sized extra
/// vector indicates a logic error in the calling sampling method, and silently
/// correcting it would corrupt accumulated statistics.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GridError {
    /// A coordinate in an index tuple is outside `[0, points)` for its axis.
    #[error("grid index {index} out of range on axis {axis} ({points} points)")]
    IndexOutOfRange {
        axis: usize,
        index: usize,
        points: usize,
    },

    /// An index or value tuple does not match the grid dimension.
    #[error("expected {expected} coordinates, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// An axis argument is not a valid dimension of this grid.
    #[error("axis {axis} out of range for {ndim}-dimensional grid")]
    AxisOutOfRange { axis: usize, ndim: usize },

    /// A written extra vector disagrees with the configured extra length.
    #[error("extra field expects {expected} components, got {actual}")]
    ExtraSizeMismatch { expected: usize, actual: usize },
}

/// An N-dimensional field over collective-variable space.
///
/// Nodes are stored in row-major order in a single flat vector: the coordinate
/// tuple `(c_0, …, c_{N-1})` maps to offset `Σ c_i · Π_{j>i} points_j`. Every
/// node holds one primary value and `extra_len` auxiliary scalars. Node
/// locations are derived from the axis geometry rather than stored.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    lower: Vec<f64>,
    upper: Vec<f64>,
    periodic: Vec<bool>,
    num_points: Vec<usize>,
    spacing: Vec<f64>,
    /// Fractional node position within a cell: 0.0 for node-centered grids,
    /// 0.5 for bin-centered (histogram) grids.
    node_offset: f64,
    extra_len: usize,
    values: Vec<f64>,
    extras: Vec<f64>,
}

impl Grid {
    pub(crate) fn from_parts(
        lower: Vec<f64>,
        upper: Vec<f64>,
        periodic: Vec<bool>,
        num_points: Vec<usize>,
        spacing: Vec<f64>,
        node_offset: f64,
        extra_len: usize,
    ) -> Self {
        let len: usize = num_points.iter().product();
        Self {
            lower,
            upper,
            periodic,
            num_points,
            spacing,
            node_offset,
            extra_len,
            values: vec![0.0; len],
            extras: vec![0.0; len * extra_len],
        }
    }

    /// Returns the number of grid dimensions.
    pub fn ndim(&self) -> usize {
        self.num_points.len()
    }

    /// Returns the total number of nodes in flat storage.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if the grid has no nodes.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns the lower edge of each axis.
    pub fn lower(&self) -> &[f64] {
        &self.lower
    }

    /// Returns the upper edge of each axis.
    pub fn upper(&self) -> &[f64] {
        &self.upper
    }

    /// Returns the periodicity flag of each axis.
    pub fn periodic(&self) -> &[bool] {
        &self.periodic
    }

    /// Returns the number of nodes along each axis.
    pub fn num_points(&self) -> &[usize] {
        &self.num_points
    }

    /// Returns the node spacing along each axis.
    pub fn spacing(&self) -> &[f64] {
        &self.spacing
    }

    /// Returns the configured number of auxiliary components per node.
    pub fn extra_len(&self) -> usize {
        self.extra_len
    }

    /// Computes the flat storage offset of an index tuple.
    ///
    /// # Arguments
    ///
    /// * `indices` - One coordinate per axis, each in `[0, points)`.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::DimensionMismatch`] if the tuple length differs from
    /// the grid dimension, and [`GridError::IndexOutOfRange`] if any coordinate
    /// exceeds its axis. Direct index access never clamps.
    pub fn flatten(&self, indices: &[usize]) -> Result<usize, GridError> {
        if indices.len() != self.ndim() {
            return Err(GridError::DimensionMismatch {
                expected: self.ndim(),
                actual: indices.len(),
            });
        }

        let mut offset = 0;
        for (axis, (&index, &points)) in indices.iter().zip(&self.num_points).enumerate() {
            if index >= points {
                return Err(GridError::IndexOutOfRange {
                    axis,
                    index,
                    points,
                });
            }
            offset = offset * points + index;
        }
        Ok(offset)
    }

    /// Recovers the index tuple of a flat storage offset.
    ///
    /// Inverse of [`Grid::flatten`] for every valid offset.
    pub fn unflatten(&self, mut offset: usize) -> Vec<usize> {
        let mut indices = vec![0; self.ndim()];
        for (index, &points) in indices.iter_mut().zip(&self.num_points).rev() {
            *index = offset % points;
            offset /= points;
        }
        indices
    }

    /// Returns the index tuple of the node nearest to a continuous value.
    ///
    /// Each axis resolves the raw offset `(value - lower) / spacing` as
    /// `floor(x + 0.5)` at or above the lower edge and `floor(x - 0.5)` below
    /// it. The split at the edge is asymmetric: offsets below the lower edge
    /// land one node lower than plain nearest-integer rounding would place
    /// them. Periodic axes then wrap the raw index into `[0, points)` via
    /// Euclidean modulo; bounded axes clamp to the boundary node, so an
    /// off-grid query degrades to boundary lookup instead of failing.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::DimensionMismatch`] if `value` does not have one
    /// component per axis. Out-of-range values themselves never error.
    pub fn indices_for(&self, value: &[f64]) -> Result<Vec<usize>, GridError> {
        if value.len() != self.ndim() {
            return Err(GridError::DimensionMismatch {
                expected: self.ndim(),
                actual: value.len(),
            });
        }

        Ok(value
            .iter()
            .enumerate()
            .map(|(axis, &v)| self.axis_index(axis, v))
            .collect())
    }

    /// Nearest node on one axis, wrapped or clamped into range.
    fn axis_index(&self, axis: usize, value: f64) -> usize {
        let t = (value - self.lower[axis]) / self.spacing[axis] - self.node_offset;
        let raw = if t < 0.0 {
            (t - 0.5).floor()
        } else {
            (t + 0.5).floor()
        } as i64;

        let points = self.num_points[axis] as i64;
        if self.periodic[axis] {
            raw.rem_euclid(points) as usize
        } else {
            raw.clamp(0, points - 1) as usize
        }
    }

    /// Returns the physical location of a node.
    ///
    /// # Errors
    ///
    /// Propagates the range and dimension errors of [`Grid::flatten`].
    pub fn location_at(&self, indices: &[usize]) -> Result<Vec<f64>, GridError> {
        self.flatten(indices)?;
        Ok(indices
            .iter()
            .enumerate()
            .map(|(axis, &index)| self.axis_location(axis, index))
            .collect())
    }

    fn axis_location(&self, axis: usize, index: usize) -> f64 {
        self.lower[axis] + (index as f64 + self.node_offset) * self.spacing[axis]
    }

    fn location_of(&self, offset: usize) -> Vec<f64> {
        self.unflatten(offset)
            .iter()
            .enumerate()
            .map(|(axis, &index)| self.axis_location(axis, index))
            .collect()
    }

    /// Returns the primary value stored at a node.
    ///
    /// # Errors
    ///
    /// Propagates the range and dimension errors of [`Grid::flatten`].
    pub fn value_at(&self, indices: &[usize]) -> Result<f64, GridError> {
        Ok(self.values[self.flatten(indices)?])
    }

    /// Overwrites the primary value stored at a node.
    ///
    /// # Errors
    ///
    /// Propagates the range and dimension errors of [`Grid::flatten`].
    pub fn set_value(&mut self, indices: &[usize], value: f64) -> Result<(), GridError> {
        let offset = self.flatten(indices)?;
        self.values[offset] = value;
        Ok(())
    }

    /// Returns the auxiliary components stored at a node.
    ///
    /// # Errors
    ///
    /// Propagates the range and dimension errors of [`Grid::flatten`].
    pub fn extra_at(&self, indices: &[usize]) -> Result<&[f64], GridError> {
        let offset = self.flatten(indices)?;
        Ok(&self.extras[offset * self.extra_len..(offset + 1) * self.extra_len])
    }

    /// Overwrites the auxiliary components stored at a node.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::ExtraSizeMismatch`] if `extra` does not have exactly
    /// [`Grid::extra_len`] components; otherwise propagates the errors of
    /// [`Grid::flatten`]. A mismatched write is rejected as a whole.
    pub fn set_extra(&mut self, indices: &[usize], extra: &[f64]) -> Result<(), GridError> {
        if extra.len() != self.extra_len {
            return Err(GridError::ExtraSizeMismatch {
                expected: self.extra_len,
                actual: extra.len(),
            });
        }
        let offset = self.flatten(indices)?;
        self.extras[offset * self.extra_len..(offset + 1) * self.extra_len]
            .copy_from_slice(extra);
        Ok(())
    }

    /// Returns a lazy iterator over every node in flat storage order.
    ///
    /// The iterator is cheap to clone and can be recreated at any time, so a
    /// consumer can restart a traversal without touching the grid itself.
    pub fn nodes(&self) -> Nodes<'_> {
        Nodes {
            grid: self,
            offset: 0,
        }
    }

    /// Writes a textual dump of the full grid, one node per line.
    ///
    /// Each line carries the primary value, the auxiliary components, and the
    /// physical location, space-separated, in flat storage order. The format is
    /// meant for inspection and plotting, not for versioned interchange.
    ///
    /// # Errors
    ///
    /// Returns any I/O error raised by the writer.
    pub fn write_dump<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        for node in self.nodes() {
            write!(writer, "{}", node.value)?;
            for component in node.extra {
                write!(writer, " {component}")?;
            }
            for coordinate in &node.location {
                write!(writer, " {coordinate}")?;
            }
            writeln!(writer)?;
        }
        Ok(())
    }
}

/// One node yielded by [`Grid::nodes`]: payload plus derived position.
#[derive(Debug, Clone, PartialEq)]
pub struct GridPoint<'a> {
    /// Index tuple of the node.
    pub indices: Vec<usize>,
    /// Physical location of the node in collective-variable space.
    pub location: Vec<f64>,
    /// Primary value stored at the node.
    pub value: f64,
    /// Auxiliary components stored at the node.
    pub extra: &'a [f64],
}

/// Lazy traversal over all grid nodes in flat storage order.
#[derive(Debug, Clone)]
pub struct Nodes<'a> {
    grid: &'a Grid,
    offset: usize,
}

impl<'a> Iterator for Nodes<'a> {
    type Item = GridPoint<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.offset >= self.grid.len() {
            return None;
        }

        let offset = self.offset;
        self.offset += 1;

        let extra_len = self.grid.extra_len;
        Some(GridPoint {
            indices: self.grid.unflatten(offset),
            location: self.grid.location_of(offset),
            value: self.grid.values[offset],
            extra: &self.grid.extras[offset * extra_len..(offset + 1) * extra_len],
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.grid.len() - self.offset;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Nodes<'_> {}
