//! Multilinear interpolation over the voxel enclosing a continuous value.
//!
//! Queries on or beyond the outer boundary of a bounded axis reuse the
//! boundary cell, so they extrapolate linearly instead of failing; on a
//! constant field that collapses to the boundary value.

use super::{Grid, GridError};

/// One axis of the enclosing cell: the two bracketing node indices and the
/// fractional position between them. `frac` leaves `[0, 1]` when the query
/// point lies outside the boundary cell of a bounded axis.
#[derive(Debug, Clone, Copy)]
struct CellAxis {
    i0: usize,
    i1: usize,
    frac: f64,
}

impl Grid {
    fn cell_axes(&self, value: &[f64]) -> Result<Vec<CellAxis>, GridError> {
        if value.len() != self.ndim() {
            return Err(GridError::DimensionMismatch {
                expected: self.ndim(),
                actual: value.len(),
            });
        }

        let mut axes = Vec::with_capacity(self.ndim());
        for (axis, &v) in value.iter().enumerate() {
            let points = self.num_points[axis] as i64;
            let t = (v - self.lower[axis]) / self.spacing[axis] - self.node_offset;

            let cell_axis = if self.periodic[axis] {
                let cell = t.floor() as i64;
                CellAxis {
                    i0: cell.rem_euclid(points) as usize,
                    i1: (cell + 1).rem_euclid(points) as usize,
                    frac: t - cell as f64,
                }
            } else if points == 1 {
                // Degenerate axis: a single node, nothing to bracket.
                CellAxis {
                    i0: 0,
                    i1: 0,
                    frac: 0.0,
                }
            } else {
                let cell = (t.floor() as i64).clamp(0, points - 2);
                CellAxis {
                    i0: cell as usize,
                    i1: (cell + 1) as usize,
                    frac: t - cell as f64,
                }
            };
            axes.push(cell_axis);
        }
        Ok(axes)
    }

    /// Returns the node index-tuples of the cell enclosing a continuous value.
    ///
    /// In the non-degenerate case this is the 2^N corner set of the voxel the
    /// value falls in; duplicate tuples arising from single-node axes are
    /// removed. Off-grid values resolve to the nearest boundary cell.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::DimensionMismatch`] if `value` does not have one
    /// component per axis.
    pub fn voxel_for(&self, value: &[f64]) -> Result<Vec<Vec<usize>>, GridError> {
        let axes = self.cell_axes(value)?;
        let mut corners: Vec<Vec<usize>> = Vec::with_capacity(1 << axes.len());
        for corner in 0..(1_usize << axes.len()) {
            let tuple: Vec<usize> = axes
                .iter()
                .enumerate()
                .map(|(i, a)| if corner >> i & 1 == 1 { a.i1 } else { a.i0 })
                .collect();
            if !corners.contains(&tuple) {
                corners.push(tuple);
            }
        }
        Ok(corners)
    }

    /// Interpolates the primary value at a continuous point.
    ///
    /// Multilinear over the enclosing voxel; beyond a bounded axis the
    /// boundary cell extrapolates linearly, so the call never fails for
    /// off-grid points.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::DimensionMismatch`] if `value` does not have one
    /// component per axis.
    pub fn interpolate_value(&self, value: &[f64]) -> Result<f64, GridError> {
        let axes = self.cell_axes(value)?;

        let mut acc = 0.0;
        let mut indices = vec![0; axes.len()];
        for corner in 0..(1_usize << axes.len()) {
            let mut weight = 1.0;
            for (i, a) in axes.iter().enumerate() {
                if corner >> i & 1 == 1 {
                    weight *= a.frac;
                    indices[i] = a.i1;
                } else {
                    weight *= 1.0 - a.frac;
                    indices[i] = a.i0;
                }
            }
            acc += weight * self.value_at(&indices)?;
        }
        Ok(acc)
    }

    /// Interpolates the partial derivative of the primary value along one axis.
    ///
    /// Same voxel weights as [`Grid::interpolate_value`], with the chosen
    /// axis's weight replaced by the finite-difference slope of its cell.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::AxisOutOfRange`] for an invalid axis and
    /// [`GridError::DimensionMismatch`] for a mis-sized value tuple.
    pub fn interpolate_deriv(&self, value: &[f64], axis: usize) -> Result<f64, GridError> {
        if axis >= self.ndim() {
            return Err(GridError::AxisOutOfRange {
                axis,
                ndim: self.ndim(),
            });
        }
        let axes = self.cell_axes(value)?;

        let mut acc = 0.0;
        let mut indices = vec![0; axes.len()];
        for corner in 0..(1_usize << axes.len()) {
            let mut weight = 1.0;
            for (i, a) in axes.iter().enumerate() {
                let high = corner >> i & 1 == 1;
                indices[i] = if high { a.i1 } else { a.i0 };
                if i == axis {
                    weight *= if high { 1.0 } else { -1.0 } / self.spacing[i];
                } else {
                    weight *= if high { a.frac } else { 1.0 - a.frac };
                }
            }
            acc += weight * self.value_at(&indices)?;
        }
        Ok(acc)
    }
}

#[cfg(test)]
mod tests {
    use super::super::build::{GridConfig, GridKind};
    use super::*;

    const TOLERANCE: f64 = 1e-9;

    fn f64_approx_equal(a: f64, b: f64) -> bool {
        (a - b).abs() < TOLERANCE
    }

    fn filled_grid(config: &GridConfig, f: impl Fn(&[f64]) -> f64) -> Grid {
        let mut grid = Grid::from_config(config).unwrap();
        let nodes: Vec<_> = grid
            .nodes()
            .map(|node| (node.indices, f(&node.location)))
            .collect();
        for (indices, value) in nodes {
            grid.set_value(&indices, value).unwrap();
        }
        grid
    }

    fn unit_square(points: usize) -> GridConfig {
        GridConfig {
            kind: GridKind::Uniform,
            lower: vec![0.0, 0.0],
            upper: vec![1.0, 1.0],
            periodic: vec![false, false],
            points: vec![points, points],
            extra: 0,
        }
    }

    #[test]
    fn constant_field_interpolates_to_the_constant_everywhere() {
        let grid = filled_grid(&unit_square(3), |_| 4.25);
        for query in [
            [0.5, 0.5],
            [0.0, 0.0],
            [1.0, 1.0],
            [0.13, 0.99],
            // Beyond the bounds: extrapolation reduces to the boundary value.
            [-0.5, 0.5],
            [1.8, 2.4],
        ] {
            assert!(
                f64_approx_equal(grid.interpolate_value(&query).unwrap(), 4.25),
                "query {query:?}"
            );
        }
    }

    #[test]
    fn bilinear_field_is_reproduced_exactly() {
        let grid = filled_grid(&unit_square(5), |loc| loc[0] * loc[1]);
        assert!(f64_approx_equal(
            grid.interpolate_value(&[0.3, 0.7]).unwrap(),
            0.21
        ));
        assert!(f64_approx_equal(
            grid.interpolate_deriv(&[0.3, 0.7], 0).unwrap(),
            0.7
        ));
        assert!(f64_approx_equal(
            grid.interpolate_deriv(&[0.3, 0.7], 1).unwrap(),
            0.3
        ));
    }

    #[test]
    fn linear_field_extrapolates_past_the_boundary() {
        let config = GridConfig {
            kind: GridKind::Uniform,
            lower: vec![0.0],
            upper: vec![1.0],
            periodic: vec![false],
            points: vec![3],
            extra: 0,
        };
        let grid = filled_grid(&config, |loc| 2.0 * loc[0]);
        assert!(f64_approx_equal(
            grid.interpolate_value(&[1.25]).unwrap(),
            2.5
        ));
        assert!(f64_approx_equal(
            grid.interpolate_value(&[-0.5]).unwrap(),
            -1.0
        ));
        assert!(f64_approx_equal(
            grid.interpolate_deriv(&[1.25], 0).unwrap(),
            2.0
        ));
    }

    #[test]
    fn periodic_axis_interpolates_across_the_seam() {
        let config = GridConfig {
            kind: GridKind::Uniform,
            lower: vec![0.0],
            upper: vec![10.0],
            periodic: vec![true],
            points: vec![10],
            extra: 0,
        };
        let mut grid = Grid::from_config(&config).unwrap();
        grid.set_value(&[9], 1.0).unwrap();
        grid.set_value(&[0], 3.0).unwrap();

        // Halfway between the last node and the wrapped-around first one.
        assert!(f64_approx_equal(
            grid.interpolate_value(&[9.5]).unwrap(),
            2.0
        ));
        assert_eq!(grid.voxel_for(&[9.5]).unwrap(), vec![vec![9], vec![0]]);
    }

    #[test]
    fn voxel_for_returns_the_enclosing_cell_corners() {
        let grid = Grid::from_config(&unit_square(3)).unwrap();
        let corners = grid.voxel_for(&[0.3, 0.8]).unwrap();
        assert_eq!(corners.len(), 4);
        for expected in [[0, 1], [1, 1], [0, 2], [1, 2]] {
            assert!(corners.contains(&expected.to_vec()), "missing {expected:?}");
        }
    }

    #[test]
    fn deriv_rejects_invalid_axis() {
        let grid = Grid::from_config(&unit_square(3)).unwrap();
        assert_eq!(
            grid.interpolate_deriv(&[0.5, 0.5], 2),
            Err(GridError::AxisOutOfRange { axis: 2, ndim: 2 })
        );
    }

    #[test]
    fn interpolation_rejects_mis_sized_queries() {
        let grid = Grid::from_config(&unit_square(3)).unwrap();
        assert_eq!(
            grid.interpolate_value(&[0.5]),
            Err(GridError::DimensionMismatch {
                expected: 2,
                actual: 1,
            })
        );
    }
}
