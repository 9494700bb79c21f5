// Copyright (c) 2026, Chad Hogan
// All rights reserved.
//
// This source code is licensed under the BSD-3-Clause license found in the
// LICENSE file in the root directory of this source tree.

use ndarray::parallel::prelude::*;
use ndarray::{s, Array2, Array3, ArrayView2, ArrayView3, Axis, ShapeBuilder, Zip};

use crate::error::{RayError, Result};
use crate::path::FermatPath;

/// Minimum-time rays between every point of the first interface and every
/// point of the last interface of a [`FermatPath`].
///
/// - `times[[i, j]]` is the travel time of the optimal ray from point `i` of
///   the first interface to point `j` of the last one.
/// - `indices[[k, i, j]]` is the point visited at interface `k` by that ray,
///   so `indices[[0, i, j]] == i` and `indices[[d - 1, i, j]] == j`.
#[derive(Debug, Clone)]
pub struct Rays {
    times: Array2<f64>,
    indices: Array3<usize>,
    fermat_path: FermatPath,
}

impl Rays {
    /// Assemble rays from their times and the indices at the interior interfaces.
    ///
    /// # Parameters
    /// - `times`: `[n0, n_last]`
    /// - `interior_indices`: `[d - 2, n0, n_last]` where `d = fermat_path.num_points_sets()`
    /// - `fermat_path`: the path these rays follow
    ///
    /// # Errors
    /// Returns `ShapeMismatch` if the shapes disagree with each other or with
    /// the path, and `IndexOutOfBounds` if an interior index does not fit its
    /// interface.
    pub fn new(
        times: Array2<f64>,
        interior_indices: Array3<usize>,
        fermat_path: FermatPath,
    ) -> Result<Self> {
        let d = fermat_path.num_points_sets();
        let points = fermat_path.points();
        let (n0, n_last) = times.dim();
        let expected = [points[0].len(), points[d - 1].len()];
        if [n0, n_last] != expected {
            return Err(RayError::ShapeMismatch {
                expected: expected.to_vec(),
                got: vec![n0, n_last],
            });
        }
        if interior_indices.shape() != [d - 2, n0, n_last] {
            return Err(RayError::ShapeMismatch {
                expected: vec![d - 2, n0, n_last],
                got: interior_indices.shape().to_vec(),
            });
        }
        for (k, layer) in interior_indices.outer_iter().enumerate() {
            let len = points[k + 1].len();
            if let Some(&index) = layer.iter().find(|&&idx| idx >= len) {
                return Err(RayError::IndexOutOfBounds {
                    interface: k + 1,
                    index,
                    len,
                });
            }
        }

        let mut indices = Array3::<usize>::zeros((d, n0, n_last));
        indices
            .index_axis_mut(Axis(0), 0)
            .indexed_iter_mut()
            .for_each(|((i, _), v)| *v = i);
        indices
            .slice_mut(s![1..d - 1, .., ..])
            .assign(&interior_indices);
        indices
            .index_axis_mut(Axis(0), d - 1)
            .indexed_iter_mut()
            .for_each(|((_, j), v)| *v = j);

        Ok(Rays {
            times,
            indices,
            fermat_path,
        })
    }

    /// Rays of a two-interface path: there is no interior interface, every
    /// ray goes straight from its first point to its last point.
    ///
    /// # Errors
    /// Returns `ShapeMismatch` if `times` does not match the path's interfaces
    /// or if the path has more than two interfaces.
    pub fn make_rays_two_interfaces(times: Array2<f64>, fermat_path: FermatPath) -> Result<Self> {
        let d = fermat_path.num_points_sets();
        if d != 2 {
            return Err(RayError::ShapeMismatch {
                expected: vec![2],
                got: vec![d],
            });
        }
        let (n0, n_last) = times.dim();
        Rays::new(times, Array3::zeros((0, n0, n_last)), fermat_path)
    }

    /// Travel times, `[n0, n_last]`.
    pub fn times(&self) -> &Array2<f64> {
        &self.times
    }

    /// Point indices at every interface, `[d, n0, n_last]`.
    pub fn indices(&self) -> &Array3<usize> {
        &self.indices
    }

    /// Point indices at the interior interfaces only, `[d - 2, n0, n_last]`.
    pub fn interior_indices(&self) -> ArrayView3<'_, usize> {
        let d = self.num_points_sets();
        self.indices.slice(s![1..d - 1, .., ..])
    }

    /// The path these rays follow.
    pub fn fermat_path(&self) -> &FermatPath {
        &self.fermat_path
    }

    /// Number of interfaces along the path.
    pub fn num_points_sets(&self) -> usize {
        self.indices.len_of(Axis(0))
    }

    /// Flag rays touching the first or last point of an interior interface.
    ///
    /// Such rays likely hit the edge of a truncated interface, so their time
    /// may not be a true minimum. This is a diagnostic, not an error.
    pub fn gone_through_extreme_points(&self) -> Array2<bool> {
        let mut out = Array2::from_elem(self.times.raw_dim(), false);
        let points = self.fermat_path.points();
        for (k, layer) in self.interior_indices().outer_iter().enumerate() {
            let last = points[k + 1].len().saturating_sub(1);
            Zip::from(&mut out)
                .and(&layer)
                .for_each(|flag, &idx| *flag |= idx == 0 || idx == last);
        }
        out
    }

    /// The same rays walked backward, from the last interface to the first.
    ///
    /// `reversed.times()[[j, i]] == self.times()[[i, j]]` and
    /// `reversed.indices()[[d - 1 - k, j, i]] == self.indices()[[k, i, j]]`.
    pub fn reverse(&self) -> Self {
        let times = self.times.t().as_standard_layout().into_owned();
        let mut indices = self.indices.view();
        indices.invert_axis(Axis(0));
        let indices = indices
            .permuted_axes([0, 2, 1])
            .as_standard_layout()
            .into_owned();
        Rays {
            times,
            indices,
            fermat_path: self.fermat_path.reverse(),
        }
    }

    /// Same rays with times and indices stored in column-major order.
    pub fn to_fortran_order(&self) -> Self {
        let mut times = Array2::<f64>::zeros(self.times.raw_dim().f());
        times.assign(&self.times);
        let mut indices = Array3::<usize>::zeros(self.indices.raw_dim().f());
        indices.assign(&self.indices);
        Rays {
            times,
            indices,
            fermat_path: self.fermat_path.clone(),
        }
    }

    /// Point indices of the ray from point `i` of the first interface to
    /// point `j` of the last one, one per interface.
    ///
    /// # Panics
    /// Panics if `i` or `j` is out of bounds.
    pub fn ray_indices(&self, i: usize, j: usize) -> Vec<usize> {
        self.indices.slice(s![.., i, j]).to_vec()
    }

    /// Coordinates of the points visited by the ray from `i` to `j`.
    ///
    /// # Panics
    /// Panics if `i` or `j` is out of bounds.
    pub fn ray_coordinates(&self, i: usize, j: usize) -> Vec<[f64; 3]> {
        self.fermat_path
            .points()
            .iter()
            .zip(self.indices.slice(s![.., i, j]))
            .map(|(interface, &idx)| interface.point(idx))
            .collect()
    }

    /// Extend interior indices by one interface.
    ///
    /// `old_interior_indices` is `[k, n, m]` for a path ending at interface X
    /// with `m` points. `indices_new_interface[[i, j]]` is the point of X used
    /// by the optimal ray from `i` to point `j` of a new interface Y. The
    /// result is `[k + 1, n, r]`: for each `(i, j)` the old trajectory to
    /// `indices_new_interface[[i, j]]`, followed by that index.
    ///
    /// # Panics
    /// Panics if the leading dimensions disagree or an index exceeds `m`.
    pub fn expand_rays(
        old_interior_indices: ArrayView3<'_, usize>,
        indices_new_interface: ArrayView2<'_, usize>,
    ) -> Array3<usize> {
        let (k, n, _) = old_interior_indices.dim();
        let (n2, r) = indices_new_interface.dim();
        assert_eq!(
            n, n2,
            "row count differs: {} old rays, {} new rays",
            n, n2
        );

        let mut expanded = Array3::<usize>::zeros((k + 1, n, r));
        expanded
            .axis_iter_mut(Axis(1))
            .into_par_iter()
            .zip(indices_new_interface.axis_iter(Axis(0)))
            .zip(old_interior_indices.axis_iter(Axis(1)))
            .for_each(|((mut out, new_row), old)| {
                // out: [k + 1, r], new_row: [r], old: [k, m]
                for (j, &idx) in new_row.iter().enumerate() {
                    for layer in 0..k {
                        out[[layer, j]] = old[[layer, idx]];
                    }
                    out[[k, j]] = idx;
                }
            });
        expanded
    }
}
