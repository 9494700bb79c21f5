// Copyright (c) 2026, Chad Hogan
// All rights reserved.
//
// This source code is licensed under the BSD-3-Clause license found in the
// LICENSE file in the root directory of this source tree.

use std::fmt;
use std::sync::Arc;

use ndarray::parallel::prelude::*;
use ndarray::{Array2, ArrayView2, Axis};

use crate::error::{RayError, Result};

/// A shared handle to a set of points.
///
/// Paths compare interfaces by handle identity (`Arc::ptr_eq`), so two
/// interfaces with identical coordinates are still distinct.
pub type Interface = Arc<Points>;

/// An ordered, named set of 3D points a ray may touch.
///
/// Coordinates are stored as an `[n, 3]` row-major array.
pub struct Points {
    name: String,
    coords: Array2<f64>,
}

impl Points {
    /// Create a point set from an `[n, 3]` coordinate array.
    ///
    /// # Errors
    /// Returns an error if the array does not have 3 columns or if any
    /// coordinate is not finite.
    pub fn new(name: impl Into<String>, coords: Array2<f64>) -> Result<Self> {
        let name = name.into();
        if coords.ncols() != 3 {
            return Err(RayError::InvalidCoordinates {
                name,
                reason: format!("expected 3 columns, got {}", coords.ncols()),
            });
        }
        if let Some(pos) = coords.iter().position(|v| !v.is_finite()) {
            return Err(RayError::InvalidCoordinates {
                name,
                reason: format!("non-finite value at point {}", pos / 3),
            });
        }
        Ok(Points {
            name,
            coords: coords.as_standard_layout().into_owned(),
        })
    }

    /// Create a point set from separate x, y and z columns.
    ///
    /// # Errors
    /// Returns an error if the columns differ in length or hold non-finite values.
    pub fn from_xyz(name: impl Into<String>, x: &[f64], y: &[f64], z: &[f64]) -> Result<Self> {
        let name = name.into();
        if x.len() != y.len() || x.len() != z.len() {
            return Err(RayError::InvalidCoordinates {
                name,
                reason: format!(
                    "column lengths differ: x={}, y={}, z={}",
                    x.len(),
                    y.len(),
                    z.len()
                ),
            });
        }
        let coords = Array2::from_shape_fn((x.len(), 3), |(i, c)| match c {
            0 => x[i],
            1 => y[i],
            _ => z[i],
        });
        Points::new(name, coords)
    }

    /// Wrap into a shared interface handle.
    pub fn into_interface(self) -> Interface {
        Arc::new(self)
    }

    /// Name of the point set.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.coords.nrows()
    }

    /// True if the set holds no point.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Coordinates as an `[n, 3]` view.
    pub fn coords(&self) -> ArrayView2<'_, f64> {
        self.coords.view()
    }

    /// Coordinates of a single point.
    ///
    /// # Panics
    /// Panics if `i >= self.len()`.
    pub fn point(&self, i: usize) -> [f64; 3] {
        let row = self.coords.row(i);
        [row[0], row[1], row[2]]
    }

    /// Euclidean distance between every point of `self` and every point of `other`.
    ///
    /// Returns an array of shape `[self.len(), other.len()]`.
    pub fn pairwise_distance(&self, other: &Points) -> Array2<f64> {
        let n = self.len();
        let m = other.len();
        let mut out = Array2::<f64>::zeros((n, m));
        if n == 0 || m == 0 {
            return out;
        }
        out.axis_iter_mut(Axis(0))
            .into_par_iter()
            .zip(self.coords.axis_iter(Axis(0)).into_par_iter())
            .for_each(|(mut row, p)| {
                for (d, q) in row.iter_mut().zip(other.coords.axis_iter(Axis(0))) {
                    let dx = p[0] - q[0];
                    let dy = p[1] - q[1];
                    let dz = p[2] - q[2];
                    *d = (dx * dx + dy * dy + dz * dz).sqrt();
                }
            });
        out
    }
}

impl fmt::Debug for Points {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Points")
            .field("name", &self.name)
            .field("len", &self.len())
            .finish()
    }
}

impl fmt::Display for Points {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
