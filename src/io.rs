// Copyright (c) 2026, Chad Hogan
// All rights reserved.
//
// This source code is licensed under the BSD-3-Clause license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use ndarray::{Array2, Array3};
use ndarray_npy::ReadNpyError;

use crate::error::{RayError, Result};
use crate::geometry::Points;
use crate::rays::Rays;

/// Load an `[n, 3]` coordinate array from a .npy file as a named point set.
pub fn load_points(path: &Path, name: &str) -> Result<Points> {
    // Try f64 first
    let coords: Array2<f64> = match ndarray_npy::read_npy(path) {
        Ok(a) => a,
        Err(ReadNpyError::Io(e)) => return Err(RayError::IoError(e)),
        Err(_) => {
            // Try f32 and promote
            let arr32: Array2<f32> = ndarray_npy::read_npy(path)
                .map_err(|e| RayError::UnsupportedDtype(format!("{}", e)))?;
            arr32.mapv(|v| v as f64)
        }
    };
    if coords.ncols() != 3 {
        return Err(RayError::ShapeMismatch {
            expected: vec![coords.nrows(), 3],
            got: coords.shape().to_vec(),
        });
    }
    Points::new(name, coords)
}

/// Save an `[n, 3]` coordinate array to a .npy file.
pub fn save_points(points: &Points, path: &Path) -> Result<()> {
    ndarray_npy::write_npy(path, &points.coords())
        .map_err(|e| RayError::Other(format!("npy write error: {}", e)))
}

/// Save the times and indices of `rays` as two .npy files in `dir`.
///
/// Writes `<stem>_times.npy` (f64, `[n0, n_last]`) and `<stem>_indices.npy`
/// (u64, `[d, n0, n_last]`). Returns the two paths written.
pub fn save_rays(rays: &Rays, dir: &Path, stem: &str) -> Result<(PathBuf, PathBuf)> {
    std::fs::create_dir_all(dir)?;
    let times_path = dir.join(format!("{}_times.npy", stem));
    let indices_path = dir.join(format!("{}_indices.npy", stem));

    ndarray_npy::write_npy(&times_path, rays.times())
        .map_err(|e| RayError::Other(format!("npy write error: {}", e)))?;

    let indices: Array3<u64> = rays.indices().mapv(|v| v as u64);
    ndarray_npy::write_npy(&indices_path, &indices)
        .map_err(|e| RayError::Other(format!("npy write error: {}", e)))?;

    Ok((times_path, indices_path))
}

/// File stem for a path: interface names joined by `-`, with characters
/// outside `[A-Za-z0-9_]` replaced by `_`.
pub fn path_stem(rays: &Rays) -> String {
    rays.fermat_path()
        .points()
        .iter()
        .map(|p| {
            p.name()
                .chars()
                .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("-")
}

/// Pick a file stem not in `used` and record it.
///
/// Returns `base` if it is free, otherwise the first free `base_1`,
/// `base_2`, ... Suffixed stems are checked against every stem already
/// recorded, including natural stems that happen to end in `_N`.
pub fn unique_stem(base: &str, used: &mut HashSet<String>) -> String {
    let mut stem = base.to_string();
    let mut suffix = 0;
    while used.contains(&stem) {
        suffix += 1;
        stem = format!("{}_{}", base, suffix);
    }
    used.insert(stem.clone());
    stem
}
