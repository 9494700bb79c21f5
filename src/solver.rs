// Copyright (c) 2026, Chad Hogan
// All rights reserved.
//
// This source code is licensed under the BSD-3-Clause license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::{Duration, Instant};

use ndarray::Array2;
use rayon::prelude::*;
use tracing::{debug, info, trace};

use crate::combine::{find_minimum_times_blocked, DEFAULT_BLOCK_SIZE};
use crate::error::{RayError, Result};
use crate::path::FermatPath;
use crate::rays::Rays;

/// Progress information passed to the optional callback.
#[derive(Debug, Clone, Copy)]
pub struct SolveProgress {
    /// Number of requested paths solved so far.
    pub paths_solved: usize,
    /// Number of requested paths.
    pub paths_total: usize,
    /// Elapsed time since the solve started.
    pub elapsed: Duration,
}

/// Work counters, cumulative over every `solve` since the last `clear_cache`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SolverStats {
    /// Segment time matrices computed from point distances.
    pub num_segment_times: usize,
    /// Calls to the min-plus combination.
    pub num_minimizations: usize,
    /// Sub-paths served from the cache instead of being folded again.
    pub num_cache_hits: usize,
}

/// Solves many Fermat paths at once, sharing every common segment and prefix.
///
/// Each path is folded from its first interface toward its last one: the
/// rays of `P0 .. Pk` are combined with the direct times of `Pk -> Pk+1` to
/// give the rays of `P0 .. Pk+1`. Every prefix is memoized, so requested
/// paths that start the same way are only folded once along the shared part.
pub struct FermatSolver {
    paths: Vec<FermatPath>,
    block_size: usize,
    num_threads: Option<usize>,
    progress_callback: Option<Box<dyn Fn(SolveProgress) + Send + Sync>>,
    segment_times: HashMap<FermatPath, Arc<Array2<f64>>>,
    cached_rays: HashMap<FermatPath, Arc<Rays>>,
    stats: SolverStats,
}

impl FermatSolver {
    /// Create a solver for the given paths.
    ///
    /// # Errors
    /// Returns `EmptyInterface` if any path goes through an interface without points.
    pub fn new(paths: Vec<FermatPath>) -> Result<Self> {
        for path in &paths {
            if let Some(empty) = path.points().iter().find(|p| p.is_empty()) {
                return Err(RayError::EmptyInterface {
                    name: empty.name().to_string(),
                });
            }
        }
        Ok(FermatSolver {
            paths,
            block_size: DEFAULT_BLOCK_SIZE,
            num_threads: None,
            progress_callback: None,
            segment_times: HashMap::new(),
            cached_rays: HashMap::new(),
            stats: SolverStats::default(),
        })
    }

    /// Set the column block size of the min-plus combination (builder method).
    ///
    /// # Errors
    /// Returns an error if `block_size` is zero.
    pub fn with_block_size(mut self, block_size: usize) -> Result<Self> {
        if block_size == 0 {
            return Err(RayError::InvalidBlockSize(block_size));
        }
        self.block_size = block_size;
        Ok(self)
    }

    /// Set the number of worker threads (builder method).
    /// If not specified, defaults to the number of available CPU cores.
    ///
    /// Results do not depend on the thread count.
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.num_threads = Some(threads);
        self
    }

    /// Set a callback invoked after each requested path is solved (builder method).
    pub fn with_progress(mut self, callback: Box<dyn Fn(SolveProgress) + Send + Sync>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// The requested paths, in the order they were given.
    pub fn paths(&self) -> &[FermatPath] {
        &self.paths
    }

    /// Work done so far.
    pub fn stats(&self) -> SolverStats {
        self.stats
    }

    /// Drop memoized segment times and prefix rays, and reset the counters.
    pub fn clear_cache(&mut self) {
        self.segment_times.clear();
        self.cached_rays.clear();
        self.stats = SolverStats::default();
    }

    /// Compute the rays of every requested path.
    ///
    /// Returns one entry per distinct requested path; each `Rays` carries a
    /// `fermat_path()` equal to its key. Entries share their arrays with the
    /// solver's cache. Calling `solve` again reuses the cache and does no
    /// new work.
    ///
    /// # Errors
    /// Returns an error if the thread pool cannot be built.
    pub fn solve(&mut self) -> Result<HashMap<FermatPath, Arc<Rays>>> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.get_num_threads())
            .build()
            .map_err(|e| RayError::Other(e.to_string()))?;
        pool.install(|| self.solve_all())
    }

    fn get_num_threads(&self) -> usize {
        self.num_threads.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        })
    }

    fn solve_all(&mut self) -> Result<HashMap<FermatPath, Arc<Rays>>> {
        let start_time = Instant::now();
        self.prefetch_segment_times();

        let paths = self.paths.clone();
        let mut out: HashMap<FermatPath, Arc<Rays>> = HashMap::with_capacity(paths.len());
        for (solved, path) in paths.iter().enumerate() {
            if !out.contains_key(path) {
                let rays = self.solve_path(path)?;
                out.insert(path.clone(), rays);
            }
            if let Some(cb) = &self.progress_callback {
                cb(SolveProgress {
                    paths_solved: solved + 1,
                    paths_total: paths.len(),
                    elapsed: start_time.elapsed(),
                });
            }
        }

        info!(
            paths = out.len(),
            segments = self.stats.num_segment_times,
            minimizations = self.stats.num_minimizations,
            cache_hits = self.stats.num_cache_hits,
            elapsed_ms = start_time.elapsed().as_millis() as u64,
            "solved Fermat paths"
        );
        Ok(out)
    }

    /// Compute, in parallel, the direct times of every segment not cached yet.
    fn prefetch_segment_times(&mut self) {
        let mut seen = HashSet::new();
        let mut missing = Vec::new();
        for path in &self.paths {
            for k in 0..path.num_points_sets() - 1 {
                let segment = path.sub_path(k, k + 1);
                if !self.segment_times.contains_key(&segment) && seen.insert(segment.clone()) {
                    missing.push(segment);
                }
            }
        }

        let computed: Vec<(FermatPath, Array2<f64>)> = missing
            .into_par_iter()
            .map(|segment| {
                let times = direct_times(&segment);
                (segment, times)
            })
            .collect();

        self.stats.num_segment_times += computed.len();
        for (segment, times) in computed {
            self.segment_times.insert(segment, Arc::new(times));
        }
    }

    fn segment_time(&mut self, segment: &FermatPath) -> Arc<Array2<f64>> {
        if let Some(times) = self.segment_times.get(segment) {
            return Arc::clone(times);
        }
        let times = Arc::new(direct_times(segment));
        self.stats.num_segment_times += 1;
        self.segment_times
            .insert(segment.clone(), Arc::clone(&times));
        times
    }

    /// Rays of the longest prefix of `path` already folded, and the index of
    /// its last interface. Falls back to the direct rays of the first segment.
    fn starting_rays(&mut self, path: &FermatPath) -> Result<(Arc<Rays>, usize)> {
        for end in (1..path.num_points_sets()).rev() {
            let prefix = path.sub_path(0, end);
            if let Some(rays) = self.cached_rays.get(&prefix) {
                trace!(prefix = %prefix, "cache hit");
                self.stats.num_cache_hits += 1;
                return Ok((Arc::clone(rays), end));
            }
        }
        let first = path.sub_path(0, 1);
        let times = self.segment_time(&first);
        let rays = Arc::new(Rays::make_rays_two_interfaces(
            Array2::clone(&times),
            first.clone(),
        )?);
        self.cached_rays.insert(first, Arc::clone(&rays));
        Ok((rays, 1))
    }

    fn solve_path(&mut self, path: &FermatPath) -> Result<Arc<Rays>> {
        let d = path.num_points_sets();
        let (mut current, end) = self.starting_rays(path)?;

        for next in end + 1..d {
            let tail = path.sub_path(next - 1, next);
            let tail_times = self.segment_time(&tail);
            let (times, best_index) = find_minimum_times_blocked(
                current.times().view(),
                tail_times.view(),
                self.block_size,
            );
            self.stats.num_minimizations += 1;
            let interior = Rays::expand_rays(current.interior_indices(), best_index.view());

            let prefix = path.sub_path(0, next);
            debug!(
                prefix = %prefix,
                shape = ?times.shape(),
                "folded interface {}",
                next
            );
            let rays = Arc::new(Rays::new(times, interior, prefix.clone())?);
            self.cached_rays.insert(prefix, Arc::clone(&rays));
            current = rays;
        }
        Ok(current)
    }
}

/// Travel times along a single segment: distance divided by velocity.
fn direct_times(segment: &FermatPath) -> Array2<f64> {
    let points = segment.points();
    let velocity = segment.velocities()[0];
    let times = points[0]
        .pairwise_distance(&points[1])
        .mapv_into(|dist| dist / velocity);
    debug!(segment = %segment, shape = ?times.shape(), "computed segment times");
    times
}
