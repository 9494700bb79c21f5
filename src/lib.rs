// Copyright (c) 2026, Chad Hogan
// All rights reserved.
//
// This source code is licensed under the BSD-3-Clause license found in the
// LICENSE file in the root directory of this source tree.

//! Minimum-time ray tracing through a stack of interfaces.
//!
//! Given interfaces sampled as point sets and the wave speed of each medium
//! between them, this library computes the first-arrival time and the full
//! point-by-point route between every point of the first interface and every
//! point of the last one, following Fermat's principle. Each leg is a straight
//! segment at constant velocity; the optimum over intermediate points is found
//! with a parallel min-plus combination, folded one interface at a time and
//! memoized across paths that share a prefix.

#![warn(missing_docs)]

/// Min-plus combination of two time matrices.
pub mod combine;
/// Error types for the library.
pub mod error;
/// Point sets used as interfaces.
pub mod geometry;
/// File I/O for interface coordinates and ray results.
pub mod io;
/// Itineraries of interfaces and velocities.
pub mod path;
/// Ray results: times and point indices.
pub mod rays;
/// Memoized multi-path solver.
pub mod solver;

pub use crate::combine::find_minimum_times;
pub use crate::error::{RayError, Result};
pub use crate::geometry::{Interface, Points};
pub use crate::path::{FermatPath, PathElement};
pub use crate::rays::Rays;
pub use crate::solver::{FermatSolver, SolveProgress, SolverStats};
