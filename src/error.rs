// Copyright (c) 2026, Chad Hogan
// All rights reserved.
//
// This source code is licensed under the BSD-3-Clause license found in the
// LICENSE file in the root directory of this source tree.

use std::fmt;

/// Errors that can occur while building paths, assembling rays, or doing I/O.
#[derive(Debug)]
pub enum RayError {
    /// A Fermat path does not alternate interface/velocity correctly, is too
    /// short, or carries a non-positive velocity.
    MalformedPath {
        /// Explanation of what is wrong.
        reason: String,
    },
    /// Two paths cannot be concatenated because the junction interfaces differ.
    PathConcatenation {
        /// Name of the last interface of the left path.
        left: String,
        /// Name of the first interface of the right path.
        right: String,
    },
    /// The path has no interior interface to split at.
    NotEnoughInterfaces {
        /// Number of interfaces in the path.
        num_points_sets: usize,
    },
    /// An interface referenced by a path has no points.
    EmptyInterface {
        /// The interface name.
        name: String,
    },
    /// Point coordinates are malformed (wrong width or non-finite).
    InvalidCoordinates {
        /// The interface name.
        name: String,
        /// Explanation of why it's invalid.
        reason: String,
    },
    /// Array shape does not match expected shape.
    ShapeMismatch {
        /// The expected shape.
        expected: Vec<usize>,
        /// The actual shape encountered.
        got: Vec<usize>,
    },
    /// A point index does not fit the interface it refers to.
    IndexOutOfBounds {
        /// Position of the interface along the path.
        interface: usize,
        /// The offending index.
        index: usize,
        /// Number of points of that interface.
        len: usize,
    },
    /// Combination block size must be positive.
    InvalidBlockSize(usize),
    /// Unsupported data type in file.
    UnsupportedDtype(String),
    /// I/O error occurred.
    IoError(std::io::Error),
    /// Other error with a descriptive message.
    Other(String),
}

impl fmt::Display for RayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RayError::MalformedPath { reason } => {
                write!(f, "malformed Fermat path: {}", reason)
            }
            RayError::PathConcatenation { left, right } => {
                write!(
                    f,
                    "cannot concatenate paths: '{}' is not the same interface as '{}'",
                    left, right
                )
            }
            RayError::NotEnoughInterfaces { num_points_sets } => {
                write!(
                    f,
                    "path has {} interfaces, at least 3 are needed to split it",
                    num_points_sets
                )
            }
            RayError::EmptyInterface { name } => {
                write!(f, "interface '{}' has no points", name)
            }
            RayError::InvalidCoordinates { name, reason } => {
                write!(f, "invalid coordinates for '{}': {}", name, reason)
            }
            RayError::ShapeMismatch { expected, got } => {
                write!(f, "shape mismatch: expected {:?}, got {:?}", expected, got)
            }
            RayError::IndexOutOfBounds {
                interface,
                index,
                len,
            } => {
                write!(
                    f,
                    "index {} out of bounds for interface {} with {} points",
                    index, interface, len
                )
            }
            RayError::InvalidBlockSize(size) => {
                write!(f, "invalid block size: {} (must be positive)", size)
            }
            RayError::UnsupportedDtype(dtype) => {
                write!(f, "unsupported dtype: {}", dtype)
            }
            RayError::IoError(e) => write!(f, "I/O error: {}", e),
            RayError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for RayError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RayError::IoError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for RayError {
    fn from(e: std::io::Error) -> Self {
        RayError::IoError(e)
    }
}

/// Convenience type alias for Results with RayError.
pub type Result<T> = std::result::Result<T, RayError>;
