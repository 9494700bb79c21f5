// Copyright (c) 2026, Chad Hogan
// All rights reserved.
//
// This source code is licensed under the BSD-3-Clause license found in the
// LICENSE file in the root directory of this source tree.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Add;
use std::sync::Arc;

use crate::error::{RayError, Result};
use crate::geometry::Interface;

/// One element of the alternating itinerary `interface, velocity, ..., interface`.
#[derive(Debug, Clone)]
pub enum PathElement {
    /// A set of points the ray touches.
    Interface(Interface),
    /// Wave speed in the medium between two interfaces.
    Velocity(f64),
}

/// The itinerary a ray must follow: `P0, v0, P1, v1, ..., Pk` with `k >= 1`.
///
/// Stored as `k + 1` interfaces and `k` velocities. Immutable once built.
/// Two paths are equal when they visit the same interfaces (by handle
/// identity) with the same velocities (by bit pattern), so `Eq` and `Hash`
/// agree and a path can key a cache.
#[derive(Debug, Clone)]
pub struct FermatPath {
    points: Vec<Interface>,
    velocities: Vec<f64>,
}

fn check_velocity(position: usize, v: f64) -> Result<()> {
    if !v.is_finite() || v <= 0.0 {
        return Err(RayError::MalformedPath {
            reason: format!(
                "velocity {} at position {} must be positive and finite",
                v, position
            ),
        });
    }
    Ok(())
}

impl FermatPath {
    /// Build a path from its interfaces and the velocities between them.
    ///
    /// # Errors
    /// Returns `MalformedPath` if there are fewer than two interfaces, if
    /// `points.len() != velocities.len() + 1`, or if a velocity is not
    /// positive and finite.
    pub fn new(points: Vec<Interface>, velocities: Vec<f64>) -> Result<Self> {
        if points.len() < 2 {
            return Err(RayError::MalformedPath {
                reason: format!("{} interface(s), at least 2 are needed", points.len()),
            });
        }
        if points.len() != velocities.len() + 1 {
            return Err(RayError::MalformedPath {
                reason: format!(
                    "{} interfaces for {} velocities",
                    points.len(),
                    velocities.len()
                ),
            });
        }
        for (k, &v) in velocities.iter().enumerate() {
            check_velocity(2 * k + 1, v)?;
        }
        Ok(FermatPath { points, velocities })
    }

    /// Build a path from an alternating sequence of elements.
    ///
    /// # Errors
    /// Returns `MalformedPath` if the sequence has an even length or fewer
    /// than three elements, does not alternate interface/velocity starting
    /// with an interface, or holds a non-positive velocity.
    pub fn from_elements(elements: Vec<PathElement>) -> Result<Self> {
        if elements.len() < 3 || elements.len() % 2 == 0 {
            return Err(RayError::MalformedPath {
                reason: format!(
                    "{} elements, expected an odd number >= 3",
                    elements.len()
                ),
            });
        }
        let mut points = Vec::with_capacity(elements.len() / 2 + 1);
        let mut velocities = Vec::with_capacity(elements.len() / 2);
        for (position, element) in elements.into_iter().enumerate() {
            match (position % 2, element) {
                (0, PathElement::Interface(p)) => points.push(p),
                (1, PathElement::Velocity(v)) => {
                    check_velocity(position, v)?;
                    velocities.push(v);
                }
                (0, PathElement::Velocity(_)) => {
                    return Err(RayError::MalformedPath {
                        reason: format!("expected an interface at position {}", position),
                    })
                }
                _ => {
                    return Err(RayError::MalformedPath {
                        reason: format!("expected a velocity at position {}", position),
                    })
                }
            }
        }
        Ok(FermatPath { points, velocities })
    }

    /// The interfaces, in travel order.
    pub fn points(&self) -> &[Interface] {
        &self.points
    }

    /// The velocities, `velocities()[k]` being the speed between interface `k` and `k + 1`.
    pub fn velocities(&self) -> &[f64] {
        &self.velocities
    }

    /// Number of interfaces, `k + 1`.
    pub fn num_points_sets(&self) -> usize {
        self.points.len()
    }

    /// Number of points of the largest interface.
    pub fn len_largest_interface(&self) -> usize {
        self.points.iter().map(|p| p.len()).max().unwrap_or(0)
    }

    /// The alternating `interface, velocity, ..., interface` sequence.
    pub fn elements(&self) -> Vec<PathElement> {
        let mut out = Vec::with_capacity(2 * self.points.len() - 1);
        for (k, p) in self.points.iter().enumerate() {
            if k > 0 {
                out.push(PathElement::Velocity(self.velocities[k - 1]));
            }
            out.push(PathElement::Interface(Arc::clone(p)));
        }
        out
    }

    /// The same itinerary walked backward.
    pub fn reverse(&self) -> Self {
        FermatPath {
            points: self.points.iter().rev().cloned().collect(),
            velocities: self.velocities.iter().rev().copied().collect(),
        }
    }

    /// Join `self` and `other` at their shared interface.
    ///
    /// # Errors
    /// Returns `PathConcatenation` if the last interface of `self` is not the
    /// same handle as the first interface of `other`.
    pub fn concat(&self, other: &FermatPath) -> Result<Self> {
        let left = &self.points[self.points.len() - 1];
        let right = &other.points[0];
        if !Arc::ptr_eq(left, right) {
            return Err(RayError::PathConcatenation {
                left: left.name().to_string(),
                right: right.name().to_string(),
            });
        }
        let mut points = self.points.clone();
        points.extend(other.points[1..].iter().cloned());
        let mut velocities = self.velocities.clone();
        velocities.extend_from_slice(&other.velocities);
        Ok(FermatPath { points, velocities })
    }

    /// The path between interface `start` and interface `end`, both included.
    ///
    /// # Panics
    /// Panics unless `start < end < self.num_points_sets()`.
    pub fn sub_path(&self, start: usize, end: usize) -> Self {
        assert!(
            start < end && end < self.points.len(),
            "invalid sub-path {}..={} of a {}-interface path",
            start,
            end,
            self.points.len()
        );
        FermatPath {
            points: self.points[start..=end].to_vec(),
            velocities: self.velocities[start..end].to_vec(),
        }
    }

    /// Split into the first segment and the remainder, sharing interface 1.
    ///
    /// `A v1 B v2 C v3 D` gives `(A v1 B, B v2 C v3 D)`.
    ///
    /// # Errors
    /// Returns `NotEnoughInterfaces` for a two-interface path.
    pub fn split_head(&self) -> Result<(Self, Self)> {
        let d = self.num_points_sets();
        if d < 3 {
            return Err(RayError::NotEnoughInterfaces { num_points_sets: d });
        }
        Ok((self.sub_path(0, 1), self.sub_path(1, d - 1)))
    }

    /// Split into everything but the last segment, and the last segment.
    ///
    /// `A v1 B v2 C v3 D` gives `(A v1 B v2 C, C v3 D)`.
    ///
    /// # Errors
    /// Returns `NotEnoughInterfaces` for a two-interface path.
    pub fn split_queue(&self) -> Result<(Self, Self)> {
        let d = self.num_points_sets();
        if d < 3 {
            return Err(RayError::NotEnoughInterfaces { num_points_sets: d });
        }
        Ok((self.sub_path(0, d - 2), self.sub_path(d - 2, d - 1)))
    }
}

impl PartialEq for FermatPath {
    fn eq(&self, other: &Self) -> bool {
        self.points.len() == other.points.len()
            && self
                .points
                .iter()
                .zip(&other.points)
                .all(|(a, b)| Arc::ptr_eq(a, b))
            && self
                .velocities
                .iter()
                .zip(&other.velocities)
                .all(|(a, b)| a.to_bits() == b.to_bits())
    }
}

impl Eq for FermatPath {}

impl Hash for FermatPath {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.points.len().hash(state);
        for p in &self.points {
            Arc::as_ptr(p).hash(state);
        }
        for v in &self.velocities {
            v.to_bits().hash(state);
        }
    }
}

impl Add for &FermatPath {
    type Output = Result<FermatPath>;

    fn add(self, rhs: &FermatPath) -> Self::Output {
        self.concat(rhs)
    }
}

impl fmt::Display for FermatPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.points[0].name())?;
        for (v, p) in self.velocities.iter().zip(&self.points[1..]) {
            write!(f, " -({})-> {}", v, p.name())?;
        }
        Ok(())
    }
}
