// SPDX-License-Identifier: MIT
//
// Copyright (c) 2025 Alexandre Severino
//
// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"), to deal
// in the Software without restriction, including without limitation the rights
// to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
// copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in
// all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
// OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
// SOFTWARE.

use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    geometry::{point::Point3, vector::Vector3},
    numeric::tolerance::Tolerance,
};

/// An axis-aligned bounding box. `min <= max` on every axis; zero-volume boxes
/// are valid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    min: Point3,
    max: Point3,
}

impl Aabb {
    pub fn new(min: Point3, max: Point3) -> Result<Self> {
        let ok = (0..3).all(|i| min[i] <= max[i]);
        if !ok {
            return Err(Error::MalformedBox {
                min: min.coords(),
                max: max.coords(),
            });
        }
        Ok(Aabb { min, max })
    }

    /// Degenerate box holding a single point.
    pub fn from_point(p: Point3) -> Self {
        Aabb { min: p, max: p }
    }

    /// Smallest box containing all `points`; `None` for an empty set or a
    /// non-finite coordinate.
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point3>) -> Option<Self> {
        let mut it = points.into_iter();
        let first = *it.next()?;
        if !first.is_finite() {
            return None;
        }
        let mut b = Aabb::from_point(first);
        for p in it {
            if !p.is_finite() {
                return None;
            }
            b = b.union(&Aabb::from_point(*p));
        }
        Some(b)
    }

    pub fn min(&self) -> &Point3 {
        &self.min
    }

    /// Access the maximum corner.
    pub fn max(&self) -> &Point3 {
        &self.max
    }

    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: Point3::new(
                self.min.x.min(other.min.x),
                self.min.y.min(other.min.y),
                self.min.z.min(other.min.z),
            ),
            max: Point3::new(
                self.max.x.max(other.max.x),
                self.max.y.max(other.max.y),
                self.max.z.max(other.max.z),
            ),
        }
    }

    /// Does this box overlap `other` on all three axes (touching counts)?
    pub fn intersects(&self, other: &Aabb, tol: &Tolerance) -> bool {
        (0..3).all(|i| tol.le(self.min[i], other.max[i]) && tol.le(other.min[i], self.max[i]))
    }

    /// Does this box fully contain `other`?
    pub fn contains(&self, other: &Aabb, tol: &Tolerance) -> bool {
        (0..3).all(|i| tol.le(self.min[i], other.min[i]) && tol.ge(self.max[i], other.max[i]))
    }

    /// Does this box lie fully inside `other`?
    pub fn inside(&self, other: &Aabb, tol: &Tolerance) -> bool {
        other.contains(self, tol)
    }

    pub fn contains_point(&self, p: &Point3, tol: &Tolerance) -> bool {
        (0..3).all(|i| tol.le(self.min[i], p[i]) && tol.ge(self.max[i], p[i]))
    }

    /// Length along axis `i`.
    pub fn extent(&self, i: usize) -> f64 {
        self.max[i] - self.min[i]
    }

    pub fn extents(&self) -> Vector3 {
        self.max - self.min
    }

    pub fn half_extents(&self) -> Vector3 {
        self.extents() * 0.5
    }

    /// Center coordinate along axis `i`.
    pub fn center(&self, i: usize) -> f64 {
        0.5 * (self.min[i] + self.max[i])
    }

    pub fn centre(&self) -> Point3 {
        self.min.midpoint(&self.max)
    }

    pub fn volume(&self) -> f64 {
        self.extent(0) * self.extent(1) * self.extent(2)
    }

    /// Sum of the edge lengths; orders degenerate boxes where volume cannot.
    pub fn margin(&self) -> f64 {
        self.extent(0) + self.extent(1) + self.extent(2)
    }

    /// Volume of the intersection with `other` (0 when disjoint).
    pub fn overlap_volume(&self, other: &Aabb) -> f64 {
        (0..3)
            .map(|i| (self.max[i].min(other.max[i]) - self.min[i].max(other.min[i])).max(0.0))
            .product()
    }

    /// Return the axis index with largest extent.
    pub fn longest_axis(&self) -> usize {
        let mut best_i = 0usize;
        let mut best = self.extent(0);
        for i in 1..3 {
            let e = self.extent(i);
            if e > best {
                best_i = i;
                best = e;
            }
        }
        best_i
    }

    /// Squared distance from the closest point of the box to `p` (0 inside).
    pub fn min_distance_squared(&self, p: &Point3) -> f64 {
        (0..3)
            .map(|i| {
                let d = if p[i] < self.min[i] {
                    self.min[i] - p[i]
                } else if p[i] > self.max[i] {
                    p[i] - self.max[i]
                } else {
                    0.0
                };
                d * d
            })
            .sum()
    }

    pub fn min_distance(&self, p: &Point3) -> f64 {
        self.min_distance_squared(p).sqrt()
    }

    /// Grow every side by `by` (>= 0).
    pub fn expanded(&self, by: f64) -> Aabb {
        let d = Vector3::new(by, by, by);
        Aabb {
            min: self.min + (-d),
            max: self.max + d,
        }
    }

    pub fn corners(&self) -> [Point3; 8] {
        std::array::from_fn(|k| {
            Point3::new(
                if k & 1 == 0 { self.min.x } else { self.max.x },
                if k & 2 == 0 { self.min.y } else { self.max.y },
                if k & 4 == 0 { self.min.z } else { self.max.z },
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn b(min: [f64; 3], max: [f64; 3]) -> Aabb {
        Aabb::new(min.into(), max.into()).unwrap()
    }

    #[test]
    fn rejects_inverted_and_nan() {
        assert!(matches!(
            Aabb::new(Point3::new(1.0, 0.0, 0.0), Point3::new(0.0, 1.0, 1.0)),
            Err(Error::MalformedBox { .. })
        ));
        assert!(Aabb::new(Point3::new(f64::NAN, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0)).is_err());
        // Degenerate is fine.
        assert!(Aabb::new(Point3::ORIGIN, Point3::ORIGIN).is_ok());
    }

    #[test]
    fn touching_boxes_intersect() {
        let tol = Tolerance::exact();
        let a = b([0.0, 0.0, 0.0], [1.0, 1.0, 1.0]);
        let c = b([1.0, 0.0, 0.0], [2.0, 1.0, 1.0]);
        assert!(a.intersects(&c, &tol));
        let d = b([1.5, 0.0, 0.0], [2.0, 1.0, 1.0]);
        assert!(!a.intersects(&d, &tol));
        assert!(a.intersects(&d, &Tolerance::new(0.5).unwrap()));
    }

    #[test]
    fn containment_and_distance() {
        let tol = Tolerance::default();
        let outer = b([0.0, 0.0, 0.0], [4.0, 4.0, 4.0]);
        let inner = b([1.0, 1.0, 1.0], [2.0, 2.0, 2.0]);
        assert!(outer.contains(&inner, &tol));
        assert!(inner.inside(&outer, &tol));
        assert!(!inner.contains(&outer, &tol));
        assert_eq!(outer.min_distance(&Point3::new(2.0, 2.0, 2.0)), 0.0);
        assert_eq!(inner.min_distance_squared(&Point3::new(5.0, 2.0, 2.0)), 9.0);
        assert_eq!(outer.overlap_volume(&inner), 1.0);
        assert_eq!(outer.longest_axis(), 0);
    }
}
