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

use crate::geometry::{point::Point3, vector::Vector3};

/// Infinite line through `origin` along a unit `direction`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Line3 {
    origin: Point3,
    direction: Vector3,
}

impl Line3 {
    /// `None` when `direction` is (near) zero.
    pub fn new(origin: Point3, direction: Vector3) -> Option<Self> {
        Some(Line3 {
            origin,
            direction: direction.normalized()?,
        })
    }

    /// Line through two distinct points.
    pub fn through(a: &Point3, b: &Point3) -> Option<Self> {
        Self::new(*a, *b - *a)
    }

    pub fn origin(&self) -> &Point3 {
        &self.origin
    }

    pub fn direction(&self) -> &Vector3 {
        &self.direction
    }

    pub fn point_at(&self, t: f64) -> Point3 {
        self.origin + self.direction * t
    }

    pub fn distance_to_point(&self, p: &Point3) -> f64 {
        (*p - self.origin).cross(&self.direction).norm()
    }

    /// Shortest distance between the line and the segment `[a, b]`.
    pub fn distance_to_segment(&self, a: &Point3, b: &Point3) -> f64 {
        let u = self.direction;
        let v = *b - *a;
        let w = self.origin - *a;
        let vv = v.norm_squared();
        if vv == 0.0 {
            return self.distance_to_point(a);
        }
        let uv = u.dot(&v);
        let uw = u.dot(&w);
        let vw = v.dot(&w);
        // |u| == 1, so the denominator is vv - uv^2.
        let denom = vv - uv * uv;
        let s = if denom > f64::EPSILON * vv {
            ((vw - uv * uw) / denom).clamp(0.0, 1.0)
        } else {
            // Parallel: any segment point is as good as another.
            0.0
        };
        let q = *a + v * s;
        self.distance_to_point(&q)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segment_distance() {
        let line = Line3::through(&Point3::new(0.0, 0.0, 0.0), &Point3::new(1.0, 0.0, 0.0)).unwrap();
        let d = line.distance_to_segment(&Point3::new(3.0, -1.0, 2.0), &Point3::new(3.0, 1.0, 2.0));
        assert!((d - 2.0).abs() < 1e-12);
        // Segment ends before reaching the line.
        let d = line.distance_to_segment(&Point3::new(0.0, 1.0, 0.0), &Point3::new(0.0, 3.0, 0.0));
        assert!((d - 1.0).abs() < 1e-12);
        // Parallel segment.
        let d = line.distance_to_segment(&Point3::new(-5.0, 0.0, 4.0), &Point3::new(5.0, 0.0, 4.0));
        assert!((d - 4.0).abs() < 1e-12);
    }
}
