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

/// Plane `normal · p + d = 0` with a unit normal.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Plane {
    normal: Vector3,
    d: f64,
}

impl Plane {
    /// `None` when `normal` is (near) zero.
    pub fn new(normal: Vector3, d: f64) -> Option<Self> {
        let len = normal.norm();
        let unit = normal.normalized()?;
        Some(Plane { normal: unit, d: d / len })
    }

    pub fn from_point_normal(p: &Point3, normal: Vector3) -> Option<Self> {
        let unit = normal.normalized()?;
        Some(Plane {
            normal: unit,
            d: -unit.dot(&p.as_vector()),
        })
    }

    /// Plane through three points; `None` when they are collinear.
    pub fn from_points(p1: &Point3, p2: &Point3, p3: &Point3) -> Option<Self> {
        let v1 = *p2 - *p1;
        let v2 = *p3 - *p1;
        Self::from_point_normal(p1, v1.cross(&v2))
    }

    pub fn normal(&self) -> &Vector3 {
        &self.normal
    }

    pub fn d(&self) -> f64 {
        self.d
    }

    pub fn signed_distance(&self, p: &Point3) -> f64 {
        self.normal.dot(&p.as_vector()) + self.d
    }
}
