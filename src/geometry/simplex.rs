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
use smallvec::SmallVec;

use crate::{
    geometry::{aabb::Aabb, point::Point3, vector::Vector3},
    numeric::tolerance::{Dimension, Tolerance},
};

/// The concrete geometry kinds the kernel stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SimplexKind {
    Point,
    Segment,
    Triangle,
    Tetrahedron,
}

impl SimplexKind {
    /// Number of points.
    pub const fn arity(self) -> usize {
        match self {
            SimplexKind::Point => 1,
            SimplexKind::Segment => 2,
            SimplexKind::Triangle => 3,
            SimplexKind::Tetrahedron => 4,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            SimplexKind::Point => "point",
            SimplexKind::Segment => "segment",
            SimplexKind::Triangle => "triangle",
            SimplexKind::Tetrahedron => "tetrahedron",
        }
    }

    pub const fn from_arity(n: usize) -> Option<Self> {
        match n {
            1 => Some(SimplexKind::Point),
            2 => Some(SimplexKind::Segment),
            3 => Some(SimplexKind::Triangle),
            4 => Some(SimplexKind::Tetrahedron),
            _ => None,
        }
    }
}

/// A point, segment, triangle or tetrahedron.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Simplex {
    Point([Point3; 1]),
    Segment([Point3; 2]),
    Triangle([Point3; 3]),
    Tetrahedron([Point3; 4]),
}

impl Simplex {
    /// Build the simplex whose kind matches `points.len()`.
    pub fn from_points(points: &[Point3]) -> Option<Self> {
        Some(match *points {
            [a] => Simplex::Point([a]),
            [a, b] => Simplex::Segment([a, b]),
            [a, b, c] => Simplex::Triangle([a, b, c]),
            [a, b, c, d] => Simplex::Tetrahedron([a, b, c, d]),
            _ => return None,
        })
    }

    pub fn kind(&self) -> SimplexKind {
        match self {
            Simplex::Point(_) => SimplexKind::Point,
            Simplex::Segment(_) => SimplexKind::Segment,
            Simplex::Triangle(_) => SimplexKind::Triangle,
            Simplex::Tetrahedron(_) => SimplexKind::Tetrahedron,
        }
    }

    pub fn points(&self) -> &[Point3] {
        match self {
            Simplex::Point(p) => p,
            Simplex::Segment(p) => p,
            Simplex::Triangle(p) => p,
            Simplex::Tetrahedron(p) => p,
        }
    }

    pub fn bounding_box(&self) -> Option<Aabb> {
        Aabb::from_points(self.points())
    }

    /// The points of the facet opposite point `i`, in order.
    pub fn facet(&self, i: usize) -> SmallVec<[Point3; 3]> {
        self.points()
            .iter()
            .enumerate()
            .filter(|&(j, _)| j != i)
            .map(|(_, p)| *p)
            .collect()
    }

    /// All point pairs, as index pairs.
    pub fn edge_indices(&self) -> SmallVec<[(usize, usize); 6]> {
        let n = self.points().len();
        let mut out = SmallVec::new();
        for i in 0..n {
            for j in (i + 1)..n {
                out.push((i, j));
            }
        }
        out
    }

    pub fn edge_vectors(&self) -> SmallVec<[Vector3; 6]> {
        let p = self.points();
        self.edge_indices()
            .into_iter()
            .map(|(i, j)| p[j] - p[i])
            .collect()
    }

    /// Outward-agnostic normals of the 2-faces (triangle: 1, tetrahedron: 4).
    pub fn face_normals(&self) -> SmallVec<[Vector3; 4]> {
        let tri = |a: &Point3, b: &Point3, c: &Point3| (*b - *a).cross(&(*c - *a));
        match self {
            Simplex::Triangle([a, b, c]) => SmallVec::from_slice(&[tri(a, b, c)]),
            Simplex::Tetrahedron([a, b, c, d]) => {
                SmallVec::from_slice(&[tri(b, c, d), tri(a, c, d), tri(a, b, d), tri(a, b, c)])
            }
            _ => SmallVec::new(),
        }
    }

    /// Length, area or volume depending on the kind (0 for a point).
    pub fn measure(&self) -> f64 {
        match self {
            Simplex::Point(_) => 0.0,
            Simplex::Segment([a, b]) => a.distance_to(b),
            Simplex::Triangle([a, b, c]) => 0.5 * (*b - *a).cross(&(*c - *a)).norm(),
            Simplex::Tetrahedron([a, b, c, d]) => {
                ((*b - *a).cross(&(*c - *a)).dot(&(*d - *a)) / 6.0).abs()
            }
        }
    }

    /// Collapsed under the tolerance: two coinciding points, or zero
    /// length/area/volume for the kind.
    pub fn is_degenerate(&self, tol: &Tolerance) -> bool {
        let p = self.points();
        if p.iter().any(|q| !q.is_finite()) {
            return true;
        }
        for i in 0..p.len() {
            for j in (i + 1)..p.len() {
                if crate::geometry::equivalence::points_eq(&p[i], &p[j], tol) {
                    return true;
                }
            }
        }
        match self.kind() {
            SimplexKind::Point => false,
            SimplexKind::Segment => tol.is_zero(self.measure(), Dimension::Length),
            SimplexKind::Triangle => tol.is_zero(self.measure(), Dimension::Area),
            SimplexKind::Tetrahedron => tol.is_zero(self.measure(), Dimension::Volume),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    #[test]
    fn facets_drop_the_opposite_point() {
        let t = Simplex::from_points(&[p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(0.0, 1.0, 0.0)]).unwrap();
        assert_eq!(t.kind(), SimplexKind::Triangle);
        assert_eq!(t.facet(0).as_slice(), &[p(1.0, 0.0, 0.0), p(0.0, 1.0, 0.0)]);
        assert_eq!(t.facet(2).as_slice(), &[p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0)]);
        assert_eq!(t.edge_indices().len(), 3);
    }

    #[test]
    fn measures() {
        let tet = Simplex::from_points(&[
            p(0.0, 0.0, 0.0),
            p(1.0, 0.0, 0.0),
            p(0.0, 1.0, 0.0),
            p(0.0, 0.0, 1.0),
        ])
        .unwrap();
        assert!((tet.measure() - 1.0 / 6.0).abs() < 1e-12);
        assert_eq!(tet.face_normals().len(), 4);
        assert!(Simplex::from_points(&[]).is_none());
    }

    #[test]
    fn degeneracy_uses_tolerance() {
        let tol = Tolerance::new(1e-6).unwrap();
        let collinear =
            Simplex::from_points(&[p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(2.0, 0.0, 0.0)]).unwrap();
        assert!(collinear.is_degenerate(&tol));
        let short = Simplex::from_points(&[p(0.0, 0.0, 0.0), p(0.0, 0.0, 1e-7)]).unwrap();
        assert!(short.is_degenerate(&tol));
        let fine = Simplex::from_points(&[p(0.0, 0.0, 0.0), p(0.0, 0.0, 1.0)]).unwrap();
        assert!(!fine.is_degenerate(&tol));
    }
}
