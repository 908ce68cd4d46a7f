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

//! Intersection predicates between simplices and planes, lines and boxes.
//! All tests are inclusive under the length tolerance.

use smallvec::SmallVec;

use crate::{
    geometry::{
        aabb::Aabb, line::Line3, plane::Plane, point::Point3, simplex::Simplex, vector::Vector3,
    },
    kernel::orientation::{Orientation, orient3d},
    numeric::tolerance::Tolerance,
};

pub fn aabb_intersects_plane(b: &Aabb, plane: &Plane, tol: &Tolerance) -> bool {
    let n = plane.normal();
    let h = b.half_extents();
    let radius = h.x * n.x.abs() + h.y * n.y.abs() + h.z * n.z.abs();
    plane.signed_distance(&b.centre()).abs() <= radius + tol.length()
}

/// Slab test of an infinite line against a box grown by the length tolerance.
pub fn aabb_intersects_line(b: &Aabb, line: &Line3, tol: &Tolerance) -> bool {
    let grown = b.expanded(tol.length());
    let o = line.origin();
    let d = line.direction();
    let mut t_min = f64::NEG_INFINITY;
    let mut t_max = f64::INFINITY;
    for i in 0..3 {
        if d[i].abs() < f64::EPSILON {
            if o[i] < grown.min()[i] || o[i] > grown.max()[i] {
                return false;
            }
            continue;
        }
        let inv = 1.0 / d[i];
        let mut t0 = (grown.min()[i] - o[i]) * inv;
        let mut t1 = (grown.max()[i] - o[i]) * inv;
        if t0 > t1 {
            std::mem::swap(&mut t0, &mut t1);
        }
        t_min = t_min.max(t0);
        t_max = t_max.min(t1);
        if t_min > t_max {
            return false;
        }
    }
    true
}

/// Some point of the simplex lies on the plane (the points do not all lie
/// strictly on one side).
pub fn simplex_intersects_plane(s: &Simplex, plane: &Plane, tol: &Tolerance) -> bool {
    let eps = tol.length();
    let (lo, hi) = s
        .points()
        .iter()
        .map(|p| plane.signed_distance(p))
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), d| {
            (lo.min(d), hi.max(d))
        });
    lo <= eps && hi >= -eps
}

pub fn triangle_intersects_line(
    a: &Point3,
    b: &Point3,
    c: &Point3,
    line: &Line3,
    tol: &Tolerance,
) -> bool {
    let p = *line.origin();
    let q = line.point_at(1.0);
    let s = [orient3d(&p, &q, a, b), orient3d(&p, &q, b, c), orient3d(&p, &q, c, a)];
    let has_pos = s.contains(&Orientation::Positive);
    let has_neg = s.contains(&Orientation::Negative);
    let all_zero = s.iter().all(|o| *o == Orientation::Zero);
    if !all_zero && !(has_pos && has_neg) {
        return true;
    }
    // Coplanar line, or a near miss that the tolerance still accepts.
    let eps = tol.length();
    line.distance_to_segment(a, b) <= eps
        || line.distance_to_segment(b, c) <= eps
        || line.distance_to_segment(c, a) <= eps
}

pub fn simplex_intersects_line(s: &Simplex, line: &Line3, tol: &Tolerance) -> bool {
    match s {
        Simplex::Point([p]) => line.distance_to_point(p) <= tol.length(),
        Simplex::Segment([a, b]) => line.distance_to_segment(a, b) <= tol.length(),
        Simplex::Triangle([a, b, c]) => triangle_intersects_line(a, b, c, line, tol),
        // A line meeting a tetrahedron crosses its boundary.
        Simplex::Tetrahedron([a, b, c, d]) => {
            triangle_intersects_line(b, c, d, line, tol)
                || triangle_intersects_line(a, c, d, line, tol)
                || triangle_intersects_line(a, b, d, line, tol)
                || triangle_intersects_line(a, b, c, line, tol)
        }
    }
}

/// Separating-axis test between the convex hull of the simplex and the box.
/// Candidate axes: box face normals, simplex face normals and the cross
/// products of simplex edges with the box axes.
pub fn simplex_intersects_aabb(s: &Simplex, b: &Aabb, tol: &Tolerance) -> bool {
    let eps = tol.length();
    let centre = b.centre();
    let h = b.half_extents();
    let pts = s.points();

    let mut axes: SmallVec<[Vector3; 32]> = SmallVec::new();
    axes.extend([Vector3::X, Vector3::Y, Vector3::Z]);
    axes.extend(s.face_normals());
    for e in s.edge_vectors() {
        for unit in [Vector3::X, Vector3::Y, Vector3::Z] {
            axes.push(e.cross(&unit));
        }
    }

    for axis in axes {
        let len = axis.norm();
        if len <= f64::EPSILON {
            continue;
        }
        let c = axis.dot(&centre.as_vector());
        let r = h.x * axis.x.abs() + h.y * axis.y.abs() + h.z * axis.z.abs();
        let (lo, hi) = pts
            .iter()
            .map(|p| axis.dot(&p.as_vector()))
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(v), hi.max(v))
            });
        let slack = eps * len;
        if lo > c + r + slack || hi < c - r - slack {
            return false;
        }
    }
    true
}
