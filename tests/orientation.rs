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

use spatial3d::{
    Aabb, Line3, Plane, Point3, Simplex, Tolerance, Vector3,
    kernel::{
        Orientation, orient3d,
        predicates::{simplex_intersects_aabb, simplex_intersects_line, simplex_intersects_plane},
    },
};

#[test]
fn orientation_flips_with_side() {
    let a = Point3::new(0.0, 0.0, 0.0);
    let b = Point3::new(1.0, 0.0, 0.0);
    let c = Point3::new(0.0, 1.0, 0.0);
    let above = Point3::new(0.0, 0.0, 1.0);
    let below = Point3::new(0.0, 0.0, -1.0);

    let up = orient3d(&a, &b, &c, &above);
    let down = orient3d(&a, &b, &c, &below);
    assert_ne!(up, Orientation::Zero);
    assert_ne!(up, down);
    // Swapping two plane points reverses the sign.
    assert_eq!(orient3d(&b, &a, &c, &above), down);
}

#[test]
fn orientation_is_exact_for_tiny_offsets() {
    let a = Point3::new(0.1, 0.2, 0.3);
    let b = Point3::new(1.1, 0.7, 0.3);
    let c = Point3::new(0.4, 1.9, 0.3);
    let on = Point3::new(0.55, 0.8, 0.3);
    let nudged = Point3::new(0.55, 0.8, 0.3 + f64::EPSILON);
    assert_eq!(orient3d(&a, &b, &c, &on), Orientation::Zero);
    assert_ne!(orient3d(&a, &b, &c, &nudged), Orientation::Zero);
    assert_eq!(
        orient3d(&a, &b, &c, &nudged),
        orient3d(&a, &b, &c, &Point3::new(0.55, 0.8, 10.0))
    );
}

#[test]
fn tetrahedron_predicates() {
    let tol = Tolerance::default();
    let tet = Simplex::Tetrahedron([
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(2.0, 0.0, 0.0),
        Point3::new(0.0, 2.0, 0.0),
        Point3::new(0.0, 0.0, 2.0),
    ]);

    let mid = Plane::from_point_normal(&Point3::new(0.0, 0.0, 1.0), Vector3::Z).unwrap();
    let beyond = Plane::from_point_normal(&Point3::new(0.0, 0.0, 2.5), Vector3::Z).unwrap();
    assert!(simplex_intersects_plane(&tet, &mid, &tol));
    assert!(!simplex_intersects_plane(&tet, &beyond, &tol));

    let piercing = Line3::new(Point3::new(0.3, 0.3, 5.0), Vector3::new(0.0, 0.0, -1.0)).unwrap();
    let missing = Line3::new(Point3::new(1.5, 1.5, 5.0), Vector3::new(0.0, 0.0, -1.0)).unwrap();
    assert!(simplex_intersects_line(&tet, &piercing, &tol));
    assert!(!simplex_intersects_line(&tet, &missing, &tol));

    let inner = Aabb::new(Point3::new(0.1, 0.1, 0.1), Point3::new(0.2, 0.2, 0.2)).unwrap();
    let outer_corner = Aabb::new(Point3::new(1.5, 1.5, 1.5), Point3::new(2.0, 2.0, 2.0)).unwrap();
    assert!(simplex_intersects_aabb(&tet, &inner, &tol));
    assert!(!simplex_intersects_aabb(&tet, &outer_corner, &tol));
}

#[test]
fn touching_counts_within_tolerance() {
    let tol = Tolerance::new(1e-4).unwrap();
    let tri = Simplex::Triangle([
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(1.0, 0.0, 0.0),
        Point3::new(0.0, 1.0, 0.0),
    ]);
    // Plane a hair above the triangle, inside the length tolerance.
    let hover = Plane::from_point_normal(&Point3::new(0.0, 0.0, 5e-4), Vector3::Z).unwrap();
    assert!(simplex_intersects_plane(&tri, &hover, &tol));
    let box_above = Aabb::new(Point3::new(0.1, 0.1, 5e-4), Point3::new(0.2, 0.2, 1.0)).unwrap();
    assert!(simplex_intersects_aabb(&tri, &box_above, &tol));
    let box_far = Aabb::new(Point3::new(0.1, 0.1, 0.01), Point3::new(0.2, 0.2, 1.0)).unwrap();
    assert!(!simplex_intersects_aabb(&tri, &box_far, &tol));
}
