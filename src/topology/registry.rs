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

//! Reference-counted sub-simplices of a component.
//!
//! Every element contributes its vertices, edges, triangles and (for solid
//! nets) itself. Vertices are merged under the coordinate tolerance through a
//! spatial hash whose cell edge is the tolerance, so a match can only sit in
//! one of the 27 cells around the probe. Higher sub-simplices are keyed by
//! their sorted vertex ids. A key seen for the first time bumps its counter
//! and the Euler number; releasing its last reference undoes both.

use std::collections::BTreeMap;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::{
    geometry::{
        equivalence::{points_eq, quantise_point},
        point::Point3,
    },
    numeric::tolerance::Tolerance,
    topology::element::ElementKind,
};

/// Component-local vertex identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VertexId(pub u64);

pub(crate) type VertexIds = SmallVec<[VertexId; 4]>;

#[derive(Debug, Clone)]
struct VertexRecord {
    point: Point3,
    refs: usize,
}

#[derive(Debug, Clone)]
pub(crate) struct SubSimplices {
    tolerance: Tolerance,
    cell_factor: f64,
    cells: AHashMap<[i64; 3], SmallVec<[VertexId; 2]>>,
    vertices: BTreeMap<VertexId, VertexRecord>,
    edges: BTreeMap<[VertexId; 2], usize>,
    faces: BTreeMap<[VertexId; 3], usize>,
    solids: BTreeMap<[VertexId; 4], usize>,
    next_vertex: u64,
    euler: i64,
}

impl SubSimplices {
    pub fn new(tolerance: Tolerance) -> Self {
        SubSimplices {
            tolerance,
            cell_factor: tolerance.rounding_factor(),
            cells: AHashMap::default(),
            vertices: BTreeMap::new(),
            edges: BTreeMap::new(),
            faces: BTreeMap::new(),
            solids: BTreeMap::new(),
            next_vertex: 0,
            euler: 0,
        }
    }

    pub fn count_vertices(&self) -> usize {
        self.vertices.len()
    }

    pub fn count_edges(&self) -> usize {
        self.edges.len()
    }

    pub fn count_faces(&self) -> usize {
        self.faces.len()
    }

    pub fn count_solids(&self) -> usize {
        self.solids.len()
    }

    pub fn euler(&self) -> i64 {
        self.euler
    }

    pub fn vertices(&self) -> impl Iterator<Item = (VertexId, &Point3)> + '_ {
        self.vertices.iter().map(|(id, v)| (*id, &v.point))
    }

    /// Edge keys in lexicographic order of their sorted vertex ids.
    pub fn edges(&self) -> impl Iterator<Item = [VertexId; 2]> + '_ {
        self.edges.keys().copied()
    }

    pub fn faces(&self) -> impl Iterator<Item = [VertexId; 3]> + '_ {
        self.faces.keys().copied()
    }

    pub fn solids(&self) -> impl Iterator<Item = [VertexId; 4]> + '_ {
        self.solids.keys().copied()
    }

    /// Add one reference to every sub-simplex of an element; returns the
    /// resolved vertex ids in point order.
    pub fn register(&mut self, kind: ElementKind, points: &[Point3]) -> VertexIds {
        let ids: VertexIds = points.iter().map(|p| self.acquire_vertex(p)).collect();
        for_each_key(kind, &ids, |key| match key {
            Key::Edge(k) => bump(&mut self.edges, k, &mut self.euler, -1),
            Key::Face(k) => bump(&mut self.faces, k, &mut self.euler, 1),
            Key::Solid(k) => bump(&mut self.solids, k, &mut self.euler, -1),
        });
        ids
    }

    /// Drop the references taken by [`SubSimplices::register`].
    pub fn release(&mut self, kind: ElementKind, ids: &[VertexId]) {
        for_each_key(kind, ids, |key| match key {
            Key::Edge(k) => drop_ref(&mut self.edges, k, &mut self.euler, -1),
            Key::Face(k) => drop_ref(&mut self.faces, k, &mut self.euler, 1),
            Key::Solid(k) => drop_ref(&mut self.solids, k, &mut self.euler, -1),
        });
        for id in ids {
            self.release_vertex(*id);
        }
    }

    fn acquire_vertex(&mut self, p: &Point3) -> VertexId {
        if let Some(id) = self.find_vertex(p) {
            if let Some(v) = self.vertices.get_mut(&id) {
                v.refs += 1;
            }
            return id;
        }
        let id = VertexId(self.next_vertex);
        self.next_vertex += 1;
        self.vertices.insert(id, VertexRecord { point: *p, refs: 1 });
        let cell = self.cell_of(p);
        self.cells.entry(cell).or_default().push(id);
        self.euler += 1;
        id
    }

    fn release_vertex(&mut self, id: VertexId) {
        let Some(v) = self.vertices.get_mut(&id) else {
            return;
        };
        v.refs -= 1;
        if v.refs > 0 {
            return;
        }
        let point = v.point;
        self.vertices.remove(&id);
        let cell = self.cell_of(&point);
        if let Some(bucket) = self.cells.get_mut(&cell) {
            bucket.retain(|v| *v != id);
            if bucket.is_empty() {
                self.cells.remove(&cell);
            }
        }
        self.euler -= 1;
    }

    /// Lowest-id vertex within tolerance of `p`.
    fn find_vertex(&self, p: &Point3) -> Option<VertexId> {
        let [cx, cy, cz] = self.cell_of(p);
        let mut best: Option<VertexId> = None;
        for dx in -1..=1i64 {
            for dy in -1..=1i64 {
                for dz in -1..=1i64 {
                    let key = [
                        cx.wrapping_add(dx),
                        cy.wrapping_add(dy),
                        cz.wrapping_add(dz),
                    ];
                    let Some(bucket) = self.cells.get(&key) else {
                        continue;
                    };
                    for id in bucket {
                        let hit = self
                            .vertices
                            .get(id)
                            .is_some_and(|v| points_eq(&v.point, p, &self.tolerance));
                        if hit && best.is_none_or(|b| *id < b) {
                            best = Some(*id);
                        }
                    }
                }
            }
        }
        best
    }

    fn cell_of(&self, p: &Point3) -> [i64; 3] {
        quantise_point(p, self.cell_factor)
    }
}

enum Key {
    Edge([VertexId; 2]),
    Face([VertexId; 3]),
    Solid([VertexId; 4]),
}

/// Visit the sorted keys of the edges, triangles and (solid kind) tetrahedron
/// spanned by `ids`. Keys that collapse onto a repeated vertex are skipped.
fn for_each_key(kind: ElementKind, ids: &[VertexId], mut visit: impl FnMut(Key)) {
    let n = ids.len();
    for i in 0..n {
        for j in (i + 1)..n {
            if let Some(k) = sorted([ids[i], ids[j]]) {
                visit(Key::Edge(k));
            }
        }
    }
    for i in 0..n {
        for j in (i + 1)..n {
            for k in (j + 1)..n {
                if let Some(key) = sorted([ids[i], ids[j], ids[k]]) {
                    visit(Key::Face(key));
                }
            }
        }
    }
    if kind == ElementKind::Solid {
        if let [a, b, c, d] = *ids {
            if let Some(key) = sorted([a, b, c, d]) {
                visit(Key::Solid(key));
            }
        }
    }
}

fn sorted<const N: usize>(mut ids: [VertexId; N]) -> Option<[VertexId; N]> {
    ids.sort_unstable();
    ids.windows(2).all(|w| w[0] != w[1]).then_some(ids)
}

fn bump<const N: usize>(
    map: &mut BTreeMap<[VertexId; N], usize>,
    key: [VertexId; N],
    euler: &mut i64,
    sign: i64,
) {
    let refs = map.entry(key).or_insert(0);
    if *refs == 0 {
        *euler += sign;
    }
    *refs += 1;
}

fn drop_ref<const N: usize>(
    map: &mut BTreeMap<[VertexId; N], usize>,
    key: [VertexId; N],
    euler: &mut i64,
    sign: i64,
) {
    if let Some(refs) = map.get_mut(&key) {
        *refs -= 1;
        if *refs == 0 {
            map.remove(&key);
            *euler -= sign;
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
    fn shared_edge_is_counted_once() {
        let mut reg = SubSimplices::new(Tolerance::default());
        let a = reg.register(ElementKind::Face, &[p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(0.0, 1.0, 0.0)]);
        assert_eq!(reg.euler(), 1);
        let b = reg.register(ElementKind::Face, &[p(1.0, 0.0, 0.0), p(0.0, 1.0, 0.0), p(1.0, 1.0, 0.0)]);
        assert_eq!((reg.count_vertices(), reg.count_edges(), reg.count_faces()), (4, 5, 2));
        assert_eq!(reg.euler(), 1);

        reg.release(ElementKind::Face, &b);
        assert_eq!((reg.count_vertices(), reg.count_edges(), reg.count_faces()), (3, 3, 1));
        reg.release(ElementKind::Face, &a);
        assert_eq!(reg.count_vertices(), 0);
        assert_eq!(reg.euler(), 0);
    }

    #[test]
    fn vertices_merge_within_tolerance() {
        let tol = Tolerance::new(1e-3).unwrap();
        let mut reg = SubSimplices::new(tol);
        let a = reg.register(ElementKind::Edge, &[p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0)]);
        // Straddles a cell boundary but stays within tolerance.
        let b = reg.register(ElementKind::Edge, &[p(1.0009, 0.0, 0.0), p(2.0, 0.0, 0.0)]);
        assert_eq!(a[1], b[0]);
        assert_eq!(reg.count_vertices(), 3);
        assert_eq!(reg.count_edges(), 2);
        assert_eq!(reg.euler(), 1);
    }

    #[test]
    fn solid_counts_itself() {
        let mut reg = SubSimplices::new(Tolerance::default());
        reg.register(
            ElementKind::Solid,
            &[p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(0.0, 1.0, 0.0), p(0.0, 0.0, 1.0)],
        );
        assert_eq!(
            (reg.count_vertices(), reg.count_edges(), reg.count_faces(), reg.count_solids()),
            (4, 6, 4, 1)
        );
        assert_eq!(reg.euler(), 1);
    }

    #[test]
    fn sub_simplices_iterate_in_key_order() {
        let mut reg = SubSimplices::new(Tolerance::default());
        reg.register(ElementKind::Face, &[p(1.0, 1.0, 0.0), p(0.0, 1.0, 0.0), p(1.0, 0.0, 0.0)]);
        reg.register(ElementKind::Face, &[p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(0.0, 1.0, 0.0)]);
        let v = VertexId;
        // Vertex ids follow first appearance: (1,1)=0, (0,1)=1, (1,0)=2, (0,0)=3.
        let edges: Vec<_> = reg.edges().collect();
        assert_eq!(edges, vec![[v(0), v(1)], [v(0), v(2)], [v(1), v(2)], [v(1), v(3)], [v(2), v(3)]]);
        let faces: Vec<_> = reg.faces().collect();
        assert_eq!(faces, vec![[v(0), v(1), v(2)], [v(1), v(2), v(3)]]);
        assert_eq!(reg.solids().count(), 0);
    }
}
