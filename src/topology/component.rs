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

use std::collections::BTreeMap;

use ahash::AHashMap;

use crate::{
    config::SamConfig,
    error::Result,
    geometry::{aabb::Aabb, line::Line3, plane::Plane, point::Point3},
    kernel::predicates::{
        aabb_intersects_line, aabb_intersects_plane, simplex_intersects_aabb,
        simplex_intersects_line, simplex_intersects_plane,
    },
    numeric::tolerance::Tolerance,
    sam::{Neighbour, Sam},
    topology::{
        element::{ComponentId, Element, ElementId, ElementKind},
        registry::{SubSimplices, VertexId, VertexIds},
    },
};

/// Connected group of elements of one kind.
///
/// Owns a SAM over its element boxes and the reference-counted sub-simplex
/// registry behind the typed counters and the Euler number. Connectivity is
/// maintained by the owning [`Net`](crate::topology::net::Net); a component on
/// its own only keeps its bookkeeping consistent with its element set.
#[derive(Debug, Clone)]
pub struct Component {
    id: ComponentId,
    kind: ElementKind,
    tolerance: Tolerance,
    elements: BTreeMap<ElementId, Element>,
    element_vertices: AHashMap<ElementId, VertexIds>,
    sub: SubSimplices,
    sam: Sam<ElementId>,
}

impl Component {
    pub(crate) fn new(id: ComponentId, kind: ElementKind, tolerance: Tolerance, sam: SamConfig) -> Self {
        Component {
            id,
            kind,
            tolerance,
            elements: BTreeMap::new(),
            element_vertices: AHashMap::default(),
            sub: SubSimplices::new(tolerance),
            sam: Sam::with_checked_config(tolerance, sam),
        }
    }

    pub fn id(&self) -> ComponentId {
        self.id
    }

    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    pub fn tolerance(&self) -> &Tolerance {
        &self.tolerance
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn count_elements(&self) -> usize {
        self.elements.len()
    }

    pub fn count_vertices(&self) -> usize {
        self.sub.count_vertices()
    }

    pub fn count_edges(&self) -> usize {
        self.sub.count_edges()
    }

    pub fn count_faces(&self) -> usize {
        self.sub.count_faces()
    }

    pub fn count_solids(&self) -> usize {
        self.sub.count_solids()
    }

    /// V - E + F, minus S for solid components. Zero when empty.
    pub fn get_euler(&self) -> i64 {
        self.sub.euler()
    }

    pub fn get_element(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(&id)
    }

    pub fn contains_element(&self, id: ElementId) -> bool {
        self.elements.contains_key(&id)
    }

    /// Elements in id order.
    pub fn elements(&self) -> impl Iterator<Item = &Element> + '_ {
        self.elements.values()
    }

    pub fn element_ids(&self) -> impl Iterator<Item = ElementId> + '_ {
        self.elements.keys().copied()
    }

    /// Distinct vertices after tolerance merging, in id order.
    pub fn vertices(&self) -> impl Iterator<Item = (VertexId, &Point3)> + '_ {
        self.sub.vertices()
    }

    /// Distinct edges as sorted vertex-id pairs, in key order.
    pub fn edges(&self) -> impl Iterator<Item = [VertexId; 2]> + '_ {
        self.sub.edges()
    }

    pub fn faces(&self) -> impl Iterator<Item = [VertexId; 3]> + '_ {
        self.sub.faces()
    }

    /// Empty unless the component holds solids.
    pub fn solids(&self) -> impl Iterator<Item = [VertexId; 4]> + '_ {
        self.sub.solids()
    }

    pub fn sam(&self) -> &Sam<ElementId> {
        &self.sam
    }

    pub fn bounding_box(&self) -> Option<Aabb> {
        self.sam.bounding_box()
    }

    /// Elements with at least one free neighbour slot.
    pub fn boundary_elements(&self) -> impl Iterator<Item = &Element> + '_ {
        self.elements.values().filter(|e| !e.is_interior())
    }

    /// The `k` elements whose boxes are nearest to `p`; equal distances are
    /// ordered by element id.
    pub fn nearest(&self, k: usize, p: &Point3) -> Vec<Neighbour<ElementId>> {
        if k == 0 {
            return Vec::new();
        }
        let mut want = k;
        let mut hits = self.sam.nearest(want, p);
        // Widen until every entry tied with the k-th distance is in.
        while hits.len() == want && hits[want - 1].distance <= hits[k - 1].distance {
            want *= 2;
            hits = self.sam.nearest(want, p);
        }
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance).then_with(|| a.key.cmp(&b.key)));
        hits.truncate(k);
        hits
    }

    pub fn intersects_plane(&self, plane: &Plane) -> bool {
        let tol = self.tolerance;
        self.sam.any_with(
            |b| aabb_intersects_plane(b, plane, &tol),
            |id, _| {
                self.elements
                    .get(id)
                    .is_some_and(|e| simplex_intersects_plane(e.simplex(), plane, &tol))
            },
        )
    }

    pub fn intersects_line(&self, line: &Line3) -> bool {
        let tol = self.tolerance;
        self.sam.any_with(
            |b| aabb_intersects_line(b, line, &tol),
            |id, b| {
                aabb_intersects_line(b, line, &tol)
                    && self
                        .elements
                        .get(id)
                        .is_some_and(|e| simplex_intersects_line(e.simplex(), line, &tol))
            },
        )
    }

    pub fn intersects_box(&self, query: &Aabb) -> bool {
        let tol = self.tolerance;
        self.sam.any_with(
            |b| b.intersects(query, &tol),
            |id, b| {
                b.intersects(query, &tol)
                    && self
                        .elements
                        .get(id)
                        .is_some_and(|e| simplex_intersects_aabb(e.simplex(), query, &tol))
            },
        )
    }

    // ─── Mutation (driven by the net) ────────────────────────────────────────

    /// Take ownership of `element`: index its box and register its
    /// sub-simplices.
    pub(crate) fn insert(&mut self, mut element: Element) -> Result<()> {
        self.sam.insert(element.id(), element.bounding_box())?;
        let ids = self.sub.register(self.kind, element.points());
        element.set_component(self.id);
        self.element_vertices.insert(element.id(), ids);
        self.elements.insert(element.id(), element);
        Ok(())
    }

    /// Reverse of [`Component::insert`]. Neighbour links are left as they are.
    pub(crate) fn remove(&mut self, id: ElementId) -> Option<Element> {
        let element = self.elements.remove(&id)?;
        let indexed = self.sam.remove(&id);
        debug_assert!(indexed.is_ok(), "element {id} missing from the component index");
        if let Some(ids) = self.element_vertices.remove(&id) {
            self.sub.release(self.kind, &ids);
        }
        Some(element)
    }

    pub(crate) fn element_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.elements.get_mut(&id)
    }

    /// Move every element out, leaving the component empty.
    pub(crate) fn drain(&mut self) -> Vec<Element> {
        let ids: Vec<ElementId> = self.elements.keys().copied().collect();
        ids.into_iter().filter_map(|id| self.remove(id)).collect()
    }

    /// Counters and Euler number rebuilt from the element set.
    pub(crate) fn recount(&self) -> (usize, usize, usize, usize, i64) {
        let mut fresh = SubSimplices::new(self.tolerance);
        for e in self.elements.values() {
            fresh.register(self.kind, e.points());
        }
        (
            fresh.count_vertices(),
            fresh.count_edges(),
            fresh.count_faces(),
            fresh.count_solids(),
            fresh.euler(),
        )
    }
}
