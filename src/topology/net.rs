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

use std::collections::{BTreeMap, VecDeque};

use ahash::{AHashMap, AHashSet};
use smallvec::SmallVec;
use tracing::{debug, instrument, trace};

use crate::{
    config::{SamConfig, SpaceConfig},
    error::{Error, Result},
    geometry::{
        aabb::Aabb,
        equivalence::{Equivalence, multisets_eq},
        line::Line3,
        plane::Plane,
        point::Point3,
        simplex::Simplex,
    },
    numeric::tolerance::Tolerance,
    sam::Neighbour,
    topology::{
        component::Component,
        element::{ComponentId, Element, ElementId, ElementKind},
    },
};

/// A facet match found while inserting: `slot` of the new element faces
/// `neighbour_slot` of `neighbour`.
#[derive(Debug, Clone, Copy)]
struct Link {
    slot: usize,
    neighbour: ElementId,
    neighbour_slot: usize,
    component: ComponentId,
}

/// The mesh of one spatial object: elements of a single kind partitioned into
/// connected components.
///
/// Two elements share a component exactly when a chain of neighbour links
/// joins them. Insertion merges the components it bridges; removal splits the
/// component it disconnects. Both happen eagerly, so every accessor sees a
/// settled partition.
#[derive(Debug, Clone)]
pub struct Net {
    kind: ElementKind,
    tolerance: Tolerance,
    sam_config: SamConfig,
    components: BTreeMap<ComponentId, Component>,
    element_index: AHashMap<ElementId, ComponentId>,
    next_element: u64,
    next_component: u64,
}

impl Net {
    pub fn new(kind: ElementKind, tolerance: Tolerance) -> Self {
        Net {
            kind,
            tolerance,
            sam_config: SamConfig::default(),
            components: BTreeMap::new(),
            element_index: AHashMap::default(),
            next_element: 0,
            next_component: 0,
        }
    }

    pub fn with_config(kind: ElementKind, config: &SpaceConfig) -> Result<Self> {
        config.validate()?;
        let mut net = Net::new(kind, config.build_tolerance()?);
        net.sam_config = config.sam;
        Ok(net)
    }

    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    pub fn tolerance(&self) -> &Tolerance {
        &self.tolerance
    }

    pub fn count_components(&self) -> usize {
        self.components.len()
    }

    pub fn count_elements(&self) -> usize {
        self.element_index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.element_index.is_empty()
    }

    pub fn component(&self, id: ComponentId) -> Option<&Component> {
        self.components.get(&id)
    }

    /// Components in id order.
    pub fn components(&self) -> impl Iterator<Item = &Component> + '_ {
        self.components.values()
    }

    pub fn component_of(&self, element: ElementId) -> Option<ComponentId> {
        self.element_index.get(&element).copied()
    }

    pub fn element(&self, id: ElementId) -> Option<&Element> {
        let component = self.element_index.get(&id)?;
        self.components.get(component)?.get_element(id)
    }

    /// Every element, grouped by component.
    pub fn elements(&self) -> impl Iterator<Item = &Element> + '_ {
        self.components.values().flat_map(Component::elements)
    }

    pub fn bounding_box(&self) -> Option<Aabb> {
        self.components
            .values()
            .filter_map(Component::bounding_box)
            .reduce(|a, b| a.union(&b))
    }

    /// Sum of the component Euler numbers.
    pub fn euler(&self) -> i64 {
        self.components.values().map(Component::get_euler).sum()
    }

    /// The `k` elements nearest to `p` over all components; equal distances
    /// are ordered by element id.
    pub fn nearest(&self, k: usize, p: &Point3) -> Vec<Neighbour<ElementId>> {
        let mut hits: Vec<Neighbour<ElementId>> = self
            .components
            .values()
            .flat_map(|c| c.nearest(k, p))
            .collect();
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance).then_with(|| a.key.cmp(&b.key)));
        hits.truncate(k);
        hits
    }

    pub fn intersects_plane(&self, plane: &Plane) -> bool {
        trace!(?plane, "net intersects plane");
        self.components.values().any(|c| c.intersects_plane(plane))
    }

    pub fn intersects_line(&self, line: &Line3) -> bool {
        trace!(?line, "net intersects line");
        self.components.values().any(|c| c.intersects_line(line))
    }

    pub fn intersects_box(&self, query: &Aabb) -> bool {
        trace!(?query, "net intersects box");
        self.components.values().any(|c| c.intersects_box(query))
    }

    // ─── Mutation ────────────────────────────────────────────────────────────

    /// Insert a new element and link it to every element sharing one of its
    /// facets. Nothing changes when an error is returned.
    #[instrument(skip(self))]
    pub fn add_element(&mut self, points: &[Point3]) -> Result<ElementId> {
        let kind = self.kind;
        if points.len() != kind.arity() {
            return Err(Error::ArityMismatch {
                kind: kind.name(),
                expected: kind.arity(),
                found: points.len(),
            });
        }
        let degenerate = || Error::DegenerateElement(format!("{} {points:?}", kind.name()));
        let simplex = Simplex::from_points(points).ok_or_else(degenerate)?;
        if simplex.is_degenerate(&self.tolerance) {
            return Err(degenerate());
        }
        let bbox = simplex.bounding_box().ok_or_else(degenerate)?;
        let links = self.find_links(&simplex, &bbox)?;

        let id = ElementId(self.next_element);
        self.next_element += 1;

        let mut touched: SmallVec<[ComponentId; 4]> = links.iter().map(|l| l.component).collect();
        touched.sort_unstable();
        touched.dedup();
        let (target, absorbed) = match touched.split_first() {
            Some((first, rest)) => (*first, rest),
            None => (self.allocate_component(), &[][..]),
        };

        let mut component = self
            .components
            .remove(&target)
            .unwrap_or_else(|| Component::new(target, kind, self.tolerance, self.sam_config));
        for other in absorbed {
            if let Some(mut source) = self.components.remove(other) {
                let moved = source.drain();
                debug!(into = %target, from = %other, moved = moved.len(), "components merged");
                for element in moved {
                    self.element_index.insert(element.id(), target);
                    component.insert(element)?;
                }
            }
        }

        let mut element = Element::new(id, kind, target, simplex);
        for link in &links {
            element.set_neighbour(link.slot, Some(link.neighbour));
        }
        component.insert(element)?;
        for link in &links {
            if let Some(n) = component.element_mut(link.neighbour) {
                n.set_neighbour(link.neighbour_slot, Some(id));
            }
        }
        self.components.insert(target, component);
        self.element_index.insert(id, target);
        debug!(element = %id, component = %target, links = links.len(), "element added");
        Ok(id)
    }

    /// Remove an element, clearing the links that point at it. A component
    /// left empty is dropped; one left disconnected is split, the part holding
    /// the lowest element id keeping the original component id.
    ///
    /// The returned element still lists the neighbours it had.
    #[instrument(skip(self))]
    pub fn remove_element(&mut self, id: ElementId) -> Result<Element> {
        let Some(&cid) = self.element_index.get(&id) else {
            return Err(Error::ElementNotFound(id.0));
        };
        let Some(mut component) = self.components.remove(&cid) else {
            return Err(Error::ElementNotFound(id.0));
        };
        let Some(element) = component.remove(id) else {
            self.components.insert(cid, component);
            return Err(Error::ElementNotFound(id.0));
        };
        self.element_index.remove(&id);

        let former = element.neighbours();
        for n in &former {
            if let Some(e) = component.element_mut(*n) {
                e.unlink(id);
            }
        }

        if component.is_empty() {
            debug!(element = %id, component = %cid, "last element removed, component dropped");
            return Ok(element);
        }
        if former.len() > 1 {
            let groups = connected_groups(&component);
            if groups.len() > 1 {
                self.split(component, groups)?;
                return Ok(element);
            }
        }
        self.components.insert(cid, component);
        debug!(element = %id, component = %cid, "element removed");
        Ok(element)
    }

    fn allocate_component(&mut self) -> ComponentId {
        let id = ComponentId(self.next_component);
        self.next_component += 1;
        id
    }

    /// Candidate neighbours come from the component SAMs; a candidate is a
    /// neighbour when one of its facets matches one of the new element's
    /// facets as a point multiset.
    fn find_links(&self, simplex: &Simplex, bbox: &Aabb) -> Result<SmallVec<[Link; 4]>> {
        let tol = self.tolerance;
        let mut candidates: Vec<&Element> = Vec::new();
        for component in self.components.values() {
            for id in component.sam().intersects(bbox) {
                if let Some(e) = component.get_element(id) {
                    if e.simplex().is_geometry_equivalent(simplex, &tol) {
                        return Err(Error::DuplicateElement(id.0));
                    }
                    candidates.push(e);
                }
            }
        }

        let slots = self.kind.slot_count();
        let facets: SmallVec<[_; 4]> = (0..slots).map(|s| simplex.facet(s)).collect();
        let mut links: SmallVec<[Link; 4]> = SmallVec::new();
        for other in candidates {
            for (other_slot, occupant) in other.slots().iter().enumerate() {
                let other_facet = other.simplex().facet(other_slot);
                for (slot, facet) in facets.iter().enumerate() {
                    if !multisets_eq(facet, &other_facet, &tol) {
                        continue;
                    }
                    if occupant.is_some() {
                        return Err(Error::NonManifold {
                            slot,
                            existing: other.id().0,
                        });
                    }
                    if let Some(prev) = links.iter().find(|l| l.slot == slot) {
                        return Err(Error::NonManifold {
                            slot,
                            existing: prev.neighbour.0,
                        });
                    }
                    links.push(Link {
                        slot,
                        neighbour: other.id(),
                        neighbour_slot: other_slot,
                        component: other.component(),
                    });
                }
            }
        }
        Ok(links)
    }

    /// Keep the first group in `component`, move every other group to a fresh
    /// component.
    fn split(&mut self, mut component: Component, groups: Vec<Vec<ElementId>>) -> Result<()> {
        let original = component.id();
        for group in groups.into_iter().skip(1) {
            let fresh_id = self.allocate_component();
            let mut fresh = Component::new(fresh_id, self.kind, self.tolerance, self.sam_config);
            for eid in &group {
                if let Some(element) = component.remove(*eid) {
                    self.element_index.insert(*eid, fresh_id);
                    fresh.insert(element)?;
                }
            }
            debug!(from = %original, into = %fresh_id, moved = group.len(), "component split");
            self.components.insert(fresh_id, fresh);
        }
        self.components.insert(original, component);
        Ok(())
    }

    // ─── Invariants ──────────────────────────────────────────────────────────

    /// Verify the partition and bookkeeping: index and components agree,
    /// links are symmetric and stay inside a component, each component is
    /// connected, and the cached counters match a recount. Meant for tests.
    pub fn check_invariants(&self) -> std::result::Result<(), String> {
        let mut seen = 0usize;
        for (cid, component) in &self.components {
            if component.id() != *cid {
                return Err(format!("component {cid} stored under the wrong id"));
            }
            if component.is_empty() {
                return Err(format!("empty component {cid} kept"));
            }
            component.sam().check_invariants()?;
            if component.sam().count() != component.count_elements() {
                return Err(format!("component {cid} SAM out of step"));
            }
            for e in component.elements() {
                seen += 1;
                if e.component() != *cid || self.element_index.get(&e.id()) != Some(cid) {
                    return Err(format!("element {} misfiled", e.id()));
                }
                for n in e.neighbours() {
                    let back = component
                        .get_element(n)
                        .is_some_and(|other| other.neighbours().contains(&e.id()));
                    if !back {
                        return Err(format!("link {} -> {n} is not mirrored in {cid}", e.id()));
                    }
                }
            }
            if connected_groups(component).len() != 1 {
                return Err(format!("component {cid} is disconnected"));
            }
            let live = (
                component.count_vertices(),
                component.count_edges(),
                component.count_faces(),
                component.count_solids(),
                component.get_euler(),
            );
            let fresh = component.recount();
            if live != fresh {
                return Err(format!("component {cid} counters {live:?} != recount {fresh:?}"));
            }
        }
        if seen != self.element_index.len() {
            return Err(format!("{seen} elements stored, {} indexed", self.element_index.len()));
        }
        Ok(())
    }
}

/// Link-connected groups of a component, each listed in id order; groups are
/// ordered by their lowest id.
fn connected_groups(component: &Component) -> Vec<Vec<ElementId>> {
    let mut visited: AHashSet<ElementId> = AHashSet::default();
    let mut groups = Vec::new();
    for start in component.element_ids() {
        if !visited.insert(start) {
            continue;
        }
        let mut group = vec![start];
        let mut queue = VecDeque::from([start]);
        while let Some(id) = queue.pop_front() {
            let Some(e) = component.get_element(id) else {
                continue;
            };
            for n in e.neighbours() {
                if visited.insert(n) {
                    group.push(n);
                    queue.push_back(n);
                }
            }
        }
        group.sort_unstable();
        groups.push(group);
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    #[test]
    fn rejected_insertions_change_nothing() {
        let mut net = Net::new(ElementKind::Face, Tolerance::default());
        let a = net
            .add_element(&[p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(0.0, 1.0, 0.0)])
            .unwrap();
        let before = net.clone();

        assert!(matches!(
            net.add_element(&[p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0)]),
            Err(Error::ArityMismatch { expected: 3, found: 2, .. })
        ));
        assert!(matches!(
            net.add_element(&[p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(2.0, 0.0, 0.0)]),
            Err(Error::DegenerateElement(_))
        ));
        assert_eq!(
            net.add_element(&[p(0.0, 1.0, 0.0), p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0)]),
            Err(Error::DuplicateElement(a.0))
        );

        assert_eq!(net.count_elements(), before.count_elements());
        assert_eq!(net.euler(), before.euler());
        // The failed attempts did not consume ids.
        let b = net
            .add_element(&[p(1.0, 0.0, 0.0), p(0.0, 1.0, 0.0), p(1.0, 1.0, 0.0)])
            .unwrap();
        assert_eq!(b, ElementId(1));
        net.check_invariants().unwrap();
    }

    #[test]
    fn links_follow_opposite_point_convention() {
        let mut net = Net::new(ElementKind::Face, Tolerance::default());
        let a = net
            .add_element(&[p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(0.0, 1.0, 0.0)])
            .unwrap();
        let b = net
            .add_element(&[p(1.0, 1.0, 0.0), p(0.0, 1.0, 0.0), p(1.0, 0.0, 0.0)])
            .unwrap();
        // Shared edge (1,0)-(0,1) is opposite point 0 in both triangles.
        assert_eq!(net.element(a).unwrap().neighbour(0), Ok(Some(b)));
        assert_eq!(net.element(b).unwrap().neighbour(0), Ok(Some(a)));
        assert_eq!(net.element(a).unwrap().neighbour(1), Ok(None));
        assert_eq!(net.count_components(), 1);
    }

    #[test]
    fn vertices_are_their_own_components() {
        let mut net = Net::new(ElementKind::Vertex, Tolerance::default());
        for i in 0..5 {
            net.add_element(&[p(i as f64, 0.0, 0.0)]).unwrap();
        }
        assert_eq!(net.count_components(), 5);
        assert_eq!(net.euler(), 5);
        assert!(matches!(
            net.add_element(&[p(2.0, 0.0, 0.0)]),
            Err(Error::DuplicateElement(2))
        ));
        net.check_invariants().unwrap();
    }
}
