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

use std::fmt;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::{
    error::{Error, Result},
    geometry::{
        aabb::Aabb,
        equivalence::Equivalence,
        point::Point3,
        simplex::{Simplex, SimplexKind},
    },
    numeric::tolerance::Tolerance,
};

/// Cell kind shared by every element of a net.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ElementKind {
    Vertex,
    Edge,
    Face,
    Solid,
}

impl ElementKind {
    /// Points per element.
    pub const fn arity(self) -> usize {
        self.simplex_kind().arity()
    }

    /// Neighbour slots per element. Vertices have none.
    pub const fn slot_count(self) -> usize {
        match self {
            ElementKind::Vertex => 0,
            ElementKind::Edge => 2,
            ElementKind::Face => 3,
            ElementKind::Solid => 4,
        }
    }

    pub const fn simplex_kind(self) -> SimplexKind {
        match self {
            ElementKind::Vertex => SimplexKind::Point,
            ElementKind::Edge => SimplexKind::Segment,
            ElementKind::Face => SimplexKind::Triangle,
            ElementKind::Solid => SimplexKind::Tetrahedron,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            ElementKind::Vertex => "vertex",
            ElementKind::Edge => "edge",
            ElementKind::Face => "face",
            ElementKind::Solid => "solid",
        }
    }
}

/// Net-unique element identifier. Ids are handed out in increasing order and
/// never reused within a net.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ElementId(pub u64);

/// Net-unique component identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ComponentId(pub u64);

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "e{}", self.0)
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c{}", self.0)
    }
}

/// Atomic mesh cell. Slot `i` holds the neighbour across the facet opposite
/// point `i`.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    id: ElementId,
    kind: ElementKind,
    component: ComponentId,
    simplex: Simplex,
    neighbours: [Option<ElementId>; 4],
}

impl Element {
    pub(crate) fn new(id: ElementId, kind: ElementKind, component: ComponentId, simplex: Simplex) -> Self {
        Element {
            id,
            kind,
            component,
            simplex,
            neighbours: [None; 4],
        }
    }

    pub fn id(&self) -> ElementId {
        self.id
    }

    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    /// Owning component.
    pub fn component(&self) -> ComponentId {
        self.component
    }

    pub fn simplex(&self) -> &Simplex {
        &self.simplex
    }

    pub fn points(&self) -> &[Point3] {
        self.simplex.points()
    }

    pub fn arity(&self) -> usize {
        self.kind.arity()
    }

    pub fn neighbour(&self, slot: usize) -> Result<Option<ElementId>> {
        self.check_slot(slot)?;
        Ok(self.neighbours[slot])
    }

    /// Every slot is occupied. Vertices, having no slots, are always interior.
    pub fn is_interior(&self) -> bool {
        self.slots().iter().all(Option::is_some)
    }

    /// Occupied slots, in slot order.
    pub fn neighbours(&self) -> SmallVec<[ElementId; 4]> {
        self.slots().iter().flatten().copied().collect()
    }

    /// Points of the facet opposite point `slot`.
    pub fn facet(&self, slot: usize) -> Result<SmallVec<[Point3; 3]>> {
        self.check_slot(slot)?;
        Ok(self.simplex.facet(slot))
    }

    pub fn bounding_box(&self) -> Aabb {
        // Points are finite once the element is constructed.
        self.simplex
            .bounding_box()
            .unwrap_or_else(|| Aabb::from_point(self.points()[0]))
    }

    pub(crate) fn slots(&self) -> &[Option<ElementId>] {
        &self.neighbours[..self.kind.slot_count()]
    }

    pub(crate) fn set_neighbour(&mut self, slot: usize, neighbour: Option<ElementId>) {
        self.neighbours[slot] = neighbour;
    }

    /// Empty the slot linking to `neighbour`, if any.
    pub(crate) fn unlink(&mut self, neighbour: ElementId) {
        let n = self.kind.slot_count();
        for slot in &mut self.neighbours[..n] {
            if *slot == Some(neighbour) {
                *slot = None;
            }
        }
    }

    pub(crate) fn set_component(&mut self, component: ComponentId) {
        self.component = component;
    }

    fn check_slot(&self, slot: usize) -> Result<()> {
        let arity = self.kind.slot_count();
        if slot < arity {
            Ok(())
        } else {
            Err(Error::SlotOutOfRange { slot, arity })
        }
    }
}

/// Geometric comparison only; ids and links are ignored.
impl Equivalence for Element {
    fn is_equal(&self, other: &Self, tol: &Tolerance) -> bool {
        self.kind == other.kind && self.simplex.is_equal(&other.simplex, tol)
    }

    fn is_geometry_equivalent(&self, other: &Self, tol: &Tolerance) -> bool {
        self.kind == other.kind && self.simplex.is_geometry_equivalent(&other.simplex, tol)
    }

    fn hash_equal(&self, factor: f64) -> u64 {
        self.simplex.hash_equal(factor)
    }

    fn hash_geometry(&self, factor: f64) -> u64 {
        self.simplex.hash_geometry(factor)
    }
}
