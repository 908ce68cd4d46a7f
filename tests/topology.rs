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

use std::collections::BTreeSet;

use rand::{Rng, SeedableRng, rngs::StdRng};
use spatial3d::{
    Aabb, ComponentId, ElementId, ElementKind, Error, Line3, Net, Plane, Point3, SpaceConfig,
    Tolerance, Vector3, VertexId,
};

fn p(x: f64, y: f64, z: f64) -> Point3 {
    Point3::new(x, y, z)
}

fn face_net() -> Net {
    Net::new(ElementKind::Face, Tolerance::default())
}

fn all_ids(net: &Net) -> BTreeSet<ElementId> {
    net.elements().map(|e| e.id()).collect()
}

/// Closed surface of the unit corner tetrahedron, four triangles.
fn tetrahedral_shell(net: &mut Net) -> [ElementId; 4] {
    let v0 = p(0.0, 0.0, 0.0);
    let v1 = p(1.0, 0.0, 0.0);
    let v2 = p(0.0, 1.0, 0.0);
    let v3 = p(0.0, 0.0, 1.0);
    [
        net.add_element(&[v0, v2, v1]).unwrap(),
        net.add_element(&[v0, v1, v3]).unwrap(),
        net.add_element(&[v1, v2, v3]).unwrap(),
        net.add_element(&[v0, v3, v2]).unwrap(),
    ]
}

/// Row of `n` triangles along x, each sharing an edge with the next.
fn strip(net: &mut Net, n: usize) -> Vec<ElementId> {
    (0..n)
        .map(|i| {
            let x = (i / 2) as f64;
            let pts = if i % 2 == 0 {
                [p(x, 0.0, 0.0), p(x + 1.0, 0.0, 0.0), p(x, 1.0, 0.0)]
            } else {
                [p(x + 1.0, 0.0, 0.0), p(x + 1.0, 1.0, 0.0), p(x, 1.0, 0.0)]
            };
            net.add_element(&pts).unwrap()
        })
        .collect()
}

#[test]
fn single_triangle_has_euler_one() {
    let mut net = face_net();
    let id = net
        .add_element(&[p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(0.0, 1.0, 0.0)])
        .unwrap();
    assert_eq!(net.count_components(), 1);
    let component = net.components().next().unwrap();
    assert_eq!(component.count_vertices(), 3);
    assert_eq!(component.count_edges(), 3);
    assert_eq!(component.count_faces(), 1);
    assert_eq!(component.count_solids(), 0);
    assert_eq!(component.get_euler(), 1);
    assert_eq!(component.get_element(id).map(|e| e.id()), Some(id));
    assert_eq!(component.boundary_elements().count(), 1);
    net.check_invariants().unwrap();
}

#[test]
fn closed_tetrahedral_shell_has_euler_two() {
    let mut net = face_net();
    let ids = tetrahedral_shell(&mut net);
    assert_eq!(net.count_components(), 1);
    assert_eq!(net.count_elements(), 4);

    let component = net.component(net.component_of(ids[0]).unwrap()).unwrap();
    assert_eq!(
        (
            component.count_vertices(),
            component.count_edges(),
            component.count_faces()
        ),
        (4, 6, 4)
    );
    assert_eq!(component.get_euler(), 2);
    assert_eq!(component.boundary_elements().count(), 0);

    // Vertex ids follow first appearance: v0, v2, v1, v3.
    let vertices: Vec<(VertexId, Point3)> = component.vertices().map(|(id, q)| (id, *q)).collect();
    assert_eq!(
        vertices,
        vec![
            (VertexId(0), p(0.0, 0.0, 0.0)),
            (VertexId(1), p(0.0, 1.0, 0.0)),
            (VertexId(2), p(1.0, 0.0, 0.0)),
            (VertexId(3), p(0.0, 0.0, 1.0)),
        ]
    );
    let v = VertexId;
    let edges: Vec<_> = component.edges().collect();
    assert_eq!(
        edges,
        vec![
            [v(0), v(1)],
            [v(0), v(2)],
            [v(0), v(3)],
            [v(1), v(2)],
            [v(1), v(3)],
            [v(2), v(3)],
        ]
    );
    let faces: Vec<_> = component.faces().collect();
    assert_eq!(
        faces,
        vec![
            [v(0), v(1), v(2)],
            [v(0), v(1), v(3)],
            [v(0), v(2), v(3)],
            [v(1), v(2), v(3)],
        ]
    );
    assert_eq!(component.solids().count(), 0);
    for id in ids {
        let e = net.element(id).unwrap();
        assert!(e.is_interior());
        assert_eq!(e.neighbours().len(), 3);
    }
    net.check_invariants().unwrap();
}

#[test]
fn solids_subtract_from_euler() {
    let mut net = Net::new(ElementKind::Solid, Tolerance::default());
    let a = net
        .add_element(&[p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(0.0, 1.0, 0.0), p(0.0, 0.0, 1.0)])
        .unwrap();
    assert_eq!(net.euler(), 1);
    let b = net
        .add_element(&[p(1.0, 1.0, 1.0), p(1.0, 0.0, 0.0), p(0.0, 1.0, 0.0), p(0.0, 0.0, 1.0)])
        .unwrap();
    let component = net.components().next().unwrap();
    assert_eq!(
        (
            component.count_vertices(),
            component.count_edges(),
            component.count_faces(),
            component.count_solids()
        ),
        (5, 9, 7, 2)
    );
    assert_eq!(component.get_euler(), 1);
    // The shared face is opposite the first point of both tetrahedra.
    assert_eq!(net.element(a).unwrap().neighbour(0), Ok(Some(b)));
    assert_eq!(net.element(b).unwrap().neighbour(0), Ok(Some(a)));
    assert!(matches!(
        net.element(a).unwrap().neighbour(4),
        Err(Error::SlotOutOfRange { slot: 4, arity: 4 })
    ));
    net.check_invariants().unwrap();
}

#[test]
fn edge_rings_and_branches() {
    let mut net = Net::new(ElementKind::Edge, Tolerance::default());
    let corners = [p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(1.0, 1.0, 0.0), p(0.0, 1.0, 0.0)];
    for i in 0..3 {
        net.add_element(&[corners[i], corners[i + 1]]).unwrap();
    }
    assert_eq!(net.euler(), 1);
    net.add_element(&[corners[3], corners[0]]).unwrap();
    assert_eq!(net.count_components(), 1);
    assert_eq!(net.euler(), 0);

    // A third edge at an already shared corner.
    let before = net.count_elements();
    assert!(matches!(
        net.add_element(&[corners[0], p(-1.0, -1.0, 0.0)]),
        Err(Error::NonManifold { .. })
    ));
    assert_eq!(net.count_elements(), before);
    net.check_invariants().unwrap();
}

#[test]
fn bridging_element_merges_components() {
    let mut net = face_net();
    let left = net
        .add_element(&[p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(0.0, 1.0, 0.0)])
        .unwrap();
    let right = net
        .add_element(&[p(2.0, 0.0, 0.0), p(2.0, 1.0, 0.0), p(1.0, 1.0, 0.0)])
        .unwrap();
    assert_eq!(net.count_components(), 2);
    let lowest = net.component_of(left).unwrap();
    assert!(lowest < net.component_of(right).unwrap());

    // Shares (1,0)-(0,1) with the left triangle; the right one is not touched yet.
    let middle = net
        .add_element(&[p(1.0, 0.0, 0.0), p(1.0, 1.0, 0.0), p(0.0, 1.0, 0.0)])
        .unwrap();
    assert_eq!(net.count_components(), 2);
    // Shares (1,0)-(1,1) with the middle and (2,0)-(1,1) with the right.
    let bridge = net
        .add_element(&[p(1.0, 0.0, 0.0), p(2.0, 0.0, 0.0), p(1.0, 1.0, 0.0)])
        .unwrap();
    assert_eq!(net.count_components(), 1);
    for id in [left, right, middle, bridge] {
        assert_eq!(net.component_of(id), Some(lowest));
        assert_eq!(net.element(id).unwrap().component(), lowest);
    }
    let component = net.component(lowest).unwrap();
    assert_eq!(component.count_elements(), 4);
    assert_eq!(component.get_euler(), 1);
    net.check_invariants().unwrap();
}

#[test]
fn removing_a_bridge_splits_the_component() {
    let mut net = face_net();
    let ids = strip(&mut net, 5);
    assert_eq!(net.count_components(), 1);
    let original = net.component_of(ids[0]).unwrap();
    let before = all_ids(&net);

    let removed = net.remove_element(ids[2]).unwrap();
    assert_eq!(removed.id(), ids[2]);
    assert_eq!(removed.neighbours().as_slice().len(), 2);

    assert_eq!(net.count_components(), 2);
    let mut expected = before.clone();
    expected.remove(&ids[2]);
    assert_eq!(all_ids(&net), expected);

    // The part holding the lowest id keeps the component id.
    assert_eq!(net.component_of(ids[0]), Some(original));
    assert_eq!(net.component_of(ids[1]), Some(original));
    let other = net.component_of(ids[3]).unwrap();
    assert_ne!(other, original);
    assert_eq!(net.component_of(ids[4]), Some(other));
    assert!(net.element(ids[1]).unwrap().neighbours().len() == 1);
    for c in net.components() {
        assert_eq!(c.get_euler(), 1);
    }
    net.check_invariants().unwrap();
}

#[test]
fn removing_a_leaf_element_keeps_one_component() {
    let mut net = face_net();
    let ids = strip(&mut net, 4);
    net.remove_element(ids[3]).unwrap();
    assert_eq!(net.count_components(), 1);
    assert_eq!(net.count_elements(), 3);
    net.check_invariants().unwrap();
}

#[test]
fn emptied_components_disappear() {
    let mut net = face_net();
    let ids = tetrahedral_shell(&mut net);
    for id in ids {
        net.remove_element(id).unwrap();
        net.check_invariants().unwrap();
    }
    assert_eq!(net.count_components(), 0);
    assert_eq!(net.count_elements(), 0);
    assert_eq!(net.euler(), 0);
    assert!(net.bounding_box().is_none());
    assert_eq!(net.remove_element(ids[0]).unwrap_err(), Error::ElementNotFound(ids[0].0));
}

#[test]
fn third_face_on_an_edge_is_non_manifold() {
    let mut net = face_net();
    let a = p(0.0, 0.0, 0.0);
    let b = p(1.0, 0.0, 0.0);
    net.add_element(&[a, b, p(0.5, 1.0, 0.0)]).unwrap();
    net.add_element(&[a, b, p(0.5, -1.0, 0.0)]).unwrap();
    let err = net.add_element(&[a, b, p(0.5, 0.0, 1.0)]).unwrap_err();
    assert!(matches!(err, Error::NonManifold { slot: 2, .. }));
    assert_eq!(net.count_elements(), 2);
    assert_eq!(net.count_components(), 1);
    net.check_invariants().unwrap();
}

#[test]
fn neighbours_are_found_within_tolerance() {
    let mut net = Net::new(ElementKind::Face, Tolerance::new(1e-4).unwrap());
    let a = net
        .add_element(&[p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(0.0, 1.0, 0.0)])
        .unwrap();
    let b = net
        .add_element(&[p(1.00005, 0.0, 0.0), p(1.0, 1.0, 0.0), p(0.0, 0.99995, 0.0)])
        .unwrap();
    assert_eq!(net.count_components(), 1);
    assert_eq!(net.element(a).unwrap().neighbours().as_slice(), &[b]);
    // Tolerance-merged vertices: 4, not 6.
    assert_eq!(net.components().next().unwrap().count_vertices(), 4);
    net.check_invariants().unwrap();
}

#[test]
fn net_predicates_are_exact_per_element() {
    let mut net = face_net();
    tetrahedral_shell(&mut net);

    let cutting = Plane::from_point_normal(&p(0.0, 0.0, 0.5), Vector3::Z).unwrap();
    let above = Plane::from_point_normal(&p(0.0, 0.0, 2.0), Vector3::Z).unwrap();
    assert!(net.intersects_plane(&cutting));
    assert!(!net.intersects_plane(&above));

    let through = Line3::through(&p(0.2, 0.2, -1.0), &p(0.2, 0.2, 1.0)).unwrap();
    // Inside the bounding box but past the slanted face.
    let past_face = Line3::through(&p(0.8, 0.8, -1.0), &p(0.8, 0.8, 1.0)).unwrap();
    assert!(net.intersects_line(&through));
    assert!(!net.intersects_line(&past_face));

    let corner_box = Aabb::new(p(0.7, 0.7, 0.7), p(0.9, 0.9, 0.9)).unwrap();
    let touching_box = Aabb::new(p(-0.5, -0.5, -0.5), p(0.1, 0.1, 0.1)).unwrap();
    assert!(!net.intersects_box(&corner_box));
    assert!(net.intersects_box(&touching_box));
}

#[test]
fn nearest_merges_components() {
    let mut net = face_net();
    let near = net
        .add_element(&[p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(0.0, 1.0, 0.0)])
        .unwrap();
    let far = net
        .add_element(&[p(10.0, 0.0, 0.0), p(11.0, 0.0, 0.0), p(10.0, 1.0, 0.0)])
        .unwrap();
    assert_eq!(net.count_components(), 2);
    let hits = net.nearest(5, &p(2.0, 0.5, 0.0));
    let order: Vec<ElementId> = hits.iter().map(|n| n.key).collect();
    assert_eq!(order, vec![near, far]);
    assert_eq!(hits[0].distance, 1.0);
    assert_eq!(net.nearest(1, &p(12.0, 0.0, 0.0))[0].key, far);
}

#[test]
fn nearest_ties_follow_element_ids_after_a_merge() {
    let mut net = Net::new(ElementKind::Edge, Tolerance::default());
    let e0 = net.add_element(&[p(2.0, 0.0, 0.0), p(3.0, 0.0, 0.0)]).unwrap();
    let e1 = net.add_element(&[p(-2.0, 0.0, 0.0), p(-1.0, 0.0, 0.0)]).unwrap();
    let e2 = net.add_element(&[p(1.0, 0.0, 0.0), p(2.0, 0.0, 0.0)]).unwrap();
    let e3 = net.add_element(&[p(-2.0, 0.0, 0.0), p(0.0, 5.0, 0.0)]).unwrap();
    assert_eq!(net.count_components(), 2);
    // Joins e0's component with e1's; e1 is re-indexed after e2.
    let e4 = net.add_element(&[p(0.0, 5.0, 0.0), p(3.0, 0.0, 0.0)]).unwrap();
    assert_eq!(net.count_components(), 1);

    // e3, e4 at distance 1; e1, e2 at sqrt(2); e0 at sqrt(5).
    let q = p(0.0, -1.0, 0.0);
    let all: Vec<ElementId> = net.nearest(5, &q).iter().map(|n| n.key).collect();
    assert_eq!(all, vec![e3, e4, e1, e2, e0]);
    for k in 1..=5 {
        let first: Vec<ElementId> = net.nearest(k, &q).iter().map(|n| n.key).collect();
        assert_eq!(first, all[..k].to_vec());
    }
    let component = net.component(net.component_of(e1).unwrap()).unwrap();
    assert_eq!(component.nearest(3, &q)[2].key, e1);
}

#[test]
fn configured_nets_validate_their_settings() {
    let net = Net::with_config(ElementKind::Face, &SpaceConfig::default().with_epsilon(1e-5)).unwrap();
    assert_eq!(net.tolerance().epsilon(), 1e-5);
    assert!(matches!(
        Net::with_config(ElementKind::Face, &SpaceConfig::default().with_epsilon(-1.0)),
        Err(Error::InvalidTolerance(_))
    ));
    assert_eq!(net.component(ComponentId(0)).map(|c| c.id()), None);
}

#[test]
fn randomized_removal_keeps_partition_consistent() {
    let mut rng = StdRng::seed_from_u64(42);
    let mut net = face_net();
    let n = 8;
    for i in 0..n {
        for j in 0..n {
            let (x, y) = (i as f64, j as f64);
            net.add_element(&[p(x, y, 0.0), p(x + 1.0, y, 0.0), p(x, y + 1.0, 0.0)])
                .unwrap();
            net.add_element(&[p(x + 1.0, y, 0.0), p(x + 1.0, y + 1.0, 0.0), p(x, y + 1.0, 0.0)])
                .unwrap();
        }
    }
    assert_eq!(net.count_components(), 1);
    assert_eq!(net.euler(), 1);
    net.check_invariants().unwrap();

    let mut alive: Vec<ElementId> = all_ids(&net).into_iter().collect();
    while !alive.is_empty() {
        let idx = rng.random_range(0..alive.len());
        let id = alive.swap_remove(idx);
        let components_before = net.count_components();
        let removed = net.remove_element(id).unwrap();
        let degree = removed.neighbours().len();
        net.check_invariants().unwrap();
        assert_eq!(net.count_elements(), alive.len());
        // A triangle touches at most three groups, so at most two new ones appear.
        assert!(net.count_components() + 1 >= components_before);
        assert!(net.count_components() <= components_before + degree.saturating_sub(1));

        // Re-add some elements to exercise merges along the way.
        if rng.random_bool(0.2) {
            let back = net.add_element(removed.points()).unwrap();
            net.check_invariants().unwrap();
            alive.push(back);
        }
    }
    assert_eq!(net.count_components(), 0);
}
