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

use std::{
    cmp::{Ordering, Reverse},
    collections::BinaryHeap,
    fmt::Debug,
    hash::Hash,
};

use crate::{
    geometry::point::Point3,
    sam::{
        node::{NodeId, NodeKind},
        tree::Sam,
    },
};

/// One nearest-neighbour hit: distance from the query point to the entity's box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbour<K> {
    pub distance: f64,
    pub key: K,
}

#[derive(Debug)]
enum Item<K> {
    Node(NodeId),
    Entry(K),
}

/// Heap element ordered by (squared distance, nodes before entries, insertion
/// sequence). Expanding a node before an entry at the same distance lets
/// equally distant entries surface in insertion order.
#[derive(Debug)]
struct Candidate<K> {
    dist2: f64,
    rank: u8,
    seq: u64,
    item: Item<K>,
}

impl<K> PartialEq for Candidate<K> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<K> Eq for Candidate<K> {}

impl<K> PartialOrd for Candidate<K> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<K> Ord for Candidate<K> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.dist2
            .total_cmp(&other.dist2)
            .then_with(|| self.rank.cmp(&other.rank))
            .then_with(|| self.seq.cmp(&other.seq))
    }
}

impl<K> Sam<K>
where
    K: Copy + Eq + Hash + Debug,
{
    /// The `k` entries closest to `p` by box distance, ascending; ties go to
    /// the earlier insertion.
    ///
    /// Best-first branch and bound: a subtree is only opened once its minimum
    /// distance is no larger than every candidate still queued, so the search
    /// stops as soon as `k` entries have been emitted.
    pub fn nearest(&self, k: usize, p: &Point3) -> Vec<Neighbour<K>> {
        let mut out = Vec::with_capacity(k.min(self.count()));
        if k == 0 {
            return out;
        }
        let Some(root_box) = self.nodes[self.root].bbox else {
            return out;
        };

        let mut heap = BinaryHeap::new();
        heap.push(Reverse(Candidate {
            dist2: root_box.min_distance_squared(p),
            rank: 0,
            seq: 0,
            item: Item::Node(self.root),
        }));

        while let Some(Reverse(candidate)) = heap.pop() {
            match candidate.item {
                Item::Entry(key) => {
                    out.push(Neighbour {
                        distance: candidate.dist2.sqrt(),
                        key,
                    });
                    if out.len() == k {
                        break;
                    }
                }
                Item::Node(id) => match &self.nodes[id].kind {
                    NodeKind::Leaf(entries) => {
                        for e in entries {
                            heap.push(Reverse(Candidate {
                                dist2: e.bbox.min_distance_squared(p),
                                rank: 1,
                                seq: e.seq,
                                item: Item::Entry(e.key),
                            }));
                        }
                    }
                    NodeKind::Internal(children) => {
                        for &child in children {
                            if let Some(b) = self.nodes[child].bbox {
                                heap.push(Reverse(Candidate {
                                    dist2: b.min_distance_squared(p),
                                    rank: 0,
                                    seq: 0,
                                    item: Item::Node(child),
                                }));
                            }
                        }
                    }
                },
            }
        }
        out
    }
}
