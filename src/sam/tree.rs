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

use std::{fmt::Debug, hash::Hash, ops::ControlFlow};

use ahash::AHashMap;
use slotmap::SlotMap;
use tracing::{debug, trace};

use crate::{
    config::SamConfig,
    error::{Error, Result},
    geometry::{aabb::Aabb, point::Point3},
    numeric::tolerance::Tolerance,
    sam::{
        node::{Entry, Node, NodeId, NodeKind, Slots, union_all},
        split::partition,
    },
};

/// Balanced bounding-volume tree (R-tree family) mapping boxes to entity keys.
///
/// Nodes live in a slot-map arena and refer to each other by [`NodeId`]. Every
/// leaf sits at the same depth; a node's box is the exact union of what it
/// holds. Mutations take `&mut self`, so a single writer is enforced by the
/// borrow checker; shared `&self` queries may run concurrently.
#[derive(Debug, Clone)]
pub struct Sam<K> {
    pub(crate) nodes: SlotMap<NodeId, Node<K>>,
    pub(crate) root: NodeId,
    /// Leaf currently holding each entity.
    locations: AHashMap<K, NodeId>,
    next_seq: u64,
    height: usize,
    tolerance: Tolerance,
    config: SamConfig,
}

impl<K> Sam<K>
where
    K: Copy + Eq + Hash + Debug,
{
    pub fn new(tolerance: Tolerance) -> Self {
        Self::with_checked_config(tolerance, SamConfig::default())
    }

    /// Fails with [`Error::Config`] when the fan-out bounds are out of range.
    pub fn with_config(tolerance: Tolerance, config: SamConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::with_checked_config(tolerance, config))
    }

    /// Caller guarantees `config` passed [`SamConfig::validate`].
    pub(crate) fn with_checked_config(tolerance: Tolerance, config: SamConfig) -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(Node::leaf(None));
        Sam {
            nodes,
            root,
            locations: AHashMap::default(),
            next_seq: 0,
            height: 1,
            tolerance,
            config,
        }
    }

    pub fn tolerance(&self) -> &Tolerance {
        &self.tolerance
    }

    pub fn config(&self) -> &SamConfig {
        &self.config
    }

    pub fn count(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    /// Number of levels; 1 for a tree that is a single leaf.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Union of every stored box; `None` when empty.
    pub fn bounding_box(&self) -> Option<Aabb> {
        self.nodes[self.root].bbox
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.locations.contains_key(key)
    }

    /// Box stored for `key`.
    pub fn get(&self, key: &K) -> Option<&Aabb> {
        let leaf = self.locations.get(key)?;
        self.leaf_entries(*leaf)
            .iter()
            .find(|e| e.key == *key)
            .map(|e| &e.bbox)
    }

    /// Every `(key, box)` pair, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (K, &Aabb)> + '_ {
        self.nodes
            .values()
            .flat_map(|node| match &node.kind {
                NodeKind::Leaf(entries) => entries.as_slice(),
                NodeKind::Internal(_) => &[][..],
            })
            .map(|e| (e.key, &e.bbox))
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root = self.nodes.insert(Node::leaf(None));
        self.locations.clear();
        self.height = 1;
    }

    // ─── Mutation ────────────────────────────────────────────────────────────

    pub fn insert(&mut self, key: K, bbox: Aabb) -> Result<()> {
        check_box(&bbox)?;
        if self.locations.contains_key(&key) {
            return Err(Error::DuplicateEntity(format!("{key:?}")));
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        self.insert_entry(Entry { bbox, key, seq });
        Ok(())
    }

    /// Move `key` to `bbox`, keeping its insertion sequence number.
    pub fn update(&mut self, key: K, bbox: Aabb) -> Result<()> {
        check_box(&bbox)?;
        let Some(&leaf) = self.locations.get(&key) else {
            return Err(Error::EntityNotFound(format!("{key:?}")));
        };

        let fits = self.nodes[leaf]
            .bbox
            .is_some_and(|b| b.contains(&bbox, &Tolerance::exact()));
        if fits {
            if let NodeKind::Leaf(entries) = &mut self.nodes[leaf].kind {
                if let Some(e) = entries.iter_mut().find(|e| e.key == key) {
                    e.bbox = bbox;
                }
            }
            self.refit_upward(leaf);
            return Ok(());
        }

        let mut entry = self.detach(key, leaf);
        entry.bbox = bbox;
        self.insert_entry(entry);
        Ok(())
    }

    pub fn remove(&mut self, key: &K) -> Result<Aabb> {
        let Some(&leaf) = self.locations.get(key) else {
            return Err(Error::EntityNotFound(format!("{key:?}")));
        };
        Ok(self.detach(*key, leaf).bbox)
    }

    fn insert_entry(&mut self, entry: Entry<K>) {
        let leaf = self.choose_leaf(&entry.bbox);
        self.locations.insert(entry.key, leaf);
        if let NodeKind::Leaf(entries) = &mut self.nodes[leaf].kind {
            entries.push(entry);
        }
        self.adjust_upward(leaf);
    }

    /// Take the entry out of `leaf` and rebalance.
    fn detach(&mut self, key: K, leaf: NodeId) -> Entry<K> {
        self.locations.remove(&key);
        let entry = match &mut self.nodes[leaf].kind {
            NodeKind::Leaf(entries) => {
                let pos = entries.iter().position(|e| e.key == key);
                pos.map(|i| entries.remove(i))
            }
            NodeKind::Internal(_) => None,
        };
        self.condense(leaf);
        // The location map and the leaves are kept in lock step.
        entry.unwrap_or_else(|| unreachable!("entity {key:?} missing from its leaf"))
    }

    /// Descend by least volume enlargement (ties: least margin enlargement,
    /// then smallest volume).
    fn choose_leaf(&self, bbox: &Aabb) -> NodeId {
        let mut current = self.root;
        loop {
            let NodeKind::Internal(children) = &self.nodes[current].kind else {
                return current;
            };
            let mut best = children[0];
            let mut best_cost = (f64::INFINITY, f64::INFINITY, f64::INFINITY);
            for &child in children {
                let Some(cb) = self.nodes[child].bbox else {
                    continue;
                };
                let grown = cb.union(bbox);
                let cost = (
                    grown.volume() - cb.volume(),
                    grown.margin() - cb.margin(),
                    cb.volume(),
                );
                if cost < best_cost {
                    best_cost = cost;
                    best = child;
                }
            }
            current = best;
        }
    }

    /// Split overflowing nodes and refit boxes from `node` up to the root,
    /// growing a new root when the old one splits.
    fn adjust_upward(&mut self, node: NodeId) {
        let mut current = node;
        loop {
            if self.nodes[current].len() > self.config.max_entries {
                let sibling = self.split(current);
                match self.nodes[current].parent {
                    Some(parent) => {
                        if let NodeKind::Internal(children) = &mut self.nodes[parent].kind {
                            children.push(sibling);
                        }
                    }
                    None => {
                        let mut children = Slots::new();
                        children.push(current);
                        children.push(sibling);
                        let root = self.nodes.insert(Node::internal(None, children));
                        self.nodes[current].parent = Some(root);
                        self.nodes[sibling].parent = Some(root);
                        self.root = root;
                        self.height += 1;
                        debug!(height = self.height, "sam grew a new root");
                    }
                }
            } else {
                self.refit(current);
            }
            match self.nodes[current].parent {
                Some(parent) => current = parent,
                None => break,
            }
        }
    }

    /// Split `node` in two; the new sibling shares its parent (not yet linked).
    fn split(&mut self, node: NodeId) -> NodeId {
        let parent = self.nodes[node].parent;
        let is_leaf = self.nodes[node].is_leaf();
        let sibling = self.nodes.insert(if is_leaf {
            Node::leaf(parent)
        } else {
            Node::internal(parent, Slots::new())
        });
        self.redistribute(node, sibling);
        debug!(?node, ?sibling, leaf = is_leaf, "sam node split");
        sibling
    }

    /// Pool the items of `a` and `b` (same level) and deal them back out with
    /// the split heuristic.
    fn redistribute(&mut self, a: NodeId, b: NodeId) {
        let min_fill = self.config.min_entries;
        let a_kind = std::mem::replace(&mut self.nodes[a].kind, NodeKind::Internal(Slots::new()));
        let b_kind = std::mem::replace(&mut self.nodes[b].kind, NodeKind::Internal(Slots::new()));
        match (a_kind, b_kind) {
            (NodeKind::Leaf(mut pool), NodeKind::Leaf(rest)) => {
                pool.extend(rest);
                let boxes: Vec<Aabb> = pool.iter().map(|e| e.bbox).collect();
                let (left, right) = partition(&boxes, min_fill.min(pool.len() / 2).max(1));
                let mut slots: Vec<Option<Entry<K>>> = pool.into_iter().map(Some).collect();
                let mut take = |idx: &[usize]| -> Slots<Entry<K>> {
                    idx.iter().filter_map(|&i| slots[i].take()).collect()
                };
                let (left, right) = (take(&left), take(&right));
                for e in &right {
                    self.locations.insert(e.key, b);
                }
                for e in &left {
                    self.locations.insert(e.key, a);
                }
                self.nodes[a].kind = NodeKind::Leaf(left);
                self.nodes[b].kind = NodeKind::Leaf(right);
            }
            (NodeKind::Internal(mut pool), NodeKind::Internal(rest)) => {
                pool.extend(rest);
                let boxes: Vec<Aabb> = pool
                    .iter()
                    .map(|&c| self.nodes[c].bbox.unwrap_or_else(|| Aabb::from_point(Point3::ORIGIN)))
                    .collect();
                let (left, right) = partition(&boxes, min_fill.min(pool.len() / 2).max(1));
                let left: Slots<NodeId> = left.iter().map(|&i| pool[i]).collect();
                let right: Slots<NodeId> = right.iter().map(|&i| pool[i]).collect();
                for &c in &left {
                    self.nodes[c].parent = Some(a);
                }
                for &c in &right {
                    self.nodes[c].parent = Some(b);
                }
                self.nodes[a].kind = NodeKind::Internal(left);
                self.nodes[b].kind = NodeKind::Internal(right);
            }
            _ => unreachable!("redistribute across levels"),
        }
        self.refit(a);
        self.refit(b);
    }

    /// Repair boxes and fill after a removal below `node`.
    fn condense(&mut self, node: NodeId) {
        let mut current = node;
        while let Some(parent) = self.nodes[current].parent {
            if self.nodes[current].len() < self.config.min_entries {
                self.rebalance(current, parent);
            } else {
                self.refit(current);
            }
            current = parent;
        }
        self.refit(current);
        self.shrink_root();
    }

    /// Merge an underfull `node` into its best sibling, or borrow from it when
    /// the two do not fit in one node.
    fn rebalance(&mut self, node: NodeId, parent: NodeId) {
        if self.nodes[node].len() == 0 {
            self.unlink(node, parent);
            return;
        }
        let Some(node_box) = self.nodes[node].bbox else {
            return;
        };
        let NodeKind::Internal(siblings) = &self.nodes[parent].kind else {
            return;
        };
        let sibling = siblings
            .iter()
            .copied()
            .filter(|&s| s != node)
            .filter_map(|s| self.nodes[s].bbox.map(|b| (s, b)))
            .min_by(|(_, a), (_, b)| {
                let ea = a.union(&node_box).volume() - a.volume();
                let eb = b.union(&node_box).volume() - b.volume();
                ea.total_cmp(&eb)
            })
            .map(|(s, _)| s);
        let Some(sibling) = sibling else {
            self.refit(node);
            return;
        };

        if self.nodes[node].len() + self.nodes[sibling].len() <= self.config.max_entries {
            let kind = std::mem::replace(&mut self.nodes[node].kind, NodeKind::Leaf(Slots::new()));
            match (kind, &mut self.nodes[sibling].kind) {
                (NodeKind::Leaf(moved), NodeKind::Leaf(into)) => {
                    for e in &moved {
                        self.locations.insert(e.key, sibling);
                    }
                    into.extend(moved);
                }
                (NodeKind::Internal(moved), NodeKind::Internal(into)) => {
                    into.extend(moved.iter().copied());
                    for c in moved {
                        self.nodes[c].parent = Some(sibling);
                    }
                }
                _ => unreachable!("siblings on different levels"),
            }
            self.unlink(node, parent);
            self.refit(sibling);
            debug!(?node, ?sibling, "sam merged underfull node");
        } else {
            self.redistribute(node, sibling);
            debug!(?node, ?sibling, "sam redistributed underfull node");
        }
    }

    fn unlink(&mut self, node: NodeId, parent: NodeId) {
        if let NodeKind::Internal(children) = &mut self.nodes[parent].kind {
            children.retain(|c| *c != node);
        }
        self.nodes.remove(node);
    }

    /// Collapse single-child roots.
    fn shrink_root(&mut self) {
        loop {
            let children: Slots<NodeId> = match &self.nodes[self.root].kind {
                NodeKind::Internal(children) => children.clone(),
                NodeKind::Leaf(_) => return,
            };
            match children.as_slice() {
                [] => {
                    self.nodes[self.root] = Node::leaf(None);
                    self.height = 1;
                    return;
                }
                [only] => {
                    let only = *only;
                    self.nodes.remove(self.root);
                    self.nodes[only].parent = None;
                    self.root = only;
                    self.height -= 1;
                    debug!(height = self.height, "sam root shrank");
                }
                _ => return,
            }
        }
    }

    fn refit(&mut self, node: NodeId) {
        let bbox = match &self.nodes[node].kind {
            NodeKind::Leaf(entries) => union_all(entries.iter().map(|e| &e.bbox)),
            NodeKind::Internal(children) => {
                union_all(children.iter().filter_map(|c| self.nodes[*c].bbox.as_ref()))
            }
        };
        self.nodes[node].bbox = bbox;
    }

    fn refit_upward(&mut self, node: NodeId) {
        let mut current = Some(node);
        while let Some(n) = current {
            self.refit(n);
            current = self.nodes[n].parent;
        }
    }

    fn leaf_entries(&self, node: NodeId) -> &[Entry<K>] {
        match &self.nodes[node].kind {
            NodeKind::Leaf(entries) => entries,
            NodeKind::Internal(_) => &[],
        }
    }

    // ─── Queries ─────────────────────────────────────────────────────────────

    /// Depth-first branch-and-bound walk. Subtrees whose box fails `node_pred`
    /// are skipped; entries passing `entry_pred` are handed to `visit`.
    pub(crate) fn walk<N, E, V>(&self, node_pred: N, mut entry_pred: E, mut visit: V)
    where
        N: Fn(&Aabb) -> bool,
        E: FnMut(&K, &Aabb) -> bool,
        V: FnMut(&Entry<K>) -> ControlFlow<()>,
    {
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            let node = &self.nodes[id];
            match node.bbox {
                Some(b) if node_pred(&b) => {}
                _ => continue,
            }
            match &node.kind {
                NodeKind::Internal(children) => stack.extend(children.iter().rev().copied()),
                NodeKind::Leaf(entries) => {
                    for e in entries {
                        if entry_pred(&e.key, &e.bbox) && visit(e).is_break() {
                            return;
                        }
                    }
                }
            }
        }
    }

    /// Keys whose entry passes `entry_pred`, pruning subtrees by `node_pred`.
    /// `node_pred` must hold for every box enclosing one that passes
    /// `entry_pred`.
    pub fn search_with<N, E>(&self, node_pred: N, entry_pred: E) -> Vec<K>
    where
        N: Fn(&Aabb) -> bool,
        E: FnMut(&K, &Aabb) -> bool,
    {
        let mut out = Vec::new();
        self.walk(node_pred, entry_pred, |e| {
            out.push(e.key);
            ControlFlow::Continue(())
        });
        out
    }

    /// Short-circuiting form of [`Sam::search_with`].
    pub fn any_with<N, E>(&self, node_pred: N, entry_pred: E) -> bool
    where
        N: Fn(&Aabb) -> bool,
        E: FnMut(&K, &Aabb) -> bool,
    {
        let mut found = false;
        self.walk(node_pred, entry_pred, |_| {
            found = true;
            ControlFlow::Break(())
        });
        found
    }

    /// Entries whose box overlaps `query` on all three axes.
    pub fn intersects(&self, query: &Aabb) -> Vec<K> {
        let tol = self.tolerance;
        trace!(?query, "sam intersects");
        self.search_with(|b| b.intersects(query, &tol), |_, b| b.intersects(query, &tol))
    }

    /// Entries whose box fully contains `query`.
    pub fn contains(&self, query: &Aabb) -> Vec<K> {
        let tol = self.tolerance;
        self.search_with(|b| b.contains(query, &tol), |_, b| b.contains(query, &tol))
    }

    /// Entries whose box lies fully inside `query`.
    pub fn inside(&self, query: &Aabb) -> Vec<K> {
        let tol = self.tolerance;
        self.search_with(|b| b.intersects(query, &tol), |_, b| b.inside(query, &tol))
    }

    /// Entries whose box contains `p`.
    pub fn contains_point(&self, p: &Point3) -> Vec<K> {
        let tol = self.tolerance;
        self.search_with(|b| b.contains_point(p, &tol), |_, b| b.contains_point(p, &tol))
    }

    // ─── Invariants ──────────────────────────────────────────────────────────

    /// Verify the structural invariants: exact node boxes, parent links, fill
    /// bounds, uniform leaf depth and the entity location map. Meant for tests.
    pub fn check_invariants(&self) -> std::result::Result<(), String> {
        let mut leaf_depth = None;
        let mut seen = 0usize;
        let mut stack = vec![(self.root, 1usize)];
        if self.nodes[self.root].parent.is_some() {
            return Err("root has a parent".into());
        }
        while let Some((id, depth)) = stack.pop() {
            let node = &self.nodes[id];
            let is_root = id == self.root;
            if node.len() > self.config.max_entries {
                return Err(format!("node {id:?} overflows with {}", node.len()));
            }
            if !is_root && node.len() < self.config.min_entries {
                return Err(format!("node {id:?} underflows with {}", node.len()));
            }
            let expected = match &node.kind {
                NodeKind::Leaf(entries) => {
                    match leaf_depth {
                        None => leaf_depth = Some(depth),
                        Some(d) if d != depth => {
                            return Err(format!("leaf {id:?} at depth {depth}, expected {d}"));
                        }
                        _ => {}
                    }
                    for e in entries {
                        seen += 1;
                        if self.locations.get(&e.key) != Some(&id) {
                            return Err(format!("location of {:?} is stale", e.key));
                        }
                    }
                    union_all(entries.iter().map(|e| &e.bbox))
                }
                NodeKind::Internal(children) => {
                    if children.is_empty() {
                        return Err(format!("interior node {id:?} has no children"));
                    }
                    for &c in children {
                        if self.nodes.get(c).and_then(|n| n.parent) != Some(id) {
                            return Err(format!("child {c:?} does not point back to {id:?}"));
                        }
                        stack.push((c, depth + 1));
                    }
                    union_all(children.iter().filter_map(|c| self.nodes[*c].bbox.as_ref()))
                }
            };
            if expected != node.bbox {
                return Err(format!("node {id:?} box {:?} != union {expected:?}", node.bbox));
            }
        }
        if seen != self.locations.len() {
            return Err(format!("{seen} entries in leaves, {} located", self.locations.len()));
        }
        if leaf_depth != Some(self.height) {
            return Err(format!("height {} but leaves at {leaf_depth:?}", self.height));
        }
        Ok(())
    }
}

fn check_box(bbox: &Aabb) -> Result<()> {
    let (min, max) = (bbox.min(), bbox.max());
    if (0..3).all(|i| min[i] <= max[i]) {
        Ok(())
    } else {
        Err(Error::MalformedBox {
            min: min.coords(),
            max: max.coords(),
        })
    }
}
