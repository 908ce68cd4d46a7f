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

use slotmap::new_key_type;
use smallvec::SmallVec;

use crate::{config::MAX_FAN_OUT, geometry::aabb::Aabb};

new_key_type! {
    /// Arena index of a SAM node.
    pub struct NodeId;
}

/// Inline capacity: a full node plus the one overflowing item.
pub(crate) type Slots<T> = SmallVec<[T; MAX_FAN_OUT + 1]>;

#[derive(Debug, Clone)]
pub(crate) struct Entry<K> {
    pub bbox: Aabb,
    pub key: K,
    /// Insertion sequence number; breaks nearest-neighbour ties.
    pub seq: u64,
}

#[derive(Debug, Clone)]
pub(crate) enum NodeKind<K> {
    Leaf(Slots<Entry<K>>),
    Internal(Slots<NodeId>),
}

#[derive(Debug, Clone)]
pub(crate) struct Node<K> {
    /// Exact union of the children's or entries' boxes; `None` only for an
    /// empty root leaf.
    pub bbox: Option<Aabb>,
    pub parent: Option<NodeId>,
    pub kind: NodeKind<K>,
}

impl<K> Node<K> {
    pub fn leaf(parent: Option<NodeId>) -> Self {
        Node {
            bbox: None,
            parent,
            kind: NodeKind::Leaf(Slots::new()),
        }
    }

    pub fn internal(parent: Option<NodeId>, children: Slots<NodeId>) -> Self {
        Node {
            bbox: None,
            parent,
            kind: NodeKind::Internal(children),
        }
    }

    pub fn len(&self) -> usize {
        match &self.kind {
            NodeKind::Leaf(entries) => entries.len(),
            NodeKind::Internal(children) => children.len(),
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf(_))
    }
}

/// Union of a sequence of boxes.
pub(crate) fn union_all<'a>(boxes: impl IntoIterator<Item = &'a Aabb>) -> Option<Aabb> {
    boxes.into_iter().fold(None, |acc, b| match acc {
        None => Some(*b),
        Some(u) => Some(u.union(b)),
    })
}
