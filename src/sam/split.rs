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

//! Overflow split heuristic.
//!
//! The split axis is the one along which the union of all boxes is longest.
//! Boxes are ordered by their centre on that axis and every cut leaving at
//! least `min_fill` boxes on each side is scored by the summed volume of the
//! two halves, then by their overlap, then by their summed margin. The first
//! cheapest cut wins.

use std::cmp::Ordering;

use crate::{geometry::aabb::Aabb, sam::node::union_all};

/// Partition `boxes` into two groups of indices.
pub(crate) fn partition(boxes: &[Aabb], min_fill: usize) -> (Vec<usize>, Vec<usize>) {
    let n = boxes.len();
    debug_assert!(n >= 2 && min_fill >= 1 && 2 * min_fill <= n);

    let Some(total) = union_all(boxes) else {
        return (Vec::new(), Vec::new());
    };
    let axis = total.longest_axis();

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| {
        boxes[a]
            .center(axis)
            .total_cmp(&boxes[b].center(axis))
            .then_with(|| boxes[a].min()[axis].total_cmp(&boxes[b].min()[axis]))
            .then_with(|| a.cmp(&b))
    });

    // prefix[k] = union of the first k + 1 boxes, suffix[k] = union of order[k..].
    let mut prefix = Vec::with_capacity(n);
    let mut acc = boxes[order[0]];
    for &i in &order {
        acc = acc.union(&boxes[i]);
        prefix.push(acc);
    }
    let mut suffix = vec![boxes[order[n - 1]]; n];
    let mut acc = boxes[order[n - 1]];
    for k in (0..n).rev() {
        acc = acc.union(&boxes[order[k]]);
        suffix[k] = acc;
    }

    let mut best_cut = min_fill;
    let mut best_cost = (f64::INFINITY, f64::INFINITY, f64::INFINITY);
    for cut in min_fill..=(n - min_fill) {
        let left = &prefix[cut - 1];
        let right = &suffix[cut];
        let cost = (
            left.volume() + right.volume(),
            left.overlap_volume(right),
            left.margin() + right.margin(),
        );
        if cmp_cost(&cost, &best_cost) == Ordering::Less {
            best_cost = cost;
            best_cut = cut;
        }
    }

    let right = order.split_off(best_cut);
    (order, right)
}

fn cmp_cost(a: &(f64, f64, f64), b: &(f64, f64, f64)) -> Ordering {
    a.0.total_cmp(&b.0)
        .then_with(|| a.1.total_cmp(&b.1))
        .then_with(|| a.2.total_cmp(&b.2))
}
