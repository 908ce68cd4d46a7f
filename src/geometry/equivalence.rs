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

//! Strict equality versus geometric equivalence under a tolerance, and the
//! hash functions paired with each.
//!
//! `is_equal` compares point lists index by index. `is_geometry_equivalent`
//! compares them as multisets, so it is implied by `is_equal` but not the
//! other way round. The hashes quantise every coordinate with
//! `round(x * factor)`; values equal under a tolerance below `0.5 / factor`
//! hash identically unless a coordinate pair straddles a rounding boundary.

use std::hash::{BuildHasher, Hash, Hasher};

use ahash::RandomState;
use num_traits::ToPrimitive;
use smallvec::SmallVec;

use crate::{
    geometry::{aabb::Aabb, point::Point3, simplex::Simplex},
    numeric::tolerance::Tolerance,
};

pub trait Equivalence {
    /// Same kind and every corresponding point tolerance-equal.
    fn is_equal(&self, other: &Self, tol: &Tolerance) -> bool;

    /// Same kind and the same points under tolerance, in any order.
    fn is_geometry_equivalent(&self, other: &Self, tol: &Tolerance) -> bool;

    /// Hash paired with [`Equivalence::is_equal`].
    fn hash_equal(&self, factor: f64) -> u64;

    /// Hash paired with [`Equivalence::is_geometry_equivalent`].
    fn hash_geometry(&self, factor: f64) -> u64;
}

pub fn points_eq(a: &Point3, b: &Point3, tol: &Tolerance) -> bool {
    tol.eq(a.x, b.x) && tol.eq(a.y, b.y) && tol.eq(a.z, b.z)
}

/// Index-wise comparison of two point lists.
pub fn sequences_eq(a: &[Point3], b: &[Point3], tol: &Tolerance) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(p, q)| points_eq(p, q, tol))
}

/// Multiset comparison of two point lists. Backtracks, so clusters of points
/// that are mutually within tolerance still match when a pairing exists.
pub fn multisets_eq(a: &[Point3], b: &[Point3], tol: &Tolerance) -> bool {
    fn assign(a: &[Point3], b: &[Point3], used: &mut [bool], tol: &Tolerance) -> bool {
        let Some((first, rest)) = a.split_first() else {
            return true;
        };
        for j in 0..b.len() {
            if !used[j] && points_eq(first, &b[j], tol) {
                used[j] = true;
                if assign(rest, b, used, tol) {
                    return true;
                }
                used[j] = false;
            }
        }
        false
    }

    if a.len() != b.len() {
        return false;
    }
    let mut used: SmallVec<[bool; 4]> = SmallVec::from_elem(false, b.len());
    assign(a, b, &mut used, tol)
}

/// Quantised coordinate. Non-finite factors or overflowing products fall back
/// to the raw bit pattern (with -0.0 folded onto 0.0).
pub fn quantise(x: f64, factor: f64) -> i64 {
    if factor.is_finite() && factor > 0.0 {
        if let Some(q) = (x * factor).round().to_i64() {
            return q;
        }
    }
    let x = if x == 0.0 { 0.0 } else { x };
    x.to_bits() as i64
}

pub fn quantise_point(p: &Point3, factor: f64) -> [i64; 3] {
    [
        quantise(p.x, factor),
        quantise(p.y, factor),
        quantise(p.z, factor),
    ]
}

/// Fixed seeds keep hashes stable between runs.
const HASH_STATE: RandomState = RandomState::with_seeds(
    0x243f_6a88_85a3_08d3,
    0x1319_8a2e_0370_7344,
    0xa409_3822_299f_31d0,
    0x082e_fa98_ec4e_6c89,
);

fn hash_sequence(tag: u8, points: &[Point3], factor: f64) -> u64 {
    let mut hasher = HASH_STATE.build_hasher();
    tag.hash(&mut hasher);
    for p in points {
        quantise_point(p, factor).hash(&mut hasher);
    }
    hasher.finish()
}

fn hash_multiset(tag: u8, points: &[Point3], factor: f64) -> u64 {
    let mut keys: SmallVec<[[i64; 3]; 4]> =
        points.iter().map(|p| quantise_point(p, factor)).collect();
    keys.sort_unstable();
    let mut hasher = HASH_STATE.build_hasher();
    tag.hash(&mut hasher);
    keys.hash(&mut hasher);
    hasher.finish()
}

impl Equivalence for Point3 {
    fn is_equal(&self, other: &Self, tol: &Tolerance) -> bool {
        points_eq(self, other, tol)
    }

    fn is_geometry_equivalent(&self, other: &Self, tol: &Tolerance) -> bool {
        points_eq(self, other, tol)
    }

    fn hash_equal(&self, factor: f64) -> u64 {
        hash_sequence(0, std::slice::from_ref(self), factor)
    }

    fn hash_geometry(&self, factor: f64) -> u64 {
        self.hash_equal(factor)
    }
}

impl Equivalence for Aabb {
    fn is_equal(&self, other: &Self, tol: &Tolerance) -> bool {
        points_eq(self.min(), other.min(), tol) && points_eq(self.max(), other.max(), tol)
    }

    // Corners are canonically ordered, so both notions coincide.
    fn is_geometry_equivalent(&self, other: &Self, tol: &Tolerance) -> bool {
        self.is_equal(other, tol)
    }

    fn hash_equal(&self, factor: f64) -> u64 {
        hash_sequence(8, &[*self.min(), *self.max()], factor)
    }

    fn hash_geometry(&self, factor: f64) -> u64 {
        self.hash_equal(factor)
    }
}

impl Equivalence for Simplex {
    fn is_equal(&self, other: &Self, tol: &Tolerance) -> bool {
        self.kind() == other.kind() && sequences_eq(self.points(), other.points(), tol)
    }

    fn is_geometry_equivalent(&self, other: &Self, tol: &Tolerance) -> bool {
        self.kind() == other.kind() && multisets_eq(self.points(), other.points(), tol)
    }

    fn hash_equal(&self, factor: f64) -> u64 {
        hash_sequence(self.kind() as u8 + 1, self.points(), factor)
    }

    fn hash_geometry(&self, factor: f64) -> u64 {
        hash_multiset(self.kind() as u8 + 1, self.points(), factor)
    }
}
