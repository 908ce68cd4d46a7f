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

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Which kind of quantity a comparison is about. Each dimension scales the
/// base epsilon by a fixed factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dimension {
    Coordinate,
    Length,
    Area,
    Volume,
}

impl Dimension {
    pub const fn factor(self) -> f64 {
        match self {
            Dimension::Coordinate => 1.0,
            Dimension::Length => 10.0,
            Dimension::Area => 20.0,
            Dimension::Volume => 40.0,
        }
    }
}

/// Scale-aware equality for reals. One value is built per space and copied
/// into every index and net of that space; it never changes afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tolerance {
    epsilon: f64,
}

impl Default for Tolerance {
    fn default() -> Self {
        Self {
            epsilon: Self::DEFAULT_EPSILON,
        }
    }
}

impl Tolerance {
    pub const DEFAULT_EPSILON: f64 = 1e-7;

    pub fn new(epsilon: f64) -> Result<Self> {
        if !epsilon.is_finite() || epsilon < 0.0 {
            return Err(Error::InvalidTolerance(epsilon));
        }
        Ok(Self { epsilon })
    }

    /// Exact comparisons (still inclusive, so `eq(a, a)` holds).
    pub const fn exact() -> Self {
        Self { epsilon: 0.0 }
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Tolerance for the given dimension.
    #[inline(always)]
    pub fn of(&self, dim: Dimension) -> f64 {
        self.epsilon * dim.factor()
    }

    pub fn length(&self) -> f64 {
        self.of(Dimension::Length)
    }

    pub fn area(&self) -> f64 {
        self.of(Dimension::Area)
    }

    pub fn volume(&self) -> f64 {
        self.of(Dimension::Volume)
    }

    /// Coordinate equality. Inclusive at the boundary.
    #[inline(always)]
    pub fn eq(&self, a: f64, b: f64) -> bool {
        self.eq_in(a, b, Dimension::Coordinate)
    }

    #[inline(always)]
    pub fn eq_in(&self, a: f64, b: f64, dim: Dimension) -> bool {
        (a - b).abs() <= self.of(dim)
    }

    #[inline(always)]
    pub fn is_zero(&self, v: f64, dim: Dimension) -> bool {
        v.abs() <= self.of(dim)
    }

    /// `a <= b` up to the coordinate tolerance.
    #[inline(always)]
    pub fn le(&self, a: f64, b: f64) -> bool {
        a <= b + self.epsilon
    }

    /// `a >= b` up to the coordinate tolerance.
    #[inline(always)]
    pub fn ge(&self, a: f64, b: f64) -> bool {
        a + self.epsilon >= b
    }

    /// Rounding factor paired with this tolerance for the equivalence hashes.
    /// Zero epsilon yields infinity, which the hashes treat as "hash raw bits".
    pub fn rounding_factor(&self) -> f64 {
        if self.epsilon > 0.0 {
            1.0 / self.epsilon
        } else {
            f64::INFINITY
        }
    }
}
