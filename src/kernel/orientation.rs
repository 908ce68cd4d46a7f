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

use std::cmp::Ordering;

use crate::{geometry::point::Point3, numeric::exact::orient3d_sign};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Orientation {
    Negative,
    Zero,
    Positive,
}

impl From<Ordering> for Orientation {
    fn from(o: Ordering) -> Self {
        match o {
            Ordering::Less => Orientation::Negative,
            Ordering::Equal => Orientation::Zero,
            Ordering::Greater => Orientation::Positive,
        }
    }
}

/// Exact side of `d` relative to the oriented plane `(a, b, c)`.
///
/// Returns:
/// - Positive if `d` lies below the plane (abc counter-clockwise seen from above)
/// - Negative if above
/// - Zero if coplanar
pub fn orient3d(a: &Point3, b: &Point3, c: &Point3, d: &Point3) -> Orientation {
    orient3d_sign(a.coords(), b.coords(), c.coords(), d.coords()).into()
}
