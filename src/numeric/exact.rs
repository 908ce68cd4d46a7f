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

use rug::Rational;

/// Relative error bound of the floating-point 3x3 orientation determinant
/// (Shewchuk's static filter constant for orient3d).
const ORIENT3D_ERRBOUND: f64 = 7.771_561_172_376_103e-16;

/// Sign of the orientation determinant of `d` relative to the plane through
/// `a`, `b`, `c`.
///
/// The floating-point value is used when it is provably correct; otherwise the
/// determinant is recomputed with exact rationals.
pub fn orient3d_sign(a: [f64; 3], b: [f64; 3], c: [f64; 3], d: [f64; 3]) -> Ordering {
    let adx = a[0] - d[0];
    let ady = a[1] - d[1];
    let adz = a[2] - d[2];
    let bdx = b[0] - d[0];
    let bdy = b[1] - d[1];
    let bdz = b[2] - d[2];
    let cdx = c[0] - d[0];
    let cdy = c[1] - d[1];
    let cdz = c[2] - d[2];

    let bdxcdy = bdx * cdy;
    let cdxbdy = cdx * bdy;
    let cdxady = cdx * ady;
    let adxcdy = adx * cdy;
    let adxbdy = adx * bdy;
    let bdxady = bdx * ady;

    let det = adz * (bdxcdy - cdxbdy) + bdz * (cdxady - adxcdy) + cdz * (adxbdy - bdxady);

    let permanent = (bdxcdy.abs() + cdxbdy.abs()) * adz.abs()
        + (cdxady.abs() + adxcdy.abs()) * bdz.abs()
        + (adxbdy.abs() + bdxady.abs()) * cdz.abs();
    let errbound = ORIENT3D_ERRBOUND * permanent;

    if det > errbound {
        return Ordering::Greater;
    }
    if -det > errbound {
        return Ordering::Less;
    }
    orient3d_exact(a, b, c, d).unwrap_or_else(|| det.partial_cmp(&0.0).unwrap_or(Ordering::Equal))
}

/// Exact orientation sign; `None` when a coordinate is not finite.
fn orient3d_exact(a: [f64; 3], b: [f64; 3], c: [f64; 3], d: [f64; 3]) -> Option<Ordering> {
    let q = |p: [f64; 3]| -> Option<[Rational; 3]> {
        Some([
            Rational::from_f64(p[0])?,
            Rational::from_f64(p[1])?,
            Rational::from_f64(p[2])?,
        ])
    };
    let (a, b, c, d) = (q(a)?, q(b)?, q(c)?, q(d)?);

    let diff = |p: &[Rational; 3]| -> [Rational; 3] {
        [
            Rational::from(&p[0] - &d[0]),
            Rational::from(&p[1] - &d[1]),
            Rational::from(&p[2] - &d[2]),
        ]
    };
    let ad = diff(&a);
    let bd = diff(&b);
    let cd = diff(&c);

    let minor = |u: &[Rational; 3], v: &[Rational; 3]| -> Rational {
        Rational::from(&u[0] * &v[1]) - Rational::from(&v[0] * &u[1])
    };

    let mut det = Rational::from(&ad[2] * &minor(&bd, &cd));
    det += Rational::from(&bd[2] * &minor(&cd, &ad));
    det += Rational::from(&cd[2] * &minor(&ad, &bd));
    Some(det.cmp0())
}
