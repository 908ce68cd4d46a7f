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

//! Error types shared by the index, the topology model and the object space.

use thiserror::Error;

/// Errors reported to callers. Every variant is a precondition violation:
/// the structure that reported it is left exactly as it was before the call.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// A box whose minimum corner exceeds its maximum on some axis, or that
    /// carries a NaN coordinate.
    #[error("malformed box: min {min:?} / max {max:?}")]
    MalformedBox { min: [f64; 3], max: [f64; 3] },

    /// The entity is already indexed.
    #[error("entity already indexed: {0}")]
    DuplicateEntity(String),

    /// The entity is not indexed.
    #[error("entity not indexed: {0}")]
    EntityNotFound(String),

    /// Neighbour slot access past the element's arity.
    #[error("neighbour slot {slot} out of range for arity {arity}")]
    SlotOutOfRange { slot: usize, arity: usize },

    /// Wrong number of points for the element kind of a net.
    #[error("{kind} elements take {expected} points, got {found}")]
    ArityMismatch {
        kind: &'static str,
        expected: usize,
        found: usize,
    },

    /// Two points of the element coincide under the tolerance, or a point
    /// coordinate is not finite.
    #[error("degenerate element: {0}")]
    DegenerateElement(String),

    /// A geometry-equivalent element is already part of the net.
    #[error("element duplicates existing element {0}")]
    DuplicateElement(u64),

    /// The facet is already shared by two elements.
    #[error("facet {slot} would be shared by more than two elements (already linked to {existing})")]
    NonManifold { slot: usize, existing: u64 },

    /// No element with this id in the net.
    #[error("element {0} not found")]
    ElementNotFound(u64),

    /// Negative or non-finite epsilon.
    #[error("invalid tolerance epsilon: {0}")]
    InvalidTolerance(f64),

    /// Inconsistent configuration value.
    #[error("configuration error: {0}")]
    Config(String),

    /// A net built with a different tolerance than the space it joins.
    #[error("tolerance mismatch: space uses {space}, object uses {object}")]
    ToleranceMismatch { space: f64, object: f64 },
}

/// Result type for kernel operations.
pub type Result<T> = std::result::Result<T, Error>;
