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

//! Storage and indexing kernel for a 3D spatial database.
//!
//! * [`sam`]: a balanced bounding-volume index over boxes with range,
//!   containment and k-nearest queries.
//! * [`topology`]: meshes as nets of linked elements, partitioned into
//!   connected components that keep their Euler characteristic current.
//! * [`space`]: a registry of spatial objects forwarding queries to the index.
//!
//! Every comparison goes through one [`Tolerance`] fixed when a space or net is
//! built.

pub mod config;
pub mod error;
pub mod geometry;
pub mod kernel;
pub mod numeric;
pub mod sam;
pub mod space;
pub mod topology;

pub use config::{SamConfig, SpaceConfig, ToleranceConfig};
pub use error::{Error, Result};
pub use geometry::{Aabb, Equivalence, Line3, Plane, Point3, Simplex, SimplexKind, Vector3};
pub use numeric::{Dimension, Tolerance};
pub use sam::{Neighbour, Sam};
pub use space::{ObjectId, ObjectMeta, Space, SpatialObject};
pub use topology::{Component, ComponentId, Element, ElementId, ElementKind, Net, VertexId};
