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

//! A space: many spatial objects, each a net plus inert metadata, indexed by
//! their bounding boxes under one shared tolerance.

use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::{
    config::SpaceConfig,
    error::{Error, Result},
    geometry::{aabb::Aabb, point::Point3},
    numeric::tolerance::Tolerance,
    sam::{Neighbour, Sam},
    topology::{element::ElementKind, net::Net},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct ObjectId(pub u64);

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "o{}", self.0)
    }
}

/// Identity and bookkeeping supplied by the caller. Carried along with the
/// object and never interpreted here.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ObjectMeta {
    pub id: ObjectId,
    /// Caller-defined timestamp.
    pub timestamp: u64,
    /// Name of the registry the object belongs to.
    pub registry: String,
    pub attributes: BTreeMap<String, String>,
}

impl ObjectMeta {
    pub fn new(id: ObjectId) -> Self {
        ObjectMeta {
            id,
            ..Default::default()
        }
    }

    pub fn with_timestamp(mut self, timestamp: u64) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn with_registry(mut self, registry: impl Into<String>) -> Self {
        self.registry = registry.into();
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }
}

#[derive(Debug, Clone)]
pub struct SpatialObject {
    meta: ObjectMeta,
    net: Net,
}

impl SpatialObject {
    pub fn id(&self) -> ObjectId {
        self.meta.id
    }

    pub fn meta(&self) -> &ObjectMeta {
        &self.meta
    }

    pub fn meta_mut(&mut self) -> &mut ObjectMeta {
        &mut self.meta
    }

    pub fn net(&self) -> &Net {
        &self.net
    }

    /// Mutable access to the mesh. The space's index only catches up after
    /// [`Space::refresh_object`].
    pub fn net_mut(&mut self) -> &mut Net {
        &mut self.net
    }

    pub fn into_parts(self) -> (ObjectMeta, Net) {
        (self.meta, self.net)
    }
}

/// Object registry over a [`Sam`] of object bounding boxes.
///
/// Objects whose net is empty have no box; they are stored but never returned
/// by a spatial query.
#[derive(Debug, Clone)]
pub struct Space {
    config: SpaceConfig,
    tolerance: Tolerance,
    objects: BTreeMap<ObjectId, SpatialObject>,
    sam: Sam<ObjectId>,
}

impl Space {
    pub fn new(config: SpaceConfig) -> Result<Self> {
        config.validate()?;
        let tolerance = config.build_tolerance()?;
        Ok(Space {
            config,
            tolerance,
            objects: BTreeMap::new(),
            sam: Sam::with_config(tolerance, config.sam)?,
        })
    }

    pub fn config(&self) -> &SpaceConfig {
        &self.config
    }

    pub fn tolerance(&self) -> &Tolerance {
        &self.tolerance
    }

    /// An empty net built with this space's settings.
    pub fn new_net(&self, kind: ElementKind) -> Result<Net> {
        Net::with_config(kind, &self.config)
    }

    pub fn insert_object(&mut self, meta: ObjectMeta, net: Net) -> Result<()> {
        let id = meta.id;
        if self.objects.contains_key(&id) {
            return Err(Error::DuplicateEntity(format!("object {id}")));
        }
        if net.tolerance() != &self.tolerance {
            return Err(Error::ToleranceMismatch {
                space: self.tolerance.epsilon(),
                object: net.tolerance().epsilon(),
            });
        }
        let bbox = net.bounding_box();
        if let Some(b) = bbox {
            self.sam.insert(id, b)?;
        }
        self.objects.insert(id, SpatialObject { meta, net });
        debug!(object = %id, indexed = bbox.is_some(), "object inserted");
        Ok(())
    }

    /// Bring the index in line with the object's current net.
    pub fn refresh_object(&mut self, id: ObjectId) -> Result<()> {
        let Some(object) = self.objects.get(&id) else {
            return Err(Error::EntityNotFound(format!("object {id}")));
        };
        match (object.net.bounding_box(), self.sam.contains_key(&id)) {
            (Some(b), true) => self.sam.update(id, b)?,
            (Some(b), false) => self.sam.insert(id, b)?,
            (None, true) => {
                self.sam.remove(&id)?;
            }
            (None, false) => {}
        }
        trace!(object = %id, "object refreshed");
        Ok(())
    }

    pub fn remove_object(&mut self, id: ObjectId) -> Result<SpatialObject> {
        let Some(object) = self.objects.remove(&id) else {
            return Err(Error::EntityNotFound(format!("object {id}")));
        };
        if self.sam.contains_key(&id) {
            self.sam.remove(&id)?;
        }
        debug!(object = %id, "object removed");
        Ok(object)
    }

    pub fn object(&self, id: ObjectId) -> Option<&SpatialObject> {
        self.objects.get(&id)
    }

    /// Callers that change the net must follow up with
    /// [`Space::refresh_object`].
    pub fn object_mut(&mut self, id: ObjectId) -> Option<&mut SpatialObject> {
        self.objects.get_mut(&id)
    }

    /// All objects in id order, indexed or not.
    pub fn objects(&self) -> impl Iterator<Item = &SpatialObject> + '_ {
        self.objects.values()
    }

    /// Stored objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Indexed objects (those with a non-empty net).
    pub fn count(&self) -> usize {
        self.sam.count()
    }

    pub fn bounding_box(&self) -> Option<Aabb> {
        self.sam.bounding_box()
    }

    pub fn intersects(&self, query: &Aabb) -> Vec<ObjectId> {
        self.sam.intersects(query)
    }

    pub fn contains(&self, query: &Aabb) -> Vec<ObjectId> {
        self.sam.contains(query)
    }

    pub fn inside(&self, query: &Aabb) -> Vec<ObjectId> {
        self.sam.inside(query)
    }

    pub fn contains_point(&self, p: &Point3) -> Vec<ObjectId> {
        self.sam.contains_point(p)
    }

    pub fn nearest(&self, k: usize, p: &Point3) -> Vec<Neighbour<ObjectId>> {
        self.sam.nearest(k, p)
    }
}
