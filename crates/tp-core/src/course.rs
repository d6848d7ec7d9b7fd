//! The authoritative course document.
//!
//! `CourseDb` owns the real object tables — the map layout and the
//! topology layout — in paint order. Interaction modes work on clones
//! and only ever touch these tables through the controller's commit
//! entry points. Snapshot/restore round-trips the whole document
//! through MessagePack bytes; the undo stack and the cancel-
//! correctness tests are built on that.

use crate::id::ObjectId;
use crate::model::CourseObject;
use kurbo::Affine;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Snapshot encode/decode failure. Indicates a bug or corrupted
/// snapshot bytes, never a normal editing condition.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("failed to encode document snapshot: {0}")]
    Encode(#[from] rmp_serde::encode::Error),
    #[error("failed to decode document snapshot: {0}")]
    Decode(#[from] rmp_serde::decode::Error),
}

/// The course document: map objects plus the topology layout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CourseDb {
    /// Map-pane objects, in paint order (later objects draw on top).
    objects: Vec<CourseObject>,
    /// Topology-pane objects (the course skeleton diagram).
    topology: Vec<CourseObject>,
}

impl CourseDb {
    pub fn new() -> Self {
        Self::default()
    }

    // ─── Map layout ──────────────────────────────────────────────────

    /// Append an object to the map layout. Returns its id.
    pub fn insert(&mut self, object: CourseObject) -> ObjectId {
        let id = object.id;
        self.objects.push(object);
        id
    }

    /// Remove a map object, returning it if present.
    pub fn remove(&mut self, id: ObjectId) -> Option<CourseObject> {
        let pos = self.objects.iter().position(|o| o.id == id)?;
        Some(self.objects.remove(pos))
    }

    pub fn get(&self, id: ObjectId) -> Option<&CourseObject> {
        self.objects.iter().find(|o| o.id == id)
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut CourseObject> {
        self.objects.iter_mut().find(|o| o.id == id)
    }

    /// Map objects in paint order.
    pub fn objects(&self) -> impl Iterator<Item = &CourseObject> {
        self.objects.iter()
    }

    pub fn object_ids(&self) -> Vec<ObjectId> {
        self.objects.iter().map(|o| o.id).collect()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Apply a transform to every map object. The topology layout is
    /// schematic and does not follow map-coordinate transforms.
    pub fn apply_to_all(&mut self, matrix: Affine) {
        for object in &mut self.objects {
            object.apply(matrix);
        }
    }

    // ─── Topology layout ─────────────────────────────────────────────

    pub fn insert_topology(&mut self, object: CourseObject) -> ObjectId {
        let id = object.id;
        self.topology.push(object);
        id
    }

    pub fn topology(&self) -> impl Iterator<Item = &CourseObject> {
        self.topology.iter()
    }

    pub fn get_topology(&self, id: ObjectId) -> Option<&CourseObject> {
        self.topology.iter().find(|o| o.id == id)
    }

    pub fn get_topology_mut(&mut self, id: ObjectId) -> Option<&mut CourseObject> {
        self.topology.iter_mut().find(|o| o.id == id)
    }

    // ─── Snapshots ───────────────────────────────────────────────────

    /// Serialize the whole document to MessagePack bytes.
    pub fn snapshot(&self) -> Result<Vec<u8>, SnapshotError> {
        Ok(rmp_serde::to_vec(self)?)
    }

    /// Replace the whole document from snapshot bytes.
    pub fn restore(&mut self, bytes: &[u8]) -> Result<(), SnapshotError> {
        *self = rmp_serde::from_slice(bytes)?;
        Ok(())
    }
}
