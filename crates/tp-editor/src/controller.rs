//! The controller: the only surface through which the authoritative
//! document changes.
//!
//! Every commit entry point is synchronous and atomic: the mutation
//! either lands as a whole (with one undo step recorded) or the
//! document is rolled back to its pre-commit snapshot and an error is
//! returned. Interaction modes call exactly one entry point per
//! gesture, at the moment of commit.
//!
//! Undo uses **snapshot batching**: each commit captures the document
//! bytes before and after, so undo/redo replaces the whole document in
//! a single step.

use crate::selection::SelectionMgr;
use kurbo::Point;
use tp_core::course::{CourseDb, SnapshotError};
use tp_core::id::ObjectId;
use tp_core::model::CourseObject;
use tp_core::transform::{MoveAction, MoveComputation, TransformError};
use thiserror::Error;

/// Default maximum undo depth.
const MAX_UNDO_DEPTH: usize = 100;

/// Errors surfaced by commit entry points.
#[derive(Debug, Error)]
pub enum EditError {
    #[error("nothing is selected")]
    NothingSelected,
    #[error("the selected object has no orientation to change")]
    NotRotatable,
    #[error("no object {0} in the document")]
    UnknownObject(ObjectId),
    #[error(transparent)]
    Transform(#[from] TransformError),
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
}

// ─── Undo stack ──────────────────────────────────────────────────────────

/// One reversible commit: document snapshots from before and after.
#[derive(Debug, Clone)]
struct Command {
    description: String,
    before: Vec<u8>,
    after: Vec<u8>,
}

#[derive(Debug, Default)]
struct UndoStack {
    undo: Vec<Command>,
    redo: Vec<Command>,
}

impl UndoStack {
    fn push(&mut self, command: Command) {
        self.undo.push(command);
        if self.undo.len() > MAX_UNDO_DEPTH {
            self.undo.remove(0);
        }
        // New action invalidates the redo chain.
        self.redo.clear();
    }
}

// ─── Controller ──────────────────────────────────────────────────────────

/// Owns the document, the selection, and the undo stack.
#[derive(Debug, Default)]
pub struct Controller {
    course: CourseDb,
    selection: SelectionMgr,
    undo: UndoStack,
    /// Topology slots a dragged topology object may snap to. Layout
    /// artifacts supplied by the shell; not part of the document.
    drop_targets: Vec<Point>,
}

impl Controller {
    pub fn new(course: CourseDb) -> Self {
        Self {
            course,
            ..Self::default()
        }
    }

    pub fn course(&self) -> &CourseDb {
        &self.course
    }

    /// Direct document access for shell wiring (loading, adding
    /// objects). Interactive edits go through the commit entry points.
    pub fn course_mut(&mut self) -> &mut CourseDb {
        &mut self.course
    }

    // ─── Selection ───────────────────────────────────────────────────

    pub fn select_object(&mut self, id: ObjectId) {
        log::trace!("select {id}");
        self.selection.select_object(id);
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub fn selection(&self) -> &SelectionMgr {
        &self.selection
    }

    /// The selected objects present in the map layout, in paint order.
    pub fn selected_objects(&self) -> Vec<&CourseObject> {
        self.course
            .objects()
            .filter(|o| self.selection.is_selected(o.id))
            .collect()
    }

    /// The selected objects present in the topology layout.
    pub fn selected_topology_objects(&self) -> Vec<&CourseObject> {
        self.course
            .topology()
            .filter(|o| self.selection.is_selected(o.id))
            .collect()
    }

    /// The primary selected object, looked up in either layout.
    pub fn selected_object(&self) -> Option<&CourseObject> {
        let id = self.selection.primary()?;
        self.course.get(id).or_else(|| self.course.get_topology(id))
    }

    // ─── Drop targets ────────────────────────────────────────────────

    pub fn set_drop_targets(&mut self, targets: Vec<Point>) {
        self.drop_targets = targets;
    }

    pub fn drop_targets(&self) -> &[Point] {
        &self.drop_targets
    }

    // ─── Commit entry points ─────────────────────────────────────────

    /// Move one map object by a delta.
    pub fn move_object(&mut self, id: ObjectId, dx: f64, dy: f64) -> Result<(), EditError> {
        self.commit("move object", |course| {
            course
                .get_mut(id)
                .ok_or(EditError::UnknownObject(id))?
                .offset(dx, dy);
            Ok(())
        })
    }

    /// Place a topology object onto a drop slot.
    pub fn move_topology_object(&mut self, id: ObjectId, slot: Point) -> Result<(), EditError> {
        self.commit("move topology object", |course| {
            let object = course
                .get_topology_mut(id)
                .ok_or(EditError::UnknownObject(id))?;
            let at = object.location();
            object.offset(slot.x - at.x, slot.y - at.y);
            Ok(())
        })
    }

    /// Set the orientation of the selected object, in degrees.
    pub fn rotate(&mut self, new_orientation: f64) -> Result<(), EditError> {
        let id = self.selection.primary().ok_or(EditError::NothingSelected)?;
        self.commit("rotate object", |course| {
            let object = match course.get_mut(id) {
                Some(obj) => obj,
                None => course
                    .get_topology_mut(id)
                    .ok_or(EditError::UnknownObject(id))?,
            };
            if !object.is_oriented() {
                return Err(EditError::NotRotatable);
            }
            object.change_orientation(new_orientation);
            Ok(())
        })
    }

    /// Apply a bulk transform to every map object. The action kind is
    /// validated first: `None` must never reach this point.
    pub fn move_all_objects(
        &mut self,
        action: MoveAction,
        points: &[Point],
    ) -> Result<(), EditError> {
        if action == MoveAction::None {
            return Err(TransformError::UnsupportedAction.into());
        }
        let computation = MoveComputation::new(action, points)?;
        let matrix = computation.matrix();
        log::debug!(
            "move all: offset ({:.2}, {:.2}), scale {:.3}, rotation {:.2}°",
            computation.x_offset(),
            computation.y_offset(),
            computation.scale(),
            computation.rotation()
        );
        self.commit("move all objects", |course| {
            course.apply_to_all(matrix);
            Ok(())
        })
    }

    /// Run a mutation atomically: on success push one undo step, on
    /// failure roll the document back before returning the error.
    fn commit<F>(&mut self, description: &str, mutate: F) -> Result<(), EditError>
    where
        F: FnOnce(&mut CourseDb) -> Result<(), EditError>,
    {
        let before = self.course.snapshot()?;
        match mutate(&mut self.course) {
            Ok(()) => {
                let after = self.course.snapshot()?;
                if before != after {
                    self.undo.push(Command {
                        description: description.to_string(),
                        before,
                        after,
                    });
                }
                log::debug!("commit: {description}");
                Ok(())
            }
            Err(err) => {
                self.course.restore(&before)?;
                log::warn!("commit {description} failed: {err}");
                Err(err)
            }
        }
    }

    // ─── Undo / redo ─────────────────────────────────────────────────

    pub fn can_undo(&self) -> bool {
        !self.undo.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.undo.redo.is_empty()
    }

    /// Undo the last commit. Returns its description.
    pub fn undo(&mut self) -> Result<Option<String>, EditError> {
        let Some(command) = self.undo.undo.pop() else {
            return Ok(None);
        };
        self.course.restore(&command.before)?;
        let description = command.description.clone();
        self.undo.redo.push(command);
        Ok(Some(description))
    }

    /// Redo the last undone commit. Returns its description.
    pub fn redo(&mut self) -> Result<Option<String>, EditError> {
        let Some(command) = self.undo.redo.pop() else {
            return Ok(None);
        };
        self.course.restore(&command.after)?;
        let description = command.description.clone();
        self.undo.undo.push(command);
        Ok(Some(description))
    }
}
