//! The interaction mode engine.
//!
//! A mode is a short-lived handler for one pointer gesture. The canvas
//! host holds exactly one mode at a time; callbacks return a
//! [`Transition`] and the host swaps its current-mode slot, so a mode
//! never outlives its gesture. Modes work on provisional clones of the
//! objects they manipulate and touch the authoritative document only
//! through one controller commit, at the end of a committing gesture.
//! Cancelling discards the clone — the document is untouched.
//!
//! ## Concrete modes
//!
//! | Mode | Gesture | Commit |
//! |------|---------|--------|
//! | `DefaultMode` | click selects, press starts drags | — |
//! | `DragObjectMode` | drag a selected map object | `move_object` |
//! | `TopologyDragMode` | drag a topology object onto a slot | `move_topology_object` |
//! | `RotateMode` | hover rotates, click confirms | `rotate` |
//! | `MoveAllMode` | 2 or 4 point clicks | `move_all_objects` |

use crate::controller::{Controller, EditError};
use crate::status;
use kurbo::Point;
use smallvec::SmallVec;
use tp_core::geometry;
use tp_core::model::CourseObject;
use tp_core::transform::{MoveAction, MoveComputation, TransformError};
use tp_render::hit::hit_test;
use tp_render::overlay::Highlight;

/// Hit-test tolerance, in pixels.
pub const HIT_TOLERANCE_PX: f64 = 3.0;
/// How close (world units) a dragged topology object must be to a
/// drop slot to snap to it.
pub const MAX_DROP_DISTANCE: f64 = 15.0;

/// Which logical drawing surface a pointer event targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pane {
    Map,
    Topology,
}

/// How the host's gesture recognizer should treat a button press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragAction {
    /// Ignore motion; a quick release still delivers a click.
    None,
    /// The press pans the map.
    MapDrag,
    /// Every subsequent motion is a drag.
    ImmediateDrag,
    /// Becomes a drag only after the motion threshold; a quick release
    /// is a click.
    DelayedDrag,
}

/// Pane-dependent cursor hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorHint {
    Default,
    Move,
    Crosshair,
    Hand,
}

/// What the host should do with its current-mode slot after a
/// callback.
pub enum Transition {
    /// Keep the current mode.
    Stay,
    /// Install a fresh default mode.
    ToDefault,
    /// Install the given mode.
    To(Box<dyn Mode>),
    /// The gesture turned out to be a map pan; the host takes over.
    BeginMapPan,
}

/// One interaction mode. Default method bodies give the do-nothing
/// behavior so concrete modes only override the callbacks they use.
pub trait Mode {
    /// Provisional geometry for one pane. `None` means this mode does
    /// not affect the pane.
    fn highlights(&self, _ctl: &Controller, _pane: Pane) -> Option<Vec<Highlight>> {
        None
    }

    /// Classify a button press for the gesture recognizer.
    fn pointer_down(
        &mut self,
        _ctl: &mut Controller,
        _pane: Pane,
        _location: Point,
        _pixel_size: f64,
    ) -> (DragAction, Transition) {
        (DragAction::None, Transition::Stay)
    }

    /// Hover tracking while no button is down.
    fn pointer_move(
        &mut self,
        _ctl: &mut Controller,
        _pane: Pane,
        _location: Point,
        _pixel_size: f64,
    ) -> Transition {
        Transition::Stay
    }

    /// Update provisional geometry during a drag. Never commits.
    fn pointer_drag(
        &mut self,
        _ctl: &mut Controller,
        _pane: Pane,
        _location: Point,
        _start: Point,
        _pixel_size: f64,
    ) -> Transition {
        Transition::Stay
    }

    /// Finish a drag: compute the final delta and commit it.
    fn pointer_drag_end(
        &mut self,
        _ctl: &mut Controller,
        _pane: Pane,
        _location: Point,
        _start: Point,
        _pixel_size: f64,
    ) -> Result<Transition, EditError> {
        Ok(Transition::ToDefault)
    }

    /// Abandon a drag without touching the document. The host routes
    /// focus loss, escape, and window deactivation here.
    fn pointer_drag_cancelled(&mut self, _ctl: &mut Controller, _pane: Pane) -> Transition {
        Transition::ToDefault
    }

    /// A press-and-release that stayed within the click threshold.
    fn pointer_click(
        &mut self,
        _ctl: &mut Controller,
        _pane: Pane,
        _location: Point,
        _pixel_size: f64,
    ) -> Result<Transition, EditError> {
        Ok(Transition::Stay)
    }

    fn cursor(&self, _ctl: &Controller, _pane: Pane, _location: Point, _pixel_size: f64) -> CursorHint {
        CursorHint::Default
    }

    fn status_text(&self) -> &'static str {
        ""
    }

    /// Whether escape may abandon this mode. Only the default mode
    /// says no.
    fn can_cancel(&self) -> bool {
        true
    }
}

// ─── Default mode ────────────────────────────────────────────────────────

/// The resting state: clicking selects, pressing a selected draggable
/// object starts a drag, pressing empty map starts a (delayed) pan.
pub struct DefaultMode;

impl DefaultMode {
    pub fn new() -> Self {
        Self
    }

    /// The selected, draggable object under the pointer, if any.
    fn hit_selected_draggable(
        ctl: &Controller,
        location: Point,
        pixel_size: f64,
    ) -> Option<CourseObject> {
        let selected = ctl.selected_objects();
        let id = hit_test(
            selected.iter().copied().filter(|o| o.is_draggable()),
            location,
            pixel_size,
            HIT_TOLERANCE_PX,
        )?;
        ctl.course().get(id).cloned()
    }

    fn hit_topology_draggable(
        ctl: &Controller,
        location: Point,
        pixel_size: f64,
    ) -> Option<CourseObject> {
        let id = hit_test(
            ctl.course().topology().filter(|o| o.is_draggable()),
            location,
            pixel_size,
            HIT_TOLERANCE_PX,
        )?;
        ctl.course().get_topology(id).cloned()
    }
}

impl Default for DefaultMode {
    fn default() -> Self {
        Self::new()
    }
}

impl Mode for DefaultMode {
    fn highlights(&self, ctl: &Controller, pane: Pane) -> Option<Vec<Highlight>> {
        let selected = match pane {
            Pane::Map => ctl.selected_objects(),
            Pane::Topology => ctl.selected_topology_objects(),
        };
        if selected.is_empty() {
            return None;
        }
        Some(
            selected
                .into_iter()
                .map(|o| Highlight::Object(o.clone()))
                .collect(),
        )
    }

    fn pointer_down(
        &mut self,
        ctl: &mut Controller,
        pane: Pane,
        location: Point,
        pixel_size: f64,
    ) -> (DragAction, Transition) {
        match pane {
            Pane::Map => {
                // A press over a selected draggable object starts a drag.
                if let Some(object) = Self::hit_selected_draggable(ctl, location, pixel_size) {
                    let mode = DragObjectMode::new(object, location);
                    return (DragAction::ImmediateDrag, Transition::To(Box::new(mode)));
                }
                // Anything else: wait to see whether this is a click
                // (select) or a drag (pan).
                (DragAction::DelayedDrag, Transition::Stay)
            }
            Pane::Topology => {
                if let Some(object) = Self::hit_topology_draggable(ctl, location, pixel_size) {
                    ctl.select_object(object.id);
                    (DragAction::DelayedDrag, Transition::Stay)
                } else {
                    (DragAction::None, Transition::Stay)
                }
            }
        }
    }

    fn pointer_drag(
        &mut self,
        ctl: &mut Controller,
        pane: Pane,
        _location: Point,
        start: Point,
        pixel_size: f64,
    ) -> Transition {
        match pane {
            // A promoted delayed drag on the map that didn't grab an
            // object pans the map.
            Pane::Map => Transition::BeginMapPan,
            Pane::Topology => {
                match Self::hit_topology_draggable(ctl, start, pixel_size) {
                    Some(object) => {
                        Transition::To(Box::new(TopologyDragMode::new(object, start)))
                    }
                    None => Transition::Stay,
                }
            }
        }
    }

    fn pointer_click(
        &mut self,
        ctl: &mut Controller,
        pane: Pane,
        location: Point,
        pixel_size: f64,
    ) -> Result<Transition, EditError> {
        let hit = match pane {
            Pane::Map => hit_test(ctl.course().objects(), location, pixel_size, HIT_TOLERANCE_PX),
            Pane::Topology => hit_test(
                ctl.course().topology(),
                location,
                pixel_size,
                HIT_TOLERANCE_PX,
            ),
        };
        match hit {
            Some(id) => ctl.select_object(id),
            // Clicking empty map clears the selection.
            None if pane == Pane::Map => ctl.clear_selection(),
            None => {}
        }
        Ok(Transition::Stay)
    }

    fn cursor(&self, ctl: &Controller, pane: Pane, location: Point, pixel_size: f64) -> CursorHint {
        if pane == Pane::Map
            && Self::hit_selected_draggable(ctl, location, pixel_size).is_some()
        {
            CursorHint::Move
        } else {
            CursorHint::Default
        }
    }

    fn status_text(&self) -> &'static str {
        status::DEFAULT
    }

    fn can_cancel(&self) -> bool {
        false
    }

    fn pointer_drag_cancelled(&mut self, _ctl: &mut Controller, _pane: Pane) -> Transition {
        Transition::Stay
    }
}

// ─── Drag-object mode ────────────────────────────────────────────────────

/// Dragging one selected object on the map pane. Owns a provisional
/// clone; the document moves once, on drag end.
pub struct DragObjectMode {
    object_start: CourseObject,
    object_drag: CourseObject,
    start_drag: Point,
}

impl DragObjectMode {
    pub fn new(object: CourseObject, start_drag: Point) -> Self {
        Self {
            object_drag: object.clone(),
            object_start: object,
            start_drag,
        }
    }
}

impl Mode for DragObjectMode {
    fn highlights(&self, _ctl: &Controller, pane: Pane) -> Option<Vec<Highlight>> {
        if pane != Pane::Map {
            return None;
        }
        Some(vec![Highlight::Object(self.object_drag.clone())])
    }

    fn pointer_down(
        &mut self,
        _ctl: &mut Controller,
        pane: Pane,
        _location: Point,
        _pixel_size: f64,
    ) -> (DragAction, Transition) {
        let action = if pane == Pane::Map {
            DragAction::ImmediateDrag
        } else {
            DragAction::None
        };
        (action, Transition::Stay)
    }

    fn pointer_drag(
        &mut self,
        _ctl: &mut Controller,
        _pane: Pane,
        location: Point,
        _start: Point,
        _pixel_size: f64,
    ) -> Transition {
        // Rebuild the provisional clone from the pristine original so
        // deltas never accumulate drift.
        self.object_drag = self.object_start.clone();
        self.object_drag
            .offset(location.x - self.start_drag.x, location.y - self.start_drag.y);
        Transition::Stay
    }

    fn pointer_drag_end(
        &mut self,
        ctl: &mut Controller,
        _pane: Pane,
        location: Point,
        _start: Point,
        _pixel_size: f64,
    ) -> Result<Transition, EditError> {
        let dx = location.x - self.start_drag.x;
        let dy = location.y - self.start_drag.y;
        ctl.move_object(self.object_start.id, dx, dy)?;
        Ok(Transition::ToDefault)
    }

    fn cursor(&self, _ctl: &Controller, pane: Pane, _location: Point, _pixel_size: f64) -> CursorHint {
        if pane == Pane::Map {
            CursorHint::Move
        } else {
            CursorHint::Default
        }
    }

    fn status_text(&self) -> &'static str {
        status::DRAGGING_OBJECT
    }
}

// ─── Topology-drag mode ──────────────────────────────────────────────────

/// Dragging an object in the topology pane, snapping to the nearest
/// drop slot within [`MAX_DROP_DISTANCE`].
pub struct TopologyDragMode {
    object_start: CourseObject,
    object_drag: CourseObject,
    start_drag: Point,
    drop_target: Option<Point>,
}

impl TopologyDragMode {
    pub fn new(object: CourseObject, start_drag: Point) -> Self {
        Self {
            object_drag: object.clone(),
            object_start: object,
            start_drag,
            drop_target: None,
        }
    }

    fn nearest_drop_target(ctl: &Controller, location: Point) -> Option<Point> {
        let mut nearest = None;
        let mut nearest_distance = MAX_DROP_DISTANCE;
        for &slot in ctl.drop_targets() {
            let d = geometry::distance(location, slot);
            if d < nearest_distance {
                nearest_distance = d;
                nearest = Some(slot);
            }
        }
        nearest
    }
}

impl Mode for TopologyDragMode {
    fn highlights(&self, _ctl: &Controller, pane: Pane) -> Option<Vec<Highlight>> {
        if pane != Pane::Topology {
            return None;
        }
        let mut highlights = vec![Highlight::Object(self.object_drag.clone())];
        if let Some(slot) = self.drop_target {
            highlights.push(Highlight::DropTarget(slot));
        }
        Some(highlights)
    }

    fn pointer_down(
        &mut self,
        _ctl: &mut Controller,
        pane: Pane,
        _location: Point,
        _pixel_size: f64,
    ) -> (DragAction, Transition) {
        let action = if pane == Pane::Topology {
            DragAction::ImmediateDrag
        } else {
            DragAction::None
        };
        (action, Transition::Stay)
    }

    fn pointer_drag(
        &mut self,
        ctl: &mut Controller,
        _pane: Pane,
        location: Point,
        _start: Point,
        _pixel_size: f64,
    ) -> Transition {
        self.object_drag = self.object_start.clone();
        self.object_drag
            .offset(location.x - self.start_drag.x, location.y - self.start_drag.y);
        self.drop_target = Self::nearest_drop_target(ctl, location);
        Transition::Stay
    }

    fn pointer_drag_end(
        &mut self,
        ctl: &mut Controller,
        _pane: Pane,
        _location: Point,
        _start: Point,
        _pixel_size: f64,
    ) -> Result<Transition, EditError> {
        if let Some(slot) = self.drop_target.take() {
            ctl.move_topology_object(self.object_start.id, slot)?;
        }
        Ok(Transition::ToDefault)
    }

    fn pointer_drag_cancelled(&mut self, _ctl: &mut Controller, _pane: Pane) -> Transition {
        self.drop_target = None;
        Transition::ToDefault
    }

    fn cursor(&self, _ctl: &Controller, pane: Pane, _location: Point, _pixel_size: f64) -> CursorHint {
        if pane == Pane::Topology {
            CursorHint::Move
        } else {
            CursorHint::Default
        }
    }

    fn status_text(&self) -> &'static str {
        status::DRAGGING_TOPOLOGY_OBJECT
    }
}

// ─── Rotate mode ─────────────────────────────────────────────────────────

/// Rotating an oriented object. The provisional clone follows the
/// hover location; a click commits the shown orientation.
pub struct RotateMode {
    object: CourseObject,
}

impl RotateMode {
    pub fn new(object: CourseObject) -> Self {
        Self { object }
    }

    /// Point the object at the given location.
    fn rotate_to(&mut self, location: Point) {
        let degrees = geometry::angle(self.object.location(), location);
        self.object.change_orientation(degrees);
    }
}

impl Mode for RotateMode {
    fn highlights(&self, _ctl: &Controller, pane: Pane) -> Option<Vec<Highlight>> {
        if pane != Pane::Map {
            return None;
        }
        Some(vec![Highlight::Object(self.object.clone())])
    }

    fn pointer_move(
        &mut self,
        _ctl: &mut Controller,
        pane: Pane,
        location: Point,
        _pixel_size: f64,
    ) -> Transition {
        if pane == Pane::Map {
            self.rotate_to(location);
        }
        Transition::Stay
    }

    fn pointer_click(
        &mut self,
        ctl: &mut Controller,
        pane: Pane,
        location: Point,
        _pixel_size: f64,
    ) -> Result<Transition, EditError> {
        if pane != Pane::Map {
            return Ok(Transition::Stay);
        }
        self.rotate_to(location);
        ctl.rotate(self.object.orientation().unwrap_or(0.0))?;
        Ok(Transition::ToDefault)
    }

    fn cursor(&self, _ctl: &Controller, _pane: Pane, _location: Point, _pixel_size: f64) -> CursorHint {
        CursorHint::Crosshair
    }

    fn status_text(&self) -> &'static str {
        status::ROTATING_OBJECT
    }
}

// ─── Move-all mode ───────────────────────────────────────────────────────

/// Bulk move/scale/rotate: collects the action's reference points via
/// sequential clicks, previewing the in-progress transform on clones
/// of every map object, then commits once with the full point set.
pub struct MoveAllMode {
    action: MoveAction,
    points: SmallVec<[Point; 4]>,
    hover: Option<Point>,
}

impl MoveAllMode {
    /// The action kind comes from an external choice dialog and is
    /// validated here, before any points are collected.
    pub fn new(action: MoveAction) -> Result<Self, EditError> {
        if action == MoveAction::None {
            return Err(TransformError::UnsupportedAction.into());
        }
        Ok(Self {
            action,
            points: SmallVec::new(),
            hover: None,
        })
    }

    fn needed(&self) -> usize {
        self.action.point_count()
    }

    /// Constrain the 4th pick so the user cannot introduce a component
    /// the chosen action doesn't have: scale picks stay on the
    /// half-line from the destination through the reference, rotate
    /// picks stay on the circle through the reference.
    fn constrain(&self, raw: Point) -> Point {
        if self.points.len() != 3 {
            return raw;
        }
        let p1 = self.points[1];
        let p2 = self.points[2];
        match self.action {
            MoveAction::MoveScale => {
                let near = Point::new(
                    p1.x + (p2.x - p1.x) * 0.01,
                    p1.y + (p2.y - p1.y) * 0.01,
                );
                let far = Point::new(
                    p1.x + (p2.x - p1.x) * 10000.0,
                    p1.y + (p2.y - p1.y) * 10000.0,
                );
                geometry::closest_point_on_segment(near, far, raw)
            }
            MoveAction::MoveRotate => {
                let radius = geometry::distance(p1, p2);
                let theta = (raw.y - p1.y).atan2(raw.x - p1.x);
                Point::new(
                    p1.x + radius * theta.cos(),
                    p1.y + radius * theta.sin(),
                )
            }
            _ => raw,
        }
    }

    /// The transform shown while points are still being collected:
    /// offset-only once the destination is known, the full transform
    /// once all points are in.
    fn preview_computation(&self) -> Option<MoveComputation> {
        let mut candidate = self.points.clone();
        if candidate.len() < self.needed() {
            if let Some(hover) = self.hover {
                candidate.push(hover);
            }
        }
        if candidate.len() >= self.needed() {
            return MoveComputation::new(self.action, &candidate[..self.needed()]).ok();
        }
        if candidate.len() >= 2 {
            return MoveComputation::new(MoveAction::Move, &candidate[..2]).ok();
        }
        None
    }
}

impl Mode for MoveAllMode {
    fn highlights(&self, ctl: &Controller, pane: Pane) -> Option<Vec<Highlight>> {
        if pane != Pane::Map {
            return None;
        }
        let computation = self.preview_computation()?;
        let matrix = computation.matrix();
        Some(
            ctl.course()
                .objects()
                .map(|o| {
                    let mut clone = o.clone();
                    clone.apply(matrix);
                    Highlight::Object(clone)
                })
                .collect(),
        )
    }

    fn pointer_down(
        &mut self,
        _ctl: &mut Controller,
        pane: Pane,
        _location: Point,
        _pixel_size: f64,
    ) -> (DragAction, Transition) {
        // Delay so the press can still turn into a map pan.
        let action = if pane == Pane::Map {
            DragAction::DelayedDrag
        } else {
            DragAction::None
        };
        (action, Transition::Stay)
    }

    fn pointer_move(
        &mut self,
        _ctl: &mut Controller,
        pane: Pane,
        location: Point,
        _pixel_size: f64,
    ) -> Transition {
        if pane == Pane::Map {
            self.hover = Some(self.constrain(location));
        }
        Transition::Stay
    }

    fn pointer_drag(
        &mut self,
        _ctl: &mut Controller,
        pane: Pane,
        _location: Point,
        _start: Point,
        _pixel_size: f64,
    ) -> Transition {
        if pane == Pane::Map {
            Transition::BeginMapPan
        } else {
            Transition::Stay
        }
    }

    fn pointer_click(
        &mut self,
        ctl: &mut Controller,
        pane: Pane,
        location: Point,
        _pixel_size: f64,
    ) -> Result<Transition, EditError> {
        if pane != Pane::Map {
            return Ok(Transition::Stay);
        }
        let point = self.constrain(location);
        self.points.push(point);
        log::trace!(
            "move all: captured point {}/{} at ({:.2}, {:.2})",
            self.points.len(),
            self.needed(),
            point.x,
            point.y
        );
        if self.points.len() == self.needed() {
            ctl.move_all_objects(self.action, &self.points)?;
            return Ok(Transition::ToDefault);
        }
        Ok(Transition::Stay)
    }

    fn cursor(&self, _ctl: &Controller, _pane: Pane, _location: Point, _pixel_size: f64) -> CursorHint {
        CursorHint::Crosshair
    }

    fn status_text(&self) -> &'static str {
        match self.points.len() {
            0 => status::PICK_REFERENCE,
            1 => status::PICK_DESTINATION,
            2 => status::PICK_SECOND_REFERENCE,
            _ => status::PICK_SECOND_DESTINATION,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tp_core::course::CourseDb;
    use tp_core::id::ObjectId;
    use tp_core::model::ObjectKind;

    fn controller() -> Controller {
        let mut db = CourseDb::new();
        db.insert(CourseObject::new(
            ObjectId::intern("c1"),
            ObjectKind::Control {
                location: Point::new(10.0, 10.0),
            },
        ));
        Controller::new(db)
    }

    #[test]
    fn drag_mode_updates_only_its_clone() {
        let mut ctl = controller();
        let object = ctl.course().get(ObjectId::intern("c1")).unwrap().clone();
        let mut mode = DragObjectMode::new(object, Point::new(10.0, 10.0));

        mode.pointer_drag(&mut ctl, Pane::Map, Point::new(15.0, 12.0), Point::new(10.0, 10.0), 1.0);

        let highlights = mode.highlights(&ctl, Pane::Map).unwrap();
        let Highlight::Object(dragged) = &highlights[0] else {
            panic!("expected object highlight");
        };
        assert_eq!(dragged.location(), Point::new(15.0, 12.0));
        // Authoritative copy untouched until drag end.
        assert_eq!(
            ctl.course().get(ObjectId::intern("c1")).unwrap().location(),
            Point::new(10.0, 10.0)
        );
        // Other panes are unaffected.
        assert!(mode.highlights(&ctl, Pane::Topology).is_none());
    }

    #[test]
    fn drag_deltas_do_not_accumulate() {
        let mut ctl = controller();
        let object = ctl.course().get(ObjectId::intern("c1")).unwrap().clone();
        let start = Point::new(10.0, 10.0);
        let mut mode = DragObjectMode::new(object, start);

        for step in 1..=5 {
            mode.pointer_drag(
                &mut ctl,
                Pane::Map,
                Point::new(10.0 + step as f64, 10.0),
                start,
                1.0,
            );
        }
        let highlights = mode.highlights(&ctl, Pane::Map).unwrap();
        let Highlight::Object(dragged) = &highlights[0] else {
            panic!("expected object highlight");
        };
        assert_eq!(dragged.location(), Point::new(15.0, 10.0));
    }

    #[test]
    fn rotate_mode_follows_hover_and_commits_on_click() {
        let mut ctl = controller();
        let crossing = CourseObject::new(
            ObjectId::intern("x1"),
            ObjectKind::CrossingPoint {
                location: Point::new(0.0, 0.0),
                orientation: 0.0,
            },
        );
        ctl.course_mut().insert(crossing.clone());
        ctl.select_object(crossing.id);

        let mut mode = RotateMode::new(crossing);
        mode.pointer_move(&mut ctl, Pane::Map, Point::new(0.0, 5.0), 1.0);
        let highlights = mode.highlights(&ctl, Pane::Map).unwrap();
        let Highlight::Object(preview) = &highlights[0] else {
            panic!("expected object highlight");
        };
        assert!((preview.orientation().unwrap() - 90.0).abs() < 1e-9);
        // Hovering alone commits nothing.
        assert_eq!(
            ctl.course().get(ObjectId::intern("x1")).unwrap().orientation(),
            Some(0.0)
        );

        let t = mode
            .pointer_click(&mut ctl, Pane::Map, Point::new(-5.0, 0.0), 1.0)
            .unwrap();
        assert!(matches!(t, Transition::ToDefault));
        assert!(
            (ctl.course()
                .get(ObjectId::intern("x1"))
                .unwrap()
                .orientation()
                .unwrap()
                - 180.0)
                .abs()
                < 1e-9
        );
    }

    #[test]
    fn move_all_mode_rejects_unset_action() {
        assert!(matches!(
            MoveAllMode::new(MoveAction::None),
            Err(EditError::Transform(TransformError::UnsupportedAction))
        ));
    }

    #[test]
    fn move_all_rotate_constrains_fourth_pick_to_circle() {
        let mut mode = MoveAllMode::new(MoveAction::MoveRotate).unwrap();
        mode.points.push(Point::new(0.0, 0.0));
        mode.points.push(Point::new(0.0, 0.0));
        mode.points.push(Point::new(10.0, 0.0));

        let picked = mode.constrain(Point::new(0.0, 3.0));
        // Projected onto the radius-10 circle around the destination.
        assert!((geometry::distance(Point::new(0.0, 0.0), picked) - 10.0).abs() < 1e-9);
        assert!((picked.y - 10.0).abs() < 1e-9);
    }

    #[test]
    fn move_all_scale_constrains_fourth_pick_to_half_line() {
        let mut mode = MoveAllMode::new(MoveAction::MoveScale).unwrap();
        mode.points.push(Point::new(0.0, 0.0));
        mode.points.push(Point::new(0.0, 0.0));
        mode.points.push(Point::new(10.0, 0.0));

        let picked = mode.constrain(Point::new(5.0, 7.0));
        assert!(picked.y.abs() < 1e-9, "pick must land on the reference ray");
        assert!((picked.x - 5.0).abs() < 1e-9);

        // Picks behind the destination clamp to the near end of the ray.
        let behind = mode.constrain(Point::new(-20.0, 0.0));
        assert!(behind.x > 0.0);
    }

    #[test]
    fn default_mode_press_over_selected_object_starts_drag() {
        let mut ctl = controller();
        ctl.select_object(ObjectId::intern("c1"));
        let mut mode = DefaultMode::new();

        let (action, transition) =
            mode.pointer_down(&mut ctl, Pane::Map, Point::new(10.0, 10.0), 1.0);
        assert_eq!(action, DragAction::ImmediateDrag);
        assert!(matches!(transition, Transition::To(_)));
    }

    #[test]
    fn default_mode_press_on_empty_map_is_delayed() {
        let mut ctl = controller();
        let mut mode = DefaultMode::new();
        let (action, transition) =
            mode.pointer_down(&mut ctl, Pane::Map, Point::new(100.0, 100.0), 1.0);
        assert_eq!(action, DragAction::DelayedDrag);
        assert!(matches!(transition, Transition::Stay));
    }

    #[test]
    fn default_mode_click_selects_and_clears() {
        let mut ctl = controller();
        let mut mode = DefaultMode::new();

        mode.pointer_click(&mut ctl, Pane::Map, Point::new(10.0, 10.0), 1.0)
            .unwrap();
        assert!(ctl.selection().is_selected(ObjectId::intern("c1")));

        mode.pointer_click(&mut ctl, Pane::Map, Point::new(100.0, 100.0), 1.0)
            .unwrap();
        assert!(ctl.selection().is_empty());
    }

    #[test]
    fn topology_drag_snaps_to_nearby_slot() {
        let mut ctl = controller();
        let topo = CourseObject::new(
            ObjectId::intern("t1"),
            ObjectKind::Control {
                location: Point::new(0.0, 0.0),
            },
        );
        ctl.course_mut().insert_topology(topo.clone());
        ctl.set_drop_targets(vec![Point::new(50.0, 0.0), Point::new(200.0, 0.0)]);

        let mut mode = TopologyDragMode::new(topo, Point::new(0.0, 0.0));
        mode.pointer_drag(&mut ctl, Pane::Topology, Point::new(45.0, 0.0), Point::new(0.0, 0.0), 1.0);

        let highlights = mode.highlights(&ctl, Pane::Topology).unwrap();
        assert_eq!(highlights.len(), 2, "dragged clone plus drop target");
        assert!(matches!(
            highlights[1],
            Highlight::DropTarget(p) if p == Point::new(50.0, 0.0)
        ));

        // Out of range: no target highlighted.
        mode.pointer_drag(&mut ctl, Pane::Topology, Point::new(120.0, 0.0), Point::new(0.0, 0.0), 1.0);
        assert_eq!(mode.highlights(&ctl, Pane::Topology).unwrap().len(), 1);
    }
}
