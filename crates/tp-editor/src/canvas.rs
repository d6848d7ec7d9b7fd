//! The canvas host: owns the current-mode slot and turns a raw pointer
//! stream into mode callbacks.
//!
//! The host guarantees the mode-engine invariants the modes themselves
//! cannot: there is always exactly one active mode (the default mode
//! is the fallback), every gesture ends in exactly one drag-end,
//! click, or cancel, and a failed commit still lands back in the
//! default mode instead of wedging the interaction.
//!
//! Pointer input arrives in pixel coordinates; the host converts to
//! world coordinates through its viewport (zoom + pan) before calling
//! the mode.

use crate::controller::{Controller, EditError};
use crate::modes::{DefaultMode, DragAction, Mode, Pane, Transition};
use kurbo::{Affine, Point, Vec2};
use peniko::{Brush, Color};
use tp_render::overlay::{DisplayList, Highlight, Overlay};

/// Maximum pointer travel, in pixels, for a press-release to count as
/// a click.
pub const MAX_CLICK_DISTANCE: f64 = 1.7;
/// Minimum pointer travel, in pixels, for a delayed press to become a
/// drag.
pub const MIN_DRAG_DISTANCE: f64 = 2.8;

#[derive(Debug, Clone, Copy)]
enum Gesture {
    Idle,
    Pressed {
        pane: Pane,
        action: DragAction,
        start_world: Point,
        start_pixel: Point,
        dragging: bool,
    },
    MapPanning {
        last_pixel: Point,
    },
}

/// The canvas host.
pub struct EditCanvas {
    controller: Controller,
    mode: Box<dyn Mode>,
    gesture: Gesture,
    /// Pixels per world unit.
    zoom: f64,
    /// Pixel offset of the world origin.
    pan: Vec2,
    erase_brush: Brush,
    /// Last frame's overlays per pane, replayed as erases next frame.
    prev_frame: [Vec<Highlight>; 2],
}

impl EditCanvas {
    pub fn new(controller: Controller) -> Self {
        Self {
            controller,
            mode: Box::new(DefaultMode::new()),
            gesture: Gesture::Idle,
            zoom: 1.0,
            pan: Vec2::ZERO,
            erase_brush: Brush::Solid(Color::from_rgb8(0xFF, 0xFF, 0xFF)),
            prev_frame: [Vec::new(), Vec::new()],
        }
    }

    // ─── Viewport ────────────────────────────────────────────────────

    pub fn world_to_pixel(&self) -> Affine {
        Affine::scale(self.zoom).then_translate(self.pan)
    }

    pub fn pixel_to_world(&self, pixel: Point) -> Point {
        self.world_to_pixel().inverse() * pixel
    }

    /// Size of one pixel in world units.
    pub fn pixel_size(&self) -> f64 {
        1.0 / self.zoom
    }

    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = zoom.max(1e-6);
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn pan(&self) -> Vec2 {
        self.pan
    }

    pub fn set_pan(&mut self, pan: Vec2) {
        self.pan = pan;
    }

    /// The brush that repaints background where a highlight was. The
    /// shell supplies one backed by its map cache.
    pub fn set_erase_brush(&mut self, brush: Brush) {
        self.erase_brush = brush;
    }

    pub fn controller(&self) -> &Controller {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut Controller {
        &mut self.controller
    }

    // ─── Mode management ─────────────────────────────────────────────

    pub fn status_text(&self) -> &'static str {
        self.mode.status_text()
    }

    pub fn can_cancel_mode(&self) -> bool {
        self.mode.can_cancel()
    }

    pub fn cursor(&self, pane: Pane, pixel: Point) -> crate::modes::CursorHint {
        let world = self.pixel_to_world(pixel);
        self.mode
            .cursor(&self.controller, pane, world, self.pixel_size())
    }

    /// Start rotating the selected object. Fails when nothing
    /// rotatable is selected.
    pub fn begin_rotate(&mut self) -> Result<(), EditError> {
        let object = self
            .controller
            .selected_object()
            .ok_or(EditError::NothingSelected)?;
        if !object.is_oriented() {
            return Err(EditError::NotRotatable);
        }
        self.mode = Box::new(crate::modes::RotateMode::new(object.clone()));
        Ok(())
    }

    /// Start the bulk move flow with the action kind the user chose in
    /// the external dialog. Fails fast on an unset kind.
    pub fn begin_move_all(
        &mut self,
        action: tp_core::transform::MoveAction,
    ) -> Result<(), EditError> {
        self.mode = Box::new(crate::modes::MoveAllMode::new(action)?);
        Ok(())
    }

    fn install(&mut self, transition: Transition) {
        match transition {
            Transition::Stay => {}
            Transition::ToDefault => self.mode = Box::new(DefaultMode::new()),
            Transition::To(mode) => self.mode = mode,
            // Handled where the pixel location is known.
            Transition::BeginMapPan => {}
        }
    }

    /// A commit failed: surface it in the log and fall back to the
    /// default mode so the interaction cannot get stuck.
    fn recover(&mut self, err: EditError) {
        log::warn!("commit failed, returning to default mode: {err}");
        self.mode = Box::new(DefaultMode::new());
    }

    // ─── Pointer stream ──────────────────────────────────────────────

    pub fn pointer_down(&mut self, pane: Pane, pixel: Point) {
        let world = self.pixel_to_world(pixel);
        let pixel_size = self.pixel_size();
        let (action, transition) =
            self.mode
                .pointer_down(&mut self.controller, pane, world, pixel_size);
        self.install(transition);

        self.gesture = match action {
            DragAction::MapDrag => Gesture::MapPanning { last_pixel: pixel },
            _ => Gesture::Pressed {
                pane,
                action,
                start_world: world,
                start_pixel: pixel,
                dragging: false,
            },
        };
    }

    pub fn pointer_moved(&mut self, pane: Pane, pixel: Point) {
        match self.gesture {
            Gesture::Idle => {
                let world = self.pixel_to_world(pixel);
                let pixel_size = self.pixel_size();
                let transition =
                    self.mode
                        .pointer_move(&mut self.controller, pane, world, pixel_size);
                self.install(transition);
            }
            Gesture::MapPanning { last_pixel } => {
                self.pan += pixel - last_pixel;
                self.gesture = Gesture::MapPanning { last_pixel: pixel };
            }
            Gesture::Pressed {
                pane: press_pane,
                action,
                start_world,
                start_pixel,
                dragging,
            } => {
                let promote = dragging
                    || match action {
                        DragAction::ImmediateDrag => true,
                        DragAction::DelayedDrag => {
                            (pixel - start_pixel).hypot() >= MIN_DRAG_DISTANCE
                        }
                        DragAction::None | DragAction::MapDrag => false,
                    };
                if !promote {
                    return;
                }
                self.gesture = Gesture::Pressed {
                    pane: press_pane,
                    action,
                    start_world,
                    start_pixel,
                    dragging: true,
                };
                self.route_drag(press_pane, pixel, start_world);
            }
        }
    }

    fn route_drag(&mut self, pane: Pane, pixel: Point, start_world: Point) {
        let world = self.pixel_to_world(pixel);
        let pixel_size = self.pixel_size();
        let transition =
            self.mode
                .pointer_drag(&mut self.controller, pane, world, start_world, pixel_size);
        match transition {
            Transition::BeginMapPan => {
                self.gesture = Gesture::MapPanning { last_pixel: pixel };
            }
            Transition::To(mode) => {
                // Hand the in-flight drag straight to the new mode so
                // it doesn't lose the current frame.
                self.mode = mode;
                let t = self.mode.pointer_drag(
                    &mut self.controller,
                    pane,
                    world,
                    start_world,
                    pixel_size,
                );
                self.install(t);
            }
            other => self.install(other),
        }
    }

    pub fn pointer_up(&mut self, pane: Pane, pixel: Point) {
        let gesture = self.gesture;
        self.gesture = Gesture::Idle;

        match gesture {
            Gesture::Idle | Gesture::MapPanning { .. } => {}
            Gesture::Pressed {
                pane: press_pane,
                start_world,
                start_pixel,
                dragging,
                ..
            } => {
                let world = self.pixel_to_world(pixel);
                let pixel_size = self.pixel_size();
                if dragging {
                    match self.mode.pointer_drag_end(
                        &mut self.controller,
                        press_pane,
                        world,
                        start_world,
                        pixel_size,
                    ) {
                        Ok(transition) => self.install(transition),
                        Err(err) => self.recover(err),
                    }
                } else if (pixel - start_pixel).hypot() <= MAX_CLICK_DISTANCE {
                    match self.mode.pointer_click(
                        &mut self.controller,
                        pane,
                        world,
                        pixel_size,
                    ) {
                        Ok(transition) => self.install(transition),
                        Err(err) => self.recover(err),
                    }
                }
                // Between the click and drag thresholds: neither.
            }
        }
    }

    /// Abort whatever gesture or mode is active. The shell calls this
    /// on escape, focus loss, and window deactivation; the document is
    /// left exactly as it was.
    pub fn cancel_gesture(&mut self) {
        let gesture = self.gesture;
        self.gesture = Gesture::Idle;

        if let Gesture::Pressed {
            pane, dragging: true, ..
        } = gesture
        {
            let transition = self.mode.pointer_drag_cancelled(&mut self.controller, pane);
            self.install(transition);
        } else if self.mode.can_cancel() {
            self.mode = Box::new(DefaultMode::new());
        }
    }

    // ─── Painting ────────────────────────────────────────────────────

    /// Record one pane's overlay frame: erase last frame's overlays,
    /// then draw the current ones. An empty list means the pane needs
    /// no repaint.
    pub fn frame_ops(&mut self, pane: Pane) -> DisplayList {
        let index = pane_index(pane);
        let world_to_pixel = self.world_to_pixel();
        let new = self
            .mode
            .highlights(&self.controller, pane)
            .unwrap_or_default();

        let mut list = DisplayList::new();
        for highlight in &self.prev_frame[index] {
            highlight.erase(&mut list, world_to_pixel, &self.erase_brush);
        }
        for highlight in &new {
            highlight.draw(&mut list, world_to_pixel);
        }
        self.prev_frame[index] = new;
        list
    }
}

fn pane_index(pane: Pane) -> usize {
    match pane {
        Pane::Map => 0,
        Pane::Topology => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tp_core::course::CourseDb;
    use tp_core::id::ObjectId;
    use tp_core::model::{CourseObject, ObjectKind};

    fn canvas_with_control() -> EditCanvas {
        let mut db = CourseDb::new();
        db.insert(CourseObject::new(
            ObjectId::intern("c1"),
            ObjectKind::Control {
                location: Point::new(10.0, 10.0),
            },
        ));
        EditCanvas::new(Controller::new(db))
    }

    #[test]
    fn starts_in_default_mode() {
        let canvas = canvas_with_control();
        assert!(!canvas.can_cancel_mode());
    }

    #[test]
    fn sub_threshold_release_is_a_click() {
        let mut canvas = canvas_with_control();
        canvas.pointer_down(Pane::Map, Point::new(10.0, 10.0));
        canvas.pointer_moved(Pane::Map, Point::new(10.5, 10.0));
        canvas.pointer_up(Pane::Map, Point::new(10.5, 10.0));
        assert!(
            canvas
                .controller()
                .selection()
                .is_selected(ObjectId::intern("c1")),
            "click on an object selects it"
        );
    }

    #[test]
    fn delayed_press_past_threshold_pans_the_map() {
        let mut canvas = canvas_with_control();
        // Press empty map, move past the drag threshold.
        canvas.pointer_down(Pane::Map, Point::new(100.0, 100.0));
        canvas.pointer_moved(Pane::Map, Point::new(104.0, 100.0));
        // Panning has begun; further motion moves the viewport.
        canvas.pointer_moved(Pane::Map, Point::new(110.0, 100.0));
        assert_eq!(canvas.pan(), Vec2::new(6.0, 0.0));
        canvas.pointer_up(Pane::Map, Point::new(110.0, 100.0));
        assert_eq!(canvas.pan(), Vec2::new(6.0, 0.0));
    }

    #[test]
    fn in_between_release_is_neither_click_nor_drag() {
        let mut canvas = canvas_with_control();
        canvas.pointer_down(Pane::Map, Point::new(10.0, 10.0));
        // 2 px: past the click threshold, short of the drag threshold.
        canvas.pointer_moved(Pane::Map, Point::new(12.0, 10.0));
        canvas.pointer_up(Pane::Map, Point::new(12.0, 10.0));
        assert!(canvas.controller().selection().is_empty());
    }

    #[test]
    fn frame_ops_erase_previous_frame_before_drawing() {
        let mut canvas = canvas_with_control();
        canvas
            .controller_mut()
            .select_object(ObjectId::intern("c1"));

        // First frame: draw only.
        let first = canvas.frame_ops(Pane::Map);
        assert_eq!(first.len(), 1);

        // Second frame: erase the old highlight, draw the new one.
        let second = canvas.frame_ops(Pane::Map);
        assert_eq!(second.len(), 2);

        // Deselect: final frame only erases.
        canvas.controller_mut().clear_selection();
        let third = canvas.frame_ops(Pane::Map);
        assert_eq!(third.len(), 1);
        let fourth = canvas.frame_ops(Pane::Map);
        assert!(fourth.is_empty(), "nothing to repaint once stable");
    }

    #[test]
    fn viewport_roundtrip() {
        let mut canvas = canvas_with_control();
        canvas.set_zoom(2.0);
        canvas.set_pan(Vec2::new(100.0, 50.0));
        let world = Point::new(7.0, -3.0);
        let pixel = canvas.world_to_pixel() * world;
        let back = canvas.pixel_to_world(pixel);
        assert!((back.x - world.x).abs() < 1e-9 && (back.y - world.y).abs() < 1e-9);
    }
}
