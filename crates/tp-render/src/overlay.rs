//! Highlight overlays: transient renderables for provisional and
//! selection geometry.
//!
//! Overlays are stateless renderers. They record paint operations into
//! a [`DisplayList`] that the embedding shell replays onto its surface;
//! nothing here touches document state. The host owns the
//! erase-previous-then-draw-new protocol: it replays each frame's
//! previous overlays through [`Overlay::erase`] (which restores the
//! drawn region from the erase brush) before drawing the new frame.
//!
//! Erase regions are the drawn pixel bounds inflated by half the pen
//! width on each side. Stroked geometry extends half a pen outside its
//! path; erasing the uninflated rect leaves one-pixel fringes behind.

use kurbo::{Affine, BezPath, Circle, Point, Rect, Shape, Vec2};
use peniko::{Brush, Color};
use tp_core::model::{
    CONTROL_RADIUS, CROSSING_BAR, CourseObject, FINISH_RADII, ObjectKind, REG_MARK_ARM,
};

/// Width of the highlight pen, in pixels.
pub const PEN_WIDTH: f64 = 3.0;
/// Side of the square drag handles, in pixels.
pub const HANDLE_SIZE: f64 = 5.0;
/// Flattening tolerance for recorded curves.
const PATH_TOLERANCE: f64 = 0.1;

/// Overprint purple, the course symbology color.
pub fn highlight_color() -> Color {
    Color::from_rgb8(0xA6, 0x26, 0xA0)
}

fn handle_color() -> Color {
    Color::from_rgb8(0x00, 0x00, 0xD0)
}

// ─── Display list ────────────────────────────────────────────────────────

/// One recorded paint operation, in pixel coordinates.
#[derive(Debug, Clone)]
pub enum PaintOp {
    Stroke {
        path: BezPath,
        brush: Brush,
        width: f64,
    },
    Fill {
        path: BezPath,
        brush: Brush,
    },
}

/// A recorded sequence of paint operations for one frame.
#[derive(Debug, Clone, Default)]
pub struct DisplayList {
    ops: Vec<PaintOp>,
}

impl DisplayList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stroke(&mut self, path: BezPath, brush: Brush, width: f64) {
        self.ops.push(PaintOp::Stroke { path, brush, width });
    }

    pub fn fill(&mut self, path: BezPath, brush: Brush) {
        self.ops.push(PaintOp::Fill { path, brush });
    }

    pub fn ops(&self) -> &[PaintOp] {
        &self.ops
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

// ─── Overlay contract ────────────────────────────────────────────────────

/// A drawable overlay in world coordinates.
pub trait Overlay {
    /// Record the overlay's geometry, transformed to pixel space.
    fn draw(&self, list: &mut DisplayList, world_to_pixel: Affine);

    /// Record fills that restore exactly the region `draw` covered,
    /// inflated by half the stroke width.
    fn erase(&self, list: &mut DisplayList, world_to_pixel: Affine, erase_brush: &Brush);

    /// World-space bounds of the drawn geometry, stroke excluded.
    fn bounds(&self) -> Rect;
}

/// The overlays the editing modes produce.
#[derive(Debug, Clone)]
pub enum Highlight {
    /// A provisional or selected course object.
    Object(CourseObject),
    /// A marquee-style rectangle.
    Rectangle(Rect),
    /// A topology slot the dragged object may snap to.
    DropTarget(Point),
}

impl Overlay for Highlight {
    fn draw(&self, list: &mut DisplayList, world_to_pixel: Affine) {
        match self {
            Highlight::Object(object) => draw_object(object, list, world_to_pixel),
            Highlight::Rectangle(rect) => RectangleHighlight::new(*rect).draw(list, world_to_pixel),
            Highlight::DropTarget(location) => {
                let mut path = Circle::new(*location, CONTROL_RADIUS / 2.0)
                    .to_path(PATH_TOLERANCE);
                path.apply_affine(world_to_pixel);
                list.stroke(path, Brush::Solid(highlight_color()), PEN_WIDTH / 2.0);
            }
        }
    }

    fn erase(&self, list: &mut DisplayList, world_to_pixel: Affine, erase_brush: &Brush) {
        let mut pixel_rect = world_to_pixel.transform_rect_bbox(self.bounds());
        pixel_rect = pixel_rect.inflate(PEN_WIDTH / 2.0, PEN_WIDTH / 2.0);
        list.fill(pixel_rect.to_path(PATH_TOLERANCE), erase_brush.clone());

        if let Highlight::Object(object) = self {
            for handle in object.handles() {
                let r = handle_rect(world_to_pixel * handle)
                    .inflate(PEN_WIDTH / 2.0, PEN_WIDTH / 2.0);
                list.fill(r.to_path(PATH_TOLERANCE), erase_brush.clone());
            }
        }
    }

    fn bounds(&self) -> Rect {
        match self {
            Highlight::Object(object) => object.bounds(),
            Highlight::Rectangle(rect) => *rect,
            Highlight::DropTarget(location) => Rect::new(
                location.x - CONTROL_RADIUS / 2.0,
                location.y - CONTROL_RADIUS / 2.0,
                location.x + CONTROL_RADIUS / 2.0,
                location.y + CONTROL_RADIUS / 2.0,
            ),
        }
    }
}

// ─── Course-object symbology ─────────────────────────────────────────────

fn draw_object(object: &CourseObject, list: &mut DisplayList, world_to_pixel: Affine) {
    let brush = Brush::Solid(highlight_color());
    let mut path = symbol_path(object);
    path.apply_affine(world_to_pixel);
    list.stroke(path, brush, PEN_WIDTH);

    for handle in object.handles() {
        list.fill(
            handle_rect(world_to_pixel * handle).to_path(PATH_TOLERANCE),
            Brush::Solid(handle_color()),
        );
    }
}

/// The world-space outline of an object's map symbol.
fn symbol_path(object: &CourseObject) -> BezPath {
    match &object.kind {
        ObjectKind::Control { location } => {
            Circle::new(*location, CONTROL_RADIUS).to_path(PATH_TOLERANCE)
        }
        ObjectKind::Start {
            location,
            orientation,
        } => {
            // Equilateral triangle pointed along the orientation.
            let r = tp_core::model::start_radius();
            let mut path = BezPath::new();
            for (i, offset) in [0.0, 120.0, 240.0].iter().enumerate() {
                let theta = (orientation + offset).to_radians();
                let vertex = *location + r * Vec2::new(theta.cos(), theta.sin());
                if i == 0 {
                    path.move_to(vertex);
                } else {
                    path.line_to(vertex);
                }
            }
            path.close_path();
            path
        }
        ObjectKind::Finish { location } => {
            let mut path = Circle::new(*location, FINISH_RADII.0).to_path(PATH_TOLERANCE);
            path.extend(Circle::new(*location, FINISH_RADII.1).to_path(PATH_TOLERANCE));
            path
        }
        ObjectKind::CrossingPoint {
            location,
            orientation,
        } => {
            // Two bars flanking the crossing direction.
            let theta = orientation.to_radians();
            let along = Vec2::new(theta.cos(), theta.sin());
            let across = Vec2::new(-theta.sin(), theta.cos());
            let mut path = BezPath::new();
            for side in [-1.0, 1.0] {
                let mid = *location + across * (side * CROSSING_BAR * 0.75);
                path.move_to(mid - along * CROSSING_BAR);
                path.line_to(mid + along * CROSSING_BAR);
            }
            path
        }
        ObjectKind::Leg { start, end } => {
            let mut path = BezPath::new();
            path.move_to(*start);
            path.line_to(*end);
            path
        }
        ObjectKind::RegistrationMark { location } => {
            let mut path = BezPath::new();
            path.move_to(*location - Vec2::new(REG_MARK_ARM, 0.0));
            path.line_to(*location + Vec2::new(REG_MARK_ARM, 0.0));
            path.move_to(*location - Vec2::new(0.0, REG_MARK_ARM));
            path.line_to(*location + Vec2::new(0.0, REG_MARK_ARM));
            path
        }
    }
}

fn handle_rect(pixel_location: Point) -> Rect {
    let half = (HANDLE_SIZE - 1.0) / 2.0;
    Rect::new(
        pixel_location.x - half,
        pixel_location.y - half,
        pixel_location.x + half + 1.0,
        pixel_location.y + half + 1.0,
    )
}

// ─── Rectangle highlight ─────────────────────────────────────────────────

/// Marquee-style rectangle overlay: translucent fill plus outline.
#[derive(Debug, Clone, Copy)]
pub struct RectangleHighlight {
    rect: Rect,
}

impl RectangleHighlight {
    pub fn new(rect: Rect) -> Self {
        Self { rect }
    }
}

impl Overlay for RectangleHighlight {
    fn draw(&self, list: &mut DisplayList, world_to_pixel: Affine) {
        let pixel_rect = world_to_pixel.transform_rect_bbox(self.rect);
        list.fill(
            pixel_rect.to_path(PATH_TOLERANCE),
            Brush::Solid(Color::from_rgba8(0x00, 0x00, 0x8B, 0x40)),
        );
        list.stroke(
            pixel_rect.to_path(PATH_TOLERANCE),
            Brush::Solid(Color::from_rgb8(0xFF, 0x00, 0x00)),
            PEN_WIDTH,
        );
    }

    fn erase(&self, list: &mut DisplayList, world_to_pixel: Affine, erase_brush: &Brush) {
        let pixel_rect = world_to_pixel
            .transform_rect_bbox(self.rect)
            .inflate(PEN_WIDTH / 2.0, PEN_WIDTH / 2.0);
        list.fill(pixel_rect.to_path(PATH_TOLERANCE), erase_brush.clone());
    }

    fn bounds(&self) -> Rect {
        self.rect
    }
}
