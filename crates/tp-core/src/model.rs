//! Course-object model: the drawable, movable entities a course is
//! made of.
//!
//! Objects live in map coordinates (millimeters at map scale). Every
//! variant supports cloning, offsetting, and whole-affine application;
//! oriented variants additionally support orientation changes. The
//! editing modes only ever work on clones — the authoritative copies
//! live in [`crate::course::CourseDb`].

use crate::geometry;
use crate::id::ObjectId;
use kurbo::{Affine, Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

// ─── Symbol dimensions ───────────────────────────────────────────────────
//
// World-unit (mm) dimensions of the course symbology, per ISOM sprint
// and forest specs.

/// Radius of a control circle.
pub const CONTROL_RADIUS: f64 = 3.0;
/// Side length of the start triangle.
pub const START_SIDE: f64 = 6.0;
/// Inner and outer radii of the finish circles.
pub const FINISH_RADII: (f64, f64) = (2.5, 3.5);
/// Half-length of a crossing-point bar.
pub const CROSSING_BAR: f64 = 2.0;
/// Half-extent of a registration mark cross.
pub const REG_MARK_ARM: f64 = 2.0;

// ─── Object kinds ────────────────────────────────────────────────────────

/// Geometry of one course object. A closed set: the mode engine and
/// the overlay renderer match on these variants and nothing else.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ObjectKind {
    /// Numbered control point, drawn as a circle.
    Control { location: Point },
    /// Course start, drawn as a triangle pointing along `orientation`.
    Start { location: Point, orientation: f64 },
    /// Course finish, drawn as concentric circles.
    Finish { location: Point },
    /// Mandatory crossing point, drawn as two bars across `orientation`.
    CrossingPoint { location: Point, orientation: f64 },
    /// Leg between two consecutive controls. Legs follow their
    /// endpoints and are never dragged directly.
    Leg { start: Point, end: Point },
    /// Registration mark, drawn as a cross.
    RegistrationMark { location: Point },
}

/// One course object: an interned id plus its geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseObject {
    pub id: ObjectId,
    pub kind: ObjectKind,
}

impl CourseObject {
    pub fn new(id: ObjectId, kind: ObjectKind) -> Self {
        Self { id, kind }
    }

    /// The object's anchor point. For legs this is the midpoint.
    pub fn location(&self) -> Point {
        match &self.kind {
            ObjectKind::Control { location }
            | ObjectKind::Start { location, .. }
            | ObjectKind::Finish { location }
            | ObjectKind::CrossingPoint { location, .. }
            | ObjectKind::RegistrationMark { location } => *location,
            ObjectKind::Leg { start, end } => geometry::midpoint(*start, *end),
        }
    }

    /// Orientation in degrees, for the variants that have one.
    pub fn orientation(&self) -> Option<f64> {
        match &self.kind {
            ObjectKind::Start { orientation, .. }
            | ObjectKind::CrossingPoint { orientation, .. } => Some(*orientation),
            _ => None,
        }
    }

    /// Whether this object responds to `change_orientation`.
    pub fn is_oriented(&self) -> bool {
        self.orientation().is_some()
    }

    /// Legs are not draggable; everything else is.
    pub fn is_draggable(&self) -> bool {
        !matches!(self.kind, ObjectKind::Leg { .. })
    }

    /// Offset the object by the given amount.
    pub fn offset(&mut self, dx: f64, dy: f64) {
        let v = Vec2::new(dx, dy);
        match &mut self.kind {
            ObjectKind::Control { location }
            | ObjectKind::Start { location, .. }
            | ObjectKind::Finish { location }
            | ObjectKind::CrossingPoint { location, .. }
            | ObjectKind::RegistrationMark { location } => *location += v,
            ObjectKind::Leg { start, end } => {
                *start += v;
                *end += v;
            }
        }
    }

    /// Set the orientation of an oriented object, normalized to the
    /// smallest-magnitude equivalent angle. Ignored for objects
    /// without an orientation.
    pub fn change_orientation(&mut self, degrees: f64) {
        match &mut self.kind {
            ObjectKind::Start { orientation, .. }
            | ObjectKind::CrossingPoint { orientation, .. } => {
                *orientation = geometry::angle_difference(degrees, 0.0);
            }
            _ => {}
        }
    }

    /// Apply a similarity transform to the object: anchor points map
    /// through the affine, and oriented objects pick up the affine's
    /// rotation component.
    pub fn apply(&mut self, affine: Affine) {
        let [a, b, ..] = affine.as_coeffs();
        let rotation = b.atan2(a).to_degrees();

        match &mut self.kind {
            ObjectKind::Control { location }
            | ObjectKind::Finish { location }
            | ObjectKind::RegistrationMark { location } => *location = affine * *location,
            ObjectKind::Start {
                location,
                orientation,
            }
            | ObjectKind::CrossingPoint {
                location,
                orientation,
            } => {
                *location = affine * *location;
                *orientation = geometry::angle_difference(*orientation + rotation, 0.0);
            }
            ObjectKind::Leg { start, end } => {
                *start = affine * *start;
                *end = affine * *end;
            }
        }
    }

    /// World-space bounds of the drawn symbol.
    pub fn bounds(&self) -> Rect {
        match &self.kind {
            ObjectKind::Control { location } => centered_square(*location, CONTROL_RADIUS),
            ObjectKind::Start { location, .. } => centered_square(*location, start_radius()),
            ObjectKind::Finish { location } => centered_square(*location, FINISH_RADII.1),
            ObjectKind::CrossingPoint { location, .. } => centered_square(*location, CROSSING_BAR),
            ObjectKind::Leg { start, end } => Rect::from_points(*start, *end),
            ObjectKind::RegistrationMark { location } => centered_square(*location, REG_MARK_ARM),
        }
    }

    /// Distance from a point to the drawn symbol; 0 when inside it.
    /// Used by hit testing.
    pub fn distance_from_point(&self, p: Point) -> f64 {
        match &self.kind {
            ObjectKind::Control { location } => {
                (geometry::distance(*location, p) - CONTROL_RADIUS).max(0.0)
            }
            ObjectKind::Start { location, .. } => {
                (geometry::distance(*location, p) - start_radius()).max(0.0)
            }
            ObjectKind::Finish { location } => {
                (geometry::distance(*location, p) - FINISH_RADII.1).max(0.0)
            }
            ObjectKind::CrossingPoint { location, .. } => {
                (geometry::distance(*location, p) - CROSSING_BAR).max(0.0)
            }
            ObjectKind::Leg { start, end } => {
                geometry::distance(geometry::closest_point_on_segment(*start, *end, p), p)
            }
            ObjectKind::RegistrationMark { location } => {
                (geometry::distance(*location, p) - REG_MARK_ARM).max(0.0)
            }
        }
    }

    /// Handle points that should be drawn with the object when it is
    /// selected. Only legs expose handles (their endpoints).
    pub fn handles(&self) -> SmallVec<[Point; 2]> {
        match &self.kind {
            ObjectKind::Leg { start, end } => SmallVec::from_slice(&[*start, *end]),
            _ => SmallVec::new(),
        }
    }
}

/// Circumradius of the start triangle.
pub fn start_radius() -> f64 {
    START_SIDE / 3f64.sqrt()
}

fn centered_square(center: Point, half: f64) -> Rect {
    Rect::new(
        center.x - half,
        center.y - half,
        center.x + half,
        center.y + half,
    )
}
