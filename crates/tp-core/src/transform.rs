//! The transform engine: turns a user-supplied point sequence plus an
//! action kind into a rigid/similarity transform.
//!
//! The point sequence is 2 points for `Move` (origin, destination) and
//! 4 points for the scale/rotate variants, where the 3rd and 4th
//! points are reference points measured from the destination. Derived
//! values are computed once at construction; the computation is
//! read-only afterwards.

use crate::geometry;
use kurbo::{Affine, Point, Vec2};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use thiserror::Error;

/// The kind of bulk transform the user chose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveAction {
    /// Nothing chosen. Yields the identity; must never reach a commit.
    None,
    Move,
    MoveScale,
    MoveRotate,
    MoveRotateScale,
}

impl MoveAction {
    /// Number of reference points this action needs.
    pub fn point_count(self) -> usize {
        match self {
            MoveAction::None => 0,
            MoveAction::Move => 2,
            MoveAction::MoveScale | MoveAction::MoveRotate | MoveAction::MoveRotateScale => 4,
        }
    }

    fn scales(self) -> bool {
        matches!(self, MoveAction::MoveScale | MoveAction::MoveRotateScale)
    }

    fn rotates(self) -> bool {
        matches!(self, MoveAction::MoveRotate | MoveAction::MoveRotateScale)
    }
}

/// Errors from constructing or committing a transform.
///
/// Degenerate geometry (zero reference distances, coincident rotation
/// references) is not an error: those inputs fall back to scale 1 and
/// rotation 0.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransformError {
    #[error("{action:?} requires {expected} reference points, got {got}")]
    WrongPointCount {
        action: MoveAction,
        expected: usize,
        got: usize,
    },
    #[error("no actionable transform kind was chosen")]
    UnsupportedAction,
}

/// A fully-derived move/scale/rotate computation.
///
/// The captured points are immutable; offset, scale, and rotation are
/// derived once in [`MoveComputation::new`].
#[derive(Debug, Clone)]
pub struct MoveComputation {
    action: MoveAction,
    points: SmallVec<[Point; 4]>,
    x_offset: f64,
    y_offset: f64,
    scale: f64,
    rotation: f64,
}

impl MoveComputation {
    /// Derive a computation from an action kind and its reference
    /// points. `MoveAction::None` takes no points and yields the
    /// identity.
    pub fn new(action: MoveAction, points: &[Point]) -> Result<Self, TransformError> {
        let expected = action.point_count();
        if points.len() != expected {
            return Err(TransformError::WrongPointCount {
                action,
                expected,
                got: points.len(),
            });
        }

        if action == MoveAction::None {
            return Ok(Self {
                action,
                points: SmallVec::new(),
                x_offset: 0.0,
                y_offset: 0.0,
                scale: 1.0,
                rotation: 0.0,
            });
        }

        let points: SmallVec<[Point; 4]> = SmallVec::from_slice(points);
        let x_offset = points[1].x - points[0].x;
        let y_offset = points[1].y - points[0].y;

        let scale = if action.scales() {
            let dist1 = geometry::distance(points[1], points[2]);
            let dist2 = geometry::distance(points[1], points[3]);
            if dist1 == 0.0 || dist2 == 0.0 {
                1.0
            } else {
                (dist2 / dist1).abs()
            }
        } else {
            1.0
        };

        let rotation = if action.rotates() {
            if points[1] == points[2] || points[1] == points[3] {
                0.0
            } else {
                let angle1 = geometry::angle(points[1], points[2]);
                let angle2 = geometry::angle(points[1], points[3]);
                geometry::angle_difference(angle2, angle1)
            }
        } else {
            0.0
        };

        Ok(Self {
            action,
            points,
            x_offset,
            y_offset,
            scale,
            rotation,
        })
    }

    pub fn action(&self) -> MoveAction {
        self.action
    }

    pub fn x_offset(&self) -> f64 {
        self.x_offset
    }

    pub fn y_offset(&self) -> f64 {
        self.y_offset
    }

    /// Uniform scale factor. 1.0 unless the action scales.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Rotation in degrees, normalized to smallest magnitude.
    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    /// The composed transform matrix.
    ///
    /// Composition order is significant and fixed: translate to the
    /// interaction origin, scale, rotate, translate to the
    /// destination. Reordering scale and rotate changes the visual
    /// result whenever both are active.
    pub fn matrix(&self) -> Affine {
        if self.action == MoveAction::None {
            return Affine::IDENTITY;
        }

        let mut matrix = Affine::translate(-self.points[0].to_vec2());
        if self.scale != 1.0 {
            matrix = matrix.then_scale(self.scale);
        }
        if self.rotation != 0.0 {
            matrix = matrix.then_rotate(self.rotation.to_radians());
        }
        matrix.then_translate(Vec2::new(self.points[1].x, self.points[1].y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pt(x: f64, y: f64) -> Point {
        Point::new(x, y)
    }

    #[test]
    fn none_yields_identity() {
        let comp = MoveComputation::new(MoveAction::None, &[]).unwrap();
        assert_eq!(comp.x_offset(), 0.0);
        assert_eq!(comp.y_offset(), 0.0);
        assert_eq!(comp.scale(), 1.0);
        assert_eq!(comp.rotation(), 0.0);
        assert_eq!(comp.matrix(), Affine::IDENTITY);
    }

    #[test]
    fn wrong_point_count_is_an_error() {
        let err = MoveComputation::new(MoveAction::Move, &[pt(0.0, 0.0)]).unwrap_err();
        assert_eq!(err, TransformError::WrongPointCount {
            action: MoveAction::Move,
            expected: 2,
            got: 1,
        });

        let err =
            MoveComputation::new(MoveAction::MoveScale, &[pt(0.0, 0.0), pt(1.0, 1.0)]).unwrap_err();
        assert!(matches!(err, TransformError::WrongPointCount {
            expected: 4,
            got: 2,
            ..
        }));
    }

    #[test]
    fn move_maps_origin_to_destination() {
        let comp = MoveComputation::new(MoveAction::Move, &[pt(0.0, 0.0), pt(10.0, 5.0)]).unwrap();
        assert_eq!(comp.x_offset(), 10.0);
        assert_eq!(comp.y_offset(), 5.0);
        assert_eq!(comp.scale(), 1.0);
        assert_eq!(comp.rotation(), 0.0);

        let m = comp.matrix();
        assert_eq!(m * pt(0.0, 0.0), pt(10.0, 5.0));
        assert_eq!(m * pt(1.0, 0.0), pt(11.0, 5.0));
    }

    #[test]
    fn degenerate_scale_reference_falls_back_to_one() {
        // p2 coincides with p1: zero reference distance.
        let comp = MoveComputation::new(MoveAction::MoveScale, &[
            pt(0.0, 0.0),
            pt(5.0, 5.0),
            pt(5.0, 5.0),
            pt(9.0, 9.0),
        ])
        .unwrap();
        assert_eq!(comp.scale(), 1.0);
    }

    #[test]
    fn degenerate_rotation_reference_falls_back_to_zero() {
        let comp = MoveComputation::new(MoveAction::MoveRotate, &[
            pt(0.0, 0.0),
            pt(5.0, 5.0),
            pt(5.0, 5.0),
            pt(5.0, 5.0),
        ])
        .unwrap();
        assert_eq!(comp.rotation(), 0.0);
    }

    #[test]
    fn quarter_turn_with_equal_references() {
        // Equal distances from p1: scale 1; p2 east, p3 north: +90°.
        let comp = MoveComputation::new(MoveAction::MoveRotateScale, &[
            pt(0.0, 0.0),
            pt(0.0, 0.0),
            pt(10.0, 0.0),
            pt(0.0, 10.0),
        ])
        .unwrap();
        assert_eq!(comp.scale(), 1.0);
        assert!((comp.rotation() - 90.0).abs() < 1e-9);

        let mapped = comp.matrix() * pt(10.0, 0.0);
        assert!(mapped.x.abs() < 1e-9 && (mapped.y - 10.0).abs() < 1e-9);
    }

    #[test]
    fn scale_then_rotate_order_is_fixed() {
        // With both active, the matrix must reproduce scale-about-p0
        // followed by rotation about p0, re-anchored at p1.
        let comp = MoveComputation::new(MoveAction::MoveRotateScale, &[
            pt(1.0, 0.0),
            pt(0.0, 0.0),
            pt(1.0, 0.0),
            pt(0.0, 2.0),
        ])
        .unwrap();
        assert!((comp.scale() - 2.0).abs() < 1e-9);
        assert!((comp.rotation() - 90.0).abs() < 1e-9);

        // (2, 0): to origin → (1, 0), scale → (2, 0), rotate → (0, 2).
        let mapped = comp.matrix() * pt(2.0, 0.0);
        assert!(mapped.x.abs() < 1e-9 && (mapped.y - 2.0).abs() < 1e-9);
    }
}
