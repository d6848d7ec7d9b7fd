pub mod course;
pub mod geometry;
pub mod id;
pub mod model;
pub mod transform;

pub use course::{CourseDb, SnapshotError};
pub use id::ObjectId;
pub use model::*;
pub use transform::{MoveAction, MoveComputation, TransformError};

// Re-export kurbo types so downstream crates don't need a direct dependency
pub use kurbo::{Affine, Point, Rect, Vec2};
