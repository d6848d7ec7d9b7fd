//! Hit testing: point → course object lookup.
//!
//! Objects later in paint order draw on top, so the last object within
//! tolerance wins.

use kurbo::Point;
use tp_core::id::ObjectId;
use tp_core::model::CourseObject;

/// Find the topmost object within `tolerance_px` pixels of `location`.
///
/// `pixel_size` is the size of one pixel in world units; the tolerance
/// is specified in pixels so hit targets stay a constant screen size
/// across zoom levels.
pub fn hit_test<'a>(
    objects: impl IntoIterator<Item = &'a CourseObject>,
    location: Point,
    pixel_size: f64,
    tolerance_px: f64,
) -> Option<ObjectId> {
    let tolerance = tolerance_px * pixel_size;
    let mut best = None;
    for object in objects {
        let d = object.distance_from_point(location);
        if d <= tolerance {
            log::trace!("hit {} at distance {d:.2}", object.id);
            best = Some(object.id);
        }
    }
    best
}
