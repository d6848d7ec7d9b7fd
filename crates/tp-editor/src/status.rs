//! Status-bar text for each interaction state. Purely observational —
//! the host surfaces these next to the canvas.

pub const DEFAULT: &str = "Click an object to select it; drag a selected object to move it.";
pub const DRAGGING_OBJECT: &str = "Dragging object. Release the button to place it.";
pub const DRAGGING_TOPOLOGY_OBJECT: &str = "Dragging object. Release over a slot to place it.";
pub const ROTATING_OBJECT: &str = "Move the pointer to rotate; click to set the orientation.";
pub const PICK_REFERENCE: &str = "Click the point to move from.";
pub const PICK_DESTINATION: &str = "Click the new location for that point.";
pub const PICK_SECOND_REFERENCE: &str = "Click a second reference point.";
pub const PICK_SECOND_DESTINATION: &str = "Click the new location for the second point.";
