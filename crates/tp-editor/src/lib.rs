pub mod canvas;
pub mod controller;
pub mod modes;
pub mod selection;
pub mod status;

pub use canvas::EditCanvas;
pub use controller::{Controller, EditError};
pub use modes::{CursorHint, DragAction, Mode, Pane, Transition};
pub use selection::SelectionMgr;
