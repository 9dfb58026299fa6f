pub mod control_bar;
pub mod spread_view;

pub use control_bar::{ControlBar, ControlBarState, spread_label};
pub use spread_view::{Anchor, SpreadView, SurfaceImage};
