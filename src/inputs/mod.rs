pub mod intent;
pub mod swipe;

pub use intent::{InputAdapter, Intent};
pub use swipe::{DEFAULT_SWIPE_THRESHOLD_PX, SwipeTracker};
