//! Horizontal swipe detection from press/release positions

use super::intent::Intent;

/// Minimum horizontal travel, in pixels, before a drag counts as a swipe
pub const DEFAULT_SWIPE_THRESHOLD_PX: f32 = 50.0;

#[derive(Debug, Clone)]
pub struct SwipeTracker {
    threshold: f32,
    start_x: Option<f32>,
}

impl Default for SwipeTracker {
    fn default() -> Self {
        Self::new(DEFAULT_SWIPE_THRESHOLD_PX)
    }
}

impl SwipeTracker {
    pub fn new(threshold: f32) -> Self {
        Self {
            threshold,
            start_x: None,
        }
    }

    pub fn press(&mut self, x: f32) {
        self.start_x = Some(x);
    }

    /// Finish the gesture started by the last `press`.
    ///
    /// Right to left moves back, left to right moves forward. Travel equal to
    /// the threshold is not a swipe.
    pub fn release(&mut self, x: f32) -> Option<Intent> {
        let start = self.start_x.take()?;

        if start - x > self.threshold {
            Some(Intent::Retreat)
        } else if x - start > self.threshold {
            Some(Intent::Advance)
        } else {
            None
        }
    }

    /// Drop a gesture in progress so its release is ignored
    pub fn cancel(&mut self) {
        self.start_x = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn right_to_left_retreats() {
        let mut swipe = SwipeTracker::default();
        swipe.press(300.0);
        assert_eq!(swipe.release(200.0), Some(Intent::Retreat));
    }

    #[test]
    fn left_to_right_advances() {
        let mut swipe = SwipeTracker::default();
        swipe.press(100.0);
        assert_eq!(swipe.release(151.0), Some(Intent::Advance));
    }

    #[test]
    fn short_travel_is_ignored() {
        let mut swipe = SwipeTracker::default();
        swipe.press(100.0);
        assert_eq!(swipe.release(150.0), None);
        swipe.press(100.0);
        assert_eq!(swipe.release(50.0), None);
    }

    #[test]
    fn release_without_press_is_ignored() {
        let mut swipe = SwipeTracker::default();
        assert_eq!(swipe.release(500.0), None);

        swipe.press(0.0);
        swipe.cancel();
        assert_eq!(swipe.release(500.0), None);
    }
}
