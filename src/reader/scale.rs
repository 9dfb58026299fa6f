//! Pixel-budget scale planning
//!
//! Picks the render scale for a layout pass: the first value of the
//! geometric sequence `base, base * shrink, base * shrink^2, ...` whose
//! rendered area fits under the pixel budget.

use log::warn;

use super::document::PageSize;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScalePlanner {
    /// Scale the search starts from
    pub base_scale: f32,
    /// Multiplier applied per step while over budget
    pub shrink_factor: f32,
    /// Maximum rendered area in pixels
    pub max_pixels: f64,
}

impl Default for ScalePlanner {
    fn default() -> Self {
        Self {
            base_scale: Self::DEFAULT_BASE_SCALE,
            shrink_factor: Self::DEFAULT_SHRINK_FACTOR,
            max_pixels: Self::DEFAULT_MAX_PIXELS,
        }
    }
}

impl ScalePlanner {
    pub const DEFAULT_BASE_SCALE: f32 = 6.0;
    pub const DEFAULT_SHRINK_FACTOR: f32 = 0.9;
    pub const DEFAULT_MAX_PIXELS: f64 = 2_000_000.0;

    /// Build a planner, replacing unusable values with the defaults
    #[must_use]
    pub fn new(base_scale: f32, shrink_factor: f32, max_pixels: f64) -> Self {
        let mut planner = Self::default();

        if base_scale.is_finite() && base_scale > 0.0 {
            planner.base_scale = base_scale;
        } else {
            warn!("Invalid base scale {base_scale}, using {}", planner.base_scale);
        }

        if shrink_factor.is_finite() && shrink_factor > 0.0 && shrink_factor < 1.0 {
            planner.shrink_factor = shrink_factor;
        } else {
            warn!(
                "Invalid shrink factor {shrink_factor}, using {}",
                planner.shrink_factor
            );
        }

        if max_pixels.is_finite() && max_pixels > 0.0 {
            planner.max_pixels = max_pixels;
        } else {
            warn!(
                "Invalid pixel budget {max_pixels}, using {}",
                planner.max_pixels
            );
        }

        planner
    }

    /// Largest scale in the sequence keeping `reference` under budget
    #[must_use]
    pub fn plan(&self, reference: PageSize) -> f32 {
        let area = f64::from(reference.width) * f64::from(reference.height);
        if !area.is_finite() || area <= 0.0 || !(self.max_pixels > 0.0) {
            return self.base_scale;
        }

        let mut scale = self.base_scale;
        while Self::scaled_area(reference, scale) > self.max_pixels {
            scale *= self.shrink_factor;
        }
        scale
    }

    /// Rendered area of `size` at `scale`
    #[must_use]
    pub fn scaled_area(size: PageSize, scale: f32) -> f64 {
        f64::from(size.width * scale) * f64::from(size.height * scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_page_keeps_base_scale() {
        let planner = ScalePlanner::default();
        assert_eq!(planner.plan(PageSize::new(100.0, 100.0)), 6.0);
    }

    #[test]
    fn a4_page_fits_budget_and_is_first_in_sequence() {
        let planner = ScalePlanner::default();
        let page = PageSize::new(595.0, 842.0);
        let scale = planner.plan(page);

        assert!(ScalePlanner::scaled_area(page, scale) <= planner.max_pixels);
        // the previous step of the sequence must still be over budget
        let previous = scale / planner.shrink_factor;
        assert!(ScalePlanner::scaled_area(page, previous) > planner.max_pixels);
    }

    #[test]
    fn matches_iterated_sequence() {
        let planner = ScalePlanner::default();
        for (w, h) in [(1.0, 1.0), (300.0, 450.0), (2480.0, 3508.0), (10_000.0, 7.0)] {
            let page = PageSize::new(w, h);
            let mut expected = 6.0f32;
            while f64::from(w * expected) * f64::from(h * expected) > 2_000_000.0 {
                expected *= 0.9;
            }
            assert_eq!(planner.plan(page), expected, "page {w}x{h}");
        }
    }

    #[test]
    fn degenerate_inputs_return_base() {
        let planner = ScalePlanner::default();
        assert_eq!(planner.plan(PageSize::new(0.0, 100.0)), 6.0);
        assert_eq!(planner.plan(PageSize::new(f32::NAN, 100.0)), 6.0);
    }

    #[test]
    fn zero_budget_falls_back_to_default() {
        let planner = ScalePlanner::new(6.0, 0.9, 0.0);
        assert_eq!(planner, ScalePlanner::default());

        // Still shrinks a page that would blow the default budget
        let page = PageSize::new(595.0, 842.0);
        assert!(planner.plan(page) < 6.0);
        assert_eq!(planner.plan(page), ScalePlanner::default().plan(page));

        assert_eq!(
            ScalePlanner::new(6.0, 0.9, f64::NAN).max_pixels,
            ScalePlanner::DEFAULT_MAX_PIXELS
        );
    }

    #[test]
    fn invalid_factors_fall_back_to_defaults() {
        let planner = ScalePlanner::new(-1.0, 1.5, 1000.0);
        assert_eq!(planner.base_scale, ScalePlanner::DEFAULT_BASE_SCALE);
        assert_eq!(planner.shrink_factor, ScalePlanner::DEFAULT_SHRINK_FACTOR);
    }
}
