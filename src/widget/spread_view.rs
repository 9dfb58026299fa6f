//! Terminal rendering of the two surfaces
//!
//! Each cell shows two vertically stacked pixels with an upper half block:
//! foreground is the top pixel, background the bottom one.

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    style::Color,
    widgets::Widget,
};

use crate::reader::{Surface, SurfaceContent, Surfaces};

const UPPER_HALF_BLOCK: &str = "▀";

/// Horizontal placement of a fitted image inside its area
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    Start,
    Center,
    End,
}

/// One surface scaled to fit an area, aspect ratio preserved
pub struct SurfaceImage<'a> {
    surface: &'a Surface,
    anchor: Anchor,
}

impl<'a> SurfaceImage<'a> {
    pub fn new(surface: &'a Surface) -> Self {
        Self {
            surface,
            anchor: Anchor::Center,
        }
    }

    pub fn anchor(mut self, anchor: Anchor) -> Self {
        self.anchor = anchor;
        self
    }
}

/// Cell size of a `width x height` image fitted into `cols x rows` cells
fn fit(width: u32, height: u32, cols: u16, rows: u16) -> (u16, u16) {
    let scale =
        (f64::from(cols) / f64::from(width)).min(f64::from(rows) * 2.0 / f64::from(height));
    let fit_cols = (f64::from(width) * scale).floor().clamp(1.0, f64::from(cols)) as u16;
    let fit_rows = (f64::from(height) * scale / 2.0).floor().clamp(1.0, f64::from(rows)) as u16;
    (fit_cols, fit_rows)
}

impl Widget for SurfaceImage<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let area = area.intersection(buf.area);
        if area.is_empty()
            || !self.surface.is_visible()
            || self.surface.content() == SurfaceContent::Empty
        {
            return;
        }

        let image = self.surface.image();
        let (img_w, img_h) = image.dimensions();
        if img_w == 0 || img_h == 0 {
            return;
        }

        let (cols, rows) = fit(img_w, img_h, area.width, area.height);
        let x_offset = match self.anchor {
            Anchor::Start => 0,
            Anchor::Center => (area.width - cols) / 2,
            Anchor::End => area.width - cols,
        };
        let y_offset = (area.height - rows) / 2;
        let sample_rows = u32::from(rows) * 2;

        let pixel = |x: u32, y: u32| {
            let [r, g, b] = image.get_pixel(x, y).0;
            Color::Rgb(r, g, b)
        };

        for row in 0..rows {
            let top_y = (u32::from(row) * 2 * img_h / sample_rows).min(img_h - 1);
            let bottom_y = ((u32::from(row) * 2 + 1) * img_h / sample_rows).min(img_h - 1);

            for col in 0..cols {
                let x = (u32::from(col) * img_w / u32::from(cols)).min(img_w - 1);
                buf[(area.x + x_offset + col, area.y + y_offset + row)]
                    .set_symbol(UPPER_HALF_BLOCK)
                    .set_fg(pixel(x, top_y))
                    .set_bg(pixel(x, bottom_y));
            }
        }
    }
}

/// Both surfaces laid out as a spread.
///
/// Single-page mode shows the right surface alone, centered. In dual mode
/// the pages meet at the middle of the area.
pub struct SpreadView<'a> {
    surfaces: &'a Surfaces,
    single_page: bool,
}

impl<'a> SpreadView<'a> {
    pub fn new(surfaces: &'a Surfaces, single_page: bool) -> Self {
        Self {
            surfaces,
            single_page,
        }
    }
}

impl Widget for SpreadView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if self.single_page {
            SurfaceImage::new(self.surfaces.right()).render(area, buf);
            return;
        }

        let [left, right] = Layout::horizontal([Constraint::Ratio(1, 2); 2]).areas(area);
        SurfaceImage::new(self.surfaces.left())
            .anchor(Anchor::End)
            .render(left, buf);
        SurfaceImage::new(self.surfaces.right())
            .anchor(Anchor::Start)
            .render(right, buf);
    }
}
