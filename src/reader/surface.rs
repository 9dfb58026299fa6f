//! The two visual slots a spread is drawn into

use image::{Rgb, RgbImage};

/// Background used behind pages whose raster is smaller than the surface
const PAPER: Rgb<u8> = Rgb([0xFF, 0xFF, 0xFF]);

/// Left or right slot of a spread.
///
/// `Right` is the primary surface: it is the only one populated in
/// single-page mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SurfaceSlot {
    Left,
    Right,
}

impl SurfaceSlot {
    pub const ALL: [SurfaceSlot; 2] = [SurfaceSlot::Left, SurfaceSlot::Right];

    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            SurfaceSlot::Left => 0,
            SurfaceSlot::Right => 1,
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            SurfaceSlot::Left => "left",
            SurfaceSlot::Right => "right",
        }
    }
}

/// What a surface currently shows
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SurfaceContent {
    Empty,
    Page(usize),
    Blank,
}

/// One rendering target
#[derive(Clone, Debug)]
pub struct Surface {
    image: RgbImage,
    content: SurfaceContent,
    visible: bool,
}

impl Default for Surface {
    fn default() -> Self {
        Self {
            image: RgbImage::new(0, 0),
            content: SurfaceContent::Empty,
            visible: true,
        }
    }
}

impl Surface {
    #[must_use]
    pub fn image(&self) -> &RgbImage {
        &self.image
    }

    #[must_use]
    pub fn content(&self) -> SurfaceContent {
        self.content
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// Resize to `width x height` and draw `raster` at the origin
    pub(crate) fn draw_page(&mut self, page: usize, width: u32, height: u32, raster: &RgbImage) {
        let mut canvas = RgbImage::from_pixel(width, height, PAPER);
        image::imageops::replace(&mut canvas, raster, 0, 0);
        self.image = canvas;
        self.content = SurfaceContent::Page(page);
    }

    pub(crate) fn fill_blank(&mut self, width: u32, height: u32, color: [u8; 3]) {
        self.image = RgbImage::from_pixel(width, height, Rgb(color));
        self.content = SurfaceContent::Blank;
    }

    /// Wipe the pixels, keeping the current dimensions
    pub(crate) fn clear(&mut self) {
        let (width, height) = self.image.dimensions();
        self.image = RgbImage::new(width, height);
        self.content = SurfaceContent::Empty;
    }

    pub(crate) fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }
}

/// The left/right surface pair
#[derive(Clone, Debug, Default)]
pub struct Surfaces {
    slots: [Surface; 2],
}

impl Surfaces {
    #[must_use]
    pub fn get(&self, slot: SurfaceSlot) -> &Surface {
        &self.slots[slot.index()]
    }

    pub(crate) fn get_mut(&mut self, slot: SurfaceSlot) -> &mut Surface {
        &mut self.slots[slot.index()]
    }

    #[must_use]
    pub fn left(&self) -> &Surface {
        self.get(SurfaceSlot::Left)
    }

    #[must_use]
    pub fn right(&self) -> &Surface {
        self.get(SurfaceSlot::Right)
    }
}
