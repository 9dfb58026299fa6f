//! MuPDF-backed document

use std::path::Path;

use image::RgbImage;
use mupdf::{Colorspace, Matrix, Pixmap};

use super::document::{Document, LoadError, PageSize};
use super::request::{CancelToken, RenderError};

pub struct PdfDocument {
    doc: mupdf::Document,
    page_count: usize,
}

impl PdfDocument {
    pub fn open(path: &Path) -> Result<Self, LoadError> {
        let doc = mupdf::Document::open(path.to_string_lossy().as_ref())
            .map_err(|e| LoadError::open(path.display().to_string(), e.to_string()))?;
        let page_count = doc.page_count()?.max(0) as usize;

        Ok(Self { doc, page_count })
    }

    fn load_page(&self, page: usize) -> Result<mupdf::Page, RenderError> {
        if page == 0 || page > self.page_count {
            return Err(RenderError::PageOutOfRange {
                page,
                page_count: self.page_count,
            });
        }
        Ok(self.doc.load_page((page - 1) as i32)?)
    }
}

impl Document for PdfDocument {
    fn page_count(&self) -> usize {
        self.page_count
    }

    fn page_size(&self, page: usize) -> Result<PageSize, RenderError> {
        let bounds = self.load_page(page)?.bounds()?;
        Ok(PageSize::new(bounds.x1 - bounds.x0, bounds.y1 - bounds.y0))
    }

    fn rasterize(
        &self,
        page: usize,
        scale: f32,
        cancel: &CancelToken,
    ) -> Result<RgbImage, RenderError> {
        let page = self.load_page(page)?;
        if cancel.is_cancelled() {
            return Err(RenderError::Cancelled);
        }

        let rgb = Colorspace::device_rgb();
        let pixmap = page.to_pixmap(&Matrix::new_scale(scale, scale), &rgb, false, false)?;
        pixmap_to_rgb(&pixmap)
    }

    fn title(&self) -> Option<String> {
        self.doc.metadata(mupdf::MetadataName::Title).ok()
    }
}

fn pixmap_to_rgb(pixmap: &Pixmap) -> Result<RgbImage, RenderError> {
    let n = pixmap.n() as usize;
    if n < 3 {
        return Err(RenderError::generic(format!(
            "Unsupported pixmap format: {n} channels"
        )));
    }

    let width = pixmap.width() as usize;
    let height = pixmap.height() as usize;
    let stride = pixmap.stride() as usize;
    let samples = pixmap.samples();
    let row_bytes = width * n;
    if samples.len() < stride.saturating_mul(height) || row_bytes > stride {
        return Err(RenderError::generic("Pixmap buffer size mismatch"));
    }

    let mut out = Vec::with_capacity(width * height * 3);
    for y in 0..height {
        let row = &samples[y * stride..y * stride + row_bytes];
        if n == 3 {
            out.extend_from_slice(row);
        } else {
            for px in row.chunks_exact(n) {
                out.extend_from_slice(&px[..3]);
            }
        }
    }

    RgbImage::from_raw(width as u32, height as u32, out)
        .ok_or_else(|| RenderError::generic("Pixmap dimensions do not match its samples"))
}
