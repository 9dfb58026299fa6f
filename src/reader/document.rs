//! Document abstraction consumed by the render worker

use image::RgbImage;

use super::request::{CancelToken, RenderError};

/// Intrinsic page size at scale 1.0
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PageSize {
    pub width: f32,
    pub height: f32,
}

impl PageSize {
    #[must_use]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Surface dimensions for this page at `scale`, rounded up to whole pixels
    #[must_use]
    pub fn scaled_px(self, scale: f32) -> (u32, u32) {
        (
            (self.width * scale).ceil().max(0.0) as u32,
            (self.height * scale).ceil().max(0.0) as u32,
        )
    }
}

/// A loaded paginated artifact.
///
/// Page indices are 1-based. Implementations live on the render worker
/// thread for their whole life, so they need not be `Sync`.
pub trait Document {
    /// Number of pages in the document
    fn page_count(&self) -> usize;

    /// Size of the page at scale 1.0
    fn page_size(&self, page: usize) -> Result<PageSize, RenderError>;

    /// Rasterize a page at the given scale.
    ///
    /// Implementations should check `cancel` wherever the backend allows it
    /// and return [`RenderError::Cancelled`] once it is set.
    fn rasterize(
        &self,
        page: usize,
        scale: f32,
        cancel: &CancelToken,
    ) -> Result<RgbImage, RenderError>;

    /// Optional document title
    fn title(&self) -> Option<String> {
        None
    }
}

/// Document metadata sent from the worker once loading succeeds
#[derive(Clone, Debug, PartialEq)]
pub struct DocumentInfo {
    pub page_count: usize,
    /// Size of page 1, the reference page for scale planning
    pub reference_size: PageSize,
    pub title: Option<String>,
}

/// Errors that end a reader session before anything is rendered
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to open {source_name}: {detail}")]
    Open { source_name: String, detail: String },

    #[error("document has no pages")]
    Empty,

    #[error("cannot measure reference page: {0}")]
    Measure(#[from] RenderError),

    #[cfg(feature = "pdf")]
    #[error("PDF engine: {0}")]
    Pdf(#[from] mupdf::error::Error),
}

impl LoadError {
    pub fn open(source_name: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::Open {
            source_name: source_name.into(),
            detail: detail.into(),
        }
    }
}

/// Build the metadata snapshot for a freshly loaded document
pub(crate) fn describe<D: Document>(doc: &D) -> Result<DocumentInfo, LoadError> {
    let page_count = doc.page_count();
    if page_count == 0 {
        return Err(LoadError::Empty);
    }

    Ok(DocumentInfo {
        page_count,
        reference_size: doc.page_size(1)?,
        title: doc.title().filter(|t| !t.is_empty()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scaled_px_rounds_up() {
        let size = PageSize::new(100.2, 50.0);
        assert_eq!(size.scaled_px(1.0), (101, 50));
        assert_eq!(size.scaled_px(0.5), (51, 25));
    }
}
