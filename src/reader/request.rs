//! Render request and response types

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use image::RgbImage;

use super::document::{DocumentInfo, PageSize};
use super::surface::SurfaceSlot;

/// Unique identifier for render requests
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(pub u64);

impl RequestId {
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }
}

/// Cooperative cancellation flag shared between the controller and the worker
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Idempotent; every clone observes it
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

/// A rasterized page together with its intrinsic size
#[derive(Clone, Debug)]
pub struct RenderedPage {
    /// Page size at scale 1.0
    pub size: PageSize,
    /// Raster produced at the requested scale
    pub image: RgbImage,
}

/// Request sent to the render worker
#[derive(Debug)]
pub enum RenderRequest {
    /// Rasterize a page for a surface
    Page {
        id: RequestId,
        page: usize,
        slot: SurfaceSlot,
        scale: f32,
        cancel: CancelToken,
    },

    /// Shutdown the worker
    Shutdown,
}

/// Errors from a single page render
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("page {page} is outside 1..={page_count}")]
    PageOutOfRange { page: usize, page_count: usize },

    #[error("render cancelled")]
    Cancelled,

    #[cfg(feature = "pdf")]
    #[error("PDF engine: {0}")]
    Pdf(#[from] mupdf::error::Error),

    #[error("{detail}")]
    Generic { detail: String },
}

impl RenderError {
    pub fn generic(msg: impl Into<String>) -> Self {
        Self::Generic { detail: msg.into() }
    }
}

/// Response from the render worker
#[derive(Debug)]
pub enum RenderResponse {
    /// Rendered page raster
    Page {
        id: RequestId,
        page: usize,
        scale: f32,
        data: Arc<RenderedPage>,
    },

    /// Request was cancelled before it produced output
    Cancelled(RequestId),

    /// Error during rendering
    Error { id: RequestId, error: RenderError },

    /// Document metadata (sent once on successful load)
    DocumentInfo(DocumentInfo),

    /// Document could not be loaded; the worker exits after sending this
    LoadFailed(String),
}
