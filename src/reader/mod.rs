//! Comic reader core

mod cache;
mod document;
pub mod layout;
#[cfg(feature = "pdf")]
mod pdf;
mod renderer;
mod request;
mod scale;
mod state;
mod surface;
mod viewer;
mod worker;

pub use cache::{CacheKey, PageCache};
pub use document::{Document, DocumentInfo, LoadError, PageSize};
pub use layout::{SlotPlan, Spread};
#[cfg(feature = "pdf")]
pub use pdf::PdfDocument;
pub use renderer::{
    DEFAULT_BLANK_FILL, DEFAULT_CACHE_SIZE, PageRenderer, RenderOutcome, WorkerEvent,
};
pub use request::{CancelToken, RenderError, RenderedPage, RequestId};
pub use scale::ScalePlanner;
pub use state::{
    BLANK_PADDING_SLOTS, Command, DEFAULT_SINGLE_PAGE_MAX_WIDTH, Effect, ViewerSession,
};
pub use surface::{Surface, SurfaceContent, SurfaceSlot, Surfaces};
pub use viewer::{
    ComicViewer, ControlPanel, Controls, LoadFailed, LoadState, NoPanel, ViewerOptions,
};
pub use worker::render_page;
