//! Render worker - runs in a dedicated thread and owns the document

use flume::{Receiver, Sender};
use log::{debug, error, info};

use super::cache::{CacheKey, PageCache};
use super::document::{Document, LoadError, describe};
use super::request::{
    CancelToken, RenderError, RenderRequest, RenderResponse, RenderedPage, RequestId,
};

/// Main worker function.
///
/// Loads the document with `load`, reports its metadata (or the load
/// failure) and then serves page requests until `Shutdown` or until the
/// request channel closes.
#[expect(
    clippy::needless_pass_by_value,
    reason = "Values moved into thread, need ownership"
)]
pub fn render_worker<D, F>(
    load: F,
    requests: Receiver<RenderRequest>,
    responses: Sender<RenderResponse>,
    cache_size: usize,
) where
    D: Document,
    F: FnOnce() -> Result<D, LoadError>,
{
    let loaded = load().and_then(|doc| {
        let info = describe(&doc)?;
        Ok((doc, info))
    });

    let doc = match loaded {
        Ok((doc, info)) => {
            info!(
                "Document loaded: {} pages, reference page {}x{}",
                info.page_count, info.reference_size.width, info.reference_size.height
            );
            let _ = responses.send(RenderResponse::DocumentInfo(info));
            doc
        }
        Err(e) => {
            error!("Error loading document: {e}");
            let _ = responses.send(RenderResponse::LoadFailed(e.to_string()));
            return;
        }
    };

    let mut cache = PageCache::new(cache_size);

    for request in requests {
        match request {
            RenderRequest::Page {
                id,
                page,
                slot,
                scale,
                cancel,
            } => {
                debug!("Worker picked up {id:?}: page {page} for {} surface", slot.name());
                let response = handle_page_request(&doc, &mut cache, id, page, scale, &cancel);
                let _ = responses.send(response);
            }

            RenderRequest::Shutdown => break,
        }
    }

    debug!("Render worker exiting");
}

fn handle_page_request<D: Document>(
    doc: &D,
    cache: &mut PageCache,
    id: RequestId,
    page: usize,
    scale: f32,
    cancel: &CancelToken,
) -> RenderResponse {
    if cancel.is_cancelled() {
        return RenderResponse::Cancelled(id);
    }

    let key = CacheKey::new(page, scale);
    if let Some(data) = cache.get(&key) {
        return RenderResponse::Page {
            id,
            page,
            scale,
            data,
        };
    }

    match render_page(doc, page, scale, cancel) {
        Ok(data) => {
            let data = cache.insert(key, data);
            if cancel.is_cancelled() {
                RenderResponse::Cancelled(id)
            } else {
                RenderResponse::Page {
                    id,
                    page,
                    scale,
                    data,
                }
            }
        }
        Err(RenderError::Cancelled) => RenderResponse::Cancelled(id),
        Err(error) => RenderResponse::Error { id, error },
    }
}

/// Render a single page
pub fn render_page<D: Document>(
    doc: &D,
    page: usize,
    scale: f32,
    cancel: &CancelToken,
) -> Result<RenderedPage, RenderError> {
    let page_count = doc.page_count();
    if page == 0 || page > page_count {
        return Err(RenderError::PageOutOfRange { page, page_count });
    }

    let size = doc.page_size(page)?;
    let image = doc.rasterize(page, scale, cancel)?;
    Ok(RenderedPage { size, image })
}
