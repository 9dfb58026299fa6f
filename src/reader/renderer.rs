//! Page renderer - owns the surfaces and the render worker
//!
//! Requests travel to a dedicated worker thread; responses are committed to
//! the surfaces on the controller thread. The most recent request issued
//! against a surface is authoritative: issuing another one cancels it, and
//! a response for anything but the latest request is dropped without
//! touching the surface.

use std::collections::HashMap;

use flume::{Receiver, Sender};
use log::{debug, error, info, warn};

use super::document::{Document, DocumentInfo, LoadError};
use super::request::{CancelToken, RenderRequest, RenderResponse, RequestId};
use super::surface::{Surface, SurfaceSlot, Surfaces};
use super::worker::render_worker;

/// Default number of rasterized pages kept by the worker
pub const DEFAULT_CACHE_SIZE: usize = 16;

/// Neutral fill used for synthetic blank pages
pub const DEFAULT_BLANK_FILL: [u8; 3] = [0x34, 0x35, 0x37];

/// How a render request ended
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RenderOutcome {
    /// The page is now visible on the surface
    Rendered { slot: SurfaceSlot, page: usize },
    /// Superseded or cancelled; the surface was not touched
    Cancelled { slot: SurfaceSlot, id: RequestId },
    /// Rendering failed and the surface was cleared
    Failed {
        slot: SurfaceSlot,
        page: usize,
        reason: String,
    },
}

/// Everything the worker can report back
#[derive(Clone, Debug, PartialEq)]
pub enum WorkerEvent {
    Loaded(DocumentInfo),
    LoadFailed(String),
    Render(RenderOutcome),
}

#[derive(Debug)]
struct Outstanding {
    id: RequestId,
    page: usize,
    cancel: CancelToken,
}

/// Renders pages onto the left/right surfaces through a worker thread
pub struct PageRenderer {
    request_tx: Sender<RenderRequest>,
    response_rx: Receiver<RenderResponse>,
    next_request_id: u64,
    /// Latest request per surface, indexed by [`SurfaceSlot::index`]
    outstanding: [Option<Outstanding>; 2],
    /// Every request the worker has not answered yet, superseded ones included
    pending: HashMap<RequestId, SurfaceSlot>,
    surfaces: Surfaces,
    blank_fill: [u8; 3],
    worker_alive: bool,
}

impl PageRenderer {
    /// Spawn the render worker; `load` runs on the worker thread
    pub fn spawn<D, F>(load: F, cache_size: usize, blank_fill: [u8; 3]) -> Self
    where
        D: Document + 'static,
        F: FnOnce() -> Result<D, LoadError> + Send + 'static,
    {
        let (request_tx, request_rx) = flume::unbounded();
        let (response_tx, response_rx) = flume::unbounded();

        std::thread::spawn(move || {
            render_worker(load, request_rx, response_tx, cache_size);
        });

        Self {
            request_tx,
            response_rx,
            next_request_id: 1,
            outstanding: [None, None],
            pending: HashMap::new(),
            surfaces: Surfaces::default(),
            blank_fill,
            worker_alive: true,
        }
    }

    #[must_use]
    pub fn surfaces(&self) -> &Surfaces {
        &self.surfaces
    }

    #[must_use]
    pub fn surface(&self, slot: SurfaceSlot) -> &Surface {
        self.surfaces.get(slot)
    }

    /// Whether any request is still waiting for the worker
    #[must_use]
    pub fn is_busy(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Id of the request currently authoritative for `slot`
    #[must_use]
    pub fn outstanding(&self, slot: SurfaceSlot) -> Option<RequestId> {
        self.outstanding[slot.index()].as_ref().map(|o| o.id)
    }

    /// Request `page` (1-based, real page) to be drawn on `slot` at `scale`.
    ///
    /// Cancels whatever was outstanding on that surface.
    pub fn render(&mut self, page: usize, slot: SurfaceSlot, scale: f32) -> RequestId {
        self.cancel_outstanding(slot);

        let id = self.next_id();
        let cancel = CancelToken::new();
        debug!("Requesting page {page} on {} surface at scale {scale} ({id:?})", slot.name());

        if self
            .request_tx
            .send(RenderRequest::Page {
                id,
                page,
                slot,
                scale,
                cancel: cancel.clone(),
            })
            .is_err()
        {
            warn!("Render worker is gone, page {page} will not be drawn");
            return id;
        }

        self.pending.insert(id, slot);
        self.outstanding[slot.index()] = Some(Outstanding { id, page, cancel });
        id
    }

    /// Fill `slot` with the neutral blank colour at `width x height`
    pub fn render_blank(&mut self, slot: SurfaceSlot, width: u32, height: u32) {
        self.cancel_outstanding(slot);
        self.surfaces
            .get_mut(slot)
            .fill_blank(width, height, self.blank_fill);
        debug!("Blank page on {} surface ({width}x{height})", slot.name());
    }

    pub fn clear(&mut self, slot: SurfaceSlot) {
        self.cancel_outstanding(slot);
        self.surfaces.get_mut(slot).clear();
    }

    pub fn set_visible(&mut self, slot: SurfaceSlot, visible: bool) {
        self.surfaces.get_mut(slot).set_visible(visible);
    }

    /// Drain every response that has already arrived
    pub fn poll(&mut self) -> Vec<WorkerEvent> {
        let mut events = vec![];
        while let Ok(response) = self.response_rx.try_recv() {
            events.extend(self.handle_response(response));
        }
        events
    }

    /// Block until the worker produces its next response.
    ///
    /// Returns `None` once the worker has exited.
    pub fn next_event(&mut self) -> Option<WorkerEvent> {
        while self.worker_alive {
            match self.response_rx.recv() {
                Ok(response) => {
                    if let Some(event) = self.handle_response(response) {
                        return Some(event);
                    }
                }
                Err(_) => self.worker_gone(),
            }
        }
        None
    }

    /// Block until request `id` resolves.
    ///
    /// Events handled on the way are returned too, in arrival order; the
    /// last one belongs to `id` unless the worker died first.
    pub fn wait(&mut self, id: RequestId) -> Vec<WorkerEvent> {
        let mut events = vec![];
        while self.pending.contains_key(&id) && self.worker_alive {
            match self.response_rx.recv() {
                Ok(response) => events.extend(self.handle_response(response)),
                Err(_) => self.worker_gone(),
            }
        }
        events
    }

    /// Block until every issued request has resolved
    pub fn settle(&mut self) -> Vec<WorkerEvent> {
        let mut events = vec![];
        while !self.pending.is_empty() && self.worker_alive {
            match self.response_rx.recv() {
                Ok(response) => events.extend(self.handle_response(response)),
                Err(_) => self.worker_gone(),
            }
        }
        events
    }

    fn handle_response(&mut self, response: RenderResponse) -> Option<WorkerEvent> {
        match response {
            RenderResponse::DocumentInfo(info) => Some(WorkerEvent::Loaded(info)),

            RenderResponse::LoadFailed(reason) => {
                self.worker_alive = false;
                Some(WorkerEvent::LoadFailed(reason))
            }

            RenderResponse::Page {
                id,
                page,
                scale,
                data,
            } => {
                let slot = self.pending.remove(&id)?;
                if self.take_if_current(slot, id).is_none() {
                    return Some(Self::cancelled(slot, id));
                }

                let (width, height) = data.size.scaled_px(scale);
                info!(
                    "Rendering page {page} with scale {scale}: width={width}, height={height}, area={}",
                    u64::from(width) * u64::from(height)
                );
                self.surfaces
                    .get_mut(slot)
                    .draw_page(page, width, height, &data.image);
                Some(WorkerEvent::Render(RenderOutcome::Rendered { slot, page }))
            }

            RenderResponse::Cancelled(id) => {
                let slot = self.pending.remove(&id)?;
                self.take_if_current(slot, id);
                Some(Self::cancelled(slot, id))
            }

            RenderResponse::Error { id, error } => {
                let slot = self.pending.remove(&id)?;
                let Some(current) = self.take_if_current(slot, id) else {
                    return Some(Self::cancelled(slot, id));
                };

                warn!("Error rendering page {}: {error}", current.page);
                self.surfaces.get_mut(slot).clear();
                Some(WorkerEvent::Render(RenderOutcome::Failed {
                    slot,
                    page: current.page,
                    reason: error.to_string(),
                }))
            }
        }
    }

    fn take_if_current(&mut self, slot: SurfaceSlot, id: RequestId) -> Option<Outstanding> {
        let entry = &mut self.outstanding[slot.index()];
        if entry.as_ref().is_some_and(|o| o.id == id) {
            entry.take()
        } else {
            None
        }
    }

    fn cancelled(slot: SurfaceSlot, id: RequestId) -> WorkerEvent {
        debug!("{id:?} on {} surface resolved as cancelled", slot.name());
        WorkerEvent::Render(RenderOutcome::Cancelled { slot, id })
    }

    fn cancel_outstanding(&mut self, slot: SurfaceSlot) {
        if let Some(stale) = self.outstanding[slot.index()].take() {
            debug!(
                "Cancelling {:?} (page {}) on {} surface",
                stale.id,
                stale.page,
                slot.name()
            );
            stale.cancel.cancel();
        }
    }

    fn worker_gone(&mut self) {
        if self.worker_alive {
            error!("Render worker disconnected with {} requests pending", self.pending.len());
        }
        self.worker_alive = false;
        self.pending.clear();
        self.outstanding = [None, None];
    }

    fn next_id(&mut self) -> RequestId {
        let id = RequestId::new(self.next_request_id);
        self.next_request_id += 1;
        id
    }

    /// Shutdown the worker
    pub fn shutdown(&self) {
        let _ = self.request_tx.send(RenderRequest::Shutdown);
    }
}

impl Drop for PageRenderer {
    fn drop(&mut self) {
        self.shutdown();
    }
}
