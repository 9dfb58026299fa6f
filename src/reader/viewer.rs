//! Comic viewer - the controller that ties session, layout and renderer
//!
//! One `ComicViewer` owns one reading session. Every transition that moves
//! the reading position or changes the page pairing runs the same pipeline:
//! scale planning, layout, surface renders, control refresh.

use log::{debug, error, info};

use super::document::{Document, DocumentInfo, LoadError};
use super::layout::{self, Spread};
use super::renderer::{
    DEFAULT_BLANK_FILL, DEFAULT_CACHE_SIZE, PageRenderer, RenderOutcome, WorkerEvent,
};
use super::scale::ScalePlanner;
use super::state::{Command, DEFAULT_SINGLE_PAGE_MAX_WIDTH, Effect, ViewerSession};
use super::surface::Surfaces;

/// Enablement snapshot for the host's buttons and toggles
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Controls {
    pub prev_enabled: bool,
    pub next_enabled: bool,
    pub blank_toggle_enabled: bool,
    pub blank_toggle_on: bool,
    pub fullscreen_on: bool,
}

/// Host-provided control elements.
///
/// The viewer pushes a fresh [`Controls`] snapshot after every transition.
pub trait ControlPanel {
    fn refresh(&mut self, controls: &Controls);
}

/// Panel for hosts that read [`ComicViewer::controls`] directly
#[derive(Debug, Default)]
pub struct NoPanel;

impl ControlPanel for NoPanel {
    fn refresh(&mut self, _controls: &Controls) {}
}

/// Tunables the viewer is constructed with
#[derive(Clone, Debug, PartialEq)]
pub struct ViewerOptions {
    pub planner: ScalePlanner,
    pub single_page_max_width: u32,
    /// Viewport width the session starts with
    pub viewport_width: u32,
    pub cache_size: usize,
    pub blank_fill: [u8; 3],
    pub start_with_blank_padding: bool,
}

impl Default for ViewerOptions {
    fn default() -> Self {
        Self {
            planner: ScalePlanner::default(),
            single_page_max_width: DEFAULT_SINGLE_PAGE_MAX_WIDTH,
            viewport_width: 1024,
            cache_size: DEFAULT_CACHE_SIZE,
            blank_fill: DEFAULT_BLANK_FILL,
            start_with_blank_padding: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoadState {
    Loading,
    Ready,
    /// Terminal: nothing is rendered and commands are ignored
    Failed(String),
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("document failed to load: {0}")]
pub struct LoadFailed(pub String);

pub struct ComicViewer<P: ControlPanel = NoPanel> {
    renderer: PageRenderer,
    panel: P,
    options: ViewerOptions,
    load_state: LoadState,
    info: Option<DocumentInfo>,
    session: Option<ViewerSession>,
    spread: Option<Spread>,
    controls: Controls,
    layout_passes: usize,
}

impl<P: ControlPanel> ComicViewer<P> {
    /// Start loading a document; `load` runs on the render worker thread
    pub fn open<D, F>(load: F, options: ViewerOptions, panel: P) -> Self
    where
        D: Document + 'static,
        F: FnOnce() -> Result<D, LoadError> + Send + 'static,
    {
        info!("Loading document...");
        let renderer = PageRenderer::spawn(load, options.cache_size, options.blank_fill);

        Self {
            renderer,
            panel,
            options,
            load_state: LoadState::Loading,
            info: None,
            session: None,
            spread: None,
            controls: Controls::default(),
            layout_passes: 0,
        }
    }

    /// Block until the document has loaded (and the first layout ran) or failed
    pub fn wait_until_loaded(&mut self) -> Result<&DocumentInfo, LoadFailed> {
        while self.load_state == LoadState::Loading {
            match self.renderer.next_event() {
                Some(event) => {
                    self.handle_event(event);
                }
                None => {
                    self.fail("render worker exited before loading finished".to_string());
                }
            }
        }

        match (&self.load_state, &self.info) {
            (LoadState::Ready, Some(info)) => Ok(info),
            (LoadState::Failed(reason), _) => Err(LoadFailed(reason.clone())),
            _ => Err(LoadFailed("document information missing".to_string())),
        }
    }

    /// Process worker responses that already arrived, without blocking
    pub fn poll(&mut self) -> Vec<RenderOutcome> {
        let events = self.renderer.poll();
        self.handle_events(events)
    }

    /// Block until every outstanding render resolved
    pub fn settle(&mut self) -> Vec<RenderOutcome> {
        let events = self.renderer.settle();
        self.handle_events(events)
    }

    /// Apply a navigation command.
    ///
    /// Returns false when the command was ignored or changed nothing.
    pub fn dispatch(&mut self, cmd: Command) -> bool {
        if let Command::Resize { width } = cmd {
            self.options.viewport_width = width;
        }

        let Some(session) = self.session.as_mut() else {
            debug!("Ignoring {cmd:?}: no document ({:?})", self.load_state);
            return false;
        };

        let effects = session.apply(cmd);
        debug!(
            "{cmd:?} -> page {}/{} single={} blank={}",
            session.current_page,
            session.total_page_count,
            session.single_page_view,
            session.show_blank_page
        );
        self.run_effects(&effects);
        !effects.is_empty()
    }

    pub fn advance(&mut self) -> bool {
        self.dispatch(Command::Advance)
    }

    pub fn retreat(&mut self) -> bool {
        self.dispatch(Command::Retreat)
    }

    pub fn toggle_blank_padding(&mut self) -> bool {
        self.dispatch(Command::ToggleBlankPadding)
    }

    pub fn resize(&mut self, width: u32) -> bool {
        self.dispatch(Command::Resize { width })
    }

    pub fn toggle_fullscreen(&mut self) -> bool {
        self.dispatch(Command::ToggleFullscreen)
    }

    #[must_use]
    pub fn load_state(&self) -> &LoadState {
        &self.load_state
    }

    #[must_use]
    pub fn document_info(&self) -> Option<&DocumentInfo> {
        self.info.as_ref()
    }

    #[must_use]
    pub fn session(&self) -> Option<&ViewerSession> {
        self.session.as_ref()
    }

    /// Spread chosen by the last layout pass
    #[must_use]
    pub fn spread(&self) -> Option<Spread> {
        self.spread
    }

    #[must_use]
    pub fn surfaces(&self) -> &Surfaces {
        self.renderer.surfaces()
    }

    #[must_use]
    pub fn controls(&self) -> Controls {
        self.controls
    }

    /// Number of layout passes run so far
    #[must_use]
    pub fn layout_passes(&self) -> usize {
        self.layout_passes
    }

    #[must_use]
    pub fn is_rendering(&self) -> bool {
        self.renderer.is_busy()
    }

    #[must_use]
    pub fn panel(&self) -> &P {
        &self.panel
    }

    fn handle_events(&mut self, events: Vec<WorkerEvent>) -> Vec<RenderOutcome> {
        events
            .into_iter()
            .filter_map(|event| self.handle_event(event))
            .collect()
    }

    fn handle_event(&mut self, event: WorkerEvent) -> Option<RenderOutcome> {
        match event {
            WorkerEvent::Loaded(info) => {
                self.on_loaded(info);
                None
            }
            WorkerEvent::LoadFailed(reason) => {
                self.fail(reason);
                None
            }
            WorkerEvent::Render(outcome) => Some(outcome),
        }
    }

    fn on_loaded(&mut self, info: DocumentInfo) {
        info!("PDF loaded: {} pages", info.page_count);

        let mut session = ViewerSession::new(
            info.page_count,
            self.options.viewport_width,
            self.options.single_page_max_width,
        );
        if self.options.start_with_blank_padding {
            let _ = session.apply(Command::ToggleBlankPadding);
        }

        self.session = Some(session);
        self.info = Some(info);
        self.load_state = LoadState::Ready;
        self.run_effects(&[Effect::Relayout, Effect::RefreshControls]);
    }

    fn fail(&mut self, reason: String) {
        error!("Error loading PDF: {reason}");
        self.load_state = LoadState::Failed(reason);
    }

    fn run_effects(&mut self, effects: &[Effect]) {
        for effect in effects {
            match effect {
                Effect::Relayout => self.relayout(),
                Effect::RefreshControls => self.refresh_controls(),
            }
        }
    }

    fn relayout(&mut self) {
        let (Some(session), Some(info)) = (self.session.as_mut(), self.info.as_ref()) else {
            return;
        };

        let scale = self.options.planner.plan(info.reference_size);
        session.scale = scale;
        let nominal = info.reference_size.scaled_px(scale);

        let spread = layout::plan(session);
        debug!(
            "Layout pass {}: {spread:?} at scale {scale} (nominal {}x{})",
            self.layout_passes + 1,
            nominal.0,
            nominal.1
        );
        layout::apply(&spread, &mut self.renderer, scale, nominal);

        self.spread = Some(spread);
        self.layout_passes += 1;
    }

    fn refresh_controls(&mut self) {
        let Some(session) = self.session.as_ref() else {
            return;
        };

        self.controls = Controls {
            prev_enabled: session.previous_page().is_some(),
            next_enabled: session.next_page().is_some(),
            blank_toggle_enabled: session.blank_toggle_enabled(),
            blank_toggle_on: session.show_blank_page,
            fullscreen_on: session.fullscreen,
        };
        self.panel.refresh(&self.controls);
    }
}
