//! Navigation state machine
//!
//! `ViewerSession` owns the reading position and the mode flags. Commands
//! mutate it and return the effects the controller must run; the session
//! itself never renders.

/// Viewport widths at or below this switch to single-page mode
pub const DEFAULT_SINGLE_PAGE_MAX_WIDTH: u32 = 768;

/// Synthetic slots added to the page count while blank padding is on
pub const BLANK_PADDING_SLOTS: usize = 1;

/// Current navigation state for an open document
#[derive(Clone, Debug, PartialEq)]
pub struct ViewerSession {
    /// Current page (1-based)
    pub current_page: usize,

    /// Page count including blank padding
    pub total_page_count: usize,

    /// Page count of the document itself
    pub real_page_count: usize,

    /// Derived from the viewport width
    pub single_page_view: bool,

    /// Blank-page padding toggle
    pub show_blank_page: bool,

    /// Render scale from the last layout pass
    pub scale: f32,

    pub fullscreen: bool,

    single_page_max_width: u32,
}

impl ViewerSession {
    /// Create a session positioned on page 1
    #[must_use]
    pub fn new(real_page_count: usize, viewport_width: u32, single_page_max_width: u32) -> Self {
        let real_page_count = real_page_count.max(1);
        Self {
            current_page: 1,
            total_page_count: real_page_count,
            real_page_count,
            single_page_view: viewport_width <= single_page_max_width,
            show_blank_page: false,
            scale: 1.0,
            fullscreen: false,
            single_page_max_width,
        }
    }

    /// Blank padding is meaningless for a single page document
    #[must_use]
    pub fn blank_toggle_enabled(&self) -> bool {
        self.real_page_count > 1
    }

    /// Page `advance` would move to, if any
    #[must_use]
    pub fn next_page(&self) -> Option<usize> {
        let (current, total) = (self.current_page, self.total_page_count);
        if self.single_page_view {
            (current < total).then_some(current + 1)
        } else if current + 1 < total {
            Some(current + 2)
        } else {
            (current < total).then_some(current + 1)
        }
    }

    /// Page `retreat` would move to, if any
    #[must_use]
    pub fn previous_page(&self) -> Option<usize> {
        let current = self.current_page;
        if self.single_page_view {
            (current > 1).then(|| current - 1)
        } else {
            (current > 2).then(|| current - 2)
        }
    }

    /// Apply a command and return resulting effects
    #[must_use]
    pub fn apply(&mut self, cmd: Command) -> Vec<Effect> {
        match cmd {
            Command::Advance => match self.next_page() {
                Some(page) => {
                    self.current_page = page;
                    vec![Effect::Relayout, Effect::RefreshControls]
                }
                None => vec![],
            },

            Command::Retreat => match self.previous_page() {
                Some(page) => {
                    self.current_page = page;
                    vec![Effect::Relayout, Effect::RefreshControls]
                }
                None => vec![],
            },

            Command::ToggleBlankPadding => {
                if !self.blank_toggle_enabled() {
                    return vec![];
                }

                self.show_blank_page = !self.show_blank_page;
                self.total_page_count = if self.show_blank_page {
                    self.real_page_count + BLANK_PADDING_SLOTS
                } else {
                    self.real_page_count
                };
                self.current_page = self.current_page.min(self.total_page_count);
                vec![Effect::Relayout, Effect::RefreshControls]
            }

            Command::Resize { width } => {
                self.single_page_view = width <= self.single_page_max_width;
                vec![Effect::Relayout, Effect::RefreshControls]
            }

            Command::ToggleFullscreen => {
                self.fullscreen = !self.fullscreen;
                vec![Effect::RefreshControls]
            }
        }
    }
}

/// Commands that modify the session
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Next page or spread
    Advance,
    /// Previous page or spread
    Retreat,
    /// Insert or remove the synthetic blank page
    ToggleBlankPadding,
    /// Viewport width changed (pixels)
    Resize { width: u32 },
    ToggleFullscreen,
}

/// Effects produced by state changes
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Effect {
    /// Recompute scale and layout, re-render both surfaces
    Relayout,
    /// Push button/toggle enablement to the control panel
    RefreshControls,
}
