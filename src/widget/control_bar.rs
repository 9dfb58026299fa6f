use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Widget,
};

use crate::reader::{ControlPanel, Controls, SlotPlan, Spread};

/// Terminal-side control panel: keeps the latest snapshot for drawing
#[derive(Debug, Default, Clone)]
pub struct ControlBarState {
    controls: Controls,
}

impl ControlBarState {
    pub fn controls(&self) -> Controls {
        self.controls
    }
}

impl ControlPanel for ControlBarState {
    fn refresh(&mut self, controls: &Controls) {
        self.controls = *controls;
    }
}

/// Human readable list of the pages on screen
pub fn spread_label(spread: &Spread, page_count: usize) -> String {
    let mut pages: Vec<usize> = [spread.left, spread.right]
        .into_iter()
        .filter_map(|plan| match plan {
            SlotPlan::Page(page) => Some(page),
            SlotPlan::Blank | SlotPlan::Empty => None,
        })
        .collect();
    pages.sort_unstable();

    match pages.as_slice() {
        [] => format!("blank of {page_count}"),
        [page] => format!("page {page} of {page_count}"),
        [first, .., last] => format!("pages {first}-{last} of {page_count}"),
    }
}

/// One-line bar: next on the left, previous on the right, toggles between
pub struct ControlBar<'a> {
    controls: Controls,
    status: &'a str,
}

impl<'a> ControlBar<'a> {
    pub fn new(controls: Controls, status: &'a str) -> Self {
        Self { controls, status }
    }

    fn button(label: &str, enabled: bool) -> Span<'static> {
        let style = if enabled {
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        Span::styled(format!(" {label} "), style)
    }

    fn switch(label: &str, on: bool) -> String {
        format!("{label}: {}", if on { "on" } else { "off" })
    }
}

impl Widget for ControlBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let c = self.controls;
        let line = Line::from(vec![
            Self::button("◀ next", c.next_enabled),
            Span::raw(" "),
            Self::button(
                &Self::switch("[b] blank", c.blank_toggle_on),
                c.blank_toggle_enabled,
            ),
            Self::button(&Self::switch("[f] fullscreen", c.fullscreen_on), true),
            Span::styled(
                format!(" {} ", self.status),
                Style::default().fg(Color::Gray),
            ),
            Self::button("prev ▶", c.prev_enabled),
        ])
        .centered();

        line.render(area, buf);
    }
}
