use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use log::{debug, info};
use ratatui::{
    Frame, Terminal,
    layout::{Constraint, Layout},
    style::{Color, Style},
    text::Line,
    widgets::Paragraph,
};

use crate::event_source::{Event, EventSource};
use crate::inputs::{InputAdapter, Intent};
use crate::reader::{ComicViewer, ControlPanel, LoadState, SurfaceContent, SurfaceSlot};
use crate::widget::{ControlBar, ControlBarState, SpreadView, spread_label};

/// Terminal front end around one viewer
pub struct App {
    viewer: ComicViewer<ControlBarState>,
    input: InputAdapter,
}

impl App {
    pub fn new(viewer: ComicViewer<ControlBarState>, input: InputAdapter) -> Self {
        Self { viewer, input }
    }

    pub fn viewer(&self) -> &ComicViewer<ControlBarState> {
        &self.viewer
    }

    pub fn viewer_mut(&mut self) -> &mut ComicViewer<ControlBarState> {
        &mut self.viewer
    }

    /// Route one terminal event; returns true when the user asked to quit
    pub fn handle_event(&mut self, event: &Event) -> bool {
        let Some(intent) = self.input.translate(event) else {
            return false;
        };
        debug!("Input {intent:?}");

        match intent.command() {
            Some(cmd) => {
                self.viewer.dispatch(cmd);
                false
            }
            None => intent == Intent::Quit,
        }
    }

    pub fn draw(&self, f: &mut Frame) {
        let area = f.area();

        match self.viewer.load_state() {
            LoadState::Loading => {
                f.render_widget(message("Loading...", Color::Gray), area);
            }
            LoadState::Failed(reason) => {
                let text = format!("Could not open document: {reason}");
                f.render_widget(message(&text, Color::Red), area);
            }
            LoadState::Ready => {
                let single_page = self
                    .viewer
                    .session()
                    .is_some_and(|session| session.single_page_view);
                let spread = SpreadView::new(self.viewer.surfaces(), single_page);

                let controls = self.viewer.panel().controls();
                if controls.fullscreen_on {
                    f.render_widget(spread, area);
                    return;
                }

                let [page_area, bar_area] =
                    Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(area);
                f.render_widget(spread, page_area);
                let status = self.status();
                f.render_widget(ControlBar::new(controls, &status), bar_area);
            }
        }
    }

    fn status(&self) -> String {
        let (Some(spread), Some(info)) = (self.viewer.spread(), self.viewer.document_info()) else {
            return String::new();
        };

        let label = spread_label(&spread, info.page_count);
        match &info.title {
            Some(title) if !title.is_empty() => format!("{title} | {label}"),
            _ => label,
        }
    }
}

fn message(text: &str, color: Color) -> Paragraph<'_> {
    Paragraph::new(Line::from(text).centered()).style(Style::default().fg(color))
}

pub fn run_app_with_event_source<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    event_source: &mut dyn EventSource,
) -> Result<()>
where
    B::Error: Send + Sync + 'static,
{
    let tick_rate = Duration::from_millis(50);
    let mut first_render = true;

    loop {
        let state_before = app.viewer.load_state().clone();
        let outcomes = app.viewer.poll();
        let mut needs_redraw = first_render
            || !outcomes.is_empty()
            || *app.viewer.load_state() != state_before;
        first_render = false;

        let mut events_processed = 0;
        let mut should_quit = false;
        while event_source.poll(Duration::from_millis(0))? && events_processed < 50 {
            let event = event_source.read()?;
            events_processed += 1;
            if app.handle_event(&event) {
                should_quit = true;
                break;
            }
        }

        if should_quit {
            info!("Quit requested");
            break;
        }

        needs_redraw |= events_processed > 0;
        if needs_redraw {
            terminal.draw(|f| app.draw(f))?;
        }

        // Sleep until input arrives or the next tick
        event_source.poll(tick_rate)?;
    }

    Ok(())
}

/// Step forward until `page` is on screen or the end is reached
pub fn seek_to_page<P: ControlPanel>(viewer: &mut ComicViewer<P>, page: usize) {
    while viewer
        .session()
        .is_some_and(|session| session.current_page < page)
    {
        if !viewer.advance() {
            break;
        }
    }
}

/// Render the current spread and write each visible surface as a PNG
pub fn export_spread<P: ControlPanel>(
    viewer: &mut ComicViewer<P>,
    dir: &Path,
) -> Result<Vec<PathBuf>> {
    viewer.settle();
    std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;

    let mut written = Vec::new();
    for slot in SurfaceSlot::ALL {
        let surface = viewer.surfaces().get(slot);
        if !surface.is_visible() || surface.content() == SurfaceContent::Empty {
            continue;
        }

        let path = dir.join(format!("{}.png", slot.name()));
        surface
            .image()
            .save(&path)
            .with_context(|| format!("writing {}", path.display()))?;
        info!("Exported {:?} to {}", surface.content(), path.display());
        written.push(path);
    }

    Ok(written)
}
