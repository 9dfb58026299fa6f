pub mod test_helpers {
    use std::collections::HashSet;
    use std::sync::{Arc, Mutex};

    use crate::event_source::{Event, KeyCode, KeyModifiers, SimulatedEventSource};
    use crate::reader::{CancelToken, Controls, ControlPanel, Document, PageSize, RenderError};
    use flume::Receiver;
    use image::{Rgb, RgbImage};
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    /// Colour every page of a [`SolidDocument`] is painted with
    pub fn page_color(page: usize) -> [u8; 3] {
        let p = (page % 256) as u8;
        [p.wrapping_mul(47), 128u8.wrapping_add(p.wrapping_mul(29)), 255 - p]
    }

    /// In-memory document whose pages are solid colour rectangles
    pub struct SolidDocument {
        sizes: Vec<PageSize>,
        title: Option<String>,
        failing: HashSet<usize>,
        gate: Option<(usize, Receiver<()>)>,
        rasterized: Arc<Mutex<Vec<usize>>>,
    }

    impl SolidDocument {
        /// `page_count` pages of the same size
        pub fn uniform(page_count: usize, size: PageSize) -> Self {
            Self::with_sizes(vec![size; page_count])
        }

        pub fn with_sizes(sizes: Vec<PageSize>) -> Self {
            Self {
                sizes,
                title: None,
                failing: HashSet::new(),
                gate: None,
                rasterized: Arc::new(Mutex::new(Vec::new())),
            }
        }

        pub fn titled(mut self, title: &str) -> Self {
            self.title = Some(title.to_string());
            self
        }

        /// Rasterizing `page` fails
        pub fn failing_on(mut self, page: usize) -> Self {
            self.failing.insert(page);
            self
        }

        /// Rasterizing `page` blocks until a message (or disconnect) on `gate`
        pub fn gated_on(mut self, page: usize, gate: Receiver<()>) -> Self {
            self.gate = Some((page, gate));
            self
        }

        /// Pages rasterized so far, in order; cache hits are not recorded
        pub fn render_log(&self) -> Arc<Mutex<Vec<usize>>> {
            Arc::clone(&self.rasterized)
        }

        fn size_of(&self, page: usize) -> Result<PageSize, RenderError> {
            page.checked_sub(1)
                .and_then(|index| self.sizes.get(index))
                .copied()
                .ok_or(RenderError::PageOutOfRange {
                    page,
                    page_count: self.sizes.len(),
                })
        }
    }

    impl Document for SolidDocument {
        fn page_count(&self) -> usize {
            self.sizes.len()
        }

        fn page_size(&self, page: usize) -> Result<PageSize, RenderError> {
            self.size_of(page)
        }

        fn rasterize(
            &self,
            page: usize,
            scale: f32,
            cancel: &CancelToken,
        ) -> Result<RgbImage, RenderError> {
            let size = self.size_of(page)?;

            if let Some((gated, gate)) = &self.gate {
                if *gated == page {
                    let _ = gate.recv();
                }
            }
            if cancel.is_cancelled() {
                return Err(RenderError::Cancelled);
            }
            if self.failing.contains(&page) {
                return Err(RenderError::generic(format!("page {page} is damaged")));
            }

            if let Ok(mut log) = self.rasterized.lock() {
                log.push(page);
            }
            let (width, height) = size.scaled_px(scale);
            Ok(RgbImage::from_pixel(width, height, Rgb(page_color(page))))
        }

        fn title(&self) -> Option<String> {
            self.title.clone()
        }
    }

    /// Control panel that remembers every snapshot it was given
    #[derive(Debug, Default)]
    pub struct RecordingPanel {
        pub snapshots: Vec<Controls>,
    }

    impl ControlPanel for RecordingPanel {
        fn refresh(&mut self, controls: &Controls) {
            self.snapshots.push(*controls);
        }
    }

    /// Builder for creating test scenarios with simulated user input
    pub struct TestScenarioBuilder {
        events: Vec<Event>,
    }

    impl Default for TestScenarioBuilder {
        fn default() -> Self {
            Self::new()
        }
    }

    impl TestScenarioBuilder {
        pub fn new() -> Self {
            Self { events: Vec::new() }
        }

        /// Add a character key press
        pub fn press_char(mut self, c: char) -> Self {
            self.events.push(SimulatedEventSource::char_key(c));
            self
        }

        /// Left arrow: next page or spread
        pub fn press_left(mut self) -> Self {
            self.events.push(SimulatedEventSource::key_event(
                KeyCode::Left,
                KeyModifiers::empty(),
            ));
            self
        }

        /// Right arrow: previous page or spread
        pub fn press_right(mut self) -> Self {
            self.events.push(SimulatedEventSource::key_event(
                KeyCode::Right,
                KeyModifiers::empty(),
            ));
            self
        }

        pub fn toggle_blank_padding(self) -> Self {
            self.press_char('b')
        }

        pub fn toggle_fullscreen(self) -> Self {
            self.press_char('f')
        }

        /// Drag with the left button from one column to another
        pub fn swipe(mut self, from_column: u16, to_column: u16) -> Self {
            self.events
                .extend(SimulatedEventSource::swipe(from_column, to_column, 1));
            self
        }

        pub fn resize(mut self, columns: u16, rows: u16) -> Self {
            self.events.push(SimulatedEventSource::resize(columns, rows));
            self
        }

        /// Quit the application (press 'q')
        pub fn quit(mut self) -> Self {
            self.events.push(SimulatedEventSource::char_key('q'));
            self
        }

        /// Build the simulated event source
        pub fn build(self) -> SimulatedEventSource {
            SimulatedEventSource::new(self.events)
        }
    }

    /// Create a test terminal for snapshot testing
    pub fn create_test_terminal(width: u16, height: u16) -> Terminal<TestBackend> {
        let backend = TestBackend::new(width, height);
        Terminal::new(backend).unwrap()
    }

    /// Capture the current terminal buffer as a string
    pub fn capture_terminal_state(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        let mut lines = Vec::new();

        for y in 0..buffer.area.height {
            let mut line = String::new();
            for x in 0..buffer.area.width {
                line.push_str(buffer[(x, y)].symbol());
            }
            // Trim trailing whitespace from each line
            lines.push(line.trim_end().to_string());
        }

        // Remove trailing empty lines
        while lines.last().is_some_and(|l| l.is_empty()) {
            lines.pop();
        }

        lines.join("\n")
    }
}
