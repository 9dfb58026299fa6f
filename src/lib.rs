// Export modules for use in tests
pub mod app;
pub mod event_source;
pub mod inputs;
pub mod panic_handler;
pub mod reader;
pub mod settings;
pub mod widget;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

// Re-export main app components
pub use app::{App, run_app_with_event_source};
pub use reader::{ComicViewer, Command, ViewerOptions};
