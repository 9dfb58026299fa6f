//! Input adapter: terminal events to semantic intents
//!
//! Keys, mouse drags and resizes all funnel into [`Intent`]. Pages read right
//! to left, so the left arrow moves forward.

use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEventKind,
};

use super::swipe::{DEFAULT_SWIPE_THRESHOLD_PX, SwipeTracker};
use crate::reader::Command;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Intent {
    Advance,
    Retreat,
    ToggleBlankPadding,
    ToggleFullscreen,
    /// New viewport width in pixels
    Resize(u32),
    Quit,
}

impl Intent {
    /// The viewer command this intent maps to; `Quit` belongs to the host
    #[must_use]
    pub fn command(self) -> Option<Command> {
        match self {
            Intent::Advance => Some(Command::Advance),
            Intent::Retreat => Some(Command::Retreat),
            Intent::ToggleBlankPadding => Some(Command::ToggleBlankPadding),
            Intent::ToggleFullscreen => Some(Command::ToggleFullscreen),
            Intent::Resize(width) => Some(Command::Resize { width }),
            Intent::Quit => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct InputAdapter {
    swipe: SwipeTracker,
    cell_width_px: u32,
}

impl Default for InputAdapter {
    fn default() -> Self {
        Self::new(DEFAULT_SWIPE_THRESHOLD_PX, 8)
    }
}

impl InputAdapter {
    /// `cell_width_px` converts terminal columns to pixels for swipes and resizes
    pub fn new(swipe_threshold_px: f32, cell_width_px: u32) -> Self {
        Self {
            swipe: SwipeTracker::new(swipe_threshold_px),
            cell_width_px: cell_width_px.max(1),
        }
    }

    /// Viewport width in pixels for a terminal `columns` wide
    #[must_use]
    pub fn columns_to_px(&self, columns: u16) -> u32 {
        u32::from(columns) * self.cell_width_px
    }

    pub fn translate(&mut self, event: &Event) -> Option<Intent> {
        match event {
            Event::Key(key) => Self::translate_key(key),
            Event::Mouse(mouse) => {
                let x = self.columns_to_px(mouse.column) as f32;
                match mouse.kind {
                    MouseEventKind::Down(MouseButton::Left) => {
                        self.swipe.press(x);
                        None
                    }
                    MouseEventKind::Up(MouseButton::Left) => self.swipe.release(x),
                    MouseEventKind::Down(_) => {
                        self.swipe.cancel();
                        None
                    }
                    _ => None,
                }
            }
            Event::FocusLost => {
                self.swipe.cancel();
                None
            }
            Event::Resize(columns, _) => Some(Intent::Resize(self.columns_to_px(*columns))),
            _ => None,
        }
    }

    fn translate_key(key: &KeyEvent) -> Option<Intent> {
        if key.kind != KeyEventKind::Press {
            return None;
        }

        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                Some(Intent::Quit)
            }
            KeyCode::Left | KeyCode::Char('h') => Some(Intent::Advance),
            KeyCode::Right | KeyCode::Char('l') => Some(Intent::Retreat),
            KeyCode::Char('b') => Some(Intent::ToggleBlankPadding),
            KeyCode::Char('f') => Some(Intent::ToggleFullscreen),
            KeyCode::Char('q') | KeyCode::Esc => Some(Intent::Quit),
            _ => None,
        }
    }
}
