//! Layout controller - maps the navigation state onto the two surfaces
//!
//! Spreads read lower page on the left. With blank padding on, the blank
//! always precedes page 1, and an even document closes on a trailing blank.
//! In single-page mode the padding slot is shown as a blank after the last page.

use super::renderer::PageRenderer;
use super::request::RequestId;
use super::state::ViewerSession;
use super::surface::SurfaceSlot;

/// What one surface should show after a layout pass
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlotPlan {
    /// A real document page (1-based)
    Page(usize),
    /// The synthetic padding page
    Blank,
    /// Nothing; the surface is cleared
    Empty,
}

/// The left/right assignment for the current state
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Spread {
    pub left: SlotPlan,
    pub right: SlotPlan,
    /// False when the left surface is hidden entirely
    pub left_visible: bool,
}

impl Spread {
    #[must_use]
    pub fn slot(&self, slot: SurfaceSlot) -> SlotPlan {
        match slot {
            SurfaceSlot::Left => self.left,
            SurfaceSlot::Right => self.right,
        }
    }
}

/// Decide which page goes on which surface
#[must_use]
pub fn plan(session: &ViewerSession) -> Spread {
    let current = session.current_page;
    let total = session.total_page_count;
    let real = session.real_page_count;
    let page_or_empty = |page: usize| {
        if (1..=real).contains(&page) {
            SlotPlan::Page(page)
        } else {
            SlotPlan::Empty
        }
    };

    if session.single_page_view {
        // The padding slot shows up as a trailing blank page
        let right = if session.show_blank_page && current > real {
            SlotPlan::Blank
        } else {
            page_or_empty(current)
        };
        return Spread {
            left: SlotPlan::Empty,
            right,
            left_visible: true,
        };
    }

    if !session.show_blank_page {
        if current == total && total % 2 == 1 {
            return Spread {
                left: SlotPlan::Empty,
                right: page_or_empty(current),
                left_visible: false,
            };
        }
        return Spread {
            left: page_or_empty(current),
            right: page_or_empty(current + 1),
            left_visible: true,
        };
    }

    if current == 1 {
        Spread {
            left: SlotPlan::Blank,
            right: page_or_empty(1),
            left_visible: true,
        }
    } else if current == total && real % 2 == 0 {
        Spread {
            left: page_or_empty(current - 1),
            right: SlotPlan::Blank,
            left_visible: true,
        }
    } else {
        Spread {
            left: page_or_empty(current - 1),
            right: page_or_empty(current),
            left_visible: true,
        }
    }
}

/// Issue the renderer calls for `spread`, left surface first.
///
/// `nominal` is the surface size for this pass, used for blank fills.
/// Returns the ids of the page renders that were started.
pub fn apply(
    spread: &Spread,
    renderer: &mut PageRenderer,
    scale: f32,
    nominal: (u32, u32),
) -> Vec<RequestId> {
    renderer.set_visible(SurfaceSlot::Left, spread.left_visible);
    renderer.set_visible(SurfaceSlot::Right, true);

    let mut issued = Vec::with_capacity(2);
    for slot in SurfaceSlot::ALL {
        match spread.slot(slot) {
            SlotPlan::Page(page) => issued.push(renderer.render(page, slot, scale)),
            SlotPlan::Blank => renderer.render_blank(slot, nominal.0, nominal.1),
            SlotPlan::Empty => renderer.clear(slot),
        }
    }
    issued
}
