use koma::reader::{
    ComicViewer, Command, DEFAULT_BLANK_FILL, LoadError, LoadState, PageSize, RenderOutcome,
    ScalePlanner, SlotPlan, SurfaceContent, SurfaceSlot, ViewerOptions,
};
use koma::test_utils::test_helpers::{RecordingPanel, SolidDocument, page_color};

const PAGE: PageSize = PageSize::new(40.0, 60.0);

fn open_at_width(doc: SolidDocument, width: u32) -> ComicViewer<RecordingPanel> {
    let options = ViewerOptions {
        viewport_width: width,
        ..ViewerOptions::default()
    };
    let mut viewer = ComicViewer::open(move || Ok(doc), options, RecordingPanel::default());
    viewer.wait_until_loaded().unwrap();
    viewer.settle();
    viewer
}

fn content(viewer: &ComicViewer<RecordingPanel>, slot: SurfaceSlot) -> SurfaceContent {
    viewer.surfaces().get(slot).content()
}

fn center_pixel(viewer: &ComicViewer<RecordingPanel>, slot: SurfaceSlot) -> [u8; 3] {
    let image = viewer.surfaces().get(slot).image();
    image.get_pixel(image.width() / 2, image.height() / 2).0
}

#[test]
fn test_dual_mode_opens_on_first_pair() {
    let viewer = open_at_width(SolidDocument::uniform(6, PAGE), 1024);

    let session = viewer.session().unwrap();
    assert_eq!(session.current_page, 1);
    assert!(!session.single_page_view);
    assert_eq!(content(&viewer, SurfaceSlot::Left), SurfaceContent::Page(1));
    assert_eq!(content(&viewer, SurfaceSlot::Right), SurfaceContent::Page(2));
    assert_eq!(center_pixel(&viewer, SurfaceSlot::Left), page_color(1));
    assert_eq!(center_pixel(&viewer, SurfaceSlot::Right), page_color(2));

    // Small pages keep the base scale: 40x60 at 6.0
    assert_eq!(viewer.surfaces().right().dimensions(), (240, 360));
}

#[test]
fn test_padding_on_first_page_puts_blank_left() {
    let mut viewer = open_at_width(SolidDocument::uniform(4, PAGE), 1024);

    assert!(viewer.toggle_blank_padding());
    viewer.settle();

    assert_eq!(content(&viewer, SurfaceSlot::Left), SurfaceContent::Blank);
    assert_eq!(content(&viewer, SurfaceSlot::Right), SurfaceContent::Page(1));
    assert_eq!(center_pixel(&viewer, SurfaceSlot::Left), DEFAULT_BLANK_FILL);
    assert_eq!(center_pixel(&viewer, SurfaceSlot::Right), page_color(1));
    // Blank takes the nominal size of the reference page
    assert_eq!(viewer.surfaces().left().dimensions(), (240, 360));
}

#[test]
fn test_padded_even_document_ends_on_blank() {
    let mut viewer = open_at_width(SolidDocument::uniform(4, PAGE), 1024);
    viewer.toggle_blank_padding();

    assert!(viewer.advance());
    assert!(viewer.advance());
    viewer.settle();

    let session = viewer.session().unwrap();
    assert_eq!(session.current_page, 5);
    assert_eq!(session.total_page_count, 5);
    assert_eq!(content(&viewer, SurfaceSlot::Left), SurfaceContent::Page(4));
    assert_eq!(content(&viewer, SurfaceSlot::Right), SurfaceContent::Blank);

    let controls = viewer.controls();
    assert!(!controls.next_enabled);
    assert!(controls.prev_enabled);
    assert!(controls.blank_toggle_on);
}

#[test]
fn test_padded_odd_document_last_spread_shows_a_page() {
    let mut viewer = open_at_width(SolidDocument::uniform(3, PAGE), 1024);
    viewer.toggle_blank_padding();
    assert_eq!(viewer.session().unwrap().total_page_count, 4);

    while viewer.controls().next_enabled {
        assert!(viewer.advance());
    }
    viewer.settle();

    assert_eq!(viewer.session().unwrap().current_page, 4);
    assert!(viewer.surfaces().left().is_visible());
    assert_eq!(content(&viewer, SurfaceSlot::Left), SurfaceContent::Page(3));
    assert_eq!(content(&viewer, SurfaceSlot::Right), SurfaceContent::Empty);
    assert_eq!(center_pixel(&viewer, SurfaceSlot::Left), page_color(3));
}

#[test]
fn test_single_mode_padding_slot_is_blank() {
    let mut viewer = open_at_width(SolidDocument::uniform(4, PAGE), 500);
    viewer.toggle_blank_padding();
    viewer.settle();

    // No leading blank in single mode
    assert_eq!(content(&viewer, SurfaceSlot::Right), SurfaceContent::Page(1));

    for _ in 0..4 {
        assert!(viewer.advance());
    }
    viewer.settle();

    let session = viewer.session().unwrap();
    assert_eq!(session.current_page, 5);
    assert_eq!(session.total_page_count, 5);
    assert_eq!(content(&viewer, SurfaceSlot::Right), SurfaceContent::Blank);
    assert_eq!(center_pixel(&viewer, SurfaceSlot::Right), DEFAULT_BLANK_FILL);
    assert_eq!(content(&viewer, SurfaceSlot::Left), SurfaceContent::Empty);

    let controls = viewer.controls();
    assert!(!controls.next_enabled);
    assert!(controls.prev_enabled);
    assert!(!viewer.advance());
}

#[test]
fn test_turning_padding_off_restores_page_count() {
    let mut viewer = open_at_width(SolidDocument::uniform(4, PAGE), 1024);
    viewer.toggle_blank_padding();
    viewer.advance();
    viewer.advance();

    viewer.toggle_blank_padding();
    viewer.settle();

    let session = viewer.session().unwrap();
    assert_eq!(session.total_page_count, 4);
    assert_eq!(session.current_page, 4);
    assert_eq!(
        viewer.spread().map(|s| (s.left, s.right)),
        Some((SlotPlan::Page(4), SlotPlan::Empty))
    );
}

#[test]
fn test_odd_last_page_hides_left_surface() {
    let mut viewer = open_at_width(SolidDocument::uniform(5, PAGE), 1024);
    viewer.advance();
    viewer.advance();
    viewer.settle();

    assert_eq!(viewer.session().unwrap().current_page, 5);
    assert!(!viewer.surfaces().left().is_visible());
    assert_eq!(content(&viewer, SurfaceSlot::Right), SurfaceContent::Page(5));
    assert!(!viewer.advance());
}

#[test]
fn test_single_page_document_disables_everything() {
    let mut viewer = open_at_width(SolidDocument::uniform(1, PAGE), 500);

    let controls = viewer.controls();
    assert!(!controls.blank_toggle_enabled);
    assert!(!controls.prev_enabled);
    assert!(!controls.next_enabled);

    let passes = viewer.layout_passes();
    assert!(!viewer.toggle_blank_padding());
    assert!(!viewer.advance());
    assert!(!viewer.retreat());
    assert_eq!(viewer.layout_passes(), passes);
    assert_eq!(viewer.session().unwrap().current_page, 1);
    assert_eq!(content(&viewer, SurfaceSlot::Right), SurfaceContent::Page(1));
}

#[test]
fn test_resize_across_threshold_keeps_page_and_relayouts_once() {
    let mut viewer = open_at_width(SolidDocument::uniform(10, PAGE), 1024);
    viewer.advance();
    viewer.settle();
    assert_eq!(viewer.session().unwrap().current_page, 3);

    let passes = viewer.layout_passes();
    assert!(viewer.resize(500));
    assert_eq!(viewer.layout_passes(), passes + 1);

    let session = viewer.session().unwrap();
    assert!(session.single_page_view);
    assert_eq!(session.current_page, 3);

    viewer.settle();
    assert_eq!(content(&viewer, SurfaceSlot::Right), SurfaceContent::Page(3));
    assert_eq!(content(&viewer, SurfaceSlot::Left), SurfaceContent::Empty);
}

#[test]
fn test_relayout_reuses_cached_rasters() {
    let doc = SolidDocument::uniform(4, PAGE);
    let log = doc.render_log();
    let mut viewer = open_at_width(doc, 1024);

    // Still dual mode: same pages, same scale
    viewer.resize(1200);
    viewer.settle();

    assert_eq!(log.lock().unwrap().as_slice(), &[1, 2]);
    assert_eq!(content(&viewer, SurfaceSlot::Left), SurfaceContent::Page(1));
    assert_eq!(content(&viewer, SurfaceSlot::Right), SurfaceContent::Page(2));
}

#[test]
fn test_large_pages_shrink_under_pixel_budget() {
    let size = PageSize::new(600.0, 900.0);
    let viewer = open_at_width(SolidDocument::uniform(2, size), 1024);

    let scale = viewer.session().unwrap().scale;
    assert!(scale < ScalePlanner::DEFAULT_BASE_SCALE);
    assert!(ScalePlanner::scaled_area(size, scale) <= ScalePlanner::DEFAULT_MAX_PIXELS);
    assert!(
        ScalePlanner::scaled_area(size, scale / ScalePlanner::DEFAULT_SHRINK_FACTOR)
            > ScalePlanner::DEFAULT_MAX_PIXELS
    );
    assert_eq!(viewer.surfaces().left().dimensions(), size.scaled_px(scale));
}

#[test]
fn test_controls_are_pushed_on_every_transition() {
    let mut viewer = open_at_width(SolidDocument::uniform(6, PAGE), 1024);
    assert_eq!(viewer.panel().snapshots.len(), 1);

    let passes = viewer.layout_passes();
    viewer.toggle_fullscreen();
    assert_eq!(viewer.layout_passes(), passes);
    assert!(viewer.controls().fullscreen_on);

    viewer.advance();
    viewer.retreat();
    let snapshots = &viewer.panel().snapshots;
    assert_eq!(snapshots.len(), 4);
    assert!(snapshots[2].prev_enabled);
    assert!(!snapshots[3].prev_enabled);
    assert!(snapshots.iter().skip(1).all(|c| c.fullscreen_on));
}

#[test]
fn test_render_failure_clears_only_that_surface() {
    let doc = SolidDocument::uniform(3, PAGE).failing_on(2);
    let options = ViewerOptions::default();
    let mut viewer = ComicViewer::open(move || Ok(doc), options, RecordingPanel::default());
    viewer.wait_until_loaded().unwrap();

    let outcomes = viewer.settle();
    assert!(outcomes.contains(&RenderOutcome::Rendered {
        slot: SurfaceSlot::Left,
        page: 1
    }));
    assert!(outcomes.iter().any(|o| matches!(
        o,
        RenderOutcome::Failed {
            slot: SurfaceSlot::Right,
            page: 2,
            ..
        }
    )));
    assert_eq!(content(&viewer, SurfaceSlot::Left), SurfaceContent::Page(1));
    assert_eq!(content(&viewer, SurfaceSlot::Right), SurfaceContent::Empty);

    // Navigation keeps working after a failure; page 3 of 3 stands alone
    assert!(viewer.advance());
    viewer.settle();
    assert_eq!(content(&viewer, SurfaceSlot::Right), SurfaceContent::Page(3));
    assert!(!viewer.surfaces().left().is_visible());
}

#[test]
fn test_load_failure_leaves_viewer_unrendered() {
    let mut viewer = ComicViewer::open(
        || Err::<SolidDocument, _>(LoadError::open("missing.pdf", "no such file")),
        ViewerOptions::default(),
        RecordingPanel::default(),
    );

    let err = viewer.wait_until_loaded().unwrap_err();
    assert!(err.0.contains("missing.pdf"));
    assert!(matches!(viewer.load_state(), LoadState::Failed(_)));

    assert!(!viewer.dispatch(Command::Advance));
    assert!(!viewer.toggle_blank_padding());
    assert!(!viewer.resize(500));
    assert_eq!(viewer.layout_passes(), 0);
    assert!(viewer.panel().snapshots.is_empty());
    assert_eq!(content(&viewer, SurfaceSlot::Left), SurfaceContent::Empty);
    assert_eq!(content(&viewer, SurfaceSlot::Right), SurfaceContent::Empty);
}

#[test]
fn test_empty_document_fails_to_load() {
    let mut viewer = ComicViewer::open(
        || Ok(SolidDocument::with_sizes(vec![])),
        ViewerOptions::default(),
        RecordingPanel::default(),
    );

    assert!(viewer.wait_until_loaded().is_err());
    assert!(viewer.session().is_none());
}
