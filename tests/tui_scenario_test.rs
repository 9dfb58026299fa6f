use koma::app::{App, run_app_with_event_source};
use koma::inputs::InputAdapter;
use koma::reader::{ComicViewer, PageSize, ViewerOptions};
use koma::test_utils::test_helpers::{
    SolidDocument, TestScenarioBuilder, capture_terminal_state, create_test_terminal,
};
use koma::widget::ControlBarState;

fn create_app(pages: usize, columns: u16) -> App {
    let doc = SolidDocument::uniform(pages, PageSize::new(40.0, 60.0)).titled("Test Comic");
    let input = InputAdapter::new(50.0, 8);
    let options = ViewerOptions {
        viewport_width: input.columns_to_px(columns),
        ..ViewerOptions::default()
    };

    let mut viewer = ComicViewer::open(move || Ok(doc), options, ControlBarState::default());
    viewer.wait_until_loaded().unwrap();
    viewer.settle();
    App::new(viewer, input)
}

#[test]
fn test_status_bar_follows_navigation() {
    let mut app = create_app(4, 128);
    let mut terminal = create_test_terminal(128, 30);

    terminal.draw(|f| app.draw(f)).unwrap();
    let screen = capture_terminal_state(&terminal);
    assert!(screen.contains("Test Comic | pages 1-2 of 4"), "{screen}");
    assert!(screen.contains("◀ next"));
    assert!(screen.contains("[b] blank: off"));

    let quit = app.handle_event(&TestScenarioBuilder::new().press_left().build().events()[0]);
    assert!(!quit);
    app.viewer_mut().settle();

    terminal.draw(|f| app.draw(f)).unwrap();
    let screen = capture_terminal_state(&terminal);
    assert!(screen.contains("Test Comic | pages 3-4 of 4"), "{screen}");
}

#[test]
fn test_fullscreen_hides_control_bar() {
    let mut app = create_app(4, 128);
    let mut terminal = create_test_terminal(128, 30);

    for event in TestScenarioBuilder::new().toggle_fullscreen().build().events() {
        app.handle_event(event);
    }
    assert!(app.viewer().panel().controls().fullscreen_on);

    terminal.draw(|f| app.draw(f)).unwrap();
    let screen = capture_terminal_state(&terminal);
    assert!(!screen.contains("◀ next"));
    assert!(screen.contains('▀'));
}

#[test]
fn test_scripted_session_runs_to_quit() {
    let mut app = create_app(4, 128);
    let mut terminal = create_test_terminal(128, 30);
    let mut events = TestScenarioBuilder::new()
        .press_left()
        .toggle_blank_padding()
        .press_right()
        .swipe(10, 20)
        .resize(60, 30)
        .quit()
        .build();

    run_app_with_event_source(&mut terminal, &mut app, &mut events).unwrap();

    // left: 1 -> 3; padding keeps 3; right: 3 -> 1; swipe forward: 1 -> 3;
    // 60 columns is 480px, below the single page threshold
    let session = app.viewer().session().unwrap();
    assert!(session.show_blank_page);
    assert!(session.single_page_view);
    assert_eq!(session.total_page_count, 5);
    assert_eq!(session.current_page, 3);
    let controls = app.viewer().panel().controls();
    assert!(controls.blank_toggle_on);
    assert!(controls.next_enabled);
}

#[test]
fn test_quit_key_stops_before_later_events() {
    let mut app = create_app(6, 128);
    let mut terminal = create_test_terminal(128, 30);
    let mut events = TestScenarioBuilder::new()
        .press_left()
        .quit()
        .press_left()
        .build();

    run_app_with_event_source(&mut terminal, &mut app, &mut events).unwrap();

    assert_eq!(app.viewer().session().unwrap().current_page, 3);
}
