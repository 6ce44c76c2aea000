use std::sync::Arc;
use std::time::Duration;

use ratatui::Terminal;
use ratatui::backend::TestBackend;
use ratatui::style::{Color, Modifier};

use super::*;
use crate::app::{Message, Model, PersonalizePreview, update};
use crate::suggest::{
    GenerationError, GenerationService, HeuristicGenerator, PersonalizeRequest, PersonalizeResponse,
    SessionEvent, SuggestRequest, SuggestResponse, SuggestionSession, TransformKind,
};

fn create_test_terminal() -> Terminal<TestBackend> {
    let backend = TestBackend::new(80, 12);
    Terminal::new(backend).unwrap()
}

fn model_with(text: &str) -> Model {
    let session = SuggestionSession::new(text, Arc::new(HeuristicGenerator));
    Model::new(session, (80, 12))
}

fn visible_model(text: &str) -> Model {
    let mut model = model_with(text);
    model.session.request_suggestion().unwrap();
    assert_eq!(
        model.session.wait_for_suggestion(Duration::from_secs(5)),
        Some(SessionEvent::SuggestionShown)
    );
    model
}

fn row_text(terminal: &Terminal<TestBackend>, row: u16) -> String {
    let buffer = terminal.backend().buffer();
    (0..buffer.area.width)
        .map(|x| buffer[(x, row)].symbol().to_string())
        .collect()
}

fn screen_text(terminal: &Terminal<TestBackend>) -> String {
    let height = terminal.backend().buffer().area.height;
    (0..height)
        .map(|row| row_text(terminal, row))
        .collect::<Vec<_>>()
        .join("\n")
}

#[test]
fn test_render_shows_document_with_gutter() {
    let model = model_with("first line\nsecond line");
    let mut terminal = create_test_terminal();
    terminal.draw(|frame| render(&model, frame)).unwrap();

    assert!(row_text(&terminal, 0).starts_with("1 first line"));
    assert!(row_text(&terminal, 1).starts_with("2 second line"));
}

#[test]
fn test_ghost_text_and_badge_follow_document_end() {
    let model = visible_model("Hello");
    let mut terminal = create_test_terminal();
    terminal.draw(|frame| render(&model, frame)).unwrap();

    let first = row_text(&terminal, 0);
    assert!(first.contains("Hello"), "row: {first:?}");
    assert!(first.contains(" world"), "row: {first:?}");
    assert!(first.contains(" AI "), "row: {first:?}");

    let buffer = terminal.backend().buffer();
    let ghost_x = u16::try_from(first.find("world").unwrap()).unwrap();
    let cell = &buffer[(ghost_x, 0)];
    assert_eq!(cell.fg, Color::DarkGray);
    assert!(cell.modifier.contains(Modifier::ITALIC));
}

#[test]
fn test_ghost_text_never_enters_document() {
    let model = visible_model("Hello");
    let mut terminal = create_test_terminal();
    terminal.draw(|frame| render(&model, frame)).unwrap();
    terminal.draw(|frame| render(&model, frame)).unwrap();
    assert_eq!(model.session.current_text(), "Hello");
}

#[test]
fn test_status_bar_reflects_suggestion_state() {
    let mut terminal = create_test_terminal();

    let idle = model_with("Hello");
    terminal.draw(|frame| render(&idle, frame)).unwrap();
    assert!(row_text(&terminal, 11).contains("Ctrl+Space: suggest"));

    let visible = visible_model("Hello");
    terminal.draw(|frame| render(&visible, frame)).unwrap();
    let status = row_text(&terminal, 11);
    assert!(status.contains("suggestion: Tab accept"), "status: {status:?}");
    assert!(status.contains("Esc reject"), "status: {status:?}");
}

#[test]
fn test_accepting_removes_ghost_and_shows_merged_text() {
    let model = visible_model("Hello");
    let model = update(model, Message::AcceptSuggestion);
    let mut terminal = create_test_terminal();
    terminal.draw(|frame| render(&model, frame)).unwrap();

    let first = row_text(&terminal, 0);
    assert!(first.starts_with("1 Hello world"), "row: {first:?}");
    assert!(!first.contains(" AI "));
}

#[test]
fn test_toast_renders_above_status_bar() {
    let model = model_with("Hello");
    let model = update(model, Message::Generation(SessionEvent::NoSuggestion));
    let mut terminal = create_test_terminal();
    terminal.draw(|frame| render(&model, frame)).unwrap();
    assert!(row_text(&terminal, 10).contains("[info] No suggestion available"));
}

#[test]
fn test_help_overlay_lists_configured_keys() {
    let mut model = model_with("Hello");
    model.help_visible = true;
    let mut terminal = create_test_terminal();
    terminal.draw(|frame| render(&model, frame)).unwrap();
    let screen = screen_text(&terminal);
    assert!(screen.contains("Help"));
    assert!(screen.contains("Accept suggestion"));
}

#[test]
fn test_preview_overlay_shows_transformed_content() {
    let mut model = model_with("Hello");
    model.preview = Some(PersonalizePreview {
        kind: TransformKind::Improve,
        content: "Hello, improved.".to_string(),
    });
    let mut terminal = create_test_terminal();
    terminal.draw(|frame| render(&model, frame)).unwrap();
    let screen = screen_text(&terminal);
    assert!(screen.contains("Improve preview"));
    assert!(screen.contains("Hello, improved."));
    assert!(screen.contains("Enter apply"));
}

#[test]
fn test_multiline_ghost_text_adds_rows() {
    struct Lines;

    impl GenerationService for Lines {
        fn suggest(&self, _: &SuggestRequest) -> Result<SuggestResponse, GenerationError> {
            Ok(SuggestResponse {
                suggestion_text: "one\ntwo".to_string(),
            })
        }

        fn personalize(
            &self,
            _: &PersonalizeRequest,
        ) -> Result<PersonalizeResponse, GenerationError> {
            Err(GenerationError::Unavailable("not used".to_string()))
        }
    }

    let mut model = Model::new(SuggestionSession::new("List:\nend", Arc::new(Lines)), (80, 12));
    model.session.request_suggestion().unwrap();
    model
        .session
        .wait_for_suggestion(Duration::from_secs(5))
        .unwrap();
    let mut terminal = create_test_terminal();
    terminal.draw(|frame| render(&model, frame)).unwrap();

    assert!(row_text(&terminal, 1).starts_with("2 end one"), "{}", row_text(&terminal, 1));
    let ghost = row_text(&terminal, 2);
    assert!(ghost.starts_with("  two"), "row: {ghost:?}");
    assert!(ghost.contains(" AI "), "row: {ghost:?}");
}
