use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use crate::app::{Model, ToastLevel};
use crate::suggest::Phase;

/// Status bar text and colors for the current suggestion state.
pub fn suggestion_status(model: &Model) -> (String, Style) {
    match model.session.phase() {
        Phase::Idle => (
            "Ctrl+Space: suggest".to_string(),
            Style::default().bg(Color::DarkGray).fg(Color::White),
        ),
        Phase::Generating => (
            "generating\u{2026}".to_string(),
            Style::default().bg(Color::Blue).fg(Color::White),
        ),
        Phase::Visible => (
            format!(
                "suggestion: {} accept \u{b7} {} reject",
                model.keys.accept_key(),
                model.keys.reject_key()
            ),
            Style::default().bg(Color::Magenta).fg(Color::White),
        ),
    }
}

pub fn render_status_bar(model: &Model, frame: &mut Frame, area: Rect) {
    let cursor = model.session.document().cursor();
    let (suggestion, style) = suggestion_status(model);
    let personalizing = model
        .session
        .personalizing()
        .map(|kind| format!("  [{}\u{2026}]", kind.label()))
        .unwrap_or_default();

    let status = format!(
        " {}  Ln {}, Col {}  {suggestion}{personalizing}  F1:help",
        model.display_name(),
        cursor.line + 1,
        cursor.col + 1,
    );

    frame.render_widget(Paragraph::new(status).style(style), area);
}

pub fn render_toast_bar(model: &Model, frame: &mut Frame, area: Rect) {
    let Some((message, level)) = model.active_toast() else {
        return;
    };
    let (prefix, style) = match level {
        ToastLevel::Info => (
            "[info]",
            Style::default().bg(Color::DarkGray).fg(Color::White),
        ),
        ToastLevel::Warning => (
            "[warn]",
            Style::default().bg(Color::Yellow).fg(Color::Black),
        ),
        ToastLevel::Error => {
            ("[error]", Style::default().bg(Color::Red).fg(Color::White))
        }
    };
    let toast = Paragraph::new(format!("{prefix} {message}")).style(style);
    frame.render_widget(toast, area);
}
