use ratatui::prelude::*;
use ratatui::widgets::{Clear, Paragraph};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::app::Model;
use crate::suggest::{DecorationSurface, Overlay, OverlayStyle};

use super::{overlays, status};

/// Render the complete UI.
pub fn render(model: &Model, frame: &mut Frame) {
    let area = frame.area();

    let toast_active = model.active_toast().is_some();
    let footer_rows = 1 + u16::from(toast_active);
    let editor_area = Rect {
        height: area.height.saturating_sub(footer_rows),
        ..area
    };
    let toast_area = Rect {
        y: area.y + area.height.saturating_sub(footer_rows),
        height: 1,
        ..area
    };
    let status_area = Rect {
        y: area.y + area.height.saturating_sub(1),
        height: 1,
        ..area
    };

    render_editor(model, frame, editor_area);

    if toast_active {
        status::render_toast_bar(model, frame, toast_area);
    }
    status::render_status_bar(model, frame, status_area);

    if model.help_visible {
        overlays::render_help_overlay(model, frame, area);
    } else if model.preview.is_some() {
        overlays::render_preview_overlay(model, frame, area);
    }
}

fn render_editor(model: &Model, frame: &mut Frame, area: Rect) {
    let buf = model.session.document();

    let total_lines = buf.line_count();
    let gutter_width = line_number_width(total_lines);

    let visible_height = area.height as usize;
    let start = model.scroll_offset.min(total_lines.saturating_sub(1));
    let end = (start + visible_height).min(total_lines);
    let cursor = buf.cursor();

    let mut content: Vec<Line<'static>> = (start..end)
        .map(|line_idx| {
            let text = buf.line_at(line_idx).unwrap_or_default();
            let cursor_col = (line_idx == cursor.line).then_some(cursor.col);
            editor_line(&text, line_idx, gutter_width, cursor_col)
        })
        .collect();

    let mut ghost = GhostText {
        lines: &mut content,
        first_line: start,
        gutter_width,
        width: area.width,
    };
    model.session.paint(&mut ghost);
    content.truncate(visible_height);

    frame.render_widget(Clear, area);
    frame.render_widget(Paragraph::new(content), area);
}

fn editor_line(
    text: &str,
    line_idx: usize,
    gutter_width: u16,
    cursor_col: Option<usize>,
) -> Line<'static> {
    let line_num = format!("{:>width$} ", line_idx + 1, width = gutter_width as usize);
    let mut spans = vec![Span::styled(line_num, Style::default().fg(Color::DarkGray))];

    let Some(col) = cursor_col else {
        spans.push(Span::raw(text.to_string()));
        return Line::from(spans);
    };

    // Split line at cursor position for cursor rendering
    let split = text.char_indices().nth(col).map_or(text.len(), |(i, _)| i);
    let (before, rest) = text.split_at(split);
    let mut rest_chars = rest.chars();
    let cursor_char = rest_chars.next().map_or_else(|| " ".to_string(), String::from);
    let after = rest_chars.as_str();

    if !before.is_empty() {
        spans.push(Span::raw(before.to_string()));
    }
    spans.push(Span::styled(
        cursor_char,
        Style::default().bg(Color::White).fg(Color::Black),
    ));
    if !after.is_empty() {
        spans.push(Span::raw(after.to_string()));
    }
    Line::from(spans)
}

/// Draws ghost text into already-built editor lines.
struct GhostText<'a> {
    lines: &'a mut Vec<Line<'static>>,
    first_line: usize,
    gutter_width: u16,
    width: u16,
}

impl DecorationSurface for GhostText<'_> {
    fn draw_overlay(&mut self, overlay: &Overlay) {
        let style = ghost_style(overlay.style);
        let Some(row) = overlay.anchor.line.checked_sub(self.first_line) else {
            return;
        };
        let Some(anchor_line) = self.lines.get_mut(row) else {
            return;
        };

        let room = usize::from(self.width).saturating_sub(anchor_line.width());
        anchor_line
            .spans
            .push(Span::styled(fit_width(overlay.inline_text(), room), style));

        let indent = " ".repeat(usize::from(self.gutter_width) + 1);
        let room = usize::from(self.width).saturating_sub(indent.len());
        let mut last = row;
        for text in overlay.trailing_lines() {
            last += 1;
            self.lines.insert(
                last,
                Line::from(vec![
                    Span::raw(indent.clone()),
                    Span::styled(fit_width(text, room), style),
                ]),
            );
        }

        let badge_line = &mut self.lines[last];
        badge_line.spans.push(Span::raw(" "));
        badge_line.spans.push(Span::styled(
            format!(" {} ", overlay.badge),
            Style::default()
                .bg(Color::Magenta)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ));
    }
}

fn ghost_style(style: OverlayStyle) -> Style {
    match style {
        OverlayStyle::Proposal => Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::ITALIC),
    }
}

/// Truncate `text` to `max` display columns, marking the cut with an ellipsis.
fn fit_width(text: &str, max: usize) -> String {
    if text.width() <= max {
        return text.to_string();
    }
    if max == 0 {
        return String::new();
    }
    let budget = max - 1;
    let mut used = 0;
    let mut out = String::new();
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        out.push(ch);
    }
    out.push('\u{2026}');
    out
}

/// Calculate the width needed for line numbers.
pub const fn line_number_width(total_lines: usize) -> u16 {
    if total_lines < 10 {
        1
    } else if total_lines < 100 {
        2
    } else if total_lines < 1_000 {
        3
    } else if total_lines < 10_000 {
        4
    } else if total_lines < 100_000 {
        5
    } else {
        6
    }
}
