use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Padding, Paragraph, Wrap};

use crate::app::Model;
use crate::suggest::TransformKind;

pub fn render_help_overlay(model: &Model, frame: &mut Frame, area: Rect) {
    let popup_width = area.width.saturating_sub(12).max(48);
    let popup_height = area.height.saturating_sub(4).max(12);
    let popup = centered_popup_rect(popup_width, popup_height, area);

    let global_cfg = model
        .config_global_path
        .as_ref()
        .map_or_else(|| "<unknown>".to_string(), |p| p.display().to_string());
    let local_cfg = model
        .config_local_path
        .as_ref()
        .map_or_else(|| "<none>".to_string(), |p| p.display().to_string());

    let section_style = Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD);
    let dim_style = Style::default().fg(Color::Indexed(245));

    let mut lines: Vec<Line> = Vec::new();

    lines.push(Line::styled("Suggestions", section_style));
    lines.push(Line::raw("  Ctrl+Space          Suggest a continuation"));
    lines.push(Line::raw(format!(
        "  {:<20}Accept suggestion",
        model.keys.accept_key().to_string()
    )));
    lines.push(Line::raw(format!(
        "  {:<20}Reject suggestion",
        model.keys.reject_key().to_string()
    )));
    if model.auto_suggest {
        lines.push(Line::styled("  (auto-suggest after a typing pause)", dim_style));
    }
    lines.push(Line::raw(""));

    lines.push(Line::styled("Personalize", section_style));
    for (idx, kind) in TransformKind::ALL.iter().enumerate() {
        lines.push(Line::raw(format!(
            "  Alt+{}               {}",
            idx + 1,
            kind.label()
        )));
    }
    lines.push(Line::raw(""));

    lines.push(Line::styled("Editor", section_style));
    lines.push(Line::raw("  Arrows, Home/End    Navigate"));
    lines.push(Line::raw("  Ctrl+Home/End       Draft start / end"));
    lines.push(Line::raw("  PageUp/PageDown     Move by page"));
    lines.push(Line::raw("  Ctrl+Q              Quit and print draft"));
    lines.push(Line::raw("  F1                  Toggle help"));
    lines.push(Line::raw(""));

    lines.push(Line::styled("Config", section_style));
    lines.push(Line::raw(format!("  Global: {global_cfg}")));
    lines.push(Line::raw(format!("  Local override: {local_cfg}")));

    let block = Block::default()
        .title("Help")
        .borders(Borders::ALL)
        .padding(Padding::uniform(1))
        .style(Style::default().bg(Color::Black).fg(Color::White));

    frame.render_widget(Clear, popup);
    frame.render_widget(block, popup);

    // Inner area: border(1) + padding(1) on each side = 4
    let inner = Rect::new(
        popup.x + 2,
        popup.y + 2,
        popup.width.saturating_sub(4),
        popup.height.saturating_sub(4),
    );
    let content_height = inner.height.saturating_sub(1);
    let content_area = Rect::new(inner.x, inner.y, inner.width, content_height);
    frame.render_widget(Paragraph::new(lines), content_area);

    let footer_area = Rect::new(inner.x, inner.y + content_height, inner.width, 1);
    frame.render_widget(
        Paragraph::new(Line::styled("any key closes", dim_style)),
        footer_area,
    );
}

pub fn render_preview_overlay(model: &Model, frame: &mut Frame, area: Rect) {
    let Some(preview) = &model.preview else {
        return;
    };
    let popup_width = area.width.saturating_sub(8).max(40);
    let popup_height = area.height.saturating_sub(4).max(8);
    let popup = centered_popup_rect(popup_width, popup_height, area);

    let block = Block::default()
        .title(format!("{} preview", preview.kind.label()))
        .borders(Borders::ALL)
        .padding(Padding::horizontal(1))
        .style(Style::default().bg(Color::Black).fg(Color::White));
    let inner = block.inner(popup);

    frame.render_widget(Clear, popup);
    frame.render_widget(block, popup);

    let body_height = inner.height.saturating_sub(1);
    let body = Rect::new(inner.x, inner.y, inner.width, body_height);
    frame.render_widget(
        Paragraph::new(preview.content.as_str()).wrap(Wrap { trim: false }),
        body,
    );

    let footer_area = Rect::new(inner.x, inner.y + body_height, inner.width, 1);
    let footer = Line::styled(
        "Enter apply \u{2502} Esc discard",
        Style::default().fg(Color::Indexed(245)),
    );
    frame.render_widget(Paragraph::new(footer), footer_area);
}

fn centered_popup_rect(width: u16, height: u16, area: Rect) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(w) / 2);
    let y = area.y + (area.height.saturating_sub(h) / 2);
    Rect::new(x, y, w, h)
}
