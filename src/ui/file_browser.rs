use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::app::{App, MAX_IMPORTED_FILES};
use crate::ui::theme::Theme;

pub fn render_file_browser(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(3),
        Constraint::Length(2),
        Constraint::Length(1),
    ])
    .split(area);

    let header = Line::from(vec![
        Span::styled(" cvgen ", Theme::title()),
        Span::styled(
            format!(" {} ", app.browse_dir().display()),
            Theme::value(),
        ),
    ]);
    f.render_widget(
        Paragraph::new(header).block(Block::default().borders(Borders::ALL).style(Theme::border())),
        chunks[0],
    );

    let inner_height = chunks[1].height.saturating_sub(2) as usize;
    let scroll = app.cursor().saturating_sub(inner_height.saturating_sub(1));

    let lines: Vec<Line> = app
        .browse_entries()
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let cursor = if i == app.cursor() { ">" } else { " " };
            let selected = if app
                .browse_selected()
                .iter()
                .any(|p| p == &app.browse_dir().join(&entry.name))
            {
                "[x]"
            } else {
                "[ ]"
            };
            let name_style = if entry.is_dir { Theme::dir() } else { Theme::value() };
            let suffix = if entry.is_dir { "/" } else { "" };
            let mut line = Line::from(vec![
                Span::styled(format!("{} ", cursor), Theme::marker()),
                Span::styled(format!("{} ", selected), Theme::label()),
                Span::styled(format!("{}{}", entry.name, suffix), name_style),
            ]);
            if i == app.cursor() {
                line = line.style(Theme::selected());
            }
            line
        })
        .collect();

    let title = format!(
        " Select up to {} files to import ({} selected) ",
        MAX_IMPORTED_FILES,
        app.browse_selected().len()
    );
    f.render_widget(
        Paragraph::new(lines)
            .block(
                Block::default()
                    .title(title)
                    .borders(Borders::ALL)
                    .style(Theme::border()),
            )
            .scroll((scroll as u16, 0)),
        chunks[1],
    );

    render_status(f, app, chunks[2]);

    let keys = " j/k:move  Space:select  Enter:confirm  \u{2190}/\u{2192}:dirs  l:logs  q:quit";
    f.render_widget(
        Paragraph::new(Span::styled(keys, Theme::footer())),
        chunks[3],
    );
}

/// Shared two-line status strip: `lastMessage` then `lastError`.
pub fn render_status(f: &mut Frame, app: &App, area: Rect) {
    let mut lines = Vec::new();
    if !app.last_message().is_empty() {
        // Only the first line of a multi-line message fits the strip.
        let first = app.last_message().lines().next().unwrap_or_default();
        lines.push(Line::from(Span::styled(
            format!(" {}", first),
            Theme::message(),
        )));
    }
    if let Some(err) = app.last_error() {
        lines.push(Line::from(Span::styled(
            format!(" Error: {}", err),
            Theme::error(),
        )));
    }
    f.render_widget(Paragraph::new(lines), area);
}
