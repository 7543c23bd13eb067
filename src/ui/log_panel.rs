use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::log::{LogEntry, LogLevel};
use crate::ui::theme::Theme;

pub fn render_log_panel(f: &mut Frame, entries: &[LogEntry], scroll: usize, area: Rect) {
    let chunks = Layout::vertical([Constraint::Min(3), Constraint::Length(1)]).split(area);

    let lines: Vec<Line> = if entries.is_empty() {
        vec![Line::from(Span::styled(
            "No log entries yet.",
            Theme::label(),
        ))]
    } else {
        entries.iter().map(entry_line).collect()
    };

    let inner_height = chunks[0].height.saturating_sub(2) as usize;
    // A tailed scroll (at or past the end) clamps to the last page.
    let offset = scroll.min(lines.len().saturating_sub(inner_height));

    f.render_widget(
        Paragraph::new(lines)
            .block(
                Block::default()
                    .title(format!(" Application Logs ({}) ", entries.len()))
                    .borders(Borders::ALL)
                    .style(Theme::border()),
            )
            .scroll((offset as u16, 0)),
        chunks[0],
    );

    f.render_widget(
        Paragraph::new(Span::styled(
            " b:back  j/k:scroll  g/G:top/bottom  c:clear  q:quit",
            Theme::footer(),
        )),
        chunks[1],
    );
}

fn entry_line(entry: &LogEntry) -> Line<'_> {
    let tag_style = match entry.level {
        LogLevel::Info => Theme::label(),
        LogLevel::Warn => Theme::marker(),
        LogLevel::Error => Theme::error(),
    };
    let msg_style = match entry.level {
        LogLevel::Error => Theme::error(),
        _ => Theme::value(),
    };
    Line::from(vec![
        Span::styled(
            format!(" {} ", entry.timestamp.format("%H:%M:%S")),
            Theme::footer(),
        ),
        Span::styled(format!("{:<5} ", entry.level.label()), tag_style),
        Span::styled(entry.message.as_str(), msg_style),
    ])
}
